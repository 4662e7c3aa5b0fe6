//! メモリ上の文書
//!
//! `DocumentHost` の標準実装。CLIやテスト、独自バッファを持たないホスト向け。

use super::{char_to_byte_index, ChangeEvent, ChangeListener, ChangeNotifier, DocumentHost};

/// テキスト全体とカーソルを保持する文書
#[derive(Debug, Default)]
pub struct Document {
    /// テキスト本体
    text: String,
    /// カーソル位置（文字インデックス）
    cursor: usize,
    /// 選択範囲（文字インデックス、終端は排他的）
    selection: Option<(usize, usize)>,
    /// 最後にスクロール要求された位置
    scroll_offset: usize,
    /// 変更通知システム
    notifier: ChangeNotifier,
}

impl Document {
    /// 空の文書を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字列から文書を作成（通知なし）
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// 文字数
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// カーソル位置に文字列を挿入（選択範囲があれば置き換える）
    pub fn insert_str(&mut self, s: &str) {
        let old_offset = self.cursor;
        let mut changed = false;
        if let Some((start, end)) = self.selection.take() {
            self.remove_chars(start, end);
            self.cursor = start;
            changed = true;
        }
        if !s.is_empty() {
            let byte_idx = char_to_byte_index(&self.text, self.cursor);
            self.text.insert_str(byte_idx, s);
            self.cursor += s.chars().count();
            changed = true;
        }

        if changed {
            self.notify_content();
            self.notify_cursor(old_offset);
        }
    }

    /// Backspace削除（カーソル前の1文字）
    pub fn delete_backward(&mut self) -> Option<char> {
        if let Some((start, end)) = self.selection {
            let deleted = self.delete_range(start, end);
            return deleted.chars().next();
        }
        if self.cursor == 0 {
            return None;
        }
        let deleted = self.delete_range(self.cursor - 1, self.cursor);
        deleted.chars().next()
    }

    /// 範囲削除し、削除した文字列を返す
    pub fn delete_range(&mut self, start: usize, end: usize) -> String {
        let len = self.len_chars();
        let start = start.min(len);
        let end = end.clamp(start, len);
        self.selection = None;
        if start == end {
            return String::new();
        }

        let deleted = self.remove_chars(start, end);
        let old_offset = self.cursor;
        if self.cursor > end {
            self.cursor -= end - start;
        } else if self.cursor > start {
            self.cursor = start;
        }

        self.notify_content();
        self.notify_cursor(old_offset);
        deleted
    }

    fn remove_chars(&mut self, start: usize, end: usize) -> String {
        let start_byte = char_to_byte_index(&self.text, start);
        let end_byte = char_to_byte_index(&self.text, end);
        self.text.drain(start_byte..end_byte).collect()
    }

    fn notify_content(&mut self) {
        self.notifier.notify(ChangeEvent::ContentChanged {
            text: &self.text,
            cursor: self.cursor,
        });
    }

    fn notify_cursor(&mut self, old_offset: usize) {
        if old_offset != self.cursor {
            self.notifier.notify(ChangeEvent::CursorMoved {
                old_offset,
                new_offset: self.cursor,
            });
        }
    }
}

impl DocumentHost for Document {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn cursor_offset(&self) -> usize {
        self.cursor
    }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.selection = None;
        let old_offset = self.cursor;
        self.cursor = self.cursor.min(self.len_chars());

        self.notify_content();
        self.notify_cursor(old_offset);
    }

    fn set_cursor_offset(&mut self, offset: usize) {
        self.selection = None;
        let old_offset = self.cursor;
        self.cursor = offset.min(self.len_chars());
        self.notify_cursor(old_offset);
    }

    fn select_range(&mut self, start: usize, end: usize) {
        let len = self.len_chars();
        let (start, end) = (start.min(len), end.min(len));
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let old_offset = self.cursor;
        self.cursor = end;
        self.selection = (start != end).then_some((start, end));
        self.notify_cursor(old_offset);
    }

    fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    fn scroll_to_offset(&mut self, offset: usize) {
        self.scroll_offset = offset.min(self.len_chars());
    }

    fn add_change_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.notifier.add_listener(listener);
    }
}
