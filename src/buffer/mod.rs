//! 文書バッファとホスト契約
//!
//! 文書（テキスト全体＋カーソル位置）はホストのエディタが所有する。
//! コアは `DocumentHost` を通して読み取り・丸ごとの置き換えだけを行い、
//! ホストは変更を `ChangeEvent` でリスナーに通知する。
//! オフセットはすべてコードポイント単位。

mod document;

pub use document::Document;

/// 変更イベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent<'a> {
    /// テキストが変更された（変更後の内容）
    ContentChanged { text: &'a str, cursor: usize },
    /// カーソルが移動した
    CursorMoved { old_offset: usize, new_offset: usize },
}

/// 変更通知リスナー
pub trait ChangeListener {
    fn on_change(&mut self, event: &ChangeEvent<'_>);
}

/// 変更通知システム
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// リスナーを追加
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    /// 変更を通知
    pub fn notify(&mut self, event: ChangeEvent<'_>) {
        for listener in &mut self.listeners {
            listener.on_change(&event);
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// ホストエディタが提供する文書操作
///
/// `set_text` / `set_cursor_offset` / `select_range` は同期的に
/// 登録済みリスナーへ通知してよい。
pub trait DocumentHost {
    /// 文書全体のテキスト
    fn text(&self) -> String;

    /// カーソル位置
    fn cursor_offset(&self) -> usize;

    /// 文書全体を置き換える
    fn set_text(&mut self, text: &str);

    /// カーソルを移動（文書長で丸める）
    fn set_cursor_offset(&mut self, offset: usize);

    /// 範囲を選択し、カーソルを `end` に置く
    fn select_range(&mut self, start: usize, end: usize);

    /// 現在の選択範囲
    fn selection(&self) -> Option<(usize, usize)> {
        None
    }

    /// 指定位置が見えるようにスクロール
    fn scroll_to_offset(&mut self, offset: usize);

    /// 変更リスナーを追加
    fn add_change_listener(&mut self, listener: Box<dyn ChangeListener>);
}

/// 文字インデックスをバイトインデックスに変換（範囲外は末尾）
pub fn char_to_byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// バイトインデックスを文字インデックスに変換
pub fn byte_to_char_index(text: &str, byte_index: usize) -> usize {
    let end = byte_index.min(text.len());
    text.char_indices().take_while(|(idx, _)| *idx < end).count()
}
