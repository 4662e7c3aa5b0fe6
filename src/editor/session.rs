//! 編集セッション
//!
//! ひとつの文書ウィンドウに相当する。ホスト文書・履歴・検索設定・
//! ファイルパス・エンコーディング・変更フラグをまとめて持つ。

use crate::buffer::{ChangeEvent, ChangeListener, Document, DocumentHost};
use crate::config::EditorConfig;
use crate::editor::history::HistoryManager;
use crate::error::{FileError, Result};
use crate::file::{self, TextEncoding};
use crate::search::{self, FindOutcome, FindPreviousMode, SearchQuery};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// ウィンドウタイトルのアプリ名
pub const APP_TITLE: &str = "retropad";

/// パス未設定の文書名
pub const UNTITLED_NAME: &str = "Untitled";

/// 検索・置換の設定（最後に使った値を保持する）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSettings {
    pub needle: String,
    pub replacement: String,
    pub match_case: bool,
    pub find_previous: FindPreviousMode,
}

/// 内容変更で立つ変更フラグ
struct DirtyTracker {
    modified: Rc<Cell<bool>>,
}

impl ChangeListener for DirtyTracker {
    fn on_change(&mut self, event: &ChangeEvent<'_>) {
        if let ChangeEvent::ContentChanged { .. } = event {
            self.modified.set(true);
        }
    }
}

/// 編集セッション
pub struct EditorSession<H: DocumentHost = Document> {
    host: H,
    history: HistoryManager,
    search: SearchSettings,
    path: Option<PathBuf>,
    encoding: TextEncoding,
    default_encoding: TextEncoding,
    modified: Rc<Cell<bool>>,
}

impl EditorSession<Document> {
    /// 既定設定の空文書セッション
    pub fn new() -> Self {
        Self::with_host(Document::new(), &EditorConfig::default())
    }

    /// 設定を適用した空文書セッション
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::with_host(Document::new(), config)
    }
}

impl Default for EditorSession<Document> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: DocumentHost> EditorSession<H> {
    /// ホストに履歴と変更フラグのリスナーを登録してセッションを作る
    ///
    /// ホストの現在内容は未変更・履歴なしとして扱う。
    pub fn with_host(mut host: H, config: &EditorConfig) -> Self {
        let history = HistoryManager::with_limit(config.undo_limit.max(1));
        history.bind(&mut host);

        let modified = Rc::new(Cell::new(false));
        host.add_change_listener(Box::new(DirtyTracker {
            modified: Rc::clone(&modified),
        }));

        Self {
            host,
            history,
            search: SearchSettings {
                match_case: config.match_case,
                find_previous: config.find_previous,
                ..SearchSettings::default()
            },
            path: None,
            encoding: config.default_encoding,
            default_encoding: config.default_encoding,
            modified,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// ホストへの可変参照（通常の編集はここから行う）
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn search_settings(&self) -> &SearchSettings {
        &self.search
    }

    pub fn search_settings_mut(&mut self) -> &mut SearchSettings {
        &mut self.search
    }

    /// 文書全体のテキスト
    pub fn text(&self) -> String {
        self.host.text()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// 次回保存時のエンコーディングを変更
    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    pub fn is_modified(&self) -> bool {
        self.modified.get()
    }

    /// 文書を空にして初期状態へ戻す
    pub fn new_document(&mut self) {
        self.reset_contents("");
        self.path = None;
        self.encoding = self.default_encoding;
        log::debug!("started a new document");
    }

    /// ファイルを開く
    ///
    /// 失敗時は文書・パス・エンコーディング・履歴を変更しない。
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let loaded = file::load_file(path)?;

        self.reset_contents(&loaded.text);
        self.path = Some(path.to_path_buf());
        self.encoding = loaded.encoding;
        Ok(())
    }

    /// 現在のパスへ保存
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(FileError::NoPath)?;
        self.save_as(path)
    }

    /// 指定パスへ保存し、以後そのパスを使う
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let written = file::save_file(path, &self.host.text(), self.encoding)?;

        self.path = Some(path.to_path_buf());
        self.encoding = written;
        self.modified.set(false);
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.host)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.host)
    }

    /// 次を検索（選択範囲の終端、なければカーソルから）
    pub fn find_next(&mut self) -> FindOutcome {
        let start = match self.host.selection() {
            Some((a, b)) => a.max(b),
            None => self.host.cursor_offset(),
        };
        let query = SearchQuery::forward(self.search.needle.clone(), self.search.match_case);
        self.run_find(&query, start)
    }

    /// 前を検索（選択範囲の始端、なければカーソルから）
    pub fn find_previous(&mut self) -> FindOutcome {
        let start = match self.host.selection() {
            Some((a, b)) => a.min(b),
            None => self.host.cursor_offset(),
        };
        let query = SearchQuery::backward(self.search.needle.clone(), self.search.match_case);
        self.run_find(&query, start)
    }

    /// 保存済みの検索語・置換語ですべて置換し、件数を返す
    pub fn replace_all(&mut self) -> usize {
        if self.search.needle.is_empty() {
            return 0;
        }
        search::replace_all_in(
            &mut self.host,
            &self.search.needle,
            &self.search.replacement,
            self.search.match_case,
        )
    }

    /// ファイル名、パスがなければ "Untitled"
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED_NAME.to_string())
    }

    /// ウィンドウタイトル（変更ありなら先頭に `*`）
    pub fn title(&self) -> String {
        format!(
            "{}{} - {}",
            if self.is_modified() { "*" } else { "" },
            self.display_name(),
            APP_TITLE
        )
    }

    /// 破棄前の保存確認メッセージ。未変更なら `None`
    pub fn save_prompt(&self) -> Option<String> {
        if !self.is_modified() {
            return None;
        }
        let target = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| UNTITLED_NAME.to_string());
        Some(format!("Save changes to {}?", target))
    }

    fn run_find(&mut self, query: &SearchQuery, start: usize) -> FindOutcome {
        if query.is_empty() {
            return FindOutcome::EmptyQuery;
        }
        let text = self.host.text();
        match search::find_next(&text, query, start, self.search.find_previous) {
            Some(found) => {
                self.host.select_range(found.start, found.end);
                self.host.scroll_to_offset(found.start);
                FindOutcome::Found(found)
            }
            None => {
                log::debug!("cannot find {:?}", query.needle);
                FindOutcome::NotFound
            }
        }
    }

    fn reset_contents(&mut self, text: &str) {
        self.host.set_text(text);
        self.host.set_cursor_offset(0);
        self.host.scroll_to_offset(0);
        self.history.clear(&self.host);
        self.modified.set(false);
    }
}

impl<H: DocumentHost> std::fmt::Debug for EditorSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("path", &self.path)
            .field("encoding", &self.encoding)
            .field("modified", &self.is_modified())
            .field("history", &self.history)
            .finish()
    }
}
