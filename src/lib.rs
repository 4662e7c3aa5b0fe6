//! retropad - クラシックなメモ帳のエディタコア
//!
//! undo/redo 履歴、検索・置換、BOM 付きテキストの読み書きを提供する。
//! 文書そのものはホスト（`DocumentHost`）が所有する。

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;
pub mod file;

// 編集層
pub mod editor;

// ロジック層
pub mod search;

// 公開API
pub use buffer::{ChangeEvent, ChangeListener, Document, DocumentHost};
pub use config::EditorConfig;
pub use editor::{EditorSession, HistoryEntry, HistoryManager};
pub use error::{Result, RetropadError};
pub use file::TextEncoding;
pub use search::{FindOutcome, FindPreviousMode, SearchMatch, SearchQuery};
