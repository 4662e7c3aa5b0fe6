//! エディタモジュール
//!
//! スナップショット方式の undo/redo と、文書・履歴・検索・ファイルを
//! まとめた編集セッション。

pub mod history;
pub mod session;

// 公開API
pub use history::{
    HistoryEntry, HistoryManager, HistoryRecorder, HistoryStack, DEFAULT_HISTORY_LIMIT,
};
pub use session::{EditorSession, SearchSettings, APP_TITLE, UNTITLED_NAME};
