//! 検索関連の共通型

use serde::{Deserialize, Serialize};

/// 検索方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    /// 前方検索（Find Next）
    #[default]
    Forward,
    /// 後方検索（Find Previous）
    Backward,
}

/// 後方検索の挙動
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindPreviousMode {
    /// 開始位置より前を末尾側から探し、なければ文書末尾から折り返す
    #[default]
    Reverse,
    /// 旧来の近似動作：文書先頭から前方に探し、折り返さない
    FromStart,
}

/// 検索条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// 検索語
    pub needle: String,
    /// 大文字小文字を区別するか
    pub case_sensitive: bool,
    /// 検索方向
    pub direction: SearchDirection,
}

impl SearchQuery {
    pub fn forward(needle: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            needle: needle.into(),
            case_sensitive,
            direction: SearchDirection::Forward,
        }
    }

    pub fn backward(needle: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            needle: needle.into(),
            case_sensitive,
            direction: SearchDirection::Backward,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }
}

/// 1件の検索マッチ情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// マッチ開始位置（文字インデックス）
    pub start: usize,
    /// マッチ終了位置（文字インデックス、排他的）
    pub end: usize,
    /// 文書端で折り返した結果か
    pub wrapped: bool,
}

/// 検索操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOutcome {
    /// 見つかって選択した
    Found(SearchMatch),
    /// 見つからない（"Cannot find the text."）
    NotFound,
    /// 検索語が空（ホストは検索バーを表示する）
    EmptyQuery,
}

impl FindOutcome {
    pub fn found(&self) -> Option<SearchMatch> {
        match self {
            FindOutcome::Found(m) => Some(*m),
            _ => None,
        }
    }
}
