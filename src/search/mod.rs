//! 検索モジュール
//!
//! 検索（Find Next / Find Previous、折り返しあり）と一括置換を提供する。
//! 位置はすべて文字インデックス。

mod matcher;
pub mod replace;
pub mod types;

use crate::buffer::{byte_to_char_index, char_to_byte_index};
use matcher::FoldedText;

pub use matcher::{LiteralMatcher, StringMatcher};
pub use replace::{replace_all, replace_all_in, ReplaceSummary};
pub use types::{FindOutcome, FindPreviousMode, SearchDirection, SearchMatch, SearchQuery};

/// `start_offset` から検索語の出現位置を探す
///
/// 前方検索は末尾まで見つからなければ先頭から折り返す。
/// 後方検索は `mode` に従う（`FindPreviousMode` 参照）。
/// 検索語が空なら常に `None`。
pub fn find_next(
    text: &str,
    query: &SearchQuery,
    start_offset: usize,
    mode: FindPreviousMode,
) -> Option<SearchMatch> {
    if query.is_empty() {
        return None;
    }

    let folded = FoldedText::new(text, &query.needle, query.case_sensitive);
    let start_byte = char_to_byte_index(text, start_offset);

    let (byte, wrapped) = match (query.direction, mode) {
        (SearchDirection::Forward, _) => match folded.find_from(start_byte) {
            Some(byte) => (byte, false),
            None if start_byte > 0 => (folded.find_from(0)?, true),
            None => return None,
        },
        (SearchDirection::Backward, FindPreviousMode::Reverse) => {
            match folded.rfind_until(start_byte) {
                Some(byte) => (byte, false),
                None if start_byte < text.len() => (folded.rfind_until(text.len())?, true),
                None => return None,
            }
        }
        (SearchDirection::Backward, FindPreviousMode::FromStart) => (folded.find_from(0)?, false),
    };

    let start = byte_to_char_index(text, byte);
    let end = start + query.needle.chars().count();
    if wrapped {
        log::debug!("search for {:?} wrapped around", query.needle);
    }
    Some(SearchMatch { start, end, wrapped })
}

/// 重ならないすべての出現位置
pub fn find_all(text: &str, needle: &str, case_sensitive: bool) -> Vec<SearchMatch> {
    LiteralMatcher::new().find_matches(text, needle, case_sensitive)
}
