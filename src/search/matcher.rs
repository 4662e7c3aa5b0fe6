//! 検索用マッチャー
//!
//! 正規表現は使わず、部分文字列の単純一致。大文字小文字を無視する場合は
//! ASCII英字だけを小文字化したコピー同士を比較する。ASCII以外は変換しないので
//! バイト長が変わらず、コピー上の位置をそのまま元の文字列に当てはめられる。

use std::borrow::Cow;

use super::types::SearchMatch;
use crate::buffer::byte_to_char_index;

/// 文字列マッチング戦略
pub trait StringMatcher {
    /// 重ならないすべてのマッチを先頭から返す
    fn find_matches(&self, text: &str, pattern: &str, case_sensitive: bool) -> Vec<SearchMatch>;
}

/// リテラルマッチャー
#[derive(Debug, Default, Clone)]
pub struct LiteralMatcher;

impl LiteralMatcher {
    /// インスタンスを作成
    pub fn new() -> Self {
        Self
    }
}

impl StringMatcher for LiteralMatcher {
    fn find_matches(&self, text: &str, pattern: &str, case_sensitive: bool) -> Vec<SearchMatch> {
        let folded = FoldedText::new(text, pattern, case_sensitive);
        let needle_chars = pattern.chars().count();

        // バイト位置→文字位置を前から順に数え進める
        let mut matches = Vec::new();
        let mut last_byte = 0usize;
        let mut last_char = 0usize;
        for byte in folded.match_positions() {
            last_char += byte_to_char_index(&text[last_byte..], byte - last_byte);
            last_byte = byte;
            matches.push(SearchMatch {
                start: last_char,
                end: last_char + needle_chars,
                wrapped: false,
            });
        }
        matches
    }
}

/// 比較用に畳み込んだ検索対象と検索語
#[derive(Debug, Clone)]
pub(crate) struct FoldedText<'a> {
    haystack: Cow<'a, str>,
    needle: Cow<'a, str>,
}

impl<'a> FoldedText<'a> {
    pub(crate) fn new(haystack: &'a str, needle: &'a str, case_sensitive: bool) -> Self {
        Self {
            haystack: fold(haystack, case_sensitive),
            needle: fold(needle, case_sensitive),
        }
    }

    pub(crate) fn needle_len(&self) -> usize {
        self.needle.len()
    }

    /// `from` バイト以降の最初の出現位置
    pub(crate) fn find_from(&self, from: usize) -> Option<usize> {
        if self.needle.is_empty() || from > self.haystack.len() {
            return None;
        }
        self.haystack[from..]
            .find(self.needle.as_ref())
            .map(|idx| idx + from)
    }

    /// `until` バイトまでに収まる最後の出現位置
    pub(crate) fn rfind_until(&self, until: usize) -> Option<usize> {
        if self.needle.is_empty() {
            return None;
        }
        let until = until.min(self.haystack.len());
        self.haystack[..until].rfind(self.needle.as_ref())
    }

    /// 重ならない出現位置を先頭から列挙
    pub(crate) fn match_positions(&self) -> impl Iterator<Item = usize> + '_ {
        let haystack = self.haystack.as_ref();
        let needle = self.needle.as_ref();
        let usable = !needle.is_empty();
        haystack
            .match_indices(needle)
            .filter(move |_| usable)
            .map(|(idx, _)| idx)
    }
}

/// ASCII英字のみ小文字化（区別する場合は借用のまま）
pub(crate) fn fold(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive || !text.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_ascii_lowercase())
    }
}
