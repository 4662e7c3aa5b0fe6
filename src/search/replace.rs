//! 一括置換
//!
//! 先頭から1パスで重ならない出現を置き換える。置換後の文字列の中は
//! 再検索しない（走査は一致した検索語の直後から再開する）。

use super::matcher::FoldedText;
use crate::buffer::DocumentHost;

/// 一括置換の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// 置換後のテキスト
    pub text: String,
    /// 置換した件数
    pub replaced: usize,
}

/// すべての出現を置き換えたテキストを作る
///
/// 検索語が空、または一致がなければ `None`（元のテキストは変更不要）。
pub fn replace_all(
    text: &str,
    needle: &str,
    replacement: &str,
    case_sensitive: bool,
) -> Option<ReplaceSummary> {
    if needle.is_empty() {
        return None;
    }

    let folded = FoldedText::new(text, needle, case_sensitive);
    let needle_len = folded.needle_len();

    let mut result = String::with_capacity(text.len());
    let mut replaced = 0usize;
    let mut copied_until = 0usize;
    for start in folded.match_positions() {
        result.push_str(&text[copied_until..start]);
        result.push_str(replacement);
        copied_until = start + needle_len;
        replaced += 1;
    }

    if replaced == 0 {
        return None;
    }
    result.push_str(&text[copied_until..]);

    Some(ReplaceSummary {
        text: result,
        replaced,
    })
}

/// ホストの文書全体を置換し、件数を返す
///
/// 置換が1件以上あるときだけ `set_text` を1回呼ぶ。
pub fn replace_all_in<H: DocumentHost + ?Sized>(
    host: &mut H,
    needle: &str,
    replacement: &str,
    case_sensitive: bool,
) -> usize {
    let text = host.text();
    match replace_all(&text, needle, replacement, case_sensitive) {
        Some(summary) => {
            host.set_text(&summary.text);
            log::info!(
                "replaced {} occurrence(s) of {:?}",
                summary.replaced,
                needle
            );
            summary.replaced
        }
        None => 0,
    }
}
