//! テキストエンコーディングの検出と変換
//!
//! BOMの有無だけで判定する（ヒューリスティックな文字コード推定は行わない）。
//! 内部表現は常にUTF-8の `String`。

use crate::error::{DecodeError, EncodeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// UTF-8 BOM
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
/// UTF-16 リトルエンディアン BOM
pub const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
/// UTF-16 ビッグエンディアン BOM
pub const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// ファイルのテキストエンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8 = 1,
    #[serde(rename = "utf-16le")]
    Utf16Le = 2,
    #[serde(rename = "utf-16be")]
    Utf16Be = 3,
    /// Latin-1 (ISO-8859-1)
    #[serde(rename = "ansi")]
    Ansi = 4,
}

impl TextEncoding {
    /// 表示名
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Ansi => "ANSI",
        }
    }

    /// コマンドライン等の文字列表記から解析
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Some(TextEncoding::Utf8),
            "utf-16le" | "utf16le" | "utf-16" => Some(TextEncoding::Utf16Le),
            "utf-16be" | "utf16be" => Some(TextEncoding::Utf16Be),
            "ansi" | "latin-1" | "latin1" | "iso-8859-1" => Some(TextEncoding::Ansi),
            _ => None,
        }
    }

    /// 書き出し時に先頭へ付与するBOM
    fn bom(self) -> &'static [u8] {
        match self {
            TextEncoding::Utf8 => &UTF8_BOM,
            TextEncoding::Utf16Le => &UTF16LE_BOM,
            TextEncoding::Utf16Be => &UTF16BE_BOM,
            TextEncoding::Ansi => &[],
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// エンコード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    /// 書き出すバイト列（BOM込み）
    pub bytes: Vec<u8>,
    /// 実際に使われたエンコーディング
    pub encoding: TextEncoding,
}

/// 先頭3バイトまでのBOMからエンコーディングを判定する
pub fn detect(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(&UTF16LE_BOM) {
        TextEncoding::Utf16Le
    } else if bytes.starts_with(&UTF16BE_BOM) {
        TextEncoding::Utf16Be
    } else {
        // UTF-8 BOM も BOM なしも UTF-8
        TextEncoding::Utf8
    }
}

/// BOMを除去してUTF-8テキストに変換する
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String, DecodeError> {
    if bytes.is_empty() {
        return Ok(String::new());
    }

    match encoding {
        TextEncoding::Utf8 => {
            let body = bytes.strip_prefix(&UTF8_BOM[..]).unwrap_or(bytes);
            decode_strict(encoding_rs::UTF_8, body, encoding)
        }
        TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
            if bytes.len() < 2 {
                return Err(DecodeError::Truncated {
                    encoding,
                    len: bytes.len(),
                });
            }
            let body = bytes.strip_prefix(encoding.bom()).unwrap_or(bytes);
            let codec = if encoding == TextEncoding::Utf16Le {
                encoding_rs::UTF_16LE
            } else {
                encoding_rs::UTF_16BE
            };
            decode_strict(codec, body, encoding)
        }
        TextEncoding::Ansi => Ok(encoding_rs::mem::decode_latin1(bytes).into_owned()),
    }
}

/// 空入力はBOM判定をせずUTF-8扱い、それ以外は判定してからデコードする
pub fn decode_detected(bytes: &[u8]) -> Result<(String, TextEncoding), DecodeError> {
    if bytes.is_empty() {
        return Ok((String::new(), TextEncoding::Utf8));
    }
    let encoding = detect(bytes);
    let text = decode(bytes, encoding)?;
    Ok((text, encoding))
}

/// テキストを指定エンコーディングのバイト列に変換する
///
/// UTF-16BE での書き出しは行わず、BOM付きUTF-8に落とす。
/// 戻り値の `encoding` で実際の形式を確認できる。
pub fn encode(text: &str, encoding: TextEncoding) -> Result<EncodedText, EncodeError> {
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf16Be => {
            if encoding == TextEncoding::Utf16Be {
                log::info!("UTF-16BE output is not supported; writing UTF-8 with BOM instead");
            }
            let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
            bytes.extend_from_slice(&UTF8_BOM);
            bytes.extend_from_slice(text.as_bytes());
            Ok(EncodedText {
                bytes,
                encoding: TextEncoding::Utf8,
            })
        }
        TextEncoding::Utf16Le => {
            let mut bytes = Vec::with_capacity(UTF16LE_BOM.len() + text.len() * 2);
            bytes.extend_from_slice(&UTF16LE_BOM);
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            Ok(EncodedText { bytes, encoding })
        }
        TextEncoding::Ansi => {
            if !encoding_rs::mem::is_str_latin1(text) {
                let (position, ch) = text
                    .chars()
                    .enumerate()
                    .find(|(_, ch)| u32::from(*ch) > 0xFF)
                    .unwrap_or((0, char::REPLACEMENT_CHARACTER));
                return Err(EncodeError::Unrepresentable {
                    ch,
                    position,
                    encoding,
                });
            }
            let bytes = encoding_rs::mem::encode_latin1_lossy(text).into_owned();
            Ok(EncodedText { bytes, encoding })
        }
    }
}

fn decode_strict(
    codec: &'static encoding_rs::Encoding,
    body: &[u8],
    encoding: TextEncoding,
) -> Result<String, DecodeError> {
    codec
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or(DecodeError::Malformed { encoding })
}
