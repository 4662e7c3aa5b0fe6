//! エラーハンドリングシステム
//!
//! retropad 全体で使用される統一されたエラー型を定義する。
//! 検索語が空・履歴が空といった状態はエラーではなく、各APIの戻り値で表現する。

use crate::file::TextEncoding;
use std::io::ErrorKind;
use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetropadError {
    /// ファイル操作エラー（IOError）
    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    /// バイト列をテキストに変換できない
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// テキストを指定エンコーディングで表現できない
    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("No file path associated with the document")]
    NoPath,

    #[error("IO error: {message}")]
    Io { message: String },
}

impl FileError {
    /// `std::io::Error` をパス付きで分類する
    pub fn from_io(error: &std::io::Error, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => FileError::NotFound { path },
            ErrorKind::PermissionDenied => FileError::PermissionDenied { path },
            _ => FileError::Io {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

/// デコード失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// コード単位に満たない長さ
    #[error("{encoding} input is truncated ({len} bytes)")]
    Truncated { encoding: TextEncoding, len: usize },

    /// 不正なバイト列・コード単位
    #[error("malformed {encoding} byte sequence")]
    Malformed { encoding: TextEncoding },
}

/// エンコード失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("character {ch:?} at offset {position} cannot be represented in {encoding}")]
    Unrepresentable {
        ch: char,
        position: usize,
        encoding: TextEncoding,
    },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, RetropadError>;

// std::io::Error から RetropadError への変換（パス情報なし）
impl From<std::io::Error> for RetropadError {
    fn from(error: std::io::Error) -> Self {
        RetropadError::File(FileError::Io {
            message: error.to_string(),
        })
    }
}

impl RetropadError {
    /// ホストのダイアログに表示する一文
    pub fn user_message(&self) -> String {
        match self {
            RetropadError::File(FileError::NotFound { path }) => {
                format!("Cannot find the file {}.", path)
            }
            RetropadError::File(FileError::PermissionDenied { path }) => {
                format!("Access to {} was denied.", path)
            }
            RetropadError::Decode(_) => {
                "The file could not be opened: unsupported or corrupt encoding.".to_string()
            }
            RetropadError::Encode(EncodeError::Unrepresentable { encoding, .. }) => {
                format!("This document contains characters that cannot be saved as {}.", encoding)
            }
            other => other.to_string(),
        }
    }
}

/// パニック時に位置とメッセージを出して終了する
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        log::error!("panic at {}: {}", location, message);
        eprintln!("PANIC at {}: {}", location, message);
        eprintln!("Stack trace: {}", std::backtrace::Backtrace::capture());
        std::process::exit(1);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn io_error_kinds_are_classified() {
        let missing = std::io::Error::new(ErrorKind::NotFound, "gone");
        assert_eq!(
            FileError::from_io(&missing, Path::new("a.txt")),
            FileError::NotFound {
                path: "a.txt".to_string()
            }
        );

        let denied = std::io::Error::new(ErrorKind::PermissionDenied, "no");
        assert!(matches!(
            FileError::from_io(&denied, Path::new("b.txt")),
            FileError::PermissionDenied { .. }
        ));

        let other = std::io::Error::new(ErrorKind::Other, "disk on fire");
        match FileError::from_io(&other, Path::new("c.txt")) {
            FileError::Io { message } => assert!(message.contains("c.txt")),
            e => panic!("unexpected {:?}", e),
        }
    }

    #[test]
    fn user_message_for_decode_failure() {
        let error: RetropadError = DecodeError::Malformed {
            encoding: TextEncoding::Utf16Le,
        }
        .into();
        assert!(error.user_message().contains("could not be opened"));
        assert!(error.to_string().contains("UTF-16LE"));
    }
}
