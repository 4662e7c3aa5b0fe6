//! ファイルI/O操作
//!
//! BOM付きテキストファイルの読み込みと保存。
//! 読み込み失敗時は何も返さず、保存はエンコード成功後にだけファイルへ触れる。

use crate::error::{FileError, Result, RetropadError};
use crate::file::encoding::{self, TextEncoding};
use std::fs;
use std::path::{Path, PathBuf};

/// 読み込んだ文書
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedText {
    pub text: String,
    pub encoding: TextEncoding,
}

/// ファイル操作のトレイト
pub trait FileOperations {
    /// ファイルからテキストとエンコーディングを読み込み
    fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadedText>;

    /// テキストを指定エンコーディングで書き込み、実際のエンコーディングを返す
    fn save_file<P: AsRef<Path>>(path: P, text: &str, encoding: TextEncoding)
        -> Result<TextEncoding>;

    /// ファイルが存在するかチェック
    fn file_exists<P: AsRef<Path>>(path: P) -> bool;
}

/// ファイル操作の実装
pub struct DefaultFileOperations;

impl FileOperations for DefaultFileOperations {
    fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadedText> {
        let path = path.as_ref();

        // ディレクトリではないことを確認
        if path.is_dir() {
            return Err(FileError::InvalidPath {
                path: path.display().to_string(),
            }
            .into());
        }

        let bytes = fs::read(path).map_err(|e| FileError::from_io(&e, path))?;
        let (text, encoding) = encoding::decode_detected(&bytes).map_err(|e| {
            log::warn!("failed to decode {}: {}", path.display(), e);
            RetropadError::from(e)
        })?;

        log::info!(
            "loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            encoding
        );
        Ok(LoadedText { text, encoding })
    }

    fn save_file<P: AsRef<Path>>(
        path: P,
        text: &str,
        encoding: TextEncoding,
    ) -> Result<TextEncoding> {
        let path = path.as_ref();

        // 先にエンコードしておき、失敗時は既存ファイルを壊さない
        let encoded = encoding::encode(text, encoding)?;

        // 親ディレクトリが存在しない場合は作成
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| FileError::from_io(&e, parent))?;
            }
        }

        // 一時ファイルに書き込んでからアトミックに移動
        let temp_path = temp_path_for(path);
        if let Err(e) = fs::write(&temp_path, &encoded.bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(FileError::from_io(&e, path).into());
        }
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(FileError::from_io(&e, path).into());
        }

        if encoded.encoding != encoding {
            log::warn!(
                "{} saved as {} instead of {}",
                path.display(),
                encoded.encoding,
                encoding
            );
        }
        log::info!(
            "saved {} ({} bytes, {})",
            path.display(),
            encoded.bytes.len(),
            encoded.encoding
        );
        Ok(encoded.encoding)
    }

    fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        path.exists() && path.is_file()
    }
}

/// ファイル読み込みの便利関数
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadedText> {
    DefaultFileOperations::load_file(path)
}

/// ファイル書き込みの便利関数
pub fn save_file<P: AsRef<Path>>(path: P, text: &str, encoding: TextEncoding) -> Result<TextEncoding> {
    DefaultFileOperations::save_file(path, text, encoding)
}

/// `~` と環境変数を展開する
pub fn expand_path(input: &str) -> Result<PathBuf> {
    shellexpand::full(input)
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .map_err(|e| {
            RetropadError::File(FileError::InvalidPath {
                path: format!("{} ({})", input, e),
            })
        })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".retropad-tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_utf8() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        let content = "Hello, World!\nこんにちは！";

        let written = save_file(&file_path, content, TextEncoding::Utf8).unwrap();
        assert_eq!(written, TextEncoding::Utf8);

        let raw = fs::read(&file_path).unwrap();
        assert_eq!(&raw[..3], &[0xEF, 0xBB, 0xBF]);

        let loaded = load_file(&file_path).unwrap();
        assert_eq!(loaded.text, content);
        assert_eq!(loaded.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_empty_file_loads_as_utf8() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("empty.txt");
        fs::write(&file_path, b"").unwrap();

        let loaded = load_file(&file_path).unwrap();
        assert_eq!(loaded.text, "");
        assert_eq!(loaded.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_missing_file_and_directory() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("nope.txt");
        assert!(matches!(
            load_file(&missing),
            Err(RetropadError::File(FileError::NotFound { .. }))
        ));
        assert!(matches!(
            load_file(temp_dir.path()),
            Err(RetropadError::File(FileError::InvalidPath { .. }))
        ));
    }

    #[test]
    fn test_unrepresentable_ansi_keeps_existing_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("keep.txt");
        fs::write(&file_path, b"original").unwrap();

        let result = save_file(&file_path, "snowman \u{2603}", TextEncoding::Ansi);
        assert!(matches!(result, Err(RetropadError::Encode(_))));
        assert_eq!(fs::read(&file_path).unwrap(), b"original");
        assert!(!temp_path_for(&file_path).exists());
    }

    #[test]
    fn test_failed_temp_write_keeps_target() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("target.txt");
        fs::write(&file_path, b"before").unwrap();
        // 一時ファイルの位置をディレクトリで塞いで書き込みを失敗させる
        fs::create_dir(temp_path_for(&file_path)).unwrap();

        let result = save_file(&file_path, "after", TextEncoding::Utf8);
        assert!(matches!(result, Err(RetropadError::File(_))));
        assert_eq!(fs::read(&file_path).unwrap(), b"before");
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("target.txt")]);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("file.txt");
        save_file(&nested, "x", TextEncoding::Utf16Le).unwrap();
        assert!(DefaultFileOperations::file_exists(&nested));
        assert_eq!(fs::read(&nested).unwrap(), vec![0xFF, 0xFE, b'x', 0]);
    }

    #[test]
    fn test_expand_plain_path() {
        assert_eq!(expand_path("notes.txt").unwrap(), PathBuf::from("notes.txt"));
    }
}
