//! 設定
//!
//! JSON 形式。未指定の項目は既定値になる。
//! 既定の場所は `<config_dir>/retropad/config.json`。

use crate::editor::history::DEFAULT_HISTORY_LIMIT;
use crate::error::{ConfigError, Result};
use crate::file::TextEncoding;
use crate::logging::LogLevel;
use crate::search::FindPreviousMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// エディタ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EditorConfig {
    /// undo スタックの容量
    pub undo_limit: usize,
    /// 検索で大文字小文字を区別するか
    pub match_case: bool,
    /// Find Previous の挙動
    pub find_previous: FindPreviousMode,
    /// 新規文書のエンコーディング
    pub default_encoding: TextEncoding,
    /// ログレベル
    pub log_level: LogLevel,
    /// ログの追記先
    pub log_file: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_HISTORY_LIMIT,
            match_case: false,
            find_previous: FindPreviousMode::Reverse,
            default_encoding: TextEncoding::Utf8,
            log_level: LogLevel::Warning,
            log_file: None,
        }
    }
}

impl EditorConfig {
    /// 既定の設定ファイルパス
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("retropad").join("config.json"))
    }

    /// 既定パスから読み込む。ファイルがなければ既定値
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// 指定ファイルから読み込む
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::InvalidFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_json(&raw).map_err(|e| match e {
            crate::RetropadError::Config(ConfigError::InvalidFile { message, .. }) => {
                ConfigError::InvalidFile {
                    path: path.display().to_string(),
                    message,
                }
                .into()
            }
            other => other,
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// JSON 文字列から読み込む
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| ConfigError::InvalidFile {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 値の妥当性チェック
    pub fn validate(&self) -> Result<()> {
        if self.undo_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "undo_limit".to_string(),
                value: self.undo_limit.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RetropadError;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_classic_notepad() {
        let config = EditorConfig::default();
        assert_eq!(config.undo_limit, 100);
        assert!(!config.match_case);
        assert_eq!(config.default_encoding, TextEncoding::Utf8);
        assert_eq!(config.find_previous, FindPreviousMode::Reverse);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = EditorConfig::from_json(
            r#"{ "match_case": true, "find_previous": "from-start", "default_encoding": "utf-16le" }"#,
        )
        .unwrap();
        assert!(config.match_case);
        assert_eq!(config.find_previous, FindPreviousMode::FromStart);
        assert_eq!(config.default_encoding, TextEncoding::Utf16Le);
        assert_eq!(config.undo_limit, 100);
        assert_eq!(config.log_level, LogLevel::Warning);
    }

    #[test]
    fn zero_undo_limit_is_rejected() {
        let err = EditorConfig::from_json(r#"{ "undo_limit": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            RetropadError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_reports_path_on_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        match EditorConfig::load(&path) {
            Err(RetropadError::Config(ConfigError::InvalidFile { path: p, .. })) => {
                assert!(p.ends_with("config.json"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn round_trips_through_json() {
        let config = EditorConfig {
            undo_limit: 10,
            log_file: Some(PathBuf::from("/tmp/retropad.log")),
            ..EditorConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }
}
