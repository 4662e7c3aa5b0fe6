//! セッションとファイル境界の結合テスト

use retropad::error::{EncodeError, FileError};
use retropad::file::encoding::{UTF16LE_BOM, UTF8_BOM};
use retropad::file::TextEncoding;
use retropad::{EditorSession, RetropadError};
use std::fs;
use tempfile::tempdir;

fn edited_session(text: &str) -> EditorSession {
    let mut session = EditorSession::new();
    session.host_mut().insert_str(text);
    session
}

#[test]
fn failed_open_leaves_session_untouched() {
    let dir = tempdir().unwrap();
    let mut session = edited_session("unsaved work");
    let path = dir.path().join("kept.txt");
    session.save_as(&path).unwrap();
    session.host_mut().insert_str("!");

    let missing = dir.path().join("missing.txt");
    let err = session.open(&missing).unwrap_err();
    assert!(matches!(err, RetropadError::File(FileError::NotFound { .. })));

    // 奇数長の UTF-16LE は読めない
    let broken = dir.path().join("broken.txt");
    fs::write(&broken, [0xFF, 0xFE, 0x41, 0x00, 0x42]).unwrap();
    assert!(matches!(session.open(&broken), Err(RetropadError::Decode(_))));

    assert_eq!(session.text(), "unsaved work!");
    assert_eq!(session.path(), Some(path.as_path()));
    assert_eq!(session.encoding(), TextEncoding::Utf8);
    assert!(session.is_modified());
    assert!(session.history().can_undo());
}

#[test]
fn open_detects_encoding_and_clears_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wide.txt");
    let mut bytes = UTF16LE_BOM.to_vec();
    for unit in "Grüße".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&path, bytes).unwrap();

    let mut session = edited_session("scratch");
    session.open(&path).unwrap();

    assert_eq!(session.text(), "Grüße");
    assert_eq!(session.encoding(), TextEncoding::Utf16Le);
    assert_eq!(session.display_name(), "wide.txt");
    assert!(!session.is_modified());
    assert!(!session.undo());
}

#[test]
fn utf16be_file_is_saved_back_as_utf8_with_bom() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("be.txt");
    fs::write(&path, [0xFE, 0xFF, 0x00, 0x68, 0x00, 0x69]).unwrap();

    let mut session = EditorSession::new();
    session.open(&path).unwrap();
    assert_eq!(session.text(), "hi");
    assert_eq!(session.encoding(), TextEncoding::Utf16Be);

    session.save().unwrap();
    assert_eq!(fs::read(&path).unwrap(), [0xEF, 0xBB, 0xBF, b'h', b'i']);
    assert_eq!(session.encoding(), TextEncoding::Utf8);
}

#[test]
fn ansi_save_failure_leaves_file_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("latin.txt");

    let mut session = edited_session("café");
    session.set_encoding(TextEncoding::Ansi);
    session.save_as(&path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"caf\xE9");

    session.host_mut().insert_str("Ω");
    let err = session.save().unwrap_err();
    assert!(matches!(
        err,
        RetropadError::Encode(EncodeError::Unrepresentable { ch: 'Ω', position: 4, .. })
    ));
    assert_eq!(fs::read(&path).unwrap(), b"caf\xE9");
    assert!(session.is_modified());
    assert_eq!(session.encoding(), TextEncoding::Ansi);
}

#[test]
fn saved_files_carry_exact_boms() {
    let dir = tempdir().unwrap();
    let mut session = edited_session("x");

    let utf8 = dir.path().join("utf8.txt");
    session.save_as(&utf8).unwrap();
    assert_eq!(fs::read(&utf8).unwrap(), [&UTF8_BOM[..], &b"x"[..]].concat());

    session.set_encoding(TextEncoding::Utf16Le);
    let utf16 = dir.path().join("utf16.txt");
    session.save_as(&utf16).unwrap();
    assert_eq!(fs::read(&utf16).unwrap(), [0xFF, 0xFE, b'x', 0x00]);

    session.set_encoding(TextEncoding::Ansi);
    let ansi = dir.path().join("ansi.txt");
    session.save_as(&ansi).unwrap();
    assert_eq!(fs::read(&ansi).unwrap(), b"x");
}

#[test]
fn save_as_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("note.txt");
    let mut session = edited_session("nested");
    session.save_as(&path).unwrap();
    assert!(path.is_file());
    assert_eq!(session.save(), Ok(()));
}
