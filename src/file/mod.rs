//! ファイル操作モジュール
//!
//! - 読み込み時はBOMでエンコーディングを判定（BOMなしはUTF-8）
//! - 保存時はUTF-8/UTF-16LEにBOMを付与、UTF-16BEはUTF-8に落とす
//! - 変換失敗時は文書もファイルも変更しない

pub mod encoding;
pub mod io;

pub use encoding::{decode, decode_detected, detect, encode, EncodedText, TextEncoding};
pub use io::{expand_path, load_file, save_file, DefaultFileOperations, FileOperations, LoadedText};
