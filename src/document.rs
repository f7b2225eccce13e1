use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

use crate::template::Preprocess;

static DOCUMENT_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^---[ \t]*\r?$").expect("valid regex"));

/// ファイルの内容を `---` 区切りでドキュメントに分割する
///
/// 空白のみのドキュメントは捨てる。順序は保持する。
pub fn split_documents(content: &str) -> Vec<&str> {
    DOCUMENT_SEPARATOR
        .split(content)
        .filter(|doc| !doc.trim().is_empty())
        .collect()
}

/// 前処理したドキュメントをパースする
///
/// パースできないドキュメントは警告を出して `None` を返す。
pub fn parse_document<P: Preprocess + ?Sized>(preprocessor: &P, raw: &str) -> Option<Value> {
    let preprocessed = preprocessor.preprocess(raw);

    match serde_yaml::from_str::<Value>(&preprocessed) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(err) => {
            warn!("    Failed to parse document, skipping. Cause: {}", err);
            None
        }
    }
}
