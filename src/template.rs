//! Helm などのテンプレート式 `{{ ... }}` を含む YAML をパース可能な形に書き換える。
//!
//! 書き換えはテキスト上のヒューリスティックで、テンプレート式の文字列はそのまま保持する。

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// 行全体が1つのテンプレート式になっている行
static STANDALONE_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)(\{\{[^\n]*\}\})[ \t]*$").expect("valid regex"));

/// `key: value` の value 部分にテンプレート式を含む行
static INLINE_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*[^:#\n]+:)[ \t]*([^\n]*\{\{[^\n]+\}\}[^\n]*)$").expect("valid regex")
});

pub trait Preprocess {
    fn preprocess(&self, yaml: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplatePreprocessor;

impl Preprocess for TemplatePreprocessor {
    fn preprocess(&self, yaml: &str) -> String {
        let yaml = replace_standalone_templates(yaml);
        quote_inline_templates(&yaml).into_owned()
    }
}

/// 行全体がテンプレート式の行を、インデントを保ったままコメントにする
///
/// ```yaml
/// labels:
///   {{ include "labels" . }}
/// ```
///
/// は `  # {{ include "labels" . }}` になる。
pub fn replace_standalone_templates(yaml: &str) -> Cow<'_, str> {
    STANDALONE_TEMPLATE.replace_all(yaml, "$1# $2")
}

/// クォートされていない値にテンプレート式を含む場合、シングルクォートで囲む
///
/// flow style の値 (`[` か `]` を含む) とクォート済みの値はそのまま残す。
pub fn quote_inline_templates(yaml: &str) -> Cow<'_, str> {
    INLINE_TEMPLATE.replace_all(yaml, |caps: &Captures| {
        let key = &caps[1];
        let value = caps[2].trim();

        if value.starts_with(['\'', '"']) || value.contains(['[', ']']) {
            return caps[0].to_string();
        }

        format!("{} '{}'", key, value.replace('\'', "''"))
    })
}

/// 文字列がテンプレート式のみで構成されているか
pub fn is_template(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("{{") && value.ends_with("}}")
}

/// 文字列の一部にテンプレート式を含むか
pub fn contains_template(value: &str) -> bool {
    value
        .find("{{")
        .is_some_and(|start| value[start..].contains("}}"))
}
