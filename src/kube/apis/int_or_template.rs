use std::fmt;

use serde::{Deserialize, Serialize};

use crate::template::is_template;

/// 整数、またはレンダリング時に整数になるテンプレート式
///
/// テンプレート式は文字列として保持し、YAML への出力時にクォートを外す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrTemplate {
    Int(i64),
    Template(String),
}

impl IntOrTemplate {
    /// 整数かテンプレート式のみの文字列を受け付ける
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if let Ok(n) = text.parse() {
            return Some(Self::Int(n));
        }

        if is_template(text) {
            return Some(Self::Template(text.to_string()));
        }

        None
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Template(_) => None,
        }
    }
}

impl From<i64> for IntOrTemplate {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl fmt::Display for IntOrTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Template(t) => f.write_str(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("8080", Some(IntOrTemplate::Int(8080)))]
    #[case(" 443 ", Some(IntOrTemplate::Int(443)))]
    #[case(
        "{{ .Values.PORT }}",
        Some(IntOrTemplate::Template("{{ .Values.PORT }}".into()))
    )]
    #[case("http", None)]
    #[case("80{{ .Values.SUFFIX }}", None)]
    #[case("", None)]
    #[test]
    fn parse(#[case] text: &str, #[case] expected: Option<IntOrTemplate>) {
        assert_eq!(IntOrTemplate::parse(text), expected);
    }

    #[test]
    fn serializes_int_as_number() {
        let json = serde_json::to_value(IntOrTemplate::Int(8080)).unwrap();

        assert_eq!(json, serde_json::json!(8080));
    }
}
