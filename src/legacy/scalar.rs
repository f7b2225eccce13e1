use std::{collections::BTreeMap, fmt};

use log::warn;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// 数値や真偽値で書かれていても文字列として扱うスカラー値
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Scalar(String);

impl Scalar {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// 整数として解釈できれば返す
    pub fn as_i64(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        scalar_text(&value)
            .map(Scalar)
            .ok_or_else(|| serde::de::Error::custom("expected a scalar value"))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// 真偽値か `"true"` / `"false"` の文字列を受け付ける
///
/// それ以外 (未解決のテンプレートなど) は未指定として扱う。
pub(super) fn tri_state<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    let parsed = match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        Some(other) => {
            warn!(
                "    Unrecognized boolean value {:?}, treating as unset",
                scalar_text(&other).unwrap_or_default()
            );
            None
        }
    };

    Ok(parsed)
}

/// ラベルのように値が文字列であるべきマップ
///
/// スカラー以外の値を持つエントリは警告を出して捨てる。
pub(super) fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match scalar_text(&value) {
            Some(text) => Some((key, text)),
            None => {
                warn!("    Label {} has a non-scalar value, skipping", key);
                None
            }
        })
        .collect())
}
