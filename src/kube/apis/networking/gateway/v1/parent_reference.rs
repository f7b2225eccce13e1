use serde::{Deserialize, Serialize};

/// Route が紐づく親リソース (通常は Gateway)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
}

impl ParentReference {
    pub fn gateway(name: impl Into<String>) -> Self {
        Self {
            group: Some(super::GROUP.to_string()),
            kind: Some("Gateway".to_string()),
            name: name.into(),
            ..Default::default()
        }
    }
}
