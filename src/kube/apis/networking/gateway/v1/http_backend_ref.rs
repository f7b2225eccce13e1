use serde::{Deserialize, Serialize};

use crate::kube::apis::IntOrTemplate;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HTTPBackendRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<IntOrTemplate>,
}

impl HTTPBackendRef {
    pub fn service(name: impl Into<String>, port: Option<IntOrTemplate>) -> Self {
        Self {
            kind: Some("Service".to_string()),
            name: name.into(),
            port,
        }
    }
}
