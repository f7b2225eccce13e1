use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HTTPRouteFilter {
    #[serde(rename = "type")]
    pub type_: HTTPRouteFilterType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_header_modifier: Option<HTTPHeaderFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_rewrite: Option<HTTPURLRewriteFilter>,
}

impl HTTPRouteFilter {
    pub fn url_rewrite(filter: HTTPURLRewriteFilter) -> Self {
        Self {
            type_: HTTPRouteFilterType::URLRewrite,
            request_header_modifier: None,
            url_rewrite: Some(filter),
        }
    }

    pub fn request_header_modifier(filter: HTTPHeaderFilter) -> Self {
        Self {
            type_: HTTPRouteFilterType::RequestHeaderModifier,
            request_header_modifier: Some(filter),
            url_rewrite: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HTTPRouteFilterType {
    RequestHeaderModifier,
    URLRewrite,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HTTPURLRewriteFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<HTTPPathModifier>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HTTPPathModifier {
    #[serde(rename = "type")]
    pub type_: HTTPPathModifierType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_prefix_match: Option<String>,
}

impl HTTPPathModifier {
    pub fn replace_prefix_match(prefix: impl Into<String>) -> Self {
        Self {
            type_: HTTPPathModifierType::ReplacePrefixMatch,
            replace_prefix_match: Some(prefix.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HTTPPathModifierType {
    ReplacePrefixMatch,
}

/// add は既存ヘッダーに追記する
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HTTPHeaderFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<Vec<HTTPHeader>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HTTPHeader {
    pub name: String,
    pub value: String,
}
