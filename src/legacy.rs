//! legacy の Mesh (`core.netcracker.com/v1`) リソースのモデル
//!
//! マッピングに使わないフィールドも、未対応として警告を出すために保持している。

mod scalar;

use std::collections::BTreeMap;

use serde::Deserialize;

pub use self::scalar::Scalar;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingResource {
    pub api_version: Option<String>,
    pub kind: Option<String>,
    pub sub_kind: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: Option<RoutingConfig>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: Option<String>,
    pub namespace: Option<String>,
    #[serde(default, deserialize_with = "scalar::string_map")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    pub namespace: Option<String>,
    #[serde(default)]
    pub gateways: Vec<String>,
    pub listener_port: Option<Scalar>,
    pub tls_supported: Option<bool>,
    #[serde(default)]
    pub virtual_services: Vec<VirtualService>,
    pub overridden: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualService {
    pub name: Option<String>,
    #[serde(default)]
    pub hosts: Vec<String>,
    pub rate_limit: Option<Scalar>,
    #[serde(default)]
    pub add_headers: Vec<HeaderDefinition>,
    #[serde(default)]
    pub remove_headers: Vec<String>,
    pub route_configuration: Option<RouteConfig>,
    pub overridden: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    pub version: Option<Scalar>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub destination: Option<Destination>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub cluster: Option<String>,
    pub endpoint: Option<String>,
    pub tls_supported: Option<bool>,
    pub tls_endpoint: Option<String>,
    pub tls_config_name: Option<String>,
    pub http_version: Option<Scalar>,
    pub circuit_breaker: Option<CircuitBreaker>,
    pub tcp_keepalive: Option<TcpKeepalive>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitBreaker {
    pub threshold: Option<Threshold>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub max_connections: Option<Scalar>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpKeepalive {
    pub probes: Option<Scalar>,
    pub time: Option<Scalar>,
    pub interval: Option<Scalar>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(rename = "match")]
    pub match_: Option<RouteMatch>,
    pub prefix_rewrite: Option<String>,
    pub host_rewrite: Option<String>,
    #[serde(default)]
    pub add_headers: Vec<HeaderDefinition>,
    #[serde(default)]
    pub remove_headers: Vec<String>,
    /// 未指定と `true` は許可、`false` のみ除外
    #[serde(default, deserialize_with = "scalar::tri_state")]
    pub allowed: Option<bool>,
    pub timeout: Option<Scalar>,
    pub idle_timeout: Option<Scalar>,
    pub stateful_session: Option<StatefulSession>,
    pub rate_limit: Option<Scalar>,
    pub deny: Option<bool>,
    pub lua_filter: Option<String>,
}

impl Rule {
    pub fn is_excluded(&self) -> bool {
        self.allowed == Some(false)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    pub prefix: Option<String>,
    pub path: Option<String>,
    pub reg_exp: Option<String>,
    #[serde(default)]
    pub header_matchers: Vec<HeaderMatcher>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMatcher {
    pub name: Option<String>,
    pub exact_match: Option<Scalar>,
    pub safe_regex_match: Option<Scalar>,
    pub prefix_match: Option<Scalar>,
    pub suffix_match: Option<Scalar>,
    pub present_match: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderDefinition {
    pub name: Option<String>,
    #[serde(default)]
    pub value: Scalar,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSession {
    pub enabled: Option<bool>,
    pub port: Option<Scalar>,
    pub cookie: Option<Cookie>,
}

impl StatefulSession {
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: Option<String>,
    pub path: Option<String>,
    pub ttl: Option<Scalar>,
}
