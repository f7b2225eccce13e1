use kube::Resource;
use serde::Serialize;

use crate::{
    error::Result,
    kube::apis::networking::{
        gateway::v1::HTTPRoute,
        istio::v1::{DestinationRule, ServiceEntry},
    },
};

/// ハンドラーが生成する変換後のリソース
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TargetResource {
    HTTPRoute(HTTPRoute),
    DestinationRule(DestinationRule),
    ServiceEntry(ServiceEntry),
}

impl TargetResource {
    pub fn api_version(&self) -> String {
        match self {
            Self::HTTPRoute(_) => HTTPRoute::api_version(&()).into_owned(),
            Self::DestinationRule(_) => DestinationRule::api_version(&()).into_owned(),
            Self::ServiceEntry(_) => ServiceEntry::api_version(&()).into_owned(),
        }
    }

    pub fn kind(&self) -> String {
        match self {
            Self::HTTPRoute(_) => HTTPRoute::kind(&()).into_owned(),
            Self::DestinationRule(_) => DestinationRule::kind(&()).into_owned(),
            Self::ServiceEntry(_) => ServiceEntry::kind(&()).into_owned(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        let meta = match self {
            Self::HTTPRoute(r) => r.meta(),
            Self::DestinationRule(r) => r.meta(),
            Self::ServiceEntry(r) => r.meta(),
        };

        meta.name.as_deref()
    }

    /// `HTTPRoute/<name>` 形式の表示名
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.kind(), self.name().unwrap_or_default())
    }

    /// スキーマ検証の入力
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl From<HTTPRoute> for TargetResource {
    fn from(value: HTTPRoute) -> Self {
        Self::HTTPRoute(value)
    }
}

impl From<DestinationRule> for TargetResource {
    fn from(value: DestinationRule) -> Self {
        Self::DestinationRule(value)
    }
}

impl From<ServiceEntry> for TargetResource {
    fn from(value: ServiceEntry) -> Self {
        Self::ServiceEntry(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::kube::apis::networking::gateway::v1::HTTPRouteSpec;

    use super::*;

    #[test]
    fn exposes_type_meta_of_wrapped_resource() {
        let resource = TargetResource::from(HTTPRoute::new("demo-http-route", HTTPRouteSpec::default()));

        assert_eq!(resource.api_version(), "gateway.networking.k8s.io/v1");
        assert_eq!(resource.kind(), "HTTPRoute");
        assert_eq!(resource.name(), Some("demo-http-route"));
        assert_eq!(resource.display_name(), "HTTPRoute/demo-http-route");
    }

    #[test]
    fn json_carries_api_version_and_kind() {
        let resource = TargetResource::from(HTTPRoute::new("demo", HTTPRouteSpec::default()));

        let json = resource.to_json().unwrap();

        assert_eq!(json["apiVersion"], "gateway.networking.k8s.io/v1");
        assert_eq!(json["kind"], "HTTPRoute");
        assert_eq!(json["metadata"]["name"], "demo");
    }
}
