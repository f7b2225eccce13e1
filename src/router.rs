use log::{debug, warn};
use serde_yaml::Value;

use crate::{handler::HandlerRegistry, resource::TargetResource};

pub const API_VERSION: &str = "core.netcracker.com/v1";
pub const KIND: &str = "Mesh";

/// apiVersion / kind / subKind を見て対応するハンドラーに渡す
#[derive(Debug)]
pub struct ResourceRouter {
    registry: HandlerRegistry,
}

impl ResourceRouter {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    /// 対象外のドキュメントやハンドラーの失敗は空の結果になる
    pub fn route(&self, document: &Value) -> Vec<TargetResource> {
        let (Some(api_version), Some(kind), Some(sub_kind)) = (
            str_field(document, "apiVersion"),
            str_field(document, "kind"),
            str_field(document, "subKind"),
        ) else {
            debug!("    Document has no apiVersion/kind/subKind, skipping");
            return Vec::new();
        };

        if api_version != API_VERSION || kind != KIND {
            debug!("    Skipping {} {}", api_version, kind);
            return Vec::new();
        }

        let Some(handler) = self.registry.get(sub_kind) else {
            warn!("    No handler registered for subKind {}, skipping", sub_kind);
            return Vec::new();
        };

        match handler.handle(document) {
            Ok(resources) => resources,
            Err(err) => {
                let name = document
                    .get("metadata")
                    .and_then(|metadata| str_field(metadata, "name"))
                    .unwrap_or("<unnamed>");

                warn!("    Failed to convert {} {}: {}", sub_kind, name, err);

                Vec::new()
            }
        }
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}
