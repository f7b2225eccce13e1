use std::{
    io,
    path::{Path, PathBuf},
};

use jsonschema::{Draft, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};

use super::keywords;

static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/v\w+$").expect("valid regex"));

/// 同梱している CRD (ファイル名, 内容)
const BUNDLED: &[(&str, &str)] = &[
    (
        "gateway.networking.k8s.io_httproute.yaml",
        include_str!("../../schemas/gateway.networking.k8s.io_httproute.yaml"),
    ),
    (
        "networking.istio.io_destinationrule.yaml",
        include_str!("../../schemas/networking.istio.io_destinationrule.yaml"),
    ),
    (
        "networking.istio.io_serviceentry.yaml",
        include_str!("../../schemas/networking.istio.io_serviceentry.yaml"),
    ),
];

/// apiVersion と kind から CRD のファイル名を決める
///
/// `gateway.networking.k8s.io/v1` + `HTTPRoute` -> `gateway.networking.k8s.io_httproute.yaml`
pub fn schema_key(api_version: &str, kind: &str) -> String {
    let group = VERSION_SUFFIX.replace(api_version, "");

    format!("{}_{}.yaml", group, kind).to_lowercase()
}

/// CRD の YAML テキストを返す
pub trait SchemaSource: Send + Sync {
    fn load(&self, key: &str) -> Result<String>;
}

/// バイナリに埋め込んだ CRD
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledSchemas;

impl SchemaSource for BundledSchemas {
    fn load(&self, key: &str) -> Result<String> {
        BUNDLED
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, content)| content.to_string())
            .ok_or_else(|| Error::SchemaNotFound(key.to_string()))
    }
}

/// ディレクトリに置かれた CRD
#[derive(Debug, Clone)]
pub struct SchemaDirectory(PathBuf);

impl SchemaDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl SchemaSource for SchemaDirectory {
    fn load(&self, key: &str) -> Result<String> {
        let path = self.0.join(key);

        std::fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::SchemaNotFound(key.to_string()),
            _ => Error::io(path, err),
        })
    }
}

/// CRD から `spec.versions[name == "v1"].schema.openAPIV3Schema` を取り出す
pub(super) fn v1_schema(crd: &str, key: &str) -> Result<Value> {
    let crd: Value = serde_yaml::from_str(crd)?;

    crd.pointer("/spec/versions")
        .and_then(Value::as_array)
        .and_then(|versions| {
            versions
                .iter()
                .find(|version| version.get("name").and_then(Value::as_str) == Some("v1"))
        })
        .and_then(|version| version.pointer("/schema/openAPIV3Schema"))
        .cloned()
        .ok_or_else(|| Error::SchemaVersionMissing(key.to_string()))
}

pub(super) fn compile(schema: &Value, key: &str) -> Result<Validator> {
    keywords::register(jsonschema::options().with_draft(Draft::Draft201909))
        .build(schema)
        .map_err(|err| Error::SchemaCompile {
            key: key.to_string(),
            message: err.to_string(),
        })
}
