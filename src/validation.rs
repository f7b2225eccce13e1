//! CRD の openAPIV3Schema による出力リソースの検証
//!
//! スキーマは初回利用時にコンパイルし、[`SchemaCache`] に保持する。
//! 検証で見つかった問題は報告のみで、出力は止めない。

mod cache;
mod keywords;
mod schema;

use std::{fmt, sync::Arc};

use log::error;
use serde_json::Value;

use crate::{
    error::{Error, Result},
    resource::TargetResource,
    template::contains_template,
};

pub use self::cache::SchemaCache;
pub use self::schema::{schema_key, BundledSchemas, SchemaDirectory, SchemaSource};

/// スキーマ違反1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    /// JSON Pointer 形式 (`/spec/rules/0`)
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };

        write!(f, "{}: {}", path, self.message)
    }
}

pub struct ResourceValidator {
    source: Box<dyn SchemaSource>,
    cache: Arc<SchemaCache>,
}

impl fmt::Debug for ResourceValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceValidator")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ResourceValidator {
    pub fn new(source: Box<dyn SchemaSource>, cache: Arc<SchemaCache>) -> Self {
        Self { source, cache }
    }

    pub fn bundled() -> Self {
        Self::new(Box::new(BundledSchemas), Arc::new(SchemaCache::default()))
    }

    /// `Err` はスキーマが見つからない・壊れているなどの環境の問題のみ
    pub fn validate(&self, instance: &Value, key: &str) -> Result<Vec<ValidationMessage>> {
        if key.trim().is_empty() {
            return Err(Error::InvalidSchemaKey);
        }

        let validator = self.cache.get_or_try_insert(key, || {
            let crd = self.source.load(key)?;
            let schema = schema::v1_schema(&crd, key)?;
            schema::compile(&schema, key)
        })?;

        let messages = validator
            .iter_errors(instance)
            // テンプレート式はレンダリング後に決まるので型やパターンの違反は無視する
            .filter(|err| !matches!(&*err.instance, Value::String(s) if contains_template(s)))
            .map(|err| ValidationMessage {
                path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();

        Ok(messages)
    }

    pub fn validate_resource(&self, resource: &TargetResource) -> Result<Vec<ValidationMessage>> {
        let key = schema_key(&resource.api_version(), &resource.kind());
        let instance = resource.to_json()?;

        let messages = self.validate(&instance, &key)?;

        if !messages.is_empty() {
            let details: Vec<String> = messages.iter().map(|m| format!(" - {}", m)).collect();

            error!(
                "Resource validation failed for {}:\n{}",
                resource.display_name(),
                details.join("\n")
            );
        }

        Ok(messages)
    }
}
