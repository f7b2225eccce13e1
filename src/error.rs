use std::path::PathBuf;

use thiserror::Error as TError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, TError)]
pub enum Error {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// legacy の spec を型にバインドできなかった
    #[error("malformed {sub_kind} document: {source}")]
    Binding {
        sub_kind: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("schema file name must not be blank")]
    InvalidSchemaKey,

    #[error("schema resource not found: {0}")]
    SchemaNotFound(String),

    #[error("v1 schema not found in CRD: {0}")]
    SchemaVersionMissing(String),

    #[error("failed to compile CRD schema {key}: {message}")]
    SchemaCompile { key: String, message: String },

    #[error("duplicate handler for subKind: {0}")]
    DuplicateHandler(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 入力データではなくビルド・配置の不備を示すエラーか
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSchemaKey
                | Self::SchemaNotFound(_)
                | Self::SchemaVersionMissing(_)
                | Self::SchemaCompile { .. }
                | Self::DuplicateHandler(_)
        )
    }
}
