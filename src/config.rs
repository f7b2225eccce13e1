use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    handler::Profile,
    runner::{OutputMode, OutputWriter, DEFAULT_BACKUP_SUFFIX, DEFAULT_SIBLING_SUFFIX},
};

#[derive(Debug, Default)]
pub enum ConfigLoadOption {
    #[default]
    Default,

    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub sibling_suffix: String,
    pub backup_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            sibling_suffix: DEFAULT_SIBLING_SUFFIX.to_string(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

impl OutputConfig {
    pub fn writer(&self) -> OutputWriter {
        OutputWriter::new(self.mode, &self.sibling_suffix, &self.backup_suffix)
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enabled: bool,
    /// 未指定の場合は同梱の CRD を使う
    pub schema_dir: Option<PathBuf>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MappingConfig {
    pub profile: Profile,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// デフォルト値 <- 設定ファイル <- 環境変数 (`REMESH_`) の順に上書きする
    pub fn load(option: ConfigLoadOption) -> Result<Self> {
        let figment = Figment::new();

        let config: Self = match option {
            ConfigLoadOption::Default => figment.merge(Serialized::defaults(Self::default())),
            ConfigLoadOption::Path(path) => figment
                .merge(Serialized::defaults(Self::default()))
                .merge(Yaml::file(path)),
        }
        .merge(Env::prefixed("REMESH_").split("__"))
        .extract_lossy()
        .map_err(|err| Error::Config(err.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let OutputConfig {
            sibling_suffix,
            backup_suffix,
            ..
        } = &self.output;

        if sibling_suffix.is_empty() || backup_suffix.is_empty() {
            return Err(Error::Config(
                "output suffixes must not be empty".to_string(),
            ));
        }

        if sibling_suffix == backup_suffix {
            return Err(Error::Config(format!(
                "sibling_suffix and backup_suffix must differ: {}",
                sibling_suffix
            )));
        }

        Ok(())
    }
}
