use clap::Parser;
use std::path::PathBuf;

use crate::{
    config::{Config, ConfigLoadOption},
    handler::Profile,
    runner::OutputMode,
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Command {
    /// Directory to process (searched recursively for *.yaml / *.yml)
    #[arg(short, long, value_name = "DIR", default_value = ".", display_order = 1000)]
    pub dir: PathBuf,

    /// Validate produced resources against the CRD schemas
    #[arg(short, long, conflicts_with = "no_validate", display_order = 1000)]
    pub validate: bool,

    /// Disable validation (overrides the config file)
    #[arg(long, display_order = 1000)]
    pub no_validate: bool,

    /// Replace files in place (the original is kept as <name>_old)
    #[arg(short, long, display_order = 1000)]
    pub in_place: bool,

    /// Resources to generate
    #[arg(long, value_name = "gateway-api|istio", value_enum, display_order = 1000)]
    pub profile: Option<Profile>,

    /// Load CRD schemas from a directory instead of the bundled ones
    #[arg(long, value_name = "DIR", display_order = 1000)]
    pub schema_dir: Option<PathBuf>,

    /// Process files in parallel
    #[arg(short, long, display_order = 1000)]
    pub parallel: bool,

    /// Config file path
    #[arg(long, display_order = 1000)]
    pub config_file: Option<PathBuf>,

    /// Also write JSON logs to a file
    #[arg(long, value_name = "PATH", display_order = 1000)]
    pub log_file: Option<PathBuf>,
}

impl Command {
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn config_load_option(&self) -> ConfigLoadOption {
        // ロガーの初期化前に呼ばれるので標準エラーに出す
        if let Some(path) = &self.config_file {
            match path.try_exists() {
                Ok(true) => ConfigLoadOption::Path(path.clone()),
                Ok(false) => {
                    eprintln!("Config file not found: {:?}", path);

                    ConfigLoadOption::Default
                }
                Err(err) => {
                    eprintln!("Failed to check config file exists: {}", err);

                    ConfigLoadOption::Default
                }
            }
        } else {
            let Some(path) = xdg_config_home().map(|dir| dir.join("config.yaml")) else {
                return ConfigLoadOption::Default;
            };

            match path.try_exists() {
                Ok(true) => ConfigLoadOption::Path(path),
                Ok(false) => ConfigLoadOption::Default,
                Err(err) => {
                    eprintln!("Failed to check config file exists: {}", err);

                    ConfigLoadOption::Default
                }
            }
        }
    }

    /// 指定されたフラグで設定を上書きする
    pub fn override_config(&self, config: &mut Config) {
        if self.validate {
            config.validation.enabled = true;
        }

        if self.no_validate {
            config.validation.enabled = false;
        }

        if self.in_place {
            config.output.mode = OutputMode::InPlace;
        }

        if let Some(profile) = self.profile {
            config.mapping.profile = profile;
        }

        if let Some(dir) = &self.schema_dir {
            config.validation.schema_dir = Some(dir.clone());
        }

        if self.parallel {
            config.runner.parallel = true;
        }

        if let Some(path) = &self.log_file {
            config.logging.file = Some(path.clone());
        }
    }
}

fn xdg_config_home() -> Option<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME").map(|s| PathBuf::from(s).join("remesh")) {
        Some(path) => Some(path),
        None => dirs::home_dir().map(|home| home.join(".config").join("remesh")),
    }
}
