mod route_configuration;

use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::{
    error::{Error, Result},
    resource::TargetResource,
};

pub use self::route_configuration::RouteConfigurationHandler;

/// subKind ごとの変換処理
pub trait Handler: Send + Sync {
    fn sub_kind(&self) -> &str;

    fn handle(&self, document: &Value) -> Result<Vec<TargetResource>>;
}

/// 出力するリソースの組み合わせ
#[derive(Debug, Default, ValueEnum, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// HTTPRoute のみ
    #[default]
    GatewayApi,

    /// HTTPRoute に加えて DestinationRule / ServiceEntry
    Istio,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

/// 起動時に一度だけ構築し、以降は変更しない
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.handlers.keys().collect();
        keys.sort();

        f.debug_struct("HandlerRegistry")
            .field("sub_kinds", &keys)
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Result<Self> {
        let mut map: HashMap<String, Box<dyn Handler>> = HashMap::with_capacity(handlers.len());

        for handler in handlers {
            let key = handler.sub_kind().to_string();

            if map.contains_key(&key) {
                return Err(Error::DuplicateHandler(key));
            }

            map.insert(key, handler);
        }

        Ok(Self { handlers: map })
    }

    pub fn builtin(profile: Profile) -> Result<Self> {
        Self::new(vec![Box::new(RouteConfigurationHandler::new(profile))])
    }

    /// 大文字小文字を区別して検索する
    pub fn get(&self, sub_kind: &str) -> Option<&dyn Handler> {
        self.handlers.get(sub_kind).map(|handler| handler.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
