use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use jsonschema::Validator;

use crate::error::Result;

/// コンパイル済みスキーマのキャッシュ
///
/// コンパイルはロックの外で行うため、同じキーを同時にコンパイルすることはあるが、
/// 登録されるのは最初に書き込んだ 1 つだけ。
#[derive(Default)]
pub struct SchemaCache {
    inner: RwLock<HashMap<String, Arc<Validator>>>,
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);

        f.debug_struct("SchemaCache")
            .field("keys", &inner.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaCache {
    pub fn get_or_try_insert<F>(&self, key: &str, compile: F) -> Result<Arc<Validator>>
    where
        F: FnOnce() -> Result<Validator>,
    {
        if let Some(validator) = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(validator.clone());
        }

        let compiled = Arc::new(compile()?);

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        Ok(inner.entry(key.to_string()).or_insert(compiled).clone())
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
