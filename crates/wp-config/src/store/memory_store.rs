use crate::{ConfigError, ConfigErrorResult, ConfigStore};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            values: Arc::new(Mutex::new(map)),
        }
    }

    fn lock(&self) -> ConfigErrorResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| ConfigError::store("memory store lock poisoned"))
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> ConfigErrorResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ConfigErrorResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn entries(&self) -> ConfigErrorResult<Vec<(String, String)>> {
        Ok(self
            .lock()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
