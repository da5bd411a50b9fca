//! Key/value store backing per-feature variables.
//!
//! Values are plain strings; typed interpretation lives in
//! [`crate::SupervisorSettings`]. Writes to different keys never clobber
//! each other; concurrent writes to the same key leave the last one.

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::ConfigErrorResult;

pub trait ConfigStore {
    /// Value for `key`, or `None` when it was never set.
    fn get(&self, key: &str) -> ConfigErrorResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ConfigErrorResult<()>;

    /// All key/value pairs, sorted by key.
    fn entries(&self) -> ConfigErrorResult<Vec<(String, String)>>;
}
