use crate::{ConfigError, ConfigErrorResult, ConfigStore};

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use toml::{Table, Value};

const LOCK_EXTENSION: &str = "lock";

/// TOML-backed store: one table per feature namespace.
///
/// ```toml
/// [live-wallpaper]
/// command = '["mpv", "--loop", "video.mp4"]'
/// startNow = "true"
/// port = "41873"
/// ```
///
/// Every `set` is a read-modify-write of the whole file, serialized across
/// processes by an exclusive lock on a sidecar `<name>.lock` file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    namespace: String,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn read_document(&self) -> ConfigErrorResult<Table> {
        if !self.path.exists() {
            return Ok(Table::new());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: self.path.clone(),
            source: e,
        })
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn ensure_dir(&self) -> ConfigErrorResult<()> {
        let dir = self.dir();
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Exclusive lock on the sidecar file; released when the handle drops.
    fn lock(&self) -> ConfigErrorResult<File> {
        let lock_path = self.path.with_extension(LOCK_EXTENSION);
        let io_error = |e: std::io::Error| ConfigError::Io {
            path: lock_path.clone(),
            source: e,
        };

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_error)?;
        file.lock_exclusive().map_err(io_error)?;

        Ok(file)
    }

    fn write_document(&self, document: &Table) -> ConfigErrorResult<()> {
        let content = toml::to_string(document).map_err(|e| ConfigError::TomlWrite {
            path: self.path.clone(),
            source: e,
        })?;

        // Unique temp file in the same directory, then an atomic rename.
        let dir = self.dir();
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| ConfigError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        temp.write_all(content.as_bytes()).map_err(|e| ConfigError::Io {
            path: temp.path().to_path_buf(),
            source: e,
        })?;
        temp.persist(&self.path).map_err(|e| ConfigError::Io {
            path: self.path.clone(),
            source: e.error,
        })?;

        Ok(())
    }

    fn section(&self, document: &Table) -> ConfigErrorResult<Option<Table>> {
        match document.get(&self.namespace) {
            None => Ok(None),
            Some(Value::Table(table)) => Ok(Some(table.clone())),
            Some(_) => Err(ConfigError::store(format!(
                "[{}] in {} is not a table",
                self.namespace,
                self.path.display()
            ))),
        }
    }

    fn value_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str) -> ConfigErrorResult<Option<String>> {
        let document = self.read_document()?;
        let section = self.section(&document)?;

        Ok(section
            .as_ref()
            .and_then(|table| table.get(key))
            .map(Self::value_to_string))
    }

    fn set(&self, key: &str, value: &str) -> ConfigErrorResult<()> {
        self.ensure_dir()?;
        let _lock = self.lock()?;

        let mut document = self.read_document()?;
        let mut section = self.section(&document)?.unwrap_or_default();

        section.insert(key.to_string(), Value::String(value.to_string()));
        document.insert(self.namespace.clone(), Value::Table(section));

        self.write_document(&document)
    }

    fn entries(&self) -> ConfigErrorResult<Vec<(String, String)>> {
        let document = self.read_document()?;
        let section = self.section(&document)?.unwrap_or_default();

        let mut entries: Vec<(String, String)> = section
            .iter()
            .map(|(key, value)| (key.clone(), Self::value_to_string(value)))
            .collect();
        entries.sort();

        Ok(entries)
    }
}
