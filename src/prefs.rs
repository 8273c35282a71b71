//! Per-user key/value preferences.

use {
    crate::{error::PreferenceError, persistence::write_atomic},
    log::debug,
    std::{
        collections::BTreeMap,
        fs,
        io::{self, ErrorKind},
        path::{Path, PathBuf},
    },
};

/// Key under which the path of the last opened or saved contact file is stored.
pub const LAST_FILE_PATH_KEY: &str = "filePath";

pub trait Preferences {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;

    /// Delete `key`. Removing a key that is not set is not an error.
    fn remove(&mut self, key: &str) -> Result<(), PreferenceError>;
}

/// Preferences that live only as long as the value.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Preferences stored as a JSON object in a file.
///
/// The file is rewritten on every change. A missing file is treated as empty.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();
        let values: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|source| PreferenceError::Corrupt {
                    path: path.clone(),
                    source,
                })?,
            Err(error) if error.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PreferenceError::Io { path, source }),
        };
        debug!("Opened preferences at {}", path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        let io_error = |source: io::Error| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let contents = serde_json::to_vec_pretty(&self.values).map_err(|source| {
            PreferenceError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        write_atomic(&self.path, &contents).map_err(io_error)
    }
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let previous = self.values.insert(key.to_owned(), value.to_owned());
        if let Err(error) = self.persist() {
            match previous {
                Some(previous) => self.values.insert(key.to_owned(), previous),
                None => self.values.remove(key),
            };
            return Err(error);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        let Some(previous) = self.values.remove(key) else {
            return Ok(());
        };
        if let Err(error) = self.persist() {
            self.values.insert(key.to_owned(), previous);
            return Err(error);
        }
        Ok(())
    }
}
