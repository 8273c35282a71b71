use {
    crate::{
        error::{DocumentError, PersistenceError, PreferenceError},
        prefs::{Preferences, LAST_FILE_PATH_KEY},
        xml, Person,
    },
    log::{info, warn},
    std::{
        fmt, fs,
        io::{self, Write},
        path::{self, Path, PathBuf},
        process,
        time::{SystemTime, UNIX_EPOCH},
    },
};

/// Observer of the persistence adapter's outcomes.
///
/// Front ends use this to keep a title bar in sync and to show errors. Every
/// method has an empty default.
pub trait PersistenceListener {
    fn file_opened(&mut self, _path: &Path) {}
    fn file_saved(&mut self, _path: &Path) {}
    fn load_failed(&mut self, _error: &PersistenceError) {}
    fn save_failed(&mut self, _error: &PersistenceError) {}
}

/// Reads and writes contact files and remembers the last one used.
pub struct PersistenceAdapter<P> {
    preferences: P,
    listeners: Vec<Box<dyn PersistenceListener>>,
}

impl<P: Preferences> PersistenceAdapter<P> {
    pub fn new(preferences: P) -> Self {
        Self {
            preferences,
            listeners: Vec::new(),
        }
    }

    pub fn add_listener<L: PersistenceListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    /// Read the persons stored at `path`.
    ///
    /// On success `path` becomes the last-file-path preference.
    pub fn load(&mut self, path: &Path) -> Result<Vec<Person>, PersistenceError> {
        match read_persons(path) {
            Ok(persons) => {
                info!("Loaded {} contacts from {}", persons.len(), path.display());
                let path = absolute(path);
                self.remember(&path);
                for listener in &mut self.listeners {
                    listener.file_opened(&path);
                }
                Ok(persons)
            }
            Err(error) => {
                warn!("{error}");
                for listener in &mut self.listeners {
                    listener.load_failed(&error);
                }
                Err(error)
            }
        }
    }

    /// Write `persons`, in order, to `path`.
    ///
    /// The previous file stays intact unless the whole document was written. On
    /// success `path` becomes the last-file-path preference.
    pub fn save<'a, I>(&mut self, persons: I, path: &Path) -> Result<(), PersistenceError>
    where
        I: IntoIterator<Item = &'a Person>,
    {
        match write_persons(persons, path) {
            Ok(count) => {
                info!("Saved {count} contacts to {}", path.display());
                let path = absolute(path);
                self.remember(&path);
                for listener in &mut self.listeners {
                    listener.file_saved(&path);
                }
                Ok(())
            }
            Err(error) => {
                warn!("{error}");
                for listener in &mut self.listeners {
                    listener.save_failed(&error);
                }
                Err(error)
            }
        }
    }

    pub fn last_path(&self) -> Option<PathBuf> {
        self.preferences.get(LAST_FILE_PATH_KEY).map(PathBuf::from)
    }

    /// Store `path` as the last-file-path preference, or remove the preference
    /// entirely when `path` is `None`.
    ///
    /// Preferences hold text, so a path that is not valid UTF-8 is refused
    /// rather than stored in an altered form.
    pub fn set_last_path(&mut self, path: Option<&Path>) -> Result<(), PreferenceError> {
        match path {
            Some(path) => {
                let value = path.to_str().ok_or_else(|| PreferenceError::NonUtf8Path {
                    path: path.to_path_buf(),
                })?;
                self.preferences.set(LAST_FILE_PATH_KEY, value)
            }
            None => self.preferences.remove(LAST_FILE_PATH_KEY),
        }
    }

    /// A file was read or written, so failing to note that is not fatal.
    fn remember(&mut self, path: &Path) {
        if let Err(error) = self.set_last_path(Some(path)) {
            warn!("Could not remember {}: {error}", path.display());
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for PersistenceAdapter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("preferences", &self.preferences)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn read_persons(path: &Path) -> Result<Vec<Person>, PersistenceError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => PersistenceError::NotFound {
            path: path.to_path_buf(),
        },
        _ => PersistenceError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let malformed = |source: DocumentError| PersistenceError::Malformed {
        path: path.to_path_buf(),
        source,
    };
    let document = std::str::from_utf8(&bytes)
        .map_err(DocumentError::from)
        .map_err(malformed)?;
    xml::persons_from_xml(document).map_err(malformed)
}

fn write_persons<'a, I>(persons: I, path: &Path) -> Result<usize, PersistenceError>
where
    I: IntoIterator<Item = &'a Person>,
{
    let write_failed = |source: io::Error| PersistenceError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let persons = persons.into_iter().collect::<Vec<_>>();
    let document = xml::persons_to_xml(persons.iter().copied())
        .map_err(|error| write_failed(io::Error::other(error)))?;
    write_atomic(path, document.as_bytes()).map_err(write_failed)?;
    Ok(persons.len())
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Replace the file at `path` with `contents`.
///
/// The data goes to a temporary file next to `path` which is synced and then
/// renamed over `path`, so readers see either the old or the new file. The
/// target is never removed first: `fs::rename` replaces an existing file in
/// one step on every platform (`rename(2)`, and `MoveFileExW` with
/// `MOVEFILE_REPLACE_EXISTING` on Windows).
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("path has no parent"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path has no file name"))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".{}.tmp.{}.{nanos}",
        file_name.to_string_lossy(),
        process::id()
    ));

    let result = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
