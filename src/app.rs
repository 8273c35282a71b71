use {
    crate::{
        error::{PersistenceError, PreferenceError},
        persistence::{absolute, PersistenceAdapter},
        prefs::Preferences,
        store::ContactStore,
    },
    log::info,
    std::path::{Path, PathBuf},
};

pub const APP_NAME: &str = "AgendaApp";

/// Title to show for the given current file.
pub fn window_title(file_path: Option<&Path>) -> String {
    match file_path.and_then(Path::file_name) {
        Some(name) => format!("{APP_NAME} - {}", name.to_string_lossy()),
        None => APP_NAME.to_owned(),
    }
}

/// Application state: the contact list, the file it belongs to and the adapter
/// that moves it to and from disk.
///
/// A failed open or save leaves all of this untouched.
#[derive(Debug)]
pub struct Agenda<P> {
    store: ContactStore,
    persistence: PersistenceAdapter<P>,
    file_path: Option<PathBuf>,
}

impl<P: Preferences> Agenda<P> {
    pub fn new(preferences: P) -> Self {
        Self {
            store: ContactStore::new(),
            persistence: PersistenceAdapter::new(preferences),
            file_path: None,
        }
    }

    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ContactStore {
        &mut self.store
    }

    pub fn persistence(&self) -> &PersistenceAdapter<P> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut PersistenceAdapter<P> {
        &mut self.persistence
    }

    /// The file the contact list was last read from or written to.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn title(&self) -> String {
        window_title(self.file_path())
    }

    /// Replace the contact list with the contents of `path`.
    pub fn open(&mut self, path: &Path) -> Result<(), PersistenceError> {
        let persons = self.persistence.load(path)?;
        self.store.replace_all(persons);
        self.file_path = Some(absolute(path));
        Ok(())
    }

    /// Write the contact list to `path`, which then becomes the current file.
    pub fn save_as(&mut self, path: &Path) -> Result<(), PersistenceError> {
        self.persistence.save(self.store.persons(), path)?;
        self.file_path = Some(absolute(path));
        Ok(())
    }

    /// Open the file named by the last-file-path preference, if there is one.
    pub fn reopen_last(&mut self) -> Result<Option<PathBuf>, PersistenceError> {
        let Some(path) = self.persistence.last_path() else {
            return Ok(None);
        };
        info!("Reopening {}", path.display());
        self.open(&path)?;
        Ok(Some(path))
    }

    /// Start over with an empty list that belongs to no file.
    ///
    /// The last-file-path preference keeps pointing at the previous file.
    pub fn new_document(&mut self) {
        self.store.replace_all(Vec::new());
        self.file_path = None;
    }

    pub fn forget_last_path(&mut self) -> Result<(), PreferenceError> {
        self.persistence.set_last_path(None)?;
        self.file_path = None;
        Ok(())
    }
}
