//! Address book core: an ordered list of persons, its XML file format and the
//! bookkeeping of which file was used last.

mod app;
mod error;
mod json;
mod persistence;
mod person;
mod prefs;
mod stats;
mod store;
mod xml;

pub use {
    app::{window_title, Agenda, APP_NAME},
    error::{DocumentError, ErrorKind, PersistenceError, PreferenceError, ValidationError},
    json::persons_to_json,
    persistence::{PersistenceAdapter, PersistenceListener},
    person::{format_date, parse_date, Person, PersonForm, DISPLAY_DATE_FORMAT},
    prefs::{FilePreferences, MemoryPreferences, Preferences, LAST_FILE_PATH_KEY},
    stats::birthday_histogram,
    store::{ContactStore, StoreEvent},
    xml::{persons_from_xml, persons_to_xml},
};
