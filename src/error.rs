use {
    std::{io, num::ParseIntError, path::PathBuf, str::Utf8Error},
    thiserror::Error,
};

/// Coarse classification of a [`PersistenceError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    Unreadable,
    Malformed,
    WriteFailed,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Contact file {} does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read contact file {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Contact file {} is malformed", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("Failed to write contact file {}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PersistenceError::NotFound { .. } => ErrorKind::NotFound,
            PersistenceError::Unreadable { .. } => ErrorKind::Unreadable,
            PersistenceError::Malformed { .. } => ErrorKind::Malformed,
            PersistenceError::WriteFailed { .. } => ErrorKind::WriteFailed,
        }
    }
}

/// Reasons a document does not conform to the contact file format.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document is not valid UTF-8")]
    Encoding(#[from] Utf8Error),

    #[error("Invalid XML")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to serialize contacts")]
    Serialize(#[from] quick_xml::DeError),

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Expected root element <persons>, found <{0}>")]
    UnexpectedRoot(String),

    #[error("Unexpected element <{0}>")]
    UnexpectedElement(String),

    #[error("Unexpected text between elements")]
    UnexpectedText,

    #[error("Document ends inside an element")]
    UnexpectedEof,

    #[error("Missing element <{0}>")]
    MissingElement(&'static str),

    #[error("Element <{0}> appears more than once")]
    DuplicateElement(String),

    #[error("Invalid postal code \"{value}\"")]
    InvalidPostalCode {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Invalid birthday \"{value}\"")]
    InvalidBirthday {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to access preferences at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Path {} is not valid UTF-8 and cannot be stored", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("Preferences file {} is corrupt", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every problem found while validating a [`PersonForm`](crate::PersonForm), one
/// message per invalid field.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("{}", .messages.join("\n"))]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    pub(crate) fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}
