use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The referenced contact does not exist.
    #[error("Contact not found")]
    NotFound,

    /// The phone number is already registered to another contact.
    #[error("Phone number already registered")]
    PhoneTaken,

    /// A client-supplied field failed validation.
    #[error("Invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
