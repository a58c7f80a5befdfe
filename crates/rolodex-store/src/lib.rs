//! # rolodex-store
//!
//! Relational storage for contact records, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for the contact
//! table. Schema migrations run automatically on open, and the phone
//! uniqueness invariant is enforced here — by an explicit pre-check and by
//! the table's unique index as the final authority.

pub mod contacts;
pub mod database;
pub mod migrations;
pub mod models;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
