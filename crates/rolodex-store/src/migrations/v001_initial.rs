//! v001 -- Initial schema creation.
//!
//! Creates the `contacts` table together with its indexes.  The unique index
//! on `phone` is what rejects a duplicate that slips past the
//! application-level pre-check.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Contacts
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS contacts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    phone       TEXT NOT NULL,
    email       TEXT,
    category    TEXT NOT NULL,
    avatar      TEXT,
    create_time TEXT NOT NULL                 -- ISO-8601 / RFC-3339
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_contacts_phone ON contacts(phone);
CREATE INDEX IF NOT EXISTS idx_contacts_name ON contacts(name);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
