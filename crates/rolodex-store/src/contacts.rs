//! CRUD operations for [`Contact`] records.
//!
//! This module is the sole enforcer of the phone uniqueness invariant.
//! Every write pre-checks the phone against existing rows, and the unique
//! index on `contacts.phone` remains the final authority: a constraint
//! rejection from SQLite is mapped to [`StoreError::PhoneTaken`] so a racing
//! write that slips past the pre-check still fails cleanly.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Contact, NewContact};

const CONTACT_COLUMNS: &str = "id, name, phone, email, category, avatar, create_time";

impl Database {
    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List contacts in insertion order, skipping `skip` rows and returning
    /// at most `limit`.  An out-of-range `skip` yields an empty vec.
    pub fn list_contacts(&self, skip: i64, limit: i64) -> Result<Vec<Contact>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        ))?;

        let rows = stmt.query_map(params![limit, skip], row_to_contact)?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }

    /// Fetch a single contact by primary key.  A missing row is `None`, not
    /// an error.
    pub fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
        self.conn()
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                row_to_contact,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    /// Return every contact whose name or phone contains `keyword` as a
    /// case-sensitive substring.  The empty keyword matches all rows.
    pub fn search_contacts(&self, keyword: &str) -> Result<Vec<Contact>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE ?1 = '' OR instr(name, ?1) > 0 OR instr(phone, ?1) > 0
             ORDER BY id ASC"
        ))?;

        let rows = stmt.query_map(params![keyword], row_to_contact)?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new contact, assigning `id` and `create_time`, and return
    /// the persisted row.
    ///
    /// Fails with [`StoreError::PhoneTaken`] if the phone is already
    /// registered.
    pub fn create_contact(&self, input: &NewContact) -> Result<Contact> {
        if self.phone_taken(&input.phone, None)? {
            return Err(StoreError::PhoneTaken);
        }

        let create_time = Utc::now();
        self.conn()
            .execute(
                "INSERT INTO contacts (name, phone, email, category, avatar, create_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.name,
                    input.phone,
                    input.email,
                    input.category,
                    input.avatar,
                    create_time.to_rfc3339(),
                ],
            )
            .map_err(map_unique_violation)?;

        let id = self.conn().last_insert_rowid();
        tracing::debug!(id, phone = %input.phone, "contact created");

        // Re-read so the caller sees exactly what was persisted.
        self.get_contact(id)?.ok_or(StoreError::NotFound)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Overwrite every editable field of the contact with `id`.
    ///
    /// `create_time` is never altered.  If the phone changed, it is checked
    /// against all *other* rows first; fails with [`StoreError::PhoneTaken`]
    /// if taken and [`StoreError::NotFound`] if the row does not exist.
    pub fn update_contact(&self, id: i64, input: &NewContact) -> Result<Contact> {
        let existing = self.get_contact(id)?.ok_or(StoreError::NotFound)?;

        if input.phone != existing.phone && self.phone_taken(&input.phone, Some(id))? {
            return Err(StoreError::PhoneTaken);
        }

        // Full replace: every editable field, enumerated once.  Adding a
        // column means deliberately wiring it here.
        self.conn()
            .execute(
                "UPDATE contacts
                 SET name = ?1, phone = ?2, email = ?3, category = ?4, avatar = ?5
                 WHERE id = ?6",
                params![
                    input.name,
                    input.phone,
                    input.email,
                    input.category,
                    input.avatar,
                    id,
                ],
            )
            .map_err(map_unique_violation)?;

        tracing::debug!(id, "contact updated");

        self.get_contact(id)?.ok_or(StoreError::NotFound)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Permanently remove the contact with `id`.  Fails with
    /// [`StoreError::NotFound`] if no row matched.
    pub fn delete_contact(&self, id: i64) -> Result<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(id, "contact deleted");
        Ok(())
    }

    /// Check whether `phone` is registered to any contact other than
    /// `exclude` (used on update, where the row's own phone is not a
    /// conflict).
    fn phone_taken(&self, phone: &str, exclude: Option<i64>) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM contacts WHERE phone = ?1 AND (?2 IS NULL OR id != ?2)",
            params![phone, exclude],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a unique-index rejection to [`StoreError::PhoneTaken`].
///
/// The only unique constraint on the table is the phone index, so any
/// constraint violation on insert/update means the pre-check lost a race.
fn map_unique_violation(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return StoreError::PhoneTaken;
        }
    }
    StoreError::Sqlite(e)
}

/// Map a `rusqlite::Row` to a [`Contact`].
fn row_to_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    let created_str: String = row.get(6)?;
    let create_time: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        category: row.get(4)?,
        avatar: row.get(5)?,
        create_time,
    })
}
