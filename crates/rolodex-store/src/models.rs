//! Domain model structs persisted in the contacts database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the HTTP layer as a JSON body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// A single contact record as persisted in the `contacts` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    /// Store-assigned primary key, immutable after creation.
    pub id: i64,
    /// Display name, 1-50 characters.
    pub name: String,
    /// Phone number, 11-20 characters, unique across all contacts.
    pub phone: String,
    /// Optional email address.
    pub email: Option<String>,
    /// Free-form category label ("family", "colleague", ...).
    pub category: String,
    /// Optional reference to a stored avatar image (e.g.
    /// `/static/avatars/13800138000_me.png`).
    pub avatar: Option<String>,
    /// Timestamp assigned at creation, immutable thereafter.
    pub create_time: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// NewContact (client input)
// ---------------------------------------------------------------------------

/// The client-supplied subset of a contact.  `id` and `create_time` are
/// always assigned by the store, never by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub category: String,
    /// Reference produced by the avatar store.  Not validated here -- it is
    /// never raw client input.
    pub avatar: Option<String>,
}

impl NewContact {
    /// Validate all client-supplied fields.  The first failing field wins.
    ///
    /// Length bounds are counted in characters, not bytes, so multi-byte
    /// names are not penalized.
    pub fn validate(&self) -> Result<()> {
        let name_len = self.name.chars().count();
        if name_len < 1 || name_len > 50 {
            return Err(StoreError::Invalid {
                field: "name",
                message: format!("must be 1-50 characters, got {}", name_len),
            });
        }

        let phone_len = self.phone.chars().count();
        if phone_len < 11 || phone_len > 20 {
            return Err(StoreError::Invalid {
                field: "phone",
                message: format!("must be 11-20 characters, got {}", phone_len),
            });
        }

        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(StoreError::Invalid {
                    field: "email",
                    message: format!("'{}' is not a valid email address", email),
                });
            }
        }

        if self.category.is_empty() {
            return Err(StoreError::Invalid {
                field: "category",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Check an email address against the accepted grammar: a non-empty local
/// part, a single `@`, and a domain containing at least one dot with no
/// empty labels.
fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewContact {
        NewContact {
            name: "Alice".to_string(),
            phone: "12345678901".to_string(),
            email: Some("alice@example.com".to_string()),
            category: "friend".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        let mut input = valid_input();
        input.name = String::new();
        assert!(matches!(
            input.validate(),
            Err(StoreError::Invalid { field: "name", .. })
        ));
    }

    #[test]
    fn rejects_name_over_50_chars() {
        let mut input = valid_input();
        input.name = "x".repeat(51);
        assert!(matches!(
            input.validate(),
            Err(StoreError::Invalid { field: "name", .. })
        ));

        // 50 exactly is fine
        input.name = "x".repeat(50);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn name_length_counts_chars_not_bytes() {
        let mut input = valid_input();
        input.name = "王".repeat(50);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn rejects_short_phone() {
        let mut input = valid_input();
        input.phone = "1234567890".to_string(); // 10 chars
        assert!(matches!(
            input.validate(),
            Err(StoreError::Invalid { field: "phone", .. })
        ));
    }

    #[test]
    fn rejects_long_phone() {
        let mut input = valid_input();
        input.phone = "1".repeat(21);
        assert!(matches!(
            input.validate(),
            Err(StoreError::Invalid { field: "phone", .. })
        ));

        input.phone = "1".repeat(20);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn email_is_optional() {
        let mut input = valid_input();
        input.email = None;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in [
            "",
            "no-at-sign",
            "@example.com",
            "alice@",
            "alice@nodot",
            "alice@a@b.com",
            "alice@.com",
            "alice@example.",
            "ali ce@example.com",
        ] {
            let mut input = valid_input();
            input.email = Some(bad.to_string());
            assert!(
                matches!(
                    input.validate(),
                    Err(StoreError::Invalid { field: "email", .. })
                ),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn accepts_reasonable_emails() {
        for good in ["a@b.c", "alice.b@mail.example.com", "x+tag@sub.domain.org"] {
            let mut input = valid_input();
            input.email = Some(good.to_string());
            assert!(input.validate().is_ok(), "expected '{}' to be accepted", good);
        }
    }

    #[test]
    fn rejects_empty_category() {
        let mut input = valid_input();
        input.category = String::new();
        assert!(matches!(
            input.validate(),
            Err(StoreError::Invalid { field: "category", .. })
        ));
    }

    #[test]
    fn category_is_free_form() {
        let mut input = valid_input();
        input.category = "emergency-plumber".to_string();
        assert!(input.validate().is_ok());
    }
}
