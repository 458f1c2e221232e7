//! User entity - Read-only account data.
//!
//! Users are seeded out of scope and never mutated by this core; they exist to
//! authenticate callers and attribute pledges. Passwords are stored and compared
//! in plaintext, which is accepted as given for this system.

use crate::errors::Result;
use crate::store::StoreRecord;
use csv::StringRecord;

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier for the user
    pub user_id: String,
    /// Login name, unique across the collection
    pub username: String,
    /// Contact email address
    pub email: String,
    /// Plaintext password, compared byte-for-byte
    pub password: String,
}

impl StoreRecord for User {
    const FILE_NAME: &'static str = "users.csv";
    const HEADERS: &'static [&'static str] = &["userId", "username", "email", "password"];

    fn key(&self) -> &str {
        &self.user_id
    }

    fn from_record(record: &StringRecord) -> Result<Self> {
        let f = |idx, column| super::field(record, idx, Self::FILE_NAME, column);
        Ok(Self {
            user_id: f(0, "userId")?.to_string(),
            username: f(1, "username")?.to_string(),
            email: f(2, "email")?.to_string(),
            password: f(3, "password")?.to_string(),
        })
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.username.clone(),
            self.email.clone(),
            self.password.clone(),
        ]
    }
}
