use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the users table
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub email: String,    // Also the token subject
    pub password: String, // Argon2 PHC string, never plaintext
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields needed to insert a user; the store assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserModel {
    /// Builds the stored row for a newly inserted user
    pub fn from_new(id: i64, new_user: NewUser) -> Self {
        Self {
            id,
            username: new_user.username,
            email: new_user.email,
            password: new_user.password,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Stamps the row as modified
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
