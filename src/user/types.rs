use serde::{Deserialize, Serialize};

use super::models::UserModel;

/// Request payload for registering or replacing a user
#[derive(Debug, Deserialize)]
pub struct UserSchema {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Public view of a user; never exposes the password hash
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<UserModel> for UserPublic {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserList {
    pub users: Vec<UserPublic>,
}

/// Pagination for GET /users
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}
