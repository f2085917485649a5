use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{NewUser, UserModel};
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: NewUser) -> Result<UserModel, AppError>;
    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError>;
    /// Identity lookup used to resolve a token subject
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserModel>, AppError>;
    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<UserModel>, AppError>;
    async fn update_user(&self, user: &UserModel) -> Result<UserModel, AppError>;
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError>;
}

struct UserTable {
    next_id: i64,
    rows: BTreeMap<i64, UserModel>,
}

/// In-memory implementation of UserRepository for development and testing
///
/// Enforces the same username/email uniqueness as the database schema.
/// Data is lost when the application restarts.
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(UserTable {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// Returns the current number of users in the repository
    pub async fn user_count(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

fn conflicts_with(existing: &UserModel, username: &str, email: &str) -> bool {
    existing.username == username || existing.email == email
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: NewUser) -> Result<UserModel, AppError> {
        let mut table = self.table.write().await;

        if table
            .rows
            .values()
            .any(|existing| conflicts_with(existing, &user.username, &user.email))
        {
            warn!("User already exists in memory");
            return Err(AppError::Conflict(
                "Username or Email already exists".to_string(),
            ));
        }

        let id = table.next_id;
        table.next_id += 1;
        let model = UserModel::from_new(id, user);
        table.rows.insert(id, model.clone());

        debug!(user_id = id, "User created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError> {
        Ok(self.table.read().await.rows.get(&user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserModel>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| conflicts_with(u, username, email))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<UserModel>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn update_user(&self, user: &UserModel) -> Result<UserModel, AppError> {
        let mut table = self.table.write().await;

        if !table.rows.contains_key(&user.id) {
            warn!("User not found for update in memory");
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if table
            .rows
            .values()
            .any(|other| other.id != user.id && conflicts_with(other, &user.username, &user.email))
        {
            warn!("User update collides with another user");
            return Err(AppError::Conflict(
                "Username or Email already exists".to_string(),
            ));
        }

        table.rows.insert(user.id, user.clone());
        debug!("User updated in memory");
        Ok(user.clone())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        if table.rows.remove(&user_id).is_none() {
            warn!("User not found for deletion in memory");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!("User deleted from memory");
        Ok(())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: NewUser) -> Result<UserModel, AppError> {
        let model = sqlx::query_as::<_, UserModel>(&format!(
            "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await?;

        debug!(user_id = model.id, "User created in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $2 ORDER BY id LIMIT 1",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<UserModel>, AppError> {
        let users = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {} FROM users ORDER BY id OFFSET $1 LIMIT $2",
            USER_COLUMNS
        ))
        .bind(i64::from(skip))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn update_user(&self, user: &UserModel) -> Result<UserModel, AppError> {
        let updated = sqlx::query_as::<_, UserModel>(&format!(
            "UPDATE users SET username = $2, email = $3, password = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| {
            warn!("User not found for update");
            AppError::NotFound("User not found".to_string())
        })
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!("User not found for deletion");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!("User deleted from database");
        Ok(())
    }
}
