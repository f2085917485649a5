use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::NewUser,
    repository::UserRepository,
    types::{UserList, UserPublic, UserSchema},
};
use crate::{
    security::{AuthService, CurrentUser},
    shared::AppError,
    todo::repository::TodoRepository,
};

/// Service for user registration and self-service account changes
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    todo_repository: Arc<dyn TodoRepository + Send + Sync>,
    auth_service: Arc<AuthService>,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        todo_repository: Arc<dyn TodoRepository + Send + Sync>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            repository,
            todo_repository,
            auth_service,
        }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: UserSchema) -> Result<UserPublic, AppError> {
        if let Some(existing) = self
            .repository
            .find_by_username_or_email(&request.username, &request.email)
            .await?
        {
            let field = if existing.username == request.username {
                "Username"
            } else {
                "Email"
            };
            warn!(field, "Registration rejected: duplicate");
            return Err(AppError::BadRequest(format!("{} already exists", field)));
        }

        let password = self.auth_service.hash_password(&request.password).await?;
        let user = self
            .repository
            .create_user(NewUser {
                username: request.username,
                email: request.email,
                password,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, skip: u32, limit: u32) -> Result<UserList, AppError> {
        let users = self.repository.list_users(skip, limit).await?;
        Ok(UserList {
            users: users.into_iter().map(UserPublic::from).collect(),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i64) -> Result<UserPublic, AppError> {
        self.repository
            .get_user(user_id)
            .await?
            .map(UserPublic::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Replaces the caller's own username, email and password
    #[instrument(skip(self, current_user, request), fields(current_user_id = current_user.id()))]
    pub async fn update_user(
        &self,
        current_user: CurrentUser,
        user_id: i64,
        request: UserSchema,
    ) -> Result<UserPublic, AppError> {
        ensure_self(&current_user, user_id)?;

        let mut user = current_user.into_inner();
        user.username = request.username;
        user.email = request.email;
        user.password = self.auth_service.hash_password(&request.password).await?;
        user.touch();

        let updated = self.repository.update_user(&user).await?;
        info!("User updated");
        Ok(updated.into())
    }

    /// Deletes the caller's own account together with their todos
    #[instrument(skip(self, current_user), fields(current_user_id = current_user.id()))]
    pub async fn delete_user(
        &self,
        current_user: CurrentUser,
        user_id: i64,
    ) -> Result<UserPublic, AppError> {
        ensure_self(&current_user, user_id)?;

        let removed_todos = self.todo_repository.delete_todos_for_user(user_id).await?;
        self.repository.delete_user(user_id).await?;

        info!(removed_todos, "User deleted");
        Ok(current_user.into_inner().into())
    }
}

fn ensure_self(current_user: &CurrentUser, user_id: i64) -> Result<(), AppError> {
    if current_user.id() != user_id {
        warn!(target_user_id = user_id, "Attempt to modify another user");
        return Err(AppError::Forbidden("Not enough permission".to_string()));
    }
    Ok(())
}
