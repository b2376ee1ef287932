use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{User, UserUpdateRequest},
    policy::{self, Action},
    repository::RepositoryState,
};

/// UserService
///
/// Read and maintenance access to the identity records. Users are created by the
/// identity subsystem, never here.
#[derive(Clone)]
pub struct UserService {
    repo: RepositoryState,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl UserService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    async fn load(&self, id: Uuid) -> AppResult<User> {
        self.repo
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub async fn current_user(&self, caller: &AuthUser) -> AppResult<User> {
        self.load(caller.id).await
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.load(id).await
    }

    pub async fn list_users(&self, caller: &AuthUser) -> AppResult<Vec<User>> {
        policy::authorize(caller, Action::ListUsers)?;
        self.repo.list_users().await
    }

    /// Updates email and names. Blank or absent fields are ignored; an email held by
    /// another user is a Conflict.
    pub async fn update_user(
        &self,
        caller: &AuthUser,
        id: Uuid,
        request: UserUpdateRequest,
    ) -> AppResult<User> {
        let email = non_blank(request.email);
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(AppError::validation("Email must be a valid address"));
            }
        }

        let mut user = self.load(id).await?;
        policy::authorize(caller, Action::UpdateUser { user_id: id })?;

        if let Some(email) = email {
            if email != user.email {
                if let Some(holder) = self.repo.find_user_by_email(&email).await? {
                    if holder.id != id {
                        return Err(AppError::Conflict("Email already taken".to_string()));
                    }
                }
                user.email = email;
            }
        }
        if let Some(first_name) = non_blank(request.first_name) {
            user.first_name = first_name;
        }
        if let Some(last_name) = non_blank(request.last_name) {
            user.last_name = last_name;
        }

        // The repository re-checks email uniqueness atomically with the write.
        if !self.repo.update_user(&user).await? {
            return Err(AppError::not_found("User", id));
        }
        tracing::info!(user_id = %id, caller = %caller.id, "user updated");
        Ok(user)
    }

    /// Deletes the user together with their places and reviews.
    pub async fn delete_user(&self, caller: &AuthUser, id: Uuid) -> AppResult<()> {
        self.load(id).await?;
        policy::authorize(caller, Action::DeleteUser { user_id: id })?;

        if !self.repo.delete_user(id).await? {
            return Err(AppError::not_found("User", id));
        }
        tracing::info!(user_id = %id, caller = %caller.id, "user deleted");
        Ok(())
    }
}
