use std::sync::Arc;
use uuid::Uuid;

use crate::models::users::User;
use crate::repositories::UserRepository;
use crate::utils::errors::app_error::AppError;

#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, AppError> {
        self.user_repository
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))
    }

    /// Resolves a bearer token. Unknown and expired sessions resolve to `None`.
    pub async fn find_user_by_session(&self, token: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.user_repository.find_user_by_session(token).await
    }
}
