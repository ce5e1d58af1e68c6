//! Read access to human user profiles.

use std::sync::Arc;

use async_trait::async_trait;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{Caller, User, UserId};

/// Repository port for user reads.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by their unique identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;
}

/// Application service for user profiles.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Finds a user by identifier.
    pub async fn find_user(&self, user_id: UserId) -> AppResult<User> {
        self.repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))
    }

    /// Returns the profile of a human caller. Machine callers have none.
    pub async fn caller_profile(&self, caller: &Caller) -> AppResult<User> {
        match caller {
            Caller::User(user_id) => self.find_user(*user_id).await,
            Caller::ApiKey(_) => Err(AppError::NotFound(
                "api key callers have no user profile".to_owned(),
            )),
        }
    }
}
