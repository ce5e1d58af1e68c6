use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use skyscraper_core::AppResult;
use skyscraper_domain::{ApiKeyId, Caller, OrganizationalUnitId, UserId};

/// Repository port for organizational unit assignments.
///
/// Both lookups return every reachable unit, descendants of assigned units
/// included.
#[async_trait]
pub trait OrganizationalUnitRepository: Send + Sync {
    /// Lists units reachable by a user through direct or group assignment.
    async fn user_organizational_units(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationalUnitId>>;

    /// Lists units reachable by an API key through explicit binding.
    async fn api_key_organizational_units(
        &self,
        api_key_id: ApiKeyId,
    ) -> AppResult<Vec<OrganizationalUnitId>>;
}

/// Maps a caller to the organizational units it may reach.
#[derive(Clone)]
pub struct CallerResolver {
    repository: Arc<dyn OrganizationalUnitRepository>,
}

impl CallerResolver {
    /// Creates a resolver backed by the assignment repository.
    #[must_use]
    pub fn new(repository: Arc<dyn OrganizationalUnitRepository>) -> Self {
        Self { repository }
    }

    /// Resolves the caller's reachable units. An empty set means no access.
    pub async fn reachable_organizational_units(
        &self,
        caller: &Caller,
    ) -> AppResult<BTreeSet<OrganizationalUnitId>> {
        let units = match caller {
            Caller::User(user_id) => self.repository.user_organizational_units(*user_id).await?,
            Caller::ApiKey(api_key_id) => {
                self.repository
                    .api_key_organizational_units(*api_key_id)
                    .await?
            }
        };

        Ok(units.into_iter().collect())
    }
}
