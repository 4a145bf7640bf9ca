//! The storage seam used by the API server and the notifier.
//!
//! Handlers and jobs talk to an `Arc<dyn OrbitRepository>` so tests can swap
//! in [`crate::mock::MockRepository`]. `PgRepository` forwards to the query
//! functions in [`crate::repositories`].

use async_trait::async_trait;
use eyre::Result;
use orbit_core::models::{profile::UserProfile, push::PushSubscription};

use crate::{
    DbPool,
    models::{DbProfile, DbPushSubscription, DbUser, DbUserSummary, NewUser},
    repositories::{profiles, subscriptions, users},
};

#[async_trait]
pub trait OrbitRepository: Send + Sync {
    /// Returns `None` when the username already exists.
    async fn create_user(&self, user: &NewUser) -> Result<Option<DbUser>>;
    async fn get_user(&self, username: &str) -> Result<Option<DbUser>>;
    async fn list_users(&self) -> Result<Vec<DbUserSummary>>;
    async fn delete_user(&self, username: &str) -> Result<bool>;

    async fn get_profile(&self, username: &str) -> Result<Option<DbProfile>>;
    async fn upsert_profile(&self, username: &str, profile: &UserProfile) -> Result<DbProfile>;
    async fn list_profiles(&self) -> Result<Vec<DbProfile>>;

    async fn save_subscription(
        &self,
        username: &str,
        subscription: &PushSubscription,
    ) -> Result<DbPushSubscription>;
    async fn get_subscriptions(&self, username: &str) -> Result<Vec<DbPushSubscription>>;
    async fn delete_subscription(&self, endpoint: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: DbPool,
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl OrbitRepository for PgRepository {
    async fn create_user(&self, user: &NewUser) -> Result<Option<DbUser>> {
        users::create_user(&self.pool, user).await
    }

    async fn get_user(&self, username: &str) -> Result<Option<DbUser>> {
        users::get_user_by_username(&self.pool, username).await
    }

    async fn list_users(&self) -> Result<Vec<DbUserSummary>> {
        users::list_users(&self.pool).await
    }

    async fn delete_user(&self, username: &str) -> Result<bool> {
        users::delete_user(&self.pool, username).await
    }

    async fn get_profile(&self, username: &str) -> Result<Option<DbProfile>> {
        profiles::get_profile(&self.pool, username).await
    }

    async fn upsert_profile(&self, username: &str, profile: &UserProfile) -> Result<DbProfile> {
        profiles::upsert_profile(&self.pool, username, profile).await
    }

    async fn list_profiles(&self) -> Result<Vec<DbProfile>> {
        profiles::list_profiles(&self.pool).await
    }

    async fn save_subscription(
        &self,
        username: &str,
        subscription: &PushSubscription,
    ) -> Result<DbPushSubscription> {
        subscriptions::upsert_subscription(&self.pool, username, subscription).await
    }

    async fn get_subscriptions(&self, username: &str) -> Result<Vec<DbPushSubscription>> {
        subscriptions::get_subscriptions_by_username(&self.pool, username).await
    }

    async fn delete_subscription(&self, endpoint: &str) -> Result<()> {
        subscriptions::delete_subscription_by_endpoint(&self.pool, endpoint).await
    }
}
