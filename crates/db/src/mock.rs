use async_trait::async_trait;
use mockall::mock;
use orbit_core::models::{profile::UserProfile, push::PushSubscription};

use crate::{
    models::{DbProfile, DbPushSubscription, DbUser, DbUserSummary, NewUser},
    repository::OrbitRepository,
};

// In-memory stand-in for the Postgres repository
mock! {
    pub Repository {}

    #[async_trait]
    impl OrbitRepository for Repository {
        async fn create_user(&self, user: &NewUser) -> eyre::Result<Option<DbUser>>;
        async fn get_user(&self, username: &str) -> eyre::Result<Option<DbUser>>;
        async fn list_users(&self) -> eyre::Result<Vec<DbUserSummary>>;
        async fn delete_user(&self, username: &str) -> eyre::Result<bool>;

        async fn get_profile(&self, username: &str) -> eyre::Result<Option<DbProfile>>;
        async fn upsert_profile(
            &self,
            username: &str,
            profile: &UserProfile,
        ) -> eyre::Result<DbProfile>;
        async fn list_profiles(&self) -> eyre::Result<Vec<DbProfile>>;

        async fn save_subscription(
            &self,
            username: &str,
            subscription: &PushSubscription,
        ) -> eyre::Result<DbPushSubscription>;
        async fn get_subscriptions(&self, username: &str) -> eyre::Result<Vec<DbPushSubscription>>;
        async fn delete_subscription(&self, endpoint: &str) -> eyre::Result<()>;
    }
}
