use async_trait::async_trait;
use mockall::mock;
use orbit_core::{errors::OrbitResult, models::profile::UserProfile, notify::Alert};

use crate::{debounce::ProfilePusher, ticker::SystemNotifier};

mock! {
    pub Pusher {}

    #[async_trait]
    impl ProfilePusher for Pusher {
        async fn push(&self, profile: &UserProfile) -> OrbitResult<()>;
    }
}

mock! {
    pub Notifier {}

    impl SystemNotifier for Notifier {
        fn is_available(&self) -> bool;
        fn notify(&self, alert: &Alert) -> eyre::Result<()>;
    }
}
