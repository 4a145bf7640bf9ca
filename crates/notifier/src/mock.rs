use async_trait::async_trait;
use mockall::mock;
use orbit_core::models::push::{PushPayload, PushSubscription};

use crate::push::{PushSender, SendOutcome};

// Records deliveries instead of calling a push service
mock! {
    pub Sender {}

    #[async_trait]
    impl PushSender for Sender {
        async fn send(
            &self,
            subscription: &PushSubscription,
            payload: &PushPayload,
        ) -> eyre::Result<SendOutcome>;
    }
}
