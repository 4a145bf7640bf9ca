//! Debounced cloud sync.
//!
//! Every profile change restarts a fixed delay; once it elapses without a
//! further change the latest profile is pushed. Failures are logged and not
//! retried, so the next change is the next attempt.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use orbit_core::{errors::OrbitResult, models::profile::UserProfile};
use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

pub const DEFAULT_SYNC_DELAY: Duration = Duration::from_secs(2);

/// Uploads a whole profile to the server.
#[async_trait]
pub trait ProfilePusher: Send + Sync {
    async fn push(&self, profile: &UserProfile) -> OrbitResult<()>;
}

pub struct DebouncedSync {
    sender: watch::Sender<Option<UserProfile>>,
    worker: JoinHandle<()>,
}

impl DebouncedSync {
    pub fn spawn(pusher: Arc<dyn ProfilePusher>, delay: Duration) -> Self {
        let (sender, receiver) = watch::channel(None);
        let worker = tokio::spawn(run(pusher, receiver, delay));
        Self { sender, worker }
    }

    /// Queues `profile` for upload, replacing anything still waiting.
    pub fn schedule(&self, profile: UserProfile) {
        self.sender.send_replace(Some(profile));
    }

    /// Pushes a pending change right away and stops the worker.
    pub async fn shutdown(self) {
        let Self { sender, worker } = self;
        drop(sender);
        if let Err(e) = worker.await {
            warn!("Sync worker ended abnormally: {}", e);
        }
    }
}

async fn run(
    pusher: Arc<dyn ProfilePusher>,
    mut receiver: watch::Receiver<Option<UserProfile>>,
    delay: Duration,
) {
    while receiver.changed().await.is_ok() {
        loop {
            tokio::select! {
                changed = receiver.changed() => {
                    // Sender gone: flush what we have
                    if changed.is_err() {
                        break;
                    }
                }
                _ = sleep(delay) => break,
            }
        }

        let pending = receiver.borrow_and_update().clone();
        let Some(profile) = pending else {
            continue;
        };
        match pusher.push(&profile).await {
            Ok(()) => debug!("Synced profile {}", profile.username),
            Err(e) => warn!("Cloud sync for {} failed: {}", profile.username, e),
        }
    }
}
