//! # Orbit Notifier
//!
//! Sends Web Push reminders from three scheduled jobs that scan every
//! synced profile:
//!
//! - **reminders** (every minute): class, task and water alerts from the
//!   notification evaluator
//! - **hydration nudge** (every two hours, 09:00 to 21:00): a reminder when
//!   the glasses drunk lag the slots already due
//! - **daily rollover** (checked every five minutes, applied once each
//!   user's local date turns): records yesterday's completion, resets the
//!   day and refreshes the weekly summary
//!
//! Missing VAPID keys disable delivery but not the jobs.

pub mod config;
pub mod crypto;
pub mod jobs;
pub mod mock;
pub mod push;
pub mod scheduler;

use std::sync::Arc;

use eyre::Result;
use orbit_db::OrbitRepository;
use tracing::{info, warn};

use crate::{
    jobs::JobContext,
    push::{PushSender, WebPushSender},
};

/// Builds the push sender, or `None` when VAPID keys are not configured.
pub fn build_sender(config: &config::NotifierConfig) -> Result<Option<Arc<dyn PushSender>>> {
    match &config.vapid {
        Some(vapid) => {
            let sender: Arc<dyn PushSender> = Arc::new(WebPushSender::new(vapid)?);
            Ok(Some(sender))
        }
        None => {
            warn!("VAPID keys not configured, push notifications are disabled");
            Ok(None)
        }
    }
}

/// Runs the scheduled jobs until one of the loops stops.
pub async fn start_jobs(config: config::NotifierConfig, repo: Arc<dyn OrbitRepository>) -> Result<()> {
    info!("Starting notifier jobs in {}", config.timezone);

    let sender = build_sender(&config)?;
    let ctx = Arc::new(JobContext::new(repo, sender, config.timezone));

    for handle in scheduler::spawn_jobs(ctx, &config) {
        handle.await?;
    }

    Ok(())
}
