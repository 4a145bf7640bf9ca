use std::sync::Arc;

use chrono::Utc;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::error;

use crate::{config::NotifierConfig, jobs::JobContext};

/// Spawns the three job loops onto the current runtime.
pub fn spawn_jobs(ctx: Arc<JobContext>, config: &NotifierConfig) -> Vec<JoinHandle<()>> {
    let reminders = {
        let ctx = ctx.clone();
        let period = config.reminder_interval;
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = ctx.run_reminders(Utc::now()).await {
                    error!("Reminder job failed: {:?}", e);
                }
            }
        })
    };

    let hydration = {
        let ctx = ctx.clone();
        let period = config.hydration_interval;
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = ctx.run_hydration_nudge(Utc::now()).await {
                    error!("Hydration job failed: {:?}", e);
                }
            }
        })
    };

    // Users live in different timezones, so each profile is rolled shortly
    // after its own local midnight rather than once at the server's.
    let rollover = {
        let period = config.rollover_interval;
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = ctx.run_daily_rollover(Utc::now()).await {
                    error!("Daily rollover failed: {:?}", e);
                }
            }
        })
    };

    vec![reminders, hydration, rollover]
}
