//! The three scheduled jobs: per-minute reminders, the two-hourly hydration
//! nudge and the rollover at each user's local midnight.
//!
//! Each job scans every stored profile. A failure for one user is logged and
//! the scan moves on to the next.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use eyre::Result;
use orbit_core::{
    models::{
        profile::UserProfile,
        push::PushPayload,
    },
    notify::NotificationEvaluator,
};
use orbit_db::OrbitRepository;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::push::{PushSender, SendOutcome};

/// Hydration nudges are only sent between these local times (inclusive).
pub const NUDGE_START_MINUTES: u32 = 9 * 60;
pub const NUDGE_END_MINUTES: u32 = 21 * 60;

/// Shared state of the job loops.
pub struct JobContext {
    repo: Arc<dyn OrbitRepository>,
    sender: Option<Arc<dyn PushSender>>,
    timezone: Tz,
    evaluators: Mutex<HashMap<String, NotificationEvaluator>>,
}

impl JobContext {
    /// `sender` is `None` when push is not configured; alerts are then only logged.
    pub fn new(
        repo: Arc<dyn OrbitRepository>,
        sender: Option<Arc<dyn PushSender>>,
        timezone: Tz,
    ) -> Self {
        Self {
            repo,
            sender,
            timezone,
            evaluators: Mutex::new(HashMap::new()),
        }
    }

    /// The user's own timezone if it is set and valid, else the configured one.
    pub fn timezone_for(&self, profile: &UserProfile) -> Tz {
        profile
            .preferences
            .timezone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(self.timezone)
    }

    fn local_now(&self, profile: &UserProfile, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.timezone_for(profile)).naive_local()
    }

    /// Runs every user's evaluator at `now` and pushes the alerts that fired.
    ///
    /// Returns the number of messages delivered.
    pub async fn run_reminders(&self, now: DateTime<Utc>) -> Result<usize> {
        let profiles = self.repo.list_profiles().await?;

        let mut outgoing = Vec::new();
        {
            let mut evaluators = self.evaluators.lock().await;
            // Forget users that no longer exist
            let known: HashSet<String> = profiles.iter().map(|row| row.username.clone()).collect();
            evaluators.retain(|username, _| known.contains(username));

            for row in profiles {
                let profile = row.into_profile();
                let local = self.local_now(&profile, now);
                let tick = evaluators
                    .entry(profile.username.clone())
                    .or_default()
                    .evaluate(local, &profile);

                for alert in tick.alerts {
                    debug!("Alert {} fired for {}", alert.key, profile.username);
                    outgoing.push((profile.username.clone(), PushPayload::from_alert(&alert)));
                }
            }
        }

        let mut delivered = 0;
        for (username, payload) in outgoing {
            delivered += self.deliver(&username, &payload).await;
        }
        Ok(delivered)
    }

    /// Nudges users whose drunk slots lag the slots already due.
    pub async fn run_hydration_nudge(&self, now: DateTime<Utc>) -> Result<usize> {
        let profiles = self.repo.list_profiles().await?;

        let mut delivered = 0;
        for row in profiles {
            let profile = row.into_profile();
            let local = self.local_now(&profile, now);
            if let Some(payload) = hydration_nudge(&profile, local) {
                delivered += self.deliver(&profile.username, &payload).await;
            }
        }
        Ok(delivered)
    }

    /// Closes out yesterday for every profile whose local day has turned
    /// since its last rollover, and saves it.
    ///
    /// Meant to run often; profiles already rolled for their local today are
    /// left alone. Evaluators reset themselves on the user's own date change.
    /// Returns the number of profiles rolled.
    pub async fn run_daily_rollover(&self, now: DateTime<Utc>) -> Result<usize> {
        let profiles = self.repo.list_profiles().await?;

        let mut rolled = 0;
        for row in profiles {
            let mut profile = row.into_profile();
            let today = self.local_now(&profile, now).date();
            let yesterday = today - Duration::days(1);

            if profile.rolled_over_for(today) {
                continue;
            }

            profile.roll_over(yesterday, today);
            match self.repo.upsert_profile(&profile.username, &profile).await {
                Ok(_) => rolled += 1,
                Err(e) => warn!("Rollover failed for {}: {:?}", profile.username, e),
            }
        }

        if rolled > 0 {
            info!("Daily rollover finished: {} profiles", rolled);
        }
        Ok(rolled)
    }

    /// Sends `payload` to every subscription of `username`, dropping expired ones.
    async fn deliver(&self, username: &str, payload: &PushPayload) -> usize {
        let Some(sender) = &self.sender else {
            debug!("Push disabled, dropping {} for {}", payload.tag, username);
            return 0;
        };

        let subscriptions = match self.repo.get_subscriptions(username).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                warn!("Could not load subscriptions for {}: {:?}", username, e);
                return 0;
            }
        };

        let mut delivered = 0;
        for row in subscriptions {
            match sender.send(&row.to_subscription(), payload).await {
                Ok(SendOutcome::Delivered) => delivered += 1,
                Ok(SendOutcome::Gone) => {
                    info!("Removing expired subscription for {}", username);
                    if let Err(e) = self.repo.delete_subscription(&row.endpoint).await {
                        warn!("Could not remove subscription {}: {:?}", row.endpoint, e);
                    }
                }
                Ok(SendOutcome::Rejected(status)) => {
                    warn!("Push to {} rejected with status {}", username, status);
                }
                Err(e) => warn!("Push to {} failed: {:?}", username, e),
            }
        }
        delivered
    }
}

/// Builds the hydration reminder for `profile` at local time `now`, if one is due.
pub fn hydration_nudge(profile: &UserProfile, now: NaiveDateTime) -> Option<PushPayload> {
    if !profile.preferences.notifications.water {
        return None;
    }

    let minutes = now.hour() * 60 + now.minute();
    if !(NUDGE_START_MINUTES..=NUDGE_END_MINUTES).contains(&minutes) {
        return None;
    }

    let water = &profile.water_config;
    let drunk = if water.last_date == Some(now.date()) {
        water.progress.len()
    } else {
        0
    };
    let due = water.due_count(minutes);
    if drunk >= due {
        return None;
    }

    let behind = due - drunk;
    Some(PushPayload {
        title: "Stay hydrated".to_string(),
        message: format!(
            "You've had {} of {} glasses so far. {} behind schedule.",
            drunk,
            due,
            if behind == 1 {
                "One glass".to_string()
            } else {
                format!("{} glasses", behind)
            }
        ),
        kind: "water".to_string(),
        tag: format!("water-nudge-{}-{}", now.date(), now.hour()),
        url: "/water".to_string(),
    })
}
