//! The in-app notification loop.
//!
//! Polls the evaluator on a fixed interval, hands alerts to the platform's
//! notification service and banners to the UI.

use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDateTime};
use orbit_core::{
    models::profile::UserProfile,
    notify::{Alert, NotificationEvaluator, OrbitNotification},
};
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// The platform notification service, e.g. desktop or browser notifications.
pub trait SystemNotifier: Send + Sync {
    /// `false` when permission was denied or there is no notification service.
    fn is_available(&self) -> bool;
    fn notify(&self, alert: &Alert) -> eyre::Result<()>;
}

pub struct NotificationTicker {
    evaluator: NotificationEvaluator,
    notifier: Arc<dyn SystemNotifier>,
}

impl NotificationTicker {
    pub fn new(notifier: Arc<dyn SystemNotifier>) -> Self {
        Self {
            evaluator: NotificationEvaluator::new(),
            notifier,
        }
    }

    /// Runs one poll and returns the banners to show.
    ///
    /// Alerts are dropped silently when the notifier is unavailable.
    pub fn tick(&mut self, now: NaiveDateTime, profile: &UserProfile) -> Vec<OrbitNotification> {
        let tick = self.evaluator.evaluate(now, profile);

        if self.notifier.is_available() {
            for alert in &tick.alerts {
                if let Err(e) = self.notifier.notify(alert) {
                    debug!("System notification {} failed: {}", alert.key, e);
                }
            }
        } else if !tick.alerts.is_empty() {
            debug!("Notifications unavailable, dropped {} alerts", tick.alerts.len());
        }

        tick.banners
    }

    pub fn dismiss(&mut self, banner_id: &str) {
        self.evaluator.dismiss(banner_id);
    }
}

/// Wall-clock time on this device.
pub fn local_clock() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Polls `ticker` every `period` against the latest profile in `profile`.
///
/// Ticks are skipped while no user is signed in.
pub fn spawn_ticker<C, B>(
    ticker: Arc<Mutex<NotificationTicker>>,
    profile: watch::Receiver<Option<UserProfile>>,
    period: Duration,
    clock: C,
    on_banners: B,
) -> JoinHandle<()>
where
    C: Fn() -> NaiveDateTime + Send + 'static,
    B: Fn(Vec<OrbitNotification>) + Send + 'static,
{
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            timer.tick().await;
            let current = profile.borrow().clone();
            let Some(current) = current else {
                continue;
            };
            let banners = ticker.lock().await.tick(clock(), &current);
            on_banners(banners);
        }
    })
}
