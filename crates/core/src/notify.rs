//! Event-proximity notification evaluator.
//!
//! On every polling tick the evaluator looks at the day's tasks, classes and
//! water slots and decides which of them deserve a one-shot alert (system or
//! push notification) and which are shown as in-app banners.
//!
//! Alert thresholds, in minutes before the event starts:
//!
//! | source | threshold | urgency  |
//! |--------|-----------|----------|
//! | class  | 15        | normal   |
//! | class  | 5         | critical |
//! | task   | 10        | normal   |
//! | water  | 10        | normal   |
//!
//! A banner is shown for any event starting within the next 20 minutes or
//! that started less than 5 minutes ago, until it is dismissed.
//!
//! The evaluator owns the fired-alert keys and the dismissed banner ids.
//! Both are cleared when a tick falls on a new date.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::profile::{DayOfWeek, NotificationPreferences, UserProfile};

const CLASS_NOTICE_MINUTES: i64 = 15;
const CLASS_CRITICAL_MINUTES: i64 = 5;
const TASK_NOTICE_MINUTES: i64 = 10;
const BANNER_LEAD_MINUTES: i64 = 20;
const BANNER_GRACE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Task,
    Class,
    Water,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Task => "task",
            EventKind::Class => "class",
            EventKind::Water => "water",
        }
    }

    /// Notification channel that gates this kind of alert.
    pub fn channel(&self) -> &'static str {
        match self {
            EventKind::Task => "schedule",
            EventKind::Class => "academic",
            EventKind::Water => "water",
        }
    }

    fn enabled(&self, prefs: &NotificationPreferences) -> bool {
        match self {
            EventKind::Task => prefs.schedule,
            EventKind::Class => prefs.academic,
            EventKind::Water => prefs.water,
        }
    }
}

/// A single timed entry considered by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub id: String,
    pub kind: EventKind,
    pub title: String,
    /// Venue for classes, time range for tasks, amount for water.
    pub detail: String,
    /// `None` when the time string could not be parsed; such events never fire.
    pub start_minutes: Option<u32>,
}

impl TimedEvent {
    pub fn banner_id(&self) -> String {
        format!("{}-{}", self.kind.as_str(), self.id)
    }

    fn alert_key(&self, threshold: i64) -> String {
        format!("{}-{}-{}", self.kind.as_str(), self.id, threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    Critical,
}

/// A one-shot alert to hand to the system or push notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub key: String,
    pub event_id: String,
    pub kind: EventKind,
    pub title: String,
    pub message: String,
    pub urgency: Urgency,
    pub minutes_until: i64,
}

/// An in-app banner. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitNotification {
    pub id: String,
    pub kind: EventKind,
    pub title: String,
    pub detail: String,
    pub minutes_until: i64,
    /// 0 at 20 minutes out, 100 at start time.
    pub progress: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tick {
    pub alerts: Vec<Alert>,
    pub banners: Vec<OrbitNotification>,
}

/// Collects the events of `date`'s weekday that are still pending.
///
/// Completed tasks and water slots already drunk today are left out.
pub fn pending_events(profile: &UserProfile, date: NaiveDate) -> Vec<TimedEvent> {
    let day = DayOfWeek::of(date);

    let tasks = profile
        .tasks_for(day)
        .iter()
        .filter(|task| !task.completed)
        .map(|task| TimedEvent {
            id: task.id.clone(),
            kind: EventKind::Task,
            title: task.title.clone(),
            detail: task.time.clone(),
            start_minutes: task.start_minutes(),
        });

    let classes = profile.classes_for(day).iter().map(|class| TimedEvent {
        id: class.id.clone(),
        kind: EventKind::Class,
        title: class.subject.clone(),
        detail: class.venue.clone(),
        start_minutes: class.start_minutes(),
    });

    // Progress recorded on an earlier date does not count for today.
    let water = &profile.water_config;
    let progress_is_current = water.last_date == Some(date);
    let water_slots = water
        .slots()
        .into_iter()
        .filter(|slot| !(progress_is_current && water.is_done(&slot.id)))
        .map(|slot| TimedEvent {
            detail: format!("{} ml", slot.amount_ml),
            title: "Drink water".to_string(),
            kind: EventKind::Water,
            start_minutes: Some(slot.minutes),
            id: slot.id,
        });

    tasks.chain(classes).chain(water_slots).collect()
}

#[derive(Debug, Clone, Default)]
pub struct NotificationEvaluator {
    day: Option<NaiveDate>,
    fired: HashSet<String>,
    dismissed: HashSet<String>,
}

impl NotificationEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates a profile at wall-clock time `now`.
    pub fn evaluate(&mut self, now: NaiveDateTime, profile: &UserProfile) -> Tick {
        let date = now.date();
        let events = pending_events(profile, date);
        self.evaluate_events(now, &events, &profile.preferences.notifications)
    }

    /// Evaluates an explicit event list at wall-clock time `now`.
    pub fn evaluate_events(
        &mut self,
        now: NaiveDateTime,
        events: &[TimedEvent],
        prefs: &NotificationPreferences,
    ) -> Tick {
        self.roll_day(now.date());
        let now_minutes = (now.hour() * 60 + now.minute()) as i64;

        let mut tick = Tick::default();
        for event in events {
            let Some(start) = event.start_minutes else {
                continue;
            };
            let diff = start as i64 - now_minutes;

            if event.kind.enabled(prefs) {
                if let Some(alert) = self.threshold_alert(event, diff) {
                    tick.alerts.push(alert);
                }
            }

            if diff > -BANNER_GRACE_MINUTES && diff <= BANNER_LEAD_MINUTES {
                let id = event.banner_id();
                if !self.dismissed.contains(&id) {
                    let ratio = (BANNER_LEAD_MINUTES - diff) as f64 / BANNER_LEAD_MINUTES as f64;
                    tick.banners.push(OrbitNotification {
                        id,
                        kind: event.kind,
                        title: event.title.clone(),
                        detail: event.detail.clone(),
                        minutes_until: diff,
                        progress: ratio.clamp(0.0, 1.0) * 100.0,
                    });
                }
            }
        }

        tick.banners.sort_by_key(|banner| banner.minutes_until);
        tick
    }

    fn threshold_alert(&mut self, event: &TimedEvent, diff: i64) -> Option<Alert> {
        if diff <= 0 {
            return None;
        }

        match event.kind {
            EventKind::Class => {
                let notice_key = event.alert_key(CLASS_NOTICE_MINUTES);
                let critical_key = event.alert_key(CLASS_CRITICAL_MINUTES);

                if diff <= CLASS_CRITICAL_MINUTES && !self.fired.contains(&critical_key) {
                    self.fired.insert(notice_key);
                    self.fired.insert(critical_key.clone());
                    return Some(Alert {
                        key: critical_key,
                        event_id: event.id.clone(),
                        kind: event.kind,
                        title: format!("{} starts in {} min", event.title, diff),
                        message: location_message(&event.detail, "Head to class now"),
                        urgency: Urgency::Critical,
                        minutes_until: diff,
                    });
                }

                if diff <= CLASS_NOTICE_MINUTES && !self.fired.contains(&notice_key) {
                    self.fired.insert(notice_key.clone());
                    return Some(Alert {
                        key: notice_key,
                        event_id: event.id.clone(),
                        kind: event.kind,
                        title: format!("Upcoming class: {}", event.title),
                        message: location_message(
                            &event.detail,
                            &format!("Starts in {} minutes", diff),
                        ),
                        urgency: Urgency::Normal,
                        minutes_until: diff,
                    });
                }

                None
            }
            EventKind::Task | EventKind::Water => {
                let key = event.alert_key(TASK_NOTICE_MINUTES);
                if diff > TASK_NOTICE_MINUTES || self.fired.contains(&key) {
                    return None;
                }
                self.fired.insert(key.clone());

                let (title, message) = if event.kind == EventKind::Water {
                    (
                        "Hydration reminder".to_string(),
                        format!("Time to drink {} of water", event.detail),
                    )
                } else {
                    (
                        format!("Up next: {}", event.title),
                        format!("Starts in {} minutes ({})", diff, event.detail),
                    )
                };

                Some(Alert {
                    key,
                    event_id: event.id.clone(),
                    kind: event.kind,
                    title,
                    message,
                    urgency: Urgency::Normal,
                    minutes_until: diff,
                })
            }
        }
    }

    /// Hides a banner for the rest of the day. Alert bookkeeping is untouched.
    pub fn dismiss(&mut self, banner_id: &str) {
        self.dismissed.insert(banner_id.to_string());
    }

    pub fn is_dismissed(&self, banner_id: &str) -> bool {
        self.dismissed.contains(banner_id)
    }

    pub fn has_fired(&self, key: &str) -> bool {
        self.fired.contains(key)
    }

    pub fn reset(&mut self) {
        self.fired.clear();
        self.dismissed.clear();
    }

    fn roll_day(&mut self, date: NaiveDate) {
        if self.day != Some(date) {
            self.reset();
            self.day = Some(date);
        }
    }
}

fn location_message(venue: &str, fallback: &str) -> String {
    if venue.trim().is_empty() {
        fallback.to_string()
    } else {
        format!("{} at {}", fallback, venue)
    }
}
