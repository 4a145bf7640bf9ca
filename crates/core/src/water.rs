//! Hydration slots and the per-day water progress record.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{OrbitError, OrbitResult},
    time::format_12h,
};

/// Liters represented by one slot.
pub const LITERS_PER_SLOT: f64 = 0.5;
pub const WAKE_SLOT_ID: &str = "water-wake";

const WAKE_MINUTES: u32 = 7 * 60 + 30;
const FIRST_MINUTES: u32 = 9 * 60;
const LAST_MINUTES: u32 = 21 * 60;
const MAX_DAILY_GOAL: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterSlot {
    pub id: String,
    pub time: String,
    pub minutes: u32,
    pub amount_ml: u32,
}

impl WaterSlot {
    fn new(id: String, minutes: u32) -> Self {
        Self {
            id,
            time: format_12h(minutes),
            minutes,
            amount_ml: (LITERS_PER_SLOT * 1000.0) as u32,
        }
    }
}

/// Generates the day's hydration slots for a liter goal.
///
/// Always starts with `water-wake` at 07:30 AM, followed by
/// `ceil(goal / 0.5) - 1` slots `water-0..N` spread evenly from 09:00 to
/// 21:00 inclusive. The result depends on `goal` only, so progress ids stay
/// valid across calls.
pub fn generate_water_slots(goal: f64) -> Vec<WaterSlot> {
    let mut slots = vec![WaterSlot::new(WAKE_SLOT_ID.to_string(), WAKE_MINUTES)];

    let total = if goal.is_finite() && goal > 0.0 {
        (goal / LITERS_PER_SLOT).ceil() as usize
    } else {
        1
    };
    let remaining = total.saturating_sub(1);

    let span = (LAST_MINUTES - FIRST_MINUTES) as f64;
    for i in 0..remaining {
        let offset = if remaining > 1 {
            span * i as f64 / (remaining - 1) as f64
        } else {
            0.0
        };
        let minutes = FIRST_MINUTES + offset.floor() as u32;
        slots.push(WaterSlot::new(format!("water-{}", i), minutes));
    }

    slots
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterConfig {
    /// Liters per day.
    pub daily_goal: f64,
    #[serde(default)]
    pub adaptive_mode: bool,
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
    /// Ids of the slots drunk on `last_date`.
    #[serde(default)]
    pub progress: BTreeSet<String>,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            daily_goal: 3.0,
            adaptive_mode: false,
            last_date: None,
            progress: BTreeSet::new(),
        }
    }
}

impl WaterConfig {
    pub fn slots(&self) -> Vec<WaterSlot> {
        generate_water_slots(self.daily_goal)
    }

    /// Clears progress on a new day and drops ids the generator no longer emits.
    pub fn reconcile(&mut self, today: NaiveDate) {
        if self.last_date != Some(today) {
            self.progress.clear();
            self.last_date = Some(today);
        }
        let valid: BTreeSet<String> = self.slots().into_iter().map(|s| s.id).collect();
        self.progress.retain(|id| valid.contains(id));
    }

    /// Marks or unmarks a slot for `today`, returning whether it is now done.
    pub fn toggle(&mut self, slot_id: &str, today: NaiveDate) -> OrbitResult<bool> {
        self.reconcile(today);
        if !self.slots().iter().any(|s| s.id == slot_id) {
            return Err(OrbitError::NotFound(format!("Water slot {} not found", slot_id)));
        }
        if self.progress.remove(slot_id) {
            Ok(false)
        } else {
            self.progress.insert(slot_id.to_string());
            Ok(true)
        }
    }

    pub fn set_goal(&mut self, goal: f64, today: NaiveDate) -> OrbitResult<()> {
        if !goal.is_finite() || goal <= 0.0 || goal > MAX_DAILY_GOAL {
            return Err(OrbitError::Validation(format!(
                "Daily water goal must be between 0 and {} liters",
                MAX_DAILY_GOAL
            )));
        }
        self.daily_goal = goal;
        self.reconcile(today);
        Ok(())
    }

    pub fn is_done(&self, slot_id: &str) -> bool {
        self.progress.contains(slot_id)
    }

    pub fn consumed_liters(&self) -> f64 {
        self.progress.len() as f64 * LITERS_PER_SLOT
    }

    /// Slots whose time is at or before `now_minutes`.
    pub fn due_count(&self, now_minutes: u32) -> usize {
        self.slots().iter().filter(|s| s.minutes <= now_minutes).count()
    }
}
