use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{OrbitError, OrbitResult},
    report,
    time::{compare_start, parse_minutes},
    water::WaterConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Study,
    Health,
    Fitness,
    Personal,
    Social,
    Leisure,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub id: String,
    /// Display range, e.g. "09:00 AM - 10:00 AM".
    pub time: String,
    pub title: String,
    pub category: Category,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ScheduleSlot {
    pub fn start_minutes(&self) -> Option<u32> {
        parse_minutes(&self.time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassType {
    Lecture,
    Lab,
    Tutorial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub id: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub class_type: ClassType,
    #[serde(default)]
    pub professor: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub batch: String,
    pub start_time: String,
    pub end_time: String,
}

impl ClassSession {
    pub fn start_minutes(&self) -> Option<u32> {
        parse_minutes(&self.start_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default = "enabled")]
    pub water: bool,
    #[serde(default = "enabled")]
    pub schedule: bool,
    #[serde(default = "enabled")]
    pub academic: bool,
}

fn enabled() -> bool {
    true
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            water: true,
            schedule: true,
            academic: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub notifications: NotificationPreferences,
    /// IANA timezone name, e.g. "Asia/Kolkata".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub completed: u32,
    pub total: u32,
}

impl DailyStat {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 * 100.0 / self.total as f64).min(100.0)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastWeekStats {
    pub completed: u32,
    pub total: u32,
    pub completion_rate: f64,
    pub active_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The whole per-user state, exchanged over `/sync` as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    /// Plaintext mirror kept on the device for login autofill only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub schedule: BTreeMap<DayOfWeek, Vec<ScheduleSlot>>,
    #[serde(default)]
    pub academic_schedule: BTreeMap<DayOfWeek, Vec<ClassSession>>,
    #[serde(default)]
    pub water_config: WaterConfig,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub last_week_stats: Option<LastWeekStats>,
    #[serde(default)]
    pub daily_stats: BTreeMap<NaiveDate, DailyStat>,
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Local date of the last completed rollover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_rollover: Option<NaiveDate>,
}

impl UserProfile {
    pub fn new(username: &str, today: NaiveDate) -> Self {
        Self {
            username: username.to_string(),
            password: None,
            email: None,
            avatar: None,
            join_date: today,
            schedule: BTreeMap::new(),
            academic_schedule: BTreeMap::new(),
            water_config: WaterConfig::default(),
            preferences: Preferences::default(),
            last_week_stats: None,
            daily_stats: BTreeMap::new(),
            notes: Vec::new(),
            last_rollover: None,
        }
    }

    pub fn tasks_for(&self, day: DayOfWeek) -> &[ScheduleSlot] {
        self.schedule.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn classes_for(&self, day: DayOfWeek) -> &[ClassSession] {
        self.academic_schedule
            .get(&day)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add_slot(&mut self, day: DayOfWeek, slot: ScheduleSlot) -> OrbitResult<()> {
        if slot.title.trim().is_empty() {
            return Err(OrbitError::Validation("Task title must not be empty".into()));
        }
        let slots = self.schedule.entry(day).or_default();
        if slots.iter().any(|s| s.id == slot.id) {
            return Err(OrbitError::Conflict(format!("Task {} already exists", slot.id)));
        }
        slots.push(slot);
        sort_slots(slots);
        Ok(())
    }

    pub fn update_slot(&mut self, day: DayOfWeek, slot: ScheduleSlot) -> OrbitResult<()> {
        let missing = || OrbitError::NotFound(format!("Task {} not found", slot.id));
        let slots = self.schedule.get_mut(&day).ok_or_else(missing)?;
        let existing = slots.iter_mut().find(|s| s.id == slot.id).ok_or_else(missing)?;
        *existing = slot;
        sort_slots(slots);
        Ok(())
    }

    pub fn delete_slot(&mut self, day: DayOfWeek, id: &str) -> OrbitResult<ScheduleSlot> {
        let missing = || OrbitError::NotFound(format!("Task {} not found", id));
        let slots = self.schedule.get_mut(&day).ok_or_else(missing)?;
        let index = slots.iter().position(|s| s.id == id).ok_or_else(missing)?;
        Ok(slots.remove(index))
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_slot(&mut self, day: DayOfWeek, id: &str) -> OrbitResult<bool> {
        let slot = self
            .schedule
            .get_mut(&day)
            .and_then(|slots| slots.iter_mut().find(|s| s.id == id))
            .ok_or_else(|| OrbitError::NotFound(format!("Task {} not found", id)))?;
        slot.completed = !slot.completed;
        Ok(slot.completed)
    }

    pub fn add_class(&mut self, day: DayOfWeek, session: ClassSession) -> OrbitResult<()> {
        if session.subject.trim().is_empty() {
            return Err(OrbitError::Validation("Class subject must not be empty".into()));
        }
        let sessions = self.academic_schedule.entry(day).or_default();
        if sessions.iter().any(|s| s.id == session.id) {
            return Err(OrbitError::Conflict(format!("Class {} already exists", session.id)));
        }
        sessions.push(session);
        sort_classes(sessions);
        Ok(())
    }

    pub fn update_class(&mut self, day: DayOfWeek, session: ClassSession) -> OrbitResult<()> {
        let missing = || OrbitError::NotFound(format!("Class {} not found", session.id));
        let sessions = self.academic_schedule.get_mut(&day).ok_or_else(missing)?;
        let existing = sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or_else(missing)?;
        *existing = session;
        sort_classes(sessions);
        Ok(())
    }

    pub fn delete_class(&mut self, day: DayOfWeek, id: &str) -> OrbitResult<ClassSession> {
        let missing = || OrbitError::NotFound(format!("Class {} not found", id));
        let sessions = self.academic_schedule.get_mut(&day).ok_or_else(missing)?;
        let index = sessions.iter().position(|s| s.id == id).ok_or_else(missing)?;
        Ok(sessions.remove(index))
    }

    pub fn add_note(&mut self, note: Note) {
        self.notes.insert(0, note);
    }

    pub fn delete_note(&mut self, id: &str) -> OrbitResult<Note> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| OrbitError::NotFound(format!("Note {} not found", id)))?;
        Ok(self.notes.remove(index))
    }

    /// Re-sorts every weekday list by parsed start time.
    pub fn normalize(&mut self) {
        self.schedule.values_mut().for_each(|slots| sort_slots(slots));
        self.academic_schedule
            .values_mut()
            .for_each(|sessions| sort_classes(sessions));
    }

    /// Completion counters for the tasks scheduled on `date`'s weekday.
    pub fn completion_for(&self, date: NaiveDate) -> DailyStat {
        let tasks = self.tasks_for(DayOfWeek::of(date));
        DailyStat {
            completed: tasks.iter().filter(|t| t.completed).count() as u32,
            total: tasks.len() as u32,
        }
    }

    /// Writes today's live completion counters into `daily_stats`.
    pub fn refresh_daily_stat(&mut self, date: NaiveDate) {
        let stat = self.completion_for(date);
        self.daily_stats.insert(date, stat);
    }

    /// Closes out `yesterday` and prepares the profile for `today`.
    ///
    /// Records yesterday's counters, clears yesterday's completion flags,
    /// resets water progress and, when `today` starts a new week, recomputes
    /// `last_week_stats` from the seven days ending yesterday.
    pub fn roll_over(&mut self, yesterday: NaiveDate, today: NaiveDate) {
        self.refresh_daily_stat(yesterday);

        if let Some(slots) = self.schedule.get_mut(&DayOfWeek::of(yesterday)) {
            slots.iter_mut().for_each(|slot| slot.completed = false);
        }

        self.water_config.reconcile(today);

        if today.weekday() == Weekday::Mon {
            self.last_week_stats = Some(report::week_summary(&self.daily_stats, yesterday));
        }

        self.last_rollover = Some(today);
    }

    /// Whether the rollover into `today` has already run.
    pub fn rolled_over_for(&self, today: NaiveDate) -> bool {
        self.last_rollover.is_some_and(|date| date >= today)
    }
}

fn sort_slots(slots: &mut [ScheduleSlot]) {
    slots.sort_by(|a, b| compare_start(a.start_minutes(), b.start_minutes()));
}

fn sort_classes(sessions: &mut [ClassSession]) {
    sessions.sort_by(|a, b| compare_start(a.start_minutes(), b.start_minutes()));
}
