//! Streak, heatmap and velocity reports over the per-day completion counters.
//!
//! Nothing here is stored; every report is recomputed from
//! `UserProfile::daily_stats` when it is requested.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::profile::{Category, DailyStat, DayOfWeek, LastWeekStats, ScheduleSlot};

pub const HEATMAP_WEEKS: usize = 16;
pub const VELOCITY_DAYS: i64 = 7;

pub type DailyStats = BTreeMap<NaiveDate, DailyStat>;

fn is_active(stats: &DailyStats, date: NaiveDate) -> bool {
    stats.get(&date).is_some_and(|s| s.completed > 0)
}

/// Consecutive active days ending today, or yesterday if nothing is done yet today.
pub fn current_streak(stats: &DailyStats, today: NaiveDate) -> u32 {
    let mut day = if is_active(stats, today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while is_active(stats, day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

pub fn longest_streak(stats: &DailyStats) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for (date, stat) in stats {
        if stat.completed == 0 {
            run = 0;
            previous = None;
            continue;
        }
        run = match previous {
            Some(prev) if *date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        previous = Some(*date);
        longest = longest.max(run);
    }
    longest
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub percent: f64,
    pub is_future: bool,
}

/// One column of the heatmap, Sunday first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapWeek {
    pub days: Vec<HeatmapCell>,
}

/// A 16-week grid ending with the week that contains `today`.
pub fn heatmap(stats: &DailyStats, today: NaiveDate) -> Vec<HeatmapWeek> {
    let week_start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
    let grid_start = week_start - Duration::weeks(HEATMAP_WEEKS as i64 - 1);

    (0..HEATMAP_WEEKS)
        .map(|week| {
            let days = (0..7)
                .map(|day| {
                    let date = grid_start + Duration::days((week * 7 + day) as i64);
                    HeatmapCell {
                        date,
                        percent: stats.get(&date).map(DailyStat::percent).unwrap_or(0.0),
                        is_future: date > today,
                    }
                })
                .collect();
            HeatmapWeek { days }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityPoint {
    pub date: NaiveDate,
    /// Short weekday label, e.g. "Mon".
    pub label: String,
    pub completed: u32,
    pub total: u32,
    pub percent: f64,
}

/// The trailing seven days ending with `today`, oldest first.
pub fn velocity(stats: &DailyStats, today: NaiveDate) -> Vec<VelocityPoint> {
    (0..VELOCITY_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let stat = stats.get(&date).copied().unwrap_or_default();
            VelocityPoint {
                date,
                label: date.format("%a").to_string(),
                completed: stat.completed,
                total: stat.total,
                percent: stat.percent(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub total: u32,
    pub completed: u32,
}

pub fn category_breakdown(
    schedule: &BTreeMap<DayOfWeek, Vec<ScheduleSlot>>,
) -> BTreeMap<Category, CategoryCount> {
    let mut breakdown: BTreeMap<Category, CategoryCount> = BTreeMap::new();
    for slot in schedule.values().flatten() {
        let entry = breakdown.entry(slot.category).or_default();
        entry.total += 1;
        if slot.completed {
            entry.completed += 1;
        }
    }
    breakdown
}

/// Totals for the seven days ending with `end`.
pub fn week_summary(stats: &DailyStats, end: NaiveDate) -> LastWeekStats {
    let start = end - Duration::days(VELOCITY_DAYS - 1);
    let (completed, total, active_days) = stats
        .range(start..=end)
        .fold((0, 0, 0), |(completed, total, active), (_, stat)| {
            (
                completed + stat.completed,
                total + stat.total,
                active + u32::from(stat.completed > 0),
            )
        });

    let completion_rate = if total == 0 {
        0.0
    } else {
        completed as f64 * 100.0 / total as f64
    };

    LastWeekStats {
        completed,
        total,
        completion_rate,
        active_days,
    }
}
