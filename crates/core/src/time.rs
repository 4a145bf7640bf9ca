//! Parsing and formatting of the display time strings used by schedule slots,
//! class sessions and water slots.
//!
//! Every parser in the workspace goes through [`parse_minutes`]. A string that
//! cannot be parsed yields `None`; callers treat `None` as "never fires" and
//! sort such entries after every parseable one. No call site substitutes a
//! default time of day.

use std::cmp::Ordering;

/// Minutes in a day, used to bound parsed values.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses the start of a time or time range into minutes since midnight.
///
/// Accepts `"09:00 AM"`, `"9:00am"`, `"09:00 AM - 10:00 AM"` and 24-hour
/// `"21:15"`. Anything after the first `-` is ignored.
pub fn parse_minutes(input: &str) -> Option<u32> {
    let start = input.split('-').next()?.trim();
    if start.is_empty() {
        return None;
    }

    let upper = start.to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let (hours, minutes) = clock.split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    if minutes >= 60 {
        return None;
    }

    let hours = match meridiem {
        Some(is_pm) => {
            if hours == 0 || hours > 12 {
                return None;
            }
            match (hours, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => {
            if hours >= 24 {
                return None;
            }
            hours
        }
    };

    Some(hours * 60 + minutes)
}

/// Parses the end of a `"start - end"` range, if there is one.
pub fn parse_end_minutes(input: &str) -> Option<u32> {
    let (_, end) = input.split_once('-')?;
    parse_minutes(end)
}

/// Formats minutes since midnight as a 12-hour clock string, e.g. `"07:30 AM"`.
pub fn format_12h(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    let hours = minutes / 60;
    let mins = minutes % 60;
    let meridiem = if hours < 12 { "AM" } else { "PM" };
    let display_hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{:02}:{:02} {}", display_hours, mins, meridiem)
}

/// Formats a `"start - end"` display range.
pub fn format_range(start: u32, end: u32) -> String {
    format!("{} - {}", format_12h(start), format_12h(end))
}

/// Orders two optional start times; unparseable entries sort last.
pub fn compare_start(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
