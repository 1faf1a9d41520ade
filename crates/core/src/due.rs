// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Due-set evaluation
//!
//! Decides, at minute granularity, whether a cron expression matches a
//! reference time. Expressions are normalized to the seconds-first dialect
//! of the `cron` crate before parsing.

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors from cron parsing and reference-time computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid cron expression `{expr}`: {message}")]
    Parse { expr: String, message: String },
    #[error("unknown time zone `{0}`")]
    UnknownTimeZone(String),
    #[error("tick must be a positive number of minutes")]
    InvalidTick,
}

/// A parsed schedule
#[derive(Clone)]
pub enum CronSchedule {
    /// Field-based expression (5, 6 or 7 fields, or a named alias)
    Cron(Box<cron::Schedule>),
    /// `@every <duration>`, in whole minutes
    Every(u32),
}

impl fmt::Debug for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CronSchedule::Cron(schedule) => write!(f, "Cron({})", schedule),
            CronSchedule::Every(minutes) => write!(f, "Every({}m)", minutes),
        }
    }
}

impl FromStr for CronSchedule {
    type Err = ScheduleError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let parse_error = |message: String| ScheduleError::Parse {
            expr: expr.to_string(),
            message,
        };

        let trimmed = expr.trim();
        if let Some(interval) = trimmed.strip_prefix("@every") {
            return every_minutes(interval.trim())
                .map(CronSchedule::Every)
                .map_err(parse_error);
        }

        let normalized = normalize(trimmed).map_err(parse_error)?;
        cron::Schedule::from_str(&normalized)
            .map(|schedule| CronSchedule::Cron(Box::new(schedule)))
            .map_err(|e| parse_error(e.to_string()))
    }
}

impl CronSchedule {
    /// Schedule firing every `tick` minutes
    ///
    /// Ticks under an hour use the minute grid of each hour, whole hours
    /// under a day use the hour grid of each day. Any other tick falls back
    /// to the `@every` grid counted from the epoch.
    pub fn every_tick(tick: u32) -> Result<Self, ScheduleError> {
        match tick {
            0 => Err(ScheduleError::InvalidTick),
            1..=59 => format!("*/{} * * * *", tick).parse(),
            t if t % 60 == 0 && t < 24 * 60 => format!("0 */{} * * *", t / 60).parse(),
            t => Ok(CronSchedule::Every(t)),
        }
    }

    /// Whether `at` (already truncated to the minute) matches
    pub fn includes(&self, at: &DateTime<FixedOffset>) -> bool {
        match self {
            CronSchedule::Cron(schedule) => schedule.includes(*at),
            CronSchedule::Every(minutes) => wall_minutes(at) % i64::from(*minutes) == 0,
        }
    }

    /// First matching instant strictly after `from`
    pub fn next_after(&self, from: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        match self {
            CronSchedule::Cron(schedule) => schedule.after(from).next(),
            CronSchedule::Every(minutes) => {
                let minutes = i64::from(*minutes);
                let next = (wall_minutes(from) / minutes + 1) * minutes;
                let base = truncate(*from);
                Some(base + TimeDelta::minutes(next - wall_minutes(&base)))
            }
        }
    }
}

/// Whether `expr` is due at `at`
///
/// `at` must already be truncated to the minute (see [`current_time`]).
pub fn is_due(expr: &str, at: &DateTime<FixedOffset>) -> Result<bool, ScheduleError> {
    let schedule: CronSchedule = expr.parse()?;
    Ok(schedule.includes(at))
}

/// Reference time for a tick
///
/// Converts `now` into `timezone` when one is given, then zeroes seconds and
/// sub-second precision. On an unknown zone the error is returned and the
/// caller keeps its own `now` untouched.
pub fn current_time(
    now: DateTime<FixedOffset>,
    timezone: &str,
) -> Result<DateTime<FixedOffset>, ScheduleError> {
    let localized = if timezone.is_empty() {
        now
    } else {
        let tz: chrono_tz::Tz = timezone
            .parse()
            .map_err(|_| ScheduleError::UnknownTimeZone(timezone.to_string()))?;
        now.with_timezone(&tz).fixed_offset()
    };
    Ok(truncate(localized))
}

fn truncate(at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    at - TimeDelta::seconds(i64::from(at.second()))
        - TimeDelta::nanoseconds(i64::from(at.nanosecond()))
}

/// Minutes since the epoch, counted on the local wall clock
fn wall_minutes(at: &DateTime<FixedOffset>) -> i64 {
    at.naive_local().and_utc().timestamp().div_euclid(60)
}

fn every_minutes(interval: &str) -> Result<u32, String> {
    let duration: Duration = humantime::parse_duration(interval).map_err(|e| e.to_string())?;
    let secs = duration.as_secs();
    if secs == 0 || secs % 60 != 0 || duration.subsec_nanos() != 0 {
        return Err(format!(
            "interval `{}` must be a positive whole number of minutes",
            interval
        ));
    }
    u32::try_from(secs / 60).map_err(|_| format!("interval `{}` is too large", interval))
}

/// Rewrite an expression into the seconds-first 7-field dialect
fn normalize(expr: &str) -> Result<String, String> {
    let expr = match expr {
        "@yearly" | "@annually" => "0 0 1 1 *",
        "@monthly" => "0 0 1 * *",
        "@weekly" => "0 0 * * 0",
        "@daily" | "@midnight" => "0 0 * * *",
        "@hourly" => "0 * * * *",
        other if other.starts_with('@') => {
            return Err(format!("unsupported descriptor `{}`", other));
        }
        other => other,
    };

    let mut fields: Vec<String> = expr.split_whitespace().map(str::to_string).collect();
    let dow = match fields.len() {
        5 | 6 => {
            fields.insert(0, "0".to_string());
            5
        }
        7 => 5,
        n => return Err(format!("expected 5 to 7 fields, found {}", n)),
    };
    fields[dow] = day_of_week(&fields[dow]);

    Ok(fields.join(" "))
}

/// Translate numeric days of week (0-7, Sunday = 0 or 7) into the
/// Sunday = 1 numbering of the `cron` crate. Day names pass through.
fn day_of_week(field: &str) -> String {
    field
        .split(',')
        .map(|item| day_of_week_item(item).unwrap_or_else(|| item.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

fn day_of_week_item(item: &str) -> Option<String> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step.parse::<u32>().ok().filter(|s| *s > 0)?)),
        None => (item, None),
    };

    let (first, last) = match (range, step) {
        ("*", None) => return Some("*".to_string()),
        ("*", Some(_)) => (0, 6),
        (range, _) => match range.split_once('-') {
            Some((a, b)) => (a.parse::<u32>().ok()?, b.parse::<u32>().ok()?),
            None => {
                let a = range.parse::<u32>().ok()?;
                (a, if step.is_some() { 7 } else { a })
            }
        },
    };
    if first > last || last > 7 {
        return None;
    }

    let mut days: Vec<u32> = (first..=last)
        .step_by(step.unwrap_or(1) as usize)
        .map(|day| day % 7 + 1)
        .collect();
    days.sort_unstable();
    days.dedup();

    Some(
        days.iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

#[cfg(test)]
#[path = "due_tests.rs"]
mod tests;
