//! Record evaluator. Pure logic, no I/O.

use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde_json::Value;

use super::rules::{self, Bounds, FieldSpec};
use crate::record::{Department, IncentiveLevel, Team, ValidatedRecord};
use crate::types::RawRecord;

/// Validate a raw record against today's local date.
pub fn validate_record(raw: &RawRecord) -> Result<ValidatedRecord, Vec<String>> {
    validate_record_on(raw, Local::now().date_naive())
}

/// Validate a raw record, treating `today` as the latest acceptable date.
///
/// Every field is checked even after the first violation, so the error list
/// is always complete. A missing, `null` or blank field yields
/// `"<Label> is required"` and its value is not inspected further.
pub fn validate_record_on(
    raw: &RawRecord,
    today: NaiveDate,
) -> Result<ValidatedRecord, Vec<String>> {
    let mut errors = Vec::new();

    let date = check(raw, &rules::DATE, &mut errors, |v| parse_date(v, today));
    let department = check(raw, &rules::DEPARTMENT, &mut errors, |v| {
        v.as_str()
            .and_then(|s| s.parse::<Department>().ok())
            .ok_or_else(|| rules::MSG_INVALID_DEPARTMENT.to_string())
    });
    let team = check(raw, &rules::TEAM, &mut errors, |v| {
        v.as_str()
            .and_then(parse_team)
            .ok_or_else(|| rules::MSG_INVALID_TEAM.to_string())
    });
    let targeted_productivity = check(raw, &rules::TARGETED_PRODUCTIVITY, &mut errors, |v| {
        parse_number(
            v,
            rules::TARGETED_PRODUCTIVITY.label,
            rules::TARGETED_PRODUCTIVITY_BOUNDS,
        )
    });
    let smv_minutes = check(raw, &rules::SMV_MINUTES, &mut errors, |v| {
        parse_number(v, rules::SMV_MINUTES.label, rules::SMV_MINUTES_BOUNDS)
    });
    let over_time_hours = check(raw, &rules::OVER_TIME_HOURS, &mut errors, |v| {
        parse_number(
            v,
            rules::OVER_TIME_HOURS.label,
            rules::OVER_TIME_HOURS_BOUNDS,
        )
    });
    let incentive_level = check(raw, &rules::INCENTIVE_LEVEL, &mut errors, |v| {
        v.as_str()
            .and_then(|s| s.parse::<IncentiveLevel>().ok())
            .ok_or_else(|| rules::MSG_INVALID_INCENTIVE.to_string())
    });
    let idle_time_minutes = check(raw, &rules::IDLE_TIME_MINUTES, &mut errors, |v| {
        parse_number(
            v,
            rules::IDLE_TIME_MINUTES.label,
            rules::IDLE_TIME_MINUTES_BOUNDS,
        )
    });
    let idle_men_count = check(raw, &rules::IDLE_MEN_COUNT, &mut errors, |v| {
        parse_count(v, rules::IDLE_MEN_COUNT.label, rules::IDLE_MEN_COUNT_BOUNDS)
    });
    let style_change_count = check(raw, &rules::STYLE_CHANGE_COUNT, &mut errors, |v| {
        parse_count(
            v,
            rules::STYLE_CHANGE_COUNT.label,
            rules::STYLE_CHANGE_COUNT_BOUNDS,
        )
    });
    let worker_count = check(raw, &rules::WORKER_COUNT, &mut errors, |v| {
        parse_count(v, rules::WORKER_COUNT.label, rules::WORKER_COUNT_BOUNDS)
    });

    match (
        date,
        department,
        team,
        targeted_productivity,
        smv_minutes,
        over_time_hours,
        incentive_level,
        idle_time_minutes,
        idle_men_count,
        style_change_count,
        worker_count,
    ) {
        (
            Some(date),
            Some(department),
            Some(team),
            Some(targeted_productivity),
            Some(smv_minutes),
            Some(over_time_hours),
            Some(incentive_level),
            Some(idle_time_minutes),
            Some(idle_men_count),
            Some(style_change_count),
            Some(worker_count),
        ) if errors.is_empty() => Ok(ValidatedRecord {
            date,
            department,
            team,
            targeted_productivity,
            smv_minutes,
            over_time_hours,
            incentive_level,
            idle_time_minutes,
            idle_men_count,
            style_change_count,
            worker_count,
        }),
        _ => Err(errors),
    }
}

/// Parse `"Team <n>"` into a [`Team`].
pub fn parse_team(s: &str) -> Option<Team> {
    static TEAM_RE: OnceLock<Regex> = OnceLock::new();
    let re = TEAM_RE.get_or_init(|| Regex::new(r"^Team (\d+)$").expect("valid team regex"));
    let caps = re.captures(s)?;
    caps[1].parse::<u32>().ok().map(Team::from)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn check<T>(
    raw: &RawRecord,
    spec: &FieldSpec,
    errors: &mut Vec<String>,
    parse: impl FnOnce(&Value) -> Result<T, String>,
) -> Option<T> {
    let value = match raw.get(spec.name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    };

    let Some(value) = value else {
        errors.push(format!("{} is required", spec.label));
        return None;
    };

    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(msg) => {
            errors.push(msg);
            None
        }
    }
}

fn parse_date(value: &Value, today: NaiveDate) -> Result<NaiveDate, String> {
    let date = value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, rules::DATE_FORMAT).ok())
        .ok_or_else(|| rules::MSG_DATE_FORMAT.to_string())?;
    if date > today {
        return Err(rules::MSG_DATE_IN_FUTURE.to_string());
    }
    Ok(date)
}

/// Accepts JSON numbers and numeric strings. Non-finite values are not numbers.
fn parse_number(value: &Value, label: &str, bounds: Bounds) -> Result<f64, String> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
    .ok_or_else(|| format!("{label} must be a number"))?;

    if let Some(min) = bounds.min {
        if number < min {
            return Err(format!("{label} must be at least {min}"));
        }
    }
    if let Some(max) = bounds.max {
        if number > max {
            return Err(format!("{label} cannot exceed {max}"));
        }
    }
    Ok(number)
}

/// Counts are range-checked as numbers, then truncated toward zero. Values
/// past `u32::MAX` are rejected rather than clamped.
fn parse_count(value: &Value, label: &str, bounds: Bounds) -> Result<u32, String> {
    let number = parse_number(value, label, bounds)?.trunc();
    if number > f64::from(u32::MAX) {
        return Err(format!("{label} cannot exceed {}", u32::MAX));
    }
    Ok(number as u32)
}
