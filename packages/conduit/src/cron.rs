//! Five-field cron expression parsing and next-fire-time computation.
//!
//! Grounded on `original_source/include/kcenon/messaging/task/cron_parser.h`'s
//! `cron_expression` struct (five `std::set<int>` fields) and its
//! `parse`/`next_run_time`/`is_valid`/`to_string` method surface, ported as
//! [`CronExpr`] with five `BTreeSet<u32>` fields. Calendar arithmetic
//! (days-in-month, leap years, weekday) uses `chrono::NaiveDate` in place
//! of the original's hand-rolled `days_in_month`/`is_leap_year` helpers,
//! since `chrono` is already a teacher dependency for exactly this kind of
//! arithmetic.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, Timelike, Utc};

use crate::error::{ConduitError, Result};

/// Parsed cron expression. An empty set for a field means "all values
/// valid" (`*`); a non-empty set means the field is constrained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CronExpr {
    pub minutes: BTreeSet<u32>,
    pub hours: BTreeSet<u32>,
    pub days: BTreeSet<u32>,
    pub months: BTreeSet<u32>,
    pub weekdays: BTreeSet<u32>,
}

/// A guard against a cron expression with no matching instant within a
/// reasonable horizon (e.g. `31 2 30 2 *`, a day that cannot occur in
/// February).
const MAX_MINUTES_SCANNED: i64 = 4 * 366 * 24 * 60;

impl CronExpr {
    /// Parse a five-field cron expression: `minute hour day-of-month month
    /// day-of-week`.
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ConduitError::invalid_message(format!(
                "cron expression must have 5 fields, got {}",
                fields.len()
            )));
        }

        Ok(CronExpr {
            minutes: parse_field(fields[0], 0, 59)?,
            hours: parse_field(fields[1], 0, 23)?,
            days: parse_field(fields[2], 1, 31)?,
            months: parse_field(fields[3], 1, 12)?,
            weekdays: parse_field(fields[4], 0, 6)?,
        })
    }

    pub fn is_valid(expr: &str) -> bool {
        Self::parse(expr).is_ok()
    }

    /// The next instant, strictly greater than `from`, that matches this
    /// expression.
    pub fn next_run_time(&self, from: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let mut candidate = from
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(from)
            + ChronoDuration::minutes(1);

        for _ in 0..MAX_MINUTES_SCANNED {
            if self.matches(candidate) {
                return Ok(candidate);
            }
            candidate += ChronoDuration::minutes(1);
        }

        Err(ConduitError::invalid_message(
            "cron expression does not match any instant within the scan horizon",
        ))
    }

    fn matches(&self, time: DateTime<Utc>) -> bool {
        let minute = time.minute();
        let hour = time.hour();
        let day = time.day();
        let month = time.month();
        // chrono: Monday = 0 .. Sunday = 6; cron: Sunday = 0 .. Saturday = 6.
        let weekday = (time.weekday().num_days_from_sunday()) as u32;

        if !field_matches(&self.minutes, minute) || !field_matches(&self.hours, hour) {
            return false;
        }
        if !field_matches(&self.months, month) {
            return false;
        }

        let day_constrained = !self.days.is_empty();
        let weekday_constrained = !self.weekdays.is_empty();

        match (day_constrained, weekday_constrained) {
            (true, true) => self.days.contains(&day) && self.weekdays.contains(&weekday),
            (true, false) => self.days.contains(&day),
            (false, true) => self.weekdays.contains(&weekday),
            (false, false) => true,
        }
    }

    pub fn to_string_expr(&self) -> String {
        format!(
            "{} {} {} {} {}",
            field_to_string(&self.minutes),
            field_to_string(&self.hours),
            field_to_string(&self.days),
            field_to_string(&self.months),
            field_to_string(&self.weekdays)
        )
    }
}

fn field_matches(set: &BTreeSet<u32>, value: u32) -> bool {
    set.is_empty() || set.contains(&value)
}

fn field_to_string(set: &BTreeSet<u32>) -> String {
    if set.is_empty() {
        "*".to_string()
    } else {
        set.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
    }
}

fn parse_field(field: &str, min: u32, max: u32) -> Result<BTreeSet<u32>> {
    // A bare `*` with no step and no other terms means fully unconstrained
    // ("all values valid"), represented as an empty set so `field_matches`
    // short-circuits. `*/n` and comma lists are always materialized,
    // even when they happen to cover the whole range.
    if field == "*" {
        return Ok(BTreeSet::new());
    }

    let mut out = BTreeSet::new();

    for term in field.split(',') {
        let (base, step) = match term.split_once('/') {
            Some((base, step_str)) => {
                let step: u32 = step_str
                    .parse()
                    .map_err(|_| ConduitError::invalid_message(format!("invalid cron step: {term}")))?;
                if step == 0 {
                    return Err(ConduitError::invalid_message("cron step must be nonzero"));
                }
                (base, step)
            }
            None => (term, 1),
        };

        let (lo, hi) = if base == "*" {
            (min, max)
        } else if let Some((a, b)) = base.split_once('-') {
            let lo: u32 = a
                .parse()
                .map_err(|_| ConduitError::invalid_message(format!("invalid cron range: {term}")))?;
            let hi: u32 = b
                .parse()
                .map_err(|_| ConduitError::invalid_message(format!("invalid cron range: {term}")))?;
            (lo, hi)
        } else {
            let v: u32 = base
                .parse()
                .map_err(|_| ConduitError::invalid_message(format!("invalid cron value: {term}")))?;
            (v, v)
        };

        if lo < min || hi > max || lo > hi {
            return Err(ConduitError::invalid_message(format!(
                "cron field value out of range [{min},{max}]: {term}"
            )));
        }

        let mut v = lo;
        while v <= hi {
            out.insert(v);
            v += step;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn every_minute_matches_everything() {
        let expr = CronExpr::parse("* * * * *").unwrap();
        assert!(expr.matches(at(2026, 1, 1, 0, 0)));
    }

    #[test]
    fn specific_minute_and_hour() {
        let expr = CronExpr::parse("30 14 * * *").unwrap();
        assert!(expr.matches(at(2026, 3, 5, 14, 30)));
        assert!(!expr.matches(at(2026, 3, 5, 14, 31)));
    }

    #[test]
    fn range_and_list_fields() {
        let expr = CronExpr::parse("0 9-17 * * 1,3,5").unwrap();
        assert!(expr.matches(at(2026, 1, 5, 12, 0))); // Monday = 1 Jan 2026
        assert!(!expr.matches(at(2026, 1, 6, 12, 0))); // Tuesday
    }

    #[test]
    fn step_field() {
        let expr = CronExpr::parse("0 */2 * * *").unwrap();
        assert!(expr.matches(at(2026, 1, 1, 0, 0)));
        assert!(expr.matches(at(2026, 1, 1, 2, 0)));
        assert!(!expr.matches(at(2026, 1, 1, 1, 0)));
    }

    #[test]
    fn day_and_weekday_intersection_when_both_constrained() {
        // day 1 AND Monday - only true when the 1st falls on a Monday.
        let expr = CronExpr::parse("0 0 1 * 1").unwrap();
        assert!(expr.matches(at(2026, 6, 1, 0, 0))); // June 1 2026 is a Monday
        assert!(!expr.matches(at(2026, 7, 1, 0, 0))); // July 1 2026 is a Wednesday
    }

    #[test]
    fn next_run_time_every_two_hours_weekdays() {
        let expr = CronExpr::parse("0 */2 * * 1-5").unwrap();
        // Monday 00:00:00 matches itself's minute but next_run_time is
        // strictly greater than `from`.
        let from = at(2026, 1, 5, 0, 0); // Monday
        let next = expr.next_run_time(from).unwrap();
        assert_eq!(next, at(2026, 1, 5, 2, 0));
    }

    #[test]
    fn next_run_time_from_friday_evening_rolls_to_monday() {
        let expr = CronExpr::parse("0 */2 * * 1-5").unwrap();
        let from = at(2026, 1, 9, 23, 30); // Friday
        let next = expr.next_run_time(from).unwrap();
        assert_eq!(next, at(2026, 1, 12, 0, 0)); // Monday 00:00
    }

    #[test]
    fn invalid_field_count_is_rejected() {
        assert!(CronExpr::parse("* * * *").is_err());
    }

    #[test]
    fn invalid_value_range_is_rejected() {
        assert!(CronExpr::parse("60 * * * *").is_err());
    }

    #[test]
    fn is_valid_matches_parse_success() {
        assert!(CronExpr::is_valid("0 0 * * *"));
        assert!(!CronExpr::is_valid("bad expr"));
    }
}
