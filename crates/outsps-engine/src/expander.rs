//! Occurrence expansion -- turns a recurrence rule into concrete start times.
//!
//! Each pattern is mapped onto an RFC 5545 RRULE and expanded with the `rrule`
//! crate. Expansion runs on the series' local wall clock (derived from its
//! [`TimeZoneRule`]) so that a 09:00 meeting stays at 09:00 across daylight
//! switches; results are converted back to UTC.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use outsps_xml::{
    DailyFrequency, DayOfWeek, RecurrenceRule, RepeatEnd, RepeatPattern, TimeZoneRule,
};
use rrule::RRuleSet;

use crate::error::ExpandError;

/// One expanded occurrence with start and end times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn rrule_day(day: DayOfWeek) -> &'static str {
    match day {
        DayOfWeek::Su => "SU",
        DayOfWeek::Mo => "MO",
        DayOfWeek::Tu => "TU",
        DayOfWeek::We => "WE",
        DayOfWeek::Th => "TH",
        DayOfWeek::Fr => "FR",
        DayOfWeek::Sa => "SA",
    }
}

fn byday<I: IntoIterator<Item = DayOfWeek>>(days: I) -> String {
    days.into_iter().map(rrule_day).collect::<Vec<_>>().join(",")
}

/// The RRULE body for a rule's pattern, without COUNT or UNTIL.
///
/// ```
/// use outsps_engine::expander::to_rrule;
/// use outsps_xml::{DailyFrequency, RecurrenceRule, RepeatEnd, RepeatPattern};
///
/// let rule = RecurrenceRule::new(
///     RepeatPattern::Daily { frequency: DailyFrequency::EveryNDays(2) },
///     RepeatEnd::RepeatForever,
/// );
/// assert_eq!(to_rrule(&rule), "FREQ=DAILY;INTERVAL=2;WKST=SU");
/// ```
pub fn to_rrule(rule: &RecurrenceRule) -> String {
    let body = match &rule.pattern {
        RepeatPattern::Daily {
            frequency: DailyFrequency::EveryNDays(n),
        } => format!("FREQ=DAILY;INTERVAL={}", n),
        RepeatPattern::Daily {
            frequency: DailyFrequency::EveryWeekday,
        } => format!("FREQ=WEEKLY;BYDAY={}", byday(DayOfWeek::WEEKDAYS)),
        RepeatPattern::Weekly {
            days,
            week_frequency,
        } => format!(
            "FREQ=WEEKLY;INTERVAL={};BYDAY={}",
            week_frequency,
            byday(days.iter().copied())
        ),
        RepeatPattern::MonthlyByDate {
            month_frequency,
            day,
        } => format!("FREQ=MONTHLY;INTERVAL={};BYMONTHDAY={}", month_frequency, day),
        RepeatPattern::MonthlyByDay {
            month_frequency,
            selector,
            weekday_of_month,
        } => format!(
            "FREQ=MONTHLY;INTERVAL={};BYDAY={};BYSETPOS={}",
            month_frequency,
            byday(selector.days()),
            weekday_of_month.position()
        ),
        RepeatPattern::Yearly {
            year_frequency,
            month,
            day,
        } => format!(
            "FREQ=YEARLY;INTERVAL={};BYMONTH={};BYMONTHDAY={}",
            year_frequency, month, day
        ),
        RepeatPattern::YearlyByDay {
            year_frequency,
            month,
            selector,
            weekday_of_month,
        } => format!(
            "FREQ=YEARLY;INTERVAL={};BYMONTH={};BYDAY={};BYSETPOS={}",
            year_frequency,
            month,
            byday(selector.days()),
            weekday_of_month.position()
        ),
    };
    format!("{};WKST={}", body, rrule_day(rule.first_day_of_week))
}

fn ical(local: NaiveDateTime) -> String {
    // Local wall time is expanded as if it were UTC, hence the `Z`.
    format!("{}Z", local.format("%Y%m%dT%H%M%S"))
}

/// The series as an [`RRuleSet`] on its local wall clock, or `None` when the
/// window closes before the first start.
///
/// `horizon` is an extra inclusive upper bound (used for `repeatForever`
/// membership checks).
fn local_rrule_set(
    rule: &RecurrenceRule,
    tz: &TimeZoneRule,
    event_date: DateTime<Utc>,
    horizon: Option<DateTime<Utc>>,
) -> Result<Option<RRuleSet>, ExpandError> {
    let local_start = tz.to_local(event_date);
    let mut rrule_str = to_rrule(rule);

    // COUNT and UNTIL are mutually exclusive in an RRULE; a horizon under a
    // COUNT is applied by the caller instead.
    let until = match rule.end {
        RepeatEnd::RepeatInstances(n) => {
            rrule_str.push_str(&format!(";COUNT={}", n));
            None
        }
        RepeatEnd::WindowEnd(end) => Some(horizon.map_or(end, |h| h.min(end))),
        RepeatEnd::RepeatForever => horizon,
    };

    if let Some(until) = until {
        let until_local = tz.to_local(until);
        if until_local < local_start {
            return Ok(None);
        }
        rrule_str.push_str(&format!(";UNTIL={}", ical(until_local)));
    }

    let rrule_text = format!("DTSTART:{}\nRRULE:{}", ical(local_start), rrule_str);
    rrule_text
        .parse::<RRuleSet>()
        .map(Some)
        .map_err(|e| ExpandError::InvalidRule(format!("{}", e)))
}

/// At most `limit` start times of the series, in UTC.
fn expand_starts(
    rule: &RecurrenceRule,
    tz: &TimeZoneRule,
    event_date: DateTime<Utc>,
    limit: u16,
) -> Result<Vec<DateTime<Utc>>, ExpandError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let Some(rrule_set) = local_rrule_set(rule, tz, event_date, None)? else {
        return Ok(Vec::new());
    };
    Ok(rrule_set
        .all(limit)
        .dates
        .into_iter()
        .map(|dt| tz.to_utc(dt.naive_utc()))
        .collect())
}

/// Expand a rule into at most `limit` occurrences of the given duration.
///
/// # Errors
/// Returns `ExpandError::InvalidRule` if the derived RRULE is rejected by the
/// `rrule` crate.
pub fn expand_occurrences(
    rule: &RecurrenceRule,
    tz: &TimeZoneRule,
    event_date: DateTime<Utc>,
    duration: Duration,
    limit: u16,
) -> Result<Vec<Occurrence>, ExpandError> {
    Ok(expand_starts(rule, tz, event_date, limit)?
        .into_iter()
        .map(|start| Occurrence {
            start,
            end: start + duration,
        })
        .collect())
}

/// Whether `candidate` is exactly the start of one of the rule's occurrences.
///
/// Walks the series lazily up to `candidate`, so there is no cap on how far
/// into the series the candidate may lie.
pub fn is_occurrence(
    rule: &RecurrenceRule,
    tz: &TimeZoneRule,
    event_date: DateTime<Utc>,
    candidate: DateTime<Utc>,
) -> Result<bool, ExpandError> {
    if candidate < event_date {
        return Ok(false);
    }
    let Some(rrule_set) = local_rrule_set(rule, tz, event_date, Some(candidate))? else {
        return Ok(false);
    };
    Ok((&rrule_set)
        .into_iter()
        .map(|dt| tz.to_utc(dt.naive_utc()))
        .take_while(|start| *start <= candidate)
        .any(|start| start == candidate))
}
