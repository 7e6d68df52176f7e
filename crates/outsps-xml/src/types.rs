//! Typed forms of the protocol's `RecurrenceXML` and `TimeZoneXML` complex types.
//!
//! Every string-keyed attribute bag of the wire format has a typed counterpart
//! here; the codecs in [`crate::recurrence`] and [`crate::timezone`] are the only
//! places that touch the XML itself.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Day of the week as spelled on the wire (`su`, `mo`, ... `sa`).
///
/// Ordering starts at Sunday so that sets of days iterate in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Su,
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Su,
        DayOfWeek::Mo,
        DayOfWeek::Tu,
        DayOfWeek::We,
        DayOfWeek::Th,
        DayOfWeek::Fr,
        DayOfWeek::Sa,
    ];

    pub const WEEKDAYS: [DayOfWeek; 5] = [
        DayOfWeek::Mo,
        DayOfWeek::Tu,
        DayOfWeek::We,
        DayOfWeek::Th,
        DayOfWeek::Fr,
    ];

    pub const WEEKEND: [DayOfWeek; 2] = [DayOfWeek::Su, DayOfWeek::Sa];

    /// Two-letter wire code.
    pub fn code(self) -> &'static str {
        match self {
            DayOfWeek::Su => "su",
            DayOfWeek::Mo => "mo",
            DayOfWeek::Tu => "tu",
            DayOfWeek::We => "we",
            DayOfWeek::Th => "th",
            DayOfWeek::Fr => "fr",
            DayOfWeek::Sa => "sa",
        }
    }

    /// Parse a wire code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(code.trim()))
    }

    pub fn to_weekday(self) -> Weekday {
        match self {
            DayOfWeek::Su => Weekday::Sun,
            DayOfWeek::Mo => Weekday::Mon,
            DayOfWeek::Tu => Weekday::Tue,
            DayOfWeek::We => Weekday::Wed,
            DayOfWeek::Th => Weekday::Thu,
            DayOfWeek::Fr => Weekday::Fri,
            DayOfWeek::Sa => Weekday::Sat,
        }
    }
}

/// Which week of the month a by-day pattern or transition rule selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekdayOfMonth {
    pub const ALL: [WeekdayOfMonth; 5] = [
        WeekdayOfMonth::First,
        WeekdayOfMonth::Second,
        WeekdayOfMonth::Third,
        WeekdayOfMonth::Fourth,
        WeekdayOfMonth::Last,
    ];

    pub fn code(self) -> &'static str {
        match self {
            WeekdayOfMonth::First => "first",
            WeekdayOfMonth::Second => "second",
            WeekdayOfMonth::Third => "third",
            WeekdayOfMonth::Fourth => "fourth",
            WeekdayOfMonth::Last => "last",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|w| w.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Position within the month: 1..=4, or -1 for `last`.
    pub fn position(self) -> i32 {
        match self {
            WeekdayOfMonth::First => 1,
            WeekdayOfMonth::Second => 2,
            WeekdayOfMonth::Third => 3,
            WeekdayOfMonth::Fourth => 4,
            WeekdayOfMonth::Last => -1,
        }
    }
}

/// The day filter of `monthlyByDay` / `yearlyByDay` patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DaySelector {
    /// Explicit day flags (`su="TRUE"`, `mo="TRUE"`, ...). Must not be empty.
    Days(BTreeSet<DayOfWeek>),
    /// `day="TRUE"`: any day of the month.
    Day,
    /// `weekday="TRUE"`: Monday through Friday.
    Weekday,
    /// `weekend_day="TRUE"`: Saturday or Sunday.
    WeekendDay,
}

impl DaySelector {
    /// The concrete days this selector admits.
    pub fn days(&self) -> BTreeSet<DayOfWeek> {
        match self {
            DaySelector::Days(days) => days.clone(),
            DaySelector::Day => DayOfWeek::ALL.into_iter().collect(),
            DaySelector::Weekday => DayOfWeek::WEEKDAYS.into_iter().collect(),
            DaySelector::WeekendDay => DayOfWeek::WEEKEND.into_iter().collect(),
        }
    }
}

/// How often a `daily` pattern repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DailyFrequency {
    /// `dayFrequency="n"`
    EveryNDays(u32),
    /// `weekday="TRUE"`
    EveryWeekday,
}

/// The pattern element inside `<repeat>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RepeatPattern {
    Daily {
        frequency: DailyFrequency,
    },
    Weekly {
        days: BTreeSet<DayOfWeek>,
        week_frequency: u32,
    },
    /// Wire element `monthly`: a fixed day of the month.
    MonthlyByDate {
        month_frequency: u32,
        day: u32,
    },
    MonthlyByDay {
        month_frequency: u32,
        selector: DaySelector,
        weekday_of_month: WeekdayOfMonth,
    },
    Yearly {
        year_frequency: u32,
        month: u32,
        day: u32,
    },
    YearlyByDay {
        year_frequency: u32,
        month: u32,
        selector: DaySelector,
        weekday_of_month: WeekdayOfMonth,
    },
}

impl RepeatPattern {
    /// Wire element name for this pattern kind.
    pub fn element_name(&self) -> &'static str {
        match self {
            RepeatPattern::Daily { .. } => "daily",
            RepeatPattern::Weekly { .. } => "weekly",
            RepeatPattern::MonthlyByDate { .. } => "monthly",
            RepeatPattern::MonthlyByDay { .. } => "monthlyByDay",
            RepeatPattern::Yearly { .. } => "yearly",
            RepeatPattern::YearlyByDay { .. } => "yearlyByDay",
        }
    }
}

/// How a recurrence terminates. Exactly one form is ever present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepeatEnd {
    /// `<windowEnd>`: the last instant an occurrence may start.
    WindowEnd(DateTime<Utc>),
    /// `<repeatForever>FALSE</repeatForever>`: the schema fixes the literal to `FALSE`.
    RepeatForever,
    /// `<repeatInstances>n</repeatInstances>`, n >= 1.
    RepeatInstances(u32),
}

impl RepeatEnd {
    /// Build a terminator from independently supplied optional parts.
    ///
    /// Fails with [`CodecError::TerminatorCount`] unless exactly one part is set.
    pub fn from_parts(
        window_end: Option<DateTime<Utc>>,
        repeat_forever: bool,
        repeat_instances: Option<u32>,
    ) -> Result<Self> {
        let count = usize::from(window_end.is_some())
            + usize::from(repeat_forever)
            + usize::from(repeat_instances.is_some());
        if count != 1 {
            return Err(CodecError::TerminatorCount(count));
        }
        Ok(match (window_end, repeat_instances) {
            (Some(end), _) => RepeatEnd::WindowEnd(end),
            (_, Some(n)) => RepeatEnd::RepeatInstances(n),
            _ => RepeatEnd::RepeatForever,
        })
    }
}

/// A complete `RecurrenceXML` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub first_day_of_week: DayOfWeek,
    pub pattern: RepeatPattern,
    pub end: RepeatEnd,
    /// The `<deleteExceptions>` marker carried alongside the rule.
    #[serde(default)]
    pub delete_exceptions: bool,
}

impl RecurrenceRule {
    pub fn new(pattern: RepeatPattern, end: RepeatEnd) -> Self {
        Self {
            first_day_of_week: DayOfWeek::Su,
            pattern,
            end,
            delete_exceptions: false,
        }
    }

    /// True when both rules describe the same schedule, ignoring the
    /// `deleteExceptions` marker.
    pub fn same_schedule(&self, other: &RecurrenceRule) -> bool {
        self.first_day_of_week == other.first_day_of_week
            && self.pattern == other.pattern
            && self.end == other.end
    }

    /// Check the structural constraints the wire schema places on a rule.
    pub fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, n: u32) -> Result<()> {
            if n == 0 {
                return Err(CodecError::Encode(format!("{} must be at least 1", field)));
            }
            Ok(())
        }
        fn in_range(field: &'static str, n: u32, max: u32) -> Result<()> {
            if !(1..=max).contains(&n) {
                return Err(CodecError::Encode(format!(
                    "{} must be between 1 and {}, got {}",
                    field, max, n
                )));
            }
            Ok(())
        }
        fn selector(s: &DaySelector) -> Result<()> {
            if let DaySelector::Days(days) = s {
                if days.is_empty() {
                    return Err(CodecError::Encode("day selector names no days".into()));
                }
            }
            Ok(())
        }

        match &self.pattern {
            RepeatPattern::Daily { frequency } => {
                if let DailyFrequency::EveryNDays(n) = frequency {
                    positive("dayFrequency", *n)?;
                }
            }
            RepeatPattern::Weekly {
                days,
                week_frequency,
            } => {
                positive("weekFrequency", *week_frequency)?;
                if days.is_empty() {
                    return Err(CodecError::Encode("weekly pattern names no days".into()));
                }
            }
            RepeatPattern::MonthlyByDate {
                month_frequency,
                day,
            } => {
                positive("monthFrequency", *month_frequency)?;
                in_range("day", *day, 31)?;
            }
            RepeatPattern::MonthlyByDay {
                month_frequency,
                selector: s,
                ..
            } => {
                positive("monthFrequency", *month_frequency)?;
                selector(s)?;
            }
            RepeatPattern::Yearly {
                year_frequency,
                month,
                day,
            } => {
                positive("yearFrequency", *year_frequency)?;
                in_range("month", *month, 12)?;
                in_range("day", *day, 31)?;
            }
            RepeatPattern::YearlyByDay {
                year_frequency,
                month,
                selector: s,
                ..
            } => {
                positive("yearFrequency", *year_frequency)?;
                in_range("month", *month, 12)?;
                selector(s)?;
            }
        }

        match self.end {
            RepeatEnd::RepeatInstances(n) => positive("repeatInstances", n)?,
            // xsd:dateTime as written here carries a four-digit year.
            RepeatEnd::WindowEnd(end) if !(0..=9999).contains(&end.year()) => {
                return Err(CodecError::Encode(format!(
                    "windowEnd year must be between 0 and 9999, got {}",
                    end.year()
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

/// The day a time-zone transition falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TransitionDay {
    /// e.g. the second Sunday.
    DayOfWeek {
        day: DayOfWeek,
        weekday_of_month: WeekdayOfMonth,
    },
    /// A fixed day of the month, clamped to the month's length when resolved.
    DayOfMonth(u32),
}

/// One standard/daylight switch-over date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDate {
    pub month: u32,
    pub day: TransitionDay,
    /// Local wall-clock time of the switch.
    pub time: NaiveTime,
}

/// A complete `TimeZoneXML` value.
///
/// `UTC = local + bias`; during daylight time the bias is
/// `standard_bias + additional_daylight_bias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeZoneRule {
    pub standard_bias: i32,
    #[serde(default)]
    pub additional_daylight_bias: i32,
    #[serde(default)]
    pub standard_date: Option<TransitionDate>,
    #[serde(default)]
    pub daylight_date: Option<TransitionDate>,
}

impl TimeZoneRule {
    /// The degenerate "no offset" rule used for all-day recurring events.
    pub fn utc() -> Self {
        Self {
            standard_bias: 0,
            additional_daylight_bias: 0,
            standard_date: None,
            daylight_date: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.standard_date.is_some() != self.daylight_date.is_some() {
            return Err(CodecError::Encode(
                "standardDate and daylightDate must be given together".into(),
            ));
        }
        for date in [self.standard_date, self.daylight_date].into_iter().flatten() {
            if !(1..=12).contains(&date.month) {
                return Err(CodecError::Encode(format!(
                    "transition month must be between 1 and 12, got {}",
                    date.month
                )));
            }
            // transitionTime is whole seconds on the wire.
            if date.time.nanosecond() != 0 {
                return Err(CodecError::Encode(format!(
                    "transition time must be whole seconds, got {}",
                    date.time
                )));
            }
            if let TransitionDay::DayOfMonth(d) = date.day {
                if !(1..=31).contains(&d) {
                    return Err(CodecError::Encode(format!(
                        "transition day of month must be between 1 and 31, got {}",
                        d
                    )));
                }
            }
        }
        Ok(())
    }
}
