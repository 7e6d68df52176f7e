//! Tests for occurrence expansion.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use outsps_engine::expander::{expand_occurrences, is_occurrence};
use outsps_engine::fixtures::pacific_time_zone;
use outsps_xml::{
    DailyFrequency, DayOfWeek, DaySelector, RecurrenceRule, RepeatEnd, RepeatPattern,
    TimeZoneRule, WeekdayOfMonth,
};

fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn daily(n: u32, end: RepeatEnd) -> RecurrenceRule {
    RecurrenceRule::new(
        RepeatPattern::Daily {
            frequency: DailyFrequency::EveryNDays(n),
        },
        end,
    )
}

fn starts(
    rule: &RecurrenceRule,
    tz: &TimeZoneRule,
    event_date: DateTime<Utc>,
    limit: u16,
) -> Vec<DateTime<Utc>> {
    expand_occurrences(rule, tz, event_date, Duration::hours(1), limit)
        .expect("should expand")
        .into_iter()
        .map(|o| o.start)
        .collect()
}

// ---------------------------------------------------------------------------
// Terminators
// ---------------------------------------------------------------------------

#[test]
fn repeat_instances_caps_the_series() {
    let rule = daily(1, RepeatEnd::RepeatInstances(10));
    let result = starts(&rule, &TimeZoneRule::utc(), utc(2024, 1, 1, 0), 100);
    assert_eq!(result.len(), 10);
    assert_eq!(result[0], utc(2024, 1, 1, 0));
    assert_eq!(result[9], utc(2024, 1, 10, 0));
}

#[test]
fn window_end_is_inclusive() {
    let rule = daily(1, RepeatEnd::WindowEnd(utc(2024, 1, 5, 0)));
    let result = starts(&rule, &TimeZoneRule::utc(), utc(2024, 1, 1, 0), 100);
    assert_eq!(result.len(), 5);
    assert_eq!(result.last(), Some(&utc(2024, 1, 5, 0)));
}

#[test]
fn window_end_before_start_yields_nothing() {
    let rule = daily(1, RepeatEnd::WindowEnd(utc(2023, 12, 1, 0)));
    assert!(starts(&rule, &TimeZoneRule::utc(), utc(2024, 1, 1, 0), 100).is_empty());
}

#[test]
fn repeat_forever_is_bounded_by_limit() {
    let rule = daily(2, RepeatEnd::RepeatForever);
    let result = starts(&rule, &TimeZoneRule::utc(), utc(2024, 1, 1, 9), 7);
    assert_eq!(result.len(), 7);
    assert_eq!(result[6], utc(2024, 1, 13, 9));
}

#[test]
fn occurrences_carry_the_duration() {
    let rule = daily(1, RepeatEnd::RepeatInstances(2));
    let result = expand_occurrences(
        &rule,
        &TimeZoneRule::utc(),
        utc(2024, 1, 1, 9),
        Duration::minutes(30),
        10,
    )
    .unwrap();
    assert_eq!(result[1].end - result[1].start, Duration::minutes(30));
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[test]
fn every_weekday_skips_the_weekend() {
    let rule = RecurrenceRule::new(
        RepeatPattern::Daily {
            frequency: DailyFrequency::EveryWeekday,
        },
        RepeatEnd::RepeatInstances(3),
    );
    // 2024-01-05 is a Friday.
    let result = starts(&rule, &TimeZoneRule::utc(), utc(2024, 1, 5, 9), 10);
    assert_eq!(
        result,
        vec![utc(2024, 1, 5, 9), utc(2024, 1, 8, 9), utc(2024, 1, 9, 9)]
    );
}

#[test]
fn biweekly_monday_wednesday_friday() {
    let days: BTreeSet<DayOfWeek> = [DayOfWeek::Mo, DayOfWeek::We, DayOfWeek::Fr]
        .into_iter()
        .collect();
    let rule = RecurrenceRule::new(
        RepeatPattern::Weekly {
            days,
            week_frequency: 2,
        },
        RepeatEnd::RepeatInstances(6),
    );
    let result = starts(&rule, &TimeZoneRule::utc(), utc(2024, 1, 1, 10), 10);
    let days: Vec<u32> = result.iter().map(|d| d.format("%d").to_string().parse().unwrap()).collect();
    assert_eq!(days, vec![1, 3, 5, 15, 17, 19]);
}

#[test]
fn last_weekday_of_month() {
    let rule = RecurrenceRule::new(
        RepeatPattern::MonthlyByDay {
            month_frequency: 1,
            selector: DaySelector::Weekday,
            weekday_of_month: WeekdayOfMonth::Last,
        },
        RepeatEnd::RepeatInstances(3),
    );
    let result = starts(&rule, &TimeZoneRule::utc(), utc(2024, 1, 31, 12), 10);
    assert_eq!(
        result,
        vec![utc(2024, 1, 31, 12), utc(2024, 2, 29, 12), utc(2024, 3, 29, 12)]
    );
}

#[test]
fn yearly_leap_day_skips_common_years() {
    let rule = RecurrenceRule::new(
        RepeatPattern::Yearly {
            year_frequency: 1,
            month: 2,
            day: 29,
        },
        RepeatEnd::RepeatInstances(2),
    );
    let result = starts(&rule, &TimeZoneRule::utc(), utc(2024, 2, 29, 0), 10);
    assert_eq!(result, vec![utc(2024, 2, 29, 0), utc(2028, 2, 29, 0)]);
}

// ---------------------------------------------------------------------------
// Time zones: the wall-clock time stays fixed across daylight switches
// ---------------------------------------------------------------------------

#[test]
fn pacific_daily_crosses_spring_forward() {
    // 09:00 PST = 17:00 UTC; daylight time starts Sunday 2026-03-08.
    let rule = daily(1, RepeatEnd::RepeatInstances(4));
    let result = starts(&rule, &pacific_time_zone(), utc(2026, 3, 6, 17), 10);
    assert_eq!(
        result,
        vec![
            utc(2026, 3, 6, 17),
            utc(2026, 3, 7, 17),
            utc(2026, 3, 8, 16),
            utc(2026, 3, 9, 16),
        ]
    );
}

#[test]
fn pacific_third_tuesday_monthly() {
    let rule = RecurrenceRule::new(
        RepeatPattern::MonthlyByDay {
            month_frequency: 1,
            selector: DaySelector::Days([DayOfWeek::Tu].into_iter().collect()),
            weekday_of_month: WeekdayOfMonth::Third,
        },
        RepeatEnd::RepeatInstances(3),
    );
    // 14:00 PST on 2026-02-17.
    let result = starts(&rule, &pacific_time_zone(), utc(2026, 2, 17, 22), 10);
    assert_eq!(
        result,
        vec![utc(2026, 2, 17, 22), utc(2026, 3, 17, 21), utc(2026, 4, 21, 21)]
    );
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

#[test]
fn recurrence_id_membership() {
    let rule = daily(1, RepeatEnd::RepeatInstances(10));
    let tz = TimeZoneRule::utc();
    let start = utc(2024, 1, 1, 0);

    assert!(is_occurrence(&rule, &tz, start, utc(2024, 1, 2, 0)).unwrap());
    assert!(is_occurrence(&rule, &tz, start, start).unwrap());
    assert!(!is_occurrence(&rule, &tz, start, utc(2024, 1, 2, 12)).unwrap());
    assert!(!is_occurrence(&rule, &tz, start, utc(2023, 12, 31, 0)).unwrap());
    // Past the tenth instance.
    assert!(!is_occurrence(&rule, &tz, start, utc(2024, 1, 11, 0)).unwrap());
}

#[test]
fn repeat_forever_membership_far_ahead() {
    let rule = daily(1, RepeatEnd::RepeatForever);
    let tz = TimeZoneRule::utc();
    let start = utc(2024, 1, 1, 8);
    assert!(is_occurrence(&rule, &tz, start, utc(2025, 6, 30, 8)).unwrap());
    assert!(!is_occurrence(&rule, &tz, start, utc(2025, 6, 30, 9)).unwrap());
}

#[test]
fn membership_past_sixty_five_thousand_instances() {
    let tz = TimeZoneRule::utc();
    let start = utc(2024, 1, 1, 8);
    let candidate = start + Duration::days(66_000);

    let counted = daily(1, RepeatEnd::RepeatInstances(70_000));
    assert!(is_occurrence(&counted, &tz, start, candidate).unwrap());
    assert!(!is_occurrence(&counted, &tz, start, candidate + Duration::hours(1)).unwrap());
    assert!(!is_occurrence(&counted, &tz, start, start + Duration::days(70_000)).unwrap());

    let forever = daily(1, RepeatEnd::RepeatForever);
    assert!(is_occurrence(&forever, &tz, start, candidate).unwrap());
}
