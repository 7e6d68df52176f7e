//! Ready-made series, exceptions and time zones for tests and demos.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use outsps_xml::{
    DailyFrequency, DayOfWeek, RecurrenceRule, RepeatEnd, RepeatPattern, TimeZoneRule,
    TransitionDate, TransitionDay, WeekdayOfMonth,
};

use crate::series::{AppointmentSeries, EventType, InstanceKind, SeriesInstance};
use crate::uid::new_series_uid;

/// Local time of both Pacific switch-overs.
const TWO_AM: NaiveTime = match NaiveTime::from_hms_opt(2, 0, 0) {
    Some(time) => time,
    None => panic!("02:00:00 is a valid time of day"),
};

/// US Pacific: UTC-8, daylight time from the second Sunday of March 02:00 to
/// the first Sunday of November 02:00.
pub fn pacific_time_zone() -> TimeZoneRule {
    TimeZoneRule {
        standard_bias: 480,
        additional_daylight_bias: -60,
        standard_date: Some(TransitionDate {
            month: 11,
            day: TransitionDay::DayOfWeek {
                day: DayOfWeek::Su,
                weekday_of_month: WeekdayOfMonth::First,
            },
            time: TWO_AM,
        }),
        daylight_date: Some(TransitionDate {
            month: 3,
            day: TransitionDay::DayOfWeek {
                day: DayOfWeek::Su,
                weekday_of_month: WeekdayOfMonth::Second,
            },
            time: TWO_AM,
        }),
    }
}

/// A one-hour daily series in Pacific time, repeating every `day_frequency`
/// days with a window ending `days` days after `event_date`. Not yet stored.
pub fn daily_series(
    title: &str,
    event_date: DateTime<Utc>,
    day_frequency: u32,
    days: i64,
) -> AppointmentSeries {
    AppointmentSeries {
        master_id: 0,
        title: Some(title.to_string()),
        event_date,
        end_date: event_date + Duration::hours(1),
        all_day: false,
        event_type: EventType::Recurring,
        is_recurring: true,
        series_uid: Some(new_series_uid()),
        recurrence_rule: Some(RecurrenceRule::new(
            RepeatPattern::Daily {
                frequency: DailyFrequency::EveryNDays(day_frequency),
            },
            RepeatEnd::WindowEnd(event_date + Duration::days(days)),
        )),
        time_zone_rule: Some(pacific_time_zone()),
        instances: Vec::new(),
    }
}

/// An exception moving the occurrence at `recurrence_id` to `new_start`,
/// keeping the master's duration.
pub fn exception_for(
    master: &AppointmentSeries,
    recurrence_id: DateTime<Utc>,
    new_start: DateTime<Utc>,
    title: &str,
) -> SeriesInstance {
    SeriesInstance {
        item_id: 0,
        master_series_id: master.master_id,
        recurrence_id,
        kind: InstanceKind::Exception,
        title: Some(title.to_string()),
        event_date: new_start,
        end_date: new_start + Duration::seconds(master.duration_seconds()),
        all_day: master.all_day,
    }
}
