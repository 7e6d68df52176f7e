//! Standard/daylight switching for [`TimeZoneRule`].
//!
//! Transition dates are given in local wall time: `daylightDate` in standard
//! time, `standardDate` in daylight time. Southern-hemisphere rules, where
//! daylight time starts later in the year than it ends, are supported.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::types::{TimeZoneRule, TransitionDate, TransitionDay, WeekdayOfMonth};

impl TransitionDate {
    /// The local date-time at which this transition happens in `year`.
    ///
    /// Returns `None` only for a month outside 1..=12.
    pub fn resolve(&self, year: i32) -> Option<NaiveDateTime> {
        let date = match self.day {
            TransitionDay::DayOfWeek {
                day,
                weekday_of_month,
            } => {
                let weekday = day.to_weekday();
                match weekday_of_month {
                    WeekdayOfMonth::Last => {
                        NaiveDate::from_weekday_of_month_opt(year, self.month, weekday, 5)
                            .or_else(|| {
                                NaiveDate::from_weekday_of_month_opt(year, self.month, weekday, 4)
                            })?
                    }
                    other => NaiveDate::from_weekday_of_month_opt(
                        year,
                        self.month,
                        weekday,
                        other.position() as u8,
                    )?,
                }
            }
            TransitionDay::DayOfMonth(day) => {
                let last = last_day_of_month(year, self.month)?;
                NaiveDate::from_ymd_opt(year, self.month, day.min(last.day()))?
            }
        };
        Some(date.and_time(self.time))
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

impl TimeZoneRule {
    /// True when the rule defines a daylight period at all.
    pub fn observes_daylight(&self) -> bool {
        self.additional_daylight_bias != 0
            && self.standard_date.is_some()
            && self.daylight_date.is_some()
    }

    /// Daylight start and end (both local) for `year`.
    fn daylight_window(&self, year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if !self.observes_daylight() {
            return None;
        }
        let start = self.daylight_date?.resolve(year)?;
        let end = self.standard_date?.resolve(year)?;
        Some((start, end))
    }

    /// Whether a local wall-clock time falls in daylight time.
    ///
    /// In the repeated hour after the switch back, the daylight reading wins.
    pub fn is_daylight_local(&self, local: NaiveDateTime) -> bool {
        match self.daylight_window(local.year()) {
            Some((start, end)) if start < end => local >= start && local < end,
            Some((start, end)) => local >= start || local < end,
            None => false,
        }
    }

    /// Minutes to add to local time to obtain UTC, at a given UTC instant.
    pub fn bias_at_utc(&self, utc: DateTime<Utc>) -> i32 {
        let standard_local = utc.naive_utc() - Duration::minutes(self.standard_bias.into());
        let daylight_local =
            standard_local - Duration::minutes(self.additional_daylight_bias.into());
        let in_daylight = match self.daylight_window(standard_local.year()) {
            Some((start, end)) if start < end => standard_local >= start && daylight_local < end,
            Some((start, end)) => standard_local >= start || daylight_local < end,
            None => false,
        };
        if in_daylight {
            self.standard_bias + self.additional_daylight_bias
        } else {
            self.standard_bias
        }
    }

    /// Convert a UTC instant to local wall-clock time.
    pub fn to_local(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.naive_utc() - Duration::minutes(self.bias_at_utc(utc).into())
    }

    /// Convert local wall-clock time to a UTC instant.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let mut bias = self.standard_bias;
        if self.is_daylight_local(local) {
            bias += self.additional_daylight_bias;
        }
        (local + Duration::minutes(bias.into())).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DayOfWeek;
    use chrono::{NaiveTime, TimeZone};

    fn pacific() -> TimeZoneRule {
        let two_am = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
        TimeZoneRule {
            standard_bias: 480,
            additional_daylight_bias: -60,
            standard_date: Some(TransitionDate {
                month: 11,
                day: TransitionDay::DayOfWeek {
                    day: DayOfWeek::Su,
                    weekday_of_month: WeekdayOfMonth::First,
                },
                time: two_am,
            }),
            daylight_date: Some(TransitionDate {
                month: 3,
                day: TransitionDay::DayOfWeek {
                    day: DayOfWeek::Su,
                    weekday_of_month: WeekdayOfMonth::Second,
                },
                time: two_am,
            }),
        }
    }

    #[test]
    fn resolves_second_sunday_of_march() {
        let dst_start = pacific().daylight_date.unwrap().resolve(2024).unwrap();
        assert_eq!(
            dst_start,
            NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(2, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn last_weekday_of_month() {
        let date = TransitionDate {
            month: 10,
            day: TransitionDay::DayOfWeek {
                day: DayOfWeek::Su,
                weekday_of_month: WeekdayOfMonth::Last,
            },
            time: NaiveTime::MIN,
        };
        assert_eq!(
            date.resolve(2024).unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 10, 27).unwrap()
        );
    }

    #[test]
    fn day_of_month_clamps() {
        let date = TransitionDate {
            month: 2,
            day: TransitionDay::DayOfMonth(31),
            time: NaiveTime::MIN,
        };
        assert_eq!(
            date.resolve(2023).unwrap().date(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn pacific_bias_by_season() {
        let tz = pacific();
        assert_eq!(tz.bias_at_utc(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()), 480);
        assert_eq!(tz.bias_at_utc(Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()), 420);
    }

    #[test]
    fn local_utc_round_trip() {
        let tz = pacific();
        let utc = Utc.with_ymd_and_hms(2024, 7, 15, 16, 0, 0).unwrap();
        let local = tz.to_local(utc);
        assert_eq!(local.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(tz.to_utc(local), utc);
    }

    #[test]
    fn utc_rule_is_identity() {
        let tz = TimeZoneRule::utc();
        let utc = Utc.with_ymd_and_hms(2024, 7, 15, 16, 0, 0).unwrap();
        assert_eq!(tz.to_local(utc), utc.naive_utc());
        assert_eq!(tz.to_utc(utc.naive_utc()), utc);
    }
}
