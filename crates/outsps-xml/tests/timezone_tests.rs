//! Tests for the TimeZoneXML codec.

use chrono::NaiveTime;
use outsps_xml::timezone::{decode, encode};
use outsps_xml::{
    CodecError, DayOfWeek, TimeZoneRule, TransitionDate, TransitionDay, WeekdayOfMonth,
};

const PACIFIC: &str = "<timeZoneRule><standardBias>480</standardBias>\
<additionalDaylightBias>-60</additionalDaylightBias>\
<standardDate><transitionRule month=\"11\" day=\"su\" weekdayOfMonth=\"first\" /><transitionTime>2:0:0</transitionTime></standardDate>\
<daylightDate><transitionRule month=\"3\" day=\"su\" weekdayOfMonth=\"second\" /><transitionTime>2:0:0</transitionTime></daylightDate>\
</timeZoneRule>";

fn two_am() -> NaiveTime {
    NaiveTime::from_hms_opt(2, 0, 0).unwrap()
}

#[test]
fn decodes_pacific_rule() {
    let rule = decode(PACIFIC).unwrap();
    assert_eq!(rule.standard_bias, 480);
    assert_eq!(rule.additional_daylight_bias, -60);
    assert_eq!(
        rule.standard_date,
        Some(TransitionDate {
            month: 11,
            day: TransitionDay::DayOfWeek {
                day: DayOfWeek::Su,
                weekday_of_month: WeekdayOfMonth::First,
            },
            time: two_am(),
        })
    );
    assert_eq!(rule.daylight_date.unwrap().month, 3);
}

#[test]
fn pacific_encodes_back_to_wire_layout() {
    let rule = decode(PACIFIC).unwrap();
    assert_eq!(encode(&rule).unwrap(), PACIFIC);
}

#[test]
fn negative_and_zero_biases_are_plain_integers() {
    let xml = "<timeZoneRule><standardBias>-330</standardBias></timeZoneRule>";
    let rule = decode(xml).unwrap();
    assert_eq!(rule.standard_bias, -330);
    assert_eq!(rule.additional_daylight_bias, 0);
    assert!(!rule.observes_daylight());
}

#[test]
fn degenerate_rule_is_legal() {
    let rule = TimeZoneRule::utc();
    let xml = encode(&rule).unwrap();
    assert_eq!(decode(&xml).unwrap(), rule);
}

#[test]
fn day_of_month_transition() {
    let rule = TimeZoneRule {
        standard_bias: -600,
        additional_daylight_bias: -60,
        standard_date: Some(TransitionDate {
            month: 4,
            day: TransitionDay::DayOfMonth(6),
            time: NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
        }),
        daylight_date: Some(TransitionDate {
            month: 10,
            day: TransitionDay::DayOfMonth(5),
            time: two_am(),
        }),
    };
    let xml = encode(&rule).unwrap();
    assert!(xml.contains(r#"<transitionRule month="4" dayOfMonth="6" />"#), "{}", xml);
    assert_eq!(decode(&xml).unwrap(), rule);
}

#[test]
fn rejects_non_integer_bias() {
    let err = decode("<timeZoneRule><standardBias>eight hours</standardBias></timeZoneRule>").unwrap_err();
    assert!(matches!(err, CodecError::InvalidValue { field: "standardBias", .. }));
}

#[test]
fn rejects_missing_standard_bias() {
    let err = decode("<timeZoneRule></timeZoneRule>").unwrap_err();
    assert!(matches!(err, CodecError::MissingElement("standardBias")));
}

#[test]
fn rejects_month_out_of_range() {
    let xml = PACIFIC.replace("month=\"11\"", "month=\"13\"");
    assert!(matches!(decode(&xml), Err(CodecError::InvalidValue { .. })));
}

#[test]
fn rejects_unknown_week_ordinal() {
    let xml = PACIFIC.replace("weekdayOfMonth=\"first\"", "weekdayOfMonth=\"fifth\"");
    assert!(matches!(
        decode(&xml),
        Err(CodecError::InvalidValue { field: "weekdayOfMonth", .. })
    ));
}

#[test]
fn rejects_lone_transition_date() {
    let xml = "<timeZoneRule><standardBias>480</standardBias><additionalDaylightBias>-60</additionalDaylightBias>\
<standardDate><transitionRule month=\"11\" day=\"su\" weekdayOfMonth=\"first\" /><transitionTime>2:0:0</transitionTime></standardDate>\
</timeZoneRule>";
    assert!(matches!(decode(xml), Err(CodecError::InvalidValue { .. })));
}

#[test]
fn encode_rejects_lone_transition_date() {
    let mut rule = decode(PACIFIC).unwrap();
    rule.daylight_date = None;
    assert!(matches!(encode(&rule), Err(CodecError::Encode(_))));
}

#[test]
fn encode_rejects_sub_second_transition_time() {
    let mut rule = decode(PACIFIC).unwrap();
    if let Some(date) = rule.standard_date.as_mut() {
        date.time = NaiveTime::from_hms_milli_opt(2, 0, 0, 250).unwrap();
    }
    assert!(matches!(encode(&rule), Err(CodecError::Encode(_))));
}
