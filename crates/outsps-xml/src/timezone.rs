//! TimeZoneXML codec -- the value stored in a calendar item's `XMLTZone` field.
//!
//! ```xml
//! <timeZoneRule>
//!   <standardBias>480</standardBias>
//!   <additionalDaylightBias>-60</additionalDaylightBias>
//!   <standardDate>
//!     <transitionRule month="11" day="su" weekdayOfMonth="first" />
//!     <transitionTime>2:0:0</transitionTime>
//!   </standardDate>
//!   <daylightDate>
//!     <transitionRule month="3" day="su" weekdayOfMonth="second" />
//!     <transitionTime>2:0:0</transitionTime>
//!   </daylightDate>
//! </timeZoneRule>
//! ```
//!
//! A fixed-date transition uses `dayOfMonth="15"` in place of the
//! `day`/`weekdayOfMonth` pair.

use chrono::{NaiveTime, Timelike};
use roxmltree::Node;

use crate::error::{invalid, CodecError, Result};
use crate::types::{DayOfWeek, TimeZoneRule, TransitionDate, TransitionDay, WeekdayOfMonth};
use crate::xml::{attr, child, parse_i32, parse_u32, required_u32, text, unwrap_named, wrap};

/// Encode a time-zone rule into its `XMLTZone` fragment.
pub fn encode(rule: &TimeZoneRule) -> Result<String> {
    rule.validate()?;

    let mut out = String::from("<timeZoneRule>");
    out.push_str(&format!("<standardBias>{}</standardBias>", rule.standard_bias));
    out.push_str(&format!(
        "<additionalDaylightBias>{}</additionalDaylightBias>",
        rule.additional_daylight_bias
    ));
    if let Some(date) = &rule.standard_date {
        encode_transition("standardDate", date, &mut out);
    }
    if let Some(date) = &rule.daylight_date {
        encode_transition("daylightDate", date, &mut out);
    }
    out.push_str("</timeZoneRule>");
    Ok(out)
}

/// Decode an `XMLTZone` fragment.
///
/// `additionalDaylightBias` defaults to 0 when absent. `standardDate` and
/// `daylightDate` must both be present or both absent.
pub fn decode(xml: &str) -> Result<TimeZoneRule> {
    let wrapped = wrap("TimeZoneXML", xml);
    let doc = roxmltree::Document::parse(&wrapped)?;
    let root = unwrap_named(doc.root_element(), "TimeZoneXML");

    let rule_node = child(root, "timeZoneRule").ok_or(CodecError::MissingElement("timeZoneRule"))?;

    let standard_bias = child(rule_node, "standardBias")
        .ok_or(CodecError::MissingElement("standardBias"))
        .and_then(|n| parse_i32("standardBias", text(n)))?;
    let additional_daylight_bias = match child(rule_node, "additionalDaylightBias") {
        Some(n) => parse_i32("additionalDaylightBias", text(n))?,
        None => 0,
    };

    let standard_date = child(rule_node, "standardDate")
        .map(decode_transition)
        .transpose()?;
    let daylight_date = child(rule_node, "daylightDate")
        .map(decode_transition)
        .transpose()?;

    let rule = TimeZoneRule {
        standard_bias,
        additional_daylight_bias,
        standard_date,
        daylight_date,
    };
    rule.validate().map_err(|e| match e {
        CodecError::Encode(message) => invalid("timeZoneRule", message),
        other => other,
    })?;
    Ok(rule)
}

fn encode_transition(element: &str, date: &TransitionDate, out: &mut String) {
    out.push_str(&format!("<{}>", element));
    match date.day {
        TransitionDay::DayOfWeek {
            day,
            weekday_of_month,
        } => out.push_str(&format!(
            "<transitionRule month=\"{}\" day=\"{}\" weekdayOfMonth=\"{}\" />",
            date.month,
            day.code(),
            weekday_of_month.code()
        )),
        TransitionDay::DayOfMonth(d) => out.push_str(&format!(
            "<transitionRule month=\"{}\" dayOfMonth=\"{}\" />",
            date.month, d
        )),
    }
    out.push_str(&format!(
        "<transitionTime>{}</transitionTime>",
        format_transition_time(date.time)
    ));
    out.push_str(&format!("</{}>", element));
}

fn decode_transition(node: Node<'_, '_>) -> Result<TransitionDate> {
    let rule = child(node, "transitionRule").ok_or(CodecError::MissingElement("transitionRule"))?;
    let month = required_u32(rule, "month")?;

    let day = match (attr(rule, "day"), attr(rule, "dayOfMonth")) {
        (Some(day), None) => {
            let day = DayOfWeek::from_code(day).ok_or_else(|| invalid("day", day))?;
            let raw = attr(rule, "weekdayOfMonth").unwrap_or("");
            let weekday_of_month =
                WeekdayOfMonth::from_code(raw).ok_or_else(|| invalid("weekdayOfMonth", raw))?;
            TransitionDay::DayOfWeek {
                day,
                weekday_of_month,
            }
        }
        (None, Some(dom)) => TransitionDay::DayOfMonth(parse_u32("dayOfMonth", dom)?),
        (Some(_), Some(_)) => return Err(invalid("transitionRule", "both day and dayOfMonth")),
        (None, None) => return Err(invalid("transitionRule", "no day selector")),
    };

    let time = match child(node, "transitionTime") {
        Some(n) => parse_transition_time(text(n))?,
        None => return Err(CodecError::MissingElement("transitionTime")),
    };

    Ok(TransitionDate { month, day, time })
}

/// `H:M:S` without zero padding, as the protocol writes it (`2:0:0`).
/// Whole seconds only; [`TimeZoneRule::validate`] rejects anything finer.
pub fn format_transition_time(time: NaiveTime) -> String {
    format!("{}:{}:{}", time.hour(), time.minute(), time.second())
}

/// Accepts `H:M:S` or `H:M`, padded or not.
pub fn parse_transition_time(value: &str) -> Result<NaiveTime> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid("transitionTime", value));
    }
    let mut numbers = [0u32; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = parse_u32("transitionTime", part)?;
    }
    NaiveTime::from_hms_opt(numbers[0], numbers[1], numbers[2])
        .ok_or_else(|| invalid("transitionTime", value))
}
