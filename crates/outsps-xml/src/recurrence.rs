//! RecurrenceXML codec -- the value stored in a calendar item's `RecurrenceData` field.
//!
//! The stored value is a fragment with up to two sibling roots:
//!
//! ```xml
//! <recurrence>
//!   <rule>
//!     <firstDayOfWeek>su</firstDayOfWeek>
//!     <repeat><daily dayFrequency="1" /></repeat>
//!     <windowEnd>2009-06-19T00:00:00Z</windowEnd>
//!   </rule>
//! </recurrence>
//! <deleteExceptions>true</deleteExceptions>
//! ```
//!
//! The encoder emits exactly this layout (without whitespace). The decoder is
//! namespace-agnostic, tolerates an enclosing `<RecurrenceXML>` element and an
//! XML declaration, and defaults omitted frequency attributes to 1 and an
//! omitted `firstDayOfWeek` to Sunday.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use roxmltree::Node;

use crate::error::{invalid, CodecError, Result};
use crate::types::{
    DailyFrequency, DayOfWeek, DaySelector, RecurrenceRule, RepeatEnd, RepeatPattern,
    WeekdayOfMonth,
};
use crate::xml::{
    attr, child, elements, flag, frequency, parse_bool, parse_u32, required_u32, text,
    unwrap_named, wrap,
};

const TERMINATORS: [&str; 3] = ["windowEnd", "repeatForever", "repeatInstances"];

/// Encode a recurrence rule into its `RecurrenceData` XML fragment.
///
/// # Errors
/// Returns [`CodecError::Encode`] if the rule violates a structural constraint:
/// zero frequency, month outside 1..=12, empty day set, zero instance count or
/// a `windowEnd` year outside 0..=9999.
pub fn encode(rule: &RecurrenceRule) -> Result<String> {
    rule.validate()?;

    let mut out = String::from("<recurrence><rule>");
    out.push_str(&format!(
        "<firstDayOfWeek>{}</firstDayOfWeek>",
        rule.first_day_of_week.code()
    ));
    out.push_str("<repeat>");
    encode_pattern(&rule.pattern, &mut out);
    out.push_str("</repeat>");
    encode_end(&rule.end, &mut out);
    out.push_str("</rule></recurrence>");

    if rule.delete_exceptions {
        out.push_str("<deleteExceptions>true</deleteExceptions>");
    }
    Ok(out)
}

/// Decode a `RecurrenceData` XML fragment.
///
/// # Errors
/// - [`CodecError::Xml`] for malformed XML
/// - [`CodecError::UnknownPattern`] for a `<repeat>` child outside the closed set
/// - [`CodecError::TerminatorCount`] unless the rule has exactly one terminator
/// - [`CodecError::InvalidValue`] for unparsable or out-of-range values
pub fn decode(xml: &str) -> Result<RecurrenceRule> {
    let wrapped = wrap("RecurrenceXML", xml);
    let doc = roxmltree::Document::parse(&wrapped)?;
    let root = unwrap_named(doc.root_element(), "RecurrenceXML");

    let recurrence = child(root, "recurrence").ok_or(CodecError::MissingElement("recurrence"))?;
    let delete_exceptions = match child(root, "deleteExceptions") {
        Some(node) => parse_bool("deleteExceptions", text(node))?,
        None => false,
    };

    let rule_node = child(recurrence, "rule").ok_or(CodecError::MissingElement("rule"))?;

    let first_day_of_week = match child(rule_node, "firstDayOfWeek") {
        Some(node) => {
            DayOfWeek::from_code(text(node)).ok_or_else(|| invalid("firstDayOfWeek", text(node)))?
        }
        None => DayOfWeek::Su,
    };

    let repeat = child(rule_node, "repeat").ok_or(CodecError::MissingElement("repeat"))?;
    let mut patterns = elements(repeat);
    let pattern_node = patterns
        .next()
        .ok_or(CodecError::MissingElement("repeat pattern"))?;
    if let Some(extra) = patterns.next() {
        return Err(invalid("repeat", extra.tag_name().name()));
    }

    let rule = RecurrenceRule {
        first_day_of_week,
        pattern: decode_pattern(pattern_node)?,
        end: decode_end(rule_node)?,
        delete_exceptions,
    };

    rule.validate().map_err(|e| match e {
        CodecError::Encode(message) => invalid("recurrence", message),
        other => other,
    })?;
    Ok(rule)
}

/// Format a timestamp the way `windowEnd` carries it. Fractional seconds are
/// written only when present.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an xsd:dateTime. A value without an offset is taken as UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid(field, value))
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn encode_pattern(pattern: &RepeatPattern, out: &mut String) {
    let mut attrs: Vec<(&str, String)> = Vec::new();

    match pattern {
        RepeatPattern::Daily { frequency } => match frequency {
            DailyFrequency::EveryNDays(n) => attrs.push(("dayFrequency", n.to_string())),
            DailyFrequency::EveryWeekday => attrs.push(("weekday", "TRUE".to_string())),
        },
        RepeatPattern::Weekly {
            days,
            week_frequency,
        } => {
            for day in days {
                attrs.push((day.code(), "TRUE".to_string()));
            }
            attrs.push(("weekFrequency", week_frequency.to_string()));
        }
        RepeatPattern::MonthlyByDate {
            month_frequency,
            day,
        } => {
            attrs.push(("monthFrequency", month_frequency.to_string()));
            attrs.push(("day", day.to_string()));
        }
        RepeatPattern::MonthlyByDay {
            month_frequency,
            selector,
            weekday_of_month,
        } => {
            selector_attrs(selector, &mut attrs);
            attrs.push(("weekdayOfMonth", weekday_of_month.code().to_string()));
            attrs.push(("monthFrequency", month_frequency.to_string()));
        }
        RepeatPattern::Yearly {
            year_frequency,
            month,
            day,
        } => {
            attrs.push(("yearFrequency", year_frequency.to_string()));
            attrs.push(("month", month.to_string()));
            attrs.push(("day", day.to_string()));
        }
        RepeatPattern::YearlyByDay {
            year_frequency,
            month,
            selector,
            weekday_of_month,
        } => {
            attrs.push(("yearFrequency", year_frequency.to_string()));
            attrs.push(("month", month.to_string()));
            selector_attrs(selector, &mut attrs);
            attrs.push(("weekdayOfMonth", weekday_of_month.code().to_string()));
        }
    }

    out.push('<');
    out.push_str(pattern.element_name());
    for (name, value) in attrs {
        out.push_str(&format!(" {}=\"{}\"", name, value));
    }
    out.push_str(" />");
}

fn selector_attrs(selector: &DaySelector, attrs: &mut Vec<(&str, String)>) {
    match selector {
        DaySelector::Days(days) => {
            for day in days {
                attrs.push((day.code(), "TRUE".to_string()));
            }
        }
        DaySelector::Day => attrs.push(("day", "TRUE".to_string())),
        DaySelector::Weekday => attrs.push(("weekday", "TRUE".to_string())),
        DaySelector::WeekendDay => attrs.push(("weekend_day", "TRUE".to_string())),
    }
}

fn encode_end(end: &RepeatEnd, out: &mut String) {
    match end {
        RepeatEnd::WindowEnd(dt) => {
            out.push_str(&format!("<windowEnd>{}</windowEnd>", format_timestamp(dt)));
        }
        RepeatEnd::RepeatForever => out.push_str("<repeatForever>FALSE</repeatForever>"),
        RepeatEnd::RepeatInstances(n) => {
            out.push_str(&format!("<repeatInstances>{}</repeatInstances>", n));
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn decode_pattern(node: Node<'_, '_>) -> Result<RepeatPattern> {
    let pattern = match node.tag_name().name() {
        "daily" => {
            let frequency = if flag(node, "weekday")? {
                DailyFrequency::EveryWeekday
            } else {
                DailyFrequency::EveryNDays(frequency(node, "dayFrequency")?)
            };
            RepeatPattern::Daily { frequency }
        }
        "weekly" => RepeatPattern::Weekly {
            days: day_flags(node)?.into_iter().collect(),
            week_frequency: frequency(node, "weekFrequency")?,
        },
        "monthly" => RepeatPattern::MonthlyByDate {
            month_frequency: frequency(node, "monthFrequency")?,
            day: required_u32(node, "day")?,
        },
        "monthlyByDay" => RepeatPattern::MonthlyByDay {
            month_frequency: frequency(node, "monthFrequency")?,
            selector: decode_selector(node)?,
            weekday_of_month: weekday_of_month(node)?,
        },
        "yearly" => RepeatPattern::Yearly {
            year_frequency: frequency(node, "yearFrequency")?,
            month: required_u32(node, "month")?,
            day: required_u32(node, "day")?,
        },
        "yearlyByDay" => RepeatPattern::YearlyByDay {
            year_frequency: frequency(node, "yearFrequency")?,
            month: required_u32(node, "month")?,
            selector: decode_selector(node)?,
            weekday_of_month: weekday_of_month(node)?,
        },
        other => return Err(CodecError::UnknownPattern(other.to_string())),
    };
    Ok(pattern)
}

fn day_flags(node: Node<'_, '_>) -> Result<Vec<DayOfWeek>> {
    let mut days = Vec::new();
    for day in DayOfWeek::ALL {
        if flag(node, day.code())? {
            days.push(day);
        }
    }
    Ok(days)
}

/// Exactly one of: explicit day flags, `day`, `weekday`, `weekend_day`.
fn decode_selector(node: Node<'_, '_>) -> Result<DaySelector> {
    let days = day_flags(node)?;
    let mut found = Vec::new();
    if !days.is_empty() {
        found.push(DaySelector::Days(days.into_iter().collect()));
    }
    if flag(node, "day")? {
        found.push(DaySelector::Day);
    }
    if flag(node, "weekday")? {
        found.push(DaySelector::Weekday);
    }
    if flag(node, "weekend_day")? {
        found.push(DaySelector::WeekendDay);
    }

    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(invalid("day selector", "none")),
        _ => Err(invalid("day selector", "more than one selector kind")),
    }
}

fn weekday_of_month(node: Node<'_, '_>) -> Result<WeekdayOfMonth> {
    let raw = attr(node, "weekdayOfMonth").unwrap_or("");
    WeekdayOfMonth::from_code(raw).ok_or_else(|| invalid("weekdayOfMonth", raw))
}

fn decode_end(rule: Node<'_, '_>) -> Result<RepeatEnd> {
    let terminators: Vec<Node<'_, '_>> = elements(rule)
        .filter(|n| TERMINATORS.contains(&n.tag_name().name()))
        .collect();
    if terminators.len() != 1 {
        return Err(CodecError::TerminatorCount(terminators.len()));
    }

    let node = terminators[0];
    let value = text(node);
    match node.tag_name().name() {
        "windowEnd" => Ok(RepeatEnd::WindowEnd(parse_timestamp("windowEnd", value)?)),
        "repeatForever" => {
            // The only legal literal is FALSE.
            if value.eq_ignore_ascii_case("false") {
                Ok(RepeatEnd::RepeatForever)
            } else {
                Err(invalid("repeatForever", value))
            }
        }
        _ => Ok(RepeatEnd::RepeatInstances(parse_u32(
            "repeatInstances",
            value,
        )?)),
    }
}
