//! SharePoint field name/value pairs <-> [`FieldEdits`] and stored items.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use outsps_xml::zrow::split_lookup;
use outsps_xml::{recurrence, timezone, ZRow};

use crate::edit::FieldEdits;
use crate::error::FieldError;
use crate::series::{CalendarItem, ItemId};

pub const EVENT_DATE: &str = "EventDate";
pub const END_DATE: &str = "EndDate";
pub const ALL_DAY: &str = "fAllDayEvent";
pub const EVENT_TYPE: &str = "EventType";
pub const RECURRENCE: &str = "fRecurrence";
pub const RECURRENCE_DATA: &str = "RecurrenceData";
pub const TIME_ZONE: &str = "XMLTZone";
pub const UID: &str = "UID";
pub const RECURRENCE_ID: &str = "RecurrenceID";
pub const MASTER_SERIES_ITEM_ID: &str = "MasterSeriesItemID";
pub const TITLE: &str = "Title";
pub const DURATION: &str = "Duration";
pub const ID: &str = "ID";

const SPACED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ZULU_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a date field: `yyyy-MM-dd HH:mm:ss` (UTC) or `yyyy-MM-ddTHH:mm:ssZ`.
pub fn parse_date(field: &'static str, value: &str) -> Result<DateTime<Utc>, FieldError> {
    let value = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, SPACED_FORMAT) {
        return Ok(naive.and_utc());
    }
    recurrence::parse_timestamp(field, value).map_err(|_| invalid(field, value))
}

pub fn format_date(dt: DateTime<Utc>) -> String {
    dt.format(ZULU_FORMAT).to_string()
}

fn invalid(field: &'static str, value: &str) -> FieldError {
    FieldError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, FieldError> {
    match value.trim() {
        "1" | "TRUE" | "True" | "true" => Ok(true),
        "0" | "FALSE" | "False" | "false" => Ok(false),
        other => Err(invalid(field, other)),
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, FieldError> {
    split_lookup(value.trim())
        .parse()
        .map_err(|_| invalid(field, value))
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

impl FieldEdits {
    /// Build edits from field name/value pairs.
    ///
    /// Unknown fields, `ID` and the derived `Duration` are skipped. Empty
    /// values of non-text fields count as absent. `UID`, `RecurrenceData` and
    /// `XMLTZone` are kept verbatim.
    pub fn from_fields<I, K, V>(fields: I) -> Result<Self, FieldError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut edits = FieldEdits::default();
        for (name, value) in fields {
            let value = value.as_ref();
            let name = name.as_ref();
            if value.trim().is_empty() && name != TITLE {
                continue;
            }
            match name {
                TITLE => edits.title = Some(value.to_string()),
                EVENT_DATE => edits.event_date = Some(parse_date(EVENT_DATE, value)?),
                END_DATE => edits.end_date = Some(parse_date(END_DATE, value)?),
                ALL_DAY => edits.all_day = Some(parse_flag(ALL_DAY, value)?),
                EVENT_TYPE => edits.event_type = Some(parse_number(EVENT_TYPE, value)?),
                RECURRENCE => edits.is_recurring = Some(parse_flag(RECURRENCE, value)?),
                UID => edits.series_uid = Some(value.to_string()),
                RECURRENCE_DATA => edits.recurrence_data = Some(value.to_string()),
                TIME_ZONE => edits.time_zone_data = Some(value.to_string()),
                RECURRENCE_ID => edits.recurrence_id = Some(parse_date(RECURRENCE_ID, value)?),
                MASTER_SERIES_ITEM_ID => {
                    edits.master_series_id =
                        Some(parse_number::<ItemId>(MASTER_SERIES_ITEM_ID, value)?)
                }
                _ => {}
            }
        }
        Ok(edits)
    }

    /// Build edits from a `z:row` snapshot.
    pub fn from_zrow(row: &ZRow) -> Result<Self, FieldError> {
        Self::from_fields(&row.fields)
    }

    /// The edits that would recreate `item` from scratch.
    pub fn for_item(item: &CalendarItem) -> Result<Self, FieldError> {
        Self::from_fields(to_fields(item)?)
    }
}

/// Render a stored item as field name/value pairs.
///
/// # Errors
/// Fails only if a stored rule can no longer be encoded.
pub fn to_fields(item: &CalendarItem) -> Result<BTreeMap<String, String>, FieldError> {
    let mut fields = BTreeMap::new();
    let mut put = |name: &str, value: String| {
        fields.insert(name.to_string(), value);
    };

    match item {
        CalendarItem::Series(s) => {
            put(ID, s.master_id.to_string());
            if let Some(title) = &s.title {
                put(TITLE, title.clone());
            }
            put(EVENT_DATE, format_date(s.event_date));
            put(END_DATE, format_date(s.end_date));
            put(ALL_DAY, flag(s.all_day));
            put(EVENT_TYPE, s.event_type.code().to_string());
            put(RECURRENCE, flag(s.is_recurring));
            put(DURATION, s.duration_seconds().to_string());
            if let Some(uid) = &s.series_uid {
                put(UID, uid.clone());
            }
            if let Some(rule) = &s.recurrence_rule {
                let xml = recurrence::encode(rule)
                    .map_err(|e| invalid(RECURRENCE_DATA, &e.to_string()))?;
                put(RECURRENCE_DATA, xml);
            }
            if let Some(tz) = &s.time_zone_rule {
                let xml = timezone::encode(tz).map_err(|e| invalid(TIME_ZONE, &e.to_string()))?;
                put(TIME_ZONE, xml);
            }
        }
        CalendarItem::Instance(i) => {
            put(ID, i.item_id.to_string());
            if let Some(title) = &i.title {
                put(TITLE, title.clone());
            }
            put(EVENT_DATE, format_date(i.event_date));
            put(END_DATE, format_date(i.end_date));
            put(ALL_DAY, flag(i.all_day));
            put(EVENT_TYPE, i.kind.event_type().code().to_string());
            put(RECURRENCE, flag(true));
            put(DURATION, i.duration_seconds().to_string());
            put(RECURRENCE_ID, format_date(i.recurrence_id));
            put(MASTER_SERIES_ITEM_ID, i.master_series_id.to_string());
        }
    }
    Ok(fields)
}
