//! Edit validation: merging a set of field edits onto the current item.
//!
//! [`apply_edit`] is the single entry point. It normalizes the legacy
//! `EventType` code, fills unspecified fields from the current item and then
//! checks the consistency rules in a fixed order, returning the first failure.

use chrono::{DateTime, Timelike, Utc};
use outsps_xml::{recurrence, timezone, RecurrenceRule, TimeZoneRule};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::series::{
    AppointmentSeries, CalendarItem, EventType, InstanceKind, ItemId, MasterLookup,
    SeriesInstance,
};
use crate::uid::is_valid_series_uid;

/// The fields a client sends when creating or updating an item.
///
/// `None` leaves the current value in place. `RecurrenceData`, `XMLTZone` and
/// `UID` stay raw strings: for non-recurring items they are never inspected,
/// so malformed content there is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldEdits {
    pub title: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    /// Raw code; `2` is accepted as a legacy spelling of `0`.
    pub event_type: Option<i32>,
    pub is_recurring: Option<bool>,
    pub series_uid: Option<String>,
    pub recurrence_data: Option<String>,
    pub time_zone_data: Option<String>,
    pub recurrence_id: Option<DateTime<Utc>>,
    pub master_series_id: Option<ItemId>,
}

impl FieldEdits {
    /// True when `RecurrenceData` decodes and carries `<deleteExceptions>true`.
    pub fn requests_exception_deletion(&self) -> bool {
        self.recurrence_data
            .as_deref()
            .and_then(|data| recurrence::decode(data).ok())
            .is_some_and(|rule| rule.delete_exceptions)
    }
}

/// Validate `edit` against `current` (absent for a create) and produce the
/// item that would be stored.
///
/// Instances are checked against their master through `masters`. The result
/// keeps the current item's id (0 for a create) and, for a recurring master,
/// its current instances; removing them is the cascade's business.
///
/// # Errors
/// The first failing rule, in order: event type code, required dates,
/// `EndBeforeStart`, `AllDayMustBeMidnight`, `RecurrenceFlagMismatch`, then
/// series data for recurring masters or master/occurrence checks for
/// instances.
pub fn apply_edit<M>(
    current: Option<&CalendarItem>,
    edit: &FieldEdits,
    masters: &M,
) -> Result<CalendarItem>
where
    M: MasterLookup + ?Sized,
{
    let current_series = current.and_then(CalendarItem::as_series);
    let current_instance = current.and_then(CalendarItem::as_instance);

    let event_type = match edit.event_type {
        Some(code) => EventType::from_code(code)?,
        None => current.map_or(EventType::Single, CalendarItem::event_type),
    };

    let event_date = edit
        .event_date
        .or_else(|| current.map(item_event_date))
        .ok_or(ValidationError::MissingField("EventDate"))?;
    let end_date = edit
        .end_date
        .or_else(|| current.map(item_end_date))
        .ok_or(ValidationError::MissingField("EndDate"))?;

    if end_date < event_date {
        return Err(ValidationError::EndBeforeStart);
    }

    let all_day = edit
        .all_day
        .or_else(|| current.map(item_all_day))
        .unwrap_or(false);
    if all_day && !is_midnight(event_date) {
        return Err(ValidationError::AllDayMustBeMidnight);
    }

    let is_recurring = edit
        .is_recurring
        .or_else(|| current_series.map(|s| s.is_recurring))
        .unwrap_or(event_type != EventType::Single);
    match event_type {
        EventType::Single if is_recurring => return Err(ValidationError::RecurrenceFlagMismatch),
        EventType::Recurring if !is_recurring => {
            return Err(ValidationError::RecurrenceFlagMismatch)
        }
        _ => {}
    }

    let title = edit
        .title
        .clone()
        .or_else(|| current.and_then(item_title));

    match event_type {
        EventType::Single => Ok(CalendarItem::Series(AppointmentSeries {
            master_id: current.map_or(0, CalendarItem::id),
            title,
            event_date,
            end_date,
            all_day,
            event_type,
            is_recurring: false,
            series_uid: None,
            recurrence_rule: None,
            time_zone_rule: None,
            instances: Vec::new(),
        })),
        EventType::Recurring => {
            let series_uid = edit
                .series_uid
                .clone()
                .or_else(|| current_series.and_then(|s| s.series_uid.clone()))
                .unwrap_or_default();
            if !is_valid_series_uid(&series_uid) {
                return Err(ValidationError::InvalidSeriesUid(series_uid));
            }

            let mut recurrence_rule = resolve_recurrence(edit, current_series)?;
            recurrence_rule.delete_exceptions = false;
            let time_zone_rule = resolve_time_zone(edit, current_series)?;

            let instances = current_series
                .filter(|s| s.event_type == EventType::Recurring)
                .map(|s| s.instances.clone())
                .unwrap_or_default();

            Ok(CalendarItem::Series(AppointmentSeries {
                master_id: current.map_or(0, CalendarItem::id),
                title,
                event_date,
                end_date,
                all_day,
                event_type,
                is_recurring: true,
                series_uid: Some(series_uid),
                recurrence_rule: Some(recurrence_rule),
                time_zone_rule: Some(time_zone_rule),
                instances,
            }))
        }
        EventType::Exception | EventType::DeletedInstance => {
            let master_series_id = edit
                .master_series_id
                .or_else(|| current_instance.map(|i| i.master_series_id))
                .ok_or(ValidationError::MissingField("MasterSeriesItemID"))?;
            let recurrence_id = edit
                .recurrence_id
                .or_else(|| current_instance.map(|i| i.recurrence_id))
                .ok_or(ValidationError::MissingField("RecurrenceID"))?;

            let is_occurrence = masters
                .master(master_series_id)
                .filter(|m| m.is_recurring_master())
                .and_then(|m| m.is_occurrence(recurrence_id).ok())
                .unwrap_or(false);
            if !is_occurrence {
                return Err(ValidationError::RecurrenceIdNotAnOccurrence);
            }

            let kind = if event_type == EventType::Exception {
                InstanceKind::Exception
            } else {
                InstanceKind::DeletedInstance
            };
            Ok(CalendarItem::Instance(SeriesInstance {
                item_id: current.map_or(0, CalendarItem::id),
                master_series_id,
                recurrence_id,
                kind,
                title,
                event_date,
                end_date,
                all_day,
            }))
        }
    }
}

fn resolve_recurrence(
    edit: &FieldEdits,
    current: Option<&AppointmentSeries>,
) -> Result<RecurrenceRule> {
    match edit.recurrence_data.as_deref() {
        Some(data) => recurrence::decode(data)
            .map_err(|e| ValidationError::MissingRecurrenceData(format!("RecurrenceData: {}", e))),
        None => current
            .and_then(|s| s.recurrence_rule.clone())
            .ok_or_else(|| ValidationError::MissingRecurrenceData("RecurrenceData is absent".into())),
    }
}

fn resolve_time_zone(
    edit: &FieldEdits,
    current: Option<&AppointmentSeries>,
) -> Result<TimeZoneRule> {
    match edit.time_zone_data.as_deref() {
        Some(data) => timezone::decode(data)
            .map_err(|e| ValidationError::MissingRecurrenceData(format!("XMLTZone: {}", e))),
        None => current
            .and_then(|s| s.time_zone_rule.clone())
            .ok_or_else(|| ValidationError::MissingRecurrenceData("XMLTZone is absent".into())),
    }
}

fn is_midnight(dt: DateTime<Utc>) -> bool {
    dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0
}

fn item_event_date(item: &CalendarItem) -> DateTime<Utc> {
    match item {
        CalendarItem::Series(s) => s.event_date,
        CalendarItem::Instance(i) => i.event_date,
    }
}

fn item_end_date(item: &CalendarItem) -> DateTime<Utc> {
    match item {
        CalendarItem::Series(s) => s.end_date,
        CalendarItem::Instance(i) => i.end_date,
    }
}

fn item_all_day(item: &CalendarItem) -> bool {
    match item {
        CalendarItem::Series(s) => s.all_day,
        CalendarItem::Instance(i) => i.all_day,
    }
}

fn item_title(item: &CalendarItem) -> Option<String> {
    match item {
        CalendarItem::Series(s) => s.title.clone(),
        CalendarItem::Instance(i) => i.title.clone(),
    }
}
