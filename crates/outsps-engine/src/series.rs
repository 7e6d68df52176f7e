//! The appointment series model: masters, single items and their instances.
//!
//! A recurring appointment is one [`AppointmentSeries`] (the master) that owns
//! zero or more [`SeriesInstance`] records: exceptions that replace one
//! occurrence and deleted-instance markers that cancel one. Instances never
//! outlive their master.

use chrono::{DateTime, Duration, Utc};
use outsps_xml::{RecurrenceRule, TimeZoneRule};
use serde::{Deserialize, Serialize};

use crate::error::{ExpandError, ValidationError};
use crate::expander::{self, Occurrence};

/// Server-assigned list item identifier. `0` marks an item not yet stored.
pub type ItemId = u32;

/// The `EventType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    Single,
    Recurring,
    DeletedInstance,
    Exception,
}

impl EventType {
    /// Map a wire code. The deprecated code `2` reads as [`EventType::Single`].
    pub fn from_code(code: i32) -> Result<Self, ValidationError> {
        match code {
            0 | 2 => Ok(EventType::Single),
            1 => Ok(EventType::Recurring),
            3 => Ok(EventType::DeletedInstance),
            4 => Ok(EventType::Exception),
            other => Err(ValidationError::InvalidEventType(other)),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            EventType::Single => 0,
            EventType::Recurring => 1,
            EventType::DeletedInstance => 3,
            EventType::Exception => 4,
        }
    }

    /// Exception or deleted instance.
    pub fn is_instance(self) -> bool {
        matches!(self, EventType::DeletedInstance | EventType::Exception)
    }
}

/// What a [`SeriesInstance`] does to its occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstanceKind {
    Exception,
    DeletedInstance,
}

impl InstanceKind {
    pub fn event_type(self) -> EventType {
        match self {
            InstanceKind::Exception => EventType::Exception,
            InstanceKind::DeletedInstance => EventType::DeletedInstance,
        }
    }
}

/// A single appointment or the master of a recurring series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSeries {
    pub master_id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    pub event_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub all_day: bool,
    /// Always `Single` or `Recurring`.
    pub event_type: EventType,
    pub is_recurring: bool,
    /// Only kept for recurring masters.
    #[serde(default)]
    pub series_uid: Option<String>,
    #[serde(default)]
    pub recurrence_rule: Option<RecurrenceRule>,
    #[serde(default)]
    pub time_zone_rule: Option<TimeZoneRule>,
    #[serde(default)]
    pub instances: Vec<SeriesInstance>,
}

impl AppointmentSeries {
    /// `EndDate - EventDate` in seconds; never negative for a validated item.
    pub fn duration_seconds(&self) -> i64 {
        (self.end_date - self.event_date).num_seconds()
    }

    pub fn is_recurring_master(&self) -> bool {
        self.event_type == EventType::Recurring && self.recurrence_rule.is_some()
    }

    pub fn instance(&self, item_id: ItemId) -> Option<&SeriesInstance> {
        self.instances.iter().find(|i| i.item_id == item_id)
    }

    /// The nominal occurrences of this series, at most `limit` of them.
    ///
    /// A single item yields itself.
    pub fn occurrences(&self, limit: u16) -> Result<Vec<Occurrence>, ExpandError> {
        match (&self.recurrence_rule, self.event_type) {
            (Some(rule), EventType::Recurring) => {
                let tz = self.time_zone_rule.clone().unwrap_or_else(TimeZoneRule::utc);
                expander::expand_occurrences(
                    rule,
                    &tz,
                    self.event_date,
                    Duration::seconds(self.duration_seconds()),
                    limit,
                )
            }
            _ => Ok(vec![Occurrence {
                start: self.event_date,
                end: self.end_date,
            }]),
        }
    }

    /// Whether `start` is the start of one of this series' nominal occurrences.
    pub fn is_occurrence(&self, start: DateTime<Utc>) -> Result<bool, ExpandError> {
        match (&self.recurrence_rule, self.event_type) {
            (Some(rule), EventType::Recurring) => {
                let tz = self.time_zone_rule.clone().unwrap_or_else(TimeZoneRule::utc);
                expander::is_occurrence(rule, &tz, self.event_date, start)
            }
            _ => Err(ExpandError::NotRecurring(self.master_id)),
        }
    }
}

/// An exception or deleted-instance record of a recurring master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInstance {
    pub item_id: ItemId,
    pub master_series_id: ItemId,
    /// Start of the overridden occurrence, on the master's own schedule.
    pub recurrence_id: DateTime<Utc>,
    pub kind: InstanceKind,
    #[serde(default)]
    pub title: Option<String>,
    pub event_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub all_day: bool,
}

impl SeriesInstance {
    pub fn duration_seconds(&self) -> i64 {
        (self.end_date - self.event_date).num_seconds()
    }
}

/// Any calendar list item: a series (single or master) or an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "camelCase")]
pub enum CalendarItem {
    Series(AppointmentSeries),
    Instance(SeriesInstance),
}

impl CalendarItem {
    pub fn id(&self) -> ItemId {
        match self {
            CalendarItem::Series(s) => s.master_id,
            CalendarItem::Instance(i) => i.item_id,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            CalendarItem::Series(s) => s.event_type,
            CalendarItem::Instance(i) => i.kind.event_type(),
        }
    }

    pub fn as_series(&self) -> Option<&AppointmentSeries> {
        match self {
            CalendarItem::Series(s) => Some(s),
            CalendarItem::Instance(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&SeriesInstance> {
        match self {
            CalendarItem::Instance(i) => Some(i),
            CalendarItem::Series(_) => None,
        }
    }
}

/// Read access to the recurring masters of one list.
pub trait MasterLookup {
    fn master(&self, id: ItemId) -> Option<&AppointmentSeries>;
}

impl MasterLookup for [AppointmentSeries] {
    fn master(&self, id: ItemId) -> Option<&AppointmentSeries> {
        self.iter().find(|s| s.master_id == id)
    }
}

impl MasterLookup for Vec<AppointmentSeries> {
    fn master(&self, id: ItemId) -> Option<&AppointmentSeries> {
        self.as_slice().master(id)
    }
}

impl MasterLookup for std::collections::BTreeMap<ItemId, AppointmentSeries> {
    fn master(&self, id: ItemId) -> Option<&AppointmentSeries> {
        self.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_code_two_is_single() {
        assert_eq!(EventType::from_code(2).unwrap(), EventType::Single);
        assert_eq!(EventType::from_code(0).unwrap(), EventType::Single);
        assert_eq!(EventType::Single.code(), 0);
    }

    #[test]
    fn unknown_codes_rejected() {
        assert_eq!(
            EventType::from_code(5),
            Err(ValidationError::InvalidEventType(5))
        );
        assert!(EventType::from_code(-1).is_err());
    }

    #[test]
    fn instance_kinds() {
        assert!(EventType::Exception.is_instance());
        assert!(EventType::DeletedInstance.is_instance());
        assert!(!EventType::Recurring.is_instance());
        assert_eq!(InstanceKind::DeletedInstance.event_type().code(), 3);
    }
}
