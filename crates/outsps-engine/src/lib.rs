//! # outsps-engine
//!
//! The recurring-appointment model behind Outlook/SharePoint calendar lists:
//! series masters, exceptions and deleted-instance markers, the rules that
//! keep them consistent, and the cascade that clears exceptions when a
//! master's schedule changes.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use outsps_engine::{fixtures, CalendarItem, FieldEdits, ListItemStore, SeriesList};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap();
//! let master = fixtures::daily_series("Standup", start, 1, 9);
//! let mut list = SeriesList::default();
//!
//! let edits = FieldEdits::for_item(&CalendarItem::Series(master)).unwrap();
//! let report = list.submit(None, &edits).unwrap();
//! assert!(report.created);
//! assert_eq!(list.series(report.item.id()).unwrap().occurrences(100).unwrap().len(), 10);
//! ```
//!
//! ## Modules
//!
//! - [`series`]: `AppointmentSeries`, `SeriesInstance`, `EventType`
//! - [`edit`]: `FieldEdits` and `apply_edit` (the validation rules)
//! - [`cascade`]: exception cascade planning
//! - [`expander`]: occurrence expansion via RRULE
//! - [`fields`]: SharePoint field name/value mapping
//! - [`store`]: `ListItemStore` and the in-memory `SeriesList`
//! - [`behavior`]: server-optional toggles
//! - [`uid`], [`names`], [`fixtures`]: helpers
//! - [`error`]: Error types

pub mod behavior;
pub mod cascade;
pub mod edit;
pub mod error;
pub mod expander;
pub mod fields;
pub mod fixtures;
pub mod names;
pub mod series;
pub mod store;
pub mod uid;

pub use behavior::ServerBehavior;
pub use cascade::{plan_cascade, plan_master_delete, schedule_changed, CascadePlan};
pub use edit::{apply_edit, FieldEdits};
pub use error::{CascadeConflict, ExpandError, FieldError, StoreError, ValidationError};
pub use expander::{expand_occurrences, is_occurrence, Occurrence};
pub use fields::to_fields;
pub use names::{resource_name, NameSequence};
pub use series::{
    AppointmentSeries, CalendarItem, EventType, InstanceKind, ItemId, MasterLookup,
    SeriesInstance,
};
pub use store::{ChangeFeed, ChangeToken, CommitReport, ListItemStore, SeriesList};
pub use uid::{is_valid_series_uid, new_series_uid};
