//! # outsps-xml
//!
//! Codecs for the two XML fragment types an Outlook/SharePoint calendar item
//! carries: `RecurrenceXML` (stored in the `RecurrenceData` field) and
//! `TimeZoneXML` (stored in `XMLTZone`), plus a reader for the list store's
//! `z:row` item snapshots.
//!
//! ## Quick start
//!
//! ```rust
//! use outsps_xml::{recurrence, DailyFrequency, RecurrenceRule, RepeatEnd, RepeatPattern};
//!
//! let rule = RecurrenceRule::new(
//!     RepeatPattern::Daily { frequency: DailyFrequency::EveryNDays(2) },
//!     RepeatEnd::RepeatInstances(10),
//! );
//! let xml = recurrence::encode(&rule).unwrap();
//! assert!(xml.contains(r#"<daily dayFrequency="2" />"#));
//! assert_eq!(recurrence::decode(&xml).unwrap(), rule);
//! ```
//!
//! ## Modules
//!
//! - [`recurrence`]: `RecurrenceRule` <-> `RecurrenceData` XML
//! - [`timezone`]: `TimeZoneRule` <-> `XMLTZone` XML
//! - [`types`]: the typed rule structures
//! - [`zrow`]: `z:row` attribute-bag reader
//! - [`error`]: Error types
//!
//! Standard/daylight arithmetic on [`TimeZoneRule`] lives in `transition.rs`.

pub mod error;
pub mod recurrence;
pub mod timezone;
mod transition;
pub mod types;
mod xml;
pub mod zrow;

pub use error::{CodecError, DecodeError};
pub use types::{
    DailyFrequency, DayOfWeek, DaySelector, RecurrenceRule, RepeatEnd, RepeatPattern,
    TimeZoneRule, TransitionDate, TransitionDay, WeekdayOfMonth,
};
pub use zrow::{parse_rows, ZRow};
