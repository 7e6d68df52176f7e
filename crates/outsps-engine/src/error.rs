//! Error types for outsps-engine operations.

use thiserror::Error;

use crate::series::ItemId;

/// An edit rejected by [`crate::apply_edit`]. Rules are checked in a fixed
/// order and the first failure is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("EventType {0} is not a known event type")]
    InvalidEventType(i32),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("EndDate is earlier than EventDate")]
    EndBeforeStart,

    #[error("an all-day event must start at midnight UTC")]
    AllDayMustBeMidnight,

    #[error("fRecurrence does not agree with EventType")]
    RecurrenceFlagMismatch,

    #[error("UID is not a valid GUID: {0:?}")]
    InvalidSeriesUid(String),

    #[error("recurring item lacks usable recurrence data: {0}")]
    MissingRecurrenceData(String),

    #[error("RecurrenceID is not the start of an occurrence of the master series")]
    RecurrenceIdNotAnOccurrence,

    #[error("the recurrence pattern changed but the UID did not")]
    SeriesUidNotRotated,
}

/// `deleteExceptions` was sent against something that is not a recurring master.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CascadeConflict {
    #[error("deleteExceptions sent while creating an item; there is no master to cascade from")]
    NoMaster,

    #[error("deleteExceptions sent for item {0}, which is not a recurring master")]
    NotRecurring(ItemId),
}

/// Failure to expand a recurrence rule into occurrences.
#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("item {0} is not a recurring series")]
    NotRecurring(ItemId),
}

/// A SharePoint field value that could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid value for field {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

/// Errors from the in-memory list store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cascade(#[from] CascadeConflict),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("list item {0} does not exist")]
    ItemNotFound(ItemId),

    #[error("another series already uses UID {0}")]
    DuplicateSeriesUid(String),

    #[error("item {0} cannot change between a series and a series instance")]
    KindChange(ItemId),
}

pub type Result<T> = std::result::Result<T, ValidationError>;
