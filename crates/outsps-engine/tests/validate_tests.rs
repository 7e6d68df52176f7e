//! Tests for the edit validation rules.

use chrono::{DateTime, TimeZone, Utc};
use outsps_engine::{
    apply_edit, AppointmentSeries, CalendarItem, EventType, FieldEdits, InstanceKind,
    ValidationError,
};

const DAILY_TEN: &str = "<recurrence><rule><firstDayOfWeek>su</firstDayOfWeek>\
<repeat><daily dayFrequency=\"1\" /></repeat>\
<repeatInstances>10</repeatInstances></rule></recurrence>";

const NO_OFFSET: &str = "<timeZoneRule><standardBias>0</standardBias>\
<additionalDaylightBias>0</additionalDaylightBias></timeZoneRule>";

const SERIES_UID: &str = "{6C1B4F2E-8D3A-4B5C-9E7F-0A1B2C3D4E5F}";

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn single(start: DateTime<Utc>, end: DateTime<Utc>) -> FieldEdits {
    FieldEdits {
        event_date: Some(start),
        end_date: Some(end),
        event_type: Some(0),
        is_recurring: Some(false),
        ..Default::default()
    }
}

fn recurring_master() -> FieldEdits {
    FieldEdits {
        title: Some("Daily".into()),
        event_date: Some(utc(2024, 1, 1, 0, 0, 0)),
        end_date: Some(utc(2024, 1, 1, 1, 0, 0)),
        event_type: Some(1),
        is_recurring: Some(true),
        series_uid: Some(SERIES_UID.into()),
        recurrence_data: Some(DAILY_TEN.into()),
        time_zone_data: Some(NO_OFFSET.into()),
        ..Default::default()
    }
}

/// A stored recurring master with id 1.
fn stored_master() -> Vec<AppointmentSeries> {
    let none: Vec<AppointmentSeries> = Vec::new();
    let item = apply_edit(None, &recurring_master(), &none).unwrap();
    let CalendarItem::Series(mut master) = item else {
        panic!("expected a series");
    };
    master.master_id = 1;
    vec![master]
}

fn exception(recurrence_id: DateTime<Utc>) -> FieldEdits {
    FieldEdits {
        event_date: Some(recurrence_id),
        end_date: Some(recurrence_id + chrono::Duration::hours(1)),
        event_type: Some(4),
        is_recurring: Some(true),
        master_series_id: Some(1),
        recurrence_id: Some(recurrence_id),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

#[test]
fn end_before_start_rejected() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let edit = single(utc(2024, 1, 1, 10, 0, 0), utc(2024, 1, 1, 9, 0, 0));
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::EndBeforeStart)
    );
}

#[test]
fn zero_length_event_allowed() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let at = utc(2024, 1, 1, 10, 0, 0);
    let item = apply_edit(None, &single(at, at), &masters).unwrap();
    assert_eq!(item.as_series().unwrap().duration_seconds(), 0);
}

#[test]
fn all_day_midnight_accepted() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = single(utc(2009, 5, 19, 0, 0, 0), utc(2009, 5, 19, 23, 59, 59));
    edit.all_day = Some(true);
    let item = apply_edit(None, &edit, &masters).unwrap();
    assert!(item.as_series().unwrap().all_day);
}

#[test]
fn all_day_off_midnight_rejected() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = single(utc(2009, 5, 19, 8, 0, 0), utc(2009, 5, 19, 23, 59, 59));
    edit.all_day = Some(true);
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::AllDayMustBeMidnight)
    );
}

#[test]
fn rules_short_circuit_in_order() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    // Both end-before-start and all-day-not-midnight; the first rule wins.
    let mut edit = single(utc(2009, 5, 19, 8, 0, 0), utc(2009, 5, 19, 7, 0, 0));
    edit.all_day = Some(true);
    edit.is_recurring = Some(true);
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::EndBeforeStart)
    );
}

// ---------------------------------------------------------------------------
// Event type and recurrence flag
// ---------------------------------------------------------------------------

#[test]
fn recurring_type_requires_flag() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = recurring_master();
    edit.is_recurring = Some(false);
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::RecurrenceFlagMismatch)
    );
}

#[test]
fn single_type_forbids_flag() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = single(utc(2024, 1, 1, 9, 0, 0), utc(2024, 1, 1, 10, 0, 0));
    edit.is_recurring = Some(true);
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::RecurrenceFlagMismatch)
    );
}

#[test]
fn legacy_event_type_two_is_single() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let zero = single(utc(2024, 1, 1, 9, 0, 0), utc(2024, 1, 1, 10, 0, 0));
    let two = FieldEdits {
        event_type: Some(2),
        ..zero.clone()
    };
    let a = apply_edit(None, &zero, &masters).unwrap();
    let b = apply_edit(None, &two, &masters).unwrap();
    assert_eq!(a, b);
    assert_eq!(b.event_type(), EventType::Single);
}

#[test]
fn unknown_event_type_rejected() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = single(utc(2024, 1, 1, 9, 0, 0), utc(2024, 1, 1, 10, 0, 0));
    edit.event_type = Some(7);
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::InvalidEventType(7))
    );
}

// ---------------------------------------------------------------------------
// Recurring masters
// ---------------------------------------------------------------------------

#[test]
fn recurring_master_accepted_and_decoded() {
    let masters = stored_master();
    let master = &masters[0];
    assert!(master.is_recurring_master());
    assert_eq!(master.series_uid.as_deref(), Some(SERIES_UID));
    assert_eq!(master.time_zone_rule.as_ref().unwrap().standard_bias, 0);
    assert_eq!(master.occurrences(100).unwrap().len(), 10);
}

#[test]
fn recurring_master_needs_valid_uid() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = recurring_master();
    edit.series_uid = Some("invalidUID".into());
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::InvalidSeriesUid("invalidUID".into()))
    );

    edit.series_uid = None;
    assert!(matches!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::InvalidSeriesUid(_))
    ));
}

#[test]
fn recurring_master_needs_recurrence_data() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = recurring_master();
    edit.recurrence_data = None;
    assert!(matches!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::MissingRecurrenceData(_))
    ));

    let mut edit = recurring_master();
    edit.time_zone_data = Some("<timeZoneRule>".into());
    assert!(matches!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::MissingRecurrenceData(_))
    ));
}

#[test]
fn stored_rule_drops_delete_exceptions_marker() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = recurring_master();
    edit.recurrence_data = Some(format!(
        "{}<deleteExceptions>true</deleteExceptions>",
        DAILY_TEN
    ));
    let item = apply_edit(None, &edit, &masters).unwrap();
    let rule = item.as_series().unwrap().recurrence_rule.clone().unwrap();
    assert!(!rule.delete_exceptions);
}

// ---------------------------------------------------------------------------
// Ignored fields on non-recurring items
// ---------------------------------------------------------------------------

#[test]
fn ignored_fields_never_inspected() {
    let masters: Vec<AppointmentSeries> = Vec::new();
    let mut edit = single(utc(2024, 1, 1, 9, 0, 0), utc(2024, 1, 1, 10, 0, 0));
    edit.series_uid = Some("invalidUID".into());
    edit.recurrence_data = Some("<recurrence><rule>".into());
    edit.time_zone_data = Some("not xml at all".into());

    let item = apply_edit(None, &edit, &masters).unwrap();
    let series = item.as_series().unwrap();
    assert_eq!(series.series_uid, None);
    assert_eq!(series.recurrence_rule, None);
    assert_eq!(series.time_zone_rule, None);
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[test]
fn exception_on_an_occurrence_accepted() {
    let masters = stored_master();
    let item = apply_edit(None, &exception(utc(2024, 1, 2, 0, 0, 0)), &masters).unwrap();
    let instance = item.as_instance().unwrap();
    assert_eq!(instance.kind, InstanceKind::Exception);
    assert_eq!(instance.master_series_id, 1);
}

#[test]
fn exception_between_occurrences_rejected() {
    let masters = stored_master();
    assert_eq!(
        apply_edit(None, &exception(utc(2024, 1, 2, 12, 0, 0)), &masters),
        Err(ValidationError::RecurrenceIdNotAnOccurrence)
    );
}

#[test]
fn deleted_instance_accepts_either_flag() {
    let masters = stored_master();
    let mut edit = exception(utc(2024, 1, 3, 0, 0, 0));
    edit.event_type = Some(3);
    edit.is_recurring = Some(false);
    let item = apply_edit(None, &edit, &masters).unwrap();
    assert_eq!(item.event_type(), EventType::DeletedInstance);
}

#[test]
fn instance_needs_an_existing_recurring_master() {
    let masters = stored_master();
    let mut edit = exception(utc(2024, 1, 2, 0, 0, 0));
    edit.master_series_id = Some(42);
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::RecurrenceIdNotAnOccurrence)
    );

    let mut singles = stored_master();
    singles[0].event_type = EventType::Single;
    assert_eq!(
        apply_edit(None, &exception(utc(2024, 1, 2, 0, 0, 0)), &singles),
        Err(ValidationError::RecurrenceIdNotAnOccurrence)
    );
}

#[test]
fn instance_needs_references() {
    let masters = stored_master();
    let mut edit = exception(utc(2024, 1, 2, 0, 0, 0));
    edit.recurrence_id = None;
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::MissingField("RecurrenceID"))
    );

    let mut edit = exception(utc(2024, 1, 2, 0, 0, 0));
    edit.master_series_id = None;
    assert_eq!(
        apply_edit(None, &edit, &masters),
        Err(ValidationError::MissingField("MasterSeriesItemID"))
    );
}
