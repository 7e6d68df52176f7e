//! Exception cascade planning.
//!
//! When a recurring master's schedule changes and the edit carries
//! `<deleteExceptions>true</deleteExceptions>`, every exception and deleted
//! instance of that master is removed before the change commits. The plan is
//! all-or-nothing: either every instance id is listed or none is.

use serde::Serialize;

use crate::behavior::ServerBehavior;
use crate::edit::FieldEdits;
use crate::error::CascadeConflict;
use crate::series::{AppointmentSeries, CalendarItem, ItemId};

/// The instances to delete alongside one master update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadePlan {
    pub master_id: ItemId,
    pub deleted: Vec<ItemId>,
}

impl CascadePlan {
    fn all_instances(master: &AppointmentSeries) -> Self {
        Self {
            master_id: master.master_id,
            deleted: master.instances.iter().map(|i| i.item_id).collect(),
        }
    }
}

/// True when the start, end, recurrence rule or time-zone rule differ.
///
/// The `deleteExceptions` marker is not part of the schedule.
pub fn schedule_changed(current: &AppointmentSeries, updated: &AppointmentSeries) -> bool {
    let rule_changed = match (&current.recurrence_rule, &updated.recurrence_rule) {
        (Some(a), Some(b)) => !a.same_schedule(b),
        (None, None) => false,
        _ => true,
    };
    current.event_date != updated.event_date
        || current.end_date != updated.end_date
        || rule_changed
        || current.time_zone_rule != updated.time_zone_rule
}

/// Decide which instances an edit deletes.
///
/// `updated` is the result of [`crate::apply_edit`] for the same `current`
/// and `edit`. Returns `Ok(None)` when nothing cascades.
///
/// # Errors
/// [`CascadeConflict`] when the edit asks for exception deletion on a
/// recurring item that is being created, or on an existing item that is not a
/// recurring master.
pub fn plan_cascade(
    current: Option<&CalendarItem>,
    updated: &CalendarItem,
    edit: &FieldEdits,
    behavior: &ServerBehavior,
) -> Result<Option<CascadePlan>, CascadeConflict> {
    // RecurrenceData of a non-recurring item is never inspected.
    let Some(updated) = updated.as_series().filter(|s| s.is_recurring_master()) else {
        return Ok(None);
    };
    if !edit.requests_exception_deletion() {
        return Ok(None);
    }

    let current = match current {
        None => return Err(CascadeConflict::NoMaster),
        Some(item) => item
            .as_series()
            .filter(|s| s.is_recurring_master())
            .ok_or(CascadeConflict::NotRecurring(item.id()))?,
    };

    if !behavior.cascade_on_edit || !schedule_changed(current, updated) {
        return Ok(None);
    }
    Ok(Some(CascadePlan::all_instances(current)))
}

/// Deleting a master deletes all of its instances.
pub fn plan_master_delete(master: &AppointmentSeries) -> CascadePlan {
    CascadePlan::all_instances(master)
}
