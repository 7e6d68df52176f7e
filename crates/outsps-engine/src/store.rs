//! The list item store seam and an in-memory implementation.
//!
//! [`SeriesList`] keeps each single item or recurring master together with its
//! instances. Every commit runs [`apply_edit`], the optional UID checks and
//! [`plan_cascade`] before anything changes, so a rejected edit leaves the list
//! untouched and an accepted one lands together with its cascade.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::behavior::ServerBehavior;
use crate::cascade::{plan_cascade, plan_master_delete};
use crate::edit::{apply_edit, FieldEdits};
use crate::error::{StoreError, ValidationError};
use crate::series::{AppointmentSeries, CalendarItem, ItemId, MasterLookup, SeriesInstance};

/// Monotonic change token. `0` predates every change.
pub type ChangeToken = u64;

/// Outcome of one accepted [`ListItemStore::submit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub item: CalendarItem,
    pub created: bool,
    /// Instances removed by this commit, ascending.
    pub removed_instances: Vec<ItemId>,
    pub change_token: ChangeToken,
}

/// Items changed and deleted after a token, both ascending by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFeed {
    pub change_token: ChangeToken,
    pub items: Vec<CalendarItem>,
    pub deleted: Vec<ItemId>,
}

/// Field-level access to one calendar list.
pub trait ListItemStore {
    /// Create (`id == None`) or update an item.
    fn submit(&mut self, id: Option<ItemId>, edit: &FieldEdits) -> Result<CommitReport, StoreError>;

    /// Delete an item; returns every id removed, the item itself last.
    fn delete(&mut self, id: ItemId) -> Result<Vec<ItemId>, StoreError>;

    fn changes_since(&self, token: ChangeToken) -> ChangeFeed;
}

/// In-memory calendar list.
#[derive(Debug, Clone, Default)]
pub struct SeriesList {
    behavior: ServerBehavior,
    next_id: ItemId,
    token: ChangeToken,
    series: BTreeMap<ItemId, AppointmentSeries>,
    /// Instance id -> owning master id.
    owners: BTreeMap<ItemId, ItemId>,
    modified: BTreeMap<ItemId, ChangeToken>,
    deleted: BTreeMap<ItemId, ChangeToken>,
}

impl SeriesList {
    pub fn new(behavior: ServerBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    pub fn behavior(&self) -> &ServerBehavior {
        &self.behavior
    }

    pub fn change_token(&self) -> ChangeToken {
        self.token
    }

    /// Number of stored items, instances included.
    pub fn len(&self) -> usize {
        self.series.len() + self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn series(&self, id: ItemId) -> Option<&AppointmentSeries> {
        self.series.get(&id)
    }

    /// Snapshot of one item. A series comes back with its instances.
    pub fn get(&self, id: ItemId) -> Option<CalendarItem> {
        if let Some(series) = self.series.get(&id) {
            return Some(CalendarItem::Series(series.clone()));
        }
        let master = self.series.get(self.owners.get(&id)?)?;
        master.instance(id).cloned().map(CalendarItem::Instance)
    }

    fn allocate_id(&mut self) -> ItemId {
        self.next_id += 1;
        self.next_id
    }

    fn check_series_uid(
        &self,
        current: Option<&AppointmentSeries>,
        updated: &AppointmentSeries,
    ) -> Result<(), StoreError> {
        if !updated.is_recurring_master() {
            return Ok(());
        }
        let Some(uid) = updated.series_uid.as_deref() else {
            return Ok(());
        };

        if self.behavior.require_series_uid_rotation {
            let kept_uid = current
                .filter(|c| c.is_recurring_master())
                .filter(|c| {
                    c.series_uid
                        .as_deref()
                        .is_some_and(|old| old.eq_ignore_ascii_case(uid))
                })
                .filter(|c| match (&c.recurrence_rule, &updated.recurrence_rule) {
                    (Some(a), Some(b)) => !a.same_schedule(b),
                    _ => false,
                });
            if kept_uid.is_some() {
                return Err(ValidationError::SeriesUidNotRotated.into());
            }
        }

        if self.behavior.enforce_unique_series_uid {
            let own_id = current.map_or(0, |c| c.master_id);
            let taken = self.series.values().any(|s| {
                s.master_id != own_id
                    && s.is_recurring_master()
                    && s
                        .series_uid
                        .as_deref()
                        .is_some_and(|other| other.eq_ignore_ascii_case(uid))
            });
            if taken {
                return Err(StoreError::DuplicateSeriesUid(uid.to_string()));
            }
        }
        Ok(())
    }

    fn tombstone(&mut self, id: ItemId) {
        self.modified.remove(&id);
        self.owners.remove(&id);
        self.deleted.insert(id, self.token);
    }

    fn commit_series(
        &mut self,
        mut series: AppointmentSeries,
        cascade: bool,
    ) -> (AppointmentSeries, Vec<ItemId>) {
        if cascade {
            series.instances.clear();
        }
        let previous: Vec<ItemId> = self
            .series
            .get(&series.master_id)
            .map(|s| s.instances.iter().map(|i| i.item_id).collect())
            .unwrap_or_default();
        let removed: Vec<ItemId> = previous
            .into_iter()
            .filter(|id| series.instance(*id).is_none())
            .collect();
        for id in &removed {
            self.tombstone(*id);
        }
        self.modified.insert(series.master_id, self.token);
        self.series.insert(series.master_id, series.clone());
        (series, removed)
    }

    fn commit_instance(&mut self, instance: SeriesInstance) -> Result<(), StoreError> {
        if let Some(old_master) = self.owners.get(&instance.item_id).copied() {
            if let Some(master) = self.series.get_mut(&old_master) {
                master.instances.retain(|i| i.item_id != instance.item_id);
            }
        }
        let master = self
            .series
            .get_mut(&instance.master_series_id)
            .ok_or(StoreError::ItemNotFound(instance.master_series_id))?;
        self.owners.insert(instance.item_id, master.master_id);
        self.modified.insert(instance.item_id, self.token);
        master.instances.push(instance);
        Ok(())
    }
}

impl MasterLookup for SeriesList {
    fn master(&self, id: ItemId) -> Option<&AppointmentSeries> {
        self.series.get(&id)
    }
}

impl ListItemStore for SeriesList {
    fn submit(&mut self, id: Option<ItemId>, edit: &FieldEdits) -> Result<CommitReport, StoreError> {
        let current = match id {
            Some(id) => Some(self.get(id).ok_or(StoreError::ItemNotFound(id))?),
            None => None,
        };

        let updated = apply_edit(current.as_ref(), edit, &*self)?;
        if let Some(current) = &current {
            if current.as_series().is_some() != updated.as_series().is_some() {
                return Err(StoreError::KindChange(current.id()));
            }
        }
        if let CalendarItem::Series(series) = &updated {
            self.check_series_uid(current.as_ref().and_then(CalendarItem::as_series), series)?;
        }
        let plan = plan_cascade(current.as_ref(), &updated, edit, &self.behavior)?;

        self.token += 1;
        let created = current.is_none();
        let item_id = match current.as_ref() {
            Some(item) => item.id(),
            None => self.allocate_id(),
        };

        let (item, removed_instances) = match updated {
            CalendarItem::Series(mut series) => {
                series.master_id = item_id;
                let (series, removed) = self.commit_series(series, plan.is_some());
                (CalendarItem::Series(series), removed)
            }
            CalendarItem::Instance(mut instance) => {
                instance.item_id = item_id;
                self.commit_instance(instance.clone())?;
                (CalendarItem::Instance(instance), Vec::new())
            }
        };

        if let Some(plan) = &plan {
            tracing::info!(
                master_id = plan.master_id,
                deleted = plan.deleted.len(),
                "schedule change deleted all exceptions"
            );
        }
        tracing::debug!(
            item_id,
            event_type = ?item.event_type(),
            created,
            token = self.token,
            "committed list item"
        );

        Ok(CommitReport {
            item,
            created,
            removed_instances,
            change_token: self.token,
        })
    }

    fn delete(&mut self, id: ItemId) -> Result<Vec<ItemId>, StoreError> {
        if let Some(master) = self.series.get(&id) {
            let plan = plan_master_delete(master);
            self.token += 1;
            self.series.remove(&id);
            for child in &plan.deleted {
                self.tombstone(*child);
            }
            self.tombstone(id);
            tracing::info!(
                master_id = id,
                deleted = plan.deleted.len(),
                "deleted series with its instances"
            );
            let mut removed = plan.deleted;
            removed.push(id);
            return Ok(removed);
        }

        let owner = *self.owners.get(&id).ok_or(StoreError::ItemNotFound(id))?;
        self.token += 1;
        if let Some(master) = self.series.get_mut(&owner) {
            master.instances.retain(|i| i.item_id != id);
        }
        self.tombstone(id);
        tracing::debug!(item_id = id, master_id = owner, "deleted series instance");
        Ok(vec![id])
    }

    fn changes_since(&self, token: ChangeToken) -> ChangeFeed {
        let items = self
            .modified
            .iter()
            .filter(|(_, changed)| **changed > token)
            .filter_map(|(id, _)| self.get(*id))
            .map(|item| match item {
                CalendarItem::Series(mut s) => {
                    s.instances.clear();
                    CalendarItem::Series(s)
                }
                instance => instance,
            })
            .collect();
        let deleted = self
            .deleted
            .iter()
            .filter(|(_, changed)| **changed > token)
            .map(|(id, _)| *id)
            .collect();
        ChangeFeed {
            change_token: self.token,
            items,
            deleted,
        }
    }
}
