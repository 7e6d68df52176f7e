//! `outsps replay`: run a script of list operations against a [`SeriesList`].

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use outsps_engine::fields::TITLE;
use outsps_engine::{
    ChangeFeed, CommitReport, FieldEdits, ItemId, ListItemStore, NameSequence, SeriesList,
    ServerBehavior, StoreError,
};
use serde::{Deserialize, Serialize};

/// A replay script.
///
/// ```json
/// {
///   "runSeed": "demo",
///   "operations": [
///     { "op": "submit", "fields": { "EventDate": "2024-01-01T09:00:00Z", "EndDate": "2024-01-01T10:00:00Z" } },
///     { "op": "submit", "id": 1, "fields": { "Title": "Renamed" } },
///     { "op": "delete", "id": 1 }
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    /// Seed for generated titles of new items that have none.
    #[serde(default = "default_seed")]
    pub run_seed: String,
    pub operations: Vec<Operation>,
}

fn default_seed() -> String {
    "replay".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    Submit {
        #[serde(default)]
        id: Option<ItemId>,
        fields: BTreeMap<String, String>,
    },
    Delete {
        id: ItemId,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Outcome {
    Committed(CommitReport),
    Deleted { ids: Vec<ItemId> },
    Rejected { error: String },
}

#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    pub results: Vec<Outcome>,
    pub changes: ChangeFeed,
}

fn rejected(err: StoreError) -> Outcome {
    Outcome::Rejected {
        error: err.to_string(),
    }
}

/// Apply every operation in order. A rejected operation is reported and the
/// script carries on.
pub fn run(script: &str, behavior: ServerBehavior) -> Result<ReplayOutput> {
    let script: Script = serde_json::from_str(script).context("Failed to parse replay script")?;
    let mut list = SeriesList::new(behavior);
    let mut names = NameSequence::new("Appointment", script.run_seed.as_str());
    let mut results = Vec::with_capacity(script.operations.len());

    for operation in script.operations {
        let outcome = match operation {
            Operation::Submit { id, fields } => match FieldEdits::from_fields(&fields) {
                Ok(mut edits) => {
                    if id.is_none() && !fields.contains_key(TITLE) {
                        edits.title = names.next();
                    }
                    match list.submit(id, &edits) {
                        Ok(report) => Outcome::Committed(report),
                        Err(err) => rejected(err),
                    }
                }
                Err(err) => rejected(err.into()),
            },
            Operation::Delete { id } => match list.delete(id) {
                Ok(ids) => Outcome::Deleted { ids },
                Err(err) => rejected(err),
            },
        };
        if let Outcome::Rejected { error } = &outcome {
            tracing::warn!("operation rejected: {}", error);
        }
        results.push(outcome);
    }

    Ok(ReplayOutput {
        results,
        changes: list.changes_since(0),
    })
}
