//! Reader for the list store's `z:row` records.
//!
//! List operations return item snapshots as attribute bags:
//!
//! ```xml
//! <rs:data ItemCount="1">
//!   <z:row ows_ID="3" ows_EventType="4" ows_MasterSeriesItemID="2" />
//! </rs:data>
//! ```
//!
//! Fragments often use the `z`/`rs` prefixes without declaring them, so the
//! reader wraps its input in an element that declares both.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::xml::strip_declaration;

const ROWSET_NS: &str = "urn:schemas-microsoft-com:rowset";
const ROW_NS: &str = "#RowsetSchema";

/// One list item's field values, keyed by internal field name without the
/// `ows_` prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZRow {
    pub fields: BTreeMap<String, String>,
}

impl ZRow {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// The item id (`ows_ID`).
    pub fn id(&self) -> Option<&str> {
        self.get("ID")
    }

    /// Value with any lookup/type prefix (`3;#Title`, `float;#1.0`) removed.
    pub fn lookup_value(&self, field: &str) -> Option<&str> {
        self.get(field).map(split_lookup)
    }
}

/// Strip a `prefix;#` from a zrow value.
pub fn split_lookup(value: &str) -> &str {
    match value.split_once(";#") {
        Some((_, rest)) => rest,
        None => value,
    }
}

/// Parse every `row` element in the fragment, in document order.
pub fn parse_rows(xml: &str) -> Result<Vec<ZRow>> {
    let wrapped = format!(
        "<zrows xmlns:rs=\"{}\" xmlns:z=\"{}\">{}</zrows>",
        ROWSET_NS,
        ROW_NS,
        strip_declaration(xml)
    );
    let doc = roxmltree::Document::parse(&wrapped)?;

    let rows = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "row")
        .map(|row| ZRow {
            fields: row
                .attributes()
                .filter_map(|a| {
                    a.name()
                        .strip_prefix("ows_")
                        .map(|name| (name.to_string(), a.value().to_string()))
                })
                .collect(),
        })
        .collect();
    Ok(rows)
}
