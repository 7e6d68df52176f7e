//! Server-optional behaviors of the list store.

use serde::{Deserialize, Serialize};

/// Toggles for behaviors a conforming server may or may not implement.
///
/// Missing keys take their defaults, so an empty TOML table is valid:
///
/// ```toml
/// cascade_on_edit = true
/// enforce_unique_series_uid = false
/// require_series_uid_rotation = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerBehavior {
    /// Delete all exceptions when a schedule edit carries `deleteExceptions`.
    pub cascade_on_edit: bool,
    /// Reject a recurring master whose UID another master already uses.
    pub enforce_unique_series_uid: bool,
    /// Reject a pattern change that keeps the master's UID.
    pub require_series_uid_rotation: bool,
}

impl Default for ServerBehavior {
    fn default() -> Self {
        Self {
            cascade_on_edit: true,
            enforce_unique_series_uid: false,
            require_series_uid_rotation: false,
        }
    }
}
