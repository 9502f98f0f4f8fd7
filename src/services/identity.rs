//! Facility-identity bridging.
//!
//! The editor can be opened before the owning facility record has an id. In
//! that case callers pass the sentinel id (or the nil id) and the layout
//! service resolves it to a real one: a facility already present in the local
//! cache is reused, otherwise stale sentinel rows are cleaned up remotely and
//! a fresh id is generated.

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;

use tracing::{info, warn};
use uuid::Uuid;

use crate::services::local::{LAYOUT_KEY_PREFIX, LocalStore, parse_layout_key};
use crate::services::remote::{LayoutRecord, RemoteStore};

/// Placeholder facility id used before a real one is assigned.
pub const SENTINEL_FACILITY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0015);

/// Whether `id` is a placeholder that must be resolved before use.
#[must_use]
pub fn is_sentinel(id: Uuid) -> bool {
    id == SENTINEL_FACILITY_ID || id.is_nil()
}

/// First real facility id found among the local cache keys.
#[must_use]
pub fn facility_from_local(local: &dyn LocalStore) -> Option<Uuid> {
    let keys = match local.scan_prefix(LAYOUT_KEY_PREFIX) {
        Ok(keys) => keys,
        Err(e) => {
            warn!(error = %e, "local cache scan failed during facility resolution");
            return None;
        }
    };
    keys.iter()
        .filter_map(|key| parse_layout_key(key))
        .map(|(facility_id, _)| facility_id)
        .find(|id| !is_sentinel(*id))
}

/// Keep only the most recently updated remote record stored under the
/// sentinel id and delete the rest. Returns the survivor, if any.
///
/// Failures are logged and absorbed.
pub async fn cleanup_sentinel_records(remote: &dyn RemoteStore) -> Option<LayoutRecord> {
    let mut records = match remote.list_facility(SENTINEL_FACILITY_ID).await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "sentinel cleanup: listing failed");
            return None;
        }
    };
    if records.is_empty() {
        return None;
    }

    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    let keep = records.remove(0);
    let stale = records.len();
    for record in records {
        if let Err(e) = remote.delete_by_id(record.id).await {
            warn!(error = %e, record_id = %record.id, "sentinel cleanup: delete failed");
        }
    }
    info!(kept = %keep.id, deleted = stale, "sentinel layouts cleaned up");
    Some(keep)
}
