//! Layout service: dual-tier persistence of one element list per
//! (facility, floor).
//!
//! DESIGN
//! ======
//! Every save writes the local cache first, unconditionally, then tries the
//! remote tier (update in place when a record exists, insert otherwise).
//! Reads prefer the remote record and fall back to the local cache. Remote
//! failures never reach the caller while the local tier holds: they are
//! logged and the save receipt reports `tier: local`.
//!
//! ERROR HANDLING
//! ==============
//! `LayoutError` only surfaces when the local tier itself fails and nothing
//! else can answer, or when both tiers reject a save. Missing layouts are
//! `Ok(None)`, never errors.

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;

use std::sync::Arc;

use canvas::doc::LayoutElement;
use canvas::templates::DEFAULT_TEMPLATE_ID;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::identity::{self, SENTINEL_FACILITY_ID};
use crate::services::local::{LocalStore, LocalStoreError, facility_prefix, layout_key, parse_layout_key};
use crate::services::remote::{LayoutData, LayoutRecord, RemoteError, RemoteStore, floor_description, floor_name};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("layout not stored: local tier: {local}; remote tier: {remote}")]
    BothTiersFailed { local: LocalStoreError, remote: RemoteError },
    #[error(transparent)]
    Local(#[from] LocalStoreError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl ErrorCode for LayoutError {
    fn error_code(&self) -> &'static str {
        "E_PERSISTENCE"
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::BothTiersFailed { .. } | Self::Remote(_))
    }
}

/// Which tier ended up holding a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Remote,
    Local,
}

/// Result of [`LayoutService::save_layout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub accepted: bool,
    pub tier: Tier,
    /// The facility id the layout was stored under, after sentinel resolution.
    pub facility_id: Uuid,
}

fn default_template_id() -> String {
    DEFAULT_TEMPLATE_ID.to_owned()
}

/// The persisted unit: one floor's elements and where they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    /// Owning facility. A missing id deserializes as nil and is treated as
    /// the sentinel.
    #[serde(default)]
    pub facility_id: Uuid,
    pub floor: i32,
    #[serde(default = "default_template_id")]
    pub template_id: String,
    #[serde(default)]
    pub elements: Vec<LayoutElement>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl LayoutSnapshot {
    /// A snapshot stamped with the current time.
    #[must_use]
    pub fn new(facility_id: Uuid, floor: i32, template_id: impl Into<String>, elements: Vec<LayoutElement>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self { facility_id, floor, template_id: template_id.into(), elements, created_at: now, updated_at: now }
    }

    fn layout_data(&self) -> LayoutData {
        LayoutData {
            elements: self.elements.clone(),
            template_id: Some(self.template_id.clone()),
            floor: Some(self.floor),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }

    fn from_record(record: LayoutRecord) -> Self {
        let LayoutRecord { facility_id, floor, name, layout_data, created_at, updated_at, .. } = record;
        Self {
            facility_id,
            floor: layout_data.floor.unwrap_or(floor),
            template_id: layout_data.template_id.unwrap_or(name),
            elements: layout_data.elements,
            created_at,
            updated_at,
        }
    }

    /// Remote record name: the template id, or the floor name without one.
    fn record_name(&self) -> String {
        if self.template_id.is_empty() { floor_name(self.floor) } else { self.template_id.clone() }
    }
}

/// One floor as reported by [`LayoutService::list_floors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorInfo {
    pub floor: i32,
    pub name: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl FloorInfo {
    /// Metadata for `floor` under its default name.
    #[must_use]
    pub fn new(floor: i32, created_at: Option<OffsetDateTime>, updated_at: Option<OffsetDateTime>) -> Self {
        Self { floor, name: floor_name(floor), created_at, updated_at }
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Dual-tier layout persistence.
pub struct LayoutService {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    /// Real id the sentinel resolved to, once it has been resolved.
    sentinel_alias: Mutex<Option<Uuid>>,
}

impl LayoutService {
    #[must_use]
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { local, remote, sentinel_alias: Mutex::new(None) }
    }

    /// Map a possibly-sentinel facility id to the real id every tier
    /// operation uses. The first resolution sticks for the process lifetime.
    pub async fn resolve_facility(&self, requested: Uuid) -> Uuid {
        if !identity::is_sentinel(requested) {
            return requested;
        }
        let mut alias = self.sentinel_alias.lock().await;
        if let Some(resolved) = *alias {
            return resolved;
        }
        let resolved = match identity::facility_from_local(self.local.as_ref()) {
            Some(existing) => {
                debug!(facility_id = %existing, "sentinel resolved from local cache");
                existing
            }
            None => {
                identity::cleanup_sentinel_records(self.remote.as_ref()).await;
                let fresh = Uuid::new_v4();
                info!(facility_id = %fresh, "sentinel resolved to new facility id");
                fresh
            }
        };
        *alias = Some(resolved);
        resolved
    }

    // -------------------------------------------------------------------------
    // Save / load
    // -------------------------------------------------------------------------

    /// Store a floor's layout on both tiers.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::BothTiersFailed`] only when neither tier
    /// accepted the write.
    pub async fn save_layout(&self, snapshot: &LayoutSnapshot) -> Result<SaveReceipt, LayoutError> {
        let facility_id = self.resolve_facility(snapshot.facility_id).await;
        let stored = LayoutSnapshot { facility_id, ..snapshot.clone() };
        let floor = stored.floor;

        let local = self.write_local(&stored);
        if let Err(e) = &local {
            warn!(error = %e, %facility_id, floor, "local layout write failed");
        }

        match self.write_remote(&stored).await {
            Ok(()) => {
                info!(%facility_id, floor, tier = "remote", elements = stored.elements.len(), "layout saved");
                Ok(SaveReceipt { accepted: true, tier: Tier::Remote, facility_id })
            }
            Err(remote) => {
                warn!(error = %remote, %facility_id, floor, "remote layout write failed; degraded to local tier");
                match local {
                    Ok(()) => Ok(SaveReceipt { accepted: true, tier: Tier::Local, facility_id }),
                    Err(local) => Err(LayoutError::BothTiersFailed { local, remote }),
                }
            }
        }
    }

    /// Load a floor's layout, remote first. `Ok(None)` means "start empty".
    ///
    /// # Errors
    ///
    /// Returns an error only when the remote tier has nothing to offer and
    /// the local cache cannot be read.
    pub async fn get_layout(&self, facility_id: Uuid, floor: i32) -> Result<Option<LayoutSnapshot>, LayoutError> {
        let facility_id = self.resolve_facility(facility_id).await;
        match self.remote.find(facility_id, floor).await {
            Ok(Some(record)) => return Ok(Some(LayoutSnapshot::from_record(record))),
            Ok(None) => debug!(%facility_id, floor, "no remote layout; trying local cache"),
            Err(e) => warn!(error = %e, %facility_id, floor, "remote layout read failed; trying local cache"),
        }
        Ok(self.read_local(facility_id, floor)?)
    }

    // -------------------------------------------------------------------------
    // Floors
    // -------------------------------------------------------------------------

    /// Floors of a facility, ascending. Never empty: with nothing stored a
    /// single default floor 1 is reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote tier has no rows and the local cache
    /// cannot be read.
    pub async fn list_floors(&self, facility_id: Uuid) -> Result<Vec<FloorInfo>, LayoutError> {
        let facility_id = self.resolve_facility(facility_id).await;
        match self.remote.list_facility(facility_id).await {
            Ok(records) if !records.is_empty() => {
                let mut floors: Vec<FloorInfo> = Vec::with_capacity(records.len());
                for record in records {
                    if floors.last().is_some_and(|f| f.floor == record.floor) {
                        continue;
                    }
                    floors.push(FloorInfo::new(record.floor, Some(record.created_at), Some(record.updated_at)));
                }
                return Ok(floors);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, %facility_id, "remote floor listing failed; using local cache"),
        }

        let mut floors = self.local_floors(facility_id)?;
        if floors.is_empty() {
            floors.push(FloorInfo::new(1, None, None));
        }
        Ok(floors)
    }

    /// Remove a floor's layout from both tiers. Remote failures are absorbed.
    ///
    /// # Errors
    ///
    /// Returns an error if the local entry cannot be removed.
    pub async fn delete_layout(&self, facility_id: Uuid, floor: i32) -> Result<bool, LayoutError> {
        let facility_id = self.resolve_facility(facility_id).await;
        if let Err(e) = self.remote.delete(facility_id, floor).await {
            warn!(error = %e, %facility_id, floor, "remote layout delete failed");
        }
        self.local.remove(&layout_key(facility_id, floor))?;
        info!(%facility_id, floor, "layout deleted");
        Ok(true)
    }

    /// Move a floor's layout from `old_floor` to `new_floor` on both tiers.
    /// The local move always happens; a remote failure is logged and the
    /// call still succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the local entry cannot be moved.
    pub async fn renumber_floor(&self, facility_id: Uuid, old_floor: i32, new_floor: i32) -> Result<bool, LayoutError> {
        let facility_id = self.resolve_facility(facility_id).await;
        let now = OffsetDateTime::now_utc();
        self.move_local(facility_id, old_floor, new_floor, now)?;
        if let Err(e) = self.move_remote(facility_id, old_floor, new_floor, now).await {
            warn!(error = %e, %facility_id, old_floor, new_floor, "remote floor renumber failed");
        }
        info!(%facility_id, old_floor, new_floor, "floor renumbered");
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Maintenance
    // -------------------------------------------------------------------------

    /// Every remote layout, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote tier cannot be reached.
    pub async fn list_all_layouts(&self) -> Result<Vec<LayoutRecord>, LayoutError> {
        Ok(self.remote.list_all().await?)
    }

    /// Move the newest remote layout stored under the sentinel id to a
    /// freshly generated facility id and delete the other sentinel rows.
    /// Returns the new id, or `None` when there was nothing to migrate.
    ///
    /// # Errors
    ///
    /// Returns an error if the sentinel rows cannot be listed or the survivor
    /// cannot be moved.
    pub async fn migrate_sentinel_layouts(&self) -> Result<Option<Uuid>, LayoutError> {
        let mut records = self.remote.list_facility(SENTINEL_FACILITY_ID).await?;
        if records.is_empty() {
            return Ok(None);
        }
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let mut keep = records.remove(0);

        let facility_id = Uuid::new_v4();
        keep.facility_id = facility_id;
        keep.updated_at = OffsetDateTime::now_utc();
        self.remote.update(&keep).await?;

        let stale = records.len();
        for record in records {
            if let Err(e) = self.remote.delete_by_id(record.id).await {
                warn!(error = %e, record_id = %record.id, "sentinel migration: delete failed");
            }
        }
        info!(%facility_id, record_id = %keep.id, deleted = stale, "sentinel layouts migrated");
        Ok(Some(facility_id))
    }

    // -------------------------------------------------------------------------
    // Tier helpers
    // -------------------------------------------------------------------------

    fn write_local(&self, snapshot: &LayoutSnapshot) -> Result<(), LocalStoreError> {
        let encoded = serde_json::to_string(snapshot)?;
        self.local.set(&layout_key(snapshot.facility_id, snapshot.floor), &encoded)
    }

    fn read_local(&self, facility_id: Uuid, floor: i32) -> Result<Option<LayoutSnapshot>, LocalStoreError> {
        let Some(raw) = self.local.get(&layout_key(facility_id, floor))? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn local_floors(&self, facility_id: Uuid) -> Result<Vec<FloorInfo>, LocalStoreError> {
        let mut floors = Vec::new();
        for key in self.local.scan_prefix(&facility_prefix(facility_id))? {
            let Some((_, floor)) = parse_layout_key(&key) else {
                continue;
            };
            let stamps = self
                .read_local(facility_id, floor)
                .map_err(|e| warn!(error = %e, %facility_id, floor, "unreadable local layout"))
                .unwrap_or_default()
                .map(|s| (s.created_at, s.updated_at));
            floors.push(FloorInfo::new(floor, stamps.map(|s| s.0), stamps.map(|s| s.1)));
        }
        floors.sort_by_key(|f| f.floor);
        Ok(floors)
    }

    async fn write_remote(&self, snapshot: &LayoutSnapshot) -> Result<(), RemoteError> {
        let layout_data = snapshot.layout_data();
        match self.remote.find(snapshot.facility_id, snapshot.floor).await? {
            Some(existing) => {
                let record = LayoutRecord {
                    name: snapshot.record_name(),
                    description: floor_description(snapshot.floor),
                    layout_data,
                    updated_at: snapshot.updated_at,
                    ..existing
                };
                self.remote.update(&record).await
            }
            None => {
                let mut record =
                    LayoutRecord::new(snapshot.facility_id, snapshot.floor, layout_data, snapshot.updated_at);
                record.name = snapshot.record_name();
                record.created_at = snapshot.created_at;
                self.remote.insert(&record).await
            }
        }
    }

    fn move_local(
        &self,
        facility_id: Uuid,
        old_floor: i32,
        new_floor: i32,
        now: OffsetDateTime,
    ) -> Result<(), LocalStoreError> {
        let Some(mut snapshot) = self.read_local(facility_id, old_floor)? else {
            return Ok(());
        };
        snapshot.floor = new_floor;
        snapshot.updated_at = now;
        self.write_local(&snapshot)?;
        self.local.remove(&layout_key(facility_id, old_floor))
    }

    async fn move_remote(
        &self,
        facility_id: Uuid,
        old_floor: i32,
        new_floor: i32,
        now: OffsetDateTime,
    ) -> Result<(), RemoteError> {
        let Some(mut record) = self.remote.find(facility_id, old_floor).await? else {
            return Ok(());
        };
        record.floor = new_floor;
        record.layout_data.floor = Some(new_floor);
        record.layout_data.updated_at = Some(now);
        record.name = floor_name(new_floor);
        record.description = floor_description(new_floor);
        record.updated_at = now;
        self.remote.update(&record).await
    }
}
