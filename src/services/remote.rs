//! Remote tier: the durable `space_layouts` table.
//!
//! DESIGN
//! ======
//! `RemoteStore` is the seam between the layout service and Postgres. One
//! row per (facility, floor); the editor's element list lives in the
//! `layout_data` JSONB column next to copies of template id, floor and
//! timestamps. `DisconnectedRemote` stands in when no database is configured
//! so every remote call degrades the same way a network failure would.

#[cfg(test)]
#[path = "remote_test.rs"]
mod tests;

use canvas::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use canvas::doc::LayoutElement;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote layout store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// RECORDS
// =============================================================================

/// Contents of the `layout_data` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutData {
    #[serde(default)]
    pub elements: Vec<LayoutElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<OffsetDateTime>,
}

/// One row of `space_layouts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutRecord {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub floor: i32,
    pub name: String,
    pub description: String,
    pub layout_data: LayoutData,
    pub width: i32,
    pub height: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl LayoutRecord {
    /// A new record for `facility_id`/`floor` covering the fixed canvas extent.
    #[must_use]
    pub fn new(facility_id: Uuid, floor: i32, layout_data: LayoutData, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            facility_id,
            floor,
            name: floor_name(floor),
            description: floor_description(floor),
            layout_data,
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Display name of a floor without a template.
#[must_use]
pub fn floor_name(floor: i32) -> String {
    format!("Floor {floor}")
}

#[must_use]
pub fn floor_description(floor: i32) -> String {
    format!("Floor {floor} layout created by the layout editor")
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Durable storage for layout records.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// The record for `facility_id`/`floor`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the store cannot be reached.
    async fn find(&self, facility_id: Uuid, floor: i32) -> Result<Option<LayoutRecord>, RemoteError>;

    /// Every record of `facility_id`, ordered by floor.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the store cannot be reached.
    async fn list_facility(&self, facility_id: Uuid) -> Result<Vec<LayoutRecord>, RemoteError>;

    /// Every record, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the store cannot be reached.
    async fn list_all(&self) -> Result<Vec<LayoutRecord>, RemoteError>;

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the write fails.
    async fn insert(&self, record: &LayoutRecord) -> Result<(), RemoteError>;

    /// Overwrite the record with `record.id`, including its facility and floor.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the write fails.
    async fn update(&self, record: &LayoutRecord) -> Result<(), RemoteError>;

    /// Delete every record of `facility_id`/`floor`, returning how many went.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the delete fails.
    async fn delete(&self, facility_id: Uuid, floor: i32) -> Result<u64, RemoteError>;

    /// Delete one record by id.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the delete fails.
    async fn delete_by_id(&self, id: Uuid) -> Result<(), RemoteError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

type RecordRow = (Uuid, Uuid, i32, String, String, Json<LayoutData>, i32, i32, OffsetDateTime, OffsetDateTime);

const SELECT_COLUMNS: &str =
    "SELECT id, facility_id, floor, name, description, layout_data, width, height, created_at, updated_at
     FROM space_layouts";

fn from_row(row: RecordRow) -> LayoutRecord {
    let (id, facility_id, floor, name, description, Json(layout_data), width, height, created_at, updated_at) = row;
    LayoutRecord { id, facility_id, floor, name, description, layout_data, width, height, created_at, updated_at }
}

/// `RemoteStore` backed by the `space_layouts` table.
#[derive(Clone)]
pub struct PgRemoteStore {
    pool: PgPool,
}

impl PgRemoteStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RemoteStore for PgRemoteStore {
    async fn find(&self, facility_id: Uuid, floor: i32) -> Result<Option<LayoutRecord>, RemoteError> {
        let row = sqlx::query_as::<_, RecordRow>(&format!(
            "{SELECT_COLUMNS}
             WHERE facility_id = $1 AND floor = $2
             ORDER BY updated_at DESC
             LIMIT 1"
        ))
        .bind(facility_id)
        .bind(floor)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn list_facility(&self, facility_id: Uuid) -> Result<Vec<LayoutRecord>, RemoteError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "{SELECT_COLUMNS}
             WHERE facility_id = $1
             ORDER BY floor ASC, updated_at DESC"
        ))
        .bind(facility_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn list_all(&self) -> Result<Vec<LayoutRecord>, RemoteError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!("{SELECT_COLUMNS} ORDER BY updated_at DESC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn insert(&self, record: &LayoutRecord) -> Result<(), RemoteError> {
        sqlx::query(
            "INSERT INTO space_layouts
                (id, facility_id, floor, name, description, layout_data, width, height, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(record.id)
        .bind(record.facility_id)
        .bind(record.floor)
        .bind(&record.name)
        .bind(&record.description)
        .bind(Json(&record.layout_data))
        .bind(record.width)
        .bind(record.height)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, record: &LayoutRecord) -> Result<(), RemoteError> {
        sqlx::query(
            "UPDATE space_layouts
             SET facility_id = $2, floor = $3, name = $4, description = $5, layout_data = $6,
                 width = $7, height = $8, updated_at = $9
             WHERE id = $1",
        )
        .bind(record.id)
        .bind(record.facility_id)
        .bind(record.floor)
        .bind(&record.name)
        .bind(&record.description)
        .bind(Json(&record.layout_data))
        .bind(record.width)
        .bind(record.height)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, facility_id: Uuid, floor: i32) -> Result<u64, RemoteError> {
        let result = sqlx::query("DELETE FROM space_layouts WHERE facility_id = $1 AND floor = $2")
            .bind(facility_id)
            .bind(floor)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), RemoteError> {
        sqlx::query("DELETE FROM space_layouts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// DISCONNECTED
// =============================================================================

/// Remote tier used when no database is configured. Every call fails with
/// [`RemoteError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedRemote;

impl DisconnectedRemote {
    fn unavailable<T>() -> Result<T, RemoteError> {
        Err(RemoteError::Unavailable("no database configured".into()))
    }
}

#[async_trait::async_trait]
impl RemoteStore for DisconnectedRemote {
    async fn find(&self, _facility_id: Uuid, _floor: i32) -> Result<Option<LayoutRecord>, RemoteError> {
        Self::unavailable()
    }

    async fn list_facility(&self, _facility_id: Uuid) -> Result<Vec<LayoutRecord>, RemoteError> {
        Self::unavailable()
    }

    async fn list_all(&self) -> Result<Vec<LayoutRecord>, RemoteError> {
        Self::unavailable()
    }

    async fn insert(&self, _record: &LayoutRecord) -> Result<(), RemoteError> {
        Self::unavailable()
    }

    async fn update(&self, _record: &LayoutRecord) -> Result<(), RemoteError> {
        Self::unavailable()
    }

    async fn delete(&self, _facility_id: Uuid, _floor: i32) -> Result<u64, RemoteError> {
        Self::unavailable()
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<(), RemoteError> {
        Self::unavailable()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// In-memory `RemoteStore` that can be switched to behave as unreachable.
    #[derive(Default)]
    pub struct MemoryRemoteStore {
        records: Mutex<Vec<LayoutRecord>>,
        unreachable: AtomicBool,
    }

    impl MemoryRemoteStore {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent call fail (or succeed again).
        pub fn set_unreachable(&self, unreachable: bool) {
            self.unreachable.store(unreachable, Ordering::SeqCst);
        }

        /// Copy of every stored record, in insertion order.
        #[must_use]
        pub fn records(&self) -> Vec<LayoutRecord> {
            self.records.lock().unwrap().clone()
        }

        /// Insert a record directly, bypassing the unreachable switch.
        pub fn seed(&self, record: LayoutRecord) {
            self.records.lock().unwrap().push(record);
        }

        fn check(&self) -> Result<(), RemoteError> {
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(RemoteError::Unavailable("simulated outage".into()));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl RemoteStore for MemoryRemoteStore {
        async fn find(&self, facility_id: Uuid, floor: i32) -> Result<Option<LayoutRecord>, RemoteError> {
            self.check()?;
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .filter(|r| r.facility_id == facility_id && r.floor == floor)
                .max_by_key(|r| r.updated_at)
                .cloned())
        }

        async fn list_facility(&self, facility_id: Uuid) -> Result<Vec<LayoutRecord>, RemoteError> {
            self.check()?;
            let mut out: Vec<_> =
                self.records.lock().unwrap().iter().filter(|r| r.facility_id == facility_id).cloned().collect();
            out.sort_by_key(|r| r.floor);
            Ok(out)
        }

        async fn list_all(&self) -> Result<Vec<LayoutRecord>, RemoteError> {
            self.check()?;
            let mut out = self.records.lock().unwrap().clone();
            out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(out)
        }

        async fn insert(&self, record: &LayoutRecord) -> Result<(), RemoteError> {
            self.check()?;
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn update(&self, record: &LayoutRecord) -> Result<(), RemoteError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            if let Some(slot) = records.iter_mut().find(|r| r.id == record.id) {
                let created_at = slot.created_at;
                *slot = LayoutRecord { created_at, ..record.clone() };
            }
            Ok(())
        }

        async fn delete(&self, facility_id: Uuid, floor: i32) -> Result<u64, RemoteError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| !(r.facility_id == facility_id && r.floor == floor));
            Ok(u64::try_from(before - records.len()).unwrap_or(0))
        }

        async fn delete_by_id(&self, id: Uuid) -> Result<(), RemoteError> {
            self.check()?;
            self.records.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }
    }
}
