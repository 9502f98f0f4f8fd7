//! Floor manager: the floors of one facility and the editor session on the
//! active one.
//!
//! DESIGN
//! ======
//! A `FloorManager` is hydrated per facility from the layout service's floor
//! listing and owns the `EngineCore` editing the active floor. Floor numbers
//! are the map keys, so they stay pairwise distinct by construction.
//! Anything that would drop unsaved edits or delete a stored layout goes
//! through the caller's `Confirm` first; a declined prompt leaves every piece
//! of state untouched.

#[cfg(test)]
#[path = "floor_test.rs"]
mod tests;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use canvas::confirm::{Confirm, Prompt};
use canvas::doc::LayoutElement;
use canvas::engine::EngineCore;
use canvas::geometry::{Transform, apply_transform};
use canvas::templates::DEFAULT_TEMPLATE_ID;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::layout::{FloorInfo, LayoutError, LayoutService, LayoutSnapshot, SaveReceipt};
use crate::services::remote::floor_name;

// =============================================================================
// ERRORS
// =============================================================================

/// Rejected floor operations. These reach the user as blocking messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("floor number must be 1 or greater, got {0}")]
    InvalidNumber(i32),
    #[error("floor {0} already exists")]
    DuplicateNumber(i32),
    #[error("a facility must keep at least one floor")]
    LastFloor,
    #[error("floor {0} does not exist")]
    UnknownFloor(i32),
    #[error("no floor number follows {0}")]
    NumbersExhausted(i32),
}

#[derive(Debug, thiserror::Error)]
pub enum FloorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] LayoutError),
    #[error("not confirmed: {}", .0.message())]
    Declined(Prompt),
}

impl ErrorCode for FloorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Persistence(e) => e.error_code(),
            Self::Declined(_) => "E_DECLINED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Persistence(e) => e.retryable(),
            Self::Validation(_) | Self::Declined(_) => false,
        }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct FloorManager {
    facility_id: Uuid,
    floors: BTreeMap<i32, FloorInfo>,
    active: i32,
    engine: EngineCore,
    layouts: Arc<LayoutService>,
}

impl FloorManager {
    /// Load a facility's floors and open the lowest-numbered one.
    ///
    /// # Errors
    ///
    /// Returns an error if neither tier can list or load the floors.
    pub async fn hydrate(layouts: Arc<LayoutService>, facility_id: Uuid) -> Result<Self, FloorError> {
        let facility_id = layouts.resolve_facility(facility_id).await;
        let floors: BTreeMap<i32, FloorInfo> =
            layouts.list_floors(facility_id).await?.into_iter().map(|f| (f.floor, f)).collect();
        let active = floors.keys().next().copied().unwrap_or(1);
        let snapshot = layouts.get_layout(facility_id, active).await?;

        let mut manager = Self { facility_id, floors, active, engine: EngineCore::new(), layouts };
        manager.install(active, snapshot);
        info!(%facility_id, floors = manager.floors.len(), active, "facility hydrated");
        Ok(manager)
    }

    // --- Queries ---

    #[must_use]
    pub fn facility_id(&self) -> Uuid {
        self.facility_id
    }

    #[must_use]
    pub fn active_floor(&self) -> i32 {
        self.active
    }

    /// Floor metadata in ascending floor order.
    #[must_use]
    pub fn list_floors(&self) -> Vec<FloorInfo> {
        self.floors.values().cloned().collect()
    }

    /// The editor session on the active floor.
    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineCore {
        &mut self.engine
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.engine.has_unsaved_changes()
    }

    // --- Floor operations ---

    /// Append a floor numbered one past the highest, persist it empty, and
    /// make it active.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NumbersExhausted`] when the highest floor is
    /// already `i32::MAX`, [`FloorError::Declined`] if the active floor has
    /// unsaved edits and the user keeps them, or a persistence error if the
    /// empty layout cannot be stored on either tier.
    pub async fn add_floor(&mut self, confirm: &mut impl Confirm) -> Result<i32, FloorError> {
        let highest = self.floors.keys().next_back().copied().unwrap_or(0);
        let number = highest.checked_add(1).ok_or(ValidationError::NumbersExhausted(highest))?;
        self.confirm_leave(confirm)?;

        let snapshot = LayoutSnapshot::new(self.facility_id, number, DEFAULT_TEMPLATE_ID, Vec::new());
        self.layouts.save_layout(&snapshot).await?;

        self.floors.insert(number, FloorInfo::new(number, Some(snapshot.created_at), Some(snapshot.updated_at)));
        self.active = number;
        self.engine.load_elements(DEFAULT_TEMPLATE_ID, Vec::new());
        info!(facility_id = %self.facility_id, floor = number, "floor added");
        Ok(number)
    }

    /// Give floor `old` the number `new`, moving its stored layout.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `old` is unknown, `new` is below 1,
    /// or `new` is already taken.
    pub async fn rename_floor_number(&mut self, old: i32, new: i32) -> Result<(), FloorError> {
        self.require(old)?;
        if new < 1 {
            return Err(ValidationError::InvalidNumber(new).into());
        }
        if new == old {
            return Ok(());
        }
        if self.floors.contains_key(&new) {
            return Err(ValidationError::DuplicateNumber(new).into());
        }

        self.layouts.renumber_floor(self.facility_id, old, new).await?;

        if let Some(mut info) = self.floors.remove(&old) {
            info.floor = new;
            info.name = floor_name(new);
            info.updated_at = Some(OffsetDateTime::now_utc());
            self.floors.insert(new, info);
        }
        if self.active == old {
            self.active = new;
        }
        info!(facility_id = %self.facility_id, old, new, "floor renumbered");
        Ok(())
    }

    /// Delete floor `number` and its stored layout after confirmation. When
    /// the active floor goes, the lowest remaining floor opens.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown or last floor, or
    /// [`FloorError::Declined`] when the user cancels.
    pub async fn delete_floor(&mut self, number: i32, confirm: &mut impl Confirm) -> Result<(), FloorError> {
        self.require(number)?;
        if self.floors.len() == 1 {
            return Err(ValidationError::LastFloor.into());
        }
        let prompt = Prompt::DeleteFloor { number };
        if !confirm.confirm(&prompt) {
            return Err(FloorError::Declined(prompt));
        }

        // Read the replacement before deleting so a failed load leaves the
        // session on the floor it belongs to.
        let replacement = if self.active == number {
            let Some(next) = self.floors.keys().copied().find(|&n| n != number) else {
                return Err(ValidationError::LastFloor.into());
            };
            Some((next, self.layouts.get_layout(self.facility_id, next).await?))
        } else {
            None
        };

        self.layouts.delete_layout(self.facility_id, number).await?;
        self.floors.remove(&number);
        if let Some((next, snapshot)) = replacement {
            self.install(next, snapshot);
        }
        info!(facility_id = %self.facility_id, floor = number, active = self.active, "floor deleted");
        Ok(())
    }

    /// Open floor `number`. Unsaved edits on the current floor are discarded,
    /// never saved, and only after confirmation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown floor, or
    /// [`FloorError::Declined`] when the user keeps the edits.
    pub async fn switch_active_floor(&mut self, number: i32, confirm: &mut impl Confirm) -> Result<(), FloorError> {
        self.require(number)?;
        if number == self.active {
            return Ok(());
        }
        self.confirm_leave(confirm)?;
        self.open_floor(number).await
    }

    // --- Saving ---

    /// Persist the active floor's elements and clear the unsaved flag.
    ///
    /// # Errors
    ///
    /// Returns a persistence error only when both tiers reject the write.
    pub async fn save_active(&mut self) -> Result<SaveReceipt, FloorError> {
        let snapshot =
            self.snapshot_for(self.active, self.engine.template_id(), self.engine.elements().to_vec());
        let receipt = self.layouts.save_layout(&snapshot).await?;
        self.engine.mark_saved();
        self.touch(self.active, &snapshot);
        Ok(receipt)
    }

    /// Replace floor `number`'s elements and persist them. Incoming geometry
    /// is snapped and clamped like any committed edit. Saving the active
    /// floor also reloads the editor session with the new elements.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown floor or a persistence
    /// error when both tiers reject the write.
    pub async fn save_floor(
        &mut self,
        number: i32,
        template_id: &str,
        elements: Vec<LayoutElement>,
    ) -> Result<SaveReceipt, FloorError> {
        self.require(number)?;
        let elements: Vec<LayoutElement> =
            elements.iter().map(|el| apply_transform(el, &Transform::identity(el))).collect();
        if number == self.active {
            self.engine.load_elements(template_id, elements);
            return self.save_active().await;
        }
        let snapshot = self.snapshot_for(number, template_id, elements);
        let receipt = self.layouts.save_layout(&snapshot).await?;
        self.touch(number, &snapshot);
        Ok(receipt)
    }

    /// Drop unsaved edits by reloading the active floor from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored layout cannot be read.
    pub async fn discard(&mut self) -> Result<(), FloorError> {
        self.open_floor(self.active).await
    }

    // --- Internals ---

    fn require(&self, number: i32) -> Result<(), ValidationError> {
        if self.floors.contains_key(&number) { Ok(()) } else { Err(ValidationError::UnknownFloor(number)) }
    }

    fn confirm_leave(&self, confirm: &mut impl Confirm) -> Result<(), FloorError> {
        if !self.engine.has_unsaved_changes() {
            return Ok(());
        }
        let prompt = Prompt::DiscardUnsavedEdits { floor: self.active };
        if confirm.confirm(&prompt) { Ok(()) } else { Err(FloorError::Declined(prompt)) }
    }

    /// Load floor `number` and only then point the session at it.
    async fn open_floor(&mut self, number: i32) -> Result<(), FloorError> {
        let snapshot = self.layouts.get_layout(self.facility_id, number).await?;
        self.install(number, snapshot);
        Ok(())
    }

    fn install(&mut self, number: i32, snapshot: Option<LayoutSnapshot>) {
        self.active = number;
        match snapshot {
            Some(snapshot) => self.engine.load_elements(&snapshot.template_id, snapshot.elements),
            None => self.engine.load_elements(DEFAULT_TEMPLATE_ID, Vec::new()),
        }
    }

    fn snapshot_for(&self, number: i32, template_id: &str, elements: Vec<LayoutElement>) -> LayoutSnapshot {
        let mut snapshot = LayoutSnapshot::new(self.facility_id, number, template_id, elements);
        if let Some(created_at) = self.floors.get(&number).and_then(|f| f.created_at) {
            snapshot.created_at = created_at;
        }
        snapshot
    }

    fn touch(&mut self, number: i32, snapshot: &LayoutSnapshot) {
        if let Some(info) = self.floors.get_mut(&number) {
            info.created_at.get_or_insert(snapshot.created_at);
            info.updated_at = Some(snapshot.updated_at);
        }
    }
}

/// A floor manager shared between requests. Each facility has its own lock so
/// persistence I/O on one facility never waits on another.
pub type SharedFloorManager = Arc<Mutex<FloorManager>>;

/// Live floor managers keyed by resolved facility id.
pub type FacilityMap = RwLock<HashMap<Uuid, SharedFloorManager>>;

/// The hydrated manager for `facility_id`, creating it on first use.
///
/// The map lock is never held across persistence I/O: hydration runs
/// unlocked and the first manager inserted for a facility wins.
///
/// # Errors
///
/// Returns an error if a new manager cannot be hydrated.
pub async fn manager_for(
    facilities: &FacilityMap,
    layouts: &Arc<LayoutService>,
    facility_id: Uuid,
) -> Result<SharedFloorManager, FloorError> {
    let facility_id = layouts.resolve_facility(facility_id).await;
    if let Some(existing) = facilities.read().await.get(&facility_id) {
        return Ok(Arc::clone(existing));
    }

    let manager = FloorManager::hydrate(layouts.clone(), facility_id).await?;
    let mut facilities = facilities.write().await;
    let shared = facilities.entry(facility_id).or_insert_with(|| {
        debug!(%facility_id, "floor manager registered");
        Arc::new(Mutex::new(manager))
    });
    Ok(Arc::clone(shared))
}
