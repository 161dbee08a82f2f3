//! Simulated robot state.
//!
//! A [`RobotState`] is a complete snapshot of everything that changes while a
//! protocol runs. Snapshots are values: producing the next one never disturbs
//! a previous one. Each slice sits behind an [`Arc`], so cloning a snapshot is
//! cheap and an updater copies only the slice it writes (`Arc::make_mut`).

mod initial;
mod liquid;
mod module_state;
mod tips;

pub use initial::InitialDeckSetup;
pub use liquid::{merge_liquid, split_liquid, total_volume, LiquidState, LocationLiquidState};
pub use module_state::{
    AbsorbanceInitialization, AbsorbanceMode, ModuleState, ModuleTemporalProperties,
    TemperatureStatus,
};
pub use tips::TipState;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::{LabwareId, ModuleId};
use crate::error::CommandWarning;

/// Where a labware currently sits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabwareLocation {
    /// Directly in a deck slot.
    #[serde(rename = "slotName")]
    Slot(String),
    /// On top of a module.
    #[serde(rename = "moduleId")]
    Module(ModuleId),
    /// Stacked on another labware (an adapter).
    #[serde(rename = "labwareId")]
    Labware(LabwareId),
    /// Not on the deck.
    #[serde(rename = "offDeck")]
    OffDeck,
}

impl fmt::Display for LabwareLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => write!(f, "slot {slot}"),
            Self::Module(id) => write!(f, "module {id}"),
            Self::Labware(id) => write!(f, "labware {id}"),
            Self::OffDeck => f.write_str("off deck"),
        }
    }
}

/// Complete snapshot of simulated robot state at one point of the timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotState {
    modules: Arc<BTreeMap<ModuleId, ModuleTemporalProperties>>,
    tip_state: Arc<TipState>,
    liquid_state: Arc<LiquidState>,
    labware: Arc<BTreeMap<LabwareId, LabwareLocation>>,
}

impl RobotState {
    /// All modules with their slots and live state.
    #[must_use]
    pub fn modules(&self) -> &BTreeMap<ModuleId, ModuleTemporalProperties> {
        &self.modules
    }

    /// Live state of one module.
    #[must_use]
    pub fn module_state(&self, id: &ModuleId) -> Option<&ModuleState> {
        self.modules.get(id).map(|m| &m.module_state)
    }

    /// Tip presence in racks and on pipettes.
    #[must_use]
    pub fn tip_state(&self) -> &TipState {
        &self.tip_state
    }

    /// Liquid contents of wells and tips.
    #[must_use]
    pub fn liquid_state(&self) -> &LiquidState {
        &self.liquid_state
    }

    /// Current location of every labware.
    #[must_use]
    pub fn labware(&self) -> &BTreeMap<LabwareId, LabwareLocation> {
        &self.labware
    }

    /// Current location of one labware.
    #[must_use]
    pub fn labware_location(&self, id: &LabwareId) -> Option<&LabwareLocation> {
        self.labware.get(id)
    }

    /// The module a labware ultimately rests on, following adapter stacks.
    #[must_use]
    pub fn module_under(&self, id: &LabwareId) -> Option<&ModuleId> {
        let mut current = id;
        // A stack can be no taller than the number of labware.
        for _ in 0..=self.labware.len() {
            match self.labware.get(current)? {
                LabwareLocation::Module(module_id) => return Some(module_id),
                LabwareLocation::Labware(below) => current = below,
                LabwareLocation::Slot(_) | LabwareLocation::OffDeck => return None,
            }
        }
        None
    }

    /// True if the labware, or the labware it is stacked on, is off deck.
    #[must_use]
    pub fn is_off_deck(&self, id: &LabwareId) -> bool {
        let mut current = id;
        for _ in 0..=self.labware.len() {
            match self.labware.get(current) {
                Some(LabwareLocation::OffDeck) => return true,
                Some(LabwareLocation::Labware(below)) => current = below,
                Some(LabwareLocation::Module(_) | LabwareLocation::Slot(_)) | None => return false,
            }
        }
        false
    }

    /// True if `id` is `base` or sits somewhere above it in a stack.
    #[must_use]
    pub fn rests_on(&self, id: &LabwareId, base: &LabwareId) -> bool {
        let mut current = id;
        for _ in 0..=self.labware.len() {
            if current == base {
                return true;
            }
            match self.labware.get(current) {
                Some(LabwareLocation::Labware(below)) => current = below,
                _ => return false,
            }
        }
        false
    }

    /// True if something already occupies `location`.
    ///
    /// Slots are occupied by labware or modules; modules and labware are
    /// occupied by anything placed on them. Off deck is never occupied.
    #[must_use]
    pub fn is_location_occupied(&self, location: &LabwareLocation) -> bool {
        match location {
            LabwareLocation::OffDeck => false,
            LabwareLocation::Slot(slot) => {
                self.modules.values().any(|m| &m.slot == slot)
                    || self.labware.values().any(|l| l == location)
            }
            LabwareLocation::Module(_) | LabwareLocation::Labware(_) => {
                self.labware.values().any(|l| l == location)
            }
        }
    }

    pub(crate) fn modules_mut(&mut self) -> &mut BTreeMap<ModuleId, ModuleTemporalProperties> {
        Arc::make_mut(&mut self.modules)
    }

    pub(crate) fn tip_state_mut(&mut self) -> &mut TipState {
        Arc::make_mut(&mut self.tip_state)
    }

    pub(crate) fn liquid_state_mut(&mut self) -> &mut LiquidState {
        Arc::make_mut(&mut self.liquid_state)
    }

    pub(crate) fn labware_mut(&mut self) -> &mut BTreeMap<LabwareId, LabwareLocation> {
        Arc::make_mut(&mut self.labware)
    }

    /// Returns true if both snapshots share the same module slice allocation.
    #[cfg(test)]
    pub(crate) fn shares_modules_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.modules, &other.modules)
    }

    /// Returns true if both snapshots share the same liquid slice allocation.
    #[cfg(test)]
    pub(crate) fn shares_liquid_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.liquid_state, &other.liquid_state)
    }
}

/// A robot state together with the warnings produced while reaching it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotStateAndWarnings {
    /// The new state.
    pub robot_state: RobotState,
    /// Warnings raised by the transitions.
    pub warnings: Vec<CommandWarning>,
}
