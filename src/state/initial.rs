//! Construction of the starting robot state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::{LabwareId, LiquidId, ModuleId};
use crate::error::SetupError;
use crate::invariant::InvariantContext;

use super::{LabwareLocation, LiquidState, ModuleState, ModuleTemporalProperties, RobotState, TipState};

/// Where things start on the deck, plus the liquids loaded before the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDeckSetup {
    /// Deck slot of every module.
    #[serde(default)]
    pub module_slots: BTreeMap<ModuleId, String>,
    /// Starting location of labware. Labware not listed starts off deck.
    #[serde(default)]
    pub labware_locations: BTreeMap<LabwareId, LabwareLocation>,
    /// Liquid volumes (µL) loaded into wells before the run.
    #[serde(default)]
    pub well_liquids: BTreeMap<LabwareId, BTreeMap<String, BTreeMap<LiquidId, f64>>>,
}

impl InitialDeckSetup {
    /// Creates an empty setup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a module in a slot.
    #[must_use]
    pub fn module(mut self, id: impl Into<ModuleId>, slot: impl Into<String>) -> Self {
        self.module_slots.insert(id.into(), slot.into());
        self
    }

    /// Places a labware.
    #[must_use]
    pub fn labware(mut self, id: impl Into<LabwareId>, location: LabwareLocation) -> Self {
        self.labware_locations.insert(id.into(), location);
        self
    }

    /// Loads `volume` µL of a liquid into a well.
    #[must_use]
    pub fn liquid(
        mut self,
        labware: impl Into<LabwareId>,
        well: impl Into<String>,
        liquid: impl Into<LiquidId>,
        volume: f64,
    ) -> Self {
        self.well_liquids
            .entry(labware.into())
            .or_default()
            .entry(well.into())
            .or_default()
            .insert(liquid.into(), volume);
        self
    }
}

impl RobotState {
    /// Builds the state at the start of the protocol.
    ///
    /// Modules start deactivated in their slots, every tip rack is full, no
    /// pipette holds a tip and wells hold only the liquids from `setup`.
    pub fn initial(
        invariant: &InvariantContext,
        setup: &InitialDeckSetup,
    ) -> Result<Self, SetupError> {
        let mut modules = BTreeMap::new();
        for (id, module) in &invariant.module_entities {
            let slot = setup
                .module_slots
                .get(id)
                .ok_or_else(|| SetupError::MissingPlacement {
                    kind: "module",
                    id: id.to_string(),
                })?;
            modules.insert(
                id.clone(),
                ModuleTemporalProperties {
                    slot: slot.clone(),
                    module_state: ModuleState::initial(module.module_type),
                },
            );
        }
        if let Some(unknown) = setup.module_slots.keys().find(|id| invariant.module(id).is_none()) {
            return Err(SetupError::UnknownEntity {
                kind: "module",
                id: unknown.to_string(),
            });
        }

        let mut labware = BTreeMap::new();
        for id in invariant.labware_entities.keys() {
            let location = setup
                .labware_locations
                .get(id)
                .cloned()
                .unwrap_or(LabwareLocation::OffDeck);
            match &location {
                LabwareLocation::Module(module_id) if invariant.module(module_id).is_none() => {
                    return Err(SetupError::UnknownEntity {
                        kind: "module",
                        id: module_id.to_string(),
                    });
                }
                LabwareLocation::Labware(below) if invariant.labware(below).is_none() => {
                    return Err(SetupError::UnknownEntity {
                        kind: "labware",
                        id: below.to_string(),
                    });
                }
                _ => {}
            }
            labware.insert(id.clone(), location);
        }
        if let Some(unknown) = setup
            .labware_locations
            .keys()
            .find(|id| invariant.labware(id).is_none())
        {
            return Err(SetupError::UnknownEntity {
                kind: "labware",
                id: unknown.to_string(),
            });
        }

        let mut tip_state = TipState::default();
        for (id, entity) in &invariant.labware_entities {
            if entity.definition.is_tiprack {
                let wells = entity
                    .definition
                    .wells_in_order()
                    .map(|w| (w.to_string(), true))
                    .collect();
                tip_state.tipracks.insert(id.clone(), wells);
            }
        }
        for id in invariant.pipette_entities.keys() {
            tip_state.pipettes.insert(id.clone(), false);
        }

        let mut liquid_state = LiquidState::default();
        for (labware_id, wells) in &setup.well_liquids {
            let entity = invariant
                .labware(labware_id)
                .ok_or_else(|| SetupError::UnknownEntity {
                    kind: "labware",
                    id: labware_id.to_string(),
                })?;
            for (well, liquids) in wells {
                if !entity.definition.has_well(well) {
                    return Err(SetupError::UnknownWell {
                        labware_id: labware_id.clone(),
                        well: well.clone(),
                    });
                }
                if let Some(unknown) = liquids.keys().find(|id| invariant.liquid(id).is_none()) {
                    return Err(SetupError::UnknownEntity {
                        kind: "liquid",
                        id: unknown.to_string(),
                    });
                }
                liquid_state.set_well(labware_id, well, liquids.clone());
            }
        }

        Ok(Self {
            modules: Arc::new(modules),
            tip_state: Arc::new(tip_state),
            liquid_state: Arc::new(liquid_state),
            labware: Arc::new(labware),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{LabwareDefinition, LabwareEntity, LiquidEntity, ModuleEntity, ModuleModel};

    fn context() -> InvariantContext {
        InvariantContext::builder()
            .module(ModuleEntity::new(
                "reader",
                ModuleModel::AbsorbanceReaderV1,
                "absorbance_module_1",
            ))
            .labware(LabwareEntity {
                id: LabwareId::new("plate"),
                definition: LabwareDefinition::grid("plate", "Plate", 8, 12, 200.0, false),
                python_name: "well_plate_1".to_string(),
            })
            .labware(LabwareEntity {
                id: LabwareId::new("rack"),
                definition: LabwareDefinition::grid("tips", "Tips", 8, 12, 300.0, true),
                python_name: "tip_rack_1".to_string(),
            })
            .liquid(LiquidEntity {
                id: LiquidId::new("water"),
                display_name: "Water".to_string(),
                python_name: "liquid_1".to_string(),
                display_color: "#0000ff".to_string(),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn initial_state_places_everything() {
        let setup = InitialDeckSetup::new()
            .module("reader", "D3")
            .labware("plate", LabwareLocation::Slot("D1".to_string()))
            .liquid("plate", "A1", "water", 100.0);
        let state = RobotState::initial(&context(), &setup).unwrap();

        assert_eq!(
            state.module_state(&ModuleId::new("reader")),
            Some(&ModuleState::AbsorbanceReader {
                lid_open: false,
                initialization: None
            })
        );
        assert_eq!(
            state.labware_location(&LabwareId::new("rack")),
            Some(&LabwareLocation::OffDeck)
        );
        assert!(state
            .tip_state()
            .tips_present(&LabwareId::new("rack"), &["A1", "H12"]));
        let well = state.liquid_state().well(&LabwareId::new("plate"), "A1");
        assert!((well[&LiquidId::new("water")] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn module_without_slot_is_rejected() {
        let err = RobotState::initial(&context(), &InitialDeckSetup::new()).unwrap_err();
        assert!(matches!(err, SetupError::MissingPlacement { kind: "module", .. }));
    }

    #[test]
    fn unknown_well_is_rejected() {
        let setup = InitialDeckSetup::new()
            .module("reader", "D3")
            .liquid("plate", "Z99", "water", 10.0);
        let err = RobotState::initial(&context(), &setup).unwrap_err();
        assert!(matches!(err, SetupError::UnknownWell { .. }));
    }

    #[test]
    fn unknown_liquid_is_rejected() {
        let setup = InitialDeckSetup::new()
            .module("reader", "D3")
            .liquid("plate", "A1", "ethanol", 10.0);
        let err = RobotState::initial(&context(), &setup).unwrap_err();
        assert!(matches!(err, SetupError::UnknownEntity { kind: "liquid", .. }));
    }
}
