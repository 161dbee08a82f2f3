//! The invariant context: every static entity of one protocol.
//!
//! Built once at protocol-load time and shared read-only by every command
//! creator and state updater for the whole simulation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{
    is_python_identifier, AdditionalEquipment, EquipmentId, EquipmentKind, LabwareEntity,
    LabwareId, LiquidEntity, LiquidId, ModuleEntity, ModuleId, PipetteEntity, PipetteId,
};
use crate::error::{SetupError, StepGenResult};

/// Immutable description of all entities in a protocol.
///
/// # Examples
///
/// ```
/// use stepgen::entity::{ModuleEntity, ModuleModel};
/// use stepgen::InvariantContext;
///
/// let ctx = InvariantContext::builder()
///     .module(ModuleEntity::new("tempId", ModuleModel::TemperatureModuleV2, "temperature_module_1"))
///     .build()
///     .unwrap();
/// assert!(ctx.module(&"tempId".into()).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantContext {
    /// Modules by id.
    #[serde(default)]
    pub module_entities: BTreeMap<ModuleId, ModuleEntity>,
    /// Pipettes by id.
    #[serde(default)]
    pub pipette_entities: BTreeMap<PipetteId, PipetteEntity>,
    /// Labware by id.
    #[serde(default)]
    pub labware_entities: BTreeMap<LabwareId, LabwareEntity>,
    /// Liquids by id.
    #[serde(default)]
    pub liquid_entities: BTreeMap<LiquidId, LiquidEntity>,
    /// Grippers, trash bins and waste chutes by id.
    #[serde(default)]
    pub additional_equipment_entities: BTreeMap<EquipmentId, AdditionalEquipment>,
}

impl InvariantContext {
    /// Starts building a context.
    #[must_use]
    pub fn builder() -> InvariantContextBuilder {
        InvariantContextBuilder::default()
    }

    /// Decodes a context from JSON and validates it.
    pub fn from_json(s: &str) -> StepGenResult<Self> {
        let ctx: Self = serde_json::from_str(s)?;
        ctx.validate()?;
        Ok(ctx)
    }

    /// Looks up a module.
    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&ModuleEntity> {
        self.module_entities.get(id)
    }

    /// Looks up a pipette.
    #[must_use]
    pub fn pipette(&self, id: &PipetteId) -> Option<&PipetteEntity> {
        self.pipette_entities.get(id)
    }

    /// Looks up a labware.
    #[must_use]
    pub fn labware(&self, id: &LabwareId) -> Option<&LabwareEntity> {
        self.labware_entities.get(id)
    }

    /// Looks up a liquid.
    #[must_use]
    pub fn liquid(&self, id: &LiquidId) -> Option<&LiquidEntity> {
        self.liquid_entities.get(id)
    }

    /// The first equipment tips can be dropped into, in id order.
    #[must_use]
    pub fn trash(&self) -> Option<&AdditionalEquipment> {
        self.additional_equipment_entities
            .values()
            .find(|e| e.accepts_tips())
    }

    /// Returns true if a gripper is attached.
    #[must_use]
    pub fn has_gripper(&self) -> bool {
        self.additional_equipment_entities
            .values()
            .any(|e| e.kind == EquipmentKind::Gripper)
    }

    /// Capacity of one tip for `pipette`: the smaller of the pipette maximum and
    /// the tip size of its first tip rack.
    #[must_use]
    pub fn pipette_capacity(&self, pipette: &PipetteEntity) -> f64 {
        let tip = pipette
            .tiprack_ids
            .first()
            .and_then(|id| self.labware(id))
            .and_then(|lw| lw.definition.tip_capacity());
        match tip {
            Some(tip) => tip.min(pipette.spec.max_volume),
            None => pipette.spec.max_volume,
        }
    }

    /// Checks the cross-entity invariants the engine relies on.
    pub fn validate(&self) -> Result<(), SetupError> {
        for (key, module) in &self.module_entities {
            check_key("module", key.as_str(), module.id.as_str())?;
            check_python_name(module.id.as_str(), &module.python_name)?;
        }
        for (key, labware) in &self.labware_entities {
            check_key("labware", key.as_str(), labware.id.as_str())?;
            check_python_name(labware.id.as_str(), &labware.python_name)?;
            let def = &labware.definition;
            if def.ordering.is_empty() {
                return Err(SetupError::InvalidLabwareDefinition {
                    load_name: def.load_name.clone(),
                    reason: "definition has no wells".to_string(),
                });
            }
            if let Some(missing) = def.wells_in_order().find(|w| !def.has_well(w)) {
                return Err(SetupError::InvalidLabwareDefinition {
                    load_name: def.load_name.clone(),
                    reason: format!("ordering references unknown well {missing}"),
                });
            }
        }
        for (key, pipette) in &self.pipette_entities {
            check_key("pipette", key.as_str(), pipette.id.as_str())?;
            check_python_name(pipette.id.as_str(), &pipette.python_name)?;
            if !matches!(pipette.spec.channels, 1 | 8) {
                return Err(SetupError::InvalidPipetteSpec {
                    pipette_id: pipette.id.clone(),
                    reason: format!("unsupported channel count {}", pipette.spec.channels),
                });
            }
            if pipette.spec.max_volume <= 0.0 {
                return Err(SetupError::InvalidPipetteSpec {
                    pipette_id: pipette.id.clone(),
                    reason: "max volume must be positive".to_string(),
                });
            }
            for tiprack_id in &pipette.tiprack_ids {
                let tiprack = self.labware(tiprack_id).ok_or_else(|| SetupError::UnknownEntity {
                    kind: "labware",
                    id: tiprack_id.to_string(),
                })?;
                if !tiprack.definition.is_tiprack {
                    return Err(SetupError::NotATiprack {
                        pipette_id: pipette.id.clone(),
                        labware_id: tiprack_id.clone(),
                    });
                }
            }
        }
        for (key, liquid) in &self.liquid_entities {
            check_key("liquid", key.as_str(), liquid.id.as_str())?;
            check_python_name(liquid.id.as_str(), &liquid.python_name)?;
        }
        for (key, equipment) in &self.additional_equipment_entities {
            check_key("equipment", key.as_str(), equipment.id.as_str())?;
            check_python_name(equipment.id.as_str(), &equipment.python_name)?;
        }
        Ok(())
    }
}

fn check_key(kind: &'static str, key: &str, id: &str) -> Result<(), SetupError> {
    if key == id {
        Ok(())
    } else {
        Err(SetupError::MismatchedId {
            kind,
            key: key.to_string(),
            id: id.to_string(),
        })
    }
}

fn check_python_name(id: &str, name: &str) -> Result<(), SetupError> {
    if is_python_identifier(name) {
        Ok(())
    } else {
        Err(SetupError::InvalidPythonName {
            id: id.to_string(),
            name: name.to_string(),
        })
    }
}

fn insert_unique<K: Ord + ToString, V>(
    map: &mut BTreeMap<K, V>,
    kind: &'static str,
    key: K,
    value: V,
) -> Result<(), SetupError> {
    if map.contains_key(&key) {
        return Err(SetupError::DuplicateId {
            kind,
            id: key.to_string(),
        });
    }
    map.insert(key, value);
    Ok(())
}

/// Builder for [`InvariantContext`].
///
/// Entities are collected in call order; `build` rejects duplicate ids and
/// runs [`InvariantContext::validate`].
#[derive(Debug, Clone, Default)]
pub struct InvariantContextBuilder {
    modules: Vec<ModuleEntity>,
    pipettes: Vec<PipetteEntity>,
    labware: Vec<LabwareEntity>,
    liquids: Vec<LiquidEntity>,
    equipment: Vec<AdditionalEquipment>,
}

impl InvariantContextBuilder {
    /// Adds a module.
    #[must_use]
    pub fn module(mut self, module: ModuleEntity) -> Self {
        self.modules.push(module);
        self
    }

    /// Adds a pipette.
    #[must_use]
    pub fn pipette(mut self, pipette: PipetteEntity) -> Self {
        self.pipettes.push(pipette);
        self
    }

    /// Adds a labware.
    #[must_use]
    pub fn labware(mut self, labware: LabwareEntity) -> Self {
        self.labware.push(labware);
        self
    }

    /// Adds a liquid.
    #[must_use]
    pub fn liquid(mut self, liquid: LiquidEntity) -> Self {
        self.liquids.push(liquid);
        self
    }

    /// Adds a gripper, trash bin or waste chute.
    #[must_use]
    pub fn equipment(mut self, equipment: AdditionalEquipment) -> Self {
        self.equipment.push(equipment);
        self
    }

    /// Builds and validates the context.
    pub fn build(self) -> Result<InvariantContext, SetupError> {
        let mut ctx = InvariantContext::default();
        for module in self.modules {
            insert_unique(&mut ctx.module_entities, "module", module.id.clone(), module)?;
        }
        for pipette in self.pipettes {
            insert_unique(&mut ctx.pipette_entities, "pipette", pipette.id.clone(), pipette)?;
        }
        for labware in self.labware {
            insert_unique(&mut ctx.labware_entities, "labware", labware.id.clone(), labware)?;
        }
        for liquid in self.liquids {
            insert_unique(&mut ctx.liquid_entities, "liquid", liquid.id.clone(), liquid)?;
        }
        for equipment in self.equipment {
            insert_unique(
                &mut ctx.additional_equipment_entities,
                "equipment",
                equipment.id.clone(),
                equipment,
            )?;
        }
        ctx.validate()?;
        Ok(ctx)
    }
}
