//! Hardware module entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ModuleId;

/// Closed set of module kinds the engine knows how to drive.
///
/// Every creator and updater that depends on module behavior matches on this
/// enum exhaustively, so adding a kind forces every dispatch site to be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleType {
    /// Temperature module (heats and cools a block).
    #[serde(rename = "temperatureModuleType")]
    TemperatureModule,
    /// Thermocycler with heated lid.
    #[serde(rename = "thermocyclerModuleType")]
    Thermocycler,
    /// Heater-shaker with labware latch.
    #[serde(rename = "heaterShakerModuleType")]
    HeaterShaker,
    /// Magnetic module with a movable magnet.
    #[serde(rename = "magneticModuleType")]
    MagneticModule,
    /// Passive magnetic block. Has no controllable state.
    #[serde(rename = "magneticBlockType")]
    MagneticBlock,
    /// Plate reader measuring absorbance.
    #[serde(rename = "absorbanceReaderType")]
    AbsorbanceReader,
}

impl ModuleType {
    /// Human-readable name used in messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TemperatureModule => "Temperature Module",
            Self::Thermocycler => "Thermocycler",
            Self::HeaterShaker => "Heater-Shaker",
            Self::MagneticModule => "Magnetic Module",
            Self::MagneticBlock => "Magnetic Block",
            Self::AbsorbanceReader => "Absorbance Plate Reader",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Versioned hardware variant of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleModel {
    TemperatureModuleV1,
    TemperatureModuleV2,
    ThermocyclerModuleV1,
    ThermocyclerModuleV2,
    HeaterShakerModuleV1,
    MagneticModuleV1,
    MagneticModuleV2,
    MagneticBlockV1,
    AbsorbanceReaderV1,
}

impl ModuleModel {
    /// The module kind this model belongs to.
    #[must_use]
    pub const fn module_type(self) -> ModuleType {
        match self {
            Self::TemperatureModuleV1 | Self::TemperatureModuleV2 => ModuleType::TemperatureModule,
            Self::ThermocyclerModuleV1 | Self::ThermocyclerModuleV2 => ModuleType::Thermocycler,
            Self::HeaterShakerModuleV1 => ModuleType::HeaterShaker,
            Self::MagneticModuleV1 | Self::MagneticModuleV2 => ModuleType::MagneticModule,
            Self::MagneticBlockV1 => ModuleType::MagneticBlock,
            Self::AbsorbanceReaderV1 => ModuleType::AbsorbanceReader,
        }
    }
}

/// A module loaded in the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntity {
    /// Stable module id.
    pub id: ModuleId,
    /// Module kind; always equal to `model.module_type()`.
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    /// Hardware variant.
    pub model: ModuleModel,
    /// Variable name of this module in generated Python.
    pub python_name: String,
}

impl ModuleEntity {
    /// Creates a module entity, deriving the kind from the model.
    #[must_use]
    pub fn new(id: impl Into<ModuleId>, model: ModuleModel, python_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            module_type: model.module_type(),
            model,
            python_name: python_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_maps_to_type() {
        assert_eq!(ModuleModel::TemperatureModuleV2.module_type(), ModuleType::TemperatureModule);
        assert_eq!(ModuleModel::HeaterShakerModuleV1.module_type(), ModuleType::HeaterShaker);
        assert_eq!(ModuleModel::AbsorbanceReaderV1.module_type(), ModuleType::AbsorbanceReader);
    }

    #[test]
    fn module_type_uses_protocol_tags() {
        let json = serde_json::to_string(&ModuleType::HeaterShaker).unwrap();
        assert_eq!(json, "\"heaterShakerModuleType\"");
    }

    #[test]
    fn entity_derives_type_from_model() {
        let module = ModuleEntity::new("tc", ModuleModel::ThermocyclerModuleV2, "thermocycler_1");
        assert_eq!(module.module_type, ModuleType::Thermocycler);
    }
}
