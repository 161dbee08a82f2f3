//! Per-module operating state.

use serde::{Deserialize, Serialize};

use crate::entity::ModuleType;

/// Progress of a heating/cooling module towards its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemperatureStatus {
    /// Heater off; no target.
    #[default]
    Deactivated,
    /// Target set but arrival not yet confirmed by a wait.
    ApproachingTarget,
    /// A wait confirmed the module is at its target.
    AtTarget,
}

/// Measurement mode of the absorbance reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbsorbanceMode {
    /// One sample wavelength, optional reference wavelength.
    Single,
    /// Up to six sample wavelengths.
    Multi,
}

impl AbsorbanceMode {
    /// Mode name as used in the Python API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }
}

/// Settings the absorbance reader was last initialized with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceInitialization {
    /// Measurement mode.
    pub mode: AbsorbanceMode,
    /// Sample wavelengths in nm.
    pub wavelengths: Vec<u32>,
    /// Reference wavelength in nm (single mode only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reference_wavelength: Option<u32>,
}

/// Live state of one module. Each variant holds only what its hardware tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleState {
    #[serde(rename = "temperatureModuleType", rename_all = "camelCase")]
    TemperatureModule {
        status: TemperatureStatus,
        target_temperature: Option<f64>,
    },
    #[serde(rename = "thermocyclerModuleType", rename_all = "camelCase")]
    Thermocycler {
        block_target_temp: Option<f64>,
        lid_target_temp: Option<f64>,
        lid_open: Option<bool>,
    },
    #[serde(rename = "heaterShakerModuleType", rename_all = "camelCase")]
    HeaterShaker {
        status: TemperatureStatus,
        target_temperature: Option<f64>,
        target_speed: Option<f64>,
        latch_open: Option<bool>,
    },
    #[serde(rename = "magneticModuleType", rename_all = "camelCase")]
    MagneticModule { engaged: bool },
    #[serde(rename = "magneticBlockType")]
    MagneticBlock {},
    #[serde(rename = "absorbanceReaderType", rename_all = "camelCase")]
    AbsorbanceReader {
        lid_open: bool,
        initialization: Option<AbsorbanceInitialization>,
    },
}

impl ModuleState {
    /// Power-on state of a module of the given kind.
    #[must_use]
    pub const fn initial(module_type: ModuleType) -> Self {
        match module_type {
            ModuleType::TemperatureModule => Self::TemperatureModule {
                status: TemperatureStatus::Deactivated,
                target_temperature: None,
            },
            ModuleType::Thermocycler => Self::Thermocycler {
                block_target_temp: None,
                lid_target_temp: None,
                lid_open: None,
            },
            ModuleType::HeaterShaker => Self::HeaterShaker {
                status: TemperatureStatus::Deactivated,
                target_temperature: None,
                target_speed: None,
                latch_open: None,
            },
            ModuleType::MagneticModule => Self::MagneticModule { engaged: false },
            ModuleType::MagneticBlock => Self::MagneticBlock {},
            ModuleType::AbsorbanceReader => Self::AbsorbanceReader {
                lid_open: false,
                initialization: None,
            },
        }
    }

    /// The module kind this state belongs to.
    #[must_use]
    pub const fn module_type(&self) -> ModuleType {
        match self {
            Self::TemperatureModule { .. } => ModuleType::TemperatureModule,
            Self::Thermocycler { .. } => ModuleType::Thermocycler,
            Self::HeaterShaker { .. } => ModuleType::HeaterShaker,
            Self::MagneticModule { .. } => ModuleType::MagneticModule,
            Self::MagneticBlock {} => ModuleType::MagneticBlock,
            Self::AbsorbanceReader { .. } => ModuleType::AbsorbanceReader,
        }
    }

    /// Temperature status and target for modules driven by the shared
    /// temperature state machine.
    #[must_use]
    pub const fn temperature(&self) -> Option<(TemperatureStatus, Option<f64>)> {
        match self {
            Self::TemperatureModule {
                status,
                target_temperature,
            }
            | Self::HeaterShaker {
                status,
                target_temperature,
                ..
            } => Some((*status, *target_temperature)),
            _ => None,
        }
    }

    /// True if this is a heater-shaker with a running shaker.
    #[must_use]
    pub fn is_shaking(&self) -> bool {
        matches!(self, Self::HeaterShaker { target_speed: Some(speed), .. } if *speed > 0.0)
    }
}

/// A module's slot plus its live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTemporalProperties {
    /// Deck slot the module occupies.
    pub slot: String,
    /// Live state.
    pub module_state: ModuleState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_states_match_kind() {
        for kind in [
            ModuleType::TemperatureModule,
            ModuleType::Thermocycler,
            ModuleType::HeaterShaker,
            ModuleType::MagneticModule,
            ModuleType::MagneticBlock,
            ModuleType::AbsorbanceReader,
        ] {
            assert_eq!(ModuleState::initial(kind).module_type(), kind);
        }
    }

    #[test]
    fn absorbance_reader_starts_closed_and_uninitialized() {
        let state = ModuleState::initial(ModuleType::AbsorbanceReader);
        assert_eq!(
            state,
            ModuleState::AbsorbanceReader {
                lid_open: false,
                initialization: None
            }
        );
    }

    #[test]
    fn module_state_is_tagged_by_type() {
        let state = ModuleState::initial(ModuleType::TemperatureModule);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["type"], "temperatureModuleType");
        assert_eq!(json["status"], "DEACTIVATED");
    }

    #[test]
    fn shaking_requires_positive_speed() {
        let mut state = ModuleState::initial(ModuleType::HeaterShaker);
        assert!(!state.is_shaking());
        if let ModuleState::HeaterShaker { target_speed, .. } = &mut state {
            *target_speed = Some(500.0);
        }
        assert!(state.is_shaking());
    }
}
