//! Error and warning types for stepgen.
//!
//! Two families live here:
//!
//! - Step-level problems ([`CommandError`], [`CommandWarning`]) are ordinary
//!   values returned by command creators and state updaters. They are never
//!   raised; the timeline collects them so callers can show every problem at once.
//! - Crate-level failures ([`SetupError`], [`ConfigError`], [`StepGenError`])
//!   cover invalid input to the engine itself: malformed setup, bad config or
//!   JSON that cannot be decoded.
//!
//! All are strongly typed using thiserror.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::entity::{LabwareId, ModuleId, PipetteId};

/// Tag identifying the kind of a [`CommandError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    MissingModule,
    MissingTemperatureStep,
    PipetteDoesNotExist,
    LabwareDoesNotExist,
    WellDoesNotExist,
    NoTipOnPipette,
    InsufficientTips,
    PipetteVolumeExceeded,
    DropTipLocationDoesNotExist,
    LabwareOffDeck,
    ThermocyclerLidClosed,
    HeaterShakerLatchOpen,
    HeaterShakerLatchClosed,
    HeaterShakerIsShaking,
    AbsorbanceReaderLidClosed,
    InvalidAbsorbanceReaderSettings,
    NoGripper,
    LocationOccupied,
    LabwareStackCycle,
    InvalidWellPairing,
    TooManySubSteps,
}

/// A precondition a step violates. Prevents the step's commands from being emitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Module {module_id} is not on the deck or cannot perform this operation")]
    MissingModule { module_id: ModuleId },

    #[error("No step sets module {module_id} to {celsius}°C before waiting for it")]
    MissingTemperatureStep { module_id: ModuleId, celsius: f64 },

    #[error("Pipette {pipette_id} does not exist")]
    PipetteDoesNotExist { pipette_id: PipetteId },

    #[error("Labware {labware_id} does not exist")]
    LabwareDoesNotExist { labware_id: LabwareId },

    #[error("Well {well} does not exist in labware {labware_id}")]
    WellDoesNotExist { labware_id: LabwareId, well: String },

    #[error("Pipette {pipette_id} has no tip attached")]
    NoTipOnPipette { pipette_id: PipetteId },

    #[error("Not enough tips left for pipette {pipette_id}")]
    InsufficientTips { pipette_id: PipetteId },

    #[error("Pipette {pipette_id} cannot hold {volume} µL (capacity {capacity} µL)")]
    PipetteVolumeExceeded {
        pipette_id: PipetteId,
        volume: f64,
        capacity: f64,
    },

    #[error("No trash bin or waste chute is available to drop tips into")]
    DropTipLocationDoesNotExist,

    #[error("Labware {labware_id} is off deck")]
    LabwareOffDeck { labware_id: LabwareId },

    #[error("Thermocycler {module_id} lid is closed")]
    ThermocyclerLidClosed { module_id: ModuleId },

    #[error("Heater-Shaker {module_id} labware latch is open")]
    HeaterShakerLatchOpen { module_id: ModuleId },

    #[error("Heater-Shaker {module_id} labware latch is closed")]
    HeaterShakerLatchClosed { module_id: ModuleId },

    #[error("Heater-Shaker {module_id} is shaking")]
    HeaterShakerIsShaking { module_id: ModuleId },

    #[error("Absorbance reader {module_id} lid is closed")]
    AbsorbanceReaderLidClosed { module_id: ModuleId },

    #[error("Invalid absorbance reader settings for {module_id}: {reason}")]
    InvalidAbsorbanceReaderSettings { module_id: ModuleId, reason: String },

    #[error("Moving labware with the gripper requires a gripper")]
    NoGripper,

    #[error("Location {location} is already occupied")]
    LocationOccupied { location: String },

    #[error("Labware {labware_id} cannot go on {below}, which is itself or stacked on it")]
    LabwareStackCycle { labware_id: LabwareId, below: LabwareId },

    #[error("Cannot pair {sources} source wells with {destinations} destination wells")]
    InvalidWellPairing { sources: usize, destinations: usize },

    #[error("Step expands to {requested} liquid-handling commands, more than the maximum of {max}")]
    TooManySubSteps { requested: f64, max: usize },
}

impl CommandError {
    /// The closed tag of this error.
    #[must_use]
    pub const fn error_type(&self) -> ErrorType {
        match self {
            Self::MissingModule { .. } => ErrorType::MissingModule,
            Self::MissingTemperatureStep { .. } => ErrorType::MissingTemperatureStep,
            Self::PipetteDoesNotExist { .. } => ErrorType::PipetteDoesNotExist,
            Self::LabwareDoesNotExist { .. } => ErrorType::LabwareDoesNotExist,
            Self::WellDoesNotExist { .. } => ErrorType::WellDoesNotExist,
            Self::NoTipOnPipette { .. } => ErrorType::NoTipOnPipette,
            Self::InsufficientTips { .. } => ErrorType::InsufficientTips,
            Self::PipetteVolumeExceeded { .. } => ErrorType::PipetteVolumeExceeded,
            Self::DropTipLocationDoesNotExist => ErrorType::DropTipLocationDoesNotExist,
            Self::LabwareOffDeck { .. } => ErrorType::LabwareOffDeck,
            Self::ThermocyclerLidClosed { .. } => ErrorType::ThermocyclerLidClosed,
            Self::HeaterShakerLatchOpen { .. } => ErrorType::HeaterShakerLatchOpen,
            Self::HeaterShakerLatchClosed { .. } => ErrorType::HeaterShakerLatchClosed,
            Self::HeaterShakerIsShaking { .. } => ErrorType::HeaterShakerIsShaking,
            Self::AbsorbanceReaderLidClosed { .. } => ErrorType::AbsorbanceReaderLidClosed,
            Self::InvalidAbsorbanceReaderSettings { .. } => {
                ErrorType::InvalidAbsorbanceReaderSettings
            }
            Self::NoGripper => ErrorType::NoGripper,
            Self::LocationOccupied { .. } => ErrorType::LocationOccupied,
            Self::LabwareStackCycle { .. } => ErrorType::LabwareStackCycle,
            Self::InvalidWellPairing { .. } => ErrorType::InvalidWellPairing,
            Self::TooManySubSteps { .. } => ErrorType::TooManySubSteps,
        }
    }

    /// Shorthand for [`CommandError::MissingModule`].
    #[must_use]
    pub fn missing_module(module_id: &ModuleId) -> Self {
        Self::MissingModule {
            module_id: module_id.clone(),
        }
    }
}

impl Serialize for CommandError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CommandError", 2)?;
        s.serialize_field("type", &self.error_type())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

/// Tag identifying the kind of a [`CommandWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningType {
    TemperatureIsPotentiallyUnreachable,
    AspirateMoreThanWellContents,
    AspirateFromPristineWell,
}

/// Advisory problem. The step still produces its commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandWarning {
    #[error("Module {module_id} may not have reached {celsius}°C yet")]
    TemperatureIsPotentiallyUnreachable { module_id: ModuleId, celsius: f64 },

    #[error("Aspirating more than well {well} of {labware_id} contains")]
    AspirateMoreThanWellContents { labware_id: LabwareId, well: String },

    #[error("Aspirating from well {well} of {labware_id}, which holds no known liquid")]
    AspirateFromPristineWell { labware_id: LabwareId, well: String },
}

impl CommandWarning {
    /// The closed tag of this warning.
    #[must_use]
    pub const fn warning_type(&self) -> WarningType {
        match self {
            Self::TemperatureIsPotentiallyUnreachable { .. } => {
                WarningType::TemperatureIsPotentiallyUnreachable
            }
            Self::AspirateMoreThanWellContents { .. } => WarningType::AspirateMoreThanWellContents,
            Self::AspirateFromPristineWell { .. } => WarningType::AspirateFromPristineWell,
        }
    }
}

impl Serialize for CommandWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CommandWarning", 2)?;
        s.serialize_field("type", &self.warning_type())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

/// Errors in the protocol setup handed to the engine.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} stored under key {key} has id {id}")]
    MismatchedId {
        kind: &'static str,
        key: String,
        id: String,
    },

    #[error("Unknown {kind} referenced: {id}")]
    UnknownEntity { kind: &'static str, id: String },

    #[error("No initial placement given for {kind} {id}")]
    MissingPlacement { kind: &'static str, id: String },

    #[error("Well {well} does not exist in labware {labware_id}")]
    UnknownWell { labware_id: LabwareId, well: String },

    #[error("'{name}' is not a valid Python identifier (entity {id})")]
    InvalidPythonName { id: String, name: String },

    #[error("Labware {labware_id} assigned to pipette {pipette_id} is not a tip rack")]
    NotATiprack {
        pipette_id: PipetteId,
        labware_id: LabwareId,
    },

    #[error("Invalid pipette spec for {pipette_id}: {reason}")]
    InvalidPipetteSpec { pipette_id: PipetteId, reason: String },

    #[error("Invalid labware definition '{load_name}': {reason}")]
    InvalidLabwareDefinition { load_name: String, reason: String },
}

/// Errors in timeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid timeline config: {reason}")]
    Invalid { reason: String },

    #[error("Protocol has {actual} steps, more than the configured maximum of {max}")]
    TooManySteps { max: usize, actual: usize },
}

/// Top-level error type for stepgen.
#[derive(Debug, Error)]
pub enum StepGenError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl StepGenError {
    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns true if this is a setup error.
    #[must_use]
    pub const fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }

    /// Returns true if this is a config error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a serialization error.
    #[must_use]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<serde_json::Error> for StepGenError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Result type alias for fallible stepgen entry points.
pub type StepGenResult<T> = Result<T, StepGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_module_message_and_tag() {
        let err = CommandError::missing_module(&ModuleId::new("tempId"));
        assert_eq!(err.error_type(), ErrorType::MissingModule);
        assert!(err.to_string().contains("tempId"));
    }

    #[test]
    fn test_command_error_serializes_as_type_and_message() {
        let err = CommandError::MissingTemperatureStep {
            module_id: ModuleId::new("tempId"),
            celsius: 42.0,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "MISSING_TEMPERATURE_STEP");
        assert!(json["message"].as_str().unwrap().contains("42"));
    }

    #[test]
    fn test_warning_serializes_as_type_and_message() {
        let warning = CommandWarning::TemperatureIsPotentiallyUnreachable {
            module_id: ModuleId::new("tempId"),
            celsius: 80.0,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["type"], "TEMPERATURE_IS_POTENTIALLY_UNREACHABLE");
    }

    #[test]
    fn test_unit_variant_tags() {
        assert_eq!(
            CommandError::DropTipLocationDoesNotExist.error_type(),
            ErrorType::DropTipLocationDoesNotExist
        );
        let json = serde_json::to_value(CommandError::NoGripper).unwrap();
        assert_eq!(json["type"], "NO_GRIPPER");
    }

    #[test]
    fn test_stack_cycle_and_sub_step_tags() {
        let cycle = CommandError::LabwareStackCycle {
            labware_id: LabwareId::new("plateId"),
            below: LabwareId::new("lidId"),
        };
        let json = serde_json::to_value(&cycle).unwrap();
        assert_eq!(json["type"], "LABWARE_STACK_CYCLE");
        assert!(json["message"].as_str().unwrap().contains("lidId"));

        let many = CommandError::TooManySubSteps {
            requested: 20_000.0,
            max: 10_000,
        };
        assert_eq!(many.error_type(), ErrorType::TooManySubSteps);
        assert!(many.to_string().contains("10000"));
    }

    #[test]
    fn test_stepgen_error_from_setup() {
        let err: StepGenError = SetupError::DuplicateId {
            kind: "module",
            id: "m1".to_string(),
        }
        .into();
        assert!(err.is_setup());
        assert!(err.to_string().contains("m1"));
    }

    #[test]
    fn test_stepgen_error_from_config() {
        let err: StepGenError = ConfigError::TooManySteps { max: 2, actual: 3 }.into();
        assert!(err.is_config());
        let msg = err.to_string();
        assert!(msg.contains('2'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_stepgen_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: StepGenError = json_err.into();
        assert!(err.is_serialization());
    }
}
