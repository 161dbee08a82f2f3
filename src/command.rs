//! Low-level hardware commands emitted by command creators.
//!
//! Commands serialize in the protocol command schema: a `commandType` string
//! plus a `params` object. Optional params are omitted when absent rather than
//! written as `null`.

use serde::{Deserialize, Serialize};

use crate::entity::{LabwareId, ModuleId, PipetteId};
use crate::state::{AbsorbanceMode, LabwareLocation};

/// Params for commands addressing only a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParams {
    pub module_id: ModuleId,
}

/// Params for commands carrying a target temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureParams {
    pub module_id: ModuleId,
    pub celsius: f64,
}

/// Params for `heaterShaker/waitForTemperature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterShakerWaitParams {
    pub module_id: ModuleId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub celsius: Option<f64>,
}

/// Params for `heaterShaker/setAndWaitForShakeSpeed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShakeSpeedParams {
    pub module_id: ModuleId,
    pub rpm: f64,
}

/// Params for `magneticModule/engage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngageMagnetParams {
    pub module_id: ModuleId,
    /// Magnet height above the labware base, in mm.
    pub height: f64,
}

/// Params for `thermocycler/setTargetBlockTemperature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemperatureParams {
    pub module_id: ModuleId,
    pub celsius: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub block_max_volume_ul: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hold_time_seconds: Option<f64>,
}

/// One stage of a thermocycler profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStep {
    pub celsius: f64,
    pub hold_seconds: f64,
}

/// Params for `thermocycler/runProfile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProfileParams {
    pub module_id: ModuleId,
    pub profile: Vec<ProfileStep>,
    pub block_max_volume_ul: f64,
}

/// Params for `absorbanceReader/initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceInitializeParams {
    pub module_id: ModuleId,
    pub measure_mode: AbsorbanceMode,
    pub sample_wavelengths: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reference_wavelength: Option<u32>,
}

/// Params for `absorbanceReader/read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReadParams {
    pub module_id: ModuleId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_name: Option<String>,
}

/// Reference point inside a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WellOrigin {
    #[default]
    Bottom,
    Top,
}

/// Offset from a well origin, in mm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WellOffset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Position inside a well.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WellLocation {
    pub origin: WellOrigin,
    #[serde(default)]
    pub offset: WellOffset,
}

impl WellLocation {
    /// `z` mm above the well bottom.
    #[must_use]
    pub fn bottom(z: f64) -> Self {
        Self {
            origin: WellOrigin::Bottom,
            offset: WellOffset { x: 0.0, y: 0.0, z },
        }
    }

    /// `z` mm relative to the well top (negative is inside the well).
    #[must_use]
    pub fn top(z: f64) -> Self {
        Self {
            origin: WellOrigin::Top,
            offset: WellOffset { x: 0.0, y: 0.0, z },
        }
    }
}

/// Params for `pickUpTip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickUpTipParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
}

/// Params for `aspirate` and `dispense`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidHandlingParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    pub volume: f64,
    pub flow_rate: f64,
    pub well_location: WellLocation,
}

/// Params for `moveToAddressableAreaForDropTip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaForDropTipParams {
    pub pipette_id: PipetteId,
    pub addressable_area_name: String,
    pub alternate_drop_location: bool,
}

/// Params for `dropTipInPlace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteParams {
    pub pipette_id: PipetteId,
}

/// How a labware move is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveLabwareStrategy {
    UsingGripper,
    ManualMoveWithPause,
}

/// Params for `moveLabware`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLabwareParams {
    pub labware_id: LabwareId,
    pub new_location: LabwareLocation,
    pub strategy: MoveLabwareStrategy,
}

/// Params for `waitForDuration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForDurationParams {
    pub seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

/// Params for `waitForResume`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForResumeParams {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

/// One hardware command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType", content = "params")]
pub enum Command {
    #[serde(rename = "temperatureModule/setTargetTemperature")]
    TemperatureModuleSetTargetTemperature(TemperatureParams),
    #[serde(rename = "temperatureModule/waitForTemperature")]
    TemperatureModuleWaitForTemperature(TemperatureParams),
    #[serde(rename = "temperatureModule/deactivate")]
    TemperatureModuleDeactivate(ModuleParams),

    #[serde(rename = "heaterShaker/setTargetTemperature")]
    HeaterShakerSetTargetTemperature(TemperatureParams),
    #[serde(rename = "heaterShaker/waitForTemperature")]
    HeaterShakerWaitForTemperature(HeaterShakerWaitParams),
    #[serde(rename = "heaterShaker/deactivateHeater")]
    HeaterShakerDeactivateHeater(ModuleParams),
    #[serde(rename = "heaterShaker/setAndWaitForShakeSpeed")]
    HeaterShakerSetAndWaitForShakeSpeed(ShakeSpeedParams),
    #[serde(rename = "heaterShaker/deactivateShaker")]
    HeaterShakerDeactivateShaker(ModuleParams),
    #[serde(rename = "heaterShaker/openLabwareLatch")]
    HeaterShakerOpenLabwareLatch(ModuleParams),
    #[serde(rename = "heaterShaker/closeLabwareLatch")]
    HeaterShakerCloseLabwareLatch(ModuleParams),

    #[serde(rename = "magneticModule/engage")]
    MagneticModuleEngage(EngageMagnetParams),
    #[serde(rename = "magneticModule/disengage")]
    MagneticModuleDisengage(ModuleParams),

    #[serde(rename = "thermocycler/setTargetBlockTemperature")]
    ThermocyclerSetTargetBlockTemperature(BlockTemperatureParams),
    #[serde(rename = "thermocycler/setTargetLidTemperature")]
    ThermocyclerSetTargetLidTemperature(TemperatureParams),
    #[serde(rename = "thermocycler/waitForBlockTemperature")]
    ThermocyclerWaitForBlockTemperature(ModuleParams),
    #[serde(rename = "thermocycler/waitForLidTemperature")]
    ThermocyclerWaitForLidTemperature(ModuleParams),
    #[serde(rename = "thermocycler/deactivateBlock")]
    ThermocyclerDeactivateBlock(ModuleParams),
    #[serde(rename = "thermocycler/deactivateLid")]
    ThermocyclerDeactivateLid(ModuleParams),
    #[serde(rename = "thermocycler/openLid")]
    ThermocyclerOpenLid(ModuleParams),
    #[serde(rename = "thermocycler/closeLid")]
    ThermocyclerCloseLid(ModuleParams),
    #[serde(rename = "thermocycler/runProfile")]
    ThermocyclerRunProfile(RunProfileParams),

    #[serde(rename = "absorbanceReader/openLid")]
    AbsorbanceReaderOpenLid(ModuleParams),
    #[serde(rename = "absorbanceReader/closeLid")]
    AbsorbanceReaderCloseLid(ModuleParams),
    #[serde(rename = "absorbanceReader/initialize")]
    AbsorbanceReaderInitialize(AbsorbanceInitializeParams),
    #[serde(rename = "absorbanceReader/read")]
    AbsorbanceReaderRead(AbsorbanceReadParams),

    #[serde(rename = "pickUpTip")]
    PickUpTip(PickUpTipParams),
    #[serde(rename = "aspirate")]
    Aspirate(LiquidHandlingParams),
    #[serde(rename = "dispense")]
    Dispense(LiquidHandlingParams),
    #[serde(rename = "moveToAddressableAreaForDropTip")]
    MoveToAddressableAreaForDropTip(MoveToAddressableAreaForDropTipParams),
    #[serde(rename = "dropTipInPlace")]
    DropTipInPlace(PipetteParams),

    #[serde(rename = "moveLabware")]
    MoveLabware(MoveLabwareParams),

    #[serde(rename = "waitForDuration")]
    WaitForDuration(WaitForDurationParams),
    #[serde(rename = "waitForResume")]
    WaitForResume(WaitForResumeParams),
}

impl Command {
    /// The `commandType` string this command serializes with.
    #[must_use]
    pub const fn command_type(&self) -> &'static str {
        match self {
            Self::TemperatureModuleSetTargetTemperature(_) => "temperatureModule/setTargetTemperature",
            Self::TemperatureModuleWaitForTemperature(_) => "temperatureModule/waitForTemperature",
            Self::TemperatureModuleDeactivate(_) => "temperatureModule/deactivate",
            Self::HeaterShakerSetTargetTemperature(_) => "heaterShaker/setTargetTemperature",
            Self::HeaterShakerWaitForTemperature(_) => "heaterShaker/waitForTemperature",
            Self::HeaterShakerDeactivateHeater(_) => "heaterShaker/deactivateHeater",
            Self::HeaterShakerSetAndWaitForShakeSpeed(_) => "heaterShaker/setAndWaitForShakeSpeed",
            Self::HeaterShakerDeactivateShaker(_) => "heaterShaker/deactivateShaker",
            Self::HeaterShakerOpenLabwareLatch(_) => "heaterShaker/openLabwareLatch",
            Self::HeaterShakerCloseLabwareLatch(_) => "heaterShaker/closeLabwareLatch",
            Self::MagneticModuleEngage(_) => "magneticModule/engage",
            Self::MagneticModuleDisengage(_) => "magneticModule/disengage",
            Self::ThermocyclerSetTargetBlockTemperature(_) => "thermocycler/setTargetBlockTemperature",
            Self::ThermocyclerSetTargetLidTemperature(_) => "thermocycler/setTargetLidTemperature",
            Self::ThermocyclerWaitForBlockTemperature(_) => "thermocycler/waitForBlockTemperature",
            Self::ThermocyclerWaitForLidTemperature(_) => "thermocycler/waitForLidTemperature",
            Self::ThermocyclerDeactivateBlock(_) => "thermocycler/deactivateBlock",
            Self::ThermocyclerDeactivateLid(_) => "thermocycler/deactivateLid",
            Self::ThermocyclerOpenLid(_) => "thermocycler/openLid",
            Self::ThermocyclerCloseLid(_) => "thermocycler/closeLid",
            Self::ThermocyclerRunProfile(_) => "thermocycler/runProfile",
            Self::AbsorbanceReaderOpenLid(_) => "absorbanceReader/openLid",
            Self::AbsorbanceReaderCloseLid(_) => "absorbanceReader/closeLid",
            Self::AbsorbanceReaderInitialize(_) => "absorbanceReader/initialize",
            Self::AbsorbanceReaderRead(_) => "absorbanceReader/read",
            Self::PickUpTip(_) => "pickUpTip",
            Self::Aspirate(_) => "aspirate",
            Self::Dispense(_) => "dispense",
            Self::MoveToAddressableAreaForDropTip(_) => "moveToAddressableAreaForDropTip",
            Self::DropTipInPlace(_) => "dropTipInPlace",
            Self::MoveLabware(_) => "moveLabware",
            Self::WaitForDuration(_) => "waitForDuration",
            Self::WaitForResume(_) => "waitForResume",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_serializes_with_type_and_params() {
        let cmd = Command::TemperatureModuleSetTargetTemperature(TemperatureParams {
            module_id: ModuleId::new("tempId"),
            celsius: 42.0,
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["commandType"], "temperatureModule/setTargetTemperature");
        assert_eq!(json["params"]["moduleId"], "tempId");
        assert_eq!(json["params"]["celsius"], 42.0);
        assert_eq!(json["commandType"], cmd.command_type());
    }

    #[test]
    fn absent_file_name_is_omitted() {
        let cmd = Command::AbsorbanceReaderRead(AbsorbanceReadParams {
            module_id: ModuleId::new("reader"),
            file_name: None,
        });
        let json = serde_json::to_value(&cmd).unwrap();
        let params = json["params"].as_object().unwrap();
        assert!(!params.contains_key("fileName"));
    }

    #[test]
    fn command_decodes_from_schema_json() {
        let json = r#"{"commandType":"magneticModule/engage","params":{"moduleId":"mag","height":10}}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            Command::MagneticModuleEngage(EngageMagnetParams {
                module_id: ModuleId::new("mag"),
                height: 10.0,
            })
        );
    }

    #[test]
    fn move_labware_location_shape() {
        let cmd = Command::MoveLabware(MoveLabwareParams {
            labware_id: LabwareId::new("plate"),
            new_location: LabwareLocation::Module(ModuleId::new("hs")),
            strategy: MoveLabwareStrategy::UsingGripper,
        });
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["params"]["newLocation"]["moduleId"], "hs");
        assert_eq!(json["params"]["strategy"], "usingGripper");
    }
}
