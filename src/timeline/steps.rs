//! Protocol steps: a creator name plus its arguments.

use serde::{Deserialize, Serialize};

use crate::creators::atomic::{
    absorbance_reader_close_lid, absorbance_reader_initialize, absorbance_reader_open_lid,
    absorbance_reader_read, aspirate, deactivate_temperature, delay, disengage_magnet, dispense,
    drop_tip_in_place, engage_magnet, heater_shaker_close_latch, heater_shaker_open_latch,
    heater_shaker_set_shake_speed, heater_shaker_stop_shake, move_labware,
    move_to_addressable_area_for_drop_tip, pause, pick_up_tip, set_temperature,
    thermocycler_close_lid, thermocycler_deactivate_block, thermocycler_deactivate_lid,
    thermocycler_open_lid, thermocycler_run_profile, thermocycler_set_block_temperature,
    thermocycler_set_lid_temperature, thermocycler_wait_for_block_temperature,
    thermocycler_wait_for_lid_temperature, wait_for_temperature, AbsorbanceInitializeArgs,
    AbsorbanceReadArgs, BlockTemperatureArgs, DelayArgs, DropTipAreaArgs, EngageMagnetArgs,
    LiquidHandlingArgs, ModuleOnlyArgs, ModuleTemperatureArgs, MoveLabwareArgs, PauseArgs,
    PickUpTipArgs, PipetteArgs, RunProfileArgs, ShakeSpeedArgs,
};
use crate::creators::compound::{
    absorbance_reader_close_initialize, absorbance_reader_close_read, drop_tip,
    heater_shaker_step, mix, replace_tip, thermocycler_profile_step, thermocycler_state_step,
    transfer, AbsorbanceCloseInitializeArgs, AbsorbanceCloseReadArgs, DropTipArgs,
    HeaterShakerStepArgs, MixArgs, ReplaceTipArgs, ThermocyclerProfileArgs,
    ThermocyclerStateArgs, TransferArgs,
};
use crate::creators::CommandCreatorResult;
use crate::invariant::InvariantContext;
use crate::state::RobotState;

/// One protocol step, tagged by the creator that lowers it.
///
/// ```
/// use stepgen::timeline::StepArgs;
///
/// let step: StepArgs = serde_json::from_str(
///     r#"{"commandCreatorFnName": "setTemperature", "moduleId": "tempId", "celsius": 42}"#,
/// )
/// .unwrap();
/// assert_eq!(step.creator_name(), "setTemperature");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandCreatorFnName", rename_all = "camelCase")]
pub enum StepArgs {
    SetTemperature(ModuleTemperatureArgs),
    WaitForTemperature(ModuleTemperatureArgs),
    DeactivateTemperature(ModuleOnlyArgs),

    EngageMagnet(EngageMagnetArgs),
    DisengageMagnet(ModuleOnlyArgs),

    HeaterShakerSetShakeSpeed(ShakeSpeedArgs),
    HeaterShakerStopShake(ModuleOnlyArgs),
    HeaterShakerOpenLatch(ModuleOnlyArgs),
    HeaterShakerCloseLatch(ModuleOnlyArgs),
    HeaterShakerStep(HeaterShakerStepArgs),

    ThermocyclerSetBlockTemperature(BlockTemperatureArgs),
    ThermocyclerSetLidTemperature(ModuleTemperatureArgs),
    ThermocyclerWaitForBlockTemperature(ModuleOnlyArgs),
    ThermocyclerWaitForLidTemperature(ModuleOnlyArgs),
    ThermocyclerDeactivateBlock(ModuleOnlyArgs),
    ThermocyclerDeactivateLid(ModuleOnlyArgs),
    ThermocyclerOpenLid(ModuleOnlyArgs),
    ThermocyclerCloseLid(ModuleOnlyArgs),
    ThermocyclerRunProfile(RunProfileArgs),
    ThermocyclerStateStep(ThermocyclerStateArgs),
    ThermocyclerProfileStep(ThermocyclerProfileArgs),

    AbsorbanceReaderOpenLid(ModuleOnlyArgs),
    AbsorbanceReaderCloseLid(ModuleOnlyArgs),
    AbsorbanceReaderInitialize(AbsorbanceInitializeArgs),
    AbsorbanceReaderRead(AbsorbanceReadArgs),
    AbsorbanceReaderCloseRead(AbsorbanceCloseReadArgs),
    AbsorbanceReaderCloseInitialize(AbsorbanceCloseInitializeArgs),

    PickUpTip(PickUpTipArgs),
    Aspirate(LiquidHandlingArgs),
    Dispense(LiquidHandlingArgs),
    MoveToAddressableAreaForDropTip(DropTipAreaArgs),
    DropTipInPlace(PipetteArgs),
    DropTip(DropTipArgs),
    ReplaceTip(ReplaceTipArgs),
    Transfer(TransferArgs),
    Mix(MixArgs),

    MoveLabware(MoveLabwareArgs),

    Delay(DelayArgs),
    Pause(PauseArgs),
}

impl StepArgs {
    /// The `commandCreatorFnName` this step is tagged with.
    #[must_use]
    pub const fn creator_name(&self) -> &'static str {
        match self {
            Self::SetTemperature(_) => "setTemperature",
            Self::WaitForTemperature(_) => "waitForTemperature",
            Self::DeactivateTemperature(_) => "deactivateTemperature",
            Self::EngageMagnet(_) => "engageMagnet",
            Self::DisengageMagnet(_) => "disengageMagnet",
            Self::HeaterShakerSetShakeSpeed(_) => "heaterShakerSetShakeSpeed",
            Self::HeaterShakerStopShake(_) => "heaterShakerStopShake",
            Self::HeaterShakerOpenLatch(_) => "heaterShakerOpenLatch",
            Self::HeaterShakerCloseLatch(_) => "heaterShakerCloseLatch",
            Self::HeaterShakerStep(_) => "heaterShakerStep",
            Self::ThermocyclerSetBlockTemperature(_) => "thermocyclerSetBlockTemperature",
            Self::ThermocyclerSetLidTemperature(_) => "thermocyclerSetLidTemperature",
            Self::ThermocyclerWaitForBlockTemperature(_) => "thermocyclerWaitForBlockTemperature",
            Self::ThermocyclerWaitForLidTemperature(_) => "thermocyclerWaitForLidTemperature",
            Self::ThermocyclerDeactivateBlock(_) => "thermocyclerDeactivateBlock",
            Self::ThermocyclerDeactivateLid(_) => "thermocyclerDeactivateLid",
            Self::ThermocyclerOpenLid(_) => "thermocyclerOpenLid",
            Self::ThermocyclerCloseLid(_) => "thermocyclerCloseLid",
            Self::ThermocyclerRunProfile(_) => "thermocyclerRunProfile",
            Self::ThermocyclerStateStep(_) => "thermocyclerStateStep",
            Self::ThermocyclerProfileStep(_) => "thermocyclerProfileStep",
            Self::AbsorbanceReaderOpenLid(_) => "absorbanceReaderOpenLid",
            Self::AbsorbanceReaderCloseLid(_) => "absorbanceReaderCloseLid",
            Self::AbsorbanceReaderInitialize(_) => "absorbanceReaderInitialize",
            Self::AbsorbanceReaderRead(_) => "absorbanceReaderRead",
            Self::AbsorbanceReaderCloseRead(_) => "absorbanceReaderCloseRead",
            Self::AbsorbanceReaderCloseInitialize(_) => "absorbanceReaderCloseInitialize",
            Self::PickUpTip(_) => "pickUpTip",
            Self::Aspirate(_) => "aspirate",
            Self::Dispense(_) => "dispense",
            Self::MoveToAddressableAreaForDropTip(_) => "moveToAddressableAreaForDropTip",
            Self::DropTipInPlace(_) => "dropTipInPlace",
            Self::DropTip(_) => "dropTip",
            Self::ReplaceTip(_) => "replaceTip",
            Self::Transfer(_) => "transfer",
            Self::Mix(_) => "mix",
            Self::MoveLabware(_) => "moveLabware",
            Self::Delay(_) => "delay",
            Self::Pause(_) => "pause",
        }
    }

    /// Runs the step's creator against `robot_state`.
    pub fn create(&self, invariant: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
        let (i, s) = (invariant, robot_state);
        match self {
            Self::SetTemperature(a) => set_temperature(a, i, s),
            Self::WaitForTemperature(a) => wait_for_temperature(a, i, s),
            Self::DeactivateTemperature(a) => deactivate_temperature(a, i, s),
            Self::EngageMagnet(a) => engage_magnet(a, i, s),
            Self::DisengageMagnet(a) => disengage_magnet(a, i, s),
            Self::HeaterShakerSetShakeSpeed(a) => heater_shaker_set_shake_speed(a, i, s),
            Self::HeaterShakerStopShake(a) => heater_shaker_stop_shake(a, i, s),
            Self::HeaterShakerOpenLatch(a) => heater_shaker_open_latch(a, i, s),
            Self::HeaterShakerCloseLatch(a) => heater_shaker_close_latch(a, i, s),
            Self::HeaterShakerStep(a) => heater_shaker_step(a, i, s),
            Self::ThermocyclerSetBlockTemperature(a) => thermocycler_set_block_temperature(a, i, s),
            Self::ThermocyclerSetLidTemperature(a) => thermocycler_set_lid_temperature(a, i, s),
            Self::ThermocyclerWaitForBlockTemperature(a) => {
                thermocycler_wait_for_block_temperature(a, i, s)
            }
            Self::ThermocyclerWaitForLidTemperature(a) => thermocycler_wait_for_lid_temperature(a, i, s),
            Self::ThermocyclerDeactivateBlock(a) => thermocycler_deactivate_block(a, i, s),
            Self::ThermocyclerDeactivateLid(a) => thermocycler_deactivate_lid(a, i, s),
            Self::ThermocyclerOpenLid(a) => thermocycler_open_lid(a, i, s),
            Self::ThermocyclerCloseLid(a) => thermocycler_close_lid(a, i, s),
            Self::ThermocyclerRunProfile(a) => thermocycler_run_profile(a, i, s),
            Self::ThermocyclerStateStep(a) => thermocycler_state_step(a, i, s),
            Self::ThermocyclerProfileStep(a) => thermocycler_profile_step(a, i, s),
            Self::AbsorbanceReaderOpenLid(a) => absorbance_reader_open_lid(a, i, s),
            Self::AbsorbanceReaderCloseLid(a) => absorbance_reader_close_lid(a, i, s),
            Self::AbsorbanceReaderInitialize(a) => absorbance_reader_initialize(a, i, s),
            Self::AbsorbanceReaderRead(a) => absorbance_reader_read(a, i, s),
            Self::AbsorbanceReaderCloseRead(a) => absorbance_reader_close_read(a, i, s),
            Self::AbsorbanceReaderCloseInitialize(a) => absorbance_reader_close_initialize(a, i, s),
            Self::PickUpTip(a) => pick_up_tip(a, i, s),
            Self::Aspirate(a) => aspirate(a, i, s),
            Self::Dispense(a) => dispense(a, i, s),
            Self::MoveToAddressableAreaForDropTip(a) => move_to_addressable_area_for_drop_tip(a, i, s),
            Self::DropTipInPlace(a) => drop_tip_in_place(a, i, s),
            Self::DropTip(a) => drop_tip(a, i, s),
            Self::ReplaceTip(a) => replace_tip(a, i, s),
            Self::Transfer(a) => transfer(a, i, s),
            Self::Mix(a) => mix(a, i, s),
            Self::MoveLabware(a) => move_labware(a, i, s),
            Self::Delay(a) => delay(a, i, s),
            Self::Pause(a) => pause(a, i, s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matches_creator_name() {
        let steps = vec![
            StepArgs::Delay(DelayArgs {
                seconds: 1.0,
                message: None,
            }),
            StepArgs::AbsorbanceReaderCloseRead(AbsorbanceCloseReadArgs {
                module_id: "reader".into(),
                file_name: None,
            }),
            StepArgs::ThermocyclerWaitForBlockTemperature(ModuleOnlyArgs {
                module_id: "tc".into(),
            }),
        ];
        for step in steps {
            let json = serde_json::to_value(&step).unwrap();
            assert_eq!(json["commandCreatorFnName"], step.creator_name());
            let back: StepArgs = serde_json::from_value(json).unwrap();
            assert_eq!(back, step);
        }
    }

    #[test]
    fn unknown_creator_is_rejected() {
        let result = serde_json::from_str::<StepArgs>(r#"{"commandCreatorFnName": "teleport"}"#);
        assert!(result.is_err());
    }
}
