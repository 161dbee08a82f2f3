//! Atomic creators: one validated command and one Python line each.

pub mod absorbance_reader;
pub mod heater_shaker;
pub mod labware;
pub mod magnet;
pub mod pipetting;
pub mod temperature;
pub mod thermocycler;
pub mod utility;

pub use absorbance_reader::{
    absorbance_reader_close_lid, absorbance_reader_initialize, absorbance_reader_open_lid,
    absorbance_reader_read, AbsorbanceInitializeArgs, AbsorbanceReadArgs,
};
pub use heater_shaker::{
    heater_shaker_close_latch, heater_shaker_open_latch, heater_shaker_set_shake_speed,
    heater_shaker_stop_shake, ShakeSpeedArgs,
};
pub use labware::{move_labware, MoveLabwareArgs};
pub use magnet::{disengage_magnet, engage_magnet, EngageMagnetArgs};
pub use pipetting::{
    aspirate, dispense, drop_tip_in_place, move_to_addressable_area_for_drop_tip, pick_up_tip,
    DropTipAreaArgs, LiquidHandlingArgs, PickUpTipArgs, PipetteArgs,
};
pub use temperature::{
    deactivate_temperature, set_temperature, temperature_api, wait_for_temperature,
    ModuleOnlyArgs, ModuleTemperatureArgs, TemperatureApi,
};
pub use thermocycler::{
    thermocycler_close_lid, thermocycler_deactivate_block, thermocycler_deactivate_lid,
    thermocycler_open_lid, thermocycler_run_profile, thermocycler_set_block_temperature,
    thermocycler_set_lid_temperature, thermocycler_wait_for_block_temperature,
    thermocycler_wait_for_lid_temperature, BlockTemperatureArgs, RunProfileArgs,
};
pub use utility::{delay, pause, DelayArgs, PauseArgs};

use crate::entity::{LabwareId, ModuleEntity, ModuleId, ModuleType};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::state::{ModuleState, RobotState};

use super::resolve_module;

/// Resolves a module and checks it is of `kind`. Any mismatch is reported as
/// a missing module, since no module of that kind exists under the id.
pub(crate) fn resolve_module_of_kind<'a>(
    invariant: &'a InvariantContext,
    module_id: &ModuleId,
    kind: ModuleType,
) -> Result<&'a ModuleEntity, CommandError> {
    let module = resolve_module(invariant, module_id)?;
    if module.module_type == kind {
        Ok(module)
    } else {
        Err(CommandError::missing_module(module_id))
    }
}

/// Errors for reaching into labware whose module currently blocks access:
/// a thermocycler or reader with its lid shut, or a shaking heater-shaker.
pub(crate) fn module_access_errors(robot_state: &RobotState, labware_id: &LabwareId) -> Vec<CommandError> {
    let Some(module_id) = robot_state.module_under(labware_id) else {
        return Vec::new();
    };
    match robot_state.module_state(module_id) {
        Some(ModuleState::Thermocycler { lid_open, .. }) if *lid_open != Some(true) => {
            vec![CommandError::ThermocyclerLidClosed {
                module_id: module_id.clone(),
            }]
        }
        Some(state @ ModuleState::HeaterShaker { .. }) if state.is_shaking() => {
            vec![CommandError::HeaterShakerIsShaking {
                module_id: module_id.clone(),
            }]
        }
        Some(ModuleState::AbsorbanceReader { lid_open: false, .. }) => {
            vec![CommandError::AbsorbanceReaderLidClosed {
                module_id: module_id.clone(),
            }]
        }
        _ => Vec::new(),
    }
}
