//! State updaters: how each command changes the simulated robot.
//!
//! [`next_robot_state_and_warnings`] is a pure transform. The previous
//! snapshot is never touched; the new one shares every slice the command does
//! not write.

mod labware;
mod modules;
mod pipetting;

use crate::command::Command;
use crate::entity::ModuleType;
use crate::invariant::InvariantContext;
use crate::state::{RobotState, RobotStateAndWarnings};

/// Applies one command to `prev` and returns the resulting state together with
/// any warnings the transition raised.
#[must_use]
pub fn next_robot_state_and_warnings(
    command: &Command,
    invariant: &InvariantContext,
    prev: &RobotState,
) -> RobotStateAndWarnings {
    let mut state = prev.clone();
    let mut warnings = Vec::new();

    match command {
        Command::TemperatureModuleSetTargetTemperature(p) => {
            modules::set_temperature(&mut state, p, ModuleType::TemperatureModule);
        }
        Command::TemperatureModuleWaitForTemperature(p) => {
            modules::await_temperature(&mut state, &p.module_id, ModuleType::TemperatureModule);
        }
        Command::TemperatureModuleDeactivate(p) => {
            modules::deactivate_temperature(&mut state, &p.module_id, ModuleType::TemperatureModule);
        }

        Command::HeaterShakerSetTargetTemperature(p) => {
            modules::set_temperature(&mut state, p, ModuleType::HeaterShaker);
        }
        Command::HeaterShakerWaitForTemperature(p) => {
            modules::await_temperature(&mut state, &p.module_id, ModuleType::HeaterShaker);
        }
        Command::HeaterShakerDeactivateHeater(p) => {
            modules::deactivate_temperature(&mut state, &p.module_id, ModuleType::HeaterShaker);
        }
        Command::HeaterShakerSetAndWaitForShakeSpeed(p) => {
            modules::set_shake_speed(&mut state, &p.module_id, Some(p.rpm));
        }
        Command::HeaterShakerDeactivateShaker(p) => {
            modules::set_shake_speed(&mut state, &p.module_id, None);
        }
        Command::HeaterShakerOpenLabwareLatch(p) => modules::set_latch(&mut state, &p.module_id, true),
        Command::HeaterShakerCloseLabwareLatch(p) => {
            modules::set_latch(&mut state, &p.module_id, false);
        }

        Command::MagneticModuleEngage(p) => modules::set_magnet(&mut state, &p.module_id, true),
        Command::MagneticModuleDisengage(p) => modules::set_magnet(&mut state, &p.module_id, false),

        Command::ThermocyclerSetTargetBlockTemperature(p) => {
            modules::set_block_temperature(&mut state, p);
        }
        Command::ThermocyclerSetTargetLidTemperature(p) => {
            modules::set_lid_target(&mut state, &p.module_id, Some(p.celsius));
        }
        Command::ThermocyclerDeactivateBlock(p) => {
            modules::set_block_target(&mut state, &p.module_id, None);
        }
        Command::ThermocyclerDeactivateLid(p) => {
            modules::set_lid_target(&mut state, &p.module_id, None);
        }
        Command::ThermocyclerOpenLid(p) => {
            modules::set_thermocycler_lid(&mut state, &p.module_id, true);
        }
        Command::ThermocyclerCloseLid(p) => {
            modules::set_thermocycler_lid(&mut state, &p.module_id, false);
        }
        Command::ThermocyclerWaitForBlockTemperature(_)
        | Command::ThermocyclerWaitForLidTemperature(_)
        | Command::ThermocyclerRunProfile(_) => {}

        Command::AbsorbanceReaderOpenLid(p) => modules::set_reader_lid(&mut state, &p.module_id, true),
        Command::AbsorbanceReaderCloseLid(p) => {
            modules::set_reader_lid(&mut state, &p.module_id, false);
        }
        Command::AbsorbanceReaderInitialize(p) => modules::initialize_reader(&mut state, p),
        Command::AbsorbanceReaderRead(_) => {}

        Command::PickUpTip(p) => pipetting::pick_up_tip(&mut state, p, invariant),
        Command::Aspirate(p) => pipetting::aspirate(&mut state, p, invariant, &mut warnings),
        Command::Dispense(p) => pipetting::dispense(&mut state, p, invariant),
        Command::DropTipInPlace(p) => pipetting::drop_tip(&mut state, &p.pipette_id),
        Command::MoveToAddressableAreaForDropTip(_) => {}

        Command::MoveLabware(p) => labware::move_labware(&mut state, p),

        Command::WaitForDuration(_) | Command::WaitForResume(_) => {}
    }

    RobotStateAndWarnings {
        robot_state: state,
        warnings,
    }
}
