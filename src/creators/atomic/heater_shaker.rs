//! Heater-shaker shaking and latch creators.
//!
//! Heating goes through the shared temperature creators.

use serde::{Deserialize, Serialize};

use super::resolve_module_of_kind;
use super::temperature::ModuleOnlyArgs;
use crate::command::{Command, ModuleParams, ShakeSpeedParams};
use crate::creators::{CommandCreatorResult, CommandsAndWarnings};
use crate::entity::{ModuleId, ModuleType};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::{ModuleState, RobotState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShakeSpeedArgs {
    pub module_id: ModuleId,
    pub rpm: f64,
}

fn latch_is_open(robot_state: &RobotState, module_id: &ModuleId) -> bool {
    matches!(
        robot_state.module_state(module_id),
        Some(ModuleState::HeaterShaker {
            latch_open: Some(true),
            ..
        })
    )
}

fn is_shaking(robot_state: &RobotState, module_id: &ModuleId) -> bool {
    robot_state
        .module_state(module_id)
        .is_some_and(ModuleState::is_shaking)
}

/// Starts shaking and waits for the speed. The labware latch must be closed.
pub fn heater_shaker_set_shake_speed(
    args: &ShakeSpeedArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::HeaterShaker)?;
    if latch_is_open(robot_state, &args.module_id) {
        return Err(CommandError::HeaterShakerLatchOpen {
            module_id: args.module_id.clone(),
        }
        .into());
    }
    Ok(CommandsAndWarnings::single(
        Command::HeaterShakerSetAndWaitForShakeSpeed(ShakeSpeedParams {
            module_id: args.module_id.clone(),
            rpm: args.rpm,
        }),
        python::call(
            &module.python_name,
            "set_and_wait_for_shake_speed",
            &[python::format_number(args.rpm)],
        ),
    ))
}

pub fn heater_shaker_stop_shake(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::HeaterShaker)?;
    Ok(CommandsAndWarnings::single(
        Command::HeaterShakerDeactivateShaker(ModuleParams {
            module_id: args.module_id.clone(),
        }),
        python::call(&module.python_name, "deactivate_shaker", &[]),
    ))
}

/// Opens the labware latch. Refused while the module shakes.
pub fn heater_shaker_open_latch(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::HeaterShaker)?;
    if is_shaking(robot_state, &args.module_id) {
        return Err(CommandError::HeaterShakerIsShaking {
            module_id: args.module_id.clone(),
        }
        .into());
    }
    Ok(CommandsAndWarnings::single(
        Command::HeaterShakerOpenLabwareLatch(ModuleParams {
            module_id: args.module_id.clone(),
        }),
        python::call(&module.python_name, "open_labware_latch", &[]),
    ))
}

pub fn heater_shaker_close_latch(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::HeaterShaker)?;
    Ok(CommandsAndWarnings::single(
        Command::HeaterShakerCloseLabwareLatch(ModuleParams {
            module_id: args.module_id.clone(),
        }),
        python::call(&module.python_name, "close_labware_latch", &[]),
    ))
}
