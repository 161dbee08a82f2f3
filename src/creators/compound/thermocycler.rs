//! Thermocycler state and profile steps.
//!
//! Both steps describe where the thermocycler should end up; the emitted
//! commands are the difference between that and the live state.

use serde::{Deserialize, Serialize};

use crate::command::ProfileStep;
use crate::creators::atomic::{
    resolve_module_of_kind, thermocycler_close_lid, thermocycler_deactivate_block,
    thermocycler_deactivate_lid, thermocycler_open_lid, thermocycler_run_profile,
    thermocycler_set_block_temperature, thermocycler_set_lid_temperature,
    thermocycler_wait_for_block_temperature, thermocycler_wait_for_lid_temperature,
    BlockTemperatureArgs, ModuleOnlyArgs, ModuleTemperatureArgs, RunProfileArgs,
};
use crate::creators::{
    curry, reduce_command_creators, CommandCreatorResult, CurriedCommandCreator,
};
use crate::entity::{ModuleId, ModuleType};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::state::{ModuleState, RobotState};

/// Requested thermocycler state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerStateArgs {
    pub module_id: ModuleId,
    #[serde(default)]
    pub block_target_temp: Option<f64>,
    #[serde(default)]
    pub lid_target_temp: Option<f64>,
    pub lid_open: bool,
}

/// State the thermocycler is left in after a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerEndState {
    #[serde(default)]
    pub block_target_temp: Option<f64>,
    #[serde(default)]
    pub lid_target_temp: Option<f64>,
    pub lid_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerProfileArgs {
    pub module_id: ModuleId,
    pub profile: Vec<ProfileStep>,
    pub block_max_volume_ul: f64,
    /// Lid temperature held while the profile runs.
    pub profile_target_lid_temp: f64,
    pub end_state: ThermocyclerEndState,
}

struct LiveThermocycler {
    block_target_temp: Option<f64>,
    lid_target_temp: Option<f64>,
    lid_open: Option<bool>,
}

fn live_thermocycler(
    invariant: &InvariantContext,
    robot_state: &RobotState,
    module_id: &ModuleId,
) -> Result<LiveThermocycler, CommandError> {
    resolve_module_of_kind(invariant, module_id, ModuleType::Thermocycler)?;
    match robot_state.module_state(module_id) {
        Some(ModuleState::Thermocycler {
            block_target_temp,
            lid_target_temp,
            lid_open,
        }) => Ok(LiveThermocycler {
            block_target_temp: *block_target_temp,
            lid_target_temp: *lid_target_temp,
            lid_open: *lid_open,
        }),
        _ => Err(CommandError::missing_module(module_id)),
    }
}

fn only(module_id: &ModuleId) -> ModuleOnlyArgs {
    ModuleOnlyArgs {
        module_id: module_id.clone(),
    }
}

/// Brings the thermocycler to the requested state, emitting only what changes:
/// the lid position first, then the block, then the lid heater.
pub fn thermocycler_state_step(
    args: &ThermocyclerStateArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let live = live_thermocycler(invariant, robot_state, &args.module_id)?;
    let id = &args.module_id;
    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();

    if live.lid_open != Some(args.lid_open) {
        if args.lid_open {
            creators.push(curry(thermocycler_open_lid, only(id)));
        } else {
            creators.push(curry(thermocycler_close_lid, only(id)));
        }
    }

    if args.block_target_temp != live.block_target_temp {
        match args.block_target_temp {
            Some(celsius) => {
                creators.push(curry(
                    thermocycler_set_block_temperature,
                    BlockTemperatureArgs {
                        module_id: id.clone(),
                        celsius,
                        block_max_volume_ul: None,
                        hold_time_seconds: None,
                    },
                ));
                creators.push(curry(thermocycler_wait_for_block_temperature, only(id)));
            }
            None => creators.push(curry(thermocycler_deactivate_block, only(id))),
        }
    }

    if args.lid_target_temp != live.lid_target_temp {
        match args.lid_target_temp {
            Some(celsius) => {
                creators.push(curry(
                    thermocycler_set_lid_temperature,
                    ModuleTemperatureArgs {
                        module_id: id.clone(),
                        celsius,
                    },
                ));
                creators.push(curry(thermocycler_wait_for_lid_temperature, only(id)));
            }
            None => creators.push(curry(thermocycler_deactivate_lid, only(id))),
        }
    }

    reduce_command_creators(creators, invariant, robot_state)
}

/// Closes the lid, heats it, runs the profile and then settles into the end
/// state.
pub fn thermocycler_profile_step(
    args: &ThermocyclerProfileArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let live = live_thermocycler(invariant, robot_state, &args.module_id)?;
    let id = &args.module_id;
    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();

    if live.lid_open != Some(false) {
        creators.push(curry(thermocycler_close_lid, only(id)));
    }
    creators.push(curry(
        thermocycler_set_lid_temperature,
        ModuleTemperatureArgs {
            module_id: id.clone(),
            celsius: args.profile_target_lid_temp,
        },
    ));
    creators.push(curry(thermocycler_wait_for_lid_temperature, only(id)));
    creators.push(curry(
        thermocycler_run_profile,
        RunProfileArgs {
            module_id: id.clone(),
            profile: args.profile.clone(),
            block_max_volume_ul: args.block_max_volume_ul,
        },
    ));
    creators.push(curry(
        thermocycler_state_step,
        ThermocyclerStateArgs {
            module_id: id.clone(),
            block_target_temp: args.end_state.block_target_temp,
            lid_target_temp: args.end_state.lid_target_temp,
            lid_open: args.end_state.lid_open,
        },
    ));

    reduce_command_creators(creators, invariant, robot_state)
}
