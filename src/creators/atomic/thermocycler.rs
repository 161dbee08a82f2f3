//! Thermocycler creators.

use serde::{Deserialize, Serialize};

use super::resolve_module_of_kind;
use super::temperature::{ModuleOnlyArgs, ModuleTemperatureArgs};
use crate::command::{BlockTemperatureParams, Command, ModuleParams, ProfileStep, RunProfileParams, TemperatureParams};
use crate::creators::{CommandCreatorResult, CommandsAndWarnings};
use crate::entity::{ModuleId, ModuleType};
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::RobotState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemperatureArgs {
    pub module_id: ModuleId,
    pub celsius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_max_volume_ul: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_time_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProfileArgs {
    pub module_id: ModuleId,
    pub profile: Vec<ProfileStep>,
    pub block_max_volume_ul: f64,
}

fn module_params(module_id: &ModuleId) -> ModuleParams {
    ModuleParams {
        module_id: module_id.clone(),
    }
}

/// Resolves the thermocycler and builds its command and Python call.
fn simple(
    module_id: &ModuleId,
    invariant: &InvariantContext,
    command: fn(ModuleParams) -> Command,
    method: &str,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, module_id, ModuleType::Thermocycler)?;
    Ok(CommandsAndWarnings::single(
        command(module_params(module_id)),
        python::call(&module.python_name, method, &[]),
    ))
}

/// Resolves the thermocycler for a wait; waits have no Python call of their
/// own, the preceding set call already blocks.
fn wait(
    module_id: &ModuleId,
    invariant: &InvariantContext,
    command: fn(ModuleParams) -> Command,
    what: &str,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, module_id, ModuleType::Thermocycler)?;
    Ok(CommandsAndWarnings::single(
        command(module_params(module_id)),
        format!("# {}: wait for {what} temperature", module.python_name),
    ))
}

pub fn thermocycler_set_block_temperature(
    args: &BlockTemperatureArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::Thermocycler)?;
    let mut python_args = vec![python::format_number(args.celsius)];
    if let Some(hold) = args.hold_time_seconds {
        python_args.push(python::kwarg("hold_time_seconds", python::format_number(hold)));
    }
    if let Some(volume) = args.block_max_volume_ul {
        python_args.push(python::kwarg("block_max_volume", python::format_number(volume)));
    }
    Ok(CommandsAndWarnings::single(
        Command::ThermocyclerSetTargetBlockTemperature(BlockTemperatureParams {
            module_id: args.module_id.clone(),
            celsius: args.celsius,
            block_max_volume_ul: args.block_max_volume_ul,
            hold_time_seconds: args.hold_time_seconds,
        }),
        python::call(&module.python_name, "set_block_temperature", &python_args),
    ))
}

pub fn thermocycler_set_lid_temperature(
    args: &ModuleTemperatureArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::Thermocycler)?;
    Ok(CommandsAndWarnings::single(
        Command::ThermocyclerSetTargetLidTemperature(TemperatureParams {
            module_id: args.module_id.clone(),
            celsius: args.celsius,
        }),
        python::call(
            &module.python_name,
            "set_lid_temperature",
            &[python::format_number(args.celsius)],
        ),
    ))
}

pub fn thermocycler_wait_for_block_temperature(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    wait(&args.module_id, invariant, Command::ThermocyclerWaitForBlockTemperature, "block")
}

pub fn thermocycler_wait_for_lid_temperature(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    wait(&args.module_id, invariant, Command::ThermocyclerWaitForLidTemperature, "lid")
}

pub fn thermocycler_deactivate_block(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    simple(&args.module_id, invariant, Command::ThermocyclerDeactivateBlock, "deactivate_block")
}

pub fn thermocycler_deactivate_lid(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    simple(&args.module_id, invariant, Command::ThermocyclerDeactivateLid, "deactivate_lid")
}

pub fn thermocycler_open_lid(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    simple(&args.module_id, invariant, Command::ThermocyclerOpenLid, "open_lid")
}

pub fn thermocycler_close_lid(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    simple(&args.module_id, invariant, Command::ThermocyclerCloseLid, "close_lid")
}

/// Runs a profile once. Each stage renders as a Python dict.
pub fn thermocycler_run_profile(
    args: &RunProfileArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::Thermocycler)?;
    let steps: Vec<String> = args
        .profile
        .iter()
        .map(|step| {
            format!(
                "{{\"temperature\": {}, \"hold_time_seconds\": {}}}",
                python::format_number(step.celsius),
                python::format_number(step.hold_seconds)
            )
        })
        .collect();
    Ok(CommandsAndWarnings::single(
        Command::ThermocyclerRunProfile(RunProfileParams {
            module_id: args.module_id.clone(),
            profile: args.profile.clone(),
            block_max_volume_ul: args.block_max_volume_ul,
        }),
        python::call(
            &module.python_name,
            "execute_profile",
            &[
                python::kwarg("steps", format!("[{}]", steps.join(", "))),
                python::kwarg("repetitions", "1"),
                python::kwarg("block_max_volume", python::format_number(args.block_max_volume_ul)),
            ],
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn tc() -> ModuleId {
        ModuleId::new(fixtures::THERMOCYCLER)
    }

    #[test]
    fn block_temperature_optional_kwargs() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let bare = thermocycler_set_block_temperature(
            &BlockTemperatureArgs {
                module_id: tc(),
                celsius: 95.0,
                block_max_volume_ul: None,
                hold_time_seconds: None,
            },
            &ctx,
            &state,
        )
        .unwrap();
        assert_eq!(bare.python.as_deref(), Some("thermocycler_1.set_block_temperature(95)"));
        let json = serde_json::to_value(&bare.commands[0]).unwrap();
        assert!(json["params"].get("blockMaxVolumeUl").is_none());

        let full = thermocycler_set_block_temperature(
            &BlockTemperatureArgs {
                module_id: tc(),
                celsius: 4.0,
                block_max_volume_ul: Some(50.0),
                hold_time_seconds: Some(30.0),
            },
            &ctx,
            &state,
        )
        .unwrap();
        assert_eq!(
            full.python.as_deref(),
            Some("thermocycler_1.set_block_temperature(4, hold_time_seconds=30, block_max_volume=50)")
        );
    }

    #[test]
    fn waits_render_as_comments() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out =
            thermocycler_wait_for_lid_temperature(&ModuleOnlyArgs { module_id: tc() }, &ctx, &state)
                .unwrap();
        assert_eq!(out.commands[0].command_type(), "thermocycler/waitForLidTemperature");
        assert!(out.python.unwrap().starts_with('#'));
    }

    #[test]
    fn profile_lists_stages() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out = thermocycler_run_profile(
            &RunProfileArgs {
                module_id: tc(),
                profile: vec![
                    ProfileStep {
                        celsius: 95.0,
                        hold_seconds: 30.0,
                    },
                    ProfileStep {
                        celsius: 60.0,
                        hold_seconds: 45.0,
                    },
                ],
                block_max_volume_ul: 25.0,
            },
            &ctx,
            &state,
        )
        .unwrap();
        assert_eq!(
            out.python.as_deref(),
            Some(
                "thermocycler_1.execute_profile(steps=[{\"temperature\": 95, \"hold_time_seconds\": 30}, \
                 {\"temperature\": 60, \"hold_time_seconds\": 45}], repetitions=1, block_max_volume=25)"
            )
        );
    }

    #[test]
    fn lid_on_other_module_is_missing() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        assert!(thermocycler_open_lid(
            &ModuleOnlyArgs {
                module_id: ModuleId::new(fixtures::ABSORBANCE_READER)
            },
            &ctx,
            &state
        )
        .is_err());
    }
}
