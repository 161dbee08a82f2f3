//! Temperature control shared by temperature modules and heater-shakers.
//!
//! Both kinds expose the same logical operations (set a target, wait for it,
//! turn the heater off) through different commands and Python methods. The
//! differences live in one [`TemperatureApi`] table per kind.

use serde::{Deserialize, Serialize};

use crate::command::{Command, HeaterShakerWaitParams, ModuleParams, TemperatureParams};
use crate::creators::{resolve_module, CommandCreatorResult, CommandsAndWarnings};
use crate::entity::{ModuleId, ModuleType};
use crate::error::{CommandError, CommandWarning};
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::{RobotState, TemperatureStatus};

/// Commands and Python methods for one temperature-capable module kind.
#[derive(Debug)]
pub struct TemperatureApi {
    /// Builds the set-target command.
    pub set_target: fn(&ModuleId, f64) -> Command,
    /// Python method setting the target.
    pub set_method: &'static str,
    /// Builds the wait command.
    pub wait: fn(&ModuleId, f64) -> Command,
    /// Python method waiting for the target.
    pub wait_method: &'static str,
    /// Whether the Python wait call takes the temperature as an argument.
    pub wait_takes_celsius: bool,
    /// Builds the deactivate command.
    pub deactivate: fn(&ModuleId) -> Command,
    /// Python method turning the heater off.
    pub deactivate_method: &'static str,
}

fn temperature_module_set(module_id: &ModuleId, celsius: f64) -> Command {
    Command::TemperatureModuleSetTargetTemperature(TemperatureParams {
        module_id: module_id.clone(),
        celsius,
    })
}

fn temperature_module_wait(module_id: &ModuleId, celsius: f64) -> Command {
    Command::TemperatureModuleWaitForTemperature(TemperatureParams {
        module_id: module_id.clone(),
        celsius,
    })
}

fn temperature_module_deactivate(module_id: &ModuleId) -> Command {
    Command::TemperatureModuleDeactivate(ModuleParams {
        module_id: module_id.clone(),
    })
}

fn heater_shaker_set(module_id: &ModuleId, celsius: f64) -> Command {
    Command::HeaterShakerSetTargetTemperature(TemperatureParams {
        module_id: module_id.clone(),
        celsius,
    })
}

fn heater_shaker_wait(module_id: &ModuleId, celsius: f64) -> Command {
    Command::HeaterShakerWaitForTemperature(HeaterShakerWaitParams {
        module_id: module_id.clone(),
        celsius: Some(celsius),
    })
}

fn heater_shaker_deactivate(module_id: &ModuleId) -> Command {
    Command::HeaterShakerDeactivateHeater(ModuleParams {
        module_id: module_id.clone(),
    })
}

static TEMPERATURE_MODULE_API: TemperatureApi = TemperatureApi {
    set_target: temperature_module_set,
    set_method: "start_set_temperature",
    wait: temperature_module_wait,
    wait_method: "await_temperature",
    wait_takes_celsius: true,
    deactivate: temperature_module_deactivate,
    deactivate_method: "deactivate",
};

static HEATER_SHAKER_API: TemperatureApi = TemperatureApi {
    set_target: heater_shaker_set,
    set_method: "set_target_temperature",
    wait: heater_shaker_wait,
    wait_method: "wait_for_temperature",
    wait_takes_celsius: false,
    deactivate: heater_shaker_deactivate,
    deactivate_method: "deactivate_heater",
};

/// The temperature table for `module_type`, if that kind controls temperature
/// through the shared state machine.
#[must_use]
pub fn temperature_api(module_type: ModuleType) -> Option<&'static TemperatureApi> {
    match module_type {
        ModuleType::TemperatureModule => Some(&TEMPERATURE_MODULE_API),
        ModuleType::HeaterShaker => Some(&HEATER_SHAKER_API),
        ModuleType::Thermocycler
        | ModuleType::MagneticModule
        | ModuleType::MagneticBlock
        | ModuleType::AbsorbanceReader => None,
    }
}

/// Arguments shared by set and wait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTemperatureArgs {
    pub module_id: ModuleId,
    pub celsius: f64,
}

/// Arguments addressing a module only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOnlyArgs {
    pub module_id: ModuleId,
}

fn resolve_api<'a>(
    invariant: &'a InvariantContext,
    module_id: &ModuleId,
) -> Result<(&'a str, &'static TemperatureApi), CommandError> {
    let module = resolve_module(invariant, module_id)?;
    let api =
        temperature_api(module.module_type).ok_or_else(|| CommandError::missing_module(module_id))?;
    Ok((module.python_name.as_str(), api))
}

/// Sets a module's target temperature without waiting for it.
pub fn set_temperature(
    args: &ModuleTemperatureArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let (python_name, api) = resolve_api(invariant, &args.module_id)?;
    Ok(CommandsAndWarnings::single(
        (api.set_target)(&args.module_id, args.celsius),
        python::call(python_name, api.set_method, &[python::format_number(args.celsius)]),
    ))
}

/// Checks a wait for `celsius` against the module's temperature state.
///
/// A module with no target, or a target other than `celsius`, has no step
/// that could make the wait finish. A module still approaching the target may
/// never confirm it, which is reported as a warning.
pub fn check_temperature_wait(
    module_id: &ModuleId,
    celsius: f64,
    status: TemperatureStatus,
    target: Option<f64>,
) -> Result<Vec<CommandWarning>, CommandError> {
    let missing_step = || CommandError::MissingTemperatureStep {
        module_id: module_id.clone(),
        celsius,
    };
    match (status, target) {
        (TemperatureStatus::Deactivated, _) | (_, None) => Err(missing_step()),
        (_, Some(target)) if target != celsius => Err(missing_step()),
        (TemperatureStatus::ApproachingTarget, Some(_)) => {
            Ok(vec![CommandWarning::TemperatureIsPotentiallyUnreachable {
                module_id: module_id.clone(),
                celsius,
            }])
        }
        (TemperatureStatus::AtTarget, Some(_)) => Ok(Vec::new()),
    }
}

/// Waits until a module reaches `celsius`.
pub fn wait_for_temperature(
    args: &ModuleTemperatureArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (python_name, api) = resolve_api(invariant, &args.module_id)?;
    let (status, target) = robot_state
        .module_state(&args.module_id)
        .and_then(|state| state.temperature())
        .ok_or_else(|| CommandError::missing_module(&args.module_id))?;
    let warnings = check_temperature_wait(&args.module_id, args.celsius, status, target)?;

    let python_args = if api.wait_takes_celsius {
        vec![python::format_number(args.celsius)]
    } else {
        Vec::new()
    };
    Ok(CommandsAndWarnings::single(
        (api.wait)(&args.module_id, args.celsius),
        python::call(python_name, api.wait_method, &python_args),
    )
    .with_warnings(warnings))
}

/// Turns a module's heater off.
pub fn deactivate_temperature(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let (python_name, api) = resolve_api(invariant, &args.module_id)?;
    Ok(CommandsAndWarnings::single(
        (api.deactivate)(&args.module_id),
        python::call(python_name, api.deactivate_method, &[]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::fixtures;

    fn args(module_id: &str, celsius: f64) -> ModuleTemperatureArgs {
        ModuleTemperatureArgs {
            module_id: ModuleId::new(module_id),
            celsius,
        }
    }

    #[test]
    fn set_temperature_on_temperature_module() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out = set_temperature(&args(fixtures::TEMPERATURE_MODULE, 42.0), &ctx, &state).unwrap();
        assert_eq!(out.commands.len(), 1);
        assert_eq!(out.commands[0].command_type(), "temperatureModule/setTargetTemperature");
        let json = serde_json::to_value(&out.commands[0]).unwrap();
        assert_eq!(json["params"]["celsius"], 42.0);
        assert_eq!(
            out.python.as_deref(),
            Some("temperature_module_1.start_set_temperature(42)")
        );
    }

    #[test]
    fn set_temperature_on_heater_shaker() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out = set_temperature(&args(fixtures::HEATER_SHAKER, 42.0), &ctx, &state).unwrap();
        assert_eq!(out.commands[0].command_type(), "heaterShaker/setTargetTemperature");
        assert_eq!(
            out.python.as_deref(),
            Some("heater_shaker_1.set_target_temperature(42)")
        );
    }

    #[test]
    fn set_temperature_on_missing_module() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let err = set_temperature(&args("nope", 42.0), &ctx, &state).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].error_type(), ErrorType::MissingModule);
    }

    #[test]
    fn set_temperature_on_non_heating_module() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let err = set_temperature(&args(fixtures::MAGNETIC_MODULE, 42.0), &ctx, &state).unwrap_err();
        assert_eq!(err.errors[0].error_type(), ErrorType::MissingModule);
    }

    #[test]
    fn wait_state_machine() {
        let id = ModuleId::new("m");
        assert!(check_temperature_wait(&id, 40.0, TemperatureStatus::Deactivated, None).is_err());
        assert!(check_temperature_wait(&id, 40.0, TemperatureStatus::AtTarget, Some(50.0)).is_err());
        assert!(
            check_temperature_wait(&id, 40.0, TemperatureStatus::ApproachingTarget, Some(50.0))
                .is_err()
        );
        assert_eq!(
            check_temperature_wait(&id, 40.0, TemperatureStatus::AtTarget, Some(40.0)).unwrap(),
            Vec::new()
        );
        let warnings =
            check_temperature_wait(&id, 40.0, TemperatureStatus::ApproachingTarget, Some(40.0))
                .unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn wait_without_set_is_missing_temperature_step() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let err = wait_for_temperature(&args(fixtures::TEMPERATURE_MODULE, 42.0), &ctx, &state)
            .unwrap_err();
        assert_eq!(err.errors[0].error_type(), ErrorType::MissingTemperatureStep);
    }

    #[test]
    fn heater_shaker_wait_has_no_python_argument() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::with_temperature(
            &ctx,
            fixtures::HEATER_SHAKER,
            TemperatureStatus::AtTarget,
            80.0,
        );
        let out = wait_for_temperature(&args(fixtures::HEATER_SHAKER, 80.0), &ctx, &state).unwrap();
        assert_eq!(out.commands[0].command_type(), "heaterShaker/waitForTemperature");
        assert_eq!(out.python.as_deref(), Some("heater_shaker_1.wait_for_temperature()"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn deactivate_dispatches_on_kind() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let temp = deactivate_temperature(
            &ModuleOnlyArgs {
                module_id: ModuleId::new(fixtures::TEMPERATURE_MODULE),
            },
            &ctx,
            &state,
        )
        .unwrap();
        assert_eq!(temp.python.as_deref(), Some("temperature_module_1.deactivate()"));
        let hs = deactivate_temperature(
            &ModuleOnlyArgs {
                module_id: ModuleId::new(fixtures::HEATER_SHAKER),
            },
            &ctx,
            &state,
        )
        .unwrap();
        assert_eq!(hs.commands[0].command_type(), "heaterShaker/deactivateHeater");
    }
}
