//! Heater-shaker step: temperature, shaking, timer and latch in one go.

use serde::{Deserialize, Serialize};

use crate::creators::atomic::{
    deactivate_temperature, delay, heater_shaker_close_latch, heater_shaker_open_latch,
    heater_shaker_set_shake_speed, heater_shaker_stop_shake, resolve_module_of_kind,
    set_temperature, DelayArgs, ModuleOnlyArgs, ModuleTemperatureArgs, ShakeSpeedArgs,
};
use crate::creators::{
    curry, reduce_command_creators, CommandCreatorErrors, CommandCreatorResult,
    CurriedCommandCreator,
};
use crate::entity::{ModuleId, ModuleType};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::state::{ModuleState, RobotState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterShakerStepArgs {
    pub module_id: ModuleId,
    /// Heater target; `None` turns the heater off.
    #[serde(default)]
    pub target_temperature: Option<f64>,
    /// Shake speed; `None` stops shaking.
    #[serde(default)]
    pub rpm: Option<f64>,
    /// Latch position at the end of the step.
    pub latch_open: bool,
    /// When set, run for this long and then stop heating and shaking.
    #[serde(default)]
    pub timer_seconds: Option<f64>,
}

/// Runs a heater-shaker step.
///
/// The latch is closed before shaking starts. With a timer the module heats
/// and shakes for that long and is then turned off; the latch is opened last.
pub fn heater_shaker_step(
    args: &HeaterShakerStepArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let mut errors = Vec::new();
    if let Err(error) = resolve_module_of_kind(invariant, &args.module_id, ModuleType::HeaterShaker) {
        errors.push(error);
    }
    let shaking_at_end = args.rpm.is_some() && args.timer_seconds.is_none();
    if args.latch_open && shaking_at_end {
        errors.push(CommandError::HeaterShakerLatchOpen {
            module_id: args.module_id.clone(),
        });
    }
    if !errors.is_empty() {
        return Err(CommandCreatorErrors::from(errors));
    }

    let latch_closed = matches!(
        robot_state.module_state(&args.module_id),
        Some(ModuleState::HeaterShaker {
            latch_open: Some(false),
            ..
        })
    );
    let id = &args.module_id;
    let only = || ModuleOnlyArgs {
        module_id: id.clone(),
    };
    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();

    if args.rpm.is_some() && !latch_closed {
        creators.push(curry(heater_shaker_close_latch, only()));
    }
    match args.target_temperature {
        Some(celsius) => creators.push(curry(
            set_temperature,
            ModuleTemperatureArgs {
                module_id: id.clone(),
                celsius,
            },
        )),
        None => creators.push(curry(deactivate_temperature, only())),
    }
    match args.rpm {
        Some(rpm) => creators.push(curry(
            heater_shaker_set_shake_speed,
            ShakeSpeedArgs {
                module_id: id.clone(),
                rpm,
            },
        )),
        None => creators.push(curry(heater_shaker_stop_shake, only())),
    }
    if let Some(seconds) = args.timer_seconds {
        creators.push(curry(
            delay,
            DelayArgs {
                seconds,
                message: None,
            },
        ));
        if args.rpm.is_some() {
            creators.push(curry(heater_shaker_stop_shake, only()));
        }
        if args.target_temperature.is_some() {
            creators.push(curry(deactivate_temperature, only()));
        }
    }
    if args.latch_open {
        creators.push(curry(heater_shaker_open_latch, only()));
    } else if args.rpm.is_none() && !latch_closed {
        creators.push(curry(heater_shaker_close_latch, only()));
    }

    reduce_command_creators(creators, invariant, robot_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::fixtures;

    fn step(target: Option<f64>, rpm: Option<f64>, latch_open: bool, timer: Option<f64>) -> HeaterShakerStepArgs {
        HeaterShakerStepArgs {
            module_id: ModuleId::new(fixtures::HEATER_SHAKER),
            target_temperature: target,
            rpm,
            latch_open,
            timer_seconds: timer,
        }
    }

    #[test]
    fn timed_shake_then_open() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out = heater_shaker_step(&step(Some(37.0), Some(500.0), true, Some(60.0)), &ctx, &state).unwrap();
        let types: Vec<_> = out.commands.iter().map(|c| c.command_type()).collect();
        assert_eq!(
            types,
            vec![
                "heaterShaker/closeLabwareLatch",
                "heaterShaker/setTargetTemperature",
                "heaterShaker/setAndWaitForShakeSpeed",
                "waitForDuration",
                "heaterShaker/deactivateShaker",
                "heaterShaker/deactivateHeater",
                "heaterShaker/openLabwareLatch",
            ]
        );
        assert_eq!(
            out.python.as_deref(),
            Some(
                "heater_shaker_1.close_labware_latch()\n\
                 heater_shaker_1.set_target_temperature(37)\n\
                 heater_shaker_1.set_and_wait_for_shake_speed(500)\n\
                 protocol.delay(seconds=60)\n\
                 heater_shaker_1.deactivate_shaker()\n\
                 heater_shaker_1.deactivate_heater()\n\
                 heater_shaker_1.open_labware_latch()"
            )
        );
    }

    #[test]
    fn open_latch_while_shaking_is_rejected() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let err = heater_shaker_step(&step(None, Some(500.0), true, None), &ctx, &state).unwrap_err();
        assert_eq!(err.errors[0].error_type(), ErrorType::HeaterShakerLatchOpen);
    }

    #[test]
    fn heat_only_closes_latch() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out = heater_shaker_step(&step(Some(50.0), None, false, None), &ctx, &state).unwrap();
        let types: Vec<_> = out.commands.iter().map(|c| c.command_type()).collect();
        assert_eq!(
            types,
            vec![
                "heaterShaker/setTargetTemperature",
                "heaterShaker/deactivateShaker",
                "heaterShaker/closeLabwareLatch",
            ]
        );
    }
}
