//! Command creators: validate one step and lower it to commands plus Python.
//!
//! Every creator is a pure function of `(args, invariant context, robot state)`.
//! Atomic creators emit one command per Python line. Compound creators chain
//! other creators through [`reduce_command_creators`], which advances the
//! robot state between them so later sub-steps see the effects of earlier ones.

pub mod atomic;
pub mod compound;

use crate::command::Command;
use crate::entity::{LabwareEntity, LabwareId, ModuleEntity, ModuleId, PipetteEntity, PipetteId};
use crate::error::{CommandError, CommandWarning};
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::RobotState;
use crate::updaters::next_robot_state_and_warnings;

/// Successful output of a creator.
///
/// `python` is `Some` exactly when `commands` is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandsAndWarnings {
    /// Commands in execution order.
    pub commands: Vec<Command>,
    /// Advisory warnings.
    pub warnings: Vec<CommandWarning>,
    /// Equivalent Python source, newline-joined.
    pub python: Option<String>,
}

impl CommandsAndWarnings {
    /// A single command with its Python line.
    #[must_use]
    pub fn single(command: Command, python: String) -> Self {
        Self {
            commands: vec![command],
            warnings: Vec::new(),
            python: Some(python),
        }
    }

    /// Success that emits nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attaches warnings.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<CommandWarning>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Failed output of a creator: every violated precondition it found.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandCreatorErrors {
    /// Violated preconditions. Never empty.
    pub errors: Vec<CommandError>,
    /// Warnings gathered before the failure.
    pub warnings: Vec<CommandWarning>,
}

impl From<CommandError> for CommandCreatorErrors {
    fn from(error: CommandError) -> Self {
        Self {
            errors: vec![error],
            warnings: Vec::new(),
        }
    }
}

impl From<Vec<CommandError>> for CommandCreatorErrors {
    fn from(errors: Vec<CommandError>) -> Self {
        Self {
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Result of running a creator.
pub type CommandCreatorResult = Result<CommandsAndWarnings, CommandCreatorErrors>;

/// Signature shared by all creators.
pub type CommandCreator<A> = fn(&A, &InvariantContext, &RobotState) -> CommandCreatorResult;

/// A creator with its arguments already bound.
pub type CurriedCommandCreator<'a> =
    Box<dyn FnOnce(&InvariantContext, &RobotState) -> CommandCreatorResult + 'a>;

/// Binds `args` to `creator`.
pub fn curry<'a, A: 'a>(creator: CommandCreator<A>, args: A) -> CurriedCommandCreator<'a> {
    Box::new(move |invariant, robot_state| creator(&args, invariant, robot_state))
}

/// Binds `args` to `creator` and drops its Python output.
///
/// Used when a compound creator renders one Python line for several commands.
pub fn curry_without_python<'a, A: 'a>(
    creator: CommandCreator<A>,
    args: A,
) -> CurriedCommandCreator<'a> {
    Box::new(move |invariant, robot_state| {
        creator(&args, invariant, robot_state).map(|mut out| {
            out.python = None;
            out
        })
    })
}

/// Runs creators in sequence, threading the robot state through the state
/// updaters between them.
///
/// Stops at the first failing creator and returns its errors along with the
/// warnings gathered so far.
pub fn reduce_command_creators(
    creators: Vec<CurriedCommandCreator<'_>>,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let mut state = robot_state.clone();
    let mut commands = Vec::new();
    let mut warnings = Vec::new();
    let mut lines = Vec::new();

    for creator in creators {
        match creator(invariant, &state) {
            Ok(next) => {
                for command in &next.commands {
                    state = next_robot_state_and_warnings(command, invariant, &state).robot_state;
                }
                commands.extend(next.commands);
                warnings.extend(next.warnings);
                lines.extend(next.python);
            }
            Err(mut failure) => {
                warnings.append(&mut failure.warnings);
                failure.warnings = warnings;
                return Err(failure);
            }
        }
    }

    let python = if commands.is_empty() {
        None
    } else {
        python::join_lines(lines)
    };
    Ok(CommandsAndWarnings {
        commands,
        warnings,
        python,
    })
}

/// Resolves a module id against the invariant context.
pub(crate) fn resolve_module<'a>(
    invariant: &'a InvariantContext,
    module_id: &ModuleId,
) -> Result<&'a ModuleEntity, CommandError> {
    invariant
        .module(module_id)
        .ok_or_else(|| CommandError::missing_module(module_id))
}

/// Resolves a pipette id against the invariant context.
pub(crate) fn resolve_pipette<'a>(
    invariant: &'a InvariantContext,
    pipette_id: &PipetteId,
) -> Result<&'a PipetteEntity, CommandError> {
    invariant
        .pipette(pipette_id)
        .ok_or_else(|| CommandError::PipetteDoesNotExist {
            pipette_id: pipette_id.clone(),
        })
}

/// Resolves a labware id against the invariant context.
pub(crate) fn resolve_labware<'a>(
    invariant: &'a InvariantContext,
    labware_id: &LabwareId,
) -> Result<&'a LabwareEntity, CommandError> {
    invariant
        .labware(labware_id)
        .ok_or_else(|| CommandError::LabwareDoesNotExist {
            labware_id: labware_id.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ModuleParams, WaitForDurationParams};

    fn emit_delay(seconds: &f64, _: &InvariantContext, _: &RobotState) -> CommandCreatorResult {
        Ok(CommandsAndWarnings::single(
            Command::WaitForDuration(WaitForDurationParams {
                seconds: *seconds,
                message: None,
            }),
            format!("protocol.delay(seconds={seconds})"),
        ))
    }

    fn fail_missing(module_id: &ModuleId, _: &InvariantContext, _: &RobotState) -> CommandCreatorResult {
        Err(CommandError::missing_module(module_id).into())
    }

    fn emit_open_lid(module_id: &ModuleId, _: &InvariantContext, _: &RobotState) -> CommandCreatorResult {
        Ok(CommandsAndWarnings::single(
            Command::ThermocyclerOpenLid(ModuleParams {
                module_id: module_id.clone(),
            }),
            "thermocycler.open_lid()".to_string(),
        ))
    }

    #[test]
    fn reduce_concatenates_commands_and_python() {
        let ctx = InvariantContext::default();
        let state = RobotState::default();
        let result = reduce_command_creators(
            vec![curry(emit_delay, 1.0), curry(emit_delay, 2.0)],
            &ctx,
            &state,
        )
        .unwrap();
        assert_eq!(result.commands.len(), 2);
        assert_eq!(
            result.python.as_deref(),
            Some("protocol.delay(seconds=1)\nprotocol.delay(seconds=2)")
        );
    }

    #[test]
    fn reduce_stops_at_first_failure() {
        let ctx = InvariantContext::default();
        let state = RobotState::default();
        let result = reduce_command_creators(
            vec![
                curry(emit_delay, 1.0),
                curry(fail_missing, ModuleId::new("gone")),
                curry(emit_delay, 2.0),
            ],
            &ctx,
            &state,
        );
        let failure = result.unwrap_err();
        assert_eq!(failure.errors, vec![CommandError::missing_module(&ModuleId::new("gone"))]);
    }

    #[test]
    fn without_python_keeps_commands() {
        let ctx = InvariantContext::default();
        let state = RobotState::default();
        let result = reduce_command_creators(
            vec![
                curry_without_python(emit_open_lid, ModuleId::new("tc")),
                curry(emit_delay, 5.0),
            ],
            &ctx,
            &state,
        )
        .unwrap();
        assert_eq!(result.commands.len(), 2);
        assert_eq!(result.python.as_deref(), Some("protocol.delay(seconds=5)"));
    }

    #[test]
    fn reduce_of_nothing_is_empty() {
        let result =
            reduce_command_creators(Vec::new(), &InvariantContext::default(), &RobotState::default())
                .unwrap();
        assert!(result.commands.is_empty());
        assert!(result.python.is_none());
    }
}
