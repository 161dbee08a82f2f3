//! Absorbance reader sequences.

use crate::creators::atomic::absorbance_reader::validate_initialize_settings;
use crate::creators::atomic::{
    absorbance_reader_close_lid, absorbance_reader_initialize, absorbance_reader_read,
    AbsorbanceInitializeArgs, AbsorbanceReadArgs, ModuleOnlyArgs,
};
use crate::creators::{curry, reduce_command_creators, resolve_module, CommandCreatorErrors, CommandCreatorResult};
use crate::entity::{ModuleId, ModuleType};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::state::{ModuleState, RobotState};

/// Arguments for [`absorbance_reader_close_read`]; the same as a plain read.
pub type AbsorbanceCloseReadArgs = AbsorbanceReadArgs;

/// Arguments for [`absorbance_reader_close_initialize`]; the same as a plain
/// initialize.
pub type AbsorbanceCloseInitializeArgs = AbsorbanceInitializeArgs;

/// Checks both the loaded entity and its live state are an absorbance reader.
fn check_reader(
    invariant: &InvariantContext,
    robot_state: &RobotState,
    module_id: &ModuleId,
) -> Result<(), CommandError> {
    let module = resolve_module(invariant, module_id)?;
    let live = robot_state.module_state(module_id);
    if module.module_type == ModuleType::AbsorbanceReader
        && matches!(live, Some(ModuleState::AbsorbanceReader { .. }))
    {
        Ok(())
    } else {
        Err(CommandError::missing_module(module_id))
    }
}

/// Closes the lid and reads the plate.
pub fn absorbance_reader_close_read(
    args: &AbsorbanceCloseReadArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    check_reader(invariant, robot_state, &args.module_id)?;
    reduce_command_creators(
        vec![
            curry(
                absorbance_reader_close_lid,
                ModuleOnlyArgs {
                    module_id: args.module_id.clone(),
                },
            ),
            curry(absorbance_reader_read, args.clone()),
        ],
        invariant,
        robot_state,
    )
}

/// Closes the lid and configures the reader.
pub fn absorbance_reader_close_initialize(
    args: &AbsorbanceCloseInitializeArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let errors: Vec<CommandError> = [
        check_reader(invariant, robot_state, &args.module_id),
        validate_initialize_settings(args),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();
    if !errors.is_empty() {
        return Err(CommandCreatorErrors::from(errors));
    }
    reduce_command_creators(
        vec![
            curry(
                absorbance_reader_close_lid,
                ModuleOnlyArgs {
                    module_id: args.module_id.clone(),
                },
            ),
            curry(absorbance_reader_initialize, args.clone()),
        ],
        invariant,
        robot_state,
    )
}
