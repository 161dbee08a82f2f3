//! Labware move creator.

use serde::{Deserialize, Serialize};

use crate::command::{Command, MoveLabwareParams, MoveLabwareStrategy};
use crate::creators::{resolve_labware, CommandCreatorErrors, CommandCreatorResult, CommandsAndWarnings};
use crate::entity::{LabwareId, ModuleId};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::python::{self, PROTOCOL_CONTEXT_NAME};
use crate::state::{LabwareLocation, ModuleState, RobotState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLabwareArgs {
    pub labware_id: LabwareId,
    pub new_location: LabwareLocation,
    #[serde(default)]
    pub use_gripper: bool,
}

/// Errors for moving labware into or out of `module_id` in its current state.
fn module_blocks_move(
    robot_state: &RobotState,
    module_id: &ModuleId,
    use_gripper: bool,
) -> Option<CommandError> {
    let module_id = module_id.clone();
    match robot_state.module_state(&module_id)? {
        ModuleState::Thermocycler { lid_open, .. } if *lid_open != Some(true) => {
            Some(CommandError::ThermocyclerLidClosed { module_id })
        }
        ModuleState::HeaterShaker { latch_open, .. } if use_gripper && *latch_open != Some(true) => {
            Some(CommandError::HeaterShakerLatchClosed { module_id })
        }
        ModuleState::AbsorbanceReader { lid_open: false, .. } => {
            Some(CommandError::AbsorbanceReaderLidClosed { module_id })
        }
        _ => None,
    }
}

fn location_python(invariant: &InvariantContext, location: &LabwareLocation) -> String {
    match location {
        LabwareLocation::Slot(slot) => python::format_str(slot),
        LabwareLocation::Module(id) => invariant
            .module(id)
            .map_or_else(|| python::format_str(id.as_str()), |m| m.python_name.clone()),
        LabwareLocation::Labware(id) => invariant
            .labware(id)
            .map_or_else(|| python::format_str(id.as_str()), |l| l.python_name.clone()),
        LabwareLocation::OffDeck => format!("{PROTOCOL_CONTEXT_NAME}.OFF_DECK"),
    }
}

/// Moves a labware to a new location, by gripper or by a manual move with a
/// pause.
pub fn move_labware(
    args: &MoveLabwareArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let mut errors = Vec::new();
    let labware = match resolve_labware(invariant, &args.labware_id) {
        Ok(labware) => Some(labware),
        Err(error) => {
            errors.push(error);
            None
        }
    };

    let destination_module = match &args.new_location {
        LabwareLocation::Module(module_id) => {
            if invariant.module(module_id).is_none() {
                errors.push(CommandError::missing_module(module_id));
                None
            } else {
                Some(module_id)
            }
        }
        LabwareLocation::Labware(below) => {
            if let Err(error) = resolve_labware(invariant, below) {
                errors.push(error);
            } else if robot_state.rests_on(below, &args.labware_id) {
                errors.push(CommandError::LabwareStackCycle {
                    labware_id: args.labware_id.clone(),
                    below: below.clone(),
                });
            }
            robot_state.module_under(below)
        }
        LabwareLocation::Slot(_) | LabwareLocation::OffDeck => None,
    };

    if args.use_gripper && !invariant.has_gripper() {
        errors.push(CommandError::NoGripper);
    }

    let source_module = robot_state.module_under(&args.labware_id);
    for module_id in source_module.into_iter().chain(destination_module) {
        if let Some(error) = module_blocks_move(robot_state, module_id, args.use_gripper) {
            if !errors.contains(&error) {
                errors.push(error);
            }
        }
    }

    let already_there = robot_state.labware_location(&args.labware_id) == Some(&args.new_location);
    if !already_there && robot_state.is_location_occupied(&args.new_location) {
        errors.push(CommandError::LocationOccupied {
            location: args.new_location.to_string(),
        });
    }

    let Some(labware) = labware.filter(|_| errors.is_empty()) else {
        return Err(CommandCreatorErrors::from(errors));
    };

    let strategy = if args.use_gripper {
        MoveLabwareStrategy::UsingGripper
    } else {
        MoveLabwareStrategy::ManualMoveWithPause
    };
    let gripper_flag = if args.use_gripper { "True" } else { "False" };
    Ok(CommandsAndWarnings::single(
        Command::MoveLabware(MoveLabwareParams {
            labware_id: args.labware_id.clone(),
            new_location: args.new_location.clone(),
            strategy,
        }),
        python::call(
            PROTOCOL_CONTEXT_NAME,
            "move_labware",
            &[
                labware.python_name.clone(),
                location_python(invariant, &args.new_location),
                python::kwarg("use_gripper", gripper_flag),
            ],
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::fixtures;

    fn args(labware: &str, location: LabwareLocation, use_gripper: bool) -> MoveLabwareArgs {
        MoveLabwareArgs {
            labware_id: LabwareId::new(labware),
            new_location: location,
            use_gripper,
        }
    }

    fn types(result: CommandCreatorResult) -> Vec<ErrorType> {
        result
            .unwrap_err()
            .errors
            .iter()
            .map(CommandError::error_type)
            .collect()
    }

    #[test]
    fn move_to_free_slot_with_gripper() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out = move_labware(
            &args(fixtures::PLATE, LabwareLocation::Slot(fixtures::FREE_SLOT.to_string()), true),
            &ctx,
            &state,
        )
        .unwrap();
        assert_eq!(
            out.python.as_deref(),
            Some("protocol.move_labware(well_plate_1, \"A1\", use_gripper=True)")
        );
        let json = serde_json::to_value(&out.commands[0]).unwrap();
        assert_eq!(json["params"]["strategy"], "usingGripper");
    }

    #[test]
    fn occupied_destination() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let result = move_labware(
            &args(fixtures::PLATE, LabwareLocation::Slot("D2".to_string()), false),
            &ctx,
            &state,
        );
        assert_eq!(types(result), vec![ErrorType::LocationOccupied]);
    }

    #[test]
    fn closed_thermocycler_and_latch() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out_of_tc = move_labware(
            &args(fixtures::THERMOCYCLER_PLATE, LabwareLocation::OffDeck, false),
            &ctx,
            &state,
        );
        assert_eq!(types(out_of_tc), vec![ErrorType::ThermocyclerLidClosed]);

        let out_of_hs = move_labware(
            &args(
                fixtures::HEATER_SHAKER_PLATE,
                LabwareLocation::Slot(fixtures::FREE_SLOT.to_string()),
                true,
            ),
            &ctx,
            &state,
        );
        assert_eq!(types(out_of_hs), vec![ErrorType::HeaterShakerLatchClosed]);
    }

    #[test]
    fn unknown_destination_module() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let result = move_labware(
            &args(fixtures::PLATE, LabwareLocation::Module(ModuleId::new("ghost")), false),
            &ctx,
            &state,
        );
        assert_eq!(types(result), vec![ErrorType::MissingModule]);
    }

    #[test]
    fn manual_move_off_deck() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let out = move_labware(&args(fixtures::PLATE, LabwareLocation::OffDeck, false), &ctx, &state)
            .unwrap();
        assert_eq!(
            out.python.as_deref(),
            Some("protocol.move_labware(well_plate_1, protocol.OFF_DECK, use_gripper=False)")
        );
    }

    #[test]
    fn unknown_labware_on_either_end() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let result = move_labware(
            &args("nope", LabwareLocation::Labware(LabwareId::new("gone")), false),
            &ctx,
            &state,
        );
        let err = result.unwrap_err();
        assert_eq!(
            err.errors,
            vec![
                CommandError::LabwareDoesNotExist {
                    labware_id: LabwareId::new("nope"),
                },
                CommandError::LabwareDoesNotExist {
                    labware_id: LabwareId::new("gone"),
                },
            ]
        );
    }

    #[test]
    fn labware_cannot_go_on_itself() {
        let ctx = fixtures::invariant_context();
        let state = fixtures::initial_robot_state(&ctx);
        let result = move_labware(
            &args(fixtures::PLATE, LabwareLocation::Labware(LabwareId::new(fixtures::PLATE)), false),
            &ctx,
            &state,
        );
        assert_eq!(types(result), vec![ErrorType::LabwareStackCycle]);
    }

    #[test]
    fn labware_cannot_go_on_what_it_carries() {
        let ctx = fixtures::invariant_context();
        let mut state = fixtures::initial_robot_state(&ctx);
        state.labware_mut().insert(
            LabwareId::new(fixtures::RESERVOIR),
            LabwareLocation::Labware(LabwareId::new(fixtures::PLATE)),
        );
        let result = move_labware(
            &args(fixtures::PLATE, LabwareLocation::Labware(LabwareId::new(fixtures::RESERVOIR)), false),
            &ctx,
            &state,
        );
        assert_eq!(types(result), vec![ErrorType::LabwareStackCycle]);

        let onto_other = move_labware(
            &args(
                fixtures::RESERVOIR,
                LabwareLocation::Labware(LabwareId::new(fixtures::TIPRACK)),
                false,
            ),
            &ctx,
            &state,
        );
        assert!(onto_other.is_ok());
    }
}
