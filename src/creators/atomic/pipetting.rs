//! Tip handling and liquid handling creators.
//!
//! These creators check every precondition and report all violations at once.

use serde::{Deserialize, Serialize};

use super::module_access_errors;
use crate::command::{
    Command, LiquidHandlingParams, MoveToAddressableAreaForDropTipParams, PickUpTipParams,
    PipetteParams, WellLocation,
};
use crate::creators::{CommandCreatorErrors, CommandCreatorResult, CommandsAndWarnings};
use crate::entity::{LabwareEntity, LabwareId, PipetteEntity, PipetteId};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::RobotState;

/// Default aspirate/dispense position, in mm above the well bottom.
pub const DEFAULT_WELL_BOTTOM_OFFSET: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteArgs {
    pub pipette_id: PipetteId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickUpTipArgs {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidHandlingArgs {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    pub volume: f64,
    /// µL/s. Defaults to the pipette's default rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_location: Option<WellLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTipAreaArgs {
    pub pipette_id: PipetteId,
    pub addressable_area_name: String,
}

/// Pipette and labware of a step, with every resolution failure collected.
struct Target<'a> {
    pipette: Option<&'a PipetteEntity>,
    labware: Option<&'a LabwareEntity>,
    errors: Vec<CommandError>,
}

fn resolve_target<'a>(
    invariant: &'a InvariantContext,
    robot_state: &RobotState,
    pipette_id: &PipetteId,
    labware_id: &LabwareId,
    well_name: &str,
) -> Target<'a> {
    let mut errors = Vec::new();
    let pipette = invariant.pipette(pipette_id);
    if pipette.is_none() {
        errors.push(CommandError::PipetteDoesNotExist {
            pipette_id: pipette_id.clone(),
        });
    }
    let labware = invariant.labware(labware_id);
    match labware {
        None => errors.push(CommandError::LabwareDoesNotExist {
            labware_id: labware_id.clone(),
        }),
        Some(lw) => {
            let channels = pipette.map_or(1, PipetteEntity::channels);
            if lw.definition.wells_for_channels(well_name, channels).is_none() {
                errors.push(CommandError::WellDoesNotExist {
                    labware_id: labware_id.clone(),
                    well: well_name.to_string(),
                });
            }
            if robot_state.is_off_deck(labware_id) {
                errors.push(CommandError::LabwareOffDeck {
                    labware_id: labware_id.clone(),
                });
            }
        }
    }
    Target {
        pipette,
        labware,
        errors,
    }
}

fn fail(errors: Vec<CommandError>) -> CommandCreatorResult {
    Err(CommandCreatorErrors::from(errors))
}

/// Picks up tips from `well_name` of a tip rack.
pub fn pick_up_tip(
    args: &PickUpTipArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let Target {
        pipette,
        labware,
        mut errors,
    } = resolve_target(invariant, robot_state, &args.pipette_id, &args.labware_id, &args.well_name);

    if let (Some(pipette), Some(labware)) = (pipette, labware) {
        let wells = labware
            .definition
            .wells_for_channels(&args.well_name, pipette.channels())
            .unwrap_or_default();
        if !wells.is_empty() && !robot_state.tip_state().tips_present(&args.labware_id, &wells) {
            errors.push(CommandError::InsufficientTips {
                pipette_id: args.pipette_id.clone(),
            });
        }
    }
    let (Some(pipette), Some(labware), true) = (pipette, labware, errors.is_empty()) else {
        return fail(errors);
    };

    Ok(CommandsAndWarnings::single(
        Command::PickUpTip(PickUpTipParams {
            pipette_id: args.pipette_id.clone(),
            labware_id: args.labware_id.clone(),
            well_name: args.well_name.clone(),
        }),
        python::call(
            &pipette.python_name,
            "pick_up_tip",
            &[python::well(&labware.python_name, &args.well_name)],
        ),
    ))
}

#[derive(Clone, Copy)]
enum Direction {
    Aspirate,
    Dispense,
}

fn liquid_handling(
    direction: Direction,
    args: &LiquidHandlingArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let Target {
        pipette,
        labware,
        mut errors,
    } = resolve_target(invariant, robot_state, &args.pipette_id, &args.labware_id, &args.well_name);

    if let Some(pipette) = pipette {
        if !robot_state.tip_state().has_tip(&args.pipette_id) {
            errors.push(CommandError::NoTipOnPipette {
                pipette_id: args.pipette_id.clone(),
            });
        }
        if let Direction::Aspirate = direction {
            let capacity = invariant.pipette_capacity(pipette);
            let held = robot_state.liquid_state().max_tip_volume(&args.pipette_id);
            if held + args.volume > capacity + 1e-6 {
                errors.push(CommandError::PipetteVolumeExceeded {
                    pipette_id: args.pipette_id.clone(),
                    volume: held + args.volume,
                    capacity,
                });
            }
        }
    }
    if labware.is_some() {
        errors.extend(module_access_errors(robot_state, &args.labware_id));
    }
    let (Some(pipette), Some(labware), true) = (pipette, labware, errors.is_empty()) else {
        return fail(errors);
    };

    let (default_rate, method) = match direction {
        Direction::Aspirate => (pipette.spec.default_aspirate_flow_rate, "aspirate"),
        Direction::Dispense => (pipette.spec.default_dispense_flow_rate, "dispense"),
    };
    let flow_rate = args.flow_rate.unwrap_or(default_rate);
    let well_location = args
        .well_location
        .unwrap_or_else(|| WellLocation::bottom(DEFAULT_WELL_BOTTOM_OFFSET));

    let mut python_args = vec![
        python::format_number(args.volume),
        python::well_location(&labware.python_name, &args.well_name, &well_location),
    ];
    if (flow_rate - default_rate).abs() > f64::EPSILON && default_rate > 0.0 {
        python_args.push(python::kwarg("rate", python::format_number(flow_rate / default_rate)));
    }

    let params = LiquidHandlingParams {
        pipette_id: args.pipette_id.clone(),
        labware_id: args.labware_id.clone(),
        well_name: args.well_name.clone(),
        volume: args.volume,
        flow_rate,
        well_location,
    };
    let command = match direction {
        Direction::Aspirate => Command::Aspirate(params),
        Direction::Dispense => Command::Dispense(params),
    };
    Ok(CommandsAndWarnings::single(
        command,
        python::call(&pipette.python_name, method, &python_args),
    ))
}

/// Draws `volume` µL per channel into the attached tips.
pub fn aspirate(
    args: &LiquidHandlingArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    liquid_handling(Direction::Aspirate, args, invariant, robot_state)
}

/// Expels `volume` µL per channel from the attached tips.
pub fn dispense(
    args: &LiquidHandlingArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    liquid_handling(Direction::Dispense, args, invariant, robot_state)
}

/// Moves the pipette over a trash area before a tip drop.
pub fn move_to_addressable_area_for_drop_tip(
    args: &DropTipAreaArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let pipette = crate::creators::resolve_pipette(invariant, &args.pipette_id)?;
    Ok(CommandsAndWarnings::single(
        Command::MoveToAddressableAreaForDropTip(MoveToAddressableAreaForDropTipParams {
            pipette_id: args.pipette_id.clone(),
            addressable_area_name: args.addressable_area_name.clone(),
            alternate_drop_location: true,
        }),
        format!(
            "# {}: move to {}",
            pipette.python_name, args.addressable_area_name
        ),
    ))
}

/// Drops the attached tip where the pipette is.
pub fn drop_tip_in_place(
    args: &PipetteArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let pipette = crate::creators::resolve_pipette(invariant, &args.pipette_id)?;
    if !robot_state.tip_state().has_tip(&args.pipette_id) {
        return Err(CommandError::NoTipOnPipette {
            pipette_id: args.pipette_id.clone(),
        }
        .into());
    }
    Ok(CommandsAndWarnings::single(
        Command::DropTipInPlace(PipetteParams {
            pipette_id: args.pipette_id.clone(),
        }),
        python::call(&pipette.python_name, "drop_tip", &[]),
    ))
}
