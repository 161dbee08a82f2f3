//! Dropping and replacing tips.

use serde::{Deserialize, Serialize};

use crate::creators::atomic::{
    drop_tip_in_place, move_to_addressable_area_for_drop_tip, pick_up_tip, DropTipAreaArgs,
    PickUpTipArgs, PipetteArgs,
};
use crate::creators::{
    curry, curry_without_python, reduce_command_creators, resolve_pipette, CommandCreatorResult,
    CommandsAndWarnings,
};
use crate::entity::{LabwareId, PipetteEntity, PipetteId};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::RobotState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTipArgs {
    pub pipette_id: PipetteId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceTipArgs {
    pub pipette_id: PipetteId,
    /// Rack to take the tip from; defaults to the pipette's assigned racks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiprack_id: Option<LabwareId>,
}

/// Drops the attached tip into the trash. Succeeds with nothing to do when no
/// tip is attached.
pub fn drop_tip(args: &DropTipArgs, invariant: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    let pipette = resolve_pipette(invariant, &args.pipette_id)?;
    if !robot_state.tip_state().has_tip(&args.pipette_id) {
        return Ok(CommandsAndWarnings::empty());
    }
    let trash = invariant
        .trash()
        .ok_or(CommandError::DropTipLocationDoesNotExist)?;
    let area = trash
        .drop_tip_area(pipette.channels())
        .ok_or(CommandError::DropTipLocationDoesNotExist)?;

    let mut out = reduce_command_creators(
        vec![
            curry_without_python(
                move_to_addressable_area_for_drop_tip,
                DropTipAreaArgs {
                    pipette_id: args.pipette_id.clone(),
                    addressable_area_name: area,
                },
            ),
            curry_without_python(
                drop_tip_in_place,
                PipetteArgs {
                    pipette_id: args.pipette_id.clone(),
                },
            ),
        ],
        invariant,
        robot_state,
    )?;
    out.python = Some(python::call(
        &pipette.python_name,
        "drop_tip",
        &[trash.python_name.clone()],
    ));
    Ok(out)
}

/// The next rack and well holding a full set of tips for `pipette`.
pub fn next_tip(
    invariant: &InvariantContext,
    robot_state: &RobotState,
    pipette: &PipetteEntity,
    tiprack_id: Option<&LabwareId>,
) -> Option<(LabwareId, String)> {
    let racks: Vec<&LabwareId> = match tiprack_id {
        Some(id) => vec![id],
        None => pipette.tiprack_ids.iter().collect(),
    };
    racks.into_iter().find_map(|rack| {
        let labware = invariant.labware(rack)?;
        if robot_state.is_off_deck(rack) {
            return None;
        }
        robot_state
            .tip_state()
            .next_tip_well(rack, &labware.definition, pipette.channels())
            .map(|well| (rack.clone(), well))
    })
}

/// Drops the current tip, if any, and picks up a fresh one.
pub fn replace_tip(
    args: &ReplaceTipArgs,
    invariant: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let pipette = resolve_pipette(invariant, &args.pipette_id)?;
    let (rack, well) = next_tip(invariant, robot_state, pipette, args.tiprack_id.as_ref()).ok_or_else(|| {
        CommandError::InsufficientTips {
            pipette_id: args.pipette_id.clone(),
        }
    })?;
    reduce_command_creators(
        vec![
            curry(
                drop_tip,
                DropTipArgs {
                    pipette_id: args.pipette_id.clone(),
                },
            ),
            curry(
                pick_up_tip,
                PickUpTipArgs {
                    pipette_id: args.pipette_id.clone(),
                    labware_id: rack,
                    well_name: well,
                },
            ),
        ],
        invariant,
        robot_state,
    )
}
