//! Tip and liquid transitions.

use crate::command::{LiquidHandlingParams, PickUpTipParams};
use crate::entity::{LabwareId, PipetteId};
use crate::error::CommandWarning;
use crate::invariant::InvariantContext;
use crate::state::{merge_liquid, split_liquid, total_volume, RobotState};

/// Tolerance when comparing requested and available volumes, in µL.
const VOLUME_TOLERANCE: f64 = 1e-6;

/// Wells touched by each channel, in channel order. Falls back to the addressed
/// well alone when the pipette or labware is unknown.
fn channel_wells(
    invariant: &InvariantContext,
    pipette_id: &PipetteId,
    labware_id: &LabwareId,
    well: &str,
) -> Vec<String> {
    let channels = invariant.pipette(pipette_id).map_or(1, |p| p.channels());
    invariant
        .labware(labware_id)
        .and_then(|lw| lw.definition.wells_for_channels(well, channels))
        .unwrap_or_else(|| vec![well.to_string()])
}

pub(super) fn pick_up_tip(state: &mut RobotState, params: &PickUpTipParams, invariant: &InvariantContext) {
    let wells = channel_wells(invariant, &params.pipette_id, &params.labware_id, &params.well_name);
    let tips = state.tip_state_mut();
    tips.mark_used(&params.labware_id, &wells);
    tips.set_attached(&params.pipette_id, true);
    state.liquid_state_mut().clear_tips(&params.pipette_id);
}

pub(super) fn drop_tip(state: &mut RobotState, pipette_id: &PipetteId) {
    state.tip_state_mut().set_attached(pipette_id, false);
    state.liquid_state_mut().clear_tips(pipette_id);
}

/// Moves `volume` µL per channel from the addressed wells into the tips.
///
/// Wells shared by several channels (troughs) are drained channel by channel.
pub(super) fn aspirate(
    state: &mut RobotState,
    params: &LiquidHandlingParams,
    invariant: &InvariantContext,
    warnings: &mut Vec<CommandWarning>,
) {
    let wells = channel_wells(invariant, &params.pipette_id, &params.labware_id, &params.well_name);
    let liquid = state.liquid_state_mut();
    for (channel, well) in wells.iter().enumerate() {
        let touched = liquid
            .labware
            .get(&params.labware_id)
            .is_some_and(|w| w.contains_key(well));
        let source = liquid.well(&params.labware_id, well);
        let available = total_volume(&source);

        let warning = if !touched {
            Some(CommandWarning::AspirateFromPristineWell {
                labware_id: params.labware_id.clone(),
                well: well.clone(),
            })
        } else if params.volume > available + VOLUME_TOLERANCE {
            Some(CommandWarning::AspirateMoreThanWellContents {
                labware_id: params.labware_id.clone(),
                well: well.clone(),
            })
        } else {
            None
        };
        if let Some(warning) = warning {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }

        let (taken, remaining) = split_liquid(params.volume, &source);
        let mut tip = liquid.tip(&params.pipette_id, channel);
        merge_liquid(&mut tip, &taken);
        liquid.set_tip(&params.pipette_id, channel, tip);
        liquid.set_well(&params.labware_id, well, remaining);
    }
}

/// Moves `volume` µL per channel from the tips into the addressed wells.
pub(super) fn dispense(state: &mut RobotState, params: &LiquidHandlingParams, invariant: &InvariantContext) {
    let wells = channel_wells(invariant, &params.pipette_id, &params.labware_id, &params.well_name);
    let liquid = state.liquid_state_mut();
    for (channel, well) in wells.iter().enumerate() {
        let tip = liquid.tip(&params.pipette_id, channel);
        let (moved, left) = split_liquid(params.volume, &tip);
        let mut destination = liquid.well(&params.labware_id, well);
        merge_liquid(&mut destination, &moved);
        liquid.set_tip(&params.pipette_id, channel, left);
        liquid.set_well(&params.labware_id, well, destination);
    }
}
