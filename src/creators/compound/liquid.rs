//! Transfer and mix: multi-step liquid handling with a tip policy.

use serde::{Deserialize, Serialize};

use super::tips::{drop_tip, replace_tip, DropTipArgs, ReplaceTipArgs};
use crate::command::WellLocation;
use crate::creators::atomic::{aspirate, dispense, LiquidHandlingArgs};
use crate::creators::{
    curry, reduce_command_creators, CommandCreatorErrors, CommandCreatorResult,
    CommandsAndWarnings, CurriedCommandCreator,
};
use crate::entity::{LabwareId, PipetteEntity, PipetteId};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::state::RobotState;

/// When fresh tips are taken during a transfer or mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeTip {
    /// Before every aspirate.
    #[default]
    Always,
    /// Once at the start.
    Once,
    /// Never; the pipette must already hold a tip.
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferArgs {
    pub pipette_id: PipetteId,
    /// Volume moved per well pair, in µL.
    pub volume: f64,
    pub source_labware_id: LabwareId,
    pub source_wells: Vec<String>,
    pub dest_labware_id: LabwareId,
    pub dest_wells: Vec<String>,
    #[serde(default)]
    pub change_tip: ChangeTip,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiprack_id: Option<LabwareId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspirate_flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispense_flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspirate_offset_from_bottom_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispense_offset_from_bottom_mm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixArgs {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub wells: Vec<String>,
    pub volume: f64,
    /// Aspirate/dispense cycles per well.
    pub times: u32,
    #[serde(default)]
    pub change_tip: ChangeTip,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiprack_id: Option<LabwareId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspirate_flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispense_flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_from_bottom_mm: Option<f64>,
}

/// Pairs source and destination wells: one to one, one to many or many to one.
pub fn pair_wells(sources: &[String], destinations: &[String]) -> Result<Vec<(String, String)>, CommandError> {
    let invalid = || CommandError::InvalidWellPairing {
        sources: sources.len(),
        destinations: destinations.len(),
    };
    match (sources, destinations) {
        ([], _) | (_, []) => Err(invalid()),
        ([source], _) => Ok(destinations
            .iter()
            .map(|d| (source.clone(), d.clone()))
            .collect()),
        (_, [destination]) => Ok(sources
            .iter()
            .map(|s| (s.clone(), destination.clone()))
            .collect()),
        _ if sources.len() == destinations.len() => Ok(sources
            .iter()
            .cloned()
            .zip(destinations.iter().cloned())
            .collect()),
        _ => Err(invalid()),
    }
}

/// Most aspirate and dispense commands a single transfer or mix may expand to.
pub const MAX_SUB_STEPS: usize = 10_000;

/// Fails when `requested` liquid-handling commands exceed [`MAX_SUB_STEPS`].
fn check_sub_steps(requested: f64) -> Result<(), CommandError> {
    #[allow(clippy::cast_precision_loss)]
    let max = MAX_SUB_STEPS as f64;
    if requested.is_finite() && requested <= max {
        Ok(())
    } else {
        Err(CommandError::TooManySubSteps {
            requested,
            max: MAX_SUB_STEPS,
        })
    }
}

/// Splits `volume` into the fewest equal chunks no larger than `capacity`.
///
/// Fails before allocating when the trips alone would exceed [`MAX_SUB_STEPS`].
pub fn split_volume(volume: f64, capacity: f64) -> Result<Vec<f64>, CommandError> {
    if volume <= 0.0 || capacity <= 0.0 {
        return Ok(Vec::new());
    }
    // Tolerate float noise so 300 / 300 stays one chunk.
    let chunks = ((volume / capacity) - 1e-9).ceil().max(1.0);
    check_sub_steps(chunks * 2.0)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = chunks as usize;
    Ok(vec![volume / chunks; count])
}

/// Checks that labware and every named well exist.
fn check_wells(invariant: &InvariantContext, labware_id: &LabwareId, wells: &[String], errors: &mut Vec<CommandError>) {
    let Some(labware) = invariant.labware(labware_id) else {
        errors.push(CommandError::LabwareDoesNotExist {
            labware_id: labware_id.clone(),
        });
        return;
    };
    for well in wells {
        if !labware.definition.has_well(well) {
            errors.push(CommandError::WellDoesNotExist {
                labware_id: labware_id.clone(),
                well: well.clone(),
            });
        }
    }
}

fn check_pipette<'a>(
    invariant: &'a InvariantContext,
    pipette_id: &PipetteId,
    errors: &mut Vec<CommandError>,
) -> Option<&'a PipetteEntity> {
    let pipette = invariant.pipette(pipette_id);
    if pipette.is_none() {
        errors.push(CommandError::PipetteDoesNotExist {
            pipette_id: pipette_id.clone(),
        });
    }
    pipette
}

fn replace(pipette_id: &PipetteId, tiprack_id: Option<&LabwareId>) -> CurriedCommandCreator<'static> {
    curry(
        replace_tip,
        ReplaceTipArgs {
            pipette_id: pipette_id.clone(),
            tiprack_id: tiprack_id.cloned(),
        },
    )
}

fn drop_current_tip(pipette_id: &PipetteId) -> CurriedCommandCreator<'static> {
    curry(
        drop_tip,
        DropTipArgs {
            pipette_id: pipette_id.clone(),
        },
    )
}

fn handling(
    pipette_id: &PipetteId,
    labware_id: &LabwareId,
    well: &str,
    volume: f64,
    flow_rate: Option<f64>,
    offset: Option<f64>,
) -> LiquidHandlingArgs {
    LiquidHandlingArgs {
        pipette_id: pipette_id.clone(),
        labware_id: labware_id.clone(),
        well_name: well.to_string(),
        volume,
        flow_rate,
        well_location: offset.map(WellLocation::bottom),
    }
}

/// Moves `volume` µL from each source well to its paired destination well,
/// in as many trips as the tip capacity requires.
pub fn transfer(args: &TransferArgs, invariant: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    let mut errors = Vec::new();
    let pipette = check_pipette(invariant, &args.pipette_id, &mut errors);
    check_wells(invariant, &args.source_labware_id, &args.source_wells, &mut errors);
    check_wells(invariant, &args.dest_labware_id, &args.dest_wells, &mut errors);
    let pairs = pair_wells(&args.source_wells, &args.dest_wells).unwrap_or_else(|error| {
        errors.push(error);
        Vec::new()
    });
    let Some(pipette) = pipette.filter(|_| errors.is_empty()) else {
        return Err(CommandCreatorErrors::from(errors));
    };

    let chunks = split_volume(args.volume, invariant.pipette_capacity(pipette))?;
    #[allow(clippy::cast_precision_loss)]
    let sub_steps = pairs.len() as f64 * chunks.len() as f64 * 2.0;
    check_sub_steps(sub_steps)?;
    let tiprack = args.tiprack_id.as_ref();
    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();
    if args.change_tip == ChangeTip::Once {
        creators.push(replace(&args.pipette_id, tiprack));
    }
    for (source, dest) in &pairs {
        for chunk in &chunks {
            if args.change_tip == ChangeTip::Always {
                creators.push(replace(&args.pipette_id, tiprack));
            }
            creators.push(curry(
                aspirate,
                handling(
                    &args.pipette_id,
                    &args.source_labware_id,
                    source,
                    *chunk,
                    args.aspirate_flow_rate,
                    args.aspirate_offset_from_bottom_mm,
                ),
            ));
            creators.push(curry(
                dispense,
                handling(
                    &args.pipette_id,
                    &args.dest_labware_id,
                    dest,
                    *chunk,
                    args.dispense_flow_rate,
                    args.dispense_offset_from_bottom_mm,
                ),
            ));
        }
    }
    if args.change_tip != ChangeTip::Never {
        creators.push(drop_current_tip(&args.pipette_id));
    }

    reduce_command_creators(creators, invariant, robot_state)
}

/// Aspirates and dispenses `volume` µL in place, `times` times per well.
pub fn mix(args: &MixArgs, invariant: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    let mut errors = Vec::new();
    let pipette = check_pipette(invariant, &args.pipette_id, &mut errors);
    check_wells(invariant, &args.labware_id, &args.wells, &mut errors);
    if let Some(pipette) = pipette {
        let capacity = invariant.pipette_capacity(pipette);
        if args.volume > capacity {
            errors.push(CommandError::PipetteVolumeExceeded {
                pipette_id: args.pipette_id.clone(),
                volume: args.volume,
                capacity,
            });
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let sub_steps = args.wells.len() as f64 * f64::from(args.times) * 2.0;
    if let Err(error) = check_sub_steps(sub_steps) {
        errors.push(error);
    }
    if !errors.is_empty() {
        return Err(CommandCreatorErrors::from(errors));
    }
    if args.times == 0 || args.wells.is_empty() {
        return Ok(CommandsAndWarnings::empty());
    }

    let tiprack = args.tiprack_id.as_ref();
    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();
    if args.change_tip == ChangeTip::Once {
        creators.push(replace(&args.pipette_id, tiprack));
    }
    for well in &args.wells {
        if args.change_tip == ChangeTip::Always {
            creators.push(replace(&args.pipette_id, tiprack));
        }
        for _ in 0..args.times {
            creators.push(curry(
                aspirate,
                handling(
                    &args.pipette_id,
                    &args.labware_id,
                    well,
                    args.volume,
                    args.aspirate_flow_rate,
                    args.offset_from_bottom_mm,
                ),
            ));
            creators.push(curry(
                dispense,
                handling(
                    &args.pipette_id,
                    &args.labware_id,
                    well,
                    args.volume,
                    args.dispense_flow_rate,
                    args.offset_from_bottom_mm,
                ),
            ));
        }
    }
    if args.change_tip != ChangeTip::Never {
        creators.push(drop_current_tip(&args.pipette_id));
    }

    reduce_command_creators(creators, invariant, robot_state)
}
