//! Liquid tracking in wells and tips.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{LabwareId, LiquidId, PipetteId};

/// Volumes below this (µL) are treated as empty and dropped from the state.
const VOLUME_EPSILON: f64 = 1e-9;

/// Volume of each liquid held at one location (a well or a tip), in µL.
pub type LocationLiquidState = BTreeMap<LiquidId, f64>;

/// Liquid contents of every well and tip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidState {
    /// Per labware, per well.
    pub labware: BTreeMap<LabwareId, BTreeMap<String, LocationLiquidState>>,
    /// Per pipette, per channel (0 is the back-most channel).
    pub pipettes: BTreeMap<PipetteId, BTreeMap<usize, LocationLiquidState>>,
}

impl LiquidState {
    /// Contents of one well; empty if nothing was ever added.
    #[must_use]
    pub fn well(&self, labware: &LabwareId, well: &str) -> LocationLiquidState {
        self.labware
            .get(labware)
            .and_then(|wells| wells.get(well))
            .cloned()
            .unwrap_or_default()
    }

    /// Contents of one channel's tip.
    #[must_use]
    pub fn tip(&self, pipette: &PipetteId, channel: usize) -> LocationLiquidState {
        self.pipettes
            .get(pipette)
            .and_then(|tips| tips.get(&channel))
            .cloned()
            .unwrap_or_default()
    }

    /// Largest total volume currently held by any tip of `pipette`.
    #[must_use]
    pub fn max_tip_volume(&self, pipette: &PipetteId) -> f64 {
        self.pipettes
            .get(pipette)
            .map(|tips| tips.values().map(total_volume).fold(0.0, f64::max))
            .unwrap_or(0.0)
    }

    pub(crate) fn set_well(&mut self, labware: &LabwareId, well: &str, contents: LocationLiquidState) {
        self.labware
            .entry(labware.clone())
            .or_default()
            .insert(well.to_string(), contents);
    }

    pub(crate) fn set_tip(&mut self, pipette: &PipetteId, channel: usize, contents: LocationLiquidState) {
        self.pipettes
            .entry(pipette.clone())
            .or_default()
            .insert(channel, contents);
    }

    pub(crate) fn clear_tips(&mut self, pipette: &PipetteId) {
        self.pipettes.remove(pipette);
    }
}

/// Sum of all liquid volumes at a location.
#[must_use]
pub fn total_volume(location: &LocationLiquidState) -> f64 {
    location.values().sum()
}

/// Splits `volume` µL off `source`, keeping each liquid's proportion.
///
/// Returns `(taken, remaining)`. If `volume` meets or exceeds the total, all
/// of `source` is taken.
#[must_use]
pub fn split_liquid(
    volume: f64,
    source: &LocationLiquidState,
) -> (LocationLiquidState, LocationLiquidState) {
    let total = total_volume(source);
    if total <= VOLUME_EPSILON || volume <= 0.0 {
        return (LocationLiquidState::new(), source.clone());
    }
    if volume >= total {
        return (source.clone(), LocationLiquidState::new());
    }
    let ratio = volume / total;
    let mut taken = LocationLiquidState::new();
    let mut remaining = LocationLiquidState::new();
    for (liquid, amount) in source {
        let part = amount * ratio;
        insert_nonzero(&mut taken, liquid, part);
        insert_nonzero(&mut remaining, liquid, amount - part);
    }
    (taken, remaining)
}

/// Adds every liquid of `from` into `into`.
pub fn merge_liquid(into: &mut LocationLiquidState, from: &LocationLiquidState) {
    for (liquid, amount) in from {
        let merged = into.get(liquid).copied().unwrap_or(0.0) + amount;
        insert_nonzero(into, liquid, merged);
    }
}

fn insert_nonzero(location: &mut LocationLiquidState, liquid: &LiquidId, amount: f64) {
    if amount > VOLUME_EPSILON {
        location.insert(liquid.clone(), amount);
    } else {
        location.remove(liquid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(entries: &[(&str, f64)]) -> LocationLiquidState {
        entries
            .iter()
            .map(|(id, v)| (LiquidId::new(*id), *v))
            .collect()
    }

    #[test]
    fn split_keeps_proportions() {
        let source = location(&[("water", 75.0), ("dye", 25.0)]);
        let (taken, remaining) = split_liquid(40.0, &source);
        assert!((taken[&LiquidId::new("water")] - 30.0).abs() < 1e-9);
        assert!((taken[&LiquidId::new("dye")] - 10.0).abs() < 1e-9);
        assert!((total_volume(&remaining) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn split_more_than_available_takes_everything() {
        let source = location(&[("water", 10.0)]);
        let (taken, remaining) = split_liquid(50.0, &source);
        assert_eq!(taken, source);
        assert!(remaining.is_empty());
    }

    #[test]
    fn split_from_empty_takes_nothing() {
        let (taken, remaining) = split_liquid(10.0, &LocationLiquidState::new());
        assert!(taken.is_empty());
        assert!(remaining.is_empty());
    }

    #[test]
    fn merge_adds_volumes() {
        let mut into = location(&[("water", 10.0)]);
        merge_liquid(&mut into, &location(&[("water", 5.0), ("dye", 1.0)]));
        assert!((into[&LiquidId::new("water")] - 15.0).abs() < 1e-9);
        assert!((into[&LiquidId::new("dye")] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn max_tip_volume_over_channels() {
        let mut state = LiquidState::default();
        let pipette = PipetteId::new("p");
        state.set_tip(&pipette, 0, location(&[("water", 10.0)]));
        state.set_tip(&pipette, 1, location(&[("water", 30.0)]));
        assert!((state.max_tip_volume(&pipette) - 30.0).abs() < 1e-9);
        state.clear_tips(&pipette);
        assert!(state.max_tip_volume(&pipette).abs() < 1e-9);
    }
}
