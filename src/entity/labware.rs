//! Labware entities and the geometry needed to address wells.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::LabwareId;

/// Number of channels on a multi-channel pipette.
const MULTI_CHANNEL_COUNT: usize = 8;

/// A single well (or tip slot) of a labware definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellDefinition {
    /// Maximum volume the well can hold, in µL. For tip racks this is the tip capacity.
    pub total_liquid_volume: f64,
}

/// Static description of a labware type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareDefinition {
    /// API load name, e.g. `corning_96_wellplate_360ul_flat`.
    pub load_name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Whether this labware is a tip rack.
    #[serde(default)]
    pub is_tiprack: bool,
    /// Well names grouped by column, each column ordered front-to-back (A, B, ...).
    pub ordering: Vec<Vec<String>>,
    /// Well definitions by name.
    pub wells: BTreeMap<String, WellDefinition>,
}

impl LabwareDefinition {
    /// Builds a rectangular definition with `rows` x `columns` identical wells.
    ///
    /// Wells are named `A1`, `B1`, ... with row letters starting at `A`.
    #[must_use]
    pub fn grid(
        load_name: impl Into<String>,
        display_name: impl Into<String>,
        rows: u8,
        columns: u8,
        well_volume: f64,
        is_tiprack: bool,
    ) -> Self {
        let mut ordering = Vec::with_capacity(usize::from(columns));
        let mut wells = BTreeMap::new();
        for column in 1..=columns {
            let mut names = Vec::with_capacity(usize::from(rows));
            for row in 0..rows {
                let name = format!("{}{}", char::from(b'A' + row), column);
                wells.insert(
                    name.clone(),
                    WellDefinition {
                        total_liquid_volume: well_volume,
                    },
                );
                names.push(name);
            }
            ordering.push(names);
        }
        Self {
            load_name: load_name.into(),
            display_name: display_name.into(),
            is_tiprack,
            ordering,
            wells,
        }
    }

    /// Returns true if the definition contains `well`.
    #[must_use]
    pub fn has_well(&self, well: &str) -> bool {
        self.wells.contains_key(well)
    }

    /// Maximum volume of `well`, if it exists.
    #[must_use]
    pub fn well_volume(&self, well: &str) -> Option<f64> {
        self.wells.get(well).map(|w| w.total_liquid_volume)
    }

    /// All wells in column-major order.
    pub fn wells_in_order(&self) -> impl Iterator<Item = &str> {
        self.ordering.iter().flatten().map(String::as_str)
    }

    /// Tip capacity for tip racks: the volume of the first tip slot.
    #[must_use]
    pub fn tip_capacity(&self) -> Option<f64> {
        if !self.is_tiprack {
            return None;
        }
        self.wells_in_order().next().and_then(|w| self.well_volume(w))
    }

    /// Wells touched by a pipette with `channels` channels addressing `well`.
    ///
    /// Single-channel pipettes touch only `well`. Eight-channel pipettes need a
    /// column that fits their tips: a full 8-well column addressed by its first
    /// well, every other well of a 16-well column, or a single-row trough where
    /// all channels share one well. Returns `None` when the labware cannot be
    /// addressed that way.
    #[must_use]
    pub fn wells_for_channels(&self, well: &str, channels: u8) -> Option<Vec<String>> {
        if !self.has_well(well) {
            return None;
        }
        if channels <= 1 {
            return Some(vec![well.to_string()]);
        }
        let column = self.ordering.iter().find(|col| col.iter().any(|w| w == well))?;
        let index = column.iter().position(|w| w == well)?;
        match column.len() {
            1 => Some(vec![well.to_string(); usize::from(channels)]),
            len if len == MULTI_CHANNEL_COUNT && index == 0 => Some(column.clone()),
            len if len == 2 * MULTI_CHANNEL_COUNT && index < 2 => {
                Some(column.iter().skip(index).step_by(2).cloned().collect())
            }
            _ => None,
        }
    }
}

/// A labware loaded in the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareEntity {
    /// Stable labware id.
    pub id: LabwareId,
    /// Static definition.
    pub definition: LabwareDefinition,
    /// Variable name of this labware in generated Python.
    pub python_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate_96() -> LabwareDefinition {
        LabwareDefinition::grid("plate_96", "96 Well Plate", 8, 12, 200.0, false)
    }

    #[test]
    fn grid_builds_column_major_ordering() {
        let def = plate_96();
        assert_eq!(def.wells.len(), 96);
        let first: Vec<_> = def.wells_in_order().take(3).collect();
        assert_eq!(first, vec!["A1", "B1", "C1"]);
        assert_eq!(def.ordering[11][7], "H12");
    }

    #[test]
    fn single_channel_touches_one_well() {
        let def = plate_96();
        assert_eq!(def.wells_for_channels("C4", 1), Some(vec!["C4".to_string()]));
    }

    #[test]
    fn eight_channel_needs_column_top() {
        let def = plate_96();
        let wells = def.wells_for_channels("A2", 8).unwrap();
        assert_eq!(wells.len(), 8);
        assert_eq!(wells[7], "H2");
        assert!(def.wells_for_channels("B2", 8).is_none());
    }

    #[test]
    fn eight_channel_in_trough_shares_the_well() {
        let def = LabwareDefinition::grid("reservoir_12", "12 Well Reservoir", 1, 12, 22_000.0, false);
        let wells = def.wells_for_channels("A3", 8).unwrap();
        assert_eq!(wells, vec!["A3".to_string(); 8]);
    }

    #[test]
    fn eight_channel_in_384_skips_rows() {
        let def = LabwareDefinition::grid("plate_384", "384 Well Plate", 16, 24, 100.0, false);
        let wells = def.wells_for_channels("B1", 8).unwrap();
        assert_eq!(wells.first().map(String::as_str), Some("B1"));
        assert_eq!(wells.get(1).map(String::as_str), Some("D1"));
        assert_eq!(wells.last().map(String::as_str), Some("P1"));
    }

    #[test]
    fn tip_capacity_only_for_tipracks() {
        let rack = LabwareDefinition::grid("tiprack_300", "300 µL Tips", 8, 12, 300.0, true);
        assert_eq!(rack.tip_capacity(), Some(300.0));
        assert_eq!(plate_96().tip_capacity(), None);
    }
}
