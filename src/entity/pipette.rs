//! Pipette entities.

use serde::{Deserialize, Serialize};

use super::{LabwareId, PipetteId};

/// Physical capabilities of a pipette model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteSpec {
    /// Number of channels (1 or 8).
    pub channels: u8,
    /// Maximum volume in µL the pipette can hold.
    pub max_volume: f64,
    /// Minimum volume in µL the pipette can accurately move.
    pub min_volume: f64,
    /// Default aspirate flow rate in µL/s.
    pub default_aspirate_flow_rate: f64,
    /// Default dispense flow rate in µL/s.
    pub default_dispense_flow_rate: f64,
}

impl PipetteSpec {
    /// Spec for a single-channel pipette with the given max volume.
    #[must_use]
    pub fn single_channel(max_volume: f64) -> Self {
        Self::with_channels(1, max_volume)
    }

    /// Spec for an eight-channel pipette with the given max volume.
    #[must_use]
    pub fn eight_channel(max_volume: f64) -> Self {
        Self::with_channels(8, max_volume)
    }

    fn with_channels(channels: u8, max_volume: f64) -> Self {
        // Flow rates scale with pipette size on the real hardware.
        let flow_rate = (max_volume / 3.0).clamp(1.0, 160.0);
        Self {
            channels,
            max_volume,
            min_volume: max_volume / 20.0,
            default_aspirate_flow_rate: flow_rate,
            default_dispense_flow_rate: flow_rate,
        }
    }
}

/// A pipette mounted for this protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteEntity {
    /// Stable pipette id.
    pub id: PipetteId,
    /// Pipette model name, e.g. `p300_single_gen2`.
    pub name: String,
    /// Capabilities.
    pub spec: PipetteSpec,
    /// Tip racks this pipette draws tips from, in priority order.
    pub tiprack_ids: Vec<LabwareId>,
    /// Variable name of this pipette in generated Python.
    pub python_name: String,
}

impl PipetteEntity {
    /// Number of channels.
    #[must_use]
    pub const fn channels(&self) -> u8 {
        self.spec.channels
    }
}
