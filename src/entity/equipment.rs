//! Liquids and additional equipment.

use serde::{Deserialize, Serialize};

use super::{EquipmentId, LiquidId};

/// A user-defined liquid tracked through the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidEntity {
    /// Stable liquid id.
    pub id: LiquidId,
    /// Name shown to the user.
    pub display_name: String,
    /// Variable name of this liquid in generated Python.
    pub python_name: String,
    /// Display color as a hex string.
    pub display_color: String,
}

/// Kind of non-module equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum EquipmentKind {
    /// Labware gripper; required for gripper moves.
    Gripper,
    /// Movable trash bin standing in a deck slot.
    TrashBin {
        /// Deck slot holding the bin, e.g. `A3`.
        location: String,
    },
    /// Waste chute mounted on the deck edge.
    WasteChute,
}

/// Equipment that is neither a module, pipette nor labware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalEquipment {
    /// Stable equipment id.
    pub id: EquipmentId,
    /// What the equipment is.
    pub kind: EquipmentKind,
    /// Variable name of this equipment in generated Python.
    pub python_name: String,
}

impl AdditionalEquipment {
    /// True for equipment tips can be dropped into.
    #[must_use]
    pub const fn accepts_tips(&self) -> bool {
        matches!(self.kind, EquipmentKind::TrashBin { .. } | EquipmentKind::WasteChute)
    }

    /// Addressable area a pipette moves to before dropping tips here.
    #[must_use]
    pub fn drop_tip_area(&self, channels: u8) -> Option<String> {
        match &self.kind {
            EquipmentKind::TrashBin { location } => Some(format!("movableTrash{location}")),
            EquipmentKind::WasteChute if channels > 1 => Some("8ChannelWasteChute".to_string()),
            EquipmentKind::WasteChute => Some("1ChannelWasteChute".to_string()),
            EquipmentKind::Gripper => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trash_bin_area_follows_slot() {
        let trash = AdditionalEquipment {
            id: EquipmentId::new("trash"),
            kind: EquipmentKind::TrashBin {
                location: "A3".to_string(),
            },
            python_name: "trash".to_string(),
        };
        assert!(trash.accepts_tips());
        assert_eq!(trash.drop_tip_area(1).as_deref(), Some("movableTrashA3"));
    }

    #[test]
    fn waste_chute_area_depends_on_channels() {
        let chute = AdditionalEquipment {
            id: EquipmentId::new("chute"),
            kind: EquipmentKind::WasteChute,
            python_name: "waste_chute".to_string(),
        };
        assert_eq!(chute.drop_tip_area(8).as_deref(), Some("8ChannelWasteChute"));
        assert_eq!(chute.drop_tip_area(1).as_deref(), Some("1ChannelWasteChute"));
    }

    #[test]
    fn gripper_is_not_a_trash() {
        let gripper = AdditionalEquipment {
            id: EquipmentId::new("gripper"),
            kind: EquipmentKind::Gripper,
            python_name: "gripper".to_string(),
        };
        assert!(!gripper.accepts_tips());
        assert!(gripper.drop_tip_area(1).is_none());
    }
}
