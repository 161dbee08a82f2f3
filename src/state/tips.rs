//! Tip tracking: which tips are still in their racks and which pipettes hold one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{LabwareDefinition, LabwareId, PipetteId};

/// Tip presence in racks and on pipettes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipState {
    /// Per tip rack, per well: `true` while the tip is still in the rack.
    pub tipracks: BTreeMap<LabwareId, BTreeMap<String, bool>>,
    /// Per pipette: `true` while a tip is attached.
    pub pipettes: BTreeMap<PipetteId, bool>,
}

impl TipState {
    /// Returns true if `pipette` currently holds a tip.
    #[must_use]
    pub fn has_tip(&self, pipette: &PipetteId) -> bool {
        self.pipettes.get(pipette).copied().unwrap_or(false)
    }

    /// Returns true if every well in `wells` of `tiprack` still has its tip.
    #[must_use]
    pub fn tips_present<S: AsRef<str>>(&self, tiprack: &LabwareId, wells: &[S]) -> bool {
        let Some(rack) = self.tipracks.get(tiprack) else {
            return false;
        };
        !wells.is_empty()
            && wells
                .iter()
                .all(|w| rack.get(w.as_ref()).copied().unwrap_or(false))
    }

    /// The well a pipette with `channels` channels should pick up from next,
    /// scanning the rack column by column.
    ///
    /// Multi-channel pipettes need a complete column of tips.
    #[must_use]
    pub fn next_tip_well(
        &self,
        tiprack: &LabwareId,
        definition: &LabwareDefinition,
        channels: u8,
    ) -> Option<String> {
        let rack = self.tipracks.get(tiprack)?;
        let present = |well: &String| rack.get(well).copied().unwrap_or(false);
        if channels <= 1 {
            return definition.ordering.iter().flatten().find(|w| present(*w)).cloned();
        }
        definition
            .ordering
            .iter()
            .filter(|column| column.len() == usize::from(channels))
            .find(|column| column.iter().all(present))
            .and_then(|column| column.first().cloned())
    }

    pub(crate) fn mark_used(&mut self, tiprack: &LabwareId, wells: &[String]) {
        let rack = self.tipracks.entry(tiprack.clone()).or_default();
        for well in wells {
            rack.insert(well.clone(), false);
        }
    }

    pub(crate) fn set_attached(&mut self, pipette: &PipetteId, attached: bool) {
        self.pipettes.insert(pipette.clone(), attached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_rack(def: &LabwareDefinition) -> TipState {
        let mut tips = TipState::default();
        let wells = def.wells_in_order().map(|w| (w.to_string(), true)).collect();
        tips.tipracks.insert(LabwareId::new("rack"), wells);
        tips
    }

    #[test]
    fn single_channel_takes_first_available_tip() {
        let def = LabwareDefinition::grid("tips", "Tips", 8, 12, 300.0, true);
        let mut tips = full_rack(&def);
        let rack = LabwareId::new("rack");
        assert_eq!(tips.next_tip_well(&rack, &def, 1).as_deref(), Some("A1"));
        tips.mark_used(&rack, &["A1".to_string()]);
        assert_eq!(tips.next_tip_well(&rack, &def, 1).as_deref(), Some("B1"));
    }

    #[test]
    fn multi_channel_skips_partial_columns() {
        let def = LabwareDefinition::grid("tips", "Tips", 8, 12, 300.0, true);
        let mut tips = full_rack(&def);
        let rack = LabwareId::new("rack");
        tips.mark_used(&rack, &["A1".to_string()]);
        assert_eq!(tips.next_tip_well(&rack, &def, 8).as_deref(), Some("A2"));
    }

    #[test]
    fn empty_rack_has_no_next_tip() {
        let def = LabwareDefinition::grid("tips", "Tips", 1, 2, 300.0, true);
        let mut tips = full_rack(&def);
        let rack = LabwareId::new("rack");
        tips.mark_used(&rack, &["A1".to_string(), "A2".to_string()]);
        assert!(tips.next_tip_well(&rack, &def, 1).is_none());
        assert!(!tips.tips_present(&rack, &["A1"]));
    }

    #[test]
    fn attachment_defaults_to_false() {
        let mut tips = TipState::default();
        let pipette = PipetteId::new("p");
        assert!(!tips.has_tip(&pipette));
        tips.set_attached(&pipette, true);
        assert!(tips.has_tip(&pipette));
    }
}
