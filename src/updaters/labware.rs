//! Labware location transitions.

use crate::command::MoveLabwareParams;
use crate::state::RobotState;

pub(super) fn move_labware(state: &mut RobotState, params: &MoveLabwareParams) {
    state
        .labware_mut()
        .insert(params.labware_id.clone(), params.new_location.clone());
}
