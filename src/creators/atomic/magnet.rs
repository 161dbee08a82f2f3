//! Magnetic module creators.

use serde::{Deserialize, Serialize};

use super::resolve_module_of_kind;
use super::temperature::ModuleOnlyArgs;
use crate::command::{Command, EngageMagnetParams, ModuleParams};
use crate::creators::{CommandCreatorResult, CommandsAndWarnings};
use crate::entity::{ModuleId, ModuleType};
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::RobotState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngageMagnetArgs {
    pub module_id: ModuleId,
    /// Height above the labware base, in mm.
    pub height: f64,
}

pub fn engage_magnet(
    args: &EngageMagnetArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::MagneticModule)?;
    Ok(CommandsAndWarnings::single(
        Command::MagneticModuleEngage(EngageMagnetParams {
            module_id: args.module_id.clone(),
            height: args.height,
        }),
        python::call(
            &module.python_name,
            "engage",
            &[python::kwarg("height_from_base", python::format_number(args.height))],
        ),
    ))
}

pub fn disengage_magnet(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::MagneticModule)?;
    Ok(CommandsAndWarnings::single(
        Command::MagneticModuleDisengage(ModuleParams {
            module_id: args.module_id.clone(),
        }),
        python::call(&module.python_name, "disengage", &[]),
    ))
}
