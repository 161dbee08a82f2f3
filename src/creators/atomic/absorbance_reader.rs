//! Absorbance plate reader creators.

use serde::{Deserialize, Serialize};

use super::resolve_module_of_kind;
use super::temperature::ModuleOnlyArgs;
use crate::command::{AbsorbanceInitializeParams, AbsorbanceReadParams, Command, ModuleParams};
use crate::creators::{CommandCreatorResult, CommandsAndWarnings};
use crate::entity::{ModuleId, ModuleType};
use crate::error::CommandError;
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::{AbsorbanceMode, RobotState};

/// Most sample wavelengths a multi-mode read can take.
pub const MAX_MULTI_WAVELENGTHS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceInitializeArgs {
    pub module_id: ModuleId,
    pub measure_mode: AbsorbanceMode,
    pub sample_wavelengths: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_wavelength: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReadArgs {
    pub module_id: ModuleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

pub fn absorbance_reader_open_lid(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::AbsorbanceReader)?;
    Ok(CommandsAndWarnings::single(
        Command::AbsorbanceReaderOpenLid(ModuleParams {
            module_id: args.module_id.clone(),
        }),
        python::call(&module.python_name, "open_lid", &[]),
    ))
}

pub fn absorbance_reader_close_lid(
    args: &ModuleOnlyArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::AbsorbanceReader)?;
    Ok(CommandsAndWarnings::single(
        Command::AbsorbanceReaderCloseLid(ModuleParams {
            module_id: args.module_id.clone(),
        }),
        python::call(&module.python_name, "close_lid", &[]),
    ))
}

/// Checks wavelength settings against the measurement mode.
pub fn validate_initialize_settings(args: &AbsorbanceInitializeArgs) -> Result<(), CommandError> {
    let invalid = |reason: &str| {
        Err(CommandError::InvalidAbsorbanceReaderSettings {
            module_id: args.module_id.clone(),
            reason: reason.to_string(),
        })
    };
    match args.measure_mode {
        AbsorbanceMode::Single if args.sample_wavelengths.len() != 1 => {
            invalid("single mode takes exactly one sample wavelength")
        }
        AbsorbanceMode::Multi if args.sample_wavelengths.is_empty() => {
            invalid("multi mode needs at least one sample wavelength")
        }
        AbsorbanceMode::Multi if args.sample_wavelengths.len() > MAX_MULTI_WAVELENGTHS => {
            invalid("multi mode takes at most six sample wavelengths")
        }
        AbsorbanceMode::Multi if args.reference_wavelength.is_some() => {
            invalid("multi mode does not take a reference wavelength")
        }
        AbsorbanceMode::Single | AbsorbanceMode::Multi => Ok(()),
    }
}

/// Configures the reader for subsequent reads.
pub fn absorbance_reader_initialize(
    args: &AbsorbanceInitializeArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::AbsorbanceReader)?;
    validate_initialize_settings(args)?;

    let mut python_args = vec![
        python::format_str(args.measure_mode.as_str()),
        python::format_int_list(&args.sample_wavelengths),
    ];
    if let Some(reference) = args.reference_wavelength {
        python_args.push(python::kwarg("reference_wavelength", reference.to_string()));
    }
    Ok(CommandsAndWarnings::single(
        Command::AbsorbanceReaderInitialize(AbsorbanceInitializeParams {
            module_id: args.module_id.clone(),
            measure_mode: args.measure_mode,
            sample_wavelengths: args.sample_wavelengths.clone(),
            reference_wavelength: args.reference_wavelength,
        }),
        python::call(&module.python_name, "initialize", &python_args),
    ))
}

/// Reads the plate, optionally exporting results to `file_name`.
pub fn absorbance_reader_read(
    args: &AbsorbanceReadArgs,
    invariant: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let module = resolve_module_of_kind(invariant, &args.module_id, ModuleType::AbsorbanceReader)?;
    let python_args: Vec<String> = args
        .file_name
        .iter()
        .map(|name| python::kwarg("export_filename", python::format_str(name)))
        .collect();
    Ok(CommandsAndWarnings::single(
        Command::AbsorbanceReaderRead(AbsorbanceReadParams {
            module_id: args.module_id.clone(),
            file_name: args.file_name.clone(),
        }),
        python::call(&module.python_name, "read", &python_args),
    ))
}
