//! Module state transitions.

use tracing::error;

use crate::command::{AbsorbanceInitializeParams, BlockTemperatureParams, TemperatureParams};
use crate::entity::{ModuleId, ModuleType};
use crate::state::{AbsorbanceInitialization, ModuleState, RobotState, TemperatureStatus};

/// Applies `update` to a module's live state.
///
/// A state of the wrong kind is reset to the power-on state of `expected`
/// before the update. A module missing from the state is left alone.
fn update_module<F>(state: &mut RobotState, module_id: &ModuleId, expected: ModuleType, update: F)
where
    F: FnOnce(&mut ModuleState),
{
    if !state.modules().contains_key(module_id) {
        error!(module_id = %module_id, expected = %expected, "module has no live state");
        return;
    }
    let Some(props) = state.modules_mut().get_mut(module_id) else {
        return;
    };
    let found = props.module_state.module_type();
    if found != expected {
        error!(
            module_id = %module_id,
            expected = %expected,
            found = %found,
            "module state has the wrong kind, resetting to defaults"
        );
        props.module_state = ModuleState::initial(expected);
    }
    update(&mut props.module_state);
}

pub(super) fn set_temperature(state: &mut RobotState, params: &TemperatureParams, kind: ModuleType) {
    let celsius = params.celsius;
    update_module(state, &params.module_id, kind, |module| {
        if let ModuleState::TemperatureModule {
            status,
            target_temperature,
        }
        | ModuleState::HeaterShaker {
            status,
            target_temperature,
            ..
        } = module
        {
            *status = TemperatureStatus::ApproachingTarget;
            *target_temperature = Some(celsius);
        }
    });
}

pub(super) fn await_temperature(state: &mut RobotState, module_id: &ModuleId, kind: ModuleType) {
    update_module(state, module_id, kind, |module| {
        if let ModuleState::TemperatureModule { status, .. } | ModuleState::HeaterShaker { status, .. } =
            module
        {
            *status = TemperatureStatus::AtTarget;
        }
    });
}

pub(super) fn deactivate_temperature(state: &mut RobotState, module_id: &ModuleId, kind: ModuleType) {
    update_module(state, module_id, kind, |module| {
        if let ModuleState::TemperatureModule {
            status,
            target_temperature,
        }
        | ModuleState::HeaterShaker {
            status,
            target_temperature,
            ..
        } = module
        {
            *status = TemperatureStatus::Deactivated;
            *target_temperature = None;
        }
    });
}

pub(super) fn set_shake_speed(state: &mut RobotState, module_id: &ModuleId, rpm: Option<f64>) {
    update_module(state, module_id, ModuleType::HeaterShaker, |module| {
        if let ModuleState::HeaterShaker { target_speed, .. } = module {
            *target_speed = rpm;
        }
    });
}

pub(super) fn set_latch(state: &mut RobotState, module_id: &ModuleId, open: bool) {
    update_module(state, module_id, ModuleType::HeaterShaker, |module| {
        if let ModuleState::HeaterShaker { latch_open, .. } = module {
            *latch_open = Some(open);
        }
    });
}

pub(super) fn set_magnet(state: &mut RobotState, module_id: &ModuleId, engage: bool) {
    update_module(state, module_id, ModuleType::MagneticModule, |module| {
        if let ModuleState::MagneticModule { engaged } = module {
            *engaged = engage;
        }
    });
}

pub(super) fn set_block_temperature(state: &mut RobotState, params: &BlockTemperatureParams) {
    set_block_target(state, &params.module_id, Some(params.celsius));
}

pub(super) fn set_block_target(state: &mut RobotState, module_id: &ModuleId, celsius: Option<f64>) {
    update_module(state, module_id, ModuleType::Thermocycler, |module| {
        if let ModuleState::Thermocycler {
            block_target_temp, ..
        } = module
        {
            *block_target_temp = celsius;
        }
    });
}

pub(super) fn set_lid_target(state: &mut RobotState, module_id: &ModuleId, celsius: Option<f64>) {
    update_module(state, module_id, ModuleType::Thermocycler, |module| {
        if let ModuleState::Thermocycler {
            lid_target_temp, ..
        } = module
        {
            *lid_target_temp = celsius;
        }
    });
}

pub(super) fn set_thermocycler_lid(state: &mut RobotState, module_id: &ModuleId, open: bool) {
    update_module(state, module_id, ModuleType::Thermocycler, |module| {
        if let ModuleState::Thermocycler { lid_open, .. } = module {
            *lid_open = Some(open);
        }
    });
}

pub(super) fn set_reader_lid(state: &mut RobotState, module_id: &ModuleId, open: bool) {
    update_module(state, module_id, ModuleType::AbsorbanceReader, |module| {
        if let ModuleState::AbsorbanceReader { lid_open, .. } = module {
            *lid_open = open;
        }
    });
}

pub(super) fn initialize_reader(state: &mut RobotState, params: &AbsorbanceInitializeParams) {
    let settings = AbsorbanceInitialization {
        mode: params.measure_mode,
        wavelengths: params.sample_wavelengths.clone(),
        reference_wavelength: params.reference_wavelength,
    };
    update_module(state, &params.module_id, ModuleType::AbsorbanceReader, |module| {
        if let ModuleState::AbsorbanceReader {
            lid_open,
            initialization,
        } = module
        {
            *lid_open = false;
            *initialization = Some(settings);
        }
    });
}
