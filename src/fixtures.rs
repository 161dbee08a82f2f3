//! Shared test fixtures: a fully equipped deck.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration tests and benches.

use crate::entity::{
    AdditionalEquipment, EquipmentId, EquipmentKind, LabwareDefinition, LabwareEntity, LabwareId,
    LiquidEntity, LiquidId, ModuleEntity, ModuleId, ModuleModel, PipetteEntity, PipetteId,
    PipetteSpec,
};
use crate::invariant::InvariantContext;
use crate::state::{InitialDeckSetup, LabwareLocation, ModuleState, RobotState, TemperatureStatus};

pub const TEMPERATURE_MODULE: &str = "temperatureModuleId";
pub const HEATER_SHAKER: &str = "heaterShakerId";
pub const MAGNETIC_MODULE: &str = "magneticModuleId";
pub const MAGNETIC_BLOCK: &str = "magneticBlockId";
pub const THERMOCYCLER: &str = "thermocyclerId";
pub const ABSORBANCE_READER: &str = "absorbanceReaderId";

pub const PIPETTE: &str = "pipetteId";
pub const MULTI_PIPETTE: &str = "multiPipetteId";

pub const TIPRACK: &str = "tiprackId";
pub const MULTI_TIPRACK: &str = "multiTiprackId";
pub const PLATE: &str = "plateId";
pub const RESERVOIR: &str = "reservoirId";
pub const HEATER_SHAKER_PLATE: &str = "heaterShakerPlateId";
pub const THERMOCYCLER_PLATE: &str = "thermocyclerPlateId";
pub const OFF_DECK_PLATE: &str = "offDeckPlateId";

pub const WATER: &str = "waterId";
pub const TRASH: &str = "trashBinId";
pub const GRIPPER: &str = "gripperId";

/// Deck slot nothing starts in.
pub const FREE_SLOT: &str = "A1";
/// Water loaded into `PLATE` well A1, in µL.
pub const PLATE_VOLUME: f64 = 100.0;
/// Water loaded into `RESERVOIR` well A1, in µL.
pub const RESERVOIR_VOLUME: f64 = 10_000.0;

fn labware(id: &str, definition: LabwareDefinition, python_name: &str) -> LabwareEntity {
    LabwareEntity {
        id: LabwareId::new(id),
        definition,
        python_name: python_name.to_string(),
    }
}

fn plate_96() -> LabwareDefinition {
    LabwareDefinition::grid("nest_96_wellplate_200ul_flat", "NEST 96 Well Plate", 8, 12, 200.0, false)
}

fn tiprack_300() -> LabwareDefinition {
    LabwareDefinition::grid("opentrons_96_tiprack_300ul", "Opentrons 96 Tip Rack 300 µL", 8, 12, 300.0, true)
}

/// Invariant context with one module of every kind, two pipettes, plates,
/// tip racks, a trash bin and a gripper.
#[must_use]
pub fn invariant_context() -> InvariantContext {
    InvariantContext::builder()
        .module(ModuleEntity::new(
            TEMPERATURE_MODULE,
            ModuleModel::TemperatureModuleV2,
            "temperature_module_1",
        ))
        .module(ModuleEntity::new(
            HEATER_SHAKER,
            ModuleModel::HeaterShakerModuleV1,
            "heater_shaker_1",
        ))
        .module(ModuleEntity::new(
            MAGNETIC_MODULE,
            ModuleModel::MagneticModuleV2,
            "magnetic_module_1",
        ))
        .module(ModuleEntity::new(
            MAGNETIC_BLOCK,
            ModuleModel::MagneticBlockV1,
            "magnetic_block_1",
        ))
        .module(ModuleEntity::new(
            THERMOCYCLER,
            ModuleModel::ThermocyclerModuleV2,
            "thermocycler_1",
        ))
        .module(ModuleEntity::new(
            ABSORBANCE_READER,
            ModuleModel::AbsorbanceReaderV1,
            "absorbance_module_1",
        ))
        .pipette(PipetteEntity {
            id: PipetteId::new(PIPETTE),
            name: "p300_single_gen2".to_string(),
            spec: PipetteSpec::single_channel(300.0),
            tiprack_ids: vec![LabwareId::new(TIPRACK)],
            python_name: "pipette_left".to_string(),
        })
        .pipette(PipetteEntity {
            id: PipetteId::new(MULTI_PIPETTE),
            name: "p300_multi_gen2".to_string(),
            spec: PipetteSpec::eight_channel(300.0),
            tiprack_ids: vec![LabwareId::new(MULTI_TIPRACK)],
            python_name: "pipette_right".to_string(),
        })
        .labware(labware(TIPRACK, tiprack_300(), "tip_rack_1"))
        .labware(labware(MULTI_TIPRACK, tiprack_300(), "tip_rack_2"))
        .labware(labware(PLATE, plate_96(), "well_plate_1"))
        .labware(labware(
            RESERVOIR,
            LabwareDefinition::grid("nest_12_reservoir_15ml", "NEST 12 Well Reservoir", 1, 12, 15_000.0, false),
            "reservoir_1",
        ))
        .labware(labware(HEATER_SHAKER_PLATE, plate_96(), "well_plate_2"))
        .labware(labware(THERMOCYCLER_PLATE, plate_96(), "well_plate_3"))
        .labware(labware(OFF_DECK_PLATE, plate_96(), "well_plate_4"))
        .liquid(LiquidEntity {
            id: LiquidId::new(WATER),
            display_name: "Water".to_string(),
            python_name: "liquid_1".to_string(),
            display_color: "#50d5ff".to_string(),
        })
        .equipment(AdditionalEquipment {
            id: EquipmentId::new(TRASH),
            kind: EquipmentKind::TrashBin {
                location: "A3".to_string(),
            },
            python_name: "trash_bin_1".to_string(),
        })
        .equipment(AdditionalEquipment {
            id: EquipmentId::new(GRIPPER),
            kind: EquipmentKind::Gripper,
            python_name: "gripper".to_string(),
        })
        .build()
        .expect("fixture context is valid")
}

/// Placement of everything in [`invariant_context`].
#[must_use]
pub fn initial_deck_setup() -> InitialDeckSetup {
    let slot = |s: &str| LabwareLocation::Slot(s.to_string());
    InitialDeckSetup::new()
        .module(THERMOCYCLER, "B1")
        .module(TEMPERATURE_MODULE, "C1")
        .module(HEATER_SHAKER, "D1")
        .module(MAGNETIC_MODULE, "B3")
        .module(MAGNETIC_BLOCK, "C2")
        .module(ABSORBANCE_READER, "D3")
        .labware(TIPRACK, slot("A2"))
        .labware(MULTI_TIPRACK, slot("B2"))
        .labware(PLATE, slot("C3"))
        .labware(RESERVOIR, slot("D2"))
        .labware(HEATER_SHAKER_PLATE, LabwareLocation::Module(ModuleId::new(HEATER_SHAKER)))
        .labware(THERMOCYCLER_PLATE, LabwareLocation::Module(ModuleId::new(THERMOCYCLER)))
        .labware(OFF_DECK_PLATE, LabwareLocation::OffDeck)
        .liquid(PLATE, "A1", WATER, PLATE_VOLUME)
        .liquid(RESERVOIR, "A1", WATER, RESERVOIR_VOLUME)
}

/// Starting state for `invariant` placed by [`initial_deck_setup`].
#[must_use]
pub fn initial_robot_state(invariant: &InvariantContext) -> RobotState {
    RobotState::initial(invariant, &initial_deck_setup()).expect("fixture deck is valid")
}

/// Starting state with one module's live state replaced.
#[must_use]
pub fn with_module_state(invariant: &InvariantContext, module_id: &str, state: ModuleState) -> RobotState {
    let mut robot_state = initial_robot_state(invariant);
    if let Some(props) = robot_state.modules_mut().get_mut(&ModuleId::new(module_id)) {
        props.module_state = state;
    }
    robot_state
}

/// Starting state with a temperature module or heater-shaker at `status`
/// towards `celsius`.
#[must_use]
pub fn with_temperature(
    invariant: &InvariantContext,
    module_id: &str,
    status: TemperatureStatus,
    celsius: f64,
) -> RobotState {
    let target = Some(celsius);
    let state = match invariant.module(&ModuleId::new(module_id)).map(|m| m.module_type) {
        Some(crate::entity::ModuleType::HeaterShaker) => ModuleState::HeaterShaker {
            status,
            target_temperature: target,
            target_speed: None,
            latch_open: None,
        },
        _ => ModuleState::TemperatureModule {
            status,
            target_temperature: target,
        },
    };
    with_module_state(invariant, module_id, state)
}
