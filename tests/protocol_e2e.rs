use stepgen::creators::atomic::{
    AbsorbanceInitializeArgs, DelayArgs, ModuleOnlyArgs, ModuleTemperatureArgs,
};
use stepgen::creators::compound::{AbsorbanceCloseReadArgs, ChangeTip, TransferArgs};
use stepgen::fixtures;
use stepgen::state::{total_volume, AbsorbanceMode};
use stepgen::{
    steps_from_json, ErrorType, InvariantContext, LabwareId, ModuleId, ModuleState, PipetteId,
    RobotState, StepArgs, TemperatureStatus, Timeline, TimelineConfig,
};

fn setup() -> (InvariantContext, RobotState) {
    let ctx = fixtures::invariant_context();
    let state = fixtures::initial_robot_state(&ctx);
    (ctx, state)
}

fn set_temperature(module: &str, celsius: f64) -> StepArgs {
    StepArgs::SetTemperature(ModuleTemperatureArgs {
        module_id: ModuleId::new(module),
        celsius,
    })
}

fn wait_for_temperature(module: &str, celsius: f64) -> StepArgs {
    StepArgs::WaitForTemperature(ModuleTemperatureArgs {
        module_id: ModuleId::new(module),
        celsius,
    })
}

#[test]
fn missing_module_emits_nothing_and_keeps_state() {
    let (ctx, state) = setup();
    let timeline = Timeline::assemble(
        &[set_temperature("unknownModuleId", 42.0)],
        &ctx,
        &state,
        &TimelineConfig::default(),
    )
    .unwrap();

    assert_eq!(timeline.all_commands().count(), 0);
    assert_eq!(timeline.python(), "");
    assert_eq!(timeline.errors().len(), 1);
    assert_eq!(timeline.errors()[0].errors[0].error_type(), ErrorType::MissingModule);
    assert_eq!(timeline.final_robot_state(), &state);
}

#[test]
fn set_temperature_command_and_python() {
    let (ctx, state) = setup();
    let timeline = Timeline::assemble(
        &[set_temperature(fixtures::TEMPERATURE_MODULE, 42.0)],
        &ctx,
        &state,
        &TimelineConfig::default(),
    )
    .unwrap();

    let commands: Vec<_> = timeline.all_commands().collect();
    assert_eq!(commands.len(), 1);
    let json = serde_json::to_value(commands[0]).unwrap();
    assert_eq!(json["commandType"], "temperatureModule/setTargetTemperature");
    assert_eq!(json["params"]["moduleId"], fixtures::TEMPERATURE_MODULE);
    assert_eq!(json["params"]["celsius"], 42.0);
    assert_eq!(timeline.python(), "temperature_module_1.start_set_temperature(42)");
}

#[test]
fn waiting_at_target_is_idempotent() {
    let ctx = fixtures::invariant_context();
    let state = fixtures::with_temperature(&ctx, fixtures::TEMPERATURE_MODULE, TemperatureStatus::AtTarget, 42.0);
    let steps = [
        wait_for_temperature(fixtures::TEMPERATURE_MODULE, 42.0),
        wait_for_temperature(fixtures::TEMPERATURE_MODULE, 42.0),
    ];
    let timeline = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::default()).unwrap();

    assert!(!timeline.has_errors());
    assert_eq!(timeline.frames().len(), 2);
    assert_eq!(timeline.final_robot_state(), &state);
}

#[test]
fn waiting_without_a_target_fails() {
    let (ctx, state) = setup();
    let timeline = Timeline::assemble(
        &[wait_for_temperature(fixtures::TEMPERATURE_MODULE, 42.0)],
        &ctx,
        &state,
        &TimelineConfig::default(),
    )
    .unwrap();
    assert_eq!(
        timeline.errors()[0].errors[0].error_type(),
        ErrorType::MissingTemperatureStep
    );
}

#[test]
fn heater_shaker_wait_has_bare_python_call() {
    let (ctx, state) = setup();
    let steps = [
        set_temperature(fixtures::HEATER_SHAKER, 37.0),
        wait_for_temperature(fixtures::HEATER_SHAKER, 37.0),
    ];
    let timeline = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::default()).unwrap();

    assert_eq!(
        timeline.python(),
        "heater_shaker_1.set_target_temperature(37)\nheater_shaker_1.wait_for_temperature()"
    );
    assert!(matches!(
        timeline
            .final_robot_state()
            .module_state(&ModuleId::new(fixtures::HEATER_SHAKER)),
        Some(ModuleState::HeaterShaker {
            status: TemperatureStatus::AtTarget,
            ..
        })
    ));
}

#[test]
fn close_read_with_and_without_file_name() {
    let (ctx, state) = setup();
    let reader = ModuleId::new(fixtures::ABSORBANCE_READER);
    let steps = [
        StepArgs::AbsorbanceReaderCloseRead(AbsorbanceCloseReadArgs {
            module_id: reader.clone(),
            file_name: Some("od600.csv".to_string()),
        }),
        StepArgs::AbsorbanceReaderCloseRead(AbsorbanceCloseReadArgs {
            module_id: reader,
            file_name: None,
        }),
    ];
    let timeline = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::default()).unwrap();

    assert_eq!(
        timeline.frames()[0].python.as_deref(),
        Some("absorbance_module_1.close_lid()\nabsorbance_module_1.read(export_filename=\"od600.csv\")")
    );
    assert_eq!(
        timeline.frames()[1].python.as_deref(),
        Some("absorbance_module_1.close_lid()\nabsorbance_module_1.read()")
    );
}

#[test]
fn initialize_leaves_reader_lid_closed() {
    let ctx = fixtures::invariant_context();
    let state = fixtures::with_module_state(
        &ctx,
        fixtures::ABSORBANCE_READER,
        ModuleState::AbsorbanceReader {
            lid_open: true,
            initialization: None,
        },
    );
    let steps = [StepArgs::AbsorbanceReaderInitialize(AbsorbanceInitializeArgs {
        module_id: ModuleId::new(fixtures::ABSORBANCE_READER),
        measure_mode: AbsorbanceMode::Single,
        sample_wavelengths: vec![600],
        reference_wavelength: None,
    })];
    let timeline = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::default()).unwrap();

    let reader = timeline
        .final_robot_state()
        .module_state(&ModuleId::new(fixtures::ABSORBANCE_READER));
    let Some(ModuleState::AbsorbanceReader {
        lid_open,
        initialization,
    }) = reader
    else {
        panic!("expected absorbance reader state");
    };
    assert!(!lid_open);
    assert_eq!(initialization.as_ref().map(|i| i.wavelengths.clone()), Some(vec![600]));
}

#[test]
fn transfer_moves_liquid_and_discards_tip() {
    let (ctx, state) = setup();
    let steps = [StepArgs::Transfer(TransferArgs {
        pipette_id: PipetteId::new(fixtures::PIPETTE),
        volume: 50.0,
        source_labware_id: LabwareId::new(fixtures::RESERVOIR),
        source_wells: vec!["A1".to_string()],
        dest_labware_id: LabwareId::new(fixtures::PLATE),
        dest_wells: vec!["B1".to_string()],
        change_tip: ChangeTip::Always,
        tiprack_id: None,
        aspirate_flow_rate: None,
        dispense_flow_rate: None,
        aspirate_offset_from_bottom_mm: None,
        dispense_offset_from_bottom_mm: None,
    })];
    let timeline = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::default()).unwrap();
    assert!(!timeline.has_errors());

    let end = timeline.final_robot_state();
    let liquid = end.liquid_state();
    let reservoir = total_volume(&liquid.well(&LabwareId::new(fixtures::RESERVOIR), "A1"));
    let dest = total_volume(&liquid.well(&LabwareId::new(fixtures::PLATE), "B1"));
    assert!((reservoir - (fixtures::RESERVOIR_VOLUME - 50.0)).abs() < 1e-9);
    assert!((dest - 50.0).abs() < 1e-9);
    assert!(!end.tip_state().has_tip(&PipetteId::new(fixtures::PIPETTE)));
}

#[test]
fn halt_and_continue_policies() {
    let (ctx, state) = setup();
    let steps = [
        StepArgs::DeactivateTemperature(ModuleOnlyArgs {
            module_id: ModuleId::new(fixtures::MAGNETIC_BLOCK),
        }),
        StepArgs::Delay(DelayArgs {
            seconds: 30.0,
            message: None,
        }),
    ];

    let halted = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::default()).unwrap();
    assert!(halted.frames().is_empty());
    assert_eq!(halted.errors().len(), 1);

    let continued = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::continue_on_error()).unwrap();
    assert_eq!(continued.frames().len(), 1);
    assert_eq!(continued.python(), "protocol.delay(seconds=30)");
}

#[test]
fn assembly_is_deterministic() {
    let (ctx, state) = setup();
    let steps = steps_from_json(
        r#"[
            {"commandCreatorFnName": "setTemperature", "moduleId": "temperatureModuleId", "celsius": 4},
            {"commandCreatorFnName": "waitForTemperature", "moduleId": "temperatureModuleId", "celsius": 4},
            {"commandCreatorFnName": "replaceTip", "pipetteId": "pipetteId"},
            {"commandCreatorFnName": "aspirate", "pipetteId": "pipetteId", "labwareId": "plateId", "wellName": "A1", "volume": 20},
            {"commandCreatorFnName": "dispense", "pipetteId": "pipetteId", "labwareId": "plateId", "wellName": "A2", "volume": 20},
            {"commandCreatorFnName": "dropTip", "pipetteId": "pipetteId"}
        ]"#,
    )
    .unwrap();

    let first = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::default()).unwrap();
    let second = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::default()).unwrap();

    assert!(!first.has_errors());
    assert_eq!(first, second);
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    assert_eq!(
        stepgen::to_json_pretty(&first).unwrap(),
        stepgen::to_json_pretty(&second).unwrap()
    );
}

#[test]
fn every_module_step_rejects_an_unknown_module() {
    let (ctx, state) = setup();
    let steps = steps_from_json(
        r#"[
            {"commandCreatorFnName": "setTemperature", "moduleId": "ghost", "celsius": 4},
            {"commandCreatorFnName": "waitForTemperature", "moduleId": "ghost", "celsius": 4},
            {"commandCreatorFnName": "deactivateTemperature", "moduleId": "ghost"},
            {"commandCreatorFnName": "engageMagnet", "moduleId": "ghost", "height": 10},
            {"commandCreatorFnName": "disengageMagnet", "moduleId": "ghost"},
            {"commandCreatorFnName": "heaterShakerSetShakeSpeed", "moduleId": "ghost", "rpm": 500},
            {"commandCreatorFnName": "heaterShakerStopShake", "moduleId": "ghost"},
            {"commandCreatorFnName": "heaterShakerOpenLatch", "moduleId": "ghost"},
            {"commandCreatorFnName": "heaterShakerCloseLatch", "moduleId": "ghost"},
            {"commandCreatorFnName": "heaterShakerStep", "moduleId": "ghost", "targetTemperature": 37, "latchOpen": false},
            {"commandCreatorFnName": "thermocyclerSetBlockTemperature", "moduleId": "ghost", "celsius": 95},
            {"commandCreatorFnName": "thermocyclerSetLidTemperature", "moduleId": "ghost", "celsius": 105},
            {"commandCreatorFnName": "thermocyclerWaitForBlockTemperature", "moduleId": "ghost"},
            {"commandCreatorFnName": "thermocyclerWaitForLidTemperature", "moduleId": "ghost"},
            {"commandCreatorFnName": "thermocyclerDeactivateBlock", "moduleId": "ghost"},
            {"commandCreatorFnName": "thermocyclerDeactivateLid", "moduleId": "ghost"},
            {"commandCreatorFnName": "thermocyclerOpenLid", "moduleId": "ghost"},
            {"commandCreatorFnName": "thermocyclerCloseLid", "moduleId": "ghost"},
            {"commandCreatorFnName": "thermocyclerRunProfile", "moduleId": "ghost",
             "profile": [{"celsius": 95, "holdSeconds": 30}], "blockMaxVolumeUl": 50},
            {"commandCreatorFnName": "thermocyclerStateStep", "moduleId": "ghost", "blockTargetTemp": 4, "lidOpen": true},
            {"commandCreatorFnName": "thermocyclerProfileStep", "moduleId": "ghost",
             "profile": [{"celsius": 95, "holdSeconds": 30}], "blockMaxVolumeUl": 50,
             "profileTargetLidTemp": 105, "endState": {"blockTargetTemp": 4, "lidOpen": true}},
            {"commandCreatorFnName": "absorbanceReaderOpenLid", "moduleId": "ghost"},
            {"commandCreatorFnName": "absorbanceReaderCloseLid", "moduleId": "ghost"},
            {"commandCreatorFnName": "absorbanceReaderInitialize", "moduleId": "ghost",
             "measureMode": "single", "sampleWavelengths": [450]},
            {"commandCreatorFnName": "absorbanceReaderRead", "moduleId": "ghost"},
            {"commandCreatorFnName": "absorbanceReaderCloseRead", "moduleId": "ghost"},
            {"commandCreatorFnName": "absorbanceReaderCloseInitialize", "moduleId": "ghost",
             "measureMode": "single", "sampleWavelengths": [450]}
        ]"#,
    )
    .unwrap();
    assert_eq!(steps.len(), 27);

    for step in &steps {
        let err = step.create(&ctx, &state).unwrap_err();
        let types: Vec<_> = err.errors.iter().map(|e| e.error_type()).collect();
        assert_eq!(types, vec![ErrorType::MissingModule], "{}", step.creator_name());
    }

    let timeline = Timeline::assemble(&steps, &ctx, &state, &TimelineConfig::continue_on_error()).unwrap();
    assert_eq!(timeline.all_commands().count(), 0);
    assert_eq!(timeline.errors().len(), 27);
    assert_eq!(timeline.final_robot_state(), &state);
}
