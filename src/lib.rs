//! # stepgen
//!
//! Deterministic step generation for liquid-handling robots.
//!
//! A protocol is a list of steps. Each step is lowered by a *command creator*
//! into robot commands plus the equivalent lines of a Python protocol, after
//! checking its preconditions against a simulated robot state. The simulated
//! state is then advanced command by command, so later steps validate against
//! what earlier ones left behind.
//!
//! ## Core Concepts
//!
//! - **InvariantContext**: the protocol's fixed equipment (pipettes, labware, modules)
//! - **RobotState**: the mutable simulation (tips, liquid, labware locations, module states)
//! - **Creator**: pure function `(args, invariant, state) -> commands | errors`
//! - **Updater**: pure function `(command, invariant, state) -> state + warnings`
//! - **Timeline**: the per-step frames produced by running a whole protocol
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stepgen::{steps_from_json, Timeline, TimelineConfig};
//!
//! let steps = steps_from_json(json)?;
//! let initial = RobotState::initial(&invariant, &deck)?;
//! let timeline = Timeline::assemble(&steps, &invariant, &initial, &TimelineConfig::default())?;
//! println!("{}", timeline.python());
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod command;
pub mod config;
pub mod entity;
pub mod error;
pub mod invariant;
pub mod python;
pub mod state;

// Generation and simulation
pub mod creators;
pub mod timeline;
pub mod updaters;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

// Re-export primary types at crate root for convenience
pub use command::Command;
pub use config::{ContinuationPolicy, TimelineConfig};
pub use creators::{
    curry, curry_without_python, reduce_command_creators, CommandCreatorErrors,
    CommandCreatorResult, CommandsAndWarnings,
};
pub use entity::{LabwareId, ModuleId, ModuleType, PipetteId};
pub use error::{
    CommandError, CommandWarning, ConfigError, ErrorType, SetupError, StepGenError, StepGenResult,
    WarningType,
};
pub use invariant::InvariantContext;
pub use state::{InitialDeckSetup, ModuleState, RobotState, RobotStateAndWarnings, TemperatureStatus};
pub use timeline::{steps_from_json, to_json_pretty, StepArgs, StepErrors, Timeline, TimelineFrame};
pub use updaters::next_robot_state_and_warnings;
