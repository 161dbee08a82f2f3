//! Timeline assembly: runs protocol steps in order against a simulated robot.
//!
//! Each successful step yields a [`TimelineFrame`] holding its commands,
//! warnings, Python and the robot state after it ran. A failing step yields
//! [`StepErrors`] and leaves the state unchanged; what happens next depends on
//! the [`ContinuationPolicy`].

mod steps;

pub use steps::StepArgs;

use blake3::Hasher;
use serde::Serialize;
use tracing::{debug, warn};

use crate::command::Command;
use crate::config::{ContinuationPolicy, TimelineConfig};
use crate::error::{CommandError, CommandWarning, StepGenResult};
use crate::invariant::InvariantContext;
use crate::python;
use crate::state::RobotState;
use crate::updaters::next_robot_state_and_warnings;

/// The outcome of one successful step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFrame {
    /// Position of the step in the protocol.
    pub step_index: usize,
    /// Creator the step was tagged with.
    pub creator_name: &'static str,
    /// Emitted commands, in execution order.
    pub commands: Vec<Command>,
    /// Creator warnings followed by state-update warnings.
    pub warnings: Vec<CommandWarning>,
    /// Python for the step; `None` when it emitted nothing.
    pub python: Option<String>,
    /// Robot state once every command in the step has run.
    pub robot_state: RobotState,
}

/// The outcome of one failed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepErrors {
    pub step_index: usize,
    pub creator_name: &'static str,
    pub errors: Vec<CommandError>,
    pub warnings: Vec<CommandWarning>,
}

/// An assembled protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    frames: Vec<TimelineFrame>,
    errors: Vec<StepErrors>,
    final_robot_state: RobotState,
}

impl Timeline {
    /// Runs `steps` from `initial_state`.
    ///
    /// Fails only when the config is unusable; step failures are recorded in
    /// the returned timeline.
    pub fn assemble(
        steps: &[StepArgs],
        invariant: &InvariantContext,
        initial_state: &RobotState,
        config: &TimelineConfig,
    ) -> StepGenResult<Self> {
        config.validate()?;
        config.check_step_count(steps.len())?;

        let mut state = initial_state.clone();
        let mut frames = Vec::with_capacity(steps.len());
        let mut errors = Vec::new();

        for (step_index, step) in steps.iter().enumerate() {
            let creator_name = step.creator_name();
            match step.create(invariant, &state) {
                Ok(out) => {
                    let mut warnings = out.warnings;
                    for command in &out.commands {
                        let next = next_robot_state_and_warnings(command, invariant, &state);
                        state = next.robot_state;
                        warnings.extend(next.warnings);
                    }
                    debug!(
                        step_index,
                        creator = creator_name,
                        commands = out.commands.len(),
                        warnings = warnings.len(),
                        "step assembled"
                    );
                    frames.push(TimelineFrame {
                        step_index,
                        creator_name,
                        commands: out.commands,
                        warnings,
                        python: out.python,
                        robot_state: state.clone(),
                    });
                }
                Err(failure) => {
                    warn!(
                        step_index,
                        creator = creator_name,
                        errors = failure.errors.len(),
                        "step failed"
                    );
                    errors.push(StepErrors {
                        step_index,
                        creator_name,
                        errors: failure.errors,
                        warnings: failure.warnings,
                    });
                    if config.continuation == ContinuationPolicy::Halt {
                        break;
                    }
                }
            }
        }

        Ok(Self {
            frames,
            errors,
            final_robot_state: state,
        })
    }

    /// Frames of the steps that succeeded.
    #[must_use]
    pub fn frames(&self) -> &[TimelineFrame] {
        &self.frames
    }

    /// Failures, one entry per failing step.
    #[must_use]
    pub fn errors(&self) -> &[StepErrors] {
        &self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Every emitted command, in protocol order.
    pub fn all_commands(&self) -> impl Iterator<Item = &Command> {
        self.frames.iter().flat_map(|f| f.commands.iter())
    }

    /// Every warning from the successful steps.
    pub fn all_warnings(&self) -> impl Iterator<Item = &CommandWarning> {
        self.frames.iter().flat_map(|f| f.warnings.iter())
    }

    /// Python for the whole protocol body.
    #[must_use]
    pub fn python(&self) -> String {
        python::join_lines(self.frames.iter().filter_map(|f| f.python.clone())).unwrap_or_default()
    }

    #[must_use]
    pub fn final_robot_state(&self) -> &RobotState {
        &self.final_robot_state
    }

    /// Stable content hash of the timeline, as lowercase hex.
    ///
    /// Equal inputs always assemble to equal digests.
    pub fn digest(&self) -> StepGenResult<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Hasher::new();
        hasher.update(&bytes);
        Ok(hasher.finalize().to_hex().to_string())
    }
}

/// Pretty JSON rendering of an assembled timeline.
pub fn to_json_pretty(timeline: &Timeline) -> StepGenResult<String> {
    Ok(serde_json::to_string_pretty(timeline)?)
}

/// Parses a JSON array of steps.
pub fn steps_from_json(json: &str) -> StepGenResult<Vec<StepArgs>> {
    Ok(serde_json::from_str(json)?)
}
