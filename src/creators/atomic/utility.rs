//! Protocol-level delays and pauses.

use serde::{Deserialize, Serialize};

use crate::command::{Command, WaitForDurationParams, WaitForResumeParams};
use crate::creators::{CommandCreatorResult, CommandsAndWarnings};
use crate::invariant::InvariantContext;
use crate::python::{self, PROTOCOL_CONTEXT_NAME};
use crate::state::RobotState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayArgs {
    pub seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn delay(args: &DelayArgs, _invariant: &InvariantContext, _robot_state: &RobotState) -> CommandCreatorResult {
    let mut python_args = vec![python::kwarg("seconds", python::format_number(args.seconds))];
    if let Some(message) = &args.message {
        python_args.push(python::kwarg("msg", python::format_str(message)));
    }
    Ok(CommandsAndWarnings::single(
        Command::WaitForDuration(WaitForDurationParams {
            seconds: args.seconds,
            message: args.message.clone(),
        }),
        python::call(PROTOCOL_CONTEXT_NAME, "delay", &python_args),
    ))
}

pub fn pause(args: &PauseArgs, _invariant: &InvariantContext, _robot_state: &RobotState) -> CommandCreatorResult {
    let python_args: Vec<String> = args.message.iter().map(|m| python::format_str(m)).collect();
    Ok(CommandsAndWarnings::single(
        Command::WaitForResume(WaitForResumeParams {
            message: args.message.clone(),
        }),
        python::call(PROTOCOL_CONTEXT_NAME, "pause", &python_args),
    ))
}
