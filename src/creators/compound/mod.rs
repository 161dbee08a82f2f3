//! Compound creators: multi-command steps built from other creators.
//!
//! Each one checks what it can up front and reports every problem found there.
//! The sub-creators then run through
//! [`reduce_command_creators`](crate::creators::reduce_command_creators), so
//! each sees the state its predecessors leave behind.

pub mod absorbance_reader;
pub mod heater_shaker;
pub mod liquid;
pub mod thermocycler;
pub mod tips;

pub use absorbance_reader::{
    absorbance_reader_close_initialize, absorbance_reader_close_read,
    AbsorbanceCloseInitializeArgs, AbsorbanceCloseReadArgs,
};
pub use heater_shaker::{heater_shaker_step, HeaterShakerStepArgs};
pub use liquid::{mix, pair_wells, split_volume, transfer, ChangeTip, MixArgs, TransferArgs};
pub use thermocycler::{
    thermocycler_profile_step, thermocycler_state_step, ThermocyclerEndState,
    ThermocyclerProfileArgs, ThermocyclerStateArgs,
};
pub use tips::{drop_tip, next_tip, replace_tip, DropTipArgs, ReplaceTipArgs};
