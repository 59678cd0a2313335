// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tick-driven behavior sequencing for OrdoPlay.
//!
//! This crate lets gameplay code describe behavior as a script of steps:
//! - Actions with start/update/end hooks
//! - If/Then/Or branches and random choices
//! - Waits on time or on a condition
//! - Loops: counted, conditional or forever
//! - Nested and parallel sequences
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - A fluent [`SequenceBuilder`] producing immutable step lists
//! - A tick interpreter ([`Sequence::advance`]) that cascades through
//!   instantly finishing steps
//! - A caller-supplied context `C` that every hook reads and mutates
//! - Per-sequence seeded randomness for reproducible runs

pub mod action;
pub mod branch;
pub mod builder;
pub mod callback;
pub mod condition;
pub mod error;
pub mod parallel;
pub mod sequence;
pub mod settings;
pub mod step;
pub mod wait;

#[cfg(test)]
mod testing;

pub use action::{Action, Idle};
pub use branch::{Branch, Selector};
pub use builder::SequenceBuilder;
pub use callback::{Callback, TryCallback};
pub use condition::{Condition, IntoCondition};
pub use error::{BuilderMisuseError, Result, SequenceError, SettingsError};
pub use parallel::{GroupCompletion, ParallelGroup};
pub use sequence::{Repeat, Sequence, SequenceId, SequenceStatus, StepOutcome};
pub use settings::{SequencerSettings, DEFAULT_MAYBE_PROBABILITY};
pub use step::{step, IntoStep, Step, StepKind, StepState};
pub use wait::{Wait, WaitUntil};
