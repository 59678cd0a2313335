// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequences and the tick interpreter that drives them.

use crate::condition::Condition;
use crate::error::Result;
use crate::parallel::ParallelGroup;
use crate::settings::SequencerSettings;
use crate::step::{Step, StepState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId(pub Uuid);

impl SequenceId {
    /// Create a new random sequence ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SequenceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Repetition policy, applied each time the last step completes
pub enum Repeat<C> {
    /// Run through once
    Once,
    /// Run through this many times in total
    Count(u32),
    /// Run again until the condition holds at the end of a pass
    Until(Condition<C>),
    /// Never complete
    Forever,
}

impl<C> Repeat<C> {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Count(_) => "count",
            Self::Until(_) => "until",
            Self::Forever => "forever",
        }
    }
}

impl<C> fmt::Debug for Repeat<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "Count({n})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Lifecycle of a sequence instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceStatus {
    /// Never ticked, or reset
    #[default]
    NotStarted,
    /// Ticked at least once and not finished
    Running,
    /// Finished; further ticks do nothing
    Complete,
}

/// Result of a single `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// More ticks are needed
    Running,
    /// Finished
    Complete,
}

/// An ordered list of steps with a repetition policy.
///
/// The step list is fixed once built; `advance` only moves the cursor and
/// the per-step runtime state. Within one tick steps cascade: a step that
/// completes lets the next one start in the same tick. A tick never goes
/// back to an index it already passed, so when a pass ends and the policy
/// asks for another, the first step is re-entered (reloaded and started)
/// right away but first updated on the following tick.
pub struct Sequence<C> {
    /// Unique sequence ID
    pub id: SequenceId,
    /// Sequence name, used in logs
    pub name: String,
    steps: Vec<Step<C>>,
    repeat: Repeat<C>,
    companions: Option<ParallelGroup<C>>,
    rng: StdRng,
    warn_on_instant_loops: bool,
    status: SequenceStatus,
    cursor: usize,
    remaining: u32,
    passes: u32,
    /// Whether any step of the current pass has needed more than one update
    blocked_in_pass: bool,
    warned: bool,
}

impl<C> Sequence<C> {
    pub(crate) fn from_parts(
        name: String,
        steps: Vec<Step<C>>,
        repeat: Repeat<C>,
        companions: Option<ParallelGroup<C>>,
        settings: &SequencerSettings,
    ) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            id: SequenceId::new(),
            name,
            steps,
            repeat,
            companions,
            rng,
            warn_on_instant_loops: settings.warn_on_instant_loops,
            status: SequenceStatus::NotStarted,
            cursor: 0,
            remaining: 0,
            passes: 0,
            blocked_in_pass: false,
            warned: false,
        }
    }

    /// Advance by one tick.
    ///
    /// Errors from hooks and conditions are returned as-is. The failing step
    /// keeps its state and the cursor stays put, so the next call resumes at
    /// the same step. Companion sequences are ticked after the body.
    ///
    /// Work done before the error in the same call is not rolled back: steps
    /// that completed earlier in the cascade stay complete, and when a
    /// companion fails the body has already been ticked (as have the
    /// companions ahead of it), so a retry ticks them again.
    pub fn advance(&mut self, ctx: &mut C, delta_time: f32) -> Result<StepOutcome> {
        let outcome = self.drive(ctx, delta_time)?;

        if let Some(companions) = &mut self.companions {
            companions.advance(ctx, delta_time)?;
        }

        Ok(outcome)
    }

    /// Throw away all runtime state; the next tick starts from scratch.
    ///
    /// Nothing is called on the interrupted step. Callers that need teardown
    /// must do it themselves before resetting.
    pub fn reset(&mut self) {
        self.status = SequenceStatus::NotStarted;
        self.rewind();
        self.passes = 0;
        self.remaining = match self.repeat {
            Repeat::Count(n) => n,
            _ => 0,
        };

        if let Some(companions) = &mut self.companions {
            companions.reset();
        }
    }

    fn rewind(&mut self) {
        self.cursor = 0;
        self.blocked_in_pass = false;
        for step in &mut self.steps {
            step.reset();
        }
    }

    fn drive(&mut self, ctx: &mut C, delta_time: f32) -> Result<StepOutcome> {
        match self.status {
            SequenceStatus::Complete => return Ok(StepOutcome::Complete),
            SequenceStatus::NotStarted => {
                self.reset();
                self.status = SequenceStatus::Running;
                tracing::debug!(
                    sequence = %self.name,
                    steps = self.steps.len(),
                    repeat = self.repeat.name(),
                    "sequence started"
                );
            }
            SequenceStatus::Running => {}
        }

        while let Some(step) = self.steps.get_mut(self.cursor) {
            if step.tick(ctx, delta_time, &mut self.rng)? != StepState::Complete {
                self.blocked_in_pass = true;
                return Ok(StepOutcome::Running);
            }
            self.cursor += 1;
        }

        self.finish_pass(ctx)
    }

    /// Apply the repetition policy once the cursor has run off the end
    fn finish_pass(&mut self, ctx: &mut C) -> Result<StepOutcome> {
        let again = match &self.repeat {
            Repeat::Once => false,
            Repeat::Count(_) => self.remaining > 1,
            Repeat::Until(condition) => !condition.evaluate(ctx)?,
            Repeat::Forever => true,
        };

        self.passes = self.passes.saturating_add(1);

        if !again {
            self.status = SequenceStatus::Complete;
            tracing::debug!(sequence = %self.name, passes = self.passes, "sequence complete");
            return Ok(StepOutcome::Complete);
        }

        if let Repeat::Count(_) = self.repeat {
            self.remaining -= 1;
        }

        if matches!(self.repeat, Repeat::Forever)
            && !self.blocked_in_pass
            && self.warn_on_instant_loops
            && !self.warned
        {
            tracing::warn!(
                sequence = %self.name,
                "every step of a repeat-forever pass completed on its first update; \
                 add a wait so the loop spans ticks"
            );
            self.warned = true;
        }

        tracing::debug!(sequence = %self.name, pass = self.passes, "sequence wrapped");
        self.rewind();

        if let Some(first) = self.steps.first_mut() {
            first.activate(ctx, &mut self.rng)?;
        }

        Ok(StepOutcome::Running)
    }

    /// Current lifecycle state
    pub fn status(&self) -> SequenceStatus {
        self.status
    }

    /// Whether the sequence has finished
    pub fn is_complete(&self) -> bool {
        self.status == SequenceStatus::Complete
    }

    /// Index of the step being driven
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of finished passes
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Repetition policy
    pub fn repeat(&self) -> &Repeat<C> {
        &self.repeat
    }

    /// Runtime state of the step at `index`
    pub fn step_state(&self, index: usize) -> Option<StepState> {
        self.steps.get(index).map(Step::state)
    }

    /// All steps
    pub fn steps(&self) -> impl Iterator<Item = &Step<C>> {
        self.steps.iter()
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Companion sequences ticked alongside this one
    pub fn companions(&self) -> Option<&ParallelGroup<C>> {
        self.companions.as_ref()
    }
}

impl<C> fmt::Debug for Sequence<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("repeat", &self.repeat)
            .field("status", &self.status)
            .field("cursor", &self.cursor)
            .field("passes", &self.passes)
            .finish()
    }
}
