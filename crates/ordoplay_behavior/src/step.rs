// SPDX-License-Identifier: MIT OR Apache-2.0
//! Steps: the addressable units of a sequence.

use crate::action::Action;
use crate::branch::Branch;
use crate::callback::Callback;
use crate::error::Result;
use crate::parallel::ParallelGroup;
use crate::sequence::{Sequence, StepOutcome};
use rand::rngs::StdRng;
use std::fmt;

/// Runtime state of a step within one activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepState {
    /// Not yet entered (or reset for re-entry)
    #[default]
    NotStarted,
    /// Entered and being updated every tick
    Active,
    /// Finished for this activation
    Complete,
}

/// What a step wraps
pub enum StepKind<C> {
    /// A single action. The slot is replaced by the result of `reload`
    /// on every activation.
    Leaf(Box<dyn Action<C>>),
    /// A sequence run to completion as one step
    Nested(Box<Sequence<C>>),
    /// Sequences ticked side by side until all of them complete
    Parallel(ParallelGroup<C>),
    /// A choice made once per activation
    Branch(Branch<C>),
}

impl<C> StepKind<C> {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Nested(_) => "nested",
            Self::Parallel(_) => "parallel",
            Self::Branch(_) => "branch",
        }
    }
}

/// A step definition plus its runtime state
pub struct Step<C> {
    kind: StepKind<C>,
    state: StepState,
}

impl<C> Step<C> {
    /// Create a step from its kind
    pub fn new(kind: StepKind<C>) -> Self {
        Self {
            kind,
            state: StepState::NotStarted,
        }
    }

    /// Wrap an action
    pub fn leaf(action: impl Action<C> + 'static) -> Self {
        Self::new(StepKind::Leaf(Box::new(action)))
    }

    /// Wrap an already boxed action
    pub fn boxed(action: Box<dyn Action<C>>) -> Self {
        Self::new(StepKind::Leaf(action))
    }

    /// Wrap a sequence
    pub fn nested(sequence: Sequence<C>) -> Self {
        Self::new(StepKind::Nested(Box::new(sequence)))
    }

    /// Wrap a branch
    pub fn branch(branch: Branch<C>) -> Self {
        Self::new(StepKind::Branch(branch))
    }

    /// Current runtime state
    pub fn state(&self) -> StepState {
        self.state
    }

    /// The wrapped kind
    pub fn kind(&self) -> &StepKind<C> {
        &self.kind
    }

    /// Forget the current activation so the next tick re-enters the step.
    ///
    /// No hooks run; an interrupted action never sees `on_end`.
    pub fn reset(&mut self) {
        self.state = StepState::NotStarted;
    }

    /// Enter the step: reload, then start or select.
    ///
    /// The state only becomes `Active` once every hook succeeded, so a
    /// failed activation is retried from `reload` on the next tick.
    pub(crate) fn activate(&mut self, ctx: &mut C, rng: &mut StdRng) -> Result<()> {
        match &mut self.kind {
            StepKind::Leaf(action) => {
                let previous = std::mem::replace(action, Box::new(crate::action::Idle));
                *action = previous.reload();
                action.on_start(ctx)?;
            }
            StepKind::Nested(sequence) => sequence.reset(),
            StepKind::Parallel(group) => group.reset(),
            StepKind::Branch(branch) => branch.select(ctx, rng)?,
        }

        tracing::trace!(kind = self.kind.name(), "step activated");
        self.state = StepState::Active;
        Ok(())
    }

    /// Drive the step for one tick: activate if needed, update, then check
    /// for completion.
    pub(crate) fn tick(
        &mut self,
        ctx: &mut C,
        delta_time: f32,
        rng: &mut StdRng,
    ) -> Result<StepState> {
        if self.state == StepState::NotStarted {
            self.activate(ctx, rng)?;
        }

        if self.state == StepState::Active {
            let finished = match &mut self.kind {
                StepKind::Leaf(action) => {
                    action.update(ctx, delta_time)?;
                    if action.is_complete(ctx)? {
                        action.on_end(ctx)?;
                        true
                    } else {
                        false
                    }
                }
                StepKind::Nested(sequence) => {
                    sequence.advance(ctx, delta_time)? == StepOutcome::Complete
                }
                StepKind::Parallel(group) => {
                    group.advance(ctx, delta_time)? == StepOutcome::Complete
                }
                StepKind::Branch(branch) => branch.tick(ctx, delta_time, rng)?,
            };

            if finished {
                tracing::trace!(kind = self.kind.name(), "step complete");
                self.state = StepState::Complete;
            }
        }

        Ok(self.state)
    }
}

impl<C> fmt::Debug for Step<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind.name())
            .field("state", &self.state)
            .finish()
    }
}

/// Markers that keep the [`IntoStep`] impls apart
pub mod marker {
    /// An [`Action`](crate::Action) value
    pub struct IsAction;
    /// A [`Sequence`](crate::Sequence) to nest
    pub struct IsSequence;
    /// An already built [`Step`](super::Step)
    pub struct IsStep;
    /// A closure taking the context
    pub struct ContextCallback;
    /// A closure taking nothing
    pub struct PlainCallback;
}

/// Anything that can become a [`Step`]: actions, sequences, steps and
/// instant callbacks
pub trait IntoStep<C, M> {
    /// Perform the conversion
    fn into_step(self) -> Step<C>;
}

impl<C, A> IntoStep<C, marker::IsAction> for A
where
    A: Action<C> + 'static,
{
    fn into_step(self) -> Step<C> {
        Step::leaf(self)
    }
}

impl<C> IntoStep<C, marker::IsSequence> for Sequence<C> {
    fn into_step(self) -> Step<C> {
        Step::nested(self)
    }
}

impl<C> IntoStep<C, marker::IsStep> for Step<C> {
    fn into_step(self) -> Step<C> {
        self
    }
}

impl<C, F> IntoStep<C, marker::ContextCallback> for F
where
    F: FnMut(&mut C) + 'static,
{
    fn into_step(self) -> Step<C> {
        Step::leaf(Callback::new(self))
    }
}

impl<C, F> IntoStep<C, marker::PlainCallback> for F
where
    F: FnMut() + 'static,
{
    fn into_step(self) -> Step<C> {
        let mut run = self;
        Step::leaf(Callback::new(move |_: &mut C| run()))
    }
}

/// Convert anything step-like into a [`Step`]
pub fn step<C, M>(value: impl IntoStep<C, M>) -> Step<C> {
    value.into_step()
}
