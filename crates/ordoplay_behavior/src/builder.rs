// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fluent construction of sequences.
//!
//! ```
//! use ordoplay_behavior::SequenceBuilder;
//!
//! struct Bee {
//!     nectar: u32,
//! }
//!
//! let mut patrol = SequenceBuilder::new("patrol")
//!     .if_(|bee: &Bee| bee.nectar >= 10)
//!     .then(|bee: &mut Bee| bee.nectar = 0)
//!     .or(|bee: &mut Bee| bee.nectar += 5)
//!     .wait(1.0)
//!     .repeat(2)
//!     .done()
//!     .unwrap();
//!
//! let mut bee = Bee { nectar: 0 };
//! while !patrol.is_complete() {
//!     patrol.advance(&mut bee, 0.5).unwrap();
//! }
//! assert_eq!(bee.nectar, 10);
//! ```
//!
//! Misuse is recorded as it happens and reported by `done()`; the first
//! problem in the chain wins.

use crate::branch::Branch;
use crate::condition::{Condition, IntoCondition};
use crate::error::BuilderMisuseError;
use crate::parallel::{GroupCompletion, ParallelGroup};
use crate::sequence::{Repeat, Sequence};
use crate::settings::SequencerSettings;
use crate::step::{IntoStep, Step, StepKind};
use crate::wait::{Wait, WaitUntil};

/// An `if_` chain that has not been closed yet
struct OpenBranch<C> {
    arms: Vec<(Condition<C>, Step<C>)>,
    /// Guard still waiting for its `then`
    pending: Option<Condition<C>>,
}

/// Builds an immutable [`Sequence`] definition
pub struct SequenceBuilder<C> {
    name: String,
    settings: SequencerSettings,
    steps: Vec<Step<C>>,
    repeat: Option<Repeat<C>>,
    companions: Vec<Sequence<C>>,
    open: Option<OpenBranch<C>>,
    error: Option<BuilderMisuseError>,
}

impl<C: 'static> SequenceBuilder<C> {
    /// Start a new sequence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: SequencerSettings::default(),
            steps: Vec::new(),
            repeat: None,
            companions: Vec::new(),
            open: None,
            error: None,
        }
    }

    /// Use these settings for the sequence being built
    pub fn with_settings(mut self, settings: SequencerSettings) -> Self {
        if settings.validate().is_err() {
            self.fail(BuilderMisuseError::InvalidProbability(settings.maybe_probability));
        }
        self.settings = settings;
        self
    }

    /// Seed random branches for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    /// Append a step: an action, a callback, a nested sequence or a
    /// prebuilt [`Step`]
    pub fn run<M>(mut self, step: impl IntoStep<C, M>) -> Self {
        self.push(step.into_step());
        self
    }

    /// Give the open `if_`/`or_if` guard its consequent, or append a step
    /// like [`run`](Self::run) when no guard is waiting
    pub fn then<M>(mut self, step: impl IntoStep<C, M>) -> Self {
        if let Some(open) = &mut self.open {
            if let Some(guard) = open.pending.take() {
                open.arms.push((guard, step.into_step()));
                return self;
            }
        }
        self.push(step.into_step());
        self
    }

    /// Open a branch guarded by `guard`
    pub fn if_<M>(mut self, guard: impl IntoCondition<C, M>) -> Self {
        self.close_branch();
        self.open = Some(OpenBranch {
            arms: Vec::new(),
            pending: Some(guard.into_condition()),
        });
        self
    }

    /// Open a branch taken only when every guard holds
    pub fn if_all(mut self, guards: impl IntoIterator<Item = Condition<C>>) -> Self {
        let guards: Vec<_> = guards.into_iter().collect();
        if guards.is_empty() {
            self.fail(BuilderMisuseError::EmptyIf);
        }

        self.close_branch();
        self.open = Some(OpenBranch {
            arms: Vec::new(),
            pending: Some(Condition::all(guards)),
        });
        self
    }

    /// Add another guarded arm to the open branch
    pub fn or_if<M>(mut self, guard: impl IntoCondition<C, M>) -> Self {
        match self.open.take() {
            None => self.fail(BuilderMisuseError::OrIfWithoutIf),
            Some(open) if open.pending.is_some() => self.fail(BuilderMisuseError::MissingThen),
            Some(mut open) => {
                open.pending = Some(guard.into_condition());
                self.open = Some(open);
            }
        }
        self
    }

    /// Close the open branch with a fallback taken when no guard holds
    pub fn or<M>(mut self, step: impl IntoStep<C, M>) -> Self {
        match self.open.take() {
            None => self.fail(BuilderMisuseError::OrWithoutIf),
            Some(open) if open.pending.is_some() => self.fail(BuilderMisuseError::MissingThen),
            Some(open) => {
                let branch = Branch::guarded(open.arms, Some(step.into_step()));
                self.steps.push(Step::branch(branch));
            }
        }
        self
    }

    /// Block until `condition` holds
    pub fn until<M>(mut self, condition: impl IntoCondition<C, M>) -> Self {
        self.push(Step::leaf(WaitUntil::new(condition.into_condition())));
        self
    }

    /// Alias for [`until`](Self::until)
    pub fn wait_until<M>(self, condition: impl IntoCondition<C, M>) -> Self {
        self.until(condition)
    }

    /// Block for `seconds` of accumulated tick time
    pub fn wait(mut self, seconds: f32) -> Self {
        if seconds.is_finite() && seconds >= 0.0 {
            self.push(Step::leaf(Wait::new(seconds)));
        } else {
            self.fail(BuilderMisuseError::InvalidDuration(seconds));
        }
        self
    }

    /// Pick one of `options` uniformly at random each time the step is entered
    pub fn random_one_of(mut self, options: Vec<Step<C>>) -> Self {
        match Branch::uniform(options) {
            Ok(branch) => self.push(Step::branch(branch)),
            Err(error) => self.fail(error),
        }
        self
    }

    /// Pick one of `options` by weight each time the step is entered
    pub fn random_one_of_weighted(mut self, options: Vec<(f64, Step<C>)>) -> Self {
        match Branch::weighted(options) {
            Ok(branch) => self.push(Step::branch(branch)),
            Err(error) => self.fail(error),
        }
        self
    }

    /// Run `step` with the configured `maybe` probability, otherwise skip it
    pub fn maybe<M>(self, step: impl IntoStep<C, M>) -> Self {
        let probability = self.settings.maybe_probability;
        self.maybe_with(probability, step)
    }

    /// Run `step` with the given probability, otherwise skip it
    pub fn maybe_with<M>(mut self, probability: f64, step: impl IntoStep<C, M>) -> Self {
        match Branch::chance(probability, step.into_step()) {
            Ok(branch) => self.push(Step::branch(branch)),
            Err(error) => self.fail(error),
        }
        self
    }

    /// Append a step that ticks `sequences` side by side and completes once
    /// all of them have
    pub fn in_parallel(mut self, sequences: impl IntoIterator<Item = Sequence<C>>) -> Self {
        let group = ParallelGroup::from_sequences(sequences, GroupCompletion::All);
        self.push(Step::new(StepKind::Parallel(group)));
        self
    }

    /// Tick `sequence` after this one on every advance, independently of it
    pub fn alongside(mut self, sequence: Sequence<C>) -> Self {
        self.companions.push(sequence);
        self
    }

    /// Run the whole sequence `count` times
    pub fn repeat(mut self, count: u32) -> Self {
        if count == 0 {
            self.fail(BuilderMisuseError::ZeroRepeatCount);
            return self;
        }
        self.set_repeat(Repeat::Count(count));
        self
    }

    /// Run the sequence again until `condition` holds at the end of a pass
    pub fn repeat_until<M>(mut self, condition: impl IntoCondition<C, M>) -> Self {
        self.set_repeat(Repeat::Until(condition.into_condition()));
        self
    }

    /// Never complete
    pub fn repeat_forever(mut self) -> Self {
        self.set_repeat(Repeat::Forever);
        self
    }

    /// Alias for [`repeat_forever`](Self::repeat_forever)
    pub fn and_repeat_forever(self) -> Self {
        self.repeat_forever()
    }

    /// Finish the definition
    pub fn done(mut self) -> Result<Sequence<C>, BuilderMisuseError> {
        self.close_branch();
        if let Some(error) = self.error {
            return Err(error);
        }

        let companions = if self.companions.is_empty() {
            None
        } else {
            Some(ParallelGroup::from_sequences(self.companions, GroupCompletion::Never))
        };

        tracing::debug!(sequence = %self.name, steps = self.steps.len(), "sequence built");
        Ok(Sequence::from_parts(
            self.name,
            self.steps,
            self.repeat.unwrap_or(Repeat::Once),
            companions,
            &self.settings,
        ))
    }

    /// Alias for [`done`](Self::done)
    pub fn and_then_stop(self) -> Result<Sequence<C>, BuilderMisuseError> {
        self.done()
    }

    fn set_repeat(&mut self, repeat: Repeat<C>) {
        self.close_branch();
        if self.repeat.is_some() {
            self.fail(BuilderMisuseError::RepeatAlreadySet);
        } else {
            self.repeat = Some(repeat);
        }
    }

    fn push(&mut self, step: Step<C>) {
        self.close_branch();
        self.steps.push(step);
    }

    /// Turn an open `if_` chain into a step without a fallback
    fn close_branch(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };

        if open.pending.is_some() {
            self.fail(BuilderMisuseError::MissingThen);
        } else {
            self.steps.push(Step::branch(Branch::guarded(open.arms, None)));
        }
    }

    fn fail(&mut self, error: BuilderMisuseError) {
        tracing::debug!(sequence = %self.name, %error, "builder misuse");
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
