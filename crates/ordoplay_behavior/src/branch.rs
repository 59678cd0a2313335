// SPDX-License-Identifier: MIT OR Apache-2.0
//! Branch steps: If/Then/Or, random choice and maybe.
//!
//! A branch picks one child when it is activated and then drives that child
//! as its own body. Guards are not re-evaluated until the branch is entered
//! again, e.g. on the next pass of an enclosing loop.

use crate::condition::Condition;
use crate::error::{BuilderMisuseError, Result};
use crate::step::{Step, StepState};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;

/// How a branch picks its child
pub enum Selector<C> {
    /// The first true guard picks the child at the same index. When no
    /// guard holds, the fallback (stored after the guarded children) runs,
    /// or nothing does.
    Guarded {
        /// Guards in declaration order
        guards: Vec<Condition<C>>,
        /// Whether the last child is the fallback
        fallback: bool,
    },
    /// Every child equally likely
    Uniform,
    /// Children picked by weight
    Weighted(WeightedIndex<f64>),
    /// The single child runs with this probability, otherwise nothing does
    Chance(f64),
}

/// A step that selects one of several children on activation
pub struct Branch<C> {
    selector: Selector<C>,
    children: Vec<Step<C>>,
    chosen: Option<usize>,
}

impl<C> Branch<C> {
    /// If/Then/Or: ordered guarded arms plus an optional fallback
    pub fn guarded(arms: Vec<(Condition<C>, Step<C>)>, otherwise: Option<Step<C>>) -> Self {
        let fallback = otherwise.is_some();
        let (guards, mut children): (Vec<_>, Vec<_>) = arms.into_iter().unzip();
        children.extend(otherwise);

        Self {
            selector: Selector::Guarded { guards, fallback },
            children,
            chosen: None,
        }
    }

    /// Pick one option uniformly at random
    pub fn uniform(options: Vec<Step<C>>) -> std::result::Result<Self, BuilderMisuseError> {
        if options.is_empty() {
            return Err(BuilderMisuseError::EmptyChoice);
        }

        Ok(Self {
            selector: Selector::Uniform,
            children: options,
            chosen: None,
        })
    }

    /// Pick one option with probability proportional to its weight
    pub fn weighted(options: Vec<(f64, Step<C>)>) -> std::result::Result<Self, BuilderMisuseError> {
        if options.is_empty() {
            return Err(BuilderMisuseError::EmptyChoice);
        }

        let (weights, children): (Vec<f64>, Vec<_>) = options.into_iter().unzip();
        let distribution = WeightedIndex::new(&weights)
            .map_err(|e| BuilderMisuseError::InvalidWeights(e.to_string()))?;

        Ok(Self {
            selector: Selector::Weighted(distribution),
            children,
            chosen: None,
        })
    }

    /// Run `step` with the given probability, otherwise skip it
    pub fn chance(
        probability: f64,
        step: Step<C>,
    ) -> std::result::Result<Self, BuilderMisuseError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(BuilderMisuseError::InvalidProbability(probability));
        }

        Ok(Self {
            selector: Selector::Chance(probability),
            children: vec![step],
            chosen: None,
        })
    }

    /// Index of the child picked for the current activation, if any
    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }

    /// The child picked for the current activation, if any
    pub fn chosen_step(&self) -> Option<&Step<C>> {
        self.chosen.and_then(|i| self.children.get(i))
    }

    /// Number of children, fallback included
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the branch has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Pick a child for this activation and reset it for entry
    pub(crate) fn select(&mut self, ctx: &C, rng: &mut StdRng) -> Result<()> {
        let chosen = match &self.selector {
            Selector::Guarded { guards, fallback } => {
                let mut hit = None;
                for (index, guard) in guards.iter().enumerate() {
                    if guard.evaluate(ctx)? {
                        hit = Some(index);
                        break;
                    }
                }
                hit.or(fallback.then_some(guards.len()))
            }
            Selector::Uniform => Some(rng.gen_range(0..self.children.len())),
            Selector::Weighted(distribution) => Some(distribution.sample(rng)),
            Selector::Chance(probability) => rng.gen_bool(*probability).then_some(0),
        };

        tracing::trace!(?chosen, "branch selected");
        self.chosen = chosen;
        if let Some(child) = chosen.and_then(|i| self.children.get_mut(i)) {
            child.reset();
        }
        Ok(())
    }

    /// Drive the chosen child. Returns true once the branch is finished.
    pub(crate) fn tick(&mut self, ctx: &mut C, delta_time: f32, rng: &mut StdRng) -> Result<bool> {
        match self.chosen.and_then(|i| self.children.get_mut(i)) {
            Some(child) => Ok(child.tick(ctx, delta_time, rng)? == StepState::Complete),
            None => Ok(true),
        }
    }
}
