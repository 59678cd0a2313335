// SPDX-License-Identifier: MIT OR Apache-2.0
//! Completion conditions: side-effect-free predicates over the context.

use crate::error::Result;
use std::fmt;

/// A predicate over the context used by branches, waits and loops.
///
/// Conditions may be evaluated several times per tick, so they must be
/// cheap and must not mutate anything.
pub struct Condition<C> {
    predicate: Box<dyn Fn(&C) -> Result<bool>>,
}

impl<C> Condition<C> {
    /// Wrap a predicate that reads the context
    pub fn new(predicate: impl Fn(&C) -> bool + 'static) -> Self {
        Self::fallible(move |ctx| Ok(predicate(ctx)))
    }

    /// Wrap a predicate that may reject the context
    pub fn fallible(predicate: impl Fn(&C) -> Result<bool> + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// Wrap a predicate that ignores the context
    pub fn from_fn(predicate: impl Fn() -> bool + 'static) -> Self {
        Self::fallible(move |_| Ok(predicate()))
    }

    /// Always true
    pub fn always() -> Self
    where
        C: 'static,
    {
        Self::fallible(|_| Ok(true))
    }

    /// Always false
    pub fn never() -> Self
    where
        C: 'static,
    {
        Self::fallible(|_| Ok(false))
    }

    /// True when every condition holds. Stops at the first false one.
    pub fn all(conditions: impl IntoIterator<Item = Condition<C>>) -> Self
    where
        C: 'static,
    {
        let conditions: Vec<_> = conditions.into_iter().collect();
        Self::fallible(move |ctx| {
            for condition in &conditions {
                if !condition.evaluate(ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        })
    }

    /// True when any condition holds. Stops at the first true one.
    pub fn any(conditions: impl IntoIterator<Item = Condition<C>>) -> Self
    where
        C: 'static,
    {
        let conditions: Vec<_> = conditions.into_iter().collect();
        Self::fallible(move |ctx| {
            for condition in &conditions {
                if condition.evaluate(ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    /// Negate this condition
    pub fn not(self) -> Self
    where
        C: 'static,
    {
        Self::fallible(move |ctx| Ok(!self.evaluate(ctx)?))
    }

    /// Evaluate against a context
    pub fn evaluate(&self, ctx: &C) -> Result<bool> {
        (self.predicate)(ctx)
    }
}

impl<C> fmt::Debug for Condition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition")
    }
}

/// Markers that keep the [`IntoCondition`] impls apart
pub mod marker {
    /// Predicate taking the context
    pub struct ReadsContext;
    /// Predicate taking no arguments
    pub struct Standalone;
    /// Already a [`Condition`](super::Condition)
    pub struct Prebuilt;
}

/// Anything that can be adapted into a [`Condition`]
pub trait IntoCondition<C, M> {
    /// Perform the conversion
    fn into_condition(self) -> Condition<C>;
}

impl<C> IntoCondition<C, marker::Prebuilt> for Condition<C> {
    fn into_condition(self) -> Condition<C> {
        self
    }
}

impl<C, F> IntoCondition<C, marker::ReadsContext> for F
where
    F: Fn(&C) -> bool + 'static,
{
    fn into_condition(self) -> Condition<C> {
        Condition::new(self)
    }
}

impl<C, F> IntoCondition<C, marker::Standalone> for F
where
    F: Fn() -> bool + 'static,
{
    fn into_condition(self) -> Condition<C> {
        Condition::from_fn(self)
    }
}
