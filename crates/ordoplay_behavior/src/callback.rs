// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fire-and-complete actions built from plain closures.

use crate::action::Action;
use crate::error::Result;

/// Runs a closure on its first update and completes right after.
///
/// Used for side-effecting glue between longer-running steps.
pub struct Callback<F> {
    run: F,
    fired: bool,
}

impl<F> Callback<F> {
    /// Wrap a closure taking the context
    pub fn new<C>(run: F) -> Self
    where
        F: FnMut(&mut C),
    {
        Self { run, fired: false }
    }

    /// Whether the closure has run during the current activation
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

impl<C, F> Action<C> for Callback<F>
where
    F: FnMut(&mut C) + 'static,
{
    fn update(&mut self, ctx: &mut C, _delta_time: f32) -> Result<()> {
        if !self.fired {
            (self.run)(ctx);
            self.fired = true;
        }
        Ok(())
    }

    fn is_complete(&self, _ctx: &C) -> Result<bool> {
        Ok(self.fired)
    }

    fn reload(mut self: Box<Self>) -> Box<dyn Action<C>> {
        self.fired = false;
        self
    }
}

/// Like [`Callback`], but the closure may fail.
///
/// A failed run leaves the action unfired, so the next tick runs it again.
pub struct TryCallback<F> {
    run: F,
    fired: bool,
}

impl<F> TryCallback<F> {
    /// Wrap a fallible closure taking the context
    pub fn new<C>(run: F) -> Self
    where
        F: FnMut(&mut C) -> Result<()>,
    {
        Self { run, fired: false }
    }
}

impl<C, F> Action<C> for TryCallback<F>
where
    F: FnMut(&mut C) -> Result<()> + 'static,
{
    fn update(&mut self, ctx: &mut C, _delta_time: f32) -> Result<()> {
        if !self.fired {
            (self.run)(ctx)?;
            self.fired = true;
        }
        Ok(())
    }

    fn is_complete(&self, _ctx: &C) -> Result<bool> {
        Ok(self.fired)
    }

    fn reload(mut self: Box<Self>) -> Box<dyn Action<C>> {
        self.fired = false;
        self
    }
}
