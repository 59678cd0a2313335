// SPDX-License-Identifier: MIT OR Apache-2.0
//! The action contract that behavior units implement.
//!
//! An action is driven by the step that owns it:
//! 1. `reload` every time the step is entered, including the first time
//! 2. `on_start` once per activation
//! 3. `update` once per tick, always before `is_complete`
//! 4. `on_end` once `is_complete` reports true
//!
//! Only `reload` is required. Returning `self` from it keeps the action's
//! state across activations; returning a freshly constructed value resets it.

use crate::error::Result;

/// A pluggable unit of behavior driven against a context of type `C`
pub trait Action<C> {
    /// Called once when the owning step is activated
    fn on_start(&mut self, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    /// Called once per tick while the owning step is active
    fn update(&mut self, _ctx: &mut C, _delta_time: f32) -> Result<()> {
        Ok(())
    }

    /// Whether the action has finished, checked after `update` on every tick
    fn is_complete(&self, _ctx: &C) -> Result<bool> {
        Ok(false)
    }

    /// Called once when the action completes
    fn on_end(&mut self, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    /// Produce the instance that runs for the next activation
    fn reload(self: Box<Self>) -> Box<dyn Action<C>>;
}

/// An action that never completes and does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl<C> Action<C> for Idle {
    fn reload(self: Box<Self>) -> Box<dyn Action<C>> {
        self
    }
}
