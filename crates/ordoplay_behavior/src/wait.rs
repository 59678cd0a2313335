// SPDX-License-Identifier: MIT OR Apache-2.0
//! Actions that hold a sequence in place across ticks.

use crate::action::Action;
use crate::condition::Condition;
use crate::error::Result;

/// Completes once the accumulated tick delta reaches a duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wait {
    /// Duration in seconds
    pub duration: f32,
    /// Time accumulated during the current activation
    elapsed: f32,
}

impl Wait {
    /// Create a wait of `duration` seconds
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    /// Time accumulated so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Time left before completion
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

impl<C> Action<C> for Wait {
    fn update(&mut self, _ctx: &mut C, delta_time: f32) -> Result<()> {
        self.elapsed += delta_time;
        Ok(())
    }

    fn is_complete(&self, _ctx: &C) -> Result<bool> {
        Ok(self.elapsed >= self.duration)
    }

    fn reload(mut self: Box<Self>) -> Box<dyn Action<C>> {
        self.elapsed = 0.0;
        self
    }
}

/// Completes when a condition holds; does nothing per tick
pub struct WaitUntil<C> {
    condition: Condition<C>,
}

impl<C> WaitUntil<C> {
    /// Wait for `condition`
    pub fn new(condition: Condition<C>) -> Self {
        Self { condition }
    }
}

impl<C: 'static> Action<C> for WaitUntil<C> {
    fn is_complete(&self, ctx: &C) -> Result<bool> {
        self.condition.evaluate(ctx)
    }

    fn reload(self: Box<Self>) -> Box<dyn Action<C>> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_accumulates_delta() {
        let mut wait = Wait::new(1.0);
        let mut ctx = ();

        Action::<()>::update(&mut wait, &mut ctx, 0.25).unwrap();
        assert!(!Action::<()>::is_complete(&wait, &ctx).unwrap());
        assert_eq!(wait.remaining(), 0.75);

        Action::<()>::update(&mut wait, &mut ctx, 0.75).unwrap();
        assert!(Action::<()>::is_complete(&wait, &ctx).unwrap());
    }

    #[test]
    fn test_wait_reload_resets_elapsed() {
        let mut wait = Wait::new(1.0);
        Action::<()>::update(&mut wait, &mut (), 2.0).unwrap();

        let reloaded: Box<dyn Action<()>> = Box::new(wait).reload();
        assert!(!reloaded.is_complete(&()).unwrap());
    }

    #[test]
    fn test_wait_until_reads_context() {
        let wait = WaitUntil::new(Condition::new(|open: &bool| *open));
        assert!(!wait.is_complete(&false).unwrap());
        assert!(wait.is_complete(&true).unwrap());
    }
}
