// SPDX-License-Identifier: MIT OR Apache-2.0
//! Test fixtures: a recording context and instrumented actions.

use crate::action::Action;
use crate::error::{Result, SequenceError};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared event log, readable after the context has been borrowed
#[derive(Debug, Clone, Default)]
pub(crate) struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub(crate) fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }
}

/// Context used throughout the unit tests
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub log: Log,
    pub flag: bool,
    pub value: i32,
    pub invalid: bool,
}

impl Recorder {
    pub(crate) fn events(&self) -> Vec<String> {
        self.log.events()
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.log.count(event)
    }

    pub(crate) fn push(&mut self, event: impl Into<String>) {
        self.log.push(event);
    }
}

/// Logs every hook as `name:hook`.
///
/// Reload hands back a fresh tracer with the same configuration. Pending
/// failures carry over so a failing tracer keeps failing across retries.
#[derive(Debug, Clone)]
pub(crate) struct Tracer {
    name: &'static str,
    log: Log,
    complete_after: Option<u32>,
    failing_updates: u32,
    failing_starts: u32,
    failing_ends: u32,
    updates: u32,
}

impl Tracer {
    pub(crate) fn new(recorder: &Recorder, name: &'static str) -> Self {
        Self {
            name,
            log: recorder.log.clone(),
            complete_after: None,
            failing_updates: 0,
            failing_starts: 0,
            failing_ends: 0,
            updates: 0,
        }
    }

    pub(crate) fn complete_after(mut self, updates: u32) -> Self {
        self.complete_after = Some(updates);
        self
    }

    pub(crate) fn fail_updates(mut self, count: u32) -> Self {
        self.failing_updates = count;
        self
    }

    pub(crate) fn fail_starts(mut self, count: u32) -> Self {
        self.failing_starts = count;
        self
    }

    pub(crate) fn fail_ends(mut self, count: u32) -> Self {
        self.failing_ends = count;
        self
    }

    fn record(&self, hook: &str) {
        self.log.push(format!("{}:{}", self.name, hook));
    }
}

impl Action<Recorder> for Tracer {
    fn on_start(&mut self, _ctx: &mut Recorder) -> Result<()> {
        if self.failing_starts > 0 {
            self.failing_starts -= 1;
            self.record("start-failed");
            return Err(SequenceError::action("start failed"));
        }
        self.record("start");
        Ok(())
    }

    fn update(&mut self, ctx: &mut Recorder, _delta_time: f32) -> Result<()> {
        if ctx.invalid {
            return Err(SequenceError::invalid_context("recorder marked invalid"));
        }
        if self.failing_updates > 0 {
            self.failing_updates -= 1;
            self.record("update-failed");
            return Err(SequenceError::action("update failed"));
        }
        self.updates += 1;
        self.record("update");
        Ok(())
    }

    fn is_complete(&self, _ctx: &Recorder) -> Result<bool> {
        Ok(self.complete_after.is_some_and(|n| self.updates >= n))
    }

    fn on_end(&mut self, _ctx: &mut Recorder) -> Result<()> {
        if self.failing_ends > 0 {
            self.failing_ends -= 1;
            self.record("end-failed");
            return Err(SequenceError::action("end failed"));
        }
        self.record("end");
        Ok(())
    }

    fn reload(self: Box<Self>) -> Box<dyn Action<Recorder>> {
        self.record("reload");
        let mut tracer = *self;
        tracer.updates = 0;
        Box::new(tracer)
    }
}

/// Adds one to `Recorder::value` per update, completing after `per_pass`
/// updates. Its own tally either survives reloads or starts over.
#[derive(Debug, Clone)]
pub(crate) struct Counter {
    pub tally: i32,
    per_pass: i32,
    done_this_pass: i32,
    keep_on_reload: bool,
    snapshots: Log,
}

impl Counter {
    /// Reload builds a new counter from scratch
    pub(crate) fn fresh(per_pass: i32, snapshots: &Log) -> Self {
        Self {
            tally: 0,
            per_pass,
            done_this_pass: 0,
            keep_on_reload: false,
            snapshots: snapshots.clone(),
        }
    }

    /// Reload hands back the same counter
    pub(crate) fn retained(per_pass: i32, snapshots: &Log) -> Self {
        Self {
            keep_on_reload: true,
            ..Self::fresh(per_pass, snapshots)
        }
    }
}

impl Action<Recorder> for Counter {
    fn on_start(&mut self, _ctx: &mut Recorder) -> Result<()> {
        self.snapshots.push(format!("start:{}", self.tally));
        Ok(())
    }

    fn update(&mut self, ctx: &mut Recorder, _delta_time: f32) -> Result<()> {
        self.tally += 1;
        self.done_this_pass += 1;
        ctx.value += 1;
        Ok(())
    }

    fn is_complete(&self, _ctx: &Recorder) -> Result<bool> {
        Ok(self.done_this_pass >= self.per_pass)
    }

    fn reload(self: Box<Self>) -> Box<dyn Action<Recorder>> {
        if self.keep_on_reload {
            let mut this = self;
            this.done_this_pass = 0;
            this
        } else {
            Box::new(Counter::fresh(self.per_pass, &self.snapshots))
        }
    }
}
