// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parallel groups: sequences advanced together within one tick.
//!
//! Members are ticked one after another in declaration order. They share
//! nothing but the context; one member finishing has no effect on the rest.

use crate::error::Result;
use crate::sequence::{Sequence, SequenceId, StepOutcome};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// When a group as a whole counts as complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupCompletion {
    /// Once every member is complete
    All,
    /// Once any member is complete
    Any,
    /// Never; for ambient background sequences
    #[default]
    Never,
}

/// A set of independently progressing sequences
pub struct ParallelGroup<C> {
    members: IndexMap<SequenceId, Sequence<C>>,
    completion: GroupCompletion,
}

impl<C> ParallelGroup<C> {
    /// Create an empty group
    pub fn new(completion: GroupCompletion) -> Self {
        Self {
            members: IndexMap::new(),
            completion,
        }
    }

    /// Create a group from sequences, keeping their order
    pub fn from_sequences(
        sequences: impl IntoIterator<Item = Sequence<C>>,
        completion: GroupCompletion,
    ) -> Self {
        let mut group = Self::new(completion);
        for sequence in sequences {
            group.insert(sequence);
        }
        group
    }

    /// Add a member at the end of the tick order
    pub fn insert(&mut self, sequence: Sequence<C>) -> SequenceId {
        let id = sequence.id;
        self.members.insert(id, sequence);
        id
    }

    /// Remove a member, keeping the order of the others
    pub fn remove(&mut self, id: SequenceId) -> Option<Sequence<C>> {
        self.members.shift_remove(&id)
    }

    /// Get a member
    pub fn get(&self, id: SequenceId) -> Option<&Sequence<C>> {
        self.members.get(&id)
    }

    /// Get a mutable member
    pub fn get_mut(&mut self, id: SequenceId) -> Option<&mut Sequence<C>> {
        self.members.get_mut(&id)
    }

    /// Members in tick order
    pub fn iter(&self) -> impl Iterator<Item = &Sequence<C>> {
        self.members.values()
    }

    /// Member count
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Completion policy
    pub fn completion(&self) -> GroupCompletion {
        self.completion
    }

    /// Reset every member
    pub fn reset(&mut self) {
        for member in self.members.values_mut() {
            member.reset();
        }
    }

    /// Tick every member once, in order.
    ///
    /// Stops at the first member that fails; members after it are not
    /// ticked this time. Members ahead of it have already advanced and are
    /// not rolled back, so retrying the call ticks them again.
    pub fn advance(&mut self, ctx: &mut C, delta_time: f32) -> Result<StepOutcome> {
        let mut complete = 0;
        for member in self.members.values_mut() {
            if member.advance(ctx, delta_time)? == StepOutcome::Complete {
                complete += 1;
            }
        }

        let done = match self.completion {
            GroupCompletion::All => complete == self.members.len(),
            GroupCompletion::Any => complete > 0,
            GroupCompletion::Never => false,
        };

        Ok(if done {
            StepOutcome::Complete
        } else {
            StepOutcome::Running
        })
    }
}

impl<C> fmt::Debug for ParallelGroup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelGroup")
            .field("members", &self.members.values().collect::<Vec<_>>())
            .field("completion", &self.completion)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SequenceBuilder;
    use crate::sequence::SequenceStatus;
    use crate::testing::{Tracer, Recorder};

    #[test]
    fn test_members_progress_independently() {
        let mut recorder = Recorder::default();
        let forever = SequenceBuilder::new("forever")
            .then(|r: &mut Recorder| r.value += 1)
            .wait(0.1)
            .repeat_forever()
            .done()
            .unwrap();
        let once = SequenceBuilder::new("once")
            .wait(0.25)
            .then(|r: &mut Recorder| r.push("once"))
            .done()
            .unwrap();

        let mut group = ParallelGroup::new(GroupCompletion::Never);
        let forever_id = group.insert(forever);
        let once_id = group.insert(once);

        for _ in 0..10 {
            assert_eq!(group.advance(&mut recorder, 0.1).unwrap(), StepOutcome::Running);
        }

        assert_eq!(group.get(once_id).unwrap().status(), SequenceStatus::Complete);
        assert_eq!(recorder.count("once"), 1);
        assert_eq!(group.get(forever_id).unwrap().status(), SequenceStatus::Running);
        assert_eq!(group.get(forever_id).unwrap().passes(), 10);
        assert_eq!(recorder.value, 10);
    }

    #[test]
    fn test_completion_policies() {
        let build = || {
            vec![
                SequenceBuilder::new("short").wait(0.1).done().unwrap(),
                SequenceBuilder::new("long").wait(0.3).done().unwrap(),
            ]
        };
        let mut recorder = Recorder::default();

        let mut any = ParallelGroup::from_sequences(build(), GroupCompletion::Any);
        assert_eq!(any.advance(&mut recorder, 0.1).unwrap(), StepOutcome::Complete);

        let mut all = ParallelGroup::from_sequences(build(), GroupCompletion::All);
        assert_eq!(all.advance(&mut recorder, 0.1).unwrap(), StepOutcome::Running);
        assert_eq!(all.advance(&mut recorder, 0.1).unwrap(), StepOutcome::Running);
        assert_eq!(all.advance(&mut recorder, 0.15).unwrap(), StepOutcome::Complete);
    }

    #[test]
    fn test_members_ticked_in_declaration_order() {
        let mut recorder = Recorder::default();
        let mut group = ParallelGroup::new(GroupCompletion::All);
        for name in ["first", "second", "third"] {
            group.insert(
                SequenceBuilder::new(name)
                    .then(move |r: &mut Recorder| r.push(name))
                    .done()
                    .unwrap(),
            );
        }

        group.advance(&mut recorder, 0.1).unwrap();
        assert_eq!(recorder.events(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_retry_after_failure_ticks_earlier_members_again() {
        let mut recorder = Recorder::default();
        let mut group = ParallelGroup::new(GroupCompletion::All);
        group.insert(
            SequenceBuilder::new("steady")
                .then(Tracer::new(&recorder, "a"))
                .done()
                .unwrap(),
        );
        let flaky = group.insert(
            SequenceBuilder::new("flaky")
                .then(Tracer::new(&recorder, "b").fail_updates(1).complete_after(1))
                .done()
                .unwrap(),
        );

        assert!(group.advance(&mut recorder, 0.1).is_err());
        assert_eq!(recorder.count("a:update"), 1);
        assert_eq!(recorder.count("b:update-failed"), 1);

        assert_eq!(group.advance(&mut recorder, 0.1).unwrap(), StepOutcome::Running);
        assert_eq!(recorder.count("a:update"), 2);
        assert_eq!(recorder.count("b:update"), 1);
        assert!(group.get(flaky).unwrap().is_complete());
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut group: ParallelGroup<Recorder> = ParallelGroup::new(GroupCompletion::Never);
        let a = group.insert(SequenceBuilder::new("a").done().unwrap());
        let b = group.insert(SequenceBuilder::new("b").done().unwrap());
        let c = group.insert(SequenceBuilder::new("c").done().unwrap());

        assert!(group.remove(b).is_some());
        let ids: Vec<_> = group.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, c]);
    }
}
