// SPDX-License-Identifier: MIT OR Apache-2.0
//! The hive: forager bees and a keeper turning nectar into honey.
//!
//! Every bee runs its own forage loop against its own [`Bee`] context. The
//! shared [`Ledger`] is reached through the context, never through globals.

use crate::config::{DemoConfig, DemoError};
use ordoplay_behavior::{
    step, Action, BuilderMisuseError, Result, Sequence, SequenceBuilder, SequenceError,
    SequencerSettings, TryCallback, Wait,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Distance from the hive to the flower field
pub const FIELD_DISTANCE: f32 = 10.0;
/// Flight speed in distance per second
pub const BEE_SPEED: f32 = 4.0;
/// Nectar a bee can carry
pub const BEE_CAPACITY: f32 = 5.0;
/// Seconds a bee may rest after gathering
pub const REST_SECONDS: f32 = 1.0;
/// Seconds between wing beats
pub const WINGBEAT_PERIOD: f32 = 0.25;
/// Nectar consumed per unit of honey
pub const NECTAR_PER_HONEY: f32 = 10.0;

/// Hive stores shared by every bee and the keeper
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    /// Nectar waiting to be brewed
    pub nectar: f32,
    /// Honey produced so far
    pub honey: u32,
    /// Loads delivered by foragers
    pub deposits: u32,
}

/// Shared handle to the hive stores
pub type SharedLedger = Rc<RefCell<Ledger>>;

/// A forager bee
#[derive(Debug)]
pub struct Bee {
    /// Display name
    pub name: String,
    /// Distance from the hive
    pub position: f32,
    /// Nectar carried
    pub load: f32,
    /// Wing beats so far
    pub wingbeats: u32,
    ledger: SharedLedger,
}

impl Bee {
    /// A bee waiting at the hive entrance
    pub fn new(name: impl Into<String>, ledger: SharedLedger) -> Self {
        Self {
            name: name.into(),
            position: 0.0,
            load: 0.0,
            wingbeats: 0,
            ledger,
        }
    }

    /// Whether the bee cannot carry any more
    pub fn is_full(&self) -> bool {
        self.load >= BEE_CAPACITY
    }

    /// Hand the load over to the hive
    pub fn deposit(&mut self) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.nectar += self.load;
        ledger.deposits += 1;
        tracing::info!(
            bee = %self.name,
            load = self.load,
            stored = ledger.nectar,
            "nectar deposited"
        );
        self.load = 0.0;
    }
}

/// Fly in a straight line to `target`
#[derive(Debug, Clone)]
pub struct Fly {
    target: f32,
    arrived: bool,
}

impl Fly {
    /// Fly to a distance from the hive
    pub fn to(target: f32) -> Self {
        Self {
            target,
            arrived: false,
        }
    }
}

impl Action<Bee> for Fly {
    fn on_start(&mut self, bee: &mut Bee) -> Result<()> {
        tracing::debug!(bee = %bee.name, from = bee.position, to = self.target, "taking off");
        Ok(())
    }

    fn update(&mut self, bee: &mut Bee, delta_time: f32) -> Result<()> {
        let stride = BEE_SPEED * delta_time;
        let gap = self.target - bee.position;
        if gap.abs() <= stride {
            bee.position = self.target;
            self.arrived = true;
        } else {
            bee.position += stride.copysign(gap);
        }
        Ok(())
    }

    fn is_complete(&self, _bee: &Bee) -> Result<bool> {
        Ok(self.arrived)
    }

    fn reload(self: Box<Self>) -> Box<dyn Action<Bee>> {
        Box::new(Fly::to(self.target))
    }
}

/// Collect nectar from one kind of flower until full
#[derive(Debug, Clone)]
pub struct Gather {
    flower: &'static str,
    rate: f32,
    gathered: f32,
}

impl Gather {
    /// Gather `rate` nectar per second from `flower`
    pub fn new(flower: &'static str, rate: f32) -> Self {
        Self {
            flower,
            rate,
            gathered: 0.0,
        }
    }
}

impl Action<Bee> for Gather {
    fn on_start(&mut self, bee: &mut Bee) -> Result<()> {
        if bee.position < FIELD_DISTANCE {
            return Err(SequenceError::invalid_context(format!(
                "{} is not at the field",
                bee.name
            )));
        }
        tracing::debug!(bee = %bee.name, flower = self.flower, "gathering");
        Ok(())
    }

    fn update(&mut self, bee: &mut Bee, delta_time: f32) -> Result<()> {
        let before = bee.load;
        bee.load = (bee.load + self.rate * delta_time).min(BEE_CAPACITY);
        self.gathered += bee.load - before;
        Ok(())
    }

    fn is_complete(&self, bee: &Bee) -> Result<bool> {
        Ok(bee.is_full())
    }

    fn on_end(&mut self, bee: &mut Bee) -> Result<()> {
        tracing::debug!(bee = %bee.name, flower = self.flower, gathered = self.gathered, "full");
        Ok(())
    }

    fn reload(self: Box<Self>) -> Box<dyn Action<Bee>> {
        Box::new(Gather::new(self.flower, self.rate))
    }
}

/// A bee's endless foraging loop, with wing beats ticking alongside
pub fn forage(
    settings: SequencerSettings,
) -> std::result::Result<Sequence<Bee>, BuilderMisuseError> {
    let wings = SequenceBuilder::new("wingbeat")
        .with_settings(settings.clone())
        .wait(WINGBEAT_PERIOD)
        .then(|bee: &mut Bee| bee.wingbeats += 1)
        .repeat_forever()
        .done()?;

    SequenceBuilder::new("forage")
        .with_settings(settings)
        .then(Fly::to(FIELD_DISTANCE))
        .random_one_of_weighted(vec![
            (3.0, step(Gather::new("clover", 1.0))),
            (1.0, step(Gather::new("lavender", 2.5))),
        ])
        .maybe(Wait::new(REST_SECONDS))
        .then(Fly::to(0.0))
        .if_(Bee::is_full)
        .then(Bee::deposit)
        .or(|bee: &mut Bee| {
            tracing::warn!(bee = %bee.name, load = bee.load, "came home short, dropping load");
            bee.load = 0.0;
        })
        .alongside(wings)
        .and_repeat_forever()
        .and_then_stop()
}

/// Tends the stores
#[derive(Debug)]
pub struct Keeper {
    /// Cells capped so far
    pub capped: u32,
    ledger: SharedLedger,
}

impl Keeper {
    /// A keeper for the given stores
    pub fn new(ledger: SharedLedger) -> Self {
        Self { capped: 0, ledger }
    }

    fn has_nectar(&self) -> bool {
        self.ledger.borrow().nectar >= NECTAR_PER_HONEY
    }

    fn make_honey(&mut self) -> Result<()> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.nectar < NECTAR_PER_HONEY {
            return Err(SequenceError::invalid_context("not enough nectar to brew"));
        }
        ledger.nectar -= NECTAR_PER_HONEY;
        ledger.honey += 1;
        tracing::info!(honey = ledger.honey, "honey made");
        Ok(())
    }
}

/// The keeper's loop: wait for nectar, fan and cap in parallel, then brew
pub fn brew(
    settings: SequencerSettings,
) -> std::result::Result<Sequence<Keeper>, BuilderMisuseError> {
    let fan = SequenceBuilder::new("fan")
        .with_settings(settings.clone())
        .wait(2.0)
        .done()?;
    let cap = SequenceBuilder::new("cap cells")
        .with_settings(settings.clone())
        .wait(1.0)
        .then(|keeper: &mut Keeper| keeper.capped += 1)
        .done()?;

    SequenceBuilder::new("brew")
        .with_settings(settings)
        .wait_until(Keeper::has_nectar)
        .in_parallel([fan, cap])
        .then(TryCallback::new(Keeper::make_honey))
        .repeat_forever()
        .done()
}

/// Totals after a run
#[derive(Debug, Clone, PartialEq)]
pub struct HiveReport {
    /// Ticks simulated
    pub ticks: u32,
    /// Final stores
    pub ledger: Ledger,
    /// Wing beats across all bees
    pub wingbeats: u32,
    /// Cells capped by the keeper
    pub capped: u32,
}

/// Run the hive for the configured number of ticks
pub fn run(config: &DemoConfig) -> std::result::Result<HiveReport, DemoError> {
    config.validate()?;

    let ledger = SharedLedger::default();
    let mut foragers = (0..config.bees)
        .map(|index| {
            let bee = Bee::new(format!("bee-{index}"), Rc::clone(&ledger));
            forage(config.settings_for(index)).map(|behavior| (bee, behavior))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let mut keeper = Keeper::new(Rc::clone(&ledger));
    let mut brewing = brew(config.sequencer.clone())?;

    tracing::info!(bees = config.bees, ticks = config.ticks, "hive open");
    for _ in 0..config.ticks {
        for (bee, behavior) in &mut foragers {
            behavior.advance(bee, config.delta_time)?;
        }
        brewing.advance(&mut keeper, config.delta_time)?;
    }

    let report = HiveReport {
        ticks: config.ticks,
        ledger: ledger.borrow().clone(),
        wingbeats: foragers.iter().map(|(bee, _)| bee.wingbeats).sum(),
        capped: keeper.capped,
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordoplay_behavior::StepOutcome;

    fn seeded(seed: u64) -> DemoConfig {
        DemoConfig {
            sequencer: SequencerSettings::seeded(seed),
            ..DemoConfig::default()
        }
    }

    #[test]
    fn test_fly_reaches_target() {
        let mut bee = Bee::new("test", SharedLedger::default());
        let mut flight = SequenceBuilder::new("flight")
            .then(Fly::to(FIELD_DISTANCE))
            .done()
            .unwrap();

        for _ in 0..4 {
            assert_eq!(flight.advance(&mut bee, 0.5).unwrap(), StepOutcome::Running);
        }
        assert_eq!(flight.advance(&mut bee, 0.5).unwrap(), StepOutcome::Complete);
        assert_eq!(bee.position, FIELD_DISTANCE);
    }

    #[test]
    fn test_gather_away_from_field_fails() {
        let mut bee = Bee::new("test", SharedLedger::default());
        let mut gathering = SequenceBuilder::new("gather")
            .then(Gather::new("clover", 1.0))
            .done()
            .unwrap();

        let error = gathering.advance(&mut bee, 0.1).unwrap_err();
        assert!(matches!(error, SequenceError::InvalidContext(_)));
        assert_eq!(bee.load, 0.0);
    }

    #[test]
    fn test_deposit_updates_ledger() {
        let ledger = SharedLedger::default();
        let mut bee = Bee::new("test", Rc::clone(&ledger));
        bee.load = BEE_CAPACITY;
        bee.deposit();

        assert_eq!(bee.load, 0.0);
        assert_eq!(ledger.borrow().deposits, 1);
        assert_eq!(ledger.borrow().nectar, BEE_CAPACITY);
    }

    #[test]
    fn test_hive_makes_honey() {
        let report = run(&seeded(3)).unwrap();

        assert!(report.ledger.deposits >= 3);
        assert!(report.ledger.honey >= 1);
        assert!(report.capped >= report.ledger.honey);
        assert!(report.wingbeats > 0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        assert_eq!(run(&seeded(11)).unwrap(), run(&seeded(11)).unwrap());
    }

    #[test]
    fn test_rejects_empty_hive() {
        let config = DemoConfig {
            bees: 0,
            ..DemoConfig::default()
        };
        assert!(matches!(run(&config), Err(DemoError::Invalid(_))));
    }
}
