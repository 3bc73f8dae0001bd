//! Survival runs played through the match driver.
//!
//! A [`SurvivalSession`] listens to [`MatchEvent`]s. Every decided board round
//! deals damage through [`SurvivalRun`], and a round won by the human sends
//! one of their creatures across the map. The session answers with the
//! [`DriverCommand`] the driver needs next: a fresh match once the current one
//! is decided, or a stop once the human runs out of HP.

use crate::driver::{DriverCommand, MatchEvent};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tacticross_core::survival::PLAYER_MAX_HP;
use tacticross_core::{
    CrossingAnimation, Difficulty, MapTheme, PowerUp, RoundDamage, Side, SurvivalRun, SurvivalStatus,
};
use tracing::{debug, info, instrument};

/// Upper bound on ticks for one crossing; a full run takes well under this.
const CROSSING_TICK_LIMIT: u32 = 500;

/// Something the presentation layer should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurvivalUpdate {
    /// A board round dealt damage.
    Damage(RoundDamage),
    /// A creature of `side` finished crossing the map.
    Crossed(Side),
    /// The AI fell; a power-up was applied and the next opponent is up.
    PowerUp {
        /// Power-up taken.
        choice: PowerUp,
        /// New survival round.
        round: u32,
        /// Map for the new round.
        map: MapTheme,
    },
    /// The human ran out of HP.
    RunOver {
        /// Survival rounds cleared.
        survived: u32,
        /// Best round reached.
        best: u32,
    },
}

/// Result of feeding one event to the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurvivalStep {
    /// What changed, in order.
    pub updates: Vec<SurvivalUpdate>,
    /// Command to send to the driver, if any.
    pub command: Option<DriverCommand>,
}

/// Picks a power-up by HP: heal when at half or below, otherwise hit harder.
pub fn auto_power_up(run: &SurvivalRun) -> PowerUp {
    if *run.player_hp() <= PLAYER_MAX_HP / 2 {
        PowerUp::Heal
    } else if *run.player_hp() < PLAYER_MAX_HP {
        PowerUp::Hammer
    } else {
        PowerUp::DoubleDamage
    }
}

/// Survival bookkeeping for one human against a ladder of AI opponents.
#[derive(Debug)]
pub struct SurvivalSession {
    run: SurvivalRun,
    animation: CrossingAnimation,
    preferred: Option<PowerUp>,
    rng: SmallRng,
}

impl SurvivalSession {
    /// Starts a run for `human` against AI of `difficulty`.
    pub fn new(human: Side, difficulty: Difficulty, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            run: SurvivalRun::new(human, difficulty),
            animation: CrossingAnimation::new(),
            preferred: None,
            rng,
        }
    }

    /// Always takes `power_up` instead of choosing by HP.
    pub fn with_power_up(mut self, power_up: Option<PowerUp>) -> Self {
        self.preferred = power_up;
        self
    }

    /// The run's HP, round and status.
    pub fn run(&self) -> &SurvivalRun {
        &self.run
    }

    /// Creature positions on the map.
    pub fn animation(&self) -> &CrossingAnimation {
        &self.animation
    }

    /// Applies one driver event.
    #[instrument(skip(self, event), fields(round = *self.run.round()))]
    pub fn on_event(&mut self, event: &MatchEvent) -> SurvivalStep {
        let mut step = SurvivalStep::default();
        match event {
            MatchEvent::RoundOver { winner, .. } => {
                let Some(damage) = self.run.record_round(*winner, &mut self.rng) else {
                    debug!("Round dealt no damage");
                    return step;
                };
                step.updates.push(SurvivalUpdate::Damage(damage));
                let human = *self.run.human();
                if *winner == Some(human) && let Some(side) = self.cross(human) {
                    step.updates.push(SurvivalUpdate::Crossed(side));
                }
                match self.run.status() {
                    SurvivalStatus::ChoosingPowerUp => {
                        let choice = self.preferred.unwrap_or_else(|| auto_power_up(&self.run));
                        self.run.choose_power_up(choice, &mut self.rng);
                        info!(%choice, round = *self.run.round(), "Next opponent");
                        step.updates.push(SurvivalUpdate::PowerUp {
                            choice,
                            round: *self.run.round(),
                            map: *self.run.map(),
                        });
                    }
                    SurvivalStatus::Defeated => {
                        step.updates.push(SurvivalUpdate::RunOver {
                            survived: self.run.round() - 1,
                            best: *self.run.best_streak(),
                        });
                        step.command = Some(DriverCommand::Quit);
                    }
                    SurvivalStatus::Fighting => {}
                }
            }
            MatchEvent::GameOver { .. } if *self.run.status() != SurvivalStatus::Defeated => {
                self.animation.reset();
                step.command = Some(DriverCommand::ResetMatch);
            }
            _ => {}
        }
        step
    }

    /// Plays a crossing for `side` to completion.
    ///
    /// Returns `None` when every creature of `side` already crossed.
    fn cross(&mut self, side: Side) -> Option<Side> {
        if !self.animation.start(side) {
            return None;
        }
        (0..CROSSING_TICK_LIMIT).find_map(|_| self.animation.tick()).map(|done| done.side)
    }
}
