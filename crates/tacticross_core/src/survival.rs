//! HP-based survival progression layered on top of match results.
//!
//! A survival run pits one human against an endless ladder of AI opponents.
//! Each board round won or lost deals damage; depleting the AI's HP clears the
//! survival round and offers a power-up, depleting the player's HP ends the
//! run. Nothing here touches the board; it only consumes round winners.

use crate::types::{Difficulty, MapTheme, Side};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// Player HP at the start of a run, also the heal cap.
pub const PLAYER_MAX_HP: u32 = 2000;
/// AI HP in round one.
pub const BASE_AI_HP: u32 = 200;
/// Extra AI HP per cleared round.
pub const AI_HP_PER_ROUND: u32 = 100;
/// HP restored by [`PowerUp::Heal`].
pub const HEAL_AMOUNT: u32 = 1000;
/// HP granted by [`PowerUp::Hammer`].
pub const HAMMER_AMOUNT: u32 = 100;
/// The map rotates when the new round number leaves this remainder mod 5.
const MAP_ROTATION: u32 = 5;

/// Reward offered after clearing a round.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PowerUp {
    /// Restore 1000 HP.
    Heal,
    /// Double damage dealt next round.
    DoubleDamage,
    /// A small HP boost.
    Hammer,
}

/// Where the run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivalStatus {
    /// Board rounds are being played.
    Fighting,
    /// The AI was defeated; waiting for a power-up choice.
    ChoosingPowerUp,
    /// The player ran out of HP.
    Defeated,
}

/// Damage applied by one board round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundDamage {
    /// Side that took the damage.
    pub target: Side,
    /// HP removed.
    pub amount: u32,
    /// Status after the damage.
    pub status: SurvivalStatus,
}

/// Damage multiplier numerator over 2 for the AI's hits.
fn multiplier_halves(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 2,
        Difficulty::Medium => 3,
        Difficulty::Hard => 4,
    }
}

/// AI HP for survival round `round` (1-based).
pub fn ai_hp_for_round(round: u32) -> u32 {
    BASE_AI_HP + round.saturating_sub(1) * AI_HP_PER_ROUND
}

/// One survival run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SurvivalRun {
    /// Side the human plays.
    human: Side,
    /// AI difficulty.
    difficulty: Difficulty,
    /// Player HP.
    player_hp: u32,
    /// AI HP.
    ai_hp: u32,
    /// Current survival round, 1-based.
    round: u32,
    /// Highest round reached.
    best_streak: u32,
    /// Current map.
    map: MapTheme,
    /// Whether the next human hit is doubled.
    double_damage: bool,
    /// Run status.
    status: SurvivalStatus,
}

impl SurvivalRun {
    /// Starts a run on the lava map.
    #[instrument]
    pub fn new(human: Side, difficulty: Difficulty) -> Self {
        Self {
            human,
            difficulty,
            player_hp: PLAYER_MAX_HP,
            ai_hp: ai_hp_for_round(1),
            round: 1,
            best_streak: 1,
            map: MapTheme::default(),
            double_damage: false,
            status: SurvivalStatus::Fighting,
        }
    }

    /// Carries a best streak over from an earlier run.
    pub fn with_best_streak(mut self, best: u32) -> Self {
        self.best_streak = self.best_streak.max(best);
        self
    }

    /// Max AI HP for the current round.
    pub fn ai_max_hp(&self) -> u32 {
        ai_hp_for_round(self.round)
    }

    /// Applies the result of one board round.
    ///
    /// Returns `None` for a drawn round or when the run is not fighting.
    #[instrument(skip(self, rng), fields(round = self.round))]
    pub fn record_round<R: Rng + ?Sized>(&mut self, winner: Option<Side>, rng: &mut R) -> Option<RoundDamage> {
        if self.status != SurvivalStatus::Fighting {
            return None;
        }
        let winner = winner?;

        if winner == self.human {
            let base = rng.gen_range(200..500);
            let amount = if self.double_damage { base * 2 } else { base };
            self.double_damage = false;
            self.ai_hp = self.ai_hp.saturating_sub(amount);
            if self.ai_hp == 0 {
                info!(round = self.round, "AI defeated");
                self.status = SurvivalStatus::ChoosingPowerUp;
            }
            debug!(amount, ai_hp = self.ai_hp, "Player hit");
            Some(RoundDamage {
                target: self.human.opponent(),
                amount,
                status: self.status,
            })
        } else {
            let base: u32 = rng.gen_range(300..700);
            let amount = base * multiplier_halves(self.difficulty) / 2;
            self.player_hp = self.player_hp.saturating_sub(amount);
            if self.player_hp == 0 {
                info!(survived = self.round - 1, best = self.best_streak, "Run over");
                self.status = SurvivalStatus::Defeated;
            }
            debug!(amount, player_hp = self.player_hp, "AI hit");
            Some(RoundDamage {
                target: self.human,
                amount,
                status: self.status,
            })
        }
    }

    /// Applies the chosen power-up and advances to the next round.
    ///
    /// Returns `false` when no power-up choice is pending.
    #[instrument(skip(self, rng))]
    pub fn choose_power_up<R: Rng + ?Sized>(&mut self, power_up: PowerUp, rng: &mut R) -> bool {
        if self.status != SurvivalStatus::ChoosingPowerUp {
            return false;
        }
        match power_up {
            PowerUp::Heal => self.player_hp = (self.player_hp + HEAL_AMOUNT).min(PLAYER_MAX_HP),
            PowerUp::DoubleDamage => self.double_damage = true,
            PowerUp::Hammer => self.player_hp = (self.player_hp + HAMMER_AMOUNT).min(PLAYER_MAX_HP),
        }
        self.next_round(rng);
        true
    }

    fn next_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.round += 1;
        self.best_streak = self.best_streak.max(self.round);
        self.ai_hp = ai_hp_for_round(self.round);
        if self.round % MAP_ROTATION == 1 {
            let maps: Vec<MapTheme> = MapTheme::iter().collect();
            self.map = maps[rng.gen_range(0..maps.len())];
            info!(map = %self.map, "Map changed");
        }
        self.status = SurvivalStatus::Fighting;
    }

    /// Starts over, keeping the best streak.
    pub fn restart(&mut self) {
        *self = Self::new(self.human, self.difficulty).with_best_streak(self.best_streak);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(9)
    }

    #[test]
    fn test_new_run() {
        let run = SurvivalRun::new(Side::P1, Difficulty::Medium);
        assert_eq!(*run.player_hp(), 2000);
        assert_eq!(*run.ai_hp(), 200);
        assert_eq!(*run.round(), 1);
        assert_eq!(*run.map(), MapTheme::Lava);
    }

    #[test]
    fn test_human_win_damages_ai() {
        let mut run = SurvivalRun::new(Side::P1, Difficulty::Easy);
        let damage = run.record_round(Some(Side::P1), &mut rng()).unwrap();
        assert_eq!(damage.target, Side::P2);
        assert!((200..500).contains(&damage.amount));
        // Round-one AI HP is below the minimum hit.
        assert_eq!(*run.ai_hp(), 0);
        assert_eq!(*run.status(), SurvivalStatus::ChoosingPowerUp);
    }

    #[test]
    fn test_ai_win_scales_with_difficulty() {
        let mut easy = SurvivalRun::new(Side::P1, Difficulty::Easy);
        let mut hard = SurvivalRun::new(Side::P1, Difficulty::Hard);
        let a = easy.record_round(Some(Side::P2), &mut rng()).unwrap();
        let b = hard.record_round(Some(Side::P2), &mut rng()).unwrap();
        assert_eq!(b.amount, a.amount * 2);
        assert!((300..700).contains(&a.amount));
    }

    #[test]
    fn test_draw_deals_nothing() {
        let mut run = SurvivalRun::new(Side::P1, Difficulty::Easy);
        assert_eq!(run.record_round(None, &mut rng()), None);
        assert_eq!(*run.player_hp(), PLAYER_MAX_HP);
    }

    #[test]
    fn test_power_up_advances_round() {
        let mut rng = rng();
        let mut run = SurvivalRun::new(Side::P1, Difficulty::Medium);
        assert!(!run.choose_power_up(PowerUp::Heal, &mut rng));
        run.record_round(Some(Side::P1), &mut rng);
        assert!(run.choose_power_up(PowerUp::DoubleDamage, &mut rng));
        assert_eq!(*run.round(), 2);
        assert_eq!(*run.ai_hp(), 300);
        assert_eq!(*run.best_streak(), 2);
        assert!(*run.double_damage());

        let hit = run.record_round(Some(Side::P1), &mut rng).unwrap();
        assert!((400..1000).contains(&hit.amount));
        assert!(!*run.double_damage());
    }

    #[test]
    fn test_heal_is_capped() {
        let mut rng = rng();
        let mut run = SurvivalRun::new(Side::P1, Difficulty::Easy);
        run.record_round(Some(Side::P2), &mut rng);
        run.status = SurvivalStatus::ChoosingPowerUp;
        run.choose_power_up(PowerUp::Heal, &mut rng);
        assert_eq!(*run.player_hp(), PLAYER_MAX_HP);
    }

    #[test]
    fn test_player_defeat_and_restart() {
        let mut rng = rng();
        let mut run = SurvivalRun::new(Side::P2, Difficulty::Hard);
        while *run.status() == SurvivalStatus::Fighting {
            run.record_round(Some(Side::P1), &mut rng);
        }
        assert_eq!(*run.status(), SurvivalStatus::Defeated);
        assert_eq!(*run.player_hp(), 0);
        assert_eq!(run.record_round(Some(Side::P2), &mut rng), None);

        run.restart();
        assert_eq!(*run.player_hp(), PLAYER_MAX_HP);
        assert_eq!(*run.status(), SurvivalStatus::Fighting);
    }

    #[test]
    fn test_map_rotates_every_fifth_round() {
        let mut rng = rng();
        let mut run = SurvivalRun::new(Side::P1, Difficulty::Easy);
        for _ in 0..4 {
            run.status = SurvivalStatus::ChoosingPowerUp;
            run.choose_power_up(PowerUp::Hammer, &mut rng);
            assert_eq!(*run.map(), MapTheme::Lava);
        }
        assert_eq!(*run.round(), 5);
        run.status = SurvivalStatus::ChoosingPowerUp;
        run.choose_power_up(PowerUp::Hammer, &mut rng);
        assert_eq!(*run.round(), 6);
        assert_eq!(*run.best_streak(), 6);
    }
}
