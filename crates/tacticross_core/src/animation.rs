//! Round-win crossing animation as a tick-driven state machine.
//!
//! After a round win, one of the winner's creatures runs across the map:
//! first vertically, then horizontally, then it idles at its destination for
//! a short while. Positions are percentages of the map. The game engine never
//! reads any of this; presentation layers call [`CrossingAnimation::tick`] on
//! a fixed schedule and render [`CrossingAnimation::sprites`].

use crate::types::Side;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Distance covered per tick, in percent.
pub const STEP: i32 = 2;
/// Ticks spent idling at the destination.
pub const SETTLE_TICKS: u32 = 14;
/// Run-cycle frames.
const RUN_FRAMES: u8 = 8;

/// Current animation stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationPhase {
    /// Nothing animating.
    #[default]
    None,
    /// Running up (P1) or down (P2).
    CrossingVertical,
    /// Running left (P1) or right (P2).
    CrossingHorizontal,
    /// Idling at the destination.
    SettlingIdle,
}

/// On-map creature position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    /// Owning side.
    pub side: Side,
    /// Vertical offset in percent.
    pub top: i32,
    /// Horizontal offset in percent.
    pub left: i32,
    /// Whether this creature already crossed.
    pub finished: bool,
}

impl Sprite {
    const fn new(side: Side, top: i32, left: i32) -> Self {
        Self {
            side,
            top,
            left,
            finished: false,
        }
    }
}

/// Vertical then horizontal target for `side`.
fn targets(side: Side) -> (i32, i32) {
    match side {
        Side::P1 => (10, 29),
        Side::P2 => (80, 71),
    }
}

fn starting_sprites() -> [Sprite; 4] {
    [
        Sprite::new(Side::P1, 40, 71),
        Sprite::new(Side::P1, 50, 71),
        Sprite::new(Side::P2, 40, 29),
        Sprite::new(Side::P2, 50, 29),
    ]
}

/// Emitted by [`CrossingAnimation::tick`] when a crossing completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossingFinished {
    /// Side whose creature crossed.
    pub side: Side,
}

/// The crossing animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingAnimation {
    phase: AnimationPhase,
    sprites: [Sprite; 4],
    active: Option<usize>,
    frame: u8,
    settle_left: u32,
}

impl Default for CrossingAnimation {
    fn default() -> Self {
        Self {
            phase: AnimationPhase::None,
            sprites: starting_sprites(),
            active: None,
            frame: 0,
            settle_left: 0,
        }
    }
}

impl CrossingAnimation {
    /// Fresh animation state with every creature at home.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// All creatures.
    pub fn sprites(&self) -> &[Sprite; 4] {
        &self.sprites
    }

    /// The creature currently running.
    pub fn active(&self) -> Option<&Sprite> {
        self.active.and_then(|idx| self.sprites.get(idx))
    }

    /// Run-cycle frame.
    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Starts a crossing for `winner`'s first creature that has not crossed.
    ///
    /// Returns `false` while another crossing runs or when every creature of
    /// `winner` already crossed.
    #[instrument(skip(self))]
    pub fn start(&mut self, winner: Side) -> bool {
        if self.phase != AnimationPhase::None {
            return false;
        }
        let Some(idx) = self.sprites.iter().position(|s| s.side == winner && !s.finished) else {
            return false;
        };
        self.active = Some(idx);
        self.frame = 0;
        self.phase = AnimationPhase::CrossingVertical;
        debug!(idx, "Crossing started");
        true
    }

    /// Advances one scheduler tick.
    pub fn tick(&mut self) -> Option<CrossingFinished> {
        let idx = self.active?;
        let sprite = self.sprites.get_mut(idx)?;
        let side = sprite.side;
        let (top_target, left_target) = targets(side);
        let dir = match side {
            Side::P1 => -1,
            Side::P2 => 1,
        };

        match self.phase {
            AnimationPhase::None => None,
            AnimationPhase::CrossingVertical => {
                self.frame = (self.frame + 1) % RUN_FRAMES;
                if (sprite.top - top_target) * dir < 0 {
                    sprite.top += dir * STEP;
                } else {
                    self.frame = 0;
                    self.phase = AnimationPhase::CrossingHorizontal;
                }
                None
            }
            AnimationPhase::CrossingHorizontal => {
                self.frame = (self.frame + 1) % RUN_FRAMES;
                if (sprite.left - left_target) * dir < 0 {
                    sprite.left += dir * STEP;
                } else {
                    sprite.finished = true;
                    self.frame = 0;
                    self.settle_left = SETTLE_TICKS;
                    self.phase = AnimationPhase::SettlingIdle;
                }
                None
            }
            AnimationPhase::SettlingIdle => {
                self.settle_left = self.settle_left.saturating_sub(1);
                if self.settle_left > 0 {
                    return None;
                }
                self.phase = AnimationPhase::None;
                self.active = None;
                debug!(%side, "Crossing finished");
                Some(CrossingFinished { side })
            }
        }
    }

    /// Puts every creature back home, e.g. for a new match.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
