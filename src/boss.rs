/// Boss AI: a shuffled vertical move pattern, a probabilistic cannon, and a
/// two-state shield.
///
/// Shield machine, evaluated once per tick after the boss has moved:
///
/// ```text
///   Unshielded ──(draw < SHIELD_PROBABILITY)──▶ Shielded
///   Shielded ──(frames_with_shield == MAX_FRAMES_WITH_SHIELD)──▶ Unshielded
/// ```

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::entities::{BossBrain, ShieldState};

pub const INITIAL_X: f64 = 1000.0;
pub const INITIAL_Y: f64 = 400.0;
pub const HEALTH: u32 = 10;
pub const PROJECTILE_Y_OFFSET: f64 = 75.0;

pub const Y_UPPER_BOUND: f64 = -100.0;
pub const Y_LOWER_BOUND: f64 = 475.0;

pub const VERTICAL_VELOCITY: i32 = 8;
/// How many times each of +V, −V and 0 appears in the pattern.
pub const MOVE_FREQUENCY_PER_CYCLE: usize = 5;
pub const MAX_FRAMES_WITH_SAME_MOVE: u32 = 10;
pub const MAX_FRAMES_WITH_SHIELD: u32 = 50;

pub const FIRE_RATE: f64 = 0.04;
pub const SHIELD_PROBABILITY: f64 = 0.002;

/// Shield transitions the HUD has to mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShieldEvent {
    Raised,
    Lowered,
}

pub fn fires_this_frame(rng: &mut dyn RngCore) -> bool {
    rng.gen_bool(FIRE_RATE)
}

impl BossBrain {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let mut move_pattern = Vec::with_capacity(MOVE_FREQUENCY_PER_CYCLE * 3);
        for _ in 0..MOVE_FREQUENCY_PER_CYCLE {
            move_pattern.push(VERTICAL_VELOCITY);
            move_pattern.push(-VERTICAL_VELOCITY);
            move_pattern.push(0);
        }
        move_pattern.shuffle(rng);
        BossBrain {
            move_pattern,
            move_index: 0,
            consecutive_moves: 0,
            shield: ShieldState::Unshielded,
            frames_with_shield: 0,
        }
    }

    pub fn is_shielded(&self) -> bool {
        self.shield == ShieldState::Shielded
    }

    /// Vertical velocity for this tick. Every `MAX_FRAMES_WITH_SAME_MOVE`
    /// reads the pattern is reshuffled and the cursor steps forward.
    pub fn next_move(&mut self, rng: &mut dyn RngCore) -> i32 {
        let current = self.move_pattern[self.move_index];
        self.consecutive_moves += 1;
        if self.consecutive_moves == MAX_FRAMES_WITH_SAME_MOVE {
            self.move_pattern.shuffle(rng);
            self.consecutive_moves = 0;
            self.move_index += 1;
        }
        if self.move_index == self.move_pattern.len() {
            self.move_index = 0;
        }
        current
    }

    pub fn update_shield(&mut self, rng: &mut dyn RngCore) -> Option<ShieldEvent> {
        let mut event = None;
        match self.shield {
            ShieldState::Shielded => self.frames_with_shield += 1,
            ShieldState::Unshielded => {
                if rng.gen_bool(SHIELD_PROBABILITY) {
                    self.shield = ShieldState::Shielded;
                    debug!("boss shield raised");
                    event = Some(ShieldEvent::Raised);
                }
            }
        }
        if self.frames_with_shield == MAX_FRAMES_WITH_SHIELD {
            self.shield = ShieldState::Unshielded;
            self.frames_with_shield = 0;
            debug!("boss shield exhausted");
            event = Some(ShieldEvent::Lowered);
        }
        event
    }
}
