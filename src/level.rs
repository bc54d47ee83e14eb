/// Level policies and the compile-time level registry.
///
/// A policy decides three things for the engine: who spawns, when the level
/// is over, and what the HUD looks like. It never touches the actor
/// collections except through `Stage`.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, RngCore};
use tracing::debug;

use crate::config::GameConfig;
use crate::engine::Stage;
use crate::entities::{Actor, ActorId};
use crate::error::ConfigError;
use crate::hud::{HudState, BOSS_LEVEL_SHIELD_ANCHOR};

// ── Identity ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelId {
    One,
    Two,
    Three,
}

impl LevelId {
    pub const ALL: [LevelId; 3] = [LevelId::One, LevelId::Two, LevelId::Three];

    pub fn key(self) -> &'static str {
        match self {
            LevelId::One => "level_one",
            LevelId::Two => "level_two",
            LevelId::Three => "level_three",
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LevelId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LevelId::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownLevel(wanted.to_string()))
    }
}

/// A policy's answer at the end of every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Lose,
    Win,
    Advance(LevelId),
}

// ── Policy contract ───────────────────────────────────────────────────────────

pub trait LevelPolicy {
    fn id(&self) -> LevelId;

    fn player_initial_health(&self) -> u32;

    /// HUD bound to this level's starting heart count.
    fn instantiate_level_view(&self) -> HudState;

    /// Put the player (already tracked by the engine) on screen.
    fn initialize_friendly_units(&mut self, stage: &mut Stage);

    fn spawn_enemy_units(&mut self, stage: &mut Stage, rng: &mut dyn RngCore);

    fn check_if_game_over(&self, stage: &Stage) -> Verdict;
}

// ── Registry ──────────────────────────────────────────────────────────────────

pub type LevelFactory = fn() -> Box<dyn LevelPolicy>;

fn level_one() -> Box<dyn LevelPolicy> {
    Box::new(LevelOne)
}

fn level_two() -> Box<dyn LevelPolicy> {
    Box::new(LevelTwo::default())
}

fn level_three() -> Box<dyn LevelPolicy> {
    Box::new(LevelThree::default())
}

pub fn factory(id: LevelId) -> LevelFactory {
    match id {
        LevelId::One => level_one,
        LevelId::Two => level_two,
        LevelId::Three => level_three,
    }
}

/// Build the policy for `id`. Fails only when `config` could never host a level.
pub fn build_level(id: LevelId, config: &GameConfig) -> Result<Box<dyn LevelPolicy>, ConfigError> {
    config.validate()?;
    Ok(factory(id)())
}

// ── Shared tuning ─────────────────────────────────────────────────────────────

const PLAYER_INITIAL_HEALTH: u32 = 5;
const KILLS_TO_ADVANCE: u32 = 10;
const ENEMY_SPAWN_PROBABILITY: f64 = 0.20;

/// Top up to `total_enemies`, each empty slot rolling separately.
fn spawn_wave(stage: &mut Stage, rng: &mut dyn RngCore, total_enemies: usize) {
    let current = stage.current_number_of_enemies();
    for _ in current..total_enemies {
        if rng.gen_bool(ENEMY_SPAWN_PROBABILITY) {
            let y = rng.gen::<f64>() * stage.enemy_maximum_y_position();
            let id = stage.add_enemy_unit(Actor::enemy_plane(stage.screen_width(), y));
            debug!(id = id.0, y, "enemy spawned");
        }
    }
}

fn spawn_boss(stage: &mut Stage, rng: &mut dyn RngCore) -> ActorId {
    let id = stage.add_enemy_unit(Actor::boss_plane(rng));
    debug!(id = id.0, "boss spawned");
    id
}

fn boss_has_fallen(boss: Option<ActorId>, stage: &Stage) -> bool {
    boss.map_or(false, |id| stage.has_fallen(id))
}

// ── Level one: kill quota ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LevelOne;

impl LevelOne {
    const TOTAL_ENEMIES: usize = 5;
}

impl LevelPolicy for LevelOne {
    fn id(&self) -> LevelId {
        LevelId::One
    }

    fn player_initial_health(&self) -> u32 {
        PLAYER_INITIAL_HEALTH
    }

    fn instantiate_level_view(&self) -> HudState {
        HudState::new(PLAYER_INITIAL_HEALTH)
    }

    fn initialize_friendly_units(&mut self, stage: &mut Stage) {
        stage.add_to_scene(stage.user_id());
    }

    fn spawn_enemy_units(&mut self, stage: &mut Stage, rng: &mut dyn RngCore) {
        spawn_wave(stage, rng, Self::TOTAL_ENEMIES);
    }

    fn check_if_game_over(&self, stage: &Stage) -> Verdict {
        if stage.user_is_destroyed() {
            Verdict::Lose
        } else if stage.kills() >= KILLS_TO_ADVANCE {
            Verdict::Advance(LevelId::Two)
        } else {
            Verdict::Continue
        }
    }
}

// ── Level two: boss duel ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LevelTwo {
    boss: Option<ActorId>,
}

impl LevelPolicy for LevelTwo {
    fn id(&self) -> LevelId {
        LevelId::Two
    }

    fn player_initial_health(&self) -> u32 {
        PLAYER_INITIAL_HEALTH
    }

    fn instantiate_level_view(&self) -> HudState {
        HudState::new(PLAYER_INITIAL_HEALTH).with_shield_anchor(BOSS_LEVEL_SHIELD_ANCHOR)
    }

    fn initialize_friendly_units(&mut self, stage: &mut Stage) {
        stage.add_to_scene(stage.user_id());
    }

    fn spawn_enemy_units(&mut self, stage: &mut Stage, rng: &mut dyn RngCore) {
        if self.boss.is_none() && stage.current_number_of_enemies() == 0 {
            self.boss = Some(spawn_boss(stage, rng));
        }
    }

    fn check_if_game_over(&self, stage: &Stage) -> Verdict {
        if stage.user_is_destroyed() {
            Verdict::Lose
        } else if boss_has_fallen(self.boss, stage) {
            Verdict::Advance(LevelId::Three)
        } else {
            Verdict::Continue
        }
    }
}

// ── Level three: escorts, then the boss ───────────────────────────────────────

#[derive(Debug, Default)]
pub struct LevelThree {
    boss: Option<ActorId>,
}

impl LevelThree {
    const TOTAL_ENEMIES: usize = 3;
}

impl LevelPolicy for LevelThree {
    fn id(&self) -> LevelId {
        LevelId::Three
    }

    fn player_initial_health(&self) -> u32 {
        PLAYER_INITIAL_HEALTH
    }

    fn instantiate_level_view(&self) -> HudState {
        HudState::new(PLAYER_INITIAL_HEALTH)
    }

    fn initialize_friendly_units(&mut self, stage: &mut Stage) {
        stage.add_to_scene(stage.user_id());
    }

    fn spawn_enemy_units(&mut self, stage: &mut Stage, rng: &mut dyn RngCore) {
        spawn_wave(stage, rng, Self::TOTAL_ENEMIES);
        if self.boss.is_none() && stage.kills() >= KILLS_TO_ADVANCE {
            self.boss = Some(spawn_boss(stage, rng));
        }
    }

    fn check_if_game_over(&self, stage: &Stage) -> Verdict {
        if stage.user_is_destroyed() {
            Verdict::Lose
        } else if boss_has_fallen(self.boss, stage) {
            Verdict::Win
        } else {
            Verdict::Continue
        }
    }
}
