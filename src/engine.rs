/// The simulation loop: owns every actor and advances the level one tick at
/// a time.
///
/// `tick` runs a fixed pipeline; the order is part of the game rules:
///
/// 1. spawn (level policy)      5. enemy penetration
/// 2. launch player shots, then  6. collision passes
///    advance every actor        7. prune destroyed actors, count kills
/// 3. enemy fire                 8. HUD counters + level verdict
/// 4. snapshot enemy count
///
/// All randomness comes through the `rng` argument so callers control
/// determinism (tests pass a seeded or mocked RNG).

use std::collections::BTreeSet;

use rand::RngCore;
use tracing::{debug, info, trace};

use crate::boss::ShieldEvent;
use crate::config::GameConfig;
use crate::entities::{Actor, ActorId, Intent};
use crate::error::ConfigError;
use crate::hud::{HudState, LevelView};
use crate::level::{self, LevelId, LevelPolicy, Verdict};

// ── Stage ─────────────────────────────────────────────────────────────────────

/// Actor collections plus the render tree. Each actor lives in exactly one
/// of the four collections; the scene only records which ids are on screen.
#[derive(Debug)]
pub struct Stage {
    friendly_units: Vec<Actor>,
    enemy_units: Vec<Actor>,
    user_projectiles: Vec<Actor>,
    enemy_projectiles: Vec<Actor>,
    scene: BTreeSet<ActorId>,
    user_id: ActorId,
    kills: u32,
    next_id: u64,
    screen_width: f64,
    enemy_maximum_y_position: f64,
}

impl Stage {
    fn new(config: &GameConfig) -> Self {
        Stage {
            friendly_units: Vec::new(),
            enemy_units: Vec::new(),
            user_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            scene: BTreeSet::new(),
            user_id: ActorId::UNASSIGNED,
            kills: 0,
            next_id: 0,
            screen_width: config.screen_width,
            enemy_maximum_y_position: config.enemy_maximum_y_position(),
        }
    }

    fn assign_id(&mut self, actor: &mut Actor) -> ActorId {
        self.next_id += 1;
        actor.id = ActorId(self.next_id);
        actor.id
    }

    /// Track the player. Showing it is the level's job.
    fn insert_user(&mut self, mut user: Actor) -> ActorId {
        let id = self.assign_id(&mut user);
        self.user_id = id;
        self.friendly_units.push(user);
        id
    }

    pub fn add_enemy_unit(&mut self, mut enemy: Actor) -> ActorId {
        let id = self.assign_id(&mut enemy);
        self.enemy_units.push(enemy);
        self.scene.insert(id);
        id
    }

    pub fn add_user_projectile(&mut self, mut projectile: Actor) -> ActorId {
        let id = self.assign_id(&mut projectile);
        self.user_projectiles.push(projectile);
        self.scene.insert(id);
        id
    }

    pub fn add_enemy_projectile(&mut self, mut projectile: Actor) -> ActorId {
        let id = self.assign_id(&mut projectile);
        self.enemy_projectiles.push(projectile);
        self.scene.insert(id);
        id
    }

    /// Show an already-tracked actor. Unknown ids are ignored.
    pub fn add_to_scene(&mut self, id: ActorId) {
        if self.actor(id).is_some() {
            self.scene.insert(id);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn friendly_units(&self) -> &[Actor] {
        &self.friendly_units
    }

    pub fn enemy_units(&self) -> &[Actor] {
        &self.enemy_units
    }

    pub fn user_projectiles(&self) -> &[Actor] {
        &self.user_projectiles
    }

    pub fn enemy_projectiles(&self) -> &[Actor] {
        &self.enemy_projectiles
    }

    pub fn scene(&self) -> &BTreeSet<ActorId> {
        &self.scene
    }

    pub fn in_scene(&self, id: ActorId) -> bool {
        self.scene.contains(&id)
    }

    pub fn current_number_of_enemies(&self) -> usize {
        self.enemy_units.len()
    }

    pub fn screen_width(&self) -> f64 {
        self.screen_width
    }

    pub fn enemy_maximum_y_position(&self) -> f64 {
        self.enemy_maximum_y_position
    }

    pub fn user_id(&self) -> ActorId {
        self.user_id
    }

    /// The player while still tracked; `None` once pruned.
    pub fn user(&self) -> Option<&Actor> {
        self.friendly_units.iter().find(|a| a.id == self.user_id)
    }

    fn user_mut(&mut self) -> Option<&mut Actor> {
        let user_id = self.user_id;
        self.friendly_units.iter_mut().find(|a| a.id == user_id)
    }

    pub fn user_is_destroyed(&self) -> bool {
        self.has_fallen(self.user_id)
    }

    pub fn user_health(&self) -> u32 {
        match self.user() {
            Some(user) if !user.destroyed => user.health.unwrap_or(0),
            _ => 0,
        }
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    fn all(&self) -> impl Iterator<Item = &Actor> {
        self.friendly_units
            .iter()
            .chain(&self.enemy_units)
            .chain(&self.user_projectiles)
            .chain(&self.enemy_projectiles)
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.all().find(|a| a.id == id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.friendly_units
            .iter_mut()
            .chain(self.enemy_units.iter_mut())
            .chain(self.user_projectiles.iter_mut())
            .chain(self.enemy_projectiles.iter_mut())
            .find(|a| a.id == id)
    }

    /// True once `id` is destroyed or no longer tracked. Only destruction
    /// ever removes an actor, so a missing id has fallen.
    pub fn has_fallen(&self, id: ActorId) -> bool {
        self.actor(id).map_or(true, |a| a.destroyed)
    }

    pub fn actor_count(&self) -> usize {
        self.friendly_units.len()
            + self.enemy_units.len()
            + self.user_projectiles.len()
            + self.enemy_projectiles.len()
    }
}

// ── Tick outcome ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    LevelComplete { next: LevelId },
    Won,
    Lost,
    /// The loop was already stopped; nothing ran.
    Halted,
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub struct Engine {
    policy: Box<dyn LevelPolicy>,
    stage: Stage,
    hud: HudState,
    /// Enemy count taken after firing, compared after pruning to count kills.
    enemy_count_snapshot: usize,
    frame: u64,
    running: bool,
}

impl Engine {
    /// Set up a level: HUD, player, and the policy's own placement.
    pub fn new(mut policy: Box<dyn LevelPolicy>, config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let initial_health = policy.player_initial_health();
        if initial_health == 0 {
            return Err(ConfigError::InvalidPlayerHealth);
        }

        let mut hud = policy.instantiate_level_view();
        let mut stage = Stage::new(config);
        stage.insert_user(Actor::user_plane(initial_health));
        policy.initialize_friendly_units(&mut stage);
        hud.show_heart_display();
        hud.show_kill_count_display();

        info!(level = %policy.id(), initial_health, "level started");
        Ok(Engine {
            policy,
            stage,
            hud,
            enemy_count_snapshot: 0,
            frame: 0,
            running: true,
        })
    }

    /// Build `id` from the level registry and start it.
    pub fn for_level(id: LevelId, config: &GameConfig) -> Result<Self, ConfigError> {
        Engine::new(level::build_level(id, config)?, config)
    }

    pub fn level_id(&self) -> LevelId {
        self.policy.id()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Direct access for scripted scenarios; not for use while a tick runs.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn kills(&self) -> u32 {
        self.stage.kills
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Apply one player intent. Called between ticks only, so a tick never
    /// sees a half-applied change.
    pub fn apply(&mut self, intent: Intent) {
        if !self.running {
            return;
        }
        let Some(user) = self.stage.user_mut() else {
            return;
        };
        match intent {
            Intent::MoveUp => user.move_up(),
            Intent::MoveDown => user.move_down(),
            Intent::Stop => user.stop(),
            Intent::Fire => user.request_fire(),
        }
    }

    // ── Per-tick pipeline ────────────────────────────────────────────────────

    pub fn tick(&mut self, rng: &mut dyn RngCore) -> TickOutcome {
        if !self.running {
            return TickOutcome::Halted;
        }
        self.frame += 1;

        // ── 1. Spawn ─────────────────────────────────────────────────────────
        self.policy.spawn_enemy_units(&mut self.stage, rng);

        // ── 2. Advance actors ────────────────────────────────────────────────
        self.launch_queued_shots(rng);
        self.update_actors(rng);

        // ── 3. Enemy fire ────────────────────────────────────────────────────
        self.generate_enemy_fire(rng);

        // ── 4. Snapshot ──────────────────────────────────────────────────────
        self.enemy_count_snapshot = self.stage.enemy_units.len();

        // ── 5. Penetration ───────────────────────────────────────────────────
        let penetrated = self.handle_enemy_penetration();

        // ── 6. Collisions ────────────────────────────────────────────────────
        let stage = &mut self.stage;
        let hits = handle_collisions_between(&mut stage.user_projectiles, &mut stage.enemy_units)
            + handle_collisions_between(&mut stage.enemy_projectiles, &mut stage.friendly_units)
            + handle_collisions_between(&mut stage.friendly_units, &mut stage.enemy_units);

        // ── 7. Prune & count kills ───────────────────────────────────────────
        self.remove_all_destroyed_actors(&penetrated);
        let vanished = self
            .enemy_count_snapshot
            .saturating_sub(self.stage.enemy_units.len());
        self.stage.kills += vanished as u32;

        trace!(
            frame = self.frame,
            actors = self.stage.actor_count(),
            hits,
            kills = self.stage.kills,
            "tick"
        );

        // ── 8. HUD & verdict ─────────────────────────────────────────────────
        self.hud.remove_hearts(self.stage.user_health());
        self.hud.update_kill_count(self.stage.kills);
        match self.policy.check_if_game_over(&self.stage) {
            Verdict::Continue => TickOutcome::Continue,
            Verdict::Lose => self.lose_game(),
            Verdict::Win => self.win_game(),
            Verdict::Advance(next) => self.go_to_next_level(next),
        }
    }

    fn update_actors(&mut self, rng: &mut dyn RngCore) {
        let stage = &mut self.stage;
        let actors = stage
            .friendly_units
            .iter_mut()
            .chain(stage.enemy_units.iter_mut())
            .chain(stage.user_projectiles.iter_mut())
            .chain(stage.enemy_projectiles.iter_mut());
        for actor in actors {
            match actor.update(rng) {
                Some(ShieldEvent::Raised) => self.hud.show_shield(),
                Some(ShieldEvent::Lowered) => self.hud.hide_shield(),
                None => {}
            }
        }
    }

    /// Fire presses since the last tick become projectiles before anything
    /// moves, so a new shot travels on the same tick it was requested.
    fn launch_queued_shots(&mut self, rng: &mut dyn RngCore) {
        let stage = &mut self.stage;
        let mut volley = Vec::new();
        for unit in stage.friendly_units.iter_mut() {
            for _ in 0..unit.take_queued_shots() {
                volley.extend(unit.fire_projectile(rng));
            }
        }
        for projectile in volley {
            stage.add_user_projectile(projectile);
        }
    }

    fn generate_enemy_fire(&mut self, rng: &mut dyn RngCore) {
        let stage = &mut self.stage;
        let mut volley = Vec::new();
        for enemy in &stage.enemy_units {
            volley.extend(enemy.fire_projectile(rng));
        }
        for projectile in volley {
            stage.add_enemy_projectile(projectile);
        }
    }

    /// Enemies that have travelled further than the screen is wide got past
    /// the player: one damage to the player, and the enemy is destroyed.
    fn handle_enemy_penetration(&mut self) -> Vec<ActorId> {
        let stage = &mut self.stage;
        let screen_width = stage.screen_width;
        let user_id = stage.user_id;
        let mut penetrated = Vec::new();
        for enemy in stage.enemy_units.iter_mut() {
            if enemy.destroyed || enemy.translate_x.abs() <= screen_width {
                continue;
            }
            if let Some(user) = stage.friendly_units.iter_mut().find(|a| a.id == user_id) {
                user.take_damage();
            }
            enemy.destroy();
            penetrated.push(enemy.id);
        }
        penetrated
    }

    fn remove_all_destroyed_actors(&mut self, penetrated: &[ActorId]) {
        let stage = &mut self.stage;
        for enemy in stage.enemy_units.iter().filter(|a| a.destroyed) {
            let cause = if penetrated.contains(&enemy.id) {
                "penetrated"
            } else {
                "combat"
            };
            debug!(id = enemy.id.0, kind = ?enemy.kind, cause, "enemy removed");
        }
        remove_destroyed_actors(&mut stage.friendly_units, &mut stage.scene);
        remove_destroyed_actors(&mut stage.enemy_units, &mut stage.scene);
        remove_destroyed_actors(&mut stage.user_projectiles, &mut stage.scene);
        remove_destroyed_actors(&mut stage.enemy_projectiles, &mut stage.scene);
    }

    // ── Stop-and-notify ──────────────────────────────────────────────────────

    fn lose_game(&mut self) -> TickOutcome {
        self.running = false;
        self.hud.show_game_over_image();
        info!(level = %self.policy.id(), frame = self.frame, "player lost");
        TickOutcome::Lost
    }

    fn win_game(&mut self) -> TickOutcome {
        self.running = false;
        self.hud.show_win_image();
        info!(level = %self.policy.id(), frame = self.frame, kills = self.stage.kills, "player won");
        TickOutcome::Won
    }

    fn go_to_next_level(&mut self, next: LevelId) -> TickOutcome {
        self.running = false;
        info!(level = %self.policy.id(), %next, "level complete");
        TickOutcome::LevelComplete { next }
    }
}

/// Every member of `group1` against every member of `group2`; each
/// intersecting pair trades one damage. Returns the number of pairs hit.
fn handle_collisions_between(group1: &mut [Actor], group2: &mut [Actor]) -> usize {
    let mut hits = 0;
    for actor1 in group1.iter_mut() {
        for actor2 in group2.iter_mut() {
            if actor1.collides_with(actor2) {
                actor1.take_damage();
                actor2.take_damage();
                hits += 1;
            }
        }
    }
    hits
}

fn remove_destroyed_actors(actors: &mut Vec<Actor>, scene: &mut BTreeSet<ActorId>) {
    actors.retain(|actor| {
        if actor.destroyed {
            scene.remove(&actor.id);
            false
        } else {
            true
        }
    });
}
