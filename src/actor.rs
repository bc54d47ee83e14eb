/// Actor behaviour: construction, per-tick movement, damage and firing.
///
/// Dispatch is a `match` on `Role`; there is no trait hierarchy. Every
/// operation on a destroyed actor is inert.

use rand::{Rng, RngCore};

use crate::boss::{self, ShieldEvent};
use crate::entities::{
    Actor, ActorId, ActorKind, BossBrain, Bounds, Capabilities, PlayerControls, Role,
};

// ── Kind tables ───────────────────────────────────────────────────────────────

/// Sprite extent (width, height) in pixels.
fn extent(kind: ActorKind) -> (f64, f64) {
    match kind {
        ActorKind::Player => (150.0, 50.0),
        ActorKind::Enemy => (150.0, 150.0),
        ActorKind::Boss => (300.0, 300.0),
        ActorKind::UserProjectile => (125.0, 12.0),
        ActorKind::EnemyProjectile => (30.0, 20.0),
        ActorKind::BossProjectile => (75.0, 75.0),
    }
}

/// Horizontal speed for straight-line movers.
fn horizontal_velocity(kind: ActorKind) -> f64 {
    match kind {
        ActorKind::Enemy => -6.0,
        ActorKind::UserProjectile => 15.0,
        ActorKind::EnemyProjectile => -10.0,
        ActorKind::BossProjectile => -15.0,
        ActorKind::Player | ActorKind::Boss => 0.0,
    }
}

pub fn capabilities(kind: ActorKind) -> Capabilities {
    match kind {
        ActorKind::Player | ActorKind::Enemy => Capabilities {
            has_health: true,
            fires: true,
            has_shield: false,
        },
        ActorKind::Boss => Capabilities {
            has_health: true,
            fires: true,
            has_shield: true,
        },
        ActorKind::UserProjectile | ActorKind::EnemyProjectile | ActorKind::BossProjectile => {
            Capabilities {
                has_health: false,
                fires: false,
                has_shield: false,
            }
        }
    }
}

// ── Player plane ──────────────────────────────────────────────────────────────

pub const PLAYER_INITIAL_X: f64 = 5.0;
pub const PLAYER_INITIAL_Y: f64 = 300.0;
pub const PLAYER_Y_UPPER_BOUND: f64 = 0.0;
pub const PLAYER_Y_LOWER_BOUND: f64 = 600.0;
const PLAYER_VERTICAL_VELOCITY: f64 = 8.0;
const PLAYER_PROJECTILE_X: f64 = 110.0;
const PLAYER_PROJECTILE_Y_OFFSET: f64 = 0.0;

// ── Enemy plane ───────────────────────────────────────────────────────────────

const ENEMY_INITIAL_HEALTH: u32 = 1;
pub const ENEMY_FIRE_RATE: f64 = 0.01;
const ENEMY_PROJECTILE_X_OFFSET: f64 = -100.0;
const ENEMY_PROJECTILE_Y_OFFSET: f64 = 50.0;

// ── Boss projectile ──────────────────────────────────────────────────────────

const BOSS_PROJECTILE_X: f64 = 950.0;

impl Actor {
    fn spawn(kind: ActorKind, x: f64, y: f64, health: Option<u32>, role: Role) -> Actor {
        let (width, height) = extent(kind);
        Actor {
            id: ActorId::UNASSIGNED,
            kind,
            layout_x: x,
            layout_y: y,
            translate_x: 0.0,
            translate_y: 0.0,
            width,
            height,
            health,
            destroyed: false,
            role,
        }
    }

    pub fn user_plane(initial_health: u32) -> Actor {
        Actor::spawn(
            ActorKind::Player,
            PLAYER_INITIAL_X,
            PLAYER_INITIAL_Y,
            Some(initial_health),
            Role::Pilot(PlayerControls::default()),
        )
    }

    pub fn enemy_plane(x: f64, y: f64) -> Actor {
        Actor::spawn(ActorKind::Enemy, x, y, Some(ENEMY_INITIAL_HEALTH), Role::Raider)
    }

    pub fn boss_plane(rng: &mut dyn RngCore) -> Actor {
        Actor::spawn(
            ActorKind::Boss,
            boss::INITIAL_X,
            boss::INITIAL_Y,
            Some(boss::HEALTH),
            Role::Boss(BossBrain::new(rng)),
        )
    }

    pub fn user_projectile(x: f64, y: f64) -> Actor {
        Actor::projectile(ActorKind::UserProjectile, x, y)
    }

    pub fn enemy_projectile(x: f64, y: f64) -> Actor {
        Actor::projectile(ActorKind::EnemyProjectile, x, y)
    }

    pub fn boss_projectile(y: f64) -> Actor {
        Actor::projectile(ActorKind::BossProjectile, BOSS_PROJECTILE_X, y)
    }

    fn projectile(kind: ActorKind, x: f64, y: f64) -> Actor {
        let velocity_x = horizontal_velocity(kind);
        Actor::spawn(kind, x, y, None, Role::Projectile { velocity_x })
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn x(&self) -> f64 {
        self.layout_x + self.translate_x
    }

    pub fn y(&self) -> f64 {
        self.layout_y + self.translate_y
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_x: self.x(),
            min_y: self.y(),
            max_x: self.x() + self.width,
            max_y: self.y() + self.height,
        }
    }

    pub fn collides_with(&self, other: &Actor) -> bool {
        self.bounds().intersects(&other.bounds())
    }

    pub fn capabilities(&self) -> Capabilities {
        capabilities(self.kind)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_shielded(&self) -> bool {
        match &self.role {
            Role::Boss(brain) => brain.is_shielded(),
            _ => false,
        }
    }

    pub fn controls(&self) -> Option<&PlayerControls> {
        match &self.role {
            Role::Pilot(controls) => Some(controls),
            _ => None,
        }
    }

    fn controls_mut(&mut self) -> Option<&mut PlayerControls> {
        match &mut self.role {
            Role::Pilot(controls) if !self.destroyed => Some(controls),
            _ => None,
        }
    }

    // ── Destructible ─────────────────────────────────────────────────────────

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// One unit of harm. Projectiles die outright, a shielded boss absorbs the
    /// hit, everything else loses one health point and is destroyed on
    /// reaching zero.
    pub fn take_damage(&mut self) {
        if self.destroyed {
            return;
        }
        if self.is_shielded() {
            return;
        }
        match self.health {
            None => self.destroy(),
            Some(health) => {
                let remaining = health.saturating_sub(1);
                self.health = Some(remaining);
                if remaining == 0 {
                    self.destroy();
                }
            }
        }
    }

    // ── Movement ─────────────────────────────────────────────────────────────

    pub fn move_horizontally(&mut self, dx: f64) {
        self.translate_x += dx;
    }

    pub fn move_vertically(&mut self, dy: f64) {
        self.translate_y += dy;
    }

    /// Move vertically, rolling the move back if the new position falls
    /// outside `[upper, lower]`.
    fn move_vertically_within(&mut self, dy: f64, upper: f64, lower: f64) {
        let initial_translate_y = self.translate_y;
        self.move_vertically(dy);
        let position = self.y();
        if position < upper || position > lower {
            self.translate_y = initial_translate_y;
        }
    }

    /// Advance one tick. Returns a shield transition when a boss raises or
    /// lowers its shield this tick.
    pub fn update(&mut self, rng: &mut dyn RngCore) -> Option<ShieldEvent> {
        if self.destroyed {
            return None;
        }
        match &mut self.role {
            Role::Pilot(controls) => {
                let multiplier = controls.velocity_multiplier;
                if multiplier != 0 {
                    self.move_vertically_within(
                        PLAYER_VERTICAL_VELOCITY * f64::from(multiplier),
                        PLAYER_Y_UPPER_BOUND,
                        PLAYER_Y_LOWER_BOUND,
                    );
                }
                None
            }
            Role::Raider => {
                self.move_horizontally(horizontal_velocity(self.kind));
                None
            }
            Role::Projectile { velocity_x } => {
                let dx = *velocity_x;
                self.move_horizontally(dx);
                None
            }
            Role::Boss(brain) => {
                let dy = f64::from(brain.next_move(rng));
                self.move_vertically_within(dy, boss::Y_UPPER_BOUND, boss::Y_LOWER_BOUND);
                match &mut self.role {
                    Role::Boss(brain) => brain.update_shield(rng),
                    _ => None,
                }
            }
        }
    }

    // ── Fighter ──────────────────────────────────────────────────────────────

    /// Zero or one new projectile. Enemies and the boss roll against their
    /// fire rate; the player always fires when asked.
    pub fn fire_projectile(&self, rng: &mut dyn RngCore) -> Option<Actor> {
        if self.destroyed {
            return None;
        }
        match &self.role {
            Role::Pilot(_) => Some(Actor::user_projectile(
                PLAYER_PROJECTILE_X,
                self.y() + PLAYER_PROJECTILE_Y_OFFSET,
            )),
            Role::Raider => {
                if rng.gen_bool(ENEMY_FIRE_RATE) {
                    Some(Actor::enemy_projectile(
                        self.x() + ENEMY_PROJECTILE_X_OFFSET,
                        self.y() + ENEMY_PROJECTILE_Y_OFFSET,
                    ))
                } else {
                    None
                }
            }
            Role::Boss(_) => {
                if boss::fires_this_frame(rng) {
                    Some(Actor::boss_projectile(self.y() + boss::PROJECTILE_Y_OFFSET))
                } else {
                    None
                }
            }
            Role::Projectile { .. } => None,
        }
    }

    // ── Player intents ───────────────────────────────────────────────────────

    pub fn move_up(&mut self) {
        if let Some(controls) = self.controls_mut() {
            controls.velocity_multiplier = -1;
        }
    }

    pub fn move_down(&mut self) {
        if let Some(controls) = self.controls_mut() {
            controls.velocity_multiplier = 1;
        }
    }

    pub fn stop(&mut self) {
        if let Some(controls) = self.controls_mut() {
            controls.velocity_multiplier = 0;
        }
    }

    pub fn request_fire(&mut self) {
        if let Some(controls) = self.controls_mut() {
            controls.queued_shots += 1;
        }
    }

    /// Drain queued fire requests. Always 0 for a destroyed player.
    pub fn take_queued_shots(&mut self) -> u32 {
        match self.controls_mut() {
            Some(controls) => std::mem::take(&mut controls.queued_shots),
            None => 0,
        }
    }
}
