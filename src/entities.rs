/// All simulated entity types: pure data, no logic.
///
/// Behaviour lives in `actor` (movement, damage, firing) and `boss` (the
/// boss brain). The engine owns every `Actor`; nothing else holds one.

// ── Identity ──────────────────────────────────────────────────────────────────

/// Stable handle for a tracked actor. Assigned by the engine on insertion;
/// freshly constructed actors carry `ActorId::UNASSIGNED`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

impl ActorId {
    pub const UNASSIGNED: ActorId = ActorId(0);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Player,
    Enemy,
    Boss,
    UserProjectile,
    EnemyProjectile,
    BossProjectile,
}

/// What an actor kind is able to do. Derived from the kind, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub has_health: bool,
    pub fires: bool,
    pub has_shield: bool,
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in playfield pixels. Edges are inclusive, so
/// boxes that merely touch count as intersecting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn intersects(&self, other: &Bounds) -> bool {
        other.max_x >= self.min_x
            && other.max_y >= self.min_y
            && other.min_x <= self.max_x
            && other.min_y <= self.max_y
    }
}

// ── Role state ────────────────────────────────────────────────────────────────

/// Player-only state. Written by input intents between ticks, read by the
/// engine during the tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerControls {
    /// −1 up, 0 idle, +1 down.
    pub velocity_multiplier: i8,
    /// Fire presses not yet turned into projectiles.
    pub queued_shots: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShieldState {
    Unshielded,
    Shielded,
}

/// Boss AI state: shuffled vertical move pattern plus the shield machine.
#[derive(Clone, Debug, PartialEq)]
pub struct BossBrain {
    /// Per-tick vertical velocities; always holds equal counts of +V, −V and 0.
    pub move_pattern: Vec<i32>,
    pub move_index: usize,
    pub consecutive_moves: u32,
    pub shield: ShieldState,
    /// Only meaningful while shielded; reset to 0 on deactivation.
    pub frames_with_shield: u32,
}

/// Per-kind behaviour data. The tag on `Actor::kind` and the variant here
/// always agree; constructors in `actor` are the only way to build either.
#[derive(Clone, Debug, PartialEq)]
pub enum Role {
    Pilot(PlayerControls),
    Raider,
    Boss(BossBrain),
    Projectile { velocity_x: f64 },
}

// ── Actor ─────────────────────────────────────────────────────────────────────

/// One simulated entity. Position is `layout + translate`; movement only ever
/// touches `translate_*`.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub layout_x: f64,
    pub layout_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub width: f64,
    pub height: f64,
    /// `None` for projectiles: any hit destroys them outright.
    pub health: Option<u32>,
    /// Monotonic: once true, never reset.
    pub destroyed: bool,
    pub role: Role,
}

// ── Intents & outcomes ───────────────────────────────────────────────────────

/// Player input, already decoded from whatever device produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    MoveUp,
    MoveDown,
    Stop,
    Fire,
}
