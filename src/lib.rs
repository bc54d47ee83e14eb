//! Simulation core for a side-scrolling arcade shooter.
//!
//! The engine advances a roster of actors (player, enemies, boss,
//! projectiles) at a fixed tick, resolves collisions, and asks the active
//! level policy whether the level is won, lost, or complete. Rendering and
//! input devices stay outside: the binary in `main.rs` is one such driver.

pub mod actor;
pub mod boss;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod hud;
pub mod level;

pub use config::GameConfig;
pub use engine::{Engine, Stage, TickOutcome};
pub use entities::{Actor, ActorId, ActorKind, Intent};
pub use error::{ConfigError, GameError};
pub use level::{LevelId, LevelPolicy, Verdict};
