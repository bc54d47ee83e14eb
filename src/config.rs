/// Runtime configuration: playfield size, tick rate, start level and seed.
///
/// Defaults are a 1300×750 playfield at 20 ticks per second.
/// `from_env` overrides any of them through `SKY_BATTLE_*` variables.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::level::LevelId;

pub const DEFAULT_SCREEN_WIDTH: f64 = 1300.0;
pub const DEFAULT_SCREEN_HEIGHT: f64 = 750.0;
pub const DEFAULT_TICK_MS: u64 = 50;
/// Enemies spawn no lower than this far above the bottom edge.
pub const SCREEN_HEIGHT_ADJUSTMENT: f64 = 150.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub screen_width: f64,
    pub screen_height: f64,
    pub tick: Duration,
    pub start_level: LevelId,
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            start_level: LevelId::One,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Read overrides from the environment. Numbers that fail to parse fall
    /// back to their default with a warning; an unknown level name is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = GameConfig::default();
        let start_level = match env::var("SKY_BATTLE_LEVEL") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.start_level,
        };
        let config = GameConfig {
            screen_width: read_env("SKY_BATTLE_WIDTH", defaults.screen_width),
            screen_height: read_env("SKY_BATTLE_HEIGHT", defaults.screen_height),
            tick: Duration::from_millis(read_env("SKY_BATTLE_TICK_MS", DEFAULT_TICK_MS)),
            start_level,
            seed: read_env_opt("SKY_BATTLE_SEED"),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.screen_width, self.screen_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidScreen { width, height });
        }
        if height <= SCREEN_HEIGHT_ADJUSTMENT {
            return Err(ConfigError::NoSpawnArea {
                height,
                margin: SCREEN_HEIGHT_ADJUSTMENT,
            });
        }
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }

    /// Lowest y an enemy may spawn at.
    pub fn enemy_maximum_y_position(&self) -> f64 {
        self.screen_height - SCREEN_HEIGHT_ADJUSTMENT
    }
}

fn read_env<T: std::str::FromStr + Copy + std::fmt::Debug>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, ?default, "unparsable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn read_env_opt<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "unparsable value, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.enemy_maximum_y_position(), 600.0);
    }

    #[test]
    fn rejects_degenerate_screens() {
        let config = GameConfig {
            screen_width: 0.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidScreen { .. })));

        let config = GameConfig {
            screen_height: 150.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoSpawnArea { .. })));

        let config = GameConfig {
            tick: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTick));
    }
}
