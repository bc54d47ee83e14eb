use thiserror::Error;

/// Problems detected before the loop starts. Ticks themselves never fail.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("screen dimensions must be positive and finite, got {width}x{height}")]
    InvalidScreen { width: f64, height: f64 },

    #[error("screen height {height} leaves no room to spawn enemies (needs more than {margin})")]
    NoSpawnArea { height: f64, margin: f64 },

    #[error("tick interval must be non-zero")]
    ZeroTick,

    #[error("unknown level `{0}`")]
    UnknownLevel(String),

    #[error("player initial health must be at least 1")]
    InvalidPlayerHealth,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
