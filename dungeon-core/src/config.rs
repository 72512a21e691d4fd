//! Game configuration.
//!
//! Defaults reproduce the classic rules. Every knob can be overridden with a
//! builder method, and the generation settings can also come from the
//! environment (see [`GameConfig::from_env`]).

use crate::character::{STARTING_GOLD, STARTING_HP};
use thiserror::Error;

/// Environment variable naming the Claude model.
pub const ENV_MODEL: &str = "DUNGEON_MODEL";
/// Environment variable for the per-call token budget.
pub const ENV_MAX_TOKENS: &str = "DUNGEON_MAX_TOKENS";
/// Environment variable for sampling temperature.
pub const ENV_TEMPERATURE: &str = "DUNGEON_TEMPERATURE";
/// Environment variable for how often a boss appears.
pub const ENV_BOSS_INTERVAL: &str = "DUNGEON_BOSS_INTERVAL";

/// A configuration value that could not be understood.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for a game session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Hit points at the start of each run.
    pub starting_hp: i32,

    /// Gold at the start of each run.
    pub starting_gold: i32,

    /// Model to use for generation (client default when `None`).
    pub model: Option<String>,

    /// Maximum tokens for free-text generation.
    pub max_tokens: usize,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Calls made per generation request before giving up.
    pub call_attempts: u32,

    /// Structured enemy/boss requests made before using a fallback.
    pub generation_attempts: u32,

    /// Every n-th room holds a boss.
    pub boss_interval: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_hp: STARTING_HP,
            starting_gold: STARTING_GOLD,
            model: None,
            max_tokens: 150,
            temperature: Some(0.8),
            call_attempts: 2,
            generation_attempts: 3,
            boss_interval: 10,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `DUNGEON_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`GameConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(model) = lookup(ENV_MODEL).filter(|m| !m.trim().is_empty()) {
            config.model = Some(model.trim().to_string());
        }
        if let Some(raw) = lookup(ENV_MAX_TOKENS) {
            config.max_tokens = parse_var(ENV_MAX_TOKENS, &raw)?;
            if config.max_tokens == 0 {
                return Err(invalid(ENV_MAX_TOKENS, &raw, "must be positive"));
            }
        }
        if let Some(raw) = lookup(ENV_TEMPERATURE) {
            let temperature: f32 = parse_var(ENV_TEMPERATURE, &raw)?;
            if !(0.0..=1.0).contains(&temperature) {
                return Err(invalid(ENV_TEMPERATURE, &raw, "must be between 0 and 1"));
            }
            config.temperature = Some(temperature);
        }
        if let Some(raw) = lookup(ENV_BOSS_INTERVAL) {
            config.boss_interval = parse_var(ENV_BOSS_INTERVAL, &raw)?;
            if config.boss_interval == 0 {
                return Err(invalid(ENV_BOSS_INTERVAL, &raw, "must be positive"));
            }
        }

        Ok(config)
    }

    pub fn with_starting_hp(mut self, hp: i32) -> Self {
        self.starting_hp = hp;
        self
    }

    pub fn with_starting_gold(mut self, gold: i32) -> Self {
        self.starting_gold = gold;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_call_attempts(mut self, attempts: u32) -> Self {
        self.call_attempts = attempts.max(1);
        self
    }

    pub fn with_generation_attempts(mut self, attempts: u32) -> Self {
        self.generation_attempts = attempts.max(1);
        self
    }

    pub fn with_boss_interval(mut self, rooms: u32) -> Self {
        self.boss_interval = rooms.max(1);
        self
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(var, raw, &e.to_string()))
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
