//! # Game Configuration
//!
//! Every tunable rule lives here and is resolved once at startup. The engine
//! receives an immutable copy; nothing reads configuration from globals.
//!
//! ```rust
//! use kickoff_core::config::GameConfig;
//!
//! let config = GameConfig::default();
//! let wide = GameConfig::wide_band();
//! assert!(wide.matchmaking_band > config.matchmaking_band);
//! ```

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "KICKOFF_CONFIG_PATH";

/// Power level given to a freshly drawn athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPowerPolicy {
    /// Every draw starts at power level 1.
    Fixed,
    /// Power level equals the athlete's summed base attributes.
    AttributeSum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cash spent per draw (default: 100)
    pub draw_cost: u64,
    /// Cash credited when selling an unequipped athlete (default: 50)
    pub sell_price: u64,
    pub initial_power: InitialPowerPolicy,
    /// Cash on registration (default: 1000)
    pub starting_cash: u64,
    /// Score on registration (default: 1000)
    pub starting_score: i64,
    /// Points moved from loser to winner per match (default: 10)
    pub score_delta: i64,
    /// Opponent score must lie within ±band of the requester (default: 10)
    pub matchmaking_band: i64,
    pub roster_size: usize,
    /// Spare copies required for one fusion upgrade (default: 2)
    pub fusion_material: usize,
    /// Attempts per transaction before reporting a transient failure
    pub max_tx_retries: u32,
    /// Seed for the engine RNG; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    /// Token signing secret, injected at startup.
    pub token_secret: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            draw_cost: 100,
            sell_price: 50,
            initial_power: InitialPowerPolicy::Fixed,
            starting_cash: 1000,
            starting_score: 1000,
            score_delta: 10,
            matchmaking_band: 10,
            roster_size: 3,
            fusion_material: 2,
            max_tx_retries: 5,
            rng_seed: None,
            token_secret: String::new(),
        }
    }
}

impl GameConfig {
    /// Default rules.
    pub fn classic() -> Self {
        Self::default()
    }

    /// Wider matchmaking for small player pools.
    pub fn wide_band() -> Self {
        Self { matchmaking_band: 300, ..Self::default() }
    }

    /// Fixed seed for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self { rng_seed: Some(seed), ..Self::default() }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.draw_cost == 0 {
            return Err(ConfigError::Invalid("draw_cost must be positive".into()));
        }
        if self.roster_size == 0 {
            return Err(ConfigError::Invalid("roster_size must be positive".into()));
        }
        if self.fusion_material == 0 {
            return Err(ConfigError::Invalid("fusion_material must be positive".into()));
        }
        if self.matchmaking_band < 0 {
            return Err(ConfigError::Invalid("matchmaking_band must not be negative".into()));
        }
        if self.score_delta < 0 {
            return Err(ConfigError::Invalid("score_delta must not be negative".into()));
        }
        if self.max_tx_retries == 0 {
            return Err(ConfigError::Invalid("max_tx_retries must be at least 1".into()));
        }
        Ok(())
    }
}

/// Load config from the file named by `KICKOFF_CONFIG_PATH`, or defaults when
/// the variable is unset or blank.
pub fn load_config_from_env() -> Result<GameConfig, ConfigError> {
    let Ok(path) = env::var(CONFIG_PATH_ENV) else {
        return Ok(GameConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(GameConfig::default());
    }

    GameConfig::from_file(Path::new(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.draw_cost, 100);
        assert_eq!(cfg.roster_size, 3);
        assert_eq!(cfg.initial_power, InitialPowerPolicy::Fixed);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = GameConfig::from_json(r#"{"matchmaking_band": 300, "initial_power": "attribute_sum"}"#)
            .unwrap();
        assert_eq!(cfg.matchmaking_band, 300);
        assert_eq!(cfg.initial_power, InitialPowerPolicy::AttributeSum);
        assert_eq!(cfg.draw_cost, 100);
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let cfg = GameConfig { max_tx_retries: 0, ..GameConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"draw_cost": 250, "rng_seed": 9}}"#).unwrap();

        let cfg = GameConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.draw_cost, 250);
        assert_eq!(cfg.rng_seed, Some(9));
    }

    // Environment is process-wide: keep every KICKOFF_CONFIG_PATH case here.
    #[test]
    fn test_load_config_from_env() {
        env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(load_config_from_env().unwrap().draw_cost, 100);

        env::set_var(CONFIG_PATH_ENV, "   ");
        assert_eq!(load_config_from_env().unwrap().draw_cost, 100);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"draw_cost": 40, "matchmaking_band": 25}}"#).unwrap();
        env::set_var(CONFIG_PATH_ENV, format!(" {} ", file.path().display()));
        let cfg = load_config_from_env().unwrap();
        assert_eq!(cfg.draw_cost, 40);
        assert_eq!(cfg.matchmaking_band, 25);

        let mut invalid = tempfile::NamedTempFile::new().unwrap();
        write!(invalid, r#"{{"max_tx_retries": 0}}"#).unwrap();
        env::set_var(CONFIG_PATH_ENV, invalid.path());
        assert!(matches!(load_config_from_env(), Err(ConfigError::Invalid(_))));

        env::set_var(CONFIG_PATH_ENV, file.path().with_extension("missing"));
        assert!(matches!(load_config_from_env(), Err(ConfigError::Io(_))));

        env::remove_var(CONFIG_PATH_ENV);
    }

    #[test]
    fn test_from_file_runs_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"roster_size": 0}}"#).unwrap();

        assert!(GameConfig::from_file(file.path()).is_err());
    }
}
