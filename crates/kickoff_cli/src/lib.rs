//! Kickoff tooling library
//!
//! CSV → catalog JSON pipeline with SHA256 checksum metadata, match odds
//! estimation, scripted bot seasons against an in-memory engine and offline
//! token issuance.

pub mod catalog_import;
pub mod season;

use anyhow::{Context, Result};
use kickoff_core::config::{load_config_from_env, GameConfig};
use kickoff_core::identity::TokenSigner;
use kickoff_core::models::PlayerId;
use std::path::Path;

pub use catalog_import::{build_catalog, parse_catalog_csv, verify_catalog, CatalogMetadata};
pub use season::{estimate_odds, run_bot_season, OddsReport, SeasonOptions, SeasonReport};

/// Explicit `--config` path first, then `KICKOFF_CONFIG_PATH`, then defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => load_config_from_env().context("Failed to load config from environment"),
    }
}

/// Sign a token for `player_id` with the configured secret.
pub fn issue_token(config: &GameConfig, player_id: u64) -> Result<String> {
    if config.token_secret.is_empty() {
        anyhow::bail!("token_secret is not set; tokens signed now would not verify on the server");
    }
    Ok(TokenSigner::new(config.token_secret.as_bytes()).issue(PlayerId(player_id)))
}
