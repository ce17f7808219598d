//! # kickoff_core - Roster & Match Engine
//!
//! Server-side core of a squad-building football game: players draw athletes
//! from a catalog, field a fixed-size roster, fuse duplicates into stronger
//! copies and play probabilistic matches that move a ranked score.
//!
//! ## Features
//! - Atomic per-player operations with optimistic retry under contention
//! - Deterministic runs from a configured RNG seed
//! - Signed player tokens as the only source of acting identity
//! - JSON API for easy integration

// Engine operations return small plain structs; boxing errors would only add noise
#![allow(clippy::result_large_err)]

pub mod api;
pub mod catalog;
pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod match_sim;
pub mod models;
pub mod roster;
pub mod store;

// Re-export main API functions
pub use api::{handle_request_json, ApiError, ApiRequest, ApiResponse};

pub use catalog::{AthleteDefinition, AthleteId, Attributes, Catalog};
pub use config::{GameConfig, InitialPowerPolicy};
pub use engine::{DrawReceipt, GameEngine, MatchReport, Registration, SaleReceipt, UpgradeReceipt};
pub use error::{CatalogError, ConfigError, ErrorKind, GameError, Result, StoreError};
pub use identity::{IdentityProvider, TokenSigner, VerifiedPlayer};
pub use ledger::{MatchResult, PlayerSummary};
pub use models::{
    EquippedAthlete, OwnedAthlete, OwnedAthleteId, PlayerId, PlayerProfile, PlayerRecord,
};
pub use store::{GameStore, MemoryStore, Versioned};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
