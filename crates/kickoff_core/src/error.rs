use thiserror::Error;

use crate::catalog::AthleteId;
use crate::models::{OwnedAthleteId, PlayerId};

/// Broad classes of engine failures.
///
/// Validation and not-found failures never have side effects and are not
/// retried. Transient failures are raised only after the engine has already
/// retried the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transient,
    Unauthorized,
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Roster is full ({limit} athletes equipped)")]
    RosterFull { limit: usize },

    #[error("Athlete {0} is not owned by this player")]
    NotOwned(OwnedAthleteId),

    #[error("Athlete is not equipped")]
    NotEquipped,

    #[error("Athlete {athlete_id} at power level {power_level} is already equipped")]
    AlreadyEquipped { athlete_id: AthleteId, power_level: u32 },

    #[error("Athlete {0} is equipped and must be unequipped first")]
    AthleteEquipped(OwnedAthleteId),

    #[error("Upgrade needs {required} spare copies, found {found}")]
    InsufficientMaterial { required: usize, found: usize },

    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Both rosters need exactly {required} equipped athletes")]
    RosterIncomplete { required: usize },

    #[error("A player cannot play against themselves")]
    SelfMatch,

    #[error("Athlete catalog is empty")]
    CatalogEmpty,

    /// An owned athlete references a definition missing from the catalog.
    #[error("Athlete {0} is not in the catalog")]
    UnknownAthlete(AthleteId),

    #[error("No opponent found within the matchmaking band")]
    NoOpponentFound,

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Transaction kept conflicting, gave up after {attempts} attempts")]
    Transient { attempts: u32 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::RosterFull { .. }
            | GameError::NotOwned(_)
            | GameError::NotEquipped
            | GameError::AlreadyEquipped { .. }
            | GameError::AthleteEquipped(_)
            | GameError::InsufficientMaterial { .. }
            | GameError::InsufficientFunds { .. }
            | GameError::RosterIncomplete { .. }
            | GameError::SelfMatch => ErrorKind::Validation,
            GameError::CatalogEmpty
            | GameError::NoOpponentFound
            | GameError::PlayerNotFound(_) => ErrorKind::NotFound,
            GameError::Transient { .. } => ErrorKind::Transient,
            GameError::Unauthorized(_) => ErrorKind::Unauthorized,
            GameError::UnknownAthlete(_) => ErrorKind::Internal,
            GameError::Store(StoreError::PlayerNotFound(_)) => ErrorKind::NotFound,
            GameError::Store(StoreError::Conflict) => ErrorKind::Transient,
            GameError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code used by the JSON API.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::RosterFull { .. } => "ROSTER_FULL",
            GameError::NotOwned(_) => "NOT_OWNED",
            GameError::NotEquipped => "NOT_EQUIPPED",
            GameError::AlreadyEquipped { .. } => "ALREADY_EQUIPPED",
            GameError::AthleteEquipped(_) => "ATHLETE_EQUIPPED",
            GameError::InsufficientMaterial { .. } => "INSUFFICIENT_MATERIAL",
            GameError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            GameError::RosterIncomplete { .. } => "ROSTER_INCOMPLETE",
            GameError::SelfMatch => "SELF_MATCH",
            GameError::CatalogEmpty => "CATALOG_EMPTY",
            GameError::UnknownAthlete(_) => "UNKNOWN_ATHLETE",
            GameError::NoOpponentFound => "NO_OPPONENT_FOUND",
            GameError::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            GameError::Transient { .. } => "TRANSIENT",
            GameError::Unauthorized(_) => "UNAUTHORIZED",
            GameError::Store(StoreError::PlayerNotFound(_)) => "PLAYER_NOT_FOUND",
            GameError::Store(_) => "STORE_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::Store(StoreError::Conflict))
    }
}

/// Failures reported by a [`GameStore`](crate::store::GameStore) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record changed between read and commit.
    #[error("Write conflict")]
    Conflict,

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player already exists: {0}")]
    DuplicatePlayer(PlayerId),

    #[error("Store lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate athlete id: {0}")]
    DuplicateId(AthleteId),

    #[error("Athlete {0} has an empty name")]
    EmptyName(AthleteId),
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_not_retryable() {
        let err = GameError::RosterFull { limit: 3 };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "ROSTER_FULL");
    }

    #[test]
    fn test_conflict_is_retryable() {
        let err = GameError::from(StoreError::Conflict);
        assert!(err.is_retryable());
        assert_eq!(err.kind(), ErrorKind::Transient);
    }

    #[test]
    fn test_unknown_athlete_is_internal() {
        let err = GameError::UnknownAthlete(AthleteId(4));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_player_maps_to_not_found() {
        let err = GameError::from(StoreError::PlayerNotFound(PlayerId(7)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.code(), "PLAYER_NOT_FOUND");
    }
}
