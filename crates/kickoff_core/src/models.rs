//! Player-side data: profiles, owned athletes and the equipped roster.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::catalog::AthleteId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnedAthleteId(pub Uuid);

impl OwnedAthleteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnedAthleteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnedAthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An instance of a catalog athlete held by one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedAthlete {
    pub id: OwnedAthleteId,
    pub athlete_id: AthleteId,
    pub name: String,
    pub power_level: u32,
}

/// A roster slot. References an [`OwnedAthlete`] of the same player by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedAthlete {
    pub owned_id: OwnedAthleteId,
    pub athlete_id: AthleteId,
    pub power_level: u32,
    /// Attribute total captured at equip time; subtracted verbatim on unequip.
    pub attribute_total: u64,
}

impl EquippedAthlete {
    pub fn key(&self) -> (AthleteId, u32) {
        (self.athlete_id, self.power_level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub cash: u64,
    /// Sum of the base attributes of every equipped athlete.
    pub stats: u64,
    pub score: i64,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl PlayerProfile {
    pub fn new(id: PlayerId, name: impl Into<String>, cash: u64, score: i64) -> Self {
        Self { id, name: name.into(), cash, stats: 0, score, win: 0, draw: 0, loss: 0 }
    }

    pub fn games_played(&self) -> u32 {
        self.win + self.draw + self.loss
    }

    /// Wins over games played, 0.0 before the first game.
    pub fn win_rate(&self) -> f64 {
        let games = self.games_played();
        if games == 0 {
            0.0
        } else {
            self.win as f64 / games as f64
        }
    }
}

/// Everything the engine owns for one player. This is the unit the store
/// reads, versions and commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub profile: PlayerProfile,
    pub owned: Vec<OwnedAthlete>,
    pub equipped: Vec<EquippedAthlete>,
}

impl PlayerRecord {
    pub fn new(profile: PlayerProfile) -> Self {
        Self { profile, owned: Vec::new(), equipped: Vec::new() }
    }

    pub fn id(&self) -> PlayerId {
        self.profile.id
    }

    pub fn find_owned(&self, id: OwnedAthleteId) -> Option<&OwnedAthlete> {
        self.owned.iter().find(|a| a.id == id)
    }

    pub fn is_equipped(&self, id: OwnedAthleteId) -> bool {
        self.equipped.iter().any(|e| e.owned_id == id)
    }

    pub fn equipped_count(&self) -> usize {
        self.equipped.len()
    }

    /// Sum of captured attribute totals over the roster.
    pub fn equipped_total(&self) -> u64 {
        self.equipped.iter().map(|e| e.attribute_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate_without_games() {
        let profile = PlayerProfile::new(PlayerId(1), "rookie", 0, 0);
        assert_eq!(profile.win_rate(), 0.0);
    }

    #[test]
    fn test_win_rate_counts_draws() {
        let mut profile = PlayerProfile::new(PlayerId(1), "vet", 0, 0);
        profile.win = 3;
        profile.draw = 1;
        profile.loss = 1;
        assert!((profile.win_rate() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_owned_ids_are_unique() {
        assert_ne!(OwnedAthleteId::new(), OwnedAthleteId::new());
    }
}
