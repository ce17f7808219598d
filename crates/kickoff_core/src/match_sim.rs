//! Match simulation
//!
//! Weighted coin flip between two team powers followed by a score line.
//! Pure: the only input besides the two powers is the RNG, so a seeded RNG
//! reproduces a match exactly.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Day-of-match form multiplier range, inclusive.
pub const CONDITION_MIN: u64 = 51;
pub const CONDITION_MAX: u64 = 130;

/// Winner goal range, inclusive.
pub const WINNER_GOALS_MIN: u32 = 2;
pub const WINNER_GOALS_MAX: u32 = 5;

/// The loser scores fewer than `min(LOSER_GOALS_CAP, winner_goals)`.
pub const LOSER_GOALS_CAP: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedMatch {
    pub winner: Side,
    pub winner_goals: u32,
    pub loser_goals: u32,
    pub home_condition: u64,
    pub away_condition: u64,
    pub home_effective: u64,
    pub away_effective: u64,
}

impl SimulatedMatch {
    pub fn goals_for(&self, side: Side) -> u32 {
        if side == self.winner {
            self.winner_goals
        } else {
            self.loser_goals
        }
    }
}

pub fn roll_condition(rng: &mut impl Rng) -> u64 {
    rng.gen_range(CONDITION_MIN..=CONDITION_MAX)
}

/// Simulate one match between `home_power` and `away_power`.
///
/// Win probability is proportional to effective power (power × condition).
/// With both effective powers at zero the match is a fair coin flip.
pub fn simulate(rng: &mut impl Rng, home_power: u64, away_power: u64) -> SimulatedMatch {
    let home_condition = roll_condition(rng);
    let away_condition = roll_condition(rng);

    let home_effective = home_power.saturating_mul(home_condition);
    let away_effective = away_power.saturating_mul(away_condition);

    let max_score = home_effective.saturating_add(away_effective);
    let winner = if max_score == 0 {
        if rng.gen_bool(0.5) {
            Side::Home
        } else {
            Side::Away
        }
    } else if rng.gen_range(0..max_score) < home_effective {
        Side::Home
    } else {
        Side::Away
    };

    let (winner_goals, loser_goals) = score_line(rng);

    SimulatedMatch {
        winner,
        winner_goals,
        loser_goals,
        home_condition,
        away_condition,
        home_effective,
        away_effective,
    }
}

/// Winner scores 2..=5, loser strictly fewer and at most 2.
pub fn score_line(rng: &mut impl Rng) -> (u32, u32) {
    let winner_goals = rng.gen_range(WINNER_GOALS_MIN..=WINNER_GOALS_MAX);
    let loser_goals = rng.gen_range(0..LOSER_GOALS_CAP.min(winner_goals));
    (winner_goals, loser_goals)
}
