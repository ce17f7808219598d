//! Season ledger
//!
//! Applies match results to score and win/draw/loss counters, builds the
//! ranking table and picks ranked opponents.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::models::{PlayerId, PlayerProfile, PlayerRecord};

/// Outcome of one match as seen by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchResult {
    Decided { winner: PlayerId, loser: PlayerId, winner_goals: u32, loser_goals: u32 },
    /// Not produced by the current simulator; kept so the `draw` counter has
    /// a defined update path.
    Draw { home: PlayerId, away: PlayerId, goals: u32 },
}

impl MatchResult {
    pub fn involves(&self, player: PlayerId) -> bool {
        match *self {
            MatchResult::Decided { winner, loser, .. } => winner == player || loser == player,
            MatchResult::Draw { home, away, .. } => home == player || away == player,
        }
    }
}

/// Apply `result` to both profiles. `a` and `b` may be passed in either order.
///
/// Callers run this inside one transaction over both records.
pub fn apply_result(
    a: &mut PlayerProfile,
    b: &mut PlayerProfile,
    result: &MatchResult,
    score_delta: i64,
) -> Result<()> {
    if a.id == b.id {
        return Err(GameError::SelfMatch);
    }
    for id in [a.id, b.id] {
        if !result.involves(id) {
            return Err(GameError::PlayerNotFound(id));
        }
    }

    match *result {
        MatchResult::Decided { winner, .. } => {
            let (w, l) = if a.id == winner { (a, b) } else { (b, a) };
            w.score += score_delta;
            w.win += 1;
            l.score -= score_delta;
            l.loss += 1;
        }
        MatchResult::Draw { .. } => {
            a.draw += 1;
            b.draw += 1;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub score: i64,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    pub win_rate: f64,
}

impl From<&PlayerProfile> for PlayerSummary {
    fn from(p: &PlayerProfile) -> Self {
        Self {
            player_id: p.id,
            name: p.name.clone(),
            score: p.score,
            win: p.win,
            draw: p.draw,
            loss: p.loss,
            win_rate: p.win_rate(),
        }
    }
}

/// Ranking snapshot: score descending, then win rate descending. Equal pairs
/// keep their input order.
pub fn rank<'a>(profiles: impl IntoIterator<Item = &'a PlayerProfile>) -> Vec<PlayerSummary> {
    let mut table: Vec<PlayerSummary> = profiles.into_iter().map(PlayerSummary::from).collect();
    table.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| b.win_rate.total_cmp(&a.win_rate)));
    table
}

/// Pick a ranked opponent for `requester`.
///
/// Candidates must be within `band` points of the requester's score, must not
/// be the requester, and must have a full roster. One qualifier is picked
/// uniformly at random.
pub fn find_opponent<'a>(
    requester: &PlayerProfile,
    candidates: &'a [PlayerRecord],
    band: i64,
    roster_size: usize,
    rng: &mut impl Rng,
) -> Result<&'a PlayerRecord> {
    let low = requester.score.saturating_sub(band);
    let high = requester.score.saturating_add(band);

    let qualified: Vec<&PlayerRecord> = candidates
        .iter()
        .filter(|c| c.id() != requester.id)
        .filter(|c| (low..=high).contains(&c.profile.score))
        .filter(|c| c.equipped_count() == roster_size)
        .collect();

    if qualified.is_empty() {
        return Err(GameError::NoOpponentFound);
    }

    Ok(qualified[rng.gen_range(0..qualified.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquippedAthlete, OwnedAthleteId};
    use crate::catalog::AthleteId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn profile(id: u64, score: i64) -> PlayerProfile {
        PlayerProfile::new(PlayerId(id), format!("p{id}"), 0, score)
    }

    fn ready_record(id: u64, score: i64, equipped: usize) -> PlayerRecord {
        let mut record = PlayerRecord::new(profile(id, score));
        for i in 0..equipped {
            record.equipped.push(EquippedAthlete {
                owned_id: OwnedAthleteId::new(),
                athlete_id: AthleteId(i as u32 + 1),
                power_level: 1,
                attribute_total: 300,
            });
        }
        record
    }

    #[test]
    fn test_apply_win() {
        let mut a = profile(1, 1000);
        let mut b = profile(2, 1000);
        let result = MatchResult::Decided {
            winner: PlayerId(2),
            loser: PlayerId(1),
            winner_goals: 3,
            loser_goals: 1,
        };

        apply_result(&mut a, &mut b, &result, 10).unwrap();

        assert_eq!((a.score, a.win, a.loss), (990, 0, 1));
        assert_eq!((b.score, b.win, b.loss), (1010, 1, 0));
    }

    #[test]
    fn test_apply_draw() {
        let mut a = profile(1, 1000);
        let mut b = profile(2, 980);
        let result = MatchResult::Draw { home: PlayerId(1), away: PlayerId(2), goals: 1 };

        apply_result(&mut a, &mut b, &result, 10).unwrap();

        assert_eq!((a.score, a.draw), (1000, 1));
        assert_eq!((b.score, b.draw), (980, 1));
    }

    #[test]
    fn test_apply_rejects_unrelated_result() {
        let mut a = profile(1, 1000);
        let mut b = profile(2, 1000);
        let result = MatchResult::Decided {
            winner: PlayerId(1),
            loser: PlayerId(3),
            winner_goals: 2,
            loser_goals: 0,
        };

        assert_eq!(
            apply_result(&mut a, &mut b, &result, 10).unwrap_err(),
            GameError::PlayerNotFound(PlayerId(2))
        );
        assert_eq!(a.score, 1000);
    }

    #[test]
    fn test_rank_breaks_ties_by_win_rate() {
        let mut a = profile(1, 100);
        a.win = 2;
        a.loss = 3; // 40%
        let mut b = profile(2, 100);
        b.win = 3;
        b.loss = 2; // 60%
        let c = profile(3, 80);

        let table = rank([&c, &a, &b]);
        let order: Vec<u64> = table.iter().map(|s| s.player_id.0).collect();

        assert_eq!(order, vec![2, 1, 3]);
        assert!((table[0].win_rate - 0.6).abs() < 1e-9);
        assert_eq!(table[2].win_rate, 0.0);
    }

    #[test]
    fn test_rank_is_stable() {
        let a = profile(1, 50);
        let b = profile(2, 50);
        let c = profile(3, 50);

        let order: Vec<u64> = rank([&b, &c, &a]).iter().map(|s| s.player_id.0).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_find_opponent_respects_band_and_roster() {
        let me = ready_record(1, 1000, 3);
        let pool = vec![
            me.clone(),
            ready_record(2, 1011, 3), // outside band
            ready_record(3, 995, 2),  // incomplete roster
            ready_record(4, 990, 3),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..20 {
            let found = find_opponent(&me.profile, &pool, 10, 3, &mut rng).unwrap();
            assert_eq!(found.id(), PlayerId(4));
        }
    }

    #[test]
    fn test_find_opponent_none() {
        let me = ready_record(1, 1000, 3);
        let pool = vec![me.clone(), ready_record(2, 2000, 3)];
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        assert_eq!(
            find_opponent(&me.profile, &pool, 10, 3, &mut rng).unwrap_err(),
            GameError::NoOpponentFound
        );
    }
}
