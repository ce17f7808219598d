//! Match odds and bot seasons
//!
//! Both run against the real engine code so that balance numbers printed by
//! the CLI are the numbers players get.

use anyhow::{Context, Result};
use kickoff_core::catalog::Catalog;
use kickoff_core::config::GameConfig;
use kickoff_core::engine::GameEngine;
use kickoff_core::error::GameError;
use kickoff_core::identity::VerifiedPlayer;
use kickoff_core::ledger::PlayerSummary;
use kickoff_core::match_sim::{self, Side};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsReport {
    pub matches: u32,
    pub home_power: u64,
    pub away_power: u64,
    pub home_wins: u32,
    pub away_wins: u32,
    pub home_win_rate: f64,
    pub avg_winner_goals: f64,
    pub avg_loser_goals: f64,
}

/// Simulate `matches` games between two fixed team powers.
pub fn estimate_odds(seed: u64, home_power: u64, away_power: u64, matches: u32) -> OddsReport {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut home_wins = 0u32;
    let mut winner_goals = 0u64;
    let mut loser_goals = 0u64;

    for _ in 0..matches {
        let sim = match_sim::simulate(&mut rng, home_power, away_power);
        if sim.winner == Side::Home {
            home_wins += 1;
        }
        winner_goals += u64::from(sim.winner_goals);
        loser_goals += u64::from(sim.loser_goals);
    }

    let n = f64::from(matches.max(1));
    OddsReport {
        matches,
        home_power,
        away_power,
        home_wins,
        away_wins: matches - home_wins,
        home_win_rate: f64::from(home_wins) / n,
        avg_winner_goals: winner_goals as f64 / n,
        avg_loser_goals: loser_goals as f64 / n,
    }
}

#[derive(Debug, Clone)]
pub struct SeasonOptions {
    pub bots: usize,
    pub rounds: usize,
    /// Draw attempts per bot before the season starts
    pub draws_per_bot: usize,
    /// Worker threads playing ranked matches concurrently
    pub threads: usize,
}

impl Default for SeasonOptions {
    fn default() -> Self {
        Self { bots: 8, rounds: 10, draws_per_bot: 6, threads: 1 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonReport {
    pub matches_played: u32,
    pub no_opponent: u32,
    pub transient_failures: u32,
    pub upgrades: u32,
    pub ranking: Vec<PlayerSummary>,
}

/// Register `options.bots` bots, build their rosters and play ranked rounds.
pub fn run_bot_season(
    config: GameConfig,
    catalog: Catalog,
    options: &SeasonOptions,
) -> Result<SeasonReport> {
    let engine = GameEngine::in_memory(config, catalog).context("Invalid engine config")?;
    let mut report = SeasonReport::default();

    let mut bots = Vec::with_capacity(options.bots);
    for i in 0..options.bots {
        let registration = engine.register(&format!("Bot {:02}", i + 1))?;
        let bot = engine.authenticate(&registration.token)?;
        report.upgrades += build_roster(&engine, &bot, options.draws_per_bot)?;
        bots.push(bot);
    }

    let threads = options.threads.max(1);
    let chunk = bots.len().div_ceil(threads).max(1);

    let outcomes: Vec<Result<(u32, u32, u32)>> = std::thread::scope(|scope| {
        let handles: Vec<_> = bots
            .chunks(chunk)
            .map(|group| {
                let engine = &engine;
                scope.spawn(move || play_rounds(engine, group, options.rounds))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| Err(anyhow::anyhow!("season worker panicked"))))
            .collect()
    });

    for outcome in outcomes {
        let (played, no_opponent, transient) = outcome?;
        report.matches_played += played;
        report.no_opponent += no_opponent;
        report.transient_failures += transient;
    }

    report.ranking = engine.ranking()?;
    Ok(report)
}

/// Draw, equip the first distinct athletes, fuse what can be fused and sell
/// the rest. Returns the number of upgrades made.
fn build_roster(engine: &GameEngine, bot: &VerifiedPlayer, draws: usize) -> Result<u32> {
    for _ in 0..draws {
        match engine.draw(bot) {
            Ok(_) => {}
            Err(GameError::InsufficientFunds { .. }) => break,
            Err(e) => return Err(e.into()),
        }
    }

    let roster_size = engine.config().roster_size;
    for athlete in engine.owned(bot.id())? {
        if engine.team(bot.id())?.len() >= roster_size {
            break;
        }
        match engine.equip(bot, athlete.id) {
            Ok(_) | Err(GameError::AlreadyEquipped { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let mut upgrades = 0;
    for member in engine.team(bot.id())? {
        match engine.upgrade(bot, member.athlete_id, member.power_level) {
            Ok(_) => upgrades += 1,
            Err(GameError::InsufficientMaterial { .. }) | Err(GameError::AlreadyEquipped { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let team = engine.team(bot.id())?;
    for athlete in engine.owned(bot.id())? {
        if !team.iter().any(|m| m.owned_id == athlete.id) {
            engine.sell(bot, athlete.id)?;
        }
    }

    Ok(upgrades)
}

fn play_rounds(engine: &GameEngine, bots: &[VerifiedPlayer], rounds: usize) -> Result<(u32, u32, u32)> {
    let (mut played, mut no_opponent, mut transient) = (0, 0, 0);

    for _ in 0..rounds {
        for bot in bots {
            match engine.play_ranked(bot) {
                Ok(_) => played += 1,
                Err(GameError::NoOpponentFound) | Err(GameError::RosterIncomplete { .. }) => {
                    no_opponent += 1
                }
                Err(GameError::Transient { .. }) => transient += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok((played, no_opponent, transient))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_odds_equal_power() {
        let report = estimate_odds(5, 300, 300, 4000);

        assert_eq!(report.home_wins + report.away_wins, 4000);
        assert!((report.home_win_rate - 0.5).abs() < 0.04, "{}", report.home_win_rate);
        assert!(report.avg_winner_goals >= 2.0 && report.avg_winner_goals <= 5.0);
        assert!(report.avg_loser_goals < report.avg_winner_goals);
    }

    #[test]
    fn test_estimate_odds_zero_matches() {
        let report = estimate_odds(1, 10, 10, 0);
        assert_eq!(report.home_win_rate, 0.0);
    }

    #[test]
    fn test_season_conserves_score() {
        let config = GameConfig { token_secret: "bots".into(), ..GameConfig::wide_band() };
        let config = GameConfig { rng_seed: Some(21), ..config };
        let options = SeasonOptions { bots: 6, rounds: 4, draws_per_bot: 8, threads: 3 };

        let report = run_bot_season(config, Catalog::starter(), &options).unwrap();

        assert_eq!(report.ranking.len(), 6);
        let total: i64 = report.ranking.iter().map(|s| s.score).sum();
        assert_eq!(total, 6 * 1000);

        let games: u32 = report.ranking.iter().map(|s| s.win + s.loss).sum();
        assert_eq!(games, report.matches_played * 2);
        assert_eq!(
            report.matches_played + report.no_opponent + report.transient_failures,
            6 * 4
        );

        for pair in report.ranking.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
