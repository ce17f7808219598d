//! Game engine facade
//!
//! Wires catalog, roster rules, match simulation and the season ledger to a
//! [`GameStore`]. Every public operation is one transaction:
//!
//! 1. load versioned copies of the affected player records
//! 2. run the domain rule on the private copies
//! 3. commit all copies at once, compare-and-swap on the versions
//!
//! A rule error discards the copies. A version conflict re-runs the whole
//! transaction, up to `max_tx_retries` attempts.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::catalog::{AthleteId, Catalog};
use crate::config::GameConfig;
use crate::draw::draw_athlete;
use crate::error::{ConfigError, GameError, Result, StoreError};
use crate::identity::{IdentityProvider, TokenSigner, VerifiedPlayer};
use crate::ledger::{self, MatchResult, PlayerSummary};
use crate::match_sim::{self, Side, SimulatedMatch};
use crate::models::{
    EquippedAthlete, OwnedAthlete, OwnedAthleteId, PlayerId, PlayerProfile, PlayerRecord,
};
use crate::roster;
use crate::store::{GameStore, MemoryStore, Versioned};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub profile: PlayerProfile,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawReceipt {
    pub athlete: OwnedAthlete,
    pub remaining_cash: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeReceipt {
    pub athlete: OwnedAthlete,
    pub new_power_level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub athlete: OwnedAthlete,
    pub remaining_cash: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub result: MatchResult,
    pub simulation: SimulatedMatch,
    /// The requesting player after the result was applied.
    pub home: PlayerSummary,
    pub away: PlayerSummary,
}

pub struct GameEngine<S: GameStore = MemoryStore> {
    config: GameConfig,
    catalog: Catalog,
    store: S,
    signer: TokenSigner,
    rng: Mutex<ChaCha8Rng>,
}

impl GameEngine<MemoryStore> {
    /// Engine over a fresh in-memory store.
    pub fn in_memory(config: GameConfig, catalog: Catalog) -> std::result::Result<Self, ConfigError> {
        Self::new(config, catalog, MemoryStore::new())
    }
}

impl<S: GameStore> GameEngine<S> {
    pub fn new(
        config: GameConfig,
        catalog: Catalog,
        store: S,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let signer = if config.token_secret.is_empty() {
            warn!("No token secret configured, generating an ephemeral one");
            let mut secret = vec![0u8; 32];
            rng.fill_bytes(&mut secret);
            TokenSigner::new(secret)
        } else {
            TokenSigner::new(config.token_secret.as_bytes())
        };

        if catalog.is_empty() {
            warn!("Engine started with an empty athlete catalog");
        }
        info!(athletes = catalog.len(), "Game engine ready");

        Ok(Self { config, catalog, store, signer, rng: Mutex::new(rng) })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================
    // Identity
    // ========================

    /// Create a player profile with starting cash and score.
    pub fn register(&self, name: &str) -> Result<Registration> {
        let id = self.store.next_player_id()?;
        let profile = PlayerProfile::new(
            id,
            name.trim(),
            self.config.starting_cash,
            self.config.starting_score,
        );
        self.store.insert_player(PlayerRecord::new(profile.clone()))?;

        info!(player = %id, "Registered player");
        Ok(Registration { token: self.signer.issue(id), profile })
    }

    pub fn issue_token(&self, player: PlayerId) -> String {
        self.signer.issue(player)
    }

    pub fn authenticate(&self, token: &str) -> Result<VerifiedPlayer> {
        let player = self.signer.verify(token)?;
        // Tokens carry no expiry; the player must still exist.
        self.store.load(player.id()).map_err(store_error)?;
        Ok(player)
    }

    // ========================
    // Draw / roster
    // ========================

    pub fn draw(&self, player: &VerifiedPlayer) -> Result<DrawReceipt> {
        let receipt = self.transact(&[player.id()], |records, rng| {
            let record = &mut records[0];
            let athlete = draw_athlete(record, &self.catalog, &self.config, rng)?;
            Ok(DrawReceipt { athlete, remaining_cash: record.profile.cash })
        })?;

        info!(
            player = %player,
            athlete = %receipt.athlete.athlete_id,
            cash = receipt.remaining_cash,
            "Draw"
        );
        Ok(receipt)
    }

    pub fn equip(&self, player: &VerifiedPlayer, owned_id: OwnedAthleteId) -> Result<EquippedAthlete> {
        self.transact(&[player.id()], |records, _| {
            roster::equip(&mut records[0], owned_id, &self.catalog, &self.config)
        })
    }

    pub fn unequip(&self, player: &VerifiedPlayer, owned_id: OwnedAthleteId) -> Result<()> {
        self.transact(&[player.id()], |records, _| roster::unequip(&mut records[0], owned_id))
            .map(|_| ())
    }

    pub fn upgrade(
        &self,
        player: &VerifiedPlayer,
        athlete_id: AthleteId,
        power_level: u32,
    ) -> Result<UpgradeReceipt> {
        let athlete = self.transact(&[player.id()], |records, _| {
            roster::upgrade(&mut records[0], athlete_id, power_level, &self.config)
        })?;

        info!(player = %player, athlete = %athlete_id, level = athlete.power_level, "Upgrade");
        Ok(UpgradeReceipt { new_power_level: athlete.power_level, athlete })
    }

    pub fn sell(&self, player: &VerifiedPlayer, owned_id: OwnedAthleteId) -> Result<SaleReceipt> {
        self.transact(&[player.id()], |records, _| {
            let record = &mut records[0];
            let athlete = roster::sell(record, owned_id, &self.config)?;
            Ok(SaleReceipt { athlete, remaining_cash: record.profile.cash })
        })
    }

    // ========================
    // Matches
    // ========================

    /// Play against a chosen opponent. Both rosters must be full.
    pub fn play_match(&self, player: &VerifiedPlayer, opponent: PlayerId) -> Result<MatchReport> {
        if player.id() == opponent {
            return Err(GameError::SelfMatch);
        }

        let report = self.transact(&[player.id(), opponent], |records, rng| {
            if !records.iter().all(|r| roster::is_match_ready(r, &self.config)) {
                return Err(GameError::RosterIncomplete { required: self.config.roster_size });
            }

            let (left, right) = records.split_at_mut(1);
            let (home, away) = (&mut left[0], &mut right[0]);

            let simulation = match_sim::simulate(rng, home.profile.stats, away.profile.stats);
            let (winner, loser) = match simulation.winner {
                Side::Home => (home.id(), away.id()),
                Side::Away => (away.id(), home.id()),
            };
            let result = MatchResult::Decided {
                winner,
                loser,
                winner_goals: simulation.winner_goals,
                loser_goals: simulation.loser_goals,
            };

            ledger::apply_result(
                &mut home.profile,
                &mut away.profile,
                &result,
                self.config.score_delta,
            )?;

            Ok(MatchReport {
                result,
                simulation,
                home: PlayerSummary::from(&home.profile),
                away: PlayerSummary::from(&away.profile),
            })
        })?;

        info!(
            home = %player,
            away = %opponent,
            home_goals = report.simulation.goals_for(Side::Home),
            away_goals = report.simulation.goals_for(Side::Away),
            "Match played"
        );
        Ok(report)
    }

    /// Find an opponent within the matchmaking band and play them.
    pub fn play_ranked(&self, player: &VerifiedPlayer) -> Result<MatchReport> {
        let snapshot = self.store.load_all()?;
        let me = snapshot
            .iter()
            .find(|r| r.id() == player.id())
            .ok_or(GameError::PlayerNotFound(player.id()))?;

        if !roster::is_match_ready(me, &self.config) {
            return Err(GameError::RosterIncomplete { required: self.config.roster_size });
        }

        let opponent = {
            let mut rng = self.fork_rng();
            ledger::find_opponent(
                &me.profile,
                &snapshot,
                self.config.matchmaking_band,
                self.config.roster_size,
                &mut rng,
            )?
            .id()
        };

        debug!(player = %player, opponent = %opponent, "Matchmaking picked opponent");
        self.play_match(player, opponent)
    }

    // ========================
    // Read views
    // ========================

    pub fn profile(&self, player: PlayerId) -> Result<PlayerProfile> {
        Ok(self.store.load(player).map_err(store_error)?.value.profile)
    }

    pub fn owned(&self, player: PlayerId) -> Result<Vec<OwnedAthlete>> {
        Ok(self.store.load(player).map_err(store_error)?.value.owned)
    }

    pub fn team(&self, player: PlayerId) -> Result<Vec<EquippedAthlete>> {
        Ok(self.store.load(player).map_err(store_error)?.value.equipped)
    }

    pub fn ranking(&self) -> Result<Vec<PlayerSummary>> {
        let records = self.store.load_all()?;
        Ok(ledger::rank(records.iter().map(|r| &r.profile)))
    }

    // ========================
    // Transactions
    // ========================

    fn transact<T>(
        &self,
        ids: &[PlayerId],
        mut op: impl FnMut(&mut [PlayerRecord], &mut ChaCha8Rng) -> Result<T>,
    ) -> Result<T> {
        let attempts = self.config.max_tx_retries;

        for attempt in 1..=attempts {
            let reads = ids
                .iter()
                .map(|id| self.store.load(*id))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(store_error)?;

            let mut records: Vec<PlayerRecord> = reads.iter().map(|r| r.value.clone()).collect();
            let mut rng = self.fork_rng();
            let value = op(&mut records, &mut rng)?;

            let writes = reads
                .iter()
                .zip(records)
                .map(|(read, record)| Versioned::new(read.version, record))
                .collect();

            match self.store.commit(writes).map_err(store_error) {
                Ok(()) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    debug!(attempt, players = ?ids, "Transaction conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(attempts, players = ?ids, "Transaction abandoned after repeated conflicts");
        Err(GameError::Transient { attempts })
    }

    /// Per-transaction RNG derived from the engine's master RNG.
    fn fork_rng(&self) -> ChaCha8Rng {
        let seed = self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen::<u64>();
        ChaCha8Rng::seed_from_u64(seed)
    }
}

fn store_error(err: StoreError) -> GameError {
    match err {
        StoreError::PlayerNotFound(id) => GameError::PlayerNotFound(id),
        other => GameError::Store(other),
    }
}
