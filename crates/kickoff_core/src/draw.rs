//! Athlete draw
//!
//! Uniform pick with replacement from the whole catalog. No pity counter and
//! no rarity weighting.

use rand::Rng;

use crate::catalog::Catalog;
use crate::config::{GameConfig, InitialPowerPolicy};
use crate::error::{GameError, Result};
use crate::models::{OwnedAthlete, OwnedAthleteId, PlayerRecord};

/// Spend `draw_cost` and add one uniformly chosen athlete to the record.
///
/// Works on a private copy inside a transaction, so the debit and the new
/// owned athlete are committed together or not at all.
pub fn draw_athlete(
    record: &mut PlayerRecord,
    catalog: &Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<OwnedAthlete> {
    let available = record.profile.cash;
    if available < config.draw_cost {
        return Err(GameError::InsufficientFunds { required: config.draw_cost, available });
    }

    let definition = catalog.sample(rng).ok_or(GameError::CatalogEmpty)?;

    let power_level = match config.initial_power {
        InitialPowerPolicy::Fixed => 1,
        InitialPowerPolicy::AttributeSum => {
            u32::try_from(definition.attributes.total()).unwrap_or(u32::MAX)
        }
    };

    let athlete = OwnedAthlete {
        id: OwnedAthleteId::new(),
        athlete_id: definition.id,
        name: definition.name.clone(),
        power_level,
    };

    record.profile.cash = available - config.draw_cost;
    record.owned.push(athlete.clone());

    Ok(athlete)
}
