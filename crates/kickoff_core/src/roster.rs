//! Roster management
//!
//! Equip, unequip, fusion upgrade and sale of owned athletes. Each function
//! validates everything before touching the record, so a returned error always
//! means the record is exactly as it was passed in.
//!
//! Roster invariants after every successful call:
//! - at most `roster_size` equipped entries
//! - at most one equipped entry per `(athlete_id, power_level)`
//! - `profile.stats` equals the sum of equipped attribute totals

use crate::catalog::{AthleteId, Catalog};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::models::{EquippedAthlete, OwnedAthlete, OwnedAthleteId, PlayerRecord};

pub fn equip(
    record: &mut PlayerRecord,
    owned_id: OwnedAthleteId,
    catalog: &Catalog,
    config: &GameConfig,
) -> Result<EquippedAthlete> {
    let owned = record.find_owned(owned_id).ok_or(GameError::NotOwned(owned_id))?;
    let (athlete_id, power_level) = (owned.athlete_id, owned.power_level);

    if record.is_equipped(owned_id)
        || record.equipped.iter().any(|e| e.key() == (athlete_id, power_level))
    {
        return Err(GameError::AlreadyEquipped { athlete_id, power_level });
    }

    if record.equipped_count() >= config.roster_size {
        return Err(GameError::RosterFull { limit: config.roster_size });
    }

    let definition = catalog.get(athlete_id).ok_or(GameError::UnknownAthlete(athlete_id))?;

    let entry = EquippedAthlete {
        owned_id,
        athlete_id,
        power_level,
        attribute_total: definition.attributes.total(),
    };

    record.profile.stats += entry.attribute_total;
    record.equipped.push(entry.clone());

    Ok(entry)
}

pub fn unequip(record: &mut PlayerRecord, owned_id: OwnedAthleteId) -> Result<EquippedAthlete> {
    let pos = record
        .equipped
        .iter()
        .position(|e| e.owned_id == owned_id)
        .ok_or(GameError::NotEquipped)?;

    let entry = record.equipped.remove(pos);
    record.profile.stats = record.profile.stats.saturating_sub(entry.attribute_total);

    Ok(entry)
}

/// Fuse spare copies into the equipped athlete at `(athlete_id, power_level)`.
///
/// Needs `fusion_material` unequipped copies at the same level. The equipped
/// entry and its owned record both move up one level and exactly one spare
/// copy is consumed.
pub fn upgrade(
    record: &mut PlayerRecord,
    athlete_id: AthleteId,
    power_level: u32,
    config: &GameConfig,
) -> Result<OwnedAthlete> {
    let slot = record
        .equipped
        .iter()
        .position(|e| e.key() == (athlete_id, power_level))
        .ok_or(GameError::NotEquipped)?;
    let target_id = record.equipped[slot].owned_id;

    let next_level = power_level.saturating_add(1);
    if record.equipped.iter().any(|e| e.key() == (athlete_id, next_level)) {
        return Err(GameError::AlreadyEquipped { athlete_id, power_level: next_level });
    }

    let target_pos = record
        .owned
        .iter()
        .position(|a| a.id == target_id)
        .ok_or(GameError::NotOwned(target_id))?;

    let materials: Vec<usize> = record
        .owned
        .iter()
        .enumerate()
        .filter(|(_, a)| {
            a.athlete_id == athlete_id
                && a.power_level == power_level
                && a.id != target_id
                && !record.is_equipped(a.id)
        })
        .map(|(i, _)| i)
        .collect();

    if materials.len() < config.fusion_material {
        return Err(GameError::InsufficientMaterial {
            required: config.fusion_material,
            found: materials.len(),
        });
    }

    record.equipped[slot].power_level = next_level;
    record.owned[target_pos].power_level = next_level;
    let upgraded = record.owned[target_pos].clone();
    record.owned.remove(materials[0]);

    Ok(upgraded)
}

/// Remove an unequipped athlete and credit `sell_price`.
pub fn sell(
    record: &mut PlayerRecord,
    owned_id: OwnedAthleteId,
    config: &GameConfig,
) -> Result<OwnedAthlete> {
    let pos =
        record.owned.iter().position(|a| a.id == owned_id).ok_or(GameError::NotOwned(owned_id))?;

    if record.is_equipped(owned_id) {
        return Err(GameError::AthleteEquipped(owned_id));
    }

    let sold = record.owned.remove(pos);
    record.profile.cash = record.profile.cash.saturating_add(config.sell_price);

    Ok(sold)
}

/// True when the roster can take part in a match.
pub fn is_match_ready(record: &PlayerRecord, config: &GameConfig) -> bool {
    record.equipped_count() == config.roster_size
}
