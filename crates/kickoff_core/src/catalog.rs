//! Athlete catalog
//!
//! Read-only reference data: every draftable athlete and its five base
//! attributes. The catalog is built once at setup and never mutated by
//! gameplay, so stat totals captured from it stay valid for the life of the
//! process.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AthleteId(pub u32);

impl fmt::Display for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base attributes of an athlete definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub speed: u32,
    pub finishing: u32,
    pub shot_power: u32,
    pub defense: u32,
    pub stamina: u32,
}

impl Attributes {
    pub fn new(speed: u32, finishing: u32, shot_power: u32, defense: u32, stamina: u32) -> Self {
        Self { speed, finishing, shot_power, defense, stamina }
    }

    /// Sum of all five attributes. This is what an equipped athlete adds to
    /// the owner's `stats`.
    pub fn total(&self) -> u64 {
        [self.speed, self.finishing, self.shot_power, self.defense, self.stamina]
            .iter()
            .map(|&v| v as u64)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteDefinition {
    pub id: AthleteId,
    pub name: String,
    pub attributes: Attributes,
}

impl AthleteDefinition {
    pub fn new(id: u32, name: impl Into<String>, attributes: Attributes) -> Self {
        Self { id: AthleteId(id), name: name.into(), attributes }
    }
}

/// Immutable collection of athlete definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    athletes: Vec<AthleteDefinition>,
    index: HashMap<AthleteId, usize>,
}

impl Catalog {
    pub fn new(athletes: Vec<AthleteDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(athletes.len());
        for (pos, athlete) in athletes.iter().enumerate() {
            if athlete.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(athlete.id));
            }
            if index.insert(athlete.id, pos).is_some() {
                return Err(CatalogError::DuplicateId(athlete.id));
            }
        }
        Ok(Self { athletes, index })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON array of athlete definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let athletes: Vec<AthleteDefinition> = serde_json::from_str(json)?;
        Self::new(athletes)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.athletes)?)
    }

    pub fn get(&self, id: AthleteId) -> Option<&AthleteDefinition> {
        self.index.get(&id).map(|&pos| &self.athletes[pos])
    }

    pub fn athletes(&self) -> &[AthleteDefinition] {
        &self.athletes
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }

    /// Uniform pick over the whole catalog. Every call samples again, so the
    /// same athlete can come up any number of times in a row.
    pub fn sample(&self, rng: &mut impl Rng) -> Option<&AthleteDefinition> {
        if self.athletes.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.athletes.len());
        Some(&self.athletes[idx])
    }

    /// Built-in starter catalog used by demos and tests.
    pub fn starter() -> Self {
        let rows: [(&str, [u32; 5]); 12] = [
            ("Dario Velasco", [88, 91, 85, 35, 78]),
            ("Kenji Arakawa", [92, 80, 74, 40, 85]),
            ("Matteo Ricci", [70, 65, 72, 90, 88]),
            ("Lukas Brandt", [65, 58, 80, 92, 84]),
            ("Samuel Okoye", [95, 76, 70, 45, 90]),
            ("Ivan Petrov", [60, 55, 66, 89, 93]),
            ("Tomas Lindqvist", [78, 84, 88, 50, 72]),
            ("Rafael Duarte", [84, 87, 79, 42, 80]),
            ("Yusuf Demir", [72, 68, 75, 82, 86]),
            ("Noah Fischer", [81, 73, 77, 66, 79]),
            ("Hugo Marchand", [76, 82, 90, 48, 70]),
            ("Min-jun Park", [89, 78, 68, 58, 91]),
        ];

        let athletes = rows
            .iter()
            .enumerate()
            .map(|(i, (name, a))| {
                AthleteDefinition::new(
                    i as u32 + 1,
                    *name,
                    Attributes::new(a[0], a[1], a[2], a[3], a[4]),
                )
            })
            .collect::<Vec<_>>();

        let mut index = HashMap::with_capacity(athletes.len());
        for (pos, athlete) in athletes.iter().enumerate() {
            index.insert(athlete.id, pos);
        }
        Self { athletes, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_attribute_total() {
        let attrs = Attributes::new(10, 20, 30, 40, 50);
        assert_eq!(attrs.total(), 150);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let a = AthleteDefinition::new(1, "A", Attributes::default());
        let b = AthleteDefinition::new(1, "B", Attributes::default());
        assert!(matches!(Catalog::new(vec![a, b]), Err(CatalogError::DuplicateId(AthleteId(1)))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let a = AthleteDefinition::new(4, "  ", Attributes::default());
        assert!(matches!(Catalog::new(vec![a]), Err(CatalogError::EmptyName(AthleteId(4)))));
    }

    #[test]
    fn test_json_roundtrip_rebuilds_index() {
        let catalog = Catalog::starter();
        let json = catalog.to_json().unwrap();
        let loaded = Catalog::from_json(&json).unwrap();

        assert_eq!(loaded.len(), catalog.len());
        assert_eq!(loaded.get(AthleteId(3)).unwrap().name, "Matteo Ricci");
    }

    #[test]
    fn test_sample_empty_catalog() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(Catalog::empty().sample(&mut rng).is_none());
    }

    #[test]
    fn test_sample_covers_whole_catalog() {
        let catalog = Catalog::starter();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..2_000 {
            seen.insert(catalog.sample(&mut rng).unwrap().id);
        }

        assert_eq!(seen.len(), catalog.len());
    }
}
