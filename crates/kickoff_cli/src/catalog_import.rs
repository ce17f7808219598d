//! Catalog import: CSV → athlete catalog JSON
//!
//! Expected columns (header row required):
//! `id,name,speed,finishing,shot_power,defense,stamina`
//!
//! Rows with a bad number are skipped with a warning and counted in
//! [`ParseStats::failed`]. Duplicate ids and blank names fail the whole import,
//! the same way [`Catalog::new`] rejects them.

use anyhow::{Context, Result};
use kickoff_core::catalog::{AthleteDefinition, Attributes, Catalog};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

const COLUMNS: usize = 7;

/// Import metadata written next to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    /// SHA256 of the written catalog JSON (hex)
    pub checksum: String,
    /// RFC3339
    pub created_at: String,
    pub athletes: usize,
    pub rows_read: u32,
    pub rows_failed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub total_rows: u32,
    pub parsed: u32,
    pub failed: u32,
}

/// Parse a catalog CSV file into a validated [`Catalog`].
pub fn parse_catalog_csv(csv_path: &Path) -> Result<(Catalog, ParseStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

    let mut athletes = Vec::new();
    let mut stats = ParseStats::default();

    for result in reader.records() {
        stats.total_rows += 1;
        let line = stats.total_rows + 1;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                stats.failed += 1;
                eprintln!("Warning: Line {} - Unreadable row: {}", line, e);
                continue;
            }
        };

        if record.len() < COLUMNS {
            stats.failed += 1;
            eprintln!(
                "Warning: Line {} - Expected {} columns, found {}",
                line,
                COLUMNS,
                record.len()
            );
            continue;
        }

        let mut numbers = [0u32; 6];
        let mut bad_field = None;
        for (slot, idx) in numbers.iter_mut().zip([0usize, 2, 3, 4, 5, 6]) {
            match record[idx].parse::<u32>() {
                Ok(v) => *slot = v,
                Err(_) => {
                    bad_field = Some(idx);
                    break;
                }
            }
        }
        if let Some(idx) = bad_field {
            stats.failed += 1;
            eprintln!("Warning: Line {} - Invalid number in column {}: '{}'", line, idx, &record[idx]);
            continue;
        }

        let [id, speed, finishing, shot_power, defense, stamina] = numbers;
        athletes.push(AthleteDefinition::new(
            id,
            &record[1],
            Attributes::new(speed, finishing, shot_power, defense, stamina),
        ));
        stats.parsed += 1;
    }

    let catalog = Catalog::new(athletes).context("Catalog validation failed")?;
    Ok((catalog, stats))
}

/// Import `csv_path` and write the catalog JSON to `output_json`.
pub fn build_catalog(csv_path: &Path, output_json: &Path) -> Result<CatalogMetadata> {
    let (catalog, stats) = parse_catalog_csv(csv_path)?;
    let json = catalog.to_json().context("Failed to serialize catalog")?;

    if let Some(parent) = output_json.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(output_json, &json)
        .with_context(|| format!("Failed to write output file: {}", output_json.display()))?;

    Ok(CatalogMetadata {
        checksum: sha256_hex(json.as_bytes()),
        created_at: chrono::Utc::now().to_rfc3339(),
        athletes: catalog.len(),
        rows_read: stats.total_rows,
        rows_failed: stats.failed,
    })
}

/// Check a written catalog against its checksum and that it still loads.
pub fn verify_catalog(catalog_json: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(catalog_json)
        .with_context(|| format!("Failed to read catalog file: {}", catalog_json.display()))?;

    if sha256_hex(&bytes) != expected_checksum {
        return Ok(false);
    }

    Catalog::from_json_file(catalog_json).context("Catalog file no longer parses")?;
    Ok(true)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
