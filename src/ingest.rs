use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::{NamedModels, Prediction, RaceResult, RaceStatus, ResultsProvenance};

/// Validation failures at the ingestion boundary. The engine never sees
/// these; malformed input is rejected here, before any comparison runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("position 0 for driver {0}; positions are 1-based")]
    ZeroPosition(String),
    #[error("duplicate position {0}")]
    DuplicatePosition(u32),
    #[error("duplicate driver name {0}")]
    DuplicateDriver(String),
}

// Shape of the JSON file the results exporter writes.
#[derive(Deserialize)]
struct RawResultsFile {
    grand_prix: Option<String>,
    results: Vec<RawResultRow>,
}

/// One result row as the exporter emits it, status still a raw string.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResultRow {
    pub position: u32,
    pub driver: String,
    pub team: String,
    pub status: String,
}

#[derive(Deserialize)]
struct RawPredictionsFile {
    models: BTreeMap<String, Vec<RawPredictionRow>>,
}

/// One prediction row as the exporter emits it; `prediction` is the raw
/// model score.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPredictionRow {
    pub position: u32,
    pub driver: String,
    pub team: String,
    pub prediction: f64,
}

/// Official results plus the provenance flag of whichever loader built them.
#[derive(Debug, Clone)]
pub struct LoadedResults {
    pub race: String,
    pub results: Vec<RaceResult>,
    pub provenance: ResultsProvenance,
}

/// Map the exporter's raw status strings onto the normalized enum.
/// Lapped cars ("+1 Lap", "+2 Laps") are classified finishers; any
/// retirement cause ("Accident", "Engine", ...) collapses to Retired.
fn parse_status(raw: &str) -> RaceStatus {
    match raw {
        "Finished" => RaceStatus::Finished,
        "Disqualified" => RaceStatus::Disqualified,
        s if s.starts_with('+') => RaceStatus::Lapped,
        _ => RaceStatus::Retired,
    }
}

/// Validate and normalize a raw result set into classification order.
///
/// One position convention everywhere: the official classification order,
/// DNFs included at the positions the source publishes for them. Rows are
/// re-sorted by the supplied position and renumbered densely from 1 so the
/// engine never sees gaps or mixed conventions.
pub fn normalize(raw: Vec<RawResultRow>) -> Result<Vec<RaceResult>, IngestError> {
    let mut positions = HashSet::new();
    let mut drivers = HashSet::new();
    for r in &raw {
        if r.position == 0 {
            return Err(IngestError::ZeroPosition(r.driver.clone()));
        }
        if !positions.insert(r.position) {
            return Err(IngestError::DuplicatePosition(r.position));
        }
        if !drivers.insert(r.driver.clone()) {
            return Err(IngestError::DuplicateDriver(r.driver.clone()));
        }
    }

    let mut raw = raw;
    raw.sort_by_key(|r| r.position);
    Ok(raw
        .into_iter()
        .zip(1u32..)
        .map(|(r, position)| RaceResult {
            position,
            driver: r.driver,
            team: r.team,
            status: parse_status(&r.status),
        })
        .collect())
}

/// Load official results from the exporter's JSON file.
pub fn load_results(path: &Path) -> Result<LoadedResults> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read results file {}", path.display()))?;
    let file: RawResultsFile =
        serde_json::from_str(&text).with_context(|| "failed to parse results JSON")?;
    let results = normalize(file.results)
        .with_context(|| format!("invalid result set in {}", path.display()))?;
    Ok(LoadedResults {
        race: file.grand_prix.unwrap_or_else(|| "Grand Prix".to_string()),
        results,
        provenance: ResultsProvenance::Official,
    })
}

/// Validate one model's prediction list and convert it to domain values.
///
/// Predicted positions and driver names must be unique within the list;
/// a repeated driver would make the driver-keyed lookup depend on row
/// order, so it is rejected here before the engine ever runs.
pub fn normalize_predictions(
    raw: Vec<RawPredictionRow>,
) -> Result<Vec<Prediction>, IngestError> {
    let mut positions = HashSet::new();
    let mut drivers = HashSet::new();
    for r in &raw {
        if r.position == 0 {
            return Err(IngestError::ZeroPosition(r.driver.clone()));
        }
        if !positions.insert(r.position) {
            return Err(IngestError::DuplicatePosition(r.position));
        }
        if !drivers.insert(r.driver.clone()) {
            return Err(IngestError::DuplicateDriver(r.driver.clone()));
        }
    }

    Ok(raw
        .into_iter()
        .map(|r| Prediction {
            position: r.position,
            driver: r.driver,
            team: r.team,
            score: r.prediction,
        })
        .collect())
}

/// Load named prediction sets from a JSON file keyed by model name.
pub fn load_predictions(path: &Path) -> Result<NamedModels> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read predictions file {}", path.display()))?;
    let file: RawPredictionsFile =
        serde_json::from_str(&text).with_context(|| "failed to parse predictions JSON")?;
    let mut models = NamedModels::new();
    for (name, rows) in file.models {
        let predictions = normalize_predictions(rows).with_context(|| {
            format!("invalid prediction list for model {name} in {}", path.display())
        })?;
        models.insert(name, predictions);
    }
    Ok(models)
}

/// Embedded demonstration grid for when no results file is configured.
pub fn sample_results() -> LoadedResults {
    let grid = [
        ("Max Verstappen", "Red Bull Racing"),
        ("Lando Norris", "McLaren"),
        ("Oscar Piastri", "McLaren"),
        ("George Russell", "Mercedes"),
        ("Charles Leclerc", "Ferrari"),
        ("Lewis Hamilton", "Ferrari"),
        ("Fernando Alonso", "Aston Martin"),
        ("Lance Stroll", "Aston Martin"),
        ("Nico Hulkenberg", "Kick Sauber"),
        ("Gabriel Bortoleto", "Kick Sauber"),
        ("Liam Lawson", "Racing Bulls"),
        ("Kimi Antonelli", "Mercedes"),
        ("Isack Hadjar", "Racing Bulls"),
        ("Alexander Albon", "Williams"),
        ("Esteban Ocon", "Haas F1 Team"),
        ("Pierre Gasly", "Alpine"),
        ("Yuki Tsunoda", "Red Bull Racing"),
        ("Carlos Sainz", "Williams"),
        ("Oliver Bearman", "Haas F1 Team"),
        ("Franco Colapinto", "Alpine"),
    ];

    LoadedResults {
        race: "Sample Grand Prix".to_string(),
        results: grid
            .iter()
            .zip(1u32..)
            .map(|((driver, team), position)| RaceResult {
                position,
                driver: driver.to_string(),
                team: team.to_string(),
                status: RaceStatus::Finished,
            })
            .collect(),
        provenance: ResultsProvenance::Sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(position: u32, driver: &str, status: &str) -> RawResultRow {
        RawResultRow {
            position,
            driver: driver.to_string(),
            team: "Team".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn status_strings_normalize() {
        assert_eq!(parse_status("Finished"), RaceStatus::Finished);
        assert_eq!(parse_status("+1 Lap"), RaceStatus::Lapped);
        assert_eq!(parse_status("+2 Laps"), RaceStatus::Lapped);
        assert_eq!(parse_status("Disqualified"), RaceStatus::Disqualified);
        assert_eq!(parse_status("Accident"), RaceStatus::Retired);
        assert_eq!(parse_status("Engine"), RaceStatus::Retired);
    }

    #[test]
    fn sparse_positions_renumber_densely() {
        // Classification with gaps, e.g. after penalties: 2, 5, 9.
        let rows = vec![raw(5, "B", "Finished"), raw(2, "A", "Finished"), raw(9, "C", "Accident")];
        let results = normalize(rows).unwrap();
        assert_eq!(results[0].position, 1);
        assert_eq!(results[0].driver, "A");
        assert_eq!(results[1].position, 2);
        assert_eq!(results[1].driver, "B");
        assert_eq!(results[2].position, 3);
        assert_eq!(results[2].status, RaceStatus::Retired);
    }

    #[test]
    fn duplicate_position_rejected() {
        let rows = vec![raw(1, "A", "Finished"), raw(1, "B", "Finished")];
        assert_eq!(normalize(rows), Err(IngestError::DuplicatePosition(1)));
    }

    #[test]
    fn duplicate_driver_rejected() {
        let rows = vec![raw(1, "A", "Finished"), raw(2, "A", "Finished")];
        assert_eq!(
            normalize(rows),
            Err(IngestError::DuplicateDriver("A".to_string()))
        );
    }

    #[test]
    fn zero_position_rejected() {
        let rows = vec![raw(0, "A", "Finished")];
        assert_eq!(
            normalize(rows),
            Err(IngestError::ZeroPosition("A".to_string()))
        );
    }

    fn rawp(position: u32, driver: &str) -> RawPredictionRow {
        RawPredictionRow {
            position,
            driver: driver.to_string(),
            team: "Team".to_string(),
            prediction: position as f64 + 0.5,
        }
    }

    #[test]
    fn prediction_rows_convert_with_score() {
        let predictions = normalize_predictions(vec![rawp(1, "A"), rawp(2, "B")]).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].driver, "A");
        assert_eq!(predictions[0].score, 1.5);
    }

    #[test]
    fn duplicate_driver_in_prediction_list_rejected() {
        // A second row for the same driver would leave the metrics at the
        // mercy of which entry the driver-keyed lookup finds first.
        let mut rows: Vec<_> = (1..=14).map(|p| rawp(p, &format!("D{p}"))).collect();
        rows.push(rawp(15, "D1"));
        assert_eq!(
            normalize_predictions(rows),
            Err(IngestError::DuplicateDriver("D1".to_string()))
        );
    }

    #[test]
    fn duplicate_predicted_position_rejected() {
        let rows = vec![rawp(3, "A"), rawp(3, "B")];
        assert_eq!(
            normalize_predictions(rows),
            Err(IngestError::DuplicatePosition(3))
        );
    }

    #[test]
    fn zero_predicted_position_rejected() {
        let rows = vec![rawp(0, "A")];
        assert_eq!(
            normalize_predictions(rows),
            Err(IngestError::ZeroPosition("A".to_string()))
        );
    }

    #[test]
    fn sample_grid_is_a_valid_classification() {
        let loaded = sample_results();
        assert_eq!(loaded.provenance, ResultsProvenance::Sample);
        assert_eq!(loaded.results.len(), 20);
        for (i, r) in loaded.results.iter().enumerate() {
            assert_eq!(r.position, i as u32 + 1);
        }
    }
}
