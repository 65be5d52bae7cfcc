use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Race classification status, normalized at ingestion from the raw
/// status strings the results exporter emits ("Finished", "+1 Lap", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    Finished,
    Lapped,
    Retired,
    Disqualified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub position: u32, // 1-based classification order, unique per race
    pub driver: String,
    pub team: String,
    pub status: RaceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub position: u32, // predicted finishing position, unique per model
    pub driver: String,
    pub team: String,
    pub score: f64, // raw model output, informational only
}

/// How close a single prediction landed to the actual classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyClass {
    Perfect,
    Good,
    Fair,
    Poor,
    /// Driver has no prediction in this model's list.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub perfect: u32,
    pub good: u32,
    pub fair: u32,
    pub poor: u32,
    pub unknown: u32,
    pub top3_correct: u32,  // <= 3
    pub top5_correct: u32,  // <= 5
    pub top10_correct: u32, // <= 10
    /// round(100 * (perfect + good) / valid); 0 when no valid predictions.
    pub accuracy_pct: f64,
}

/// Where the official results came from. Set by whichever loader produced
/// the data, never inferred from the rows themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsProvenance {
    Official,
    Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub title: String,
    pub content: String,
}

/// One official result joined against one model's prediction for that driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverComparison {
    pub position: u32,
    pub driver: String,
    pub team: String,
    pub status: RaceStatus,
    pub predicted: Option<u32>,
    pub score: Option<f64>,
    pub class: AccuracyClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReport {
    pub name: String,
    pub metrics: ModelMetrics,
    pub drivers: Vec<DriverComparison>,
}

/// Full comparison output: everything the presentation side needs, with no
/// rendering instructions attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub race: String,
    pub provenance: ResultsProvenance,
    pub models: Vec<ModelReport>,
    pub highlights: Vec<Highlight>,
}

/// Named prediction sets. BTreeMap keeps report and highlight order
/// deterministic across runs.
pub type NamedModels = BTreeMap<String, Vec<Prediction>>;
