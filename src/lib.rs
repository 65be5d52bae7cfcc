pub mod compare;
pub mod highlights;
pub mod ingest;
pub mod types;

pub use compare::{classify_prediction, compare_drivers, compare_race, compute_model_metrics};
pub use highlights::generate_highlights;
pub use types::{
    AccuracyClass, ComparisonReport, DriverComparison, Highlight, ModelMetrics, ModelReport,
    NamedModels, Prediction, RaceResult, RaceStatus, ResultsProvenance,
};
