use crate::types::{
    AccuracyClass, ComparisonReport, DriverComparison, ModelMetrics, ModelReport, NamedModels,
    Prediction, RaceResult, ResultsProvenance,
};

/// Bucket a single prediction by absolute position error.
/// `None` means the driver has no entry in the model's prediction list.
pub fn classify_prediction(
    actual_position: u32,
    predicted_position: Option<u32>,
) -> AccuracyClass {
    let Some(predicted) = predicted_position else {
        return AccuracyClass::Unknown;
    };
    match actual_position.abs_diff(predicted) {
        0 => AccuracyClass::Perfect,
        1..=2 => AccuracyClass::Good,
        3..=5 => AccuracyClass::Fair,
        _ => AccuracyClass::Poor,
    }
}

/// Exact-match lookup by driver name; only the name matters, not list order.
pub fn find_prediction<'a>(predictions: &'a [Prediction], driver: &str) -> Option<&'a Prediction> {
    predictions.iter().find(|p| p.driver == driver)
}

/// Count drivers present in both the official top-k and the predicted top-k.
/// Set membership only: predicted 2nd / finished 3rd still counts for k >= 3.
fn top_k_correct(official: &[RaceResult], predictions: &[Prediction], k: u32) -> u32 {
    official
        .iter()
        .filter(|r| r.position <= k)
        .filter(|r| {
            predictions
                .iter()
                .any(|p| p.position <= k && p.driver == r.driver)
        })
        .count() as u32
}

/// Aggregate accuracy for one model against the official classification.
/// Unknown entries are counted but excluded from the accuracy denominator;
/// predicted drivers absent from the official list contribute nothing.
pub fn compute_model_metrics(
    official: &[RaceResult],
    predictions: &[Prediction],
) -> ModelMetrics {
    let mut m = ModelMetrics {
        perfect: 0,
        good: 0,
        fair: 0,
        poor: 0,
        unknown: 0,
        top3_correct: top_k_correct(official, predictions, 3),
        top5_correct: top_k_correct(official, predictions, 5),
        top10_correct: top_k_correct(official, predictions, 10),
        accuracy_pct: 0.0,
    };

    for result in official {
        let predicted = find_prediction(predictions, &result.driver).map(|p| p.position);
        match classify_prediction(result.position, predicted) {
            AccuracyClass::Perfect => m.perfect += 1,
            AccuracyClass::Good => m.good += 1,
            AccuracyClass::Fair => m.fair += 1,
            AccuracyClass::Poor => m.poor += 1,
            AccuracyClass::Unknown => m.unknown += 1,
        }
    }

    let valid = m.perfect + m.good + m.fair + m.poor;
    if valid > 0 {
        m.accuracy_pct = (100.0 * f64::from(m.perfect + m.good) / f64::from(valid)).round();
    }
    m
}

/// One comparison row per official result, in classification order.
pub fn compare_drivers(
    official: &[RaceResult],
    predictions: &[Prediction],
) -> Vec<DriverComparison> {
    official
        .iter()
        .map(|result| {
            let pred = find_prediction(predictions, &result.driver);
            DriverComparison {
                position: result.position,
                driver: result.driver.clone(),
                team: result.team.clone(),
                status: result.status,
                predicted: pred.map(|p| p.position),
                score: pred.map(|p| p.score),
                class: classify_prediction(result.position, pred.map(|p| p.position)),
            }
        })
        .collect()
}

/// Full report for one race: per-model rows and metrics plus the highlight
/// summaries. Pure function of its inputs.
pub fn compare_race(
    race: &str,
    official: &[RaceResult],
    models: &NamedModels,
    provenance: ResultsProvenance,
) -> ComparisonReport {
    let model_reports = models
        .iter()
        .map(|(name, predictions)| ModelReport {
            name: name.clone(),
            metrics: compute_model_metrics(official, predictions),
            drivers: compare_drivers(official, predictions),
        })
        .collect();

    ComparisonReport {
        race: race.to_string(),
        provenance,
        models: model_reports,
        highlights: crate::highlights::generate_highlights(official, models, provenance),
    }
}
