use crate::compare::{compute_model_metrics, find_prediction};
use crate::types::{Highlight, NamedModels, RaceResult, ResultsProvenance};

/// Narrative summary cards derived from the metrics. Always the same four
/// categories, in the same order, whatever the input size; empty input
/// produces neutral placeholder content rather than an empty list.
pub fn generate_highlights(
    official: &[RaceResult],
    models: &NamedModels,
    provenance: ResultsProvenance,
) -> Vec<Highlight> {
    let note = match provenance {
        ResultsProvenance::Official => " (official results)",
        ResultsProvenance::Sample => " (sample data)",
    };

    let winner_content = match official.first() {
        Some(winner) => {
            let mut parts = vec![format!(
                "{} ({}) won the race.",
                winner.driver, winner.team
            )];
            for (name, predictions) in models {
                let predicted = find_prediction(predictions, &winner.driver)
                    .map(|p| format!("P{}", p.position))
                    .unwrap_or_else(|| "no prediction".to_string());
                parts.push(format!("{name} had the winner at {predicted}."));
            }
            format!("{}{note}", parts.join(" "))
        }
        None => "No official results available yet.".to_string(),
    };

    let performance_content = if official.is_empty() || models.is_empty() {
        "Model accuracy will appear once results and predictions are loaded.".to_string()
    } else {
        let summary = models
            .iter()
            .map(|(name, predictions)| {
                let m = compute_model_metrics(official, predictions);
                format!("{name}: {:.0}% accuracy", m.accuracy_pct)
            })
            .collect::<Vec<_>>()
            .join(". ");
        format!("{summary}.{note}")
    };

    let counts_content = if official.is_empty() || models.is_empty() {
        "Per-model hit counts will appear once results and predictions are loaded.".to_string()
    } else {
        let summary = models
            .iter()
            .map(|(name, predictions)| {
                let m = compute_model_metrics(official, predictions);
                format!("{name}: {} perfect, {} good", m.perfect, m.good)
            })
            .collect::<Vec<_>>()
            .join(". ");
        format!("{summary}.{note}")
    };

    vec![
        Highlight {
            title: "Race Winner".to_string(),
            content: winner_content,
        },
        Highlight {
            title: "Model Performance".to_string(),
            content: performance_content,
        },
        Highlight {
            title: "Prediction Hits".to_string(),
            content: counts_content,
        },
        Highlight {
            title: "Key Insight".to_string(),
            content: "Perfect and near-miss predictions show how well each model captured \
                      the running order; large misses usually trace back to incidents the \
                      models could not see coming."
                .to_string(),
        },
    ]
}
