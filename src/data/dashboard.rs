use serde::Serialize;

use super::aggregate::Summary;
use super::filter::{apply, filter_baseline, Baseline, FilterState, StepCount};
use super::model::Dataset;

/// Baseline side of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BaselineSummary {
    Present {
        steps: Vec<StepCount>,
        summary: Summary,
    },
    /// No baseline record matches the country step; `None` when no country
    /// was available to select.
    Absent { country: Option<String> },
}

/// Everything rendered for one filter selection, recomputed from scratch on
/// every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub filters: FilterState,
    /// Match count after each active step on the topic dataset.
    pub steps: Vec<StepCount>,
    pub topic: Summary,
    pub baseline: BaselineSummary,
}

impl Dashboard {
    pub fn compute(
        topic_data: &Dataset,
        baseline_data: &Dataset,
        filters: &FilterState,
        preview_rows: usize,
    ) -> Self {
        let topic = apply(topic_data, &filters.topic_criteria());
        let baseline = match filter_baseline(baseline_data, filters) {
            Baseline::Present(filtered) => BaselineSummary::Present {
                summary: Summary::from_view(&filtered.view, preview_rows),
                steps: filtered.steps,
            },
            Baseline::Absent { country } => BaselineSummary::Absent { country },
        };

        log::debug!(
            "Recomputed dashboard for {:?}: steps {:?}, baseline {}",
            filters.topic,
            topic.steps,
            match &baseline {
                BaselineSummary::Present { summary, .. } => format!("{} records", summary.total),
                BaselineSummary::Absent { country } => {
                    format!("absent for {}", country.as_deref().unwrap_or("no country"))
                }
            }
        );

        Dashboard {
            filters: filters.clone(),
            topic: Summary::from_view(&topic.view, preview_rows),
            steps: topic.steps,
            baseline,
        }
    }

    /// Pretty-printed JSON export of the whole dashboard.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
