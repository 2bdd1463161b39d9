//! Group-by-mean aggregation over an experiment's observations.

use super::store::{Observation, ObservationStore};
use super::variant::ExperimentVariant;
use crate::error::ObservationError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub date: NaiveDate,
    /// One cell per entry of [`PivotTable::groups`]; `None` when that group
    /// has no observation on this date.
    pub values: Vec<Option<f64>>,
}

/// Date × group table of mean measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub groups: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub variant: ExperimentVariant,
    pub record_count: usize,
    pub summaries: Vec<GroupSummary>,
    pub pivot: PivotTable,
}

fn mean(values: &[f64]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

/// Groups of `variant` that have at least one observation, in display order.
fn groups_present(variant: ExperimentVariant, observations: &[Observation]) -> Vec<String> {
    variant
        .groups()
        .iter()
        .filter(|group| observations.iter().any(|o| o.group == **group))
        .map(|group| (*group).to_string())
        .collect()
}

pub fn group_summaries(
    variant: ExperimentVariant,
    observations: &[Observation],
) -> Vec<GroupSummary> {
    groups_present(variant, observations)
        .into_iter()
        .map(|group| {
            let values: Vec<f64> = observations
                .iter()
                .filter(|o| o.group == group)
                .map(|o| o.measurement)
                .collect();
            GroupSummary {
                count: values.len(),
                mean: mean(&values),
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                group,
            }
        })
        .collect()
}

/// Mean measurement per group, in the variant's group order.
pub fn group_means(variant: ExperimentVariant, observations: &[Observation]) -> Vec<(String, f64)> {
    group_summaries(variant, observations)
        .into_iter()
        .map(|summary| (summary.group, summary.mean))
        .collect()
}

pub fn pivot(variant: ExperimentVariant, observations: &[Observation]) -> PivotTable {
    let groups = groups_present(variant, observations);

    let mut cells: BTreeMap<NaiveDate, Vec<Vec<f64>>> = BTreeMap::new();
    for observation in observations {
        let Some(column) = groups.iter().position(|g| *g == observation.group) else {
            continue;
        };
        cells
            .entry(observation.date)
            .or_insert_with(|| vec![Vec::new(); groups.len()])[column]
            .push(observation.measurement);
    }

    let rows = cells
        .into_iter()
        .map(|(date, columns)| PivotRow {
            date,
            values: columns
                .iter()
                .map(|values| (!values.is_empty()).then(|| mean(values)))
                .collect(),
        })
        .collect();

    PivotTable { groups, rows }
}

/// Load and aggregate one experiment. Any read problem is reported as
/// [`ObservationError::AnalysisFailed`].
pub fn analyze(
    store: &ObservationStore,
    variant: ExperimentVariant,
) -> Result<Analysis, ObservationError> {
    let observations = store.records(variant).map_err(|e| match e {
        ObservationError::AnalysisFailed(_) => e,
        other => ObservationError::AnalysisFailed(other.to_string()),
    })?;

    tracing::debug!(variant = %variant, rows = observations.len(), "Analyzing observations");

    Ok(Analysis {
        variant,
        record_count: observations.len(),
        summaries: group_summaries(variant, &observations),
        pivot: pivot(variant, &observations),
    })
}
