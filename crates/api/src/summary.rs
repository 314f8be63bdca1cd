//! Cluster distribution and per-record assignments of the reference data set

use feature_engine::{Cell, RawTable};
use inference_engine::{ClusterAssignment, InferenceContext, InferenceError, RiskLabel};
use serde::Serialize;
use tracing::info;

/// Records and totals for one risk label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterStats {
    pub cluster: usize,
    pub label: RiskLabel,
    /// Records assigned to this cluster
    pub count: usize,
    /// Sum of all numeric cells of those records
    pub total: f64,
    /// Fraction of the summarized records
    pub share: f64,
}

/// Distribution over the four risk labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub records: usize,
    pub clusters: Vec<ClusterStats>,
}

impl ClusterSummary {
    /// Aggregate assignments with per-row totals
    pub fn build(assignments: &[ClusterAssignment], totals: &[f64]) -> Self {
        let mut clusters: Vec<ClusterStats> = RiskLabel::ALL
            .iter()
            .map(|&label| ClusterStats {
                cluster: label.index(),
                label,
                count: 0,
                total: 0.0,
                share: 0.0,
            })
            .collect();

        for (assignment, &total) in assignments.iter().zip(totals) {
            let stats = &mut clusters[assignment.label.index()];
            stats.count += 1;
            stats.total += total;
        }

        Self::with_shares(clusters)
    }

    /// Keep only the given labels; shares are relative to what is kept
    pub fn filter(&self, labels: &[RiskLabel]) -> Self {
        let kept = self
            .clusters
            .iter()
            .filter(|c| labels.contains(&c.label))
            .cloned()
            .collect();
        Self::with_shares(kept)
    }

    fn with_shares(mut clusters: Vec<ClusterStats>) -> Self {
        let records: usize = clusters.iter().map(|c| c.count).sum();
        for stats in &mut clusters {
            stats.share = if records == 0 {
                0.0
            } else {
                stats.count as f64 / records as f64
            };
        }
        Self { records, clusters }
    }
}

/// One reference row with its assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRecord {
    pub row: Vec<Cell>,
    #[serde(flatten)]
    pub assignment: ClusterAssignment,
    /// Sum of the numeric cells of the row
    pub total: f64,
}

/// Every reference row with its assignment, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceRecords {
    columns: Vec<String>,
    records: Vec<ReferenceRecord>,
}

/// One page of reference records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPage {
    pub columns: Vec<String>,
    /// Records matching the label filter, across all pages
    pub matching: usize,
    pub offset: usize,
    pub limit: usize,
    pub count: usize,
    pub data: Vec<ReferenceRecord>,
}

impl ReferenceRecords {
    pub fn new(table: &RawTable, assignments: &[ClusterAssignment], totals: &[f64]) -> Self {
        let records = table
            .rows()
            .iter()
            .zip(assignments)
            .zip(totals)
            .map(|((row, assignment), &total)| ReferenceRecord {
                row: row.clone(),
                assignment: *assignment,
                total,
            })
            .collect();
        Self {
            columns: table.columns().to_vec(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with one of `labels`, skipping `offset` and keeping at most `limit`
    pub fn page(&self, labels: &[RiskLabel], offset: usize, limit: usize) -> RecordPage {
        let mut matching = 0;
        let mut data = Vec::new();
        for record in self
            .records
            .iter()
            .filter(|r| labels.contains(&r.assignment.label))
        {
            if matching >= offset && data.len() < limit {
                data.push(record.clone());
            }
            matching += 1;
        }
        RecordPage {
            columns: self.columns.clone(),
            matching,
            offset,
            limit,
            count: data.len(),
            data,
        }
    }
}

/// Classify the reference table once, keeping both the distribution and the
/// per-record assignments
pub fn classify_reference(
    context: &InferenceContext,
    table: &RawTable,
) -> Result<(ClusterSummary, ReferenceRecords), InferenceError> {
    let batch = context.classify_batch(table)?;
    let totals = table.row_totals();
    let summary = ClusterSummary::build(&batch.assignments, &totals);
    let records = ReferenceRecords::new(table, &batch.assignments, &totals);
    info!(
        "Reference data: {} records across {} clusters",
        summary.records,
        summary.clusters.iter().filter(|c| c.count > 0).count()
    );
    Ok((summary, records))
}
