//! Risk Labels

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::error;

/// Semantic label of a cluster index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Severe Risk")]
    Severe,
}

impl RiskLabel {
    /// Labels in cluster index order
    pub const ALL: [RiskLabel; 4] = [
        RiskLabel::Low,
        RiskLabel::Moderate,
        RiskLabel::High,
        RiskLabel::Severe,
    ];

    /// Number of defined labels
    pub const COUNT: usize = Self::ALL.len();

    /// Label for a cluster index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Cluster index of this label
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low Risk",
            RiskLabel::Moderate => "Moderate Risk",
            RiskLabel::High => "High Risk",
            RiskLabel::Severe => "Severe Risk",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name that matches no risk label
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown risk label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for RiskLabel {
    type Err = UnknownLabel;

    /// Accepts the display name ("High Risk") or the short form ("high"),
    /// case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|label| {
                label.as_str().eq_ignore_ascii_case(wanted)
                    || label
                        .as_str()
                        .split(' ')
                        .next()
                        .is_some_and(|short| short.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| UnknownLabel(wanted.to_string()))
    }
}

/// Cluster index together with its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    #[serde(rename = "cluster")]
    pub cluster_index: usize,
    pub label: RiskLabel,
}

impl ClusterAssignment {
    /// Map a model output index through the label table
    pub fn from_index(cluster_index: usize) -> Result<Self, InferenceError> {
        match RiskLabel::from_index(cluster_index) {
            Some(label) => Ok(Self {
                cluster_index,
                label,
            }),
            None => {
                error!(
                    "Model produced cluster index {} outside the label mapping",
                    cluster_index
                );
                Err(InferenceError::ModelDefect {
                    cluster: cluster_index,
                    known: RiskLabel::COUNT,
                })
            }
        }
    }
}
