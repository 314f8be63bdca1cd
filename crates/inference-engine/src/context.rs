//! Inference Context
//!
//! Process-wide, read-only bundle of aligner, normalizer and model. All
//! classification goes through here: align, standardize, nearest centroid,
//! label.

use crate::artifact::ModelArtifact;
use crate::label::{ClusterAssignment, RiskLabel};
use crate::model::ClusteringModel;
use crate::InferenceError;
use feature_engine::{AlignmentPolicy, AlignmentWarning, FeatureAligner, RawTable};
use ndarray::{aview1, Array2};
use normalizer::Normalizer;
use tracing::{debug, info, warn};

/// Assignments for a batch, in input row order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchClassification {
    pub assignments: Vec<ClusterAssignment>,
    /// Set when the numeric width of the batch differed from the model's
    pub alignment_warning: Option<AlignmentWarning>,
    /// Non-numeric columns ignored during alignment
    pub dropped_columns: Vec<String>,
    /// Cells filled with batch column means
    pub imputed_cells: usize,
}

/// Assignment for a single vector
#[derive(Debug, Clone, PartialEq)]
pub struct VectorClassification {
    pub assignment: ClusterAssignment,
    /// Set when the vector length differed from the model's
    pub alignment_warning: Option<AlignmentWarning>,
}

/// Immutable inference state shared by all requests
#[derive(Debug, Clone)]
pub struct InferenceContext {
    normalizer: Normalizer,
    model: ClusteringModel,
    aligner: FeatureAligner,
    feature_names: Vec<String>,
}

impl InferenceContext {
    /// Combine a fitted normalizer and model
    pub fn new(
        normalizer: Normalizer,
        model: ClusteringModel,
        policy: AlignmentPolicy,
    ) -> Result<Self, InferenceError> {
        if normalizer.dimension() != model.dimension() {
            return Err(InferenceError::InvalidModel(format!(
                "normalization covers {} features but centroids have {}",
                normalizer.dimension(),
                model.dimension()
            )));
        }
        if model.n_clusters() != RiskLabel::COUNT {
            warn!(
                "Model has {} clusters but {} risk labels are defined",
                model.n_clusters(),
                RiskLabel::COUNT
            );
        }

        info!(
            "Inference context ready: {} features, {} clusters, {} alignment",
            model.dimension(),
            model.n_clusters(),
            policy.as_str()
        );

        Ok(Self {
            aligner: FeatureAligner::new(model.dimension(), policy),
            normalizer,
            model,
            feature_names: Vec::new(),
        })
    }

    /// Build from a persisted artifact. `reference` rows are used to fit the
    /// normalizer when the artifact carries no normalization parameters.
    pub fn from_artifact(
        artifact: ModelArtifact,
        reference: Option<&[Vec<f64>]>,
        policy: AlignmentPolicy,
    ) -> Result<Self, InferenceError> {
        let normalizer = match (artifact.normalization, reference) {
            (Some(params), _) => Normalizer::new(params)?,
            (None, Some(rows)) => {
                info!("Artifact has no normalization; fitting on {} reference rows", rows.len());
                Normalizer::fit(rows)?
            }
            (None, None) => {
                return Err(InferenceError::ModelLoadError(
                    "artifact has no normalization parameters and no reference data to fit them"
                        .to_string(),
                ))
            }
        };
        let model = ClusteringModel::new(artifact.centroids)?;
        Ok(Self::new(normalizer, model, policy)?.with_feature_names(artifact.feature_names))
    }

    /// Attach training column names; ignored when the count does not match
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        if names.is_empty() {
            return self;
        }
        if names.len() != self.dimension() {
            warn!(
                "Ignoring {} feature names for a {}-feature model",
                names.len(),
                self.dimension()
            );
            return self;
        }
        self.feature_names = names;
        self
    }

    /// Features the model expects (`D`)
    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    /// Clusters the model knows (`K`)
    pub fn n_clusters(&self) -> usize {
        self.model.n_clusters()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn model(&self) -> &ClusteringModel {
        &self.model
    }

    pub fn aligner(&self) -> &FeatureAligner {
        &self.aligner
    }

    /// Classify one feature vector. Non-finite values count as missing.
    pub fn classify_one(&self, vector: &[f64]) -> Result<ClusterAssignment, InferenceError> {
        self.classify_vector(vector).map(|c| c.assignment)
    }

    /// Like [`classify_one`](Self::classify_one), also returning the
    /// alignment warning for the vector
    pub fn classify_vector(&self, vector: &[f64]) -> Result<VectorClassification, InferenceError> {
        let aligned = self.aligner.align_vector(vector)?;
        if let Some(w) = &aligned.warning {
            warn!("{}", w);
        }

        let standardized = self.normalizer.standardize(&aligned.values)?;
        let cluster = self.model.predict(aview1(&standardized))?;
        let assignment = ClusterAssignment::from_index(cluster)?;

        debug!("Classified vector as cluster {} ({})", cluster, assignment.label);
        Ok(VectorClassification {
            assignment,
            alignment_warning: aligned.warning,
        })
    }

    /// Classify every row of a table, one assignment per row
    pub fn classify_batch(&self, table: &RawTable) -> Result<BatchClassification, InferenceError> {
        let alignment = self.aligner.align_table(table)?;
        let rows = alignment.table.len();
        let dim = self.dimension();

        let mut flat = Vec::with_capacity(rows * dim);
        for row in alignment.table.rows() {
            flat.extend(self.normalizer.standardize(row)?);
        }
        let matrix = Array2::from_shape_vec((rows, dim), flat)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let assignments = self
            .model
            .predict_batch(matrix.view())?
            .into_iter()
            .map(ClusterAssignment::from_index)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Classified batch of {} rows", assignments.len());

        Ok(BatchClassification {
            assignments,
            alignment_warning: alignment.warning,
            dropped_columns: alignment.dropped_columns,
            imputed_cells: alignment.imputed_cells,
        })
    }
}
