//! Nearest-Centroid Clustering Model

use crate::InferenceError;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Fitted partitioning model: `K` centroids in standardized feature space
#[derive(Debug, Clone)]
pub struct ClusteringModel {
    centroids: Array2<f64>,
}

impl ClusteringModel {
    /// Build a model from centroid rows. All rows must share one width and
    /// contain only finite values.
    pub fn new(centroids: Vec<Vec<f64>>) -> Result<Self, InferenceError> {
        let k = centroids.len();
        let d = centroids.first().map(Vec::len).unwrap_or(0);
        if k == 0 || d == 0 {
            return Err(InferenceError::InvalidModel(
                "model needs at least one non-empty centroid".to_string(),
            ));
        }

        for (i, centroid) in centroids.iter().enumerate() {
            if centroid.len() != d {
                return Err(InferenceError::InvalidModel(format!(
                    "centroid {} has {} features, expected {}",
                    i,
                    centroid.len(),
                    d
                )));
            }
            if centroid.iter().any(|v| !v.is_finite()) {
                return Err(InferenceError::InvalidModel(format!(
                    "centroid {} contains a non-finite value",
                    i
                )));
            }
        }

        let flat: Vec<f64> = centroids.into_iter().flatten().collect();
        let centroids = Array2::from_shape_vec((k, d), flat)
            .map_err(|e| InferenceError::InvalidModel(e.to_string()))?;

        Ok(Self { centroids })
    }

    /// Number of clusters `K`
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Feature dimensionality `D`
    pub fn dimension(&self) -> usize {
        self.centroids.ncols()
    }

    pub fn centroids(&self) -> ArrayView2<'_, f64> {
        self.centroids.view()
    }

    /// Index of the closest centroid to a standardized point
    pub fn predict(&self, point: ArrayView1<'_, f64>) -> Result<usize, InferenceError> {
        self.check_dimension(point.len())?;
        Self::check_finite(point)?;
        Ok(self.nearest(point))
    }

    /// Closest centroid for every row, in row order
    pub fn predict_batch(&self, points: ArrayView2<'_, f64>) -> Result<Vec<usize>, InferenceError> {
        self.check_dimension(points.ncols())?;
        points
            .outer_iter()
            .map(|p| {
                Self::check_finite(p)?;
                Ok(self.nearest(p))
            })
            .collect()
    }

    /// Squared Euclidean distance; ties go to the lowest index
    fn nearest(&self, point: ArrayView1<'_, f64>) -> usize {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, centroid) in self.centroids.outer_iter().enumerate() {
            let diff = &centroid - &point;
            let dist = diff.dot(&diff);
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        best
    }

    /// Distances to a non-finite point never compare, so reject it up front
    fn check_finite(point: ArrayView1<'_, f64>) -> Result<(), InferenceError> {
        if point.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::InferenceFailed(
                "standardized point contains a non-finite value".to_string(),
            ));
        }
        Ok(())
    }

    fn check_dimension(&self, actual: usize) -> Result<(), InferenceError> {
        if actual != self.dimension() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.dimension(),
                actual,
            });
        }
        Ok(())
    }
}
