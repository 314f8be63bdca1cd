//! Column Statistics Computation

/// Summary statistics for one feature column.
///
/// Non-finite values are treated as missing and skipped, so a column made
/// entirely of `NaN` has `count == 0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStatistics {
    /// Number of finite values seen
    pub count: usize,
    /// Arithmetic mean of the finite values
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std_dev: f64,
    /// Minimum finite value
    pub min: f64,
    /// Maximum finite value
    pub max: f64,
}

impl ColumnStatistics {
    /// Compute statistics from a slice of values, skipping non-finite entries
    pub fn compute(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self::default();
        }

        let n = finite.len() as f64;
        // Running mean, so values near f64::MAX do not overflow a plain sum
        let mean = finite
            .iter()
            .enumerate()
            .fold(0.0, |mean, (i, &v)| {
                let k = (i + 1) as f64;
                mean + (v / k - mean / k)
            });

        let min = finite.iter().cloned().fold(f64::MAX, f64::min);
        let max = finite.iter().cloned().fold(f64::MIN, f64::max);

        let m2: f64 = finite
            .iter()
            .map(|&v| {
                let d = v - mean;
                d * d
            })
            .sum();
        let std_dev = (m2 / n).sqrt();

        Self {
            count: finite.len(),
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Compute statistics for every column of a rectangular table.
    ///
    /// `width` is the number of columns; rows shorter than `width` contribute
    /// nothing to the missing positions.
    pub fn compute_columns(rows: &[Vec<f64>], width: usize) -> Vec<Self> {
        (0..width)
            .map(|col| {
                let column: Vec<f64> = rows
                    .iter()
                    .map(|row| row.get(col).copied().unwrap_or(f64::NAN))
                    .collect();
                Self::compute(&column)
            })
            .collect()
    }

    /// Whether no finite value contributed
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean of the column, or `None` when the column had no usable values
    pub fn mean_opt(&self) -> Option<f64> {
        if self.is_empty() || !self.mean.is_finite() {
            None
        } else {
            Some(self.mean)
        }
    }
}
