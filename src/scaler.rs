use crate::error::{ChurnError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// A fitted numeric transform over the aligned feature columns.
pub trait Transform {
    fn transform(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>>;
}

/// Serialized scaler artifact, fitted on the feature schema's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scaler {
    /// `(x - mean) / scale`; a zero scale divides by one.
    Standard { mean: Array1<f64>, scale: Array1<f64> },
    /// `x * scale + min`.
    MinMax { min: Array1<f64>, scale: Array1<f64> },
}

impl Scaler {
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
        }
    }
}

impl Transform for Scaler {
    fn transform(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let (offset, scale) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
        };
        anyhow::ensure!(
            offset.len() == scale.len(),
            "scaler is corrupt: {} offsets but {} scales",
            offset.len(),
            scale.len()
        );
        anyhow::ensure!(
            x.ncols() == offset.len(),
            "X has {} features, but scaler is expecting {} features as input",
            x.ncols(),
            offset.len()
        );

        let mut out = x.to_owned();
        match self {
            Scaler::Standard { mean, scale } => {
                let scale = scale.mapv(|s| if s == 0.0 { 1.0 } else { s });
                for mut row in out.axis_iter_mut(Axis(0)) {
                    row -= mean;
                    row /= &scale;
                }
            }
            Scaler::MinMax { min, scale } => {
                for mut row in out.axis_iter_mut(Axis(0)) {
                    row *= scale;
                    row += min;
                }
            }
        }
        Ok(out)
    }
}

/// Applies `scaler` when present, otherwise passes the aligned values through untouched.
pub fn apply_scaler(
    scaler: Option<&dyn Transform>,
    aligned: Array2<f64>,
) -> Result<Array2<f64>> {
    match scaler {
        None => Ok(aligned),
        Some(s) => s
            .transform(aligned.view())
            .map_err(|e| ChurnError::ScalerTransform(format!("{e:#}"))),
    }
}
