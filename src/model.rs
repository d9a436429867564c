//! Classifier capabilities and the serialized model artifact.
//!
//! A model always predicts labels. Probability output and feature
//! importances are optional capabilities that callers query explicitly.

use linfa::prelude::*;
use linfa_bayes::{MultinomialNb, NaiveBayes};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Label used for the churn class.
pub const LABEL_CHURN: usize = 1;

pub trait Classifier {
    /// Predicts a 0/1 label per input row.
    fn predict_label(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<usize>>;

    /// Probability output, when the model supports it.
    fn probabilistic(&self) -> Option<&dyn ProbabilisticClassifier> {
        None
    }

    /// One weight per feature schema entry, in schema order.
    fn feature_importances(&self) -> Option<ArrayView1<'_, f64>> {
        None
    }
}

pub trait ProbabilisticClassifier {
    /// Probability of the churn class per input row.
    fn predict_proba(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>>;
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn decision_function(
    coefficients: &Array1<f64>,
    intercept: f64,
    x: ArrayView2<f64>,
) -> anyhow::Result<Array1<f64>> {
    anyhow::ensure!(
        x.ncols() == coefficients.len(),
        "X has {} features, but model is expecting {} features as input",
        x.ncols(),
        coefficients.len()
    );
    Ok(x.dot(coefficients) + intercept)
}

/// Binary logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub feature_importances: Option<Array1<f64>>,
}

impl Classifier for LogisticModel {
    fn predict_label(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<usize>> {
        let p = self.predict_proba(x)?;
        Ok(p.mapv(|p| usize::from(p >= 0.5)))
    }

    fn probabilistic(&self) -> Option<&dyn ProbabilisticClassifier> {
        Some(self)
    }

    fn feature_importances(&self) -> Option<ArrayView1<'_, f64>> {
        self.feature_importances.as_ref().map(|a| a.view())
    }
}

impl ProbabilisticClassifier for LogisticModel {
    fn predict_proba(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>> {
        let z = decision_function(&self.coefficients, self.intercept, x)?;
        Ok(z.mapv(sigmoid))
    }
}

/// Linear max-margin classifier. Predicts labels only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvmModel {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub feature_importances: Option<Array1<f64>>,
}

impl Classifier for LinearSvmModel {
    fn predict_label(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<usize>> {
        let z = decision_function(&self.coefficients, self.intercept, x)?;
        Ok(z.mapv(|z| usize::from(z > 0.0)))
    }

    fn feature_importances(&self) -> Option<ArrayView1<'_, f64>> {
        self.feature_importances.as_ref().map(|a| a.view())
    }
}

/// Multinomial Naive Bayes fitted over the encoded features.
#[derive(Serialize, Deserialize)]
pub struct NaiveBayesModel {
    pub model: MultinomialNb<f64, usize>,
}

impl Classifier for NaiveBayesModel {
    fn predict_label(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<usize>> {
        Ok(self.model.predict(&x))
    }

    fn probabilistic(&self) -> Option<&dyn ProbabilisticClassifier> {
        Some(self)
    }
}

impl ProbabilisticClassifier for NaiveBayesModel {
    fn predict_proba(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>> {
        let (proba, classes) = self.model.predict_proba(x);
        let col = classes
            .iter()
            .position(|&c| *c == LABEL_CHURN)
            .ok_or_else(|| anyhow::anyhow!("model was not fitted with a churn class"))?;
        Ok(proba.column(col).to_owned())
    }
}

/// The model artifact as stored on disk.
#[derive(Serialize, Deserialize)]
pub enum ModelArtifact {
    Logistic(LogisticModel),
    LinearSvm(LinearSvmModel),
    NaiveBayes(NaiveBayesModel),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Logistic(_) => "logistic regression",
            ModelArtifact::LinearSvm(_) => "linear SVM",
            ModelArtifact::NaiveBayes(_) => "multinomial naive Bayes",
        }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        match self {
            ModelArtifact::Logistic(m) => m,
            ModelArtifact::LinearSvm(m) => m,
            ModelArtifact::NaiveBayes(m) => m,
        }
    }
}
