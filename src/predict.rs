//! Prediction, decision and presentation of the result.

use crate::error::{ChurnError, Result};
use crate::model::Classifier;
use crate::schema::FeatureSchema;
use ndarray::ArrayView2;
use std::io::{self, Write};

/// Probabilities at or above this are predicted as churn.
pub const CHURN_THRESHOLD: f64 = 0.5;
const HIGH_RISK_ABOVE: f64 = 0.8;
const MODERATE_RISK_ABOVE: f64 = 0.5;
/// How many features the importance ranking shows.
pub const TOP_FEATURES: usize = 8;

/// Business guidance tier.
///
/// Tiers use strict `>` bounds, so a probability of exactly 0.5 is a churn
/// verdict with low-risk guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    High,
    Moderate,
    Low,
}

impl Advisory {
    pub fn from_probability(p: f64) -> Self {
        if p > HIGH_RISK_ABOVE {
            Advisory::High
        } else if p > MODERATE_RISK_ABOVE {
            Advisory::Moderate
        } else {
            Advisory::Low
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Advisory::High => {
                "High risk of churn — consider immediate retention (discounts, personalized outreach)."
            }
            Advisory::Moderate => "Moderate risk — monitor and apply targeted engagement.",
            Advisory::Low => "Low risk — maintain normal engagement.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub probability: f64,
    pub churn: bool,
    pub advisory: Advisory,
    /// Top features by descending importance, if the model reports importances.
    pub top_features: Option<Vec<(String, f64)>>,
}

/// Runs the model on the final input row and derives verdict and guidance.
pub fn predict(
    model: &dyn Classifier,
    input: ArrayView2<f64>,
    schema: &FeatureSchema,
) -> Result<Prediction> {
    let probability = match model.probabilistic() {
        Some(p) => {
            let proba = p.predict_proba(input).map_err(ChurnError::Prediction)?;
            first(proba.to_vec())?
        }
        None => {
            let labels = model
                .predict_label(input)
                .map_err(ChurnError::Prediction)?;
            first(labels.to_vec())? as f64
        }
    };
    tracing::debug!(probability, "model output");

    let top_features = match model.feature_importances() {
        Some(importances) => {
            if importances.len() != schema.len() {
                return Err(ChurnError::Prediction(anyhow::anyhow!(
                    "model reports {} feature importances but the feature list has {} columns",
                    importances.len(),
                    schema.len()
                )));
            }
            let mut ranked: Vec<(String, f64)> = schema
                .columns()
                .iter()
                .cloned()
                .zip(importances.iter().copied())
                .collect();
            ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
                (false, false) => b.1.total_cmp(&a.1),
                (a_nan, b_nan) => a_nan.cmp(&b_nan),
            });
            ranked.truncate(TOP_FEATURES);
            Some(ranked)
        }
        None => None,
    };

    Ok(Prediction {
        probability,
        churn: probability >= CHURN_THRESHOLD,
        advisory: Advisory::from_probability(probability),
        top_features,
    })
}

fn first<T>(values: Vec<T>) -> Result<T> {
    values
        .into_iter()
        .next()
        .ok_or_else(|| ChurnError::Prediction(anyhow::anyhow!("model returned no output rows")))
}

pub fn render_prediction(out: &mut impl Write, prediction: &Prediction) -> io::Result<()> {
    writeln!(out, "🔍 Prediction Result")?;
    if prediction.churn {
        writeln!(
            out,
            "⚠️ Predicted: CHURN (probability = {:.2})",
            prediction.probability
        )?;
    } else {
        writeln!(
            out,
            "✅ Predicted: STAY (probability = {:.2})",
            prediction.probability
        )?;
    }

    writeln!(out)?;
    writeln!(out, "📈 Business Insight")?;
    writeln!(out, "{}", prediction.advisory.message())?;

    writeln!(out)?;
    match &prediction.top_features {
        Some(features) => {
            writeln!(out, "🔥 Top features (model importance)")?;
            let width = features.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
            for (name, weight) in features {
                writeln!(out, "{name:>width$} | {weight:.4}")?;
            }
        }
        None => writeln!(out, "Model does not provide feature importances.")?,
    }
    Ok(())
}

/// Reports a failed request with its full error chain.
pub fn render_failure(out: &mut impl Write, err: &ChurnError) -> io::Result<()> {
    match err {
        ChurnError::Prediction(_) => {
            writeln!(out, "Model prediction failed. See details below:")?
        }
        other => writeln!(out, "{other}")?,
    }
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        writeln!(out, "  caused by: {cause}")?;
        source = cause.source();
    }
    Ok(())
}
