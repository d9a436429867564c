//! Error taxonomy for the prediction pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a prediction request.
///
/// `MissingArtifact` and `Deserialize` are fatal at startup. The remaining
/// variants end the current request only; the interactive loop keeps going.
#[derive(Debug, Error)]
pub enum ChurnError {
    #[error(
        "Required file missing: {name} ({}). Please ensure it's in the artifact directory.",
        .path.display()
    )]
    MissingArtifact { name: String, path: PathBuf },

    #[error("Failed to read {name} from {}", .path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to deserialize {name} from {}", .path.display())]
    Deserialize {
        name: String,
        path: PathBuf,
        #[source]
        source: rmp_serde::decode::Error,
    },

    #[error("Failed to serialize {name} to {}", .path.display())]
    Serialize {
        name: String,
        path: PathBuf,
        #[source]
        source: rmp_serde::encode::Error,
    },

    #[error("Feature columns list is invalid: {0}")]
    InvalidSchema(String),

    #[error("Failed to align input with trained features: {0}")]
    Alignment(String),

    #[error(
        "Scaler exists but failed to transform input. Check that scaler was fitted on the same columns and order as the feature list: {0}"
    )]
    ScalerTransform(String),

    #[error("Model prediction failed")]
    Prediction(#[source] anyhow::Error),
}

pub type Result<T, E = ChurnError> = std::result::Result<T, E>;

/// Joins `err` and every error in its source chain with `": "`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
