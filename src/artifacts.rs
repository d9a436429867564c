//! Loading and saving of the model, scaler and feature-list artifacts.
//!
//! Artifacts are MessagePack files written with `rmp_serde::encode::write_named`.

use crate::error::{ChurnError, Result};
use crate::model::{LogisticModel, ModelArtifact};
use crate::scaler::Scaler;
use crate::schema::FeatureSchema;
use ndarray::Array1;
use rmp_serde::{decode::from_read, encode::write_named};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub const MODEL_FILE: &str = "model.msgpack";
pub const FEATURES_FILE: &str = "features.msgpack";
pub const SCALER_FILE: &str = "scaler.msgpack";

pub const MODEL_NAME: &str = "Trained Model";
pub const FEATURES_NAME: &str = "Feature columns list";
pub const SCALER_NAME: &str = "Scaler";

/// Deserializes the artifact at `path`, failing with a named error if it is absent.
pub fn load_artifact<T: DeserializeOwned>(path: &Path, name: &str) -> Result<T> {
    if !path.exists() {
        return Err(ChurnError::MissingArtifact {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| ChurnError::Io {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    from_read(BufReader::new(file)).map_err(|source| ChurnError::Deserialize {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_artifact`], but absence or a broken file yields `None`.
pub fn load_optional_artifact<T: DeserializeOwned>(path: &Path, name: &str) -> Option<T> {
    if !path.exists() {
        return None;
    }
    match load_artifact(path, name) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, "{name} could not be loaded; continuing without it");
            None
        }
    }
}

/// Serializes `value` to `path` as MessagePack.
pub fn save_artifact<T: Serialize>(value: &T, path: &Path, name: &str) -> Result<()> {
    let io_err = |source| ChurnError::Io {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_named(&mut writer, value).map_err(|source| ChurnError::Serialize {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}

/// Everything the pipeline needs, loaded once and never mutated.
pub struct Artifacts {
    pub model: ModelArtifact,
    pub features: FeatureSchema,
    pub scaler: Option<Scaler>,
}

impl Artifacts {
    /// Loads the artifacts from `dir`. Model and feature list are required.
    pub fn load(dir: &Path) -> Result<Self> {
        let model_path = dir.join(MODEL_FILE);
        println!("📦 Loading model from {:?}", model_path);
        let model: ModelArtifact = load_artifact(&model_path, MODEL_NAME)?;

        let features: FeatureSchema = load_artifact(&dir.join(FEATURES_FILE), FEATURES_NAME)?;
        features.validate()?;

        let scaler: Option<Scaler> = load_optional_artifact(&dir.join(SCALER_FILE), SCALER_NAME);
        if let Some(s) = &scaler {
            if s.n_features() != features.len() {
                tracing::warn!(
                    scaler_features = s.n_features(),
                    schema_features = features.len(),
                    "scaler width differs from the feature list"
                );
            }
        }

        tracing::info!(
            model = model.kind(),
            features = features.len(),
            scaled = scaler.is_some(),
            "artifacts loaded"
        );
        Ok(Artifacts {
            model,
            features,
            scaler,
        })
    }

    /// Writes the artifacts to `dir`, removing a stale scaler when there is none.
    pub fn save(&self, dir: &Path) -> Result<()> {
        save_artifact(&self.model, &dir.join(MODEL_FILE), MODEL_NAME)?;
        save_artifact(&self.features, &dir.join(FEATURES_FILE), FEATURES_NAME)?;
        let scaler_path = dir.join(SCALER_FILE);
        match &self.scaler {
            Some(s) => save_artifact(s, &scaler_path, SCALER_NAME)?,
            None if scaler_path.exists() => {
                std::fs::remove_file(&scaler_path).map_err(|source| ChurnError::Io {
                    name: SCALER_NAME.to_string(),
                    path: scaler_path.clone(),
                    source,
                })?
            }
            None => {}
        }
        Ok(())
    }
}

/// Demo artifacts over the customer form's feature space.
///
/// The coefficients are fixed, hand-picked values so the tool can be tried
/// end-to-end without a training run.
pub fn demo_artifacts() -> Result<Artifacts> {
    let weights: [(&str, f64, f64, f64); 15] = [
        // (column, mean, scale, coefficient)
        ("Age", 39.0, 12.0, 0.30),
        ("Tenure", 31.0, 17.0, -0.20),
        ("Usage Frequency", 16.0, 8.5, -0.15),
        ("Support Calls", 3.6, 3.1, 0.90),
        ("Payment Delay", 12.9, 8.3, 0.60),
        ("Total Spend", 631.0, 240.0, -0.40),
        ("Last Interaction", 14.5, 8.6, 0.30),
        ("Gender_Female", 0.0, 1.0, 0.20),
        ("Gender_Male", 0.0, 1.0, -0.10),
        ("Subscription Type_Basic", 0.0, 1.0, 0.10),
        ("Subscription Type_Premium", 0.0, 1.0, -0.05),
        ("Subscription Type_Standard", 0.0, 1.0, -0.05),
        ("Contract Length_Monthly", 0.0, 1.0, 0.80),
        ("Contract Length_Quarterly", 0.0, 1.0, -0.30),
        ("Contract Length_Yearly", 0.0, 1.0, -0.40),
    ];

    let coefficients: Array1<f64> = weights.iter().map(|w| w.3).collect();
    let total: f64 = coefficients.iter().map(|c| c.abs()).sum();
    let importances = coefficients.mapv(|c| c.abs() / total);

    Ok(Artifacts {
        model: ModelArtifact::Logistic(LogisticModel {
            coefficients,
            intercept: -0.2,
            feature_importances: Some(importances),
        }),
        features: FeatureSchema::new(weights.iter().map(|w| w.0))?,
        scaler: Some(Scaler::Standard {
            mean: weights.iter().map(|w| w.1).collect(),
            scale: weights.iter().map(|w| w.2).collect(),
        }),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::form::{Control, customer_form};
    use crate::model::{NaiveBayesModel, ProbabilisticClassifier};
    use linfa::prelude::*;
    use linfa_bayes::MultinomialNb;
    use ndarray::{Array2, array};
    use tempfile::TempDir;

    pub(crate) fn scratch_dir() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    pub(crate) fn sample_artifacts(scaler: Option<Scaler>) -> Artifacts {
        Artifacts {
            model: ModelArtifact::Logistic(LogisticModel {
                coefficients: array![0.02, -0.05, 0.4, 0.1],
                intercept: -0.8,
                feature_importances: Some(array![0.3, 0.4, 0.2, 0.1]),
            }),
            features: FeatureSchema::new(["Age", "Tenure", "Gender_Male", "Gender_Female"])
                .unwrap(),
            scaler,
        }
    }

    #[test]
    fn missing_required_artifact_names_it() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        let err = Artifacts::load(dir).err().unwrap();
        match &err {
            ChurnError::MissingArtifact { name, path } => {
                assert_eq!(name, MODEL_NAME);
                assert_eq!(path, &dir.join(MODEL_FILE));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Required file missing: Trained Model ("));
    }

    #[test]
    fn missing_feature_list_is_fatal() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        let artifacts = sample_artifacts(None);
        save_artifact(&artifacts.model, &dir.join(MODEL_FILE), MODEL_NAME).unwrap();
        let err = Artifacts::load(dir).err().unwrap();
        assert!(
            matches!(err, ChurnError::MissingArtifact { ref name, .. } if name == FEATURES_NAME)
        );
    }

    #[test]
    fn save_then_load() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        let scaler = Scaler::Standard {
            mean: array![40.0, 24.0, 0.5, 0.5],
            scale: array![12.0, 10.0, 0.5, 0.5],
        };
        sample_artifacts(Some(scaler.clone())).save(dir).unwrap();

        let loaded = Artifacts::load(dir).unwrap();
        assert_eq!(
            loaded.features.columns(),
            ["Age", "Tenure", "Gender_Male", "Gender_Female"]
        );
        assert_eq!(loaded.scaler, Some(scaler));
        assert_eq!(loaded.model.kind(), "logistic regression");
    }

    #[test]
    fn broken_scaler_disables_scaling() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        sample_artifacts(None).save(dir).unwrap();
        std::fs::write(dir.join(SCALER_FILE), b"not msgpack").unwrap();

        let loaded = Artifacts::load(dir).unwrap();
        assert!(loaded.scaler.is_none());
    }

    #[test]
    fn corrupt_model_reports_deserialize_error() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        std::fs::write(dir.join(MODEL_FILE), b"\xc1garbage").unwrap();
        let err = load_artifact::<ModelArtifact>(&dir.join(MODEL_FILE), MODEL_NAME)
            .err()
            .unwrap();
        assert!(matches!(err, ChurnError::Deserialize { .. }));
    }

    #[test]
    fn duplicate_feature_names_are_rejected_on_load() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        sample_artifacts(None).save(dir).unwrap();
        save_artifact(
            &vec!["Age".to_string(), "Age".to_string()],
            &dir.join(FEATURES_FILE),
            FEATURES_NAME,
        )
        .unwrap();
        assert!(matches!(
            Artifacts::load(dir),
            Err(ChurnError::InvalidSchema(_))
        ));
    }

    #[test]
    fn demo_covers_every_form_option() {
        let demo = demo_artifacts().unwrap();
        let columns = demo.features.columns();
        for field in customer_form() {
            match field.control {
                Control::Select { options } => {
                    for o in options.iter().filter(|o| **o != "Other") {
                        let name = format!("{}_{o}", field.column);
                        assert!(columns.contains(&name), "missing {name}");
                    }
                }
                _ => assert!(columns.iter().any(|c| c == field.column)),
            }
        }
        assert_eq!(demo.scaler.as_ref().unwrap().n_features(), columns.len());
    }

    #[test]
    fn naive_bayes_model_survives_save_and_load() {
        let tmp = scratch_dir();
        let path = tmp.path().join(MODEL_FILE);

        let x = Array2::from_shape_vec((4, 2), vec![5.0, 0.0, 4.0, 1.0, 0.0, 5.0, 1.0, 4.0])
            .unwrap();
        let y = array![0usize, 0, 1, 1];
        let model = MultinomialNb::params().fit(&Dataset::new(x, y)).unwrap();
        let fitted = NaiveBayesModel { model };
        let query = array![[1.0, 3.0], [4.0, 0.0]];
        let before = fitted.predict_proba(query.view()).unwrap();

        save_artifact(&ModelArtifact::NaiveBayes(fitted), &path, MODEL_NAME).unwrap();
        let loaded: ModelArtifact = load_artifact(&path, MODEL_NAME).unwrap();
        assert_eq!(loaded.kind(), "multinomial naive Bayes");

        let after = loaded
            .classifier()
            .probabilistic()
            .unwrap()
            .predict_proba(query.view())
            .unwrap();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b - a).abs() < 1e-12, "{b} != {a}");
        }
    }
}
