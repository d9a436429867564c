//! # churn-predictor 📊
//!
//! Predict customer churn from a handful of account attributes using a
//! pre-trained classifier.
//!
//! The crate loads three MessagePack artifacts (classifier, optional scaler
//! and the ordered feature list), collects one customer record through a
//! terminal form, one-hot encodes and aligns it against the feature list, and
//! reports a churn verdict with a probability and business guidance.
//!
//! ## Features
//! - Artifact loading with named, fatal errors for required files
//! - Categorical expansion and column alignment against the training schema
//! - Optional standard / min-max scaling
//! - Logistic regression, linear SVM and multinomial Naive Bayes (`linfa-bayes`) models
//! - Top-8 feature importance ranking when the model provides it
//!
//! ## Example
//! ```rust
//! use churn_predictor::{FeatureSchema, RawRecord, run_pipeline};
//! use churn_predictor::model::LogisticModel;
//! use ndarray::array;
//!
//! let schema = FeatureSchema::new(["Age", "Tenure", "Gender_Male", "Gender_Female"]).unwrap();
//! let model = LogisticModel {
//!     coefficients: array![0.01, -0.1, 0.5, 0.2],
//!     intercept: 0.0,
//!     feature_importances: None,
//! };
//! let record = RawRecord::new()
//!     .with_numeric("Age", 30.0)
//!     .with_numeric("Tenure", 12.0)
//!     .with_category("Gender", "Male");
//! let prediction = run_pipeline(&model, None, &schema, &record).unwrap();
//! println!("churn: {}, probability: {:.2}", prediction.churn, prediction.probability);
//! ```

pub mod align;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod predict;
pub mod scaler;
pub mod schema;

pub use align::{AlignedVector, align};
pub use artifacts::Artifacts;
pub use error::{ChurnError, Result, error_chain};
pub use predict::{Advisory, Prediction};
pub use schema::{FeatureSchema, RawRecord, RawValue};

use form::{Action, Field};
use model::Classifier;
use scaler::Transform;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Aligns, scales and scores a single record.
pub fn run_pipeline(
    model: &dyn Classifier,
    scaler: Option<&dyn Transform>,
    schema: &FeatureSchema,
    record: &RawRecord,
) -> Result<Prediction> {
    let aligned = align(record, schema)?;
    let input = scaler::apply_scaler(scaler, aligned.into_values())?;
    predict::predict(model, input.view(), schema)
}

/// Loaded artifacts plus the form used to query them.
pub struct ChurnPredictor {
    artifacts: Artifacts,
    fields: Vec<Field>,
}

impl ChurnPredictor {
    pub fn new(artifacts: Artifacts) -> Self {
        ChurnPredictor {
            artifacts,
            fields: form::customer_form(),
        }
    }

    /// Loads the artifacts from `dir`. Missing required artifacts are fatal.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self::new(Artifacts::load(dir)?))
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn predict_record(&self, record: &RawRecord) -> Result<Prediction> {
        let scaler = self.artifacts.scaler.as_ref().map(|s| s as &dyn Transform);
        run_pipeline(
            self.artifacts.model.classifier(),
            scaler,
            &self.artifacts.features,
            record,
        )
    }

    /// Runs form → predict cycles until the user exits or input ends.
    ///
    /// A failed request is reported and the next cycle starts; only I/O
    /// errors on the terminal end the session.
    pub fn run_interactive(
        &self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> io::Result<()> {
        writeln!(out, "📊 Customer Churn Prediction")?;
        writeln!(out, "Enter customer details and press Enter to predict.")?;
        writeln!(out, "The model expects the same features used during training.")?;
        loop {
            writeln!(out)?;
            let Some(record) = form::collect(&self.fields, input, out)? else {
                break;
            };
            writeln!(out)?;
            form::render_preview(out, &record)?;
            writeln!(out)?;
            if form::await_action(input, out)? == Action::Exit {
                break;
            }
            writeln!(out)?;
            match self.predict_record(&record) {
                Ok(prediction) => predict::render_prediction(out, &prediction)?,
                Err(err) => {
                    tracing::error!(error = %error_chain(&err), "prediction request failed");
                    predict::render_failure(out, &err)?;
                }
            }
        }
        writeln!(out, "👋 Bye")?;
        Ok(())
    }
}
