//! One-hot encoding and reindexing of a raw record onto the feature schema.

use crate::error::{ChurnError, Result};
use crate::schema::{FeatureSchema, RawRecord, RawValue};
use ndarray::{Array2, ArrayView1};
use std::collections::{HashMap, HashSet};

/// A raw record after categorical expansion, before reindexing.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    columns: Vec<(String, f64)>,
}

impl EncodedRecord {
    pub fn columns(&self) -> &[(String, f64)] {
        &self.columns
    }
}

/// Expands each categorical attribute into a `<column>_<category>` indicator.
///
/// Only the observed category gets a column, so a single row never carries
/// the zero indicators of the other categories.
pub fn encode(record: &RawRecord) -> EncodedRecord {
    let columns = record
        .iter()
        .map(|(name, value)| match value {
            RawValue::Numeric(v) => (name.to_string(), *v),
            RawValue::Categorical(cat) => (format!("{name}_{cat}"), 1.0),
        })
        .collect();
    EncodedRecord { columns }
}

/// The model-ready single row: exactly the schema's columns, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    columns: Vec<String>,
    values: Array2<f64>,
    dropped: Vec<String>,
}

impl AlignedVector {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The `1 × n` matrix consumed by the scaler and the model.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row(&self) -> ArrayView1<'_, f64> {
        self.values.row(0)
    }

    /// Encoded columns that had no counterpart in the schema.
    ///
    /// A category unseen at training time lands here and its indicator is
    /// zero-filled, which can misrepresent the input.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }
}

/// Encodes `record` and reindexes it onto `schema`, filling absent columns with zero.
pub fn align(record: &RawRecord, schema: &FeatureSchema) -> Result<AlignedVector> {
    let encoded = encode(record);

    let mut index = HashMap::with_capacity(schema.len());
    for (i, name) in schema.columns().iter().enumerate() {
        if index.insert(name.as_str(), i).is_some() {
            return Err(ChurnError::Alignment(format!(
                "feature column {name:?} appears more than once"
            )));
        }
    }

    let mut row = vec![0.0; schema.len()];
    let mut dropped = Vec::new();
    let mut seen = HashSet::with_capacity(encoded.columns.len());
    for (name, value) in encoded.columns {
        if !seen.insert(name.clone()) {
            return Err(ChurnError::Alignment(format!(
                "encoded input has column {name:?} more than once"
            )));
        }
        match index.get(name.as_str()) {
            Some(&i) => row[i] = value,
            None => dropped.push(name),
        }
    }

    if !dropped.is_empty() {
        tracing::debug!(?dropped, "encoded columns not in feature schema were dropped");
    }

    let values = Array2::from_shape_vec((1, schema.len()), row)
        .map_err(|e| ChurnError::Alignment(e.to_string()))?;

    Ok(AlignedVector {
        columns: schema.columns().to_vec(),
        values,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender_schema() -> FeatureSchema {
        FeatureSchema::new(["Age", "Tenure", "Gender_Male", "Gender_Female"]).unwrap()
    }

    #[test]
    fn aligns_basic_scenario() {
        let record = RawRecord::new()
            .with_numeric("Age", 30.0)
            .with_numeric("Tenure", 12.0)
            .with_category("Gender", "Male");

        let aligned = align(&record, &gender_schema()).unwrap();
        assert_eq!(aligned.row().to_vec(), vec![30.0, 12.0, 1.0, 0.0]);
        assert_eq!(aligned.columns(), gender_schema().columns());
        assert!(aligned.dropped().is_empty());
    }

    #[test]
    fn column_set_matches_schema_for_any_category() {
        let schema = gender_schema();
        for gender in ["Male", "Female", "Other", ""] {
            let record = RawRecord::new()
                .with_category("Gender", gender)
                .with_numeric("Usage Frequency", 4.0);
            let aligned = align(&record, &schema).unwrap();
            assert_eq!(aligned.columns(), schema.columns());
            assert_eq!(aligned.values().dim(), (1, schema.len()));
        }
    }

    #[test]
    fn unseen_category_is_zero_filled_and_reported() {
        let record = RawRecord::new()
            .with_numeric("Age", 50.0)
            .with_category("Gender", "Other");

        let aligned = align(&record, &gender_schema()).unwrap();
        assert_eq!(aligned.row().to_vec(), vec![50.0, 0.0, 0.0, 0.0]);
        assert_eq!(aligned.dropped(), ["Gender_Other"]);
    }

    #[test]
    fn alignment_is_deterministic() {
        let record = RawRecord::new()
            .with_category("Contract Length", "Yearly")
            .with_numeric("Total Spend", 812.25)
            .with_category("Gender", "Female");
        let schema = FeatureSchema::new([
            "Total Spend",
            "Gender_Female",
            "Contract Length_Monthly",
            "Contract Length_Yearly",
        ])
        .unwrap();

        let first = align(&record, &schema).unwrap();
        for _ in 0..5 {
            assert_eq!(align(&record, &schema).unwrap(), first);
        }
        assert_eq!(first.row().to_vec(), vec![812.25, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn colliding_encoded_names_are_rejected() {
        let record = RawRecord::new()
            .with_numeric("Gender_Male", 0.0)
            .with_category("Gender", "Male");
        let err = align(&record, &gender_schema()).unwrap_err();
        assert!(matches!(err, ChurnError::Alignment(_)));
        assert!(err.to_string().contains("\"Gender_Male\" more than once"), "{err}");
    }

    #[test]
    fn into_values_hands_over_the_row() {
        let record = RawRecord::new().with_numeric("Tenure", 6.0);
        let values = align(&record, &gender_schema()).unwrap().into_values();
        assert_eq!(values, ndarray::array![[0.0, 6.0, 0.0, 0.0]]);
    }

    #[test]
    fn encode_keeps_numeric_names() {
        let record = RawRecord::new()
            .with_numeric("Payment Delay", 7.0)
            .with_category("Subscription Type", "Premium");
        let encoded = encode(&record);
        assert_eq!(
            encoded.columns(),
            [
                ("Payment Delay".to_string(), 7.0),
                ("Subscription Type_Premium".to_string(), 1.0)
            ]
        );
    }
}
