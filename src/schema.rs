use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Ordered column names of the post-encoding feature space the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Builds a schema, rejecting empty lists and duplicate column names.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = FeatureSchema {
            columns: columns.into_iter().map(Into::into).collect(),
        };
        schema.validate()?;
        Ok(schema)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(ChurnError::InvalidSchema("no feature columns".into()));
        }
        let mut seen = HashSet::with_capacity(self.columns.len());
        for c in &self.columns {
            if !seen.insert(c.as_str()) {
                return Err(ChurnError::InvalidSchema(format!(
                    "duplicate feature column {c:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A single raw attribute value as collected from the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Numeric(f64),
    Categorical(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Numeric(v) if v.fract() == 0.0 => write!(f, "{v:.0}"),
            RawValue::Numeric(v) => write!(f, "{v:.2}"),
            RawValue::Categorical(s) => f.write_str(s),
        }
    }
}

/// One row of named raw attributes, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`, replacing any earlier value under the same name.
    pub fn set(&mut self, column: impl Into<String>, value: RawValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, v)) => *v = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn with_numeric(mut self, column: impl Into<String>, value: f64) -> Self {
        self.set(column, RawValue::Numeric(value));
        self
    }

    pub fn with_category(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, RawValue::Categorical(value.into()));
        self
    }

    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_rejects_duplicates_and_empty() {
        assert!(matches!(
            FeatureSchema::new(["Age", "Age"]),
            Err(ChurnError::InvalidSchema(_))
        ));
        assert!(matches!(
            FeatureSchema::new(Vec::<String>::new()),
            Err(ChurnError::InvalidSchema(_))
        ));
        let schema = FeatureSchema::new(["Age", "Tenure"]).unwrap();
        assert_eq!(schema.columns(), ["Age", "Tenure"]);
    }

    #[test]
    fn record_set_replaces_in_place() {
        let mut record = RawRecord::new()
            .with_numeric("Age", 30.0)
            .with_category("Gender", "Male");
        record.set("Age", RawValue::Numeric(41.0));

        let names: Vec<_> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["Age", "Gender"]);
        assert_eq!(record.get("Age"), Some(&RawValue::Numeric(41.0)));
    }

    #[test]
    fn raw_value_display() {
        assert_eq!(RawValue::Numeric(12.0).to_string(), "12");
        assert_eq!(RawValue::Numeric(500.5).to_string(), "500.50");
        assert_eq!(RawValue::Categorical("Basic".into()).to_string(), "Basic");
    }
}
