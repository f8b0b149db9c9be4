use serde::{Deserialize, Serialize};

/// Named numeric columns produced by encoding, in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodedColumns {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl EncodedColumns {
    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.names.push(name.into());
        self.values.push(value);
    }

    pub fn extend(&mut self, other: EncodedColumns) {
        self.names.extend(other.names);
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|column| column == name)
            .map(|index| self.values[index])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("encoder expects columns [{expected}] but received [{found}]")]
    UnexpectedColumns { expected: String, found: String },
    #[error("'{value}' is not a known category for '{feature}'")]
    UnknownCategory { feature: String, value: String },
}

/// Capability exposed by a pre-fit one-hot encoder.
pub trait CategoricalEncoder: Send + Sync + std::fmt::Debug {
    /// Categorical features the encoder was fit on, in fit order.
    fn input_features(&self) -> Vec<&str>;

    /// Known vocabulary for a feature, if the encoder was fit on it.
    fn categories(&self, feature: &str) -> Option<&[String]>;

    /// Encoded column names, `feature_value`, in output order.
    fn output_names(&self) -> Vec<String>;

    /// Replace each categorical value with one indicator column per known category.
    fn transform(&self, columns: &[(&str, &str)]) -> Result<EncodedColumns, EncodingError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderColumn {
    pub feature: String,
    pub categories: Vec<String>,
}

/// Portable one-hot encoder artifact; unknown categories are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub columns: Vec<EncoderColumn>,
}

impl OneHotEncoder {
    pub fn new(columns: Vec<EncoderColumn>) -> Self {
        Self { columns }
    }
}

fn column_name(feature: &str, category: &str) -> String {
    format!("{feature}_{category}")
}

impl CategoricalEncoder for OneHotEncoder {
    fn input_features(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|column| column.feature.as_str())
            .collect()
    }

    fn categories(&self, feature: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|column| column.feature == feature)
            .map(|column| column.categories.as_slice())
    }

    fn output_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|column| {
                column
                    .categories
                    .iter()
                    .map(move |category| column_name(&column.feature, category))
            })
            .collect()
    }

    fn transform(&self, columns: &[(&str, &str)]) -> Result<EncodedColumns, EncodingError> {
        let matches_fit = columns.len() == self.columns.len()
            && columns
                .iter()
                .zip(&self.columns)
                .all(|((name, _), column)| *name == column.feature);
        if !matches_fit {
            return Err(EncodingError::UnexpectedColumns {
                expected: self.input_features().join(", "),
                found: columns
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let mut encoded = EncodedColumns::default();
        for ((_, value), column) in columns.iter().zip(&self.columns) {
            if !column.categories.iter().any(|category| category == value) {
                return Err(EncodingError::UnknownCategory {
                    feature: column.feature.clone(),
                    value: (*value).to_string(),
                });
            }
            for category in &column.categories {
                let indicator = if category == value { 1.0 } else { 0.0 };
                encoded.push(column_name(&column.feature, category), indicator);
            }
        }

        Ok(encoded)
    }
}
