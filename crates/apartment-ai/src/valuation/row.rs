use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::schema::{FeatureKind, FeatureSchema};

/// A single scalar supplied for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureValue::Number(_) => FeatureKind::Numeric,
            FeatureValue::Category(_) => FeatureKind::Categorical,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(value) => write!(f, "{value}"),
            FeatureValue::Category(value) => f.write_str(value),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<u32> for FeatureValue {
    fn from(value: u32) -> Self {
        FeatureValue::Number(f64::from(value))
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Category(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Category(value)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureRowError {
    #[error("feature '{0}' is not part of the {1} schema")]
    Unknown(String, &'static str),
    #[error("feature '{0}' was supplied more than once")]
    Duplicate(String),
    #[error("feature '{0}' is required")]
    Missing(&'static str),
    #[error("feature '{name}' expects a {expected:?} value")]
    WrongKind {
        name: &'static str,
        expected: FeatureKind,
    },
}

/// One observation with every schema feature present exactly once, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    schema: FeatureSchema,
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    /// Assemble a row from named values. All and only the schema's features must be supplied.
    pub fn build<I, K>(schema: FeatureSchema, values: I) -> Result<Self, FeatureRowError>
    where
        I: IntoIterator<Item = (K, FeatureValue)>,
        K: AsRef<str>,
    {
        let mut supplied: BTreeMap<String, FeatureValue> = BTreeMap::new();
        for (name, value) in values {
            let name = name.as_ref();
            if schema.kind_of(name).is_none() {
                return Err(FeatureRowError::Unknown(
                    name.to_string(),
                    schema.domain().label(),
                ));
            }
            if supplied.insert(name.to_string(), value).is_some() {
                return Err(FeatureRowError::Duplicate(name.to_string()));
            }
        }

        let mut ordered = Vec::with_capacity(schema.features().len());
        for spec in schema.features() {
            let value = supplied
                .remove(spec.name)
                .ok_or(FeatureRowError::Missing(spec.name))?;
            if value.kind() != spec.kind {
                return Err(FeatureRowError::WrongKind {
                    name: spec.name,
                    expected: spec.kind,
                });
            }
            ordered.push(value);
        }

        Ok(Self {
            schema,
            values: ordered,
        })
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns()
            .find(|(column, _)| *column == name)
            .map(|(_, value)| value)
    }

    /// Columns in schema order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        self.schema
            .features()
            .iter()
            .map(|spec| spec.name)
            .zip(self.values.iter())
    }

    pub fn categorical_columns(&self) -> Vec<(&'static str, &str)> {
        self.columns()
            .filter_map(|(name, value)| match value {
                FeatureValue::Category(category) => Some((name, category.as_str())),
                FeatureValue::Number(_) => None,
            })
            .collect()
    }

    pub fn numeric_columns(&self) -> Vec<(&'static str, f64)> {
        self.columns()
            .filter_map(|(name, value)| match value {
                FeatureValue::Number(number) => Some((name, *number)),
                FeatureValue::Category(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rent_values() -> Vec<(&'static str, FeatureValue)> {
        vec![
            ("bedrooms", FeatureValue::from(2u32)),
            ("district", FeatureValue::from("Gràcia")),
            ("accommodates", FeatureValue::from(3u32)),
            ("room_type", FeatureValue::from("private room")),
        ]
    }

    #[test]
    fn build_orders_columns_by_schema() {
        let row = FeatureRow::build(FeatureSchema::rent(), rent_values()).expect("row builds");
        let names: Vec<&str> = row.columns().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["room_type", "district", "accommodates", "bedrooms"]);
        assert_eq!(
            row.categorical_columns(),
            vec![("room_type", "private room"), ("district", "Gràcia")]
        );
        assert_eq!(row.numeric_columns(), vec![("accommodates", 3.0), ("bedrooms", 2.0)]);
    }

    #[test]
    fn build_rejects_missing_features() {
        let mut values = rent_values();
        values.retain(|(name, _)| *name != "bedrooms");
        let err = FeatureRow::build(FeatureSchema::rent(), values).expect_err("missing feature");
        assert_eq!(err, FeatureRowError::Missing("bedrooms"));
    }

    #[test]
    fn build_rejects_extra_and_duplicate_features() {
        let mut extra = rent_values();
        extra.push(("price", FeatureValue::from(1u32)));
        assert!(matches!(
            FeatureRow::build(FeatureSchema::rent(), extra),
            Err(FeatureRowError::Unknown(name, _)) if name == "price"
        ));

        let mut duplicate = rent_values();
        duplicate.push(("district", FeatureValue::from("Eixample")));
        assert_eq!(
            FeatureRow::build(FeatureSchema::rent(), duplicate),
            Err(FeatureRowError::Duplicate("district".to_string()))
        );
    }

    #[test]
    fn build_rejects_value_of_wrong_kind() {
        let mut values = rent_values();
        values[0] = ("bedrooms", FeatureValue::from("two"));
        let err = FeatureRow::build(FeatureSchema::rent(), values).expect_err("wrong kind");
        assert_eq!(
            err,
            FeatureRowError::WrongKind {
                name: "bedrooms",
                expected: FeatureKind::Numeric
            }
        );
    }
}
