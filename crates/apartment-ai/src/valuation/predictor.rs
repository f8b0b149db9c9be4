use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::encoder::{CategoricalEncoder, EncodedColumns, EncodingError};
use super::model::Regressor;
use super::row::{FeatureRow, FeatureRowError, FeatureValue};
use super::schema::{FeatureSchema, ValuationDomain};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Row(#[from] FeatureRowError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("{domain} model expects columns [{expected}] but the pipeline built [{found}]")]
    ShapeMismatch {
        domain: &'static str,
        expected: String,
        found: String,
    },
    #[error("{domain} model produced a non-finite prediction")]
    NonFinite { domain: &'static str },
}

/// Composes the row builder, encoder, and model for one domain.
#[derive(Debug, Clone)]
pub struct Predictor {
    schema: FeatureSchema,
    encoder: Arc<dyn CategoricalEncoder>,
    model: Arc<dyn Regressor>,
}

impl Predictor {
    pub fn new(
        schema: FeatureSchema,
        encoder: Arc<dyn CategoricalEncoder>,
        model: Arc<dyn Regressor>,
    ) -> Self {
        Self {
            schema,
            encoder,
            model,
        }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn domain(&self) -> ValuationDomain {
        self.schema.domain()
    }

    /// Known vocabulary for a categorical feature, as fitted by the encoder.
    pub fn vocabulary(&self, feature: &str) -> Option<&[String]> {
        self.encoder.categories(feature)
    }

    /// Numeric columns in schema order followed by the encoded categorical columns.
    pub fn preprocess(&self, row: &FeatureRow) -> Result<EncodedColumns, PredictionError> {
        let encoded = self.encoder.transform(&row.categorical_columns())?;

        let mut columns = EncodedColumns::default();
        for (name, value) in row.numeric_columns() {
            columns.push(name, value);
        }
        columns.extend(encoded);
        Ok(columns)
    }

    pub fn predict_row(&self, row: &FeatureRow) -> Result<i64, PredictionError> {
        let domain = self.domain().label();
        let columns = self.preprocess(row)?;

        let expected = self.model.feature_names();
        if columns.names.as_slice() != expected {
            return Err(PredictionError::ShapeMismatch {
                domain,
                expected: expected.join(", "),
                found: columns.names.join(", "),
            });
        }

        let raw = self.model.predict(&columns.values);
        if !raw.is_finite() {
            return Err(PredictionError::NonFinite { domain });
        }

        debug!(domain, raw, "model inference complete");
        Ok(raw.trunc() as i64)
    }

    pub fn predict<I, K>(&self, values: I) -> Result<i64, PredictionError>
    where
        I: IntoIterator<Item = (K, FeatureValue)>,
        K: AsRef<str>,
    {
        let row = FeatureRow::build(self.schema, values)?;
        self.predict_row(&row)
    }
}

/// Apartment attributes consumed by the sale price model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeatures {
    pub district: String,
    pub neighborhood: String,
    pub condition: String,
    #[serde(rename = "type")]
    pub apartment_type: String,
    pub rooms: u32,
    pub area_m2: u32,
    pub lift: String,
    pub views: String,
    pub floor: String,
}

impl PriceFeatures {
    fn into_values(self) -> [(&'static str, FeatureValue); 9] {
        [
            ("district", self.district.into()),
            ("neighborhood", self.neighborhood.into()),
            ("condition", self.condition.into()),
            ("type", self.apartment_type.into()),
            ("rooms", self.rooms.into()),
            ("area_m2", self.area_m2.into()),
            ("lift", self.lift.into()),
            ("views", self.views.into()),
            ("floor", self.floor.into()),
        ]
    }
}

/// Listing attributes consumed by the rent model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentFeatures {
    pub room_type: String,
    pub district: String,
    pub accommodates: u32,
    pub bedrooms: u32,
}

impl RentFeatures {
    fn into_values(self) -> [(&'static str, FeatureValue); 4] {
        [
            ("room_type", self.room_type.into()),
            ("district", self.district.into()),
            ("accommodates", self.accommodates.into()),
            ("bedrooms", self.bedrooms.into()),
        ]
    }
}

/// Sale price predictor built once at start and shared across requests.
#[derive(Debug, Clone)]
pub struct PricePredictor {
    inner: Predictor,
}

impl PricePredictor {
    pub fn new(encoder: Arc<dyn CategoricalEncoder>, model: Arc<dyn Regressor>) -> Self {
        Self {
            inner: Predictor::new(FeatureSchema::sale_price(), encoder, model),
        }
    }

    pub fn predict(&self, features: &PriceFeatures) -> Result<i64, PredictionError> {
        self.inner.predict(features.clone().into_values())
    }

    pub fn pipeline(&self) -> &Predictor {
        &self.inner
    }
}

/// Rent predictor built once at start and shared across requests.
#[derive(Debug, Clone)]
pub struct RentPredictor {
    inner: Predictor,
}

impl RentPredictor {
    pub fn new(encoder: Arc<dyn CategoricalEncoder>, model: Arc<dyn Regressor>) -> Self {
        Self {
            inner: Predictor::new(FeatureSchema::rent(), encoder, model),
        }
    }

    pub fn predict(&self, features: &RentFeatures) -> Result<i64, PredictionError> {
        self.inner.predict(features.clone().into_values())
    }

    pub fn pipeline(&self) -> &Predictor {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::encoder::{EncoderColumn, OneHotEncoder};
    use crate::valuation::model::{RegressionModel, RegressionTree, TreeNode};

    fn column(feature: &str, categories: &[&str]) -> EncoderColumn {
        EncoderColumn {
            feature: feature.to_string(),
            categories: categories.iter().map(|value| value.to_string()).collect(),
        }
    }

    fn rent_encoder() -> OneHotEncoder {
        OneHotEncoder::new(vec![
            column("room_type", &["entire home", "private room"]),
            column("district", &["Eixample", "Gràcia"]),
        ])
    }

    fn rent_model(feature_names: Vec<String>) -> RegressionModel {
        RegressionModel::TreeEnsemble {
            feature_names,
            base_score: 40.0,
            trees: vec![RegressionTree {
                nodes: vec![
                    TreeNode::split(0, 2.5, 1, 2),
                    TreeNode::leaf(10.0),
                    TreeNode::leaf(35.4),
                ],
            }],
        }
    }

    fn rent_predictor() -> RentPredictor {
        let names = [
            "accommodates",
            "bedrooms",
            "room_type_entire home",
            "room_type_private room",
            "district_Eixample",
            "district_Gràcia",
        ]
        .iter()
        .map(|name| name.to_string())
        .collect();
        RentPredictor::new(Arc::new(rent_encoder()), Arc::new(rent_model(names)))
    }

    fn features(room_type: &str) -> RentFeatures {
        RentFeatures {
            room_type: room_type.to_string(),
            district: "Gràcia".to_string(),
            accommodates: 4,
            bedrooms: 2,
        }
    }

    #[test]
    fn preprocess_drops_raw_categoricals_and_appends_indicators() {
        let predictor = rent_predictor();
        let row = FeatureRow::build(
            FeatureSchema::rent(),
            features("private room").into_values(),
        )
        .expect("row builds");

        let columns = predictor.pipeline().preprocess(&row).expect("encodes");
        assert_eq!(columns.values, vec![4.0, 2.0, 0.0, 1.0, 0.0, 1.0]);
        assert_eq!(columns.get("district_Gràcia"), Some(1.0));
        assert!(columns.get("district").is_none());
    }

    #[test]
    fn predict_truncates_to_integer() {
        let predictor = rent_predictor();
        assert_eq!(predictor.predict(&features("entire home")), Ok(75));
    }

    #[test]
    fn predict_fails_for_out_of_vocabulary_values() {
        let predictor = rent_predictor();
        let err = predictor
            .predict(&features("shared room"))
            .expect_err("unknown room type");
        assert!(matches!(
            err,
            PredictionError::Encoding(EncodingError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn predict_fails_when_model_columns_differ() {
        let predictor = RentPredictor::new(
            Arc::new(rent_encoder()),
            Arc::new(rent_model(vec!["accommodates".to_string()])),
        );
        let err = predictor
            .predict(&features("entire home"))
            .expect_err("shape mismatch");
        assert!(matches!(err, PredictionError::ShapeMismatch { domain: "rent", .. }));
    }

    #[test]
    fn predict_rejects_non_finite_output() {
        let names: Vec<String> = rent_predictor()
            .pipeline()
            .model
            .feature_names()
            .to_vec();
        let model = RegressionModel::Linear {
            coefficients: vec![f64::INFINITY; names.len()],
            feature_names: names,
            intercept: 0.0,
        };
        let predictor = RentPredictor::new(Arc::new(rent_encoder()), Arc::new(model));
        assert_eq!(
            predictor.predict(&features("entire home")),
            Err(PredictionError::NonFinite { domain: "rent" })
        );
    }
}
