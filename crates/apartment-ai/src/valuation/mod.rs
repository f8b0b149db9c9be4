//! Feature schema, one-hot encoding, and pre-fit model inference for the
//! sale price and rent predictors.

pub mod artifacts;
pub mod encoder;
pub mod model;
pub mod predictor;
pub mod row;
pub mod schema;

pub use artifacts::{ArtifactError, CategoryVocabulary, DomainArtifacts, ModelStore};
pub use encoder::{CategoricalEncoder, EncodedColumns, EncoderColumn, EncodingError, OneHotEncoder};
pub use model::{RegressionModel, RegressionTree, Regressor, TreeNode};
pub use predictor::{
    PredictionError, Predictor, PriceFeatures, PricePredictor, RentFeatures, RentPredictor,
};
pub use row::{FeatureRow, FeatureRowError, FeatureValue};
pub use schema::{FeatureKind, FeatureSchema, FeatureSpec, ValuationDomain};
