use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use super::encoder::{CategoricalEncoder, OneHotEncoder};
use super::model::{RegressionModel, Regressor};
use super::predictor::{PricePredictor, RentPredictor};
use super::schema::{FeatureSchema, ValuationDomain};

/// Closed set of accepted values per categorical feature.
pub type CategoryVocabulary = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model artifact {path} is invalid: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("{domain} encoder columns [{found}] do not match the schema's categorical features [{expected}]")]
    SchemaMismatch {
        domain: &'static str,
        expected: String,
        found: String,
    },
    #[error("{domain} vocabulary lists '{value}' for '{feature}' but the encoder was not fit on it")]
    VocabularyMismatch {
        domain: &'static str,
        feature: String,
        value: String,
    },
}

/// Pre-fit encoder, model, and vocabulary for a single domain.
#[derive(Debug, Clone)]
pub struct DomainArtifacts {
    pub encoder: Arc<OneHotEncoder>,
    pub model: Arc<RegressionModel>,
    pub vocabulary: CategoryVocabulary,
}

impl DomainArtifacts {
    /// Checks the artifacts against each other and against the domain schema.
    pub fn verify(&self, domain: ValuationDomain, path: &Path) -> Result<(), ArtifactError> {
        self.model
            .validate()
            .map_err(|reason| ArtifactError::Invalid {
                path: path.to_path_buf(),
                reason,
            })?;

        let schema = FeatureSchema::for_domain(domain);
        let expected = schema.categorical_features();
        let found = self.encoder.input_features();
        if expected != found {
            return Err(ArtifactError::SchemaMismatch {
                domain: domain.label(),
                expected: expected.join(", "),
                found: found.join(", "),
            });
        }

        for (feature, values) in &self.vocabulary {
            let known = self.encoder.categories(feature).unwrap_or_default();
            if let Some(value) = values.iter().find(|value| !known.contains(value)) {
                return Err(ArtifactError::VocabularyMismatch {
                    domain: domain.label(),
                    feature: feature.clone(),
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }

    /// Vocabulary for a feature, falling back to the encoder's fitted categories.
    pub fn choices(&self, feature: &str) -> Vec<String> {
        self.vocabulary
            .get(feature)
            .cloned()
            .or_else(|| self.encoder.categories(feature).map(<[String]>::to_vec))
            .unwrap_or_default()
    }
}

/// Process-wide, read-only set of model artifacts loaded once at start.
#[derive(Debug, Clone)]
pub struct ModelStore {
    pub price: DomainArtifacts,
    pub rent: DomainArtifacts,
}

impl ModelStore {
    pub fn new(price: DomainArtifacts, rent: DomainArtifacts) -> Self {
        Self { price, rent }
    }

    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        let price = load_domain(dir, ValuationDomain::SalePrice)?;
        let rent = load_domain(dir, ValuationDomain::Rent)?;
        info!(model_dir = %dir.display(), "model artifacts loaded");
        Ok(Self { price, rent })
    }

    pub fn artifacts(&self, domain: ValuationDomain) -> &DomainArtifacts {
        match domain {
            ValuationDomain::SalePrice => &self.price,
            ValuationDomain::Rent => &self.rent,
        }
    }

    pub fn price_predictor(&self) -> PricePredictor {
        PricePredictor::new(
            self.price.encoder.clone() as Arc<dyn CategoricalEncoder>,
            self.price.model.clone() as Arc<dyn Regressor>,
        )
    }

    pub fn rent_predictor(&self) -> RentPredictor {
        RentPredictor::new(
            self.rent.encoder.clone() as Arc<dyn CategoricalEncoder>,
            self.rent.model.clone() as Arc<dyn Regressor>,
        )
    }
}

fn load_domain(dir: &Path, domain: ValuationDomain) -> Result<DomainArtifacts, ArtifactError> {
    let stem = domain.artifact_stem();
    let model_path = dir.join(format!("{stem}_model.json"));
    let encoder: OneHotEncoder = read_json(&dir.join(format!("{stem}_encoder.json")))?;
    let model: RegressionModel = read_json(&model_path)?;
    let vocabulary: CategoryVocabulary = read_json(&dir.join(format!("{stem}_categories.json")))?;

    let artifacts = DomainArtifacts {
        encoder: Arc::new(encoder),
        model: Arc::new(model),
        vocabulary,
    };
    artifacts.verify(domain, &model_path)?;
    Ok(artifacts)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
