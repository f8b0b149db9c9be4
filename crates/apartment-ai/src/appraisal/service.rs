use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{format_cost_of_capital, ApartmentListing, AppraisalReport};
use super::form::{FormChoices, FormErrors};
use crate::config::FinanceConfig;
use crate::finance::{
    ProfitProjector, ProjectionError, ProjectionInputs, WaccError, WaccEstimator,
};
use crate::pitch::PitchGenerator;
use crate::valuation::{ModelStore, PredictionError, PricePredictor, RentPredictor};

#[derive(Debug, thiserror::Error)]
pub enum AppraisalError {
    #[error("invalid fields: {}", .0.fields().collect::<Vec<_>>().join(", "))]
    Invalid(FormErrors),
    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),
    #[error("cost of capital unavailable: {0}")]
    CostOfCapital(#[from] WaccError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Runs one validated listing through valuation, financing, and pitch generation.
pub struct AppraisalService<P> {
    price: PricePredictor,
    rent: RentPredictor,
    choices: FormChoices,
    wacc: WaccEstimator,
    projector: ProfitProjector,
    chart_path: Option<PathBuf>,
    pitch: Arc<P>,
}

impl<P> AppraisalService<P>
where
    P: PitchGenerator + 'static,
{
    /// Default financing assumptions and no chart output.
    pub fn new(store: &ModelStore, pitch: Arc<P>) -> Self {
        Self {
            price: store.price_predictor(),
            rent: store.rent_predictor(),
            choices: FormChoices::from_store(store),
            wacc: WaccEstimator::default(),
            projector: ProfitProjector::default(),
            chart_path: None,
            pitch,
        }
    }

    pub fn with_finance(mut self, finance: FinanceConfig) -> Self {
        self.wacc = finance.wacc;
        self.projector = ProfitProjector::new(finance.projection);
        self
    }

    /// Render the projection chart to `path` on every appraisal.
    pub fn with_chart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_path = Some(path.into());
        self
    }

    pub fn choices(&self) -> &FormChoices {
        &self.choices
    }

    pub fn chart_path(&self) -> Option<&Path> {
        self.chart_path.as_deref()
    }

    pub async fn appraise(&self, listing: &ApartmentListing) -> Result<AppraisalReport, AppraisalError> {
        let errors = self.choices.check(listing);
        if !errors.is_empty() {
            return Err(AppraisalError::Invalid(errors));
        }

        let price_prediction = self.price.predict(&listing.price_features())?;
        let rent_prediction = self.rent.predict(&listing.rent_features())?;
        let cost_of_capital = self.wacc.estimate(
            listing.interest_rate,
            listing.loan_size as f64,
            price_prediction as f64,
        )?;

        let projection = self.projector.project(&ProjectionInputs {
            interest_rate: listing.interest_rate,
            loan_size: listing.loan_size as f64,
            value: price_prediction as f64,
            price: listing.price as f64,
            wacc: cost_of_capital,
            rent: rent_prediction as f64,
        });
        if let Some(path) = &self.chart_path {
            self.projector.render(&projection, path)?;
        }

        let pitch = self.pitch.generate(&listing.pitch_request()).await;
        debug!(?pitch, "pitch outcome");

        let price_difference = price_prediction - listing.price;
        info!(
            district = %listing.district,
            price_prediction,
            rent_prediction,
            cost_of_capital,
            price_difference,
            "apartment appraised"
        );

        Ok(AppraisalReport {
            listing: listing.clone(),
            price_prediction,
            rent_prediction,
            cost_of_capital,
            cost_of_capital_percent: format_cost_of_capital(cost_of_capital),
            price_difference,
            pitch,
            chart_path: self.chart_path.clone(),
            generated_at: Utc::now(),
            projection,
        })
    }
}
