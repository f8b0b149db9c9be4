//! Financing arithmetic: cost of capital and the ten-year return projection.

mod chart;
pub mod projection;
pub mod wacc;

pub use projection::{
    ProfitProjection, ProfitProjector, ProjectionConfig, ProjectionError, ProjectionInputs,
    HORIZON_YEARS, SAMPLE_COUNT,
};
pub use wacc::{WaccError, WaccEstimator};
