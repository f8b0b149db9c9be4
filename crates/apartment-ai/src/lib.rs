//! Apartment appraisal: sale price and rent prediction from pre-fit models,
//! cost of capital, a ten-year return projection, and a generated sales pitch.

pub mod appraisal;
pub mod config;
pub mod error;
pub mod finance;
pub mod pitch;
pub mod telemetry;
pub mod valuation;
