use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::finance::ProfitProjection;
use crate::pitch::{PitchOutcome, PitchRequest};
use crate::valuation::{PriceFeatures, RentFeatures};

/// Validated apartment submission covering every model, financing, and pitch input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApartmentListing {
    pub price: i64,
    pub district: String,
    pub neighborhood: String,
    pub condition: String,
    #[serde(rename = "type")]
    pub apartment_type: String,
    pub room_type: String,
    pub rooms: u32,
    pub area_m2: u32,
    pub accommodates: u32,
    pub lift: String,
    pub views: String,
    pub floor: String,
    pub interest_rate: f64,
    pub loan_size: i64,
}

impl ApartmentListing {
    pub fn price_features(&self) -> PriceFeatures {
        PriceFeatures {
            district: self.district.clone(),
            neighborhood: self.neighborhood.clone(),
            condition: self.condition.clone(),
            apartment_type: self.apartment_type.clone(),
            rooms: self.rooms,
            area_m2: self.area_m2,
            lift: self.lift.clone(),
            views: self.views.clone(),
            floor: self.floor.clone(),
        }
    }

    /// The rent model was fit on bedroom counts; the form's room count stands in for it.
    pub fn rent_features(&self) -> RentFeatures {
        RentFeatures {
            room_type: self.room_type.clone(),
            district: self.district.clone(),
            accommodates: self.accommodates,
            bedrooms: self.rooms,
        }
    }

    pub fn pitch_request(&self) -> PitchRequest {
        PitchRequest {
            neighborhood: self.neighborhood.clone(),
            condition: self.condition.clone(),
            apartment_type: self.apartment_type.clone(),
            area_m2: self.area_m2,
            lift: self.lift.clone(),
            views: self.views.clone(),
            floor: self.floor.clone(),
            room_type: self.room_type.clone(),
            accommodates: self.accommodates,
            district: self.district.clone(),
            rooms: self.rooms,
            price: self.price,
        }
    }
}

/// Everything rendered back to the user for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct AppraisalReport {
    pub listing: ApartmentListing,
    pub price_prediction: i64,
    pub rent_prediction: i64,
    pub cost_of_capital: f64,
    pub cost_of_capital_percent: String,
    /// `price_prediction - price`; negative when the asking price exceeds the estimate.
    pub price_difference: i64,
    pub pitch: PitchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_path: Option<PathBuf>,
    pub generated_at: DateTime<Utc>,
    #[serde(skip)]
    pub projection: ProfitProjection,
}

/// Cost of capital as a percentage with four decimals, e.g. `4.6667`.
pub fn format_cost_of_capital(cost: f64) -> String {
    format!("{:.4}", cost * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_of_capital_renders_as_percentage() {
        assert_eq!(format_cost_of_capital(0.046_666_666), "4.6667");
        assert_eq!(format_cost_of_capital(0.0), "0.0000");
    }
}
