use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum WaccError {
    #[error("cannot weigh capital against a zero valuation")]
    ZeroValuation,
}

/// Weighted average cost of debt and equity financing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaccEstimator {
    pub tax_rate: f64,
    pub expected_equity_return: f64,
}

impl Default for WaccEstimator {
    fn default() -> Self {
        Self {
            tax_rate: 0.2,
            expected_equity_return: 0.1,
        }
    }
}

impl WaccEstimator {
    pub fn new(tax_rate: f64, expected_equity_return: f64) -> Self {
        Self {
            tax_rate,
            expected_equity_return,
        }
    }

    /// `interest_rate * L/V + (1 - tax) * equity_return * (V - L)/V`
    pub fn estimate(&self, interest_rate: f64, loan_size: f64, value: f64) -> Result<f64, WaccError> {
        if value == 0.0 {
            return Err(WaccError::ZeroValuation);
        }

        let debt_cost = interest_rate * (loan_size / value);
        let equity_cost =
            (1.0 - self.tax_rate) * self.expected_equity_return * ((value - loan_size) / value);
        Ok(debt_cost + equity_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn blends_debt_and_after_tax_equity() {
        let wacc = WaccEstimator::default()
            .estimate(0.03, 200_000.0, 400_000.0)
            .expect("positive valuation");
        // 0.03 * 0.5 + 0.8 * 0.1 * 0.5
        assert!((wacc - 0.055).abs() < EPSILON);
    }

    #[test]
    fn fully_equity_financed_costs_after_tax_equity_return() {
        let wacc = WaccEstimator::new(0.25, 0.08)
            .estimate(0.05, 0.0, 250_000.0)
            .expect("positive valuation");
        assert!((wacc - 0.06).abs() < EPSILON);
    }

    #[test]
    fn increases_with_interest_rate() {
        let estimator = WaccEstimator::default();
        let rates = [0.0, 0.01, 0.03, 0.05, 0.08, 0.12];
        let costs: Vec<f64> = rates
            .iter()
            .map(|rate| estimator.estimate(*rate, 150_000.0, 300_000.0).unwrap())
            .collect();
        assert!(costs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn increases_with_loan_when_debt_costs_more_than_equity() {
        let estimator = WaccEstimator::default();
        // debt at 12% exceeds the 8% after-tax equity return
        let costs: Vec<f64> = [10_000.0, 100_000.0, 200_000.0, 290_000.0]
            .iter()
            .map(|loan| estimator.estimate(0.12, *loan, 300_000.0).unwrap())
            .collect();
        assert!(costs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn zero_valuation_is_an_error() {
        assert_eq!(
            WaccEstimator::default().estimate(0.03, 100_000.0, 0.0),
            Err(WaccError::ZeroValuation)
        );
    }
}
