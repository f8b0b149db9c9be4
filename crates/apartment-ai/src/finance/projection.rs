use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chart::render_svg;

pub const HORIZON_YEARS: f64 = 10.0;
pub const SAMPLE_COUNT: usize = 1000;

const STOCK_UPPER_RETURN: f64 = 0.12;
const STOCK_LOWER_RETURN: f64 = -0.1;

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to write projection chart {path}: {source}")]
    Chart {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to draw projection chart: {0}")]
    Render(String),
    #[error("failed to export projection samples: {0}")]
    Export(#[from] csv::Error),
}

/// Market assumptions behind the comparison curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Share of nights the property is let.
    pub occupancy_rate: f64,
    pub stock_return: f64,
    pub appreciation_rate: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            occupancy_rate: 0.7,
            stock_return: 0.07,
            appreciation_rate: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInputs {
    pub interest_rate: f64,
    pub loan_size: f64,
    /// Predicted market value.
    pub value: f64,
    /// Asking price paid.
    pub price: f64,
    pub wacc: f64,
    /// Predicted rent per night.
    pub rent: f64,
}

/// Cumulative return curves sampled over the projection horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitProjection {
    pub years: Vec<f64>,
    pub real_estate: Vec<f64>,
    pub cost_of_capital: Vec<f64>,
    pub stock: Vec<f64>,
    pub stock_upper: Vec<f64>,
    pub stock_lower: Vec<f64>,
}

impl ProfitProjection {
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Smallest and largest value across every curve, including the zero baseline.
    pub fn value_range(&self) -> (f64, f64) {
        [
            &self.real_estate,
            &self.cost_of_capital,
            &self.stock,
            &self.stock_upper,
            &self.stock_lower,
        ]
        .iter()
        .flat_map(|curve| curve.iter().copied())
        .fold((0.0_f64, 0.0_f64), |(low, high), value| {
            (low.min(value), high.max(value))
        })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ProjectionError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "year",
            "real_estate",
            "cost_of_capital",
            "stock",
            "stock_upper",
            "stock_lower",
        ])?;
        for index in 0..self.len() {
            csv.serialize((
                self.years[index],
                self.real_estate[index],
                self.cost_of_capital[index],
                self.stock[index],
                self.stock_upper[index],
                self.stock_lower[index],
            ))?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|index| start + step * index as f64).collect()
        }
    }
}

fn compound(rate: f64, years: f64) -> f64 {
    (1.0 + rate).powf(years) - 1.0
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitProjector {
    config: ProjectionConfig,
}

impl ProfitProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn project(&self, inputs: &ProjectionInputs) -> ProfitProjection {
        let loan_cost = inputs.interest_rate * inputs.loan_size;
        let fixed_cost = inputs.value - inputs.price;
        let yearly_earnings = self.config.occupancy_rate * inputs.rent * 365.0;

        let years = linspace(0.0, HORIZON_YEARS, SAMPLE_COUNT);
        let curve = |f: &dyn Fn(f64) -> f64| years.iter().map(|x| f(*x)).collect::<Vec<_>>();

        let real_estate = curve(&|x: f64| {
            x * yearly_earnings - x * loan_cost
                + compound(self.config.appreciation_rate, x) * inputs.value
                + fixed_cost
        });
        let cost_of_capital = curve(&|x: f64| compound(inputs.wacc, x) * inputs.price);
        let stock = curve(&|x: f64| compound(self.config.stock_return, x) * inputs.price);
        let stock_upper = curve(&|x: f64| compound(STOCK_UPPER_RETURN, x) * inputs.price);
        let stock_lower = curve(&|x: f64| compound(STOCK_LOWER_RETURN, x) * inputs.price);

        ProfitProjection {
            years,
            real_estate,
            cost_of_capital,
            stock,
            stock_upper,
            stock_lower,
        }
    }

    /// Render the projection to `path`, replacing any previous chart.
    pub fn render(&self, projection: &ProfitProjection, path: &Path) -> Result<(), ProjectionError> {
        let chart_error = |source: std::io::Error| ProjectionError::Chart {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(chart_error)?;
        }
        let svg = render_svg(projection)?;
        fs::write(path, svg).map_err(chart_error)?;

        debug!(chart = %path.display(), samples = projection.len(), "projection chart written");
        Ok(())
    }
}
