use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use super::projection::{ProfitProjection, ProjectionError, HORIZON_YEARS};

const SIZE: (u32, u32) = (720, 420);
const BAND_COLOR: RGBColor = RGBColor(173, 216, 230);

type ChartResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

fn format_euros(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

fn series<'a>(
    years: &'a [f64],
    values: &'a [f64],
) -> impl DoubleEndedIterator<Item = (f64, f64)> + 'a {
    years.iter().copied().zip(values.iter().copied())
}

fn draw(root: &DrawingArea<SVGBackend<'_>, Shift>, projection: &ProfitProjection) -> ChartResult {
    let (low, high) = projection.value_range();
    let (low, high) = if high - low <= f64::EPSILON {
        (low - 1.0, high + 1.0)
    } else {
        (low, high)
    };

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..HORIZON_YEARS, low..high)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("€ Return")
        .y_label_formatter(&|value| format_euros(*value))
        .draw()?;

    // stock return bounds
    let band: Vec<(f64, f64)> = series(&projection.years, &projection.stock_upper)
        .chain(series(&projection.years, &projection.stock_lower).rev())
        .collect();
    chart
        .draw_series(std::iter::once(Polygon::new(band, BAND_COLOR.filled())))?
        .label("Stock Return Bounds")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BAND_COLOR.filled()));

    for (label, values, color) in [
        ("Cost of Capital", &projection.cost_of_capital, RED),
        ("Stock Return", &projection.stock, BLUE),
        ("Realestate Return", &projection.real_estate, GREEN),
    ] {
        chart
            .draw_series(LineSeries::new(
                series(&projection.years, values),
                color.stroke_width(2),
            ))?
            .label(label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart.draw_series(LineSeries::new([(0.0, 0.0), (HORIZON_YEARS, 0.0)], &BLACK))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
}

/// Line chart of the projection: three return curves, the stock band, and a zero baseline.
pub(crate) fn render_svg(projection: &ProfitProjection) -> Result<String, ProjectionError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        draw(&root, projection).map_err(|err| ProjectionError::Render(err.to_string()))?;
    }
    Ok(svg)
}
