use apartment_ai::appraisal::{ApartmentListing, AppraisalReport, AppraisalService};
use apartment_ai::config::AppConfig;
use apartment_ai::error::AppError;
use apartment_ai::pitch::{CompletionClient, PitchOutcome};
use apartment_ai::telemetry;
use apartment_ai::valuation::ModelStore;
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AppraiseArgs {
    /// Asking price in euros
    #[arg(long)]
    pub(crate) price: i64,
    #[arg(long)]
    pub(crate) district: String,
    #[arg(long)]
    pub(crate) neighborhood: String,
    /// Condition as listed, e.g. "good" or "needs renovation"
    #[arg(long)]
    pub(crate) condition: String,
    /// Apartment type, e.g. "flat" or "penthouse"
    #[arg(long = "type")]
    pub(crate) apartment_type: String,
    /// Short-term rental room type, e.g. "entire home"
    #[arg(long)]
    pub(crate) room_type: String,
    #[arg(long)]
    pub(crate) rooms: u32,
    #[arg(long)]
    pub(crate) area_m2: u32,
    /// Guests the apartment accommodates
    #[arg(long)]
    pub(crate) accommodates: u32,
    #[arg(long)]
    pub(crate) lift: String,
    #[arg(long)]
    pub(crate) views: String,
    #[arg(long)]
    pub(crate) floor: String,
    /// Yearly loan interest rate as a fraction, e.g. 0.03
    #[arg(long)]
    pub(crate) interest_rate: f64,
    #[arg(long)]
    pub(crate) loan_size: i64,
    /// Directory holding the model artifacts (defaults to MODEL_DIR)
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
    /// Skip the sales pitch call
    #[arg(long)]
    pub(crate) no_pitch: bool,
    /// Write the projection chart to this SVG file
    #[arg(long)]
    pub(crate) chart: Option<PathBuf>,
    /// Export the projection samples to this CSV file
    #[arg(long)]
    pub(crate) curves_csv: Option<PathBuf>,
}

impl AppraiseArgs {
    fn listing(&self) -> ApartmentListing {
        ApartmentListing {
            price: self.price,
            district: self.district.clone(),
            neighborhood: self.neighborhood.clone(),
            condition: self.condition.clone(),
            apartment_type: self.apartment_type.clone(),
            room_type: self.room_type.clone(),
            rooms: self.rooms,
            area_m2: self.area_m2,
            accommodates: self.accommodates,
            lift: self.lift.clone(),
            views: self.views.clone(),
            floor: self.floor.clone(),
            interest_rate: self.interest_rate,
            loan_size: self.loan_size,
        }
    }
}

pub(crate) async fn run_appraise(args: AppraiseArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(model_dir) = args.model_dir.clone() {
        config.artifacts.model_dir = model_dir;
    }
    if args.no_pitch {
        config.pitch.enabled = false;
    }

    telemetry::init(&config.telemetry)?;

    let store = ModelStore::load(&config.artifacts.model_dir)?;
    let pitch = Arc::new(CompletionClient::new(config.pitch.clone())?);
    let mut service = AppraisalService::new(&store, pitch).with_finance(config.finance);
    if let Some(chart) = args.chart.clone() {
        service = service.with_chart_path(chart);
    }

    let report = service.appraise(&args.listing()).await?;
    render_report(&report);

    if let Some(path) = &args.curves_csv {
        let file = File::create(path)?;
        report.projection.write_csv(BufWriter::new(file))?;
        println!("Projection samples written to {}", path.display());
    }

    Ok(())
}

fn render_report(report: &AppraisalReport) {
    let listing = &report.listing;
    println!("Apartment appraisal");
    println!(
        "{} {} in {} / {} ({} rooms, {} m2, floor {})",
        listing.condition,
        listing.apartment_type,
        listing.neighborhood,
        listing.district,
        listing.rooms,
        listing.area_m2,
        listing.floor
    );
    println!("- Predicted price: {} €", report.price_prediction);
    println!("- Predicted rent: {} € per night", report.rent_prediction);
    println!("- Cost of capital: {} %", report.cost_of_capital_percent);
    println!(
        "- Price difference: {} € against an asking price of {} €",
        report.price_difference, listing.price
    );
    if let Some(chart) = &report.chart_path {
        println!("- Projection chart: {}", chart.display());
    }

    match &report.pitch {
        PitchOutcome::Generated(text) => println!("\nSales pitch\n{text}"),
        PitchOutcome::Unavailable(reason) => println!("\nSales pitch unavailable: {reason}"),
        PitchOutcome::Disabled => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(model_dir: PathBuf) -> AppraiseArgs {
        AppraiseArgs {
            price: 300_000,
            district: "Eixample".to_string(),
            neighborhood: "Dreta de l'Eixample".to_string(),
            condition: "good".to_string(),
            apartment_type: "flat".to_string(),
            room_type: "entire home".to_string(),
            rooms: 3,
            area_m2: 80,
            accommodates: 4,
            lift: "yes".to_string(),
            views: "no".to_string(),
            floor: "2".to_string(),
            interest_rate: 0.03,
            loan_size: 200_000,
            model_dir: Some(model_dir),
            no_pitch: true,
            chart: None,
            curves_csv: None,
        }
    }

    #[tokio::test]
    async fn appraise_installs_log_subscriber_before_loading_models() {
        let dir = tempfile::tempdir().expect("temp dir");

        let err = run_appraise(args(dir.path().join("missing")))
            .await
            .expect_err("no artifacts in an empty directory");

        assert!(matches!(err, AppError::Artifact(_)));
        assert!(tracing::dispatcher::has_been_set());
    }
}
