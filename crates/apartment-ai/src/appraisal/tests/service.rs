use std::sync::Arc;

use super::common::*;

use crate::appraisal::{AppraisalError, AppraisalService, FormChoices};
use crate::finance::{WaccError, SAMPLE_COUNT};
use crate::pitch::PitchOutcome;
use crate::valuation::{ModelStore, RegressionModel, Regressor};

#[tokio::test]
async fn appraises_listing_end_to_end() {
    let (service, pitch) = build_service(FakePitch::generated("Bright flat in Eixample."));

    let report = service.appraise(&listing()).await.expect("appraisal succeeds");

    assert_eq!(report.price_prediction, EXPECTED_PRICE);
    assert_eq!(report.rent_prediction, EXPECTED_RENT);
    assert!(report.cost_of_capital > 0.0 && report.cost_of_capital < 1.0);
    assert_eq!(report.price_difference, EXPECTED_PRICE - 300_000);
    assert_eq!(report.pitch.text(), Some("Bright flat in Eixample."));
    assert_eq!(report.projection.len(), SAMPLE_COUNT);
    assert!(report.chart_path.is_none());

    let requests = pitch.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].accommodates, 4);
    assert_eq!(requests[0].price, 300_000);
}

#[tokio::test]
async fn price_difference_keeps_its_sign() {
    let (service, _) = build_service(FakePitch::new(PitchOutcome::Disabled));

    let mut overpriced = listing();
    overpriced.price = EXPECTED_PRICE + 1_234;
    let report = service.appraise(&overpriced).await.expect("appraisal succeeds");
    assert_eq!(report.price_difference, -1_234);

    let mut exact = listing();
    exact.price = EXPECTED_PRICE;
    let report = service.appraise(&exact).await.expect("appraisal succeeds");
    assert_eq!(report.price_difference, 0);
}

#[tokio::test]
async fn unavailable_pitch_does_not_fail_the_appraisal() {
    let (service, _) = build_service(FakePitch::new(PitchOutcome::Unavailable(
        "OPENAI_API_KEY is not set".to_string(),
    )));

    let report = service.appraise(&listing()).await.expect("appraisal succeeds");
    assert!(report.pitch.text().is_none());
    assert_eq!(report.price_prediction, EXPECTED_PRICE);
}

#[tokio::test]
async fn rejects_out_of_vocabulary_values_before_inference() {
    let (service, pitch) = build_service(FakePitch::generated("unused"));

    let mut listing = listing();
    listing.district = "Sants-Montjuïc".to_string();
    let err = service.appraise(&listing).await.expect_err("district unknown to rent model");

    match err {
        AppraisalError::Invalid(errors) => {
            assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["district"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(pitch.requests().is_empty());
}

#[tokio::test]
async fn rejects_negative_amounts_before_inference() {
    let (service, pitch) = build_service(FakePitch::generated("unused"));

    let mut listing = listing();
    listing.loan_size = -500_000;
    listing.interest_rate = f64::NAN;
    let err = service.appraise(&listing).await.expect_err("negative loan");

    match err {
        AppraisalError::Invalid(errors) => {
            assert_eq!(
                errors.fields().collect::<Vec<_>>(),
                vec!["interest_rate", "loan_size"]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(pitch.requests().is_empty());
}

#[tokio::test]
async fn zero_valuation_is_a_computation_error() {
    let mut price = price_artifacts();
    let feature_names = price.model.feature_names().to_vec();
    price.model = Arc::new(RegressionModel::Linear {
        coefficients: vec![0.0; feature_names.len()],
        feature_names,
        intercept: 0.0,
    });
    let store = ModelStore::new(price, rent_artifacts());
    let service = AppraisalService::new(&store, Arc::new(FakePitch::new(PitchOutcome::Disabled)));

    let err = service.appraise(&listing()).await.expect_err("zero valuation");
    assert!(matches!(
        err,
        AppraisalError::CostOfCapital(WaccError::ZeroValuation)
    ));
}

#[tokio::test]
async fn renders_chart_when_path_configured() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("static").join("projection.svg");
    let (service, _) = build_service(FakePitch::new(PitchOutcome::Disabled));
    let service = service.with_chart_path(path.clone());

    let report = service.appraise(&listing()).await.expect("appraisal succeeds");

    assert_eq!(report.chart_path.as_deref(), Some(path.as_path()));
    let svg = std::fs::read_to_string(&path).expect("chart written");
    assert!(svg.contains("<svg"));
}

#[test]
fn districts_are_limited_to_both_vocabularies() {
    let choices = FormChoices::from_store(&model_store());
    assert_eq!(choices.district, vec!["Eixample", "Gràcia"]);
    assert_eq!(choices.room_type, vec!["entire home", "private room"]);
    assert_eq!(choices.floor, vec!["1", "2", "3"]);
}
