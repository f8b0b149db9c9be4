use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::appraisal::{
    ApartmentListing, AppraisalService, AppraisalState, InMemorySessionStore,
};
use crate::pitch::{PitchGenerator, PitchOutcome, PitchRequest};
use crate::valuation::{
    CategoricalEncoder, DomainArtifacts, EncoderColumn, ModelStore, OneHotEncoder,
    RegressionModel, RegressionTree, TreeNode,
};

/// Pitch generator returning a canned outcome and recording each request.
#[derive(Debug)]
pub(super) struct FakePitch {
    outcome: PitchOutcome,
    requests: Mutex<Vec<PitchRequest>>,
}

impl FakePitch {
    pub(super) fn new(outcome: PitchOutcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn generated(text: &str) -> Self {
        Self::new(PitchOutcome::Generated(text.to_string()))
    }

    pub(super) fn requests(&self) -> Vec<PitchRequest> {
        self.requests.lock().expect("pitch mutex poisoned").clone()
    }
}

impl PitchGenerator for FakePitch {
    async fn generate(&self, request: &PitchRequest) -> PitchOutcome {
        self.requests
            .lock()
            .expect("pitch mutex poisoned")
            .push(request.clone());
        self.outcome.clone()
    }
}

fn column(feature: &str, categories: &[&str]) -> EncoderColumn {
    EncoderColumn {
        feature: feature.to_string(),
        categories: categories.iter().map(|value| value.to_string()).collect(),
    }
}

fn vocabulary(encoder: &OneHotEncoder) -> BTreeMap<String, Vec<String>> {
    encoder
        .columns
        .iter()
        .map(|column| (column.feature.clone(), column.categories.clone()))
        .collect()
}

/// Linear price model: 40000 + 15000 per room + 3200 per m2 + 10000 with a lift.
pub(super) fn price_artifacts() -> DomainArtifacts {
    let encoder = OneHotEncoder::new(vec![
        column("district", &["Eixample", "Gràcia", "Sants-Montjuïc"]),
        column("neighborhood", &["Dreta de l'Eixample", "Vila de Gràcia"]),
        column("condition", &["good", "needs renovation"]),
        column("type", &["flat", "penthouse"]),
        column("lift", &["no", "yes"]),
        column("views", &["no", "yes"]),
        column("floor", &["1", "2", "3"]),
    ]);

    let mut feature_names = vec!["rooms".to_string(), "area_m2".to_string()];
    feature_names.extend(encoder.output_names());
    let coefficients = feature_names
        .iter()
        .map(|name| match name.as_str() {
            "rooms" => 15_000.0,
            "area_m2" => 3_200.0,
            "lift_yes" => 10_000.0,
            _ => 0.0,
        })
        .collect();

    DomainArtifacts {
        vocabulary: vocabulary(&encoder),
        encoder: Arc::new(encoder),
        model: Arc::new(RegressionModel::Linear {
            feature_names,
            intercept: 40_000.0,
            coefficients,
        }),
    }
}

/// Single-stump rent model: 50 per night up to two guests, 75 above.
pub(super) fn rent_artifacts() -> DomainArtifacts {
    let encoder = OneHotEncoder::new(vec![
        column("room_type", &["entire home", "private room"]),
        column("district", &["Eixample", "Gràcia"]),
    ]);

    let mut feature_names = vec!["accommodates".to_string(), "bedrooms".to_string()];
    feature_names.extend(encoder.output_names());

    DomainArtifacts {
        vocabulary: vocabulary(&encoder),
        encoder: Arc::new(encoder),
        model: Arc::new(RegressionModel::TreeEnsemble {
            feature_names,
            base_score: 40.0,
            trees: vec![RegressionTree {
                nodes: vec![
                    TreeNode::split(0, 2.5, 1, 2),
                    TreeNode::leaf(10.0),
                    TreeNode::leaf(35.0),
                ],
            }],
        }),
    }
}

pub(super) fn model_store() -> ModelStore {
    ModelStore::new(price_artifacts(), rent_artifacts())
}

pub(super) fn listing() -> ApartmentListing {
    ApartmentListing {
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
        views: "yes".to_string(),
        floor: "2".to_string(),
        interest_rate: 0.03,
        loan_size: 200_000,
    }
}

/// 40000 + 3 * 15000 + 80 * 3200 + 10000
pub(super) const EXPECTED_PRICE: i64 = 351_000;
pub(super) const EXPECTED_RENT: i64 = 75;

pub(super) const LISTING_QUERY: &str = "price=300000&district=Eixample\
&neighborhood=Dreta%20de%20l%27Eixample&condition=good&type=flat\
&room_type=entire%20home&rooms=3&area_m2=80&accommodates=4&lift=yes\
&views=yes&floor=2&interest_rate=0.03&loan_size=200000";

pub(super) fn build_service(pitch: FakePitch) -> (AppraisalService<FakePitch>, Arc<FakePitch>) {
    let pitch = Arc::new(pitch);
    let service = AppraisalService::new(&model_store(), pitch.clone());
    (service, pitch)
}

pub(super) fn build_state(
    pitch: FakePitch,
) -> (
    Arc<AppraisalState<FakePitch, InMemorySessionStore>>,
    Arc<InMemorySessionStore>,
) {
    let (service, _) = build_service(pitch);
    let sessions = Arc::new(InMemorySessionStore::default());
    (
        Arc::new(AppraisalState::new(service, sessions.clone())),
        sessions,
    )
}

pub(super) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_str(&read_body(response).await).expect("json payload")
}
