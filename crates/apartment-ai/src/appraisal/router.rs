use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, warn};

use super::domain::ApartmentListing;
use super::form::{ApartmentQuery, FormErrors};
use super::page::{render_page, FormState};
use super::service::{AppraisalError, AppraisalService};
use super::session::{SessionId, SessionStore, SessionValues};
use crate::pitch::PitchGenerator;

/// Shared handler state: the appraisal pipeline plus the session store.
pub struct AppraisalState<P, S> {
    pub service: AppraisalService<P>,
    pub sessions: Arc<S>,
}

impl<P, S> AppraisalState<P, S> {
    pub fn new(service: AppraisalService<P>, sessions: Arc<S>) -> Self {
        Self { service, sessions }
    }
}

/// Router builder exposing the form page and the JSON appraisal endpoint.
pub fn appraisal_router<P, S>(state: Arc<AppraisalState<P, S>>) -> Router
where
    P: PitchGenerator + 'static,
    S: SessionStore + 'static,
{
    Router::new()
        .route("/", get(index_handler::<P, S>))
        .route("/api/v1/appraisal", post(appraise_handler::<P, S>))
        .with_state(state)
}

pub(crate) async fn index_handler<P, S>(
    State(state): State<Arc<AppraisalState<P, S>>>,
    headers: HeaderMap,
    Query(query): Query<ApartmentQuery>,
) -> Response
where
    P: PitchGenerator + 'static,
    S: SessionStore + 'static,
{
    let session = SessionId::from_headers(&headers);
    let choices = state.service.choices();

    if !query.is_submission() {
        let remembered = session.as_ref().and_then(|id| {
            state
                .sessions
                .load(id)
                .inspect_err(|err| warn!(error = %err, "session prefill skipped"))
                .ok()
                .flatten()
        });
        let page = render_page(choices, &FormState::prefilled(remembered), None);
        return Html(page).into_response();
    }

    let listing = match query.validate(choices) {
        Ok(listing) => listing,
        Err(errors) => return rerender(&state, &query, errors),
    };

    let report = match state.service.appraise(&listing).await {
        Ok(report) => report,
        Err(AppraisalError::Invalid(errors)) => return rerender(&state, &query, errors),
        Err(other) => return failure(other),
    };

    let session = session.unwrap_or_else(SessionId::generate);
    let remembered = SessionValues {
        price: Some(listing.price),
        area: Some(listing.area_m2),
    };
    if let Err(err) = state.sessions.save(&session, remembered) {
        warn!(error = %err, "session not updated");
    }

    let form = FormState::submitted(&query, FormErrors::default());
    let page = render_page(choices, &form, Some(&report));
    (
        StatusCode::OK,
        [(SET_COOKIE, session.set_cookie())],
        Html(page),
    )
        .into_response()
}

pub(crate) async fn appraise_handler<P, S>(
    State(state): State<Arc<AppraisalState<P, S>>>,
    Json(listing): Json<ApartmentListing>,
) -> Response
where
    P: PitchGenerator + 'static,
    S: SessionStore + 'static,
{
    match state.service.appraise(&listing).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(AppraisalError::Invalid(errors)) => {
            let payload = json!({
                "error": "invalid apartment attributes",
                "fields": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => failure(other),
    }
}

fn rerender<P, S>(
    state: &AppraisalState<P, S>,
    query: &ApartmentQuery,
    errors: FormErrors,
) -> Response
where
    P: PitchGenerator + 'static,
{
    let form = FormState::submitted(query, errors);
    Html(render_page(state.service.choices(), &form, None)).into_response()
}

fn failure(err: AppraisalError) -> Response {
    error!(error = %err, "appraisal failed");
    let payload = json!({
        "error": err.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
