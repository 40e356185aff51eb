use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::{CatalogError, VacancyCatalog};
use super::domain::{Candidate, CandidateId, CandidateSubmission, Vacancy, VacancyDraft, VacancyId};
use super::hiring::{HiringCoordinator, HiringError};
use super::intake::CandidateIntake;
use super::payout::PayoutGateway;
use super::store::PoolStore;

/// Shared handle bundling the three marketplace services for the HTTP layer.
pub struct MarketplaceState<VS, CS, G> {
    pub catalog: Arc<VacancyCatalog<VS, G>>,
    pub intake: Arc<CandidateIntake<CS>>,
    pub hiring: Arc<HiringCoordinator<VS, CS, G>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HireRequest {
    pub(crate) pool_name: String,
    pub(crate) candidate_id: CandidateId,
    pub(crate) vacancy_id: VacancyId,
}

/// Router builder exposing the marketplace entry points.
pub fn marketplace_router<VS, CS, G>(state: Arc<MarketplaceState<VS, CS, G>>) -> Router
where
    VS: PoolStore<Vacancy> + 'static,
    CS: PoolStore<Candidate> + 'static,
    G: PayoutGateway + 'static,
{
    Router::new()
        .route("/api/v1/vacancies", post(post_vacancy_handler::<VS, CS, G>))
        .route(
            "/api/v1/vacancies/:pool_name",
            get(list_vacancies_handler::<VS, CS, G>),
        )
        .route(
            "/api/v1/candidates",
            post(post_candidate_handler::<VS, CS, G>),
        )
        .route(
            "/api/v1/candidates/:vacancy_id",
            get(list_candidates_handler::<VS, CS, G>),
        )
        .route(
            "/api/v1/hired/:vacancy_id",
            get(list_hired_handler::<VS, CS, G>),
        )
        .route("/api/v1/hires", post(hire_handler::<VS, CS, G>))
        .route(
            "/api/v1/hires/:vacancy_id/:candidate_id",
            get(payout_status_handler::<VS, CS, G>),
        )
        .with_state(state)
}

pub(crate) async fn post_vacancy_handler<VS, CS, G>(
    State(state): State<Arc<MarketplaceState<VS, CS, G>>>,
    axum::Json(draft): axum::Json<VacancyDraft>,
) -> Response
where
    VS: PoolStore<Vacancy> + 'static,
    CS: PoolStore<Candidate> + 'static,
    G: PayoutGateway + 'static,
{
    match state.catalog.post_vacancy(draft) {
        Ok(vacancy_id) => {
            let payload = json!({ "vacancy_id": vacancy_id });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err @ CatalogError::InsufficientEscrow { .. }) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn list_vacancies_handler<VS, CS, G>(
    State(state): State<Arc<MarketplaceState<VS, CS, G>>>,
    Path(pool_name): Path<String>,
) -> Response
where
    VS: PoolStore<Vacancy> + 'static,
    CS: PoolStore<Candidate> + 'static,
    G: PayoutGateway + 'static,
{
    match state.catalog.list_vacancies(&pool_name) {
        Ok(vacancies) => (StatusCode::OK, axum::Json(vacancies)).into_response(),
        Err(err @ CatalogError::PoolNotFound(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn post_candidate_handler<VS, CS, G>(
    State(state): State<Arc<MarketplaceState<VS, CS, G>>>,
    axum::Json(submission): axum::Json<CandidateSubmission>,
) -> Response
where
    VS: PoolStore<Vacancy> + 'static,
    CS: PoolStore<Candidate> + 'static,
    G: PayoutGateway + 'static,
{
    match state.intake.post_candidate(submission) {
        Ok(candidate_id) => {
            let payload = json!({ "candidate_id": candidate_id });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn list_candidates_handler<VS, CS, G>(
    State(state): State<Arc<MarketplaceState<VS, CS, G>>>,
    Path(vacancy_id): Path<String>,
) -> Response
where
    VS: PoolStore<Vacancy> + 'static,
    CS: PoolStore<Candidate> + 'static,
    G: PayoutGateway + 'static,
{
    match state.intake.list_candidates(&VacancyId(vacancy_id)) {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn list_hired_handler<VS, CS, G>(
    State(state): State<Arc<MarketplaceState<VS, CS, G>>>,
    Path(vacancy_id): Path<String>,
) -> Response
where
    VS: PoolStore<Vacancy> + 'static,
    CS: PoolStore<Candidate> + 'static,
    G: PayoutGateway + 'static,
{
    match state.intake.list_hired_candidates(&VacancyId(vacancy_id)) {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn hire_handler<VS, CS, G>(
    State(state): State<Arc<MarketplaceState<VS, CS, G>>>,
    axum::Json(request): axum::Json<HireRequest>,
) -> Response
where
    VS: PoolStore<Vacancy> + 'static,
    CS: PoolStore<Candidate> + 'static,
    G: PayoutGateway + 'static,
{
    let HireRequest {
        pool_name,
        candidate_id,
        vacancy_id,
    } = request;

    match state
        .hiring
        .hire_candidate(&pool_name, &candidate_id, &vacancy_id)
    {
        Ok(receipt) => (StatusCode::ACCEPTED, axum::Json(receipt)).into_response(),
        Err(err @ (HiringError::VacancyNotFound { .. } | HiringError::CandidateNotFound { .. })) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err @ HiringError::AlreadyHired { .. }) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(err @ HiringError::PayoutUnresolved { .. }) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(err @ HiringError::Payout(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn payout_status_handler<VS, CS, G>(
    State(state): State<Arc<MarketplaceState<VS, CS, G>>>,
    Path((vacancy_id, candidate_id)): Path<(String, String)>,
) -> Response
where
    VS: PoolStore<Vacancy> + 'static,
    CS: PoolStore<Candidate> + 'static,
    G: PayoutGateway + 'static,
{
    let vacancy_id = VacancyId(vacancy_id);
    let candidate_id = CandidateId(candidate_id);
    match state.hiring.payout_status(&vacancy_id, &candidate_id) {
        Some(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        None => {
            let payload = json!({
                "error": format!(
                    "no payout is recorded for candidate '{candidate_id}' under '{vacancy_id}'"
                ),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
