use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::marketplace::router::{marketplace_router, MarketplaceState};

fn router(marketplace: &Marketplace) -> Router {
    marketplace_router(Arc::new(MarketplaceState {
        catalog: marketplace.catalog.clone(),
        intake: marketplace.intake.clone(),
        hiring: marketplace.hiring.clone(),
    }))
}

async fn send_json(router: &Router, method: &str, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serializes")))
        .expect("request builds");
    router.clone().oneshot(request).await.expect("router responds")
}

async fn send_get(router: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builds");
    router.clone().oneshot(request).await.expect("router responds")
}

async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn draft_payload(attached_amount: u64) -> Value {
    json!({
        "pool_name": "Developers",
        "position_title": "BE Senior",
        "experience": "5+",
        "english_level": "fluent",
        "timezone": "EST",
        "company_id": COMPANY_ACCOUNT,
        "attached_amount": attached_amount,
    })
}

fn submission_payload(vacancy_id: &str) -> Value {
    json!({
        "vacancy_id": vacancy_id,
        "experience": "4 years with BE, 1 year TL",
        "english_level": "Upper-Intermediate",
        "timezone": "EST",
        "salary_expectations": "5000USD",
        "full_name": "John Galt",
        "email": "whoisjgalt@example.com",
        "telegram": "@JohnGalt",
    })
}

#[tokio::test]
async fn posting_a_vacancy_returns_created_with_an_id() {
    let marketplace = build_marketplace();
    let router = router(&marketplace);

    let response = send_json(&router, "POST", "/api/v1/vacancies", draft_payload(3)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json_body(response).await;
    let id = body["vacancy_id"].as_str().expect("id present");
    assert!(id.starts_with("vacancy-"));
}

#[tokio::test]
async fn posting_a_vacancy_without_escrow_is_unprocessable() {
    let marketplace = build_marketplace();
    let router = router(&marketplace);

    let response = send_json(&router, "POST", "/api/v1/vacancies", draft_payload(0)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error present")
        .contains("escrow"));
}

#[tokio::test]
async fn listing_an_unknown_pool_is_not_found() {
    let marketplace = build_marketplace();
    let router = router(&marketplace);

    let response = send_get(&router, "/api/v1/vacancies/Designers").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn screening_listing_omits_contact_fields() {
    let marketplace = build_marketplace();
    let router = router(&marketplace);

    let response = send_json(&router, "POST", "/api/v1/vacancies", draft_payload(3)).await;
    let vacancy_id = read_json_body(response).await["vacancy_id"]
        .as_str()
        .expect("id present")
        .to_string();

    let response = send_json(
        &router,
        "POST",
        "/api/v1/candidates",
        submission_payload(&vacancy_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_get(&router, &format!("/api/v1/candidates/{vacancy_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let entries = body.as_array().expect("array of candidates");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].get("email").is_none());
    assert!(entries[0].get("full_name").is_none());
    assert!(entries[0].get("telegram").is_none());
}

#[tokio::test]
async fn hire_flow_over_http() {
    let marketplace = build_marketplace();
    let router = router(&marketplace);

    let response = send_json(&router, "POST", "/api/v1/vacancies", draft_payload(3)).await;
    let vacancy_id = read_json_body(response).await["vacancy_id"]
        .as_str()
        .expect("id present")
        .to_string();

    let response = send_json(
        &router,
        "POST",
        "/api/v1/candidates",
        submission_payload(&vacancy_id),
    )
    .await;
    let candidate_id = read_json_body(response).await["candidate_id"]
        .as_str()
        .expect("id present")
        .to_string();

    let hire = json!({
        "pool_name": "Developers",
        "candidate_id": candidate_id,
        "vacancy_id": vacancy_id,
    });
    let response = send_json(&router, "POST", "/api/v1/hires", hire.clone()).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let receipt = read_json_body(response).await;
    assert_eq!(receipt["payout"], "pending");
    assert_eq!(receipt["reward"], 3);

    // The payout record is queryable while the transfer is in flight.
    let response = send_get(
        &router,
        &format!("/api/v1/hires/{vacancy_id}/{candidate_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let record = read_json_body(response).await;
    assert_eq!(record["status"], "pending");

    // A duplicate hire is a conflict, not a second payout.
    let response = send_json(&router, "POST", "/api/v1/hires", hire).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(marketplace.gateway.requests().len(), 1);

    // Hired listing now exposes the full profile.
    let response = send_get(&router, &format!("/api/v1/hired/{vacancy_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let hired = read_json_body(response).await;
    assert_eq!(hired[0]["email"], "whoisjgalt@example.com");
}

#[tokio::test]
async fn payout_status_for_an_unknown_hire_is_not_found() {
    let marketplace = build_marketplace();
    let router = router(&marketplace);

    let response = send_get(&router, "/api/v1/hires/vacancy-x/candidate-y").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
