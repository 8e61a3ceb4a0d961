//! Integration tests for the funnel REST API.
//!
//! Each test spins up an Axum server on a random port and drives the real
//! request/response contract with reqwest.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use funnel::registry::StepRegistry;
use funnel::routes::{FunnelRouteState, funnel_routes};
use funnel::service::StepService;
use funnel::store::InMemoryStepStore;
use funnel::validation::Validator;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an Axum server on a random port, return the base URL.
async fn start_server() -> String {
    let service = StepService::new(
        Arc::new(StepRegistry::builtin()),
        Arc::new(InMemoryStepStore::new()),
        Arc::new(Validator::default()),
    )
    .unwrap();
    let app = funnel_routes(FunnelRouteState {
        service: Arc::new(service),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

async fn post_step(base: &str, slug: &str, data: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/registration/step/{slug}"))
        .json(&json!({ "data": data }))
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

async fn summary(base: &str) -> Value {
    let resp = reqwest::get(format!("{base}/api/registration/summary"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

fn adult_birthdate() -> String {
    "1990-06-15".to_string()
}

fn minor_birthdate() -> String {
    let today = Utc::now().date_naive();
    NaiveDate::from_ymd_opt(today.year() - 10, 1, 1)
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

// ── Health / listing ─────────────────────────────────────────────────

#[tokio::test]
async fn rest_health_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "funnel");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_list_steps_in_ordinal_order() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        let body: Vec<Value> = reqwest::get(format!("{base}/api/registration/steps"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let slugs: Vec<_> = body.iter().map(|s| s["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs, ["personal_information", "birthdate", "picture", "address"]);
    })
    .await
    .expect("test timed out");
}

// ── Step endpoints ───────────────────────────────────────────────────

#[tokio::test]
async fn rest_get_step_returns_definition() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        let resp = reqwest::get(format!("{base}/api/registration/step/personal_information"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["current_step"], 1);
        assert_eq!(body["total_steps"], 4);
        assert_eq!(body["assets"]["type"], "form");
        assert_eq!(
            body["assets"]["validation"]["first_name"],
            json!(["required", "min:2"])
        );
        assert!(body["data"]["first_name"].is_null());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_get_unknown_step_returns_404() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        let resp = reqwest::get(format!("{base}/api/registration/step/favourite_colour"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "not_found");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_post_unparsable_body_returns_400() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/registration/step/birthdate"))
            .header("content-type", "application/json")
            .body("this is not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "bad_payload");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_post_unknown_step_returns_404() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let (status, _) = post_step(&base, "favourite_colour", json!({"colour": "red"})).await;
        assert_eq!(status, 404);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_post_persists_and_get_returns_data() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        let (status, body) =
            post_step(&base, "birthdate", json!({"birthdate": adult_birthdate()})).await;
        assert_eq!(status, 200);
        assert_eq!(body["valid"], true);
        assert_eq!(body["next_slug"], "picture");
        assert_eq!(body["previous_slug"], "personal_information");

        let body: Value = reqwest::get(format!("{base}/api/registration/step/birthdate"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["birthdate"], adult_birthdate());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_post_invalid_data_reports_errors_inline() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        let (status, body) =
            post_step(&base, "birthdate", json!({"birthdate": minor_birthdate()})).await;
        assert_eq!(status, 200);
        assert_eq!(body["valid"], false);
        assert_eq!(body["errors"]["birthdate"][0]["rule"], "minAge");
        // Where to go next does not depend on validation.
        assert_eq!(body["next_slug"], "picture");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_post_last_step_has_null_next_slug() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        let (status, body) = post_step(&base, "address", json!({"address": "1 Main St"})).await;
        assert_eq!(status, 200);
        assert!(body["next_slug"].is_null());
    })
    .await
    .expect("test timed out");
}

// ── Summary ──────────────────────────────────────────────────────────

#[tokio::test]
async fn rest_summary_walkthrough() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        // Nothing submitted yet: vacuously valid.
        let body = summary(&base).await;
        assert_eq!(body["is_valid"], true);
        assert_eq!(body["steps"].as_array().unwrap().len(), 4);

        // Incomplete first step.
        post_step(&base, "personal_information", json!({"first_name": ""})).await;
        let body = summary(&base).await;
        assert_eq!(body["is_valid"], false);
        assert_eq!(body["steps"][0]["has_error"], true);
        assert!(body["steps"][0]["error"].is_string());

        // Fill every step.
        post_step(
            &base,
            "personal_information",
            json!({"first_name": "Jo", "last_name": "Do"}),
        )
        .await;
        post_step(&base, "birthdate", json!({"birthdate": adult_birthdate()})).await;
        post_step(
            &base,
            "picture",
            json!({"picture": {"name": "me.jpg", "size": 2048, "type": "image/jpeg"}}),
        )
        .await;
        post_step(&base, "address", json!({"address": "1 Main St"})).await;

        let body = summary(&base).await;
        assert_eq!(body["is_valid"], true);
        assert_eq!(body["steps"][0]["data"], "Jo Do");
        assert_eq!(body["steps"][0]["has_error"], false);
        assert!(body["steps"][0]["error"].is_null());
        assert_eq!(body["steps"][1]["data"], adult_birthdate());
        assert_eq!(body["steps"][2]["data"], "me.jpg");
        assert_eq!(body["steps"][2]["file_info"]["size"], 2048);
        assert_eq!(body["steps"][3]["data"], "1 Main St");
    })
    .await
    .expect("test timed out");
}
