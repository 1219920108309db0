//! Router tests for `/api/tutor` and `/health` driven through `oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tutor_core::feedback::{Backend, GenerationSettings, TutorService};
use tutor_core::prompt::{FALLBACK_FEEDBACK, TUTOR_SYSTEM_PROMPT};
use tutor_providers::mock::MockProvider;
use tutor_server::routes::tutor::MAX_BODY_BYTES;
use tutor_server::{router, AppState};

const INVALID_ANSWER: &str = "Please write your answer before requesting feedback.";

fn settings() -> GenerationSettings {
    GenerationSettings {
        model: "mock-model".into(),
        temperature: Some(0.4),
        max_tokens: None,
    }
}

fn app_with(provider: Arc<MockProvider>) -> Router {
    let service = TutorService::new(Backend::Ready(provider), settings());
    router(AppState::new(service))
}

fn unconfigured_app(credential: &str) -> Router {
    let service = TutorService::new(
        Backend::MissingCredential {
            credential: credential.into(),
        },
        settings(),
    );
    router(AppState::new(service))
}

async fn send(app: Router, method: Method, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri("/api/tutor")
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post_json(app: Router, payload: Value) -> (StatusCode, Value) {
    send(app, Method::POST, Body::from(payload.to_string())).await
}

#[tokio::test]
async fn part_a_answer_gets_feedback() {
    let provider = Arc::new(MockProvider::with_fixed_response(
        "Good use of housing as an example. What about wants?",
    ));
    let (status, json) = post_json(
        app_with(provider.clone()),
        json!({
            "fieldKey": "partA",
            "promptContext": "x",
            "studentAnswer": "Land is scarce because forests compete with housing."
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!json["text"].as_str().unwrap().is_empty());
    assert_eq!(provider.call_count(), 1);

    let sent = provider.last_request().unwrap();
    assert_eq!(sent.system_prompt, TUTOR_SYSTEM_PROMPT);
    assert_eq!(sent.model, "mock-model");
    assert!(sent
        .prompt
        .contains("Limit your response to exactly 3 sentences."));
    assert!(!sent.prompt.contains("3 and 5 sentences"));
}

#[tokio::test]
async fn other_fields_quote_context() {
    let provider = Arc::new(MockProvider::with_fixed_response("Who benefits from new flats?"));
    let (status, _) = post_json(
        app_with(provider.clone()),
        json!({
            "fieldKey": "partB_0",
            "promptContext": "Economic reasoning for Housing",
            "studentAnswer": "Young couples need homes near work."
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let prompt = provider.last_request().unwrap().prompt;
    assert!(prompt.contains("Economic reasoning for Housing"));
    assert!(prompt.contains("3 and 5 sentences"));
}

#[tokio::test]
async fn short_answer_is_rejected_without_provider_call() {
    let provider = Arc::new(MockProvider::with_fixed_response("unused"));
    let (status, json) = post_json(
        app_with(provider.clone()),
        json!({
            "fieldKey": "partB_0",
            "promptContext": "Economic reasoning for Housing",
            "studentAnswer": " ok "
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": INVALID_ANSWER }));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn missing_answer_is_rejected() {
    let provider = Arc::new(MockProvider::with_fixed_response("unused"));
    let (status, json) = post_json(app_with(provider.clone()), json!({ "fieldKey": "partA" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], INVALID_ANSWER);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn empty_body_counts_as_empty_object() {
    let provider = Arc::new(MockProvider::with_fixed_response("unused"));
    let (status, json) = send(app_with(provider), Method::POST, Body::empty()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], INVALID_ANSWER);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let provider = Arc::new(MockProvider::with_fixed_response("unused"));
    let (status, json) = send(app_with(provider.clone()), Method::POST, Body::from("{oops")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON body"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn numeric_answer_is_read_as_text() {
    let provider = Arc::new(MockProvider::with_fixed_response("Why that number?"));
    let (status, json) = post_json(
        app_with(provider.clone()),
        json!({ "fieldKey": "partA", "promptContext": "", "studentAnswer": 123456 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "Why that number?");
    assert!(provider
        .last_request()
        .unwrap()
        .prompt
        .contains("Student's Answer: \"123456\""));
}

#[tokio::test]
async fn oversized_body_is_a_json_error() {
    let provider = Arc::new(MockProvider::with_fixed_response("unused"));
    let answer = "a".repeat(MAX_BODY_BYTES + 1);
    let (status, json) = post_json(
        app_with(provider.clone()),
        json!({ "fieldKey": "partA", "studentAnswer": answer }),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json, json!({ "error": "Request body is too large." }));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn empty_provider_reply_uses_fallback() {
    let provider = Arc::new(MockProvider::with_empty_response());
    let (status, json) = post_json(
        app_with(provider),
        json!({
            "fieldKey": "partC_costs",
            "promptContext": "Costs of the decision",
            "studentAnswer": "Habitat loss is a cost."
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "text": FALLBACK_FEEDBACK }));
}

#[tokio::test]
async fn provider_failure_passes_message_through() {
    let provider = Arc::new(MockProvider::failing("The model is overloaded."));
    let (status, json) = post_json(
        app_with(provider.clone()),
        json!({
            "fieldKey": "partA",
            "promptContext": "",
            "studentAnswer": "Resources are limited but wants are not."
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "API error (HTTP 503): The model is overloaded.");
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn missing_credential_is_reported_for_any_valid_payload() {
    for (credential, key) in [("OPENAI_API_KEY", "partA"), ("GEMINI_API_KEY", "partB_2")] {
        let (status, json) = post_json(
            unconfigured_app(credential),
            json!({
                "fieldKey": key,
                "promptContext": "anything",
                "studentAnswer": "A perfectly reasonable answer."
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], format!("Missing {credential} on server."));
    }
}

#[tokio::test]
async fn missing_credential_still_validates_first() {
    let (status, json) = post_json(
        unconfigured_app("OPENAI_API_KEY"),
        json!({ "studentAnswer": "no" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], INVALID_ANSWER);
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let provider = Arc::new(MockProvider::with_fixed_response("unused"));
        let (status, json) = send(app_with(provider.clone()), method, Body::empty()).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json, json!({ "error": "Method not allowed" }));
        assert_eq!(provider.call_count(), 0);
    }
}

#[tokio::test]
async fn health_reports_provider_name() {
    let provider = Arc::new(MockProvider::with_fixed_response("unused"));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app_with(provider).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, json!({ "status": "ok", "provider": "mock" }));
}
