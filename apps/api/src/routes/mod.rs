pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/analyze",
            post(handlers::handle_analyze).fallback(handlers::handle_method_not_allowed),
        )
        .route(
            "/api/analyze/fields",
            post(handlers::handle_analyze_fields).fallback(handlers::handle_method_not_allowed),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::extractor::{extract_fields, GreedyBraceLocator};
    use crate::analysis::schema::JobField;
    use crate::analysis::service::tests::{gemini_payload, test_config, FakeGenerator, FakeReply};
    use crate::llm_client::Provider;

    const POSTING: &str = "Backend Engineer at Acme, $120k, Seoul";
    const MODEL_TEXT: &str = "Here is the analysis you asked for:\n\
        {\"포지션명\":\"Backend Engineer\",\"회사명\":\"Acme\",\"급여\":\"$120k\",\"회사위치\":\"Seoul\"}\n\
        Let me know if you need anything else.";

    fn app(api_key: Option<&str>, generator: Arc<FakeGenerator>) -> Router {
        build_router(AppState {
            config: test_config(api_key),
            generator,
            locator: Arc::new(GreedyBraceLocator),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
            .expect("request")
    }

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    #[tokio::test]
    async fn test_analyze_passes_upstream_payload_through() {
        let payload = gemini_payload(MODEL_TEXT);
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(payload.clone()),
        ));
        let response = app(Some("test-key"), generator.clone())
            .oneshot(post_json("/api/analyze", json!({ "jdText": POSTING })))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body, payload);
        assert_eq!(generator.call_count(), 1);

        // Client-side unwrap and extraction of the passed-through payload.
        let generated = Provider::Gemini.unwrap_text(&body).expect("generated text");
        let result = extract_fields(Some(generated.as_str())).expect("fields");
        assert_eq!(result.get(JobField::Position), "Backend Engineer");
        assert_eq!(result.get(JobField::Company), "Acme");
        assert_eq!(result.get(JobField::Salary), "$120k");
        assert_eq!(result.get(JobField::Location), "Seoul");
        for field in [
            JobField::Summary,
            JobField::Requirements,
            JobField::PreferredQualifications,
            JobField::Responsibilities,
            JobField::Other,
        ] {
            assert_eq!(result.get(field), "", "{field:?} should be empty");
        }
    }

    #[tokio::test]
    async fn test_analyze_without_jd_text_is_400() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(json!({})),
        ));
        let response = app(Some("test-key"), generator.clone())
            .oneshot(post_json("/api/analyze", json!({})))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]["message"].is_string());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_with_blank_jd_text_is_400() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(json!({})),
        ));
        let response = app(Some("test-key"), generator)
            .oneshot(post_json("/api/analyze", json!({ "jdText": "  \n  " })))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_with_unreadable_body_is_400() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(json!({})),
        ));
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let response = app(Some("test-key"), generator)
            .oneshot(request)
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_without_credential_is_500_and_skips_upstream() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(gemini_payload(MODEL_TEXT)),
        ));
        let response = app(None, generator.clone())
            .oneshot(post_json("/api/analyze", json!({ "jdText": POSTING })))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"]["message"].is_string());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_rejects_other_methods() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(json!({})),
        ));
        let response = app(Some("test-key"), generator)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/analyze")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_analyze_propagates_upstream_status() {
        let upstream_error = json!({
            "code": 400,
            "message": "API key not valid. Please pass a valid API key.",
            "status": "INVALID_ARGUMENT"
        });
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Status(400, upstream_error.clone()),
        ));
        let response = app(Some("bad-key"), generator)
            .oneshot(post_json("/api/analyze", json!({ "jdText": POSTING })))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": upstream_error }));
    }

    #[tokio::test]
    async fn test_analyze_unreachable_upstream_is_500() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Unreachable(
                "error sending request: tcp connect error: Connection refused (os error 111)"
                    .to_string(),
            ),
        ));
        let response = app(Some("test-key"), generator.clone())
            .oneshot(post_json("/api/analyze", json!({ "jdText": POSTING })))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_UNREACHABLE");
        let message = body["error"]["message"].as_str().unwrap_or_default();
        assert_eq!(message, "Failed to reach the text generation API");
        assert!(!message.contains("Connection refused"));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_maps_reported_error_to_500() {
        let upstream_error = json!({"code": 503, "message": "The model is overloaded."});
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(json!({ "error": upstream_error })),
        ));
        let response = app(Some("test-key"), generator)
            .oneshot(post_json("/api/analyze", json!({ "jdText": POSTING })))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], upstream_error);
    }

    #[tokio::test]
    async fn test_analyze_fields_returns_extracted_result() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(gemini_payload(MODEL_TEXT)),
        ));
        let response = app(Some("test-key"), generator)
            .oneshot(post_json("/api/analyze/fields", json!({ "jdText": POSTING })))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["result"]["회사명"], "Acme");
        assert_eq!(body["result"]["주요업무"], "");
        assert_eq!(body["result"].as_object().map(|m| m.len()), Some(9));
        assert_eq!(body["provider"], "gemini");
        assert!(body["analyzed_at"].is_string());

        let keys: Vec<&str> = body["fields"]
            .as_array()
            .expect("fields array")
            .iter()
            .filter_map(|field| field["key"].as_str())
            .collect();
        assert_eq!(keys, vec!["회사명", "포지션명", "급여", "회사위치"]);
    }

    #[tokio::test]
    async fn test_analyze_fields_without_json_is_502() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::Gemini,
            FakeReply::Payload(gemini_payload("Sorry, I cannot help with that.")),
        ));
        let response = app(Some("test-key"), generator)
            .oneshot(post_json("/api/analyze/fields", json!({ "jdText": POSTING })))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "EXTRACTION_ERROR");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("Sorry"));
    }

    #[tokio::test]
    async fn test_health_reports_provider() {
        let generator = Arc::new(FakeGenerator::new(
            Provider::OpenAi,
            FakeReply::Payload(json!({})),
        ));
        let response = app(None, generator)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "openai");
    }
}
