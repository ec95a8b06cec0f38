//! Addiction Level Predictor
//!
//! Single-page form that runs user attributes through a fitted preprocessor
//! and a gradient-boosted tree classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ADDICTION LEVEL PREDICTOR                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐        ┌──────────────────────────────────┐  │
//! │  │  Form /   │        │  Inference Pipeline              │  │
//! │  │  JSON API │ ─────▶ │  reconcile → transform →         │  │
//! │  │  (Axum)   │        │  predict → decode                │  │
//! │  └───────────┘        └────────────────┬─────────────────┘  │
//! │                                        ▼                    │
//! │                ┌──────────────┐  ┌──────────────┐          │
//! │                │ preprocessor │  │ tree model   │          │
//! │                │ (.json)      │  │ (.json)      │          │
//! │                └──────────────┘  └──────────────┘          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod logic;
mod views;
mod error;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::AppResult;

use logic::{ArtifactPaths, InferencePipeline};
use models::ModelInfo;

// Requests are served one at a time on a single thread
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "addiction_predictor=debug,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Addiction Level Predictor starting...");

    // Load artifacts; nothing is served if either is unusable
    let artifacts = match logic::artifacts::load(&ArtifactPaths::from(&config)) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            tracing::error!("{}", err);
            return Err(err).context("startup halted");
        }
    };

    // Build application state
    let state = AppState {
        pipeline: artifacts.pipeline,
        model_info: artifacts.info,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: InferencePipeline,
    pub model_info: Arc<ModelInfo>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::form::show).post(handlers::form::submit))
        .route("/health", get(handlers::health::check))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/model", get(handlers::predict::model_info))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::path::Path;
    use tower::ServiceExt;

    use crate::logic::pipeline::{Classifier, ClassifyError, FeatureVector};
    use crate::models::ClassIndex;

    struct FixedClassifier(ClassIndex);

    impl Classifier for FixedClassifier {
        fn predict(&self, _features: &FeatureVector) -> Result<ClassIndex, ClassifyError> {
            Ok(self.0)
        }
    }

    fn bundled_state() -> AppState {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let artifacts = logic::artifacts::load(&ArtifactPaths {
            preprocessor: root.join("artifacts/preprocessor.json"),
            model: root.join("artifacts/xgboost_model.json"),
        })
        .unwrap();
        AppState {
            pipeline: artifacts.pipeline,
            model_info: artifacts.info,
        }
    }

    fn state_with_class(class: ClassIndex) -> AppState {
        let bytes = include_bytes!("../artifacts/preprocessor.json");
        let preprocessor = logic::preprocessor::ColumnPreprocessor::from_json(bytes).unwrap();
        let state = bundled_state();
        AppState {
            pipeline: InferencePipeline::new(Arc::new(preprocessor), Arc::new(FixedClassifier(class))),
            model_info: state.model_info,
        }
    }

    /// Moderate engagement in the evening. The surfaces only accept the listed
    /// watch times, so this uses the nearest one to 8:00 PM.
    fn scenario_a() -> Value {
        json!({
            "age": 25,
            "satisfaction": 5.0,
            "gender": "Male",
            "location": "India",
            "platform": "YouTube",
            "video_category": "Gaming",
            "engagement": "moderate",
            "frequency": "Evening",
            "watch_reason": "Entertainment",
            "watch_time": "8:30 PM"
        })
    }

    async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_form(app: Router, body: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_predict_scenario_a() {
        let (status, body) = post_json(create_router(bundled_state()), "/api/v1/predict", &scenario_a()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["addiction_level"], "moderate");
        assert_eq!(body["class_index"], 1);
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_predict_unlisted_watch_time_stops_at_the_surface() {
        // The pipeline itself labels 8:00 PM; only the listed watch times get that far
        let mut input = scenario_a();
        input["watch_time"] = json!("8:00 PM");
        let (status, body) = post_json(create_router(bundled_state()), "/api/v1/predict", &input).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Watch Time must be one of the listed times");
    }

    #[tokio::test]
    async fn test_predict_rejects_out_of_domain_input() {
        let mut input = scenario_a();
        input["age"] = json!(0);
        let (status, body) = post_json(create_router(bundled_state()), "/api/v1/predict", &input).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_predict_unknown_option_is_a_json_bad_request() {
        let mut input = scenario_a();
        input["gender"] = json!("Robot");
        let response = create_router(bundled_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/predict")
                    .header("content-type", "application/json")
                    .body(Body::from(input.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("gender"));
    }

    #[tokio::test]
    async fn test_predict_validation_message_names_the_field() {
        let mut input = scenario_a();
        input["satisfaction"] = json!(11.5);
        let (status, body) = post_json(create_router(bundled_state()), "/api/v1/predict", &input).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Satisfaction must be a number between 1.0 and 10.0");
    }

    #[tokio::test]
    async fn test_predict_unexpected_class() {
        let (status, body) = post_json(create_router(state_with_class(7)), "/api/v1/predict", &scenario_a()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["stage"], "decode");
        assert_eq!(body["error"], "Unexpected prediction result. Please check the model's output.");
    }

    #[tokio::test]
    async fn test_form_round_trip() {
        let app = create_router(bundled_state());

        let (status, page) = get_text(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Predict Addiction Level"));
        assert!(!page.contains("Predicted Addiction Level:"));

        let body = "age=25&satisfaction=5.0&gender=Male&location=India&platform=YouTube\
                    &video_category=Gaming&engagement=moderate&frequency=Evening\
                    &watch_reason=Entertainment&watch_time=8%3A30+PM";
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("Predicted Addiction Level: moderate"));
        assert!(page.contains("<option value=\"Evening\" selected>"));
    }

    #[tokio::test]
    async fn test_form_renders_error_inline_and_stays_usable() {
        let app = create_router(state_with_class(-1));
        let body = "age=25&satisfaction=5.0&gender=Male&location=India&platform=YouTube\
                    &video_category=Gaming&engagement=moderate&frequency=Evening\
                    &watch_reason=Entertainment&watch_time=8%3A30+PM";
        let request = || {
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap()
        };

        for _ in 0..2 {
            let response = app.clone().oneshot(request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let page = String::from_utf8(bytes.to_vec()).unwrap();
            assert!(page.contains("Unexpected prediction result."));
            assert!(!page.contains("Predicted Addiction Level:"));
        }
    }

    #[tokio::test]
    async fn test_model_info_and_health() {
        let app = create_router(bundled_state());

        let (status, body) = get_text(app.clone(), "/api/v1/model").await;
        assert_eq!(status, StatusCode::OK);
        let info: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(info["model_name"], "XGBoost Classifier");
        assert_eq!(info["num_classes"], 5);
        assert_eq!(info["labels"][3], "no addiction");

        let (status, body) = get_text(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("healthy"));
    }

    #[tokio::test]
    async fn test_form_rejects_non_finite_satisfaction() {
        for value in ["NaN", "inf"] {
            let body = format!(
                "age=25&satisfaction={value}&gender=Male&location=India&platform=YouTube\
                 &video_category=Gaming&engagement=moderate&frequency=Evening\
                 &watch_reason=Entertainment&watch_time=8%3A30+PM"
            );
            let (status, page) = post_form(create_router(bundled_state()), &body).await;

            assert_eq!(status, StatusCode::OK);
            assert!(page.contains("Invalid input: Satisfaction must be a number between 1.0 and 10.0"));
            assert!(!page.contains("Predicted Addiction Level:"));
        }
    }

    #[tokio::test]
    async fn test_form_keeps_entered_values_when_a_field_is_bad() {
        let body = "age=forty&satisfaction=7.5&gender=Female&location=Japan&platform=TikTok\
                    &video_category=Pranks&engagement=less&frequency=Night\
                    &watch_reason=Habit&watch_time=11%3A30+PM";
        let (status, page) = post_form(create_router(bundled_state()), body).await;

        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Invalid input: Age could not be read"));
        assert!(page.contains("<option value=\"Japan\" selected>"));
        assert!(page.contains("<option value=\"TikTok\" selected>"));
        assert!(page.contains("<option value=\"11:30 PM\" selected>"));
        assert!(page.contains("value=\"7.5\""));
        assert!(!page.contains("Predicted Addiction Level:"));
    }

    #[tokio::test]
    async fn test_form_out_of_range_message_is_short() {
        let body = "age=0&satisfaction=5.0&gender=Male&location=Mexico&platform=YouTube\
                    &video_category=Gaming&engagement=moderate&frequency=Evening\
                    &watch_reason=Entertainment&watch_time=8%3A30+PM";
        let (_, page) = post_form(create_router(bundled_state()), body).await;

        assert!(page.contains("<div class=\"error\">Invalid input: Age must be a whole number between 1 and 100</div>"));
        assert!(page.contains("<option value=\"Mexico\" selected>"));
        assert!(!page.contains("Validation error"));
    }
}
