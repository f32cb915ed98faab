//! HTTP routes for the form page and the JSON API

use axum::{
    extract::{rejection::FormRejection, Form, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::FormError;
use crate::predictor::Predictor;
use crate::types::{PredictionOutcome, PredictionResult, RawInput};
use crate::web::render;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/api/choices", get(get_choices))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ChoicesResponse {
    pub genders: Vec<&'static str>,
    pub categories: Vec<&'static str>,
    pub states: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub threshold: f64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>) -> Html<String> {
    let tables = state.predictor.extractor().tables();
    Html(render::page(tables, &RawInput::default(), None))
}

async fn predict_form(
    State(state): State<AppState>,
    form: Result<Form<RawInput>, FormRejection>,
) -> Html<String> {
    let tables = state.predictor.extractor().tables();

    // A body that does not parse (e.g. a blank amount) is shown on the page
    // like any other submission error.
    let input = match form {
        Ok(Form(input)) => input,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected form submission");
            let outcome = PredictionOutcome::Failed {
                message: format!("Error: {}", rejection.body_text()),
            };
            return Html(render::page(tables, &RawInput::default(), Some(&outcome)));
        }
    };

    let predictor = Arc::clone(&state.predictor);
    let scored = input.clone();

    // ONNX inference is CPU-bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || predictor.score(&scored))
        .await
        .unwrap_or_else(|e| PredictionOutcome::Failed {
            message: format!("Error: {e}"),
        });

    Html(render::page(tables, &input, Some(&outcome)))
}

async fn predict_json(
    State(state): State<AppState>,
    Json(input): Json<RawInput>,
) -> Result<Json<PredictionResult>, FormError> {
    let predictor = Arc::clone(&state.predictor);

    let result = tokio::task::spawn_blocking(move || predictor.evaluate(&input))
        .await
        .map_err(|e| FormError::Prediction(e.to_string()))??;

    Ok(Json(result))
}

async fn get_choices(State(state): State<AppState>) -> Json<ChoicesResponse> {
    let tables = state.predictor.extractor().tables();
    Json(ChoicesResponse {
        genders: tables.gender_choices().collect(),
        categories: tables.category_choices().collect(),
        states: tables.state_choices().collect(),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.predictor.classifier_name().to_string(),
        threshold: state.predictor.threshold(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::FraudClassifier;
    use crate::predictor::tests::{BrokenClassifier, FixedClassifier};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app(classifier: impl FraudClassifier + 'static) -> Router {
        let predictor = Predictor::from_config(&AppConfig::default(), Arc::new(classifier));
        router(AppState {
            predictor: Arc::new(predictor),
        })
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const CALIFORNIA_FOOD: &str = "amount=100&hour=12&day=1&month=1&age=30&gender=Male\
        &category=Food+%26+Dining&state=California";

    #[tokio::test]
    async fn test_index_renders_form() {
        let response = app(FixedClassifier(0.1))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("<form method=\"post\" action=\"/predict\">"));
        assert!(html.contains("Kids &amp; Pets"));
        assert!(html.contains("Wyoming"));
    }

    #[tokio::test]
    async fn test_form_submission_shows_verdict() {
        let response = app(FixedClassifier(0.91))
            .oneshot(form_request(CALIFORNIA_FOOD))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("<strong>FRAUD</strong>"));
        assert!(html.contains("Fraud Probability: <strong>91%</strong>"));
        // Submitted values stay selected
        assert!(html.contains("<option value=\"California\" selected>"));
    }

    #[tokio::test]
    async fn test_form_submission_with_failing_model() {
        let response = app(BrokenClassifier)
            .oneshot(form_request(CALIFORNIA_FOOD))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("Error: input &#39;city_pop&#39; has wrong type"));
        assert!(!html.contains("Fraud Probability"));
    }

    #[tokio::test]
    async fn test_form_submission_with_blank_amount() {
        let response = app(FixedClassifier(0.91))
            .oneshot(form_request(
                "amount=&hour=12&day=1&month=1&age=30&gender=Male\
                 &category=Food+%26+Dining&state=California",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("<p class=\"error\">Error: Failed to deserialize form body"));
        assert!(!html.contains("Fraud Probability"));
        // The form is still there to correct and resubmit
        assert!(html.contains("<form method=\"post\" action=\"/predict\">"));
    }

    #[tokio::test]
    async fn test_json_prediction() {
        let response = app(FixedClassifier(0.2))
            .oneshot(json_request(serde_json::json!({
                "amount": 1000.0,
                "hour": 2,
                "gender": "Female",
                "category": "Shopping (Net)",
                "state": "New York"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["label"], "LEGITIMATE");
        assert_eq!(body["percent"], 20);
    }

    #[tokio::test]
    async fn test_json_out_of_range_is_422() {
        let response = app(FixedClassifier(0.2))
            .oneshot(json_request(serde_json::json!({ "hour": 25 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "Error: hour must be between 0 and 23, got 25");
    }

    #[tokio::test]
    async fn test_json_model_failure_is_500() {
        let response = app(BrokenClassifier)
            .oneshot(json_request(serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_choices_and_health() {
        let router = app(FixedClassifier(0.2));

        let response = router
            .clone()
            .oneshot(Request::get("/api/choices").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["categories"].as_array().unwrap().len(), 13);
        assert_eq!(body["genders"][0], "Male");

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "fixed");
        assert_eq!(body["threshold"], 0.5);
    }
}
