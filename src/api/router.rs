//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layers (outermost → innermost): CORS → access log → handler.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router with all endpoints under `/api/`.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/taxonomy", get(endpoints::taxonomy::list))
        .route("/assessments/start", post(endpoints::assessments::start))
        .route("/assessments/:id/answer", post(endpoints::assessments::answer))
        .route("/assessments/:id/previous", post(endpoints::assessments::previous))
        .route(
            "/patients/:patient/assessments",
            post(endpoints::assessments::save).get(endpoints::assessments::list),
        )
        .route(
            "/patients/:patient/tracking",
            get(endpoints::tracking::list),
        )
        .route(
            "/patients/:patient/tracking/logs",
            post(endpoints::tracking::submit_log),
        )
        .route(
            "/patients/:patient/tracking/cure",
            put(endpoints::tracking::cure),
        )
        .route(
            "/patients/:patient/priority",
            get(endpoints::tracking::priority),
        )
        .route(
            "/patients/:patient/reports/:disease",
            get(endpoints::reports::recovery),
        )
        .route("/triage", get(endpoints::triage::board))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::access_log::log_access));

    Router::new()
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::taxonomy::DiseaseTaxonomy;

    /// CoreState backed by a temp database. Keep the guard alive for the test.
    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::new(DiseaseTaxonomy::builtin(), tmp.path().join("carepath.db"));
        (Arc::new(core), tmp)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    // ───────────────────────────────────────
    // health / taxonomy
    // ───────────────────────────────────────

    #[tokio::test]
    async fn health_returns_ok() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let (status, json) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["diseases"], 7);
    }

    #[tokio::test]
    async fn taxonomy_lists_normal_first() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let (status, json) = send(&app, "GET", "/api/taxonomy", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["question_budget"], 5);
        assert_eq!(json["diseases"][0]["name"], "Normal");
        assert_eq!(json["diseases"][1]["recovery_days"], 30);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let (status, _) = send(&app, "GET", "/api/nonexistent", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ───────────────────────────────────────
    // assessments
    // ───────────────────────────────────────

    #[tokio::test]
    async fn questionnaire_runs_to_completion() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let (status, json) = send(&app, "POST", "/api/assessments/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["step"]["status"], "question");
        assert_eq!(json["step"]["symptom"], "fatigue");
        let id = json["session_id"].as_str().unwrap().to_string();

        let answer = |yes: bool| Some(serde_json::json!({ "has_symptom": yes }));
        let uri = format!("/api/assessments/{id}/answer");

        let (_, json) = send(&app, "POST", &uri, answer(false)).await;
        assert_eq!(json["symptom"], "blurred vision");
        assert_eq!(json["number"], 2);

        let (_, json) = send(&app, "POST", &uri, answer(true)).await;
        assert_eq!(json["symptom"], "headache");

        let (status, json) = send(&app, "POST", &uri, answer(false)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "complete");
        assert_eq!(json["predicted_disease"], "Eye Disease");
        assert_eq!(json["symptoms"], serde_json::json!(["blurred vision"]));

        // finished sessions reject further answers
        let (status, json) = send(&app, "POST", &uri, answer(true)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn previous_rewinds_and_rejects_at_start() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let (_, json) = send(&app, "POST", "/api/assessments/start", None).await;
        let id = json["session_id"].as_str().unwrap().to_string();
        let prev = format!("/api/assessments/{id}/previous");

        let (status, json) = send(&app, "POST", &prev, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_STATE");

        send(
            &app,
            "POST",
            &format!("/api/assessments/{id}/answer"),
            Some(serde_json::json!({ "has_symptom": true })),
        )
        .await;
        let (status, json) = send(&app, "POST", &prev, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["symptom"], "fatigue");
        assert_eq!(json["number"], 1);
    }

    #[tokio::test]
    async fn malformed_session_id_is_bad_request() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let (status, json) = send(&app, "POST", "/api/assessments/not-a-uuid/previous", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn saved_assessments_reject_duplicates() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let uri = "/api/patients/ann@x.com/assessments";
        let body = serde_json::json!({
            "symptoms": ["fatigue", "frequent urination"],
            "predicted_disease": "Diabetes",
        });

        let (status, json) = send(&app, "POST", uri, Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["recovery_days"], 30);

        let (status, json) = send(&app, "POST", uri, Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");

        let (status, json) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    // ───────────────────────────────────────
    // tracking / reports / triage
    // ───────────────────────────────────────

    #[tokio::test]
    async fn tracking_flow_through_report() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let logs = "/api/patients/ann@x.com/tracking/logs";

        let (status, json) = send(
            &app,
            "POST",
            logs,
            Some(serde_json::json!({
                "disease": "Pneumonia", "symptom": "cough", "score": 9, "date": "2025-06-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["estimated_recovery_days"], 21);
        assert_eq!(json["daily_logs"][0]["severity"], "High");

        let (_, json) = send(&app, "GET", "/api/patients/ann@x.com/priority", None).await;
        assert_eq!(json[0]["severity"], "High");
        assert_eq!(json[0]["priority"], "high");

        let report = "/api/patients/ann@x.com/reports/Pneumonia";
        let (status, json) = send(&app, "GET", report, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "NOT_RESOLVED");

        let (status, json) = send(
            &app,
            "PUT",
            "/api/patients/ann@x.com/tracking/cure",
            Some(serde_json::json!({
                "disease": "Pneumonia", "symptom": "cough", "is_cured": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_cured"], true);

        let (status, json) = send(&app, "GET", report, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["recovery_days"], 21);
        assert_eq!(json["average_score"], 9.0);

        let (_, json) = send(&app, "GET", "/api/patients/ann@x.com/tracking", None).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_log_rejected() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let logs = "/api/patients/ann@x.com/tracking/logs";

        let (status, json) = send(
            &app,
            "POST",
            logs,
            Some(serde_json::json!({ "disease": "Pneumonia", "symptom": "cough", "score": 11 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, _) = send(
            &app,
            "POST",
            logs,
            Some(serde_json::json!({ "disease": "Pneumonia", "symptom": "seizures", "score": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn triage_filters_by_priority() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        for (patient, score) in [("ann@x.com", 2), ("bob@x.com", 9)] {
            send(
                &app,
                "POST",
                &format!("/api/patients/{patient}/tracking/logs"),
                Some(serde_json::json!({ "disease": "Pneumonia", "symptom": "fever", "score": score })),
            )
            .await;
        }

        let (_, json) = send(&app, "GET", "/api/triage", None).await;
        assert_eq!(json[0]["patient_id"], "bob@x.com");
        assert_eq!(json[1]["patient_id"], "ann@x.com");

        let (_, json) = send(&app, "GET", "/api/triage?priority=low", None).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["patient_id"], "ann@x.com");

        let (_, json) = send(&app, "GET", "/api/triage?search=BOB", None).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }
}
