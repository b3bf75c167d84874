use crate::infra::{AppState, SessionRegistry};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use apnea_screen::screening::{
    Answer, ClientContext, InMemorySessionStore, QuestionId, ScreeningWizard, Sex, SubjectProfile,
};

/// Router builder exposing the screening wizard over JSON endpoints.
pub(crate) fn screening_router(registry: SessionRegistry) -> Router {
    Router::new()
        .route("/api/v1/screening/sessions", post(create_session))
        .route("/api/v1/screening/sessions/:session_id", get(session_view))
        .route(
            "/api/v1/screening/sessions/:session_id/profile",
            put(update_profile),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/answers",
            put(record_answer),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/next",
            post(advance_step),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/prev",
            post(step_back),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/restart",
            post(restart_session),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/assessment",
            get(assessment_view),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/submit",
            post(submit_session),
        )
        .with_state(registry)
}

pub(crate) fn with_screening_routes(registry: SessionRegistry) -> Router {
    screening_router(registry)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ProfileEditRequest {
    pub(crate) name: Option<String>,
    pub(crate) age: Option<u32>,
    pub(crate) phone: Option<String>,
    pub(crate) sex: Option<Sex>,
    pub(crate) weight_kg: Option<f64>,
    pub(crate) height_cm: Option<f64>,
}

impl ProfileEditRequest {
    fn apply(self, profile: &mut SubjectProfile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(age) = self.age {
            profile.age = Some(age);
        }
        if let Some(phone) = self.phone {
            profile.phone = phone;
        }
        if let Some(sex) = self.sex {
            profile.sex = Some(sex);
        }
        if let Some(weight_kg) = self.weight_kg {
            profile.weight_kg = Some(weight_kg);
        }
        if let Some(height_cm) = self.height_cm {
            profile.height_cm = Some(height_cm);
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerRequest {
    pub(crate) question: QuestionId,
    pub(crate) answer: Answer,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    #[serde(default)]
    pub(crate) referrer: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) session_id: String,
    pub(crate) current_step: u8,
    pub(crate) step_label: &'static str,
    pub(crate) can_proceed: bool,
    pub(crate) answered: usize,
    pub(crate) profile: SubjectProfile,
    pub(crate) submission_state: &'static str,
}

fn view_of(session_id: &str, wizard: &ScreeningWizard<InMemorySessionStore>) -> SessionView {
    let session = wizard.session();
    SessionView {
        session_id: session_id.to_string(),
        current_step: session.current_step.number(),
        step_label: session.current_step.label(),
        can_proceed: wizard.can_proceed(),
        answered: session.answers.answered(),
        profile: session.profile.clone(),
        submission_state: session.submission_state.label(),
    }
}

fn unknown_session(session_id: &str) -> Response {
    let payload = json!({ "error": format!("unknown session '{session_id}'") });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

pub(crate) async fn create_session(State(registry): State<SessionRegistry>) -> Response {
    let session_id = registry.create().await;
    let payload = json!({ "session_id": session_id });
    (StatusCode::CREATED, Json(payload)).into_response()
}

pub(crate) async fn session_view(
    State(registry): State<SessionRegistry>,
    Path(session_id): Path<String>,
) -> Response {
    let sessions = registry.sessions().await;
    match sessions.get(&session_id) {
        Some(entry) => Json(view_of(&session_id, &entry.wizard)).into_response(),
        None => unknown_session(&session_id),
    }
}

pub(crate) async fn update_profile(
    State(registry): State<SessionRegistry>,
    Path(session_id): Path<String>,
    Json(edit): Json<ProfileEditRequest>,
) -> Response {
    let mut sessions = registry.sessions().await;
    match sessions.get_mut(&session_id) {
        Some(entry) => {
            let accepted = entry.wizard.update_profile(|profile| edit.apply(profile));
            let payload = json!({
                "accepted": accepted,
                "session": view_of(&session_id, &entry.wizard),
            });
            Json(payload).into_response()
        }
        None => unknown_session(&session_id),
    }
}

pub(crate) async fn record_answer(
    State(registry): State<SessionRegistry>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Response {
    let mut sessions = registry.sessions().await;
    match sessions.get_mut(&session_id) {
        Some(entry) => {
            let accepted = entry.wizard.record_answer(request.question, request.answer);
            let payload = json!({
                "accepted": accepted,
                "answered": entry.wizard.session().answers.answered(),
            });
            Json(payload).into_response()
        }
        None => unknown_session(&session_id),
    }
}

// A rejected transition is advisory gating, not an error: the response stays
// 200 and simply reports that nothing moved.
pub(crate) async fn advance_step(
    State(registry): State<SessionRegistry>,
    Path(session_id): Path<String>,
) -> Response {
    let mut sessions = registry.sessions().await;
    match sessions.get_mut(&session_id) {
        Some(entry) => {
            let advanced = entry.wizard.next().await;
            let payload = json!({
                "advanced": advanced,
                "current_step": entry.wizard.current_step().number(),
            });
            Json(payload).into_response()
        }
        None => unknown_session(&session_id),
    }
}

pub(crate) async fn step_back(
    State(registry): State<SessionRegistry>,
    Path(session_id): Path<String>,
) -> Response {
    let mut sessions = registry.sessions().await;
    match sessions.get_mut(&session_id) {
        Some(entry) => {
            let moved = entry.wizard.prev().await;
            let payload = json!({
                "moved": moved,
                "current_step": entry.wizard.current_step().number(),
            });
            Json(payload).into_response()
        }
        None => unknown_session(&session_id),
    }
}

pub(crate) async fn restart_session(
    State(registry): State<SessionRegistry>,
    Path(session_id): Path<String>,
) -> Response {
    let mut sessions = registry.sessions().await;
    match sessions.get_mut(&session_id) {
        Some(entry) => {
            entry.wizard.restart().await;
            Json(view_of(&session_id, &entry.wizard)).into_response()
        }
        None => unknown_session(&session_id),
    }
}

pub(crate) async fn assessment_view(
    State(registry): State<SessionRegistry>,
    Path(session_id): Path<String>,
) -> Response {
    let sessions = registry.sessions().await;
    match sessions.get(&session_id) {
        Some(entry) => Json(entry.wizard.assessment()).into_response(),
        None => unknown_session(&session_id),
    }
}

pub(crate) async fn submit_session(
    State(registry): State<SessionRegistry>,
    Path(session_id): Path<String>,
    request: Option<Json<SubmitRequest>>,
) -> Response {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    let client = ClientContext {
        user_agent: request.user_agent.unwrap_or_else(|| "unknown".to_string()),
        referrer: request.referrer.unwrap_or_else(|| "direct".to_string()),
    };

    let mut sessions = registry.sessions().await;
    match sessions.get_mut(&session_id) {
        Some(entry) => {
            let result = entry.wizard.submit(&entry.orchestrator, client).await;
            match result {
                Ok(report) => Json(report).into_response(),
                Err(err) => {
                    let payload = json!({ "error": err.to_string() });
                    (StatusCode::CONFLICT, Json(payload)).into_response()
                }
            }
        }
        None => unknown_session(&session_id),
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
