//! HTTP route handlers for the lab API.

use std::collections::HashMap;
use std::sync::MutexGuard;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use preplab::attempt::{CompareOutcome, EvaluationMode, compare_view, evaluate_submission};
use preplab::core::flow::Step;
use preplab::core::outcome::{CompareResult, ExecutionOutcome, compare};
use preplab::core::session::SessionState;
use preplab::core::table::TableView;
use preplab::core::validate::ValidationReport;
use preplab::io::catalog::{
    AFTER_FILE, BEFORE_FILE, CatalogError, list_problems, load_csv_text, load_meta, load_tables,
};
use preplab::scaffold::SAMPLE_SCAFFOLD;

use crate::state::AppState;

type ApiError = (StatusCode, String);

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/problems", get(problems_index))
        .route("/problems/{id}", get(problem_detail))
        .route("/problems/{id}/before.csv", get(before_csv))
        .route("/problems/{id}/after.csv", get(after_csv))
        .route("/scaffold", get(scaffold))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(session_view))
        .route("/sessions/{id}/select", post(select_problem))
        .route("/sessions/{id}/submit", post(submit))
        .route("/sessions/{id}/advance", post(advance))
        .route("/sessions/{id}/retreat", post(retreat))
        .route("/sessions/{id}/reset", post(reset))
        .route("/sessions/{id}/compare", get(compare_step))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Serialize)]
struct ProblemSummary {
    id: String,
    name: String,
    description: String,
}

/// GET /api/problems - catalog listing.
async fn problems_index(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProblemSummary>>, ApiError> {
    let problems = list_problems(state.problems_dir()).map_err(catalog_error)?;
    let summaries = problems
        .into_iter()
        .map(|(id, meta)| ProblemSummary {
            id,
            name: meta.name,
            description: meta.description,
        })
        .collect();
    Ok(Json(summaries))
}

#[derive(Serialize)]
struct ProblemDetail {
    id: String,
    name: String,
    description: String,
    before: TableView,
    after: TableView,
}

/// GET /api/problems/:id - metadata plus both rendered tables.
async fn problem_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProblemDetail>, ApiError> {
    let meta = load_meta(state.problems_dir(), &id).map_err(catalog_error)?;
    let (before, after) = load_tables(state.problems_dir(), &id).map_err(catalog_error)?;
    Ok(Json(ProblemDetail {
        id,
        name: meta.name,
        description: meta.description,
        before: TableView::from_frame(&before),
        after: TableView::from_frame(&after),
    }))
}

/// GET /api/problems/:id/before.csv - raw table download.
async fn before_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    csv_download(&state, &id, BEFORE_FILE)
}

/// GET /api/problems/:id/after.csv - raw table download.
async fn after_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    csv_download(&state, &id, AFTER_FILE)
}

fn csv_download(state: &AppState, id: &str, file_name: &str) -> Result<Response, ApiError> {
    let text = load_csv_text(state.problems_dir(), id, file_name).map_err(catalog_error)?;
    Ok(([(header::CONTENT_TYPE, "text/csv")], text).into_response())
}

/// GET /api/scaffold - sample submission download.
async fn scaffold() -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], SAMPLE_SCAFFOLD).into_response()
}

#[derive(Serialize)]
struct SessionCreated {
    session_id: Uuid,
}

/// POST /api/sessions - create a fresh session.
async fn create_session(State(state): State<AppState>) -> Result<Json<SessionCreated>, ApiError> {
    let session_id = Uuid::new_v4();
    sessions(&state)?.insert(session_id, SessionState::new());
    Ok(Json(SessionCreated { session_id }))
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutcomeView {
    Table { table: TableView },
    Failure { trace: String },
}

impl OutcomeView {
    fn from_outcome(outcome: &ExecutionOutcome) -> Self {
        match outcome {
            ExecutionOutcome::Table(frame) => OutcomeView::Table {
                table: TableView::from_frame(frame),
            },
            ExecutionOutcome::Failure { trace } => OutcomeView::Failure {
                trace: trace.clone(),
            },
        }
    }
}

#[derive(Serialize)]
struct SessionView {
    session_id: Uuid,
    step: Step,
    step_index: u8,
    problem_id: Option<String>,
    has_submission: bool,
    report: Option<ValidationReport>,
    outcome: Option<OutcomeView>,
    submitted: bool,
}

impl SessionView {
    fn from_session(session_id: Uuid, session: &SessionState) -> Self {
        Self {
            session_id,
            step: session.step(),
            step_index: session.step().index(),
            problem_id: session.problem_id.clone(),
            has_submission: session.submission.is_some(),
            report: session.report.clone(),
            outcome: session.outcome.as_ref().map(OutcomeView::from_outcome),
            submitted: session.submitted(),
        }
    }
}

/// GET /api/sessions/:id - current session state.
async fn session_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let guard = sessions(&state)?;
    let session = find_session(&guard, id)?;
    Ok(Json(SessionView::from_session(id, session)))
}

#[derive(Deserialize)]
struct SelectRequest {
    problem_id: String,
}

/// POST /api/sessions/:id/select - pick a problem. Does not reset the step.
async fn select_problem(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SelectRequest>,
) -> Result<Json<SessionView>, ApiError> {
    load_meta(state.problems_dir(), &body.problem_id).map_err(catalog_error)?;
    let mut guard = sessions(&state)?;
    let session = find_session_mut(&mut guard, id)?;
    session.select_problem(body.problem_id);
    Ok(Json(SessionView::from_session(id, session)))
}

#[derive(Deserialize)]
struct SubmitRequest {
    source: String,
}

#[derive(Serialize)]
struct SubmitResponse {
    #[serde(flatten)]
    session: SessionView,
    /// Verdict preview computed from the submit-time run, shown on the
    /// submit step before the learner advances to compare.
    preview: Option<CompareResult>,
}

/// POST /api/sessions/:id/submit - run the validate/execute pipeline.
async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let (problem_id, revision) = {
        let guard = sessions(&state)?;
        let session = find_session(&guard, id)?;
        if session.step() != Step::Submit {
            return Err(conflict("submissions are only accepted on the submit step"));
        }
        let problem_id = session
            .problem_id
            .clone()
            .ok_or_else(|| bad_request("no problem selected"))?;
        (problem_id, session.revision())
    };

    let source = body.source;
    let worker_state = state.clone();
    let worker_source = source.clone();
    let evaluated = tokio::task::spawn_blocking(move || {
        let (before, after) = load_tables(worker_state.problems_dir(), &problem_id)
            .map_err(|err| anyhow::Error::new(err))?;
        let (report, outcome) = evaluate_submission(
            &worker_source,
            &before,
            worker_state.runner.as_ref(),
            &worker_state.config.policy(),
        )?;
        let preview = outcome
            .as_ref()
            .and_then(ExecutionOutcome::table)
            .map(|actual| compare(&after, actual));
        Ok::<_, anyhow::Error>((report, outcome, preview))
    })
    .await
    .map_err(|err| internal(&format!("submission task failed: {err}")))?
    .map_err(|err| internal(&format!("{err:#}")))?;

    let (report, outcome, preview) = evaluated;
    let mut guard = sessions(&state)?;
    let session = find_session_mut(&mut guard, id)?;
    // The lock was released while the interpreter ran. A reset, retreat or
    // problem switch in the meantime makes this result stale; discard it
    // instead of repopulating the session.
    if session.revision() != revision {
        return Err(conflict("session changed while the submission was running"));
    }
    session.record_attempt(source, report, outcome);
    Ok(Json(SubmitResponse {
        session: SessionView::from_session(id, session),
        preview,
    }))
}

/// POST /api/sessions/:id/advance - move forward one step.
async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut guard = sessions(&state)?;
    let session = find_session_mut(&mut guard, id)?;
    session
        .advance()
        .map_err(|refused| conflict(&refused.to_string()))?;
    Ok(Json(SessionView::from_session(id, session)))
}

/// POST /api/sessions/:id/retreat - move back one step.
async fn retreat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut guard = sessions(&state)?;
    let session = find_session_mut(&mut guard, id)?;
    session
        .retreat()
        .map_err(|refused| conflict(&refused.to_string()))?;
    Ok(Json(SessionView::from_session(id, session)))
}

/// POST /api/sessions/:id/reset - start over, clearing the attempt.
async fn reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut guard = sessions(&state)?;
    let session = find_session_mut(&mut guard, id)?;
    session.reset();
    Ok(Json(SessionView::from_session(id, session)))
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum CompareResponse {
    Verdict {
        verdict: CompareResult,
        expected: TableView,
        actual: TableView,
    },
    Failed {
        trace: String,
    },
}

/// GET /api/sessions/:id/compare - verdict next to expected and actual.
async fn compare_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompareResponse>, ApiError> {
    let (snapshot, problem_id) = {
        let guard = sessions(&state)?;
        let session = find_session(&guard, id)?;
        if session.step() != Step::Compare {
            return Err(conflict("comparison is only available on the compare step"));
        }
        let problem_id = session
            .problem_id
            .clone()
            .ok_or_else(|| bad_request("no problem selected"))?;
        (session.clone(), problem_id)
    };

    let worker_state = state.clone();
    let view = tokio::task::spawn_blocking(move || {
        let (before, after) = load_tables(worker_state.problems_dir(), &problem_id)
            .map_err(|err| anyhow::Error::new(err))?;
        let mode = EvaluationMode::from_flag(worker_state.config.reevaluate_on_compare);
        compare_view(
            &snapshot,
            &after,
            &before,
            worker_state.runner.as_ref(),
            &worker_state.config.policy(),
            mode,
        )
    })
    .await
    .map_err(|err| internal(&format!("compare task failed: {err}")))?
    .map_err(|err| internal(&format!("{err:#}")))?;

    Ok(Json(match view {
        CompareOutcome::Verdict {
            verdict,
            expected,
            actual,
        } => CompareResponse::Verdict {
            verdict,
            expected: TableView::from_frame(&expected),
            actual: TableView::from_frame(&actual),
        },
        CompareOutcome::Failed { trace } => CompareResponse::Failed { trace },
    }))
}

fn sessions(state: &AppState) -> Result<MutexGuard<'_, HashMap<Uuid, SessionState>>, ApiError> {
    state
        .sessions
        .lock()
        .map_err(|_| internal("session store poisoned"))
}

fn find_session<'a>(
    guard: &'a MutexGuard<'_, HashMap<Uuid, SessionState>>,
    id: Uuid,
) -> Result<&'a SessionState, ApiError> {
    guard
        .get(&id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown session {id}")))
}

fn find_session_mut<'a>(
    guard: &'a mut MutexGuard<'_, HashMap<Uuid, SessionState>>,
    id: Uuid,
) -> Result<&'a mut SessionState, ApiError> {
    guard
        .get_mut(&id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown session {id}")))
}

fn catalog_error(err: CatalogError) -> ApiError {
    match err {
        CatalogError::NotFound(id) => (StatusCode::NOT_FOUND, format!("unknown problem '{id}'")),
        other => internal(&format!("{:#}", anyhow::Error::new(other))),
    }
}

fn conflict(msg: &str) -> ApiError {
    (StatusCode::CONFLICT, msg.to_string())
}

fn bad_request(msg: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, msg.to_string())
}

fn internal(msg: &str) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SharedRunner;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use polars::df;
    use preplab::io::config::LabConfig;
    use preplab::test_support::{GatedRunner, ProblemFixture, ScriptedRunner, sample_problems};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(runner: SharedRunner, fixture: &ProblemFixture) -> Router {
        let config = LabConfig {
            problems_dir: fixture.root().to_path_buf(),
            ..LabConfig::default()
        };
        Router::new()
            .nest("/api", api_router())
            .with_state(AppState::new(config, runner))
    }

    fn doubled_runner() -> SharedRunner {
        Arc::new(ScriptedRunner::table(
            df!("a" => [2i64, 4]).expect("frame"),
        ))
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        read_json(response).await
    }

    async fn post(app: &Router, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(value) => Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .expect("request"),
            None => Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        };
        let response = app.clone().oneshot(request).await.expect("response");
        read_json(response).await
    }

    async fn read_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    const ACCEPTED_SOURCE: &str =
        "def preprocess(df):\n    return df\n\nif __name__ == \"__main__\":\n    pass\n";

    #[tokio::test]
    async fn health_is_ok() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn lists_problems_from_catalog() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);
        let (status, body) = get(&app, "/api/problems").await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().expect("array");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], "problem001");
        assert_eq!(entries[0]["name"], "Double the values");
    }

    #[tokio::test]
    async fn problem_detail_renders_both_tables() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);
        let (status, body) = get(&app, "/api/problems/problem001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["before"]["columns"], json!(["a"]));
        assert_eq!(body["before"]["rows"], json!([["1"], ["2"]]));
        assert_eq!(body["after"]["rows"], json!([["2"], ["4"]]));
    }

    #[tokio::test]
    async fn unknown_problem_is_404() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);
        let (status, _) = get(&app, "/api/problems/problem404").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn full_session_flow_reaches_a_match_verdict() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);

        let (status, created) = post(&app, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        let id = created["session_id"].as_str().expect("id").to_string();

        let (status, _) = post(
            &app,
            &format!("/api/sessions/{id}/select"),
            Some(json!({"problem_id": "problem001"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post(&app, &format!("/api/sessions/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, submitted) = post(
            &app,
            &format!("/api/sessions/{id}/submit"),
            Some(json!({"source": ACCEPTED_SOURCE})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(submitted["submitted"], json!(true));
        assert_eq!(submitted["preview"], json!("match"));
        assert_eq!(submitted["report"]["checks"][0]["verdict"], json!("pass"));

        let (status, advanced) = post(&app, &format!("/api/sessions/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(advanced["step"], json!("compare"));

        let (status, compared) = get(&app, &format!("/api/sessions/{id}/compare")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(compared["kind"], json!("verdict"));
        assert_eq!(compared["verdict"], json!("match"));
        assert_eq!(compared["expected"]["rows"], json!([["2"], ["4"]]));
    }

    #[tokio::test]
    async fn advance_without_accepted_submission_is_409() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);

        let (_, created) = post(&app, "/api/sessions", None).await;
        let id = created["session_id"].as_str().expect("id").to_string();

        let (status, _) = post(&app, &format!("/api/sessions/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post(&app, &format!("/api/sessions/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn retreat_at_confirm_is_409() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);

        let (_, created) = post(&app, "/api/sessions", None).await;
        let id = created["session_id"].as_str().expect("id").to_string();

        let (status, _) = post(&app, &format!("/api/sessions/{id}/retreat"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn select_unknown_problem_is_404() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);

        let (_, created) = post(&app, "/api/sessions", None).await;
        let id = created["session_id"].as_str().expect("id").to_string();

        let (status, _) = post(
            &app,
            &format!("/api/sessions/{id}/select"),
            Some(json!({"problem_id": "problem404"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);
        let (status, _) = get(
            &app,
            &format!("/api/sessions/{}", Uuid::new_v4()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submit_outside_submit_step_is_409() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);

        let (_, created) = post(&app, "/api/sessions", None).await;
        let id = created["session_id"].as_str().expect("id").to_string();

        // Still on confirm.
        let (status, _) = post(
            &app,
            &format!("/api/sessions/{id}/submit"),
            Some(json!({"source": ACCEPTED_SOURCE})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn reset_clears_the_attempt_and_returns_to_confirm() {
        let fixture = sample_problems().expect("fixture");
        let app = test_app(doubled_runner(), &fixture);

        let (_, created) = post(&app, "/api/sessions", None).await;
        let id = created["session_id"].as_str().expect("id").to_string();

        post(
            &app,
            &format!("/api/sessions/{id}/select"),
            Some(json!({"problem_id": "problem001"})),
        )
        .await;
        post(&app, &format!("/api/sessions/{id}/advance"), None).await;
        post(
            &app,
            &format!("/api/sessions/{id}/submit"),
            Some(json!({"source": ACCEPTED_SOURCE})),
        )
        .await;

        let (status, body) = post(&app, &format!("/api/sessions/{id}/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], json!("confirm"));
        assert_eq!(body["has_submission"], json!(false));
        assert_eq!(body["report"], Value::Null);
        assert_eq!(body["outcome"], Value::Null);
        assert_eq!(body["submitted"], json!(false));
        // The selected problem survives a reset.
        assert_eq!(body["problem_id"], json!("problem001"));
    }

    #[tokio::test]
    async fn reset_during_submit_discards_the_stale_attempt() {
        let fixture = sample_problems().expect("fixture");
        let (runner, started, release) =
            GatedRunner::table(df!("a" => [2i64, 4]).expect("frame"));
        let app = test_app(Arc::new(runner), &fixture);

        let (_, created) = post(&app, "/api/sessions", None).await;
        let id = created["session_id"].as_str().expect("id").to_string();

        post(
            &app,
            &format!("/api/sessions/{id}/select"),
            Some(json!({"problem_id": "problem001"})),
        )
        .await;
        post(&app, &format!("/api/sessions/{id}/advance"), None).await;

        let submit_app = app.clone();
        let submit_id = id.clone();
        let submit = tokio::spawn(async move {
            post(
                &submit_app,
                &format!("/api/sessions/{submit_id}/submit"),
                Some(json!({"source": ACCEPTED_SOURCE})),
            )
            .await
        });

        // Wait until the runner is executing, then reset while it runs.
        tokio::task::spawn_blocking(move || started.recv())
            .await
            .expect("join")
            .expect("run started");
        let (status, _) = post(&app, &format!("/api/sessions/{id}/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        release.send(()).expect("release runner");

        let (status, _) = submit.await.expect("join submit");
        assert_eq!(status, StatusCode::CONFLICT);

        // The stale attempt was discarded; the reset state survives.
        let (_, session) = get(&app, &format!("/api/sessions/{id}")).await;
        assert_eq!(session["step"], json!("confirm"));
        assert_eq!(session["submitted"], json!(false));
        assert_eq!(session["has_submission"], json!(false));
        assert_eq!(session["report"], Value::Null);
        assert_eq!(session["outcome"], Value::Null);
    }

    #[tokio::test]
    async fn failing_checks_keep_submitted_false_and_skip_the_runner() {
        let fixture = sample_problems().expect("fixture");
        let runner = Arc::new(ScriptedRunner::table(
            df!("a" => [2i64, 4]).expect("frame"),
        ));
        let app = test_app(runner.clone(), &fixture);

        let (_, created) = post(&app, "/api/sessions", None).await;
        let id = created["session_id"].as_str().expect("id").to_string();

        post(
            &app,
            &format!("/api/sessions/{id}/select"),
            Some(json!({"problem_id": "problem001"})),
        )
        .await;
        post(&app, &format!("/api/sessions/{id}/advance"), None).await;

        let (status, body) = post(
            &app,
            &format!("/api/sessions/{id}/submit"),
            Some(json!({"source": "print('nothing relevant')"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["submitted"], json!(false));
        assert_eq!(body["preview"], Value::Null);
        assert_eq!(body["report"]["checks"][0]["verdict"], json!("fail"));
        assert_eq!(runner.calls(), 0);
    }
}
