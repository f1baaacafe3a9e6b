#[cfg(test)]
#[path = "server_test.rs"]
mod tests;

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::sse::Event;
use axum::response::sse::Sse;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use rust_embed::RustEmbed;
use serde_derive::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatRequest;
use crate::domain::models::DualResponseOutcome;
use crate::domain::models::PaneStatus;
use crate::domain::models::PaneStream;
use crate::domain::models::RateLimitErrorBody;
use crate::domain::services::charts;
use crate::domain::services::datasets::DatasetStore;
use crate::domain::services::datasets::NewsCondition;
use crate::domain::services::orchestrator::ChatOrchestrator;

/// Hard cap on how long one dual response may stream before the connection is
/// closed with whatever was produced.
const RESPONSE_DEADLINE: Duration = Duration::from_secs(60);

/// Fallback client key when no forwarding headers are present, i.e. direct
/// local access without a reverse proxy.
const LOCAL_CLIENT_KEY: &str = "127.0.0.1";

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

pub struct AppState {
    pub datasets: DatasetStore,
    pub orchestrator: ChatOrchestrator,
}

#[derive(Deserialize)]
struct SourceQuery {
    source: Option<String>,
}

fn error_body(message: &str) -> Json<serde_json::Value> {
    return Json(json!({ "error": true, "message": message }));
}

/// Resolves the rate limit key for a request. Forwarding headers come from
/// the reverse proxy and are spoofable by anyone who can reach the service
/// directly, so the limiter is a courtesy brake rather than a security
/// boundary.
fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    return LOCAL_CLIENT_KEY.to_string();
}

fn parse_source(query: &SourceQuery) -> Result<NewsCondition, Response> {
    let Some(source) = query.source.as_deref() else {
        return Ok(NewsCondition::Mixed);
    };

    return NewsCondition::parse(source).map_err(|err| {
        return (StatusCode::BAD_REQUEST, error_body(&err.to_string())).into_response();
    });
}

async fn get_index() -> Response {
    let Some(file) = Assets::get("index.html") else {
        return (StatusCode::NOT_FOUND, error_body("Not found")).into_response();
    };

    return Html(file.data.to_vec()).into_response();
}

async fn get_personas(State(state): State<Arc<AppState>>) -> Response {
    let summaries = state
        .datasets
        .personas()
        .iter()
        .map(|persona| return persona.summary())
        .collect::<Vec<_>>();

    return Json(summaries).into_response();
}

async fn get_persona(State(state): State<Arc<AppState>>, Path(id): Path<u32>) -> Response {
    let Some(persona) = state.datasets.persona(id) else {
        return (StatusCode::NOT_FOUND, error_body("Persona not found")).into_response();
    };

    return Json(persona).into_response();
}

async fn get_persona_records(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    Query(query): Query<SourceQuery>,
) -> Response {
    let condition = match parse_source(&query) {
        Ok(condition) => condition,
        Err(res) => return res,
    };
    if state.datasets.persona(id).is_none() {
        return (StatusCode::NOT_FOUND, error_body("Persona not found")).into_response();
    }

    return Json(state.datasets.persona_records(id, condition)).into_response();
}

async fn get_final_ratings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Response {
    let condition = match parse_source(&query) {
        Ok(condition) => condition,
        Err(res) => return res,
    };

    return Json(charts::final_ratings(state.datasets.records(condition))).into_response();
}

async fn get_progression(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Response {
    let condition = match parse_source(&query) {
        Ok(condition) => condition,
        Err(res) => return res,
    };

    return Json(charts::rating_progression(state.datasets.records(condition))).into_response();
}

async fn get_trajectory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Response {
    let condition = match parse_source(&query) {
        Ok(condition) => condition,
        Err(res) => return res,
    };

    return Json(charts::trajectories(state.datasets.records(condition))).into_response();
}

async fn get_news_impact(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Response {
    let condition = match parse_source(&query) {
        Ok(condition) => condition,
        Err(res) => return res,
    };

    return Json(charts::news_impact(state.datasets.records(condition))).into_response();
}

async fn get_rating_table(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Response {
    let condition = match parse_source(&query) {
        Ok(condition) => condition,
        Err(res) => return res,
    };

    return Json(charts::rating_table(state.datasets.records(condition))).into_response();
}

async fn get_stance(State(state): State<Arc<AppState>>) -> Response {
    return Json(charts::stance_buckets(state.datasets.presurvey())).into_response();
}

async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Response {
    let condition = match parse_source(&query) {
        Ok(condition) => condition,
        Err(res) => return res,
    };

    return Json(charts::insights(state.datasets.records(condition))).into_response();
}

/// Forwards one pane's progress into the SSE channel. Every transcript change
/// becomes a `response{index}` event carrying the full accumulated text, and
/// the terminal status becomes `loading{index}` or `error{index}`.
async fn drive_pane(mut pane: PaneStream, index: u8, tx: mpsc::UnboundedSender<Event>) {
    loop {
        tokio::select! {
            changed = pane.transcript.changed() => {
                if changed.is_err() {
                    break;
                }
                let text = pane.transcript.borrow_and_update().to_string();
                let event = Event::default()
                    .event(format!("response{index}"))
                    .data(json!({ "text": text }).to_string());
                if tx.send(event).is_err() {
                    return;
                }
            }
            changed = pane.status.changed() => {
                if changed.is_err() {
                    break;
                }
                if *pane.status.borrow_and_update() != PaneStatus::Generating {
                    break;
                }
            }
        }
    }

    // The terminal status is always published before the channels close, so
    // the watch holds it even when the loop exited through a closed channel.
    let status = pane.status.borrow().to_owned();
    if let PaneStatus::Failed(message) = status {
        let event = Event::default()
            .event(format!("error{index}"))
            .data(json!({ "message": message }).to_string());
        let _ = tx.send(event);
        return;
    }

    // The transcript watch only holds the latest value, so re-emit the final
    // text before signalling completion in case the last change was observed
    // through the status arm.
    let text = pane.transcript.borrow().to_string();
    if !text.is_empty() {
        let event = Event::default()
            .event(format!("response{index}"))
            .data(json!({ "text": text }).to_string());
        let _ = tx.send(event);
    }

    let event = Event::default()
        .event(format!("loading{index}"))
        .data(json!({ "done": true }).to_string());
    let _ = tx.send(event);
}

async fn post_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Response {
    let Some(persona) = state.datasets.persona(id) else {
        return (StatusCode::NOT_FOUND, error_body("Persona not found")).into_response();
    };

    let key = client_key(&headers);
    let outcome = match state.orchestrator.dual_response(&key, &req.messages, persona) {
        Ok(outcome) => outcome,
        Err(err) => {
            return (StatusCode::UNPROCESSABLE_ENTITY, error_body(&err.to_string()))
                .into_response();
        }
    };

    let streams = match outcome {
        DualResponseOutcome::RateLimited(decision) => {
            tracing::warn!(key = key, reset = decision.reset, "chat rate limited");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(RateLimitErrorBody::from_decision(&decision)),
            )
                .into_response();
        }
        DualResponseOutcome::Streams(streams) => streams,
    };

    let (tx, rx) = mpsc::unbounded_channel::<Event>();

    let ratelimit_event = Event::default().event("ratelimit").data(
        json!({ "remaining": streams.remaining, "reset": streams.reset }).to_string(),
    );
    let _ = tx.send(ratelimit_event);

    tokio::spawn(async move {
        let baseline = drive_pane(streams.baseline, 1, tx.clone());
        let exposed = drive_pane(streams.exposed, 2, tx.clone());

        if tokio::time::timeout(RESPONSE_DEADLINE, futures::future::join(baseline, exposed))
            .await
            .is_err()
        {
            tracing::warn!("dual response deadline reached, closing stream");
        }
    });

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        return rx
            .recv()
            .await
            .map(|event| return (Ok::<Event, Infallible>(event), rx));
    });

    return Sse::new(stream).into_response();
}

pub fn router(state: Arc<AppState>) -> Router {
    return Router::new()
        .route("/", get(get_index))
        .route("/api/personas", get(get_personas))
        .route("/api/personas/:id", get(get_persona))
        .route("/api/personas/:id/records", get(get_persona_records))
        .route("/api/charts/final-ratings", get(get_final_ratings))
        .route("/api/charts/progression", get(get_progression))
        .route("/api/charts/trajectory", get(get_trajectory))
        .route("/api/charts/news-impact", get(get_news_impact))
        .route("/api/charts/table", get(get_rating_table))
        .route("/api/charts/stance", get(get_stance))
        .route("/api/insights", get(get_insights))
        .route("/api/chat/:id", post(post_chat))
        .with_state(state);
}

pub async fn serve(datasets: DatasetStore, orchestrator: ChatOrchestrator) -> Result<()> {
    let state = Arc::new(AppState {
        datasets,
        orchestrator,
    });

    let addr = format!(
        "{host}:{port}",
        host = Config::get(ConfigKey::Host),
        port = Config::get(ConfigKey::Port)
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    return Ok(());
}
