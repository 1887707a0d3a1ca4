use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, post, routes, Build, Rocket, State};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use common::ServerConfig;

use crate::pipeline::{BlogSummary, Pipeline};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub pipeline: Pipeline,
    /// Cancelled on process shutdown; every request works on a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(pipeline: Pipeline, shutdown: CancellationToken) -> Self {
        Self {
            started_at: Utc::now(),
            pipeline,
            shutdown,
        }
    }
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    dictionary_words: usize,
}

#[derive(Deserialize)]
struct SummarizeRequest {
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (Status, Json<ErrorBody>);

fn api_error(status: Status, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        dictionary_words: state.pipeline.analyzer().dictionary().len(),
    })
}

/// Scrape, summarize, translate and store the blog post at `url`.
#[post("/api/summarize", data = "<body>")]
async fn summarize(state: &State<AppState>, body: Json<SummarizeRequest>) -> Result<Json<BlogSummary>, ApiError> {
    let url = match body.into_inner().url {
        Some(url) if !url.trim().is_empty() => url,
        _ => return Err(api_error(Status::BadRequest, "URL is required")),
    };

    let cancel = state.shutdown.child_token();
    match state.pipeline.process(&url, &cancel).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            let status = if e.is_client_error() {
                Status::BadRequest
            } else {
                Status::InternalServerError
            };
            tracing::error!(%url, error = %e, "summarize: request failed");
            Err(api_error(status, e.user_message()))
        }
    }
}

#[catch(400)]
fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Invalid request body".to_string(),
    })
}

#[catch(422)]
fn unprocessable() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Invalid request body".to_string(),
    })
}

#[catch(500)]
fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Failed to process blog".to_string(),
    })
}

/// Assemble the Rocket instance. `server` (bind/port) is merged on top of
/// Rocket's own figment when present.
pub fn build_rocket(state: AppState, server: Option<&ServerConfig>) -> Rocket<Build> {
    let mut fig = rocket::Config::figment();
    if let Some(server) = server {
        if let Some(bind) = &server.bind {
            fig = fig.merge(("address", bind.clone()));
        }
        if let Some(port) = server.port {
            fig = fig.merge(("port", port));
        }
    }

    rocket::custom(fig)
        .manage(state)
        .mount("/", routes![health, status, summarize])
        .register("/", catchers![bad_request, unprocessable, internal_error])
}

/// Launch the HTTP server and block until Rocket shuts down.
pub async fn launch_rocket(state: AppState, server: Option<&ServerConfig>) -> Result<()> {
    tracing::info!("Starting Rocket HTTP server");
    build_rocket(state, server)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
