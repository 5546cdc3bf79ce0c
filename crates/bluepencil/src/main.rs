use std::sync::Arc;
use std::{env, fs};

use bluepencil::app_state::AppState;
use bluepencil::handlers::ping::ping;
use bluepencil::handlers::response::empty;
use bluepencil::handlers::review::review;
use bluepencil::llm::{MockAnalysisClient, OpenAiAnalysisClient};
use bluepencil::media::S3MediaStore;
use bluepencil::review::{AnalysisClient, ReviewService};
use bluepencil::utils::tracing::init_tracing;
use bytes::Bytes;
use common::aws_credentials::resolve_credentials;
use common::configuration::{CompletionProvider, Configuration};
use common::consts::{
    BIND_ADDRESS_ENV, CONFIG_PATH_ENV, DEFAULT_BIND_ADDRESS, DEFAULT_CONFIG_PATH,
};
use http_body_util::combinators::BoxBody;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Configuration loading
// ---------------------------------------------------------------------------

/// Load and parse the YAML configuration file.
///
/// The path is read from `BLUEPENCIL_CONFIG_PATH` (env) or falls back to
/// `./bluepencil.yaml`.
fn load_config() -> Result<Configuration, Box<dyn std::error::Error + Send + Sync>> {
    let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let contents = fs::read_to_string(&path).map_err(|e| format!("failed to read {path}: {e}"))?;

    let config: Configuration =
        serde_yaml::from_str(&contents).map_err(|e| format!("failed to parse {path}: {e}"))?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Application state initialization
// ---------------------------------------------------------------------------

/// Build the shared [`AppState`] from a parsed [`Configuration`].
fn init_app_state(config: &Configuration) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let client: Arc<dyn AnalysisClient> = match config.completion.provider {
        CompletionProvider::OpenAi => {
            let api_key = env::var(&config.completion.api_key_env).map_err(|_| {
                format!(
                    "completion API key not found in ${}",
                    config.completion.api_key_env
                )
            })?;
            info!(model = %config.completion.model, "using chat-completions analysis client");
            Arc::new(OpenAiAnalysisClient::new(&config.completion, api_key))
        }
        CompletionProvider::Mock => {
            info!("using mock analysis client, replies are fixed");
            Arc::new(MockAnalysisClient)
        }
    };

    let credentials = resolve_credentials(&config.storage.credentials)?;
    let stager = Arc::new(S3MediaStore::new(&config.storage, credentials));

    Ok(AppState {
        review_service: Arc::new(ReviewService::new(client, stager)),
        allowed_origin: config.cors.allowed_origin.clone(),
    })
}

// ---------------------------------------------------------------------------
// Request routing
// ---------------------------------------------------------------------------

/// CORS pre-flight response for the review endpoint.
fn cors_preflight(
    allowed_origin: &str,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, hyper::Error> {
    let origin =
        HeaderValue::from_str(allowed_origin).unwrap_or_else(|_| HeaderValue::from_static("*"));

    let mut response = Response::new(empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let h = response.headers_mut();
    h.insert("Allow", HeaderValue::from_static("POST, OPTIONS"));
    h.insert("Access-Control-Allow-Origin", origin);
    h.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type"),
    );
    h.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    Ok(response)
}

/// Route an incoming HTTP request to the appropriate handler.
async fn route(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, hyper::Error> {
    match (req.method(), req.uri().path()) {
        (&Method::POST, "/review") => review(req, state).await,
        (&Method::OPTIONS, "/review") => cors_preflight(&state.allowed_origin),
        (&Method::GET, "/ping") => Ok(ping(&state.allowed_origin)),
        (method, path) => {
            debug!(method = %method, path = %path, "no route found");
            let mut not_found = Response::new(empty());
            *not_found.status_mut() = StatusCode::NOT_FOUND;
            Ok(not_found)
        }
    }
}

// ---------------------------------------------------------------------------
// Server loop
// ---------------------------------------------------------------------------

/// Accept connections and spawn a task per connection.
///
/// Listens for `SIGINT` / `ctrl-c` and shuts down gracefully, allowing
/// in-flight connections to finish.
async fn run_server(
    state: Arc<AppState>,
    bind_address: String,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "server listening");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = result?;
                let io = TokioIo::new(stream);
                let state = Arc::clone(&state);

                tokio::task::spawn(async move {
                    debug!(peer = ?peer_addr, "accepted connection");

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { route(req, state).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        warn!(error = ?err, "error serving connection");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("received shutdown signal, stopping server");
                break;
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config = load_config()?;
    let bind_address = env::var(BIND_ADDRESS_ENV)
        .ok()
        .or_else(|| config.listen_address.clone())
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

    let state = Arc::new(init_app_state(&config)?);
    run_server(state, bind_address).await
}
