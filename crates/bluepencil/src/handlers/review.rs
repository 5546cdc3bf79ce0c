use std::sync::Arc;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tracing::{info_span, warn, Instrument};

use crate::app_state::AppState;
use crate::review::ReviewRequest;

use super::request::extract_request_id;
use super::response::json_response;

/// `POST /review`: bind the draft, run the review pipeline, serialize the
/// critique or the failure.
pub async fn review(
    request: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, hyper::Error> {
    let request_id = extract_request_id(&request);
    let span = info_span!("review", component = "review", request_id = %request_id);

    let body = request.collect().await?.to_bytes();
    Ok(handle_review(&body, &state).instrument(span).await)
}

/// Body-bytes-in, response-out core of the handler, split out so tests can
/// drive it without a hyper connection.
pub(crate) async fn handle_review(
    body: &Bytes,
    state: &AppState,
) -> Response<BoxBody<Bytes, hyper::Error>> {
    let draft: ReviewRequest = match serde_json::from_slice(body) {
        Ok(draft) => draft,
        Err(err) => {
            warn!(error = %err, "failed to bind review request");
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({"error": "invalid request"}),
                &state.allowed_origin,
            );
        }
    };

    match state.review_service.analyze_content(&draft).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => json_response(StatusCode::OK, &value, &state.allowed_origin),
            Err(err) => {
                warn!(error = %err, "failed to serialize review result");
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &json!({"error": "analysis failed", "detail": err.to_string()}),
                    &state.allowed_origin,
                )
            }
        },
        Err(err) => {
            let detail = error_chain(&err).join(": ");
            warn!(error = %detail, "review pipeline failed");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({"error": "analysis failed", "detail": detail}),
                &state.allowed_origin,
            )
        }
    }
}

/// Flatten an error and its sources into one human-readable chain.
fn error_chain<E: std::error::Error>(err: &E) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current: &dyn std::error::Error = err;
    loop {
        chain.push(current.to_string());
        match current.source() {
            Some(source) => current = source,
            None => break,
        }
    }
    chain
}
