use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Response, StatusCode};
use serde_json::json;

use super::response::json_response;

/// Liveness probe.
pub fn ping(allowed_origin: &str) -> Response<BoxBody<Bytes, hyper::Error>> {
    json_response(StatusCode::OK, &json!({"message": "pong"}), allowed_origin)
}
