use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::header::HeaderValue;
use hyper::{Response, StatusCode};

/// An empty HTTP body (used for 404 / OPTIONS responses).
pub fn empty() -> BoxBody<Bytes, hyper::Error> {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, hyper::Error> {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Build a JSON response with the CORS origin attached.
pub fn json_response(
    status: StatusCode,
    body: &serde_json::Value,
    allowed_origin: &str,
) -> Response<BoxBody<Bytes, hyper::Error>> {
    let origin = HeaderValue::from_str(allowed_origin)
        .unwrap_or_else(|_| HeaderValue::from_static("*"));

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("Access-Control-Allow-Origin", origin)
        .body(full(body.to_string()))
        .unwrap_or_else(|_| Response::new(full("Internal Error")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_response_carries_content_type_and_origin() {
        let response = json_response(
            StatusCode::OK,
            &json!({"message": "pong"}),
            "https://newsroom.example",
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Origin")
                .unwrap(),
            "https://newsroom.example"
        );
    }
}
