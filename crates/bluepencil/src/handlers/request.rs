use hyper::Request;

/// Extract the caller-assigned request id, or mint a UUID v4 for this request.
pub fn extract_request_id<T>(request: &Request<T>) -> String {
    request
        .headers()
        .get(common::consts::REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_value_wins_over_a_minted_id() {
        let request = Request::builder()
            .header("x-request-id", "req-42")
            .body(())
            .unwrap();
        assert_eq!(extract_request_id(&request), "req-42");
    }

    #[test]
    fn missing_header_mints_a_uuid() {
        let request = Request::builder().body(()).unwrap();
        let id = extract_request_id(&request);
        assert_eq!(id.len(), 36);
    }
}
