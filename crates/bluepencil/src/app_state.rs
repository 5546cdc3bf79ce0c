use std::sync::Arc;

use crate::review::ReviewService;

/// Shared application state bundled into a single Arc-wrapped struct.
///
/// One `Arc<AppState>` is cloned per connection and passed to the request
/// handlers; everything inside is read-only after startup.
pub struct AppState {
    pub review_service: Arc<ReviewService>,
    /// Origin echoed in `Access-Control-Allow-Origin` on every response.
    pub allowed_origin: String,
}
