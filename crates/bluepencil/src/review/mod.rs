//! Press-release review domain: the entities exchanged with callers, the
//! analysis capability the service composes over, and the orchestrator that
//! ties staging and analysis together.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::media::{MediaError, MediaStager};

pub mod parse;
pub mod rubric;

/// Inbound draft as bound from the request body.
///
/// No length or encoding validation happens here; judging length
/// appropriateness is the model's job, not the service's.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub title: String,
    pub lead_paragraph: String,
    pub body: String,
    /// Empty string means no image.
    #[serde(default)]
    pub main_image_url: String,
}

/// Critique of one content field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReview {
    pub good: String,
    pub improvement: String,
    pub suggestion: String,
}

/// Critique of the main image, echoing the staged public URL so the caller
/// can correlate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReview {
    pub good: String,
    pub improvement: String,
    pub suggestion: String,
    pub url: String,
}

/// The complete critique. Produced whole or not at all; `image` is present
/// exactly when the request supplied an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub title: FieldReview,
    pub lead: FieldReview,
    pub body: FieldReview,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReview>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("completion request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("completion endpoint returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("completion reply contained no content")]
    EmptyReply,

    /// The model replied, but not with a parseable critique. Carries the
    /// normalized reply text for diagnostics.
    #[error("model reply did not match the review schema: {source}")]
    ResponseParse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

/// One round trip to an analysis backend. Implementations must be safe to
/// share across concurrent in-flight requests.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(
        &self,
        request: &ReviewRequest,
        staged_image_url: Option<&str>,
    ) -> Result<ReviewResult, AnalysisError>;
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Composition point between the media stager and the analysis client.
/// Performs no business validation of its own.
pub struct ReviewService {
    client: Arc<dyn AnalysisClient>,
    stager: Arc<dyn MediaStager>,
}

impl ReviewService {
    pub fn new(client: Arc<dyn AnalysisClient>, stager: Arc<dyn MediaStager>) -> Self {
        ReviewService { client, stager }
    }

    /// Stage the image (when one is supplied), then ask the analysis client
    /// for a critique. A staging failure aborts the whole request; there is
    /// no attempt to continue without the image.
    pub async fn analyze_content(
        &self,
        request: &ReviewRequest,
    ) -> Result<ReviewResult, ReviewError> {
        let staged_image_url = if request.main_image_url.is_empty() {
            None
        } else {
            let url = self.stager.stage(&request.main_image_url).await?;
            debug!(source = %request.main_image_url, staged = %url, "image staged");
            Some(url)
        };

        Ok(self
            .client
            .analyze(request, staged_image_url.as_deref())
            .await?)
    }
}
