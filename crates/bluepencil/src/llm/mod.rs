//! Analysis backends: the chat-completions client used in production and the
//! deterministic mock the service can boot with when no credentials are
//! configured.

use async_trait::async_trait;
use common::configuration::CompletionConfig;
use common::consts::CHAT_COMPLETIONS_PATH;
use tracing::{debug, info};

use crate::review::parse::parse_reply;
use crate::review::rubric::build_rubric;
use crate::review::{
    AnalysisClient, AnalysisError, FieldReview, ImageReview, ReviewRequest, ReviewResult,
};

pub mod openai;

use openai::{ChatCompletionsRequest, ChatCompletionsResponse, Message, Role};

/// One blocking round trip per request against an OpenAI-compatible
/// chat-completions endpoint. No streaming, no multi-turn state, no retry.
pub struct OpenAiAnalysisClient {
    client: reqwest::Client,
    completions_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAnalysisClient {
    pub fn new(config: &CompletionConfig, api_key: String) -> Self {
        OpenAiAnalysisClient {
            client: reqwest::Client::new(),
            completions_url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                CHAT_COMPLETIONS_PATH
            ),
            api_key,
            model: config.model.clone(),
        }
    }

    /// POST the prompt and extract `choices[0].message.content`.
    async fn post_and_extract_content(&self, prompt: String) -> Result<String, AnalysisError> {
        let request = ChatCompletionsRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: Role::User,
                content: prompt,
            }],
        };

        let start_time = std::time::Instant::now();
        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(AnalysisError::Upstream)?;

        let status = response.status();
        let body = response.text().await.map_err(AnalysisError::Upstream)?;
        if !status.is_success() {
            return Err(AnalysisError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ChatCompletionsResponse =
            serde_json::from_str(&body).map_err(|source| AnalysisError::ResponseParse {
                source,
                raw: body.clone(),
            })?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AnalysisError::EmptyReply)?;

        info!(
            model = %self.model,
            response_time_ms = start_time.elapsed().as_millis(),
            "completion reply received"
        );
        Ok(content)
    }
}

#[async_trait]
impl AnalysisClient for OpenAiAnalysisClient {
    async fn analyze(
        &self,
        request: &ReviewRequest,
        staged_image_url: Option<&str>,
    ) -> Result<ReviewResult, AnalysisError> {
        let prompt = build_rubric(request, staged_image_url);
        debug!(prompt_chars = prompt.len(), has_image = staged_image_url.is_some(), "sending evaluation prompt");

        let content = self.post_and_extract_content(prompt).await?;
        parse_reply(&content)
    }
}

/// Fixed critique, no network. Selected with `completion.provider: mock`.
pub struct MockAnalysisClient;

#[async_trait]
impl AnalysisClient for MockAnalysisClient {
    async fn analyze(
        &self,
        _request: &ReviewRequest,
        staged_image_url: Option<&str>,
    ) -> Result<ReviewResult, AnalysisError> {
        Ok(ReviewResult {
            title: FieldReview {
                good: "The title names the product directly.".to_string(),
                improvement: "Make the title more concrete.".to_string(),
                suggestion: "Lead with the launch date and the product name.".to_string(),
            },
            lead: FieldReview {
                good: "The lead states the announcement up front.".to_string(),
                improvement: "Cover who, what, when, where, why and how.".to_string(),
                suggestion: "Add the release date and target market to the first sentence."
                    .to_string(),
            },
            body: FieldReview {
                good: "The body follows the announcement logically.".to_string(),
                improvement: "Add background information for persuasiveness.".to_string(),
                suggestion: "Quote a customer or executive to back the claims.".to_string(),
            },
            image: staged_image_url.map(|url| ImageReview {
                good: "The image is relevant to the announcement.".to_string(),
                improvement: "Use a higher-resolution crop.".to_string(),
                suggestion: "Prefer a product close-up without overlaid text.".to_string(),
                url: url.to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::configuration::CompletionProvider;
    use pretty_assertions::assert_eq;

    fn completion_config(base_url: &str) -> CompletionConfig {
        CompletionConfig {
            provider: CompletionProvider::OpenAi,
            base_url: base_url.to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }

    fn draft() -> ReviewRequest {
        ReviewRequest {
            title: "A".to_string(),
            lead_paragraph: "B".to_string(),
            body: "C".to_string(),
            main_image_url: String::new(),
        }
    }

    const CRITIQUE: &str = r#"{
        "title": {"good": "g", "improvement": "i", "suggestion": "s"},
        "lead": {"good": "g", "improvement": "i", "suggestion": "s"},
        "body": {"good": "g", "improvement": "i", "suggestion": "s"}
    }"#;

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn parses_a_well_formed_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(completion_body(CRITIQUE))
            .create_async()
            .await;

        let client = OpenAiAnalysisClient::new(&completion_config(&server.url()), "test-key".into());
        let result = client.analyze(&draft(), None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.title.good, "g");
        assert_eq!(result.image, None);
    }

    #[tokio::test]
    async fn fenced_reply_parses_like_a_bare_one() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion_body(&format!("```json\n{CRITIQUE}\n```")))
            .create_async()
            .await;

        let client = OpenAiAnalysisClient::new(&completion_config(&server.url()), "k".into());
        let result = client.analyze(&draft(), None).await.unwrap();
        assert_eq!(result.body.suggestion, "s");
    }

    #[tokio::test]
    async fn non_2xx_is_an_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = OpenAiAnalysisClient::new(&completion_config(&server.url()), "k".into());
        let err = client.analyze(&draft(), None).await.unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::UpstreamStatus { status: 429, .. }
        ));
    }

    #[tokio::test]
    async fn prose_reply_is_a_parse_failure_with_raw_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion_body("Sure! Here are my thoughts..."))
            .create_async()
            .await;

        let client = OpenAiAnalysisClient::new(&completion_config(&server.url()), "k".into());
        let err = client.analyze(&draft(), None).await.unwrap_err();

        match err {
            AnalysisError::ResponseParse { raw, .. } => {
                assert_eq!(raw, "Sure! Here are my thoughts...");
            }
            other => panic!("expected ResponseParse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_an_empty_reply() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = OpenAiAnalysisClient::new(&completion_config(&server.url()), "k".into());
        let err = client.analyze(&draft(), None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyReply));
    }

    #[tokio::test]
    async fn mock_client_echoes_the_staged_url() {
        let staged = "https://bucket.s3.region.example/key.png";
        let result = MockAnalysisClient
            .analyze(&draft(), Some(staged))
            .await
            .unwrap();
        assert_eq!(result.image.unwrap().url, staged);

        let without = MockAnalysisClient.analyze(&draft(), None).await.unwrap();
        assert_eq!(without.image, None);
    }
}
