use async_trait::async_trait;
use futures::{StreamExt, stream};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::ndjson::{self, LineStream};
use crate::domain::{
    DomainError, ModelConfig, ModelEndpoint, PullProgress, PullStream, RawModelResponse,
};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Ollama-compatible model endpoint
#[derive(Debug)]
pub struct OllamaEndpoint<C: HttpClientTrait> {
    client: C,
    base_url: String,
    list_timeout: Duration,
}

impl<C: HttpClientTrait> OllamaEndpoint<C> {
    pub fn new(client: C) -> Self {
        Self::with_base_url(client, DEFAULT_OLLAMA_BASE_URL)
    }

    pub fn with_base_url(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            list_timeout: DEFAULT_LIST_TIMEOUT,
        }
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn pull_url(&self) -> String {
        format!("{}/api/pull", self.base_url)
    }

    fn build_generate_request(&self, model: &ModelConfig, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": model.name(),
            "prompt": prompt,
            "stream": false,
            "options": model.sampling_options(),
        })
    }

    fn parse_generate_response(
        &self,
        model: &ModelConfig,
        json: serde_json::Value,
        elapsed: Duration,
    ) -> Result<RawModelResponse, DomainError> {
        let response: OllamaGenerateResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::generation(model.name(), format!("Failed to parse response: {}", e))
        })?;

        if let Some(error) = response.error {
            return Err(DomainError::generation(model.name(), error));
        }

        let raw = RawModelResponse::new(model.name(), response.response, elapsed);
        Ok(match (response.prompt_eval_count, response.eval_count) {
            (Some(prompt), Some(completion)) => raw.with_token_counts(prompt, completion),
            _ => raw,
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> ModelEndpoint for OllamaEndpoint<C> {
    async fn list_models(&self) -> Result<BTreeSet<String>, DomainError> {
        let json = self
            .client
            .get_json(&self.tags_url(), Some(self.list_timeout))
            .await?;

        let tags: OllamaTagsResponse = serde_json::from_value(json)
            .map_err(|e| DomainError::transport(format!("Failed to parse model list: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(
        &self,
        model: &ModelConfig,
        prompt: &str,
        timeout: Duration,
    ) -> Result<RawModelResponse, DomainError> {
        let body = self.build_generate_request(model, prompt);
        let started = Instant::now();

        let json = self
            .client
            .post_json(&self.generate_url(), &body, Some(timeout))
            .await
            .map_err(|e| DomainError::generation(model.name(), e.to_string()))?;

        self.parse_generate_response(model, json, started.elapsed())
    }

    async fn pull_model(&self, model: &str) -> Result<PullStream, DomainError> {
        let body = serde_json::json!({ "name": model, "stream": true });
        let bytes = self
            .client
            .post_json_stream(&self.pull_url(), &body)
            .await
            .map_err(|e| DomainError::pull(model, e.to_string()))?;

        Ok(pull_events(model, ndjson::lines(bytes)))
    }

    fn location(&self) -> &str {
        &self.base_url
    }
}

struct PullCursor {
    model: String,
    lines: LineStream,
    done: bool,
}

/// Map status lines to progress events, ending after success or the first failure
fn pull_events(model: &str, lines: LineStream) -> PullStream {
    let cursor = PullCursor {
        model: model.to_string(),
        lines,
        done: false,
    };

    let stream = stream::unfold(cursor, |mut cursor| async move {
        if cursor.done {
            return None;
        }

        loop {
            let item = match cursor.lines.next().await {
                Some(Ok(line)) => match parse_pull_line(&cursor.model, &line) {
                    Some(item) => item,
                    None => continue,
                },
                Some(Err(e)) => Err(DomainError::pull(&cursor.model, e.to_string())),
                None => Err(DomainError::pull(
                    &cursor.model,
                    "connection closed before the pull completed",
                )),
            };

            cursor.done = match &item {
                Ok(progress) => progress.is_success(),
                Err(_) => true,
            };
            return Some((item, cursor));
        }
    });

    Box::pin(stream)
}

fn parse_pull_line(model: &str, line: &str) -> Option<Result<PullProgress, DomainError>> {
    let parsed: OllamaPullLine = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(model = %model, line = %line, error = %e, "Skipping unparsable pull line");
            return None;
        }
    };

    if let Some(error) = parsed.error {
        return Some(Err(DomainError::pull(model, error)));
    }

    let mut progress =
        PullProgress::new(parsed.status.unwrap_or_default()).with_bytes(parsed.completed, parsed.total);
    if let Some(digest) = parsed.digest {
        progress = progress.with_digest(digest);
    }

    Some(Ok(progress))
}

// Ollama API types

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelEntry>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaPullLine {
    status: Option<String>,
    digest: Option<String>,
    total: Option<u64>,
    completed: Option<u64>,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PullState;
    use crate::infrastructure::endpoint::http_client::mock::{MockFailure, MockHttpClient};
    use bytes::Bytes;

    const TAGS_URL: &str = "http://localhost:11434/api/tags";
    const GENERATE_URL: &str = "http://localhost:11434/api/generate";
    const PULL_URL: &str = "http://localhost:11434/api/pull";
    const TIMEOUT: Duration = Duration::from_secs(30);

    async fn collect(stream: PullStream) -> Vec<Result<PullProgress, DomainError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_list_models() {
        let client = MockHttpClient::new().with_response(
            TAGS_URL,
            serde_json::json!({
                "models": [
                    { "name": "llama3:8b", "size": 4661224676u64 },
                    { "name": "mistral:latest" }
                ]
            }),
        );
        let endpoint = OllamaEndpoint::new(client);

        let models = endpoint.list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert!(models.contains("llama3:8b"));
        assert!(models.contains("mistral:latest"));
    }

    #[tokio::test]
    async fn test_list_models_keeps_unreachable() {
        let client = MockHttpClient::new().with_error(TAGS_URL, MockFailure::Unreachable);
        let endpoint = OllamaEndpoint::new(client);

        let error = endpoint.list_models().await.unwrap_err();
        assert!(error.is_unreachable());
    }

    #[tokio::test]
    async fn test_generate_request_shape() {
        let client = MockHttpClient::new().with_response(
            GENERATE_URL,
            serde_json::json!({ "response": "{\"answer\": true}", "done": true }),
        );
        let endpoint = OllamaEndpoint::new(client);
        let model = ModelConfig::new("llama3", 0.2).with_top_k(40);

        let response = endpoint.generate(&model, "Is water wet?", TIMEOUT).await.unwrap();
        assert_eq!(response.text, "{\"answer\": true}");
        assert_eq!(response.model, "llama3");
        assert_eq!(response.eval_count, None);

        let requests = endpoint.client.requests();
        assert_eq!(requests.len(), 1);
        let (url, body) = &requests[0];
        assert_eq!(url, GENERATE_URL);
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["prompt"], "Is water wet?");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["top_k"], 40);
        assert!(body["options"]["temperature"].is_number());
    }

    #[tokio::test]
    async fn test_generate_token_counts() {
        let client = MockHttpClient::new().with_response(
            GENERATE_URL,
            serde_json::json!({
                "response": "yes",
                "prompt_eval_count": 26,
                "eval_count": 4
            }),
        );
        let endpoint = OllamaEndpoint::new(client);

        let response = endpoint
            .generate(&ModelConfig::new("llama3", 0.0), "prompt", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(response.prompt_eval_count, Some(26));
        assert_eq!(response.eval_count, Some(4));
    }

    #[tokio::test]
    async fn test_generate_wraps_failures() {
        let client = MockHttpClient::new().with_error(
            GENERATE_URL,
            MockFailure::Status(404, "model 'ghost' not found".to_string()),
        );
        let endpoint = OllamaEndpoint::new(client);

        let error = endpoint
            .generate(&ModelConfig::new("ghost", 0.0), "prompt", TIMEOUT)
            .await
            .unwrap_err();
        match error {
            DomainError::Generation { model, message } => {
                assert_eq!(model, "ghost");
                assert!(message.contains("404"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_pull_reassembles_and_stops_at_success() {
        let client = MockHttpClient::new().with_stream_response(
            PULL_URL,
            vec![
                Bytes::from_static(b"{\"status\":\"pulling manifest\"}\n{\"status\":\"pulling 6a0746a1ec1a\","),
                Bytes::from_static(b"\"digest\":\"sha256:6a07\",\"total\":200,\"completed\":50}\n\n"),
                Bytes::from_static(b"{\"status\":\"success\"}\n{\"status\":\"ignored\"}\n"),
            ],
        );
        let endpoint = OllamaEndpoint::new(client);

        let events = collect(endpoint.pull_model("llama3").await.unwrap()).await;
        let events: Vec<PullProgress> = events.into_iter().map(|e| e.unwrap()).collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].state(), PullState::Indeterminate);
        assert_eq!(events[1].digest.as_deref(), Some("sha256:6a07"));
        assert_eq!(events[1].state(), PullState::Determinate(0.25));
        assert_eq!(events[2].state(), PullState::Complete);

        let (_, body) = &endpoint.client.requests()[0];
        assert_eq!(body, &serde_json::json!({ "name": "llama3", "stream": true }));
    }

    #[tokio::test]
    async fn test_pull_error_line_fails_the_pull() {
        let client = MockHttpClient::new().with_stream_response(
            PULL_URL,
            vec![Bytes::from_static(
                b"{\"status\":\"pulling manifest\"}\n{\"error\":\"pull model manifest: file does not exist\"}\n{\"status\":\"success\"}\n",
            )],
        );
        let endpoint = OllamaEndpoint::new(client);

        let events = collect(endpoint.pull_model("ghost").await.unwrap()).await;
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        match &events[1] {
            Err(DomainError::Pull { model, message }) => {
                assert_eq!(model, "ghost");
                assert!(message.contains("file does not exist"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pull_skips_unparsable_lines() {
        let client = MockHttpClient::new().with_stream_response(
            PULL_URL,
            vec![Bytes::from_static(b"not json\n{\"status\":\"success\"}\n")],
        );
        let endpoint = OllamaEndpoint::new(client);

        let events = collect(endpoint.pull_model("llama3").await.unwrap()).await;
        assert_eq!(events.len(), 1);
        assert!(events[0].as_ref().unwrap().is_success());
    }

    #[tokio::test]
    async fn test_pull_truncated_stream_is_an_error() {
        let client = MockHttpClient::new().with_stream_response(
            PULL_URL,
            vec![Bytes::from_static(b"{\"status\":\"pulling manifest\"}\n")],
        );
        let endpoint = OllamaEndpoint::new(client);

        let events = collect(endpoint.pull_model("llama3").await.unwrap()).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Err(DomainError::Pull { .. })));
    }

    #[tokio::test]
    async fn test_pull_transport_error_is_wrapped() {
        let client = MockHttpClient::new().with_broken_stream(
            PULL_URL,
            vec![Bytes::from_static(b"{\"status\":\"pulling manifest\"}\n")],
            "connection reset",
        );
        let endpoint = OllamaEndpoint::new(client);

        let events = collect(endpoint.pull_model("llama3").await.unwrap()).await;
        assert_eq!(events.len(), 2);
        match &events[1] {
            Err(DomainError::Pull { message, .. }) => assert!(message.contains("connection reset")),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pull_rejected_request() {
        let client = MockHttpClient::new()
            .with_error(PULL_URL, MockFailure::Status(500, "disk full".to_string()));
        let endpoint = OllamaEndpoint::new(client);

        let error = endpoint.pull_model("llama3").await.err().unwrap();
        assert!(matches!(error, DomainError::Pull { .. }));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let endpoint = OllamaEndpoint::with_base_url(MockHttpClient::new(), "http://gpu-box:11434/");
        assert_eq!(endpoint.location(), "http://gpu-box:11434");
        assert_eq!(endpoint.tags_url(), "http://gpu-box:11434/api/tags");
    }
}
