//! `InferenceGateway` over the OpenAI-compatible completions API.
//!
//! Speaks the protocol served by llama.cpp's server and LM Studio:
//!
//! - `GET  {base}/v1/models`: readiness check
//! - `POST {base}/v1/completions`: one completion, `choices[0].text`
//!
//! The client is blocking. Call it from a plain thread or from
//! `tokio::task::spawn_blocking`, never directly on an async worker.

use std::time::Duration;

use reqwest::{blocking::Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use aiminer_contracts::{
    error::{BrainError, BrainResult},
    inference::InferenceRequest,
};
use aiminer_core::traits::InferenceGateway;

use crate::config::GatewayConfig;

/// Body of `POST /v1/completions`.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stop: &'a [String],
    echo: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

/// Blocking HTTP client for an OpenAI-compatible completion server.
#[derive(Debug, Clone)]
pub struct CompletionsGateway {
    config: GatewayConfig,
    base_url: String,
    client: Client,
}

impl CompletionsGateway {
    /// Build the HTTP client with the configured timeouts.
    ///
    /// Returns `BrainError::ConfigError` if the client cannot be constructed
    /// (for example when TLS initialisation fails).
    pub fn new(config: GatewayConfig) -> BrainResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BrainError::ConfigError {
                reason: format!("failed to build inference HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }

    fn with_auth(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    pub(crate) fn request_body<'a>(&'a self, request: &'a InferenceRequest) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            max_tokens: request.sampling.max_tokens,
            temperature: request.sampling.temperature,
            top_p: request.sampling.top_p,
            stop: &request.sampling.stop,
            echo: request.sampling.echo,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> BrainError {
        if e.is_connect() {
            BrainError::GatewayUnavailable {
                reason: format!("cannot reach {}: {e}", self.base_url),
            }
        } else {
            BrainError::Inference {
                reason: format!("completion request failed: {e}"),
            }
        }
    }
}

/// Pull `choices[0].text` out of a completion response.
pub(crate) fn first_choice(response: CompletionResponse) -> BrainResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or_else(|| BrainError::Inference {
            reason: "completion response has no choices".to_string(),
        })
}

impl InferenceGateway for CompletionsGateway {
    fn is_ready(&self) -> bool {
        let url = self.endpoint("models");
        match self.with_auth(self.client.get(&url)).send() {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "inference server not ready");
                false
            }
            Err(e) => {
                debug!(url = %url, error = %e, "inference server unreachable");
                false
            }
        }
    }

    fn infer(&self, request: &InferenceRequest) -> BrainResult<String> {
        let url = self.endpoint("completions");
        debug!(
            url = %url,
            model = %self.config.model,
            max_tokens = request.sampling.max_tokens,
            "requesting completion"
        );

        let response = self
            .with_auth(self.client.post(&url))
            .json(&self.request_body(request))
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(url = %url, status = %status, "completion request rejected");
            let reason = format!("completion server returned {status}: {body}");
            return Err(if status == StatusCode::SERVICE_UNAVAILABLE {
                BrainError::GatewayUnavailable { reason }
            } else {
                BrainError::Inference { reason }
            });
        }

        let parsed: CompletionResponse = response.json().map_err(|e| BrainError::Inference {
            reason: format!("failed to decode completion response: {e}"),
        })?;
        first_choice(parsed)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.base_url, self.config.model)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use aiminer_contracts::{
        error::BrainError,
        inference::{InferenceRequest, SamplingConfig},
    };
    use aiminer_core::traits::InferenceGateway;

    use super::{first_choice, CompletionResponse, CompletionsGateway};
    use crate::config::GatewayConfig;

    fn gateway(base_url: &str) -> CompletionsGateway {
        CompletionsGateway::new(GatewayConfig {
            base_url: base_url.to_string(),
            connect_timeout_secs: 2,
            request_timeout_secs: 5,
            ..GatewayConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_carries_fixed_sampling() {
        let gw = gateway("http://127.0.0.1:1234");
        let request = InferenceRequest::new("Your response:", SamplingConfig::default());

        let body = serde_json::to_value(gw.request_body(&request)).unwrap();

        assert_eq!(body["model"], json!("local-model"));
        assert_eq!(body["prompt"], json!("Your response:"));
        assert_eq!(body["max_tokens"], json!(128));
        assert_eq!(body["stop"], json!(["\n"]));
        assert_eq!(body["echo"], json!(false));
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((body["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_first_choice_text_extracted() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "id": "cmpl-1",
            "object": "text_completion",
            "choices": [ { "text": " MOVE_TO 1 2 3", "index": 0 }, { "text": "WAIT" } ]
        }))
        .unwrap();

        assert_eq!(first_choice(response).unwrap(), " MOVE_TO 1 2 3");
    }

    #[test]
    fn test_empty_choices_is_inference_error() {
        let response: CompletionResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(first_choice(response), Err(BrainError::Inference { .. })));
    }

    #[test]
    fn test_trailing_slash_trimmed_from_base_url() {
        let gw = gateway("http://localhost:8081/");
        assert_eq!(gw.endpoint("completions"), "http://localhost:8081/v1/completions");
        assert_eq!(gw.describe(), "http://localhost:8081 (local-model)");
    }

    /// Nothing listens on port 1, so the connection is refused outright.
    #[test]
    fn test_unreachable_server_is_not_ready_and_unavailable() {
        let gw = gateway("http://127.0.0.1:1");

        assert!(!gw.is_ready());

        let request = InferenceRequest::new("prompt", SamplingConfig::default());
        assert!(matches!(gw.infer(&request), Err(BrainError::GatewayUnavailable { .. })));
    }
}
