//! LLM backends behind the [`TextGenerator`] boundary.
//!
//! Enum dispatch over the supported HTTP APIs, all driven through
//! `reqwest`. Ollama's native `/api/generate` is the default;
//! `OpenAI`-compatible chat completions and the Anthropic Messages API are
//! available for hosted models. The `stub` backend replays canned text for offline
//! runs.

use std::future::Future;
use std::time::Duration;

use kommunity_core::config::LlmConfig;
use kommunity_core::{CannedGenerator, GeneratorError, TextGenerator};

use crate::error::RunnerError;

/// Responses the stub backend cycles through.
const STUB_RESPONSES: [&str; 4] = [
    "What is one tool you adopted this year that changed how you work?",
    "I think the answer depends on how often the team revisits its own assumptions.",
    "Which habit from your first job do you still rely on today?",
    "Good point, though I would add that documentation ages faster than code.",
];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Supported backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Ollama native `/api/generate`.
    Ollama,
    /// `OpenAI`-compatible chat completions.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Canned responses, no network.
    Stub,
}

impl BackendKind {
    /// Parse the `llm.backend` config value.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Backend`] for an unknown name.
    pub fn parse(name: &str) -> Result<Self, RunnerError> {
        match name.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "deepseek" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "stub" | "canned" => Ok(Self::Stub),
            other => Err(RunnerError::Backend(format!("unknown backend type: {other}"))),
        }
    }
}

/// Connection settings shared by the HTTP backends.
#[derive(Debug)]
struct HttpSettings {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl HttpSettings {
    fn new(config: &LlmConfig) -> Result<Self, RunnerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| RunnerError::Backend(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    async fn post_json(
        &self,
        request: reqwest::RequestBuilder,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, GeneratorError> {
        let response = request
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(format!("{e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body: error_body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GeneratorError::MalformedResponse(format!("response parse failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// A configured text-generation backend.
#[derive(Debug)]
pub enum LlmBackend {
    /// Ollama native API.
    Ollama(OllamaBackend),
    /// `OpenAI`-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
    /// Canned responses.
    Stub(CannedGenerator),
}

impl LlmBackend {
    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Ollama(_) => "ollama",
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
            Self::Stub(_) => "stub",
        }
    }

    /// Cheap reachability probe.
    ///
    /// Only Ollama exposes an unauthenticated endpoint for this
    /// (`GET /api/tags`); the other backends report healthy.
    ///
    /// # Errors
    ///
    /// Returns a [`GeneratorError`] if the Ollama server cannot be reached
    /// or answers with a non-success status.
    pub async fn health_check(&self) -> Result<(), GeneratorError> {
        match self {
            Self::Ollama(backend) => backend.health_check().await,
            Self::OpenAi(_) | Self::Anthropic(_) | Self::Stub(_) => Ok(()),
        }
    }
}

impl TextGenerator for LlmBackend {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GeneratorError>> + Send {
        async move {
            match self {
                Self::Ollama(backend) => backend.complete(prompt).await,
                Self::OpenAi(backend) => backend.complete(prompt).await,
                Self::Anthropic(backend) => backend.complete(prompt).await,
                Self::Stub(canned) => canned.generate(prompt).await,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Ollama
// ---------------------------------------------------------------------------

/// Backend for Ollama's native generate endpoint.
///
/// Sends non-streaming requests to `{api_url}/api/generate`.
#[derive(Debug)]
pub struct OllamaBackend {
    http: HttpSettings,
}

impl OllamaBackend {
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = format!("{}/api/generate", self.http.api_url);
        let body = serde_json::json!({
            "model": self.http.model,
            "prompt": prompt,
            "stream": false,
        });

        let started = std::time::Instant::now();
        tracing::debug!(model = %self.http.model, "ollama generate request started");
        let json = self.http.post_json(self.http.client.post(&url), &body).await?;
        tracing::debug!(
            model = %self.http.model,
            elapsed_ms = started.elapsed().as_millis(),
            "ollama generate request finished"
        );

        extract_ollama_content(&json)
    }

    async fn health_check(&self) -> Result<(), GeneratorError> {
        let url = format!("{}/api/tags", self.http.api_url);
        let response = self
            .http
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(format!("{e}")))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(GeneratorError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }
}

/// Extract the generated text from an Ollama generate response.
fn extract_ollama_content(json: &serde_json::Value) -> Result<String, GeneratorError> {
    json.get("response")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            GeneratorError::MalformedResponse("Ollama response missing `response`".to_owned())
        })
}

// ---------------------------------------------------------------------------
// OpenAI-compatible
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions`.
#[derive(Debug)]
pub struct OpenAiBackend {
    http: HttpSettings,
}

impl OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = format!("{}/chat/completions", self.http.api_url);
        let body = serde_json::json!({
            "model": self.http.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.7,
            "max_tokens": self.http.max_tokens,
        });

        let request = self
            .http
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.http.api_key));
        let json = self.http.post_json(request, &body).await?;
        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, GeneratorError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            GeneratorError::MalformedResponse(
                "OpenAI response missing choices[0].message.content".to_owned(),
            )
        })
}

// ---------------------------------------------------------------------------
// Anthropic
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Uses the `x-api-key` header and reads `content[0].text`.
#[derive(Debug)]
pub struct AnthropicBackend {
    http: HttpSettings,
}

impl AnthropicBackend {
    async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = format!("{}/messages", self.http.api_url);
        let body = serde_json::json!({
            "model": self.http.model,
            "max_tokens": self.http.max_tokens,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let request = self
            .http
            .client
            .post(&url)
            .header("x-api-key", &self.http.api_key)
            .header("anthropic-version", "2023-06-01");
        let json = self.http.post_json(request, &body).await?;
        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, GeneratorError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            GeneratorError::MalformedResponse("Anthropic response missing content[0].text".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create the backend named by `config.backend`.
///
/// # Errors
///
/// Returns [`RunnerError::Backend`] for an unknown backend name or if the
/// HTTP client cannot be built.
pub fn create_backend(config: &LlmConfig) -> Result<LlmBackend, RunnerError> {
    let backend = match BackendKind::parse(&config.backend)? {
        BackendKind::Ollama => LlmBackend::Ollama(OllamaBackend {
            http: HttpSettings::new(config)?,
        }),
        BackendKind::OpenAi => LlmBackend::OpenAi(OpenAiBackend {
            http: HttpSettings::new(config)?,
        }),
        BackendKind::Anthropic => LlmBackend::Anthropic(AnthropicBackend {
            http: HttpSettings::new(config)?,
        }),
        BackendKind::Stub => LlmBackend::Stub(CannedGenerator::new(STUB_RESPONSES)),
    };
    Ok(backend)
}
