use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, ProviderCredentials};

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider returned {0}: {1}")]
    Status(StatusCode, String),
    #[error("provider response did not contain any text")]
    EmptyAnswer,
}

/// A generative-text provider: prompt in, free-form text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// First configured provider wins.
pub fn select_generator(
    candidates: Vec<Option<Arc<dyn TextGenerator>>>,
) -> Option<Arc<dyn TextGenerator>> {
    candidates.into_iter().flatten().next()
}

/// Builds the provider chain from configuration: Groq, then Gemini.
pub fn generator_from_config(config: &AppConfig) -> Result<Option<Arc<dyn TextGenerator>>, LlmError> {
    let http = reqwest::Client::builder()
        .timeout(config.llm_timeout)
        .build()?;

    let groq = config.groq.clone().map(|credentials| {
        Arc::new(GroqGenerator::new(http.clone(), credentials)) as Arc<dyn TextGenerator>
    });
    let gemini = config.gemini.clone().map(|credentials| {
        Arc::new(GeminiGenerator::new(http.clone(), credentials)) as Arc<dyn TextGenerator>
    });

    Ok(select_generator(vec![groq, gemini]))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let detail = response.text().await.unwrap_or_default();
        Err(LlmError::Status(status, detail))
    }
}

pub struct GroqGenerator {
    http: reqwest::Client,
    credentials: ProviderCredentials,
}

impl GroqGenerator {
    pub fn new(http: reqwest::Client, credentials: ProviderCredentials) -> Self {
        Self { http, credentials }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .find_map(|choice| choice.message.content.map(|c| c.trim().to_string()))
            .filter(|text| !text.is_empty())
    }
}

#[async_trait]
impl TextGenerator for GroqGenerator {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let payload = ChatRequest {
            model: &self.credentials.model,
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = self
            .http
            .post(GROQ_ENDPOINT)
            .bearer_auth(&self.credentials.api_key)
            .json(&payload)
            .send()
            .await?;
        let body: ChatResponse = check_status(response).await?.json().await?;
        let text = body.into_text().ok_or(LlmError::EmptyAnswer)?;

        info!(
            "groq answered with {} chars (model {})",
            text.len(),
            self.credentials.model
        );
        Ok(text)
    }
}

pub struct GeminiGenerator {
    http: reqwest::Client,
    credentials: ProviderCredentials,
}

impl GeminiGenerator {
    pub fn new(http: reqwest::Client, credentials: ProviderCredentials) -> Self {
        Self { http, credentials }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.credentials.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: [GeminiPart<'a>; 1],
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    parts: Option<Vec<GeminiCandidatePart>>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

impl GeminiResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .find_map(|content| {
                let text: String = content
                    .parts
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect();
                let text = text.trim().to_string();
                (!text.is_empty()).then_some(text)
            })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let payload = GeminiRequest {
            contents: [GeminiContent {
                role: "user",
                parts: [GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.credentials.api_key.as_str())
            .json(&payload)
            .send()
            .await?;
        let body: GeminiResponse = check_status(response).await?.json().await?;
        let text = body.into_text().ok_or(LlmError::EmptyAnswer)?;

        info!(
            "gemini answered with {} chars (model {})",
            text.len(),
            self.credentials.model
        );
        Ok(text)
    }
}
