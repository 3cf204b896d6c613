use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::FoodEntry;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a meal description could not be resolved into an entry.
///
/// Transient causes (network, timeout, 5xx) are distinguished from
/// permanent ones (bad credential, unusable output) so callers and logs
/// can tell them apart, even though the CLI shows one failure message.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("meal description is empty")]
    BlankInput,
    #[error("nutrition service request timed out")]
    Timeout,
    #[error("could not reach nutrition service: {0}")]
    Network(String),
    #[error("nutrition service error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("nutrition service returned unusable output: {0}")]
    Malformed(String),
}

impl ResolveError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ResolveError::Timeout | ResolveError::Network(_) => true,
            ResolveError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResolveError::Timeout
        } else {
            ResolveError::Network(e.to_string())
        }
    }
}

/// Turns a free-text meal description into a macro estimate via an
/// OpenAI-style chat completions endpoint. The base URL is injectable so
/// tests can point it at a local stub.
pub struct MealResolver {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// The exact shape the service is instructed to return.
#[derive(Deserialize)]
struct MacroEstimate {
    food_name: String,
    calories: i64,
    protein: i64,
}

impl MealResolver {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ResolveError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Resolves a description to a not-yet-persisted entry (id 0,
    /// `logged_at` = now). Never panics across this boundary: every
    /// failure comes back as a `ResolveError`.
    pub async fn resolve(
        &self,
        description: &str,
        api_key: &str,
    ) -> Result<FoodEntry, ResolveError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ResolveError::BlankInput);
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: extraction_prompt(description),
            }],
            temperature: 0.0,
        };
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let err = ResolveError::from_reqwest(e);
                tracing::warn!(error = %err, "nutrition service unreachable");
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                "nutrition service rejected request"
            );
            return Err(ResolveError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "nutrition service reply was not a completion");
            ResolveError::Malformed(e.to_string())
        })?;
        let content = reply
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        let estimate = parse_estimate(content).inspect_err(|e| {
            tracing::warn!(error = %e, "nutrition service output failed validation");
        })?;

        Ok(FoodEntry::new(
            estimate.food_name,
            estimate.calories,
            estimate.protein,
        ))
    }
}

fn extraction_prompt(description: &str) -> String {
    format!(
        "Estimate the nutrition for the meal described below. Respond with only a JSON object \
         with exactly these fields: \"food_name\" (string), \"calories\" (integer, kcal), \
         \"protein\" (integer, grams). Do not wrap the object in prose or markdown.\n\n\
         Meal: {}",
        description
    )
}

fn parse_estimate(raw: &str) -> Result<MacroEstimate, ResolveError> {
    let body = strip_code_fences(raw);
    let estimate: MacroEstimate = serde_json::from_str(body)
        .map_err(|e| ResolveError::Malformed(format!("bad JSON: {}", e)))?;

    if estimate.food_name.trim().is_empty() {
        return Err(ResolveError::Malformed("empty food name".to_string()));
    }
    if estimate.calories < 0 || estimate.protein < 0 {
        return Err(ResolveError::Malformed(
            "negative macro value".to_string(),
        ));
    }

    Ok(estimate)
}

/// The model sometimes wraps its JSON in a fenced code block.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
