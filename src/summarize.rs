/// AI summaries of snippet code (OpenAI-compatible chat completions)
use crate::config::Config;
use crate::error::SummarizeError;
use reqwest::Client;
use serde_json::{Value, json};

const SYSTEM_PROMPT: &str =
    "You summarize code snippets. Reply with one or two plain sentences describing what the code does.";

/// Cap on how much code goes into one request
const MAX_CODE_CHARS: usize = 12_000;

#[derive(Clone, Debug)]
pub struct Summarizer {
    http: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl Summarizer {
    pub fn from_config(config: &Config) -> Self {
        Summarizer {
            http: Client::new(),
            api_key: config.summary_api_key().map(str::to_string),
            endpoint: config.summary_endpoint(),
            model: config.summary_model().to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn summarize(&self, code: &str, language: &str) -> Result<String, SummarizeError> {
        let api_key = self.api_key.as_deref().ok_or(SummarizeError::NotConfigured)?;
        let body = self.request_body(code, language);

        log::debug!("Requesting summary from {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| SummarizeError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SummarizeError::Request(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|_| SummarizeError::UnexpectedResponse)?;

        extract_summary(&data)
    }

    fn request_body(&self, code: &str, language: &str) -> Value {
        let code: String = code.chars().take(MAX_CODE_CHARS).collect();
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("Language: {}\n\n{}", language, code) },
            ],
        })
    }
}

fn extract_summary(data: &Value) -> Result<String, SummarizeError> {
    data["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(SummarizeError::UnexpectedResponse)
}

/// Notes with the summary appended on its own paragraph
pub fn append_summary(notes: &str, summary: &str) -> String {
    let notes = notes.trim_end();
    if notes.is_empty() {
        format!("Summary: {}", summary)
    } else {
        format!("{}\n\nSummary: {}", notes, summary)
    }
}
