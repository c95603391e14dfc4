//! AI summarization collaborator.
//!
//! The pipeline hands the day's normalized emails to a [`Summarizer`]
//! and expects a rendered HTML report back. Any failure is a signal to
//! fall back to the deterministic classifier report, never a reason to
//! abort the run.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DigestConfig;
use crate::error::SummarizerError;
use crate::types::NormalizedEmail;

/// How much of each body goes into the prompt.
const PROMPT_BODY_CHARS: usize = 2000;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Turn the day's emails into a rendered HTML report.
    async fn summarize(&self, emails: &[NormalizedEmail]) -> Result<String, SummarizerError>;
}

/// Summarizer backed by Gemini's `generateContent` REST endpoint.
pub struct GeminiSummarizer {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(config.gemini_api_key.clone(), config.gemini_model.clone())
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, emails: &[NormalizedEmail]) -> Result<String, SummarizerError> {
        info!(count = emails.len(), model = %self.model, "requesting AI summary");

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(emails),
                }],
            }],
        };

        let url = format!("{GEMINI_ENDPOINT}/{}:generateContent", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::RequestFailed {
                provider: "gemini".to_string(),
                reason: format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        first_candidate_text(parsed).ok_or(SummarizerError::EmptyResponse {
            provider: "gemini".to_string(),
        })
    }
}

/// Assemble the summarization prompt: instructions plus one block per
/// email, bodies truncated to a bounded length.
fn build_prompt(emails: &[NormalizedEmail]) -> String {
    let mut blocks = String::new();
    for (i, email) in emails.iter().enumerate() {
        let body: String = email.body.chars().take(PROMPT_BODY_CHARS).collect();
        let body = if body.is_empty() {
            "(no body content)".to_string()
        } else {
            body
        };
        blocks.push_str(&format!(
            "\n========== Email {n} ==========\n\
             Subject: {subject}\n\
             From: {from}\n\
             Received: {time}\n\
             Body:\n{body}\n\
             ===============================\n",
            n = i + 1,
            subject = email.subject,
            from = email.from,
            time = email.local_time_display(),
            body = body,
        ));
    }

    format!(
        "You are a professional email triage assistant. Analyze the {count} \
         emails received today and produce a practical digest report.\n\
         \n\
         Today's emails:\n{blocks}\n\
         Produce an HTML report with these sections:\n\
         1. Overview: total count and the main categories seen today.\n\
         2. Priority tiers: high (bills, security and system notices, work), \
         medium (worth a look, not urgent), low (marketing and promotions). \
         List each email under its tier with subject, sender and a 30-50 word \
         summary of its content.\n\
         3. Action items: payments due, messages needing a reply, links or \
         attachments to review.\n\
         \n\
         Use clean modern CSS, keep it concise, and base every summary on the \
         body content rather than the subject alone. Output the HTML only, \
         with no explanatory text around it.",
        count = emails.len(),
        blocks = blocks,
    )
}

fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| {
            candidate
                .content?
                .parts
                .into_iter()
                .map(|part| part.text)
                .find(|text| !text.trim().is_empty())
        })
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
