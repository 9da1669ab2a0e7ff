use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::application::usecases::chat::ChatGateway;
use crate::domain::value_objects::chat::{ChatRole, ChatTurn};

const SYSTEM_PROMPT: &str = "You are a programming assistant. Your focus is \
precise, clear and detailed answers about programming, software development, \
algorithms, frameworks, languages and coding best practices. Explain complex \
concepts step by step with commented code examples where possible, help debug \
code and explain the cause of errors, and keep a professional, patient and \
encouraging tone. If a question is not about programming, politely say that \
you can only help with programming topics.";

/// Minimal Gemini client built on reqwest. One generateContent call per chat
/// turn; the conversation history is flattened into the prompt.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "gemini api request failed"
        );

        anyhow::bail!("Gemini API request failed: {} (status {})", context, status);
    }

    fn build_prompt(message: &str, history: &[ChatTurn]) -> String {
        let mut prompt = String::from(SYSTEM_PROMPT);

        if !history.is_empty() {
            prompt.push_str("\n\nConversation so far:\n");
            for turn in history {
                let speaker = match turn.role {
                    ChatRole::User => "User",
                    ChatRole::Assistant => "Assistant",
                };
                prompt.push_str(&format!("{}: {}\n\n", speaker, turn.content));
            }
        }

        prompt.push_str(&format!("\nUser: {}\n\nAssistant:", message));
        prompt
    }

    pub async fn generate(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(message, history),
                }],
            }],
        };

        let resp = self.http.post(&url).json(&request).send().await?;
        let resp = Self::ensure_success(resp, "generate content").await?;

        let parsed: GenerateContentResponse = resp.json().await?;
        let text = parsed
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.clone())
            .ok_or_else(|| anyhow::anyhow!("Gemini response contained no candidates"))?;

        Ok(text)
    }
}

#[async_trait]
impl ChatGateway for GeminiClient {
    async fn send(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        self.generate(message, history).await
    }
}
