//! OpenAI chat-completions summarizer.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::security::ApiKey;
use crate::traits::summarizer::{Summarizer, SummarizerError};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You answer questions about Islam using ONLY the numbered evidence \
provided by the user. Cite evidence by its number in square brackets, e.g. [2]. Quote Quran \
verses and hadith exactly as given. If the evidence does not answer the question, say so plainly \
instead of answering from memory. Never issue a personal ruling; when the question concerns the \
asker's own circumstances, recommend consulting a qualified local scholar.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

pub struct OpenAiSummarizer {
    client: reqwest::Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SummarizerError> {
        let api_key = ApiKey::new(api_key);
        if api_key.is_blank() {
            return Err("OpenAI API key is empty".into());
        }
        let client = reqwest::Client::builder()
            .timeout(SUMMARIZE_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENAI_API_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn user_prompt(question: &str, evidence: &str) -> String {
        format!("Question:\n{question}\n\nEvidence:\n{evidence}")
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, question: &str, evidence: &str) -> Result<String, SummarizerError> {
        let user = Self::user_prompt(question, evidence);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.2,
        };

        debug!(model = %self.model, evidence_chars = evidence.len(), "Requesting summary");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", self.api_key.bearer())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("OpenAI API error {status}: {error_text}").into());
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| "No response from OpenAI".into())
    }

    fn name(&self) -> &str {
        "openai"
    }
}
