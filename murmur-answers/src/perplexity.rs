use crate::traits::AnswerSearch;
use async_trait::async_trait;
use murmur_common::{AnswersConfig, CREDENTIAL_ENV, MurmurError, Result};
use murmur_http::{Auth, HttpClient, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const COMPLETIONS_PATH: &str = "chat/completions";

/// Answer-synthesis client for Perplexity's chat-completions API.
pub struct AnswerSearchClient {
    client: HttpClient,
    api_key: String,
    model: String,
    system_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Source URLs backing the answer, when the service returns them.
    #[serde(default)]
    pub citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first completion, if the response carries one.
    pub fn first_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

impl AnswerSearchClient {
    /// Build a client from an explicit configuration value.
    ///
    /// Fails with [`MurmurError::MissingCredential`] when no credential is
    /// configured; nothing is sent over the network in that case.
    pub fn new(config: &AnswersConfig) -> Result<Self> {
        let api_key = config
            .credential()
            .ok_or_else(|| MurmurError::MissingCredential(CREDENTIAL_ENV.to_string()))?
            .to_string();

        let mut client = HttpClient::new(&config.base_url)
            .map_err(|e| MurmurError::Config(format!("HttpClient init failed: {e}")))?;
        if let Some(secs) = config.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnswerSearch for AnswerSearchClient {
    async fn try_search(&self, query: &str) -> Result<String> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: query,
                },
            ],
        };

        let started = Instant::now();
        tracing::info!(
            target: "answers",
            model = %self.model,
            query_len = query.len(),
            "answers.search.start"
        );

        let resp: ChatCompletionResponse = self
            .client
            .post_json(
                COMPLETIONS_PATH,
                &req,
                RequestOpts {
                    auth: Auth::Bearer(&self.api_key),
                    ..Default::default()
                },
            )
            .await?;

        let citations = resp.citations.len();
        let text = resp.first_content().ok_or_else(|| {
            MurmurError::Malformed("response has no choices[0].message.content".to_string())
        })?;

        tracing::info!(
            target: "answers",
            elapsed_ms = started.elapsed().as_millis() as u64,
            answer_len = text.len(),
            citations,
            "answers.search.success"
        );
        Ok(text)
    }
}
