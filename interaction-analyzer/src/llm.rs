use async_trait::async_trait;
use rig::{client::CompletionClient, completion::Prompt, providers::groq};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GenerationSettings;
use crate::error::AnalyzerError;

pub const REPORT_SYSTEM_PROMPT: &str = "You are a bioscientist specializing in drug-protein interactions. \
Based on the protein, drug, and interaction type provided, generate a detailed report including \
binding affinity, interaction mechanisms, and any relevant recommendations.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// A complete chat-completion request as handed to a [`TextGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u64,
    pub temperature: f64,
}

impl GenerationRequest {
    pub fn system_prompt(&self) -> Option<String> {
        let system: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect();
        (!system.is_empty()).then(|| system.join("\n\n"))
    }

    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

/// User message for the report: the three fields interpolated as entered.
pub fn report_user_content(protein: &str, drug: &str, interaction_type: &str) -> String {
    format!("Protein: {protein}\nDrug: {drug}\nInteraction Type: {interaction_type}")
}

pub fn build_report_request(
    settings: &GenerationSettings,
    protein: &str,
    drug: &str,
    interaction_type: &str,
) -> GenerationRequest {
    GenerationRequest {
        model: settings.model.clone(),
        messages: vec![
            ChatMessage {
                role: ChatRole::System,
                content: REPORT_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: report_user_content(protein, drug, interaction_type),
            },
        ],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}

/// Pick the key entered in the form, falling back to the configured one.
pub fn resolve_credential(
    form_key: Option<&str>,
    configured: Option<&SecretString>,
) -> Option<SecretString> {
    form_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
        .or_else(|| configured.map(|key| SecretString::from(key.expose_secret())))
}

/// Anything that can turn a chat request into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        credential: &SecretString,
        request: &GenerationRequest,
    ) -> Result<String, AnalyzerError>;
}

/// Groq chat completions through rig.
#[derive(Debug, Clone)]
pub struct GroqGenerator {
    base_url: String,
}

impl GroqGenerator {
    pub fn new(settings: &GenerationSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for GroqGenerator {
    async fn generate(
        &self,
        credential: &SecretString,
        request: &GenerationRequest,
    ) -> Result<String, AnalyzerError> {
        let user_content = request
            .user_content()
            .ok_or_else(|| AnalyzerError::ApiFailure("request has no user message".to_string()))?;

        let client = groq::Client::builder(credential.expose_secret())
            .base_url(&self.base_url)
            .build()
            .expect("Groq client should build");
        // rig's groq request body has no max_tokens field of its own
        let mut builder = client
            .agent(&request.model)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .additional_params(serde_json::json!({ "max_tokens": request.max_tokens }));
        if let Some(preamble) = request.system_prompt() {
            builder = builder.preamble(&preamble);
        }
        let agent = builder.build();

        info!(model = %request.model, "calling Groq");
        let completion = agent
            .prompt(user_content)
            .await
            .map_err(|e| AnalyzerError::ApiFailure(e.to_string()))?;

        if completion.trim().is_empty() {
            return Err(AnalyzerError::ApiFailure(
                "model returned an empty completion".to_string(),
            ));
        }
        Ok(completion)
    }
}
