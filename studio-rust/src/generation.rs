use crate::{errors::GenerationError, prompt::SYSTEM_PROMPT};
use forge_llm::{
    openai::{OpenAIChatModel, OpenAIChatModelOptions},
    ChatMessage, LanguageModel, LanguageModelInput,
};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::info_span;
use tracing_futures::Instrument;

pub const DEFAULT_MODEL_ID: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Whole-response markdown fence, optionally tagged `html` or `svelte`.
static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^```(?:html|svelte)?\s*\n([\s\S]*?)```$").expect("fence pattern is valid")
});

/// Return the interior of a fenced code block that wraps the whole response.
/// Anything else, including a fence with nothing inside, is returned as is.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    FENCED_CODE
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|interior| interior.as_str())
        .filter(|interior| !interior.is_empty())
        .unwrap_or(raw)
}

/// Builds the model that serves a request for a given credential.
pub trait ModelProvider: Send + Sync {
    fn language_model(&self, credential: &str) -> Arc<dyn LanguageModel>;
}

impl<F> ModelProvider for F
where
    F: Fn(&str) -> Arc<dyn LanguageModel> + Send + Sync,
{
    fn language_model(&self, credential: &str) -> Arc<dyn LanguageModel> {
        self(credential)
    }
}

/// Creates an [`OpenAIChatModel`] per request, sharing one HTTP client.
#[derive(Clone)]
pub struct OpenAIProvider {
    model_id: String,
    base_url: Option<String>,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            base_url: None,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_ID)
    }
}

impl ModelProvider for OpenAIProvider {
    fn language_model(&self, credential: &str) -> Arc<dyn LanguageModel> {
        Arc::new(OpenAIChatModel::new(
            self.model_id.clone(),
            OpenAIChatModelOptions {
                base_url: self.base_url.clone(),
                api_key: credential.to_string(),
                client: Some(self.client.clone()),
                ..Default::default()
            },
        ))
    }
}

/// Sampling policy applied to every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Turns prompts into Svelte component source. Stateless: each call is one
/// independent request.
pub struct GenerationService {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
}

impl GenerationService {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            settings: GenerationSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> GenerationSettings {
        self.settings
    }

    /// The request sent for `prompt` after `history`.
    #[must_use]
    pub fn build_input(&self, prompt: &str, history: &[ChatMessage]) -> LanguageModelInput {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(prompt));

        LanguageModelInput {
            messages,
            max_tokens: Some(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
        }
    }

    /// Generate component source for `prompt`, continuing `history`.
    ///
    /// Fails with [`GenerationError::MissingCredential`] before any request
    /// when `credential` is empty. Every other failure is reported as
    /// [`GenerationError::GenerationFailed`].
    pub async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        if credential.is_empty() {
            return Err(GenerationError::MissingCredential);
        }

        let model = self.provider.language_model(credential);
        let input = self.build_input(prompt, history);
        let span = info_span!(
            "forge_studio.generate",
            model = %model.model_id(),
            history_len = history.len()
        );

        let response = model.generate(input).instrument(span).await.map_err(|error| {
            tracing::error!(%error, "error generating svelte code");
            GenerationError::GenerationFailed(error)
        })?;

        Ok(strip_code_fence(&response.text).to_string())
    }
}
