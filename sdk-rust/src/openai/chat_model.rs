use super::chat_api::{
    ChatCompletionRequestMessage, CompletionUsage, CreateChatCompletionRequest,
    CreateChatCompletionResponse,
};
use crate::{
    client_utils, ChatMessage, LanguageModel, LanguageModelError, LanguageModelInput,
    LanguageModelResult, ModelResponse, ModelUsage,
};
use futures::future::BoxFuture;
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::collections::HashMap;

const PROVIDER: &str = "openai";

pub struct OpenAIChatModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct OpenAIChatModelOptions {
    pub base_url: Option<String>,
    pub api_key: String,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl OpenAIChatModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: OpenAIChatModelOptions) -> Self {
        let OpenAIChatModelOptions {
            base_url,
            api_key,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);
        let headers = headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client,
            headers,
        }
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut auth_header =
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid OpenAI API key header value: {error}"
                ))
            })?;
        auth_header.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header);

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid OpenAI header name '{key}': {error}"
                ))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid OpenAI header value for '{key}': {error}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

impl LanguageModel for OpenAIChatModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    fn generate(
        &self,
        input: LanguageModelInput,
    ) -> BoxFuture<'_, LanguageModelResult<ModelResponse>> {
        Box::pin(async move {
            crate::opentelemetry::trace_generate(
                self.provider(),
                &self.model_id(),
                input,
                |input| async move {
                    let request = convert_to_openai_create_params(input, &self.model_id);
                    let headers = self.request_headers()?;

                    let response: CreateChatCompletionResponse = client_utils::send_json(
                        &self.client,
                        &format!("{}/chat/completions", self.base_url),
                        &request,
                        headers,
                    )
                    .await?;

                    map_openai_response(response)
                },
            )
            .await
        })
    }
}

fn convert_to_openai_create_params(
    input: LanguageModelInput,
    model_id: &str,
) -> CreateChatCompletionRequest {
    let LanguageModelInput {
        messages,
        max_tokens,
        temperature,
    } = input;

    CreateChatCompletionRequest {
        messages: messages.into_iter().map(convert_to_openai_message).collect(),
        model: model_id.to_string(),
        temperature,
        max_tokens,
    }
}

fn convert_to_openai_message(message: ChatMessage) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage {
        role: message.role.as_str().to_string(),
        content: message.content,
    }
}

fn map_openai_response(
    response: CreateChatCompletionResponse,
) -> LanguageModelResult<ModelResponse> {
    let usage = response.usage.map(map_openai_usage);

    let choice = response.choices.into_iter().next().ok_or_else(|| {
        LanguageModelError::Invariant(PROVIDER, "No choices in response".to_string())
    })?;

    let message = choice.message;

    if let Some(refusal) = &message.refusal {
        if !refusal.is_empty() {
            return Err(LanguageModelError::Refusal(refusal.clone()));
        }
    }

    Ok(ModelResponse {
        text: message.content.unwrap_or_default(),
        usage,
    })
}

fn map_openai_usage(usage: CompletionUsage) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    }
}
