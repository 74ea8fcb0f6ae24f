//! services/api/src/adapters/study_llm.rs
//!
//! This module contains the adapter for the structured-output LLM.
//! It implements the `StructuredGenerationService` port from the `core` crate
//! against any OpenAI-compatible chat-completions endpoint (Gemini by default).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use study_companion_core::ports::{
    GenerationError, GenerationResult, StructuredGenerationService, StructuredRequest,
};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StructuredGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiStudyAdapter {
    client: Client<OpenAIConfig>,
}

impl OpenAiStudyAdapter {
    /// Creates a new `OpenAiStudyAdapter`.
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }

    /// Builds a client for `api_base` authenticated with `api_key`.
    pub fn from_credentials(api_base: &str, api_key: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        Self::new(Client::with_config(config))
    }
}

/// Translates a core request into a single chat-completion request whose output
/// is constrained to the request's JSON schema.
pub fn build_chat_request(
    request: &StructuredRequest,
) -> GenerationResult<CreateChatCompletionRequest> {
    let messages = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_instruction)
            .build()
            .map_err(|e| GenerationError::Provider(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(|e| GenerationError::Provider(e.to_string()))?
            .into(),
    ];

    let response_format = ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: None,
            name: request.kind.schema_name().to_string(),
            schema: Some(request.schema.to_json_schema()),
            // Strict mode rejects array-rooted schemas on some providers.
            strict: Some(false),
        },
    };

    CreateChatCompletionRequestArgs::default()
        .model(&request.model)
        .messages(messages)
        .response_format(response_format)
        .n(1)
        .build()
        .map_err(|e| GenerationError::Provider(e.to_string()))
}

//=========================================================================================
// `StructuredGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StructuredGenerationService for OpenAiStudyAdapter {
    /// Sends one request and returns the first choice's text, if any.
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> GenerationResult<Option<String>> {
        let chat_request = build_chat_request(&request)?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| GenerationError::Provider(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        if text.is_none() {
            debug!(kind = %request.kind, "Provider returned no choice content");
        }
        Ok(text)
    }
}
