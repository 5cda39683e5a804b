use crate::config::GenerationConfig;
use crate::error::{CoreError, CoreResult};
use crate::generation::interface::{GenerationRequest, ImageAnalysis, TextGenerator};
use crate::generation::parse::{parse_extracted_keyword, parse_generated_title, parse_image_analysis};
use crate::generation::prompts;
use crate::sources::{parse_base_url, read_success_body};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

#[derive(Debug, Serialize)]
struct ImageRef {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatMessage {
    fn system(text: &str) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.to_string()),
        }
    }

    fn user(text: String) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text),
        }
    }

    fn user_with_image(text: String, image_url: &str) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text },
                ContentPart::ImageUrl {
                    image_url: ImageRef {
                        url: image_url.to_string(),
                    },
                },
            ]),
        }
    }
}

/// Chat-completions backed generator.
pub struct ChatCompletionsGenerator {
    http: reqwest::Client,
    endpoint: Url,
    config: GenerationConfig,
}

impl ChatCompletionsGenerator {
    pub fn new(http: reqwest::Client, config: &GenerationConfig) -> CoreResult<Self> {
        let base = parse_base_url(&config.base_url)?;
        let endpoint = parse_base_url(&format!(
            "{}/chat/completions",
            base.as_str().trim_end_matches('/')
        ))?;
        Ok(Self {
            http,
            endpoint,
            config: config.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        temperature: Option<f32>,
        max_tokens: u32,
    ) -> CoreResult<String> {
        if self.config.api_key.is_empty() {
            return Err(CoreError::Config(
                "generation api key is not configured".to_string(),
            ));
        }
        let request = ChatRequest {
            model,
            messages,
            temperature,
            max_tokens,
        };
        debug!(model, max_tokens, "chat completion request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let body = read_success_body(response, "text generation").await?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            CoreError::MalformedGenerationOutput(format!("unreadable completion body: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                CoreError::MalformedGenerationOutput("completion had no choices".to_string())
            })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn extract_keyword(&self, product_name: &str, image_url: &str) -> CoreResult<String> {
        let user = if image_url.trim().is_empty() {
            ChatMessage::user(prompts::keyword_prompt(product_name))
        } else {
            ChatMessage::user_with_image(prompts::keyword_prompt(product_name), image_url)
        };
        let raw = self
            .complete(
                &self.config.keyword_model,
                vec![ChatMessage::system(prompts::KEYWORD_SYSTEM), user],
                Some(self.config.keyword_temperature),
                self.config.keyword_max_tokens,
            )
            .await?;
        parse_extracted_keyword(&raw)
    }

    async fn analyze_image_features(&self, image_url: &str) -> CoreResult<ImageAnalysis> {
        if image_url.trim().is_empty() {
            return Ok(ImageAnalysis::default());
        }
        let raw = self
            .complete(
                &self.config.image_model,
                vec![
                    ChatMessage::system(prompts::IMAGE_SYSTEM),
                    ChatMessage::user_with_image(prompts::image_prompt(), image_url),
                ],
                None,
                self.config.image_max_tokens,
            )
            .await?;
        Ok(parse_image_analysis(&raw))
    }

    async fn synthesize_title(&self, request: &GenerationRequest) -> CoreResult<String> {
        let raw = self
            .complete(
                &self.config.title_model,
                vec![
                    ChatMessage::system(prompts::TITLE_SYSTEM),
                    ChatMessage::user(prompts::title_prompt(request)),
                ],
                Some(self.config.title_temperature),
                self.config.title_max_tokens,
            )
            .await?;
        parse_generated_title(&raw)
    }
}
