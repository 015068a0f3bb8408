//! Prompt construction and chat-completion plumbing.
//!
//! No HTTP client is bundled: the embedding application sends
//! [`ChatRequest`] with [`request_headers`] to `GenerationConfig::endpoint`
//! and hands the response body to [`parse_chat_completion`]. The
//! [`Generator`] trait is the seam the canvas is driven through.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{ENV_API_KEY, GenerationConfig};
use crate::error::GenerateError;
use crate::model::KNOWN_ITEM_TYPES;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub count: usize,
    /// Target length of each item, in words.
    pub approx_length: usize,
    pub temperature: f32,
}

impl GenerationOptions {
    pub fn from_config(count: usize, config: &GenerationConfig) -> Self {
        Self {
            count,
            approx_length: config.approx_length,
            temperature: config.temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub trait Generator {
    /// Raw assistant message content for `prompt`.
    fn generate(
        &self,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<String, GenerateError>;
}

/// Replays canned responses in order. Useful for offline runs and tests.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    responses: RefCell<VecDeque<Result<String, GenerateError>>>,
    prompts: RefCell<Vec<Prompt>>,
}

impl ScriptedGenerator {
    pub fn new(responses: impl IntoIterator<Item = Result<String, GenerateError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.borrow().clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(
        &self,
        prompt: &Prompt,
        _options: &GenerationOptions,
    ) -> Result<String, GenerateError> {
        self.prompts.borrow_mut().push(prompt.clone());
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(GenerateError::Transport(
                "no scripted response left".to_string(),
            ))
        })
    }
}

pub fn expansion_prompt(parent_text: &str, options: &GenerationOptions) -> Prompt {
    let system = format!(
        "You are a brainstorming assistant for a mind map. Reply with only a JSON array of \
         {count} objects. Each object has the keys \"full\" (a complete idea of about \
         {length} words), \"phrase\" (3-6 words), \"short\" (one or two words), \"emoji\" \
         (a single emoji) and \"type\" (one of: {types}). Do not add commentary.",
        count = options.count,
        length = options.approx_length,
        types = KNOWN_ITEM_TYPES.join(", "),
    );
    let user = format!(
        "Expand this idea into {} distinct child ideas:\n{}",
        options.count,
        parent_text.trim()
    );
    Prompt { system, user }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(config: &GenerationConfig, prompt: &Prompt, options: &GenerationOptions) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            temperature: options.temperature,
        }
    }
}

pub fn request_headers(config: &GenerationConfig) -> Result<Vec<(String, String)>, GenerateError> {
    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(GenerateError::MissingApiKey(ENV_API_KEY))?;
    let mut headers = vec![
        ("Authorization".to_string(), format!("Bearer {api_key}")),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];
    if let Some(referer) = &config.referer {
        headers.push(("HTTP-Referer".to_string(), referer.clone()));
    }
    if let Some(title) = &config.title {
        headers.push(("X-Title".to_string(), title.clone()));
    }
    Ok(headers)
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    error: Option<CompletionErrorBody>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionErrorBody {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

/// Assistant content of a chat-completion response body.
pub fn parse_chat_completion(body: &str) -> Result<String, GenerateError> {
    let parsed: CompletionBody = serde_json::from_str(body)
        .map_err(|err| GenerateError::MalformedResponse(err.to_string()))?;
    if let Some(error) = parsed.error {
        let status = error
            .code
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(500);
        return Err(GenerateError::Status {
            status,
            message: error.message.unwrap_or_default(),
        });
    }
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerateError::EmptyCompletion)
}

/// Maps a non-success HTTP status and body to an error.
pub fn status_error(status: u16, body: &str) -> GenerateError {
    let message = serde_json::from_str::<CompletionBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| body.trim().chars().take(200).collect());
    GenerateError::Status { status, message }
}
