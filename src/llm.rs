//! Streaming chat completions.
//!
//! A call sends one user message and hands each text fragment to a callback as
//! it arrives. The fragment sequence is finite and can't be replayed; callers
//! that want the whole answer concatenate it themselves.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::MemeError;

/// A language model that streams its answer.
pub trait ChatModel {
    /// Sends `prompt` as a single user message, calling `on_fragment` for
    /// every non-empty piece of text until the stream ends.
    fn stream_chat(
        &self,
        prompt: &str,
        on_fragment: &mut dyn FnMut(&str),
    ) -> impl Future<Output = Result<(), MemeError>>;
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request body for POST /chat/completions
#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Debug, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// What one server-sent `data:` payload means for the caller.
#[derive(Debug, Eq, PartialEq)]
pub enum StreamEvent {
    /// Text to append (may be empty, e.g. the role-only first chunk)
    Fragment(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Decodes a single `data:` payload from a chat completion stream.
pub fn parse_stream_payload(payload: &str) -> Result<StreamEvent, MemeError> {
    if payload == "[DONE]" {
        return Ok(StreamEvent::Done);
    }
    let chunk: ChatCompletionChunk = serde_json::from_str(payload)
        .map_err(|err| MemeError::Model(format!("Malformed stream chunk: {err}")))?;
    if let Some(err) = chunk.error {
        return Err(MemeError::Model(format!("API returned error mid-stream: {err}")));
    }
    Ok(StreamEvent::Fragment(
        chunk
            .choices
            .into_iter()
            .filter_map(|choice| choice.delta.content)
            .collect(),
    ))
}

/// Splits a byte stream into server-sent event `data:` payloads.
///
/// Bytes are held until a full line is seen, so a UTF-8 sequence split across
/// network chunks decodes fine.
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    /// Feeds more bytes in, returning payloads for every line completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(payload) = data_payload(&line[..line.len() - 1]) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flushes a last line that wasn't newline terminated.
    pub fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.pending);
        data_payload(&line)
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches('\r');
    let payload = line.strip_prefix("data:")?;
    Some(payload.trim_start().to_string())
}

/// [`ChatModel`] speaking the OpenAI chat completions protocol.
#[derive(Clone, Debug)]
pub struct OpenAiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    /// Builds a model client from the run config.
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.chat_completions_url(),
            api_key: config.openai_api_key.clone(),
            model: config.model.clone(),
        }
    }
}

impl ChatModel for OpenAiChat {
    async fn stream_chat(
        &self,
        prompt: &str,
        on_fragment: &mut dyn FnMut(&str),
    ) -> Result<(), MemeError> {
        let req_body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        // no timeout here, the stream runs as long as the model keeps talking
        let mut resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            return Err(MemeError::Model(format!(
                "Chat completions API error {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        let mut buffer = SseBuffer::default();
        while let Some(bytes) = resp.chunk().await? {
            for payload in buffer.push(&bytes) {
                if feed(&payload, on_fragment)? {
                    return Ok(());
                }
            }
        }
        if let Some(payload) = buffer.finish() {
            feed(&payload, on_fragment)?;
        }
        debug!("Stream ended without [DONE]");
        Ok(())
    }
}

/// Returns true once the stream says it is done.
fn feed(payload: &str, on_fragment: &mut dyn FnMut(&str)) -> Result<bool, MemeError> {
    match parse_stream_payload(payload)? {
        StreamEvent::Done => Ok(true),
        StreamEvent::Fragment(text) => {
            if !text.is_empty() {
                on_fragment(&text);
            }
            Ok(false)
        }
    }
}
