//! Streaming clients for the external LLM providers.
//!
//! All providers answer with server-sent events. One driver reads the SSE
//! byte stream; each provider contributes a request body and a parser that
//! turns one `data:` payload into an [`SseEvent`].

use std::pin::Pin;

use futures::Stream;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::types::{ChatMessage, LLMProvider};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token, end of stream, or error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Meaning of one SSE payload.
#[derive(Debug, PartialEq)]
enum SseEvent {
    Tokens(Vec<String>),
    Done,
    Error(String),
    Skip,
}

type EventParser = fn(&Value) -> SseEvent;

/// Generation settings shared by every provider request.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: f64,
    pub max_tokens: usize,
}

/// Stream tokens for `messages` from `provider`.
pub fn stream_llm(
    client: &Client,
    provider: LLMProvider,
    messages: Vec<ChatMessage>,
    model: &str,
    api_key: &str,
    sampling: Sampling,
) -> BoxedStream {
    debug!("Streaming from {} with model {}", provider, model);

    let (request, parse): (RequestBuilder, EventParser) = match provider {
        LLMProvider::Gemini => (
            client
                .post(format!(
                    "{}/models/{}:streamGenerateContent?alt=sse",
                    GEMINI_API_BASE, model
                ))
                .header("x-goog-api-key", api_key)
                .json(&gemini_body(&messages, sampling)),
            parse_gemini as EventParser,
        ),
        LLMProvider::OpenAI | LLMProvider::Groq => {
            let base = if provider == LLMProvider::Groq {
                GROQ_API_BASE
            } else {
                OPENAI_API_BASE
            };
            (
                client
                    .post(format!("{}/chat/completions", base))
                    .bearer_auth(api_key)
                    .json(&openai_body(&messages, model, sampling)),
                parse_openai as EventParser,
            )
        }
        LLMProvider::Anthropic => (
            client
                .post(ANTHROPIC_MESSAGES_URL)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&anthropic_body(&messages, model, sampling)),
            parse_anthropic as EventParser,
        ),
    };

    Box::pin(sse_stream(request, provider, parse))
}

fn system_prompt(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.as_str())
}

fn gemini_body(messages: &[ChatMessage], sampling: Sampling) -> Value {
    let contents: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| {
            let role = if m.role == "assistant" { "model" } else { "user" };
            json!({"role": role, "parts": [{"text": m.content}]})
        })
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": sampling.temperature,
            "maxOutputTokens": sampling.max_tokens,
        },
    });
    if let Some(system) = system_prompt(messages) {
        body["systemInstruction"] = json!({"parts": [{"text": system}]});
    }
    body
}

fn openai_body(messages: &[ChatMessage], model: &str, sampling: Sampling) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "temperature": sampling.temperature,
        "max_tokens": sampling.max_tokens,
        "stream": true,
    })
}

fn anthropic_body(messages: &[ChatMessage], model: &str, sampling: Sampling) -> Value {
    let conversation: Vec<&ChatMessage> = messages.iter().filter(|m| m.role != "system").collect();
    let mut body = json!({
        "model": model,
        "messages": conversation,
        "temperature": sampling.temperature,
        "max_tokens": sampling.max_tokens,
        "stream": true,
    });
    if let Some(system) = system_prompt(messages) {
        body["system"] = json!(system);
    }
    body
}

fn parse_gemini(event: &Value) -> SseEvent {
    if let Some(msg) = event["error"]["message"].as_str() {
        return SseEvent::Error(msg.to_string());
    }
    if let Some(reason) = event["promptFeedback"]["blockReason"].as_str() {
        return SseEvent::Error(format!("Prompt blocked: {}", reason));
    }
    match event["candidates"][0]["content"]["parts"].as_array() {
        Some(parts) => SseEvent::Tokens(
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .map(String::from)
                .collect(),
        ),
        None => SseEvent::Skip,
    }
}

fn parse_openai(event: &Value) -> SseEvent {
    if let Some(msg) = event["error"]["message"].as_str() {
        return SseEvent::Error(msg.to_string());
    }
    match event["choices"][0]["delta"]["content"].as_str() {
        Some(content) => SseEvent::Tokens(vec![content.to_string()]),
        None => SseEvent::Skip,
    }
}

fn parse_anthropic(event: &Value) -> SseEvent {
    match event["type"].as_str() {
        Some("content_block_delta") => match event["delta"]["text"].as_str() {
            Some(text) => SseEvent::Tokens(vec![text.to_string()]),
            None => SseEvent::Skip,
        },
        Some("message_stop") => SseEvent::Done,
        Some("error") => SseEvent::Error(
            event["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => SseEvent::Skip,
    }
}

/// Pop the next complete line off an SSE byte buffer.
///
/// Only whole lines are decoded, so a character split across network
/// chunks stays intact.
fn next_sse_line(buffer: &mut Vec<u8>) -> Option<String> {
    let line_end = buffer.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = buffer.drain(..=line_end).collect();
    Some(String::from_utf8_lossy(&line).trim().to_string())
}

/// Interpret one SSE line. Comments, `event:` lines and undecodable data are skipped.
fn parse_sse_line(line: &str, parse: EventParser) -> SseEvent {
    let Some(data) = line.strip_prefix("data:").map(str::trim_start) else {
        return SseEvent::Skip;
    };
    if data == "[DONE]" {
        return SseEvent::Done;
    }
    match serde_json::from_str::<Value>(data) {
        Ok(event) => parse(&event),
        Err(_) => SseEvent::Skip,
    }
}

fn sse_stream(
    request: RequestBuilder,
    provider: LLMProvider,
    parse: EventParser,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut bytes_stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut token_count = 0usize;

        while let Some(chunk) = bytes_stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };
            buffer.extend_from_slice(&bytes);

            while let Some(line) = next_sse_line(&mut buffer) {
                match parse_sse_line(&line, parse) {
                    SseEvent::Tokens(tokens) => {
                        for token in tokens.into_iter().filter(|t| !t.is_empty()) {
                            token_count += 1;
                            yield StreamChunk::Token(token);
                        }
                    }
                    SseEvent::Done => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    SseEvent::Error(msg) => {
                        error!("{} error: {}", provider, msg);
                        yield StreamChunk::Error(msg);
                        return;
                    }
                    SseEvent::Skip => {}
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Check an API key with a minimal request.
pub async fn test_api_key(provider: &str, api_key: &str) -> Result<(), String> {
    let provider: LLMProvider = provider.parse()?;
    let client = Client::new();

    let request = match provider {
        LLMProvider::Gemini => client
            .get(format!("{}/models", GEMINI_API_BASE))
            .header("x-goog-api-key", api_key),
        LLMProvider::OpenAI => client
            .get(format!("{}/models", OPENAI_API_BASE))
            .bearer_auth(api_key),
        LLMProvider::Groq => client
            .get(format!("{}/models", GROQ_API_BASE))
            .bearer_auth(api_key),
        LLMProvider::Anthropic => client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": "claude-3-5-haiku-20241022",
                "max_tokens": 1,
                "messages": [{"role": "user", "content": "Hi"}],
            })),
    };

    let resp = request.send().await.map_err(|e| e.to_string())?;
    // Anthropic answers 400 for a valid key it will not serve (quota, model)
    if resp.status().is_success()
        || (provider == LLMProvider::Anthropic && resp.status().as_u16() == 400)
    {
        Ok(())
    } else {
        Err(format!("API returned status {}", resp.status()))
    }
}
