//! AI chat endpoint.
//!
//! Thin pass-through to an external chat-completion API. Without an API key,
//! or whenever the upstream call fails, the endpoint falls back to a canned
//! keyword-bucket response so the widget keeps working.

use crate::config::ChatConfig;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are an AI Business Assistant that helps small business owners \
automate their emails, scheduling, and business tasks. You provide practical, actionable advice \
and can help with business automation, productivity, and efficiency. Always be helpful, \
professional, and focused on saving time and improving business operations.";

/// Shared application state for the chat API.
#[derive(Clone)]
pub struct ChatAppState {
    pub config: ChatConfig,
    pub http: reqwest::Client,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    message: Option<String>,
    #[serde(default, rename = "conversationHistory")]
    conversation_history: Vec<ChatTurn>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ChatTurn {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    timestamp: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the chat API router.
pub fn create_chat_router(state: ChatAppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(Arc::new(state))
}

/// POST /api/chat
async fn chat(State(state): State<Arc<ChatAppState>>, Json(body): Json<ChatRequest>) -> Response {
    let Some(message) = body.message.as_deref().filter(|m| !m.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Message is required".to_string(),
            }),
        )
            .into_response();
    };

    let response = match &state.config.api_key {
        Some(api_key) => {
            match request_completion(&state, api_key, message, &body.conversation_history).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Completion API call failed, serving canned response");
                    canned_reply(message)
                }
            }
        }
        None => {
            debug!("No completion API key configured, serving canned response");
            canned_reply(message)
        }
    };

    Json(ChatResponse {
        response,
        timestamp: Utc::now().to_rfc3339(),
    })
    .into_response()
}

/// One POST to the chat-completions endpoint: system prompt, the most recent
/// history turns, then the user message.
async fn request_completion(
    state: &ChatAppState,
    api_key: &str,
    message: &str,
    history: &[ChatTurn],
) -> anyhow::Result<String> {
    let mut messages = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];

    let recent_start = history.len().saturating_sub(state.config.history_limit);
    for turn in &history[recent_start..] {
        messages.push(json!({ "role": turn.role, "content": turn.content }));
    }
    messages.push(json!({ "role": "user", "content": message }));

    let request = json!({
        "model": state.config.model,
        "messages": messages,
        "max_tokens": state.config.max_tokens,
        "temperature": state.config.temperature,
    });

    let response = state
        .http
        .post(&state.config.api_url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("completion API returned status {}", response.status());
    }

    let payload: serde_json::Value = response.json().await?;
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("completion response missing message content"))
}

/// Keyword-bucket canned responses for the business-assistant context.
fn canned_reply(message: &str) -> String {
    let greeting = [
        "Hello! I'm your AI Business Assistant. I can help you automate emails, manage your \
         schedule, and streamline your business tasks. What would you like to work on today?",
        "Hi there! I'm here to help you save time and automate your business processes. How can \
         I assist you today?",
        "Welcome! I specialize in helping small businesses automate their operations. What \
         business task would you like to tackle?",
    ];
    let email = [
        "I can help you automate your email responses! I can create templates, set up \
         auto-replies, and even draft responses based on your business context. What type of \
         emails do you receive most often?",
        "Email automation is one of my specialties! I can help you set up smart responses, \
         categorize incoming emails, and save you hours each week. What's your biggest email \
         challenge?",
        "Let's streamline your email workflow! I can create personalized templates, automate \
         follow-ups, and help you respond faster to customers. What emails take up most of your \
         time?",
    ];
    let schedule = [
        "I can help you manage your schedule more efficiently! I can sync with your calendar, \
         find optimal meeting times, and even handle meeting confirmations automatically. What \
         scheduling challenges are you facing?",
        "Smart scheduling is one of my key features! I can optimize your calendar, prevent \
         double-bookings, and automate meeting preparations. How can I help improve your \
         scheduling?",
        "Let's make your calendar work smarter! I can suggest optimal meeting times, send \
         automatic confirmations, and help you manage your availability. What scheduling issues \
         would you like to solve?",
    ];
    let automation = [
        "I love helping businesses automate their processes! I can help you identify repetitive \
         tasks, create automation workflows, and save you significant time each week. What tasks \
         do you find yourself doing repeatedly?",
        "Business automation is my specialty! I can help you streamline workflows, reduce manual \
         work, and focus on what matters most in your business. What processes would you like to \
         automate?",
        "Let's automate your business operations! I can help you identify opportunities for \
         automation and implement solutions that save time and reduce errors. What's your \
         biggest time-waster?",
    ];
    let fallback = [
        "That's a great question! As your AI Business Assistant, I can help with email \
         automation, smart scheduling, business analytics, and process optimization. What \
         specific area would you like to focus on?",
        "I'm here to help you streamline your business operations! I specialize in email \
         automation, calendar management, and business process optimization. How can I assist \
         you today?",
        "Let me help you work more efficiently! I can assist with automating emails, managing \
         your schedule, analyzing business data, and optimizing your workflows. What would you \
         like to tackle first?",
    ];

    let lower = message.to_lowercase();
    let bucket: &[&str] = if contains_any(&lower, &["hello", "hi", "hey"]) {
        &greeting
    } else if contains_any(&lower, &["email", "inbox", "message"]) {
        &email
    } else if contains_any(&lower, &["schedule", "calendar", "meeting"]) {
        &schedule
    } else if contains_any(&lower, &["automate", "workflow", "process"]) {
        &automation
    } else {
        &fallback
    };

    bucket
        .choose(&mut rand::thread_rng())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_reply_bucket_selection() {
        let reply = canned_reply("How do I automate my inbox email triage?");
        assert!(reply.to_lowercase().contains("email"));

        let reply = canned_reply("help me with my calendar please");
        assert!(reply.to_lowercase().contains("schedul") || reply.to_lowercase().contains("calendar"));

        // Unmatched keywords land in the default bucket
        let reply = canned_reply("tell me about quantum physics");
        assert!(!reply.is_empty());
    }

    #[test]
    fn test_chat_request_accepts_history() {
        let json = r#"{
            "message": "hello",
            "conversationHistory": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello!"}
            ]
        }"#;
        let request: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.message.as_deref(), Some("hello"));
        assert_eq!(request.conversation_history.len(), 2);
    }

    #[test]
    fn test_chat_request_history_optional() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(request.conversation_history.is_empty());
    }
}
