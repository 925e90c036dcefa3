use std::net::TcpListener;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::models::{ChatRequest, ChatResponse, ErrorResponse, HistoryItem, Role};
use crate::reply::generate_reply;

pub const CHAT_PATH: &str = "/api/chat";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
  #[error("Invalid JSON payload")]
  InvalidJson,
  #[error("Missing \"message\" in request body")]
  MissingMessage,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    error_response(StatusCode::BAD_REQUEST, &self.to_string())
  }
}

fn error_response(status: StatusCode, message: &str) -> Response {
  let body = Json(ErrorResponse {
    error: message.to_string(),
  });
  (status, body).into_response()
}

pub fn app() -> Router {
  Router::new()
    .route(CHAT_PATH, post(chat))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

pub async fn run_router(listener: TcpListener) -> anyhow::Result<()> {
  listener.set_nonblocking(true)?;
  let listener = tokio::net::TcpListener::from_std(listener)?;
  tracing::info!(addr = %listener.local_addr()?, "chat endpoint listening");
  axum::serve(listener, app())
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    tracing::info!("shutting down");
  }
}

async fn chat(body: Bytes) -> Response {
  match parse_chat_request(&body) {
    Ok(req) => {
      let reply = generate_reply(&req.message, &req.history);
      (StatusCode::OK, Json(ChatResponse { reply })).into_response()
    }
    Err(err) => {
      tracing::warn!(error = %err, "rejected chat request");
      err.into_response()
    }
  }
}

/// Parses a raw request body into a `ChatRequest`.
///
/// Only the body's JSON validity and the presence of `message` are enforced.
/// Non-string messages are stringified the way a JavaScript client would
/// (`["a","b"]` is `a,b`, objects are `[object Object]`). A `history` that is
/// not an array becomes empty; entries without a known role are dropped, and
/// a missing or `null` content is kept as `None`.
pub fn parse_chat_request(body: &[u8]) -> Result<ChatRequest, ApiError> {
  let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
  if value.is_null() {
    return Err(ApiError::InvalidJson);
  }

  let message = value
    .get("message")
    .and_then(non_null)
    .map(js_string)
    .unwrap_or_default();
  if message.trim().is_empty() {
    return Err(ApiError::MissingMessage);
  }

  let history = match value.get("history") {
    Some(Value::Array(items)) => items.iter().filter_map(history_item).collect(),
    _ => Vec::new(),
  };

  Ok(ChatRequest { message, history })
}

fn history_item(item: &Value) -> Option<HistoryItem> {
  let role = serde_json::from_value::<Role>(item.get("role")?.clone()).ok()?;
  let content = item.get("content").and_then(non_null).map(js_string);
  Some(HistoryItem { role, content })
}

fn non_null(value: &Value) -> Option<&Value> {
  (!value.is_null()).then_some(value)
}

fn js_string(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => match n.as_f64() {
      Some(f) if !n.is_i64() && !n.is_u64() => f.to_string(),
      _ => n.to_string(),
    },
    Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>().join(","),
    Value::Object(_) => "[object Object]".to_string(),
  }
}
