use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
  System,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::User => "user",
      Role::Assistant => "assistant",
      Role::System => "system",
    }
  }
}

/// One entry of the client-side transcript.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
  pub id: String,
  pub role: Role,
  pub content: String,
}

impl Message {
  pub fn new(role: Role, content: impl Into<String>) -> Self {
    Self {
      id: uuid::Uuid::new_v4().to_string(),
      role,
      content: content.into(),
    }
  }
}

/// A prior turn as it travels on the wire: a `Message` without its id.
/// `content` is `None` when a client sent a turn without one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryItem {
  pub role: Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content: Option<String>,
}

impl HistoryItem {
  pub fn new(role: Role, content: impl Into<String>) -> Self {
    Self {
      role,
      content: Some(content.into()),
    }
  }
}

impl From<&Message> for HistoryItem {
  fn from(msg: &Message) -> Self {
    Self {
      role: msg.role,
      content: Some(msg.content.clone()),
    }
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatRequest {
  pub message: String,
  #[serde(default)]
  pub history: Vec<HistoryItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatResponse {
  pub reply: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
  pub error: String,
}
