use std::io::Write;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::models::{ChatRequest, ChatResponse, HistoryItem, Message, Role};
use crate::router::CHAT_PATH;

pub const SYSTEM_SEED_ID: &str = "sys-1";
pub const SYSTEM_SEED: &str = "You are connected to a demo chat service intended for VS Code chat integration. Ask a question to begin.";
pub const SEND_FAILED: &str = "Sorry, something went wrong sending your message. Please try again.";

const TITLE: &str = "VS Code Chat Integration";
const SUBTITLE: &str = "Web service + UI to integrate with VS Code chat clients";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Transport(#[source] reqwest::Error),
  #[error("request failed with status {0}")]
  Status(reqwest::StatusCode),
  #[error("invalid response body: {0}")]
  Decode(#[source] reqwest::Error),
}

pub struct ChatClient {
  http: reqwest::Client,
  url: String,
}

impl ChatClient {
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      url: url.into(),
    }
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub async fn send(&self, req: &ChatRequest) -> Result<String, ClientError> {
    let resp = self
      .http
      .post(&self.url)
      .json(req)
      .send()
      .await
      .map_err(ClientError::Transport)?;

    if !resp.status().is_success() {
      return Err(ClientError::Status(resp.status()));
    }

    let body = resp.json::<ChatResponse>().await.map_err(ClientError::Decode)?;
    Ok(body.reply)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendState {
  Idle,
  Sending,
}

/// Client-side chat state: an append-only transcript, the pending input, and
/// whether a request is in flight. At most one request is outstanding.
pub struct ChatSession {
  transcript: Vec<Message>,
  input: String,
  state: SendState,
}

impl Default for ChatSession {
  fn default() -> Self {
    Self::new()
  }
}

impl ChatSession {
  pub fn new() -> Self {
    Self {
      transcript: vec![Message {
        id: SYSTEM_SEED_ID.to_string(),
        role: Role::System,
        content: SYSTEM_SEED.to_string(),
      }],
      input: String::new(),
      state: SendState::Idle,
    }
  }

  pub fn transcript(&self) -> &[Message] {
    &self.transcript
  }

  pub fn state(&self) -> SendState {
    self.state
  }

  pub fn is_sending(&self) -> bool {
    self.state == SendState::Sending
  }

  pub fn input(&self) -> &str {
    &self.input
  }

  pub fn set_input(&mut self, input: impl Into<String>) {
    self.input = input.into();
  }

  pub fn can_submit(&self) -> bool {
    !self.is_sending() && !self.input.trim().is_empty()
  }

  /// Moves `Idle -> Sending`: records the user's message, clears the input,
  /// and returns the request to send. Returns `None` while a send is in
  /// flight or when the input is blank.
  pub fn begin_send(&mut self) -> Option<ChatRequest> {
    if !self.can_submit() {
      return None;
    }

    let content = self.input.trim().to_string();
    self.transcript.push(Message::new(Role::User, content.clone()));
    self.input.clear();
    self.state = SendState::Sending;

    Some(ChatRequest {
      message: content,
      history: self.transcript.iter().map(HistoryItem::from).collect(),
    })
  }

  /// Moves `Sending -> Idle`, appending the reply or the failure notice.
  pub fn finish_send(&mut self, outcome: Result<String, ClientError>) {
    if !self.is_sending() {
      tracing::warn!("finish_send called with no request in flight");
      return;
    }

    let content = match outcome {
      Ok(reply) => reply,
      Err(err) => {
        tracing::warn!(error = %err, "chat request failed");
        SEND_FAILED.to_string()
      }
    };
    self.transcript.push(Message::new(Role::Assistant, content));
    self.state = SendState::Idle;
  }

  /// Sends the current input through `client` and waits for the outcome.
  /// Returns false when nothing was submitted.
  pub async fn submit(&mut self, client: &ChatClient) -> bool {
    let Some(req) = self.begin_send() else {
      return false;
    };
    let outcome = client.send(&req).await;
    self.finish_send(outcome);
    true
  }
}

pub fn render_message(msg: &Message) -> String {
  format!("{}: {}", msg.role.as_str(), msg.content)
}

pub fn render(messages: &[Message], sending: bool) -> String {
  let mut lines: Vec<String> = messages.iter().map(render_message).collect();
  if sending {
    lines.push("Sending…".to_string());
  }
  lines.join("\n")
}

pub fn howto(url: &str) -> String {
  format!(
    r#"Point your VS Code extension or chat client to the HTTP endpoint at {url} with a JSON POST payload:

POST {CHAT_PATH}
Content-Type: application/json

{{
  "message": "Hello",
  "history": [{{"role":"user","content":"Hello"}}]
}}

Response JSON:
{{ "reply": "string" }}"#
  )
}

pub async fn run_console(url: String) -> anyhow::Result<()> {
  let client = ChatClient::new(url);
  let mut session = ChatSession::new();

  println!("{TITLE}\n{SUBTITLE}\n");
  println!("Commands: /help shows integration details, /quit exits.\n");
  println!("{}", render(session.transcript(), false));

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    print!("> ");
    std::io::stdout().flush().context("failed to flush stdout")?;

    let Some(line) = lines.next_line().await.context("failed to read input")? else {
      break;
    };
    match line.trim() {
      "/quit" => break,
      "/help" => {
        println!("{}", howto(client.url()));
        continue;
      }
      _ => {}
    }

    session.set_input(line);
    if !session.can_submit() {
      continue;
    }
    println!("{}", render(&[], true));

    let before = session.transcript().len();
    session.submit(&client).await;
    println!("{}", render(&session.transcript()[before..], false));
  }

  Ok(())
}
