use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{HistoryItem, Role};

pub const GREETING_REPLY: &str = "Hello! This is a demo chat endpoint suitable for VS Code chat integration. Ask me about how to connect or send any question.";

pub const INTEGRATION_REPLY: &str = "To integrate with VS Code: send POST requests to /api/chat with JSON {message, history}. The reply field contains the assistant response. In an extension, use fetch with the deployed URL.";

static GREETING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(hello|hi|hey)\b").expect("valid greeting regex"));
static EDITOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"vscode|vs code|visual studio code").expect("valid editor regex"));
static INTEGRATION_ACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"chat|integration|connect|endpoint").expect("valid integration action regex"));

/// Reply rules in precedence order. The first rule whose predicate holds
/// produces the reply; `Echo` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
  Greeting,
  Integration,
  Question,
  Echo,
}

pub const RULES: [Rule; 4] = [Rule::Greeting, Rule::Integration, Rule::Question, Rule::Echo];

impl Rule {
  pub fn name(&self) -> &'static str {
    match self {
      Rule::Greeting => "greeting",
      Rule::Integration => "integration",
      Rule::Question => "question",
      Rule::Echo => "echo",
    }
  }

  /// `lower` is the lower-cased message; `message` is the raw one.
  pub fn matches(&self, message: &str, lower: &str) -> bool {
    match self {
      Rule::Greeting => GREETING.is_match(lower),
      Rule::Integration => EDITOR.is_match(lower) && INTEGRATION_ACTION.is_match(lower),
      Rule::Question => message.trim().ends_with('?'),
      Rule::Echo => true,
    }
  }

  pub fn respond(&self, message: &str, history: &[HistoryItem]) -> String {
    match self {
      Rule::Greeting => GREETING_REPLY.to_string(),
      Rule::Integration => INTEGRATION_REPLY.to_string(),
      Rule::Question => format!(
        "Good question: {} ? in this demo, responses are rule-based. For production, back this route with your LLM or business logic.",
        message.trim()
      ),
      Rule::Echo => {
        let subject = history
          .iter()
          .rev()
          .find(|item| item.role == Role::User)
          .and_then(|item| item.content.as_deref())
          .unwrap_or(message);
        format!("You said: \"{subject}\". This endpoint is ready for your VS Code chat client.")
      }
    }
  }
}

pub fn select_rule(message: &str) -> Rule {
  let lower = message.to_lowercase();
  RULES
    .into_iter()
    .find(|rule| rule.matches(message, &lower))
    .unwrap_or(Rule::Echo)
}

pub fn generate_reply(message: &str, history: &[HistoryItem]) -> String {
  let rule = select_rule(message);
  tracing::debug!(rule = rule.name(), "selected reply rule");
  rule.respond(message, history)
}
