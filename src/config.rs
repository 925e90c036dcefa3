use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::router::CHAT_PATH;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
  pub host: String,
  pub port: u16,
  /// Append logs here instead of stderr.
  pub log_file: Option<PathBuf>,
  /// Endpoint the terminal client posts to. Derived from host/port when unset.
  pub endpoint_url: Option<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      host: "127.0.0.1".to_string(),
      port: 3000,
      log_file: None,
      endpoint_url: None,
    }
  }
}

impl AppConfig {
  pub fn bind_addr(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }

  pub fn chat_url(&self) -> String {
    match self.endpoint_url.as_ref() {
      Some(url) if !url.trim().is_empty() => url.trim().to_string(),
      _ => format!("http://{}:{}{}", self.host, self.port, CHAT_PATH),
    }
  }
}

pub fn load_or_init(path: &Path) -> anyhow::Result<AppConfig> {
  if path.exists() {
    let data = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&data)
      .with_context(|| format!("invalid config JSON at {}", path.display()))?;
    Ok(config)
  } else {
    let config = AppConfig::default();
    save_config(path, &config)?;
    Ok(config)
  }
}

pub fn save_config(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create config directory {}", dir.display()))?;
  }
  let json = serde_json::to_string_pretty(config)?;
  std::fs::write(path, json)
    .with_context(|| format!("failed to write config at {}", path.display()))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn load_or_init_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = load_or_init(&path).unwrap();
    assert_eq!(config, AppConfig::default());
    assert!(path.exists());

    let reloaded = load_or_init(&path).unwrap();
    assert_eq!(reloaded, config);
  }

  #[test]
  fn missing_fields_take_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "port": 8080 }"#).unwrap();

    let config = load_or_init(&path).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.bind_addr(), "127.0.0.1:8080");
  }

  #[test]
  fn invalid_json_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ port: ").unwrap();

    let err = load_or_init(&path).unwrap_err();
    assert!(err.to_string().contains("invalid config JSON"));
  }

  #[test]
  fn chat_url_prefers_override() {
    let mut config = AppConfig::default();
    assert_eq!(config.chat_url(), "http://127.0.0.1:3000/api/chat");

    config.endpoint_url = Some("https://chat.example.com/api/chat".to_string());
    assert_eq!(config.chat_url(), "https://chat.example.com/api/chat");

    config.endpoint_url = Some("  ".to_string());
    assert_eq!(config.chat_url(), "http://127.0.0.1:3000/api/chat");
  }
}
