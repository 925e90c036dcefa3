use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "vscode_chat=info,tower_http=info";

/// RFC 3339 UTC timestamps, e.g. `2024-05-01T12:00:00.123456+00:00`.
struct Rfc3339Utc;

impl FormatTime for Rfc3339Utc {
  fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
    write!(w, "{}", Utc::now().to_rfc3339())
  }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
/// With a log file, output is appended there without ANSI colors.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_timer(Rfc3339Utc);

  let installed = match log_file {
    Some(path) => {
      let file = open_log_file(path)?;
      builder
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
    }
    None => builder.with_writer(std::io::stderr).try_init(),
  };
  installed.map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
  OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn timestamps_are_rfc3339() {
    let mut out = String::new();
    Rfc3339Utc.format_time(&mut Writer::new(&mut out)).unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(&out).is_ok(), "timestamp: {out}");
  }

  #[test]
  fn log_file_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.log");

    writeln!(open_log_file(&path).unwrap(), "first").unwrap();
    writeln!(open_log_file(&path).unwrap(), "second").unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "first\nsecond\n");
  }

  #[test]
  fn missing_log_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent").join("chat.log");
    let err = open_log_file(&path).unwrap_err();
    assert!(err.to_string().contains("failed to open log file"));
  }
}
