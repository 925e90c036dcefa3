use std::net::TcpListener;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use vscode_chat::config::{load_or_init, AppConfig};
use vscode_chat::{logger, router, ui};

#[derive(Parser, Debug)]
#[command(name = "vscode-chat", version, about = "Demo chat endpoint for VS Code chat clients")]
struct Cli {
  /// JSON config file, created with defaults if missing
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Append logs to this file instead of stderr
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run the HTTP chat endpoint (default)
  Serve(ServeArgs),
  /// Chat with a running endpoint from the terminal
  Chat {
    /// Full URL of the chat endpoint
    #[arg(long)]
    url: Option<String>,
  },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
  #[arg(long)]
  host: Option<String>,
  #[arg(long)]
  port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  let mut config = match cli.config.as_deref() {
    Some(path) => load_or_init(path)?,
    None => AppConfig::default(),
  };
  if let Some(path) = cli.log_file {
    config.log_file = Some(path);
  }
  logger::init(config.log_file.as_deref())?;

  match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
    Command::Serve(args) => {
      if let Some(host) = args.host {
        config.host = host;
      }
      if let Some(port) = args.port {
        config.port = port;
      }
      let addr = config.bind_addr();
      let listener = TcpListener::bind(&addr).with_context(|| format!("failed to bind {addr}"))?;
      router::run_router(listener).await
    }
    Command::Chat { url } => {
      if url.is_some() {
        config.endpoint_url = url;
      }
      ui::run_console(config.chat_url()).await
    }
  }
}
