//! `enroll` — terminal UI for the enroll admission queue.
//!
//! # Usage
//!
//! ```
//! enroll --url http://localhost:8080 --email admin@example.com --password secret
//! enroll --config ~/.config/enroll/config.toml
//! ```

mod app;
mod client;
mod ui;

use std::{io, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use enroll_core::store::PartitionCounts;
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tokio::sync::mpsc;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "enroll", about = "Terminal UI for the enroll admission queue")]
struct Args {
  /// Path to a TOML config file (url, email, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the enroll portal (default: http://localhost:8080).
  #[arg(long, env = "ENROLL_URL")]
  url: Option<String>,

  /// Staff account email.
  #[arg(long, env = "ENROLL_EMAIL")]
  email: Option<String>,

  /// Staff account password (plaintext).
  #[arg(long, env = "ENROLL_PASSWORD")]
  password: Option<String>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    email: args
      .email
      .or_else(|| (!file_cfg.email.is_empty()).then(|| file_cfg.email.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  // Authenticate before touching the terminal so login failures print plainly.
  let mut client = ApiClient::new(api_config)?;
  let grant = client.login().await.context("logging in to the portal")?;
  let mut app = App::new(client);
  app.status_msg = format!("Signed in as {}.", grant.display_name);

  // Long-poll the counts endpoint in the background so the queue tracks
  // other operators without a manual refresh.
  let (counts_tx, mut counts_rx) = mpsc::unbounded_channel();
  let poller = tokio::spawn(poll_counts(app.client.clone(), counts_tx));

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data.
  let load_result = app.load().await;

  // Run the event loop; restore terminal even on error.
  let run_result = if load_result.is_ok() {
    run_event_loop(&mut terminal, &mut app, &mut counts_rx).await
  } else {
    load_result
  };

  // Restore terminal regardless of result.
  poller.abort();
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

/// Long-poll `/api/admissions/counts?wait=true` until the channel closes,
/// pushing each snapshot to the event loop. Errors back off briefly so a
/// portal restart does not spin the loop.
async fn poll_counts(
  client: Arc<ApiClient>,
  tx: mpsc::UnboundedSender<PartitionCounts>,
) {
  loop {
    match client.counts(true).await {
      Ok(counts) => {
        if tx.send(counts).is_err() {
          break;
        }
      }
      Err(_) => tokio::time::sleep(Duration::from_secs(5)).await,
    }
  }
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  counts_rx: &mut mpsc::UnboundedReceiver<PartitionCounts>,
) -> Result<()> {
  loop {
    // Fold in any snapshots the background long-poll delivered.
    while let Ok(counts) = counts_rx.try_recv() {
      app.apply_counts(counts).await;
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(evt) = maybe_event {
      match evt {
        Event::Key(key) => {
          let cont = app.handle_key(key).await?;
          if !cont {
            break;
          }
        }
        Event::Resize(_, _) => {
          // Terminal will redraw on next iteration.
        }
        _ => {}
      }
    }
  }

  Ok(())
}
