//! `enrolld` — the enroll portal server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite store, and serves the portal over HTTP.
//!
//! # Bootstrapping the first admin
//!
//! The review API is staff-gated, so a fresh database needs one staff
//! account seeded from the command line:
//!
//! ```text
//! enrolld seed-admin --email admin@example.com \
//!     --first-name Rakesh --last-name Sharma --dob 1988-03-02
//! ```
//!
//! The derived password is printed once; without `--dob` it derives with
//! the fallback year.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use enroll_core::{lifecycle, staff::StaffForm};
use enroll_portal::{AppState, ServerConfig, mail::LogMailer};
use enroll_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "enroll admission portal server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Create a staff account directly in the store and print its credential.
  SeedAdmin {
    #[arg(long)]
    email:      String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name:  String,
    /// Date of birth; drives the derived password.
    #[arg(long)]
    dob:        Option<String>,
    #[arg(long, default_value = "Administrator")]
    designation: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ENROLL"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(Command::SeedAdmin {
    email,
    first_name,
    last_name,
    dob,
    designation,
  }) = cli.command
  {
    return seed_admin(&store, email, first_name, last_name, dob, designation).await;
  }

  let counts = store.watch_counts();
  let state = AppState {
    store: Arc::new(store),
    mailer: Arc::new(LogMailer),
    counts,
    config: Arc::new(server_cfg.clone()),
  };

  let app = enroll_portal::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Write a staff record plus identity account and print the credential.
///
/// Incidental profile fields are filled with placeholders; the operator can
/// correct them later through the staff API.
async fn seed_admin(
  store:       &SqliteStore,
  email:       String,
  first_name:  String,
  last_name:   String,
  dob:         Option<String>,
  designation: String,
) -> anyhow::Result<()> {
  let profile = StaffForm {
    first_name,
    last_name,
    email,
    dob: dob.unwrap_or_else(|| "-".to_owned()),
    designation,
    phone: "-".to_owned(),
    gender: "-".to_owned(),
    blood_group: "-".to_owned(),
    teaching_class: "-".to_owned(),
    teaching_subject: "-".to_owned(),
    temp_address: "-".to_owned(),
    ..StaffForm::default()
  }
  .validate()
  .context("invalid staff profile")?;

  let registration = lifecycle::register_staff(store, store, profile)
    .await
    .context("failed to seed admin")?;

  println!(
    "Seeded admin {} <{}>",
    registration.record.profile.name, registration.record.profile.email
  );
  println!("Password: {}", registration.generated_password);
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
