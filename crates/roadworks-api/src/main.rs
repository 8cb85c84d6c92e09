//! roadworks server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! # Bootstrapping
//!
//! A fresh deployment has no accounts, and account creation is admin-only,
//! so the first admin is seeded from the command line:
//!
//! ```
//! cargo run -p roadworks-api --bin server -- --create-admin admin@example.gov
//! ```
//!
//! `--hash-password` prints the argon2 PHC string for a password entered on
//! stdin, for operators managing credentials out of band.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use roadworks_api::{AppState, ServerConfig};
use roadworks_core::{
  store::IdentityStore,
  user::{NewUser, Role},
};
use roadworks_engine::{Engine, SessionCodec, credential};
use roadworks_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roadworks issue-tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create an admin account with this email (password read from stdin)
  /// and exit.
  #[arg(long, value_name = "EMAIL")]
  create_admin: Option<String>,

  /// Display name for the account created by `--create-admin`.
  #[arg(long, default_value = "Administrator")]
  admin_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    println!("{}", credential::hash_password(&password)?);
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROADWORKS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path and open the SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: seed the first admin and exit.
  if let Some(email) = cli.create_admin {
    let password = read_password()?;
    let admin = store
      .create_user(NewUser {
        name: cli.admin_name,
        email,
        credential_hash: credential::hash_password(&password)?,
        role: Role::Admin,
      })
      .await
      .context("failed to create admin account")?;
    println!("created admin {} ({})", admin.email, admin.user_id);
    return Ok(());
  }

  // Build application state and serve.
  let engine = Engine::new(store, SessionCodec::new(&server_cfg.session_key));
  let state = AppState { engine: Arc::new(engine) };

  let app = roadworks_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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
