//! `polyglotd`: the translation management server binary.
//!
//! Usage:
//!   polyglotd -c <name-or-path> [--listen <addr>]
//!   polyglotd hash-password <password>
//!
//! The config name resolves to `/etc/polyglot/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use polyglot_core::Module;
use tracing::info;

use config::ServerConfig;

/// Translation management server.
#[derive(Parser, Debug)]
#[command(name = "polyglotd", about = "Translation management server")]
struct Cli {
    /// Config name or path to config file.
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an argon2id hash for `[admin].password_hash`.
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Command::HashPassword { password }) = &cli.command {
        println!("{}", auth::service::hash_password(password)?);
        return Ok(());
    }

    let config_arg = cli
        .config
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("missing -c <config name or path>"))?;

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(config_arg);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = polyglot_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn polyglot_sql::SQLStore> = Arc::new(
        polyglot_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // ── Modules ──

    let auth_config = auth::service::AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        token_ttl: i64::try_from(server_config.jwt.expire_secs)?,
    };
    let auth_module = auth::AuthModule::new(Arc::clone(&sql), auth_config)?;
    info!("Auth module initialized");

    // Bootstrap: ensure the configured admin account exists.
    if let Some(admin) = &server_config.admin {
        bootstrap::ensure_admin(auth_module.service(), admin)?;
    }

    let translation_module =
        translation::TranslationModule::new(Arc::clone(&sql), auth_module.authenticator())?;
    info!("Translation module initialized");

    // Build router.
    let app = routes::build_router(&[&auth_module as &dyn Module, &translation_module]);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("polyglotd listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
