use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::fmt;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
}

// Manual Debug so the signing secret never lands in a log line.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Marina booking management API")]
pub struct Args {
    /// Host to bind to (overrides MARINA_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MARINA_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides MARINA_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Secret used to sign access tokens (overrides MARINA_JWT_SECRET)
    #[arg(long)]
    pub jwt_secret: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("MARINA_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("MARINA_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing MARINA_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 8080,
            Err(err) => return Err(err).context("reading MARINA_PORT"),
        };
        let env_db =
            env::var("MARINA_DATABASE_URL").unwrap_or_else(|_| "sqlite://./data/marina.db".into());

        // The secret has no safe default; refuse to start without one.
        let jwt_secret = match args.jwt_secret {
            Some(secret) => secret,
            None => env::var("MARINA_JWT_SECRET")
                .context("MARINA_JWT_SECRET must be set (or pass --jwt-secret)")?,
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            jwt_secret,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
