//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The configuration file path defaults to `config.yaml` but can
//! be specified via `-f` flag or `TICKERDECK_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources
//! override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `TICKERDECK_`
//!    override YAML values
//! 3. **DATABASE_URL** - Special case: switches the database to external mode
//!    with that URL
//!
//! For nested config values, use double underscores in environment variables.
//! For example, `TICKERDECK_DATABASE__TYPE=external` sets `database.type`.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port`
//! - **Database**: `database.type` (`embedded` | `external`), `database.url`
//! - **Payments**: `payment.provider` (`stripe` | `dummy`) and credentials
//! - **Push**: `push.vapid_public_key`, `push.vapid_private_key`, `push.subject`
//! - **Invites**: `invites.required`
//! - **Limits**: `limits.free_watchlist_limit`
//! - **Data sync**: `data_sync.*` - external CI workflow dispatched by
//!   `POST /api/admin/sync`
//! - **Admin**: `admin_api_key` - static bearer key for admin endpoints

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "TICKERDECK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment
/// variables. All fields have sensible defaults defined in the `Default`
/// implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Database configuration - either embedded or external PostgreSQL
    pub database: DatabaseConfig,
    /// Payment provider configuration (absent disables billing endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentConfig>,
    /// Web-push (VAPID) configuration (absent disables push endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<PushConfig>,
    /// Invite gating for registration
    pub invites: InviteConfig,
    /// Per-tier resource limits
    pub limits: LimitsConfig,
    /// External CI workflow dispatched to refresh market data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_sync: Option<DataSyncConfig>,
    /// Static bearer key gating admin endpoints (absent disables them)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_api_key: Option<String>,
    /// Origins allowed by CORS; "*" allows any
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database: DatabaseConfig::default(),
            payment: None,
            push: None,
            invites: InviteConfig::default(),
            limits: LimitsConfig::default(),
            data_sync: None,
            admin_api_key: None,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Database configuration.
///
/// Supports either an embedded PostgreSQL instance (for development) or an
/// external PostgreSQL database (recommended for production). The choice is
/// made here, once, at startup; request handlers never see it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// Use embedded PostgreSQL database (requires embedded-db feature)
    Embedded {
        /// Directory where database data will be stored
        #[serde(skip_serializing_if = "Option::is_none")]
        data_dir: Option<PathBuf>,
        /// Whether to persist data between restarts (default: false/ephemeral)
        #[serde(default)]
        persistent: bool,
    },
    /// Use external PostgreSQL database
    External {
        /// Connection string for the main database
        url: String,
    },
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Embedded {
            data_dir: None,
            persistent: false,
        }
    }
}

impl DatabaseConfig {
    pub fn embedded_data_dir(&self) -> Option<PathBuf> {
        match self {
            DatabaseConfig::Embedded { data_dir, .. } => data_dir.clone(),
            DatabaseConfig::External { .. } => None,
        }
    }

    pub fn embedded_persistent(&self) -> bool {
        match self {
            DatabaseConfig::Embedded { persistent, .. } => *persistent,
            DatabaseConfig::External { .. } => false,
        }
    }
}

/// Payment provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum PaymentConfig {
    Stripe(StripeConfig),
    /// Test provider: no network calls, fixed URLs, unsigned webhooks
    Dummy(DummyPaymentConfig),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StripeConfig {
    /// Secret API key
    pub api_key: String,
    /// Price ID of the pro-tier subscription
    pub price_id: String,
    /// Webhook endpoint signing secret
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DummyPaymentConfig {
    /// URL returned for checkout and portal sessions
    pub redirect_url: String,
}

/// Web-push (VAPID) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PushConfig {
    /// Public VAPID key, handed to browsers on subscribe
    pub vapid_public_key: String,
    /// Private VAPID key (base64url, no padding) used to sign push messages
    pub vapid_private_key: String,
    /// Contact URI included in the VAPID claims (mailto: or https:)
    #[serde(default = "default_push_subject")]
    pub subject: String,
}

fn default_push_subject() -> String {
    "mailto:ops@tickerdeck.app".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InviteConfig {
    /// When true, first-time registration must present a valid invite code
    pub required: bool,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self { required: false }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Watchlist size cap for free-tier users; pro is uncapped
    pub free_watchlist_limit: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { free_watchlist_limit: 10 }
    }
}

/// External CI workflow trigger for on-demand market data sync.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DataSyncConfig {
    /// Repository in "owner/name" form
    pub repository: String,
    /// Workflow file name (e.g. "sync-market-data.yml")
    pub workflow: String,
    /// Git ref the workflow runs on
    #[serde(default = "default_sync_ref")]
    pub git_ref: String,
    /// Access token with workflow dispatch permission
    pub token: String,
    /// API base URL; overridable for tests
    #[serde(default = "default_sync_api_base")]
    pub api_base: String,
}

fn default_sync_ref() -> String {
    "main".to_string()
}

fn default_sync_api_base() -> String {
    "https://api.github.com".to_string()
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut config: Config = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("TICKERDECK_").split("__"))
            .extract()?;

        // DATABASE_URL always wins: deployments set it to point at the
        // managed replica.
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database = DatabaseConfig::External { url };
        }

        config.validate()?;
        Ok(config)
    }

    /// Sanity-check cross-field constraints that serde can't express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(push) = &self.push {
            if push.vapid_public_key.is_empty() || push.vapid_private_key.is_empty() {
                anyhow::bail!("push is configured but a VAPID key is empty");
            }
        }
        if let Some(PaymentConfig::Stripe(stripe)) = &self.payment {
            if stripe.api_key.is_empty() || stripe.price_id.is_empty() {
                anyhow::bail!("stripe payment is configured but api_key or price_id is empty");
            }
        }
        if let Some(sync) = &self.data_sync {
            if !sync.repository.contains('/') {
                anyhow::bail!("data_sync.repository must be in owner/name form");
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes the tests that touch process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_are_embedded_ephemeral() {
        let config = Config::default();
        assert!(matches!(config.database, DatabaseConfig::Embedded { persistent: false, .. }));
        assert_eq!(config.limits.free_watchlist_limit, 10);
        assert!(!config.invites.required);
    }

    #[test]
    fn yaml_and_env_are_merged_with_env_winning() {
        let _guard = ENV_LOCK.lock().unwrap();
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 4000
                database:
                  type: external
                  url: postgres://yaml/db
                invites:
                  required: true
                "#,
            )?;
            jail.set_env("TICKERDECK_PORT", "5000");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            assert_eq!(config.port, 5000);
            assert!(config.invites.required);
            match config.database {
                DatabaseConfig::External { url } => assert_eq!(url, "postgres://yaml/db"),
                other => panic!("expected external database, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn database_url_env_overrides_database_section() {
        let _guard = ENV_LOCK.lock().unwrap();
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "database:\n  type: embedded\n")?;
            jail.set_env("DATABASE_URL", "postgres://replica/db");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            match config.database {
                DatabaseConfig::External { url } => assert_eq!(url, "postgres://replica/db"),
                other => panic!("expected external database, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn empty_vapid_key_fails_validation() {
        let config = Config {
            push: Some(PushConfig {
                vapid_public_key: String::new(),
                vapid_private_key: "key".to_string(),
                subject: default_push_subject(),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_sync_repository_fails_validation() {
        let config = Config {
            data_sync: Some(DataSyncConfig {
                repository: "not-a-repo".to_string(),
                workflow: "sync.yml".to_string(),
                git_ref: default_sync_ref(),
                token: "token".to_string(),
                api_base: default_sync_api_base(),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
