//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; without it, application logs are verbose and
/// sqlx statement logging is kept quiet.
pub fn init_telemetry() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tickerdeck=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;

    Ok(())
}
