use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes logging to stderr. `RUST_LOG` overrides the default `warn`
/// level so command output on stdout stays clean.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("tracing already initialized: {err}"))?;

    Ok(())
}
