use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ServerConfig};

/// Level comes from `[logging] level`; `RUST_LOG` still wins when set.
pub fn init_tracing(config: &ServerConfig) -> Result<(), ConfigError> {
    let level = config
        .logging
        .level
        .as_deref()
        .unwrap_or("info")
        .trim()
        .to_string();
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("{level},sqlx=warn"))
            .map_err(|e| ConfigError::Invalid(format!("invalid logging.level: {e}")))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
    Ok(())
}
