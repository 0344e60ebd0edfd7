use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Fallback filter variable consulted when `RUST_LOG` is not set.
pub const LOG_ENV: &str = "TPSBLOCKS_LOG_LEVEL";

pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let builder = EnvFilter::builder().with_default_directive(default.into());

    // `RUST_LOG` wins; otherwise fall back to `LOG_ENV`.
    let env_filter = builder
        .try_from_env()
        .or_else(|_| builder.with_env_var(LOG_ENV).from_env())?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).try_init()?;
    Ok(())
}
