use anyhow::Result;

/// Install structured JSON logging for an embedding service.
///
/// The level comes from `RUST_LOG`, with `default_directive` (for example
/// `"pagehit=info"`) added on top. Fails if a global subscriber is already set.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse()?),
        )
        .json()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
