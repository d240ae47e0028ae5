#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context as _;

/// Default filter for commands that only print a result.
#[cfg(not(target_arch = "wasm32"))]
pub const QUIET: &str = "warn";
/// Default filter for the long-running server; request spans come from `tower_http`.
#[cfg(not(target_arch = "wasm32"))]
pub const SERVER: &str = "info,tower_http=debug";

/// Installs a stderr subscriber. `RUST_LOG` wins over `default_directives`.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(default_directives: &str) -> anyhow::Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(default_directives)
            .with_context(|| format!("build log filter from {default_directives:?}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}

/// Routes panics and `tracing` events at `INFO` and above to the browser
/// console.
#[cfg(target_arch = "wasm32")]
pub fn init() -> anyhow::Result<()> {
    use tracing_subscriber::layer::SubscriberExt as _;

    console_error_panic_hook::set_once();

    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(tracing::Level::INFO)
        .build();
    let subscriber = tracing_subscriber::registry().with(tracing_wasm::WASMLayer::new(config));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
