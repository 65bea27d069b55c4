use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Log an error using the alternate selector, which emits the error chain.
pub fn log_error(e: impl Into<anyhow::Error>) {
    let e: anyhow::Error = e.into();
    tracing::error!("{e:#}");
}

/// Pretty stderr output filtered by `RUST_LOG`, or `default_filter` when it
/// is unset.
pub fn get_subscriber(
    default_filter: impl Into<String>,
) -> impl Subscriber + Sync + Send {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.into()));
    let stderr = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .pretty()
        .with_span_events(fmt::format::FmtSpan::CLOSE);
    Registry::default().with(env_filter).with(stderr)
}

/// Register a subscriber as global default. Fails if one is already set.
pub fn init_subscriber(
    subscriber: impl Subscriber + Sync + Send + 'static,
) -> anyhow::Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}

/// Test binaries spawn many backends; only the first call installs the
/// subscriber (and the `log` bridge), later ones are ignored.
pub fn init_test_subscriber() {
    let _ = get_subscriber("error").try_init();
}
