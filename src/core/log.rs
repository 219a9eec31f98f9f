use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. Silent unless `verbose` or `RUST_LOG` is set.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env();
    let level_filter = match (verbose, &env_filter) {
        (true, _) => LevelFilter::DEBUG,
        (false, Ok(_)) => LevelFilter::TRACE,
        (false, Err(_)) => LevelFilter::OFF,
    };
    let level = if verbose { "debug" } else { "off" };
    let app_filter = Targets::new().with_target("mfcompare", level_filter);
    let env_filter = env_filter.unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(app_filter)
        .with(env_filter)
        .init();
}
