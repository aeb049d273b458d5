use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Levels used when `RUST_LOG` is unset. Calculator output goes to stdout, so
/// only warnings reach stderr unless `--verbose` asks for this crate's debug
/// output. The store and HTTP client stay at warnings either way.
fn default_targets(verbose: bool) -> Targets {
    let app_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    Targets::new()
        .with_default(LevelFilter::ERROR)
        .with_target("fincalc", app_level)
        .with_targets([
            ("fjall", LevelFilter::WARN),
            ("lsm_tree", LevelFilter::WARN),
            ("reqwest", LevelFilter::WARN),
            ("hyper_util", LevelFilter::WARN),
        ])
}

/// Installs the global subscriber writing to stderr. `RUST_LOG` replaces the
/// default levels entirely.
pub fn init_logging(verbose: bool) {
    let registry = tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr));

    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => registry.with(env_filter).init(),
        Err(_) => registry.with(default_targets(verbose)).init(),
    }
}
