//! Platform logging setup.

use std::sync::Once;

const DEFAULT_FILTER: &str = "debug";

static INIT: Once = Once::new();

/// Initializes logging for the current platform.
///
/// Safe to call more than once; only the first call has an effect. If the host
/// application already installed a logger, that logger is kept.
pub fn init_logging() {
    INIT.call_once(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(log::LevelFilter::Trace) // limit log level
                    .with_tag("rmp-counter")
                    .with_filter(
                        android_logger::FilterBuilder::new()
                            .parse(DEFAULT_FILTER)
                            .build(),
                    ),
            );
        }
        #[cfg(not(target_os = "android"))]
        {
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(DEFAULT_FILTER),
            )
            .try_init();
        }
        log_panics::init();

        log::debug!("core: logging initialized");
    });
}
