use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "cadence_engine=trace"). When unset, `RUST_LOG` is consulted, then
/// `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Route output through the test harness' captured stdout.
    pub is_test: bool,
}

impl LoggingConfig {
    /// Config for unit tests: captured output, engine debug logs visible with `--nocapture`.
    pub fn for_tests() -> Self {
        Self {
            default_level: log::LevelFilter::Debug,
            is_test: true,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            is_test: false,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. If another logger was installed first, that
/// logger is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.default_level);
        }

        builder
            .write_style(config.write_style)
            .is_test(config.is_test);

        match builder.try_init() {
            Ok(()) => log::debug!("logging initialized"),
            Err(e) => log::debug!("logger already installed: {e}"),
        }
    });
}
