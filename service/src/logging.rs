use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

/// Dependencies whose output is suppressed unless running at Trace.
/// The reminder ticks and DB pool are chatty enough without them.
const FILTERED_MODULES: &[&str] = &["sqlx", "sea_orm", "hyper", "reqwest", "tokio_util"];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger at the configured level.
    ///
    /// Safe to call more than once (later calls are ignored with a warning on stderr),
    /// which matters for the binary and for tests that share a process.
    pub fn init_logger(config: &Config) {
        let level = Self::convert_level_filter(config.log_level_filter);
        let log_config = Self::build_log_config(config.log_level_filter != LevelFilter::Trace);

        if let Err(e) = simplelog::TermLogger::init(
            level,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        ) {
            eprintln!("Logger already initialized: {e}");
        }
    }

    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    /// RFC3339 timestamps, with dependency noise filtered when `quiet_dependencies` is set.
    fn build_log_config(quiet_dependencies: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if quiet_dependencies {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
