// Logging setup for the magpie runtime.
//
// Built on the `tracing` ecosystem. The runtime itself only emits events
// (worker lifecycle, queue close/drain); initializing a subscriber is the
// embedding application's choice, and these helpers cover the common
// cases:
//
// ```rust
// use magpie::logging;
//
// // INFO level, console output
// logging::init_default();
//
// // or DEBUG with worker thread names, for development
// logging::init_development();
// ```
//
// Worker threads are named (`magpie-worker-<id>`), so enabling thread
// names in the output is usually worth it when debugging pool behavior.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Configuration for the logging helpers.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display.
    pub level: Level,
    /// Whether to include file and line information.
    pub show_file_line: bool,
    /// Whether to include thread names/ids.
    pub show_thread_info: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...").
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            show_file_line: false,
            show_thread_info: true,
            target_filters: None,
        }
    }
}

// Only the first initialization takes effect.
static INIT: Once = Once::new();

/// Initialize the global tracing subscriber with the given configuration.
///
/// Safe to call multiple times; calls after the first are no-ops. The
/// `RUST_LOG` environment variable is honored on top of `config.level`.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

        if let Some(filters) = config.target_filters {
            for filter in filters.split(',') {
                if let Ok(directive) = filter.parse() {
                    env_filter = env_filter.add_directive(directive);
                }
            }
        }

        let fmt_layer = fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info)
            .with_thread_ids(config.show_thread_info);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer);

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Error setting global tracing subscriber: {err}");
        }
    });
}

/// Initialize with default settings (INFO level, console output).
pub fn init_default() {
    init(LogConfig::default());
}

/// Initialize with development-friendly settings (DEBUG level, file/line
/// info, thread names).
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        show_file_line: true,
        show_thread_info: true,
        target_filters: None,
    });
}
