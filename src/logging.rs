//! Logging for the server and the one-shot commands.
//!
//! Output goes to stderr with a compact timestamp, so `tree --json` and
//! `config` keep stdout clean. Each component logs under its own target
//! (`dirview::watcher`, `dirview::mirror`, ...), which makes the
//! `[logging.modules]` table usable per component:
//!
//! ```toml
//! [logging]
//! default = "warn"
//!
//! [logging.modules]
//! "dirview::watcher" = "debug"
//! tower_http = "debug"
//! ```
//!
//! `RUST_LOG` replaces the configured filter entirely.

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Dependencies that are chatty at `info` and below.
const QUIET_TARGETS: &[&str] = &["tower_http", "hyper", "notify"];

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Filter directives for `config`.
///
/// Dependencies in [`QUIET_TARGETS`] are held at `warn` unless the config
/// names them explicitly.
fn filter_directives(config: &LoggingConfig) -> String {
    let mut directives = vec![config.default.clone()];
    for target in QUIET_TARGETS {
        if !config.modules.contains_key(*target) {
            directives.push(format!("{target}=warn"));
        }
    }
    for (module, level) in &config.modules {
        directives.push(format!("{module}={level}"));
    }
    directives.join(",")
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::from_default_env();
    }

    let directives = filter_directives(config);
    EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Invalid logging config '{directives}': {e}; using defaults");
        EnvFilter::new(filter_directives(&LoggingConfig::default()))
    })
}

/// Install the global subscriber.
///
/// Only the first call in a process has an effect.
pub fn init(config: &LoggingConfig) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(CompactTime)
        .with_level(true)
        .with_filter(build_filter(config));

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// Log an event at `info` under the `dirview::<component>` target.
///
/// ```ignore
/// log_event!("mirror", "loaded", "{} files", count);
/// log_event!("server", "stopped");
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:literal, $event:expr) => {
        tracing::info!(target: concat!("dirview::", $component), "{}", $event)
    };
    ($component:literal, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: concat!("dirview::", $component), "{}: {}", $event, format!($($arg)*))
    };
}

/// Same as [`log_event!`] at `debug`.
#[macro_export]
macro_rules! debug_event {
    ($component:literal, $event:expr) => {
        tracing::debug!(target: concat!("dirview::", $component), "{}", $event)
    };
    ($component:literal, $event:expr, $($arg:tt)*) => {
        tracing::debug!(target: concat!("dirview::", $component), "{}: {}", $event, format!($($arg)*))
    };
}
