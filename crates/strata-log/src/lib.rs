//! Structured logging for Strata binaries.
//!
//! Library crates only emit `tracing` events; this crate installs the
//! subscriber. Console output carries uptime timestamps and module paths, and
//! debug builds can additionally write JSON lines to `strata.log` for
//! inspecting a capture after the fact.

use std::path::Path;

use strata_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written into `log_dir`.
pub const LOG_FILE_NAME: &str = "strata.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether file logging may be enabled
/// * `config` - supplies the level and whether the file layer is wanted
///
/// `RUST_LOG`, when set, takes precedence over the config level.
///
/// # Examples
///
/// ```no_run
/// use strata_config::Config;
/// use strata_log::init_logging;
///
/// let config = Config::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let file_wanted = debug_build && config.is_none_or(|c| c.debug.log_to_file);

    if file_wanted
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter directive string derived from the config's log level.
pub fn filter_for(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_without_config() {
        assert_eq!(filter_for(None), "info");
    }

    #[test]
    fn test_filter_uses_config_level() {
        let mut config = Config::default();
        config.debug.log_level = "warn,strata_world=trace".to_string();
        assert_eq!(filter_for(Some(&config)), "warn,strata_world=trace");
    }

    #[test]
    fn test_empty_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level.clear();
        assert_eq!(filter_for(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_subsystem_filters_parse() {
        for filter_str in ["info", "debug,strata_voxel=trace", "warn,strata_world=debug"] {
            let filter = EnvFilter::try_new(filter_str);
            assert!(filter.is_ok(), "Failed to parse filter: {filter_str}");
        }
    }

    // The only test that installs the global subscriber.
    #[test]
    fn test_init_writes_json_log_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");
        init_logging(Some(&log_dir), true, Some(&Config::default()));

        let log_file_path = log_dir.join(LOG_FILE_NAME);
        assert!(log_file_path.exists());

        tracing::error!(chunk = 3, "file layer check");
        let contents = std::fs::read_to_string(&log_file_path).unwrap();
        let line = contents.lines().find(|line| line.contains("file layer check")).unwrap();
        assert!(line.starts_with('{') && line.contains("\"chunk\":3"));
    }
}
