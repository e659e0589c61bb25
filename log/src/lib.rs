//! Logging setup for varview with file output and optional stdout.
//!
//! Logs always go to a file at `warn` level (or the user's level when one is set).
//! Stdout logging is enabled when `VARVIEW_LOG` or `RUST_LOG` is set, or in debug builds.
//!
//! ## Environment Variables
//!
//! 1. **`VARVIEW_LOG`** (highest priority) - varview-specific logging control
//! 2. **`RUST_LOG`** - Standard tracing environment variable
//! 3. **Default** - `warn` globally, `info` for varview crates
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/varview/logs/varview-<pid>.log`
//! - macOS: `~/Library/Application Support/varview/logs/varview-12345.log`
//! - Linux: `~/.local/share/varview/logs/varview-12345.log`
//!
//! Override with `--log-file <path>`. A path with an extension names the file,
//! any other path names the directory.

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

const CRATES: &[&str] = &["varview", "varview_bin", "varview_log"];

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Default)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
}

/// Initialize logging.
///
/// Filters follow the priority in the module docs:
/// `VARVIEW_LOG` > `RUST_LOG` > default settings.
///
/// The returned [`LogGuard`] must be held for the lifetime of the program;
/// dropping it flushes and stops the background file writer.
pub fn init(config: LogConfig) -> Result<LogGuard, BoxError> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_file_filter());

    let stdout_enabled = user_filter_set() || cfg!(debug_assertions);
    let stdout_layer = stdout_enabled.then(|| fmt::layer().with_filter(create_filter()));

    Registry::default()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    let log_file = log_dir.join(filename);
    tracing::debug!(log_file = %log_file.display(), "logging initialized");
    Ok(LogGuard {
        _file_guard: file_guard,
        log_file,
    })
}

/// Initialize logging for tests.
///
/// Stdout only, no file output. Safe to call from every test; calls after the
/// first are ignored.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn user_filter_set() -> bool {
    env::var("VARVIEW_LOG").is_ok() || env::var("RUST_LOG").is_ok()
}

/// Directory and file name for the log file.
fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("varview-{}.log", std::process::id());

    match override_path {
        Some(path) if path.extension().is_some() => {
            let dir = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or(filename);
            (dir, name)
        }
        Some(dir) => (dir, filename),
        None => {
            let dir = dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("varview")
                .join("logs");
            (dir, filename)
        }
    }
}

/// File filter: the user's filter if set, otherwise `warn`.
fn create_file_filter() -> EnvFilter {
    if user_filter_set() {
        return create_filter();
    }
    EnvFilter::new("warn")
}

/// Filter following `VARVIEW_LOG` > `RUST_LOG` > defaults.
fn create_filter() -> EnvFilter {
    if let Ok(varview_log) = env::var("VARVIEW_LOG") {
        return EnvFilter::new(expand_varview_log(&varview_log));
    }
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }
    EnvFilter::new(crate_directives("info"))
}

/// Expand a bare level such as `VARVIEW_LOG=debug` to every varview crate.
///
/// Values with directive syntax (`=`, `:` or `,`) are used as-is.
fn expand_varview_log(varview_log: &str) -> String {
    if varview_log.contains(['=', ':', ',']) {
        return varview_log.to_string();
    }
    crate_directives(varview_log)
}

fn crate_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for krate in CRATES {
        directives.push_str(&format!(",{krate}={level}"));
    }
    directives
}
