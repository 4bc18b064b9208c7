//! Dual-sink tracing setup.
//!
//! Everything at the configured level goes to `log.file`; warnings and
//! errors are also echoed to stderr. The returned guard must be held for the
//! lifetime of the process so buffered file lines are flushed on exit.

use std::io::IsTerminal;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use airbeam_config::{LogFormat, LogSettings};

use crate::error::CliError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Crates whose events reach the log file at the configured level.
const OWN_CRATES: [&str; 4] = ["airbeam", "airbeam_api", "airbeam_core", "airbeam_config"];

/// Install the global subscriber. `RUST_LOG` overrides the file filter.
pub fn init(settings: &LogSettings, debug: bool) -> Result<WorkerGuard, CliError> {
    let level = if debug { "debug" } else { "info" };
    let directives = std::iter::once("warn".to_owned())
        .chain(OWN_CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<_>>()
        .join(",");
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let path = settings.file.display().to_string();
    let dir = settings
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = settings.file.file_name().ok_or_else(|| CliError::LogFile {
        path: path.clone(),
        source: "log.file has no file name".into(),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| CliError::LogFile {
            path,
            source: Box::new(e),
        })?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let timer = ChronoLocal::new(settings.dateformat.clone());

    let file_layer: BoxedLayer = match settings.log_format() {
        LogFormat::Full => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_timer(timer.clone())
            .with_filter(file_filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_ansi(false)
            .with_timer(timer.clone())
            .with_filter(file_filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_timer(timer.clone())
            .with_filter(file_filter)
            .boxed(),
    };

    let console_layer: BoxedLayer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_timer(timer)
        .with_target(false)
        .with_filter(LevelFilter::WARN)
        .boxed();

    tracing_subscriber::registry()
        .with(vec![file_layer, console_layer])
        .try_init()
        .map_err(|_| CliError::LoggingInit)?;

    Ok(guard)
}
