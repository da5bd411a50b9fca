use crate::{CliError, CliResult};

use std::fmt::Arguments;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{Record, debug};
use wp_config::LogLevel;

/// Initialize the global logger.
///
/// * `log_file` - None = stderr, Some = append to that file
/// * `colored` - level colors on stderr (ignored when logging to file)
///
/// Logs never go to stdout, which carries command output.
pub fn initialize(log_level: LogLevel, log_file: Option<PathBuf>, colored: bool) -> CliResult<()> {
    let level_filter = log_level.0;

    let output = match log_file {
        Some(ref log_path) => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CliError::logger(format!(
                        "Failed to create log directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }

            let file = fern::log_file(log_path).map_err(|e| {
                CliError::logger(format!(
                    "Failed to open log file {}: {e}",
                    log_path.display()
                ))
            })?;

            Dispatch::new()
                .format(|out, message, record| format_line(out, message, record, record.level()))
                .chain(file)
        }
        None if colored => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);

            Dispatch::new()
                .format(move |out, message, record| {
                    format_line(out, message, record, colors.color(record.level()))
                })
                .chain(std::io::stderr())
        }
        None => Dispatch::new()
            .format(|out, message, record| format_line(out, message, record, record.level()))
            .chain(std::io::stderr()),
    };

    Dispatch::new()
        .level(level_filter)
        .chain(output)
        .apply()
        .map_err(|e| CliError::logger(format!("Failed to initialize logger: {e}")))?;

    match log_file {
        Some(ref path) => debug!(
            "Logger initialized: level={level_filter:?}, file={}",
            path.display()
        ),
        None => debug!("Logger initialized: level={level_filter:?}, stderr"),
    }

    Ok(())
}

/// `[rfc3339 - LEVEL] message [file:line]`
fn format_line(
    out: FormatCallback<'_>,
    message: &Arguments<'_>,
    record: &Record<'_>,
    level: impl std::fmt::Display,
) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = humantime::format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}
