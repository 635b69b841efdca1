//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.
//! `RUST_LOG` 优先于配置中的 `LOG_LEVEL`。

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// Returns the appender guard when logging to a file; keep it alive for the
/// lifetime of the process or buffered lines are lost.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: Option<bool>,
    log_dir: Option<&str>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    let file_writer = log_dir.and_then(|dir| {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_err() {
            return None;
        }
        let file_appender = tracing_appender::rolling::daily(log_path, "order-server");
        Some(tracing_appender::non_blocking(file_appender))
    });

    // try_init: 测试中可能被重复调用
    match (file_writer, json.unwrap_or(false)) {
        (Some((writer, guard)), true) => {
            let _ = builder.json().with_writer(writer).try_init();
            Some(guard)
        }
        (Some((writer, guard)), false) => {
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
            Some(guard)
        }
        (None, true) => {
            let _ = builder.json().try_init();
            None
        }
        (None, false) => {
            let _ = builder.try_init();
            None
        }
    }
}

/// Remove rolled log files older than `days`
pub fn cleanup_old_logs(log_dir: &str, days: u64) -> std::io::Result<usize> {
    let cutoff = std::time::SystemTime::now()
        - std::time::Duration::from_secs(days.saturating_mul(24 * 60 * 60));
    let mut removed = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with("order-server") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if modified < cutoff {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_recent_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("order-server.2030-01-01"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let removed = cleanup_old_logs(&dir.path().to_string_lossy(), 7).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
