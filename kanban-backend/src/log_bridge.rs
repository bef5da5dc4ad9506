use env_logger::Logger;
use log::{Log, Metadata, Record, SetLoggerError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

/// Optional append-only log file, attached once config is known.
struct BackendLogFile {
    sink: Mutex<Option<(PathBuf, File)>>,
}

impl BackendLogFile {
    fn open(path: &Path) -> io::Result<File> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn append_line(&self, line: &str) {
        let mut guard = match self.sink.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if let Some((_, file)) = guard.as_mut() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.write_all(b"\n");
            let _ = file.flush();
        }
    }
}

static LOG_FILE: LazyLock<BackendLogFile> = LazyLock::new(|| BackendLogFile {
    sink: Mutex::new(None),
});

fn format_log_line(timestamp_ms: u64, record: &Record<'_>) -> String {
    format!(
        "{} [{}] [{}] {}",
        timestamp_ms,
        record.level(),
        record.target(),
        record.args().to_string().replace('\n', "\\n")
    )
}

/// Forwards to env_logger (stderr) and mirrors each record to the log file.
struct TeeLogger {
    inner: Logger,
}

impl Log for TeeLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.inner.log(record);

        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        LOG_FILE.append_line(&format_log_line(timestamp_ms, record));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger. Filter defaults to `info`, override with RUST_LOG.
pub fn init() -> Result<(), SetLoggerError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    let inner = builder.build();
    let max_level = inner.filter();
    let logger = Box::leak(Box::new(TeeLogger { inner }));
    log::set_logger(logger)?;
    log::set_max_level(max_level);
    Ok(())
}

/// Start mirroring log records into `path`, replacing any previous file.
pub fn attach_file(path: &Path) -> io::Result<()> {
    let file = BackendLogFile::open(path)?;
    if let Ok(mut guard) = LOG_FILE.sink.lock() {
        *guard = Some((path.to_path_buf(), file));
    }
    Ok(())
}

#[cfg(test)]
fn log_file_path() -> Option<PathBuf> {
    LOG_FILE
        .sink
        .lock()
        .ok()
        .and_then(|guard| guard.as_ref().map(|(path, _)| path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_log_line_escapes_newlines() {
        let line = format_log_line(
            42,
            &Record::builder()
                .args(format_args!("first\nsecond"))
                .level(log::Level::Warn)
                .target("kanban.test")
                .build(),
        );
        assert_eq!(line, "42 [WARN] [kanban.test] first\\nsecond");
    }

    #[test]
    fn test_attach_file_records_path_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("backend.log");
        attach_file(&path).unwrap();
        assert_eq!(log_file_path(), Some(path.clone()));
        LOG_FILE.append_line("hello");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("hello"));
    }
}
