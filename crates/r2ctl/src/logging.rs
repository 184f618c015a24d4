//! Tracing setup. The UI owns the terminal, so logs go to a file.

use camino::Utf8Path;
use std::fs::{self, File, OpenOptions};
use std::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter, e.g. `r2ctl=debug`.
const LOG_FILTER_ENV: &str = "R2CTL_LOG";

pub fn init_tracing(log_path: &Utf8Path) {
    let filter = || {
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let layer: Box<dyn Layer<_> + Send + Sync> = match open_log_file(log_path) {
        Ok(file) => tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_filter(filter())
            .boxed(),
        Err(e) => {
            // Fallback to stderr if log file can't be opened.
            eprintln!("Cannot open log file {}: {}", log_path, e);
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_filter(filter())
                .boxed()
        }
    };

    tracing_subscriber::registry().with(layer).init();
}

/// Open the log file for appending, creating its parent directory.
fn open_log_file(log_path: &Utf8Path) -> io::Result<File> {
    if let Some(parent) = log_path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::io::Write;

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let (_dir, root) = temp_root();
        let path = root.join("logs/nested/r2ctl.log");

        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "first").unwrap();
        drop(file);
        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_log_file_reports_directory_error() {
        let (_dir, root) = temp_root();
        let blocker = root.join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        assert!(open_log_file(&blocker.join("r2ctl.log")).is_err());
    }
}
