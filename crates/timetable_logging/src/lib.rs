//! Shared logging setup for timetable binaries.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "timetable=info,timetable_core=info";
const VERBOSE_LOG_FILTER: &str = "timetable=debug,timetable_core=debug";
const QUIET_CONSOLE_FILTER: &str = "warn";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Environment variable that relocates the timetable home directory.
pub const HOME_ENV: &str = "TIMETABLE_HOME";

pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Mirror debug output to stderr.
    pub verbose: bool,
}

fn console_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(VERBOSE_LOG_FILTER))
    } else {
        EnvFilter::new(QUIET_CONSOLE_FILTER)
    }
}

/// Log to `<home>/logs/<app>.log` and to stderr.
///
/// Returns the log file path. Fails without installing anything when the log
/// directory cannot be prepared; callers may fall back to [`init_stderr_logging`].
pub fn init_logging(config: LogConfig<'_>) -> Result<PathBuf> {
    let log_dir = ensure_logs_dir()?;
    let writer = SharedRollingWriter::new(&log_dir, config.app_name)?;
    let log_file = writer.path();

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(console_filter(config.verbose)),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(log_file)
}

/// Stderr-only logging, used when the log directory is unavailable.
pub fn init_stderr_logging(verbose: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(console_filter(verbose)),
        )
        .try_init()
        .context("Failed to install tracing subscriber")
}

/// `$TIMETABLE_HOME`, else `~/.timetable`.
pub fn timetable_home() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(HOME_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".timetable"))
        .context("Could not determine home directory; set TIMETABLE_HOME")
}

pub fn logs_dir() -> Result<PathBuf> {
    Ok(timetable_home()?.join("logs"))
}

pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir()?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Size-capped log file; `app.log` rotates through `app.log.1` .. `app.log.N`.
struct RollingFile {
    dir: PathBuf,
    stem: String,
    keep: usize,
    limit: u64,
    file: Option<File>,
    written: u64,
}

impl RollingFile {
    fn open(dir: &Path, app_name: &str, keep: usize, limit: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut rolling = Self {
            dir: dir.to_path_buf(),
            stem: sanitize_name(app_name),
            keep: keep.max(1),
            limit,
            file: None,
            written: 0,
        };
        rolling.reopen()?;
        if rolling.written > rolling.limit {
            rolling.rotate()?;
        }
        Ok(rolling)
    }

    fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.stem))
    }

    fn backup(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.stem, n))
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(self.path())?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
        let last = self.keep - 1;
        if last > 0 {
            let oldest = self.backup(last);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for n in (1..last).rev() {
                let from = self.backup(n);
                if from.exists() {
                    fs::rename(&from, self.backup(n + 1))?;
                }
            }
            if self.path().exists() {
                fs::rename(self.path(), self.backup(1))?;
            }
        } else {
            // Single-file mode: start over.
            File::create(self.path())?;
        }
        self.reopen()
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.limit {
            self.rotate()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// `MakeWriter` handing out handles to one shared [`RollingFile`].
#[derive(Clone)]
struct SharedRollingWriter {
    inner: Arc<Mutex<RollingFile>>,
    path: PathBuf,
}

impl SharedRollingWriter {
    fn new(dir: &Path, app_name: &str) -> Result<Self> {
        let rolling = RollingFile::open(dir, app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {app_name}"))?;
        Ok(Self {
            path: rolling.path(),
            inner: Arc::new(Mutex::new(rolling)),
        })
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

struct WriterHandle {
    inner: Arc<Mutex<RollingFile>>,
}

impl WriterHandle {
    fn with<T>(&self, f: impl FnOnce(&mut RollingFile) -> io::Result<T>) -> io::Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        f(&mut guard)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedRollingWriter {
    type Writer = WriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        WriterHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for WriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with(|file| file.flush())
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("timetable cli/v1"), "timetable_cli_v1");
    }

    #[test]
    fn test_rotation_keeps_bounded_backups() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "timetable", 3, 16).unwrap();
        for _ in 0..10 {
            file.write_all(b"0123456789abcdef").unwrap();
        }
        file.flush().unwrap();

        assert!(dir.path().join("timetable.log").exists());
        assert!(dir.path().join("timetable.log.1").exists());
        assert!(dir.path().join("timetable.log.2").exists());
        assert!(!dir.path().join("timetable.log.3").exists());
        let current = fs::read(dir.path().join("timetable.log")).unwrap();
        assert_eq!(current.len(), 16);
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut file = RollingFile::open(dir.path(), "app", 2, 1024).unwrap();
            file.write_all(b"first\n").unwrap();
        }
        let mut file = RollingFile::open(dir.path(), "app", 2, 1024).unwrap();
        file.write_all(b"second\n").unwrap();
        file.flush().unwrap();
        let text = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }
}
