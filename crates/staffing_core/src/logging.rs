//! File logging for staffing processes.
//!
//! # Responsibility
//! - Start one rotating `flexi_logger` file backend per process.
//! - Copy warnings and errors to stderr.
//! - Record panics as single-line, length-capped log events.
//!
//! # Invariants
//! - Repeating the first configuration is a no-op; any other configuration
//!   is refused once logging runs.
//! - Nothing here panics.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "staffing";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 7;
const PANIC_MESSAGE_LIMIT: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    /// Log directory must be absolute and non-empty.
    BadDirectory(PathBuf),
    CreateDirectory { dir: PathBuf, source: std::io::Error },
    Backend(flexi_logger::FlexiLoggerError),
    AlreadyRunning { level: LevelFilter, log_dir: PathBuf },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unknown log level `{level}` (use trace, debug, info, warn or error)"
            ),
            Self::BadDirectory(dir) => {
                write!(f, "log directory `{}` must be an absolute path", dir.display())
            }
            Self::CreateDirectory { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "log backend failed to start: {err}"),
            Self::AlreadyRunning { level, log_dir } => write!(
                f,
                "logging already runs at {level} in `{}`",
                log_dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts file logging at `level` under `log_dir`.
///
/// Calling again with the same arguments succeeds without side effects.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let log_dir = check_dir(log_dir.as_ref())?;

    let active = ACTIVE.get_or_try_init(|| start(level, &log_dir))?;
    if active.level != level || active.log_dir != log_dir {
        return Err(LoggingError::AlreadyRunning {
            level: active.level,
            log_dir: active.log_dir.clone(),
        });
    }
    Ok(())
}

/// Level and directory of the running logger, if any.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// Level used when none is configured: `debug` in debug builds, else `info`.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    let trimmed = raw.trim();
    let candidate = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else {
        trimmed
    };
    match candidate.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::UnknownLevel(trimmed.to_string())),
        Ok(level) => Ok(level),
    }
}

fn check_dir(dir: &Path) -> Result<PathBuf, LoggingError> {
    if dir.as_os_str().is_empty() || !dir.is_absolute() {
        return Err(LoggingError::BadDirectory(dir.to_path_buf()));
    }
    Ok(dir.to_path_buf())
}

fn start(level: LevelFilter, log_dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDirectory {
        dir: log_dir.to_path_buf(),
        source,
    })?;

    let spec = LogSpecification::builder().default(level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    PANIC_HOOK.get_or_init(install_panic_hook);
    info!(
        "event=logging_init module=core status=ok level={level} log_dir={} version={}",
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!(
            "event=panic_captured module=core status=error location={location} message={}",
            panic_message(info)
        );
        previous(info);
    }));
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string payload>".to_string());
    single_line(&text, PANIC_MESSAGE_LIMIT)
}

/// Flattens line breaks and caps `text` at `limit` characters.
fn single_line(text: &str, limit: usize) -> String {
    let flat: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut capped: String = flat.chars().take(limit).collect();
    capped.push_str("...");
    capped
}
