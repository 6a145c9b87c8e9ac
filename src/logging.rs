use color_eyre::eyre::{Result, eyre};
use log::LevelFilter;
use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const LOG_FILE_NAME: &str = "healthcheck.log";
const FALLBACK_LOG_DIR: &str = "/tmp/healthcheck";

/// Logs go to a file; stdout carries only the report.
///
/// Tries the state directory, then `/tmp/healthcheck`. When neither can be
/// opened no logger is installed and the error lists every path tried.
pub fn init_logging(debug: bool) -> Result<PathBuf> {
    let log_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let candidates = [
        log_dir(env::var_os("XDG_STATE_HOME"), env::var_os("HOME")),
        PathBuf::from(FALLBACK_LOG_DIR),
    ];
    let (log_file, file) = open_log_file(&candidates)?;

    env_logger::Builder::new()
        .filter_level(log_level)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] - {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    log::info!("Logging initialized with level: {log_level}");
    Ok(log_file)
}

/// Opens `healthcheck.log` for appending in the first usable directory.
fn open_log_file(dirs: &[PathBuf]) -> Result<(PathBuf, File)> {
    let mut failures = Vec::new();

    for dir in dirs {
        let log_file = dir.join(LOG_FILE_NAME);
        match open_append(dir, &log_file) {
            Ok(file) => return Ok((log_file, file)),
            Err(e) => failures.push(format!("{}: {e}", log_file.display())),
        }
    }

    Err(eyre!("no usable log file ({})", failures.join("; ")))
}

fn open_append(dir: &Path, log_file: &Path) -> std::io::Result<File> {
    fs::create_dir_all(dir)?;
    fs::OpenOptions::new().create(true).append(true).open(log_file)
}

fn log_dir(xdg_state_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    match (xdg_state_home, home) {
        (Some(state), _) if !state.is_empty() => PathBuf::from(state).join("healthcheck"),
        (_, Some(home)) => PathBuf::from(home).join(".local/state/healthcheck"),
        _ => PathBuf::from(FALLBACK_LOG_DIR),
    }
}
