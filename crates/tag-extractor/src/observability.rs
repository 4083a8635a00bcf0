//! Logging setup for the CLI.
//!
//! Logs go to a file so stdout stays reserved for reports. The destination is
//! the first of:
//! 1. `TAG_EXTRACTOR_LOG_PATH` (exact file)
//! 2. `TAG_EXTRACTOR_LOG_DIR` (directory, file `tag-extractor.log`)
//! 3. `log_dir` from config
//! 4. the platform data directory (`~/.local/share/tag-extractor/logs` on Linux)
//!
//! If none of these can be used, logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_PATH_ENV: &str = "TAG_EXTRACTOR_LOG_PATH";
const LOG_DIR_ENV: &str = "TAG_EXTRACTOR_LOG_DIR";
const LOG_FILE_PREFIX: &str = "tag-extractor";
const LOG_FILE_SUFFIX: &str = "log";

/// Where log output should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to this exact file.
    File(PathBuf),
    /// Append to `tag-extractor.log` in this directory.
    Dir(PathBuf),
    /// Write to stderr.
    Stderr,
}

/// Resolved logging destination.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// The chosen target.
    pub target: LogTarget,
}

impl ObservabilityConfig {
    /// Resolve the destination from the environment, then `config_log_dir`,
    /// then the platform default.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_ENV).map(PathBuf::from),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            config_log_dir,
            tag_extractor_core::config::user_data_local_dir()
                .map(|dir| dir.join("logs").into_std_path_buf()),
        )
    }

    fn resolve(
        env_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
        platform_dir: Option<PathBuf>,
    ) -> Self {
        let target = env_path
            .filter(|p| !p.as_os_str().is_empty())
            .map(LogTarget::File)
            .or_else(|| {
                env_dir
                    .filter(|d| !d.as_os_str().is_empty())
                    .or(config_dir)
                    .or(platform_dir)
                    .map(LogTarget::Dir)
            })
            .unwrap_or(LogTarget::Stderr);
        Self { target }
    }
}

/// Build the log filter.
///
/// `RUST_LOG` wins when set. Otherwise `--quiet` selects `error`, `-v`
/// selects `debug`, `-vv` and up select `trace`, and the configured level
/// applies when neither flag is given.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => default_level,
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    EnvFilter::new(level)
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let appender = match &config.target {
        LogTarget::File(path) => file_appender(
            path.parent().unwrap_or_else(|| Path::new(".")),
            &path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("log path has no file name")?,
            None,
        ),
        LogTarget::Dir(dir) => file_appender(dir, LOG_FILE_PREFIX, Some(LOG_FILE_SUFFIX)),
        LogTarget::Stderr => None,
    };

    let Some(appender) = appender else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init()
            .context("failed to install stderr logger")?;
        return Ok(None);
    };

    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter),
        )
        .try_init()
        .context("failed to install file logger")?;
    Ok(Some(guard))
}

/// A non-rotating appender, or `None` when the directory is unusable.
fn file_appender(dir: &Path, prefix: &str, suffix: Option<&str>) -> Option<RollingFileAppender> {
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(prefix);
    if let Some(suffix) = suffix {
        builder = builder.filename_suffix(suffix);
    }
    builder.build(dir).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_path_wins() {
        let cfg = ObservabilityConfig::resolve(
            Some(PathBuf::from("/tmp/x.log")),
            Some(PathBuf::from("/tmp/dir")),
            Some(PathBuf::from("/cfg")),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(cfg.target, LogTarget::File(PathBuf::from("/tmp/x.log")));
    }

    #[test]
    fn config_dir_beats_platform_default() {
        let cfg = ObservabilityConfig::resolve(
            None,
            None,
            Some(PathBuf::from("/cfg")),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(cfg.target, LogTarget::Dir(PathBuf::from("/cfg")));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let cfg = ObservabilityConfig::resolve(
            Some(PathBuf::new()),
            Some(PathBuf::new()),
            None,
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(cfg.target, LogTarget::Dir(PathBuf::from("/platform")));
    }

    #[test]
    fn falls_back_to_stderr() {
        let cfg = ObservabilityConfig::resolve(None, None, None, None);
        assert_eq!(cfg.target, LogTarget::Stderr);
    }

    #[test]
    fn appender_in_fresh_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("logs");
        assert!(file_appender(&dir, LOG_FILE_PREFIX, Some(LOG_FILE_SUFFIX)).is_some());
        assert!(dir.is_dir());
    }
}
