//! Configuration loading and discovery.
//!
//! Sources are layered with figment, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config: `config.<ext>` in the platform config directory
//!    (`~/.config/tag-extractor/` on Linux)
//! 3. Project config: the closest directory, walking up from the search root,
//!    that holds `.tag-extractor.<ext>` and/or `tag-extractor.<ext>`
//! 4. Explicit files added with [`ConfigLoader::with_file`]
//! 5. `TAG_EXTRACTOR_*` environment variables
//!
//! `<ext>` is one of `toml`, `yaml`, `yml`, `json`. Within one directory the
//! dotfile loses to the regular file, and extensions merge in that order.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use tag_extractor_core::config::ConfigLoader;
//!
//! let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap()).unwrap();
//! let (config, sources) = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! println!("stop words: {:?} (from {:?})", config.stop_words, sources.primary_file());
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::session::DEFAULT_MAX_INPUT_BYTES;

/// The configuration for tag-extractor.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application ("trace", "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for log files (falls back to the platform data directory).
    pub log_dir: Option<Utf8PathBuf>,
    /// Stop-words file used when none is given on the command line.
    pub stop_words: Option<Utf8PathBuf>,
    /// Maximum input size in bytes (default: 5 MiB).
    pub max_input_bytes: Option<u64>,
    /// Disable the input size limit entirely; `max_input_bytes` is ignored.
    pub disable_input_limit: bool,
}

impl Config {
    /// The effective input limit, or `None` when the limit is disabled.
    pub fn input_limit(&self) -> Option<u64> {
        if self.disable_input_limit {
            None
        } else {
            Some(self.max_input_bytes.unwrap_or(DEFAULT_MAX_INPUT_BYTES))
        }
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-line detail.
    Trace,
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Which configuration files were merged by [`ConfigLoader::load`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project config files, ordered low→high precedence.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// User config file from the platform config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Explicit config files (e.g., from `--config`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// The highest-precedence file that was loaded, if any.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .or_else(|| self.project_files.last())
            .map(Utf8PathBuf::as_path)
            .or(self.user_file.as_deref())
    }
}

/// Supported configuration file extensions, merged in this order.
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for config file names and platform directories.
const APP_NAME: &str = "tag-extractor";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "TAG_EXTRACTOR_";

/// Builder for loading configuration from multiple sources.
#[derive(Debug)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader that includes user config and stops at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for project config.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Include or skip the user config file.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop walking up at a directory containing `marker`. Default is `.git`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Walk all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Merge every source and extract the configuration.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let mut sources = ConfigSources::default();

        if self.include_user_config
            && let Some(user_config) = find_user_config()
        {
            figment = merge_file(figment, &user_config);
            sources.user_file = Some(user_config);
        }

        if let Some(ref root) = self.project_search_root {
            let project_configs = self.find_project_configs(root);
            for path in &project_configs {
                figment = merge_file(figment, path);
            }
            sources.project_files = project_configs;
        }

        for path in &self.explicit_files {
            figment = merge_file(figment, path);
        }
        sources.explicit_files = self.explicit_files;

        // TAG_EXTRACTOR_STOP_WORDS=stop.txt, TAG_EXTRACTOR_LOG_LEVEL=debug, ...
        figment = figment.merge(Env::prefixed(ENV_PREFIX).lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::debug!(
            log_level = config.log_level.as_str(),
            stop_words = ?config.stop_words,
            "configuration loaded"
        );
        Ok((config, sources))
    }

    /// Like [`load`](Self::load), but fails when no config file exists.
    pub fn load_or_error(self) -> ConfigResult<(Config, ConfigSources)> {
        let has_user = self.include_user_config && find_user_config().is_some();
        let has_project = self
            .project_search_root
            .as_ref()
            .is_some_and(|root| !self.find_project_configs(root).is_empty());
        if !has_user && !has_project && self.explicit_files.is_empty() {
            return Err(ConfigError::NotFound);
        }
        self.load()
    }

    /// Config files in the closest directory that has any, low→high
    /// precedence.
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let found: Vec<Utf8PathBuf> = [format!(".{APP_NAME}"), APP_NAME.to_string()]
                .iter()
                .flat_map(|stem| {
                    CONFIG_EXTENSIONS
                        .iter()
                        .map(move |ext| format!("{stem}.{ext}"))
                })
                .map(|name| dir.join(name))
                .filter(|path| path.is_file())
                .collect();

            if !found.is_empty() {
                return found;
            }

            // The marker directory itself is still searched above.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
                && dir != start
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        Vec::new()
    }
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

/// Merge a config file, picking the format from its extension (TOML by default).
fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

/// The user config directory (`~/.config/tag-extractor/` on Linux,
/// `~/Library/Application Support/tag-extractor/` on macOS).
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok()
}

/// The local data directory, used as the default log location.
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(dirs.data_local_dir().to_path_buf()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    /// Serializes tests that read or write `TAG_EXTRACTOR_*` variables.
    static TEST_ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        TEST_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
        Utf8PathBuf::try_from(path).unwrap()
    }

    fn isolated() -> ConfigLoader {
        ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.stop_words.is_none());
        assert_eq!(config.input_limit(), Some(DEFAULT_MAX_INPUT_BYTES));
    }

    #[test]
    fn loads_defaults_without_files() {
        let _lock = env_lock();
        let (config, sources) = isolated().load().unwrap();
        assert_eq!(config, Config::default());
        assert!(sources.primary_file().is_none());
    }

    #[test]
    fn explicit_toml_file() {
        let _lock = env_lock();
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("custom.toml"));
        fs::write(
            &path,
            "log_level = \"debug\"\nstop_words = \"lists/english.txt\"\nmax_input_bytes = 1024\n",
        )
        .unwrap();

        let (config, sources) = isolated().with_file(&path).load().unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.stop_words.as_deref(), Some(Utf8Path::new("lists/english.txt")));
        assert_eq!(config.input_limit(), Some(1024));
        assert_eq!(sources.primary_file(), Some(path.as_path()));
    }

    #[test]
    fn later_explicit_file_wins() {
        let _lock = env_lock();
        let tmp = TempDir::new().unwrap();
        let base = utf8(tmp.path().join("base.yaml"));
        let over = utf8(tmp.path().join("over.json"));
        fs::write(&base, "log_level: warn\nstop_words: base.txt\n").unwrap();
        fs::write(&over, r#"{"log_level": "error"}"#).unwrap();

        let (config, _) = isolated().with_file(&base).with_file(&over).load().unwrap();
        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(config.stop_words.as_deref(), Some(Utf8Path::new("base.txt")));
    }

    #[test]
    fn discovers_project_config_from_subdirectory() {
        let _lock = env_lock();
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("project").join("docs").join("drafts");
        fs::create_dir_all(&deep).unwrap();
        fs::write(
            tmp.path().join("project").join(".tag-extractor.toml"),
            "stop_words = \"stop.txt\"\n",
        )
        .unwrap();

        let (config, sources) = isolated().with_project_search(utf8(deep)).load().unwrap();
        assert_eq!(config.stop_words.as_deref(), Some(Utf8Path::new("stop.txt")));
        assert_eq!(sources.project_files.len(), 1);
    }

    #[test]
    fn regular_file_beats_dotfile_in_same_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".tag-extractor.toml"), "log_level = \"warn\"\n").unwrap();
        fs::write(tmp.path().join("tag-extractor.toml"), "log_level = \"error\"\n").unwrap();

        let (config, sources) = isolated()
            .with_project_search(utf8(tmp.path().to_path_buf()))
            .load()
            .unwrap();
        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(sources.project_files.len(), 2);
        assert!(sources.primary_file().unwrap().as_str().ends_with("/tag-extractor.toml"));
    }

    #[test]
    fn boundary_marker_stops_search() {
        let tmp = TempDir::new().unwrap();
        let parent = tmp.path().join("parent");
        let child = parent.join("child");
        let work = child.join("work");
        fs::create_dir_all(&work).unwrap();
        fs::create_dir(child.join(".git")).unwrap();
        fs::write(parent.join(".tag-extractor.toml"), "log_level = \"warn\"\n").unwrap();

        let (config, sources) = ConfigLoader::new()
            .with_user_config(false)
            .with_project_search(utf8(work))
            .load()
            .unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(sources.project_files.is_empty());
    }

    #[test]
    fn disable_input_limit_overrides_max_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("config.toml"));
        fs::write(&path, "max_input_bytes = 10\ndisable_input_limit = true\n").unwrap();

        let (config, _) = isolated().with_file(&path).load().unwrap();
        assert_eq!(config.input_limit(), None);
    }

    #[test]
    fn every_documented_log_level_parses() {
        let _lock = env_lock();
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("config.toml"));
        for level in ["trace", "debug", "info", "warn", "error"] {
            fs::write(&path, format!("log_level = \"{level}\"\n")).unwrap();
            let (config, _) = isolated().with_file(&path).load().unwrap();
            assert_eq!(config.log_level.as_str(), level);
        }
    }

    #[test]
    fn invalid_value_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("config.toml"));
        fs::write(&path, "log_level = \"loud\"\n").unwrap();

        let err = isolated().with_file(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::Deserialize(_)));
    }

    #[test]
    fn load_or_error_without_files() {
        assert!(matches!(
            isolated().load_or_error(),
            Err(ConfigError::NotFound)
        ));
    }

    #[test]
    #[allow(unsafe_code)]
    fn env_var_overrides_file() {
        let _lock = env_lock();
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("config.toml"));
        fs::write(&path, "stop_words = \"from-file.txt\"\n").unwrap();

        // SAFETY: env access is serialized by TEST_ENV_MUTEX.
        unsafe {
            std::env::set_var("TAG_EXTRACTOR_STOP_WORDS", "from-env.txt");
        }
        let result = isolated().with_file(&path).load();
        // SAFETY: as above.
        unsafe {
            std::env::remove_var("TAG_EXTRACTOR_STOP_WORDS");
        }

        let (config, _) = result.unwrap();
        assert_eq!(config.stop_words.as_deref(), Some(Utf8Path::new("from-env.txt")));
    }

    #[test]
    fn user_config_dir_names_the_app() {
        if let Some(dir) = user_config_dir() {
            assert!(dir.as_str().contains("tag-extractor"));
        }
    }
}
