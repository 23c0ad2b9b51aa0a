use log::LevelFilter;
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;

/// Logging configuration for the Streak client.
///
/// The terminal belongs to the UI, so log output always goes to a file.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Master switch to enable/disable all logging
    pub enabled: bool,
    /// Path to the log file
    pub log_file: PathBuf,
    /// Whether to clear the log file on startup
    pub clear_on_startup: bool,
    /// Feature flags for specific logging categories
    pub features: LogFeatures,
    /// Overall log level
    pub level: LevelFilter,
}

/// Feature flags for specific logging categories
#[derive(Debug, Clone)]
pub struct LogFeatures {
    /// Key presses and their dispatch
    pub key_events: bool,
    /// Frame rendering
    pub rendering: bool,
    /// Outgoing API calls and their outcome
    pub api_calls: bool,
    /// Feed pagination, likes and comment threads
    pub feed: bool,
    /// Session cache reads and writes
    pub session: bool,
    /// Page changes
    pub navigation: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("streak_debug.log"),
            clear_on_startup: true,
            features: LogFeatures::default(),
            level: LevelFilter::Info,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self {
            key_events: false,
            rendering: false,
            api_calls: true,
            feed: true,
            session: true,
            navigation: true,
        }
    }
}

impl LogFeatures {
    fn all(on: bool) -> Self {
        Self {
            key_events: on,
            rendering: on,
            api_calls: on,
            feed: on,
            session: on,
            navigation: on,
        }
    }
}

impl LogConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Only errors and warnings
    pub fn minimal() -> Self {
        Self {
            level: LevelFilter::Warn,
            features: LogFeatures::all(false),
            ..Default::default()
        }
    }

    /// Every category at trace level
    pub fn verbose() -> Self {
        Self {
            level: LevelFilter::Trace,
            features: LogFeatures::all(true),
            ..Default::default()
        }
    }

    /// Places the log file inside `dir` while keeping its file name.
    pub fn in_dir(mut self, dir: &std::path::Path) -> Self {
        let name = self
            .log_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "streak_debug.log".into());
        self.log_file = dir.join(name);
        self
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        let _ = WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink());
        return Ok(());
    }

    if config.clear_on_startup {
        File::create(&config.log_file)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();

    WriteLogger::init(config.level, log_config, log_file)?;

    log::info!(
        "Logging initialized: file={}, level={:?}",
        config.log_file.display(),
        config.level
    );
    log::debug!("Log features: {:?}", config.features);

    Ok(())
}

#[macro_export]
macro_rules! log_key_event {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.key_events {
            log::debug!(target: "key_events", $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_rendering {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.rendering {
            log::trace!(target: "rendering", $($arg)*);
        }
    };
}

/// Macro for logging API calls
#[macro_export]
macro_rules! log_api_call {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.api_calls {
            log::debug!(target: "api_calls", $($arg)*);
        }
    };
}

/// Macro for logging feed pagination and engagement
#[macro_export]
macro_rules! log_feed {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.feed {
            log::debug!(target: "feed", $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_session {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.session {
            log::info!(target: "session", $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_navigation {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.navigation {
            log::debug!(target: "navigation", $($arg)*);
        }
    };
}
