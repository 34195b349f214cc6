// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/logging.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// log4rs setup: a console appender, an optional file appender, or a complete
// log4rs YAML file when one is configured.

use crate::config::LoggingConfig;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} - {l} - {t} - {m}{n}";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Unknown log level '{0}'")]
    InvalidLevel(String),

    #[error("Failed to open log file {path:?}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log4rs configuration: {0}")]
    Config(String),
}

/// Install the global logger. Must be called once, before any job starts.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    if let Some(path) = &config.config_file {
        return log4rs::init_file(path, Default::default())
            .map_err(|e| LoggingError::Config(format!("{:?}: {}", path, e)));
    }

    let level = LevelFilter::from_str(&config.level)
        .map_err(|_| LoggingError::InvalidLevel(config.level.clone()))?;

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let mut builder =
        Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));
    let mut root = Root::builder().appender("stdout");

    if let Some(path) = &config.file {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(path)
            .map_err(|e| LoggingError::File {
                path: path.clone(),
                source: e,
            })?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let log_config = builder
        .build(root.build(level))
        .map_err(|e| LoggingError::Config(e.to_string()))?;
    log4rs::init_config(log_config).map_err(|e| LoggingError::Config(e.to_string()))?;
    Ok(())
}
