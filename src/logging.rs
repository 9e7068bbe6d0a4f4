//! Diagnostic logging setup
//!
//! `RUST_LOG` wins over the configured level. Interactive mode owns the
//! terminal, so it logs to a file or not at all.

use crate::error::GardenError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(level: &str, target: LogTarget<'_>) -> Result<(), GardenError> {
    let result = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => fmt()
            .with_env_filter(filter(level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            fmt()
                .with_env_filter(filter(level))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    result.map_err(|e| GardenError::Logging(e.to_string()))
}
