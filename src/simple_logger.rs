//! A logger that prints all messages to stderr with a readable output format.
// Forked from https://github.com/borntyping/rust-simple_logger
// to allow reconfiguring the log level after initialization.

use chrono::Local;
use colored::*;
use log::{self, Level, Log, Metadata, Record, SetLoggerError};

pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_string = match record.level() {
            Level::Error => record.level().to_string().red(),
            Level::Warn => record.level().to_string().yellow(),
            Level::Info => record.level().to_string().cyan(),
            Level::Debug => record.level().to_string().purple(),
            Level::Trace => record.level().to_string().normal(),
        };
        eprintln!(
            "{} {:<5} [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            level_string,
            record.module_path().unwrap_or_default(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Installs a SimpleLogger as the global logger, only letting through
/// messages at `level` or more severe.
pub fn init_with_level(level: Level) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(SimpleLogger))?;
    set_level(level);
    Ok(())
}

pub fn set_level(level: Level) {
    log::set_max_level(level.to_level_filter());
}
