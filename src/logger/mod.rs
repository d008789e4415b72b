//! Logger module
//!
//! Provides logging utilities for the questionnaire server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled info/debug/warning/error messages
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Severity threshold for server messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a configured level name, falling back to `info`
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        LogLevel::parse(&config.logging.level),
        AccessLogFormat::parse(&config.logging.access_log_format),
    )
}

fn enabled(level: LogLevel) -> bool {
    writer::get().map_or(LogLevel::Info, writer::LogWriter::level) >= level
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, root_dir: &Path, config: &Config) {
    write_info("======================================");
    write_info("Questionnaire server started");
    write_info(&format!("Listening on: http://{addr}"));
    if addr.ip().is_unspecified() {
        write_info(&format!("Local access: http://localhost:{}", addr.port()));
    }
    write_info(&format!("Root directory: {}", root_dir.display()));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("Press Ctrl+C to stop the server");
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_warning(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_info(message: &str) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Write one access log line in the configured format
pub fn log_access(entry: &AccessLogEntry) {
    match writer::get() {
        Some(w) => w.write_access(&entry.format(w.access_format())),
        None => println!("{}", entry.format(AccessLogFormat::Combined)),
    }
}
