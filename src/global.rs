//! Process-wide default logger.
//!
//! The slot starts out holding [`Logger::default`] and can be swapped at any
//! time with [`set_global_logger`]. Swapping is atomic: a concurrent reader
//! sees either the previous or the new logger, never a torn value. Services
//! should still install their configured logger at startup, before worker
//! threads begin logging, so early records are not written with defaults.
//!
//! The free functions forward to whatever logger occupies the slot at the
//! moment of the call.

use std::fmt::Display;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::context::ContextCarrier;
use crate::level::Severity;
use crate::logger::Logger;

static GLOBAL_LOGGER: Lazy<ArcSwap<Logger>> = Lazy::new(|| ArcSwap::from_pointee(Logger::default()));

/// Replace the process-wide logger.
pub fn set_global_logger(logger: Logger) {
    GLOBAL_LOGGER.store(Arc::new(logger));
}

/// The logger currently installed as the process-wide default.
pub fn global_logger() -> Arc<Logger> {
    GLOBAL_LOGGER.load_full()
}

#[track_caller]
pub fn debug(message: impl Display) {
    GLOBAL_LOGGER.load().debug(message);
}

#[track_caller]
pub fn info(message: impl Display) {
    GLOBAL_LOGGER.load().info(message);
}

#[track_caller]
pub fn warn(message: impl Display) {
    GLOBAL_LOGGER.load().warn(message);
}

#[track_caller]
pub fn error(message: impl Display) {
    GLOBAL_LOGGER.load().error(message);
}

#[track_caller]
pub fn log(level: Severity, message: impl Display) {
    GLOBAL_LOGGER.load().log(level, message);
}

/// Emit at FATAL through the global logger and exit the process.
#[track_caller]
pub fn fatal(message: impl Display) -> ! {
    global_logger().fatal(message)
}

pub fn with_field(key: impl Into<String>, value: impl Into<Value>) -> Logger {
    GLOBAL_LOGGER.load().with_field(key, value)
}

pub fn with_fields<I, K, V>(entries: I) -> Logger
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    GLOBAL_LOGGER.load().with_fields(entries)
}

pub fn with_context<C: ContextCarrier + ?Sized>(carrier: &C) -> Logger {
    GLOBAL_LOGGER.load().with_context(carrier)
}
