//! Logging facilities.
//!
//! The macros take an object with `time()` and `name()` methods as the first argument,
//! e.g. [`GpsEngine`](crate::GpsEngine), and produce lines like `[150 DEBUG gps] message`.

use atty::Stream;
use colored::{Color, ColoredString, Colorize};

/// Applies the color to the string if stderr (log) goes to console.
pub fn get_colored(s: &str, color: Color) -> ColoredString {
    if atty::is(Stream::Stderr) {
        s.color(color)
    } else {
        s.normal()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_event {
    ($level:ident, $label:expr, $color:ident, $ctx:expr, $($arg:tt)+) => (
        log::$level!(
            target: $ctx.name(),
            "[{} {} {}] {}",
            $ctx.time(),
            $crate::log::get_colored($label, $crate::colored::Color::$color),
            $ctx.name(),
            format_args!($($arg)+)
        )
    );
}

/// Logs a message at the info level.
///
/// # Examples
///
/// ```rust
/// use std::io::Write;
/// use env_logger::Builder;
/// use gps_sim::{log_info, GpsEngine};
///
/// Builder::from_default_env()
///     .format(|buf, record| writeln!(buf, "{}", record.args()))
///     .init();
///
/// let engine = GpsEngine::new(2).unwrap().with_name("wfq-check");
/// log_info!(engine, "engine with {} flows", engine.flow_count());
/// ```
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $($arg:tt)+) => ($crate::__log_event!(info, " INFO", Green, $ctx, $($arg)+));
}

/// Logs a message at the debug level. See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $($arg:tt)+) => ($crate::__log_event!(debug, "DEBUG", Blue, $ctx, $($arg)+));
}

/// Logs a message at the trace level. See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_trace {
    ($ctx:expr, $($arg:tt)+) => ($crate::__log_event!(trace, "TRACE", Cyan, $ctx, $($arg)+));
}

/// Logs a message at the warn level. See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $($arg:tt)+) => ($crate::__log_event!(warn, " WARN", Yellow, $ctx, $($arg)+));
}
