//! Logging shims over the `log` facade.
//!
//! With `verbose-logging` enabled the macros forward to `log`; without it they
//! still type-check their arguments but emit nothing.

#[cfg(feature = "verbose-logging")]
macro_rules! log_debug {
    ($($arg:tt)+) => { ::log::debug!(target: "maskstft", $($arg)+) };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! log_debug {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

#[cfg(feature = "verbose-logging")]
macro_rules! log_warn {
    ($($arg:tt)+) => { ::log::warn!(target: "maskstft", $($arg)+) };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! log_warn {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

#[cfg(feature = "verbose-logging")]
macro_rules! log_trace {
    ($($arg:tt)+) => { ::log::trace!(target: "maskstft", $($arg)+) };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! log_trace {
    ($($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}
