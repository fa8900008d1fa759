//! `NTT_KERNEL_LOG` environment convention: a crate-local verbosity knob
//! layered on top of whatever global level the host application's `log`
//! backend is configured with, so a caller can turn on this crate's
//! traces without touching `RUST_LOG`/their own logger's filter.
//!
//! Read once per process (mirrors [`crate::cpu_features::Tier::detect`]'s
//! `OnceLock` pattern) and compiled out entirely unless the `trace`
//! feature is enabled, so a release build without the feature pays
//! nothing beyond the `log` crate's own (already-cheap) disabled-macro
//! check.

use std::sync::OnceLock;

/// Parses `NTT_KERNEL_LOG` (`off|error|debug|trace`, default `off`) once
/// and caches the result.
#[cfg(feature = "trace")]
fn configured_level() -> log::LevelFilter {
    static LEVEL: OnceLock<log::LevelFilter> = OnceLock::new();
    *LEVEL.get_or_init(|| match std::env::var("NTT_KERNEL_LOG").as_deref() {
        Ok("error") => log::LevelFilter::Error,
        Ok("debug") => log::LevelFilter::Debug,
        Ok("trace") => log::LevelFilter::Trace,
        _ => log::LevelFilter::Off,
    })
}

/// Whether a message at `level` should be emitted under the current
/// `NTT_KERNEL_LOG` setting. Always `false` when the `trace` feature is
/// off, so call sites compile to nothing.
#[inline]
pub(crate) fn enabled(level: log::Level) -> bool {
    #[cfg(feature = "trace")]
    {
        level <= configured_level()
    }
    #[cfg(not(feature = "trace"))]
    {
        let _ = level;
        false
    }
}

/// Emits a `log::debug!` record gated on [`enabled`] for [`log::Level::Debug`].
macro_rules! kernel_debug {
    ($($arg:tt)+) => {
        if $crate::logging::enabled(log::Level::Debug) {
            log::debug!($($arg)+);
        }
    };
}

/// Emits a `log::trace!` record gated on [`enabled`] for [`log::Level::Trace`].
macro_rules! kernel_trace {
    ($($arg:tt)+) => {
        if $crate::logging::enabled(log::Level::Trace) {
            log::trace!($($arg)+);
        }
    };
}

pub(crate) use kernel_debug;
pub(crate) use kernel_trace;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default_without_trace_feature() {
        if !cfg!(feature = "trace") {
            assert!(!enabled(log::Level::Error));
        }
    }
}
