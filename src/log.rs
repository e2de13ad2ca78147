//! Conditional logging macros.
//!
//! When the `tracing` feature is enabled, these re-export `tracing` macros.
//! When disabled, they expand to no-ops so layout passes carry no logging
//! cost.

use crate::errors::Warning;

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, warn};

/// Log every soft failure collected by a stage, tagged with its diagnostic code.
#[cfg(feature = "tracing")]
pub(crate) fn report(stage: &str, warnings: &[Warning]) {
    use miette::Diagnostic;

    for warning in warnings {
        let code = warning.code().map(|c| c.to_string()).unwrap_or_default();
        tracing::warn!(stage, code = %code, "{warning}");
    }
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn report(_stage: &str, _warnings: &[Warning]) {}
