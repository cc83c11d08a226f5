// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Logging and Diagnostics
//!
//! This module provides the logging macros used by the synchronization
//! primitives. With the `logging` feature enabled the macros forward to the
//! [`log`] facade under the `rangelock` target, so whichever logger the host
//! installs receives them. Without the feature they compile to nothing, but
//! their arguments are still type-checked.
//!
//! # Usage
//!
//! ```rust,ignore
//! log_debug!("range [{:#x}, {:#x}] waiting on {} ranges", start, last, blocking);
//! log_warn!("unlock of range that is not held");
//! ```
//!
//! [`log`]: https://docs.rs/log

/// Log target used by every message from this crate
pub const LOG_TARGET: &str = "rangelock";

#[cfg(feature = "logging")]
#[doc(hidden)]
pub use log as __log;

/// Log a trace message
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::kernel::debug::__log::trace!(target: $crate::kernel::debug::LOG_TARGET, $($arg)*)
    };
}

/// Log a debug message
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::kernel::debug::__log::debug!(target: $crate::kernel::debug::LOG_TARGET, $($arg)*)
    };
}

/// Log a warning message
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::kernel::debug::__log::warn!(target: $crate::kernel::debug::LOG_TARGET, $($arg)*)
    };
}

/// Log a trace message
#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        if false {
            let _ = format_args!($($arg)*);
        }
    };
}

/// Log a debug message
#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if false {
            let _ = format_args!($($arg)*);
        }
    };
}

/// Log a warning message
#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if false {
            let _ = format_args!($($arg)*);
        }
    };
}
