// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Range Lock Error Codes
//!
//! This module provides the status codes and error type returned by the
//! range lock primitives. Errors convert to and from the kernel's
//! `rx_status_t` codes so callers on the syscall side can pass them through
//! unchanged.

use core::fmt;

/// Kernel status code
#[allow(non_camel_case_types)]
pub type rx_status_t = i32;

/// Success status code
pub const RX_OK: rx_status_t = 0;

/// Invalid arguments error
pub const RX_ERR_INVALID_ARGS: rx_status_t = -10;

/// No memory error
pub const RX_ERR_NO_MEMORY: rx_status_t = -12;

/// Bad state error
pub const RX_ERR_BAD_STATE: rx_status_t = -20;

/// Wait was interrupted by a pending signal
pub const RX_ERR_INTERRUPTED: rx_status_t = -21;

/// Internal error
pub const RX_ERR_INTERNAL: rx_status_t = -114;

/// Result type for range lock operations
pub type Result<T = ()> = core::result::Result<T, Error>;

/// Range lock errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// `start > last` when building a range
    InvalidArgs,

    /// Unlock or downgrade of a lock that is not currently granted
    InvalidState,

    /// An interruptible or killable wait was cancelled before grant
    Interrupted,

    /// Node storage could not be reserved; the tree was left untouched
    NoMemory,
}

impl Error {
    /// Convert error to status code
    pub const fn to_status(self) -> rx_status_t {
        match self {
            Error::InvalidArgs => RX_ERR_INVALID_ARGS,
            Error::InvalidState => RX_ERR_BAD_STATE,
            Error::Interrupted => RX_ERR_INTERRUPTED,
            Error::NoMemory => RX_ERR_NO_MEMORY,
        }
    }

    /// Convert status code to error
    ///
    /// Returns `None` for `RX_OK` and for codes the range lock never produces.
    pub const fn from_status(status: rx_status_t) -> Option<Self> {
        match status {
            RX_ERR_INVALID_ARGS => Some(Error::InvalidArgs),
            RX_ERR_BAD_STATE => Some(Error::InvalidState),
            RX_ERR_INTERRUPTED => Some(Error::Interrupted),
            RX_ERR_NO_MEMORY => Some(Error::NoMemory),
            _ => None,
        }
    }

    /// Short description of the error
    pub const fn as_str(self) -> &'static str {
        match self {
            Error::InvalidArgs => "invalid range: start is past last",
            Error::InvalidState => "range lock is not granted",
            Error::Interrupted => "range lock wait interrupted",
            Error::NoMemory => "out of memory for range lock node",
        }
    }
}

impl From<Error> for rx_status_t {
    fn from(err: Error) -> Self {
        err.to_status()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for err in [
            Error::InvalidArgs,
            Error::InvalidState,
            Error::Interrupted,
            Error::NoMemory,
        ] {
            assert_eq!(Error::from_status(err.to_status()), Some(err));
        }
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(Error::from_status(RX_OK), None);
        assert_eq!(Error::from_status(RX_ERR_INTERNAL), None);
    }

    #[test]
    fn test_into_status() {
        let status: rx_status_t = Error::Interrupted.into();
        assert_eq!(status, RX_ERR_INTERRUPTED);
    }
}
