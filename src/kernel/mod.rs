// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Subsystems
//!
//! - [`debug`] - Logging macros
//! - [`lib`] - Shared data structures
//! - [`sync`] - Synchronization primitives

pub mod debug;
pub mod lib;
pub mod sync;

#[cfg(test)]
mod tests;
