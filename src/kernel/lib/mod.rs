// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Library
//!
//! Data structures shared by the kernel subsystems.

pub mod interval_tree;

pub use interval_tree::{IntervalNode, IntervalTree, NodeId};
