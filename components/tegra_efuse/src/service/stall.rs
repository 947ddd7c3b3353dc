//! Stall Service Trait
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

/// Busy wait primitive (the `Stall` boot service).
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait Stall {
    /// Blocks for at least `microseconds`.
    fn stall(&self, microseconds: u64);
}
