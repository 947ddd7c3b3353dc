//! Register Bank Service Trait
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

/// 32-bit memory mapped register access by absolute physical address.
///
/// Register reads may have side effects on the hardware (a status poll can advance a state machine), which is why
/// neither operation is expected to be idempotent.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait RegisterBank {
    fn read32(&self, address: u64) -> u32;

    fn write32(&mut self, address: u64, value: u32);
}
