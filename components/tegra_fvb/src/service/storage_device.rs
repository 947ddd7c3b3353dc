//! NOR Flash Storage Device Service Trait
//!
//! The raw byte addressable, block erasable device the block store is layered on.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use tegra_sdk::error::Result;

/// Geometry of a NOR flash device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashAttributes {
    /// Size of an erase block in bytes.
    pub block_size: u32,
    /// Total size of the device in bytes.
    pub memory_density: u64,
}

/// NOR Flash Storage Device
///
/// Writes can only clear bits; an erase returns every byte of the affected blocks to `0xFF`.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait StorageDevice {
    /// Returns the device geometry.
    fn attributes(&self) -> Result<FlashAttributes>;

    /// Reads `buffer.len()` bytes starting at byte `offset`.
    fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<()>;

    /// Programs `buffer` starting at byte `offset`.
    fn write(&mut self, offset: u64, buffer: &[u8]) -> Result<()>;

    /// Erases `num_blocks` erase blocks starting at erase block `lba`.
    fn erase(&mut self, lba: u64, num_blocks: u64) -> Result<()>;
}
