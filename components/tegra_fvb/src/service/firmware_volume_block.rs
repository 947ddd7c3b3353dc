//! Firmware Volume Block Endpoint Trait
//!
//! The block oriented interface each region exposes, mirroring the FVB2 protocol with Rust ownership in place of
//! raw pointers: `num_bytes` is the in/out byte count, and an erase takes an explicit list of ranges instead of a
//! terminated variadic list.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use r_efi::efi::Lba;
use tegra_sdk::{error::Result, fw_fs::EfiFvbAttributes2};

use crate::component::block_store::EraseRange;

/// Firmware Volume Block Endpoint
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait FirmwareVolumeBlock {
    /// Returns the attributes of the volume.
    fn get_attributes(&self) -> Result<EfiFvbAttributes2>;

    /// Attribute changes are not supported; always fails with `Unsupported`.
    fn set_attributes(&mut self, attributes: EfiFvbAttributes2) -> Result<EfiFvbAttributes2>;

    /// Returns the base address of the region's buffer.
    fn get_physical_address(&self) -> Result<u64>;

    /// Returns the block size and the number of blocks from `lba` to the end of the region.
    fn get_block_size(&self, lba: Lba) -> Result<(usize, usize)>;

    /// Reads up to `*num_bytes` bytes from `offset` within block `lba`.
    ///
    /// On return `*num_bytes` holds the number of bytes actually read.
    fn read(&self, lba: Lba, offset: usize, num_bytes: &mut usize, buffer: &mut [u8]) -> Result<()>;

    /// Writes up to `*num_bytes` bytes at `offset` within block `lba`.
    ///
    /// On return `*num_bytes` holds the number of bytes actually written.
    fn write(&mut self, lba: Lba, offset: usize, num_bytes: &mut usize, buffer: &[u8]) -> Result<()>;

    /// Erases every range in `ranges`, validating all of them before erasing any.
    fn erase_blocks(&mut self, ranges: &[EraseRange]) -> Result<()>;
}
