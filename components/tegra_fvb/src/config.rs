//! Firmware Volume Block Store Configuration
//!
//! Defines the configuration the block store needs to find and bring up its regions.
//!
//! ## Configuration Usage
//!
//! The partition names are expected to match the GPT produced by the platform's flash layout tooling. When the
//! bootloader already knows where the partitions live (for example because it hands the layout over in a
//! bootloader information block), it can provide a [`PartitionLayout`] as `fixed_layout`. It is only used when GPT
//! discovery fails.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
extern crate alloc;
use alloc::string::String;

use tegra_sdk::error::{EfiError, Result};

use crate::service::FlashAttributes;

/// GPT name of the partition that holds the variable store.
pub const DEFAULT_VARIABLE_PARTITION_NAME: &str = "uefi_variables";

/// GPT name of the partition that holds the fault tolerant write spare and working areas.
pub const DEFAULT_FTW_PARTITION_NAME: &str = "uefi_ftw";

/// Firmware Volume Block Store Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FvbConfig {
    /// GPT name of the variable partition.
    pub variable_partition_name: String,
    /// GPT name of the fault tolerant write partition.
    pub ftw_partition_name: String,
    /// When set, variables are kept in memory only and the flash is never touched.
    pub emulated_nv_mode: bool,
    /// Partition layout to fall back to when GPT discovery fails.
    pub fixed_layout: Option<PartitionLayout>,
    /// Runtime services mask published in the runtime properties table, if any.
    pub runtime_services_supported: Option<u32>,
}

impl Default for FvbConfig {
    fn default() -> Self {
        FvbConfig {
            variable_partition_name: String::from(DEFAULT_VARIABLE_PARTITION_NAME),
            ftw_partition_name: String::from(DEFAULT_FTW_PARTITION_NAME),
            emulated_nv_mode: false,
            fixed_layout: None,
            runtime_services_supported: None,
        }
    }
}

/// Byte offsets and sizes of the variable and fault tolerant write partitions on the flash device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartitionLayout {
    pub variable_offset: u64,
    pub variable_size: u64,
    pub ftw_offset: u64,
    pub ftw_size: u64,
}

impl PartitionLayout {
    /// Checks the layout against the device geometry.
    ///
    /// Both partitions must be present (non-zero offset and size) and erase block aligned, and the FTW partition
    /// must hold a spare area as large as the variable store plus a working area of at least half that size.
    pub fn validate(&self, flash: &FlashAttributes) -> Result<()> {
        let block_size = flash.block_size as u64;
        if block_size == 0 {
            log::error!(target: "fvb", "Flash reports a zero erase block size.");
            return Err(EfiError::DeviceError);
        }

        if self.variable_offset == 0 || self.ftw_offset == 0 || self.variable_size == 0 || self.ftw_size == 0 {
            log::error!(target: "fvb", "Partition not found: {:x?}", self);
            return Err(EfiError::DeviceError);
        }

        let aligned = [self.variable_offset, self.variable_size, self.ftw_offset, self.ftw_size]
            .iter()
            .all(|value| value % block_size == 0);
        if !aligned {
            log::error!(target: "fvb", "Partitions are not aligned to the {:#x} byte erase block: {:x?}", block_size, self);
            return Err(EfiError::DeviceError);
        }

        let minimum_ftw_size = self.variable_size.saturating_add(self.variable_size / 2);
        if self.ftw_size < minimum_ftw_size {
            log::error!(
                target: "fvb",
                "FTW partition ({:#x} bytes) is too small for a {:#x} byte variable store.",
                self.ftw_size,
                self.variable_size
            );
            return Err(EfiError::DeviceError);
        }

        Ok(())
    }
}
