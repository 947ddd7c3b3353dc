//! Partition Locator Service Trait
//!
//! Resolves named partitions on the flash device. The block store reads the raw table data itself and hands it to
//! the locator, so a locator never performs I/O.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use tegra_sdk::{
    error::Result,
    gpt::{self, GptHeader},
};

use crate::service::FlashAttributes;

/// Location of a partition in 512 byte GPT blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionInfo {
    /// First block of the partition.
    pub starting_lba: u64,
    /// Number of blocks in the partition.
    pub size_in_blocks: u64,
}

impl PartitionInfo {
    /// Byte offset and size of the partition.
    pub fn byte_range(&self) -> (u64, u64) {
        (self.starting_lba.saturating_mul(gpt::BLOCK_SIZE), self.size_in_blocks.saturating_mul(gpt::BLOCK_SIZE))
    }
}

/// Partition Locator
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait PartitionLocator {
    /// Byte offset of the block holding the partition table header.
    fn header_offset(&self, flash: &FlashAttributes) -> u64;

    /// Validates the raw header block and returns the parsed header.
    fn validate_header(&self, header_block: &[u8]) -> Result<GptHeader>;

    /// Validates the raw partition entry array described by `header`.
    fn validate_partition_table(&self, header: &GptHeader, entries: &[u8]) -> Result<()>;

    /// Finds the first partition named `name`.
    fn find_partition_by_name(&self, header: &GptHeader, entries: &[u8], name: &str) -> Option<PartitionInfo>;
}
