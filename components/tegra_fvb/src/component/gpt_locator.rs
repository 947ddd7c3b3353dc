//! GPT Partition Locator
//!
//! [`PartitionLocator`] over a GUID partition table stored on the flash device itself. Tegra flash images keep the
//! primary GPT header in the last 512 byte block of the device.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
extern crate alloc;
use alloc::vec::Vec;

use tegra_sdk::{
    error::{EfiError, Result},
    gpt::{self, GptHeader, GptPartitionEntry},
};

use crate::service::{FlashAttributes, PartitionInfo, PartitionLocator};

/// Upper bound on the partition entry array the locator will accept.
pub const MAX_PARTITION_TABLE_SIZE: usize = 0x10_0000;

const HEADER_CRC_FIELD: core::ops::Range<usize> = 16..20;

/// Locates partitions through the GPT stored in the last block of the flash device.
#[derive(Debug, Default, Clone, Copy)]
pub struct GptPartitionLocator;

impl GptPartitionLocator {
    fn entries<'a>(header: &GptHeader, table: &'a [u8]) -> impl Iterator<Item = GptPartitionEntry> + 'a {
        let entry_size = header.size_of_partition_entry.get() as usize;
        let count = header.number_of_partition_entries.get() as usize;
        table.chunks_exact(entry_size.max(1)).take(count).filter_map(GptPartitionEntry::read_from)
    }
}

impl PartitionLocator for GptPartitionLocator {
    fn header_offset(&self, flash: &FlashAttributes) -> u64 {
        flash.memory_density.saturating_sub(gpt::BLOCK_SIZE)
    }

    fn validate_header(&self, header_block: &[u8]) -> Result<GptHeader> {
        let header = GptHeader::read_from(header_block).ok_or(EfiError::BufferTooSmall)?;

        if header.signature.get() != gpt::SIGNATURE {
            log::error!(target: "fvb_gpt", "Invalid GPT signature {:#x}.", header.signature.get());
            return Err(EfiError::NotFound);
        }

        let header_size = header.header_size.get() as usize;
        if header_size < gpt::HEADER_SIZE || header_size > header_block.len() {
            log::error!(target: "fvb_gpt", "Invalid GPT header size {:#x}.", header_size);
            return Err(EfiError::VolumeCorrupted);
        }

        let mut covered: Vec<u8> = header_block[..header_size].to_vec();
        covered[HEADER_CRC_FIELD].fill(0);
        let crc = crc32fast::hash(&covered);
        if crc != header.header_crc32.get() {
            log::error!(target: "fvb_gpt", "GPT header CRC {:#x} does not match {:#x}.", crc, header.header_crc32.get());
            return Err(EfiError::CrcError);
        }

        let entry_size = header.size_of_partition_entry.get() as usize;
        if entry_size < gpt::PARTITION_ENTRY_SIZE || entry_size % 8 != 0 {
            log::error!(target: "fvb_gpt", "Invalid GPT partition entry size {:#x}.", entry_size);
            return Err(EfiError::VolumeCorrupted);
        }

        let entries = header.number_of_partition_entries.get() as usize;
        if entries == 0 || header.partition_table_size() > MAX_PARTITION_TABLE_SIZE {
            log::error!(target: "fvb_gpt", "Invalid GPT partition entry count {}.", entries);
            return Err(EfiError::VolumeCorrupted);
        }

        log::debug!(
            target: "fvb_gpt",
            "GPT header: {} entries of {:#x} bytes at LBA {:#x}.",
            entries,
            entry_size,
            header.partition_entry_lba.get()
        );
        Ok(header)
    }

    fn validate_partition_table(&self, header: &GptHeader, entries: &[u8]) -> Result<()> {
        let table = entries.get(..header.partition_table_size()).ok_or(EfiError::BufferTooSmall)?;

        let crc = crc32fast::hash(table);
        if crc != header.partition_entry_array_crc32.get() {
            log::error!(target: "fvb_gpt", "GPT partition array CRC {:#x} does not match.", crc);
            return Err(EfiError::CrcError);
        }

        if let Some(entry) = Self::entries(header, table)
            .find(|entry| entry.is_used() && entry.starting_lba.get() > entry.ending_lba.get())
        {
            log::error!(
                target: "fvb_gpt",
                "GPT partition ends before it starts ({:#x} > {:#x}).",
                entry.starting_lba.get(),
                entry.ending_lba.get()
            );
            return Err(EfiError::VolumeCorrupted);
        }

        Ok(())
    }

    fn find_partition_by_name(&self, header: &GptHeader, entries: &[u8], name: &str) -> Option<PartitionInfo> {
        let found = Self::entries(header, entries)
            .find(|entry| entry.is_used() && entry.name_matches(name))
            .map(|entry| PartitionInfo { starting_lba: entry.starting_lba.get(), size_in_blocks: entry.size_in_blocks() });

        if found.is_none() {
            log::debug!(target: "fvb_gpt", "Partition {} not found.", name);
        }
        found
    }
}
