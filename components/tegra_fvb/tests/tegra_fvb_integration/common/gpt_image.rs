//! GPT Image Builder
//!
//! Lays a primary GPT out on a [`SimulatedNorFlash`] the way Tegra flash images do: the header in the last 512 byte
//! block of the device and the partition entry array starting at LBA 2.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use tegra_sdk::gpt::{self, GptHeader, GptPartitionEntry};
use zerocopy::{
    byteorder::little_endian::{U32, U64},
    FromZeros, IntoBytes,
};

use super::SimulatedNorFlash;

pub const ENTRY_ARRAY_LBA: u64 = 2;

/// A named partition in 512 byte blocks.
#[derive(Debug, Clone, Copy)]
pub struct GptPartition<'a> {
    pub name: &'a str,
    pub starting_lba: u64,
    pub blocks: u64,
}

fn entry(partition: &GptPartition) -> GptPartitionEntry {
    let mut entry = GptPartitionEntry::new_zeroed();
    entry.partition_type_guid = [0xA2; 16];
    entry.unique_partition_guid = [partition.starting_lba as u8; 16];
    entry.starting_lba = U64::new(partition.starting_lba);
    entry.ending_lba = U64::new(partition.starting_lba + partition.blocks - 1);
    for (i, unit) in partition.name.encode_utf16().enumerate() {
        entry.partition_name[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    entry
}

/// Writes a valid GPT describing `partitions` onto `flash`.
pub fn write_gpt(flash: &SimulatedNorFlash, density: usize, partitions: &[GptPartition]) {
    let mut table = Vec::new();
    for partition in partitions {
        table.extend_from_slice(entry(partition).as_bytes());
    }
    // Pad to a whole number of blocks with unused entries.
    while table.len() % gpt::BLOCK_SIZE as usize != 0 {
        table.extend_from_slice(GptPartitionEntry::new_zeroed().as_bytes());
    }

    let last_lba = density as u64 / gpt::BLOCK_SIZE - 1;
    let mut header = GptHeader::new_zeroed();
    header.signature = U64::new(gpt::SIGNATURE);
    header.revision = U32::new(0x0001_0000);
    header.header_size = U32::new(gpt::HEADER_SIZE as u32);
    header.my_lba = U64::new(last_lba);
    header.alternate_lba = U64::new(1);
    header.first_usable_lba = U64::new(ENTRY_ARRAY_LBA + table.len() as u64 / gpt::BLOCK_SIZE);
    header.last_usable_lba = U64::new(last_lba - 1);
    header.partition_entry_lba = U64::new(ENTRY_ARRAY_LBA);
    header.number_of_partition_entries = U32::new((table.len() / gpt::PARTITION_ENTRY_SIZE) as u32);
    header.size_of_partition_entry = U32::new(gpt::PARTITION_ENTRY_SIZE as u32);
    header.partition_entry_array_crc32 = U32::new(crc32fast::hash(&table));
    header.header_crc32 = U32::new(crc32fast::hash(header.as_bytes()));

    let mut header_block = vec![0u8; gpt::BLOCK_SIZE as usize];
    header_block[..gpt::HEADER_SIZE].copy_from_slice(header.as_bytes());

    flash.write_raw((ENTRY_ARRAY_LBA * gpt::BLOCK_SIZE) as usize, &table);
    flash.write_raw(density - gpt::BLOCK_SIZE as usize, &header_block);
}
