//! GUID Partition Table (GPT) Definitions
//!
//! Layouts of the GPT header and partition entry from the UEFI Specification 2.10 Section 5.3. Fields use the
//! little endian `zerocopy` byte order types so the structures have no alignment requirement and can be read
//! directly out of a flash sector.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::mem;

use zerocopy::{
    byteorder::little_endian::{U32, U64},
    FromBytes,
};
use zerocopy_derive::*;

/// `EFI PART` read as a little endian u64.
pub const SIGNATURE: u64 = u64::from_le_bytes(*b"EFI PART");

/// Logical block size GPT structures on NOR flash are laid out in.
pub const BLOCK_SIZE: u64 = 512;

/// Size of the defined portion of the GPT header.
pub const HEADER_SIZE: usize = mem::size_of::<GptHeader>();

/// Size of a partition entry as defined by the specification. Entries may be larger, never smaller.
pub const PARTITION_ENTRY_SIZE: usize = mem::size_of::<GptPartitionEntry>();

/// Number of UTF-16 code units in a partition name.
pub const PARTITION_NAME_LENGTH: usize = 36;

/// EFI_PARTITION_TABLE_HEADER
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct GptHeader {
    /// `EFI PART`
    pub signature: U64,
    /// Revision of the header format
    pub revision: U32,
    /// Size of the header in bytes
    pub header_size: U32,
    /// CRC-32 of the header with this field zeroed
    pub header_crc32: U32,
    /// Must be zero
    pub reserved: U32,
    /// LBA holding this header
    pub my_lba: U64,
    /// LBA holding the other copy of the header
    pub alternate_lba: U64,
    /// First LBA usable by a partition
    pub first_usable_lba: U64,
    /// Last LBA usable by a partition
    pub last_usable_lba: U64,
    /// Disk GUID
    pub disk_guid: [u8; 16],
    /// Starting LBA of the partition entry array
    pub partition_entry_lba: U64,
    /// Number of entries in the array
    pub number_of_partition_entries: U32,
    /// Size of each entry in bytes
    pub size_of_partition_entry: U32,
    /// CRC-32 of the partition entry array
    pub partition_entry_array_crc32: U32,
}

impl GptHeader {
    /// Reads a header from the start of `buffer`, if it is long enough.
    pub fn read_from(buffer: &[u8]) -> Option<Self> {
        Self::read_from_prefix(buffer).ok().map(|(header, _)| header)
    }

    /// Size in bytes of the partition entry array this header describes.
    pub fn partition_table_size(&self) -> usize {
        self.number_of_partition_entries.get() as usize * self.size_of_partition_entry.get() as usize
    }

    /// Byte offset of the partition entry array on the device.
    pub fn partition_table_offset(&self) -> u64 {
        self.partition_entry_lba.get().saturating_mul(BLOCK_SIZE)
    }
}

/// EFI_PARTITION_ENTRY
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct GptPartitionEntry {
    /// Partition type GUID; all zeros marks an unused entry
    pub partition_type_guid: [u8; 16],
    /// Unique partition GUID
    pub unique_partition_guid: [u8; 16],
    /// First LBA of the partition
    pub starting_lba: U64,
    /// Last LBA of the partition, inclusive
    pub ending_lba: U64,
    /// Partition attribute bits
    pub attributes: U64,
    /// UTF-16LE partition name, NUL padded
    pub partition_name: [u8; PARTITION_NAME_LENGTH * 2],
}

impl GptPartitionEntry {
    /// Reads an entry from the start of `buffer`, if it is long enough.
    pub fn read_from(buffer: &[u8]) -> Option<Self> {
        Self::read_from_prefix(buffer).ok().map(|(entry, _)| entry)
    }

    /// Returns false for entries whose type GUID is all zeros.
    pub fn is_used(&self) -> bool {
        self.partition_type_guid != [0u8; 16]
    }

    /// Number of blocks the partition spans.
    pub fn size_in_blocks(&self) -> u64 {
        self.ending_lba.get().wrapping_sub(self.starting_lba.get()).wrapping_add(1)
    }

    /// Iterates the UTF-16 code units of the name up to the first NUL.
    pub fn name_units(&self) -> impl Iterator<Item = u16> + '_ {
        self.partition_name.chunks_exact(2).map(|unit| u16::from_le_bytes([unit[0], unit[1]])).take_while(|&u| u != 0)
    }

    /// Returns true if the partition name equals `name`.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name_units().eq(name.encode_utf16())
    }
}
