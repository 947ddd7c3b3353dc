//! Firmware Volume (FV) Header Definitions
//!
//! Based on the values defined in the UEFI Platform Initialization (PI) Specification V1.8A 3.2.1.1
//! EFI_FIRMWARE_VOLUME_HEADER.
//!
//! The block store only ever produces volumes with a single uniform block size, so the header is modelled with its
//! two entry block map (the geometry entry and the `(0, 0)` terminator) inline.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::mem;

use r_efi::efi;
use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::*;

use super::{checksum16, sum16, EfiFvbAttributes2};

/// `_FVH` read as a little endian u32.
pub const SIGNATURE: u32 = u32::from_le_bytes(*b"_FVH");

/// Firmware volume header revision.
pub const REVISION: u8 = 2;

/// Size of the fixed portion of the header, up to (but excluding) the block map.
pub const FIXED_HEADER_LENGTH: usize = 56;

/// Size of a header carrying one block map entry and its terminator.
pub const HEADER_LENGTH: usize = mem::size_of::<FirmwareVolumeHeader>();

/// Firmware volume block map entry describing physical layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct BlockMapEntry {
    /// Number of blocks of this size
    pub num_blocks: u32,
    /// Length of each block
    pub length: u32,
}

impl BlockMapEntry {
    /// The `(0, 0)` entry that terminates a block map.
    pub const TERMINATOR: Self = Self { num_blocks: 0, length: 0 };
}

/// EFI_FIRMWARE_VOLUME_HEADER with a two entry block map.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct FirmwareVolumeHeader {
    /// First 16 bytes are zeros for compatibility
    pub zero_vector: [u8; 16],
    /// File system type GUID
    pub file_system_guid: [u8; 16],
    /// Total volume length in bytes
    pub fv_length: u64,
    /// Firmware volume signature
    pub signature: u32,
    /// Volume attributes
    pub attributes: EfiFvbAttributes2,
    /// Length of this header structure
    pub header_length: u16,
    /// Header checksum
    pub checksum: u16,
    /// Offset to extended header (0 if none)
    pub ext_header_offset: u16,
    /// Reserved byte (must be 0)
    pub reserved: u8,
    /// Header revision number
    pub revision: u8,
    /// Geometry entry followed by the terminator
    pub block_map: [BlockMapEntry; 2],
}

const _: () = assert!(HEADER_LENGTH == FIXED_HEADER_LENGTH + 2 * mem::size_of::<BlockMapEntry>());

impl FirmwareVolumeHeader {
    /// Creates a header for a volume of `fv_length` bytes made of uniform `block_size` blocks.
    ///
    /// The checksum is computed so the header sums to zero.
    pub fn new(file_system_guid: &efi::Guid, fv_length: u64, block_size: u32, attributes: EfiFvbAttributes2) -> Self {
        let mut header = Self {
            zero_vector: [0; 16],
            file_system_guid: *file_system_guid.as_bytes(),
            fv_length,
            signature: SIGNATURE,
            attributes,
            header_length: HEADER_LENGTH as u16,
            checksum: 0,
            ext_header_offset: 0,
            reserved: 0,
            revision: REVISION,
            block_map: [BlockMapEntry::TERMINATOR; 2],
        };
        header.set_geometry(fv_length, block_size);
        header
    }

    /// Reads a header from the start of `buffer`, if it is long enough.
    pub fn read_from(buffer: &[u8]) -> Option<Self> {
        Self::read_from_prefix(buffer).ok().map(|(header, _)| header)
    }

    /// Returns true if the file system GUID equals `guid`.
    pub fn has_file_system(&self, guid: &efi::Guid) -> bool {
        self.file_system_guid == *guid.as_bytes()
    }

    /// Rewrites the length and block map for a volume of `fv_length` bytes made of `block_size` blocks, then
    /// recomputes the checksum.
    pub fn set_geometry(&mut self, fv_length: u64, block_size: u32) {
        self.fv_length = fv_length;
        self.block_map[0] = BlockMapEntry { num_blocks: (fv_length / block_size as u64) as u32, length: block_size };
        self.block_map[1] = BlockMapEntry::TERMINATOR;
        self.update_checksum();
    }

    /// Recomputes the checksum so the serialized header sums to zero.
    pub fn update_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = checksum16(self.as_bytes());
    }

    /// Returns the 16-bit sum over the first `header_length` bytes of `buffer`.
    ///
    /// `buffer` is expected to hold a serialized header at offset 0. Returns `None` when `header_length` runs past
    /// the end of `buffer`.
    pub fn sum_in(buffer: &[u8]) -> Option<u16> {
        let header = Self::read_from(buffer)?;
        buffer.get(..header.header_length as usize).map(sum16)
    }
}
