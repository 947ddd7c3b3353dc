//! Fault Tolerant Write (FTW) Working Block Header
//!
//! Layout matches `EFI_FAULT_TOLERANT_WORKING_BLOCK_HEADER` in EDK II. The two state flags occupy the low bits of a
//! single byte that is otherwise left at the erased value.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::mem;

use r_efi::efi;
use zerocopy::{FromBytes, FromZeros, IntoBytes};
use zerocopy_derive::*;

use crate::ERASED_BYTE;

/// Size of the working block header.
pub const HEADER_SIZE: usize = mem::size_of::<WorkingBlockHeader>();

/// Value of a state flag bit that has been set (programmed from the erased `1`).
pub const FTW_VALID_STATE: u8 = 0;

/// Value of a state flag bit left in its erased state.
pub const FTW_INVALID_STATE: u8 = 1;

const WORKING_BLOCK_VALID_BIT: u8 = 1 << 0;
const WORKING_BLOCK_INVALID_BIT: u8 = 1 << 1;

/// EFI_FAULT_TOLERANT_WORKING_BLOCK_HEADER
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct WorkingBlockHeader {
    /// Working block signature GUID
    pub signature: [u8; 16],
    /// CRC-32 of the header, computed with `crc` and `state` at the erased value
    pub crc: u32,
    /// Bit 0: WorkingBlockValid, bit 1: WorkingBlockInvalid, bits 2-7 reserved
    pub state: u8,
    /// Reserved
    pub reserved: [u8; 3],
    /// Size of the write queue that follows the header
    pub write_queue_size: u64,
}

impl WorkingBlockHeader {
    /// Returns a header with every byte at the erased value.
    pub fn erased() -> Self {
        let mut header = Self::new_zeroed();
        header.as_mut_bytes().fill(ERASED_BYTE);
        header
    }

    /// Reads a header from the start of `buffer`, if it is long enough.
    pub fn read_from(buffer: &[u8]) -> Option<Self> {
        Self::read_from_prefix(buffer).ok().map(|(header, _)| header)
    }

    /// Returns true if the signature equals `guid`.
    pub fn has_signature(&self, guid: &efi::Guid) -> bool {
        self.signature == *guid.as_bytes()
    }

    /// Sets the WorkingBlockValid and WorkingBlockInvalid flags, leaving the reserved bits untouched.
    pub fn set_state_flags(&mut self, valid: u8, invalid: u8) {
        let mut state = self.state & !(WORKING_BLOCK_VALID_BIT | WORKING_BLOCK_INVALID_BIT);
        if valid & 1 != 0 {
            state |= WORKING_BLOCK_VALID_BIT;
        }
        if invalid & 1 != 0 {
            state |= WORKING_BLOCK_INVALID_BIT;
        }
        self.state = state;
    }

    /// The WorkingBlockValid flag.
    pub fn working_block_valid(&self) -> u8 {
        self.state & WORKING_BLOCK_VALID_BIT
    }

    /// The WorkingBlockInvalid flag.
    pub fn working_block_invalid(&self) -> u8 {
        (self.state & WORKING_BLOCK_INVALID_BIT) >> 1
    }
}
