//! Variable Store Header
//!
//! The header that immediately follows the firmware volume header in the variable region and describes the
//! variable store it contains. Layout matches `VARIABLE_STORE_HEADER` in EDK II.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use r_efi::efi;
use zerocopy::FromBytes;
use zerocopy_derive::*;

use crate::guids;

/// Format byte of a formatted variable store.
pub const FORMATTED: u8 = 0x5A;

/// State byte of a healthy variable store.
pub const HEALTHY: u8 = 0xFE;

/// VARIABLE_STORE_HEADER
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct VariableStoreHeader {
    /// Variable store signature GUID
    pub signature: [u8; 16],
    /// Size of the variable store, including this header
    pub size: u32,
    /// Format state of the store
    pub format: u8,
    /// Health state of the store
    pub state: u8,
    /// Reserved
    pub reserved: u16,
    /// Reserved
    pub reserved1: u32,
}

impl VariableStoreHeader {
    /// Creates a formatted, healthy store header of `size` bytes identified by `signature`.
    pub fn new(signature: &efi::Guid, size: u32) -> Self {
        Self { signature: *signature.as_bytes(), size, format: FORMATTED, state: HEALTHY, reserved: 0, reserved1: 0 }
    }

    /// Reads a header from the start of `buffer`, if it is long enough.
    pub fn read_from(buffer: &[u8]) -> Option<Self> {
        Self::read_from_prefix(buffer).ok().map(|(header, _)| header)
    }

    /// Returns true if the signature is one of the variable store GUIDs this firmware understands.
    pub fn has_known_signature(&self) -> bool {
        self.signature == *guids::VARIABLE_STORE.as_bytes()
            || self.signature == *guids::AUTHENTICATED_VARIABLE_STORE.as_bytes()
    }
}
