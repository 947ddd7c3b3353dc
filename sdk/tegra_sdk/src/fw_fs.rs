//! Firmware File System Definitions
//!
//! Based on the values defined in the UEFI Platform Initialization (PI) Specification V1.8A 3.1 Firmware Storage
//! Code Definitions. Only the pieces a firmware volume block store needs are defined here.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

pub mod fv;
pub mod fvb;

pub use fv::{BlockMapEntry, FirmwareVolumeHeader};
pub use fvb::attributes::EfiFvbAttributes2;

/// Computes the 16-bit additive sum over `buffer`, read as little endian words.
///
/// A trailing odd byte is ignored.
pub fn sum16(buffer: &[u8]) -> u16 {
    buffer.chunks_exact(2).fold(0u16, |sum, word| sum.wrapping_add(u16::from_le_bytes([word[0], word[1]])))
}

/// Computes the checksum value that makes the 16-bit additive sum over `buffer` equal zero.
///
/// The checksum field inside `buffer` must be zero when this is called.
pub fn checksum16(buffer: &[u8]) -> u16 {
    0u16.wrapping_sub(sum16(buffer))
}
