//! Tegra Firmware SDK
//!
//! Common definitions shared by the Tegra firmware components:
//!
//! - [`error`]: the [`EfiError`](error::EfiError) enum and [`Result`](error::Result) alias used by every operation.
//! - [`guids`]: well known GUIDs identifying on-flash structures.
//! - [`fw_fs`]: Firmware Volume header, block map, and FVB attribute definitions.
//! - [`variable`]: the variable store header that follows the volume header in the variable region.
//! - [`ftw`]: the fault tolerant write working block header.
//! - [`gpt`]: GUID Partition Table header and entry layouts.
//!
//! All on-flash structures derive the `zerocopy` traits so they can be read from and written to raw flash buffers
//! without `unsafe` pointer casts.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

pub mod error;
pub mod ftw;
pub mod fw_fs;
pub mod gpt;
pub mod guids;
pub mod variable;

/// Value every byte of NOR flash reads as after an erase cycle.
pub const ERASED_BYTE: u8 = 0xFF;

/// Returns true if every byte in `buffer` holds the [`ERASED_BYTE`] value.
///
/// An empty buffer is considered erased.
pub fn is_erased(buffer: &[u8]) -> bool {
    buffer.iter().all(|&b| b == ERASED_BYTE)
}
