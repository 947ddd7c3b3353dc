//! Firmware Volume Block Attributes
//!
//! Based on the values defined in the UEFI Platform Initialization (PI) Specification V1.8A Section 3.2.1.1
//! EFI_FIRMWARE_VOLUME_HEADER.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Type alias for firmware volume block attributes (version 2) as defined in the PI Specification
pub type EfiFvbAttributes2 = u32;

/// EFI_FVB_ATTRIBUTES_2 bit definitions
/// Note: Typically named `EFI_FVB2_*` in EDK II code.
pub mod raw {
    /// Raw FVB2 attribute constant definitions
    pub mod fvb2 {
        /// Capability to disable read operations
        pub const READ_DISABLED_CAP: u32 = 0x00000001;
        /// Capability to enable read operations
        pub const READ_ENABLED_CAP: u32 = 0x00000002;
        /// Current read enable/disable status
        pub const READ_STATUS: u32 = 0x00000004;
        /// Capability to disable write operations
        pub const WRITE_DISABLED_CAP: u32 = 0x00000008;
        /// Capability to enable write operations
        pub const WRITE_ENABLED_CAP: u32 = 0x00000010;
        /// Current write enable/disable status
        pub const WRITE_STATUS: u32 = 0x00000020;
        /// Capability to lock the firmware volume block
        pub const LOCK_CAP: u32 = 0x00000040;
        /// Current lock status
        pub const LOCK_STATUS: u32 = 0x00000080;
        /// A block erase is required to flip bits back to the erase polarity
        pub const STICKY_WRITE: u32 = 0x00000200;
        /// Block can be memory-mapped
        pub const MEMORY_MAPPED: u32 = 0x00000400;
        /// Erase polarity bit - after erasure all bits take this value
        pub const ERASE_POLARITY: u32 = 0x00000800;
    }
}

use raw::fvb2;

/// Attributes reported by a NOR flash block store region that has no memory-mapped shadow.
pub const NOR_FLASH_DEFAULT: EfiFvbAttributes2 = fvb2::READ_ENABLED_CAP
    | fvb2::READ_STATUS
    | fvb2::STICKY_WRITE
    | fvb2::ERASE_POLARITY
    | fvb2::WRITE_STATUS
    | fvb2::WRITE_ENABLED_CAP;

/// Attributes written into a freshly formatted non-volatile storage volume header.
pub const NV_STORAGE_VOLUME: EfiFvbAttributes2 = NOR_FLASH_DEFAULT | fvb2::MEMORY_MAPPED;
