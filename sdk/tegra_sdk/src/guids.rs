//! GUID definitions used by the Tegra firmware components.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use r_efi::efi;

/// File system GUID of the firmware volume that holds the non-volatile variable store.
///
/// (`gEfiSystemNvDataFvGuid` in EDK II)
pub const SYSTEM_NV_DATA_FV: efi::Guid =
    efi::Guid::from_fields(0xfff12b8d, 0x7696, 0x4c8b, 0xa9, 0x85, &[0x27, 0x47, 0x07, 0x5b, 0x4f, 0x50]);

/// Signature of a variable store holding non-authenticated variables.
///
/// (`gEfiVariableGuid` in EDK II)
pub const VARIABLE_STORE: efi::Guid =
    efi::Guid::from_fields(0xddcf3616, 0x3275, 0x4164, 0x98, 0xb6, &[0xfe, 0x85, 0x70, 0x7f, 0xfe, 0x7d]);

/// Signature of a variable store holding authenticated variables.
///
/// (`gEfiAuthenticatedVariableGuid` in EDK II)
pub const AUTHENTICATED_VARIABLE_STORE: efi::Guid =
    efi::Guid::from_fields(0xaaf32c78, 0x947b, 0x439a, 0xa1, 0x80, &[0x2e, 0x14, 0x4e, 0xc3, 0x77, 0x92]);

/// Signature of a fault tolerant write working block header.
///
/// (`gEdkiiWorkingBlockSignatureGuid` in EDK II)
pub const WORKING_BLOCK_SIGNATURE: efi::Guid =
    efi::Guid::from_fields(0x9e58292b, 0x7c68, 0x497d, 0xa0, 0xce, &[0x65, 0x00, 0xfd, 0x9f, 0x1b, 0x95]);

/// Firmware Volume Block 2 protocol GUID, installed on every published block store endpoint.
pub const FIRMWARE_VOLUME_BLOCK2_PROTOCOL: efi::Guid =
    efi::Guid::from_fields(0x8f644fa9, 0xe850, 0x4db1, 0x9c, 0xe2, &[0x0b, 0x44, 0x69, 0x8e, 0x8d, 0xa4]);

/// Marker installed once the variable store has been validated or formatted.
///
/// (`gEdkiiNvVarStoreFormattedGuid` in EDK II)
pub const NV_VAR_STORE_FORMATTED: efi::Guid =
    efi::Guid::from_fields(0xd1a86e3f, 0x0707, 0x4c35, 0x83, 0xcd, &[0xdc, 0x2c, 0x29, 0xc8, 0x91, 0xa3]);

/// Configuration table GUID for the runtime properties table.
pub const RT_PROPERTIES_TABLE: efi::Guid =
    efi::Guid::from_fields(0xeb66918a, 0x7eef, 0x402a, 0x84, 0x2e, &[0x93, 0x1d, 0x21, 0xc3, 0x8a, 0xe9]);
