//! Firmware Volume Block (FVB) Definitions
//!
//! Based on the values defined in the UEFI Platform Initialization (PI) Specification V1.8A Section 3.4.2
//! Firmware Volume Block2 Protocol.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

pub mod attributes;

/// Terminator of the LBA list passed to an EraseBlocks call (`EFI_LBA_LIST_TERMINATOR`).
pub const LBA_LIST_TERMINATOR: u64 = u64::MAX;
