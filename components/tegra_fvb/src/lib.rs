//! Firmware Volume Block (FVB) Store over NOR Flash
//!
//! Presents three fixed-purpose regions of a NOR flash device as firmware volume block endpoints for the variable
//! services:
//!
//! - **Variable**: the non-volatile variable store. Mirrored in RAM by a shadow buffer so reads never touch the
//!   device and the region can be reported as memory mapped.
//! - **FTW spare** and **FTW working**: the two halves of the fault tolerant write partition. Accessed directly on
//!   the device.
//!
//! On boot, [`BlockStoreManager::initialize`](component::block_store::BlockStoreManager::initialize) locates the
//! partitions through a [`PartitionLocator`](service::PartitionLocator) (normally the GPT at the end of the flash),
//! validates the variable region's firmware volume header (resizing it in place if the partition geometry changed,
//! reformatting it if it is unusable), writes the FTW working block header if it is missing, and publishes each
//! region through an [`FvbPublisher`](service::FvbPublisher).
//!
//! ## Error Semantics
//!
//! Block reads and writes follow the FVB2 protocol: a request that runs past the end of a block is clamped to the
//! block boundary, performed, and then reported as [`EfiError::BadBufferSize`](tegra_sdk::error::EfiError) with the
//! clamped byte count written back. Device write and erase failures on a shadowed region re-read the affected range
//! from the device before reporting [`EfiError::DeviceError`](tegra_sdk::error::EfiError), so the shadow never
//! diverges from flash.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tegra_fvb::{
//!     component::{block_store::BlockStoreManager, gpt_locator::GptPartitionLocator},
//!     config::FvbConfig,
//! };
//!
//! let manager = BlockStoreManager::initialize(nor_flash, &GptPartitionLocator, &mut publisher, &FvbConfig::default())?;
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
#![cfg_attr(all(not(feature = "std"), not(test), not(feature = "mockall")), no_std)]

extern crate alloc;

pub mod component;
pub mod config;
pub mod service;
