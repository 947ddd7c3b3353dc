//! Firmware Volume Block Services
//!
//! The collaborators the block store consumes and the endpoint interface it exposes.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
pub mod firmware_volume_block;
pub mod fvb_publisher;
pub mod partition_locator;
pub mod storage_device;

pub use firmware_volume_block::FirmwareVolumeBlock;
pub use fvb_publisher::{FvbPublisher, NvStorageLayout};
pub use partition_locator::{PartitionInfo, PartitionLocator};
pub use storage_device::{FlashAttributes, StorageDevice};
