//! Firmware Volume Block Publisher Service Trait
//!
//! The boundary to the firmware's protocol database. The block store calls into it once every region is ready so
//! the variable services can find the endpoints.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use tegra_sdk::error::Result;

use crate::component::block_store::{FvbHandle, Region};

/// Base addresses and sizes of the three block store regions.
///
/// Published for the variable and fault tolerant write drivers, which locate their storage by these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NvStorageLayout {
    pub variable_base: u64,
    pub variable_size: u64,
    pub ftw_spare_base: u64,
    pub ftw_spare_size: u64,
    pub ftw_working_base: u64,
    pub ftw_working_size: u64,
}

/// Firmware Volume Block Publisher
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait FvbPublisher {
    /// Makes the endpoint behind `handle` available to consumers.
    fn install(&mut self, handle: FvbHandle, region: Region) -> Result<()>;

    /// Withdraws a previously installed endpoint.
    fn uninstall(&mut self, handle: FvbHandle) -> Result<()>;

    /// Records where each region's buffer lives.
    fn publish_storage_layout(&mut self, layout: &NvStorageLayout) -> Result<()>;

    /// Signals that the variable store has been validated or formatted.
    fn signal_var_store_formatted(&mut self) -> Result<()>;

    /// Publishes the runtime properties table with the given supported runtime services mask.
    fn publish_runtime_properties(&mut self, runtime_services_supported: u32) -> Result<()>;
}
