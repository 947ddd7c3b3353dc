//! Block Store Boot Initialization
//!
//! Brings the block store up from a raw flash device: find the partitions, carve the three regions out of them,
//! make sure the on-flash headers are usable, and publish the endpoints. Any failure withdraws whatever was already
//! published and releases the region buffers.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
extern crate alloc;
use alloc::{vec, vec::Vec};

use tegra_sdk::{
    error::{EfiError, Result},
    gpt, ERASED_BYTE,
};

use crate::{
    component::{
        block_store::{BlockStoreManager, FvbHandle, Region},
        volume,
    },
    config::{FvbConfig, PartitionLayout},
    service::{FvbPublisher, PartitionLocator, StorageDevice},
};

impl<D: StorageDevice> BlockStoreManager<D> {
    /// Brings up the block store on `device`.
    ///
    /// Returns `Ok(None)` without touching the device when the configuration selects emulated variables. Otherwise
    /// returns the manager that owns the published regions; it must be kept alive for as long as the endpoints are
    /// installed.
    pub fn initialize<L, P>(device: D, locator: &L, publisher: &mut P, config: &FvbConfig) -> Result<Option<Self>>
    where
        L: PartitionLocator + ?Sized,
        P: FvbPublisher + ?Sized,
    {
        if config.emulated_nv_mode {
            log::info!(target: "fvb", "Emulated variable mode, leaving NOR flash untouched.");
            return Ok(None);
        }

        let mut manager = Self::new(device)?;

        let layout = match manager.discover_partitions(locator, config) {
            Ok(layout) => layout,
            Err(err) => match config.fixed_layout {
                Some(layout) => {
                    log::warn!(target: "fvb", "GPT discovery failed ({:?}), using the fixed partition layout.", err);
                    layout
                }
                None => return Err(err),
            },
        };
        layout.validate(&manager.flash)?;

        let mut installed = Vec::new();
        match manager.bring_up(&layout, publisher, config, &mut installed) {
            Ok(()) => Ok(Some(manager)),
            Err(err) => {
                log::error!(target: "fvb", "FVB initialization failed: {:?}", err);
                for handle in installed.into_iter().rev() {
                    if let Err(uninstall_err) = publisher.uninstall(handle) {
                        log::error!(target: "fvb", "Failed to uninstall {:?}: {:?}", handle, uninstall_err);
                    }
                }
                Err(err)
            }
        }
    }

    /// Reads and validates the GPT, then resolves the variable and FTW partitions.
    fn discover_partitions<L: PartitionLocator + ?Sized>(&self, locator: &L, config: &FvbConfig) -> Result<PartitionLayout> {
        let mut header_block = vec![0u8; gpt::BLOCK_SIZE as usize];
        self.device.read(locator.header_offset(&self.flash), &mut header_block).inspect_err(|err| {
            log::error!(target: "fvb", "Failed to read GPT partition table: {:?}", err);
        })?;

        let header = locator.validate_header(&header_block).map_err(|err| {
            log::error!(target: "fvb", "Invalid EFI partition table header: {:?}", err);
            EfiError::DeviceError
        })?;

        let mut entries = vec![ERASED_BYTE; header.partition_table_size()];
        self.device.read(header.partition_table_offset(), &mut entries).inspect_err(|err| {
            log::error!(target: "fvb", "Failed to read GPT partition array: {:?}", err);
        })?;

        locator.validate_partition_table(&header, &entries).inspect_err(|err| {
            log::error!(target: "fvb", "Invalid GPT partition entry array: {:?}", err);
        })?;

        let resolve = |name: &str| {
            locator.find_partition_by_name(&header, &entries, name).map_or((0, 0), |info| info.byte_range())
        };
        let (variable_offset, variable_size) = resolve(&config.variable_partition_name);
        let (ftw_offset, ftw_size) = resolve(&config.ftw_partition_name);

        if variable_offset == 0 || ftw_offset == 0 {
            log::error!(target: "fvb", "Partition not found.");
            return Err(EfiError::DeviceError);
        }

        Ok(PartitionLayout { variable_offset, variable_size, ftw_offset, ftw_size })
    }

    fn bring_up<P: FvbPublisher + ?Sized>(
        &mut self,
        layout: &PartitionLayout,
        publisher: &mut P,
        config: &FvbConfig,
        installed: &mut Vec<FvbHandle>,
    ) -> Result<()> {
        let spare_size = layout.variable_size;
        self.add_region(Region::Variable, layout.variable_offset, layout.variable_size)?;
        self.add_region(Region::FtwSpare, layout.ftw_offset, spare_size)?;
        self.add_region(Region::FtwWorking, layout.ftw_offset + spare_size, layout.ftw_size - spare_size)?;

        let storage_layout = self.storage_layout();
        log::info!(target: "fvb", "NV storage layout: {:x?}", storage_layout);
        publisher.publish_storage_layout(&storage_layout)?;

        let handles: Vec<FvbHandle> = self.handles().collect();
        for handle in handles {
            self.prepare_region(handle)?;
            let region = self.region(handle).ok_or(EfiError::InvalidParameter)?;
            publisher.install(handle, region).inspect_err(|err| {
                log::error!(target: "fvb", "Failed to install {:?} FVB: {:?}", region, err);
            })?;
            installed.push(handle);
        }

        if let Err(err) = publisher.signal_var_store_formatted() {
            log::error!(target: "fvb", "Failed to signal variable store formatted: {:?}", err);
        }

        if let Some(supported) = config.runtime_services_supported {
            publisher.publish_runtime_properties(supported).inspect_err(|err| {
                log::error!(target: "fvb", "Failed to publish RT properties table: {:?}", err);
            })?;
        }

        Ok(())
    }

    /// Makes sure the region's on-flash headers are usable before it is published.
    fn prepare_region(&mut self, handle: FvbHandle) -> Result<()> {
        let Self { device, flash, partitions } = self;
        let Some(partition) = partitions.get_mut(handle.0) else {
            return Err(EfiError::InvalidParameter);
        };

        match partition.region {
            Region::Variable => {
                let offset = partition.offset;
                let Some(shadow) = partition.shadow_mut() else {
                    return Err(EfiError::InvalidParameter);
                };
                if volume::validate_fv_header(device, flash, shadow, offset, true).is_err() {
                    log::info!(target: "fvb", "The FVB header is not valid, installing a correct one.");
                    volume::initialize_fv_and_variable_store_headers(device, flash, shadow, offset, true)?;
                }
            }
            Region::FtwWorking => volume::initialize_work_space_header(device, flash, partition.offset, partition.size),
            Region::FtwSpare => {}
        }
        Ok(())
    }
}
