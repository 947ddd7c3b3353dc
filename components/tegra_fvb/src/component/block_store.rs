//! Block Store Manager
//!
//! Owns the flash device and the three block store regions carved out of it, and implements the firmware volume
//! block operations for each region.
//!
//! Regions are addressed through an [`FvbHandle`], an index into the manager's region table. A handle is turned into
//! an [`FvbEndpoint`] with [`BlockStoreManager::endpoint`]; the endpoint borrows the manager mutably for as long as it
//! is used, so at most one operation is ever in flight.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
extern crate alloc;
use alloc::{vec, vec::Vec};
use core::ops::Range;

use r_efi::efi::Lba;
use tegra_sdk::{
    error::{EfiError, Result},
    fw_fs::{fvb::attributes::NOR_FLASH_DEFAULT, fvb::LBA_LIST_TERMINATOR, EfiFvbAttributes2, FirmwareVolumeHeader},
    ERASED_BYTE,
};

use crate::service::{FirmwareVolumeBlock, FlashAttributes, NvStorageLayout, StorageDevice};

/// The fixed purpose a block store region serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Non-volatile variable store, shadowed in memory.
    Variable,
    /// Fault tolerant write spare area.
    FtwSpare,
    /// Fault tolerant write working area.
    FtwWorking,
}

/// Opaque reference to a region owned by a [`BlockStoreManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FvbHandle(pub(crate) usize);

/// A run of `count` blocks starting at `start_lba`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseRange {
    pub start_lba: Lba,
    pub count: u64,
}

impl EraseRange {
    pub const fn new(start_lba: Lba, count: u64) -> Self {
        Self { start_lba, count }
    }

    /// Parses an FVB2 style `(lba, count)` list terminated by [`LBA_LIST_TERMINATOR`].
    ///
    /// A list without a terminator, or a starting LBA without a count, is rejected with `InvalidParameter`.
    pub fn from_lba_list(list: &[u64]) -> Result<Vec<EraseRange>> {
        let mut ranges = Vec::new();
        let mut iter = list.iter().copied();
        loop {
            match iter.next() {
                Some(LBA_LIST_TERMINATOR) => return Ok(ranges),
                Some(start_lba) => {
                    let count = iter.next().ok_or(EfiError::InvalidParameter)?;
                    ranges.push(EraseRange::new(start_lba, count));
                }
                None => return Err(EfiError::InvalidParameter),
            }
        }
    }
}

/// Memory that backs a region.
#[derive(Debug)]
pub(crate) enum Backing {
    /// Full copy of the region's flash contents. Reads are served from it and writes go through it.
    Shadow(Vec<u8>),
    /// Buffer reserved only to give the region a block aligned physical address. Never read or written.
    Scratch(ScratchBuffer),
}

/// Over-allocated buffer whose block aligned window starts `start` bytes in.
#[derive(Debug)]
pub(crate) struct ScratchBuffer {
    storage: Vec<u8>,
    start: usize,
}

impl ScratchBuffer {
    fn new(length: usize, align: usize) -> Result<Self> {
        let capacity = length.checked_add(align).ok_or(EfiError::OutOfResources)?;
        let storage = vec![ERASED_BYTE; capacity];
        let misalignment = storage.as_ptr() as usize % align;
        let start = if misalignment == 0 { 0 } else { align - misalignment };
        Ok(Self { storage, start })
    }

    fn address(&self) -> u64 {
        self.storage.as_ptr() as u64 + self.start as u64
    }
}

/// A region of the flash device presented as a firmware volume block.
#[derive(Debug)]
pub(crate) struct Partition {
    pub(crate) region: Region,
    /// Byte offset of the region on the device.
    pub(crate) offset: u64,
    /// Size of the region in bytes, a multiple of the erase block size.
    pub(crate) size: u64,
    pub(crate) backing: Backing,
}

/// Location of a validated block transfer within a region.
struct Transfer {
    /// Byte offset from the start of the region.
    region_offset: u64,
    length: usize,
    /// Whether the request crossed the block boundary and was clamped.
    clamped: bool,
}

impl Transfer {
    fn range(&self) -> Range<usize> {
        let start = self.region_offset as usize;
        start..start + self.length
    }
}

impl Partition {
    fn shadow(&self) -> Option<&[u8]> {
        match &self.backing {
            Backing::Shadow(shadow) => Some(shadow),
            Backing::Scratch(_) => None,
        }
    }

    pub(crate) fn shadow_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.backing {
            Backing::Shadow(shadow) => Some(shadow),
            Backing::Scratch(_) => None,
        }
    }

    fn physical_address(&self) -> u64 {
        match &self.backing {
            Backing::Shadow(buffer) => buffer.as_ptr() as u64,
            Backing::Scratch(scratch) => scratch.address(),
        }
    }

    fn attributes(&self) -> EfiFvbAttributes2 {
        self.shadow().and_then(FirmwareVolumeHeader::read_from).map_or(NOR_FLASH_DEFAULT, |header| header.attributes)
    }

    fn num_blocks(&self, block_size: u32) -> u64 {
        self.size / block_size as u64
    }

    fn last_block(&self, block_size: u32) -> Lba {
        self.num_blocks(block_size).saturating_sub(1)
    }

    /// Validates a read or write request and clamps it to the block boundary.
    ///
    /// `num_bytes` is updated in place the same way the FVB2 protocol reports it back to its caller.
    fn check_transfer(
        &self,
        block_size: u32,
        lba: Lba,
        offset: usize,
        num_bytes: &mut usize,
        buffer_len: usize,
    ) -> Result<Transfer> {
        if buffer_len < *num_bytes || offset.checked_add(*num_bytes).is_none() {
            return Err(EfiError::InvalidParameter);
        }

        if lba > self.last_block(block_size) {
            *num_bytes = 0;
            return Err(EfiError::BadBufferSize);
        }

        if *num_bytes == 0 {
            return Err(EfiError::BadBufferSize);
        }

        let block_size = block_size as usize;
        if offset >= block_size {
            *num_bytes = 0;
            return Err(EfiError::BadBufferSize);
        }

        let clamped = offset + *num_bytes > block_size;
        if clamped {
            *num_bytes = block_size - offset;
        }

        Ok(Transfer { region_offset: lba * block_size as u64 + offset as u64, length: *num_bytes, clamped })
    }
}

/// Block Store Manager
///
/// Owns the flash device and every region presented on top of it.
#[derive(Debug)]
pub struct BlockStoreManager<D: StorageDevice> {
    pub(crate) device: D,
    pub(crate) flash: FlashAttributes,
    pub(crate) partitions: Vec<Partition>,
}

impl<D: StorageDevice> BlockStoreManager<D> {
    /// Creates a manager with no regions, reading the geometry from `device`.
    pub fn new(device: D) -> Result<Self> {
        let flash = device.attributes().inspect_err(|err| {
            log::error!(target: "fvb", "Failed to get NOR flash attributes: {:?}", err);
        })?;

        if flash.block_size == 0 {
            log::error!(target: "fvb", "NOR flash reports a zero erase block size.");
            return Err(EfiError::DeviceError);
        }

        log::debug!(
            target: "fvb",
            "NOR flash: block size {:#x}, density {:#x}.",
            flash.block_size,
            flash.memory_density
        );
        Ok(Self { device, flash, partitions: Vec::new() })
    }

    /// Adds a region of `size` bytes at byte `offset` of the device.
    ///
    /// The variable region is given a shadow buffer filled from the device. The FTW regions are given a block aligned
    /// scratch buffer that only provides their physical address.
    pub fn add_region(&mut self, region: Region, offset: u64, size: u64) -> Result<FvbHandle> {
        let block_size = self.flash.block_size as u64;
        if size == 0 || size % block_size != 0 || offset % block_size != 0 {
            log::error!(target: "fvb", "{:?} region at {:#x} of {:#x} bytes is not block aligned.", region, offset, size);
            return Err(EfiError::InvalidParameter);
        }
        let length = usize::try_from(size).map_err(|_| EfiError::OutOfResources)?;

        let backing = match region {
            Region::Variable => {
                let mut shadow = vec![ERASED_BYTE; length];
                self.device.read(offset, &mut shadow).inspect_err(|err| {
                    log::error!(target: "fvb", "Failed to read partition data: {:?}", err);
                })?;
                Backing::Shadow(shadow)
            }
            Region::FtwSpare | Region::FtwWorking => {
                Backing::Scratch(ScratchBuffer::new(length, self.flash.block_size as usize)?)
            }
        };

        self.partitions.push(Partition { region, offset, size, backing });
        Ok(FvbHandle(self.partitions.len() - 1))
    }

    /// Returns the block operations of the region behind `handle`.
    pub fn endpoint(&mut self, handle: FvbHandle) -> Result<FvbEndpoint<'_, D>> {
        if handle.0 >= self.partitions.len() {
            return Err(EfiError::InvalidParameter);
        }
        Ok(FvbEndpoint { manager: self, index: handle.0 })
    }

    /// Returns the purpose of the region behind `handle`.
    pub fn region(&self, handle: FvbHandle) -> Option<Region> {
        self.partitions.get(handle.0).map(|partition| partition.region)
    }

    /// Returns the handle of the first region serving `region`.
    pub fn handle_of(&self, region: Region) -> Option<FvbHandle> {
        self.partitions.iter().position(|partition| partition.region == region).map(FvbHandle)
    }

    /// Returns every region handle in creation order.
    pub fn handles(&self) -> impl Iterator<Item = FvbHandle> + '_ {
        (0..self.partitions.len()).map(FvbHandle)
    }

    pub fn flash_attributes(&self) -> FlashAttributes {
        self.flash
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Base address and size of each region's buffer.
    pub fn storage_layout(&self) -> NvStorageLayout {
        let mut layout = NvStorageLayout::default();
        for partition in &self.partitions {
            let base = partition.physical_address();
            match partition.region {
                Region::Variable => (layout.variable_base, layout.variable_size) = (base, partition.size),
                Region::FtwSpare => (layout.ftw_spare_base, layout.ftw_spare_size) = (base, partition.size),
                Region::FtwWorking => (layout.ftw_working_base, layout.ftw_working_size) = (base, partition.size),
            }
        }
        layout
    }

    /// Re-reads `range` of a region's shadow from the device after a failed write or erase.
    fn resync_shadow(device: &D, partition: &mut Partition, range: Range<usize>) {
        let device_offset = partition.offset + range.start as u64;
        if let Some(shadow) = partition.shadow_mut() {
            if let Err(err) = device.read(device_offset, &mut shadow[range]) {
                log::error!(target: "fvb", "Failed to resync shadow at {:#x}: {:?}", device_offset, err);
            }
        }
    }
}

/// Firmware volume block operations on one region of a [`BlockStoreManager`].
pub struct FvbEndpoint<'a, D: StorageDevice> {
    manager: &'a mut BlockStoreManager<D>,
    index: usize,
}

impl<D: StorageDevice> FvbEndpoint<'_, D> {
    fn partition(&self) -> &Partition {
        &self.manager.partitions[self.index]
    }

    pub fn region(&self) -> Region {
        self.partition().region
    }
}

impl<D: StorageDevice> FirmwareVolumeBlock for FvbEndpoint<'_, D> {
    fn get_attributes(&self) -> Result<EfiFvbAttributes2> {
        Ok(self.partition().attributes())
    }

    fn set_attributes(&mut self, _attributes: EfiFvbAttributes2) -> Result<EfiFvbAttributes2> {
        Err(EfiError::Unsupported)
    }

    fn get_physical_address(&self) -> Result<u64> {
        Ok(self.partition().physical_address())
    }

    fn get_block_size(&self, lba: Lba) -> Result<(usize, usize)> {
        let block_size = self.manager.flash.block_size;
        let remaining = self.partition().num_blocks(block_size).saturating_sub(lba);
        Ok((block_size as usize, remaining as usize))
    }

    fn read(&self, lba: Lba, offset: usize, num_bytes: &mut usize, buffer: &mut [u8]) -> Result<()> {
        let partition = self.partition();
        let transfer = partition.check_transfer(self.manager.flash.block_size, lba, offset, num_bytes, buffer.len())?;
        let buffer = &mut buffer[..transfer.length];

        let status = match partition.shadow() {
            Some(shadow) => {
                buffer.copy_from_slice(&shadow[transfer.range()]);
                Ok(())
            }
            None => self.manager.device.read(partition.offset + transfer.region_offset, buffer).inspect_err(|err| {
                log::error!(target: "fvb", "FVB read at {:#x} failed: {:?}", partition.offset + transfer.region_offset, err);
            }),
        };

        // A boundary crossing is reported even when the device read failed.
        if transfer.clamped {
            return Err(EfiError::BadBufferSize);
        }
        status
    }

    fn write(&mut self, lba: Lba, offset: usize, num_bytes: &mut usize, buffer: &[u8]) -> Result<()> {
        let BlockStoreManager { device, flash, partitions } = &mut *self.manager;
        let partition = &mut partitions[self.index];
        let transfer = partition.check_transfer(flash.block_size, lba, offset, num_bytes, buffer.len())?;
        let data = &buffer[..transfer.length];
        let device_offset = partition.offset + transfer.region_offset;

        if let Some(shadow) = partition.shadow_mut() {
            shadow[transfer.range()].copy_from_slice(data);
        }

        if let Err(err) = device.write(device_offset, data) {
            log::error!(target: "fvb", "FVB write at {:#x} failed: {:?}", device_offset, err);
            BlockStoreManager::resync_shadow(device, partition, transfer.range());
            return Err(EfiError::DeviceError);
        }

        if transfer.clamped {
            return Err(EfiError::BadBufferSize);
        }
        Ok(())
    }

    fn erase_blocks(&mut self, ranges: &[EraseRange]) -> Result<()> {
        let BlockStoreManager { device, flash, partitions } = &mut *self.manager;
        let partition = &mut partitions[self.index];
        let block_size = flash.block_size as u64;
        let last_block = partition.last_block(flash.block_size);

        if ranges.is_empty() {
            return Err(EfiError::InvalidParameter);
        }

        for range in ranges {
            let in_bounds = range.count != 0
                && range.start_lba.checked_add(range.count).is_some_and(|end| end - 1 <= last_block);
            if !in_bounds {
                log::debug!(target: "fvb", "Rejecting erase of {:?} past block {:#x}.", range, last_block);
                return Err(EfiError::InvalidParameter);
            }
        }

        for range in ranges {
            let region_offset = range.start_lba * block_size;
            let span = region_offset as usize..(region_offset + range.count * block_size) as usize;

            if let Some(shadow) = partition.shadow_mut() {
                shadow[span.clone()].fill(ERASED_BYTE);
            }

            if let Err(err) = device.erase((partition.offset + region_offset) / block_size, range.count) {
                log::error!(target: "fvb", "FVB erase of {:?} failed: {:?}", range, err);
                BlockStoreManager::resync_shadow(device, partition, span);
                return Err(EfiError::DeviceError);
            }
        }

        Ok(())
    }
}
