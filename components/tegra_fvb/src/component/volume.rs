//! Variable Region and FTW Working Region Headers
//!
//! Validation and (re)initialization of the on-flash metadata the variable and fault tolerant write drivers expect
//! to find when they start: the firmware volume header and variable store header at the start of the variable
//! region, and the working block header at the start of the FTW working region.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::mem;

use tegra_sdk::{
    error::{EfiError, Result},
    ftw::{self, WorkingBlockHeader, FTW_INVALID_STATE, FTW_VALID_STATE},
    fw_fs::{
        checksum16,
        fv::{self, FirmwareVolumeHeader},
        fvb::attributes::NV_STORAGE_VOLUME,
    },
    guids, is_erased,
    variable::VariableStoreHeader,
    ERASED_BYTE,
};
use zerocopy::IntoBytes;

use crate::service::{FlashAttributes, StorageDevice};

const CHECKSUM_OFFSET: usize = mem::offset_of!(FirmwareVolumeHeader, checksum);
const VARIABLE_STORE_HEADER_SIZE: usize = mem::size_of::<VariableStoreHeader>();

/// Formats a region as an empty firmware volume, optionally holding an empty variable store.
///
/// `data` is the in-memory copy of the region at byte `offset` of the device and is updated to match what is
/// written. A region that is not fully erased is erased first. Fails with `OutOfResources` if the region is too small
/// to hold the headers, and with `DeviceError` if the region still does not read back erased after the erase.
pub fn initialize_fv_and_variable_store_headers<D: StorageDevice + ?Sized>(
    device: &mut D,
    flash: &FlashAttributes,
    data: &mut [u8],
    offset: u64,
    check_variable_store: bool,
) -> Result<()> {
    let required = fv::HEADER_LENGTH + if check_variable_store { VARIABLE_STORE_HEADER_SIZE } else { 0 };
    if data.is_empty() || data.len() < required {
        return Err(EfiError::OutOfResources);
    }

    let size = data.len() as u64;
    let block_size = flash.block_size as u64;

    if !is_erased(data) {
        device.erase(offset / block_size, size / block_size).inspect_err(|err| {
            log::error!(target: "fvb", "Failed to erase partition at {:#x}: {:?}", offset, err);
        })?;
        device.read(offset, data)?;
        if !is_erased(data) {
            log::error!(target: "fvb", "Partition at {:#x} does not read back erased.", offset);
            return Err(EfiError::DeviceError);
        }
    }

    let header = FirmwareVolumeHeader::new(&guids::SYSTEM_NV_DATA_FV, size, flash.block_size, NV_STORAGE_VOLUME);
    data[..fv::HEADER_LENGTH].copy_from_slice(header.as_bytes());
    device.write(offset, &data[..fv::HEADER_LENGTH]).inspect_err(|err| {
        log::error!(target: "fvb", "Failed to write partition header: {:?}", err);
    })?;

    if check_variable_store {
        let store_size = u32::try_from(size - fv::HEADER_LENGTH as u64).map_err(|_| EfiError::OutOfResources)?;
        let store = VariableStoreHeader::new(&guids::AUTHENTICATED_VARIABLE_STORE, store_size);
        let span = fv::HEADER_LENGTH..required;
        data[span.clone()].copy_from_slice(store.as_bytes());
        device.write(offset + fv::HEADER_LENGTH as u64, &data[span]).inspect_err(|err| {
            log::error!(target: "fvb", "Failed to write variable header: {:?}", err);
        })?;
    }

    log::info!(target: "fvb", "Formatted {:#x} byte firmware volume at {:#x}.", size, offset);
    Ok(())
}

/// Checks the firmware volume (and optionally variable store) header at the start of `data`.
///
/// Returns `NotFound` for anything that is not a usable volume. A usable volume whose recorded length or block size
/// differs from the current partition geometry is resized in place: the headers in `data` are rewritten for the new
/// geometry, the region is erased, and the volume's original length is written back from `data`.
pub fn validate_fv_header<D: StorageDevice + ?Sized>(
    device: &mut D,
    flash: &FlashAttributes,
    data: &mut [u8],
    offset: u64,
    check_variable_store: bool,
) -> Result<()> {
    let size = data.len() as u64;

    let Some(mut header) = FirmwareVolumeHeader::read_from(data) else {
        return Err(EfiError::NotFound);
    };
    let header_length = header.header_length as usize;

    if header.revision != fv::REVISION
        || header.signature != fv::SIGNATURE
        || header.fv_length > size
        || header_length < fv::HEADER_LENGTH
    {
        log::info!(target: "fvb", "No firmware volume header present.");
        return Err(EfiError::NotFound);
    }

    if !header.has_file_system(&guids::SYSTEM_NV_DATA_FV) {
        log::info!(target: "fvb", "Firmware volume GUID non-compatible.");
        return Err(EfiError::NotFound);
    }

    match FirmwareVolumeHeader::sum_in(data) {
        Some(0) => {}
        sum => {
            log::info!(target: "fvb", "Firmware volume checksum is invalid ({:x?}).", sum);
            return Err(EfiError::NotFound);
        }
    }

    let mut store = None;
    if check_variable_store {
        let Some(found) = data.get(header_length..).and_then(VariableStoreHeader::read_from) else {
            return Err(EfiError::NotFound);
        };

        if !found.has_known_signature() {
            log::info!(target: "fvb", "Variable store GUID non-compatible.");
            return Err(EfiError::NotFound);
        }

        if header.fv_length.checked_sub(header_length as u64) != Some(found.size as u64) {
            log::info!(target: "fvb", "Variable store length does not match.");
            return Err(EfiError::NotFound);
        }
        store = Some(found);
    }

    if header.fv_length == size && header.block_map[0].length == flash.block_size {
        return Ok(());
    }

    let original_length = header.fv_length as usize;
    log::info!(
        target: "fvb",
        "Resizing firmware volume from {:#x} to {:#x} bytes ({:#x} byte blocks).",
        original_length,
        size,
        flash.block_size
    );

    header.set_geometry(size, flash.block_size);
    data[..fv::HEADER_LENGTH].copy_from_slice(header.as_bytes());
    if let Some(mut store) = store {
        store.size = (size - header_length as u64) as u32;
        data[header_length..header_length + VARIABLE_STORE_HEADER_SIZE].copy_from_slice(store.as_bytes());
    }
    seal_header(data, header_length);
    data[original_length..].fill(ERASED_BYTE);

    let block_size = flash.block_size as u64;
    device.erase(offset / block_size, size / block_size).inspect_err(|err| {
        log::error!(target: "fvb", "Failed to erase partition at {:#x}: {:?}", offset, err);
    })?;

    if let Err(err) = device.write(offset, &data[..original_length]) {
        log::error!(target: "fvb", "Failed to write back resized volume: {:?}", err);
    }

    Ok(())
}

/// Recomputes the checksum of the serialized header so its first `header_length` bytes sum to zero.
fn seal_header(data: &mut [u8], header_length: usize) {
    data[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].fill(0);
    let checksum = checksum16(&data[..header_length]);
    data[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_le_bytes());
}

/// Writes a fresh working block header at the start of the FTW working region unless one is already there.
///
/// Best effort: failures are logged and the region is left as it is.
pub fn initialize_work_space_header<D: StorageDevice + ?Sized>(
    device: &mut D,
    flash: &FlashAttributes,
    offset: u64,
    size: u64,
) {
    let mut raw = [0u8; ftw::HEADER_SIZE];
    if let Err(err) = device.read(offset, &mut raw) {
        log::error!(target: "fvb", "Failed to read the working area: {:?}", err);
        return;
    }

    if WorkingBlockHeader::read_from(&raw).is_some_and(|header| header.has_signature(&guids::WORKING_BLOCK_SIGNATURE)) {
        log::debug!(target: "fvb", "Working block header already present at {:#x}.", offset);
        return;
    }

    let block_size = flash.block_size as u64;
    if !is_erased(&raw) {
        if let Err(err) = device.erase(offset / block_size, size / block_size) {
            log::error!(target: "fvb", "Failed to erase working block: {:?}", err);
        }
    }

    let mut header = WorkingBlockHeader::erased();
    header.signature = *guids::WORKING_BLOCK_SIGNATURE.as_bytes();
    header.write_queue_size = size.saturating_sub(ftw::HEADER_SIZE as u64);
    header.crc = crc32fast::hash(header.as_bytes());
    header.set_state_flags(FTW_VALID_STATE, FTW_INVALID_STATE);

    match device.write(offset, header.as_bytes()) {
        Ok(()) => log::info!(target: "fvb", "Initialized working block header at {:#x}.", offset),
        Err(err) => log::error!(target: "fvb", "Failed to write the working area: {:?}", err),
    }
}
