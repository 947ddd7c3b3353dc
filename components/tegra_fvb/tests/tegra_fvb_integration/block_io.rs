//! Block I/O Integration Tests
//!
//! Exercises the published FVB endpoints on a booted block store, with a focus on how the variable shadow tracks the
//! device when programming or erasing fails part way.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use tegra_fvb::{
    component::block_store::{BlockStoreManager, EraseRange, FvbHandle, Region},
    component::gpt_locator::GptPartitionLocator,
    config::FvbConfig,
    service::FirmwareVolumeBlock,
};
use tegra_sdk::{error::EfiError, fw_fs::fvb::LBA_LIST_TERMINATOR};

use crate::tegra_fvb_integration::common::*;

const BLOCK: usize = BLOCK_SIZE as usize;

fn booted() -> (SimulatedNorFlash, BlockStoreManager<SimulatedNorFlash>, RecordingPublisher) {
    let flash = blank_flash();
    let mut publisher = RecordingPublisher::default();
    let manager = BlockStoreManager::initialize(flash.clone(), &GptPartitionLocator, &mut publisher, &FvbConfig::default())
        .unwrap()
        .unwrap();
    (flash, manager, publisher)
}

/// Reads a whole block of `handle` through its endpoint.
fn read_block(manager: &mut BlockStoreManager<SimulatedNorFlash>, handle: FvbHandle, lba: u64) -> Vec<u8> {
    let mut buffer = vec![0u8; BLOCK];
    let mut num_bytes = BLOCK;
    manager.endpoint(handle).unwrap().read(lba, 0, &mut num_bytes, &mut buffer).unwrap();
    assert_eq!(num_bytes, BLOCK);
    buffer
}

#[test]
fn block_size_reports_remaining_blocks() {
    init_logger();
    let (_flash, mut manager, publisher) = booted();
    let working = publisher.handle_of(Region::FtwWorking).unwrap();

    let endpoint = manager.endpoint(working).unwrap();
    assert_eq!(endpoint.get_block_size(0), Ok((BLOCK, (FTW_SIZE - VARIABLE_SIZE) / BLOCK)));
    assert_eq!(endpoint.get_block_size(3), Ok((BLOCK, 1)));
}

#[test]
fn variable_writes_reach_the_device() {
    init_logger();
    let (flash, mut manager, publisher) = booted();
    let variable = publisher.handle_of(Region::Variable).unwrap();
    let writes = flash.writes();

    let mut num_bytes = 6;
    assert_eq!(manager.endpoint(variable).unwrap().write(2, 0x40, &mut num_bytes, b"nvdata"), Ok(()));

    let offset = VARIABLE_OFFSET + 2 * BLOCK + 0x40;
    assert_eq!(flash.snapshot(offset..offset + 6), b"nvdata");
    assert_eq!(flash.writes(), writes + 1);
    assert_eq!(&read_block(&mut manager, variable, 2)[0x40..0x46], b"nvdata");
}

#[test]
fn torn_write_leaves_shadow_matching_the_device() {
    init_logger();
    let (flash, mut manager, publisher) = booted();
    let variable = publisher.handle_of(Region::Variable).unwrap();

    flash.arm(Fault::Write { programmed: 3 });
    let mut num_bytes = 8;
    assert_eq!(
        manager.endpoint(variable).unwrap().write(1, 0x10, &mut num_bytes, &[0u8; 8]),
        Err(EfiError::DeviceError)
    );

    let offset = VARIABLE_OFFSET + BLOCK;
    let device = flash.snapshot(offset..offset + BLOCK);
    assert_eq!(&device[0x10..0x18], &[0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(read_block(&mut manager, variable, 1), device);
}

#[test]
fn failed_write_keeps_previous_contents() {
    init_logger();
    let (flash, mut manager, publisher) = booted();
    let variable = publisher.handle_of(Region::Variable).unwrap();
    let before = read_block(&mut manager, variable, 0);

    flash.arm(Fault::Write { programmed: 0 });
    let mut num_bytes = 4;
    assert_eq!(
        manager.endpoint(variable).unwrap().write(0, 0x800, &mut num_bytes, b"lost"),
        Err(EfiError::DeviceError)
    );

    assert_eq!(read_block(&mut manager, variable, 0), before);
}

#[test]
fn clamped_spare_write_only_programs_the_block() {
    init_logger();
    let (flash, mut manager, publisher) = booted();
    let spare = publisher.handle_of(Region::FtwSpare).unwrap();

    let mut num_bytes = 8;
    assert_eq!(
        manager.endpoint(spare).unwrap().write(0, BLOCK - 4, &mut num_bytes, b"ABCDEFGH"),
        Err(EfiError::BadBufferSize)
    );
    assert_eq!(num_bytes, 4);
    assert_eq!(flash.snapshot(FTW_OFFSET + BLOCK - 4..FTW_OFFSET + BLOCK + 4), b"ABCD\xFF\xFF\xFF\xFF");

    let mut readback = [0u8; 8];
    let mut num_bytes = 8;
    assert_eq!(
        manager.endpoint(spare).unwrap().read(0, BLOCK - 4, &mut num_bytes, &mut readback),
        Err(EfiError::BadBufferSize)
    );
    assert_eq!(&readback[..num_bytes], b"ABCD");
}

#[test]
fn transfers_past_the_region_are_rejected() {
    init_logger();
    let (flash, mut manager, publisher) = booted();
    let spare = publisher.handle_of(Region::FtwSpare).unwrap();
    let writes = flash.writes();

    let mut num_bytes = 4;
    assert_eq!(
        manager.endpoint(spare).unwrap().write((VARIABLE_SIZE / BLOCK) as u64, 0, &mut num_bytes, b"nope"),
        Err(EfiError::BadBufferSize)
    );
    assert_eq!(num_bytes, 0);
    assert_eq!(flash.writes(), writes);
}

#[test]
fn erase_list_is_validated_before_anything_is_erased() {
    init_logger();
    let (flash, mut manager, publisher) = booted();
    let variable = publisher.handle_of(Region::Variable).unwrap();
    let before = flash.snapshot(VARIABLE_OFFSET..VARIABLE_OFFSET + VARIABLE_SIZE);
    let erases = flash.erases();

    let last = (VARIABLE_SIZE / BLOCK) as u64;
    let ranges = EraseRange::from_lba_list(&[0, 1, last - 1, 2, LBA_LIST_TERMINATOR]).unwrap();
    assert_eq!(manager.endpoint(variable).unwrap().erase_blocks(&ranges), Err(EfiError::InvalidParameter));

    assert_eq!(flash.erases(), erases);
    assert_eq!(flash.snapshot(VARIABLE_OFFSET..VARIABLE_OFFSET + VARIABLE_SIZE), before);
}

#[test]
fn erase_resets_blocks_in_shadow_and_device() {
    init_logger();
    let (flash, mut manager, publisher) = booted();
    let variable = publisher.handle_of(Region::Variable).unwrap();
    let mut num_bytes = 4;
    manager.endpoint(variable).unwrap().write(1, 0, &mut num_bytes, b"gone").unwrap();
    manager.endpoint(variable).unwrap().write(3, 0, &mut num_bytes, b"kept").unwrap();

    let ranges = EraseRange::from_lba_list(&[1, 2, LBA_LIST_TERMINATOR]).unwrap();
    assert_eq!(manager.endpoint(variable).unwrap().erase_blocks(&ranges), Ok(()));

    let erased = VARIABLE_OFFSET + BLOCK..VARIABLE_OFFSET + 3 * BLOCK;
    assert!(flash.snapshot(erased).iter().all(|&b| b == 0xFF));
    assert!(read_block(&mut manager, variable, 1).iter().all(|&b| b == 0xFF));
    assert_eq!(&read_block(&mut manager, variable, 3)[..4], b"kept");
}

#[test]
fn failed_erase_leaves_shadow_matching_the_device() {
    init_logger();
    let (flash, mut manager, publisher) = booted();
    let variable = publisher.handle_of(Region::Variable).unwrap();
    let mut num_bytes = 4;
    manager.endpoint(variable).unwrap().write(2, 0x20, &mut num_bytes, b"safe").unwrap();

    flash.arm(Fault::Erase);
    let ranges = [EraseRange::new(2, 1)];
    assert_eq!(manager.endpoint(variable).unwrap().erase_blocks(&ranges), Err(EfiError::DeviceError));

    let offset = VARIABLE_OFFSET + 2 * BLOCK;
    assert_eq!(read_block(&mut manager, variable, 2), flash.snapshot(offset..offset + BLOCK));
    assert_eq!(&read_block(&mut manager, variable, 2)[0x20..0x24], b"safe");
}
