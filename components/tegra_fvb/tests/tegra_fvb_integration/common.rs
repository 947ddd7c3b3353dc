//! Common Test Infrastructure for Tegra FVB Integration Tests
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

pub mod gpt_image;
pub mod nor_flash;

pub use {gpt_image::*, nor_flash::*, publisher::*};

use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        // Default to no logging unless RUST_LOG environment variable is set
        let mut builder = env_logger::Builder::from_default_env();

        if std::env::var("RUST_LOG").is_err() {
            builder.filter_level(log::LevelFilter::Off);
        }

        builder.is_test(true).init();
    });
}

/// Size of the simulated device.
pub const DENSITY: usize = 0x20_0000;
/// Erase block size of the simulated device.
pub const BLOCK_SIZE: u32 = 0x1_0000;

pub const VARIABLE_OFFSET: usize = 0x10_0000;
pub const VARIABLE_SIZE: usize = 0x4_0000;
pub const FTW_OFFSET: usize = 0x14_0000;
pub const FTW_SIZE: usize = 0x8_0000;
pub const FTW_WORKING_OFFSET: usize = FTW_OFFSET + VARIABLE_SIZE;

/// GPT partitions matching the constants above, named as the default configuration expects.
pub fn default_partitions() -> [GptPartition<'static>; 3] {
    [
        GptPartition { name: "mb1", starting_lba: 0x80, blocks: 0x400 },
        GptPartition { name: "uefi_variables", starting_lba: (VARIABLE_OFFSET / 512) as u64, blocks: (VARIABLE_SIZE / 512) as u64 },
        GptPartition { name: "uefi_ftw", starting_lba: (FTW_OFFSET / 512) as u64, blocks: (FTW_SIZE / 512) as u64 },
    ]
}

/// An erased device carrying the default GPT.
pub fn blank_flash() -> SimulatedNorFlash {
    let flash = SimulatedNorFlash::new(DENSITY, BLOCK_SIZE);
    write_gpt(&flash, DENSITY, &default_partitions());
    flash
}
