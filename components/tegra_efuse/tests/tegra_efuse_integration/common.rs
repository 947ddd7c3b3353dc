//! Common Test Infrastructure for Tegra eFuse Integration Tests
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

pub mod fuse_macro;

pub use {fuse_macro::*, stall::*};

use std::sync::Once;

use tegra_efuse::{component::controller::FuseController, config::EFuseConfig};

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

pub type SimulatedController = FuseController<SimulatedFuseMacro, RecordingStall>;

/// A controller wired to `fuse_macro` with the default configuration.
pub fn controller(fuse_macro: &SimulatedFuseMacro, stall: &RecordingStall) -> SimulatedController {
    controller_with(fuse_macro, stall, EFuseConfig::default())
}

pub fn controller_with(fuse_macro: &SimulatedFuseMacro, stall: &RecordingStall, config: EFuseConfig) -> SimulatedController {
    FuseController::new(fuse_macro.clone(), stall.clone(), config)
}
