//! Tegra ODM eFuse Programmer
//!
//! Burns the four ODM reserved fuse words (ODM8 through ODM11) through the fuse controller's programming interface.
//! Each logical 32-bit word is spread over two physical fuse dwords, and every word has a redundant copy that is
//! burned alongside the primary one.
//!
//! Programming is irreversible. [`FuseController::efuse_write`](component::controller::FuseController::efuse_write)
//! only ever adds bits: it reads the current fuse value, refuses requests that would need a set bit cleared, and
//! burns the difference. After the burn the fuses are re-sensed and compared to the requested value.
//!
//! ## Hardware Access
//!
//! All register traffic goes through a [`RegisterBank`](service::RegisterBank) and every settle delay through a
//! [`Stall`](service::Stall), so the controller can be driven by a simulated fuse macro in tests. Hardware polls are
//! bounded by [`EFuseConfig::max_poll_attempts`](config::EFuseConfig) and report
//! [`EfiError::Timeout`](tegra_sdk::error::EfiError) when exhausted.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tegra_efuse::{component::controller::FuseController, config::EFuseConfig};
//!
//! let config = EFuseConfig::default();
//! let base = config.fuse_region_base;
//! let mut controller = FuseController::new(mmio, timer, config);
//! controller.efuse_write(base, tegra_efuse::component::odm::RESERVED_ODM8, &0x1234_0000u32.to_le_bytes())?;
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
#![cfg_attr(all(not(feature = "std"), not(test), not(feature = "mockall")), no_std)]

pub mod component;
pub mod config;
pub mod service;
