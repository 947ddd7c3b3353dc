//! eFuse Configuration
//!
//! Platform values the fuse programmer needs: where the fuse controller and PMC live, and which ODM words it is
//! allowed to program. On device tree platforms the fuse region comes from the `nvidia,tegra194-efuse` node.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::component::odm::{OdmFuse, T194_ODM_FUSES};

/// Default fuse controller MMIO base on T194.
pub const DEFAULT_FUSE_REGION_BASE: u64 = 0x0382_0000;

/// Size of the fuse controller MMIO region.
pub const DEFAULT_FUSE_REGION_SIZE: u64 = 0x1_0000;

/// PMC misc block base on T194.
pub const DEFAULT_PMC_MISC_BASE: u64 = 0x0C36_0000;

/// Register reads spent waiting on the fuse macro before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 1_000_000;

/// eFuse Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EFuseConfig {
    /// Fuse controller MMIO base, used by the register endpoint.
    pub fuse_region_base: u64,
    /// Fuse controller MMIO size, used by the register endpoint.
    pub fuse_region_size: u64,
    /// PMC misc block base, home of the fuse control register carrying the PS18 latch and mirroring bits.
    pub pmc_misc_base: u64,
    /// Bound on every hardware poll. Exhausting it fails the operation with `Timeout`.
    pub max_poll_attempts: u32,
    /// ODM words that may be programmed.
    pub odm_fuses: &'static [OdmFuse],
}

impl Default for EFuseConfig {
    fn default() -> Self {
        EFuseConfig {
            fuse_region_base: DEFAULT_FUSE_REGION_BASE,
            fuse_region_size: DEFAULT_FUSE_REGION_SIZE,
            pmc_misc_base: DEFAULT_PMC_MISC_BASE,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            odm_fuses: &T194_ODM_FUSES,
        }
    }
}
