//! Fuse Controller
//!
//! Owns the register bank and stall provider for one fuse controller instance. It serves the MMIO style register
//! endpoint and programs ODM fuses through a [`FuseProgrammerSession`].
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use tegra_sdk::error::{EfiError, Result};

use crate::{
    component::{
        odm::{self, OdmFuse},
        session::FuseProgrammerSession,
    },
    config::EFuseConfig,
    service::{RegisterBank, Stall},
};

/// Size of a fuse register access.
const REGISTER_WIDTH: u64 = 4;

/// Fuse Controller
pub struct FuseController<R: RegisterBank, S: Stall> {
    registers: R,
    stall: S,
    config: EFuseConfig,
}

impl<R: RegisterBank, S: Stall> FuseController<R, S> {
    /// Creates a controller over `registers`, stalling through `stall`.
    pub fn new(registers: R, stall: S, config: EFuseConfig) -> Self {
        Self { registers, stall, config }
    }

    /// Returns the configuration the controller was created with.
    pub fn config(&self) -> &EFuseConfig {
        &self.config
    }

    /// Returns the register bank the controller drives.
    pub fn registers(&self) -> &R {
        &self.registers
    }

    /// Reads the fuse register at `offset` within the fuse MMIO region.
    pub fn read_register(&self, offset: u64) -> Result<u32> {
        match offset.checked_add(REGISTER_WIDTH) {
            Some(end) if end <= self.config.fuse_region_size => {
                Ok(self.registers.read32(self.config.fuse_region_base + offset))
            }
            _ => {
                log::error!(target: "efuse", "Fuse register offset {:#x} is out of range.", offset);
                Err(EfiError::InvalidParameter)
            }
        }
    }

    /// Fuse registers cannot be written directly; fuses are only changed through [`efuse_write`](Self::efuse_write).
    pub fn write_register(&mut self, offset: u64, value: u32) -> Result<()> {
        log::error!(target: "efuse", "Refusing raw write of {:#x} to fuse register {:#x}.", value, offset);
        Err(EfiError::DeviceError)
    }

    /// Starts a programming session against the fuse registers at `base_address`.
    pub fn session(&mut self, base_address: u64) -> FuseProgrammerSession<'_, R, S> {
        FuseProgrammerSession::new(
            &mut self.registers,
            &self.stall,
            base_address,
            self.config.pmc_misc_base,
            self.config.max_poll_attempts,
        )
    }

    fn odm_fuse(&self, register_offset: u32) -> Result<OdmFuse> {
        odm::find(self.config.odm_fuses, register_offset).copied().ok_or_else(|| {
            log::error!(target: "efuse", "Invalid fuse offset {:#x}.", register_offset);
            EfiError::InvalidParameter
        })
    }

    /// Burns the little endian 32-bit value in `buffer` into the ODM fuse at `register_offset`.
    ///
    /// Only bits that are not yet set are burned. Fails with:
    ///
    /// - `InvalidParameter` for an offset that is not a configured ODM word, a buffer that is not 4 bytes, or a value
    ///   that would need an already burned bit cleared.
    /// - `AccessDenied` when fuse programming is permanently disabled.
    /// - `NotReady` when the fuse macro is busy, or when the re-sensed fuse does not read back as `buffer`.
    /// - `Timeout` when the fuse macro stops responding.
    pub fn efuse_write(&mut self, base_address: u64, register_offset: u32, buffer: &[u8]) -> Result<()> {
        let odm = self.odm_fuse(register_offset)?;
        let value = <[u8; 4]>::try_from(buffer).map(u32::from_le_bytes).map_err(|_| {
            log::error!(target: "efuse", "Invalid fuse buffer of {} bytes.", buffer.len());
            EfiError::InvalidParameter
        })?;

        log::info!(target: "efuse", "Programming fuse {:#x} with {:#010x}.", register_offset, value);
        self.session(base_address).program(&odm, value)
    }
}
