//! Fuse Programming Session
//!
//! The burn protocol of the fuse controller. Every step is a register write followed by a settle delay and, where
//! the fuse macro runs a command, a poll of `FUSECTRL.STATE` until it reports idle again:
//!
//! 1. Pre-process: check the permanent lockout, enable software writes, load the strobe width, take the macro out of
//!    mirroring and power down, and raise the programming voltage (PS18).
//! 2. Burn: load the fuse address and data, issue `WRITE`, then `READ` to latch the result.
//! 3. Post-process: drop the programming voltage, re-sense the fuses and restart the fuse to register interface so
//!    the new values are visible without a reset.
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
        odm::OdmFuse,
        registers::{
            self, command, FuseCtrl, FuseTimePgm2, PmcFuseControl, Priv2IntfcStart, BURN_SETTLE_US, COMMAND_SETTLE_US,
            POWER_DOWN_SETTLE_US, PS18_SETTLE_US, STROBE_WIDTH,
        },
    },
    service::{RegisterBank, Stall},
};

/// Exclusive access to the fuse controller for one programming operation.
///
/// Created by [`FuseController::session`](super::controller::FuseController::session). Holds the fuse register base
/// and the pending fuse word for the duration of the burn.
pub struct FuseProgrammerSession<'a, R: RegisterBank + ?Sized, S: Stall + ?Sized> {
    registers: &'a mut R,
    stall: &'a S,
    base: u64,
    pmc_fuse_control: u64,
    max_poll_attempts: u32,
    fuse_word: u32,
}

impl<'a, R: RegisterBank + ?Sized, S: Stall + ?Sized> FuseProgrammerSession<'a, R, S> {
    pub(crate) fn new(registers: &'a mut R, stall: &'a S, base: u64, pmc_misc_base: u64, max_poll_attempts: u32) -> Self {
        Self {
            registers,
            stall,
            base,
            pmc_fuse_control: pmc_misc_base + registers::PMC_MISC_FUSE_CONTROL,
            max_poll_attempts,
            fuse_word: 0,
        }
    }

    /// Fuse controller register base this session programs through.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// The word most recently handed to [`burn_word`](Self::burn_word).
    pub fn fuse_word(&self) -> u32 {
        self.fuse_word
    }

    fn read(&self, offset: u64) -> u32 {
        self.registers.read32(self.base + offset)
    }

    fn write(&mut self, offset: u64, value: u32) {
        log::trace!(target: "efuse", "FUSE[{:#x}] <- {:#010x}", offset, value);
        self.registers.write32(self.base + offset, value);
    }

    fn fuse_ctrl(&self) -> FuseCtrl {
        FuseCtrl::from_bits(self.read(registers::FUSECTRL))
    }

    fn set_fuse_ctrl(&mut self, ctrl: FuseCtrl) {
        self.write(registers::FUSECTRL, ctrl.into_bits());
    }

    fn pmc_fuse_control(&self) -> PmcFuseControl {
        PmcFuseControl::from_bits(self.registers.read32(self.pmc_fuse_control))
    }

    fn set_pmc_fuse_control(&mut self, control: PmcFuseControl) {
        log::trace!(target: "efuse", "PMC_MISC_FUSE_CONTROL <- {:#010x}", control.into_bits());
        self.registers.write32(self.pmc_fuse_control, control.into_bits());
    }

    /// Polls `FUSECTRL` until `done` accepts it.
    fn wait_until(&self, condition: &str, done: impl Fn(FuseCtrl) -> bool) -> Result<()> {
        for _ in 0..self.max_poll_attempts {
            if done(self.fuse_ctrl()) {
                return Ok(());
            }
        }
        log::error!(target: "efuse", "Timed out waiting for {}.", condition);
        Err(EfiError::Timeout)
    }

    fn wait_idle(&self) -> Result<()> {
        self.wait_until("fuse macro idle", |ctrl| ctrl.is_idle())
    }

    fn issue_command(&mut self, cmd: u8) -> Result<()> {
        let ctrl = self.fuse_ctrl().with_cmd(cmd);
        self.set_fuse_ctrl(ctrl);
        self.stall.stall(COMMAND_SETTLE_US);
        self.wait_idle()
    }

    fn write_disabled(&self) -> bool {
        self.read(registers::DISABLEREGPROGRAM) & registers::DISABLEREGPROGRAM_VAL != 0
    }

    fn program_strobe(&mut self) {
        let pgm2 = FuseTimePgm2::from_bits(self.read(registers::FUSETIME_PGM2)).with_twidth_pgm(STROBE_WIDTH as u16);
        self.write(registers::FUSETIME_PGM2, pgm2.into_bits());
    }

    /// Raises the programming voltage.
    pub fn ps18_latch_set(&mut self) {
        let control = self.pmc_fuse_control().with_ps18_latch_clear(false);
        self.set_pmc_fuse_control(control);
        self.stall.stall(PS18_SETTLE_US);

        self.set_pmc_fuse_control(control.with_ps18_latch_set(true));
        self.stall.stall(PS18_SETTLE_US);
    }

    /// Gates the programming voltage.
    pub fn ps18_latch_clear(&mut self) {
        let control = self.pmc_fuse_control().with_ps18_latch_set(false);
        self.set_pmc_fuse_control(control);
        self.stall.stall(PS18_SETTLE_US);

        self.set_pmc_fuse_control(control.with_ps18_latch_clear(true));
        self.stall.stall(PS18_SETTLE_US);
    }

    fn program_mirroring(&mut self, enable: bool) -> Result<()> {
        let control = self.pmc_fuse_control();
        if control.enable_redirection_sticky() {
            let ctrl = self.fuse_ctrl().with_disable_mirror(!enable);
            self.set_fuse_ctrl(ctrl);
            self.wait_idle()
        } else {
            self.set_pmc_fuse_control(control.with_enable_redirection(enable));
            Ok(())
        }
    }

    fn assert_power_down(&mut self, assert: bool) {
        let ctrl = self.fuse_ctrl();
        if ctrl.pd_ctrl() == assert {
            return;
        }

        if assert {
            self.set_fuse_ctrl(ctrl.with_pd_ctrl(true));
            // Flush the posted write before settling.
            let _ = self.fuse_ctrl();
            self.stall.stall(POWER_DOWN_SETTLE_US);
        } else {
            self.stall.stall(POWER_DOWN_SETTLE_US);
            self.set_fuse_ctrl(ctrl.with_pd_ctrl(false));
            let _ = self.fuse_ctrl();
        }
    }

    fn burn_setup(&mut self, enable: bool) -> Result<()> {
        if enable {
            self.program_mirroring(false)?;
            self.assert_power_down(false);
            self.ps18_latch_set();
        } else {
            self.ps18_latch_clear();
            self.program_mirroring(true)?;
            self.assert_power_down(true);
        }
        Ok(())
    }

    fn pre_process(&mut self) -> Result<()> {
        if self.write_disabled() {
            log::error!(target: "efuse", "Fuse write is permanently disabled.");
            return Err(EfiError::AccessDenied);
        }

        let access = self.read(registers::WRITE_ACCESS_SW) | registers::WRITE_ACCESS_SW_CTRL;
        self.write(registers::WRITE_ACCESS_SW, access);

        self.program_strobe();
        self.burn_setup(true)?;

        if !self.fuse_ctrl().is_idle() {
            log::error!(target: "efuse", "Fuse wrapper state machine is not idle.");
            if let Err(err) = self.burn_setup(false) {
                log::error!(target: "efuse", "Failed to undo fuse burn setup: {:?}", err);
            }
            return Err(EfiError::NotReady);
        }
        Ok(())
    }

    fn initiate_burn(&mut self) -> Result<()> {
        self.issue_command(command::WRITE)?;
        // A second idle check before the read back.
        self.wait_idle()?;

        self.issue_command(command::READ)?;
        let readback = self.read(registers::FUSERDATA);
        log::trace!(target: "efuse", "Fuse read back {:#010x}.", readback);
        Ok(())
    }

    fn post_process(&mut self) -> Result<()> {
        self.burn_setup(false)?;

        self.issue_command(command::SENSE_CTRL)?;

        let start = Priv2IntfcStart::from_bits(self.read(registers::PRIV2INTFC_START))
            .with_start_data(true)
            .with_skip_records(true);
        self.write(registers::PRIV2INTFC_START, start.into_bits());
        self.stall.stall(COMMAND_SETTLE_US);

        self.wait_until("fuse sense done", |ctrl| ctrl.sense_done())?;
        self.wait_idle()
    }

    /// Burns `word` into the physical fuse dword at `fuse_address`.
    ///
    /// A zero word has nothing to burn and leaves the hardware untouched.
    pub fn burn_word(&mut self, fuse_address: u32, word: u32) -> Result<()> {
        self.fuse_word = word;
        if word == 0 {
            log::debug!(target: "efuse", "No need to burn fuse {:#x}.", fuse_address);
            return Ok(());
        }

        self.pre_process().inspect_err(|err| {
            log::error!(target: "efuse", "Fuse pre process failed: {:?}", err);
        })?;

        log::debug!(target: "efuse", "Burning {:#010x} into fuse {:#x}.", word, fuse_address);
        self.write(registers::FUSEADDR, fuse_address);
        self.write(registers::FUSEWDATA, word);

        self.initiate_burn()?;
        self.post_process()
    }

    /// Burns `value` into both copies of `odm`, stopping at the first failure.
    ///
    /// Dwords burned before a failure stay burned.
    pub fn burn_logical_word(&mut self, odm: &OdmFuse, value: u32) -> Result<()> {
        for (fuse_address, word) in odm.primary.burns(value).into_iter().chain(odm.redundant.burns(value)) {
            self.burn_word(fuse_address, word).inspect_err(|err| {
                log::error!(target: "efuse", "Burning fuse {:#x} failed: {:?}", fuse_address, err);
            })?;
        }
        Ok(())
    }

    /// Reads the sensed value of a fuse register.
    pub fn read_fuse(&self, register_offset: u32) -> u32 {
        self.read(register_offset as u64)
    }

    /// Burns the bits of `value` that are not yet set in `odm`.
    ///
    /// Fails with `InvalidParameter` when the difference covers a bit that is already set.
    pub fn set_macro_and_burn(&mut self, odm: &OdmFuse, value: u32) -> Result<()> {
        let current = self.read_fuse(odm.register_offset);
        let diff = value ^ current;
        if diff & current != 0 {
            log::error!(target: "efuse", "Invalid fuse data {:#010x} for fuse holding {:#010x}.", value, current);
            return Err(EfiError::InvalidParameter);
        }
        self.burn_logical_word(odm, diff)
    }

    /// Checks that `odm` now reads back as `expected`.
    pub fn confirm_burn(&self, register_offset: u32, expected: u32) -> Result<()> {
        let value = self.read_fuse(register_offset);
        if value != expected {
            log::error!(target: "efuse", "Fuse read and write mismatch: {:#010x} != {:#010x}.", value, expected);
            return Err(EfiError::NotReady);
        }
        log::info!(target: "efuse", "Fuse {:#x} burnt successfully.", register_offset);
        Ok(())
    }

    /// Programs `value` into `odm` with the programming voltage held for the whole operation.
    ///
    /// The voltage is dropped again on every path, including failures.
    pub fn program(&mut self, odm: &OdmFuse, value: u32) -> Result<()> {
        self.ps18_latch_set();

        if let Err(err) = self.set_macro_and_burn(odm, value) {
            log::error!(target: "efuse", "Write fuse failed: {:?}", err);
            self.ps18_latch_clear();
            return Err(err);
        }

        self.stall.stall(BURN_SETTLE_US);
        self.ps18_latch_clear();

        self.confirm_burn(odm.register_offset, value).inspect_err(|err| {
            log::error!(target: "efuse", "Write confirm failed: {:?}", err);
        })
    }
}
