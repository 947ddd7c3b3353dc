//! Fuse Controller Register Map
//!
//! Offsets are relative to the fuse controller's MMIO base, except [`PMC_MISC_FUSE_CONTROL`] which is relative to the
//! PMC misc block.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use bitfield_struct::bitfield;

pub const FUSECTRL: u64 = 0x00;
pub const FUSEADDR: u64 = 0x04;
pub const FUSERDATA: u64 = 0x08;
pub const FUSEWDATA: u64 = 0x0C;
pub const FUSETIME_PGM2: u64 = 0x1C;
pub const PRIV2INTFC_START: u64 = 0x20;
pub const DISABLEREGPROGRAM: u64 = 0x2C;
pub const WRITE_ACCESS_SW: u64 = 0x30;

/// Set once fuse programming has been permanently locked out.
pub const DISABLEREGPROGRAM_VAL: u32 = 1 << 0;

/// Enables software writes to the fuse programming registers.
pub const WRITE_ACCESS_SW_CTRL: u32 = 1 << 0;

pub const PMC_MISC_FUSE_CONTROL: u64 = 0x10;

/// Fuse macro commands (`FUSECTRL.CMD`).
pub mod command {
    pub const IDLE: u8 = 0;
    pub const READ: u8 = 1;
    pub const WRITE: u8 = 2;
    pub const SENSE_CTRL: u8 = 3;
}

/// `FUSECTRL.STATE` once the fuse macro has finished a command.
pub const STATE_IDLE: u8 = 4;

/// Fuse programming clock in kHz.
pub const OSCILLATOR_FREQUENCY_KHZ: u32 = 38_400;

/// Programming strobe pulse width in microseconds.
pub const STROBE_PROGRAMMING_PULSE: u32 = 5;

/// Strobe width in programming clock cycles, as loaded into `FUSETIME_PGM2.TWIDTH_PGM`.
pub const STROBE_WIDTH: u32 = OSCILLATOR_FREQUENCY_KHZ * 1000 * STROBE_PROGRAMMING_PULSE / (1000 * 1000);

/// Settle time after issuing a fuse macro command. The hardware needs 400ns.
pub const COMMAND_SETTLE_US: u64 = 50;

/// Settle time around a power down control change.
pub const POWER_DOWN_SETTLE_US: u64 = 1;

/// Settle time after each PS18 latch step.
pub const PS18_SETTLE_US: u64 = 1000;

/// Time the programming voltage is held after the last burn.
pub const BURN_SETTLE_US: u64 = 2000;

/// FUSE_FUSECTRL_0
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct FuseCtrl {
    #[bits(2)]
    pub cmd: u8,
    #[bits(14)]
    __: u16,
    #[bits(5)]
    pub state: u8,
    #[bits(5)]
    __: u8,
    /// Fuse macro power down.
    pub pd_ctrl: bool,
    __: bool,
    pub disable_mirror: bool,
    __: bool,
    pub sense_done: bool,
    __: bool,
}

impl FuseCtrl {
    pub fn is_idle(&self) -> bool {
        self.state() == STATE_IDLE
    }
}

/// FUSE_FUSETIME_PGM2_0
#[bitfield(u32)]
pub struct FuseTimePgm2 {
    #[bits(16)]
    pub twidth_pgm: u16,
    #[bits(16)]
    __: u16,
}

/// FUSE_PRIV2INTFC_START_0
#[bitfield(u32)]
pub struct Priv2IntfcStart {
    pub start_data: bool,
    pub skip_records: bool,
    #[bits(30)]
    __: u32,
}

/// PMC_MISC_FUSE_CONTROL_0
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct PmcFuseControl {
    pub enable_redirection: bool,
    /// Redirection is locked; mirroring must be controlled through `FUSECTRL.DISABLE_MIRROR` instead.
    pub enable_redirection_sticky: bool,
    #[bits(6)]
    __: u8,
    pub ps18_latch_set: bool,
    pub ps18_latch_clear: bool,
    #[bits(22)]
    __: u32,
}
