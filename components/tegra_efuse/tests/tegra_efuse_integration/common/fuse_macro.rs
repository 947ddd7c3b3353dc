//! Simulated Fuse Macro
//!
//! A register level model of the fuse controller and the PMC fuse control register. Burns only land when the
//! controller has been prepared the way the hardware requires:
//!
//! - software write access enabled and the strobe width loaded,
//! - mirroring disabled (through `FUSECTRL` when redirection is sticky, through the PMC otherwise),
//! - the macro powered up and the PS18 programming voltage latched.
//!
//! Sensed values (the ODM registers) only change when the fuse to register interface is restarted, as on hardware.
//! Clones share the same state, so a test can inspect the macro after handing a clone to the controller.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use tegra_efuse::{
    component::{
        odm::{FusePair, T194_ODM_FUSES},
        registers::{
            self, command, FuseCtrl, FuseTimePgm2, PmcFuseControl, Priv2IntfcStart, STATE_IDLE, STROBE_WIDTH,
        },
    },
    config::{DEFAULT_FUSE_REGION_BASE, DEFAULT_PMC_MISC_BASE},
    service::RegisterBank,
};

/// Physical fuse dwords modelled.
pub const FUSE_WORDS: usize = 0x80;

const STATE_BUSY: u8 = 1;

#[derive(Debug)]
struct MacroState {
    registers: HashMap<u64, u32>,
    fusectrl: FuseCtrl,
    pmc: PmcFuseControl,
    fuses: [u32; FUSE_WORDS],
    sensed: HashMap<u32, u32>,
    read_data: u32,
    /// Polls of `FUSECTRL` that report busy after each command.
    latency: u32,
    busy_polls: u32,
    sense_polls: u32,
    stuck: bool,
    ignore_burns: bool,
    burns: Vec<(u32, u32)>,
    writes: Vec<(u64, u32)>,
}

impl MacroState {
    fn combine(&self, pair: &FusePair) -> u32 {
        (self.fuses[pair.low as usize] >> 26) | ((self.fuses[pair.high as usize] & 0x03FF_FFFF) << 6)
    }

    fn sense(&mut self) {
        for fuse in &T194_ODM_FUSES {
            let value = self.combine(&fuse.primary) | self.combine(&fuse.redundant);
            self.sensed.insert(fuse.register_offset, value);
        }
    }

    fn register(&self, offset: u64) -> u32 {
        self.registers.get(&offset).copied().unwrap_or(0)
    }

    fn ready_to_program(&self) -> bool {
        let mirroring_off = if self.pmc.enable_redirection_sticky() {
            self.fusectrl.disable_mirror()
        } else {
            !self.pmc.enable_redirection()
        };
        let strobe = FuseTimePgm2::from_bits(self.register(registers::FUSETIME_PGM2)).twidth_pgm() as u32;

        !self.ignore_burns
            && self.register(registers::WRITE_ACCESS_SW) & registers::WRITE_ACCESS_SW_CTRL != 0
            && strobe == STROBE_WIDTH
            && mirroring_off
            && !self.fusectrl.pd_ctrl()
            && self.pmc.ps18_latch_set()
            && !self.pmc.ps18_latch_clear()
    }

    fn run_command(&mut self, cmd: u8) {
        let address = self.register(registers::FUSEADDR) as usize;
        match cmd {
            command::WRITE => {
                let word = self.register(registers::FUSEWDATA);
                if self.ready_to_program() {
                    self.fuses[address] |= word;
                    self.burns.push((address as u32, word));
                }
            }
            command::READ => self.read_data = self.fuses[address],
            _ => {}
        }
        if cmd != command::IDLE {
            self.busy_polls = self.latency;
        }
    }

    fn read_fusectrl(&mut self) -> u32 {
        let busy = self.stuck || self.busy_polls > 0;
        self.busy_polls = self.busy_polls.saturating_sub(1);
        let sense_done = self.sense_polls == 0;
        self.sense_polls = self.sense_polls.saturating_sub(1);

        self.fusectrl
            .with_state(if busy { STATE_BUSY } else { STATE_IDLE })
            .with_sense_done(sense_done)
            .into_bits()
    }
}

/// Simulated fuse controller at the default T194 addresses.
#[derive(Debug, Clone)]
pub struct SimulatedFuseMacro {
    fuse_base: u64,
    pmc_fuse_control: u64,
    state: Rc<RefCell<MacroState>>,
}

impl Default for SimulatedFuseMacro {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedFuseMacro {
    /// A macro with every fuse blank, powered down and idle.
    pub fn new() -> Self {
        let mut state = MacroState {
            registers: HashMap::new(),
            fusectrl: FuseCtrl::new().with_pd_ctrl(true),
            pmc: PmcFuseControl::new().with_enable_redirection(true).with_ps18_latch_clear(true),
            fuses: [0; FUSE_WORDS],
            sensed: HashMap::new(),
            read_data: 0,
            latency: 0,
            busy_polls: 0,
            sense_polls: 0,
            stuck: false,
            ignore_burns: false,
            burns: Vec::new(),
            writes: Vec::new(),
        };
        state.sense();
        Self {
            fuse_base: DEFAULT_FUSE_REGION_BASE,
            pmc_fuse_control: DEFAULT_PMC_MISC_BASE + registers::PMC_MISC_FUSE_CONTROL,
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Burns `word` into `address` directly, as if done by an earlier boot.
    pub fn preburn(&self, address: u32, word: u32) {
        let mut state = self.state.borrow_mut();
        state.fuses[address as usize] |= word;
        state.sense();
    }

    /// Sets the permanent programming lockout.
    pub fn lock_out(&self) {
        self.state.borrow_mut().registers.insert(registers::DISABLEREGPROGRAM, registers::DISABLEREGPROGRAM_VAL);
    }

    /// Locks redirection so mirroring has to be controlled through `FUSECTRL`.
    pub fn make_redirection_sticky(&self) {
        let mut state = self.state.borrow_mut();
        state.pmc = state.pmc.with_enable_redirection_sticky(true);
    }

    /// Every command keeps the macro busy for `polls` reads of `FUSECTRL`.
    pub fn set_latency(&self, polls: u32) {
        self.state.borrow_mut().latency = polls;
    }

    /// The macro never reports idle again.
    pub fn hang(&self) {
        self.state.borrow_mut().stuck = true;
    }

    /// Commands complete but nothing is programmed.
    pub fn ignore_burns(&self) {
        self.state.borrow_mut().ignore_burns = true;
    }

    pub fn fuse(&self, address: u32) -> u32 {
        self.state.borrow().fuses[address as usize]
    }

    /// `(fuse address, word)` of every burn that landed, in order.
    pub fn burns(&self) -> Vec<(u32, u32)> {
        self.state.borrow().burns.clone()
    }

    /// `(absolute address, value)` of every register write, in order.
    pub fn writes(&self) -> Vec<(u64, u32)> {
        self.state.borrow().writes.clone()
    }

    pub fn fusectrl(&self) -> FuseCtrl {
        self.state.borrow().fusectrl
    }

    pub fn pmc_fuse_control(&self) -> PmcFuseControl {
        self.state.borrow().pmc
    }

    pub fn register(&self, offset: u64) -> u32 {
        self.state.borrow().register(offset)
    }

    /// True while the programming voltage is applied.
    pub fn programming_voltage(&self) -> bool {
        let pmc = self.pmc_fuse_control();
        pmc.ps18_latch_set() && !pmc.ps18_latch_clear()
    }
}

impl RegisterBank for SimulatedFuseMacro {
    fn read32(&self, address: u64) -> u32 {
        let mut state = self.state.borrow_mut();
        if address == self.pmc_fuse_control {
            return state.pmc.into_bits();
        }

        let offset = address - self.fuse_base;
        match offset {
            registers::FUSECTRL => state.read_fusectrl(),
            registers::FUSERDATA => state.read_data,
            _ => match state.sensed.get(&(offset as u32)) {
                Some(value) => *value,
                None => state.register(offset),
            },
        }
    }

    fn write32(&mut self, address: u64, value: u32) {
        let mut state = self.state.borrow_mut();
        state.writes.push((address, value));
        if address == self.pmc_fuse_control {
            state.pmc = PmcFuseControl::from_bits(value);
            return;
        }

        let offset = address - self.fuse_base;
        match offset {
            registers::FUSECTRL => {
                let written = FuseCtrl::from_bits(value);
                state.fusectrl = written.with_cmd(command::IDLE).with_state(0).with_sense_done(false);
                state.run_command(written.cmd());
            }
            registers::PRIV2INTFC_START => {
                if Priv2IntfcStart::from_bits(value).start_data() {
                    state.sense();
                    state.sense_polls = state.latency;
                }
                let settled = Priv2IntfcStart::from_bits(value).with_start_data(false).with_skip_records(false);
                state.registers.insert(offset, settled.into_bits());
            }
            _ => {
                state.registers.insert(offset, value);
            }
        }
    }
}
