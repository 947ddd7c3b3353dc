//! Simulated NOR Flash
//!
//! A RAM backed [`StorageDevice`] with NOR programming semantics: a write can only clear bits, and an erase sets
//! every byte of the affected blocks back to `0xFF`. Clones share the same storage, so a test can keep a handle to
//! inspect the device (or arm a fault) after moving another handle into the block store.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use std::{cell::RefCell, ops::Range, rc::Rc};

use tegra_fvb::service::{FlashAttributes, StorageDevice};
use tegra_sdk::error::{EfiError, Result};

/// A one-shot failure the next matching operation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The next write programs its first `programmed` bytes, then fails.
    Write { programmed: usize },
    /// The next erase fails without touching the array.
    Erase,
}

#[derive(Debug)]
struct FlashState {
    data: Vec<u8>,
    fault: Option<Fault>,
    writes: usize,
    erases: usize,
}

#[derive(Debug, Clone)]
pub struct SimulatedNorFlash {
    block_size: u32,
    state: Rc<RefCell<FlashState>>,
}

impl SimulatedNorFlash {
    /// Creates a fully erased device of `density` bytes.
    pub fn new(density: usize, block_size: u32) -> Self {
        let state = FlashState { data: vec![0xFF; density], fault: None, writes: 0, erases: 0 };
        Self { block_size, state: Rc::new(RefCell::new(state)) }
    }

    pub fn arm(&self, fault: Fault) {
        self.state.borrow_mut().fault = Some(fault);
    }

    /// Copies `range` out of the array.
    pub fn snapshot(&self, range: Range<usize>) -> Vec<u8> {
        self.state.borrow().data[range].to_vec()
    }

    /// Overwrites the array directly, bypassing NOR semantics and the operation counters.
    pub fn write_raw(&self, offset: usize, bytes: &[u8]) {
        self.state.borrow_mut().data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    pub fn erases(&self) -> usize {
        self.state.borrow().erases
    }

    fn span(&self, offset: u64, length: usize) -> Result<Range<usize>> {
        let start = usize::try_from(offset).map_err(|_| EfiError::InvalidParameter)?;
        let end = start.checked_add(length).ok_or(EfiError::InvalidParameter)?;
        if end > self.state.borrow().data.len() {
            return Err(EfiError::InvalidParameter);
        }
        Ok(start..end)
    }
}

impl StorageDevice for SimulatedNorFlash {
    fn attributes(&self) -> Result<FlashAttributes> {
        Ok(FlashAttributes { block_size: self.block_size, memory_density: self.state.borrow().data.len() as u64 })
    }

    fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<()> {
        let span = self.span(offset, buffer.len())?;
        buffer.copy_from_slice(&self.state.borrow().data[span]);
        Ok(())
    }

    fn write(&mut self, offset: u64, buffer: &[u8]) -> Result<()> {
        let span = self.span(offset, buffer.len())?;
        let mut state = self.state.borrow_mut();
        state.writes += 1;

        let torn = match state.fault {
            Some(Fault::Write { programmed }) => Some(programmed.min(buffer.len())),
            _ => None,
        };
        let (programmed, result) = match torn {
            Some(programmed) => {
                state.fault = None;
                (programmed, Err(EfiError::DeviceError))
            }
            None => (buffer.len(), Ok(())),
        };

        for (cell, byte) in state.data[span].iter_mut().zip(&buffer[..programmed]) {
            *cell &= *byte;
        }
        result
    }

    fn erase(&mut self, lba: u64, num_blocks: u64) -> Result<()> {
        let block_size = self.block_size as u64;
        let length = num_blocks.checked_mul(block_size).ok_or(EfiError::InvalidParameter)?;
        let span = self.span(lba.checked_mul(block_size).ok_or(EfiError::InvalidParameter)?, length as usize)?;
        let mut state = self.state.borrow_mut();
        state.erases += 1;

        if state.fault == Some(Fault::Erase) {
            state.fault = None;
            return Err(EfiError::DeviceError);
        }

        state.data[span].fill(0xFF);
        Ok(())
    }
}
