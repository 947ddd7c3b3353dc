//! eFuse Services
//!
//! Hardware access the fuse programmer consumes.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
pub mod register_bank;
pub mod stall;

pub use register_bank::RegisterBank;
pub use stall::Stall;
