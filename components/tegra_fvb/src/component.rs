//! Firmware Volume Block Components
//!
//! [`block_store`] owns the region table and implements the block endpoint operations. [`volume`] holds the on-flash
//! header validation and formatting routines run at boot, and [`gpt_locator`] provides the default GPT based
//! [`PartitionLocator`](crate::service::PartitionLocator).
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
pub mod block_store;
pub mod boot;
pub mod gpt_locator;
pub mod volume;
