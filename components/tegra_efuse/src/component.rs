//! eFuse Components
//!
//! [`controller`] is the entry point. It owns the hardware access and hands out a [`session`] for each burn. The
//! register layouts live in [`registers`] and the ODM fuse geometry in [`odm`].
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
pub mod controller;
pub mod odm;
pub mod registers;
pub mod session;
