//! Tegra FVB Integration Tests
//!
//! Runs the block store end to end against a simulated NOR flash device carrying a real GPT.
//!
//! ## Logging
//!
//! The `env_logger` crate can be used to enable logging during tests.
//!
//! To enable logging, set the `RUST_LOG` environment variable to the desired
//! log level (e.g., `debug`, `info`, `warn`, `error`) before running the tests.
//!
//! For example, to enable debug logging, run:
//!
//! ```sh
//! RUST_LOG=debug cargo make test -p tegra_fvb --test tegra_fvb_integration
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

// Common utilities available to all test modules
mod common;

// Test module groups
mod block_io;
