// This file is part of drm_hal, a hardware abstraction layer for FPGA-embedded DRM controller IP cores.
//
// Copyright 2026 The drm_hal Authors
//
// SPDX-License-Identifier: GPL-3.0-only
//
// drm_hal is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// drm_hal is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! drm_hal - register level access to FPGA-embedded DRM controller IP cores.
//!
//! The DRM controller guards licensed IP cores inside an FPGA design. It is reached through a
//! narrow bus of named 32 bit words, supplied by the caller as a [`WordTransport`]. This crate
//! turns that bus into typed operations:
//! - device DNA and IP inventory (VLNV) extraction
//! - license file activation
//! - metering file extraction, at the end of a session or mid session
//! - license timer loading and sampling
//!
//! # Architecture
//!
//! Data flows top down and outcomes flow back up:
//!
//! ```text
//! DrmController -> DrmStrategy (Generation) -> RegisterBus / PageScope -> WordTransport
//! ```
//!
//! Fourteen historical hardware generations differ in register offsets, bit positions, command
//! codes, error lane placement and file geometry. Those differences are data, collected in one
//! [`Layout`](strategy::Layout) per family. The generation is picked at run time by
//! [`resolver`], which lets every known layout probe the version register.
//!
//! # Features
//!
//! - `simulation` (default) - [`simulation::SimulatedDrmController`], a register accurate
//!   simulated controller usable as a transport when no hardware is attached
//!
//! # Logging
//!
//! Diagnostics go through the `log` facade. Set up any logger, e.g. `env_logger`, and use
//! `RUST_LOG=trace` to see every bus access.

pub mod bitfield;
pub mod bus;
pub mod codec;
pub mod config;
pub mod controller;
pub mod error;
pub mod polling;
pub mod resolver;
#[cfg(feature = "simulation")]
pub mod simulation;
pub mod strategy;
pub mod transport;
pub mod version;
pub mod wide_value;

pub use config::ControllerConfig;
pub use controller::DrmController;
pub use error::{DrmError, Functionality};
pub use strategy::{DrmStrategy, Generation, MeteringTrigger};
pub use transport::{TransportStatus, WordTransport};
pub use version::Version;
pub use wide_value::WideValue;
