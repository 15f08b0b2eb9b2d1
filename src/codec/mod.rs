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

//! Structured views of the banked files.
//!
//! Codecs only translate between word sequences and typed values. They never touch the
//! transport, so the same code serves the strategy, which reads real hardware, and the
//! simulation, which has to produce the files in the first place.

pub mod license;
pub mod metering;
pub mod vlnv;

pub use license::{LicenseFile, LicenseHeader, LicenseIpBlock};
pub use metering::{MeteringFile, MeteringHeader};
pub use vlnv::Vlnv;
