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

//! Pick the strategy matching the attached hardware.
//!
//! The hardware version can only be read once the register layout is known, and the layout
//! depends on the version. Resolution therefore lets every known generation probe the hardware
//! with its own layout:
//!
//! 1. Every candidate reads the version register through its own addressing. Candidates whose
//!    read fails are dropped.
//! 2. Candidates whose read back `major.minor` differs from their own label are dropped.
//! 3. Of the survivors the one with the highest labeled bugfix wins.
//!
//! The winner is picked by its label, not by the bugfix number the hardware reports. Members of
//! one `major.minor` family share their layout, so any survivor drives the hardware correctly.

use crate::bus::RegisterBus;
use crate::error::DrmError;
use crate::strategy::{DrmStrategy, Generation};
use crate::transport::WordTransport;
use crate::version::Version;
use log::{info, trace, warn};
use std::collections::BTreeMap;

/// The outcome of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub strategy: Generation,
    /// The version the hardware itself reported.
    pub hardware_version: Version,
}

/// Resolve among every known generation.
pub fn resolve<T: WordTransport>(bus: &mut RegisterBus<T>) -> Result<Resolution, DrmError> {
    resolve_among(bus, &Generation::ALL)
}

/// Resolve among `candidates` only.
///
/// # Arguments
///
/// * `bus` - The bus the controller sits on
/// * `candidates` - Generations allowed to claim the hardware
///
/// # Returns: `Result<Resolution, DrmError>`
/// * `Ok(Resolution)` - The selected generation and the version the hardware reported
/// * `Err(DrmError::VersionCheck)` - No candidate agreed with what it read back
pub fn resolve_among<T: WordTransport>(
    bus: &mut RegisterBus<T>,
    candidates: &[Generation],
) -> Result<Resolution, DrmError> {
    let candidates: BTreeMap<Version, Generation> =
        candidates.iter().map(|g| (g.label(), *g)).collect();
    let mut observed = Vec::new();
    let mut survivors = BTreeMap::new();
    for (label, candidate) in candidates {
        let read_back = match candidate.read_version(bus) {
            Ok(version) => version,
            Err(e) => {
                trace!("candidate {label} dropped, version read failed: {e}");
                continue;
            }
        };
        observed.push(format!("{read_back} (read by {label})"));
        if !read_back.same_family(&label) {
            trace!("candidate {label} dropped, it read back {read_back}");
            continue;
        }
        trace!("candidate {label} survives with read back {read_back}");
        survivors.insert(label, (candidate, read_back));
    }

    let families: Vec<(u8, u8)> = survivors.keys().map(|v| (v.major, v.minor)).collect();
    if families.windows(2).any(|w| w[0] != w[1]) {
        warn!("layouts of several families agree with the hardware: {families:?}");
    }

    let Some((strategy, hardware_version)) = survivors
        .iter()
        .max_by_key(|(label, _)| label.bugfix)
        .map(|(_, chosen)| *chosen)
    else {
        let observed = if observed.is_empty() {
            "no candidate could read the version register".to_string()
        } else {
            observed.join(", ")
        };
        return Err(DrmError::VersionCheck(format!(
            "no known DRM controller layout matches the hardware: {observed}"
        )));
    };
    info!("DRM controller version {hardware_version} driven as generation {strategy}");
    Ok(Resolution {
        strategy,
        hardware_version,
    })
}
