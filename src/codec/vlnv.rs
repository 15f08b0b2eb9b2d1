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

//! VLNV file entries. Entry 0 is the controller itself, entries `1..=N` the detected IPs.

use crate::error::DrmError;
use std::fmt;

pub const VLNV_WORDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vlnv {
    pub vendor: u16,
    pub library: u16,
    pub name: u16,
    pub version: u16,
}

impl Vlnv {
    pub const fn new(vendor: u16, library: u16, name: u16, version: u16) -> Self {
        Vlnv {
            vendor,
            library,
            name,
            version,
        }
    }

    pub const fn from_words(words: [u32; VLNV_WORDS]) -> Self {
        Vlnv {
            vendor: (words[0] >> 16) as u16,
            library: words[0] as u16,
            name: (words[1] >> 16) as u16,
            version: words[1] as u16,
        }
    }

    pub const fn to_words(self) -> [u32; VLNV_WORDS] {
        [
            ((self.vendor as u32) << 16) | self.library as u32,
            ((self.name as u32) << 16) | self.version as u32,
        ]
    }
}

impl fmt::Display for Vlnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}:{:04X}:{:04X}:{:04X}",
            self.vendor, self.library, self.name, self.version
        )
    }
}

pub fn decode_vlnv_file(words: &[u32]) -> Result<Vec<Vlnv>, DrmError> {
    if words.len() % VLNV_WORDS != 0 {
        return Err(DrmError::Argument(format!(
            "VLNV file of {} words is not a whole number of {VLNV_WORDS} word entries",
            words.len()
        )));
    }
    Ok(words
        .chunks_exact(VLNV_WORDS)
        .map(|c| Vlnv::from_words([c[0], c[1]]))
        .collect())
}

pub fn encode_vlnv_file(entries: &[Vlnv]) -> Vec<u32> {
    entries.iter().flat_map(|v| v.to_words()).collect()
}
