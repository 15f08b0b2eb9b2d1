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

//! Three part `major.minor.bugfix` versions as reported by the version register.
//!
//! The version register packs the three parts into the low 24 bits of one word:
//!
//! ```text
//!  31      24 23      16 15       8 7        0
//! +----------+----------+----------+----------+
//! | reserved |  major   |  minor   |  bugfix  |
//! +----------+----------+----------+----------+
//! ```

use crate::error::DrmError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub bugfix: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8, bugfix: u8) -> Self {
        Version {
            major,
            minor,
            bugfix,
        }
    }

    /// Decode a raw version register word. Bits above 23 are ignored.
    pub const fn from_register(word: u32) -> Self {
        Version {
            major: ((word >> 16) & 0xFF) as u8,
            minor: ((word >> 8) & 0xFF) as u8,
            bugfix: (word & 0xFF) as u8,
        }
    }

    pub const fn to_register(self) -> u32 {
        ((self.major as u32) << 16) | ((self.minor as u32) << 8) | self.bugfix as u32
    }

    /// True when both versions belong to the same `major.minor` family.
    pub fn same_family(&self, other: &Version) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.bugfix)
    }
}

impl FromStr for Version {
    type Err = DrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(DrmError::Argument(format!(
                "'{s}' is not a major.minor.bugfix version"
            )));
        }
        let mut numbers = [0u8; 3];
        for (slot, part) in numbers.iter_mut().zip(parts) {
            *slot = part.parse().map_err(|_| {
                DrmError::Argument(format!("'{part}' in '{s}' is not a version number"))
            })?;
        }
        Ok(Version::new(numbers[0], numbers[1], numbers[2]))
    }
}
