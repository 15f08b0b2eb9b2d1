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

use crate::bitfield::ErrorLane;
use crate::version::Version;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Optional controller features that a hardware build may leave disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Functionality {
    Metering,
    LicenseTimer,
}

impl fmt::Display for Functionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Functionality::Metering => write!(f, "metering"),
            Functionality::LicenseTimer => write!(f, "license timer"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DrmError {
    #[error("DrmError::Transport: transport returned status {code:#x} when accessing {register:?}")]
    Transport { register: String, code: u32 },
    #[error(
        "DrmError::HardwareTimeout: {field} did not reach {expected} within {timeout:?} (last read {actual})"
    )]
    HardwareTimeout {
        field: String,
        expected: u32,
        actual: u32,
        timeout: Duration,
    },
    #[error("DrmError::VersionCheck: {0}")]
    VersionCheck(String),
    #[error("DrmError::FunctionalityDisabled: {0} is disabled on this hardware build")]
    FunctionalityDisabled(Functionality),
    #[error(
        "DrmError::LicenseTimerReset: license timer init loaded bit read back as cleared, the controller was reset"
    )]
    LicenseTimerReset,
    #[error(
        "DrmError::LicenseFileSize: license file holds {length} words but at least {minimum} are required"
    )]
    LicenseFileSize { length: usize, minimum: usize },
    #[error("DrmError::Hardware: {lane} lane reported {code:#04x}: {message}")]
    Hardware {
        lane: ErrorLane,
        code: u8,
        message: &'static str,
    },
    #[error("DrmError::Unsupported: {operation} is not available on DRM controller {version}")]
    Unsupported { operation: String, version: Version },
    #[error("DrmError::Argument: {0}")]
    Argument(String),
    #[error("DrmError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("DrmError::TomlDe: Failed to parse {file:?}: {e}")]
    TomlDe { file: PathBuf, e: toml::de::Error },
    #[error("DrmError::Internal: An Internal error occurred: {0}")]
    Internal(String),
}

impl DrmError {
    pub(crate) fn unsupported(operation: impl Into<String>, version: Version) -> Self {
        DrmError::Unsupported {
            operation: operation.into(),
            version,
        }
    }

    /// The raw transport status, if this error came straight from the word transport.
    pub fn transport_code(&self) -> Option<u32> {
        match self {
            DrmError::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }
}
