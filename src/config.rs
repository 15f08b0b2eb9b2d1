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

//! Controller configuration.
//!
//! Everything has a hardcoded default, so a [`ControllerConfig::default`] is enough to talk to
//! standard hardware. Integrations that rename the page selector or need longer timeouts can
//! provide a TOML file with any subset of the keys below:
//!
//! ```toml
//! [controller]
//! page_register_name = "DrmPageRegister"
//! poll_interval_us = 100
//!
//! [timeouts]
//! dna_extract_us = 100000
//! vlnv_extract_us = 100000
//! activation_us = 5000000
//! license_timer_load_us = 5000000
//! license_timer_sample_us = 100000
//! metering_extract_us = 1000000
//! semaphore_us = 1000000
//! ```

use crate::error::DrmError;
use log::{trace, warn};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// Hardcoded backups used whenever the config file leaves a key out
pub static PAGE_REGISTER_NAME: &str = "DrmPageRegister";
pub const POLL_INTERVAL_US: u64 = 100;
pub const DNA_EXTRACT_TIMEOUT_US: u64 = 100_000;
pub const VLNV_EXTRACT_TIMEOUT_US: u64 = 100_000;
pub const ACTIVATION_TIMEOUT_US: u64 = 5_000_000;
pub const LICENSE_TIMER_LOAD_TIMEOUT_US: u64 = 5_000_000;
pub const LICENSE_TIMER_SAMPLE_TIMEOUT_US: u64 = 100_000;
pub const METERING_EXTRACT_TIMEOUT_US: u64 = 1_000_000;
pub const SEMAPHORE_TIMEOUT_US: u64 = 1_000_000;

/// Deadlines for each asynchronous hardware action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTimeouts {
    pub dna_extract: Duration,
    pub vlnv_extract: Duration,
    pub activation: Duration,
    pub license_timer_load: Duration,
    pub license_timer_sample: Duration,
    pub metering_extract: Duration,
    pub semaphore: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        OperationTimeouts {
            dna_extract: Duration::from_micros(DNA_EXTRACT_TIMEOUT_US),
            vlnv_extract: Duration::from_micros(VLNV_EXTRACT_TIMEOUT_US),
            activation: Duration::from_micros(ACTIVATION_TIMEOUT_US),
            license_timer_load: Duration::from_micros(LICENSE_TIMER_LOAD_TIMEOUT_US),
            license_timer_sample: Duration::from_micros(LICENSE_TIMER_SAMPLE_TIMEOUT_US),
            metering_extract: Duration::from_micros(METERING_EXTRACT_TIMEOUT_US),
            semaphore: Duration::from_micros(SEMAPHORE_TIMEOUT_US),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Transport name of the page selector word.
    pub page_register_name: String,
    /// Sleep between two reads of a polled field.
    pub poll_interval: Duration,
    pub timeouts: OperationTimeouts,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            page_register_name: PAGE_REGISTER_NAME.to_string(),
            poll_interval: Duration::from_micros(POLL_INTERVAL_US),
            timeouts: OperationTimeouts::default(),
        }
    }
}

/// This is the top level struct which holds all sections
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    controller: Option<ControllerToml>,
    timeouts: Option<TimeoutsToml>,
}

/// This is the "controller" section struct
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ControllerToml {
    page_register_name: Option<String>,
    poll_interval_us: Option<u64>,
}

/// This is the "timeouts" section struct
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeoutsToml {
    dna_extract_us: Option<u64>,
    vlnv_extract_us: Option<u64>,
    activation_us: Option<u64>,
    license_timer_load_us: Option<u64>,
    license_timer_sample_us: Option<u64>,
    metering_extract_us: Option<u64>,
    semaphore_us: Option<u64>,
}

fn micros_or(value: Option<u64>, key: &str, fallback: u64) -> Duration {
    Duration::from_micros(value.unwrap_or_else(|| {
        trace!("No {key} provided. Using hardcoded value.");
        fallback
    }))
}

impl From<TimeoutsToml> for OperationTimeouts {
    fn from(value: TimeoutsToml) -> Self {
        trace!("User provided timeouts: {value:?}");
        OperationTimeouts {
            dna_extract: micros_or(value.dna_extract_us, "dna_extract_us", DNA_EXTRACT_TIMEOUT_US),
            vlnv_extract: micros_or(
                value.vlnv_extract_us,
                "vlnv_extract_us",
                VLNV_EXTRACT_TIMEOUT_US,
            ),
            activation: micros_or(value.activation_us, "activation_us", ACTIVATION_TIMEOUT_US),
            license_timer_load: micros_or(
                value.license_timer_load_us,
                "license_timer_load_us",
                LICENSE_TIMER_LOAD_TIMEOUT_US,
            ),
            license_timer_sample: micros_or(
                value.license_timer_sample_us,
                "license_timer_sample_us",
                LICENSE_TIMER_SAMPLE_TIMEOUT_US,
            ),
            metering_extract: micros_or(
                value.metering_extract_us,
                "metering_extract_us",
                METERING_EXTRACT_TIMEOUT_US,
            ),
            semaphore: micros_or(value.semaphore_us, "semaphore_us", SEMAPHORE_TIMEOUT_US),
        }
    }
}

impl From<TomlConfig> for ControllerConfig {
    fn from(value: TomlConfig) -> Self {
        let controller = value.controller.unwrap_or_default();
        trace!("User provided controller config: {controller:?}");
        ControllerConfig {
            page_register_name: controller.page_register_name.unwrap_or_else(|| {
                trace!("No page_register_name provided. Using hardcoded value.");
                PAGE_REGISTER_NAME.to_string()
            }),
            poll_interval: micros_or(
                controller.poll_interval_us,
                "poll_interval_us",
                POLL_INTERVAL_US,
            ),
            timeouts: value.timeouts.unwrap_or_default().into(),
        }
    }
}

impl ControllerConfig {
    /// Parse a configuration from TOML text. `origin` only names the source in errors.
    pub fn from_toml_str(toml_string: &str, origin: &Path) -> Result<ControllerConfig, DrmError> {
        let config: TomlConfig = toml::from_str(toml_string).map_err(|e| DrmError::TomlDe {
            file: origin.to_path_buf(),
            e,
        })?;
        let config: ControllerConfig = config.into();
        if config.page_register_name.is_empty() {
            return Err(DrmError::Argument(format!(
                "{origin:?} sets an empty page_register_name"
            )));
        }
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Returns: `Result<ControllerConfig, DrmError>`
    /// * `Ok(ControllerConfig)` - Parsed configuration, defaults filled in
    /// * `Err(DrmError::IORead)` - The file could not be read
    /// * `Err(DrmError::TomlDe)` - The file is not valid configuration TOML
    pub fn from_file(config_path: &Path) -> Result<ControllerConfig, DrmError> {
        trace!("Attempting to read config from {config_path:?}");
        let toml_string = std::fs::read_to_string(config_path).map_err(|e| DrmError::IORead {
            file: config_path.to_path_buf(),
            e,
        })?;
        Self::from_toml_str(&toml_string, config_path)
    }

    /// Like [`ControllerConfig::from_file`] but falls back to the defaults on any failure.
    pub fn load_or_default(config_path: &Path) -> ControllerConfig {
        Self::from_file(config_path).unwrap_or_else(|e| {
            warn!("Using hardcoded controller config because loading config failed: {e}");
            ControllerConfig::default()
        })
    }
}
