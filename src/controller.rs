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

//! One attached DRM controller with its resolved strategy.
//!
//! [`DrmController`] resolves the hardware generation once, on construction, and from then on
//! forwards every operation to that strategy with the timeout from its [`ControllerConfig`].
//! It has no internal locking; callers sharing one controller between threads must serialize
//! access themselves.

use crate::bitfield::ErrorLane;
use crate::bus::RegisterBus;
use crate::codec::metering::MeteringFile;
use crate::codec::vlnv::Vlnv;
use crate::config::ControllerConfig;
use crate::error::{DrmError, Functionality};
use crate::resolver;
use crate::strategy::layout::{Command, Layout, StatusField};
use crate::strategy::{DrmStrategy, Generation, MeteringTrigger};
use crate::transport::WordTransport;
use crate::version::Version;
use crate::wide_value::WideValue;

#[derive(Debug)]
pub struct DrmController<T> {
    bus: RegisterBus<T>,
    strategy: Generation,
    hardware_version: Version,
    config: ControllerConfig,
}

impl<T: WordTransport> DrmController<T> {
    /// Take ownership of `transport` and resolve the hardware generation behind it.
    ///
    /// # Returns: `Result<DrmController<T>, DrmError>`
    /// * `Ok(DrmController)` - Ready to use
    /// * `Err(DrmError::VersionCheck)` - No known generation matches the hardware
    pub fn new(transport: T, config: ControllerConfig) -> Result<Self, DrmError> {
        let mut bus = RegisterBus::new(transport, &config);
        let resolution = resolver::resolve(&mut bus)?;
        Ok(DrmController {
            bus,
            strategy: resolution.strategy,
            hardware_version: resolution.hardware_version,
            config,
        })
    }

    pub fn with_default_config(transport: T) -> Result<Self, DrmError> {
        Self::new(transport, ControllerConfig::default())
    }

    pub fn strategy(&self) -> Generation {
        self.strategy
    }

    /// Version of the selected strategy.
    pub fn version(&self) -> Version {
        self.strategy.version()
    }

    /// Version as reported by the hardware.
    pub fn hardware_version(&self) -> Version {
        self.hardware_version
    }

    pub fn layout(&self) -> &'static Layout {
        self.strategy.layout()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Direct bus access, for register level work the controller does not wrap.
    pub fn bus_mut(&mut self) -> &mut RegisterBus<T> {
        &mut self.bus
    }

    pub fn into_transport(self) -> T {
        self.bus.into_transport()
    }

    pub fn read_version(&mut self) -> Result<Version, DrmError> {
        self.strategy.read_version(&mut self.bus)
    }

    pub fn read_command(&mut self) -> Result<(Option<Command>, bool), DrmError> {
        self.strategy.read_command(&mut self.bus)
    }

    pub fn write_command(&mut self, command: Command) -> Result<(), DrmError> {
        self.strategy.write_command(&mut self.bus, command)
    }

    pub fn read_status_register(&mut self) -> Result<u32, DrmError> {
        self.strategy.read_status_register(&mut self.bus)
    }

    pub fn read_status(&mut self, field: StatusField) -> Result<u32, DrmError> {
        self.strategy.read_status(&mut self.bus, field)
    }

    pub fn read_error_register(&mut self) -> Result<u32, DrmError> {
        self.strategy.read_error_register(&mut self.bus)
    }

    pub fn read_error_code(&mut self, lane: ErrorLane) -> Result<u8, DrmError> {
        self.strategy.read_error_code(&mut self.bus, lane)
    }

    pub fn error_message(&self, code: u8) -> &'static str {
        self.strategy.error_message(code)
    }

    pub fn number_of_detected_ips(&mut self) -> Result<usize, DrmError> {
        self.strategy.number_of_detected_ips(&mut self.bus)
    }

    pub fn number_of_license_timers_loaded(&mut self) -> Result<u32, DrmError> {
        self.strategy.number_of_license_timers_loaded(&mut self.bus)
    }

    pub fn is_enabled(&mut self, functionality: Functionality) -> Result<bool, DrmError> {
        self.strategy.is_enabled(&mut self.bus, functionality)
    }

    pub fn extract_dna(&mut self) -> Result<WideValue, DrmError> {
        let timeout = self.config.timeouts.dna_extract;
        self.strategy.extract_dna(&mut self.bus, timeout)
    }

    pub fn extract_vlnv(&mut self) -> Result<Vec<Vlnv>, DrmError> {
        let timeout = self.config.timeouts.vlnv_extract;
        self.strategy.extract_vlnv(&mut self.bus, timeout)
    }

    pub fn read_license_start_address(&mut self) -> Result<u64, DrmError> {
        self.strategy.read_license_start_address(&mut self.bus)
    }

    pub fn write_license_start_address(&mut self, address: u64) -> Result<(), DrmError> {
        self.strategy
            .write_license_start_address(&mut self.bus, address)
    }

    pub fn minimum_license_file_words(&self) -> usize {
        self.strategy.minimum_license_file_words()
    }

    pub fn write_license_file(&mut self, license: &[u32]) -> Result<(), DrmError> {
        self.strategy.write_license_file(&mut self.bus, license)
    }

    pub fn activate(&mut self, license: &[u32]) -> Result<(), DrmError> {
        let timeout = self.config.timeouts.activation;
        self.strategy.activate(&mut self.bus, license, timeout)
    }

    pub fn load_license_timer(&mut self, timer: &WideValue) -> Result<(), DrmError> {
        let timeouts = &self.config.timeouts;
        let (load, semaphore) = (timeouts.license_timer_load, timeouts.semaphore);
        self.strategy
            .load_license_timer(&mut self.bus, timer, load, semaphore)
    }

    pub fn is_license_timer_init_loaded(&mut self) -> Result<bool, DrmError> {
        self.strategy.is_license_timer_init_loaded(&mut self.bus)
    }

    pub fn set_license_timer_init_loaded(&mut self) -> Result<(), DrmError> {
        self.strategy.set_license_timer_init_loaded(&mut self.bus)
    }

    pub fn sample_license_timer_counter(&mut self) -> Result<u64, DrmError> {
        let timeout = self.config.timeouts.license_timer_sample;
        self.strategy
            .sample_license_timer_counter(&mut self.bus, timeout)
    }

    pub fn extract_metering_file(
        &mut self,
        trigger: MeteringTrigger,
    ) -> Result<MeteringFile, DrmError> {
        let timeout = self.config.timeouts.metering_extract;
        self.strategy
            .extract_metering_file(&mut self.bus, trigger, timeout)
    }

    pub fn read_mailbox(&mut self, start: usize, count: usize) -> Result<Vec<u32>, DrmError> {
        self.strategy.read_mailbox(&mut self.bus, start, count)
    }

    pub fn write_mailbox(&mut self, start: usize, words: &[u32]) -> Result<(), DrmError> {
        self.strategy.write_mailbox(&mut self.bus, start, words)
    }

    pub fn read_trace_file(&mut self) -> Result<Vec<u32>, DrmError> {
        self.strategy.read_trace_file(&mut self.bus)
    }
}
