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

//! A register accurate stand-in for the DRM controller.
//!
//! [`SimulatedDrmController`] implements [`WordTransport`] for one hardware generation. It only
//! answers the page selector and the indexed words of its own layout, so strategies of other
//! generations fail to read it the way they would fail on real hardware. Commands complete
//! instantly unless stalled: the matching ready bit rises and the file pages are filled.
//!
//! ```
//! use drm_hal::simulation::SimulatedDrmController;
//! use drm_hal::strategy::Generation;
//! use drm_hal::{ControllerConfig, DrmController};
//!
//! let sim = SimulatedDrmController::new(Generation::V6_0_0);
//! let controller = DrmController::new(sim, ControllerConfig::default()).unwrap();
//! assert_eq!(controller.version(), Generation::V6_0_0.label());
//! ```

use crate::bitfield::ErrorLane;
use crate::bus::{Page, RegisterSpan};
use crate::codec::metering::{
    METERING_HEADER_WORDS, MeteringFile, MeteringHeader, encode_metering_file, metering_file_words,
};
use crate::codec::license::{header_block_words, ip_block_words};
use crate::codec::vlnv::{VLNV_WORDS, Vlnv, encode_vlnv_file};
use crate::config::PAGE_REGISTER_NAME;
use crate::strategy::layout::{Command, Layout, StatusField};
use crate::strategy::Generation;
use crate::transport::{TransportStatus, WordTransport};
use crate::version::Version;
use crate::wide_value::WideValue;
use log::trace;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroU32;

/// Status returned for names the simulated layout does not have.
pub const UNKNOWN_REGISTER_STATUS: u32 = 0x0BAD;

const UNKNOWN: TransportStatus =
    TransportStatus::from_nonzero(NonZeroU32::new(UNKNOWN_REGISTER_STATUS).unwrap());

/// VLNV the simulated controller reports for itself in entry 0.
pub const CONTROLLER_VLNV: Vlnv = Vlnv::new(0x0001, 0x0001, 0x0001, 0x0001);

/// One recorded transport access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Read { name: String },
    Write { name: String, value: u32 },
}

/// Asynchronous actions that can be stalled so their completion never shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulatedOperation {
    DnaExtract,
    VlnvExtract,
    Activation,
    EndSessionMetering,
    MidSessionMetering,
    LicenseTimerSample,
    LicenseTimerLoad,
    LicenseTimerSemaphore,
}

#[derive(Debug, Clone)]
pub struct SimulatedDrmController {
    generation: Generation,
    layout: &'static Layout,
    page_register_name: String,
    hardware_version: Version,
    page_selector: u32,
    registers: Vec<u32>,
    pages: BTreeMap<Page, Vec<u32>>,
    ready: HashSet<StatusField>,
    dna: WideValue,
    ips: Vec<Vlnv>,
    ip_usage: Vec<u128>,
    session_id: u64,
    environment_id: u16,
    segment_index: u32,
    metering_enabled: bool,
    license_timer_enabled: bool,
    license_timer_counter: u64,
    timers_loaded: u32,
    semaphore_held: bool,
    lane_errors: HashMap<ErrorLane, u8>,
    failing: HashMap<String, u32>,
    stalled: HashSet<SimulatedOperation>,
    reset_on_init_loaded: bool,
    accesses: Vec<Access>,
}

impl SimulatedDrmController {
    /// A controller of `generation` with no IP attached and every feature enabled.
    pub fn new(generation: Generation) -> Self {
        let layout = generation.table();
        let r = layout.registers;
        let mut spans = vec![
            r.command,
            r.status,
            r.error,
            r.version,
            r.license_start_address,
            r.dna,
            r.license_timer,
            r.license_timer_counter,
        ];
        spans.extend(r.license_timer_init_loaded);
        let register_words = spans.iter().map(RegisterSpan::end).max().unwrap_or(0);
        let mut sim = SimulatedDrmController {
            generation,
            layout,
            page_register_name: PAGE_REGISTER_NAME.to_string(),
            hardware_version: generation.label(),
            page_selector: Page::Registers.selector_value(),
            registers: vec![0; register_words],
            pages: BTreeMap::new(),
            ready: HashSet::new(),
            dna: WideValue::from_u128(0x5EED_0000_0000_0000_0000_0000_0000_D7A0, r.dna.word_count),
            ips: Vec::new(),
            ip_usage: Vec::new(),
            session_id: 0,
            environment_id: 0,
            segment_index: 0,
            metering_enabled: true,
            license_timer_enabled: true,
            license_timer_counter: 0,
            timers_loaded: 0,
            semaphore_held: false,
            lane_errors: HashMap::new(),
            failing: HashMap::new(),
            stalled: HashSet::new(),
            reset_on_init_loaded: false,
            accesses: Vec::new(),
        };
        sim.size_pages();
        sim
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn with_ips(mut self, ips: Vec<Vlnv>) -> Self {
        self.ip_usage = vec![0; ips.len()];
        self.ips = ips;
        self.size_pages();
        self
    }

    /// Usage counter reported in metering block `ip`, for IPs set with [`Self::with_ips`].
    pub fn with_ip_usage(mut self, ip: usize, usage: u128) -> Self {
        if let Some(slot) = self.ip_usage.get_mut(ip) {
            *slot = usage;
        }
        self
    }

    /// Shorter values are zero extended, longer ones keep their low words.
    pub fn with_dna(mut self, dna: WideValue) -> Self {
        let width = self.layout.registers.dna.word_count;
        let words = dna.words();
        let mut fitted = vec![0; width.saturating_sub(words.len())];
        fitted.extend_from_slice(&words[words.len().saturating_sub(width)..]);
        self.dna = WideValue::from(fitted);
        self
    }

    pub fn with_session_id(mut self, session_id: u64) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_environment_id(mut self, environment_id: u16) -> Self {
        self.environment_id = environment_id;
        self
    }

    pub fn with_metering_enabled(mut self, enabled: bool) -> Self {
        self.metering_enabled = enabled;
        self
    }

    pub fn with_license_timer_enabled(mut self, enabled: bool) -> Self {
        self.license_timer_enabled = enabled;
        self
    }

    pub fn with_license_timer_counter(mut self, counter: u64) -> Self {
        self.license_timer_counter = counter;
        self
    }

    pub fn with_page_register_name(mut self, name: &str) -> Self {
        self.page_register_name = name.to_string();
        self
    }

    /// Report `version` in the version register instead of the generation's own label.
    pub fn with_hardware_version(mut self, version: Version) -> Self {
        self.hardware_version = version;
        self
    }

    pub fn with_failing_register(mut self, name: &str, status: u32) -> Self {
        self.fail_register(name, status);
        self
    }

    pub fn with_stall(mut self, operation: SimulatedOperation) -> Self {
        self.stall(operation);
        self
    }

    pub fn with_lane_error(mut self, lane: ErrorLane, code: u8) -> Self {
        self.set_lane_error(lane, code);
        self
    }

    /// Clear the license timer init loaded bit whenever it is set, as a reset would.
    pub fn with_reset_on_init_loaded(mut self) -> Self {
        self.reset_on_init_loaded = true;
        self
    }

    /// Answer every access to `name` with `status`. A zero status removes the fault.
    pub fn fail_register(&mut self, name: &str, status: u32) {
        if status == 0 {
            self.failing.remove(name);
        } else {
            self.failing.insert(name.to_string(), status);
        }
    }

    pub fn stall(&mut self, operation: SimulatedOperation) {
        self.stalled.insert(operation);
    }

    pub fn unstall(&mut self, operation: SimulatedOperation) {
        self.stalled.remove(&operation);
    }

    pub fn set_lane_error(&mut self, lane: ErrorLane, code: u8) {
        self.lane_errors.insert(lane, code);
    }

    pub fn clear_lane_errors(&mut self) {
        self.lane_errors.clear();
    }

    /// Every access so far, oldest first.
    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    pub fn clear_accesses(&mut self) {
        self.accesses.clear();
    }

    pub fn timers_loaded(&self) -> u32 {
        self.timers_loaded
    }

    pub fn is_semaphore_held(&self) -> bool {
        self.semaphore_held
    }

    /// What a read of word `index` on `page` would return, without recording an access.
    pub fn word(&self, page: Page, index: usize) -> Option<u32> {
        match page {
            Page::Registers => self.register_value(index),
            _ => self.pages.get(&page).and_then(|words| words.get(index)).copied(),
        }
    }

    fn size_pages(&mut self) {
        let files = self.layout.files;
        let n = self.ips.len();
        let mut pages = BTreeMap::new();
        pages.insert(Page::VlnvFile, vec![0; (n + 1) * VLNV_WORDS]);
        pages.insert(
            Page::LicenseFile,
            vec![0; header_block_words(&files) + ip_block_words(&files) * n.max(1)],
        );
        pages.insert(Page::TraceFile, vec![0; files.trace_file_words]);
        pages.insert(
            Page::MeteringFile,
            vec![0; metering_file_words(n, files.metering_word_width)],
        );
        if let Some(size) = files.mailbox_words {
            pages.insert(Page::MailboxFile, vec![0; size]);
        }
        self.pages = pages;
    }

    fn is_stalled(&self, operation: SimulatedOperation) -> bool {
        self.stalled.contains(&operation)
    }

    fn status_word(&self) -> u32 {
        let status = self.layout.status;
        let mut word = 0;
        for field in &self.ready {
            if let Some(bits) = status.field(*field) {
                word = bits.insert(word, 1);
            }
        }
        if let Some(ack) = status.license_timer_init_semaphore_acknowledged {
            let acknowledged =
                self.semaphore_held && !self.is_stalled(SimulatedOperation::LicenseTimerSemaphore);
            word = ack.insert(word, u32::from(acknowledged));
        }
        word = status
            .metering_enabled
            .insert(word, u32::from(self.metering_enabled));
        word = status
            .license_timer_enabled
            .insert(word, u32::from(self.license_timer_enabled));
        word = status
            .number_of_license_timers_loaded
            .insert(word, self.timers_loaded);
        status
            .number_of_detected_ips
            .insert(word, self.ips.len() as u32)
    }

    fn error_word(&self) -> u32 {
        let no_error = u32::from(self.layout.errors.no_error);
        ErrorLane::ALL.iter().fold(0, |word, lane| {
            let code = self.lane_errors.get(lane).map_or(no_error, |c| u32::from(*c));
            self.layout.error_lanes.field(*lane).insert(word, code)
        })
    }

    fn counter_words(&self) -> Vec<u32> {
        let span = self.layout.registers.license_timer_counter;
        WideValue::from_u128(u128::from(self.license_timer_counter), span.word_count).into_words()
    }

    fn register_value(&self, index: usize) -> Option<u32> {
        let r = self.layout.registers;
        let stored = *self.registers.get(index)?;
        let within = |span: RegisterSpan| (span.start..span.end()).contains(&index);
        Some(if index == r.status.start {
            self.status_word()
        } else if index == r.error.start {
            self.error_word()
        } else if index == r.version.start {
            self.hardware_version.to_register()
        } else if within(r.license_timer_counter)
            && self.layout.commands.sample_license_timer_counter.is_none()
        {
            self.counter_words()[index - r.license_timer_counter.start]
        } else {
            stored
        })
    }

    fn current_page(&self) -> Option<Page> {
        Page::from_selector_value(self.page_selector).filter(|p| self.layout.supports_page(*p))
    }

    /// Index of an indexed word name, if it uses this layout's prefix.
    fn parse_index(&self, name: &str) -> Option<usize> {
        name.strip_prefix(self.layout.register_prefix)?
            .parse()
            .ok()
    }

    fn fault(&self, name: &str) -> Option<TransportStatus> {
        self.failing.get(name).and_then(|code| TransportStatus::new(*code))
    }

    fn write_register(&mut self, index: usize, value: u32) {
        let r = self.layout.registers;
        if index == r.command.start {
            self.registers[index] = value;
            self.run_command(value);
        } else if index == r.status.start || index == r.error.start || index == r.version.start {
            trace!("simulated controller ignores write to read only word {index}");
        } else if r.license_timer_init_loaded.map(|s| s.start) == Some(index) {
            self.registers[index] = if self.reset_on_init_loaded { 0 } else { value & 1 };
        } else {
            self.registers[index] = value;
            if index + 1 == r.license_timer.end() {
                self.load_timer();
            }
        }
    }

    fn load_timer(&mut self) {
        if !self.license_timer_enabled || self.is_stalled(SimulatedOperation::LicenseTimerLoad) {
            return;
        }
        let needs_semaphore = self
            .layout
            .commands
            .license_timer_init_semaphore_request
            .is_some();
        if needs_semaphore && !self.semaphore_held {
            self.lane_errors.insert(ErrorLane::LicenseTimerLoad, 0x06);
            return;
        }
        self.timers_loaded = (self.timers_loaded + 1)
            & self.layout.status.number_of_license_timers_loaded.max_value();
    }

    fn run_command(&mut self, word: u32) {
        let (command, semaphore) = self.layout.commands.decode(word);
        self.semaphore_held = semaphore;
        let Some(command) = command else {
            trace!("simulated controller ignores command word {word:#010x}");
            return;
        };
        let (operation, ready) = match command {
            Command::Nop => return,
            Command::ExtractDna => {
                let span = self.layout.registers.dna;
                self.registers[span.start..span.end()].copy_from_slice(self.dna.words());
                (SimulatedOperation::DnaExtract, StatusField::DnaReady)
            }
            Command::ExtractVlnv => {
                let mut entries = vec![CONTROLLER_VLNV];
                entries.extend_from_slice(&self.ips);
                self.pages.insert(Page::VlnvFile, encode_vlnv_file(&entries));
                (SimulatedOperation::VlnvExtract, StatusField::VlnvReady)
            }
            Command::Activate => (SimulatedOperation::Activation, StatusField::ActivationDone),
            Command::EndSessionExtractMetering => {
                self.fill_metering(true);
                (
                    SimulatedOperation::EndSessionMetering,
                    StatusField::EndSessionMeteringReady,
                )
            }
            Command::ExtractMetering => {
                self.fill_metering(false);
                (SimulatedOperation::MidSessionMetering, StatusField::MeteringReady)
            }
            Command::SampleLicenseTimerCounter => {
                let span = self.layout.registers.license_timer_counter;
                let words = self.counter_words();
                self.registers[span.start..span.end()].copy_from_slice(&words);
                (
                    SimulatedOperation::LicenseTimerSample,
                    StatusField::LicenseTimerSampleReady,
                )
            }
        };
        if self.is_stalled(operation) {
            self.ready.remove(&ready);
        } else {
            self.ready.insert(ready);
        }
    }

    fn fill_metering(&mut self, end_session: bool) {
        let width = self.layout.files.metering_word_width;
        let file = MeteringFile {
            header: MeteringHeader {
                session_id: self.session_id,
                encrypted: false,
                end_session,
                environment_id: self.environment_id,
                segment_index: self.segment_index,
            },
            license_timer_count: WideValue::from_u128(
                u128::from(self.timers_loaded),
                width - METERING_HEADER_WORDS,
            ),
            ip_blocks: self
                .ip_usage
                .iter()
                .map(|usage| WideValue::from_u128(*usage, width))
                .collect(),
            mac: WideValue::zeroed(width),
        };
        self.segment_index += 1;
        match encode_metering_file(&file, width) {
            Ok(words) => {
                self.pages.insert(Page::MeteringFile, words);
            }
            Err(e) => trace!("simulated controller leaves the metering page as is: {e}"),
        }
    }
}

impl WordTransport for SimulatedDrmController {
    fn read_word(&mut self, name: &str) -> Result<u32, TransportStatus> {
        self.accesses.push(Access::Read {
            name: name.to_string(),
        });
        if let Some(status) = self.fault(name) {
            return Err(status);
        }
        if name == self.page_register_name {
            return Ok(self.page_selector);
        }
        let index = self.parse_index(name).ok_or(UNKNOWN)?;
        let page = self.current_page().ok_or(UNKNOWN)?;
        self.word(page, index).ok_or(UNKNOWN)
    }

    fn write_word(&mut self, name: &str, value: u32) -> Result<(), TransportStatus> {
        self.accesses.push(Access::Write {
            name: name.to_string(),
            value,
        });
        if let Some(status) = self.fault(name) {
            return Err(status);
        }
        if name == self.page_register_name {
            self.page_selector = value;
            return Ok(());
        }
        let index = self.parse_index(name).ok_or(UNKNOWN)?;
        match self.current_page().ok_or(UNKNOWN)? {
            Page::Registers if index < self.registers.len() => {
                self.write_register(index, value);
                Ok(())
            }
            Page::Registers => Err(UNKNOWN),
            page => {
                let slot = self
                    .pages
                    .get_mut(&page)
                    .and_then(|words| words.get_mut(index))
                    .ok_or(UNKNOWN)?;
                *slot = value;
                Ok(())
            }
        }
    }
}
