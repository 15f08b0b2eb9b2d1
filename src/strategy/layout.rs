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

//! The data that distinguishes one hardware generation from another.
//!
//! A [`Layout`] is pure data: register offsets and widths, status bit positions, command codes,
//! error lane placement, the error message table and file geometry. Protocol logic lives in
//! [`DrmStrategy`](super::DrmStrategy) and only ever reads these tables.

use crate::bitfield::{BitField, LanePlacement};
use crate::bus::{Page, RegisterSpan};
use std::fmt;

/// Logical registers on the registers page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    pub command: RegisterSpan,
    pub status: RegisterSpan,
    pub error: RegisterSpan,
    pub version: RegisterSpan,
    pub license_start_address: RegisterSpan,
    pub dna: RegisterSpan,
    pub license_timer: RegisterSpan,
    pub license_timer_counter: RegisterSpan,
    pub license_timer_init_loaded: Option<RegisterSpan>,
}

/// Named fields of the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    DnaReady,
    VlnvReady,
    ActivationDone,
    EndSessionMeteringReady,
    MeteringReady,
    LicenseTimerSampleReady,
    LicenseTimerInitSemaphoreAcknowledged,
    MeteringEnabled,
    LicenseTimerEnabled,
    NumberOfLicenseTimersLoaded,
    NumberOfDetectedIps,
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLayout {
    pub dna_ready: BitField,
    pub vlnv_ready: BitField,
    pub activation_done: BitField,
    pub end_session_metering_ready: BitField,
    pub metering_ready: Option<BitField>,
    pub license_timer_sample_ready: Option<BitField>,
    pub license_timer_init_semaphore_acknowledged: Option<BitField>,
    pub metering_enabled: BitField,
    pub license_timer_enabled: BitField,
    pub number_of_license_timers_loaded: BitField,
    pub number_of_detected_ips: BitField,
}

impl StatusLayout {
    /// Where `field` sits, or `None` if this generation has no such field.
    pub fn field(&self, field: StatusField) -> Option<BitField> {
        match field {
            StatusField::DnaReady => Some(self.dna_ready),
            StatusField::VlnvReady => Some(self.vlnv_ready),
            StatusField::ActivationDone => Some(self.activation_done),
            StatusField::EndSessionMeteringReady => Some(self.end_session_metering_ready),
            StatusField::MeteringReady => self.metering_ready,
            StatusField::LicenseTimerSampleReady => self.license_timer_sample_ready,
            StatusField::LicenseTimerInitSemaphoreAcknowledged => {
                self.license_timer_init_semaphore_acknowledged
            }
            StatusField::MeteringEnabled => Some(self.metering_enabled),
            StatusField::LicenseTimerEnabled => Some(self.license_timer_enabled),
            StatusField::NumberOfLicenseTimersLoaded => Some(self.number_of_license_timers_loaded),
            StatusField::NumberOfDetectedIps => Some(self.number_of_detected_ips),
        }
    }
}

/// Commands that can be written to the command register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Nop,
    ExtractDna,
    ExtractVlnv,
    Activate,
    EndSessionExtractMetering,
    ExtractMetering,
    SampleLicenseTimerCounter,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Nop,
        Command::ExtractDna,
        Command::ExtractVlnv,
        Command::Activate,
        Command::EndSessionExtractMetering,
        Command::ExtractMetering,
        Command::SampleLicenseTimerCounter,
    ];
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandCodes {
    pub nop: u32,
    pub extract_dna: u32,
    pub extract_vlnv: u32,
    pub activate: u32,
    pub end_session_extract_metering: u32,
    pub extract_metering: Option<u32>,
    pub sample_license_timer_counter: Option<u32>,
    /// OR-ed into whatever command word is written while the semaphore is requested.
    pub license_timer_init_semaphore_request: Option<u32>,
}

impl CommandCodes {
    pub fn code(&self, command: Command) -> Option<u32> {
        match command {
            Command::Nop => Some(self.nop),
            Command::ExtractDna => Some(self.extract_dna),
            Command::ExtractVlnv => Some(self.extract_vlnv),
            Command::Activate => Some(self.activate),
            Command::EndSessionExtractMetering => Some(self.end_session_extract_metering),
            Command::ExtractMetering => self.extract_metering,
            Command::SampleLicenseTimerCounter => self.sample_license_timer_counter,
        }
    }

    /// Split a raw command word into its command and the semaphore request bit.
    pub fn decode(&self, word: u32) -> (Option<Command>, bool) {
        let semaphore = self.license_timer_init_semaphore_request.unwrap_or(0);
        let requested = semaphore != 0 && word & semaphore == semaphore;
        let code = word & !semaphore;
        let command = Command::ALL
            .into_iter()
            .find(|c| self.code(*c) == Some(code));
        (command, requested)
    }
}

/// Error lane codes and their messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorTable {
    pub no_error: u8,
    pub messages: &'static [(u8, &'static str)],
}

impl ErrorTable {
    pub fn message(&self, code: u8) -> &'static str {
        self.messages
            .iter()
            .find(|(c, _)| *c == code)
            .map_or("Unknown error", |(_, message)| message)
    }
}

/// Sizes of the banked files, in 32 bit words unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileGeometry {
    pub license_word_width: usize,
    /// In license words.
    pub license_header_block: usize,
    /// In license words.
    pub license_ip_block: usize,
    pub metering_word_width: usize,
    pub trace_file_words: usize,
    /// `None` when the generation has no mailbox page.
    pub mailbox_words: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub register_prefix: &'static str,
    pub registers: RegisterMap,
    pub status: StatusLayout,
    pub error_lanes: LanePlacement,
    pub errors: ErrorTable,
    pub commands: CommandCodes,
    pub files: FileGeometry,
}

impl Layout {
    pub fn supports_page(&self, page: Page) -> bool {
        match page {
            Page::MailboxFile => self.files.mailbox_words.is_some(),
            _ => true,
        }
    }
}
