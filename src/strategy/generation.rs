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

//! Every known hardware generation and its register layout.
//!
//! Generations sharing a major version share one layout table. Adding a bugfix release of an
//! existing family is therefore a one line change: a new [`Generation`] variant and its label.
//!
//! | family | prefix            | lanes      | commands   | license timer | mailbox |
//! |--------|-------------------|------------|------------|---------------|---------|
//! | 3.x    | `DrmRegisterLine` | byte index | sequential | 4 words       | no      |
//! | 4.x    | `DrmRegisterLine` | byte index | sequential | 4 words       | no      |
//! | 5.x    | `DrmRegisterLine` | bit shift  | one-hot    | 12 words      | no      |
//! | 6.x    | `DrmIndexedWord`  | bit shift  | one-hot    | 12 words      | 64      |
//! | 7.x    | `DrmIndexedWord`  | bit shift  | one-hot    | 12 words      | 64      |
//! | 8.x    | `DrmIndexedWord`  | bit shift  | one-hot    | 12 words      | 128     |

use super::DrmStrategy;
use super::layout::{CommandCodes, ErrorTable, FileGeometry, Layout, RegisterMap, StatusLayout};
use crate::bitfield::{BitField, LanePlacement};
use crate::bus::{Page, RegisterSpan};
use crate::version::Version;
use std::fmt;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Generation {
    V3_0_0,
    V3_1_0,
    V3_1_1,
    V3_2_0,
    V4_0_0,
    V4_1_0,
    V4_2_0,
    V4_2_1,
    V5_0_0,
    V6_0_0,
    V6_0_1,
    V7_0_0,
    V7_1_0,
    V8_0_0,
}

impl Generation {
    pub const ALL: [Generation; 14] = [
        Generation::V3_0_0,
        Generation::V3_1_0,
        Generation::V3_1_1,
        Generation::V3_2_0,
        Generation::V4_0_0,
        Generation::V4_1_0,
        Generation::V4_2_0,
        Generation::V4_2_1,
        Generation::V5_0_0,
        Generation::V6_0_0,
        Generation::V6_0_1,
        Generation::V7_0_0,
        Generation::V7_1_0,
        Generation::V8_0_0,
    ];

    /// The version this generation describes itself as.
    pub const fn label(self) -> Version {
        match self {
            Generation::V3_0_0 => Version::new(3, 0, 0),
            Generation::V3_1_0 => Version::new(3, 1, 0),
            Generation::V3_1_1 => Version::new(3, 1, 1),
            Generation::V3_2_0 => Version::new(3, 2, 0),
            Generation::V4_0_0 => Version::new(4, 0, 0),
            Generation::V4_1_0 => Version::new(4, 1, 0),
            Generation::V4_2_0 => Version::new(4, 2, 0),
            Generation::V4_2_1 => Version::new(4, 2, 1),
            Generation::V5_0_0 => Version::new(5, 0, 0),
            Generation::V6_0_0 => Version::new(6, 0, 0),
            Generation::V6_0_1 => Version::new(6, 0, 1),
            Generation::V7_0_0 => Version::new(7, 0, 0),
            Generation::V7_1_0 => Version::new(7, 1, 0),
            Generation::V8_0_0 => Version::new(8, 0, 0),
        }
    }

    pub fn from_label(version: Version) -> Option<Generation> {
        Generation::ALL.into_iter().find(|g| g.label() == version)
    }

    pub const fn table(self) -> &'static Layout {
        match self.label().major {
            3 => &LAYOUT_V3,
            4 => &LAYOUT_V4,
            5 => &LAYOUT_V5,
            6 => &LAYOUT_V6,
            7 => &LAYOUT_V7,
            _ => &LAYOUT_V8,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl DrmStrategy for Generation {
    fn version(&self) -> Version {
        self.label()
    }

    fn layout(&self) -> &'static Layout {
        self.table()
    }
}

const fn reg(index: usize) -> RegisterSpan {
    RegisterSpan::register(index)
}

const fn span(start: usize, word_count: usize) -> RegisterSpan {
    RegisterSpan::new(Page::Registers, start, word_count)
}

static EARLY_ERRORS: ErrorTable = ErrorTable {
    no_error: 0xFF,
    messages: &[
        (0xFF, "No error"),
        (0x01, "License header check failed"),
        (0x02, "License MAC check failed"),
        (0x03, "License DNA does not match the device"),
        (0x04, "License session id mismatch"),
        (0x05, "License timer already loaded"),
        (0x06, "License timer loaded out of sequence"),
        (0x07, "VLNV extraction failed"),
        (0x08, "DNA extraction failed"),
    ],
};

static LATE_ERRORS: ErrorTable = ErrorTable {
    no_error: 0x00,
    messages: &[
        (0x00, "No error"),
        (0x01, "License header check failed"),
        (0x02, "License MAC check failed"),
        (0x03, "License DNA does not match the device"),
        (0x04, "License session id mismatch"),
        (0x05, "License timer already loaded"),
        (0x06, "License timer loaded out of sequence"),
        (0x07, "VLNV extraction failed"),
        (0x08, "DNA extraction failed"),
        (0x09, "License does not cover every detected IP"),
        (0x0A, "Metering session not started"),
        (0xFF, "Controller busy"),
    ],
};

const SEQUENTIAL_COMMANDS: CommandCodes = CommandCodes {
    nop: 0x0,
    extract_dna: 0x1,
    extract_vlnv: 0x2,
    activate: 0x3,
    end_session_extract_metering: 0x4,
    extract_metering: None,
    sample_license_timer_counter: None,
    license_timer_init_semaphore_request: None,
};

const ONE_HOT_COMMANDS: CommandCodes = CommandCodes {
    nop: 0x0,
    extract_dna: 1 << 0,
    extract_vlnv: 1 << 1,
    activate: 1 << 2,
    end_session_extract_metering: 1 << 3,
    extract_metering: None,
    sample_license_timer_counter: None,
    license_timer_init_semaphore_request: None,
};

const MID_SESSION_COMMANDS: CommandCodes = CommandCodes {
    extract_metering: Some(1 << 4),
    sample_license_timer_counter: Some(1 << 5),
    ..ONE_HOT_COMMANDS
};

const SEMAPHORE_COMMANDS: CommandCodes = CommandCodes {
    license_timer_init_semaphore_request: Some(1 << 31),
    ..MID_SESSION_COMMANDS
};

const BYTE_INDEX_LANES: LanePlacement = LanePlacement::ByteIndex([0, 1, 2, 3]);
const BIT_SHIFT_LANES: LanePlacement = LanePlacement::BitShift([0, 8, 16, 24]);

const EARLY_FILES: FileGeometry = FileGeometry {
    license_word_width: 4,
    license_header_block: 4,
    license_ip_block: 2,
    metering_word_width: 8,
    trace_file_words: 16,
    mailbox_words: None,
};

const LATE_FILES: FileGeometry = FileGeometry {
    license_word_width: 4,
    license_header_block: 5,
    license_ip_block: 2,
    metering_word_width: 16,
    trace_file_words: 32,
    mailbox_words: None,
};

const V4_STATUS: StatusLayout = StatusLayout {
    dna_ready: BitField::bit(0),
    vlnv_ready: BitField::bit(1),
    activation_done: BitField::bit(2),
    end_session_metering_ready: BitField::bit(4),
    metering_ready: None,
    license_timer_sample_ready: None,
    license_timer_init_semaphore_acknowledged: None,
    metering_enabled: BitField::bit(8),
    license_timer_enabled: BitField::bit(9),
    number_of_license_timers_loaded: BitField::span(12, 4),
    number_of_detected_ips: BitField::span(16, 9),
};

const V6_STATUS: StatusLayout = StatusLayout {
    metering_ready: Some(BitField::bit(5)),
    license_timer_sample_ready: Some(BitField::bit(6)),
    ..V4_STATUS
};

const V7_STATUS: StatusLayout = StatusLayout {
    license_timer_init_semaphore_acknowledged: Some(BitField::bit(7)),
    ..V6_STATUS
};

const V5_REGISTERS: RegisterMap = RegisterMap {
    command: reg(0),
    license_start_address: span(1, 2),
    status: reg(3),
    error: reg(4),
    version: reg(5),
    dna: span(6, 4),
    license_timer: span(10, 12),
    license_timer_counter: span(22, 2),
    license_timer_init_loaded: None,
};

const V6_REGISTERS: RegisterMap = RegisterMap {
    command: reg(0),
    status: reg(1),
    error: reg(2),
    version: reg(3),
    license_start_address: span(4, 2),
    dna: span(6, 4),
    license_timer_counter: span(10, 2),
    license_timer: span(12, 12),
    license_timer_init_loaded: None,
};

const V7_REGISTERS: RegisterMap = RegisterMap {
    license_timer_init_loaded: Some(reg(24)),
    ..V6_REGISTERS
};

static LAYOUT_V3: Layout = Layout {
    register_prefix: "DrmRegisterLine",
    registers: RegisterMap {
        command: reg(0),
        license_start_address: span(1, 2),
        status: reg(3),
        error: reg(4),
        dna: span(5, 4),
        license_timer: span(9, 4),
        license_timer_counter: span(13, 2),
        version: reg(15),
        license_timer_init_loaded: None,
    },
    status: StatusLayout {
        dna_ready: BitField::bit(0),
        vlnv_ready: BitField::bit(1),
        activation_done: BitField::bit(2),
        end_session_metering_ready: BitField::bit(4),
        metering_ready: None,
        license_timer_sample_ready: None,
        license_timer_init_semaphore_acknowledged: None,
        metering_enabled: BitField::bit(5),
        license_timer_enabled: BitField::bit(6),
        number_of_license_timers_loaded: BitField::span(8, 4),
        number_of_detected_ips: BitField::span(16, 8),
    },
    error_lanes: BYTE_INDEX_LANES,
    errors: EARLY_ERRORS,
    commands: SEQUENTIAL_COMMANDS,
    files: EARLY_FILES,
};

static LAYOUT_V4: Layout = Layout {
    register_prefix: "DrmRegisterLine",
    registers: RegisterMap {
        command: reg(0),
        license_start_address: span(1, 2),
        status: reg(3),
        error: reg(4),
        version: reg(5),
        dna: span(6, 4),
        license_timer: span(10, 4),
        license_timer_counter: span(14, 2),
        license_timer_init_loaded: None,
    },
    status: V4_STATUS,
    error_lanes: BYTE_INDEX_LANES,
    errors: EARLY_ERRORS,
    commands: SEQUENTIAL_COMMANDS,
    files: EARLY_FILES,
};

static LAYOUT_V5: Layout = Layout {
    register_prefix: "DrmRegisterLine",
    registers: V5_REGISTERS,
    status: V4_STATUS,
    error_lanes: BIT_SHIFT_LANES,
    errors: LATE_ERRORS,
    commands: ONE_HOT_COMMANDS,
    files: LATE_FILES,
};

static LAYOUT_V6: Layout = Layout {
    register_prefix: "DrmIndexedWord",
    registers: V6_REGISTERS,
    status: V6_STATUS,
    error_lanes: BIT_SHIFT_LANES,
    errors: LATE_ERRORS,
    commands: MID_SESSION_COMMANDS,
    files: FileGeometry {
        mailbox_words: Some(64),
        ..LATE_FILES
    },
};

static LAYOUT_V7: Layout = Layout {
    register_prefix: "DrmIndexedWord",
    registers: V7_REGISTERS,
    status: V7_STATUS,
    error_lanes: BIT_SHIFT_LANES,
    errors: LATE_ERRORS,
    commands: SEMAPHORE_COMMANDS,
    files: FileGeometry {
        mailbox_words: Some(64),
        ..LATE_FILES
    },
};

static LAYOUT_V8: Layout = Layout {
    register_prefix: "DrmIndexedWord",
    registers: V7_REGISTERS,
    status: StatusLayout {
        number_of_license_timers_loaded: BitField::span(10, 6),
        number_of_detected_ips: BitField::span(16, 10),
        ..V7_STATUS
    },
    error_lanes: BIT_SHIFT_LANES,
    errors: LATE_ERRORS,
    commands: SEMAPHORE_COMMANDS,
    files: FileGeometry {
        mailbox_words: Some(128),
        ..LATE_FILES
    },
};
