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

//! Sub-word fields of the command, status and error registers.
//!
//! A [`BitField`] is a `(position, mask)` pair. Where a field sits changes from one hardware
//! generation to the next, so fields are always taken from the resolved generation's layout
//! and never hardcoded by callers. Decoding is pure: nothing in this module talks to the
//! transport.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    pub position: u32,
    /// Mask in register coordinates, i.e. already shifted to `position`.
    pub mask: u32,
}

impl BitField {
    pub const fn new(position: u32, mask: u32) -> Self {
        BitField { position, mask }
    }

    /// A single bit field at `position`.
    pub const fn bit(position: u32) -> Self {
        BitField {
            position,
            mask: 1 << position,
        }
    }

    /// A `width` bit wide field starting at `position`.
    pub const fn span(position: u32, width: u32) -> Self {
        let unshifted = if width >= 32 {
            u32::MAX
        } else {
            (1u32 << width) - 1
        };
        BitField {
            position,
            mask: unshifted << position,
        }
    }

    /// `(register_value & mask) >> position`
    pub const fn read(&self, register_value: u32) -> u32 {
        (register_value & self.mask) >> self.position
    }

    pub const fn is_set(&self, register_value: u32) -> bool {
        self.read(register_value) != 0
    }

    /// Return `register_value` with this field replaced by `value`. Bits of `value` that do
    /// not fit in the field are dropped.
    pub const fn insert(&self, register_value: u32, value: u32) -> u32 {
        (register_value & !self.mask) | ((value << self.position) & self.mask)
    }

    /// The largest value the field can hold.
    pub const fn max_value(&self) -> u32 {
        self.mask >> self.position
    }
}

/// One byte wide lane of the error register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorLane {
    Activation,
    DnaExtract,
    VlnvExtract,
    LicenseTimerLoad,
}

impl ErrorLane {
    pub const ALL: [ErrorLane; 4] = [
        ErrorLane::Activation,
        ErrorLane::DnaExtract,
        ErrorLane::VlnvExtract,
        ErrorLane::LicenseTimerLoad,
    ];

    const fn slot(self) -> usize {
        match self {
            ErrorLane::Activation => 0,
            ErrorLane::DnaExtract => 1,
            ErrorLane::VlnvExtract => 2,
            ErrorLane::LicenseTimerLoad => 3,
        }
    }
}

impl fmt::Display for ErrorLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLane::Activation => write!(f, "activation"),
            ErrorLane::DnaExtract => write!(f, "DNA extract"),
            ErrorLane::VlnvExtract => write!(f, "VLNV extract"),
            ErrorLane::LicenseTimerLoad => write!(f, "license timer load"),
        }
    }
}

/// How a generation describes where each error lane lives.
///
/// Early generations number the lanes by byte index while later ones give the bit shift
/// directly. Both describe the same four byte lanes, indexed in [`ErrorLane`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanePlacement {
    ByteIndex([u8; 4]),
    BitShift([u8; 4]),
}

impl LanePlacement {
    pub const fn field(&self, lane: ErrorLane) -> BitField {
        let shift = match self {
            LanePlacement::ByteIndex(bytes) => bytes[lane.slot()] as u32 * 8,
            LanePlacement::BitShift(shifts) => shifts[lane.slot()] as u32,
        };
        BitField::span(shift, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case::bit0(BitField::bit(0), 0b1011, 1)]
    #[case::bit2(BitField::bit(2), 0b1011, 0)]
    #[case::counter(BitField::span(16, 8), 0x00AB_0000, 0xAB)]
    #[case::counter_ignores_neighbours(BitField::span(16, 8), 0xFF12_FFFF, 0x12)]
    #[case::full_word(BitField::span(0, 32), 0xDEAD_BEEF, 0xDEAD_BEEF)]
    fn test_read(#[case] field: BitField, #[case] raw: u32, #[case] expected: u32) {
        assert_eq!(field.read(raw), expected);
    }

    #[test]
    fn test_read_is_pure() {
        let field = BitField::span(8, 4);
        let raw = 0x0000_0A00;
        assert_eq!(field.read(raw), field.read(raw));
        assert_eq!(field.read(raw), 0xA);
    }

    #[test]
    fn test_insert_preserves_other_bits() {
        let field = BitField::span(12, 4);
        let raw = field.insert(0xFFFF_FFFF, 0x3);
        assert_eq!(raw, 0xFFFF_3FFF);
        assert_eq!(field.read(raw), 3);
        // too wide values are truncated to the field
        assert_eq!(field.read(field.insert(0, 0x1F)), 0xF);
        assert_eq!(field.max_value(), 0xF);
    }

    #[rstest]
    #[case::activation(ErrorLane::Activation, 0x0000_00FF)]
    #[case::dna(ErrorLane::DnaExtract, 0x0000_FF00)]
    #[case::vlnv(ErrorLane::VlnvExtract, 0x00FF_0000)]
    #[case::license_timer(ErrorLane::LicenseTimerLoad, 0xFF00_0000)]
    fn test_lane_placements_agree(#[case] lane: ErrorLane, #[case] mask: u32) {
        let by_index = LanePlacement::ByteIndex([0, 1, 2, 3]).field(lane);
        let by_shift = LanePlacement::BitShift([0, 8, 16, 24]).field(lane);
        assert_eq!(by_index, by_shift);
        assert_eq!(by_index.mask, mask);
    }
}
