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

//! The metering file.
//!
//! The file is made of `2 + N` blocks of `W` words each, where `N` is the number of detected
//! IPs and `W` the generation's metering word width:
//!
//! ```text
//! block 0       | session hi | session lo | flags/env | segment | license timer count (W-4) |
//! block 1..=N   | metering data of IP k (W words)                                          |
//! block N+1     | MAC (W words)                                                            |
//! ```
//!
//! The flags/env word carries the encrypted flag in bit 31, the end of session flag in bit 30
//! and the environment id in bits 15:0. The MAC is opaque and never verified here.

use crate::bitfield::BitField;
use crate::error::DrmError;
use crate::wide_value::WideValue;

pub const METERING_HEADER_WORDS: usize = 4;
/// Blocks besides the per IP ones: the header block and the MAC.
pub const METERING_ADDITIONAL_BLOCKS: usize = 2;

pub const ENCRYPTED_FLAG: BitField = BitField::bit(31);
pub const END_SESSION_FLAG: BitField = BitField::bit(30);
pub const ENVIRONMENT_ID: BitField = BitField::span(0, 16);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeteringHeader {
    pub session_id: u64,
    pub encrypted: bool,
    pub end_session: bool,
    pub environment_id: u16,
    pub segment_index: u32,
}

impl MeteringHeader {
    fn from_words(words: &[u32]) -> Self {
        let flags = words[2];
        MeteringHeader {
            session_id: (u64::from(words[0]) << 32) | u64::from(words[1]),
            encrypted: ENCRYPTED_FLAG.is_set(flags),
            end_session: END_SESSION_FLAG.is_set(flags),
            environment_id: ENVIRONMENT_ID.read(flags) as u16,
            segment_index: words[3],
        }
    }

    fn to_words(&self) -> [u32; METERING_HEADER_WORDS] {
        let mut flags = ENVIRONMENT_ID.insert(0, u32::from(self.environment_id));
        flags = ENCRYPTED_FLAG.insert(flags, u32::from(self.encrypted));
        flags = END_SESSION_FLAG.insert(flags, u32::from(self.end_session));
        [
            (self.session_id >> 32) as u32,
            self.session_id as u32,
            flags,
            self.segment_index,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeteringFile {
    pub header: MeteringHeader,
    /// `W - 4` words.
    pub license_timer_count: WideValue,
    /// One `W` word block per detected IP, in IP order.
    pub ip_blocks: Vec<WideValue>,
    /// `W` words.
    pub mac: WideValue,
}

/// Total length in words of a metering file for `number_of_ips` IPs.
pub fn metering_file_words(number_of_ips: usize, word_width: usize) -> usize {
    (METERING_ADDITIONAL_BLOCKS + number_of_ips) * word_width
}

fn check_word_width(word_width: usize) -> Result<(), DrmError> {
    if word_width <= METERING_HEADER_WORDS {
        return Err(DrmError::Argument(format!(
            "metering word width {word_width} leaves no room after the {METERING_HEADER_WORDS} word header"
        )));
    }
    Ok(())
}

/// Split a raw metering file into its regions.
///
/// # Arguments
///
/// * `words` - The metering file page, exactly `(2 + number_of_ips) × word_width` words
/// * `number_of_ips` - Detected IP count, as reported by the status register
/// * `word_width` - The generation's metering word width
///
/// # Returns: `Result<MeteringFile, DrmError>`
/// * `Ok(MeteringFile)` - The decoded file
/// * `Err(DrmError::Argument)` - The length does not match the geometry
pub fn decode_metering_file(
    words: &[u32],
    number_of_ips: usize,
    word_width: usize,
) -> Result<MeteringFile, DrmError> {
    check_word_width(word_width)?;
    let expected = metering_file_words(number_of_ips, word_width);
    if words.len() != expected {
        return Err(DrmError::Argument(format!(
            "metering file holds {} words, {expected} expected for {number_of_ips} IP(s)",
            words.len()
        )));
    }
    let mut blocks = words.chunks_exact(word_width);
    let mut file = MeteringFile::default();
    if let Some(first) = blocks.next() {
        file.header = MeteringHeader::from_words(first);
        file.license_timer_count = WideValue::from(first[METERING_HEADER_WORDS..].to_vec());
    }
    file.ip_blocks = blocks
        .by_ref()
        .take(number_of_ips)
        .map(|b| WideValue::from(b.to_vec()))
        .collect();
    if let Some(mac) = blocks.next() {
        file.mac = WideValue::from(mac.to_vec());
    }
    Ok(file)
}

/// The inverse of [`decode_metering_file`]. Every region must be exactly as wide as the
/// geometry asks.
pub fn encode_metering_file(file: &MeteringFile, word_width: usize) -> Result<Vec<u32>, DrmError> {
    check_word_width(word_width)?;
    let count_width = word_width - METERING_HEADER_WORDS;
    if file.license_timer_count.word_count() != count_width {
        return Err(DrmError::Argument(format!(
            "license timer count is {} words wide, {count_width} expected",
            file.license_timer_count.word_count()
        )));
    }
    if let Some((index, block)) = file
        .ip_blocks
        .iter()
        .enumerate()
        .find(|(_, b)| b.word_count() != word_width)
    {
        return Err(DrmError::Argument(format!(
            "metering block of IP {index} is {} words wide, {word_width} expected",
            block.word_count()
        )));
    }
    if file.mac.word_count() != word_width {
        return Err(DrmError::Argument(format!(
            "MAC is {} words wide, {word_width} expected",
            file.mac.word_count()
        )));
    }
    let mut words = Vec::with_capacity(metering_file_words(file.ip_blocks.len(), word_width));
    words.extend_from_slice(&file.header.to_words());
    words.extend_from_slice(file.license_timer_count.words());
    for block in &file.ip_blocks {
        words.extend_from_slice(block.words());
    }
    words.extend_from_slice(file.mac.words());
    Ok(words)
}
