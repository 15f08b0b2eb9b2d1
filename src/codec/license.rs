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

//! The license file: one header block followed by one block per activated IP.
//!
//! Block sizes are counted in license words, each `license_word_width` bus words wide. The
//! header starts with the 64 bit session id. Everything else is encrypted license material
//! that this crate only carries around.

use crate::error::DrmError;
use crate::strategy::layout::FileGeometry;

/// Bus words taken by the session id at the start of the header.
pub const SESSION_ID_WORDS: usize = 2;

pub fn header_block_words(geometry: &FileGeometry) -> usize {
    geometry.license_header_block * geometry.license_word_width
}

pub fn ip_block_words(geometry: &FileGeometry) -> usize {
    geometry.license_ip_block * geometry.license_word_width
}

/// `(header_block + ip_block) × license_word_width`
pub fn minimum_license_file_words(geometry: &FileGeometry) -> usize {
    header_block_words(geometry) + ip_block_words(geometry)
}

/// Refuse license files that cannot hold a header and at least one IP block.
pub fn check_license_file_size(length: usize, geometry: &FileGeometry) -> Result<(), DrmError> {
    let minimum = minimum_license_file_words(geometry);
    if length < minimum {
        return Err(DrmError::LicenseFileSize { length, minimum });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LicenseHeader {
    pub session_id: u64,
    /// Header words after the session id. Shorter payloads are zero padded.
    pub payload: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LicenseIpBlock {
    /// Shorter payloads are zero padded.
    pub payload: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LicenseFile {
    pub header: LicenseHeader,
    pub ip_blocks: Vec<LicenseIpBlock>,
}

fn padded(payload: &[u32], block_words: usize, what: &str) -> Result<Vec<u32>, DrmError> {
    if payload.len() > block_words {
        return Err(DrmError::Argument(format!(
            "{what} payload holds {} words but the block only has room for {block_words}",
            payload.len()
        )));
    }
    let mut block = payload.to_vec();
    block.resize(block_words, 0);
    Ok(block)
}

/// Lay a license file out in bus words.
///
/// # Returns: `Result<Vec<u32>, DrmError>`
/// * `Ok(Vec<u32>)` - Header block followed by the IP blocks
/// * `Err(DrmError::LicenseFileSize)` - No IP block was given
/// * `Err(DrmError::Argument)` - A payload does not fit its block
pub fn encode_license_file(
    file: &LicenseFile,
    geometry: &FileGeometry,
) -> Result<Vec<u32>, DrmError> {
    let header_words = header_block_words(geometry);
    let ip_words = ip_block_words(geometry);
    let mut words = Vec::with_capacity(header_words + ip_words * file.ip_blocks.len());
    words.push((file.header.session_id >> 32) as u32);
    words.push(file.header.session_id as u32);
    words.extend(padded(
        &file.header.payload,
        header_words.saturating_sub(SESSION_ID_WORDS),
        "header",
    )?);
    for (index, block) in file.ip_blocks.iter().enumerate() {
        words.extend(padded(&block.payload, ip_words, &format!("IP {index}"))?);
    }
    check_license_file_size(words.len(), geometry)?;
    Ok(words)
}

/// Split a license file into header and IP blocks. Payloads come back at full block size.
pub fn decode_license_file(
    words: &[u32],
    geometry: &FileGeometry,
) -> Result<LicenseFile, DrmError> {
    check_license_file_size(words.len(), geometry)?;
    let header_words = header_block_words(geometry);
    let ip_words = ip_block_words(geometry);
    let (header, blocks) = words.split_at(header_words);
    if blocks.len() % ip_words != 0 {
        return Err(DrmError::Argument(format!(
            "{} words after the header do not split into {ip_words} word IP blocks",
            blocks.len()
        )));
    }
    Ok(LicenseFile {
        header: LicenseHeader {
            session_id: (u64::from(header[0]) << 32) | u64::from(header[1]),
            payload: header[SESSION_ID_WORDS..].to_vec(),
        },
        ip_blocks: blocks
            .chunks_exact(ip_words)
            .map(|b| LicenseIpBlock {
                payload: b.to_vec(),
            })
            .collect(),
    })
}
