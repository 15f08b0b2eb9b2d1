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

//! Values wider than one bus word, such as the 128 bit DNA or the 384 bit license timer.
//!
//! Words are stored most significant first: `words()[0]` holds the top 32 bits and is the
//! word found at the lowest register index.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct WideValue {
    words: Vec<u32>,
}

impl WideValue {
    pub fn from_words(words: Vec<u32>) -> Self {
        WideValue { words }
    }

    pub fn zeroed(word_count: usize) -> Self {
        WideValue {
            words: vec![0; word_count],
        }
    }

    /// Split `value` into `word_count` words, most significant first.
    pub fn from_u128(value: u128, word_count: usize) -> Self {
        let words = (0..word_count)
            .rev()
            .map(|i| if i < 4 { (value >> (32 * i)) as u32 } else { 0 })
            .collect();
        WideValue { words }
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn into_words(self) -> Vec<u32> {
        self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn bit_width(&self) -> usize {
        self.words.len() * 32
    }

    /// The value as a `u128`, or `None` if any bit above 127 is set.
    pub fn as_u128(&self) -> Option<u128> {
        let split = self.words.len().saturating_sub(4);
        if self.words[..split].iter().any(|w| *w != 0) {
            return None;
        }
        Some(
            self.words[split..]
                .iter()
                .fold(0u128, |acc, w| (acc << 32) | u128::from(*w)),
        )
    }

    /// The value as a `u64`, or `None` if any bit above 63 is set.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_u128().and_then(|v| u64::try_from(v).ok())
    }
}

impl From<Vec<u32>> for WideValue {
    fn from(words: Vec<u32>) -> Self {
        WideValue::from_words(words)
    }
}

impl fmt::Display for WideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in &self.words {
            write!(f, "{word:08X}")?;
        }
        Ok(())
    }
}
