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

//! Wait for a register field to reach a value.
//!
//! Every multi step hardware action ends in a poll of some status field. Polling is a plain
//! read, compare, sleep loop on the calling thread. The only way out besides a match is the
//! deadline; there is no external cancellation.

use crate::bitfield::BitField;
use crate::error::DrmError;
use log::debug;
use std::thread;
use std::time::{Duration, Instant};

/// Lower bound on the sleep between two polls, so a zero interval still yields the CPU.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_micros(1);

/// Poll `field` of the register returned by `read_register` until it equals `expected`.
///
/// The register is read before the deadline is checked, so a `timeout` of zero performs
/// exactly one read, and a field that already matches returns without sleeping.
///
/// # Arguments
///
/// * `field_name` - Used in logs and in the timeout error
/// * `read_register` - Reads the raw register that owns `field`
/// * `field` - The field to decode from each read
/// * `expected` - The decoded value to wait for
/// * `timeout` - How long to keep polling after the first read. A timeout too large to
///   represent as a deadline never expires
/// * `interval` - Sleep between two reads
///
/// # Returns: `Result<u32, DrmError>`
/// * `Ok(u32)` - The decoded field, equal to `expected`
/// * `Err(DrmError::HardwareTimeout)` - The deadline passed without a match
/// * `Err(DrmError::Transport)` - A read failed; returned at once, without waiting
pub fn wait_field<F>(
    field_name: &str,
    mut read_register: F,
    field: BitField,
    expected: u32,
    timeout: Duration,
    interval: Duration,
) -> Result<u32, DrmError>
where
    F: FnMut() -> Result<u32, DrmError>,
{
    // None when the deadline lies beyond what Instant can represent: poll until a match.
    let deadline = Instant::now().checked_add(timeout);
    let interval = interval.max(MIN_POLL_INTERVAL);
    let mut polls: u64 = 0;
    loop {
        let actual = field.read(read_register()?);
        polls += 1;
        if actual == expected {
            debug!("{field_name} reached {expected} after {polls} poll(s)");
            return Ok(actual);
        }
        let now = Instant::now();
        let remaining = match deadline {
            Some(deadline) if now >= deadline => {
                debug!("{field_name} still {actual} after {polls} poll(s), giving up");
                return Err(DrmError::HardwareTimeout {
                    field: field_name.to_string(),
                    expected,
                    actual,
                    timeout,
                });
            }
            Some(deadline) => deadline - now,
            None => interval,
        };
        thread::sleep(interval.min(remaining));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    const READY: BitField = BitField::bit(3);

    #[test]
    fn test_already_matching_returns_after_one_read() {
        let mut reads = 0;
        let start = Instant::now();
        let result = wait_field(
            "ready",
            || {
                reads += 1;
                Ok(0b1000)
            },
            READY,
            1,
            Duration::from_secs(10),
            Duration::from_secs(10),
        );
        assert_eq!(result.unwrap(), 1);
        assert_eq!(reads, 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_transport_error_is_not_waited_out() {
        let mut reads = 0;
        let start = Instant::now();
        let result = wait_field(
            "ready",
            || {
                reads += 1;
                Err(DrmError::Transport {
                    register: "status".into(),
                    code: 0x5,
                })
            },
            READY,
            1,
            Duration::from_secs(10),
            Duration::from_millis(1),
        );
        assert_eq!(result.unwrap_err().transport_code(), Some(0x5));
        assert_eq!(reads, 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_zero_timeout_reads_once() {
        let mut reads = 0;
        let result = wait_field(
            "ready",
            || {
                reads += 1;
                Ok(0)
            },
            READY,
            1,
            Duration::ZERO,
            Duration::from_millis(1),
        );
        assert!(matches!(
            result,
            Err(DrmError::HardwareTimeout {
                expected: 1,
                actual: 0,
                ..
            })
        ));
        assert_eq!(reads, 1);
    }

    #[test]
    fn test_matches_after_a_few_polls() {
        let mut reads = 0;
        let result = wait_field(
            "counter",
            || {
                reads += 1;
                Ok(BitField::span(8, 4).insert(0, reads))
            },
            BitField::span(8, 4),
            3,
            Duration::from_secs(5),
            Duration::from_micros(10),
        );
        assert_eq!(result.unwrap(), 3);
        assert_eq!(reads, 3);
    }

    #[test]
    fn test_unbounded_timeout_does_not_overflow() {
        let mut reads = 0;
        let result = wait_field(
            "ready",
            || {
                reads += 1;
                Ok(0b1000)
            },
            READY,
            1,
            Duration::MAX,
            Duration::from_millis(1),
        );
        assert_eq!(result.unwrap(), 1);
        assert_eq!(reads, 1);
    }

    #[test]
    fn test_unbounded_timeout_keeps_polling() {
        let mut reads = 0;
        let result = wait_field(
            "counter",
            || {
                reads += 1;
                Ok(BitField::span(8, 4).insert(0, reads))
            },
            BitField::span(8, 4),
            4,
            Duration::MAX,
            Duration::from_micros(10),
        );
        assert_eq!(result.unwrap(), 4);
        assert_eq!(reads, 4);
    }

    #[gtest]
    fn test_timeout_names_the_field() {
        let result = wait_field(
            "ActivationDone",
            || Ok(0),
            READY,
            1,
            Duration::from_millis(2),
            Duration::from_micros(200),
        );
        expect_that!(
            result,
            err(displays_as(contains_substring(
                "DrmError::HardwareTimeout: ActivationDone"
            )))
        );
    }
}
