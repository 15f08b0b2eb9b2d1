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

//! The boundary to whatever actually moves 32 bit words to and from the controller.
//!
//! The HAL never touches a bus itself. Callers provide a [`WordTransport`], typically a thin
//! wrapper over an AXI-4-Lite bridge, which reads and writes words identified by name. A
//! non-zero status from the transport is an opaque error code: it is never interpreted, only
//! handed back to the caller inside [`DrmError::Transport`](crate::error::DrmError::Transport).
//!
//! Transports built from a pair of C style callbacks can use [`FnTransport`].
//!
//! # Examples
//!
//! ```rust,no_run
//! # use drm_hal::transport::{FnTransport, WordTransport};
//! let mut transport = FnTransport::new(
//!     |name: &str| -> (u32, u32) { (0, 0) },
//!     |name: &str, value: u32| -> u32 { 0 },
//! );
//! let page = transport.read_word("DrmPageRegister");
//! ```

use std::num::NonZeroU32;

/// A non-zero status code returned by a word transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportStatus(NonZeroU32);

impl TransportStatus {
    /// Wrap a raw status, returning `None` for the success value `0`.
    pub fn new(code: u32) -> Option<Self> {
        NonZeroU32::new(code).map(TransportStatus)
    }

    pub const fn from_nonzero(code: NonZeroU32) -> Self {
        TransportStatus(code)
    }

    pub fn code(&self) -> u32 {
        self.0.get()
    }
}

/// Read and write named 32 bit words.
pub trait WordTransport {
    /// Read the word called `name`.
    ///
    /// # Returns: `Result<u32, TransportStatus>`
    /// * `Ok(u32)` - The current word value
    /// * `Err(TransportStatus)` - The transport's non-zero status
    fn read_word(&mut self, name: &str) -> Result<u32, TransportStatus>;

    /// Write `value` to the word called `name`.
    ///
    /// # Returns: `Result<(), TransportStatus>`
    /// * `Ok(())` - The word was written
    /// * `Err(TransportStatus)` - The transport's non-zero status
    fn write_word(&mut self, name: &str, value: u32) -> Result<(), TransportStatus>;
}

impl<T: WordTransport + ?Sized> WordTransport for &mut T {
    fn read_word(&mut self, name: &str) -> Result<u32, TransportStatus> {
        (**self).read_word(name)
    }

    fn write_word(&mut self, name: &str, value: u32) -> Result<(), TransportStatus> {
        (**self).write_word(name, value)
    }
}

impl<T: WordTransport + ?Sized> WordTransport for Box<T> {
    fn read_word(&mut self, name: &str) -> Result<u32, TransportStatus> {
        (**self).read_word(name)
    }

    fn write_word(&mut self, name: &str, value: u32) -> Result<(), TransportStatus> {
        (**self).write_word(name, value)
    }
}

/// Adapts a `(read, write)` callback pair that reports status codes C style, with `0`
/// meaning success, into a [`WordTransport`].
pub struct FnTransport<R, W> {
    read: R,
    write: W,
}

impl<R, W> FnTransport<R, W>
where
    R: FnMut(&str) -> (u32, u32),
    W: FnMut(&str, u32) -> u32,
{
    /// # Arguments
    ///
    /// * `read` - Returns `(value, status)` for a word name
    /// * `write` - Writes a word and returns its status
    pub fn new(read: R, write: W) -> Self {
        FnTransport { read, write }
    }
}

impl<R, W> WordTransport for FnTransport<R, W>
where
    R: FnMut(&str) -> (u32, u32),
    W: FnMut(&str, u32) -> u32,
{
    fn read_word(&mut self, name: &str) -> Result<u32, TransportStatus> {
        let (value, status) = (self.read)(name);
        match TransportStatus::new(status) {
            None => Ok(value),
            Some(status) => Err(status),
        }
    }

    fn write_word(&mut self, name: &str, value: u32) -> Result<(), TransportStatus> {
        match TransportStatus::new((self.write)(name, value)) {
            None => Ok(()),
            Some(status) => Err(status),
        }
    }
}
