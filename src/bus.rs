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

//! Paged, word indexed addressing on top of a [`WordTransport`].
//!
//! The controller multiplexes several register files onto one small indexed range. A page
//! selector register picks which file the indexed words currently show, and the indexed words
//! themselves are named `<prefix><index>` where the prefix depends on the hardware generation:
//!
//! ```text
//!   DrmPageRegister  <- Page::MeteringFile (4)
//!   DrmRegisterLine0 -> metering word 0
//!   DrmRegisterLine1 -> metering word 1
//!   ...
//! ```
//!
//! The page selector is a single cursor shared by everything talking to the controller, so
//! indexed access is only possible through a [`PageScope`], which can only be obtained by
//! writing the selector with [`RegisterBus::select_page`]. Selections are never cached: every
//! scope writes the selector again.
//!
//! Multi word accesses stop at the first failing word and return that transport status
//! unchanged. Words already transferred are not rolled back.

use crate::config::ControllerConfig;
use crate::error::DrmError;
use crate::transport::WordTransport;
use log::trace;
use std::fmt;
use std::time::Duration;

/// Banked address spaces behind the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Page {
    Registers = 0,
    VlnvFile = 1,
    LicenseFile = 2,
    TraceFile = 3,
    MeteringFile = 4,
    /// Only present from generation 6 onwards.
    MailboxFile = 5,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Registers,
        Page::VlnvFile,
        Page::LicenseFile,
        Page::TraceFile,
        Page::MeteringFile,
        Page::MailboxFile,
    ];

    pub const fn selector_value(self) -> u32 {
        self as u32
    }

    pub fn from_selector_value(value: u32) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.selector_value() == value)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Registers => "registers",
            Page::VlnvFile => "VLNV file",
            Page::LicenseFile => "license file",
            Page::TraceFile => "trace file",
            Page::MeteringFile => "metering file",
            Page::MailboxFile => "mailbox file",
        };
        write!(f, "{name}")
    }
}

/// A logical register: `word_count` contiguous words starting at `start` on `page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterSpan {
    pub page: Page,
    pub start: usize,
    pub word_count: usize,
}

impl RegisterSpan {
    pub const fn new(page: Page, start: usize, word_count: usize) -> Self {
        RegisterSpan {
            page,
            start,
            word_count,
        }
    }

    /// A one word register on the registers page.
    pub const fn register(start: usize) -> Self {
        RegisterSpan::new(Page::Registers, start, 1)
    }

    /// Index one past the last word.
    pub const fn end(&self) -> usize {
        self.start + self.word_count
    }
}

/// Compose the transport name of indexed word `index`.
pub fn indexed_name(prefix: &str, index: usize) -> String {
    format!("{prefix}{index}")
}

/// Owns the word transport together with the settings every access needs.
#[derive(Debug)]
pub struct RegisterBus<T> {
    transport: T,
    page_register_name: String,
    poll_interval: Duration,
}

impl<T: WordTransport> RegisterBus<T> {
    pub fn new(transport: T, config: &ControllerConfig) -> Self {
        RegisterBus {
            transport,
            page_register_name: config.page_register_name.clone(),
            poll_interval: config.poll_interval,
        }
    }

    pub fn page_register_name(&self) -> &str {
        &self.page_register_name
    }

    /// Sleep between two reads while polling a field.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Read the page selector without changing it.
    pub fn read_page_selector(&mut self) -> Result<u32, DrmError> {
        let name = self.page_register_name.clone();
        read_named(&mut self.transport, &name)
    }

    /// Write the page selector and hand out an accessor for the words of `page`.
    ///
    /// # Arguments
    ///
    /// * `prefix` - The generation's indexed word prefix
    /// * `page` - The page to bank in
    ///
    /// # Returns: `Result<PageScope<'_, T>, DrmError>`
    /// * `Ok(PageScope)` - Accessor bound to `page`
    /// * `Err(DrmError::Transport)` - Writing the page selector failed
    pub fn select_page(
        &mut self,
        prefix: &'static str,
        page: Page,
    ) -> Result<PageScope<'_, T>, DrmError> {
        trace!("selecting {page} page");
        let name = self.page_register_name.clone();
        write_named(&mut self.transport, &name, page.selector_value())?;
        Ok(PageScope {
            transport: &mut self.transport,
            prefix,
            page,
        })
    }
}

/// Indexed word access to the page most recently written to the selector.
///
/// Holding a scope borrows the bus mutably, so nothing else can move the selector while the
/// scope is alive.
pub struct PageScope<'a, T> {
    transport: &'a mut T,
    prefix: &'static str,
    page: Page,
}

impl<T: WordTransport> PageScope<'_, T> {
    pub fn page(&self) -> Page {
        self.page
    }

    pub fn read_word(&mut self, index: usize) -> Result<u32, DrmError> {
        read_named(self.transport, &indexed_name(self.prefix, index))
    }

    pub fn write_word(&mut self, index: usize, value: u32) -> Result<(), DrmError> {
        write_named(self.transport, &indexed_name(self.prefix, index), value)
    }

    /// Read `count` words from `start` onwards, stopping at the first failure.
    pub fn read_words(&mut self, start: usize, count: usize) -> Result<Vec<u32>, DrmError> {
        let mut words = Vec::with_capacity(count);
        for index in start..start + count {
            words.push(self.read_word(index)?);
        }
        Ok(words)
    }

    /// Write `values` from `start` onwards, stopping at the first failure.
    pub fn write_words(&mut self, start: usize, values: &[u32]) -> Result<(), DrmError> {
        for (offset, value) in values.iter().enumerate() {
            self.write_word(start + offset, *value)?;
        }
        Ok(())
    }

    pub fn read_span(&mut self, span: RegisterSpan) -> Result<Vec<u32>, DrmError> {
        self.check_page(span)?;
        self.read_words(span.start, span.word_count)
    }

    /// Write a logical register. `values` must be exactly as wide as the span.
    pub fn write_span(&mut self, span: RegisterSpan, values: &[u32]) -> Result<(), DrmError> {
        self.check_page(span)?;
        if values.len() != span.word_count {
            return Err(DrmError::Argument(format!(
                "{} words given for a {} word register",
                values.len(),
                span.word_count
            )));
        }
        self.write_words(span.start, values)
    }

    fn check_page(&self, span: RegisterSpan) -> Result<(), DrmError> {
        if span.page != self.page {
            return Err(DrmError::Internal(format!(
                "register on the {} page accessed while the {} page is selected",
                span.page, self.page
            )));
        }
        Ok(())
    }
}

fn read_named<T: WordTransport + ?Sized>(transport: &mut T, name: &str) -> Result<u32, DrmError> {
    match transport.read_word(name) {
        Ok(value) => {
            trace!("read {name} = {value:#010x}");
            Ok(value)
        }
        Err(status) => Err(DrmError::Transport {
            register: name.to_string(),
            code: status.code(),
        }),
    }
}

fn write_named<T: WordTransport + ?Sized>(
    transport: &mut T,
    name: &str,
    value: u32,
) -> Result<(), DrmError> {
    trace!("write {name} = {value:#010x}");
    transport
        .write_word(name, value)
        .map_err(|status| DrmError::Transport {
            register: name.to_string(),
            code: status.code(),
        })
}
