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

//! The register and protocol contract shared by every hardware generation.
//!
//! Implementors supply only their [`Layout`]. Every operation is a provided method that reads
//! offsets, bit positions and command codes from that layout, so two generations with the same
//! table behave identically. Asynchronous hardware actions all follow one pattern:
//!
//! ```text
//! write command -> wait for status bit -> read paired error lane -> Ok / Err(Hardware)
//! ```
//!
//! If the status bit never rises the error lane is not read, since it is only valid once the
//! status bit is set, and the caller gets [`DrmError::HardwareTimeout`].

pub mod generation;
pub mod layout;

pub use generation::Generation;
pub use layout::{Command, Layout, StatusField};

use crate::bitfield::{BitField, ErrorLane};
use crate::bus::{Page, PageScope, RegisterBus, RegisterSpan};
use crate::codec::license::{check_license_file_size, minimum_license_file_words};
use crate::codec::metering::{MeteringFile, decode_metering_file, metering_file_words};
use crate::codec::vlnv::{VLNV_WORDS, Vlnv, decode_vlnv_file};
use crate::error::{DrmError, Functionality};
use crate::polling;
use crate::transport::WordTransport;
use crate::version::Version;
use crate::wide_value::WideValue;
use log::{debug, error, trace};
use std::time::Duration;

/// Which metering extraction to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeteringTrigger {
    /// Close the session and extract its final metering file.
    EndSession,
    /// Extract the running metering file without ending the session.
    MidSession,
}

fn register_u64(words: Vec<u32>, register: &str) -> Result<u64, DrmError> {
    let value = WideValue::from(words);
    value
        .as_u64()
        .ok_or_else(|| DrmError::Internal(format!("{register} {value} does not fit in 64 bits")))
}

pub trait DrmStrategy {
    /// The version this strategy describes.
    fn version(&self) -> Version;

    fn layout(&self) -> &'static Layout;

    /// Bank in `page`, refusing pages the generation does not have.
    fn select_page<'b, T: WordTransport>(
        &self,
        bus: &'b mut RegisterBus<T>,
        page: Page,
    ) -> Result<PageScope<'b, T>, DrmError> {
        if !self.layout().supports_page(page) {
            return Err(DrmError::unsupported(format!("the {page} page"), self.version()));
        }
        bus.select_page(self.layout().register_prefix, page)
    }

    fn read_register<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        span: RegisterSpan,
    ) -> Result<Vec<u32>, DrmError> {
        self.select_page(bus, span.page)?.read_span(span)
    }

    fn write_register<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        span: RegisterSpan,
        values: &[u32],
    ) -> Result<(), DrmError> {
        self.select_page(bus, span.page)?.write_span(span, values)
    }

    /// Read the first word of `span`.
    fn read_register_word<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        span: RegisterSpan,
    ) -> Result<u32, DrmError> {
        self.select_page(bus, span.page)?.read_word(span.start)
    }

    /// Read the version register through this strategy's own addressing.
    fn read_version<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<Version, DrmError> {
        let raw = self.read_register_word(bus, self.layout().registers.version)?;
        Ok(Version::from_register(raw))
    }

    fn read_command_register<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<u32, DrmError> {
        self.read_register_word(bus, self.layout().registers.command)
    }

    /// The command currently in the command register, and whether the license timer
    /// semaphore request bit is set alongside it.
    fn read_command<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<(Option<Command>, bool), DrmError> {
        let raw = self.read_command_register(bus)?;
        Ok(self.layout().commands.decode(raw))
    }

    /// Write a raw word to the command register.
    fn write_command_word<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        word: u32,
    ) -> Result<(), DrmError> {
        debug!("DRM controller {}: command word {word:#010x}", self.version());
        let span = self.layout().registers.command;
        self.write_register(bus, span, &[word])
    }

    /// Write `command`. Nothing is written if the generation has no such command.
    fn write_command<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        command: Command,
    ) -> Result<(), DrmError> {
        let code = self.layout().commands.code(command).ok_or_else(|| {
            DrmError::unsupported(format!("the {command} command"), self.version())
        })?;
        debug!("DRM controller {}: {command}", self.version());
        self.write_command_word(bus, code)
    }

    fn read_status_register<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<u32, DrmError> {
        self.read_register_word(bus, self.layout().registers.status)
    }

    fn status_field(&self, field: StatusField) -> Result<BitField, DrmError> {
        self.layout()
            .status
            .field(field)
            .ok_or_else(|| DrmError::unsupported(format!("status field {field}"), self.version()))
    }

    /// Read the status register and decode `field` from it.
    fn read_status<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        field: StatusField,
    ) -> Result<u32, DrmError> {
        let bits = self.status_field(field)?;
        Ok(bits.read(self.read_status_register(bus)?))
    }

    fn read_error_register<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<u32, DrmError> {
        self.read_register_word(bus, self.layout().registers.error)
    }

    fn read_error_code<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        lane: ErrorLane,
    ) -> Result<u8, DrmError> {
        let raw = self.read_error_register(bus)?;
        Ok(self.layout().error_lanes.field(lane).read(raw) as u8)
    }

    fn error_message(&self, code: u8) -> &'static str {
        self.layout().errors.message(code)
    }

    /// Turn `lane` of a raw error register into an outcome.
    fn check_error_lane(&self, error_register: u32, lane: ErrorLane) -> Result<(), DrmError> {
        let code = self.layout().error_lanes.field(lane).read(error_register) as u8;
        if code == self.layout().errors.no_error {
            return Ok(());
        }
        let message = self.error_message(code);
        error!(
            "DRM controller {} {lane} lane reported {code:#04x}: {message}",
            self.version()
        );
        Err(DrmError::Hardware {
            lane,
            code,
            message,
        })
    }

    /// Poll a status field until it equals `expected`.
    ///
    /// # Arguments
    ///
    /// * `bus` - The bus the controller sits on
    /// * `field` - Status field to watch
    /// * `expected` - Decoded value to wait for
    /// * `timeout` - Deadline, counted from the first read
    ///
    /// # Returns: `Result<u32, DrmError>`
    /// * `Ok(u32)` - The field reached `expected`
    /// * `Err(DrmError::HardwareTimeout)` - It did not within `timeout`
    /// * `Err(DrmError::Unsupported)` - The generation has no such field
    /// * `Err(DrmError::Transport)` - A read failed
    fn wait_status<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        field: StatusField,
        expected: u32,
        timeout: Duration,
    ) -> Result<u32, DrmError> {
        let bits = self.status_field(field)?;
        let status = self.layout().registers.status;
        let interval = bus.poll_interval();
        let mut scope = self.select_page(bus, Page::Registers)?;
        polling::wait_field(
            &field.to_string(),
            || scope.read_word(status.start),
            bits,
            expected,
            timeout,
            interval,
        )
    }

    /// Wait for a ready bit, then check the error lane paired with it.
    fn wait_status_and_error<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        field: StatusField,
        lane: ErrorLane,
        timeout: Duration,
    ) -> Result<(), DrmError> {
        self.wait_status(bus, field, 1, timeout)?;
        let raw = self.read_error_register(bus)?;
        self.check_error_lane(raw, lane)
    }

    fn number_of_detected_ips<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<usize, DrmError> {
        Ok(self.read_status(bus, StatusField::NumberOfDetectedIps)? as usize)
    }

    fn number_of_license_timers_loaded<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<u32, DrmError> {
        self.read_status(bus, StatusField::NumberOfLicenseTimersLoaded)
    }

    fn is_enabled<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        functionality: Functionality,
    ) -> Result<bool, DrmError> {
        let field = match functionality {
            Functionality::Metering => StatusField::MeteringEnabled,
            Functionality::LicenseTimer => StatusField::LicenseTimerEnabled,
        };
        Ok(self.read_status(bus, field)? != 0)
    }

    /// Fail with [`DrmError::FunctionalityDisabled`] unless `functionality` is built in.
    fn require_enabled<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        functionality: Functionality,
    ) -> Result<(), DrmError> {
        if !self.is_enabled(bus, functionality)? {
            debug!("DRM controller {}: {functionality} disabled", self.version());
            return Err(DrmError::FunctionalityDisabled(functionality));
        }
        Ok(())
    }

    /// Have the controller extract the device DNA and return it.
    fn extract_dna<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        timeout: Duration,
    ) -> Result<WideValue, DrmError> {
        self.write_command(bus, Command::ExtractDna)?;
        self.wait_status_and_error(bus, StatusField::DnaReady, ErrorLane::DnaExtract, timeout)?;
        let words = self.read_register(bus, self.layout().registers.dna)?;
        Ok(WideValue::from(words))
    }

    /// Have the controller extract the VLNV file. Entry 0 is the controller itself.
    fn extract_vlnv<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        timeout: Duration,
    ) -> Result<Vec<Vlnv>, DrmError> {
        self.write_command(bus, Command::ExtractVlnv)?;
        self.wait_status_and_error(bus, StatusField::VlnvReady, ErrorLane::VlnvExtract, timeout)?;
        let entries = self.number_of_detected_ips(bus)? + 1;
        let words = self
            .select_page(bus, Page::VlnvFile)?
            .read_words(0, entries * VLNV_WORDS)?;
        decode_vlnv_file(&words)
    }

    fn read_license_start_address<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<u64, DrmError> {
        let words = self.read_register(bus, self.layout().registers.license_start_address)?;
        register_u64(words, "license start address")
    }

    fn write_license_start_address<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        address: u64,
    ) -> Result<(), DrmError> {
        let span = self.layout().registers.license_start_address;
        let words = WideValue::from_u128(u128::from(address), span.word_count).into_words();
        self.write_register(bus, span, &words)
    }

    fn minimum_license_file_words(&self) -> usize {
        minimum_license_file_words(&self.layout().files)
    }

    /// Write a license file to the license page.
    ///
    /// The size is checked first. A file that is too short never reaches the transport.
    fn write_license_file<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        license: &[u32],
    ) -> Result<(), DrmError> {
        check_license_file_size(license.len(), &self.layout().files)?;
        trace!("writing {} word license file", license.len());
        self.select_page(bus, Page::LicenseFile)?
            .write_words(0, license)
    }

    /// Write `license` and activate it.
    ///
    /// # Returns: `Result<(), DrmError>`
    /// * `Ok(())` - The controller accepted the license
    /// * `Err(DrmError::LicenseFileSize)` - The license is too short; nothing was written
    /// * `Err(DrmError::HardwareTimeout)` - Activation never completed
    /// * `Err(DrmError::Hardware)` - The activation lane reported an error
    fn activate<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        license: &[u32],
        timeout: Duration,
    ) -> Result<(), DrmError> {
        self.write_license_file(bus, license)?;
        self.write_command(bus, Command::Activate)?;
        self.wait_status_and_error(
            bus,
            StatusField::ActivationDone,
            ErrorLane::Activation,
            timeout,
        )
    }

    /// Load one license timer value.
    ///
    /// On generations with the license timer init semaphore, the semaphore is requested
    /// before the load and released afterwards, also when the load failed. The first error
    /// is the one returned.
    fn load_license_timer<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        timer: &WideValue,
        load_timeout: Duration,
        semaphore_timeout: Duration,
    ) -> Result<(), DrmError> {
        let span = self.layout().registers.license_timer;
        if timer.word_count() != span.word_count {
            return Err(DrmError::Argument(format!(
                "license timer is {} words wide, {} expected",
                timer.word_count(),
                span.word_count
            )));
        }
        self.require_enabled(bus, Functionality::LicenseTimer)?;
        let Some(semaphore) = self.layout().commands.license_timer_init_semaphore_request else {
            return push_license_timer(self, bus, timer, load_timeout);
        };
        let loaded = self
            .write_command_word(bus, self.layout().commands.nop | semaphore)
            .and_then(|_| {
                self.wait_status(
                    bus,
                    StatusField::LicenseTimerInitSemaphoreAcknowledged,
                    1,
                    semaphore_timeout,
                )
            })
            .and_then(|_| push_license_timer(self, bus, timer, load_timeout));
        let released = self.write_command(bus, Command::Nop);
        loaded.and(released)
    }

    fn is_license_timer_init_loaded<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<bool, DrmError> {
        let span = license_timer_init_loaded_span(self)?;
        Ok(self.read_register_word(bus, span)? & 1 != 0)
    }

    /// Set the license timer init loaded bit, then read it back.
    ///
    /// A bit that reads back cleared means the controller was reset in between.
    fn set_license_timer_init_loaded<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<(), DrmError> {
        let span = license_timer_init_loaded_span(self)?;
        self.write_register(bus, span, &[1])?;
        if self.read_register_word(bus, span)? & 1 == 0 {
            error!("DRM controller {}: license timer init loaded bit cleared", self.version());
            return Err(DrmError::LicenseTimerReset);
        }
        Ok(())
    }

    /// The license timer counter. Generations with a sample command latch it first.
    fn sample_license_timer_counter<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        timeout: Duration,
    ) -> Result<u64, DrmError> {
        self.require_enabled(bus, Functionality::LicenseTimer)?;
        if self.layout().commands.sample_license_timer_counter.is_some() {
            self.write_command(bus, Command::SampleLicenseTimerCounter)?;
            self.wait_status(bus, StatusField::LicenseTimerSampleReady, 1, timeout)?;
        }
        let words = self.read_register(bus, self.layout().registers.license_timer_counter)?;
        register_u64(words, "license timer counter")
    }

    /// Extract and decode the metering file.
    ///
    /// # Arguments
    ///
    /// * `bus` - The bus the controller sits on
    /// * `trigger` - End of session or mid session extraction
    /// * `timeout` - How long to wait for the metering ready bit
    ///
    /// # Returns: `Result<MeteringFile, DrmError>`
    /// * `Ok(MeteringFile)` - The decoded file
    /// * `Err(DrmError::FunctionalityDisabled)` - Metering is not built in; no command written
    /// * `Err(DrmError::Unsupported)` - Mid session extraction on a generation without it
    /// * `Err(DrmError::HardwareTimeout)` - The ready bit never rose
    fn extract_metering_file<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        trigger: MeteringTrigger,
        timeout: Duration,
    ) -> Result<MeteringFile, DrmError> {
        let (command, ready) = match trigger {
            MeteringTrigger::EndSession => (
                Command::EndSessionExtractMetering,
                StatusField::EndSessionMeteringReady,
            ),
            MeteringTrigger::MidSession => (Command::ExtractMetering, StatusField::MeteringReady),
        };
        if self.layout().commands.code(command).is_none() {
            return Err(DrmError::unsupported(
                "mid session metering extraction",
                self.version(),
            ));
        }
        self.status_field(ready)?;
        self.require_enabled(bus, Functionality::Metering)?;
        let number_of_ips = self.number_of_detected_ips(bus)?;
        self.write_command(bus, command)?;
        self.wait_status(bus, ready, 1, timeout)?;
        let width = self.layout().files.metering_word_width;
        let words = self
            .select_page(bus, Page::MeteringFile)?
            .read_words(0, metering_file_words(number_of_ips, width))?;
        decode_metering_file(&words, number_of_ips, width)
    }

    fn read_mailbox<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        start: usize,
        count: usize,
    ) -> Result<Vec<u32>, DrmError> {
        check_mailbox_range(self, start, count)?;
        self.select_page(bus, Page::MailboxFile)?
            .read_words(start, count)
    }

    fn write_mailbox<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
        start: usize,
        words: &[u32],
    ) -> Result<(), DrmError> {
        check_mailbox_range(self, start, words.len())?;
        self.select_page(bus, Page::MailboxFile)?
            .write_words(start, words)
    }

    fn read_trace_file<T: WordTransport>(
        &self,
        bus: &mut RegisterBus<T>,
    ) -> Result<Vec<u32>, DrmError> {
        let words = self.layout().files.trace_file_words;
        self.select_page(bus, Page::TraceFile)?.read_words(0, words)
    }
}

fn push_license_timer<S, T>(
    strategy: &S,
    bus: &mut RegisterBus<T>,
    timer: &WideValue,
    timeout: Duration,
) -> Result<(), DrmError>
where
    S: DrmStrategy + ?Sized,
    T: WordTransport,
{
    let counter = strategy.status_field(StatusField::NumberOfLicenseTimersLoaded)?;
    let before = strategy.number_of_license_timers_loaded(bus)?;
    let expected = (before + 1) & counter.max_value();
    strategy.write_register(bus, strategy.layout().registers.license_timer, timer.words())?;
    strategy.wait_status(
        bus,
        StatusField::NumberOfLicenseTimersLoaded,
        expected,
        timeout,
    )?;
    let raw = strategy.read_error_register(bus)?;
    strategy.check_error_lane(raw, ErrorLane::LicenseTimerLoad)
}

fn license_timer_init_loaded_span<S: DrmStrategy + ?Sized>(
    strategy: &S,
) -> Result<RegisterSpan, DrmError> {
    strategy
        .layout()
        .registers
        .license_timer_init_loaded
        .ok_or_else(|| {
            DrmError::unsupported("the license timer init loaded register", strategy.version())
        })
}

fn check_mailbox_range<S: DrmStrategy + ?Sized>(
    strategy: &S,
    start: usize,
    count: usize,
) -> Result<(), DrmError> {
    let size = strategy
        .layout()
        .files
        .mailbox_words
        .ok_or_else(|| DrmError::unsupported("the mailbox", strategy.version()))?;
    match start.checked_add(count) {
        Some(end) if end <= size => Ok(()),
        _ => Err(DrmError::Argument(format!(
            "mailbox words {start}..{start}+{count} fall outside the {size} word mailbox"
        ))),
    }
}
