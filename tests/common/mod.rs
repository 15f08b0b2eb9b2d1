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

use drm_hal::bus::Page;
use drm_hal::codec::Vlnv;
use drm_hal::config::PAGE_REGISTER_NAME;
use drm_hal::simulation::{Access, SimulatedDrmController};
use drm_hal::{ControllerConfig, DrmController};
use rstest::*;
use std::time::Duration;

/// Test configuration: quick polling and short timeouts, with logging set up once.
///
/// Run with `RUST_LOG=trace` to see every simulated bus access.
#[fixture]
pub fn config() -> ControllerConfig {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut config = ControllerConfig {
        poll_interval: Duration::from_micros(10),
        ..ControllerConfig::default()
    };
    config.timeouts.activation = Duration::from_millis(20);
    config.timeouts.dna_extract = Duration::from_millis(20);
    config.timeouts.metering_extract = Duration::from_millis(20);
    config.timeouts.license_timer_load = Duration::from_millis(20);
    config.timeouts.semaphore = Duration::from_millis(20);
    config
}

pub fn controller(
    sim: SimulatedDrmController,
    config: ControllerConfig,
) -> DrmController<SimulatedDrmController> {
    let mut controller = DrmController::new(sim, config).unwrap();
    controller.bus_mut().transport_mut().clear_accesses();
    controller
}

pub fn ips(n: u16) -> Vec<Vlnv> {
    (1..=n).map(|i| Vlnv::new(0x00A1, 0x0002, i, 0x0001)).collect()
}

/// An indexed access, tagged with the page selected when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagedAccess {
    Read { page: Page, index: usize },
    Write { page: Page, index: usize, value: u32 },
}

/// Replay `accesses`, tracking the page selector, and return the indexed accesses only.
pub fn paged_accesses(accesses: &[Access], prefix: &str) -> Vec<PagedAccess> {
    let mut page = Page::Registers;
    let index_of = |name: &str| name.strip_prefix(prefix).and_then(|i| i.parse().ok());
    let mut paged = Vec::new();
    for access in accesses {
        match access {
            Access::Write { name, value } if name == PAGE_REGISTER_NAME => {
                page = Page::from_selector_value(*value).unwrap();
            }
            Access::Write { name, value } => {
                if let Some(index) = index_of(name) {
                    paged.push(PagedAccess::Write {
                        page,
                        index,
                        value: *value,
                    });
                }
            }
            Access::Read { name } => {
                if let Some(index) = index_of(name) {
                    paged.push(PagedAccess::Read { page, index });
                }
            }
        }
    }
    paged
}

/// Writes to the command register, in order.
pub fn command_writes(
    controller: &mut DrmController<SimulatedDrmController>,
) -> Vec<u32> {
    let layout = controller.layout();
    let command = layout.registers.command.start;
    let accesses = controller.bus_mut().transport_mut().accesses().to_vec();
    paged_accesses(&accesses, layout.register_prefix)
        .into_iter()
        .filter_map(|a| match a {
            PagedAccess::Write {
                page: Page::Registers,
                index,
                value,
            } if index == command => Some(value),
            _ => None,
        })
        .collect()
}
