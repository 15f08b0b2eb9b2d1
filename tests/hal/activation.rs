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

use crate::common::{PagedAccess, config, controller, paged_accesses};
use drm_hal::bitfield::ErrorLane;
use drm_hal::bus::Page;
use drm_hal::codec::license::encode_license_file;
use drm_hal::codec::{LicenseFile, LicenseHeader, LicenseIpBlock};
use drm_hal::simulation::{SimulatedDrmController, SimulatedOperation};
use drm_hal::{ControllerConfig, DrmError, Generation};
use googletest::prelude::*;
use rstest::*;

#[rstest]
fn activation_sequence_on_7_0_0(config: ControllerConfig) {
    let mut controller = controller(SimulatedDrmController::new(Generation::V7_0_0), config);
    let license: Vec<u32> = (0..controller.minimum_license_file_words() as u32).collect();
    controller.activate(&license).unwrap();

    let layout = controller.layout();
    let registers = layout.registers;
    let accesses = controller.bus_mut().transport_mut().accesses().to_vec();
    let mut expected: Vec<PagedAccess> = license
        .iter()
        .enumerate()
        .map(|(index, value)| PagedAccess::Write {
            page: Page::LicenseFile,
            index,
            value: *value,
        })
        .collect();
    expected.push(PagedAccess::Write {
        page: Page::Registers,
        index: registers.command.start,
        value: layout.commands.activate,
    });
    expected.push(PagedAccess::Read {
        page: Page::Registers,
        index: registers.status.start,
    });
    expected.push(PagedAccess::Read {
        page: Page::Registers,
        index: registers.error.start,
    });
    assert_eq!(paged_accesses(&accesses, layout.register_prefix), expected);
}

#[gtest]
#[rstest]
fn short_license_is_rejected_without_writes(
    config: ControllerConfig,
    #[values(Generation::V3_0_0, Generation::V5_0_0, Generation::V8_0_0)] generation: Generation,
) {
    let mut controller = controller(SimulatedDrmController::new(generation), config);
    let license = vec![0xFFFF_FFFF; controller.minimum_license_file_words() - 1];
    expect_that!(
        controller.activate(&license),
        err(displays_as(contains_substring("DrmError::LicenseFileSize:")))
    );
    expect_that!(controller.bus_mut().transport_mut().accesses().len(), eq(0));
}

#[rstest]
fn encoded_license_is_accepted(config: ControllerConfig) {
    let mut controller = controller(SimulatedDrmController::new(Generation::V6_0_0), config);
    let license = LicenseFile {
        header: LicenseHeader {
            session_id: 0x1122_3344_5566_7788,
            payload: vec![0xAB; 4],
        },
        ip_blocks: vec![LicenseIpBlock {
            payload: vec![0xCD; 8],
        }],
    };
    let words = encode_license_file(&license, &controller.layout().files).unwrap();
    controller.activate(&words).unwrap();
    let sim = controller.into_transport();
    assert_eq!(sim.word(Page::LicenseFile, 0), Some(0x1122_3344));
    assert_eq!(sim.word(Page::LicenseFile, 1), Some(0x5566_7788));
}

#[gtest]
#[rstest]
fn activation_lane_error_surfaces(config: ControllerConfig) {
    let sim = SimulatedDrmController::new(Generation::V4_2_1)
        .with_lane_error(ErrorLane::Activation, 0x02);
    let mut controller = controller(sim, config);
    let license = vec![0; controller.minimum_license_file_words()];
    expect_that!(
        controller.activate(&license),
        err(displays_as(contains_substring(
            "activation lane reported 0x02: License MAC check failed"
        )))
    );
}

#[gtest]
#[rstest]
fn stalled_activation_times_out(config: ControllerConfig) {
    let sim = SimulatedDrmController::new(Generation::V8_0_0)
        .with_stall(SimulatedOperation::Activation);
    let mut controller = controller(sim, config);
    let license = vec![0; controller.minimum_license_file_words()];
    let result = controller.activate(&license);
    expect_that!(
        result,
        err(displays_as(contains_substring(
            "DrmError::HardwareTimeout: ActivationDone"
        )))
    );
}

#[rstest]
fn transport_status_reaches_the_caller(config: ControllerConfig) {
    let sim = SimulatedDrmController::new(Generation::V5_0_0);
    let mut controller = controller(sim, config);
    controller
        .bus_mut()
        .transport_mut()
        .fail_register("DrmRegisterLine3", 0xE1);
    let license = vec![0; controller.minimum_license_file_words()];
    let err = controller.activate(&license).unwrap_err();
    assert!(matches!(err, DrmError::Transport { code: 0xE1, .. }));
}
