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

use crate::common::{config, controller, ips};
use drm_hal::simulation::{CONTROLLER_VLNV, SimulatedDrmController};
use drm_hal::{ControllerConfig, DrmError, Generation, WideValue};
use googletest::prelude::*;
use rstest::*;

#[rstest]
#[case::early(Generation::V3_1_1)]
#[case::late(Generation::V8_0_0)]
fn dna_is_read_at_layout_width(config: ControllerConfig, #[case] generation: Generation) {
    let dna = WideValue::from(vec![0x0123_4567, 0x89AB_CDEF, 0x0F0F_0F0F, 0xF0F0_F0F0]);
    let sim = SimulatedDrmController::new(generation).with_dna(dna.clone());
    let mut controller = controller(sim, config);
    assert_eq!(controller.extract_dna().unwrap(), dna);
}

#[rstest]
fn vlnv_file_starts_with_the_controller(config: ControllerConfig) {
    let sim = SimulatedDrmController::new(Generation::V6_0_0).with_ips(ips(3));
    let mut controller = controller(sim, config);
    let mut expected = vec![CONTROLLER_VLNV];
    expected.extend(ips(3));
    assert_eq!(controller.extract_vlnv().unwrap(), expected);
    assert_eq!(controller.number_of_detected_ips().unwrap(), 3);
}

#[rstest]
fn vlnv_formats_as_hex_fields(config: ControllerConfig) {
    let sim = SimulatedDrmController::new(Generation::V4_1_0).with_ips(ips(1));
    let mut controller = controller(sim, config);
    let printed: Vec<String> = controller
        .extract_vlnv()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(printed, vec!["0001:0001:0001:0001", "00A1:0002:0001:0001"]);
}

#[rstest]
fn mailbox_round_trip(config: ControllerConfig) {
    let mut controller = controller(SimulatedDrmController::new(Generation::V7_1_0), config);
    let size = controller.layout().files.mailbox_words.unwrap();
    controller.write_mailbox(size - 2, &[0xCAFE, 0xF00D]).unwrap();
    assert_eq!(controller.read_mailbox(size - 2, 2).unwrap(), vec![0xCAFE, 0xF00D]);
}

#[gtest]
#[rstest]
#[case::no_mailbox(
    Generation::V5_0_0,
    0,
    1,
    err(displays_as(contains_substring("DrmError::Unsupported:")))
)]
#[case::past_the_end(
    Generation::V6_0_0,
    60,
    8,
    err(displays_as(contains_substring("DrmError::Argument:")))
)]
#[case::whole_mailbox(Generation::V8_0_0, 0, 128, ok(anything()))]
fn mailbox_bounds<M: for<'a> Matcher<&'a std::result::Result<Vec<u32>, DrmError>>>(
    config: ControllerConfig,
    #[case] generation: Generation,
    #[case] start: usize,
    #[case] count: usize,
    #[case] condition: M,
) {
    let mut controller = controller(SimulatedDrmController::new(generation), config);
    expect_that!(controller.read_mailbox(start, count), condition);
}

#[rstest]
fn trace_file_has_layout_length(
    config: ControllerConfig,
    #[values(Generation::V3_0_0, Generation::V6_0_1, Generation::V8_0_0)] generation: Generation,
) {
    let mut controller = controller(SimulatedDrmController::new(generation), config);
    let words = controller.layout().files.trace_file_words;
    assert_eq!(controller.read_trace_file().unwrap().len(), words);
}

#[rstest]
fn license_start_address_round_trip(
    config: ControllerConfig,
    #[values(Generation::V3_0_0, Generation::V5_0_0, Generation::V7_0_0)] generation: Generation,
) {
    let mut controller = controller(SimulatedDrmController::new(generation), config);
    controller
        .write_license_start_address(0x0000_0001_8000_0000)
        .unwrap();
    assert_eq!(
        controller.read_license_start_address().unwrap(),
        0x0000_0001_8000_0000
    );
}

#[rstest]
fn transport_failure_is_passed_through(config: ControllerConfig) {
    let mut controller = controller(SimulatedDrmController::new(Generation::V8_0_0), config);
    controller
        .bus_mut()
        .transport_mut()
        .fail_register("DrmPageRegister", 0x42);
    let err = controller.extract_dna().unwrap_err();
    assert!(matches!(err, DrmError::Transport { code: 0x42, .. }));
}
