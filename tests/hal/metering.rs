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

use crate::common::{command_writes, config, controller, ips};
use drm_hal::codec::metering::{decode_metering_file, encode_metering_file};
use drm_hal::simulation::{SimulatedDrmController, SimulatedOperation};
use drm_hal::{ControllerConfig, DrmError, Functionality, Generation, MeteringTrigger};
use googletest::prelude::*;
use rstest::*;

#[rstest]
fn disabled_metering_issues_no_command(
    config: ControllerConfig,
    #[values(MeteringTrigger::EndSession, MeteringTrigger::MidSession)] trigger: MeteringTrigger,
) {
    let sim = SimulatedDrmController::new(Generation::V7_0_0).with_metering_enabled(false);
    let mut controller = controller(sim, config);
    let err = controller.extract_metering_file(trigger).unwrap_err();
    assert!(matches!(
        err,
        DrmError::FunctionalityDisabled(Functionality::Metering)
    ));
    assert!(command_writes(&mut controller).is_empty());
}

#[rstest]
#[case::early(Generation::V3_2_0, 8)]
#[case::middle(Generation::V5_0_0, 16)]
#[case::late(Generation::V8_0_0, 16)]
fn end_session_metering_carries_usage(
    config: ControllerConfig,
    #[case] generation: Generation,
    #[case] word_width: usize,
) {
    let sim = SimulatedDrmController::new(generation)
        .with_ips(ips(3))
        .with_ip_usage(0, 11)
        .with_ip_usage(2, 33)
        .with_session_id(0xDEAD_BEEF_0000_0001)
        .with_environment_id(0x0E01);
    let mut controller = controller(sim, config);
    let file = controller
        .extract_metering_file(MeteringTrigger::EndSession)
        .unwrap();
    assert_eq!(file.header.session_id, 0xDEAD_BEEF_0000_0001);
    assert!(file.header.end_session);
    assert_eq!(file.header.environment_id, 0x0E01);
    let usage: Vec<Option<u128>> = file.ip_blocks.iter().map(|b| b.as_u128()).collect();
    assert_eq!(usage, vec![Some(11), Some(0), Some(33)]);
    assert_eq!(file.mac.word_count(), word_width);
    assert_eq!(
        command_writes(&mut controller),
        vec![controller.layout().commands.end_session_extract_metering]
    );
}

#[rstest]
fn segment_index_advances_between_extractions(config: ControllerConfig) {
    let mut controller = controller(
        SimulatedDrmController::new(Generation::V6_0_1).with_ips(ips(1)),
        config,
    );
    let first = controller
        .extract_metering_file(MeteringTrigger::MidSession)
        .unwrap();
    let second = controller
        .extract_metering_file(MeteringTrigger::MidSession)
        .unwrap();
    assert!(!first.header.end_session);
    assert_eq!(second.header.segment_index, first.header.segment_index + 1);
}

#[gtest]
#[rstest]
fn mid_session_needs_generation_6(config: ControllerConfig) {
    let mut controller = controller(SimulatedDrmController::new(Generation::V4_0_0), config);
    expect_that!(
        controller.extract_metering_file(MeteringTrigger::MidSession),
        err(displays_as(contains_substring("DrmError::Unsupported:")))
    );
}

#[gtest]
#[rstest]
fn stalled_metering_times_out(config: ControllerConfig) {
    let sim = SimulatedDrmController::new(Generation::V7_1_0)
        .with_stall(SimulatedOperation::EndSessionMetering);
    let mut controller = controller(sim, config);
    expect_that!(
        controller.extract_metering_file(MeteringTrigger::EndSession),
        err(displays_as(contains_substring("EndSessionMeteringReady")))
    );
}

#[rstest]
fn extracted_file_reencodes_to_the_page(config: ControllerConfig) {
    let mut controller = controller(
        SimulatedDrmController::new(Generation::V8_0_0).with_ips(ips(2)),
        config,
    );
    let file = controller
        .extract_metering_file(MeteringTrigger::EndSession)
        .unwrap();
    let width = controller.layout().files.metering_word_width;
    let words = encode_metering_file(&file, width).unwrap();
    assert_eq!(decode_metering_file(&words, 2, width).unwrap(), file);
}
