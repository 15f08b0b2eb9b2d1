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

use crate::common::config;
use drm_hal::simulation::{Access, SimulatedDrmController};
use drm_hal::{ControllerConfig, DrmController, DrmError, Generation, Version};
use googletest::prelude::*;
use rstest::*;

#[rstest]
fn resolves_within_family(
    config: ControllerConfig,
    #[values(
        Generation::V3_0_0,
        Generation::V3_1_0,
        Generation::V3_1_1,
        Generation::V3_2_0,
        Generation::V4_0_0,
        Generation::V4_1_0,
        Generation::V4_2_0,
        Generation::V4_2_1,
        Generation::V5_0_0,
        Generation::V6_0_0,
        Generation::V6_0_1,
        Generation::V7_0_0,
        Generation::V7_1_0,
        Generation::V8_0_0
    )]
    hardware: Generation,
) {
    let controller = DrmController::new(SimulatedDrmController::new(hardware), config).unwrap();
    assert!(controller.version().same_family(&hardware.label()));
    assert_eq!(controller.hardware_version(), hardware.label());
}

#[gtest]
#[rstest]
#[case::unknown_minor(
    Version::new(7, 5, 0),
    err(displays_as(contains_substring("DrmError::VersionCheck:")))
)]
#[case::unknown_major(
    Version::new(2, 0, 0),
    err(displays_as(contains_substring("DrmError::VersionCheck:")))
)]
#[case::unknown_bugfix(Version::new(7, 0, 9), ok(anything()))]
fn unknown_versions<M: for<'a> Matcher<&'a std::result::Result<Version, DrmError>>>(
    config: ControllerConfig,
    #[case] reported: Version,
    #[case] condition: M,
) {
    let sim = SimulatedDrmController::new(Generation::V7_0_0).with_hardware_version(reported);
    let result = DrmController::new(sim, config).map(|c| c.version());
    expect_that!(result, condition);
}

#[rstest]
fn resolution_writes_only_the_page_selector(config: ControllerConfig) {
    let sim = SimulatedDrmController::new(Generation::V6_0_1);
    let sim = DrmController::new(sim, config).unwrap().into_transport();
    let stray_writes = sim
        .accesses()
        .iter()
        .filter(|a| matches!(a, Access::Write { name, .. } if name != "DrmPageRegister"))
        .count();
    assert_eq!(stray_writes, 0);
}
