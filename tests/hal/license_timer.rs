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

use crate::common::{command_writes, config, controller};
use drm_hal::simulation::{SimulatedDrmController, SimulatedOperation};
use drm_hal::{ControllerConfig, DrmError, Generation, WideValue};
use googletest::prelude::*;
use rstest::*;

fn timer_for(generation: Generation, value: u128) -> WideValue {
    let width = generation.table().registers.license_timer.word_count;
    WideValue::from_u128(value, width)
}

#[rstest]
#[case::early(Generation::V3_0_0)]
#[case::one_hot(Generation::V5_0_0)]
#[case::semaphore(Generation::V7_0_0)]
#[case::wide_counter(Generation::V8_0_0)]
fn loads_count_up(config: ControllerConfig, #[case] generation: Generation) {
    let mut controller = controller(SimulatedDrmController::new(generation), config);
    for expected in 1..=3 {
        controller
            .load_license_timer(&timer_for(generation, 0xABCD))
            .unwrap();
        assert_eq!(controller.number_of_license_timers_loaded().unwrap(), expected);
    }
}

#[rstest]
fn counter_wraps_at_field_width(config: ControllerConfig) {
    let generation = Generation::V4_0_0;
    let mut controller = controller(SimulatedDrmController::new(generation), config);
    for _ in 0..16 {
        controller
            .load_license_timer(&timer_for(generation, 1))
            .unwrap();
    }
    assert_eq!(controller.number_of_license_timers_loaded().unwrap(), 0);
}

#[rstest]
fn semaphore_brackets_the_load(config: ControllerConfig) {
    let generation = Generation::V7_1_0;
    let mut controller = controller(SimulatedDrmController::new(generation), config);
    controller
        .load_license_timer(&timer_for(generation, 5))
        .unwrap();
    let commands = controller.layout().commands;
    let semaphore = commands.license_timer_init_semaphore_request.unwrap();
    assert_eq!(
        command_writes(&mut controller),
        vec![commands.nop | semaphore, commands.nop]
    );
    assert!(!controller.into_transport().is_semaphore_held());
}

#[gtest]
#[rstest]
fn unacknowledged_semaphore_times_out_and_is_released(config: ControllerConfig) {
    let generation = Generation::V7_0_0;
    let sim = SimulatedDrmController::new(generation)
        .with_stall(SimulatedOperation::LicenseTimerSemaphore);
    let mut controller = controller(sim, config);
    expect_that!(
        controller.load_license_timer(&timer_for(generation, 5)),
        err(displays_as(contains_substring(
            "LicenseTimerInitSemaphoreAcknowledged"
        )))
    );
    let commands = controller.layout().commands;
    expect_that!(command_writes(&mut controller).last(), some(eq(&commands.nop)));
    expect_that!(controller.number_of_license_timers_loaded(), ok(eq(&0)));
}

#[rstest]
fn stalled_load_times_out(config: ControllerConfig) {
    let generation = Generation::V5_0_0;
    let sim = SimulatedDrmController::new(generation)
        .with_stall(SimulatedOperation::LicenseTimerLoad);
    let mut controller = controller(sim, config);
    let err = controller
        .load_license_timer(&timer_for(generation, 5))
        .unwrap_err();
    assert!(matches!(
        err,
        DrmError::HardwareTimeout {
            expected: 1,
            actual: 0,
            ..
        }
    ));
}

#[gtest]
#[rstest]
fn disabled_license_timer(config: ControllerConfig) {
    let generation = Generation::V6_0_0;
    let sim = SimulatedDrmController::new(generation).with_license_timer_enabled(false);
    let mut controller = controller(sim, config);
    expect_that!(
        controller.load_license_timer(&timer_for(generation, 5)),
        err(displays_as(contains_substring("DrmError::FunctionalityDisabled:")))
    );
    expect_that!(
        controller.sample_license_timer_counter(),
        err(displays_as(contains_substring("DrmError::FunctionalityDisabled:")))
    );
}

#[rstest]
fn init_loaded_round_trip(config: ControllerConfig) {
    let mut controller = controller(SimulatedDrmController::new(Generation::V7_0_0), config);
    assert!(!controller.is_license_timer_init_loaded().unwrap());
    controller.set_license_timer_init_loaded().unwrap();
    assert!(controller.is_license_timer_init_loaded().unwrap());
}

#[gtest]
#[rstest]
#[case::reset(
    Generation::V8_0_0,
    err(displays_as(contains_substring("DrmError::LicenseTimerReset:")))
)]
#[case::absent(Generation::V6_0_1, err(displays_as(contains_substring("DrmError::Unsupported:"))))]
fn init_loaded_failures<M: for<'a> Matcher<&'a std::result::Result<(), DrmError>>>(
    config: ControllerConfig,
    #[case] generation: Generation,
    #[case] condition: M,
) {
    let sim = SimulatedDrmController::new(generation).with_reset_on_init_loaded();
    let mut controller = controller(sim, config);
    expect_that!(controller.set_license_timer_init_loaded(), condition);
}

#[rstest]
#[case::direct(Generation::V4_2_0)]
#[case::sampled(Generation::V7_0_0)]
fn sample_counter(config: ControllerConfig, #[case] generation: Generation) {
    let sim = SimulatedDrmController::new(generation).with_license_timer_counter(123_456_789_000);
    let mut controller = controller(sim, config);
    assert_eq!(controller.sample_license_timer_counter().unwrap(), 123_456_789_000);
}
