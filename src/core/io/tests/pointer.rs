// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Devices without a conventional multiplexed pad protocol

use super::super::*;

#[test]
fn test_paddle_has_no_dpad() {
    let paddle = Paddle::new();
    assert_eq!(paddle.kind(), DeviceKind::Paddle);
    assert!(!paddle.has_standard_dpad());
}

#[test]
fn test_paddle_alternates_nibbles_on_read() {
    let mut paddle = Paddle::new();
    paddle.update_absolute_position(1000, 120);
    assert_eq!(paddle.position(), 0xC8);

    // First read: high nibble, TR high
    paddle.update_on_read();
    assert!(paddle.high_nibble());
    assert_eq!(paddle.read() & 0x3F, 0x20 | 0x10 | 0x0C);

    // Second read: low nibble, TR low
    paddle.update_on_read();
    assert!(!paddle.high_nibble());
    assert_eq!(paddle.read() & 0x3F, 0x10 | 0x08);
}

#[test]
fn test_paddle_button_on_tl() {
    let mut paddle = Paddle::new();
    paddle.update(buttons::pressed(buttons::PADDLE_BUTTON));
    assert_eq!(paddle.read() & 0x10, 0x00);

    paddle.update(buttons::NONE);
    assert_eq!(paddle.read() & 0x10, 0x10);
}

#[test]
fn test_paddle_offscreen_centers() {
    let mut paddle = Paddle::new();
    paddle.update_absolute_position(300, 10);
    paddle.update_absolute_position(OFFSCREEN.0, OFFSCREEN.1);
    assert_eq!(paddle.position(), 0x80);
}

#[test]
fn test_paddle_clamps_position() {
    let mut paddle = Paddle::new();
    paddle.update_absolute_position(5000, 0);
    assert_eq!(paddle.position(), 0xFF);
    paddle.update_absolute_position(-20, 0);
    assert_eq!(paddle.position(), 0x00);
}

#[test]
fn test_coleco_unselected_reads_high() {
    let mut pad = ColecoVisionPad::new();
    pad.update(buttons::pressed(buttons::UP));
    assert_eq!(pad.pin58(), 0x03);
    assert_eq!(pad.read() & 0x7F, 0x7F);
}

#[test]
fn test_coleco_joystick_half() {
    let mut pad = ColecoVisionPad::new();
    pad.set_pin58(0b10);
    pad.update(buttons::pressed(buttons::UP | buttons::FIRE_LEFT));

    // Fire on D6, up on D0
    assert_eq!(pad.read() & 0x7F, 0x3E);
}

#[test]
fn test_coleco_keypad_half() {
    let mut pad = ColecoVisionPad::new();
    pad.update(buttons::keypad(5) & buttons::pressed(buttons::FIRE_RIGHT));

    // Switching pins reruns the protocol with the latched buttons
    pad.set_pin58(0b01);
    assert_eq!(pad.read() & 0x7F, 0x33);

    pad.update(buttons::pressed(buttons::KEYPAD_STAR));
    assert_eq!(pad.read() & 0x0F, 0x06);

    pad.update(buttons::NONE);
    assert_eq!(pad.read() & 0x7F, 0x7F);
}
