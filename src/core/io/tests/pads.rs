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

use super::super::*;
use super::set_th;

/// TH as an output, everything else read from the pad
fn th_output<D: Device>(mut pad: D) -> D {
    pad.write_control(0x40);
    set_th(&mut pad, true);
    pad
}

/// Drive TH and sample D0-D5
fn sample(pad: &mut dyn Device, th: bool) -> u8 {
    set_th(pad, th);
    pad.read() & 0x3F
}

#[test]
fn test_null_device_reads_pull_ups() {
    let mut device = NullDevice::new();
    assert_eq!(device.kind(), DeviceKind::None);
    assert!(!device.has_standard_dpad());
    assert_eq!(device.read() & 0x7F, 0x7F);

    device.update(0);
    assert_eq!(device.read() & 0x7F, 0x7F);
}

#[test]
fn test_two_button_pad() {
    let mut pad = TwoButtonPad::new();
    pad.update(buttons::pressed(buttons::LEFT | buttons::BUTTON_2));

    // ??CBRLDU: L and C low
    assert_eq!(pad.read() & 0x3F, 0x3F & !0x04 & !0x20);

    // TH does not multiplex anything
    let mut pad = th_output(pad);
    assert_eq!(sample(&mut pad, false), sample(&mut pad, true));
}

#[test]
fn test_three_button_th_multiplexing() {
    let mut pad = th_output(ThreeButtonPad::new());
    pad.update(buttons::pressed(buttons::DOWN | buttons::A | buttons::C));

    // TH=1: CBRLDU
    assert_eq!(sample(&mut pad, true), 0x3F & !0x20 & !0x02);
    // TH=0: SA00DU
    assert_eq!(sample(&mut pad, false), 0x20 | 0x01);
}

#[test]
fn test_three_button_th_reads_back_system_level() {
    let mut pad = th_output(ThreeButtonPad::new());
    set_th(&mut pad, false);
    assert_eq!(pad.read() & 0x40, 0x00);
    set_th(&mut pad, true);
    assert_eq!(pad.read() & 0x40, 0x40);
}

#[test]
fn test_six_button_sequence() {
    let mut pad = th_output(SixButtonPad::new());
    pad.update(buttons::pressed(buttons::UP | buttons::X | buttons::START));

    // Cycle 1: face buttons and D-pad
    assert_eq!(sample(&mut pad, false), 0x12); // SA00DU
    assert_eq!(sample(&mut pad, true), 0x3E); // CBRLDU
    assert_eq!(pad.sequence(), 1);

    // Cycle 2: same again
    assert_eq!(sample(&mut pad, false), 0x12);
    assert_eq!(sample(&mut pad, true), 0x3E);

    // Cycle 3: D-pad bits low identify the pad, then the extra buttons
    assert_eq!(sample(&mut pad, false), 0x10); // SA0000
    assert_eq!(sample(&mut pad, true), 0x3B); // CBMXYZ: X low
    assert_eq!(pad.sequence(), 3);

    // Sentinel nibble
    assert_eq!(sample(&mut pad, false), 0x1F); // SA1111
}

#[test]
fn test_six_button_sequence_wraps() {
    let mut pad = th_output(SixButtonPad::new());
    for _ in 0..4 {
        sample(&mut pad, false);
        sample(&mut pad, true);
    }
    assert_eq!(pad.sequence(), 0);
    assert_eq!(sample(&mut pad, true), 0x3F);
}

#[test]
fn test_six_button_scanline_resets_sequence() {
    let mut pad = th_output(SixButtonPad::new());
    pad.update(buttons::pressed(buttons::UP | buttons::X));
    for _ in 0..3 {
        sample(&mut pad, false);
        sample(&mut pad, true);
    }
    assert_eq!(pad.sequence(), 3);
    assert_eq!(pad.read() & 0x0F, 0x0B, "extra buttons on D0-D3");

    pad.update_on_scanline();

    assert_eq!(pad.sequence(), 0);
    // Back to the first nibble without any TH activity
    assert_eq!(pad.read() & 0x3F, 0x3E);
    assert_eq!(sample(&mut pad, false), 0x32);
}

#[test]
fn test_six_button_ignores_repeated_high_writes() {
    let mut pad = th_output(SixButtonPad::new());
    set_th(&mut pad, true);
    set_th(&mut pad, true);
    pad.update(buttons::NONE);
    assert_eq!(pad.sequence(), 0);
}

#[test]
fn test_six_button_input_th_counts_as_high() {
    // TH as input: the pull-up holds it high, no edges
    let mut pad = SixButtonPad::new();
    pad.write_control(0x00);
    pad.write_data(0x00);
    pad.write_data(0x40);
    assert_eq!(pad.sequence(), 0);
}
