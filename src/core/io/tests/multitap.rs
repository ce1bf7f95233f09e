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
use crate::core::error::{EmulatorError, IoError};

const TH: u8 = 0x40;
const TR: u8 = 0x20;

/// Team Player on port 1 with TH and TR as outputs, both high
fn team_player() -> (IoManager, DeviceId) {
    let mut io = IoManager::new();
    let tap = io.connect_new(Port::Port1, DeviceKind::TeamPlayer);
    io.write_control(Port::Port1, TH | TR);
    io.write_data(Port::Port1, TH | TR);
    (io, tap)
}

/// Toggle TR and return the nibble, checking the TL handshake
fn next_nibble(io: &mut IoManager) -> u8 {
    let tr = io.read_data(Port::Port1) & TR;
    io.write_data(Port::Port1, tr ^ TR);
    let value = io.read_data(Port::Port1);
    assert_eq!((value >> 4) & 1, (tr ^ TR) >> 5, "TL echoes TR");
    value & 0x0F
}

#[test]
fn test_idle_and_start() {
    let (mut io, _) = team_player();
    assert_eq!(io.read_data(Port::Port1) & 0x1F, 0x13);

    io.write_data(Port::Port1, TR);
    assert_eq!(io.read_data(Port::Port1) & 0x1F, 0x1F);
}

#[test]
fn test_acquisition_sequence() {
    let (mut io, tap) = team_player();

    let pad_a = io.add_device(DeviceKind::ThreeButton.create());
    let pad_c = io.add_device(DeviceKind::SixButton.create());
    io.attach_sub_device(tap, 0, Some(pad_a)).unwrap();
    io.attach_sub_device(tap, 2, Some(pad_c)).unwrap();
    io.update_buttons(pad_a, buttons::pressed(buttons::A | buttons::UP))
        .unwrap();
    io.update_buttons(pad_c, buttons::pressed(buttons::X)).unwrap();

    io.write_data(Port::Port1, TR); // TH falls
    let mut nibbles = vec![io.read_data(Port::Port1) & 0x0F];
    for _ in 0..12 {
        nibbles.push(next_nibble(&mut io));
    }

    assert_eq!(
        nibbles,
        vec![
            0xF, 0x0, 0x0, // header
            0x0, 0xF, 0x1, 0xF, // types: 3BTN, none, 6BTN, none
            0xE, 0xB, // A: RLDU, SACB
            0xF, 0xF, 0xB, // C: RLDU, SACB, MXYZ
            0xF, // end
        ]
    );
}

#[test]
fn test_th_rise_restarts() {
    let (mut io, _) = team_player();
    io.write_data(Port::Port1, TR);
    next_nibble(&mut io);
    next_nibble(&mut io);

    io.write_data(Port::Port1, TH | TR);
    assert_eq!(io.read_data(Port::Port1) & 0x0F, 0x3);

    io.write_data(Port::Port1, TR);
    assert_eq!(io.read_data(Port::Port1) & 0x0F, 0xF);
    assert_eq!(next_nibble(&mut io), 0x0);
}

#[test]
fn test_sub_device_changes_are_picked_up() {
    let (mut io, tap) = team_player();
    let pad = io.add_device(DeviceKind::ThreeButton.create());
    io.attach_sub_device(tap, 0, Some(pad)).unwrap();

    io.write_data(Port::Port1, TR);
    for _ in 0..6 {
        next_nibble(&mut io);
    }
    // Next nibble is pad A's RLDU; press RIGHT just before it is clocked
    io.update_buttons(pad, buttons::pressed(buttons::RIGHT)).unwrap();
    assert_eq!(next_nibble(&mut io), 0x7);
}

#[test]
fn test_swapping_sub_device_changes_type() {
    let (mut io, tap) = team_player();
    let pad = io.add_device(DeviceKind::ThreeButton.create());
    io.attach_sub_device(tap, 1, Some(pad)).unwrap();
    io.replace_device(pad, DeviceKind::SixButton.create()).unwrap();

    io.write_data(Port::Port1, TR);
    for _ in 0..2 {
        next_nibble(&mut io);
    }
    assert_eq!(next_nibble(&mut io), 0xF); // port A empty
    assert_eq!(next_nibble(&mut io), 0x1); // port B 6BTN
}

#[test]
fn test_detach_sub_device() {
    let (mut io, tap) = team_player();
    let pad = io.add_device(DeviceKind::ThreeButton.create());
    io.attach_sub_device(tap, 0, Some(pad)).unwrap();
    io.attach_sub_device(tap, 0, None).unwrap();

    let device = io.device(tap).unwrap();
    assert_eq!(device.sub_devices()[0], None);

    io.write_data(Port::Port1, TR);
    for _ in 0..2 {
        next_nibble(&mut io);
    }
    assert_eq!(next_nibble(&mut io), 0xF);
}

#[test]
fn test_attach_errors() {
    let (mut io, tap) = team_player();
    let pad = io.add_device(DeviceKind::ThreeButton.create());

    let err = io.attach_sub_device(tap, 4, Some(pad)).unwrap_err();
    assert!(matches!(
        err,
        EmulatorError::Io(IoError::MultitapPortOutOfRange { port: 4, count: 4 })
    ));

    let err = io.attach_sub_device(tap, 0, Some(tap)).unwrap_err();
    assert!(matches!(err, EmulatorError::Io(IoError::SelfReference(_))));

    let err = io.attach_sub_device(tap, 0, Some(DeviceId(99))).unwrap_err();
    assert!(matches!(err, EmulatorError::Io(IoError::InvalidDevice(99))));
}

#[test]
fn test_non_multitap_accepts_sub_device() {
    let mut io = IoManager::new();
    let pad = io.connect_new(Port::Port2, DeviceKind::ThreeButton);
    let other = io.add_device(DeviceKind::ThreeButton.create());
    assert!(io.attach_sub_device(pad, 0, Some(other)).is_ok());
}
