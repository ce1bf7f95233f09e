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

//! ColecoVision hand controller
//!
//! Pin 8 low selects the joystick half, pin 5 low the keypad half.
//!
//! Button bitfield (active low):
//! - bits 0-3: U D L R
//! - bit 4: left fire, bit 5: right fire
//! - bits 6-17: keypad 0-9, `*`, `#`

use super::device::{Device, DeviceCore, DeviceKind};

/// Pin 8 low, pin 5 high
const SELECT_JOYSTICK: u8 = 0b10;

/// Pin 8 high, pin 5 low
const SELECT_KEYPAD: u8 = 0b01;

/// First keypad bit in the button bitfield
const KEYPAD_SHIFT: u32 = 6;

/// Nibble produced by each key (0-9, `*`, `#`)
const KEYPAD_CODES: [u8; 12] = [
    0x0A, 0x0D, 0x07, 0x0C, 0x02, 0x03, 0x0E, 0x05, 0x01, 0x0B, 0x06, 0x09,
];

/// Nibble with no key pressed
const KEYPAD_NONE: u8 = 0x0F;

pub struct ColecoVisionPad {
    core: DeviceCore,
}

impl ColecoVisionPad {
    pub fn new() -> Self {
        let mut device = Self {
            core: DeviceCore::new(),
        };
        device.reset();
        device
    }

    /// Joystick half: `?F??LDRU` with the controller's own bit order
    fn joystick(buttons: u32) -> u8 {
        let up = buttons & 0x01;
        let down = (buttons >> 1) & 0x01;
        let left = (buttons >> 2) & 0x01;
        let right = (buttons >> 3) & 0x01;
        let fire = (buttons >> 4) & 0x01;
        (0xB0 | (fire << 6) | (left << 3) | (down << 2) | (right << 1) | up) as u8
    }

    /// Keypad half: `?F??KKKK`; the lowest pressed key wins
    fn keypad(buttons: u32) -> u8 {
        let code = KEYPAD_CODES
            .iter()
            .enumerate()
            .find(|(key, _)| buttons & (1 << (KEYPAD_SHIFT + *key as u32)) == 0)
            .map_or(KEYPAD_NONE, |(_, &code)| code);
        let fire = ((buttons >> 5) & 0x01) as u8;
        0xB0 | (fire << 6) | code
    }
}

impl Default for ColecoVisionPad {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for ColecoVisionPad {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::ColecoVision
    }

    fn update_protocol(&mut self) {
        let buttons = self.core.buttons();
        let data = match self.core.pin58() {
            SELECT_JOYSTICK => Self::joystick(buttons),
            SELECT_KEYPAD => Self::keypad(buttons),
            _ => 0xFF,
        };
        self.core.set_device_data(data);
    }
}
