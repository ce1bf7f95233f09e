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

//! Sega HPD-200 paddle (Japanese model)
//!
//! The 8-bit position is sent one nibble at a time. An internal flip-flop
//! toggles on every port read and selects the nibble; TR reports which one
//! is on D0-D3:
//!
//! ```text
//!   flip-flop 0: D0-D3 = position low nibble,  TR = 0
//!   flip-flop 1: D0-D3 = position high nibble, TR = 1
//!   TL = button (active low)
//! ```

use super::buttons::PADDLE_BUTTON;
use super::device::{Device, DeviceCore, DeviceKind, OFFSCREEN};

/// Horizontal resolution of absolute pointer coordinates
const ABS_WIDTH: i32 = 1280;

/// Position reported while the pointer is off-screen
const CENTER: u8 = 0x80;

pub struct Paddle {
    core: DeviceCore,
}

impl Paddle {
    pub fn new() -> Self {
        let mut device = Self {
            core: DeviceCore::new(),
        };
        device.reset();
        device
    }

    /// Knob position derived from the pointer X coordinate
    pub fn position(&self) -> u8 {
        let (x, y) = self.core.position();
        if (x, y) == OFFSCREEN {
            return CENTER;
        }
        (x.clamp(0, ABS_WIDTH - 1) * 256 / ABS_WIDTH) as u8
    }

    /// Flip-flop state: `true` while the high nibble is presented
    pub fn high_nibble(&self) -> bool {
        self.core.counter & 1 != 0
    }
}

impl Default for Paddle {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Paddle {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::Paddle
    }

    fn has_standard_dpad(&self) -> bool {
        false
    }

    fn update_protocol(&mut self) {
        let position = self.position();
        let button = (self.core.buttons() & PADDLE_BUTTON) as u8;
        let data = if self.high_nibble() {
            0xE0 | (button << 4) | (position >> 4)
        } else {
            0xC0 | (button << 4) | (position & 0x0F)
        };
        self.core.set_device_data(data);
    }

    fn update_on_read(&mut self) {
        self.core.counter ^= 1;
        self.update_protocol();
    }
}
