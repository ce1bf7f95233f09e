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

//! Digital joypads
//!
//! Button bitfields are active low:
//! - 2-button: `??CBRLDU`
//! - 3-button: `SACBRLDU`
//! - 6-button: `????MXYZ SACBRLDU`

use super::device::{Device, DeviceCore, DeviceKind, IoPin};

/// Empty port: every line reads high through the pull-ups
pub struct NullDevice {
    core: DeviceCore,
}

impl NullDevice {
    pub fn new() -> Self {
        let mut device = Self {
            core: DeviceCore::new(),
        };
        device.reset();
        device
    }
}

impl Default for NullDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for NullDevice {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::None
    }

    fn has_standard_dpad(&self) -> bool {
        false
    }

    fn update_protocol(&mut self) {
        self.core.set_device_data(0xFF);
    }
}

/// Master System pad: `??CBRLDU`, no multiplexing
pub struct TwoButtonPad {
    core: DeviceCore,
}

impl TwoButtonPad {
    pub fn new() -> Self {
        let mut device = Self {
            core: DeviceCore::new(),
        };
        device.reset();
        device
    }
}

impl Default for TwoButtonPad {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for TwoButtonPad {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::TwoButton
    }

    fn update_protocol(&mut self) {
        let buttons = self.core.buttons();
        self.core.set_device_data(0xC0 | (buttons & 0x3F) as u8);
    }
}

/// 3-button output for the current TH level
///
/// - TH=1: `?1CBRLDU`
/// - TH=0: `?0SA00DU`
#[inline]
fn three_button_data(buttons: u32, th: bool) -> u8 {
    if th {
        0xC0 | (buttons & 0x3F) as u8
    } else {
        0x80 | ((buttons >> 2) & 0x30) as u8 | (buttons & 0x03) as u8
    }
}

/// Mega Drive 3-button pad, multiplexed on TH
pub struct ThreeButtonPad {
    core: DeviceCore,
}

impl ThreeButtonPad {
    pub fn new() -> Self {
        let mut device = Self {
            core: DeviceCore::new(),
        };
        device.reset();
        device
    }
}

impl Default for ThreeButtonPad {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for ThreeButtonPad {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::ThreeButton
    }

    fn update_protocol(&mut self) {
        let data = three_button_data(self.core.buttons(), self.core.line(IoPin::TH));
        self.core.set_device_data(data);
    }
}

/// Mega Drive 6-button pad
///
/// The counter holds the number of TH rising edges seen since the last
/// scanline, modulo 4:
///
/// | counter | TH=1       | TH=0       |
/// |---------|------------|------------|
/// | 0, 1    | `?1CBRLDU` | `?0SA00DU` |
/// | 2       | `?1CBRLDU` | `?0SA0000` |
/// | 3       | `?1CBMXYZ` | `?0SA1111` |
///
/// Every scanline puts the pad back at counter 0.
pub struct SixButtonPad {
    core: DeviceCore,
}

impl SixButtonPad {
    pub fn new() -> Self {
        let mut device = Self {
            core: DeviceCore::new(),
        };
        device.reset();
        device
    }

    /// Current position in the TH sequence
    pub fn sequence(&self) -> u32 {
        self.core.counter
    }
}

impl Default for SixButtonPad {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for SixButtonPad {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::SixButton
    }

    fn update_protocol(&mut self) {
        if self.core.line_rose(IoPin::TH) {
            self.core.counter = (self.core.counter + 1) & 3;
            self.core.scanlines = 0;
            log::trace!("6BTN: TH rising edge, sequence {}", self.core.counter);
        }

        let buttons = self.core.buttons();
        let th = self.core.line(IoPin::TH);
        let data = match (self.core.counter, th) {
            (3, true) => 0xC0 | (buttons & 0x30) as u8 | ((buttons >> 8) & 0x0F) as u8,
            (2, false) => 0x80 | ((buttons >> 2) & 0x30) as u8,
            (3, false) => 0x80 | ((buttons >> 2) & 0x30) as u8 | 0x0F,
            _ => three_button_data(buttons, th),
        };
        self.core.set_device_data(data);
    }

    fn update_on_scanline(&mut self) {
        if self.core.counter != 0 {
            log::trace!("6BTN: scanline reset from sequence {}", self.core.counter);
        }
        self.core.reset_counters();
        self.update_protocol();
    }
}
