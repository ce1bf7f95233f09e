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

//! Controller bus tests
//!
//! - `tristate`: control/data register combination and caches
//! - `pads`: 2-, 3- and 6-button protocols
//! - `pointer`: paddle and ColecoVision pin 5/8 selection
//! - `multitap`: Team Player chaining
//! - `manager`: ports, register block and D-pad constraint

#[cfg(test)]
mod multitap;
#[cfg(test)]
mod pads;
#[cfg(test)]
mod pointer;

use super::*;

/// Device with no protocol: the device side holds whatever the test drives
pub(super) struct Probe {
    pub core: DeviceCore,
}

impl Probe {
    pub fn new() -> Self {
        Self {
            core: DeviceCore::new(),
        }
    }
}

impl Device for Probe {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::None
    }

    fn update_protocol(&mut self) {}
}

/// Drive TH as an output at the given level
pub(super) fn set_th(device: &mut dyn Device, high: bool) {
    device.write_data(if high { 0x40 } else { 0x00 });
}
