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

//! Sega Team Player multitap
//!
//! The system drives TH and TR; the multitap answers on D0-D3 and echoes TR
//! on TL once the nibble is ready.
//!
//! # Acquisition sequence
//!
//! ```text
//!   TH=1            : 0x3 (idle, TL=1)
//!   TH falls        : 0xF
//!   each TR toggle  : 0x0, 0x0,
//!                     type A, type B, type C, type D,
//!                     data nibbles of A, B, C, D in order,
//!                     then 0xF until TH rises
//! ```
//!
//! Controller type codes: 0x0 = 3-button, 0x1 = 6-button, 0xF = nothing.
//! A 3-button pad sends `RLDU SACB`; a 6-button pad adds `MXYZ`.

use crate::core::error::{IoError, Result};

use super::device::{Device, DeviceCore, DeviceKind, IoPin, SubDeviceState};
use super::DeviceId;

/// Number of virtual ports
pub const TEAM_PLAYER_PORTS: usize = 4;

/// Nibbles sent before the controller types: `0xF 0x0 0x0`
const HEADER: [u8; 3] = [0x0F, 0x00, 0x00];

/// Nibble sent when nothing else is left
const IDLE_NIBBLE: u8 = 0x0F;

pub struct TeamPlayer {
    core: DeviceCore,

    /// Arena ids of chained devices
    ports: [Option<DeviceId>; TEAM_PLAYER_PORTS],

    /// Latest state of each chained device
    snapshots: [Option<SubDeviceState>; TEAM_PLAYER_PORTS],
}

impl TeamPlayer {
    pub fn new() -> Self {
        let mut device = Self {
            core: DeviceCore::new(),
            ports: [None; TEAM_PLAYER_PORTS],
            snapshots: [None; TEAM_PLAYER_PORTS],
        };
        device.reset();
        device
    }

    /// Type code reported for a virtual port
    fn type_code(state: Option<SubDeviceState>) -> u8 {
        match state.map(|s| s.kind) {
            Some(DeviceKind::ThreeButton) => 0x0,
            Some(DeviceKind::SixButton) => 0x1,
            _ => 0xF,
        }
    }

    /// Number of data nibbles sent for a virtual port
    ///
    /// Nibble `k` is bits `4k..4k+3` of the button field: `RLDU`, `SACB`,
    /// `MXYZ`.
    fn data_nibble_count(state: Option<SubDeviceState>) -> usize {
        match state.map(|s| s.kind) {
            Some(DeviceKind::ThreeButton) => 2,
            Some(DeviceKind::SixButton) => 3,
            _ => 0,
        }
    }

    /// Nibble at position `index` of the acquisition sequence
    ///
    /// Position 0 is the nibble presented right after TH falls.
    pub fn nibble(&self, index: usize) -> u8 {
        if let Some(&nibble) = HEADER.get(index) {
            return nibble;
        }

        let index = index - HEADER.len();
        if index < TEAM_PLAYER_PORTS {
            return Self::type_code(self.snapshots[index]);
        }

        let mut index = index - TEAM_PLAYER_PORTS;
        for state in self.snapshots.iter().flatten() {
            let count = Self::data_nibble_count(Some(*state));
            if index < count {
                return ((state.buttons >> (4 * index)) & 0x0F) as u8;
            }
            index -= count;
        }
        IDLE_NIBBLE
    }
}

impl Default for TeamPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for TeamPlayer {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::TeamPlayer
    }

    fn has_standard_dpad(&self) -> bool {
        false
    }

    fn update_protocol(&mut self) {
        let th = self.core.line(IoPin::TH);
        let tr = self.core.line(IoPin::TR);

        if th {
            self.core.counter = 0;
            self.core.set_device_data(0xF3);
            return;
        }

        if self.core.line_fell(IoPin::TH) {
            self.core.counter = 0;
            log::trace!("TeamPlayer: acquisition start");
        } else if self.core.line_rose(IoPin::TR) || self.core.line_fell(IoPin::TR) {
            self.core.counter = self.core.counter.saturating_add(1);
        }

        let nibble = self.nibble(self.core.counter as usize);
        let tl = if tr { 0x10 } else { 0x00 };
        self.core.set_device_data(0xE0 | tl | nibble);
    }

    fn set_sub_device(&mut self, port: usize, device: Option<DeviceId>) -> Result<()> {
        let slot = self
            .ports
            .get_mut(port)
            .ok_or(IoError::MultitapPortOutOfRange {
                port,
                count: TEAM_PLAYER_PORTS,
            })?;
        *slot = device;
        if device.is_none() {
            self.snapshots[port] = None;
        }
        log::debug!("TeamPlayer: port {} -> {:?}", port, device);
        Ok(())
    }

    fn sub_devices(&self) -> &[Option<DeviceId>] {
        &self.ports
    }

    fn refresh_sub_device(&mut self, port: usize, state: Option<SubDeviceState>) {
        if let Some(slot) = self.snapshots.get_mut(port) {
            *slot = state;
        }
    }
}
