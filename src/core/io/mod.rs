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

//! Controller I/O bus
//!
//! Tristate controller ports and the devices plugged into them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 IoManager                    │
//! ├──────────────────────────────────────────────┤
//! │  arena: Vec<Box<dyn Device>>  (DeviceId)     │
//! │  ports: [DeviceId; 3]  (port 1, port 2, EXT) │
//! └──────────────────────────────────────────────┘
//!        │                     │
//!   ┌────┴─────┐        ┌──────┴──────┐
//!   │ 6BTN pad │        │ TeamPlayer  │── sub ports A-D ──> DeviceId
//!   └──────────┘        └─────────────┘
//! ```
//!
//! Multitaps refer to their chained devices by arena index, so a device can
//! be swapped at runtime without touching the multitap.

mod coleco;
mod device;
mod manager;
mod paddle;
mod pads;
mod team_player;
#[cfg(test)]
mod tests;

pub use coleco::ColecoVisionPad;
pub use device::{Device, DeviceCore, DeviceKind, IoPin, SubDeviceState, OFFSCREEN};
pub use manager::{IoManager, Port, HARDWARE_VERSION, IO_REGISTER_COUNT};
pub use paddle::Paddle;
pub use pads::{NullDevice, SixButtonPad, ThreeButtonPad, TwoButtonPad};
pub use team_player::{TeamPlayer, TEAM_PLAYER_PORTS};

/// Index of a device in the [`IoManager`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub usize);

/// Button bit definitions (active low: 0 = pressed)
pub mod buttons {
    pub const UP: u32 = 0x0001;
    pub const DOWN: u32 = 0x0002;
    pub const LEFT: u32 = 0x0004;
    pub const RIGHT: u32 = 0x0008;
    pub const B: u32 = 0x0010;
    pub const C: u32 = 0x0020;
    pub const A: u32 = 0x0040;
    pub const START: u32 = 0x0080;
    pub const Z: u32 = 0x0100;
    pub const Y: u32 = 0x0200;
    pub const X: u32 = 0x0400;
    pub const MODE: u32 = 0x0800;

    /// Paddle knob button
    pub const PADDLE_BUTTON: u32 = 0x0001;

    /// Master System buttons 1 and 2
    pub const BUTTON_1: u32 = B;
    pub const BUTTON_2: u32 = C;

    /// ColecoVision fire buttons and keypad
    pub const FIRE_LEFT: u32 = 0x0010;
    pub const FIRE_RIGHT: u32 = 0x0020;
    pub const KEYPAD_0: u32 = 0x0040;
    pub const KEYPAD_STAR: u32 = KEYPAD_0 << 10;
    pub const KEYPAD_HASH: u32 = KEYPAD_0 << 11;

    /// Nothing pressed
    pub const NONE: u32 = !0;

    /// Bitfield with the keypad digit `digit` (0-9) pressed
    pub const fn keypad(digit: u32) -> u32 {
        !(KEYPAD_0 << digit)
    }

    /// Bitfield with every button in `mask` pressed
    pub const fn pressed(mask: u32) -> u32 {
        !mask
    }
}
