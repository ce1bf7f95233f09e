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

//! Controller Device Trait
//!
//! Every controller on the bus implements [`Device`]. The trait owns the
//! system-facing contract (control/data writes, tristate-combined reads,
//! scanline and read hooks); an implementation only supplies its protocol in
//! [`Device::update_protocol`].
//!
//! # Tristate model
//!
//! ```text
//!   control bit = 1  ->  line driven by the system  (value from md_data)
//!   control bit = 0  ->  line driven by the device  (value from device_data)
//!
//!   read() = (device_data & !ctrl & 0x7F) | (md_data & (ctrl | 0x80))
//! ```
//!
//! Both caches are recomputed on every control or data write, so `read()` is
//! a plain field load.
//!
//! # Example
//!
//! ```
//! use genscore::core::io::{buttons, Device, ThreeButtonPad};
//!
//! let mut pad = ThreeButtonPad::new();
//! pad.write_control(0x40); // TH is an output
//! pad.write_data(0x40); // TH high
//! pad.update(!buttons::B);
//! // ?1CBRLDU: B pressed (active low)
//! assert_eq!(pad.read() & 0x3F, 0x3F & !0x10);
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;

use super::DeviceId;

bitflags! {
    /// Controller port data lines
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IoPin: u8 {
        const UP = 0x01; // D0
        const DOWN = 0x02; // D1
        const LEFT = 0x04; // D2
        const RIGHT = 0x08; // D3
        const TL = 0x10; // D4
        const TR = 0x20; // D5
        const TH = 0x40; // D6
    }
}

/// Off-screen sentinel for absolute pointer coordinates
pub const OFFSCREEN: (i32, i32) = (-1, -1);

/// Controller type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Nothing connected
    #[default]
    None,
    /// Master System 2-button pad
    TwoButton,
    /// Mega Drive 3-button pad
    ThreeButton,
    /// Mega Drive 6-button pad
    SixButton,
    /// Sega HPD-200 paddle
    Paddle,
    /// ColecoVision joystick and keypad
    ColecoVision,
    /// Sega Team Player multitap
    TeamPlayer,
}

impl DeviceKind {
    /// Build a freshly reset device of this kind
    pub fn create(self) -> Box<dyn Device> {
        use super::{
            ColecoVisionPad, NullDevice, Paddle, SixButtonPad, TeamPlayer, ThreeButtonPad,
            TwoButtonPad,
        };

        match self {
            DeviceKind::None => Box::new(NullDevice::new()),
            DeviceKind::TwoButton => Box::new(TwoButtonPad::new()),
            DeviceKind::ThreeButton => Box::new(ThreeButtonPad::new()),
            DeviceKind::SixButton => Box::new(SixButtonPad::new()),
            DeviceKind::Paddle => Box::new(Paddle::new()),
            DeviceKind::ColecoVision => Box::new(ColecoVisionPad::new()),
            DeviceKind::TeamPlayer => Box::new(TeamPlayer::new()),
        }
    }
}

/// What a multitap needs to know about a chained device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubDeviceState {
    pub kind: DeviceKind,
    pub buttons: u32,
}

/// State shared by every controller
///
/// Fields are split into the device side (what the controller drives) and
/// the system side (what the console wrote). The two cached values are kept
/// in sync by [`DeviceCore::refresh_input`] and [`DeviceCore::refresh_output`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCore {
    // Device side
    /// Protocol counter (meaning depends on the device)
    pub counter: u32,
    /// Scanlines since the counter last advanced
    pub scanlines: u32,
    device_data: u8,

    // System side
    ctrl: u8,
    md_data: u8,

    /// Line levels as seen by the device: `!ctrl | md_data`
    md_data_tris: u8,
    md_data_tris_prev: u8,

    /// `read()` result: `device_data` with the tristate mask applied
    read_cache: u8,

    /// Active-low button bitfield
    buttons: u32,
    buttons_prev: u32,

    abs_x: i32,
    abs_y: i32,

    /// Bit 0: pin 8, bit 1: pin 5
    pin58: u8,

    serial_control: u8,
    serial_last_tx: u8,
}

impl DeviceCore {
    pub fn new() -> Self {
        let mut core = Self {
            counter: 0,
            scanlines: 0,
            device_data: 0xFF,
            ctrl: 0x00,
            md_data: 0xFF,
            md_data_tris: 0xFF,
            md_data_tris_prev: 0xFF,
            read_cache: 0x7F,
            buttons: !0,
            buttons_prev: !0,
            abs_x: OFFSCREEN.0,
            abs_y: OFFSCREEN.1,
            pin58: 0x03,
            serial_control: 0x00,
            serial_last_tx: 0xFF,
        };
        core.reset_system();
        core
    }

    /// Clear system-side registers, pointer position and serial state
    pub fn reset_system(&mut self) {
        self.device_data = 0xFF;
        self.ctrl = 0x00;
        self.md_data = 0xFF;
        self.buttons = !0;
        self.buttons_prev = !0;
        self.abs_x = OFFSCREEN.0;
        self.abs_y = OFFSCREEN.1;
        self.pin58 = 0x03;
        self.serial_control = 0x00;
        self.serial_last_tx = 0xFF;
        self.refresh_input();
        self.latch_lines();
        self.refresh_output();
    }

    /// Clear protocol counters only
    pub fn reset_counters(&mut self) {
        self.counter = 0;
        self.scanlines = 0;
    }

    /// Recompute the line levels seen by the device
    #[inline]
    pub fn refresh_input(&mut self) {
        self.md_data_tris = !self.ctrl | self.md_data;
    }

    /// Accept the current line levels as the baseline for edge detection
    #[inline]
    pub fn latch_lines(&mut self) {
        self.md_data_tris_prev = self.md_data_tris;
    }

    /// Recompute the value returned by `read()`
    #[inline]
    pub fn refresh_output(&mut self) {
        self.read_cache = self.apply_tristate(self.device_data);
    }

    /// Combine a device-side value with the system-side lines
    #[inline]
    pub fn apply_tristate(&self, data: u8) -> u8 {
        (data & !self.ctrl & 0x7F) | (self.md_data & (self.ctrl | 0x80))
    }

    /// Drive the device-side lines
    pub fn set_device_data(&mut self, data: u8) {
        self.device_data = data;
        self.refresh_output();
    }

    pub fn device_data(&self) -> u8 {
        self.device_data
    }

    pub fn ctrl(&self) -> u8 {
        self.ctrl
    }

    pub fn md_data(&self) -> u8 {
        self.md_data
    }

    pub fn md_data_tris(&self) -> u8 {
        self.md_data_tris
    }

    /// Level of `pin` as seen by the device
    #[inline]
    pub fn line(&self, pin: IoPin) -> bool {
        self.md_data_tris & pin.bits() != 0
    }

    /// `pin` went low-to-high with the write being processed
    #[inline]
    pub fn line_rose(&self, pin: IoPin) -> bool {
        self.md_data_tris_prev & pin.bits() == 0 && self.line(pin)
    }

    /// `pin` went high-to-low with the write being processed
    #[inline]
    pub fn line_fell(&self, pin: IoPin) -> bool {
        self.md_data_tris_prev & pin.bits() != 0 && !self.line(pin)
    }

    pub fn buttons(&self) -> u32 {
        self.buttons
    }

    pub fn buttons_prev(&self) -> u32 {
        self.buttons_prev
    }

    pub fn position(&self) -> (i32, i32) {
        (self.abs_x, self.abs_y)
    }

    pub fn pin58(&self) -> u8 {
        self.pin58
    }
}

impl Default for DeviceCore {
    fn default() -> Self {
        Self::new()
    }
}

/// A controller plugged into one of the bus ports
///
/// Implementations provide access to their [`DeviceCore`], a type tag and
/// the protocol update; the rest of the contract is supplied here.
///
/// `update_protocol` runs after every system write and every button change
/// with the input caches already refreshed. Line edges are visible to it
/// only during the [`Device::refresh`] that processes the write; repeated
/// calls see no edge and must leave the protocol where it is.
pub trait Device {
    fn core(&self) -> &DeviceCore;

    fn core_mut(&mut self) -> &mut DeviceCore;

    /// Device type
    fn kind(&self) -> DeviceKind;

    /// Recompute `device_data` from buttons and input lines
    fn update_protocol(&mut self);

    /// Does this device have a standard D-pad as buttons 0-3?
    ///
    /// Devices that return true get U+D and L+R suppressed by the bus.
    fn has_standard_dpad(&self) -> bool {
        true
    }

    /// Full reset (power-on or hard reset)
    fn reset(&mut self) {
        self.core_mut().reset_system();
        self.reset_device_state();
        self.refresh();
    }

    /// Reset device-only state, keeping the system-side registers
    fn reset_device_state(&mut self) {
        self.core_mut().reset_counters();
    }

    /// Latch a new button sample and rerun the protocol
    ///
    /// # Arguments
    ///
    /// * `buttons` - Active-low bitfield (`1` = released)
    fn update(&mut self, buttons: u32) {
        let core = self.core_mut();
        core.buttons_prev = core.buttons;
        core.buttons = buttons;
        self.refresh();
    }

    /// Update the absolute pointer position
    ///
    /// Coordinates are scaled to 1280x240; off-screen is [`OFFSCREEN`].
    fn update_absolute_position(&mut self, x: i32, y: i32) {
        let core = self.core_mut();
        core.abs_x = x;
        core.abs_y = y;
        self.refresh();
    }

    /// One scanline has passed
    fn update_on_scanline(&mut self) {
        let core = self.core_mut();
        core.scanlines = core.scanlines.saturating_add(1);
    }

    /// The system read this device's port
    fn update_on_read(&mut self) {}

    /// Chain `device` to virtual port `port`
    ///
    /// Devices that do not chain accept and ignore the request.
    fn set_sub_device(&mut self, _port: usize, _device: Option<DeviceId>) -> Result<()> {
        Ok(())
    }

    /// Chained devices, indexed by virtual port
    fn sub_devices(&self) -> &[Option<DeviceId>] {
        &[]
    }

    /// Receive the current state of the device chained to `port`
    fn refresh_sub_device(&mut self, _port: usize, _state: Option<SubDeviceState>) {}

    /// Pin 5/8 status (bit 0: pin 8, bit 1: pin 5)
    fn pin58(&self) -> u8 {
        self.core().pin58
    }

    /// Set pin 5/8; only the low two bits are kept
    fn set_pin58(&mut self, pin58: u8) {
        self.core_mut().pin58 = pin58 & 0x03;
        self.refresh();
    }

    /// Tristate-combined port value
    #[inline]
    fn read(&self) -> u8 {
        self.core().read_cache
    }

    /// System write to the control register
    fn write_control(&mut self, ctrl: u8) {
        self.core_mut().ctrl = ctrl;
        self.refresh();
    }

    /// System write to the data register
    fn write_data(&mut self, data: u8) {
        self.core_mut().md_data = data;
        self.refresh();
    }

    fn buttons(&self) -> u32 {
        self.core().buttons
    }

    /// Level of an input line (or any of several lines)
    fn check_input_line(&self, pin: IoPin) -> bool {
        self.core().md_data_tris & pin.bits() != 0
    }

    fn serial_control(&self) -> u8 {
        self.core().serial_control
    }

    fn set_serial_control(&mut self, value: u8) {
        self.core_mut().serial_control = value;
    }

    fn serial_last_tx(&self) -> u8 {
        self.core().serial_last_tx
    }

    fn set_serial_tx(&mut self, value: u8) {
        self.core_mut().serial_last_tx = value;
    }

    /// Recompute caches and rerun the protocol
    fn refresh(&mut self) {
        self.core_mut().refresh_input();
        self.update_protocol();
        let core = self.core_mut();
        core.refresh_output();
        core.latch_lines();
    }
}
