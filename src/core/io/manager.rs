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

//! Controller port manager
//!
//! Owns every device in an arena and routes the I/O register block to the
//! device on each physical port.

use crate::core::error::{IoError, Result};

use super::device::{Device, DeviceKind, SubDeviceState};
use super::pads::NullDevice;
use super::{buttons, DeviceId};

/// Version register: overseas, NTSC, no expansion unit, revision 0
pub const HARDWARE_VERSION: u8 = 0xA0;

/// Number of byte registers in the I/O block
pub const IO_REGISTER_COUNT: usize = 16;

/// Writable bits of a serial control register
const SERIAL_CONTROL_MASK: u8 = 0xF8;

/// Physical controller port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Port1,
    Port2,
    Ext,
}

impl Port {
    pub const ALL: [Port; 3] = [Port::Port1, Port::Port2, Port::Ext];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Port for a 0-based index
    ///
    /// # Returns
    ///
    /// - `Ok(Port)` for 0, 1 or 2
    /// - `Err(IoError::InvalidPort)` otherwise
    pub fn from_index(index: usize) -> Result<Port> {
        Port::ALL
            .get(index)
            .copied()
            .ok_or_else(|| IoError::InvalidPort(index).into())
    }
}

/// Controller ports and the device arena
///
/// # Register Map (byte index into the I/O block)
/// - 0x0: version
/// - 0x1-0x3: data, ports 1 / 2 / EXT
/// - 0x4-0x6: control, ports 1 / 2 / EXT
/// - 0x7 + 3n: serial transmit, port n
/// - 0x8 + 3n: serial receive, port n
/// - 0x9 + 3n: serial control, port n
///
/// On the Mega Drive the block sits at 0xA10000 on odd addresses, so the
/// index is `(address >> 1) & 0xF`.
pub struct IoManager {
    devices: Vec<Box<dyn Device>>,
    ports: [DeviceId; 3],
    version: u8,
}

impl IoManager {
    /// Create a manager with nothing connected
    pub fn new() -> Self {
        let devices: Vec<Box<dyn Device>> = (0..Port::ALL.len())
            .map(|_| Box::new(NullDevice::new()) as Box<dyn Device>)
            .collect();

        Self {
            devices,
            ports: [DeviceId(0), DeviceId(1), DeviceId(2)],
            version: HARDWARE_VERSION,
        }
    }

    /// Suppress opposite D-pad directions pressed together
    ///
    /// With U+D (or L+R) both pressed, both are released.
    ///
    /// # Example
    ///
    /// ```
    /// use genscore::core::io::{buttons, IoManager};
    ///
    /// let both = buttons::pressed(buttons::UP | buttons::DOWN | buttons::LEFT);
    /// let fixed = IoManager::constrain_dpad(both);
    /// assert_eq!(fixed, buttons::pressed(buttons::LEFT));
    /// ```
    pub fn constrain_dpad(mut buttons: u32) -> u32 {
        const UD: u32 = buttons::UP | buttons::DOWN;
        const LR: u32 = buttons::LEFT | buttons::RIGHT;

        if buttons & UD == 0 {
            buttons |= UD;
        }
        if buttons & LR == 0 {
            buttons |= LR;
        }
        buttons
    }

    // === Arena ===

    /// Add a device to the arena
    ///
    /// The device is not connected anywhere yet.
    pub fn add_device(&mut self, device: Box<dyn Device>) -> DeviceId {
        self.devices.push(device);
        let id = DeviceId(self.devices.len() - 1);
        log::debug!("I/O: added {:?} as {:?}", self.devices[id.0].kind(), id);
        id
    }

    /// Swap the device stored at `id`
    ///
    /// Ports and multitaps referring to `id` see the new device.
    pub fn replace_device(&mut self, id: DeviceId, device: Box<dyn Device>) -> Result<()> {
        let slot = self
            .devices
            .get_mut(id.0)
            .ok_or(IoError::InvalidDevice(id.0))?;
        log::debug!("I/O: {:?} replaced by {:?}", id, device.kind());
        *slot = device;
        Ok(())
    }

    pub fn device(&self, id: DeviceId) -> Option<&dyn Device> {
        self.devices.get(id.0).map(|device| &**device)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut Box<dyn Device>> {
        self.devices.get_mut(id.0)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn check_id(&self, id: DeviceId) -> Result<()> {
        if id.0 < self.devices.len() {
            Ok(())
        } else {
            Err(IoError::InvalidDevice(id.0).into())
        }
    }

    // === Wiring ===

    /// Connect arena device `id` to a physical port
    pub fn connect(&mut self, port: Port, id: DeviceId) -> Result<()> {
        self.check_id(id)?;
        self.ports[port.index()] = id;
        log::debug!("I/O: {:?} -> {:?}", port, id);
        Ok(())
    }

    /// Create a device of `kind`, add it and connect it to `port`
    pub fn connect_new(&mut self, port: Port, kind: DeviceKind) -> DeviceId {
        let id = self.add_device(kind.create());
        self.ports[port.index()] = id;
        id
    }

    /// Device connected to `port`
    pub fn port_device(&self, port: Port) -> DeviceId {
        self.ports[port.index()]
    }

    /// Chain `sub` to virtual port `virtual_port` of `multitap`
    ///
    /// # Returns
    ///
    /// - `Ok(())` on success, including devices that do not chain
    /// - `Err(IoError::InvalidDevice)` for an unknown id
    /// - `Err(IoError::SelfReference)` when `sub == multitap`
    /// - `Err(IoError::MultitapPortOutOfRange)` from the multitap
    pub fn attach_sub_device(
        &mut self,
        multitap: DeviceId,
        virtual_port: usize,
        sub: Option<DeviceId>,
    ) -> Result<()> {
        self.check_id(multitap)?;
        if let Some(sub) = sub {
            self.check_id(sub)?;
            if sub == multitap {
                return Err(IoError::SelfReference(sub.0).into());
            }
        }

        self.devices[multitap.0].set_sub_device(virtual_port, sub)?;
        self.sync_sub_devices(multitap);
        Ok(())
    }

    /// Copy the kind and buttons of each chained device into `id`
    fn sync_sub_devices(&mut self, id: DeviceId) {
        let Some(device) = self.devices.get(id.0) else {
            return;
        };
        let count = device.sub_devices().len();
        if count == 0 {
            return;
        }

        for virtual_port in 0..count {
            let sub = self.devices[id.0].sub_devices()[virtual_port];
            let state = sub
                .and_then(|sub| self.devices.get(sub.0))
                .map(|sub| SubDeviceState {
                    kind: sub.kind(),
                    buttons: sub.buttons(),
                });
            self.devices[id.0].refresh_sub_device(virtual_port, state);
        }
        self.devices[id.0].refresh();
    }

    // === Host input ===

    /// Latch new buttons on arena device `id`
    ///
    /// Opposite directions are suppressed for devices with a standard D-pad.
    pub fn update_buttons(&mut self, id: DeviceId, buttons: u32) -> Result<()> {
        let device = self
            .devices
            .get_mut(id.0)
            .ok_or(IoError::InvalidDevice(id.0))?;
        let buttons = if device.has_standard_dpad() {
            Self::constrain_dpad(buttons)
        } else {
            buttons
        };
        device.update(buttons);
        Ok(())
    }

    /// Latch new buttons on the device connected to `port`
    pub fn update_port(&mut self, port: Port, buttons: u32) {
        let id = self.port_device(port);
        // Port ids are validated when connected
        let _ = self.update_buttons(id, buttons);
    }

    /// Move the absolute pointer of arena device `id`
    pub fn update_absolute_position(&mut self, id: DeviceId, x: i32, y: i32) -> Result<()> {
        let device = self
            .devices
            .get_mut(id.0)
            .ok_or(IoError::InvalidDevice(id.0))?;
        device.update_absolute_position(x, y);
        Ok(())
    }

    /// One scanline has passed
    pub fn update_on_scanline(&mut self) {
        for device in &mut self.devices {
            device.update_on_scanline();
        }
    }

    /// Hard reset of every device
    pub fn reset(&mut self) {
        for device in &mut self.devices {
            device.reset();
        }
        for port in Port::ALL {
            self.sync_sub_devices(self.port_device(port));
        }
        log::debug!("I/O: reset");
    }

    /// Reset device-only state, keeping the system-side registers
    pub fn reset_devices(&mut self) {
        for device in &mut self.devices {
            device.reset_device_state();
            device.refresh();
        }
    }

    // === System side ===

    /// Read the data register of `port`
    pub fn read_data(&mut self, port: Port) -> u8 {
        let id = self.port_device(port);
        self.sync_sub_devices(id);
        let device = &mut self.devices[id.0];
        device.update_on_read();
        device.read()
    }

    pub fn write_data(&mut self, port: Port, value: u8) {
        let id = self.port_device(port);
        self.sync_sub_devices(id);
        self.devices[id.0].write_data(value);
    }

    pub fn read_control(&self, port: Port) -> u8 {
        self.devices[self.port_device(port).0].core().ctrl()
    }

    pub fn write_control(&mut self, port: Port, value: u8) {
        let id = self.port_device(port);
        self.sync_sub_devices(id);
        self.devices[id.0].write_control(value);
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    /// Read register `index` of the I/O block
    pub fn read_register(&mut self, index: usize) -> u8 {
        match index {
            0x0 => self.version,
            0x1..=0x3 => self.read_data(Port::ALL[index - 0x1]),
            0x4..=0x6 => self.read_control(Port::ALL[index - 0x4]),
            0x7..=0xF => {
                let port = Port::ALL[(index - 0x7) / 3];
                let device = &self.devices[self.port_device(port).0];
                match (index - 0x7) % 3 {
                    0 => device.serial_last_tx(),
                    1 => 0xFF, // no serial receive
                    _ => device.serial_control(),
                }
            }
            _ => {
                log::trace!("I/O: read from unmapped register 0x{:X}", index);
                0xFF
            }
        }
    }

    /// Write register `index` of the I/O block
    pub fn write_register(&mut self, index: usize, value: u8) {
        match index {
            0x0 => {} // read-only
            0x1..=0x3 => self.write_data(Port::ALL[index - 0x1], value),
            0x4..=0x6 => self.write_control(Port::ALL[index - 0x4], value),
            0x7..=0xF => {
                let port = Port::ALL[(index - 0x7) / 3];
                let id = self.port_device(port);
                let device = &mut self.devices[id.0];
                match (index - 0x7) % 3 {
                    0 => device.set_serial_tx(value),
                    1 => {}
                    _ => device.set_serial_control(value & SERIAL_CONTROL_MASK),
                }
            }
            _ => {
                log::trace!("I/O: write 0x{:02X} to unmapped register 0x{:X}", value, index);
            }
        }
    }
}

impl Default for IoManager {
    fn default() -> Self {
        Self::new()
    }
}
