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

//! Serial EEPROM
//!
//! Two-wire (I2C) EEPROM as found on Mega Drive cartridges. The CPU
//! bit-bangs SCL and SDA through memory-mapped ports; the chip answers on its
//! own SDA output, wired-AND with the master's.
//!
//! # Bus protocol
//!
//! ```text
//!   START : SDA falls while SCL is high
//!   STOP  : SDA rises while SCL is high
//!   bit   : master sets SDA while SCL is low, chip samples on SCL rising
//!
//!   STANDBY ──START──> WORD_ADDRESS ──R/W=0──> WRITE_DATA ─┐
//!      ^                    │                              │
//!      │                    └────R/W=1──> READ_DATA ───────┤
//!      └──────────────────────────STOP─────────────────────┘
//! ```
//!
//! Each byte takes nine clocks: eight data bits MSB first plus one
//! acknowledge slot driven low by the receiver.

mod chips;
#[cfg(test)]
mod tests;

pub use chips::{
    find_mapper, AddressingMode, ChipSpec, EepromMapper, LineWiring, MapperEntry, C24C01, C24C02,
    C24C04, C24C08, C24C16, C24C32, C24C64, MAPPER_DB, MAX_EEPROM_SIZE, X24C01,
};

use serde::{Deserialize, Serialize};

use crate::core::error::{EepromError, Result};

/// Protocol state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Idle between transactions
    #[default]
    Standby,
    /// X24C01: waiting for the word address and R/W bit
    WordAddress,
    /// 24Cxx: waiting for the device address (not modelled)
    DeviceAddress,
    /// 24C32 and up: waiting for the high word address byte (not modelled)
    WordAddressHigh,
    /// Sending bytes to the master
    ReadData,
    /// Receiving bytes from the master
    WriteData,
}

/// Serializable copy of the protocol registers
///
/// Storage is not included; hosts persist it through [`Eeprom::data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EepromState {
    pub scl: bool,
    pub sda_in: bool,
    pub sda_out: bool,
    pub scl_prev: bool,
    pub sda_in_prev: bool,
    pub sda_out_prev: bool,
    pub address: u16,
    pub counter: u8,
    pub rw: bool,
    pub shift_out: bool,
    pub buffer: u8,
    pub phase: Phase,
    pub dirty: bool,
}

/// I2C EEPROM protocol engine
///
/// # Example
/// ```
/// use genscore::core::eeprom::{find_mapper, Eeprom};
///
/// let mut eeprom = Eeprom::new();
/// eeprom.set_eeprom_type(find_mapper("Sega X24C01")).unwrap();
/// assert!(eeprom.is_type_set());
/// assert!(eeprom.is_write_byte_port(0x200001));
/// assert_eq!(eeprom.read_byte(0x200001), 0x01); // SDA idles high
/// ```
pub struct Eeprom {
    mapper: Option<EepromMapper>,
    memory: Vec<u8>,
    dirty: bool,

    // Line levels
    scl: bool,
    sda_in: bool,
    sda_out: bool,
    scl_prev: bool,
    sda_in_prev: bool,
    sda_out_prev: bool,

    /// Word address of the next byte
    address: u16,
    /// Clock count within the current byte (0-9)
    counter: u8,
    /// R/W bit of the last address byte
    rw: bool,
    /// true while the chip shifts data out
    shift_out: bool,
    /// Byte in flight
    buffer: u8,
    phase: Phase,
}

impl Eeprom {
    /// Create an EEPROM with no chip selected
    pub fn new() -> Self {
        let mut eeprom = Self {
            mapper: None,
            memory: vec![0xFF; MAX_EEPROM_SIZE],
            dirty: false,
            scl: true,
            sda_in: true,
            sda_out: true,
            scl_prev: true,
            sda_in_prev: true,
            sda_out_prev: true,
            address: 0,
            counter: 0,
            rw: false,
            shift_out: false,
            buffer: 0,
            phase: Phase::Standby,
        };
        eeprom.reset();
        eeprom
    }

    /// Erase storage and return to standby
    ///
    /// The selected chip is kept.
    pub fn reset(&mut self) {
        self.memory.fill(0xFF);
        self.dirty = false;

        self.scl = true;
        self.sda_in = true;
        self.sda_out = true;
        self.scl_prev = true;
        self.sda_in_prev = true;
        self.sda_out_prev = true;

        self.address = 0;
        self.counter = 0;
        self.rw = false;
        self.shift_out = false;
        self.buffer = 0;
        self.phase = Phase::Standby;
    }

    /// Select a built-in board layout from [`MAPPER_DB`]
    ///
    /// # Arguments
    ///
    /// * `index` - Index into [`MAPPER_DB`]; `None` resets the EEPROM
    ///
    /// # Returns
    ///
    /// - `Ok(())` on success
    /// - `Err(EepromError::InvalidType)` for an out-of-range index, with the
    ///   current configuration left untouched
    pub fn set_eeprom_type(&mut self, index: Option<usize>) -> Result<()> {
        let Some(index) = index else {
            self.reset();
            return Ok(());
        };

        let entry = MAPPER_DB.get(index).ok_or(EepromError::InvalidType {
            index,
            max: MAPPER_DB.len() - 1,
        })?;
        log::debug!("EEPROM: type {} ({})", index, entry.name);
        self.mapper = Some(entry.mapper);
        Ok(())
    }

    /// Use a board layout that is not in the database
    ///
    /// # Returns
    ///
    /// - `Ok(())` on success
    /// - `Err(EepromError::InvalidGeometry)` when the chip does not fit the
    ///   storage or its page bits fall outside the size mask, with the
    ///   current configuration left untouched
    pub fn set_geometry(&mut self, mapper: EepromMapper) -> Result<()> {
        let chip = mapper.chip;
        if chip.size() > MAX_EEPROM_SIZE {
            return Err(EepromError::InvalidGeometry {
                chip: chip.name,
                reason: format!(
                    "size mask 0x{:04X} exceeds 0x{:04X} bytes",
                    chip.size_mask, MAX_EEPROM_SIZE
                ),
            }
            .into());
        }
        if chip.page_mask & !chip.size_mask != 0 {
            return Err(EepromError::InvalidGeometry {
                chip: chip.name,
                reason: format!(
                    "page mask 0x{:04X} outside size mask 0x{:04X}",
                    chip.page_mask, chip.size_mask
                ),
            }
            .into());
        }

        log::debug!(
            "EEPROM: custom {} geometry, size mask 0x{:04X}",
            mapper.chip.name,
            mapper.chip.size_mask
        );
        self.mapper = Some(mapper);
        Ok(())
    }

    pub fn mapper(&self) -> Option<&EepromMapper> {
        self.mapper.as_ref()
    }

    pub fn is_type_set(&self) -> bool {
        self.mapper.is_some_and(|m| m.chip.size_mask != 0)
    }

    /// Storage has been written since the last [`Self::clear_dirty`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Raw storage of the selected chip
    pub fn data(&self) -> &[u8] {
        &self.memory[..self.size()]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let size = self.size();
        &mut self.memory[..size]
    }

    fn size(&self) -> usize {
        self.mapper.map_or(0, |m| m.chip.size().min(MAX_EEPROM_SIZE))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    // === Port decoding ===

    pub fn is_read_byte_port(&self, address: u32) -> bool {
        self.mapper.is_some_and(|m| address == m.sda_out.address)
    }

    pub fn is_read_word_port(&self, address: u32) -> bool {
        self.mapper
            .is_some_and(|m| (address | 1) == (m.sda_out.address | 1))
    }

    pub fn is_write_byte_port(&self, address: u32) -> bool {
        self.mapper
            .is_some_and(|m| address == m.scl.address || address == m.sda_in.address)
    }

    pub fn is_write_word_port(&self, address: u32) -> bool {
        let address = address | 1;
        self.mapper.is_some_and(|m| {
            address == (m.scl.address | 1) || address == (m.sda_in.address | 1)
        })
    }

    // === Bus access ===

    /// Read the SDA output port (byte-wide)
    ///
    /// # Returns
    ///
    /// SDA shifted to its wired bit, or 0xFF for any other address
    pub fn read_byte(&self, address: u32) -> u8 {
        match self.mapper {
            Some(m) if address == m.sda_out.address => (self.sda() as u8) << m.sda_out.bit,
            _ => 0xFF,
        }
    }

    /// Read the SDA output port (word-wide)
    ///
    /// An even wiring address is the high byte of the word.
    pub fn read_word(&self, address: u32) -> u16 {
        match self.mapper {
            Some(m) if (address & !1) == (m.sda_out.address & !1) => {
                let lane = if m.sda_out.address & 1 == 0 { 8 } else { 0 };
                (self.sda() as u16) << (m.sda_out.bit as u32 + lane)
            }
            _ => 0xFFFF,
        }
    }

    /// Write SCL and/or SDA (byte-wide)
    ///
    /// A line not wired to `address` keeps its previous level.
    pub fn write_byte(&mut self, address: u32, data: u8) {
        let Some(m) = self.mapper else {
            return;
        };
        if address != m.scl.address && address != m.sda_in.address {
            return;
        }

        self.scl = if address == m.scl.address {
            (data >> m.scl.bit) & 1 != 0
        } else {
            self.scl_prev
        };
        self.sda_in = if address == m.sda_in.address {
            (data >> m.sda_in.bit) & 1 != 0
        } else {
            self.sda_in_prev
        };
        self.process_bit();
    }

    /// Write SCL and/or SDA (word-wide)
    ///
    /// The even byte is the high half of `data`.
    pub fn write_word(&mut self, address: u32, data: u16) {
        let Some(m) = self.mapper else {
            return;
        };
        if !self.is_write_word_port(address) {
            return;
        }

        let address = address & !1;
        self.scl = Self::word_line(address, data, m.scl).unwrap_or(self.scl_prev);
        self.sda_in = Self::word_line(address, data, m.sda_in).unwrap_or(self.sda_in_prev);
        self.process_bit();
    }

    /// Level of `line` within a word written at even `address`
    fn word_line(address: u32, data: u16, line: LineWiring) -> Option<bool> {
        let bit = if address == line.address {
            line.bit as u32 + 8
        } else if (address | 1) == line.address {
            line.bit as u32
        } else {
            return None;
        };
        Some((data >> bit) & 1 != 0)
    }

    // === Protocol ===

    /// SDA as seen on the bus (wired-AND)
    #[inline]
    fn sda(&self) -> bool {
        self.sda_in && self.sda_out
    }

    #[inline]
    fn start_condition(&self) -> bool {
        self.scl && self.scl_prev && self.sda_in_prev && !self.sda_in
    }

    #[inline]
    fn stop_condition(&self) -> bool {
        self.scl && self.scl_prev && !self.sda_in_prev && self.sda_in
    }

    #[inline]
    fn scl_rose(&self) -> bool {
        self.scl && !self.scl_prev
    }

    #[inline]
    fn scl_fell(&self) -> bool {
        !self.scl && self.scl_prev
    }

    /// Clear the shift logic
    fn reset_shift(&mut self) {
        self.counter = 0;
        self.sda_out = true;
        self.buffer = 0;
        self.shift_out = false;
    }

    /// Drop back to standby after an unexpected byte
    fn desync(&mut self) {
        log::warn!("EEPROM: byte completed in {:?}, back to standby", self.phase);
        self.reset_shift();
        self.phase = Phase::Standby;
    }

    /// Handle the line levels just written
    fn process_bit(&mut self) {
        self.sda_out_prev = self.sda_out;

        if self.is_type_set() {
            self.step();
        }

        self.scl_prev = self.scl;
        self.sda_in_prev = self.sda_in;
    }

    fn step(&mut self) {
        if self.stop_condition() {
            log::debug!("EEPROM: STOP");
            self.reset_shift();
            self.phase = Phase::Standby;
            return;
        }

        if self.start_condition() {
            log::debug!("EEPROM: START");
            self.reset_shift();
            // Multi-byte addressing stays in standby
            if self.mapper.is_some_and(|m| m.chip.mode == AddressingMode::Single) {
                self.phase = Phase::WordAddress;
            }
            return;
        }

        if self.phase == Phase::Standby {
            return;
        }

        if self.shift_out {
            self.shift_out_bit();
        } else {
            self.shift_in_bit();
        }
    }

    /// Master is writing a byte
    fn shift_in_bit(&mut self) {
        if self.scl_rose() {
            if self.counter < 8 {
                self.buffer = (self.buffer << 1) | self.sda() as u8;
                self.counter += 1;
                log::trace!("EEPROM: bit {} in, buffer 0x{:02X}", self.counter, self.buffer);
                return;
            }

            // Acknowledge slot
            self.sda_out = false;
            self.counter += 1;
            self.complete_byte();
        } else if self.scl_fell() {
            self.sda_out = true;
            if self.counter >= 9 {
                self.counter = 0;
            }
        }
    }

    /// Act on a fully received byte
    fn complete_byte(&mut self) {
        let Some(m) = self.mapper else {
            return;
        };

        match self.phase {
            Phase::WordAddress => {
                self.address = ((self.buffer >> 1) & 0x7F) as u16;
                self.rw = self.buffer & 1 != 0;
                self.counter = 0;
                if self.rw {
                    self.buffer = self.memory[self.address as usize];
                    self.shift_out = true;
                    self.phase = Phase::ReadData;
                } else {
                    self.buffer = 0;
                    self.shift_out = false;
                    self.phase = Phase::WriteData;
                }
                log::debug!(
                    "EEPROM: word address 0x{:02X}, {}",
                    self.address,
                    if self.rw { "read" } else { "write" }
                );
            }
            Phase::WriteData => {
                let written = self.address;
                self.memory[written as usize] = self.buffer;
                self.dirty = true;

                // Only the page bits advance
                let page = m.chip.page_mask;
                self.address = (self.address & !page) | (self.address.wrapping_add(1) & page);
                self.buffer = 0;
                log::debug!(
                    "EEPROM: 0x{:02X} -> [0x{:04X}], next 0x{:04X}",
                    self.memory[written as usize],
                    written,
                    self.address
                );
            }
            _ => self.desync(),
        }
    }

    /// Master is reading a byte
    fn shift_out_bit(&mut self) {
        if self.scl_rose() {
            // Master ACK after the ninth clock
            if self.counter >= 9 && !self.sda() {
                match (self.phase, self.mapper) {
                    (Phase::ReadData, Some(m)) => {
                        self.address = self.address.wrapping_add(1) & m.chip.size_mask;
                        self.buffer = self.memory[self.address as usize];
                        self.counter = 0;
                        log::debug!(
                            "EEPROM: ACK, next read [0x{:04X}] = 0x{:02X}",
                            self.address,
                            self.buffer
                        );
                    }
                    _ => self.desync(),
                }
            }
        } else if self.scl_fell() {
            if self.counter < 8 {
                self.sda_out = self.buffer & 0x80 != 0;
                self.buffer <<= 1;
                self.counter += 1;
                log::trace!("EEPROM: bit {} out = {}", self.counter, self.sda_out as u8);
            } else if self.counter == 8 {
                self.sda_out = true;
                self.counter += 1;
            }
        }
    }

    // === Snapshots ===

    pub fn snapshot(&self) -> EepromState {
        EepromState {
            scl: self.scl,
            sda_in: self.sda_in,
            sda_out: self.sda_out,
            scl_prev: self.scl_prev,
            sda_in_prev: self.sda_in_prev,
            sda_out_prev: self.sda_out_prev,
            address: self.address,
            counter: self.counter,
            rw: self.rw,
            shift_out: self.shift_out,
            buffer: self.buffer,
            phase: self.phase,
            dirty: self.dirty,
        }
    }

    /// Restore protocol registers
    ///
    /// The word address is masked to the active chip (or to the storage
    /// when no chip is set) and the bit counter is capped at 9.
    pub fn restore(&mut self, state: &EepromState) {
        self.scl = state.scl;
        self.sda_in = state.sda_in;
        self.sda_out = state.sda_out;
        self.scl_prev = state.scl_prev;
        self.sda_in_prev = state.sda_in_prev;
        self.sda_out_prev = state.sda_out_prev;
        let mask = self
            .mapper
            .map_or(MAX_EEPROM_SIZE as u16 - 1, |m| m.chip.size_mask);
        self.address = state.address & mask;
        self.counter = state.counter.min(9);
        self.rw = state.rw;
        self.shift_out = state.shift_out;
        self.buffer = state.buffer;
        self.phase = state.phase;
        self.dirty = state.dirty;
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}
