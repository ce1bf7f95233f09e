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

//! EEPROM test modules
//!
//! - `protocol`: START/STOP, reads, writes, page wrap, recovery
//! - `ports`: byte/word port decoding and line extraction
//! - `config`: type selection, reset, snapshots

use super::*;




/// Single port carrying SCL on bit 1 and SDA on bit 0 (Sega layout)
pub(super) const PORT: u32 = 0x200001;

/// X24C01-style part with an 8-byte page
pub(super) fn paged_mapper() -> EepromMapper {
    EepromMapper {
        chip: ChipSpec {
            name: "test",
            size_mask: 0x7F,
            page_mask: 0x07,
            mode: AddressingMode::Single,
        },
        scl: LineWiring::new(PORT, 1),
        sda_in: LineWiring::new(PORT, 0),
        sda_out: LineWiring::new(PORT, 0),
    }
}

/// Bit-banging bus master driving [`PORT`]
pub(super) struct Master<'a> {
    pub eeprom: &'a mut Eeprom,
    scl: bool,
    sda: bool,
}

impl<'a> Master<'a> {
    pub fn new(eeprom: &'a mut Eeprom) -> Self {
        Self {
            eeprom,
            scl: true,
            sda: true,
        }
    }

    fn drive(&mut self, scl: bool, sda: bool) {
        self.scl = scl;
        self.sda = sda;
        let value = ((scl as u8) << 1) | sda as u8;
        self.eeprom.write_byte(PORT, value);
    }

    /// Pull SCL low without touching SDA
    pub fn drive_low(&mut self) {
        self.drive(false, self.sda);
    }

    fn sample(&self) -> bool {
        self.eeprom.read_byte(PORT) & 1 != 0
    }

    pub fn start(&mut self) {
        self.drive(self.scl, true);
        self.drive(true, true);
        self.drive(true, false);
        self.drive(false, false);
    }

    pub fn stop(&mut self) {
        self.drive(false, false);
        self.drive(true, false);
        self.drive(true, true);
    }

    /// Clock one bit out; returns SDA sampled while SCL is high
    pub fn clock(&mut self, bit: bool) -> bool {
        self.drive(false, bit);
        self.drive(true, bit);
        let seen = self.sample();
        self.drive(false, bit);
        seen
    }

    /// Send a byte MSB first; returns true when the chip acknowledged
    pub fn send(&mut self, byte: u8) -> bool {
        for bit in (0..8).rev() {
            self.clock(byte & (1 << bit) != 0);
        }
        !self.clock(true)
    }

    /// Receive a byte MSB first, then acknowledge it or not
    pub fn receive(&mut self, ack: bool) -> u8 {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.clock(true) as u8;
        }
        self.clock(!ack);
        byte
    }

    /// START, address byte with R/W=0, data bytes, STOP
    pub fn write(&mut self, address: u8, bytes: &[u8]) {
        self.start();
        assert!(self.send(address << 1), "address not acknowledged");
        for &byte in bytes {
            assert!(self.send(byte), "data not acknowledged");
        }
        self.stop();
    }

    /// START, address byte with R/W=1, `count` sequential bytes, STOP
    pub fn read(&mut self, address: u8, count: usize) -> Vec<u8> {
        self.start();
        assert!(self.send((address << 1) | 1), "address not acknowledged");
        let bytes = (0..count).map(|i| self.receive(i + 1 < count)).collect();
        self.stop();
        bytes
    }
}

/// EEPROM configured with [`paged_mapper`]
pub(super) fn paged_eeprom() -> Eeprom {
    let mut eeprom = Eeprom::new();
    eeprom.set_geometry(paged_mapper()).unwrap();
    eeprom
}
