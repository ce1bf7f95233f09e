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

//! Test machine: Z80 + RAM + serial EEPROM + controller I/O
//!
//! ```text
//!   0x0000-0x7FFF  RAM
//!   0x8001         EEPROM: bit 1 = SCL (write), bit 0 = SDA (read/write)
//!   0x9000-0x900F  I/O register block
//!   everything else: open bus
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use genscore::core::cpu::{MemoryHandler, OPEN_BUS, Z80};
use genscore::core::eeprom::{ChipSpec, Eeprom, EepromMapper, LineWiring, X24C01};
use genscore::core::io::IoManager;

pub const RAM_SIZE: usize = 0x8000;
pub const EEPROM_PORT: u16 = 0x8001;
pub const IO_BASE: u16 = 0x9000;

/// EEPROM wiring on the test machine
#[allow(dead_code)]
pub fn test_mapper(chip: ChipSpec) -> EepromMapper {
    EepromMapper {
        chip,
        scl: LineWiring::new(EEPROM_PORT as u32, 1),
        sda_in: LineWiring::new(EEPROM_PORT as u32, 0),
        sda_out: LineWiring::new(EEPROM_PORT as u32, 0),
    }
}

/// Memory map of the test machine
pub struct MachineBus {
    pub ram: Rc<RefCell<Vec<u8>>>,
    pub eeprom: Rc<RefCell<Eeprom>>,
    pub io: Rc<RefCell<IoManager>>,
}

impl MemoryHandler for MachineBus {
    fn read_byte(&mut self, address: u16) -> u8 {
        match address {
            0x0000..=0x7FFF => self.ram.borrow()[address as usize],
            EEPROM_PORT => self.eeprom.borrow().read_byte(address as u32),
            0x9000..=0x900F => self
                .io
                .borrow_mut()
                .read_register((address - IO_BASE) as usize),
            _ => OPEN_BUS,
        }
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x7FFF => self.ram.borrow_mut()[address as usize] = value,
            EEPROM_PORT => self.eeprom.borrow_mut().write_byte(address as u32, value),
            0x9000..=0x900F => self
                .io
                .borrow_mut()
                .write_register((address - IO_BASE) as usize, value),
            _ => {}
        }
    }
}

/// Z80 wired to the test machine bus
pub struct Machine {
    pub cpu: Z80,
    pub ram: Rc<RefCell<Vec<u8>>>,
    pub eeprom: Rc<RefCell<Eeprom>>,
    pub io: Rc<RefCell<IoManager>>,
}

impl Machine {
    /// Build a machine with `program` at 0x0000 and an X24C01 fitted
    #[allow(dead_code)]
    pub fn new(program: &[u8]) -> Self {
        Self::with_io(program, IoManager::new())
    }

    #[allow(dead_code)]
    pub fn with_io(program: &[u8], io: IoManager) -> Self {
        let ram = Rc::new(RefCell::new(vec![0u8; RAM_SIZE]));
        ram.borrow_mut()[..program.len()].copy_from_slice(program);

        let mut eeprom = Eeprom::new();
        eeprom.set_geometry(test_mapper(X24C01)).unwrap();
        let eeprom = Rc::new(RefCell::new(eeprom));
        let io = Rc::new(RefCell::new(io));

        let mut cpu = Z80::new();
        cpu.set_memory_handler(Box::new(MachineBus {
            ram: Rc::clone(&ram),
            eeprom: Rc::clone(&eeprom),
            io: Rc::clone(&io),
        }));

        Self {
            cpu,
            ram,
            eeprom,
            io,
        }
    }

    /// Copy `bytes` into RAM at `address`
    #[allow(dead_code)]
    pub fn load(&self, address: u16, bytes: &[u8]) {
        let start = address as usize;
        self.ram.borrow_mut()[start..start + bytes.len()].copy_from_slice(bytes);
    }

    #[allow(dead_code)]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram.borrow()[address as usize]
    }

    /// Run until HALT or until `limit` T-states have passed
    #[allow(dead_code)]
    pub fn run_to_halt(&mut self, limit: u64) {
        let start = self.cpu.total_cycles();
        while !self.cpu.is_halted() && self.cpu.total_cycles() - start < limit {
            self.cpu.step_instruction();
        }
        assert!(self.cpu.is_halted(), "no HALT within {limit} T-states");
    }
}

/// Sequence of SCL/SDA levels for the EEPROM port
///
/// Each entry is written to the port by a Z80 loop that samples the port
/// right after the write.
#[derive(Default)]
pub struct LineScript {
    pub levels: Vec<u8>,
    /// Entries whose sample carries a data bit from the chip
    pub data_samples: Vec<usize>,
    /// Entries whose sample carries an acknowledge from the chip
    pub ack_samples: Vec<usize>,
    scl: bool,
    sda: bool,
}

#[allow(dead_code)]
impl LineScript {
    pub fn new() -> Self {
        Self {
            scl: true,
            sda: true,
            ..Default::default()
        }
    }

    fn push(&mut self, scl: bool, sda: bool) -> usize {
        self.scl = scl;
        self.sda = sda;
        self.levels.push(((scl as u8) << 1) | sda as u8);
        self.levels.len() - 1
    }

    fn clock(&mut self, bit: bool) -> usize {
        self.push(false, bit);
        let high = self.push(true, bit);
        self.push(false, bit);
        high
    }

    pub fn start(&mut self) {
        self.push(self.scl, true);
        self.push(true, true);
        self.push(true, false);
        self.push(false, false);
    }

    pub fn stop(&mut self) {
        self.push(false, false);
        self.push(true, false);
        self.push(true, true);
    }

    pub fn send(&mut self, byte: u8) {
        for bit in (0..8).rev() {
            self.clock(byte & (1 << bit) != 0);
        }
        let ack = self.clock(true);
        self.ack_samples.push(ack);
    }

    pub fn receive(&mut self, ack: bool) {
        for _ in 0..8 {
            let sample = self.clock(true);
            self.data_samples.push(sample);
        }
        self.clock(!ack);
    }

    /// Bytes received, rebuilt from the sampled port values
    pub fn decode(&self, samples: &[u8]) -> Vec<u8> {
        self.data_samples
            .chunks(8)
            .map(|bits| {
                bits.iter()
                    .fold(0u8, |byte, &i| (byte << 1) | (samples[i] & 1))
            })
            .collect()
    }

    /// true if every byte sent was acknowledged
    pub fn all_acked(&self, samples: &[u8]) -> bool {
        self.ack_samples.iter().all(|&i| samples[i] & 1 == 0)
    }
}

/// Where the bit-bang program keeps its table and samples
pub const SCRIPT_TABLE: u16 = 0x2000;
pub const SCRIPT_SAMPLES: u16 = 0x4000;

/// Z80 loop that plays a [`LineScript`] on the EEPROM port
///
/// ```text
///         LD   HL,SCRIPT_TABLE
///         LD   DE,SCRIPT_SAMPLES
///         LD   BC,count
/// loop:   LD   A,(HL)
///         LD   (EEPROM_PORT),A
///         LD   A,(EEPROM_PORT)
///         LD   (DE),A
///         INC  HL
///         INC  DE
///         DEC  BC
///         LD   A,B
///         OR   C
///         JR   NZ,loop
///         HALT
/// ```
#[allow(dead_code)]
pub fn bit_bang_program(count: u16) -> Vec<u8> {
    let [table_lo, table_hi] = SCRIPT_TABLE.to_le_bytes();
    let [samples_lo, samples_hi] = SCRIPT_SAMPLES.to_le_bytes();
    let [count_lo, count_hi] = count.to_le_bytes();
    let [port_lo, port_hi] = EEPROM_PORT.to_le_bytes();
    vec![
        0x21, table_lo, table_hi, // LD HL,table
        0x11, samples_lo, samples_hi, // LD DE,samples
        0x01, count_lo, count_hi, // LD BC,count
        0x7E, // loop: LD A,(HL)
        0x32, port_lo, port_hi, // LD (port),A
        0x3A, port_lo, port_hi, // LD A,(port)
        0x12, // LD (DE),A
        0x23, // INC HL
        0x13, // INC DE
        0x0B, // DEC BC
        0x78, // LD A,B
        0xB1, // OR C
        0x20, 0xF1, // JR NZ,loop
        0x76, // HALT
    ]
}

/// Play `script` on a machine and return the sampled port values
#[allow(dead_code)]
pub fn play(machine: &mut Machine, script: &LineScript) -> Vec<u8> {
    let count = script.levels.len() as u16;
    machine.load(0x0000, &bit_bang_program(count));
    machine.load(SCRIPT_TABLE, &script.levels);
    machine.cpu.reset();
    machine.run_to_halt(10_000_000);

    let start = SCRIPT_SAMPLES as usize;
    machine.ram.borrow()[start..start + script.levels.len()].to_vec()
}
