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

//! CPU test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: initialization, reset, register access, snapshots, open bus
//! - `instructions`: instruction execution results
//! - `flags`: undocumented flag bits and WZ behaviour
//! - `interrupts`: NMI/IRQ acceptance, modes, EI shadow, HALT
//! - `refresh`: R register counting
//! - `timing`: T-state costs and budget carry-over

use std::cell::RefCell;
use std::rc::Rc;

use super::*;




#[cfg(test)]
mod interrupts;



/// Stack pointer used by the test machine
pub(super) const STACK_TOP: u16 = 0xF000;

/// Build a Z80 with 64 KiB of RAM holding `program` at 0x0000
pub(super) fn machine(program: &[u8]) -> (Z80, SharedMemory) {
    let ram = FlatMemory::new();
    ram.load(0x0000, program);
    let shared = ram.shared();

    let mut cpu = Z80::new();
    cpu.set_memory_handler(Box::new(ram));
    cpu.set_reg16(Reg16::SP, STACK_TOP);
    (cpu, shared)
}

/// Execute `count` instructions and return the T-states they took
pub(super) fn run(cpu: &mut Z80, count: usize) -> i32 {
    (0..count).map(|_| cpu.step_instruction()).sum()
}

/// Port handler that records writes and answers reads from a fixed value
#[derive(Clone, Default)]
pub(super) struct PortLog {
    pub writes: Rc<RefCell<Vec<(u16, u8)>>>,
    pub reads: Rc<RefCell<Vec<u16>>>,
    pub input: u8,
}

impl PortHandler for PortLog {
    fn in_port(&mut self, port: u16) -> u8 {
        self.reads.borrow_mut().push(port);
        self.input
    }

    fn out_port(&mut self, port: u16, value: u8) {
        self.writes.borrow_mut().push((port, value));
    }
}

/// Interrupt handler that answers with a fixed byte and counts RETIs
#[derive(Clone, Default)]
pub(super) struct AckLog {
    pub bus_byte: Option<u8>,
    pub acks: Rc<RefCell<Vec<u8>>>,
    pub retis: Rc<RefCell<u32>>,
}

impl InterruptHandler for AckLog {
    fn acknowledge(&mut self, vector: u8) -> u8 {
        self.acks.borrow_mut().push(vector);
        self.bus_byte.unwrap_or(vector)
    }

    fn on_reti(&mut self) {
        *self.retis.borrow_mut() += 1;
    }
}
