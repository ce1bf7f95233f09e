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

//! Custom assertions for Z80 machine testing

use genscore::core::cpu::{Reg8, Z80};

use super::fixtures::Machine;

/// Assert an 8-bit register has the expected value
#[allow(dead_code)]
pub fn assert_reg8(cpu: &Z80, reg: Reg8, expected: u8) {
    let actual = cpu.reg8(reg);
    assert_eq!(
        actual, expected,
        "Register {:?} mismatch: expected 0x{:02X}, got 0x{:02X}",
        reg, expected, actual
    );
}

/// Assert PC is at the expected address
#[allow(dead_code)]
pub fn assert_pc(cpu: &Z80, expected: u16) {
    let actual = cpu.pc();
    assert_eq!(
        actual, expected,
        "PC mismatch: expected 0x{:04X}, got 0x{:04X}",
        expected, actual
    );
}

/// Assert RAM holds the expected byte
#[allow(dead_code)]
pub fn assert_ram(machine: &Machine, address: u16, expected: u8) {
    let actual = machine.peek(address);
    assert_eq!(
        actual, expected,
        "RAM at 0x{:04X} mismatch: expected 0x{:02X}, got 0x{:02X}",
        address, expected, actual
    );
}
