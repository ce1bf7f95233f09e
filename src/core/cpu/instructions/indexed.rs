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

//! DD/FD-prefixed instructions
//!
//! The prefix swaps HL for IX or IY in the following instruction: `H`/`L`
//! become the undocumented `IXH`/`IXL` halves and `(HL)` becomes `(IX+d)`.
//! When an instruction uses `(IX+d)` the other register operand is the real
//! H or L. Opcodes that do not involve HL execute unchanged after the
//! 4 T-state prefix.

use super::super::registers::IndexReg;
use super::super::timing;
use super::super::Z80;

/// Cost of a prefix that is immediately followed by another prefix
const PREFIX_CYCLES: i32 = 4;

impl Z80 {
    /// Decode and execute a DD- or FD-prefixed instruction
    pub(super) fn execute_indexed(&mut self, xy: IndexReg) {
        let op = self.fetch_opcode();

        match op {
            0xDD | 0xED | 0xFD => {
                // The first prefix acts as a NOP; the second is decoded again
                // on the next dispatch, with no interrupt accepted in between.
                self.charge(PREFIX_CYCLES);
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                self.regs.unbump_refresh();
                self.prefix_shadow = true;
                return;
            }
            0xCB => {
                self.execute_indexed_cb(xy);
                return;
            }
            _ => {}
        }

        self.charge(timing::XY[op as usize] as i32);

        match op {
            0x09 | 0x19 | 0x29 | 0x39 => {
                // ADD IX,rr (rr = BC, DE, IX, SP)
                let index = self.regs.index(xy);
                let value = match (op >> 4) & 3 {
                    2 => index,
                    pair => self.regs.get16_sp(pair),
                };
                let result = self.add16(index, value);
                self.regs.set_index(xy, result);
            }
            0x21 => {
                // LD IX,nn
                let value = self.fetch16();
                self.regs.set_index(xy, value);
            }
            0x22 => {
                // LD (nn),IX
                let value = self.regs.index(xy);
                self.store16_nn(value);
            }
            0x2A => {
                // LD IX,(nn)
                let value = self.load16_nn();
                self.regs.set_index(xy, value);
            }
            0x23 => {
                // INC IX
                let value = self.regs.index(xy).wrapping_add(1);
                self.regs.set_index(xy, value);
            }
            0x2B => {
                // DEC IX
                let value = self.regs.index(xy).wrapping_sub(1);
                self.regs.set_index(xy, value);
            }
            0x24 | 0x2C => {
                // INC IXH / INC IXL
                let reg = op >> 3;
                let value = self.regs.get8_indexed(reg, xy);
                let result = self.inc8(value);
                self.regs.set8_indexed(reg, xy, result);
            }
            0x25 | 0x2D => {
                // DEC IXH / DEC IXL
                let reg = op >> 3;
                let value = self.regs.get8_indexed(reg, xy);
                let result = self.dec8(value);
                self.regs.set8_indexed(reg, xy, result);
            }
            0x26 | 0x2E => {
                // LD IXH,n / LD IXL,n
                let value = self.fetch8();
                self.regs.set8_indexed(op >> 3, xy, value);
            }
            0x34 => {
                // INC (IX+d)
                let address = self.index_address(xy);
                let value = self.read8(address);
                let result = self.inc8(value);
                self.write8(address, result);
            }
            0x35 => {
                // DEC (IX+d)
                let address = self.index_address(xy);
                let value = self.read8(address);
                let result = self.dec8(value);
                self.write8(address, result);
            }
            0x36 => {
                // LD (IX+d),n
                let address = self.index_address(xy);
                let value = self.fetch8();
                self.write8(address, value);
            }
            0x40..=0x75 | 0x77..=0x7F => self.op_ld_indexed(op, xy),
            0x80..=0xBF => {
                // ALU A,IXH / ALU A,IXL / ALU A,(IX+d)
                let src = op & 7;
                let value = if src == 6 {
                    let address = self.index_address(xy);
                    self.read8(address)
                } else {
                    self.regs.get8_indexed(src, xy)
                };
                self.alu8(op >> 3, value);
            }
            0xE1 => {
                // POP IX
                let value = self.pop16();
                self.regs.set_index(xy, value);
            }
            0xE5 => {
                // PUSH IX
                let value = self.regs.index(xy);
                self.push16(value);
            }
            0xE3 => {
                // EX (SP),IX
                let value = self.regs.index(xy);
                let top = self.exchange_stack(value);
                self.regs.set_index(xy, top);
            }
            0xE9 => {
                // JP (IX)
                self.regs.pc = self.regs.index(xy);
            }
            0xF9 => {
                // LD SP,IX
                self.regs.sp = self.regs.index(xy);
            }
            _ => self.execute_main(op),
        }
    }

    /// LD r,r' under a DD/FD prefix
    fn op_ld_indexed(&mut self, op: u8, xy: IndexReg) {
        let dst = (op >> 3) & 7;
        let src = op & 7;

        if src == 6 {
            // LD r,(IX+d): r is the real register
            let address = self.index_address(xy);
            let value = self.read8(address);
            self.regs.set8(dst, value);
        } else if dst == 6 {
            // LD (IX+d),r
            let address = self.index_address(xy);
            let value = self.regs.get8(src);
            self.write8(address, value);
        } else {
            let value = self.regs.get8_indexed(src, xy);
            self.regs.set8_indexed(dst, xy, value);
        }
    }

    /// DDCB d op / FDCB d op
    ///
    /// The displacement comes before the opcode and neither byte is an M1
    /// fetch, so R advances only for the two prefixes. Rotates, RES and SET
    /// also copy the result into the register named by the low three bits
    /// unless that encoding is 6.
    fn execute_indexed_cb(&mut self, xy: IndexReg) {
        let address = self.index_address(xy);
        let op = self.fetch8();
        self.charge(timing::xy_cb(op) as i32);

        let reg = op & 7;
        let bit = (op >> 3) & 7;
        let value = self.read8(address);

        let result = match op >> 6 {
            0 => self.cb_shift(bit, value),
            1 => {
                self.bit_test(bit, value, (address >> 8) as u8);
                return;
            }
            2 => value & !(1 << bit),
            _ => value | (1 << bit),
        };

        self.write8(address, result);
        if reg != 6 {
            self.regs.set8(reg, result);
        }
    }
}
