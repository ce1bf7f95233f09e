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

//! CB-prefixed instructions: rotates, shifts, BIT, RES, SET

use super::super::flags::{CF, HF, PF, SF, XYF, ZF};
use super::super::timing;
use super::super::Z80;

impl Z80 {
    /// Decode and execute a CB-prefixed instruction
    ///
    /// ```text
    /// 7 6 | 5 4 3 | 2 1 0
    /// grp |  bit  |  reg     grp: 0 = shift, 1 = BIT, 2 = RES, 3 = SET
    /// ```
    pub(super) fn execute_cb(&mut self) {
        let op = self.fetch_opcode();
        self.charge(timing::CB[op as usize] as i32);

        let reg = op & 7;
        let bit = (op >> 3) & 7;
        let value = self.read_operand(reg);

        match op >> 6 {
            0 => {
                let result = self.cb_shift(bit, value);
                self.write_operand(reg, result);
            }
            1 => {
                // BIT n,(HL) leaks the high byte of WZ into X/Y
                let xy_source = if reg == 6 {
                    (self.regs.wz >> 8) as u8
                } else {
                    value
                };
                self.bit_test(bit, value, xy_source);
            }
            2 => self.write_operand(reg, value & !(1 << bit)),
            _ => self.write_operand(reg, value | (1 << bit)),
        }
    }

    /// BIT n: Z and P/V set when the bit is clear, S only for bit 7
    ///
    /// X and Y come from `xy_source`, which is the tested register, the high
    /// byte of WZ for `(HL)`, or the high byte of the effective address for
    /// `(IX+d)`.
    pub(super) fn bit_test(&mut self, bit: u8, value: u8, xy_source: u8) {
        let tested = value & (1 << bit);
        let mut f = (self.regs.f() & CF) | HF | (xy_source & XYF);
        if tested == 0 {
            f |= ZF | PF;
        }
        if tested & 0x80 != 0 {
            f |= SF;
        }
        self.regs.set_f(f);
    }
}
