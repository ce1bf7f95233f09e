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

use super::super::flags::{CF, PF, SF, SZXYP, XYF, ZF};
use super::super::Z80;

impl Z80 {
    // === Accumulator Rotates ===
    //
    // These keep S, Z and P/V, clear H and N, and copy X/Y from the new A.

    /// RLCA
    pub(super) fn op_rlca(&mut self) {
        let a = self.regs.a().rotate_left(1);
        self.set_rotate_flags(a, a & 0x01);
    }

    /// RRCA
    pub(super) fn op_rrca(&mut self) {
        let old = self.regs.a();
        let a = old.rotate_right(1);
        self.set_rotate_flags(a, old & 0x01);
    }

    /// RLA
    pub(super) fn op_rla(&mut self) {
        let old = self.regs.a();
        let a = (old << 1) | (self.regs.f() & CF);
        self.set_rotate_flags(a, old >> 7);
    }

    /// RRA
    pub(super) fn op_rra(&mut self) {
        let old = self.regs.a();
        let a = (old >> 1) | ((self.regs.f() & CF) << 7);
        self.set_rotate_flags(a, old & 0x01);
    }

    fn set_rotate_flags(&mut self, a: u8, carry: u8) {
        let f = (self.regs.f() & (SF | ZF | PF)) | (a & XYF) | (carry & CF);
        self.regs.set_a(a);
        self.regs.set_f(f);
    }

    // === CB Rotates and Shifts ===

    /// Rotate/shift selected by bits 3-5 of a CB opcode
    ///
    /// Order: RLC, RRC, RL, RR, SLA, SRA, SLL (undocumented, shifts in 1),
    /// SRL. Flags are S, Z, X, Y, P from the result and C from the bit
    /// shifted out.
    pub(super) fn cb_shift(&mut self, kind: u8, value: u8) -> u8 {
        let carry_in = self.regs.f() & CF;
        let (result, carry) = match kind & 7 {
            0 => (value.rotate_left(1), value >> 7),
            1 => (value.rotate_right(1), value & 0x01),
            2 => ((value << 1) | carry_in, value >> 7),
            3 => ((value >> 1) | (carry_in << 7), value & 0x01),
            4 => (value << 1, value >> 7),
            5 => ((value >> 1) | (value & 0x80), value & 0x01),
            6 => ((value << 1) | 0x01, value >> 7),
            _ => (value >> 1, value & 0x01),
        };
        self.regs.set_f(SZXYP[result as usize] | carry);
        result
    }

    // === Decimal Rotates ===

    /// RRD: rotate the low nibbles of A and (HL) right
    pub(super) fn op_rrd(&mut self) {
        let hl = self.regs.hl.combined();
        let memory = self.read8(hl);
        let a = self.regs.a();

        self.write8(hl, (a << 4) | (memory >> 4));
        let a = (a & 0xF0) | (memory & 0x0F);
        self.finish_decimal_rotate(a, hl);
    }

    /// RLD: rotate the low nibbles of A and (HL) left
    pub(super) fn op_rld(&mut self) {
        let hl = self.regs.hl.combined();
        let memory = self.read8(hl);
        let a = self.regs.a();

        self.write8(hl, (memory << 4) | (a & 0x0F));
        let a = (a & 0xF0) | (memory >> 4);
        self.finish_decimal_rotate(a, hl);
    }

    fn finish_decimal_rotate(&mut self, a: u8, hl: u16) {
        self.regs.set_a(a);
        let f = (self.regs.f() & CF) | SZXYP[a as usize];
        self.regs.set_f(f);
        self.regs.wz = hl.wrapping_add(1);
    }
}
