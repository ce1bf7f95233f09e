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

use super::super::flags::{CF, HF, NF, PF, SF, SZXY, SZXYP, XYF, ZF};
use super::super::Z80;

impl Z80 {
    // === 8-bit ALU ===

    /// ALU A,r / ALU A,(HL)
    pub(super) fn op_alu_r(&mut self, op: u8) {
        let value = self.read_operand(op);
        self.alu8(op >> 3, value);
    }

    /// ALU A,n
    pub(super) fn op_alu_n(&mut self, op: u8) {
        let value = self.fetch8();
        self.alu8(op >> 3, value);
    }

    /// Apply the ALU operation selected by bits 3-5 of the opcode
    pub(super) fn alu8(&mut self, kind: u8, value: u8) {
        match kind & 7 {
            0 => self.add8(value, 0),                       // ADD
            1 => self.add8(value, self.regs.f() & CF),      // ADC
            2 => self.sub8(value, 0),                       // SUB
            3 => self.sub8(value, self.regs.f() & CF),      // SBC
            4 => self.and8(value),                          // AND
            5 => self.xor8(value),                          // XOR
            6 => self.or8(value),                           // OR
            _ => self.cp8(value),                           // CP
        }
    }

    /// A = A + value + carry
    fn add8(&mut self, value: u8, carry: u8) {
        let a = self.regs.a();
        let wide = a as u16 + value as u16 + carry as u16;
        let result = wide as u8;

        let mut f = SZXY[result as usize] | ((a ^ value ^ result) & HF);
        f |= ((a ^ !value) & (a ^ result) & 0x80) >> 5;
        if wide > 0xFF {
            f |= CF;
        }

        self.regs.set_a(result);
        self.regs.set_f(f);
    }

    /// Subtract with flags; returns the result without storing it
    fn sub8_flags(&mut self, value: u8, carry: u8) -> u8 {
        let a = self.regs.a();
        let wide = (a as u16)
            .wrapping_sub(value as u16)
            .wrapping_sub(carry as u16);
        let result = wide as u8;

        let mut f = NF | SZXY[result as usize] | ((a ^ value ^ result) & HF);
        f |= ((a ^ value) & (a ^ result) & 0x80) >> 5;
        if wide & 0x100 != 0 {
            f |= CF;
        }

        self.regs.set_f(f);
        result
    }

    /// A = A - value - carry
    fn sub8(&mut self, value: u8, carry: u8) {
        let result = self.sub8_flags(value, carry);
        self.regs.set_a(result);
    }

    /// CP: flags of A - value, X/Y taken from the operand
    pub(super) fn cp8(&mut self, value: u8) {
        self.sub8_flags(value, 0);
        let f = (self.regs.f() & !XYF) | (value & XYF);
        self.regs.set_f(f);
    }

    /// NEG (and its ED mirrors)
    pub(super) fn op_neg(&mut self) {
        let value = self.regs.a();
        self.regs.set_a(0);
        self.sub8(value, 0);
    }

    // === INC / DEC ===

    pub(super) fn inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        let mut f = (self.regs.f() & CF) | SZXY[result as usize];
        if result & 0x0F == 0 {
            f |= HF;
        }
        if result == 0x80 {
            f |= PF;
        }
        self.regs.set_f(f);
        result
    }

    pub(super) fn dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        let mut f = (self.regs.f() & CF) | NF | SZXY[result as usize];
        if value & 0x0F == 0 {
            f |= HF;
        }
        if result == 0x7F {
            f |= PF;
        }
        self.regs.set_f(f);
        result
    }

    /// INC r / INC (HL)
    pub(super) fn op_inc_r(&mut self, op: u8) {
        let value = self.read_operand(op >> 3);
        let result = self.inc8(value);
        self.write_operand(op >> 3, result);
    }

    /// DEC r / DEC (HL)
    pub(super) fn op_dec_r(&mut self, op: u8) {
        let value = self.read_operand(op >> 3);
        let result = self.dec8(value);
        self.write_operand(op >> 3, result);
    }

    /// INC rr (no flags)
    pub(super) fn op_inc_rr(&mut self, op: u8) {
        let index = op >> 4;
        let value = self.regs.get16_sp(index).wrapping_add(1);
        self.regs.set16_sp(index, value);
    }

    /// DEC rr (no flags)
    pub(super) fn op_dec_rr(&mut self, op: u8) {
        let index = op >> 4;
        let value = self.regs.get16_sp(index).wrapping_sub(1);
        self.regs.set16_sp(index, value);
    }

    // === 16-bit Arithmetic ===

    /// ADD HL,rr
    pub(super) fn op_add_hl_rr(&mut self, op: u8) {
        let hl = self.regs.hl.combined();
        let value = self.regs.get16_sp(op >> 4);
        let result = self.add16(hl, value);
        self.regs.hl.set(result);
    }

    /// 16-bit add used by ADD HL/IX/IY; S, Z and P/V are preserved
    pub(super) fn add16(&mut self, left: u16, right: u16) -> u16 {
        let wide = left as u32 + right as u32;
        let result = wide as u16;

        let mut f = self.regs.f() & (SF | ZF | PF);
        f |= ((result >> 8) as u8) & XYF;
        f |= (((left ^ right ^ result) >> 8) as u8) & HF;
        if wide > 0xFFFF {
            f |= CF;
        }

        self.regs.set_f(f);
        self.regs.wz = left.wrapping_add(1);
        result
    }

    /// ADC HL,rr
    pub(super) fn adc16(&mut self, value: u16) {
        let hl = self.regs.hl.combined();
        let carry = (self.regs.f() & CF) as u32;
        let wide = hl as u32 + value as u32 + carry;
        let result = wide as u16;

        let mut f = ((result >> 8) as u8) & (SF | XYF);
        if result == 0 {
            f |= ZF;
        }
        f |= (((hl ^ value ^ result) >> 8) as u8) & HF;
        f |= (((hl ^ !value) & (hl ^ result) & 0x8000) >> 13) as u8;
        if wide > 0xFFFF {
            f |= CF;
        }

        self.regs.set_f(f);
        self.regs.wz = hl.wrapping_add(1);
        self.regs.hl.set(result);
    }

    /// SBC HL,rr
    pub(super) fn sbc16(&mut self, value: u16) {
        let hl = self.regs.hl.combined();
        let carry = (self.regs.f() & CF) as u32;
        let wide = (hl as u32).wrapping_sub(value as u32).wrapping_sub(carry);
        let result = wide as u16;

        let mut f = NF | (((result >> 8) as u8) & (SF | XYF));
        if result == 0 {
            f |= ZF;
        }
        f |= (((hl ^ value ^ result) >> 8) as u8) & HF;
        f |= (((hl ^ value) & (hl ^ result) & 0x8000) >> 13) as u8;
        if wide & 0x1_0000 != 0 {
            f |= CF;
        }

        self.regs.set_f(f);
        self.regs.wz = hl.wrapping_add(1);
        self.regs.hl.set(result);
    }

    // === Accumulator Adjustments ===

    /// DAA: decimal adjust after BCD add or subtract
    pub(super) fn op_daa(&mut self) {
        let a = self.regs.a();
        let f = self.regs.f();

        let mut correction = 0u8;
        let mut carry = f & CF;
        if f & HF != 0 || a & 0x0F > 9 {
            correction |= 0x06;
        }
        if carry != 0 || a > 0x99 {
            correction |= 0x60;
            carry = CF;
        }

        let result = if f & NF != 0 {
            a.wrapping_sub(correction)
        } else {
            a.wrapping_add(correction)
        };

        let new_f = SZXYP[result as usize] | ((a ^ result) & HF) | (f & NF) | carry;
        self.regs.set_a(result);
        self.regs.set_f(new_f);
    }

    /// CPL
    pub(super) fn op_cpl(&mut self) {
        let a = !self.regs.a();
        let f = (self.regs.f() & (SF | ZF | PF | CF)) | HF | NF | (a & XYF);
        self.regs.set_a(a);
        self.regs.set_f(f);
    }

    /// SCF
    pub(super) fn op_scf(&mut self) {
        let f = (self.regs.f() & (SF | ZF | PF)) | CF | (self.regs.a() & XYF);
        self.regs.set_f(f);
    }

    /// CCF: H takes the old carry
    pub(super) fn op_ccf(&mut self) {
        let old = self.regs.f();
        let mut f = (old & (SF | ZF | PF)) | (self.regs.a() & XYF);
        if old & CF != 0 {
            f |= HF;
        } else {
            f |= CF;
        }
        self.regs.set_f(f);
    }
}
