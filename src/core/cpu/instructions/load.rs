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

use super::super::Z80;

impl Z80 {
    // === 8-bit Loads ===

    /// LD r,r' / LD r,(HL) / LD (HL),r
    pub(super) fn op_ld_r_r(&mut self, op: u8) {
        let value = self.read_operand(op);
        self.write_operand(op >> 3, value);
    }

    /// LD r,n / LD (HL),n
    pub(super) fn op_ld_r_n(&mut self, op: u8) {
        let value = self.fetch8();
        self.write_operand(op >> 3, value);
    }

    /// LD (BC),A / LD (DE),A
    ///
    /// WZ: low byte is address+1, high byte is A.
    pub(super) fn op_ld_ind_a(&mut self, op: u8) {
        let address = if op & 0x10 == 0 {
            self.regs.bc.combined()
        } else {
            self.regs.de.combined()
        };
        let a = self.regs.a();
        self.write8(address, a);
        self.regs.wz = (address.wrapping_add(1) & 0x00FF) | ((a as u16) << 8);
    }

    /// LD A,(BC) / LD A,(DE)
    pub(super) fn op_ld_a_ind(&mut self, op: u8) {
        let address = if op & 0x10 == 0 {
            self.regs.bc.combined()
        } else {
            self.regs.de.combined()
        };
        let value = self.read8(address);
        self.regs.set_a(value);
        self.regs.wz = address.wrapping_add(1);
    }

    /// LD (nn),A
    pub(super) fn op_ld_nn_a(&mut self) {
        let address = self.fetch16();
        let a = self.regs.a();
        self.write8(address, a);
        self.regs.wz = (address.wrapping_add(1) & 0x00FF) | ((a as u16) << 8);
    }

    /// LD A,(nn)
    pub(super) fn op_ld_a_nn(&mut self) {
        let address = self.fetch16();
        let value = self.read8(address);
        self.regs.set_a(value);
        self.regs.wz = address.wrapping_add(1);
    }

    // === 16-bit Loads ===

    /// LD rr,nn
    pub(super) fn op_ld_rr_nn(&mut self, op: u8) {
        let value = self.fetch16();
        self.regs.set16_sp(op >> 4, value);
    }

    /// LD (nn),HL
    pub(super) fn op_ld_nn_hl(&mut self) {
        let value = self.regs.hl.combined();
        self.store16_nn(value);
    }

    /// LD HL,(nn)
    pub(super) fn op_ld_hl_nn(&mut self) {
        let value = self.load16_nn();
        self.regs.hl.set(value);
    }

    /// LD SP,HL
    pub(super) fn op_ld_sp_hl(&mut self) {
        self.regs.sp = self.regs.hl.combined();
    }

    /// Store a word at the address in the operand; WZ = nn+1
    pub(super) fn store16_nn(&mut self, value: u16) {
        let address = self.fetch16();
        self.write16(address, value);
        self.regs.wz = address.wrapping_add(1);
    }

    /// Load a word from the address in the operand; WZ = nn+1
    pub(super) fn load16_nn(&mut self) -> u16 {
        let address = self.fetch16();
        self.regs.wz = address.wrapping_add(1);
        self.read16(address)
    }

    // === Stack ===

    /// PUSH rr (BC, DE, HL, AF)
    pub(super) fn op_push(&mut self, op: u8) {
        let value = self.regs.get16_af(op >> 4);
        self.push16(value);
    }

    /// POP rr (BC, DE, HL, AF)
    pub(super) fn op_pop(&mut self, op: u8) {
        let value = self.pop16();
        self.regs.set16_af(op >> 4, value);
    }

    // === Exchanges ===

    /// EX AF,AF'
    pub(super) fn op_ex_af(&mut self) {
        std::mem::swap(&mut self.regs.af, &mut self.regs.af2);
    }

    /// EXX
    pub(super) fn op_exx(&mut self) {
        let r = &mut self.regs;
        std::mem::swap(&mut r.bc, &mut r.bc2);
        std::mem::swap(&mut r.de, &mut r.de2);
        std::mem::swap(&mut r.hl, &mut r.hl2);
    }

    /// EX DE,HL (never affected by DD/FD)
    pub(super) fn op_ex_de_hl(&mut self) {
        let r = &mut self.regs;
        std::mem::swap(&mut r.de, &mut r.hl);
    }

    /// EX (SP),HL
    pub(super) fn op_ex_sp_hl(&mut self) {
        let hl = self.regs.hl.combined();
        let value = self.exchange_stack(hl);
        self.regs.hl.set(value);
    }

    /// Swap a word with the top of the stack; WZ = the new register value
    pub(super) fn exchange_stack(&mut self, value: u16) -> u16 {
        let sp = self.regs.sp;
        let top = self.read16(sp);
        self.write16(sp, value);
        self.regs.wz = top;
        top
    }
}
