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

use super::super::timing;
use super::super::Z80;

impl Z80 {
    // === Relative Jumps ===

    /// JR e
    pub(super) fn op_jr(&mut self) {
        let offset = self.fetch8() as i8;
        self.relative_jump(offset);
    }

    /// JR cc,e (NZ, Z, NC, C only)
    pub(super) fn op_jr_cc(&mut self, op: u8) {
        let offset = self.fetch8() as i8;
        if self.condition((op >> 3) & 3) {
            self.relative_jump(offset);
            self.charge(timing::JR_TAKEN);
        }
    }

    /// DJNZ e: decrement B, jump while non-zero
    pub(super) fn op_djnz(&mut self) {
        let offset = self.fetch8() as i8;
        let b = self.regs.bc.high().wrapping_sub(1);
        self.regs.bc.set_high(b);
        if b != 0 {
            self.relative_jump(offset);
            self.charge(timing::JR_TAKEN);
        }
    }

    fn relative_jump(&mut self, offset: i8) {
        let target = self.regs.pc.wrapping_add_signed(offset as i16);
        self.regs.pc = target;
        self.regs.wz = target;
    }

    // === Absolute Jumps ===

    /// JP nn
    pub(super) fn op_jp(&mut self) {
        let target = self.fetch16();
        self.regs.pc = target;
        self.regs.wz = target;
    }

    /// JP cc,nn: WZ is loaded whether or not the jump is taken
    pub(super) fn op_jp_cc(&mut self, op: u8) {
        let target = self.fetch16();
        self.regs.wz = target;
        if self.condition(op >> 3) {
            self.regs.pc = target;
        }
    }

    /// JP (HL)
    pub(super) fn op_jp_hl(&mut self) {
        self.regs.pc = self.regs.hl.combined();
    }

    // === Calls and Returns ===

    /// CALL nn
    pub(super) fn op_call(&mut self) {
        let target = self.fetch16();
        self.call(target);
    }

    /// CALL cc,nn
    pub(super) fn op_call_cc(&mut self, op: u8) {
        let target = self.fetch16();
        self.regs.wz = target;
        if self.condition(op >> 3) {
            self.call(target);
            self.charge(timing::CALL_TAKEN);
        }
    }

    fn call(&mut self, target: u16) {
        self.push16(self.regs.pc);
        self.regs.pc = target;
        self.regs.wz = target;
    }

    /// RET
    pub(super) fn op_ret(&mut self) {
        self.ret();
    }

    /// RET cc
    pub(super) fn op_ret_cc(&mut self, op: u8) {
        if self.condition(op >> 3) {
            self.ret();
            self.charge(timing::RET_TAKEN);
        }
    }

    fn ret(&mut self) {
        let target = self.pop16();
        self.regs.pc = target;
        self.regs.wz = target;
    }

    /// RETN / RETI: IFF1 is restored from IFF2 and the host is notified
    pub(super) fn op_retn(&mut self) {
        self.ret();
        self.iff1 = self.iff2;
        self.interrupts.on_reti();
    }

    /// RST p
    pub(super) fn op_rst(&mut self, op: u8) {
        self.call((op & 0x38) as u16);
    }
}
