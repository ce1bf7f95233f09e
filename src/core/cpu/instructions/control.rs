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

use super::super::flags::{CF, PF, SZXY};
use super::super::{Status, Z80};

impl Z80 {
    // === CPU Control ===

    /// HALT: stop until an interrupt; PC stays on the next instruction
    pub(super) fn op_halt(&mut self) {
        self.status.insert(Status::HALTED);
        log::trace!("Z80 halted at PC=0x{:04X}", self.regs.pc.wrapping_sub(1));
    }

    /// DI
    pub(super) fn op_di(&mut self) {
        self.iff1 = false;
        self.iff2 = false;
    }

    /// EI: interrupts are accepted only after the following instruction
    pub(super) fn op_ei(&mut self) {
        self.iff1 = true;
        self.iff2 = true;
        self.ei_shadow = true;
    }

    /// IM 0 / IM 1 / IM 2 (ED 46/56/5E and mirrors)
    pub(super) fn op_im(&mut self, op: u8) {
        self.im = match (op >> 3) & 3 {
            2 => 1,
            3 => 2,
            _ => 0,
        };
    }

    // === Special Registers ===

    /// LD I,A
    pub(super) fn op_ld_i_a(&mut self) {
        self.regs.i = self.regs.a();
    }

    /// LD R,A: the only instruction that writes bit 7 of R
    pub(super) fn op_ld_r_a(&mut self) {
        let a = self.regs.a();
        self.regs.set_refresh(a);
    }

    /// LD A,I
    pub(super) fn op_ld_a_i(&mut self) {
        let value = self.regs.i;
        self.load_special(value);
    }

    /// LD A,R
    pub(super) fn op_ld_a_r(&mut self) {
        let value = self.regs.refresh();
        self.load_special(value);
    }

    /// Common flag handling for LD A,I / LD A,R: P/V reflects IFF2
    fn load_special(&mut self, value: u8) {
        self.regs.set_a(value);
        let mut f = (self.regs.f() & CF) | SZXY[value as usize];
        if self.iff2 {
            f |= PF;
        }
        self.regs.set_f(f);
    }
}
