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

//! Block transfer, search and I/O instructions
//!
//! Repeating forms run one iteration per dispatch: while the loop condition
//! holds, PC is moved back onto the instruction and the extra 5 T-states
//! are charged, so interrupts can be taken between iterations.

use super::super::flags::{CF, HF, NF, PF, SF, SZXY, SZXYP, XF, YF, ZF};
use super::super::timing;
use super::super::Z80;

/// Direction of a block instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    Increment,
    Decrement,
}

impl Step {
    fn apply(self, value: u16) -> u16 {
        match self {
            Step::Increment => value.wrapping_add(1),
            Step::Decrement => value.wrapping_sub(1),
        }
    }

    fn apply8(self, value: u8) -> u8 {
        match self {
            Step::Increment => value.wrapping_add(1),
            Step::Decrement => value.wrapping_sub(1),
        }
    }
}

impl Z80 {
    /// Move PC back onto a repeating instruction and charge the extra time
    fn repeat_block(&mut self) {
        self.regs.pc = self.regs.pc.wrapping_sub(2);
        self.regs.wz = self.regs.pc.wrapping_add(1);
        self.charge(timing::BLOCK_REPEAT);
    }

    // === Transfer ===

    /// LDI / LDD / LDIR / LDDR
    ///
    /// X and Y come from bits 3 and 1 of `A + transferred byte`.
    pub(super) fn op_block_ld(&mut self, step: Step, repeat: bool) {
        let hl = self.regs.hl.combined();
        let de = self.regs.de.combined();
        let value = self.read8(hl);
        self.write8(de, value);

        self.regs.hl.set(step.apply(hl));
        self.regs.de.set(step.apply(de));
        let bc = self.regs.bc.combined().wrapping_sub(1);
        self.regs.bc.set(bc);

        let n = self.regs.a().wrapping_add(value);
        let mut f = (self.regs.f() & (SF | ZF | CF)) | (n & XF) | ((n << 4) & YF);
        if bc != 0 {
            f |= PF;
        }
        self.regs.set_f(f);

        if repeat && bc != 0 {
            self.repeat_block();
        }
    }

    // === Search ===

    /// CPI / CPD / CPIR / CPDR
    ///
    /// X and Y come from `A - (HL) - H` after the compare.
    pub(super) fn op_block_cp(&mut self, step: Step, repeat: bool) {
        let hl = self.regs.hl.combined();
        let value = self.read8(hl);
        let a = self.regs.a();
        let result = a.wrapping_sub(value);

        self.regs.hl.set(step.apply(hl));
        let bc = self.regs.bc.combined().wrapping_sub(1);
        self.regs.bc.set(bc);
        self.regs.wz = step.apply(self.regs.wz);

        let half = (a ^ value ^ result) & HF;
        let n = result.wrapping_sub(half >> 4);
        let mut f = (self.regs.f() & CF) | NF | half | (SZXY[result as usize] & (SF | ZF));
        f |= (n & XF) | ((n << 4) & YF);
        if bc != 0 {
            f |= PF;
        }
        self.regs.set_f(f);

        if repeat && bc != 0 && result != 0 {
            self.repeat_block();
        }
    }

    // === Block I/O ===

    /// INI / IND / INIR / INDR
    pub(super) fn op_block_in(&mut self, step: Step, repeat: bool) {
        let bc = self.regs.bc.combined();
        let value = self.ports.in_port(bc);
        self.regs.wz = step.apply(bc);

        let hl = self.regs.hl.combined();
        self.write8(hl, value);
        self.regs.hl.set(step.apply(hl));

        let b = self.regs.bc.high().wrapping_sub(1);
        self.regs.bc.set_high(b);

        let k = value as u16 + step.apply8(self.regs.bc.low()) as u16;
        self.set_block_io_flags(value, k, b);

        if repeat && b != 0 {
            self.repeat_block();
        }
    }

    /// OUTI / OUTD / OTIR / OTDR: B is decremented before the port write
    pub(super) fn op_block_out(&mut self, step: Step, repeat: bool) {
        let hl = self.regs.hl.combined();
        let value = self.read8(hl);

        let b = self.regs.bc.high().wrapping_sub(1);
        self.regs.bc.set_high(b);
        let bc = self.regs.bc.combined();
        self.ports.out_port(bc, value);
        self.regs.wz = step.apply(bc);

        self.regs.hl.set(step.apply(hl));

        let k = value as u16 + self.regs.hl.low() as u16;
        self.set_block_io_flags(value, k, b);

        if repeat && b != 0 {
            self.repeat_block();
        }
    }

    /// Undocumented flags of the block I/O group
    ///
    /// S, Z, X, Y from B; N from bit 7 of the byte; H and C set when
    /// `k` overflows a byte; P/V is the parity of `(k & 7) ^ B`.
    fn set_block_io_flags(&mut self, value: u8, k: u16, b: u8) {
        let mut f = SZXY[b as usize] | ((value & 0x80) >> 6);
        if k > 0xFF {
            f |= HF | CF;
        }
        f |= SZXYP[(((k as u8) & 7) ^ b) as usize] & PF;
        self.regs.set_f(f);
    }
}
