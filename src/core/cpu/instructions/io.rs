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

use super::super::flags::{CF, SZXYP};
use super::super::Z80;

impl Z80 {
    // === Port I/O ===

    /// IN A,(n): the port's upper byte is A
    pub(super) fn op_in_a_n(&mut self) {
        let n = self.fetch8();
        let port = ((self.regs.a() as u16) << 8) | n as u16;
        let value = self.ports.in_port(port);
        self.regs.set_a(value);
        self.regs.wz = port.wrapping_add(1);
    }

    /// OUT (n),A
    pub(super) fn op_out_n_a(&mut self) {
        let n = self.fetch8();
        let a = self.regs.a();
        let port = ((a as u16) << 8) | n as u16;
        self.ports.out_port(port, a);
        self.regs.wz = (n.wrapping_add(1) as u16) | ((a as u16) << 8);
    }

    /// IN r,(C); encoding 6 is the undocumented `IN (C)` that only sets flags
    pub(super) fn op_in_r_c(&mut self, op: u8) {
        let port = self.regs.bc.combined();
        let value = self.ports.in_port(port);
        let f = (self.regs.f() & CF) | SZXYP[value as usize];
        self.regs.set_f(f);
        self.regs.set8(op >> 3, value);
        self.regs.wz = port.wrapping_add(1);
    }

    /// OUT (C),r; encoding 6 is the undocumented `OUT (C),0`
    pub(super) fn op_out_c_r(&mut self, op: u8) {
        let port = self.regs.bc.combined();
        let value = if (op >> 3) & 7 == 6 {
            0
        } else {
            self.regs.get8(op >> 3)
        };
        self.ports.out_port(port, value);
        self.regs.wz = port.wrapping_add(1);
    }
}
