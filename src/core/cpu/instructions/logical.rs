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

use super::super::flags::{HF, SZXYP};
use super::super::Z80;

impl Z80 {
    // === Logical Instructions ===

    /// AND: sets H, clears N and C
    pub(super) fn and8(&mut self, value: u8) {
        let result = self.regs.a() & value;
        self.regs.set_a(result);
        self.regs.set_f(SZXYP[result as usize] | HF);
    }

    /// XOR: clears H, N and C
    pub(super) fn xor8(&mut self, value: u8) {
        let result = self.regs.a() ^ value;
        self.regs.set_a(result);
        self.regs.set_f(SZXYP[result as usize]);
    }

    /// OR: clears H, N and C
    pub(super) fn or8(&mut self, value: u8) {
        let result = self.regs.a() | value;
        self.regs.set_a(result);
        self.regs.set_f(SZXYP[result as usize]);
    }
}
