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

//! ED-prefixed instructions
//!
//! Only 0x40-0x7F and the block group 0xA0-0xBB are defined. Every other
//! ED opcode behaves as an 8 T-state NOP.

use super::super::timing;
use super::super::Z80;
use super::block::Step;

impl Z80 {
    /// Decode and execute an ED-prefixed instruction
    pub(super) fn execute_ed(&mut self) {
        let op = self.fetch_opcode();
        self.charge(timing::ED[op as usize] as i32);

        match op {
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => self.op_in_r_c(op), // IN r,(C)
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => self.op_out_c_r(op), // OUT (C),r
            0x42 | 0x52 | 0x62 | 0x72 => {
                // SBC HL,rr
                let value = self.regs.get16_sp(op >> 4);
                self.sbc16(value);
            }
            0x4A | 0x5A | 0x6A | 0x7A => {
                // ADC HL,rr
                let value = self.regs.get16_sp(op >> 4);
                self.adc16(value);
            }
            0x43 | 0x53 | 0x63 | 0x73 => {
                // LD (nn),rr
                let value = self.regs.get16_sp(op >> 4);
                self.store16_nn(value);
            }
            0x4B | 0x5B | 0x6B | 0x7B => {
                // LD rr,(nn)
                let value = self.load16_nn();
                self.regs.set16_sp(op >> 4, value);
            }
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => self.op_neg(), // NEG
            0x45 | 0x4D | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => self.op_retn(), // RETN / RETI
            0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x76 | 0x7E => self.op_im(op), // IM n
            0x47 => self.op_ld_i_a(), // LD I,A
            0x4F => self.op_ld_r_a(), // LD R,A
            0x57 => self.op_ld_a_i(), // LD A,I
            0x5F => self.op_ld_a_r(), // LD A,R
            0x67 => self.op_rrd(),    // RRD
            0x6F => self.op_rld(),    // RLD
            0xA0 => self.op_block_ld(Step::Increment, false), // LDI
            0xA1 => self.op_block_cp(Step::Increment, false), // CPI
            0xA2 => self.op_block_in(Step::Increment, false), // INI
            0xA3 => self.op_block_out(Step::Increment, false), // OUTI
            0xA8 => self.op_block_ld(Step::Decrement, false), // LDD
            0xA9 => self.op_block_cp(Step::Decrement, false), // CPD
            0xAA => self.op_block_in(Step::Decrement, false), // IND
            0xAB => self.op_block_out(Step::Decrement, false), // OUTD
            0xB0 => self.op_block_ld(Step::Increment, true), // LDIR
            0xB1 => self.op_block_cp(Step::Increment, true), // CPIR
            0xB2 => self.op_block_in(Step::Increment, true), // INIR
            0xB3 => self.op_block_out(Step::Increment, true), // OTIR
            0xB8 => self.op_block_ld(Step::Decrement, true), // LDDR
            0xB9 => self.op_block_cp(Step::Decrement, true), // CPDR
            0xBA => self.op_block_in(Step::Decrement, true), // INDR
            0xBB => self.op_block_out(Step::Decrement, true), // OTDR
            _ => {
                log::trace!(
                    "Undefined opcode ED {:02X} at PC=0x{:04X} (NOP)",
                    op,
                    self.regs.pc.wrapping_sub(2)
                );
            }
        }
    }
}
