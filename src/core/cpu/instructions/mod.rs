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

//! Z80 instruction implementations
//!
//! This module holds the unprefixed opcode dispatch. Prefixed groups live in
//! their own files (`bit` for CB, `extended` for ED, `indexed` for DD/FD and
//! DDCB/FDCB); the handlers themselves are organized by instruction family.

use super::timing;
use super::Z80;

// Instruction modules organized by type
mod arithmetic;
mod bit;
mod block;
mod branch;
mod control;
mod extended;
mod indexed;
mod io;
mod load;
mod logical;
mod shift;

impl Z80 {
    /// Dispatch a freshly fetched opcode
    pub(super) fn execute(&mut self, opcode: u8) {
        match opcode {
            0xCB => self.execute_cb(),
            0xDD => self.execute_indexed(super::IndexReg::IX),
            0xED => self.execute_ed(),
            0xFD => self.execute_indexed(super::IndexReg::IY),
            _ => {
                self.charge(timing::MAIN[opcode as usize] as i32);
                self.execute_main(opcode);
            }
        }
    }

    /// Execute an unprefixed opcode whose base cost is already charged
    ///
    /// Also used for DD/FD opcodes that do not touch HL.
    pub(super) fn execute_main(&mut self, op: u8) {
        match op {
            0x00 => {}                                   // NOP
            0x01 | 0x11 | 0x21 | 0x31 => self.op_ld_rr_nn(op), // LD rr,nn
            0x02 | 0x12 => self.op_ld_ind_a(op),          // LD (BC),A / LD (DE),A
            0x0A | 0x1A => self.op_ld_a_ind(op),          // LD A,(BC) / LD A,(DE)
            0x03 | 0x13 | 0x23 | 0x33 => self.op_inc_rr(op), // INC rr
            0x0B | 0x1B | 0x2B | 0x3B => self.op_dec_rr(op), // DEC rr
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => self.op_inc_r(op), // INC r
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => self.op_dec_r(op), // DEC r
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => self.op_ld_r_n(op), // LD r,n
            0x07 => self.op_rlca(),                      // RLCA
            0x0F => self.op_rrca(),                      // RRCA
            0x17 => self.op_rla(),                       // RLA
            0x1F => self.op_rra(),                       // RRA
            0x08 => self.op_ex_af(),                     // EX AF,AF'
            0x09 | 0x19 | 0x29 | 0x39 => self.op_add_hl_rr(op), // ADD HL,rr
            0x10 => self.op_djnz(),                      // DJNZ e
            0x18 => self.op_jr(),                        // JR e
            0x20 | 0x28 | 0x30 | 0x38 => self.op_jr_cc(op), // JR cc,e
            0x22 => self.op_ld_nn_hl(),                  // LD (nn),HL
            0x2A => self.op_ld_hl_nn(),                  // LD HL,(nn)
            0x27 => self.op_daa(),                       // DAA
            0x2F => self.op_cpl(),                       // CPL
            0x37 => self.op_scf(),                       // SCF
            0x3F => self.op_ccf(),                       // CCF
            0x32 => self.op_ld_nn_a(),                   // LD (nn),A
            0x3A => self.op_ld_a_nn(),                   // LD A,(nn)
            0x76 => self.op_halt(),                      // HALT
            0x40..=0x75 | 0x77..=0x7F => self.op_ld_r_r(op), // LD r,r'
            0x80..=0xBF => self.op_alu_r(op),            // ADD/ADC/SUB/SBC/AND/XOR/OR/CP r
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => self.op_ret_cc(op), // RET cc
            0xC1 | 0xD1 | 0xE1 | 0xF1 => self.op_pop(op), // POP rr
            0xC5 | 0xD5 | 0xE5 | 0xF5 => self.op_push(op), // PUSH rr
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => self.op_jp_cc(op), // JP cc,nn
            0xC3 => self.op_jp(),                        // JP nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => self.op_call_cc(op), // CALL cc,nn
            0xCD => self.op_call(),                      // CALL nn
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => self.op_alu_n(op), // ALU A,n
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => self.op_rst(op), // RST p
            0xC9 => self.op_ret(),                       // RET
            0xD9 => self.op_exx(),                       // EXX
            0xE9 => self.op_jp_hl(),                     // JP (HL)
            0xF9 => self.op_ld_sp_hl(),                  // LD SP,HL
            0xD3 => self.op_out_n_a(),                   // OUT (n),A
            0xDB => self.op_in_a_n(),                    // IN A,(n)
            0xE3 => self.op_ex_sp_hl(),                  // EX (SP),HL
            0xEB => self.op_ex_de_hl(),                  // EX DE,HL
            0xF3 => self.op_di(),                        // DI
            0xFB => self.op_ei(),                        // EI
            0xCB | 0xDD | 0xED | 0xFD => {}              // prefixes, dispatched in execute()
        }
    }

    /// Read an operand by 3-bit register encoding, 6 meaning `(HL)`
    #[inline(always)]
    pub(super) fn read_operand(&mut self, index: u8) -> u8 {
        if index & 7 == 6 {
            self.read8(self.regs.hl.combined())
        } else {
            self.regs.get8(index)
        }
    }

    /// Write an operand by 3-bit register encoding, 6 meaning `(HL)`
    #[inline(always)]
    pub(super) fn write_operand(&mut self, index: u8, value: u8) {
        if index & 7 == 6 {
            self.write8(self.regs.hl.combined(), value);
        } else {
            self.regs.set8(index, value);
        }
    }
}
