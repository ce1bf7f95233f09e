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

//! Z80 register file
//!
//! Register pairs are stored as a single `u16` and the 8-bit halves are
//! computed on access, so BC/B/C always agree without aliasing tricks.

use serde::{Deserialize, Serialize};

/// A 16-bit register pair with computed 8-bit halves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPair(u16);

impl RegisterPair {
    #[inline(always)]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Full 16-bit value
    #[inline(always)]
    pub const fn combined(self) -> u16 {
        self.0
    }

    /// Upper byte (B of BC, A of AF, ...)
    #[inline(always)]
    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Lower byte (C of BC, F of AF, ...)
    #[inline(always)]
    pub const fn low(self) -> u8 {
        self.0 as u8
    }

    #[inline(always)]
    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    #[inline(always)]
    pub fn set_high(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | ((value as u16) << 8);
    }

    #[inline(always)]
    pub fn set_low(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | value as u16;
    }
}

/// 8-bit register selector for introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    IXH,
    IXL,
    IYH,
    IYL,
    I,
}

/// 16-bit register selector for introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    AF2,
    BC2,
    DE2,
    HL2,
    IX,
    IY,
    SP,
    PC,
    WZ,
}

/// Index register selected by a DD/FD prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum IndexReg {
    IX,
    IY,
}

/// The programmer-visible register set plus WZ
///
/// R is split in two: `r` carries the 7-bit refresh counter and `r_high`
/// keeps bit 7, which refresh cycles never modify.
#[derive(Debug, Clone, Default)]
pub(super) struct Registers {
    pub af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,

    pub af2: RegisterPair,
    pub bc2: RegisterPair,
    pub de2: RegisterPair,
    pub hl2: RegisterPair,

    pub ix: RegisterPair,
    pub iy: RegisterPair,
    pub sp: u16,
    pub pc: u16,

    /// MEMPTR: internal address latch, visible only through flag bits 3/5
    pub wz: u16,

    pub i: u8,
    pub r: u8,
    pub r_high: u8,
}

impl Registers {
    /// Power-on register values
    ///
    /// AF and SP come up as 0xFFFF on real parts; everything else is cleared.
    pub fn power_on() -> Self {
        Self {
            af: RegisterPair::new(0xFFFF),
            sp: 0xFFFF,
            ..Self::default()
        }
    }

    #[inline(always)]
    pub fn a(&self) -> u8 {
        self.af.high()
    }

    #[inline(always)]
    pub fn set_a(&mut self, value: u8) {
        self.af.set_high(value);
    }

    #[inline(always)]
    pub fn f(&self) -> u8 {
        self.af.low()
    }

    #[inline(always)]
    pub fn set_f(&mut self, value: u8) {
        self.af.set_low(value);
    }

    /// Read an 8-bit register by its 3-bit opcode encoding
    ///
    /// Encoding 6 is `(HL)` and never reaches this function.
    #[inline(always)]
    pub fn get8(&self, index: u8) -> u8 {
        match index & 7 {
            0 => self.bc.high(),
            1 => self.bc.low(),
            2 => self.de.high(),
            3 => self.de.low(),
            4 => self.hl.high(),
            5 => self.hl.low(),
            7 => self.af.high(),
            _ => 0xFF,
        }
    }

    #[inline(always)]
    pub fn set8(&mut self, index: u8, value: u8) {
        match index & 7 {
            0 => self.bc.set_high(value),
            1 => self.bc.set_low(value),
            2 => self.de.set_high(value),
            3 => self.de.set_low(value),
            4 => self.hl.set_high(value),
            5 => self.hl.set_low(value),
            7 => self.af.set_high(value),
            _ => {}
        }
    }

    /// Read an 8-bit register where H and L are replaced by the index halves
    #[inline(always)]
    pub fn get8_indexed(&self, index: u8, xy: IndexReg) -> u8 {
        match (index & 7, xy) {
            (4, IndexReg::IX) => self.ix.high(),
            (5, IndexReg::IX) => self.ix.low(),
            (4, IndexReg::IY) => self.iy.high(),
            (5, IndexReg::IY) => self.iy.low(),
            (other, _) => self.get8(other),
        }
    }

    #[inline(always)]
    pub fn set8_indexed(&mut self, index: u8, xy: IndexReg, value: u8) {
        match (index & 7, xy) {
            (4, IndexReg::IX) => self.ix.set_high(value),
            (5, IndexReg::IX) => self.ix.set_low(value),
            (4, IndexReg::IY) => self.iy.set_high(value),
            (5, IndexReg::IY) => self.iy.set_low(value),
            (other, _) => self.set8(other, value),
        }
    }

    /// Register pair by 2-bit encoding with SP as pair 3 (LD rr,nn / INC rr)
    #[inline(always)]
    pub fn get16_sp(&self, index: u8) -> u16 {
        match index & 3 {
            0 => self.bc.combined(),
            1 => self.de.combined(),
            2 => self.hl.combined(),
            _ => self.sp,
        }
    }

    #[inline(always)]
    pub fn set16_sp(&mut self, index: u8, value: u16) {
        match index & 3 {
            0 => self.bc.set(value),
            1 => self.de.set(value),
            2 => self.hl.set(value),
            _ => self.sp = value,
        }
    }

    /// Register pair by 2-bit encoding with AF as pair 3 (PUSH/POP)
    #[inline(always)]
    pub fn get16_af(&self, index: u8) -> u16 {
        match index & 3 {
            0 => self.bc.combined(),
            1 => self.de.combined(),
            2 => self.hl.combined(),
            _ => self.af.combined(),
        }
    }

    #[inline(always)]
    pub fn set16_af(&mut self, index: u8, value: u16) {
        match index & 3 {
            0 => self.bc.set(value),
            1 => self.de.set(value),
            2 => self.hl.set(value),
            _ => self.af.set(value),
        }
    }

    #[inline(always)]
    pub fn index(&self, xy: IndexReg) -> u16 {
        match xy {
            IndexReg::IX => self.ix.combined(),
            IndexReg::IY => self.iy.combined(),
        }
    }

    #[inline(always)]
    pub fn set_index(&mut self, xy: IndexReg, value: u16) {
        match xy {
            IndexReg::IX => self.ix.set(value),
            IndexReg::IY => self.iy.set(value),
        }
    }

    /// Combined R value as seen by `LD A,R`
    #[inline(always)]
    pub fn refresh(&self) -> u8 {
        (self.r & 0x7F) | (self.r_high & 0x80)
    }

    #[inline(always)]
    pub fn set_refresh(&mut self, value: u8) {
        self.r = value & 0x7F;
        self.r_high = value & 0x80;
    }

    /// One refresh cycle: low 7 bits count, bit 7 untouched
    #[inline(always)]
    pub fn bump_refresh(&mut self) {
        self.r = self.r.wrapping_add(1) & 0x7F;
    }

    /// Undo one refresh cycle (a prefix that is decoded again)
    #[inline(always)]
    pub fn unbump_refresh(&mut self) {
        self.r = self.r.wrapping_sub(1) & 0x7F;
    }

    /// Advance R by several refresh cycles at once (HALT)
    #[inline(always)]
    pub fn bump_refresh_by(&mut self, count: u32) {
        self.r = ((self.r as u32 + count) & 0x7F) as u8;
    }
}
