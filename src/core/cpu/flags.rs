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

//! Z80 flag register bits and precomputed flag tables
//!
//! ```text
//! Bit | 7 | 6 | 5 | 4 | 3 | 2   | 1 | 0 |
//!     | S | Z | Y | H | X | P/V | N | C |
//! ```
//!
//! X and Y are undocumented. Most instructions copy bits 3 and 5 of their
//! result into them; a few take them from an operand or from WZ.

/// Carry
pub const CF: u8 = 0x01;
/// Add/subtract
pub const NF: u8 = 0x02;
/// Parity/overflow
pub const PF: u8 = 0x04;
/// Undocumented copy of result bit 3
pub const XF: u8 = 0x08;
/// Half carry
pub const HF: u8 = 0x10;
/// Undocumented copy of result bit 5
pub const YF: u8 = 0x20;
/// Zero
pub const ZF: u8 = 0x40;
/// Sign
pub const SF: u8 = 0x80;

/// Mask of the two undocumented bits
pub const XYF: u8 = XF | YF;

/// S, Z, X, Y for every byte value
pub(super) static SZXY: [u8; 256] = build_szxy();

/// S, Z, X, Y and even parity for every byte value
pub(super) static SZXYP: [u8; 256] = build_szxyp();

const fn build_szxy() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let value = i as u8;
        let mut flags = value & (SF | XYF);
        if value == 0 {
            flags |= ZF;
        }
        table[i] = flags;
        i += 1;
    }
    table
}

const fn build_szxyp() -> [u8; 256] {
    let mut table = build_szxy();
    let mut i = 0;
    while i < 256 {
        if (i as u8).count_ones() % 2 == 0 {
            table[i] |= PF;
        }
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_szxy_table() {
        assert_eq!(SZXY[0x00], ZF);
        assert_eq!(SZXY[0x80], SF);
        assert_eq!(SZXY[0x28], XF | YF);
        assert_eq!(SZXY[0x01], 0);
    }

    #[test]
    fn test_parity_table() {
        assert_eq!(SZXYP[0x00] & PF, PF);
        assert_eq!(SZXYP[0x01] & PF, 0);
        assert_eq!(SZXYP[0x03] & PF, PF);
        assert_eq!(SZXYP[0xFF], SF | XYF | PF);
    }
}
