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

//! Sega 8/16-bit hardware core library
//!
//! This library provides three self-contained pieces of Mega Drive / Master
//! System hardware: a cycle-counted Z80 interpreter, the tristate controller
//! port bus with its devices, and the I2C serial EEPROM found on cartridges.
//!
//! # Example
//!
//! ```
//! use genscore::core::cpu::{FlatMemory, Reg8, Z80};
//!
//! // LD A,0x42 ; HALT
//! let ram = FlatMemory::new();
//! ram.load(0x0000, &[0x3E, 0x42, 0x76]);
//!
//! let mut cpu = Z80::new();
//! cpu.set_memory_handler(Box::new(ram));
//! cpu.exec(100);
//!
//! assert_eq!(cpu.reg8(Reg8::A), 0x42);
//! assert!(cpu.is_halted());
//! ```

pub mod core;
