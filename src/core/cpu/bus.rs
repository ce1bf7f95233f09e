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

//! Z80 bus contract
//!
//! The interpreter never owns memory. Every access goes through one of three
//! handler traits installed by the host:
//!
//! ```text
//! ┌───────────────┐   read_byte / write_byte   ┌──────────────────────┐
//! │               │ ─────────────────────────▶ │ MemoryHandler        │
//! │      Z80      │   in_port / out_port       │ PortHandler          │
//! │               │ ─────────────────────────▶ │ InterruptHandler     │
//! └───────────────┘   acknowledge / on_reti    └──────────────────────┘
//!         │
//!         └── FetchMap: direct reads of opcode bytes from shared RAM/ROM
//! ```
//!
//! The handler object *is* the context: a host that needs to reach several
//! peripherals implements the traits on a struct holding them.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::error::CpuError;

/// Value returned by reads that nothing answers
pub const OPEN_BUS: u8 = 0xFF;

/// Memory shared between the host and a fetch window
pub type SharedMemory = Rc<RefCell<Vec<u8>>>;

/// Memory-space access
///
/// Reads take `&mut self` because peripherals commonly change state when
/// read (latches, auto-incrementing ports, controller protocols).
pub trait MemoryHandler {
    /// Read one byte from the 64 KiB memory space
    fn read_byte(&mut self, address: u16) -> u8;

    /// Write one byte to the 64 KiB memory space
    fn write_byte(&mut self, address: u16, value: u8);

    /// Read a little-endian word
    ///
    /// The default performs two byte reads, low byte first, wrapping at
    /// 0xFFFF. Hosts with a faster path may override it.
    fn read_word(&mut self, address: u16) -> u16 {
        let low = self.read_byte(address) as u16;
        let high = self.read_byte(address.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    /// Write a little-endian word, low byte first
    fn write_word(&mut self, address: u16, value: u16) {
        self.write_byte(address, value as u8);
        self.write_byte(address.wrapping_add(1), (value >> 8) as u8);
    }
}

/// I/O-space access (IN/OUT instructions)
///
/// The full 16-bit port address is passed; on `IN r,(C)` the upper byte is B,
/// on `IN A,(n)` it is A.
pub trait PortHandler {
    fn in_port(&mut self, port: u16) -> u8;
    fn out_port(&mut self, port: u16, value: u8);
}

/// Interrupt acknowledge cycle and RETI notification
pub trait InterruptHandler {
    /// Called when a maskable interrupt is accepted
    ///
    /// Receives the vector latched by `assert_irq` and returns the byte the
    /// peripheral places on the data bus. In mode 2 this forms the low byte
    /// of the vector table address; in mode 0 it is executed as an `RST`.
    fn acknowledge(&mut self, vector: u8) -> u8 {
        vector
    }

    /// Called after RETI or RETN completes
    fn on_reti(&mut self) {}
}

/// Handler used until the host installs its own
///
/// Reads float high, writes vanish and the interrupt acknowledge cycle
/// returns the latched vector unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenBus;

impl MemoryHandler for OpenBus {
    fn read_byte(&mut self, _address: u16) -> u8 {
        OPEN_BUS
    }

    fn write_byte(&mut self, _address: u16, _value: u8) {}
}

impl PortHandler for OpenBus {
    fn in_port(&mut self, _port: u16) -> u8 {
        OPEN_BUS
    }

    fn out_port(&mut self, _port: u16, _value: u8) {}
}

impl InterruptHandler for OpenBus {}

/// Size of the Z80 address space
pub const ADDRESS_SPACE: usize = 0x10000;

/// 64 KiB of flat RAM
///
/// The backing store is shared, so the host can inspect or patch memory
/// while the handler is installed on the CPU, and the same buffer can back a
/// fetch window.
///
/// # Example
/// ```
/// use genscore::core::cpu::{FlatMemory, Z80};
///
/// let ram = FlatMemory::new();
/// ram.load(0x0000, &[0x3E, 0x42]); // LD A,42h
/// let shared = ram.shared();
///
/// let mut cpu = Z80::new();
/// cpu.set_memory_handler(Box::new(ram));
/// cpu.set_fetch_window(0x0000, 0xFFFF, shared, 0).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FlatMemory {
    memory: SharedMemory,
}

impl FlatMemory {
    pub fn new() -> Self {
        Self {
            memory: Rc::new(RefCell::new(vec![0u8; ADDRESS_SPACE])),
        }
    }

    /// Handle to the backing store
    pub fn shared(&self) -> SharedMemory {
        Rc::clone(&self.memory)
    }

    /// Copy `bytes` into memory starting at `address`, wrapping at 0xFFFF
    pub fn load(&self, address: u16, bytes: &[u8]) {
        let mut memory = self.memory.borrow_mut();
        for (i, &byte) in bytes.iter().enumerate() {
            let target = (address as usize + i) % ADDRESS_SPACE;
            memory[target] = byte;
        }
    }

    /// Read a byte without going through the CPU
    pub fn peek(&self, address: u16) -> u8 {
        self.memory
            .borrow()
            .get(address as usize)
            .copied()
            .unwrap_or(OPEN_BUS)
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHandler for FlatMemory {
    #[inline]
    fn read_byte(&mut self, address: u16) -> u8 {
        match self.memory.try_borrow() {
            Ok(memory) => memory.get(address as usize).copied().unwrap_or(OPEN_BUS),
            Err(_) => OPEN_BUS,
        }
    }

    #[inline]
    fn write_byte(&mut self, address: u16, value: u8) {
        if let Ok(mut memory) = self.memory.try_borrow_mut() {
            if let Some(slot) = memory.get_mut(address as usize) {
                *slot = value;
            }
        }
    }
}

/// Number of address bits used to select a fetch bank
const FETCH_BITS: u32 = 4;
const FETCH_SHIFT: u32 = 16 - FETCH_BITS;
const FETCH_BANKS: usize = 1 << FETCH_BITS;

/// A contiguous address range whose bytes are read straight from memory
#[derive(Debug)]
struct FetchWindow {
    low: u16,
    high: u16,
    memory: SharedMemory,
    offset: usize,
}

impl FetchWindow {
    #[inline(always)]
    fn contains(&self, address: u16) -> bool {
        address >= self.low && address <= self.high
    }

    fn overlaps(&self, low: u16, high: u16) -> bool {
        self.low <= high && low <= self.high
    }
}

/// Fast path for instruction fetch
///
/// Windows are indexed by 4 KiB bank so a fetch inspects at most the
/// windows touching one bank. Addresses outside every window return `None`
/// and the caller falls back to the memory handler.
#[derive(Debug)]
pub(super) struct FetchMap {
    windows: Vec<FetchWindow>,
    banks: [Vec<usize>; FETCH_BANKS],
}

impl FetchMap {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            banks: Default::default(),
        }
    }

    /// Install a window mapping `low..=high` to `memory[offset..]`
    ///
    /// Existing windows overlapping the new range are replaced.
    pub fn install(
        &mut self,
        low: u16,
        high: u16,
        memory: SharedMemory,
        offset: usize,
    ) -> Result<(), CpuError> {
        if low > high {
            return Err(CpuError::InvalidFetchWindow {
                low,
                high,
                reason: "low address above high address".to_string(),
            });
        }

        let span = (high - low) as usize + 1;
        let available = memory.borrow().len();
        if offset.checked_add(span).is_none_or(|end| end > available) {
            return Err(CpuError::InvalidFetchWindow {
                low,
                high,
                reason: format!(
                    "needs {} bytes from offset {} but memory holds {}",
                    span, offset, available
                ),
            });
        }

        self.windows.retain(|w| !w.overlaps(low, high));
        self.windows.push(FetchWindow {
            low,
            high,
            memory,
            offset,
        });
        self.rebuild_banks();

        log::debug!(
            "Fetch window installed: 0x{:04X}-0x{:04X} (offset 0x{:X})",
            low,
            high,
            offset
        );
        Ok(())
    }

    /// Remove every window
    pub fn clear(&mut self) {
        self.windows.clear();
        self.rebuild_banks();
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    fn rebuild_banks(&mut self) {
        for bank in self.banks.iter_mut() {
            bank.clear();
        }
        for (index, window) in self.windows.iter().enumerate() {
            let first = (window.low >> FETCH_SHIFT) as usize;
            let last = (window.high >> FETCH_SHIFT) as usize;
            for bank in &mut self.banks[first..=last] {
                bank.push(index);
            }
        }
    }

    /// Read a byte through the window covering `address`, if any
    #[inline]
    pub fn fetch(&self, address: u16) -> Option<u8> {
        let bank = &self.banks[(address >> FETCH_SHIFT) as usize];
        for &index in bank {
            let window = &self.windows[index];
            if window.contains(address) {
                let memory = window.memory.try_borrow().ok()?;
                let position = window.offset + (address - window.low) as usize;
                return memory.get(position).copied();
            }
        }
        None
    }
}
