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

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;

// Module declarations
mod bus;
mod flags;
mod instructions;
mod registers;
#[cfg(test)]
mod tests;
mod timing;

// Re-exports
pub use bus::{
    FlatMemory, InterruptHandler, MemoryHandler, OpenBus, PortHandler, SharedMemory,
    ADDRESS_SPACE, OPEN_BUS,
};
pub use flags::{CF, HF, NF, PF, SF, XF, XYF, YF, ZF};
pub use registers::{Reg16, Reg8, RegisterPair};

use bus::FetchMap;
use registers::{IndexReg, Registers};

bitflags! {
    /// Interpreter status register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Status: u8 {
        /// A maskable interrupt is pending
        const HAS_INT = 0x04;
        /// A non-maskable interrupt is pending
        const HAS_NMI = 0x08;
        /// Inside `exec`
        const RUNNING = 0x10;
        /// Stopped at a HALT instruction
        const HALTED = 0x20;
        /// Stopped by the host; `exec` refuses to run
        const FAULTED = 0x80;
    }
}

/// Serializable copy of the interpreter state
///
/// Handlers and fetch windows belong to the host and are not part of the
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Z80State {
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub af2: u16,
    pub bc2: u16,
    pub de2: u16,
    pub hl2: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub wz: u16,
    pub i: u8,
    pub r: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub irq_vector: u8,
    pub status: Status,
    pub ei_shadow: bool,
    /// Between a DD/FD prefix and the prefix that follows it
    #[serde(default)]
    pub prefix_shadow: bool,
    /// Overrun carried into the next `exec` call (zero or negative)
    pub carry: i32,
}

/// Zilog Z80 interpreter
///
/// # Specifications
/// - Clock: driven by the host in T-states
/// - Registers: AF/BC/DE/HL with shadow set, IX, IY, SP, PC, I, R and WZ
/// - Interrupts: NMI plus maskable IRQ in modes 0, 1 and 2
///
/// All memory and I/O goes through handler objects installed by the host.
/// Until a handler is installed every read returns [`OPEN_BUS`].
///
/// # Example
/// ```
/// use genscore::core::cpu::Z80;
///
/// let mut cpu = Z80::new();
/// cpu.reset();
/// assert_eq!(cpu.pc(), 0x0000);
/// ```
pub struct Z80 {
    regs: Registers,

    /// Interrupt enable flip-flops
    iff1: bool,
    iff2: bool,

    /// Interrupt mode (0, 1 or 2)
    im: u8,

    /// Vector latched by the last `assert_irq`
    irq_vector: u8,

    status: Status,

    /// Set by EI; blocks IRQ acceptance before the next instruction
    ei_shadow: bool,

    /// Set by a DD/FD prefix followed by another prefix; blocks NMI and
    /// IRQ acceptance until the next prefix has run
    prefix_shadow: bool,

    /// Budget of the current (or last) `exec` call, overrun included
    cycle_budget: i64,

    /// T-states left in the current `exec` call
    ///
    /// Kept wider than the `i32` budget so an instruction that overruns a
    /// budget near `i32::MAX` cannot overflow the accounting.
    cycles_left: i64,

    /// Overrun of the previous call, charged to the next one
    carry: i64,

    /// T-states consumed since the last reset
    total_cycles: u64,

    memory: Box<dyn MemoryHandler>,
    ports: Box<dyn PortHandler>,
    interrupts: Box<dyn InterruptHandler>,
    fetch: FetchMap,
}

impl Z80 {
    /// Create a new Z80 in its power-on state
    ///
    /// # Returns
    /// Interpreter with open-bus handlers installed and no fetch windows
    pub fn new() -> Self {
        Self {
            regs: Registers::power_on(),
            iff1: false,
            iff2: false,
            im: 0,
            irq_vector: 0,
            status: Status::empty(),
            ei_shadow: false,
            prefix_shadow: false,
            cycle_budget: 0,
            cycles_left: 0,
            carry: 0,
            total_cycles: 0,
            memory: Box::new(OpenBus),
            ports: Box::new(OpenBus),
            interrupts: Box::new(OpenBus),
            fetch: FetchMap::new(),
        }
    }

    /// Hard reset
    ///
    /// Reinitialises registers, interrupt state and cycle accounting.
    /// Installed handlers and fetch windows are kept.
    pub fn reset(&mut self) {
        self.regs = Registers::power_on();
        self.iff1 = false;
        self.iff2 = false;
        self.im = 0;
        self.irq_vector = 0;
        self.status = Status::empty();
        self.ei_shadow = false;
        self.prefix_shadow = false;
        self.cycle_budget = 0;
        self.cycles_left = 0;
        self.carry = 0;
        self.total_cycles = 0;
        log::debug!("Z80 reset");
    }

    /// Soft reset (the /RESET line)
    ///
    /// Clears PC, I, R, the interrupt flip-flops and mode, and the
    /// halted/faulted state. General-purpose registers keep their values.
    pub fn soft_reset(&mut self) {
        self.regs.pc = 0;
        self.regs.i = 0;
        self.regs.set_refresh(0);
        self.iff1 = false;
        self.iff2 = false;
        self.im = 0;
        self.ei_shadow = false;
        self.prefix_shadow = false;
        self.status
            .remove(Status::HALTED | Status::FAULTED | Status::HAS_INT | Status::HAS_NMI);
        log::debug!("Z80 soft reset");
    }

    /// Install the memory handler
    pub fn set_memory_handler(&mut self, handler: Box<dyn MemoryHandler>) {
        self.memory = handler;
    }

    /// Install the I/O port handler
    pub fn set_port_handler(&mut self, handler: Box<dyn PortHandler>) {
        self.ports = handler;
    }

    /// Install the interrupt acknowledge / RETI handler
    pub fn set_interrupt_handler(&mut self, handler: Box<dyn InterruptHandler>) {
        self.interrupts = handler;
    }

    /// Map `low..=high` for instruction fetch directly from `memory[offset..]`
    ///
    /// Fetches outside every window fall back to the memory handler, so a
    /// window only speeds things up. Data reads and writes always use the
    /// handler.
    ///
    /// # Arguments
    /// - `low`, `high`: Inclusive Z80 address range
    /// - `memory`: Backing store shared with the host
    /// - `offset`: Index in `memory` that corresponds to `low`
    ///
    /// # Returns
    /// - `Ok(())` on success
    /// - `Err(EmulatorError::Cpu)` if the range is inverted or the backing
    ///   store is too short
    pub fn set_fetch_window(
        &mut self,
        low: u16,
        high: u16,
        memory: SharedMemory,
        offset: usize,
    ) -> Result<()> {
        self.fetch.install(low, high, memory, offset)?;
        Ok(())
    }

    /// Remove all fetch windows
    pub fn clear_fetch_windows(&mut self) {
        self.fetch.clear();
    }

    /// Number of installed fetch windows
    pub fn fetch_window_count(&self) -> usize {
        self.fetch.len()
    }

    /// Execute instructions for `cycles` T-states
    ///
    /// The overrun of the previous call is subtracted from the budget first.
    /// Whole instructions run until the budget is used up; the last one may
    /// overshoot, and that overshoot is carried into the next call.
    ///
    /// # Arguments
    /// - `cycles`: T-states to run
    ///
    /// # Returns
    /// Remaining T-states: zero or negative after a normal run. A faulted
    /// core runs nothing and returns `cycles` unchanged.
    ///
    /// # Example
    /// ```
    /// use genscore::core::cpu::Z80;
    ///
    /// let mut cpu = Z80::new();
    /// // Open bus reads 0xFF: RST 38h, 11 T-states each
    /// let left = cpu.exec(100);
    /// assert_eq!(left, -10);
    /// // The 10 T-state overrun is charged to the next call
    /// assert_eq!(cpu.exec(10), 0);
    /// ```
    pub fn exec(&mut self, cycles: i32) -> i32 {
        if self.status.contains(Status::FAULTED) {
            log::warn!("Z80 exec refused: core is faulted (PC=0x{:04X})", self.regs.pc);
            return cycles;
        }

        self.cycle_budget = cycles as i64 + self.carry;
        self.cycles_left = self.cycle_budget;
        self.status.insert(Status::RUNNING);

        while self.cycles_left > 0 {
            if self.status.intersects(Status::HAS_NMI | Status::HAS_INT)
                && self.service_interrupts()
            {
                continue;
            }

            if self.status.contains(Status::HALTED) {
                self.burn_halt();
                continue;
            }

            self.step();
        }

        self.status.remove(Status::RUNNING);
        self.total_cycles += (self.cycle_budget - self.cycles_left) as u64;
        self.carry = self.cycles_left.min(0);
        clamp_cycles(self.cycles_left)
    }

    /// Execute one instruction, ignoring the cycle budget
    ///
    /// Pending interrupts are serviced instead of an instruction when they
    /// are accepted; a halted core burns one refresh cycle.
    ///
    /// # Returns
    /// T-states consumed
    pub fn step_instruction(&mut self) -> i32 {
        let before = self.cycles_left;
        if !(self.status.intersects(Status::HAS_NMI | Status::HAS_INT)
            && self.service_interrupts())
        {
            if self.status.contains(Status::HALTED) {
                self.regs.bump_refresh();
                self.charge(timing::HALT_CYCLES);
            } else {
                self.step();
            }
        }
        let used = before - self.cycles_left;
        self.cycles_left = before;
        self.total_cycles += used as u64;
        clamp_cycles(used)
    }

    /// Fetch, decode and execute one instruction
    fn step(&mut self) {
        self.ei_shadow = false;
        self.prefix_shadow = false;
        let pc = self.regs.pc;
        let opcode = self.fetch_opcode();
        log::trace!("Z80 PC=0x{:04X} op=0x{:02X}", pc, opcode);
        self.execute(opcode);
    }

    /// Consume the rest of the budget in 4 T-state refresh cycles
    fn burn_halt(&mut self) {
        let halt = timing::HALT_CYCLES as i64;
        let chunks = (self.cycles_left + halt - 1) / halt;
        self.regs.bump_refresh_by(chunks as u32);
        self.cycles_left -= chunks * halt;
    }

    /// Accept a pending interrupt if possible
    ///
    /// # Returns
    /// true if an interrupt was taken
    fn service_interrupts(&mut self) -> bool {
        if self.prefix_shadow {
            return false;
        }

        if self.status.contains(Status::HAS_NMI) {
            self.status.remove(Status::HAS_NMI | Status::HALTED);
            self.regs.bump_refresh();
            self.iff1 = false;
            self.push16(self.regs.pc);
            self.regs.pc = 0x0066;
            self.regs.wz = 0x0066;
            self.charge(timing::NMI_CYCLES);
            log::debug!("Z80 NMI accepted");
            return true;
        }

        if !self.status.contains(Status::HAS_INT) || !self.iff1 || self.ei_shadow {
            return false;
        }

        self.status.remove(Status::HAS_INT | Status::HALTED);
        self.regs.bump_refresh();
        self.iff1 = false;
        self.iff2 = false;

        let data = self.interrupts.acknowledge(self.irq_vector);
        let return_pc = self.regs.pc;
        self.push16(return_pc);

        match self.im {
            2 => {
                let table = ((self.regs.i as u16) << 8) | data as u16;
                self.regs.pc = self.memory.read_word(table);
                self.charge(timing::IM2_CYCLES);
            }
            0 if data & 0xC7 == 0xC7 => {
                // RST n placed on the bus
                self.regs.pc = (data & 0x38) as u16;
                self.charge(timing::IM1_CYCLES);
            }
            _ => {
                self.regs.pc = 0x0038;
                self.charge(timing::IM1_CYCLES);
            }
        }
        self.regs.wz = self.regs.pc;

        log::debug!(
            "Z80 IRQ accepted: IM {} data=0x{:02X} -> 0x{:04X}",
            self.im,
            data,
            self.regs.pc
        );
        true
    }

    // === Interrupt lines ===

    /// Raise the maskable interrupt line with `vector` for the ack cycle
    pub fn assert_irq(&mut self, vector: u8) {
        self.irq_vector = vector;
        self.status.insert(Status::HAS_INT);
    }

    /// Drop the maskable interrupt line
    pub fn clear_irq(&mut self) {
        self.status.remove(Status::HAS_INT);
    }

    /// Raise the non-maskable interrupt
    pub fn assert_nmi(&mut self) {
        self.status.insert(Status::HAS_NMI);
    }

    /// Withdraw a pending NMI
    pub fn clear_nmi(&mut self) {
        self.status.remove(Status::HAS_NMI);
    }

    // === Cycle accounting ===

    /// T-states consumed so far by the current `exec` call
    pub fn cycles_done(&self) -> i32 {
        clamp_cycles(self.cycle_budget - self.cycles_left)
    }

    /// T-states left in the current `exec` call
    pub fn cycles_remaining(&self) -> i32 {
        clamp_cycles(self.cycles_left)
    }

    /// Charge extra T-states (bus wait states, DMA steal)
    ///
    /// Between `exec` calls the charge is added to the carried overrun and
    /// taken from the next budget.
    pub fn add_cycles(&mut self, cycles: i32) {
        if self.status.contains(Status::RUNNING) {
            self.cycles_left -= cycles as i64;
        } else {
            self.carry -= cycles as i64;
        }
    }

    /// T-states consumed since the last hard reset
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Overrun that will be charged to the next `exec` call
    pub fn carried_cycles(&self) -> i32 {
        clamp_cycles(self.carry)
    }

    // === Status ===

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status.contains(Status::HALTED)
    }

    pub fn is_faulted(&self) -> bool {
        self.status.contains(Status::FAULTED)
    }

    /// Mark the core faulted (or clear the mark)
    ///
    /// A faulted core keeps its state but `exec` runs nothing until the flag
    /// is cleared or the core is reset.
    pub fn set_faulted(&mut self, faulted: bool) {
        self.status.set(Status::FAULTED, faulted);
    }

    // === Register access ===

    /// Read an 8-bit register
    ///
    /// # Example
    /// ```
    /// use genscore::core::cpu::{Reg8, Reg16, Z80};
    ///
    /// let mut cpu = Z80::new();
    /// cpu.set_reg16(Reg16::BC, 0x1234);
    /// assert_eq!(cpu.reg8(Reg8::B), 0x12);
    /// assert_eq!(cpu.reg8(Reg8::C), 0x34);
    /// ```
    pub fn reg8(&self, reg: Reg8) -> u8 {
        let r = &self.regs;
        match reg {
            Reg8::A => r.af.high(),
            Reg8::F => r.af.low(),
            Reg8::B => r.bc.high(),
            Reg8::C => r.bc.low(),
            Reg8::D => r.de.high(),
            Reg8::E => r.de.low(),
            Reg8::H => r.hl.high(),
            Reg8::L => r.hl.low(),
            Reg8::IXH => r.ix.high(),
            Reg8::IXL => r.ix.low(),
            Reg8::IYH => r.iy.high(),
            Reg8::IYL => r.iy.low(),
            Reg8::I => r.i,
        }
    }

    /// Write an 8-bit register
    pub fn set_reg8(&mut self, reg: Reg8, value: u8) {
        let r = &mut self.regs;
        match reg {
            Reg8::A => r.af.set_high(value),
            Reg8::F => r.af.set_low(value),
            Reg8::B => r.bc.set_high(value),
            Reg8::C => r.bc.set_low(value),
            Reg8::D => r.de.set_high(value),
            Reg8::E => r.de.set_low(value),
            Reg8::H => r.hl.set_high(value),
            Reg8::L => r.hl.set_low(value),
            Reg8::IXH => r.ix.set_high(value),
            Reg8::IXL => r.ix.set_low(value),
            Reg8::IYH => r.iy.set_high(value),
            Reg8::IYL => r.iy.set_low(value),
            Reg8::I => r.i = value,
        }
    }

    /// Read a 16-bit register
    pub fn reg16(&self, reg: Reg16) -> u16 {
        let r = &self.regs;
        match reg {
            Reg16::AF => r.af.combined(),
            Reg16::BC => r.bc.combined(),
            Reg16::DE => r.de.combined(),
            Reg16::HL => r.hl.combined(),
            Reg16::AF2 => r.af2.combined(),
            Reg16::BC2 => r.bc2.combined(),
            Reg16::DE2 => r.de2.combined(),
            Reg16::HL2 => r.hl2.combined(),
            Reg16::IX => r.ix.combined(),
            Reg16::IY => r.iy.combined(),
            Reg16::SP => r.sp,
            Reg16::PC => r.pc,
            Reg16::WZ => r.wz,
        }
    }

    /// Write a 16-bit register
    pub fn set_reg16(&mut self, reg: Reg16, value: u16) {
        let r = &mut self.regs;
        match reg {
            Reg16::AF => r.af.set(value),
            Reg16::BC => r.bc.set(value),
            Reg16::DE => r.de.set(value),
            Reg16::HL => r.hl.set(value),
            Reg16::AF2 => r.af2.set(value),
            Reg16::BC2 => r.bc2.set(value),
            Reg16::DE2 => r.de2.set(value),
            Reg16::HL2 => r.hl2.set(value),
            Reg16::IX => r.ix.set(value),
            Reg16::IY => r.iy.set(value),
            Reg16::SP => r.sp = value,
            Reg16::PC => r.pc = value,
            Reg16::WZ => r.wz = value,
        }
    }

    #[inline(always)]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.regs.pc = pc;
    }

    /// R register as `LD A,R` would see it
    pub fn r(&self) -> u8 {
        self.regs.refresh()
    }

    /// Set R, including bit 7
    pub fn set_r(&mut self, value: u8) {
        self.regs.set_refresh(value);
    }

    pub fn i(&self) -> u8 {
        self.regs.i
    }

    pub fn set_i(&mut self, value: u8) {
        self.regs.i = value;
    }

    /// Internal address latch (MEMPTR)
    pub fn wz(&self) -> u16 {
        self.regs.wz
    }

    /// Interrupt flip-flops as `(IFF1, IFF2)`
    pub fn iff(&self) -> (bool, bool) {
        (self.iff1, self.iff2)
    }

    pub fn set_iff(&mut self, iff1: bool, iff2: bool) {
        self.iff1 = iff1;
        self.iff2 = iff2;
    }

    pub fn im(&self) -> u8 {
        self.im
    }

    /// Set the interrupt mode; values above 2 select mode 2
    pub fn set_im(&mut self, mode: u8) {
        self.im = mode.min(2);
    }

    // === Snapshots ===

    /// Copy the complete interpreter state
    pub fn snapshot(&self) -> Z80State {
        let r = &self.regs;
        Z80State {
            af: r.af.combined(),
            bc: r.bc.combined(),
            de: r.de.combined(),
            hl: r.hl.combined(),
            af2: r.af2.combined(),
            bc2: r.bc2.combined(),
            de2: r.de2.combined(),
            hl2: r.hl2.combined(),
            ix: r.ix.combined(),
            iy: r.iy.combined(),
            sp: r.sp,
            pc: r.pc,
            wz: r.wz,
            i: r.i,
            r: r.refresh(),
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im,
            irq_vector: self.irq_vector,
            status: self.status - Status::RUNNING,
            ei_shadow: self.ei_shadow,
            prefix_shadow: self.prefix_shadow,
            carry: clamp_cycles(self.carry),
        }
    }

    /// Load a state produced by [`Z80::snapshot`]
    pub fn restore(&mut self, state: &Z80State) {
        let r = &mut self.regs;
        r.af.set(state.af);
        r.bc.set(state.bc);
        r.de.set(state.de);
        r.hl.set(state.hl);
        r.af2.set(state.af2);
        r.bc2.set(state.bc2);
        r.de2.set(state.de2);
        r.hl2.set(state.hl2);
        r.ix.set(state.ix);
        r.iy.set(state.iy);
        r.sp = state.sp;
        r.pc = state.pc;
        r.wz = state.wz;
        r.i = state.i;
        r.set_refresh(state.r);
        self.iff1 = state.iff1;
        self.iff2 = state.iff2;
        self.im = state.im.min(2);
        self.irq_vector = state.irq_vector;
        self.status = state.status - Status::RUNNING;
        self.ei_shadow = state.ei_shadow;
        self.prefix_shadow = state.prefix_shadow;
        self.carry = state.carry.min(0) as i64;
        self.cycle_budget = 0;
        self.cycles_left = 0;
    }

    // === Bus helpers used by the instruction handlers ===

    #[inline(always)]
    fn charge(&mut self, cycles: i32) {
        self.cycles_left -= cycles as i64;
    }

    /// Opcode fetch (M1 cycle): advances R
    #[inline(always)]
    fn fetch_opcode(&mut self) -> u8 {
        self.regs.bump_refresh();
        self.fetch8()
    }

    /// Operand fetch at PC
    #[inline(always)]
    fn fetch8(&mut self) -> u8 {
        let pc = self.regs.pc;
        self.regs.pc = pc.wrapping_add(1);
        match self.fetch.fetch(pc) {
            Some(byte) => byte,
            None => self.memory.read_byte(pc),
        }
    }

    #[inline(always)]
    fn fetch16(&mut self) -> u16 {
        let low = self.fetch8() as u16;
        let high = self.fetch8() as u16;
        (high << 8) | low
    }

    #[inline(always)]
    fn read8(&mut self, address: u16) -> u8 {
        self.memory.read_byte(address)
    }

    #[inline(always)]
    fn write8(&mut self, address: u16, value: u8) {
        self.memory.write_byte(address, value);
    }

    #[inline(always)]
    fn read16(&mut self, address: u16) -> u16 {
        self.memory.read_word(address)
    }

    #[inline(always)]
    fn write16(&mut self, address: u16, value: u16) {
        self.memory.write_word(address, value);
    }

    fn push16(&mut self, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        self.write16(self.regs.sp, value);
    }

    fn pop16(&mut self) -> u16 {
        let value = self.read16(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    /// Fetch a displacement and form `IX+d` / `IY+d`, updating WZ
    fn index_address(&mut self, xy: IndexReg) -> u16 {
        let displacement = self.fetch8() as i8;
        let address = self
            .regs
            .index(xy)
            .wrapping_add_signed(displacement as i16);
        self.regs.wz = address;
        address
    }

    /// Evaluate a 3-bit condition code (NZ Z NC C PO PE P M)
    fn condition(&self, cc: u8) -> bool {
        let f = self.regs.f();
        match cc & 7 {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            _ => f & SF != 0,
        }
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

/// Narrow an internal cycle count to the `i32` used by the public API
#[inline]
fn clamp_cycles(cycles: i64) -> i32 {
    cycles.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
