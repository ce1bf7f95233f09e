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

use super::super::*;
use super::{machine, run, AckLog, STACK_TOP};

/// NOPs everywhere, interrupts enabled in the given mode
fn interruptible(mode: u8) -> (Z80, SharedMemory) {
    let (mut cpu, memory) = machine(&[0x00; 0x100]);
    cpu.set_iff(true, true);
    cpu.set_im(mode);
    (cpu, memory)
}

#[test]
fn test_nmi_has_priority_over_irq() {
    let (mut cpu, _) = interruptible(1);
    cpu.set_pc(0x0010);
    cpu.assert_irq(0xFF);
    cpu.assert_nmi();

    let cycles = run(&mut cpu, 1);

    assert_eq!(cycles, 11);
    assert_eq!(cpu.pc(), 0x0066);
    assert_eq!(cpu.iff(), (false, true), "NMI clears IFF1 only");
    assert!(cpu.status().contains(Status::HAS_INT), "IRQ still pending");
    assert!(!cpu.status().contains(Status::HAS_NMI));
}

#[test]
fn test_cleared_irq_is_not_taken() {
    let (mut cpu, _) = interruptible(1);
    cpu.assert_irq(0xFF);
    cpu.clear_irq();

    run(&mut cpu, 1);

    assert_eq!(cpu.pc(), 0x0001);
    assert_eq!(cpu.iff(), (true, true));
}

#[test]
fn test_irq_mode1() {
    let (mut cpu, memory) = interruptible(1);
    cpu.set_pc(0x1234);
    cpu.assert_irq(0xFF);

    let cycles = run(&mut cpu, 1);

    assert_eq!(cycles, 13);
    assert_eq!(cpu.pc(), 0x0038);
    assert_eq!(cpu.iff(), (false, false));
    assert!(!cpu.status().contains(Status::HAS_INT));
    assert_eq!(cpu.reg16(Reg16::SP), STACK_TOP - 2);
    assert_eq!(memory.borrow()[(STACK_TOP - 2) as usize], 0x34);
    assert_eq!(memory.borrow()[(STACK_TOP - 1) as usize], 0x12);
}

#[test]
fn test_irq_mode2_uses_vector_table() {
    let (mut cpu, memory) = interruptible(2);
    cpu.set_i(0x40);
    memory.borrow_mut()[0x40E0] = 0x00;
    memory.borrow_mut()[0x40E1] = 0x80;

    let ack = AckLog::default();
    cpu.set_interrupt_handler(Box::new(ack.clone()));
    cpu.assert_irq(0xE0);

    let cycles = run(&mut cpu, 1);

    assert_eq!(cycles, 19);
    assert_eq!(cpu.pc(), 0x8000);
    assert_eq!(*ack.acks.borrow(), vec![0xE0]);
}

#[test]
fn test_irq_mode2_vector_from_ack_handler() {
    let (mut cpu, memory) = interruptible(2);
    cpu.set_i(0x40);
    memory.borrow_mut()[0x4010] = 0x34;
    memory.borrow_mut()[0x4011] = 0x12;

    let ack = AckLog {
        bus_byte: Some(0x10),
        ..AckLog::default()
    };
    cpu.set_interrupt_handler(Box::new(ack));
    cpu.assert_irq(0xE0);

    run(&mut cpu, 1);
    assert_eq!(cpu.pc(), 0x1234);
}

#[test]
fn test_irq_mode0_executes_rst_from_bus() {
    let (mut cpu, _) = interruptible(0);
    let ack = AckLog {
        bus_byte: Some(0xD7), // RST 10h
        ..AckLog::default()
    };
    cpu.set_interrupt_handler(Box::new(ack));
    cpu.assert_irq(0x00);

    let cycles = run(&mut cpu, 1);
    assert_eq!(cycles, 13);
    assert_eq!(cpu.pc(), 0x0010);
}

#[test]
fn test_irq_mode0_other_byte_falls_back_to_rst38() {
    let (mut cpu, _) = interruptible(0);
    let ack = AckLog {
        bus_byte: Some(0x00),
        ..AckLog::default()
    };
    cpu.set_interrupt_handler(Box::new(ack));
    cpu.assert_irq(0x00);

    run(&mut cpu, 1);
    assert_eq!(cpu.pc(), 0x0038);
}

#[test]
fn test_irq_ignored_when_disabled() {
    let (mut cpu, _) = machine(&[0x00; 0x10]);
    cpu.set_im(1);
    cpu.assert_irq(0xFF);

    run(&mut cpu, 3);

    assert_eq!(cpu.pc(), 0x0003);
    assert!(cpu.status().contains(Status::HAS_INT), "request stays pending");
}

#[test]
fn test_ei_delays_acceptance_by_one_instruction() {
    // EI; NOP; NOP
    let (mut cpu, _) = machine(&[0xFB, 0x00, 0x00]);
    cpu.set_im(1);
    cpu.assert_irq(0xFF);

    run(&mut cpu, 1); // EI
    assert_eq!(cpu.iff(), (true, true));

    run(&mut cpu, 1); // NOP runs inside the shadow
    assert_eq!(cpu.pc(), 0x0002);

    run(&mut cpu, 1); // now the IRQ is taken
    assert_eq!(cpu.pc(), 0x0038);
}

#[test]
fn test_no_interrupt_between_chained_prefixes() {
    // DD; FD; LD IY,1234h; NOP
    let (mut cpu, _) = machine(&[0xDD, 0xFD, 0x21, 0x34, 0x12, 0x00]);
    cpu.set_iff(true, true);
    cpu.set_im(1);

    run(&mut cpu, 1); // DD acts as a NOP
    assert_eq!(cpu.pc(), 0x0001);

    cpu.assert_irq(0xFF);
    cpu.assert_nmi();
    run(&mut cpu, 1); // both requests wait for the prefixed instruction
    assert_eq!(cpu.pc(), 0x0005);
    assert_eq!(cpu.reg16(Reg16::IY), 0x1234);

    run(&mut cpu, 1);
    assert_eq!(cpu.pc(), 0x0066);
}

#[test]
fn test_prefix_chain_in_exec_defers_nmi() {
    // DD x 3 then LD IX,5678h
    let (mut cpu, _) = machine(&[0xDD, 0xDD, 0xDD, 0x21, 0x78, 0x56]);
    cpu.exec(4);
    assert_eq!(cpu.pc(), 0x0001);

    cpu.assert_nmi();
    cpu.exec(4);
    assert_eq!(cpu.pc(), 0x0002, "NMI not taken after a prefix");
    assert!(cpu.status().contains(Status::HAS_NMI));

    cpu.exec(14);
    assert_eq!(cpu.reg16(Reg16::IX), 0x5678);
    assert_eq!(cpu.pc(), 0x0006);
    cpu.exec(1);
    assert_eq!(cpu.pc(), 0x0066);
}

#[test]
fn test_di_blocks_irq() {
    // DI; NOP
    let (mut cpu, _) = machine(&[0xF3, 0x00]);
    cpu.set_iff(true, true);
    cpu.set_im(1);

    run(&mut cpu, 1);
    assert_eq!(cpu.iff(), (false, false));

    cpu.assert_irq(0xFF);
    run(&mut cpu, 1);
    assert_eq!(cpu.pc(), 0x0002);
}

#[test]
fn test_halt_until_interrupt() {
    // HALT at 0000h
    let (mut cpu, memory) = machine(&[0x76]);
    cpu.set_iff(true, true);
    cpu.set_im(1);

    let left = cpu.exec(100);
    assert!(cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0001);
    assert!(left <= 0 && left > -4);

    cpu.assert_irq(0xFF);
    cpu.exec(13);
    assert!(!cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0038);
    // Return address is the instruction after HALT
    assert_eq!(memory.borrow()[(STACK_TOP - 2) as usize], 0x01);
}

#[test]
fn test_nmi_wakes_halt_with_interrupts_disabled() {
    let (mut cpu, _) = machine(&[0x76]);
    cpu.exec(20);
    assert!(cpu.is_halted());

    cpu.assert_nmi();
    cpu.exec(11);
    assert!(!cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0066);
}

#[test]
fn test_retn_restores_iff1_and_notifies() {
    // RETN at 0066h
    let mut program = vec![0u8; 0x70];
    program[0x66] = 0xED;
    program[0x67] = 0x45;
    let (mut cpu, _) = machine(&program);
    cpu.set_pc(0x0020);
    cpu.set_iff(true, true);

    let ack = AckLog::default();
    cpu.set_interrupt_handler(Box::new(ack.clone()));

    cpu.assert_nmi();
    run(&mut cpu, 1);
    assert_eq!(cpu.iff(), (false, true));

    run(&mut cpu, 1);
    assert_eq!(cpu.pc(), 0x0020);
    assert_eq!(cpu.iff(), (true, true));
    assert_eq!(*ack.retis.borrow(), 1);
}

#[test]
fn test_reti_notifies_handler() {
    // RETI at 0038h
    let mut program = vec![0u8; 0x40];
    program[0x38] = 0xED;
    program[0x39] = 0x4D;
    let (mut cpu, _) = machine(&program);
    cpu.set_iff(true, true);
    cpu.set_im(1);
    cpu.set_pc(0x0010);

    let ack = AckLog::default();
    cpu.set_interrupt_handler(Box::new(ack.clone()));
    cpu.assert_irq(0xFF);

    run(&mut cpu, 2);
    assert_eq!(cpu.pc(), 0x0010);
    assert_eq!(*ack.retis.borrow(), 1);
    assert_eq!(*ack.acks.borrow(), vec![0xFF]);
}

#[test]
fn test_interrupt_bumps_refresh() {
    let (mut cpu, _) = interruptible(1);
    cpu.set_r(0x00);
    cpu.assert_irq(0xFF);
    run(&mut cpu, 1);
    assert_eq!(cpu.r(), 0x01);
}
