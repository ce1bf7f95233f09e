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

mod common;

use common::assertions::{assert_pc, assert_ram};
use common::fixtures::{play, LineScript, Machine};
use genscore::core::config::{CoreConfig, PortsConfig, TeamPlayerConfig};
use genscore::core::cpu::Reg16;
use genscore::core::io::{buttons, DeviceKind, IoManager, Port};

#[test]
fn test_cpu_reads_pad_through_io_block() {
    #[rustfmt::skip]
    let program = [
        0x3E, 0x40,       // LD A,0x40
        0x32, 0x04, 0x90, // LD (ctrl 1),A   TH is an output
        0x32, 0x01, 0x90, // LD (data 1),A   TH=1
        0x3A, 0x01, 0x90, // LD A,(data 1)
        0x32, 0x00, 0x70, // LD (0x7000),A
        0xAF,             // XOR A
        0x32, 0x01, 0x90, // LD (data 1),A   TH=0
        0x3A, 0x01, 0x90, // LD A,(data 1)
        0x32, 0x01, 0x70, // LD (0x7001),A
        0x76,             // HALT
    ];

    let mut io = IoManager::new();
    io.connect_new(Port::Port1, DeviceKind::ThreeButton);
    io.update_port(
        Port::Port1,
        buttons::pressed(buttons::UP | buttons::START | buttons::A),
    );

    let mut machine = Machine::with_io(&program, io);
    machine.run_to_halt(1_000);

    // TH=1: ?1CBRLDU, TH=0: ?0SA00DU
    assert_ram(&machine, 0x7000, 0x7E);
    assert_ram(&machine, 0x7001, 0x02);
    assert_pc(&machine.cpu, 0x0019);
}

#[test]
fn test_cpu_writes_and_reads_eeprom() {
    let mut machine = Machine::new(&[]);

    let mut write = LineScript::new();
    write.start();
    write.send(0x20 << 1);
    for byte in [0x11, 0x22, 0x33] {
        write.send(byte);
    }
    write.stop();
    let samples = play(&mut machine, &write);
    assert!(write.all_acked(&samples));
    assert!(machine.eeprom.borrow().is_dirty());
    assert_eq!(&machine.eeprom.borrow().data()[0x20..0x23], &[0x11, 0x22, 0x33]);

    let mut read = LineScript::new();
    read.start();
    read.send((0x20 << 1) | 1);
    read.receive(true);
    read.receive(true);
    read.receive(false);
    read.stop();
    let samples = play(&mut machine, &read);
    assert!(read.all_acked(&samples));
    assert_eq!(read.decode(&samples), vec![0x11, 0x22, 0x33]);
}

#[test]
fn test_cpu_page_write_wraps() {
    let mut machine = Machine::new(&[]);

    // X24C01 pages are 4 bytes: 2, 3, 0, 1, 2
    let mut script = LineScript::new();
    script.start();
    script.send(0x02 << 1);
    for byte in [0xA0, 0xA1, 0xA2, 0xA3, 0xA4] {
        script.send(byte);
    }
    script.stop();
    play(&mut machine, &script);

    let eeprom = machine.eeprom.borrow();
    assert_eq!(&eeprom.data()[0..4], &[0xA2, 0xA3, 0xA4, 0xA1]);
    assert_eq!(eeprom.data()[4], 0xFF);
}

#[test]
fn test_frame_loop_with_interrupts() {
    #[rustfmt::skip]
    let mut program = vec![
        0x31, 0x00, 0x7F, // LD SP,0x7F00
        0xED, 0x56,       // IM 1
        0xFB,             // EI
        0x76,             // HALT
        0x18, 0xFD,       // JR -3
    ];
    #[rustfmt::skip]
    let handler = [
        0x21, 0x00, 0x70, // LD HL,0x7000
        0x34,             // INC (HL)
        0xFB,             // EI
        0xED, 0x4D,       // RETI
    ];
    program.resize(0x38, 0x00);
    program.extend_from_slice(&handler);

    let config = CoreConfig::default();
    let mut io = config.build_io().unwrap();
    let pad = io.connect_new(Port::Port1, DeviceKind::SixButton);
    let mut machine = Machine::with_io(&program, io);

    const FRAMES: u32 = 10;
    for _ in 0..FRAMES {
        machine.cpu.assert_irq(0xFF);
        for _ in 0..config.lines_per_frame {
            machine.cpu.exec(config.cycles_per_line as i32);
            machine.io.borrow_mut().update_on_scanline();
        }
    }

    assert_ram(&machine, 0x7000, FRAMES as u8);
    assert!(machine.cpu.is_halted());
    assert_eq!(machine.cpu.reg16(Reg16::SP), 0x7F00);

    let expected = FRAMES as u64 * config.cycles_per_frame() as u64;
    let carried = machine.cpu.carried_cycles();
    assert!(carried <= 0);
    assert_eq!(machine.cpu.total_cycles(), expected + (-carried) as u64);

    // Scanlines keep the six-button sequence reset
    let io = machine.io.borrow();
    assert_eq!(io.device(pad).map(|d| d.core().counter), Some(0));
}

#[test]
fn test_team_player_from_config() {
    let config = CoreConfig {
        ports: PortsConfig {
            port1: DeviceKind::TeamPlayer,
            port2: DeviceKind::None,
            ext: DeviceKind::None,
        },
        team_player: TeamPlayerConfig {
            devices: vec![DeviceKind::ThreeButton],
        },
        ..Default::default()
    };
    let mut io = config.build_io().unwrap();

    let tap = io.port_device(Port::Port1);
    let first = io
        .device(tap)
        .and_then(|d| d.sub_devices()[0])
        .expect("virtual port A is wired");
    io.update_buttons(first, buttons::pressed(buttons::UP | buttons::START))
        .unwrap();

    // TH and TR are outputs; register 1 is port 1 data, 4 its control
    io.write_register(0x4, 0x60);
    io.write_register(0x1, 0x60);
    assert_eq!(io.read_register(0x1) & 0x0F, 0x3);

    io.write_register(0x1, 0x20);
    let mut nibbles = vec![io.read_register(0x1) & 0x0F];
    let mut tr = true;
    for _ in 0..9 {
        tr = !tr;
        io.write_register(0x1, if tr { 0x20 } else { 0x00 });
        nibbles.push(io.read_register(0x1) & 0x0F);
    }

    assert_eq!(
        nibbles,
        vec![0xF, 0x0, 0x0, 0x0, 0xF, 0xF, 0xF, 0xE, 0x7, 0xF]
    );
}
