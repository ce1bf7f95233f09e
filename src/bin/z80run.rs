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

//! Z80 test runner
//!
//! Loads a raw binary into 64 KiB of RAM and runs it frame by frame, or as a
//! CP/M program with BDOS console output for instruction exercisers.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use genscore::core::config::CoreConfig;
use genscore::core::cpu::{FlatMemory, Reg16, Reg8, SharedMemory, Z80};
use genscore::core::error::{ConfigError, EmulatorError, Result};
use log::{error, info, warn};

/// CP/M programs start here
const CPM_TPA: u16 = 0x0100;

/// BDOS entry point
const CPM_BDOS: u16 = 0x0005;

/// Z80 program runner
#[derive(Parser)]
#[command(name = "z80run")]
#[command(about = "Run a raw Z80 binary", long_about = None)]
struct Args {
    /// Path to the binary image
    image: PathBuf,

    /// Load address (decimal or 0x-prefixed hex); CP/M mode forces 0x0100
    #[arg(short = 'a', long, default_value = "0", value_parser = parse_address)]
    load_address: u16,

    /// TOML core configuration
    #[arg(short = 'c', long, env = "Z80RUN_CONFIG")]
    config: Option<PathBuf>,

    /// Frames to run
    #[arg(short = 'f', long, default_value = "60", env = "Z80RUN_FRAMES")]
    frames: u32,

    /// Assert an IRQ at the start of every frame
    #[arg(long)]
    irq: bool,

    /// Fetch opcodes straight from RAM
    #[arg(long)]
    fetch_window: bool,

    /// CP/M mode: BDOS console output, stop on warm boot
    #[arg(long)]
    cpm: bool,

    /// Print the final register state as JSON
    #[arg(long)]
    json: bool,
}

fn parse_address(text: &str) -> std::result::Result<u16, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{text}': {e}"))
}

fn main() -> Result<()> {
    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("z80run v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };

    let image = fs::read(&args.image).map_err(|e| {
        error!("Failed to read {}: {}", args.image.display(), e);
        EmulatorError::File(e)
    })?;

    let load_address = if args.cpm { CPM_TPA } else { args.load_address };
    let room = 0x10000 - load_address as usize;
    if image.len() > room {
        return Err(ConfigError::InvalidValue {
            key: "image",
            reason: format!("{} bytes do not fit at 0x{:04X}", image.len(), load_address),
        }
        .into());
    }

    let ram = FlatMemory::new();
    ram.load(load_address, &image);
    let shared = ram.shared();
    info!("Loaded {} bytes at 0x{:04X}", image.len(), load_address);

    let mut cpu = Z80::new();
    cpu.set_memory_handler(Box::new(ram));
    if args.fetch_window {
        cpu.set_fetch_window(0x0000, 0xFFFF, shared.clone(), 0)?;
    }
    cpu.set_pc(load_address);

    if args.cpm {
        run_cpm(&mut cpu, &shared)?;
    } else {
        run_frames(&mut cpu, &config, &args);
    }

    info!("Total cycles: {}", cpu.total_cycles());
    info!("Final PC: 0x{:04X}", cpu.pc());

    if args.json {
        let state = serde_json::to_string_pretty(&cpu.snapshot()).map_err(|e| {
            EmulatorError::File(std::io::Error::other(e))
        })?;
        println!("{state}");
    }
    Ok(())
}

/// Run whole frames with the overrun carried between them
fn run_frames(cpu: &mut Z80, config: &CoreConfig, args: &Args) {
    let budget = config.cycles_per_frame();
    info!("Running {} frames of {} T-states", args.frames, budget);

    for frame in 0..args.frames {
        if args.irq {
            cpu.assert_irq(0xFF);
        }
        cpu.exec(budget);
        if cpu.is_faulted() {
            warn!("Core faulted in frame {}", frame);
            break;
        }
        log::debug!("Frame {} done, PC=0x{:04X}", frame, cpu.pc());
    }
}

/// Run a CP/M program until it jumps to the warm boot vector
fn run_cpm(cpu: &mut Z80, memory: &SharedMemory) -> Result<()> {
    // Initial stack holds a return address of 0x0000
    cpu.set_reg16(Reg16::SP, 0xFFFE);
    {
        let mut ram = memory.borrow_mut();
        ram[0xFFFE] = 0x00;
        ram[0xFFFF] = 0x00;
        // RET at the BDOS entry so the call returns by itself
        ram[CPM_BDOS as usize] = 0xC9;
    }

    let mut stdout = std::io::stdout();
    loop {
        match cpu.pc() {
            0x0000 => break,
            CPM_BDOS => bdos(cpu, memory, &mut stdout)?,
            _ => {}
        }
        if cpu.is_halted() {
            warn!("HALT at 0x{:04X} with no interrupt source", cpu.pc());
            break;
        }
        cpu.step_instruction();
    }
    stdout.flush()?;
    Ok(())
}

/// BDOS console functions 2 (character in E) and 9 (string at DE up to '$')
fn bdos(cpu: &Z80, memory: &SharedMemory, out: &mut impl Write) -> Result<()> {
    match cpu.reg8(Reg8::C) {
        2 => out.write_all(&[cpu.reg8(Reg8::E)])?,
        9 => {
            let ram = memory.borrow();
            let start = cpu.reg16(Reg16::DE) as usize;
            let text: Vec<u8> = ram[start..]
                .iter()
                .copied()
                .take_while(|&b| b != b'$')
                .collect();
            out.write_all(&text)?;
        }
        other => log::debug!("BDOS function {} ignored", other),
    }
    out.flush()?;
    Ok(())
}
