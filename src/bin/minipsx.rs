// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 minipsx developers
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

//! Headless runner
//!
//! Boots a BIOS image and steps the core until a breakpoint, a step limit
//! or a fatal emulation error. Useful for BIOS bring-up and tracing.

use clap::Parser;
use minipsx::core::config::Config;
use minipsx::core::cpu::disassemble;
use minipsx::core::system::System;

#[derive(Parser)]
#[command(name = "minipsx", about = "Headless PSX execution core")]
struct Args {
    /// Path to the 512KB BIOS image (overrides the config file)
    bios: Option<String>,

    /// TOML config file
    #[arg(long)]
    config: Option<String>,

    /// Stop after this many instructions
    #[arg(long)]
    steps: Option<u64>,

    /// Print every executed instruction
    #[arg(long)]
    trace: bool,

    /// Breakpoint address (hex, repeatable)
    #[arg(long = "breakpoint", value_parser = parse_hex)]
    breakpoints: Vec<u32>,
}

fn parse_hex(text: &str) -> Result<u32, String> {
    let text = text.trim_start_matches("0x").trim_start_matches("0X");

    u32::from_str_radix(text, 16).map_err(|e| format!("invalid address: {e}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let bios = args
        .bios
        .or(config.bios)
        .ok_or("no BIOS image given (argument or config file)")?;
    let max_steps = args.steps.or(config.max_steps);
    let trace = args.trace || config.trace;

    let mut system = System::new();
    system.load_bios(&bios)?;

    {
        let debugger = system.debugger();
        let mut debugger = debugger.borrow_mut();
        for addr in args.breakpoints.iter().chain(&config.breakpoints) {
            debugger.add_breakpoint(*addr);
            log::info!("breakpoint at 0x{addr:08X}");
        }
    }

    log::info!("booting from 0x{:08X}", system.pc());

    loop {
        if let Some(limit) = max_steps {
            if system.steps() >= limit {
                log::info!("step limit reached after {limit} instructions");
                break;
            }
        }

        if let Err(error) = system.step() {
            log::error!("emulation halted: {error}");
            break;
        }

        if trace {
            let cpu = system.cpu();
            println!(
                "{:08X}: {}",
                cpu.current_pc(),
                disassemble(cpu.current_instruction())
            );
        }

        if let Some(event) = system.debugger().borrow_mut().take_event() {
            log::info!("paused: {event:?}");
            break;
        }
    }

    dump_registers(&system);

    Ok(())
}

fn dump_registers(system: &System) {
    println!("pc: 0x{:08X}", system.pc());

    for (i, chunk) in system.registers().chunks(4).enumerate() {
        let line: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(j, value)| format!("r{:<2} 0x{value:08X}", i * 4 + j))
            .collect();
        println!("{}", line.join("  "));
    }
}
