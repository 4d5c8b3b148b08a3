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

//! System integration
//!
//! Ties the CPU, the bus and the debugger together and provides the host
//! driver API: construct, load a BIOS, optionally attach a renderer sink
//! and breakpoints, then call [`step`](System::step) in a loop (or
//! [`run`](System::run) to let the system loop for you).

use super::cpu::CPU;
use super::debugger::{DebugEvent, Debugger};
use super::error::Result;
use super::gpu::Renderer;
use super::memory::Bus;
use std::cell::RefCell;
use std::rc::Rc;

/// Why [`System::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The step limit was reached
    StepLimit,
    /// The debugger requested a pause
    Paused(DebugEvent),
}

/// The emulated console
///
/// # Example
///
/// ```no_run
/// use minipsx::core::system::System;
///
/// let mut system = System::new();
/// system.load_bios("SCPH1001.BIN").unwrap();
///
/// loop {
///     system.step().unwrap();
/// }
/// ```
pub struct System {
    cpu: CPU,
    bus: Bus,
    /// Shared with the bus, which feeds it memory access events
    debugger: Rc<RefCell<Debugger>>,
    /// Instructions executed since reset
    steps: u64,
}

impl System {
    /// Create a system in its power-on state, with no BIOS loaded
    pub fn new() -> Self {
        let debugger = Rc::new(RefCell::new(Debugger::new()));

        let mut bus = Bus::new();
        bus.set_debugger(Rc::clone(&debugger));

        Self {
            cpu: CPU::new(),
            bus,
            debugger,
            steps: 0,
        }
    }

    /// Load the BIOS ROM from a file
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Load the BIOS ROM from an in-memory image
    pub fn load_bios_bytes(&mut self, data: Vec<u8>) -> Result<()> {
        self.bus.load_bios_bytes(data)
    }

    /// Attach a sink for GPU draw commands and display updates
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.bus.gpu_mut().set_renderer(renderer);
    }

    /// Handle to the debugger, for breakpoint/watchpoint management
    pub fn debugger(&self) -> Rc<RefCell<Debugger>> {
        Rc::clone(&self.debugger)
    }

    /// Execute one instruction
    ///
    /// The debugger observes the PC about to execute; a breakpoint match
    /// records a pause request without blocking this step.
    ///
    /// # Returns
    ///
    /// Cycles consumed (always 1). `Err` means the emulator hit a hole in
    /// its own model and the run should stop; guest faults are handled
    /// inside the CPU and return `Ok`.
    pub fn step(&mut self) -> Result<u32> {
        self.debugger.borrow_mut().pc_changed(self.cpu.pc());

        let cycles = self.cpu.step(&mut self.bus)?;
        self.steps += 1;

        Ok(cycles)
    }

    /// Step until the limit runs out or the debugger requests a pause
    ///
    /// Breakpoints stop *before* the matched instruction executes;
    /// watchpoints fire during a step and stop right after it.
    pub fn run(&mut self, limit: u64) -> Result<RunExit> {
        for _ in 0..limit {
            self.debugger.borrow_mut().pc_changed(self.cpu.pc());

            if let Some(event) = self.debugger.borrow_mut().take_event() {
                return Ok(RunExit::Paused(event));
            }

            self.cpu.step(&mut self.bus)?;
            self.steps += 1;

            if let Some(event) = self.debugger.borrow_mut().take_event() {
                return Ok(RunExit::Paused(event));
            }
        }

        Ok(RunExit::StepLimit)
    }

    /// Address of the next instruction to execute
    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    /// Snapshot of the general purpose registers
    pub fn registers(&self) -> [u32; 32] {
        self.cpu.registers()
    }

    /// Instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::bios::BIOS_SIZE;

    /// BIOS image whose reset vector holds `program`, NOPs elsewhere
    fn bios_with(program: &[u32]) -> Vec<u8> {
        let mut image = vec![0u8; BIOS_SIZE];
        for (i, word) in program.iter().enumerate() {
            image[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
        }
        image
    }

    #[test]
    fn test_boot_runs_from_reset_vector() {
        let mut system = System::new();
        // LUI r8, 0x1F80 at the reset vector
        system
            .load_bios_bytes(bios_with(&[0x3C08_1F80]))
            .unwrap();

        system.step().unwrap();

        assert_eq!(system.registers()[8], 0x1F80_0000);
        assert_eq!(system.pc(), 0xBFC0_0004);
        assert_eq!(system.steps(), 1);
    }

    #[test]
    fn test_run_honors_step_limit() {
        let mut system = System::new();
        system.load_bios_bytes(bios_with(&[])).unwrap();

        let exit = system.run(100).unwrap();

        assert_eq!(exit, RunExit::StepLimit);
        assert_eq!(system.steps(), 100);
        assert_eq!(system.pc(), 0xBFC0_0000 + 400);
    }

    #[test]
    fn test_run_stops_on_breakpoint_before_execution() {
        let mut system = System::new();
        // ORI r1, r0, 1 four times
        system
            .load_bios_bytes(bios_with(&[0x3401_0001; 4]))
            .unwrap();

        system.debugger().borrow_mut().add_breakpoint(0xBFC0_0008);

        let exit = system.run(100).unwrap();

        assert_eq!(exit, RunExit::Paused(DebugEvent::Breakpoint { pc: 0xBFC0_0008 }));
        // The instruction at the breakpoint has not executed
        assert_eq!(system.pc(), 0xBFC0_0008);
        assert_eq!(system.steps(), 2);
    }

    #[test]
    fn test_run_stops_on_write_watchpoint() {
        // LUI r1, 0x8000 ; SW r0, 0x40(r1)
        let program = [0x3C01_8000, 0xAC20_0040];

        let mut system = System::new();
        system.load_bios_bytes(bios_with(&program)).unwrap();
        system
            .debugger()
            .borrow_mut()
            .add_write_watchpoint(0x8000_0040);

        let exit = system.run(10).unwrap();
        assert_eq!(
            exit,
            RunExit::Paused(DebugEvent::WriteWatch { addr: 0x8000_0040 })
        );

        // Without the watchpoint the same program runs to the limit
        let mut unwatched = System::new();
        unwatched.load_bios_bytes(bios_with(&program)).unwrap();
        assert_eq!(unwatched.run(10).unwrap(), RunExit::StepLimit);
    }

    #[test]
    fn test_bios_failure_leaves_no_partial_state() {
        let mut system = System::new();

        assert!(system.load_bios("/nonexistent/bios.bin").is_err());

        // The system still runs from the (empty) BIOS
        system.step().unwrap();
        assert_eq!(system.pc(), 0xBFC0_0004);
    }
}
