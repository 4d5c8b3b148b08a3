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

//! Execution observer: breakpoints and memory watchpoints
//!
//! The debugger is a passive collaborator. The system notifies it of every
//! PC change and the bus notifies it of every data access; when an address
//! matches one of its lists it records a pause request that the run loop
//! honors between steps. Callbacks never mutate emulator state and the
//! lists must not be changed from inside a callback.
//!
//! Lookups are linear scans: the lists hold a handful of entries and are
//! consulted on every instruction, so a short `Vec` beats a hash set.

/// What caused the debugger to request a pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugEvent {
    /// Execution reached a breakpoint
    Breakpoint { pc: u32 },
    /// A watched address was read
    ReadWatch { addr: u32 },
    /// A watched address was written
    WriteWatch { addr: u32 },
}

/// Breakpoint/watchpoint store and pause latch
#[derive(Default)]
pub struct Debugger {
    /// Instruction addresses that pause execution
    breakpoints: Vec<u32>,
    /// Data addresses watched for loads
    read_watchpoints: Vec<u32>,
    /// Data addresses watched for stores
    write_watchpoints: Vec<u32>,
    /// Pending pause request, taken by the run loop
    pending: Option<DebugEvent>,
}

impl Debugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a breakpoint; adding an existing address is a no-op
    pub fn add_breakpoint(&mut self, addr: u32) {
        if !self.breakpoints.contains(&addr) {
            self.breakpoints.push(addr);
        }
    }

    /// Remove a breakpoint; removing an unknown address is a no-op
    pub fn delete_breakpoint(&mut self, addr: u32) {
        self.breakpoints.retain(|&bp| bp != addr);
    }

    /// Add a read watchpoint
    pub fn add_read_watchpoint(&mut self, addr: u32) {
        if !self.read_watchpoints.contains(&addr) {
            self.read_watchpoints.push(addr);
        }
    }

    /// Remove a read watchpoint
    pub fn delete_read_watchpoint(&mut self, addr: u32) {
        self.read_watchpoints.retain(|&wp| wp != addr);
    }

    /// Add a write watchpoint
    pub fn add_write_watchpoint(&mut self, addr: u32) {
        if !self.write_watchpoints.contains(&addr) {
            self.write_watchpoints.push(addr);
        }
    }

    /// Remove a write watchpoint
    pub fn delete_write_watchpoint(&mut self, addr: u32) {
        self.write_watchpoints.retain(|&wp| wp != addr);
    }

    /// Observer hook: the CPU is about to execute the instruction at `pc`
    ///
    /// Called on every step, so the no-breakpoint path must stay cheap.
    pub fn pc_changed(&mut self, pc: u32) {
        if self.breakpoints.contains(&pc) {
            log::info!("breakpoint hit at 0x{pc:08X}");
            self.pending = Some(DebugEvent::Breakpoint { pc });
        }
    }

    /// Observer hook: the bus served a load at `addr`
    pub fn memory_read(&mut self, addr: u32) {
        if self.read_watchpoints.contains(&addr) {
            log::info!("read watchpoint hit at 0x{addr:08X}");
            self.pending = Some(DebugEvent::ReadWatch { addr });
        }
    }

    /// Observer hook: the bus served a store at `addr`
    pub fn memory_write(&mut self, addr: u32) {
        if self.write_watchpoints.contains(&addr) {
            log::info!("write watchpoint hit at 0x{addr:08X}");
            self.pending = Some(DebugEvent::WriteWatch { addr });
        }
    }

    /// Take the pending pause request, clearing it
    pub fn take_event(&mut self) -> Option<DebugEvent> {
        self.pending.take()
    }

    /// True when a pause request is waiting
    pub fn paused(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_hit_sets_pending() {
        let mut debugger = Debugger::new();
        debugger.add_breakpoint(0xBFC0_0010);

        debugger.pc_changed(0xBFC0_000C);
        assert!(!debugger.paused());

        debugger.pc_changed(0xBFC0_0010);
        assert_eq!(
            debugger.take_event(),
            Some(DebugEvent::Breakpoint { pc: 0xBFC0_0010 })
        );
        assert!(!debugger.paused(), "take_event clears the request");
    }

    #[test]
    fn test_add_breakpoint_is_idempotent() {
        let mut debugger = Debugger::new();

        debugger.add_breakpoint(0x8000_0000);
        debugger.add_breakpoint(0x8000_0000);
        debugger.delete_breakpoint(0x8000_0000);

        debugger.pc_changed(0x8000_0000);
        assert!(!debugger.paused());
    }

    #[test]
    fn test_delete_unknown_breakpoint_is_noop() {
        let mut debugger = Debugger::new();
        debugger.delete_breakpoint(0x1234_5678);
    }

    #[test]
    fn test_watchpoints_distinguish_reads_and_writes() {
        let mut debugger = Debugger::new();
        debugger.add_read_watchpoint(0x100);
        debugger.add_write_watchpoint(0x200);

        debugger.memory_write(0x100);
        assert!(!debugger.paused(), "write must not trip a read watch");

        debugger.memory_read(0x100);
        assert_eq!(
            debugger.take_event(),
            Some(DebugEvent::ReadWatch { addr: 0x100 })
        );

        debugger.memory_read(0x200);
        assert!(!debugger.paused(), "read must not trip a write watch");

        debugger.memory_write(0x200);
        assert_eq!(
            debugger.take_event(),
            Some(DebugEvent::WriteWatch { addr: 0x200 })
        );
    }

    #[test]
    fn test_watchpoint_delete() {
        let mut debugger = Debugger::new();

        debugger.add_read_watchpoint(0x100);
        debugger.delete_read_watchpoint(0x100);
        debugger.memory_read(0x100);
        assert!(!debugger.paused());

        debugger.add_write_watchpoint(0x200);
        debugger.delete_write_watchpoint(0x200);
        debugger.memory_write(0x200);
        assert!(!debugger.paused());
    }
}
