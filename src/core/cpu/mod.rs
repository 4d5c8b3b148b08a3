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

//! MIPS R3000A CPU core
//!
//! One [`step`](CPU::step) fetches, decodes and executes a single
//! instruction. Two pipeline artifacts are modeled as explicit shadow
//! state rather than as a pipeline:
//!
//! - **Branch delay slot.** `pc` holds the instruction about to execute
//!   and `next_pc` the one after it. Branches redirect `next_pc` only, so
//!   the instruction already in `pc` (the delay slot) still runs.
//! - **Load delay slot.** The register file is double banked: instructions
//!   read the visible bank and write the output bank, and the output bank
//!   is published at the end of the step. A load parks its value in the
//!   one-entry `pending_load` slot, which is drained into the *output*
//!   bank at the start of the next step; the next instruction therefore
//!   still reads the pre-load value through the visible bank.

use crate::core::error::Result;
use crate::core::memory::Bus;

mod cop0;
mod decode;
mod disassembler;
mod instructions;

pub use cop0::ExceptionCause;
pub use decode::{decode, Instruction, Opcode};
pub use disassembler::disassemble;

use cop0::COP0;

/// Address of the first instruction fetched after reset (BIOS in KSEG1)
pub const RESET_PC: u32 = 0xBFC0_0000;

/// One parked load: the register it targets and the value it carries
#[derive(Debug, Clone, Copy)]
struct PendingLoad {
    reg: u8,
    value: u32,
}

/// CPU state
pub struct CPU {
    /// Visible register bank: every instruction reads from here
    regs: [u32; 32],
    /// Output register bank: every instruction writes here; published into
    /// `regs` at the end of each step
    out_regs: [u32; 32],

    /// Address of the instruction currently executing
    current_pc: u32,
    /// Address of the next instruction to fetch
    pc: u32,
    /// Address of the instruction after that (branch delay modeling)
    next_pc: u32,

    /// Multiply/divide result registers
    hi: u32,
    lo: u32,

    /// System control coprocessor
    cop0: COP0,

    /// Load waiting for its delay slot to elapse
    pending_load: Option<PendingLoad>,

    /// The instruction executing now is a taken branch
    branching: bool,
    /// The instruction executing now sits in a branch delay slot
    in_delay_slot: bool,

    /// Raw word of the instruction executing now, for diagnostics
    current_instruction: Instruction,
}

impl CPU {
    /// Create a CPU in its reset state
    ///
    /// # Example
    ///
    /// ```
    /// use minipsx::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// assert_eq!(cpu.pc(), 0xBFC0_0000);
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            regs: [0; 32],
            out_regs: [0; 32],
            current_pc: RESET_PC,
            pc: RESET_PC,
            next_pc: RESET_PC.wrapping_add(4),
            hi: 0,
            lo: 0,
            cop0: COP0::new(),
            pending_load: None,
            branching: false,
            in_delay_slot: false,
            current_instruction: Instruction::GARBAGE,
        }
    }

    /// Return to the reset state, as after a power cycle
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a general purpose register from the visible bank
    ///
    /// `r0` always reads zero.
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        self.regs[usize::from(index)]
    }

    /// Write a general purpose register in the output bank
    ///
    /// Writes to `r0` have no effect: the slot is forced back to zero so
    /// callers never need to special-case it.
    #[inline(always)]
    pub(crate) fn set_reg(&mut self, index: u8, value: u32) {
        self.out_regs[usize::from(index)] = value;

        // r0 is hardwired to zero
        self.out_regs[0] = 0;
    }

    /// Park a load result for delivery after the delay slot
    ///
    /// Any previously parked load has already been drained by `step`, so
    /// the slot holds at most one entry.
    pub(crate) fn delayed_load(&mut self, reg: u8, value: u32) {
        self.pending_load = Some(PendingLoad { reg, value });
    }

    /// Read the in-flight value of a register from the output bank
    ///
    /// LWL/LWR use this to merge with a load parked by the immediately
    /// preceding instruction instead of waiting out the delay slot.
    #[inline(always)]
    pub(crate) fn out_reg(&self, index: u8) -> u32 {
        self.out_regs[usize::from(index)]
    }

    /// Execute a single instruction
    ///
    /// Returns the number of cycles consumed (always 1; timing is not
    /// modeled). An `Err` means the emulator hit a hole in its own model
    /// (unmapped address, unhandled register) — guest-visible faults
    /// become MIPS exceptions and return `Ok`.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32> {
        // The delay-slot flag tracks whether the *previous* instruction
        // branched
        self.in_delay_slot = self.branching;
        self.branching = false;

        self.current_pc = self.pc;

        if self.current_pc % 4 != 0 {
            // The fetch address itself is broken, fault before touching
            // the bus
            self.exception(ExceptionCause::AddressErrorLoad);
            return Ok(1);
        }

        let instruction = Instruction(bus.load32(self.pc)?);
        self.current_instruction = instruction;

        self.pc = self.next_pc;
        self.next_pc = self.next_pc.wrapping_add(4);

        // Drain the pending load into the output bank. The instruction
        // about to execute reads the visible bank, so it still sees the
        // pre-load value; only LWL/LWR peek at the output bank.
        if let Some(load) = self.pending_load.take() {
            self.set_reg(load.reg, load.value);
        }

        self.execute(instruction, bus)?;

        // Publish this step's writes
        self.regs = self.out_regs;

        Ok(1)
    }

    /// Redirect control to the exception handler
    ///
    /// No delay slot applies to exception entry: the handler's first
    /// instruction is the next one executed.
    pub(crate) fn exception(&mut self, cause: ExceptionCause) {
        let handler = self
            .cop0
            .enter_exception(cause, self.current_pc, self.in_delay_slot);

        log::warn!(
            "exception {:?} at 0x{:08X} (delay slot: {}), handler 0x{:08X}",
            cause,
            self.current_pc,
            self.in_delay_slot,
            handler
        );

        self.pc = handler;
        self.next_pc = handler.wrapping_add(4);
    }

    /// Record a taken branch to `target`
    ///
    /// Only `next_pc` moves, so the delay slot already sitting in `pc`
    /// still executes.
    pub(crate) fn branch_to(&mut self, target: u32) {
        self.next_pc = target;
        self.branching = true;
    }

    /// Branch relative to the delay slot by a sign-extended instruction
    /// offset
    pub(crate) fn branch(&mut self, offset: u32) {
        // The offset is in instructions, the base is the delay slot
        // address (already in `pc` at execute time)
        let target = self.pc.wrapping_add(offset << 2);

        self.branch_to(target);
    }

    /// Address of the instruction currently executing
    pub fn current_pc(&self) -> u32 {
        self.current_pc
    }

    /// Redirect execution, e.g. to a loaded executable's entry point
    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
        self.next_pc = pc.wrapping_add(4);
    }

    /// Address of the next instruction to fetch
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Snapshot of the visible register bank
    pub fn registers(&self) -> [u32; 32] {
        self.regs
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    /// Status register of the system control coprocessor
    pub fn sr(&self) -> u32 {
        self.cop0.sr()
    }

    /// True while the current instruction sits in a branch delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.in_delay_slot
    }

    /// Raw word of the instruction currently executing
    pub fn current_instruction(&self) -> Instruction {
        self.current_instruction
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
