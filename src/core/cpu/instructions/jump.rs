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

//! Unconditional jump instructions
//!
//! Like branches, jumps redirect `next_pc` only: the delay slot runs
//! first. Link variants store the address after the delay slot, which is
//! where a subroutine return must land.

use super::super::CPU;
use super::Instruction;

impl CPU {
    /// J: jump within the current 256MB region
    pub(super) fn op_j(&mut self, instruction: Instruction) {
        // The target replaces the low 28 bits; the top nibble comes from
        // the delay slot address
        let target = (self.pc & 0xF000_0000) | (instruction.target() << 2);

        self.branch_to(target);
    }

    /// JAL: jump and link through r31
    pub(super) fn op_jal(&mut self, instruction: Instruction) {
        let return_addr = self.next_pc;

        self.op_j(instruction);
        self.set_reg(31, return_addr);
    }

    /// JR: jump to the address in rs
    ///
    /// No alignment check here: a misaligned target faults at fetch time,
    /// with the fault address in EPC.
    pub(super) fn op_jr(&mut self, instruction: Instruction) {
        self.branch_to(self.reg(instruction.rs()));
    }

    /// JALR: jump to rs, linking through rd
    pub(super) fn op_jalr(&mut self, instruction: Instruction) {
        let return_addr = self.next_pc;

        self.branch_to(self.reg(instruction.rs()));
        self.set_reg(instruction.rd(), return_addr);
    }
}
