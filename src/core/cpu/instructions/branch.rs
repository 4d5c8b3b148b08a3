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

//! Conditional branch instructions
//!
//! All branches are relative: the sign-extended immediate counts
//! instructions from the delay slot. Taken or not, the delay slot
//! executes; only `next_pc` is redirected.

use super::super::CPU;
use super::Instruction;

impl CPU {
    /// BEQ: branch if the two registers are equal
    pub(super) fn op_beq(&mut self, instruction: Instruction) {
        if self.reg(instruction.rs()) == self.reg(instruction.rt()) {
            self.branch(instruction.imm_se());
        }
    }

    /// BNE: branch if the two registers differ
    pub(super) fn op_bne(&mut self, instruction: Instruction) {
        if self.reg(instruction.rs()) != self.reg(instruction.rt()) {
            self.branch(instruction.imm_se());
        }
    }

    /// BLEZ: branch if rs <= 0, signed
    pub(super) fn op_blez(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rs()) as i32;

        if value <= 0 {
            self.branch(instruction.imm_se());
        }
    }

    /// BGTZ: branch if rs > 0, signed
    pub(super) fn op_bgtz(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rs()) as i32;

        if value > 0 {
            self.branch(instruction.imm_se());
        }
    }

    /// BLTZ / BLTZAL: branch if rs < 0, signed
    ///
    /// The link variant writes the return address whether or not the
    /// branch is taken. The comparison uses the value of rs read before
    /// the link lands, so `BLTZAL r31, ...` behaves.
    pub(super) fn op_bltz(&mut self, instruction: Instruction, link: bool) {
        let value = self.reg(instruction.rs()) as i32;

        if link {
            let return_addr = self.next_pc;
            self.set_reg(31, return_addr);
        }

        if value < 0 {
            self.branch(instruction.imm_se());
        }
    }

    /// BGEZ / BGEZAL: branch if rs >= 0, signed
    ///
    /// Zero counts as "greater or equal", so `BGEZ r0` is an
    /// unconditional branch.
    pub(super) fn op_bgez(&mut self, instruction: Instruction, link: bool) {
        let value = self.reg(instruction.rs()) as i32;

        if link {
            let return_addr = self.next_pc;
            self.set_reg(31, return_addr);
        }

        if value >= 0 {
            self.branch(instruction.imm_se());
        }
    }
}
