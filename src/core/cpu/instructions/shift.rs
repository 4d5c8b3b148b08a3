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

//! Shift instructions
//!
//! Immediate forms take the count from the shamt field; variable forms
//! take the low five bits of rs, so counts of 32 and up wrap.

use super::super::CPU;
use super::Instruction;

impl CPU {
    /// SLL: shift left logical (SLL r0, r0, 0 encodes NOP)
    pub(super) fn op_sll(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rt());

        self.set_reg(instruction.rd(), value << instruction.shamt());
    }

    /// SRL: shift right logical
    pub(super) fn op_srl(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rt());

        self.set_reg(instruction.rd(), value >> instruction.shamt());
    }

    /// SRA: shift right arithmetic
    pub(super) fn op_sra(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rt()) as i32;

        self.set_reg(instruction.rd(), (value >> instruction.shamt()) as u32);
    }

    /// SLLV: shift left logical by register
    pub(super) fn op_sllv(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rt());
        let shift = self.reg(instruction.rs()) & 0x1F;

        self.set_reg(instruction.rd(), value << shift);
    }

    /// SRLV: shift right logical by register
    pub(super) fn op_srlv(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rt());
        let shift = self.reg(instruction.rs()) & 0x1F;

        self.set_reg(instruction.rd(), value >> shift);
    }

    /// SRAV: shift right arithmetic by register
    pub(super) fn op_srav(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rt()) as i32;
        let shift = self.reg(instruction.rs()) & 0x1F;

        self.set_reg(instruction.rd(), (value >> shift) as u32);
    }
}
