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

//! Bitwise logic instructions

use super::super::CPU;
use super::{Instruction, Operands};

impl CPU {
    /// AND / ANDI
    pub(super) fn op_and(&mut self, instruction: Instruction, mode: Operands) {
        let (dest, lhs, rhs) = self.operands(instruction, mode);

        self.set_reg(dest, lhs & rhs);
    }

    /// OR / ORI
    pub(super) fn op_or(&mut self, instruction: Instruction, mode: Operands) {
        let (dest, lhs, rhs) = self.operands(instruction, mode);

        self.set_reg(dest, lhs | rhs);
    }

    /// XOR / XORI
    pub(super) fn op_xor(&mut self, instruction: Instruction, mode: Operands) {
        let (dest, lhs, rhs) = self.operands(instruction, mode);

        self.set_reg(dest, lhs ^ rhs);
    }

    /// NOR
    pub(super) fn op_nor(&mut self, instruction: Instruction) {
        let (dest, lhs, rhs) = self.operands(instruction, Operands::ThreeReg);

        self.set_reg(dest, !(lhs | rhs));
    }

    /// LUI: load the immediate into the upper halfword, low bits zero
    pub(super) fn op_lui(&mut self, instruction: Instruction) {
        self.set_reg(instruction.rt(), instruction.imm() << 16);
    }
}
