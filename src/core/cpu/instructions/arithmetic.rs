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

//! Arithmetic and comparison instructions

use super::super::{ExceptionCause, CPU};
use super::{Instruction, Operands};

impl CPU {
    /// ADD / ADDI: signed addition, trapping on overflow
    ///
    /// Overflow is detected before anything is written: on overflow the
    /// destination keeps its previous value and the CPU enters the
    /// exception handler.
    pub(super) fn op_add(&mut self, instruction: Instruction, mode: Operands) {
        let (dest, lhs, rhs) = self.operands(instruction, mode);

        match (lhs as i32).checked_add(rhs as i32) {
            Some(result) => self.set_reg(dest, result as u32),
            None => self.exception(ExceptionCause::Overflow),
        }
    }

    /// ADDU / ADDIU: addition, wrapping modulo 2^32
    ///
    /// Despite the name, ADDIU's immediate is sign extended; "unsigned"
    /// only means "no overflow trap".
    pub(super) fn op_addu(&mut self, instruction: Instruction, mode: Operands) {
        let (dest, lhs, rhs) = self.operands(instruction, mode);

        self.set_reg(dest, lhs.wrapping_add(rhs));
    }

    /// SUB: signed subtraction, trapping on overflow
    pub(super) fn op_sub(&mut self, instruction: Instruction) {
        let (dest, lhs, rhs) = self.operands(instruction, Operands::ThreeReg);

        match (lhs as i32).checked_sub(rhs as i32) {
            Some(result) => self.set_reg(dest, result as u32),
            None => self.exception(ExceptionCause::Overflow),
        }
    }

    /// SUBU: subtraction, wrapping modulo 2^32
    pub(super) fn op_subu(&mut self, instruction: Instruction) {
        let (dest, lhs, rhs) = self.operands(instruction, Operands::ThreeReg);

        self.set_reg(dest, lhs.wrapping_sub(rhs));
    }

    /// SLT / SLTI: set on signed less-than
    pub(super) fn op_slt(&mut self, instruction: Instruction, mode: Operands) {
        let (dest, lhs, rhs) = self.operands(instruction, mode);

        let result = (lhs as i32) < (rhs as i32);

        self.set_reg(dest, u32::from(result));
    }

    /// SLTU / SLTIU: set on unsigned less-than
    ///
    /// SLTIU still sign extends its immediate before the unsigned compare.
    pub(super) fn op_sltu(&mut self, instruction: Instruction, mode: Operands) {
        let (dest, lhs, rhs) = self.operands(instruction, mode);

        self.set_reg(dest, u32::from(lhs < rhs));
    }
}
