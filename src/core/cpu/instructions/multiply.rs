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

//! Multiply/divide unit and HI/LO access
//!
//! Results appear in HI/LO immediately; the unit's real latency is not
//! modeled. Division never traps: the R3000A defines result patterns for
//! division by zero and for the one overflowing signed case.

use super::super::CPU;
use super::Instruction;

impl CPU {
    /// MULT: signed 32x32 -> 64 multiply
    pub(super) fn op_mult(&mut self, instruction: Instruction) {
        let lhs = i64::from(self.reg(instruction.rs()) as i32);
        let rhs = i64::from(self.reg(instruction.rt()) as i32);

        let product = (lhs * rhs) as u64;

        self.hi = (product >> 32) as u32;
        self.lo = product as u32;
    }

    /// MULTU: unsigned 32x32 -> 64 multiply
    pub(super) fn op_multu(&mut self, instruction: Instruction) {
        let lhs = u64::from(self.reg(instruction.rs()));
        let rhs = u64::from(self.reg(instruction.rt()));

        let product = lhs * rhs;

        self.hi = (product >> 32) as u32;
        self.lo = product as u32;
    }

    /// DIV: signed division
    ///
    /// Division by zero yields LO = -1 for a non-negative numerator and
    /// LO = 1 otherwise, with the numerator in HI. `i32::MIN / -1`, the
    /// one overflowing case, yields the numerator back in LO.
    pub(super) fn op_div(&mut self, instruction: Instruction) {
        let numerator = self.reg(instruction.rs()) as i32;
        let denominator = self.reg(instruction.rt()) as i32;

        if denominator == 0 {
            self.hi = numerator as u32;
            self.lo = if numerator >= 0 { 0xFFFF_FFFF } else { 1 };
        } else if numerator as u32 == 0x8000_0000 && denominator == -1 {
            self.hi = 0;
            self.lo = 0x8000_0000;
        } else {
            self.hi = (numerator % denominator) as u32;
            self.lo = (numerator / denominator) as u32;
        }
    }

    /// DIVU: unsigned division
    ///
    /// Division by zero yields LO = all-ones with the numerator in HI.
    pub(super) fn op_divu(&mut self, instruction: Instruction) {
        let numerator = self.reg(instruction.rs());
        let denominator = self.reg(instruction.rt());

        if denominator == 0 {
            self.hi = numerator;
            self.lo = 0xFFFF_FFFF;
        } else {
            self.hi = numerator % denominator;
            self.lo = numerator / denominator;
        }
    }

    /// MFHI: move from HI
    pub(super) fn op_mfhi(&mut self, instruction: Instruction) {
        self.set_reg(instruction.rd(), self.hi);
    }

    /// MTHI: move to HI
    pub(super) fn op_mthi(&mut self, instruction: Instruction) {
        self.hi = self.reg(instruction.rs());
    }

    /// MFLO: move from LO
    pub(super) fn op_mflo(&mut self, instruction: Instruction) {
        self.set_reg(instruction.rd(), self.lo);
    }

    /// MTLO: move to LO
    pub(super) fn op_mtlo(&mut self, instruction: Instruction) {
        self.lo = self.reg(instruction.rs());
    }
}
