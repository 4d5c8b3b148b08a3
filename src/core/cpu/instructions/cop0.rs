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

//! Coprocessor instructions
//!
//! Only COP0 is functional. COP1 and COP3 do not exist on the console and
//! raise the coprocessor-unusable exception, as do their load/store forms.
//! COP2, the GTE, exists on real hardware but is not part of this core:
//! touching it surfaces as a hard error so the gap is never silent.

use super::super::cop0::{REG_CAUSE, REG_EPC, REG_SR};
use super::super::{ExceptionCause, CPU};
use super::Instruction;
use crate::core::error::{EmulatorError, Result};

impl CPU {
    /// MTC0: move a CPU register to a COP0 register
    ///
    /// Only the status register is modeled; writes to any other index are
    /// dropped.
    pub(super) fn op_mtc0(&mut self, instruction: Instruction) {
        let value = self.reg(instruction.rt());

        match instruction.rd() {
            REG_SR => self.cop0.set_sr(value),
            reg => log::trace!("MTC0 to unmodeled cop0 register {reg} ignored"),
        }
    }

    /// MFC0: move a COP0 register to a CPU register
    ///
    /// Coprocessor reads go through the load delay slot like memory loads.
    pub(super) fn op_mfc0(&mut self, instruction: Instruction) {
        let value = match instruction.rd() {
            REG_SR => self.cop0.sr(),
            REG_CAUSE => self.cop0.cause(),
            REG_EPC => self.cop0.epc(),
            reg => {
                log::warn!("MFC0 from unmodeled cop0 register {reg}, reading 0");
                0
            }
        };

        self.delayed_load(instruction.rt(), value);
    }

    /// RFE: return from exception
    ///
    /// Pops the KU/IE stack. The only COP0 funct the R3000A implements;
    /// the virtual-memory returns of later MIPS parts decode as illegal.
    pub(super) fn op_rfe(&mut self, instruction: Instruction) {
        if instruction.funct() != 0x10 {
            self.op_illegal(instruction);
            return;
        }

        self.cop0.return_from_exception();
    }

    /// COP1/COP3 and their loads/stores: no such coprocessor
    pub(super) fn op_cop_unusable(&mut self, instruction: Instruction) {
        log::warn!("access to absent coprocessor: 0x{instruction:08x}");

        self.exception(ExceptionCause::CoprocessorError);
    }

    /// COP2: the Geometry Transformation Engine, not modeled
    pub(super) fn op_gte(&mut self, instruction: Instruction) -> Result<()> {
        log::error!("GTE instruction 0x{instruction:08x}");

        Err(EmulatorError::Unimplemented("GTE (COP2) instruction"))
    }

    /// LWC2: load word to the GTE, not modeled
    pub(super) fn op_lwc2(&mut self, instruction: Instruction) -> Result<()> {
        log::error!("LWC2 instruction 0x{instruction:08x}");

        Err(EmulatorError::Unimplemented("LWC2 (GTE load)"))
    }

    /// SWC2: store word from the GTE, not modeled
    pub(super) fn op_swc2(&mut self, instruction: Instruction) -> Result<()> {
        log::error!("SWC2 instruction 0x{instruction:08x}");

        Err(EmulatorError::Unimplemented("SWC2 (GTE store)"))
    }
}
