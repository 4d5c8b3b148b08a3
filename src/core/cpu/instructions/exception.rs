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

//! Exception-raising instructions

use super::super::{ExceptionCause, CPU};
use super::Instruction;

impl CPU {
    /// SYSCALL: request kernel service
    pub(super) fn op_syscall(&mut self, _instruction: Instruction) {
        self.exception(ExceptionCause::Syscall);
    }

    /// BREAK: software breakpoint
    pub(super) fn op_break(&mut self, _instruction: Instruction) {
        self.exception(ExceptionCause::Break);
    }

    /// Any encoding the decoder could not identify
    pub(super) fn op_illegal(&mut self, instruction: Instruction) {
        log::warn!(
            "illegal instruction 0x{:08x} at 0x{:08X}",
            instruction,
            self.current_pc
        );

        self.exception(ExceptionCause::IllegalInstruction);
    }
}
