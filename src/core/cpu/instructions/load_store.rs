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

//! Memory access instructions
//!
//! Every load schedules its result through the pending-load slot instead
//! of writing the register directly, so the instruction in the load delay
//! slot still sees the old value. The exceptions are LWL/LWR, which merge
//! against the output bank precisely so that an LWL/LWR pair over the same
//! register assembles an unaligned word in two consecutive instructions.
//!
//! While SR bit 16 isolates the cache, loads read all-ones and stores are
//! swallowed; neither touches the bus.

use super::super::{ExceptionCause, CPU};
use super::Instruction;
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    /// Effective address: base register plus sign-extended offset
    #[inline(always)]
    fn effective_address(&self, instruction: Instruction) -> u32 {
        self.reg(instruction.rs()).wrapping_add(instruction.imm_se())
    }

    /// LB: load byte, sign extended
    pub(super) fn op_lb(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            self.delayed_load(instruction.rt(), !0);
            return Ok(());
        }

        let addr = self.effective_address(instruction);
        let value = bus.load8(addr)? as i8;

        self.delayed_load(instruction.rt(), value as u32);

        Ok(())
    }

    /// LBU: load byte, zero extended
    pub(super) fn op_lbu(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            self.delayed_load(instruction.rt(), !0);
            return Ok(());
        }

        let addr = self.effective_address(instruction);
        let value = bus.load8(addr)?;

        self.delayed_load(instruction.rt(), u32::from(value));

        Ok(())
    }

    /// LH: load halfword, sign extended
    pub(super) fn op_lh(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            self.delayed_load(instruction.rt(), !0);
            return Ok(());
        }

        let addr = self.effective_address(instruction);

        if addr % 2 != 0 {
            self.exception(ExceptionCause::AddressErrorLoad);
            return Ok(());
        }

        let value = bus.load16(addr)? as i16;

        self.delayed_load(instruction.rt(), value as u32);

        Ok(())
    }

    /// LHU: load halfword, zero extended
    pub(super) fn op_lhu(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            self.delayed_load(instruction.rt(), !0);
            return Ok(());
        }

        let addr = self.effective_address(instruction);

        if addr % 2 != 0 {
            self.exception(ExceptionCause::AddressErrorLoad);
            return Ok(());
        }

        let value = bus.load16(addr)?;

        self.delayed_load(instruction.rt(), u32::from(value));

        Ok(())
    }

    /// LW: load word
    pub(super) fn op_lw(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            self.delayed_load(instruction.rt(), !0);
            return Ok(());
        }

        let addr = self.effective_address(instruction);

        if addr % 4 != 0 {
            self.exception(ExceptionCause::AddressErrorLoad);
            return Ok(());
        }

        let value = bus.load32(addr)?;

        self.delayed_load(instruction.rt(), value);

        Ok(())
    }

    /// LWL: load the left (high) part of an unaligned word
    ///
    /// Reads the aligned word containing the effective address and merges
    /// its low bytes into the high bytes of rt. Merging starts from the
    /// output bank so a pending load of rt (typically the LWR half of the
    /// pair) is visible immediately.
    pub(super) fn op_lwl(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            self.delayed_load(instruction.rt(), !0);
            return Ok(());
        }

        let addr = self.effective_address(instruction);
        let cur = self.out_reg(instruction.rt());

        let aligned_word = bus.load32(addr & !3)?;

        let value = match addr & 3 {
            0 => (cur & 0x00FF_FFFF) | (aligned_word << 24),
            1 => (cur & 0x0000_FFFF) | (aligned_word << 16),
            2 => (cur & 0x0000_00FF) | (aligned_word << 8),
            3 => aligned_word,
            _ => unreachable!(),
        };

        self.delayed_load(instruction.rt(), value);

        Ok(())
    }

    /// LWR: load the right (low) part of an unaligned word
    pub(super) fn op_lwr(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            self.delayed_load(instruction.rt(), !0);
            return Ok(());
        }

        let addr = self.effective_address(instruction);
        let cur = self.out_reg(instruction.rt());

        let aligned_word = bus.load32(addr & !3)?;

        let value = match addr & 3 {
            0 => aligned_word,
            1 => (cur & 0xFF00_0000) | (aligned_word >> 8),
            2 => (cur & 0xFFFF_0000) | (aligned_word >> 16),
            3 => (cur & 0xFFFF_FF00) | (aligned_word >> 24),
            _ => unreachable!(),
        };

        self.delayed_load(instruction.rt(), value);

        Ok(())
    }

    /// SB: store byte
    pub(super) fn op_sb(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            log::trace!("store swallowed while cache is isolated");
            return Ok(());
        }

        let addr = self.effective_address(instruction);

        bus.store8(addr, self.reg(instruction.rt()) as u8)
    }

    /// SH: store halfword
    pub(super) fn op_sh(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            log::trace!("store swallowed while cache is isolated");
            return Ok(());
        }

        let addr = self.effective_address(instruction);

        if addr % 2 != 0 {
            self.exception(ExceptionCause::AddressErrorStore);
            return Ok(());
        }

        bus.store16(addr, self.reg(instruction.rt()) as u16)
    }

    /// SW: store word
    pub(super) fn op_sw(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            log::trace!("store swallowed while cache is isolated");
            return Ok(());
        }

        let addr = self.effective_address(instruction);

        if addr % 4 != 0 {
            self.exception(ExceptionCause::AddressErrorStore);
            return Ok(());
        }

        bus.store32(addr, self.reg(instruction.rt()))
    }

    /// SWL: store the left (high) part of rt into an unaligned word
    ///
    /// Read-modify-write of the aligned word, symmetric to LWL.
    pub(super) fn op_swl(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            log::trace!("store swallowed while cache is isolated");
            return Ok(());
        }

        let addr = self.effective_address(instruction);
        let value = self.reg(instruction.rt());

        let aligned = addr & !3;
        let cur = bus.load32(aligned)?;

        let merged = match addr & 3 {
            0 => (cur & 0xFFFF_FF00) | (value >> 24),
            1 => (cur & 0xFFFF_0000) | (value >> 16),
            2 => (cur & 0xFF00_0000) | (value >> 8),
            3 => value,
            _ => unreachable!(),
        };

        bus.store32(aligned, merged)
    }

    /// SWR: store the right (low) part of rt into an unaligned word
    pub(super) fn op_swr(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        if self.cop0.cache_isolated() {
            log::trace!("store swallowed while cache is isolated");
            return Ok(());
        }

        let addr = self.effective_address(instruction);
        let value = self.reg(instruction.rt());

        let aligned = addr & !3;
        let cur = bus.load32(aligned)?;

        let merged = match addr & 3 {
            0 => value,
            1 => (cur & 0x0000_00FF) | (value << 8),
            2 => (cur & 0x0000_FFFF) | (value << 16),
            3 => (cur & 0x00FF_FFFF) | (value << 24),
            _ => unreachable!(),
        };

        bus.store32(aligned, merged)
    }
}
