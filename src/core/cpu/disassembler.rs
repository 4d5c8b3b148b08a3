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

//! One-line instruction disassembly
//!
//! Used by breakpoint logging and the runner's trace mode. Output follows
//! the usual MIPS assembly conventions: destination first, immediates in
//! hex, memory operands as `offset(base)`.

use super::decode::{decode, Instruction, Opcode};

/// Render an instruction word as assembly text
pub fn disassemble(instruction: Instruction) -> String {
    let rs = instruction.rs();
    let rt = instruction.rt();
    let rd = instruction.rd();
    let imm = instruction.imm();
    let imm_se = instruction.imm_se() as i32;
    let shamt = instruction.shamt();

    match decode(instruction) {
        Opcode::Sll if instruction.0 == 0 => "nop".to_string(),
        Opcode::Sll => format!("sll ${rd}, ${rt}, {shamt}"),
        Opcode::Srl => format!("srl ${rd}, ${rt}, {shamt}"),
        Opcode::Sra => format!("sra ${rd}, ${rt}, {shamt}"),
        Opcode::Sllv => format!("sllv ${rd}, ${rt}, ${rs}"),
        Opcode::Srlv => format!("srlv ${rd}, ${rt}, ${rs}"),
        Opcode::Srav => format!("srav ${rd}, ${rt}, ${rs}"),
        Opcode::Jr => format!("jr ${rs}"),
        Opcode::Jalr => format!("jalr ${rd}, ${rs}"),
        Opcode::Syscall => "syscall".to_string(),
        Opcode::Break => "break".to_string(),
        Opcode::Mfhi => format!("mfhi ${rd}"),
        Opcode::Mthi => format!("mthi ${rs}"),
        Opcode::Mflo => format!("mflo ${rd}"),
        Opcode::Mtlo => format!("mtlo ${rs}"),
        Opcode::Mult => format!("mult ${rs}, ${rt}"),
        Opcode::Multu => format!("multu ${rs}, ${rt}"),
        Opcode::Div => format!("div ${rs}, ${rt}"),
        Opcode::Divu => format!("divu ${rs}, ${rt}"),
        Opcode::Add => format!("add ${rd}, ${rs}, ${rt}"),
        Opcode::Addu => format!("addu ${rd}, ${rs}, ${rt}"),
        Opcode::Sub => format!("sub ${rd}, ${rs}, ${rt}"),
        Opcode::Subu => format!("subu ${rd}, ${rs}, ${rt}"),
        Opcode::And => format!("and ${rd}, ${rs}, ${rt}"),
        Opcode::Or => format!("or ${rd}, ${rs}, ${rt}"),
        Opcode::Xor => format!("xor ${rd}, ${rs}, ${rt}"),
        Opcode::Nor => format!("nor ${rd}, ${rs}, ${rt}"),
        Opcode::Slt => format!("slt ${rd}, ${rs}, ${rt}"),
        Opcode::Sltu => format!("sltu ${rd}, ${rs}, ${rt}"),

        Opcode::Bltz => format!("bltz ${rs}, {imm_se}"),
        Opcode::Bgez => format!("bgez ${rs}, {imm_se}"),
        Opcode::Bltzal => format!("bltzal ${rs}, {imm_se}"),
        Opcode::Bgezal => format!("bgezal ${rs}, {imm_se}"),

        Opcode::J => format!("j 0x{:07X}", instruction.target() << 2),
        Opcode::Jal => format!("jal 0x{:07X}", instruction.target() << 2),
        Opcode::Beq => format!("beq ${rs}, ${rt}, {imm_se}"),
        Opcode::Bne => format!("bne ${rs}, ${rt}, {imm_se}"),
        Opcode::Blez => format!("blez ${rs}, {imm_se}"),
        Opcode::Bgtz => format!("bgtz ${rs}, {imm_se}"),
        Opcode::Addi => format!("addi ${rt}, ${rs}, {imm_se}"),
        Opcode::Addiu => format!("addiu ${rt}, ${rs}, {imm_se}"),
        Opcode::Slti => format!("slti ${rt}, ${rs}, {imm_se}"),
        Opcode::Sltiu => format!("sltiu ${rt}, ${rs}, {imm_se}"),
        Opcode::Andi => format!("andi ${rt}, ${rs}, 0x{imm:04X}"),
        Opcode::Ori => format!("ori ${rt}, ${rs}, 0x{imm:04X}"),
        Opcode::Xori => format!("xori ${rt}, ${rs}, 0x{imm:04X}"),
        Opcode::Lui => format!("lui ${rt}, 0x{imm:04X}"),

        Opcode::Lb => format!("lb ${rt}, {imm_se}(${rs})"),
        Opcode::Lh => format!("lh ${rt}, {imm_se}(${rs})"),
        Opcode::Lwl => format!("lwl ${rt}, {imm_se}(${rs})"),
        Opcode::Lw => format!("lw ${rt}, {imm_se}(${rs})"),
        Opcode::Lbu => format!("lbu ${rt}, {imm_se}(${rs})"),
        Opcode::Lhu => format!("lhu ${rt}, {imm_se}(${rs})"),
        Opcode::Lwr => format!("lwr ${rt}, {imm_se}(${rs})"),
        Opcode::Sb => format!("sb ${rt}, {imm_se}(${rs})"),
        Opcode::Sh => format!("sh ${rt}, {imm_se}(${rs})"),
        Opcode::Swl => format!("swl ${rt}, {imm_se}(${rs})"),
        Opcode::Sw => format!("sw ${rt}, {imm_se}(${rs})"),
        Opcode::Swr => format!("swr ${rt}, {imm_se}(${rs})"),

        Opcode::Mfc0 => format!("mfc0 ${rt}, $cop0_{rd}"),
        Opcode::Mtc0 => format!("mtc0 ${rt}, $cop0_{rd}"),
        Opcode::Rfe => "rfe".to_string(),
        Opcode::Cop1 => format!("cop1 0x{:08x}", instruction),
        Opcode::Cop2 => format!("cop2 0x{:08x}", instruction),
        Opcode::Cop3 => format!("cop3 0x{:08x}", instruction),
        Opcode::Lwc0 => format!("lwc0 ${rt}, {imm_se}(${rs})"),
        Opcode::Lwc1 => format!("lwc1 ${rt}, {imm_se}(${rs})"),
        Opcode::Lwc2 => format!("lwc2 ${rt}, {imm_se}(${rs})"),
        Opcode::Lwc3 => format!("lwc3 ${rt}, {imm_se}(${rs})"),
        Opcode::Swc0 => format!("swc0 ${rt}, {imm_se}(${rs})"),
        Opcode::Swc1 => format!("swc1 ${rt}, {imm_se}(${rs})"),
        Opcode::Swc2 => format!("swc2 ${rt}, {imm_se}(${rs})"),
        Opcode::Swc3 => format!("swc3 ${rt}, {imm_se}(${rs})"),

        Opcode::Illegal => format!("illegal 0x{:08x}", instruction),
    }
}
