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

//! Emulator error types
//!
//! Guest-visible faults (misaligned accesses, arithmetic overflow, syscall,
//! break, illegal opcodes) are *not* errors: the CPU turns them into MIPS
//! exceptions and the host never sees them. `EmulatorError` covers the two
//! remaining categories:
//!
//! - Programming errors of the emulator itself (an access to an unmapped
//!   bus address, an unhandled DMA register, an unknown GP0/GP1 command).
//!   These propagate out of the step loop and halt it with a diagnostic.
//! - Host errors (BIOS file missing or wrong size, config parse failures).

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// All fatal error conditions of the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    /// BIOS file could not be opened
    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    /// BIOS image has the wrong size (must be exactly 512KB)
    #[error("invalid BIOS size: expected {expected} bytes, got {got}")]
    InvalidBiosSize { expected: usize, got: usize },

    /// Access to an address no device claims
    #[error("unhandled bus access of {size} bytes at 0x{address:08X} (write: {write})")]
    UnhandledAddress { address: u32, size: u32, write: bool },

    /// Access to a DMA register offset with no defined meaning
    #[error("unhandled DMA register access at offset 0x{offset:02X}")]
    UnhandledDmaRegister { offset: u32 },

    /// Channel control word with the reserved sync mode (3)
    #[error("invalid DMA channel control word 0x{value:08X} (reserved sync mode)")]
    InvalidDmaControl { value: u32 },

    /// GP0 command byte with no handler
    #[error("unhandled GP0 command 0x{0:08X}")]
    UnhandledGp0Command(u32),

    /// GP1 command byte with no handler
    #[error("unhandled GP1 command 0x{0:08X}")]
    UnhandledGp1Command(u32),

    /// GP1(0x08) with bit 7 set
    #[error("unsupported display mode 0x{0:08X}")]
    UnsupportedDisplayMode(u32),

    /// Functionality the core knowingly does not model (GTE, most DMA ports)
    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
