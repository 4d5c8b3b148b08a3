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

//! minipsx: the execution core of a PlayStation (PSX) emulator
//!
//! This crate models the console's MIPS R3000A CPU with its System Control
//! coprocessor, the bus fabric routing physical memory requests to BIOS
//! ROM, RAM, the DMA controller and the GPU's command ports, and the GP0/
//! GP1 command front end of the GPU. Rendering, sound, discs and input are
//! out of scope; draw commands are handed to a pluggable sink.
//!
//! # Example
//!
//! ```no_run
//! use minipsx::core::system::System;
//!
//! let mut system = System::new();
//! system.load_bios("SCPH1001.BIN").unwrap();
//!
//! loop {
//!     system.step().unwrap();
//! }
//! ```
//!
//! # Modules
//!
//! - [`core::cpu`]: fetch/decode/execute engine, delay slots, exceptions
//! - [`core::memory`]: address map, BIOS/RAM backends, bus interconnect
//! - [`core::dma`]: seven-channel DMA controller
//! - [`core::gpu`]: GP0/GP1 protocol and GPUSTAT
//! - [`core::debugger`]: breakpoint/watchpoint observer
//! - [`core::system`]: host driver API
//!
//! # Error handling
//!
//! Guest-visible faults become MIPS exceptions inside the core. Fallible
//! host-facing operations return [`core::error::Result`].

pub mod core;

// Re-export commonly used types
pub use crate::core::error::{EmulatorError, Result};
pub use crate::core::system::System;
