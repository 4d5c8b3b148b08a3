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

//! Runner configuration
//!
//! Optional TOML file consumed by the `minipsx` binary. Command-line flags
//! override anything set here.
//!
//! ```toml
//! bios = "SCPH1001.BIN"
//! max_steps = 1000000
//! trace = false
//! breakpoints = [0x80030000]
//! ```

use crate::core::error::Result;
use serde::Deserialize;
use std::fs;

/// Settings for a headless emulation run
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the 512KB BIOS image
    pub bios: Option<String>,

    /// Stop after this many instructions (run forever when absent)
    pub max_steps: Option<u64>,

    /// Print every executed instruction
    pub trace: bool,

    /// Breakpoint addresses installed before the run starts
    pub breakpoints: Vec<u32>,
}

impl Config {
    /// Parse a config file
    ///
    /// # Errors
    ///
    /// I/O failures and TOML syntax/shape errors are reported through
    /// [`crate::core::error::EmulatorError`].
    pub fn load(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = toml::from_str(&text)?;

        Ok(config)
    }
}
