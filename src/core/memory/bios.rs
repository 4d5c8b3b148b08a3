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

//! BIOS ROM backend
//!
//! A read-only 512KB byte buffer mapped at physical 0x1FC00000. The CPU
//! boots from its first word (0xBFC00000 in KSEG1). Writes to the BIOS
//! region are ignored at the bus level; this type only exposes loads.

use crate::core::error::{EmulatorError, Result};
use std::fs::File;
use std::io::Read;

/// BIOS ROM image size (512KB)
pub const BIOS_SIZE: usize = 512 * 1024;

/// Read-only BIOS ROM
pub struct BIOS {
    /// ROM contents, exactly [`BIOS_SIZE`] bytes
    data: Vec<u8>,
}

impl BIOS {
    /// Create a BIOS from an in-memory image
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::InvalidBiosSize`] unless the image is
    /// exactly 512KB.
    ///
    /// # Example
    ///
    /// ```
    /// use minipsx::core::memory::bios::{BIOS, BIOS_SIZE};
    ///
    /// let bios = BIOS::new(vec![0u8; BIOS_SIZE]).unwrap();
    /// assert_eq!(bios.load32(0), 0);
    ///
    /// assert!(BIOS::new(vec![0u8; 4]).is_err());
    /// ```
    pub fn new(data: Vec<u8>) -> Result<Self> {
        if data.len() != BIOS_SIZE {
            return Err(EmulatorError::InvalidBiosSize {
                expected: BIOS_SIZE,
                got: data.len(),
            });
        }

        Ok(Self { data })
    }

    /// Load a BIOS image from a file
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::BiosNotFound`] if the file cannot be opened
    /// - [`EmulatorError::InvalidBiosSize`] if it is not exactly 512KB
    ///
    /// No partial state is created on failure.
    pub fn from_file(path: &str) -> Result<Self> {
        let mut file =
            File::open(path).map_err(|_| EmulatorError::BiosNotFound(path.to_string()))?;

        let metadata = file.metadata()?;
        if metadata.len() != BIOS_SIZE as u64 {
            return Err(EmulatorError::InvalidBiosSize {
                expected: BIOS_SIZE,
                got: metadata.len() as usize,
            });
        }

        let mut data = vec![0u8; BIOS_SIZE];
        file.read_exact(&mut data)?;

        log::info!("BIOS loaded from {path}");

        Self::new(data)
    }

    /// Read a byte at `offset`
    #[inline(always)]
    pub fn load8(&self, offset: u32) -> u8 {
        self.data[offset as usize]
    }

    /// Read a little-endian halfword at `offset`
    #[inline(always)]
    pub fn load16(&self, offset: u32) -> u16 {
        let offset = offset as usize;
        let bytes = [self.data[offset], self.data[offset + 1]];
        u16::from_le_bytes(bytes)
    }

    /// Read a little-endian word at `offset`
    #[inline(always)]
    pub fn load32(&self, offset: u32) -> u32 {
        let offset = offset as usize;
        let bytes = [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ];
        u32::from_le_bytes(bytes)
    }
}
