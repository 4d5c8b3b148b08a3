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

//! Main RAM backend
//!
//! 2MB of little-endian read/write memory mapped at physical 0x00000000.
//! Offsets handed to this type come from [`super::map::RAM`] range
//! extraction (or from the DMA engine, which masks to the RAM word space),
//! so an out-of-range offset is a bug in the caller, not a guest fault.

/// Main RAM size (2MB)
pub const RAM_SIZE: usize = 2 * 1024 * 1024;

/// 2MB main RAM
pub struct RAM {
    data: Vec<u8>,
}

impl RAM {
    /// Create RAM filled with the power-on garbage pattern
    ///
    /// Real hardware comes up with undefined contents; 0xCA makes reads of
    /// uninitialized memory stand out in traces.
    ///
    /// # Example
    ///
    /// ```
    /// use minipsx::core::memory::ram::RAM;
    ///
    /// let ram = RAM::new();
    /// assert_eq!(ram.load8(0), 0xCA);
    /// ```
    pub fn new() -> Self {
        Self {
            data: vec![0xCA; RAM_SIZE],
        }
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

    /// Write a byte at `offset`
    #[inline(always)]
    pub fn store8(&mut self, offset: u32, value: u8) {
        self.data[offset as usize] = value;
    }

    /// Write a little-endian halfword at `offset`
    #[inline(always)]
    pub fn store16(&mut self, offset: u32, value: u16) {
        let offset = offset as usize;
        self.data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// Write a little-endian word at `offset`
    #[inline(always)]
    pub fn store32(&mut self, offset: u32, value: u32) {
        let offset = offset as usize;
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

impl Default for RAM {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_power_on_pattern() {
        let ram = RAM::new();

        assert_eq!(ram.load8(0), 0xCA);
        assert_eq!(ram.load32(0), 0xCACA_CACA);
        assert_eq!(ram.load8((RAM_SIZE - 1) as u32), 0xCA);
    }

    #[test]
    fn test_little_endian_byte_composition() {
        let mut ram = RAM::new();

        ram.store8(0x100, 0x34);
        ram.store8(0x101, 0x12);
        assert_eq!(ram.load16(0x100), 0x1234);

        ram.store8(0x102, 0xCD);
        ram.store8(0x103, 0xAB);
        assert_eq!(ram.load32(0x100), 0xABCD_1234);
    }

    #[test]
    fn test_word_store_byte_order() {
        let mut ram = RAM::new();

        ram.store32(0x2000, 0x1122_3344);
        assert_eq!(ram.load8(0x2000), 0x44);
        assert_eq!(ram.load8(0x2001), 0x33);
        assert_eq!(ram.load8(0x2002), 0x22);
        assert_eq!(ram.load8(0x2003), 0x11);
    }

    proptest! {
        #[test]
        fn prop_store_load_roundtrip8(offset in 0u32..RAM_SIZE as u32, value: u8) {
            let mut ram = RAM::new();
            ram.store8(offset, value);
            prop_assert_eq!(ram.load8(offset), value);
        }

        #[test]
        fn prop_store_load_roundtrip16(offset in 0u32..(RAM_SIZE as u32 - 1), value: u16) {
            let mut ram = RAM::new();
            ram.store16(offset, value);
            prop_assert_eq!(ram.load16(offset), value);
        }

        #[test]
        fn prop_store_load_roundtrip32(offset in 0u32..(RAM_SIZE as u32 - 3), value: u32) {
            let mut ram = RAM::new();
            ram.store32(offset, value);
            prop_assert_eq!(ram.load32(offset), value);
        }
    }
}
