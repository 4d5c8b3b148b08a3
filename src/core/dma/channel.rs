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

//! Per-channel DMA registers
//!
//! Each of the seven channels exposes three registers: the base address
//! (MADR), the block control word (BCR) and the channel control word
//! (CHCR). The control word is kept unpacked in typed fields and
//! reassembled on read, so transfer code never does bit fiddling.

use crate::core::error::{EmulatorError, Result};

/// DMA transfer direction, relative to RAM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToRam = 0,
    FromRam = 1,
}

/// RAM address step per transferred word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increment = 0,
    Decrement = 1,
}

/// Transfer synchronization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sync {
    /// Transfer starts when the CPU writes the trigger bit, runs at once
    Manual = 0,
    /// Blocks transferred on device request
    Request = 1,
    /// Linked list of GPU command packets
    LinkedList = 2,
}

/// One DMA channel's register state
pub struct Channel {
    /// Start/busy flag (CHCR bit 24)
    enable: bool,
    /// Manual-sync start trigger (CHCR bit 28)
    trigger: bool,
    direction: Direction,
    step: Step,
    sync: Sync,
    /// Chopping: pause the transfer to let the CPU run
    chop: bool,
    /// Chopping DMA window size (log2 words)
    chop_dma_sz: u8,
    /// Chopping CPU window size (log2 cycles)
    chop_cpu_sz: u8,
    /// CHCR bits 29-30, purpose unknown
    dummy: u8,
    /// Transfer start address in RAM (MADR, 24 bits)
    base: u32,
    /// Block size in words (BCR low half)
    block_size: u16,
    /// Block count, Request sync only (BCR high half)
    block_count: u16,
}

impl Channel {
    pub fn new() -> Self {
        Self {
            enable: false,
            trigger: false,
            direction: Direction::ToRam,
            step: Step::Increment,
            sync: Sync::Manual,
            chop: false,
            chop_dma_sz: 0,
            chop_cpu_sz: 0,
            dummy: 0,
            base: 0,
            block_size: 0,
            block_count: 0,
        }
    }

    /// Reassemble the CHCR word
    pub fn control(&self) -> u32 {
        let mut r = 0u32;

        r |= self.direction as u32;
        r |= (self.step as u32) << 1;
        r |= u32::from(self.chop) << 8;
        r |= (self.sync as u32) << 9;
        r |= u32::from(self.chop_dma_sz) << 16;
        r |= u32::from(self.chop_cpu_sz) << 20;
        r |= u32::from(self.enable) << 24;
        r |= u32::from(self.trigger) << 28;
        r |= u32::from(self.dummy) << 29;

        r
    }

    /// Unpack a CHCR write
    ///
    /// # Errors
    ///
    /// Sync field value 3 is reserved and reported as
    /// [`EmulatorError::InvalidDmaControl`].
    pub fn set_control(&mut self, value: u32) -> Result<()> {
        self.direction = if value & 1 != 0 {
            Direction::FromRam
        } else {
            Direction::ToRam
        };
        self.step = if (value >> 1) & 1 != 0 {
            Step::Decrement
        } else {
            Step::Increment
        };
        self.chop = (value >> 8) & 1 != 0;
        self.sync = match (value >> 9) & 3 {
            0 => Sync::Manual,
            1 => Sync::Request,
            2 => Sync::LinkedList,
            _ => return Err(EmulatorError::InvalidDmaControl { value }),
        };
        self.chop_dma_sz = ((value >> 16) & 7) as u8;
        self.chop_cpu_sz = ((value >> 20) & 7) as u8;
        self.enable = (value >> 24) & 1 != 0;
        self.trigger = (value >> 28) & 1 != 0;
        self.dummy = ((value >> 29) & 3) as u8;

        Ok(())
    }

    /// Transfer start address (MADR)
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Set the transfer start address; only 24 bits are wired
    pub fn set_base(&mut self, value: u32) {
        self.base = value & 0xFF_FFFF;
    }

    /// Reassemble the BCR word
    pub fn block_control(&self) -> u32 {
        (u32::from(self.block_count) << 16) | u32::from(self.block_size)
    }

    /// Unpack a BCR write
    pub fn set_block_control(&mut self, value: u32) {
        self.block_size = value as u16;
        self.block_count = (value >> 16) as u16;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn sync(&self) -> Sync {
        self.sync
    }

    /// A channel transfers when enabled, and in Manual sync also triggered
    pub fn active(&self) -> bool {
        let trigger = match self.sync {
            Sync::Manual => self.trigger,
            _ => true,
        };

        self.enable && trigger
    }

    /// Transfer length in words, `None` for linked lists
    ///
    /// Linked-list length is only known once the headers are walked.
    pub fn transfer_size(&self) -> Option<u32> {
        let size = u32::from(self.block_size);
        let count = u32::from(self.block_count);

        match self.sync {
            Sync::Manual => Some(size),
            Sync::Request => Some(size * count),
            Sync::LinkedList => None,
        }
    }

    /// Mark the transfer finished
    pub fn done(&mut self) {
        self.enable = false;
        self.trigger = false;
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_roundtrip() {
        let mut channel = Channel::new();

        // FromRam, decrement, chop, linked list, window sizes, enable,
        // trigger, both dummy bits
        let word = 1
            | (1 << 1)
            | (1 << 8)
            | (2 << 9)
            | (5 << 16)
            | (3 << 20)
            | (1 << 24)
            | (1 << 28)
            | (3 << 29);
        channel.set_control(word).unwrap();

        assert_eq!(channel.control(), word);
        assert_eq!(channel.direction(), Direction::FromRam);
        assert_eq!(channel.step(), Step::Decrement);
        assert_eq!(channel.sync(), Sync::LinkedList);
    }

    #[test]
    fn test_control_ignores_unwired_bits() {
        let mut channel = Channel::new();

        channel.set_control(0xFFFF_FFFF & !(3 << 9)).unwrap();

        // Bits 2-7, 11-15, 19, 23, 25-27 and 31 read back as zero
        let readback = channel.control();
        assert_eq!(readback & 0b1111_1100, 0);
        assert_eq!(readback & (1 << 31), 0);
    }

    #[test]
    fn test_reserved_sync_mode_rejected() {
        let mut channel = Channel::new();

        let result = channel.set_control(3 << 9);
        assert!(matches!(
            result,
            Err(EmulatorError::InvalidDmaControl { .. })
        ));
    }

    #[test]
    fn test_base_masked_to_24_bits() {
        let mut channel = Channel::new();

        channel.set_base(0xFF12_3456);
        assert_eq!(channel.base(), 0x0012_3456);
    }

    #[test]
    fn test_block_control_roundtrip() {
        let mut channel = Channel::new();

        channel.set_block_control(0x0010_0020);
        assert_eq!(channel.block_control(), 0x0010_0020);
        assert_eq!(channel.transfer_size(), Some(0x20));
    }

    #[test]
    fn test_active_manual_needs_trigger() {
        let mut channel = Channel::new();

        // Enabled, Manual sync, no trigger
        channel.set_control(1 << 24).unwrap();
        assert!(!channel.active());

        channel.set_control((1 << 24) | (1 << 28)).unwrap();
        assert!(channel.active());
    }

    #[test]
    fn test_active_request_ignores_trigger() {
        let mut channel = Channel::new();

        channel.set_control((1 << 24) | (1 << 9)).unwrap();
        assert!(channel.active());
    }

    #[test]
    fn test_transfer_size_by_sync_mode() {
        let mut channel = Channel::new();
        channel.set_block_control(0x0004_0010);

        channel.set_control(0).unwrap();
        assert_eq!(channel.transfer_size(), Some(0x10));

        channel.set_control(1 << 9).unwrap();
        assert_eq!(channel.transfer_size(), Some(0x40));

        channel.set_control(2 << 9).unwrap();
        assert_eq!(channel.transfer_size(), None);
    }

    #[test]
    fn test_done_clears_enable_and_trigger() {
        let mut channel = Channel::new();

        channel.set_control((1 << 24) | (1 << 28)).unwrap();
        assert!(channel.active());

        channel.done();
        assert!(!channel.active());
        assert_eq!(channel.control() & (1 << 24), 0);
        assert_eq!(channel.control() & (1 << 28), 0);
    }
}
