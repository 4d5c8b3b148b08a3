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

//! Bus interconnect
//!
//! The Bus owns every device on the memory map (BIOS, RAM, GPU, DMA) and
//! routes CPU loads and stores to them: virtual addresses are projected to
//! physical with [`map::mask_region`], then matched against the device
//! ranges. A write to a DMA channel-control register that leaves the
//! channel active runs the whole transfer before the store returns.
//!
//! Alignment is the CPU's concern: misaligned guest accesses raise MIPS
//! address-error exceptions before they reach the bus, so every offset
//! seen here is already aligned for its width.
//!
//! # Memory map (physical)
//!
//! | Range         | Base        | Size   | Behavior                     |
//! |---------------|-------------|--------|------------------------------|
//! | RAM           | 0x00000000  | 2MB    | read/write                   |
//! | Expansion 1   | 0x1F000000  | 8MB    | reads float high, no device  |
//! | Mem control   | 0x1F801000  | 36B    | ignored                      |
//! | IRQ control   | 0x1F801070  | 8B     | reads 0, writes ignored      |
//! | DMA           | 0x1F801080  | 128B   | DMA register file            |
//! | Timers        | 0x1F801100  | 48B    | ignored                      |
//! | SPU           | 0x1F801C00  | 640B   | ignored                      |
//! | Expansion 2   | 0x1F802000  | 66B    | ignored                      |
//! | GPU           | 0x1F810000  | 8B     | GP0/GP1 ports                |
//! | BIOS          | 0x1FC00000  | 512KB  | read-only                    |
//! | Cache control | 0xFFFE0130  | 4B     | ignored                      |

pub mod bios;
pub mod map;
pub mod ram;

use crate::core::debugger::Debugger;
use crate::core::dma::DMA;
use crate::core::error::{EmulatorError, Result};
use crate::core::gpu::GPU;
use bios::BIOS;
use ram::RAM;
use std::cell::RefCell;
use std::rc::Rc;

/// Memory bus routing all CPU and DMA traffic
pub struct Bus {
    /// BIOS ROM; starts zero-filled until an image is loaded
    bios: BIOS,
    /// Main RAM
    ram: RAM,
    /// GPU command front end
    gpu: GPU,
    /// DMA controller
    dma: DMA,
    /// Memory access observer (shared with the System)
    debugger: Option<Rc<RefCell<Debugger>>>,
}

impl Bus {
    /// Create a bus with power-on device state and an all-zero BIOS
    pub fn new() -> Self {
        let empty_bios = vec![0u8; bios::BIOS_SIZE];

        Self {
            bios: BIOS::new(empty_bios).expect("zero-filled BIOS image has the right size"),
            ram: RAM::new(),
            gpu: GPU::new(),
            dma: DMA::new(),
            debugger: None,
        }
    }

    /// Load a BIOS ROM image from a file
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        self.bios = BIOS::from_file(path)?;
        Ok(())
    }

    /// Load a BIOS ROM image from bytes
    pub fn load_bios_bytes(&mut self, data: Vec<u8>) -> Result<()> {
        self.bios = BIOS::new(data)?;
        Ok(())
    }

    /// Attach the memory access observer
    pub fn set_debugger(&mut self, debugger: Rc<RefCell<Debugger>>) {
        self.debugger = Some(debugger);
    }

    pub fn ram(&self) -> &RAM {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut RAM {
        &mut self.ram
    }

    pub fn gpu(&self) -> &GPU {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut GPU {
        &mut self.gpu
    }

    pub fn dma(&self) -> &DMA {
        &self.dma
    }

    fn notify_read(&self, vaddr: u32) {
        if let Some(debugger) = &self.debugger {
            debugger.borrow_mut().memory_read(vaddr);
        }
    }

    fn notify_write(&self, vaddr: u32) {
        if let Some(debugger) = &self.debugger {
            debugger.borrow_mut().memory_write(vaddr);
        }
    }

    /// Read a byte
    pub fn load8(&mut self, vaddr: u32) -> Result<u8> {
        self.notify_read(vaddr);

        let paddr = map::mask_region(vaddr);

        if let Some(offset) = map::RAM.contains(paddr) {
            return Ok(self.ram.load8(offset));
        }
        if let Some(offset) = map::BIOS.contains(paddr) {
            return Ok(self.bios.load8(offset));
        }
        if map::EXPANSION_1.contains(paddr).is_some() {
            // No expansion hardware: the data lines float high
            return Ok(0xFF);
        }
        if map::IRQ_CONTROL.contains(paddr).is_some() {
            return Ok(0);
        }
        if self.is_ignored_region(paddr) {
            log::trace!("read8 from ignored region at 0x{vaddr:08X}");
            return Ok(0);
        }

        Err(EmulatorError::UnhandledAddress {
            address: vaddr,
            size: 1,
            write: false,
        })
    }

    /// Read a halfword
    pub fn load16(&mut self, vaddr: u32) -> Result<u16> {
        self.notify_read(vaddr);

        let paddr = map::mask_region(vaddr);

        if let Some(offset) = map::RAM.contains(paddr) {
            return Ok(self.ram.load16(offset));
        }
        if let Some(offset) = map::BIOS.contains(paddr) {
            return Ok(self.bios.load16(offset));
        }
        if map::EXPANSION_1.contains(paddr).is_some() {
            return Ok(0xFFFF);
        }
        if map::IRQ_CONTROL.contains(paddr).is_some() {
            return Ok(0);
        }
        if self.is_ignored_region(paddr) {
            log::trace!("read16 from ignored region at 0x{vaddr:08X}");
            return Ok(0);
        }

        Err(EmulatorError::UnhandledAddress {
            address: vaddr,
            size: 2,
            write: false,
        })
    }

    /// Read a word
    pub fn load32(&mut self, vaddr: u32) -> Result<u32> {
        self.notify_read(vaddr);

        let paddr = map::mask_region(vaddr);

        if let Some(offset) = map::RAM.contains(paddr) {
            return Ok(self.ram.load32(offset));
        }
        if let Some(offset) = map::BIOS.contains(paddr) {
            return Ok(self.bios.load32(offset));
        }
        if let Some(offset) = map::DMA.contains(paddr) {
            return self.dma.reg(offset);
        }
        if let Some(offset) = map::GPU.contains(paddr) {
            return Ok(match offset {
                0 => self.gpu.read(),
                4 => self.gpu.status(),
                _ => unreachable!(),
            });
        }
        if map::EXPANSION_1.contains(paddr).is_some() {
            return Ok(0xFFFF_FFFF);
        }
        if map::IRQ_CONTROL.contains(paddr).is_some() {
            return Ok(0);
        }
        if self.is_ignored_region(paddr) {
            log::trace!("read32 from ignored region at 0x{vaddr:08X}");
            return Ok(0);
        }

        Err(EmulatorError::UnhandledAddress {
            address: vaddr,
            size: 4,
            write: false,
        })
    }

    /// Write a byte
    pub fn store8(&mut self, vaddr: u32, value: u8) -> Result<()> {
        self.notify_write(vaddr);

        let paddr = map::mask_region(vaddr);

        if let Some(offset) = map::RAM.contains(paddr) {
            self.ram.store8(offset, value);
            return Ok(());
        }
        if map::BIOS.contains(paddr).is_some() {
            log::trace!("store8 to BIOS ROM at 0x{vaddr:08X} ignored");
            return Ok(());
        }
        if map::EXPANSION_1.contains(paddr).is_some() || map::IRQ_CONTROL.contains(paddr).is_some()
        {
            return Ok(());
        }
        if self.is_ignored_region(paddr) {
            log::trace!("store8 to ignored region at 0x{vaddr:08X}");
            return Ok(());
        }

        Err(EmulatorError::UnhandledAddress {
            address: vaddr,
            size: 1,
            write: true,
        })
    }

    /// Write a halfword
    pub fn store16(&mut self, vaddr: u32, value: u16) -> Result<()> {
        self.notify_write(vaddr);

        let paddr = map::mask_region(vaddr);

        if let Some(offset) = map::RAM.contains(paddr) {
            self.ram.store16(offset, value);
            return Ok(());
        }
        if map::BIOS.contains(paddr).is_some() {
            log::trace!("store16 to BIOS ROM at 0x{vaddr:08X} ignored");
            return Ok(());
        }
        if map::EXPANSION_1.contains(paddr).is_some() || map::IRQ_CONTROL.contains(paddr).is_some()
        {
            return Ok(());
        }
        if self.is_ignored_region(paddr) {
            log::trace!("store16 to ignored region at 0x{vaddr:08X}");
            return Ok(());
        }

        Err(EmulatorError::UnhandledAddress {
            address: vaddr,
            size: 2,
            write: true,
        })
    }

    /// Write a word
    pub fn store32(&mut self, vaddr: u32, value: u32) -> Result<()> {
        self.notify_write(vaddr);

        let paddr = map::mask_region(vaddr);

        if let Some(offset) = map::RAM.contains(paddr) {
            self.ram.store32(offset, value);
            return Ok(());
        }
        if map::BIOS.contains(paddr).is_some() {
            log::trace!("store32 to BIOS ROM at 0x{vaddr:08X} ignored");
            return Ok(());
        }
        if let Some(offset) = map::DMA.contains(paddr) {
            return self.set_dma_reg(offset, value);
        }
        if let Some(offset) = map::GPU.contains(paddr) {
            return match offset {
                0 => self.gpu.gp0(value),
                4 => self.gpu.gp1(value),
                _ => unreachable!(),
            };
        }
        if map::EXPANSION_1.contains(paddr).is_some() || map::IRQ_CONTROL.contains(paddr).is_some()
        {
            return Ok(());
        }
        if self.is_ignored_region(paddr) {
            log::trace!("store32 to ignored region at 0x{vaddr:08X}");
            return Ok(());
        }

        Err(EmulatorError::UnhandledAddress {
            address: vaddr,
            size: 4,
            write: true,
        })
    }

    /// Regions with no modeled device where traffic is harmless
    fn is_ignored_region(&self, paddr: u32) -> bool {
        map::MEM_CONTROL.contains(paddr).is_some()
            || map::TIMERS.contains(paddr).is_some()
            || map::SPU.contains(paddr).is_some()
            || map::EXPANSION_2.contains(paddr).is_some()
            || map::CACHE_CONTROL.contains(paddr).is_some()
    }

    /// Write a DMA register, running any transfer the write starts
    fn set_dma_reg(&mut self, offset: u32, value: u32) -> Result<()> {
        let activated = self.dma.set_reg(offset, value)?;

        if let Some(port) = activated {
            let Bus { dma, ram, gpu, .. } = self;

            dma.execute(port, ram, gpu)?;
        }

        Ok(())
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dma::Port;

    #[test]
    fn test_ram_mirrors_across_segments() {
        let mut bus = Bus::new();

        bus.store32(0x8000_1000, 0x1234_5678).unwrap();

        assert_eq!(bus.load32(0x0000_1000).unwrap(), 0x1234_5678);
        assert_eq!(bus.load32(0x8000_1000).unwrap(), 0x1234_5678);
        assert_eq!(bus.load32(0xA000_1000).unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_ram_store_load_widths() {
        let mut bus = Bus::new();

        bus.store8(0x10, 0x12).unwrap();
        bus.store8(0x11, 0x34).unwrap();
        assert_eq!(bus.load16(0x10).unwrap(), 0x3412);

        bus.store16(0x20, 0xBEEF).unwrap();
        bus.store16(0x22, 0xDEAD).unwrap();
        assert_eq!(bus.load32(0x20).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_bios_is_read_only() {
        let mut bus = Bus::new();

        let before = bus.load32(0xBFC0_0000).unwrap();
        bus.store32(0xBFC0_0000, 0xFFFF_FFFF).unwrap();
        bus.store16(0xBFC0_0000, 0xFFFF).unwrap();
        bus.store8(0xBFC0_0000, 0xFF).unwrap();

        assert_eq!(bus.load32(0xBFC0_0000).unwrap(), before);
    }

    #[test]
    fn test_expansion1_reads_float_high() {
        let mut bus = Bus::new();

        assert_eq!(bus.load8(0x1F00_0000).unwrap(), 0xFF);
        assert_eq!(bus.load16(0x1F00_0000).unwrap(), 0xFFFF);
        assert_eq!(bus.load32(0x1F00_0084).unwrap(), 0xFFFF_FFFF);
        bus.store8(0x1F00_0000, 0).unwrap();
    }

    #[test]
    fn test_irq_control_reads_zero() {
        let mut bus = Bus::new();

        bus.store32(0x1F80_1070, 0xFFFF_FFFF).unwrap();
        assert_eq!(bus.load32(0x1F80_1070).unwrap(), 0);
        assert_eq!(bus.load16(0x1F80_1074).unwrap(), 0);
    }

    #[test]
    fn test_ignored_regions_accept_traffic() {
        let mut bus = Bus::new();

        // Mem control, timers, SPU, expansion 2, cache control
        for addr in [0x1F80_1000, 0x1F80_1100, 0x1F80_1C00, 0x1F80_2000, 0xFFFE_0130] {
            bus.store32(addr, 0x1234_5678).unwrap();
            assert_eq!(bus.load32(addr).unwrap(), 0);
        }
    }

    #[test]
    fn test_writes_to_ignored_regions_leave_no_trace() {
        let mut bus = Bus::new();

        let before = bus.load32(0x1F80_1100).unwrap();
        bus.store32(0x1F80_1100, 0xFFFF_FFFF).unwrap();
        assert_eq!(bus.load32(0x1F80_1100).unwrap(), before);
    }

    #[test]
    fn test_unmapped_address_is_an_error() {
        let mut bus = Bus::new();

        assert!(matches!(
            bus.load32(0x1FC8_0000),
            Err(EmulatorError::UnhandledAddress { write: false, .. })
        ));
        assert!(matches!(
            bus.store32(0x1FC8_0000, 0),
            Err(EmulatorError::UnhandledAddress { write: true, .. })
        ));
    }

    #[test]
    fn test_gpu_status_readable_through_bus() {
        let mut bus = Bus::new();

        let status = bus.load32(0x1F81_0004).unwrap();

        // Ready bits are tied high
        assert_ne!(status & (1 << 26), 0);
        assert_ne!(status & (1 << 27), 0);
        assert_ne!(status & (1 << 28), 0);

        // GPUREAD stub
        assert_eq!(bus.load32(0x1F81_0000).unwrap(), 0);
    }

    #[test]
    fn test_gp1_writes_routed_to_gpu() {
        let mut bus = Bus::new();

        bus.store32(0x1F81_0004, 0x0400_0002).unwrap();

        let status = bus.load32(0x1F81_0004).unwrap();
        assert_eq!((status >> 29) & 3, 2);
    }

    #[test]
    fn test_dma_registers_through_bus() {
        let mut bus = Bus::new();

        assert_eq!(bus.load32(0x1F80_10F0).unwrap(), 0x0765_4321);

        bus.store32(0x1F80_10A0, 0x0002_0000).unwrap();
        assert_eq!(bus.load32(0x1F80_10A0).unwrap(), 0x0002_0000);
    }

    #[test]
    fn test_dma_control_write_runs_otc_transfer() {
        let mut bus = Bus::new();

        // Channel 6 (OTC): base 0x1000, 4 entries, then enable+trigger
        bus.store32(0x1F80_10E0, 0x1000).unwrap();
        bus.store32(0x1F80_10E4, 4).unwrap();
        bus.store32(0x1F80_10E8, (1 << 24) | (1 << 28) | (1 << 1)).unwrap();

        // The transfer completed synchronously
        assert_eq!(bus.load32(0x1000).unwrap(), 0xFFC);
        assert_eq!(bus.load32(0x0FF4).unwrap(), 0xFF_FFFF);
        assert!(!bus.dma().channel(Port::Otc).active());
    }

    #[test]
    fn test_debugger_sees_memory_traffic() {
        let mut bus = Bus::new();
        let debugger = Rc::new(RefCell::new(Debugger::new()));
        bus.set_debugger(debugger.clone());

        debugger.borrow_mut().add_write_watchpoint(0x8000_0040);

        bus.store32(0x8000_0040, 1).unwrap();
        assert!(debugger.borrow().paused());
    }
}
