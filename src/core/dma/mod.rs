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

//! DMA (Direct Memory Access) controller
//!
//! Seven channels move words between RAM and the peripherals without CPU
//! involvement. Register writes that leave a channel active start its
//! transfer immediately and the transfer runs to completion before the
//! triggering store returns, so the CPU observes DMA side effects exactly
//! as if it had performed the accesses itself.
//!
//! # Channels
//!
//! | Channel | Device   | Modeled transfers                   |
//! |---------|----------|-------------------------------------|
//! | 0       | MDEC in  | none                                |
//! | 1       | MDEC out | none                                |
//! | 2       | GPU      | block and linked-list uploads to GP0|
//! | 3       | CD-ROM   | none                                |
//! | 4       | SPU      | none                                |
//! | 5       | PIO      | none                                |
//! | 6       | OTC      | ordering table clear                |
//!
//! # References
//!
//! - [PSX-SPX: DMA Controller](http://problemkaputt.de/psx-spx.htm#dmachannels)

mod channel;

pub use channel::{Channel, Direction, Step, Sync};

use crate::core::error::{EmulatorError, Result};
use crate::core::gpu::GPU;
use crate::core::memory::ram::RAM;

/// Peripheral attached to each DMA channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    /// Macroblock decoder input
    MdecIn = 0,
    /// Macroblock decoder output
    MdecOut = 1,
    /// Graphics processing unit
    Gpu = 2,
    /// CD-ROM drive
    CdRom = 3,
    /// Sound processing unit
    Spu = 4,
    /// Extension port
    Pio = 5,
    /// Ordering table clear, used to prepare GPU command lists
    Otc = 6,
}

impl Port {
    fn from_index(index: u32) -> Port {
        match index {
            0 => Port::MdecIn,
            1 => Port::MdecOut,
            2 => Port::Gpu,
            3 => Port::CdRom,
            4 => Port::Spu,
            5 => Port::Pio,
            6 => Port::Otc,
            _ => unreachable!("invalid DMA port index {index}"),
        }
    }
}

/// DMA controller state: seven channels plus the common registers
pub struct DMA {
    /// Control register (DPCR): channel priorities and master enables
    control: u32,

    /// Master IRQ enable (DICR bit 23)
    irq_en: bool,
    /// Per-channel IRQ enable (DICR bits 16-22)
    channel_irq_en: u8,
    /// Per-channel IRQ flags (DICR bits 24-30), write one to acknowledge
    channel_irq_flags: u8,
    /// Force the IRQ line regardless of enables (DICR bit 15)
    force_irq: bool,
    /// DICR bits 0-5, read/write but without any known function
    irq_dummy: u8,

    channels: [Channel; 7],
}

impl DMA {
    /// Create the controller in its reset state
    pub fn new() -> Self {
        Self {
            // Reset value of the DPCR, per the hardware
            control: 0x0765_4321,
            irq_en: false,
            channel_irq_en: 0,
            channel_irq_flags: 0,
            force_irq: false,
            irq_dummy: 0,
            channels: Default::default(),
        }
    }

    /// Read a DMA register by its offset in the DMA range
    pub fn reg(&self, offset: u32) -> Result<u32> {
        let major = (offset & 0x70) >> 4;
        let minor = offset & 0xF;

        match major {
            // Per-channel registers
            0..=6 => {
                let channel = self.channel(Port::from_index(major));

                match minor {
                    0 => Ok(channel.base()),
                    4 => Ok(channel.block_control()),
                    8 => Ok(channel.control()),
                    _ => Err(EmulatorError::UnhandledDmaRegister { offset }),
                }
            }
            // Common registers
            7 => match minor {
                0 => Ok(self.control),
                4 => Ok(self.interrupt()),
                _ => Err(EmulatorError::UnhandledDmaRegister { offset }),
            },
            _ => unreachable!(),
        }
    }

    /// Write a DMA register by its offset in the DMA range
    ///
    /// Returns the port whose channel the write left active, if any: the
    /// bus must run that transfer before the store completes.
    pub fn set_reg(&mut self, offset: u32, value: u32) -> Result<Option<Port>> {
        let major = (offset & 0x70) >> 4;
        let minor = offset & 0xF;

        let active_port = match major {
            0..=6 => {
                let port = Port::from_index(major);
                let channel = self.channel_mut(port);

                match minor {
                    0 => channel.set_base(value),
                    4 => channel.set_block_control(value),
                    8 => channel.set_control(value)?,
                    _ => return Err(EmulatorError::UnhandledDmaRegister { offset }),
                }

                log::trace!("DMA{} reg 0x{minor:X} = 0x{value:08X}", major);

                if channel.active() { Some(port) } else { None }
            }
            7 => {
                match minor {
                    0 => self.control = value,
                    4 => self.set_interrupt(value),
                    _ => return Err(EmulatorError::UnhandledDmaRegister { offset }),
                }

                None
            }
            _ => unreachable!(),
        };

        Ok(active_port)
    }

    /// Reassemble the interrupt register (DICR)
    pub fn interrupt(&self) -> u32 {
        let mut r = 0u32;

        r |= u32::from(self.irq_dummy);
        r |= u32::from(self.force_irq) << 15;
        r |= u32::from(self.channel_irq_en) << 16;
        r |= u32::from(self.irq_en) << 23;
        r |= u32::from(self.channel_irq_flags) << 24;
        r |= u32::from(self.irq()) << 31;

        r
    }

    /// Unpack a DICR write; flag bits are write-one-to-clear
    pub fn set_interrupt(&mut self, value: u32) {
        self.irq_dummy = (value & 0x3F) as u8;
        self.force_irq = (value >> 15) & 1 != 0;
        self.channel_irq_en = ((value >> 16) & 0x7F) as u8;
        self.irq_en = (value >> 23) & 1 != 0;

        let ack = ((value >> 24) & 0x7F) as u8;
        self.channel_irq_flags &= !ack;
    }

    /// Master IRQ state (DICR bit 31)
    fn irq(&self) -> bool {
        let channel_irq = self.channel_irq_flags & self.channel_irq_en;

        self.force_irq || (self.irq_en && channel_irq != 0)
    }

    pub fn channel(&self, port: Port) -> &Channel {
        &self.channels[port as usize]
    }

    pub fn channel_mut(&mut self, port: Port) -> &mut Channel {
        &mut self.channels[port as usize]
    }

    /// Execute a full transfer on an active channel
    ///
    /// Runs to completion before returning, so the CPU observes DMA
    /// side effects as if it had performed the accesses itself.
    ///
    /// # Arguments
    ///
    /// * `port` - Channel to run; its control registers select the mode
    /// * `ram` - Main RAM, source or destination of every transfer
    /// * `gpu` - GPU front end, sink of channel 2 uploads
    ///
    /// # Returns
    ///
    /// `Ok(())` once the channel is deactivated; its IRQ flag is raised
    /// when enabled (delivery to the interrupt controller is out of
    /// scope).
    pub fn execute(&mut self, port: Port, ram: &mut RAM, gpu: &mut GPU) -> Result<()> {
        match self.channel(port).sync() {
            Sync::LinkedList => self.linked_list_copy(port, ram, gpu)?,
            _ => self.block_copy(port, ram, gpu)?,
        }

        self.channel_mut(port).done();
        self.complete(port);

        Ok(())
    }

    /// Block transfer, Manual and Request sync modes
    fn block_copy(&mut self, port: Port, ram: &mut RAM, gpu: &mut GPU) -> Result<()> {
        let channel = self.channel(port);

        let step = channel.step();
        let direction = channel.direction();

        // Addresses wrap within RAM and stay word aligned, per hop
        let mut addr = channel.base() & 0x1F_FFFC;

        // Size is always known outside of linked-list sync
        let mut remaining = channel
            .transfer_size()
            .expect("block copy on a linked-list channel");

        log::debug!(
            "DMA{} block copy: {remaining} words at 0x{addr:08X}, {direction:?} {step:?}",
            port as usize
        );

        while remaining > 0 {
            match direction {
                Direction::FromRam => {
                    let word = ram.load32(addr);

                    match port {
                        Port::Gpu => gpu.gp0(word)?,
                        _ => return Err(EmulatorError::Unimplemented("DMA source port")),
                    }
                }
                Direction::ToRam => {
                    let word = match port {
                        // Build the ordering table: each entry points to
                        // the previous one, the head gets the end marker
                        Port::Otc => {
                            if remaining == 1 {
                                0xFF_FFFF
                            } else {
                                addr.wrapping_sub(4) & 0x1F_FFFF
                            }
                        }
                        _ => return Err(EmulatorError::Unimplemented("DMA destination port")),
                    };

                    ram.store32(addr, word);
                }
            }

            addr = match step {
                Step::Increment => addr.wrapping_add(4),
                Step::Decrement => addr.wrapping_sub(4),
            } & 0x1F_FFFC;
            remaining -= 1;
        }

        // The address register tracks the transfer
        self.channel_mut(port).set_base(addr);

        Ok(())
    }

    /// Linked-list transfer: GPU command packets chained through RAM
    fn linked_list_copy(&mut self, port: Port, ram: &mut RAM, gpu: &mut GPU) -> Result<()> {
        let channel = self.channel(port);

        if port != Port::Gpu || channel.direction() != Direction::FromRam {
            return Err(EmulatorError::Unimplemented(
                "linked-list DMA outside of RAM-to-GPU",
            ));
        }

        let mut addr = channel.base() & 0x1F_FFFC;

        log::debug!("DMA{} linked list from 0x{addr:08X}", port as usize);

        loop {
            // The packet header holds the word count in its top byte and
            // the next packet's address in the low 24 bits
            let header = ram.load32(addr);

            let mut remaining = header >> 24;
            while remaining > 0 {
                addr = (addr + 4) & 0x1F_FFFC;

                let command = ram.load32(addr);
                gpu.gp0(command)?;

                remaining -= 1;
            }

            // The end-of-table marker is 0xFFFFFF, but hardware only tests
            // the high bit
            if header & 0x80_0000 != 0 {
                break;
            }

            addr = header & 0x1F_FFFC;
        }

        Ok(())
    }

    /// Completion bookkeeping: latch the channel's IRQ flag when enabled
    fn complete(&mut self, port: Port) {
        let bit = 1u8 << (port as usize);

        if self.channel_irq_en & bit != 0 {
            self.channel_irq_flags |= bit;
        }

        log::trace!(
            "DMA{} complete, irq line {}",
            port as usize,
            self.irq()
        );
    }
}

impl Default for DMA {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn otc_setup(dma: &mut DMA, base: u32, count: u16) {
        let channel = dma.channel_mut(Port::Otc);
        channel.set_base(base);
        channel.set_block_control(u32::from(count));
        // Enable + trigger + decrement, Manual sync, direction ToRam
        channel.set_control((1 << 24) | (1 << 28) | (1 << 1)).unwrap();
    }

    #[test]
    fn test_reset_register_values() {
        let dma = DMA::new();

        assert_eq!(dma.reg(0x70).unwrap(), 0x0765_4321);
        assert_eq!(dma.reg(0x74).unwrap(), 0);
    }

    #[test]
    fn test_register_decomposition() {
        let mut dma = DMA::new();

        // Channel 2 (GPU) registers live at offsets 0x20-0x28
        dma.set_reg(0x20, 0x0012_3456).unwrap();
        dma.set_reg(0x24, 0x0004_0010).unwrap();

        assert_eq!(dma.reg(0x20).unwrap(), 0x0012_3456);
        assert_eq!(dma.reg(0x24).unwrap(), 0x0004_0010);
        assert_eq!(dma.channel(Port::Gpu).base(), 0x0012_3456);
    }

    #[test]
    fn test_unknown_register_offset_is_an_error() {
        let mut dma = DMA::new();

        assert!(matches!(
            dma.reg(0x2C),
            Err(EmulatorError::UnhandledDmaRegister { offset: 0x2C })
        ));
        assert!(matches!(
            dma.set_reg(0x78, 0),
            Err(EmulatorError::UnhandledDmaRegister { offset: 0x78 })
        ));
    }

    #[test]
    fn test_control_write_reports_activation() {
        let mut dma = DMA::new();

        // Request sync + enable on the GPU channel: active immediately
        let port = dma.set_reg(0x28, (1 << 24) | (1 << 9) | 1).unwrap();
        assert_eq!(port, Some(Port::Gpu));

        // Enable without trigger in Manual sync: not active
        let port = dma.set_reg(0x28, 1 << 24).unwrap();
        assert_eq!(port, None);
    }

    #[test]
    fn test_interrupt_register_roundtrip() {
        let mut dma = DMA::new();

        dma.set_interrupt(0x00FF_803F);
        let dicr = dma.interrupt();

        assert_eq!(dicr & 0x3F, 0x3F);
        assert_ne!(dicr & (1 << 15), 0);
        assert_eq!((dicr >> 16) & 0x7F, 0x7F);
        assert_ne!(dicr & (1 << 23), 0);
        // Force IRQ drives the master bit
        assert_ne!(dicr & (1 << 31), 0);
    }

    #[test]
    fn test_interrupt_flags_write_one_to_clear() {
        let mut dma = DMA::new();

        dma.channel_irq_en = 0x7F;
        dma.channel_irq_flags = 0b101;

        // Acknowledge channel 0 only, keep enables
        dma.set_interrupt((0x7F << 16) | (1 << 24));

        assert_eq!(dma.channel_irq_flags, 0b100);
    }

    #[test]
    fn test_master_irq_needs_enable_and_flag() {
        let mut dma = DMA::new();

        dma.channel_irq_flags = 1 << 2;
        assert!(!dma.irq(), "flag alone must not raise the line");

        dma.channel_irq_en = 1 << 2;
        assert!(!dma.irq(), "master enable still off");

        dma.irq_en = true;
        assert!(dma.irq());
    }

    #[test]
    fn test_otc_clear_writes_descending_list() {
        let mut dma = DMA::new();
        let mut ram = RAM::new();
        let mut gpu = GPU::new();

        otc_setup(&mut dma, 0x1000, 8);
        dma.execute(Port::Otc, &mut ram, &mut gpu).unwrap();

        // Entries link downward, last one carries the end marker
        for i in 0..7u32 {
            let addr = 0x1000 - 4 * i;
            assert_eq!(ram.load32(addr), (addr - 4) & 0x1F_FFFF);
        }
        assert_eq!(ram.load32(0x1000 - 4 * 7), 0xFF_FFFF);

        // Channel released
        assert!(!dma.channel(Port::Otc).active());
        assert_eq!(dma.channel(Port::Otc).control() & (1 << 24), 0);
        assert_eq!(dma.channel(Port::Otc).control() & (1 << 28), 0);
    }

    #[test]
    fn test_otc_single_entry_is_end_marker() {
        let mut dma = DMA::new();
        let mut ram = RAM::new();
        let mut gpu = GPU::new();

        otc_setup(&mut dma, 0x2000, 1);
        dma.execute(Port::Otc, &mut ram, &mut gpu).unwrap();

        assert_eq!(ram.load32(0x2000), 0xFF_FFFF);
    }

    #[test]
    fn test_gpu_block_copy_pushes_words_in_order() {
        let mut dma = DMA::new();
        let mut ram = RAM::new();
        let mut gpu = GPU::new();

        // A GP0 quad: opcode word plus four vertices
        let words = [0x2800_00FF, 0x0000_0000, 0x0040_0000, 0x0000_0040, 0x0040_0040];
        for (i, word) in words.iter().enumerate() {
            ram.store32(0x3000 + 4 * i as u32, *word);
        }

        let channel = dma.channel_mut(Port::Gpu);
        channel.set_base(0x3000);
        channel.set_block_control(words.len() as u32);
        // Enable + trigger, FromRam, increment, Manual sync
        channel.set_control((1 << 24) | (1 << 28) | 1).unwrap();

        dma.execute(Port::Gpu, &mut ram, &mut gpu).unwrap();

        // The GPU consumed the whole command: the next word starts fresh
        assert!(gpu.gp0(0x0000_0000).is_ok());

        // The address register walked the transfer
        assert_eq!(dma.channel(Port::Gpu).base(), 0x3000 + 4 * words.len() as u32);
    }

    #[test]
    fn test_linked_list_walks_packets() {
        let mut dma = DMA::new();
        let mut ram = RAM::new();
        let mut gpu = GPU::new();

        // Packet 1 at 0x400: one NOP word, links to 0x500
        ram.store32(0x400, (1 << 24) | 0x500);
        ram.store32(0x404, 0x0000_0000);
        // Packet 2 at 0x500: empty, end marker
        ram.store32(0x500, 0xFF_FFFF);

        let channel = dma.channel_mut(Port::Gpu);
        channel.set_base(0x400);
        // Enable + trigger, FromRam, linked list
        channel
            .set_control((1 << 24) | (1 << 28) | (2 << 9) | 1)
            .unwrap();

        dma.execute(Port::Gpu, &mut ram, &mut gpu).unwrap();

        assert!(!dma.channel(Port::Gpu).active());
    }

    #[test]
    fn test_linked_list_to_ram_is_rejected() {
        let mut dma = DMA::new();
        let mut ram = RAM::new();
        let mut gpu = GPU::new();

        let channel = dma.channel_mut(Port::Gpu);
        channel.set_base(0x400);
        // Linked list with direction ToRam
        channel
            .set_control((1 << 24) | (1 << 28) | (2 << 9))
            .unwrap();

        let result = dma.execute(Port::Gpu, &mut ram, &mut gpu);
        assert!(matches!(result, Err(EmulatorError::Unimplemented(_))));
    }

    #[test]
    fn test_completion_latches_enabled_irq_flag() {
        let mut dma = DMA::new();
        let mut ram = RAM::new();
        let mut gpu = GPU::new();

        // Enable IRQ for channel 6 plus the master enable
        dma.set_interrupt((1 << 23) | (1 << (16 + 6)));

        otc_setup(&mut dma, 0x1000, 4);
        dma.execute(Port::Otc, &mut ram, &mut gpu).unwrap();

        let dicr = dma.interrupt();
        assert_ne!(dicr & (1 << (24 + 6)), 0, "channel 6 flag latched");
        assert_ne!(dicr & (1 << 31), 0, "master IRQ raised");
    }

    #[test]
    fn test_completion_skips_disabled_irq_flag() {
        let mut dma = DMA::new();
        let mut ram = RAM::new();
        let mut gpu = GPU::new();

        otc_setup(&mut dma, 0x1000, 4);
        dma.execute(Port::Otc, &mut ram, &mut gpu).unwrap();

        assert_eq!(dma.interrupt() & (1 << (24 + 6)), 0);
    }
}
