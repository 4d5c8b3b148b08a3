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

//! GP1 display control port
//!
//! Unlike GP0, every GP1 command is a single word: the top byte selects
//! the operation, the low bits carry its parameters.

use super::gp0::Gp0Mode;
use super::registers::{
    DisplayDepth, DisplayMode, DisplayRegion, DmaDirection, DrawMode, DrawingArea, Field,
    HorizontalRes, TextureWindow, VMode, VerticalRes,
};
use super::GPU;
use crate::core::error::{EmulatorError, Result};

impl GPU {
    /// Handle a word written to the GP1 port
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::UnhandledGp1Command`] for unknown opcodes
    /// - [`EmulatorError::UnsupportedDisplayMode`] for GP1(0x08) with bit 7
    pub fn gp1(&mut self, word: u32) -> Result<()> {
        let opcode = (word >> 24) & 0xFF;

        match opcode {
            0x00 => self.gp1_reset(),
            0x01 => self.gp1_reset_command_buffer(),
            0x02 => self.gp1_acknowledge_irq(),
            0x03 => self.gp1_display_enable(word),
            0x04 => self.gp1_dma_direction(word),
            0x05 => self.gp1_display_vram_start(word),
            0x06 => self.gp1_display_horizontal_range(word),
            0x07 => self.gp1_display_vertical_range(word),
            0x08 => return self.gp1_display_mode(word),
            _ => return Err(EmulatorError::UnhandledGp1Command(word)),
        }

        Ok(())
    }

    /// GP1(0x00): soft reset
    ///
    /// Restores every register to its power-on value and drops whatever GP0
    /// command was in flight. The attached renderer survives and is told
    /// about the new display mode.
    fn gp1_reset(&mut self) {
        log::debug!("GP1 reset");

        self.interrupt = false;
        self.draw_mode = DrawMode::default();
        self.force_set_mask_bit = false;
        self.preserve_masked_pixels = false;
        self.drawing_area = DrawingArea::default();
        self.drawing_x_offset = 0;
        self.drawing_y_offset = 0;
        self.texture_window = TextureWindow::default();
        self.display_region = DisplayRegion::default();
        self.display_mode = DisplayMode::default();
        self.field = Field::Top;
        self.display_disabled = true;
        self.dma_direction = DmaDirection::Off;

        self.gp1_reset_command_buffer();

        let GPU {
            display_mode,
            renderer,
            ..
        } = self;
        renderer.display_mode_changed(display_mode);
    }

    /// GP1(0x01): drop the GP0 command in flight
    fn gp1_reset_command_buffer(&mut self) {
        self.gp0_command.clear();
        self.gp0_words_remaining = 0;
        self.gp0_mode = Gp0Mode::Command;
    }

    /// GP1(0x02): acknowledge the GPU interrupt
    fn gp1_acknowledge_irq(&mut self) {
        self.interrupt = false;
    }

    /// GP1(0x03): display output on/off
    fn gp1_display_enable(&mut self, word: u32) {
        self.display_disabled = word & 1 != 0;
    }

    /// GP1(0x04): DMA direction
    fn gp1_dma_direction(&mut self, word: u32) {
        self.dma_direction = match word & 3 {
            0 => DmaDirection::Off,
            1 => DmaDirection::Fifo,
            2 => DmaDirection::CpuToGp0,
            3 => DmaDirection::VramToCpu,
            _ => unreachable!(),
        };
    }

    /// GP1(0x05): first displayed column/line in VRAM
    fn gp1_display_vram_start(&mut self, word: u32) {
        // Halfword aligned: the LSB of the X start is dropped
        self.display_region.vram_x_start = (word & 0x3FE) as u16;
        self.display_region.vram_y_start = ((word >> 10) & 0x1FF) as u16;
    }

    /// GP1(0x06): display output horizontal range
    fn gp1_display_horizontal_range(&mut self, word: u32) {
        self.display_region.horiz_start = (word & 0xFFF) as u16;
        self.display_region.horiz_end = ((word >> 12) & 0xFFF) as u16;
    }

    /// GP1(0x07): display output vertical range
    fn gp1_display_vertical_range(&mut self, word: u32) {
        self.display_region.line_start = (word & 0x3FF) as u16;
        self.display_region.line_end = ((word >> 10) & 0x3FF) as u16;
    }

    /// GP1(0x08): display mode
    fn gp1_display_mode(&mut self, word: u32) -> Result<()> {
        if word & 0x80 != 0 {
            // Distortion/"reverse" mode, never used by commercial software
            return Err(EmulatorError::UnsupportedDisplayMode(word));
        }

        let hr1 = (word & 3) as u8;
        let hr2 = ((word >> 6) & 1) as u8;

        self.display_mode = DisplayMode {
            hres: HorizontalRes::from_fields(hr1, hr2),
            vres: if word & 0x4 != 0 {
                VerticalRes::Y480Lines
            } else {
                VerticalRes::Y240Lines
            },
            vmode: if word & 0x8 != 0 { VMode::Pal } else { VMode::Ntsc },
            depth: if word & 0x10 != 0 {
                DisplayDepth::D24Bits
            } else {
                DisplayDepth::D15Bits
            },
            interlaced: word & 0x20 != 0,
        };

        log::debug!("GP1 display mode 0x{word:08X}");

        let GPU {
            display_mode,
            renderer,
            ..
        } = self;
        renderer.display_mode_changed(display_mode);

        Ok(())
    }
}
