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

//! GP0 render command port
//!
//! GP0 is a word-oriented state machine. In `Command` mode the top byte of
//! the first word selects a command whose fixed parameter count is known up
//! front; words accumulate in a small buffer and the handler runs once the
//! last parameter arrives. GP0(0xA0) switches the port to `ImageLoad` mode,
//! in which subsequent words are pixel data for the framebuffer.

use super::registers::{TextureDepth, TextureWindow};
use super::GPU;
use crate::core::error::{EmulatorError, Result};

/// Longest GP0 command: a textured shaded quad takes 12 words
const COMMAND_BUFFER_LEN: usize = 12;

/// Fixed-size buffer holding the words of the command in flight
#[derive(Debug, Clone, Copy)]
pub struct CommandBuffer {
    buffer: [u32; COMMAND_BUFFER_LEN],
    /// Number of words queued
    len: u8,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self {
            // Poison value to catch reads of unwritten slots
            buffer: [0xDEAD_BEEF; COMMAND_BUFFER_LEN],
            len: 0,
        }
    }

    /// Empty the buffer
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append a word
    ///
    /// The caller bounds pushes by the command length table, so overflow is
    /// a bug rather than a guest-triggerable condition.
    pub fn push_word(&mut self, word: u32) {
        self.buffer[usize::from(self.len)] = word;
        self.len += 1;
    }

    /// Words queued so far, in arrival order
    pub fn words(&self) -> &[u32] {
        &self.buffer[..usize::from(self.len)]
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for CommandBuffer {
    type Output = u32;

    fn index(&self, index: usize) -> &u32 {
        assert!(
            index < usize::from(self.len),
            "command buffer index out of range: {index} ({})",
            self.len
        );

        &self.buffer[index]
    }
}

/// Interpretation of words arriving on GP0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gp0Mode {
    /// Words are command opcode/parameters
    Command,
    /// Words are image data for an ongoing GP0(0xA0) transfer
    ImageLoad,
}

/// Commands the GP0 port recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gp0Command {
    Nop,
    QuadMonoOpaque,
    QuadTextureBlendOpaque,
    TriShadedOpaque,
    QuadShadedOpaque,
    LoadImage,
    DrawMode,
    TextureWindow,
    DrawingAreaTopLeft,
    DrawingAreaBottomRight,
    DrawingOffset,
    MaskBitSetting,
}

impl Gp0Command {
    /// Look up the command and its total word count for an opcode byte
    fn from_opcode(opcode: u32) -> Option<(Gp0Command, u32)> {
        let command = match opcode {
            0x00 => (Gp0Command::Nop, 1),
            0x28 => (Gp0Command::QuadMonoOpaque, 5),
            0x2C => (Gp0Command::QuadTextureBlendOpaque, 9),
            0x30 => (Gp0Command::TriShadedOpaque, 6),
            0x38 => (Gp0Command::QuadShadedOpaque, 8),
            0xA0 => (Gp0Command::LoadImage, 3),
            0xE1 => (Gp0Command::DrawMode, 1),
            0xE2 => (Gp0Command::TextureWindow, 1),
            0xE3 => (Gp0Command::DrawingAreaTopLeft, 1),
            0xE4 => (Gp0Command::DrawingAreaBottomRight, 1),
            0xE5 => (Gp0Command::DrawingOffset, 1),
            0xE6 => (Gp0Command::MaskBitSetting, 1),
            _ => return None,
        };

        Some(command)
    }
}

impl GPU {
    /// Handle a word written to the GP0 port
    ///
    /// Both the CPU (through the bus) and the DMA engine feed this port;
    /// the two interleave at word granularity with identical effect.
    ///
    /// # Arguments
    ///
    /// * `word` - Command opcode/parameter word, or image data in
    ///   `ImageLoad` mode
    ///
    /// # Errors
    ///
    /// An opcode byte with no entry in the command table is a gap in the
    /// emulator, reported as [`EmulatorError::UnhandledGp0Command`].
    pub fn gp0(&mut self, word: u32) -> Result<()> {
        if self.gp0_words_remaining == 0 {
            // Start of a new command
            let opcode = (word >> 24) & 0xFF;

            let (command, len) = Gp0Command::from_opcode(opcode)
                .ok_or(EmulatorError::UnhandledGp0Command(word))?;

            self.gp0_words_remaining = len;
            self.gp0_pending = command;
            self.gp0_command.clear();
        }

        self.gp0_words_remaining -= 1;

        match self.gp0_mode {
            Gp0Mode::Command => {
                self.gp0_command.push_word(word);

                if self.gp0_words_remaining == 0 {
                    // All parameters received, run the command
                    self.gp0_run_pending();
                }
            }
            Gp0Mode::ImageLoad => {
                // VRAM storage is the renderer's concern, forward the data
                self.renderer_mut().image_word(word);

                if self.gp0_words_remaining == 0 {
                    log::debug!("GP0 image load complete");
                    self.gp0_mode = Gp0Mode::Command;
                }
            }
        }

        Ok(())
    }

    /// Dispatch the fully-buffered command
    fn gp0_run_pending(&mut self) {
        match self.gp0_pending {
            Gp0Command::Nop => (),
            Gp0Command::QuadMonoOpaque
            | Gp0Command::QuadTextureBlendOpaque
            | Gp0Command::TriShadedOpaque
            | Gp0Command::QuadShadedOpaque => self.gp0_draw(),
            Gp0Command::LoadImage => self.gp0_load_image(),
            Gp0Command::DrawMode => self.gp0_draw_mode(),
            Gp0Command::TextureWindow => self.gp0_texture_window(),
            Gp0Command::DrawingAreaTopLeft => self.gp0_drawing_area_top_left(),
            Gp0Command::DrawingAreaBottomRight => self.gp0_drawing_area_bottom_right(),
            Gp0Command::DrawingOffset => self.gp0_drawing_offset(),
            Gp0Command::MaskBitSetting => self.gp0_mask_bit_setting(),
        }
    }

    /// Forward a completed draw command to the renderer
    fn gp0_draw(&mut self) {
        log::trace!(
            "GP0 draw command 0x{:02X} ({} words)",
            self.gp0_command[0] >> 24,
            self.gp0_command.words().len()
        );

        let GPU {
            gp0_command,
            renderer,
            ..
        } = self;

        renderer.draw_command(gp0_command.words());
    }

    /// GP0(0xA0): load an image rectangle into VRAM
    ///
    /// Parameters are destination coordinates and a width/height word; the
    /// pixel data follows on the port itself, two 16-bit pixels per word.
    fn gp0_load_image(&mut self) {
        let res = self.gp0_command[2];

        let width = res & 0xFFFF;
        let height = res >> 16;

        // Pixel count, rounded up to a whole number of words
        let imgsize = (width * height + 1) & !1;

        self.gp0_words_remaining = imgsize / 2;

        log::debug!("GP0 image load: {width}x{height}, {} words", imgsize / 2);

        if self.gp0_words_remaining == 0 {
            // A 0x0 transfer carries no data words
            log::warn!("GP0 image load with zero size");
        } else {
            self.gp0_mode = Gp0Mode::ImageLoad;
        }
    }

    /// GP0(0xE1): draw mode setting
    fn gp0_draw_mode(&mut self) {
        let word = self.gp0_command[0];

        self.draw_mode.page_base_x = (word & 0xF) as u8;
        self.draw_mode.page_base_y = ((word >> 4) & 1) as u8;
        self.draw_mode.semi_transparency = ((word >> 5) & 3) as u8;
        self.draw_mode.texture_depth = match (word >> 7) & 3 {
            0 => TextureDepth::T4Bit,
            1 => TextureDepth::T8Bit,
            2 => TextureDepth::T15Bit,
            depth => {
                log::warn!("GP0 draw mode with reserved texture depth {depth}");
                TextureDepth::T15Bit
            }
        };
        self.draw_mode.dithering = (word >> 9) & 1 != 0;
        self.draw_mode.draw_to_display = (word >> 10) & 1 != 0;
        self.draw_mode.texture_disable = (word >> 11) & 1 != 0;
        self.draw_mode.rectangle_texture_x_flip = (word >> 12) & 1 != 0;
        self.draw_mode.rectangle_texture_y_flip = (word >> 13) & 1 != 0;
    }

    /// GP0(0xE2): texture window setting
    fn gp0_texture_window(&mut self) {
        let word = self.gp0_command[0];

        self.texture_window = TextureWindow {
            x_mask: (word & 0x1F) as u8,
            y_mask: ((word >> 5) & 0x1F) as u8,
            x_offset: ((word >> 10) & 0x1F) as u8,
            y_offset: ((word >> 15) & 0x1F) as u8,
        };
    }

    /// GP0(0xE3): drawing area top-left corner
    fn gp0_drawing_area_top_left(&mut self) {
        let word = self.gp0_command[0];

        self.drawing_area.left = (word & 0x3FF) as u16;
        self.drawing_area.top = ((word >> 10) & 0x3FF) as u16;
    }

    /// GP0(0xE4): drawing area bottom-right corner
    fn gp0_drawing_area_bottom_right(&mut self) {
        let word = self.gp0_command[0];

        self.drawing_area.right = (word & 0x3FF) as u16;
        self.drawing_area.bottom = ((word >> 10) & 0x3FF) as u16;
    }

    /// GP0(0xE5): drawing offset, two sign-extended 11 bit values
    fn gp0_drawing_offset(&mut self) {
        let word = self.gp0_command[0];

        let x = (word & 0x7FF) as u16;
        let y = ((word >> 11) & 0x7FF) as u16;

        // Shift into the top bits then back down to sign extend
        self.drawing_x_offset = ((x << 5) as i16) >> 5;
        self.drawing_y_offset = ((y << 5) as i16) >> 5;
    }

    /// GP0(0xE6): mask bit setting
    fn gp0_mask_bit_setting(&mut self) {
        let word = self.gp0_command[0];

        self.force_set_mask_bit = word & 1 != 0;
        self.preserve_masked_pixels = word & 2 != 0;
    }
}
