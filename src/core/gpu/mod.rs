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

//! GPU command-stream front end
//!
//! This module implements the register-level protocol of the Sony CXD8561
//! GPU: the GP0 render command port, the GP1 display control port, and the
//! GPUSTAT status word. Rasterization itself is out of scope; completed
//! draw commands and image-load data are forwarded to an external
//! [`Renderer`] sink.
//!
//! # Ports
//!
//! | Port | Access | Meaning                       |
//! |------|--------|-------------------------------|
//! | +0   | write  | GP0: render commands and data |
//! | +0   | read   | GPUREAD (stubbed to 0)        |
//! | +4   | write  | GP1: display control          |
//! | +4   | read   | GPUSTAT status word           |
//!
//! # References
//!
//! - [PSX-SPX: GPU](http://problemkaputt.de/psx-spx.htm#gpu)

// Module declarations
mod gp0;
mod gp1;
mod registers;
#[cfg(test)]
mod tests;

// Public re-exports
pub use gp0::{CommandBuffer, Gp0Mode};
pub use registers::*;

use gp0::Gp0Command;

/// External sink for the GPU command stream
///
/// The GPU itself only speaks the register protocol; everything that needs
/// pixels (a software rasterizer, a GL backend, a test recorder) implements
/// this trait and is attached with [`GPU::set_renderer`].
///
/// Implementations must not call back into the emulator core.
pub trait Renderer {
    /// A complete draw command: the opcode word followed by its parameters
    fn draw_command(&mut self, command: &[u32]);

    /// One word of image data streamed by GP0(0xA0)
    fn image_word(&mut self, word: u32);

    /// The display mode changed via GP1
    fn display_mode_changed(&mut self, mode: &DisplayMode);
}

/// Renderer that discards everything, used when no sink is attached
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_command(&mut self, _command: &[u32]) {}

    fn image_word(&mut self, _word: u32) {}

    fn display_mode_changed(&mut self, _mode: &DisplayMode) {}
}

/// GPU register state and GP0/GP1 protocol machine
pub struct GPU {
    /// Drawing mode (GP0 0xE1)
    pub(crate) draw_mode: DrawMode,
    /// Force the mask bit to 1 when writing pixels
    pub(crate) force_set_mask_bit: bool,
    /// Don't overwrite pixels that have the mask bit set
    pub(crate) preserve_masked_pixels: bool,
    /// Drawing area clip rectangle (GP0 0xE3/0xE4)
    pub(crate) drawing_area: DrawingArea,
    /// Signed offset applied to all vertices (GP0 0xE5)
    pub(crate) drawing_x_offset: i16,
    pub(crate) drawing_y_offset: i16,
    /// Texture window (GP0 0xE2)
    pub(crate) texture_window: TextureWindow,
    /// Displayed VRAM region and output ranges (GP1 0x05-0x07)
    pub(crate) display_region: DisplayRegion,
    /// Video output mode (GP1 0x08)
    pub(crate) display_mode: DisplayMode,
    /// Currently displayed field (interlaced output)
    pub(crate) field: Field,
    /// True when the display output is off (GP1 0x03)
    pub(crate) display_disabled: bool,
    /// GPU interrupt latch, acknowledged with GP1(0x02)
    pub(crate) interrupt: bool,
    /// Requested DMA direction (GP1 0x04)
    pub(crate) dma_direction: DmaDirection,

    /// Buffer accumulating the current GP0 command's words
    pub(crate) gp0_command: CommandBuffer,
    /// Words still expected by the current GP0 command
    pub(crate) gp0_words_remaining: u32,
    /// Command currently being accumulated
    pub(crate) gp0_pending: Gp0Command,
    /// Whether GP0 words are command parameters or image data
    pub(crate) gp0_mode: Gp0Mode,

    /// Command sink
    renderer: Box<dyn Renderer>,
}

impl GPU {
    /// Create a GPU in its reset state with no renderer attached
    pub fn new() -> Self {
        Self {
            draw_mode: DrawMode::default(),
            force_set_mask_bit: false,
            preserve_masked_pixels: false,
            drawing_area: DrawingArea::default(),
            drawing_x_offset: 0,
            drawing_y_offset: 0,
            texture_window: TextureWindow::default(),
            display_region: DisplayRegion::default(),
            display_mode: DisplayMode::default(),
            field: Field::Top,
            display_disabled: true,
            interrupt: false,
            dma_direction: DmaDirection::Off,
            gp0_command: CommandBuffer::new(),
            gp0_words_remaining: 0,
            gp0_pending: Gp0Command::Nop,
            gp0_mode: Gp0Mode::Command,
            renderer: Box::new(NullRenderer),
        }
    }

    /// Attach a command sink, replacing the previous one
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = renderer;
    }

    pub(crate) fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    /// Compose the GPUSTAT register
    ///
    /// Bits 26 (ready for command), 27 (ready to send VRAM) and 28 (ready
    /// for DMA block) are tied high since every transfer completes
    /// synchronously. Bit 25 mirrors the ready bit selected by the DMA
    /// direction.
    pub fn status(&self) -> u32 {
        let mut r = 0u32;

        r |= u32::from(self.draw_mode.page_base_x);
        r |= u32::from(self.draw_mode.page_base_y) << 4;
        r |= u32::from(self.draw_mode.semi_transparency) << 5;
        r |= (self.draw_mode.texture_depth as u32) << 7;
        r |= u32::from(self.draw_mode.dithering) << 9;
        r |= u32::from(self.draw_mode.draw_to_display) << 10;
        r |= u32::from(self.force_set_mask_bit) << 11;
        r |= u32::from(self.preserve_masked_pixels) << 12;
        r |= (self.field as u32) << 13;
        // Bit 14: distortion mode, not supported
        r |= u32::from(self.draw_mode.texture_disable) << 15;
        r |= self.display_mode.hres.into_status();
        r |= (self.display_mode.vres as u32) << 19;
        r |= (self.display_mode.vmode as u32) << 20;
        r |= (self.display_mode.depth as u32) << 21;
        r |= u32::from(self.display_mode.interlaced) << 22;
        r |= u32::from(self.display_disabled) << 23;
        r |= u32::from(self.interrupt) << 24;

        // Transfers run to completion, so the GPU is always ready: to
        // receive a command (26), to send VRAM data (27), to receive a DMA
        // block (28)
        r |= 1 << 26;
        r |= 1 << 27;
        r |= 1 << 28;

        r |= (self.dma_direction as u32) << 29;

        // Bit 31: currently drawn line parity, stubbed to "even"

        // Bit 25 follows the ready flag the requested direction cares about
        let dma_request = match self.dma_direction {
            DmaDirection::Off => 0,
            DmaDirection::Fifo => 1,
            DmaDirection::CpuToGp0 => (r >> 28) & 1,
            DmaDirection::VramToCpu => (r >> 27) & 1,
        };
        r |= dma_request << 25;

        r
    }

    /// Read from the GPUREAD port
    ///
    /// VRAM readback is not modeled, the register reads as zero.
    pub fn read(&self) -> u32 {
        log::trace!("GPUREAD");

        0
    }
}

impl Default for GPU {
    fn default() -> Self {
        Self::new()
    }
}
