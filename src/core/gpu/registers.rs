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

//! GPU register type definitions
//!
//! Types backing the draw-mode, texture-window, drawing-area, display and
//! DMA-direction state that GP0/GP1 commands mutate and the GPUSTAT word
//! reports.

/// Depth of the pixel values in a texture page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureDepth {
    /// 4 bits per pixel (paletted)
    T4Bit = 0,
    /// 8 bits per pixel (paletted)
    T8Bit = 1,
    /// 15 bits per pixel (direct color)
    T15Bit = 2,
}

/// Interlaced output splits each frame in two fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Even lines
    Bottom = 0,
    /// Odd lines
    Top = 1,
}

/// Video output horizontal resolution
///
/// Stored pre-packed in the GPUSTAT layout: bit 0 is "hres 2" (368-pixel
/// mode), bits 1-2 are "hres 1" (256/320/512/640).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalRes(u8);

impl HorizontalRes {
    /// Build from the two GP1(0x08) resolution fields
    pub fn from_fields(hr1: u8, hr2: u8) -> Self {
        let hr = (hr2 & 1) | ((hr1 & 3) << 1);

        Self(hr)
    }

    /// Retrieve the value of bits [18:16] of the status register
    pub fn into_status(self) -> u32 {
        let Self(hr) = self;

        u32::from(hr) << 16
    }
}

/// Video output vertical resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalRes {
    /// 240 lines
    Y240Lines = 0,
    /// 480 lines (interlaced output only)
    Y480Lines = 1,
}

/// Video output timing standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VMode {
    /// NTSC: 480i, 60Hz
    Ntsc = 0,
    /// PAL: 576i, 50Hz
    Pal = 1,
}

/// Display area color depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayDepth {
    /// 15 bits per pixel
    D15Bits = 0,
    /// 24 bits per pixel
    D24Bits = 1,
}

/// Requested DMA direction, reported in GPUSTAT bits [30:29]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaDirection {
    Off = 0,
    Fifo = 1,
    CpuToGp0 = 2,
    VramToCpu = 3,
}

/// Drawing mode configured by GP0(0xE1)
#[derive(Debug, Clone, Copy)]
pub struct DrawMode {
    /// Texture page base X coordinate (4 bits, 64 byte increment)
    pub page_base_x: u8,
    /// Texture page base Y coordinate (1 bit, 256 line increment)
    pub page_base_y: u8,
    /// Semi-transparency blending mode (0-3)
    pub semi_transparency: u8,
    /// Texture page color depth
    pub texture_depth: TextureDepth,
    /// Enable dithering from 24 to 15 bits RGB
    pub dithering: bool,
    /// Allow drawing to the display area
    pub draw_to_display: bool,
    /// Texture disable: draw raw colors instead of sampling
    pub texture_disable: bool,
    /// Mirror textured rectangles along the X axis
    pub rectangle_texture_x_flip: bool,
    /// Mirror textured rectangles along the Y axis
    pub rectangle_texture_y_flip: bool,
}

impl Default for DrawMode {
    fn default() -> Self {
        Self {
            page_base_x: 0,
            page_base_y: 0,
            semi_transparency: 0,
            texture_depth: TextureDepth::T4Bit,
            dithering: false,
            draw_to_display: false,
            texture_disable: false,
            rectangle_texture_x_flip: false,
            rectangle_texture_y_flip: false,
        }
    }
}

/// Drawing area clipping rectangle, GP0(0xE3)/GP0(0xE4)
///
/// Coordinates are inclusive and 10 bits wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawingArea {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

/// Texture window configured by GP0(0xE2), all fields in 8-pixel steps
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureWindow {
    pub x_mask: u8,
    pub y_mask: u8,
    pub x_offset: u8,
    pub y_offset: u8,
}

/// Region of VRAM sent to the video output, GP1(0x05)-GP1(0x07)
#[derive(Debug, Clone, Copy)]
pub struct DisplayRegion {
    /// First displayed column in VRAM (always even)
    pub vram_x_start: u16,
    /// First displayed line in VRAM
    pub vram_y_start: u16,
    /// Display output horizontal start, relative to HSYNC
    pub horiz_start: u16,
    /// Display output horizontal end
    pub horiz_end: u16,
    /// Display output first line, relative to VSYNC
    pub line_start: u16,
    /// Display output last line
    pub line_end: u16,
}

impl Default for DisplayRegion {
    fn default() -> Self {
        Self {
            vram_x_start: 0,
            vram_y_start: 0,
            horiz_start: 0x200,
            horiz_end: 0xC00,
            line_start: 0x10,
            line_end: 0x100,
        }
    }
}

/// Video output mode configured by GP1(0x08)
#[derive(Debug, Clone, Copy)]
pub struct DisplayMode {
    pub hres: HorizontalRes,
    pub vres: VerticalRes,
    pub vmode: VMode,
    pub depth: DisplayDepth,
    pub interlaced: bool,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self {
            hres: HorizontalRes::from_fields(0, 0),
            vres: VerticalRes::Y240Lines,
            vmode: VMode::Ntsc,
            depth: DisplayDepth::D15Bits,
            interlaced: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_res_packing() {
        // hr2 occupies bit 0, hr1 bits 1-2
        assert_eq!(HorizontalRes::from_fields(0, 0).into_status(), 0);
        assert_eq!(HorizontalRes::from_fields(0, 1).into_status(), 1 << 16);
        assert_eq!(HorizontalRes::from_fields(3, 0).into_status(), 6 << 16);
        // Fields wider than their encoding are masked
        assert_eq!(
            HorizontalRes::from_fields(0xFF, 0).into_status(),
            6 << 16
        );
    }

    #[test]
    fn test_display_region_reset_values() {
        let region = DisplayRegion::default();

        assert_eq!(region.horiz_start, 0x200);
        assert_eq!(region.horiz_end, 0xC00);
        assert_eq!(region.line_start, 0x10);
        assert_eq!(region.line_end, 0x100);
    }

    #[test]
    fn test_display_mode_reset_values() {
        let mode = DisplayMode::default();

        assert_eq!(mode.hres.into_status(), 0);
        assert_eq!(mode.vres, VerticalRes::Y240Lines);
        assert_eq!(mode.vmode, VMode::Ntsc);
        assert_eq!(mode.depth, DisplayDepth::D15Bits);
        assert!(!mode.interlaced);
    }
}
