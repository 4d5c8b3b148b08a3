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

//! GPU protocol tests

use super::*;
use crate::core::error::EmulatorError;
use std::cell::RefCell;
use std::rc::Rc;

/// Renderer that records everything it receives
#[derive(Default)]
struct Recording {
    draw_commands: Vec<Vec<u32>>,
    image_words: Vec<u32>,
    mode_changes: usize,
}

struct RecordingRenderer(Rc<RefCell<Recording>>);

impl Renderer for RecordingRenderer {
    fn draw_command(&mut self, command: &[u32]) {
        self.0.borrow_mut().draw_commands.push(command.to_vec());
    }

    fn image_word(&mut self, word: u32) {
        self.0.borrow_mut().image_words.push(word);
    }

    fn display_mode_changed(&mut self, _mode: &DisplayMode) {
        self.0.borrow_mut().mode_changes += 1;
    }
}

fn gpu_with_recorder() -> (GPU, Rc<RefCell<Recording>>) {
    let recording = Rc::new(RefCell::new(Recording::default()));
    let mut gpu = GPU::new();
    gpu.set_renderer(Box::new(RecordingRenderer(recording.clone())));
    (gpu, recording)
}

// ========== Status word ==========

#[test]
fn test_status_ready_bits_after_reset() {
    let mut gpu = GPU::new();
    gpu.gp1(0x0000_0000).unwrap();

    let status = gpu.status();

    // Ready-to-receive-command, ready-to-send-VRAM, ready-to-receive-DMA
    assert_ne!(status & (1 << 26), 0);
    assert_ne!(status & (1 << 27), 0);
    assert_ne!(status & (1 << 28), 0);

    // DMA direction off, so no DMA request
    assert_eq!((status >> 29) & 3, 0);
    assert_eq!(status & (1 << 25), 0);
}

#[test]
fn test_status_dma_request_mirrors_direction() {
    let mut gpu = GPU::new();
    gpu.gp1(0x0000_0000).unwrap();

    // CpuToGp0: bit 25 mirrors bit 28
    gpu.gp1(0x0400_0002).unwrap();
    let status = gpu.status();
    assert_eq!((status >> 25) & 1, (status >> 28) & 1);
    assert_eq!((status >> 29) & 3, 2);

    // VramToCpu: bit 25 mirrors bit 27
    gpu.gp1(0x0400_0003).unwrap();
    let status = gpu.status();
    assert_eq!((status >> 25) & 1, (status >> 27) & 1);

    // Fifo: bit 25 is forced high
    gpu.gp1(0x0400_0001).unwrap();
    assert_ne!(gpu.status() & (1 << 25), 0);
}

#[test]
fn test_status_draw_mode_bits() {
    let mut gpu = GPU::new();

    // Page base X=5, Y=1, semi-transparency 2, 8-bit textures, dithering
    let word = 5 | (1 << 4) | (2 << 5) | (1 << 7) | (1 << 9);
    gpu.gp0(0xE100_0000 | word).unwrap();

    let status = gpu.status();
    assert_eq!(status & 0xF, 5);
    assert_eq!((status >> 4) & 1, 1);
    assert_eq!((status >> 5) & 3, 2);
    assert_eq!((status >> 7) & 3, 1);
    assert_eq!((status >> 9) & 1, 1);
}

#[test]
fn test_status_display_disabled_after_reset() {
    let mut gpu = GPU::new();
    gpu.gp1(0x0000_0000).unwrap();

    assert_ne!(gpu.status() & (1 << 23), 0);

    gpu.gp1(0x0300_0000).unwrap();
    assert_eq!(gpu.status() & (1 << 23), 0);
}

// ========== GP0 command accumulation ==========

#[test]
fn test_gp0_nop_produces_nothing() {
    let (mut gpu, recording) = gpu_with_recorder();

    gpu.gp0(0x0000_0000).unwrap();

    assert!(recording.borrow().draw_commands.is_empty());
}

#[test]
fn test_gp0_quad_forwarded_after_five_words() {
    let (mut gpu, recording) = gpu_with_recorder();

    let words = [0x2800_FFFF, 0x0001_0001, 0x0040_0001, 0x0001_0040, 0x0040_0040];
    for (i, word) in words.iter().enumerate() {
        gpu.gp0(*word).unwrap();

        let sent = recording.borrow().draw_commands.len();
        if i < 4 {
            assert_eq!(sent, 0, "command forwarded before all parameters arrived");
        }
    }

    let recording = recording.borrow();
    assert_eq!(recording.draw_commands.len(), 1);
    assert_eq!(recording.draw_commands[0], words);
}

#[test]
fn test_gp0_shaded_triangle_length() {
    let (mut gpu, recording) = gpu_with_recorder();

    // 0x30 takes 6 words: three color/vertex pairs
    for word in [
        0x3000_00FF,
        0x0000_0000,
        0x00FF_0000u32,
        0x0000_0040,
        0x0000_FF00,
        0x0040_0000,
    ] {
        gpu.gp0(word).unwrap();
    }

    assert_eq!(recording.borrow().draw_commands.len(), 1);
    assert_eq!(recording.borrow().draw_commands[0].len(), 6);
}

#[test]
fn test_gp0_unknown_opcode_is_an_error() {
    let mut gpu = GPU::new();

    let result = gpu.gp0(0x7F00_0000);
    assert!(matches!(result, Err(EmulatorError::UnhandledGp0Command(_))));
}

// ========== Image load ==========

#[test]
fn test_image_load_word_count() {
    let (mut gpu, recording) = gpu_with_recorder();

    // 4x2 pixels = 8 pixels = 4 words of data
    gpu.gp0(0xA000_0000).unwrap();
    gpu.gp0(0x0000_0000).unwrap(); // destination
    gpu.gp0(0x0002_0004).unwrap(); // height=2, width=4

    for word in 0..4 {
        gpu.gp0(0x1111_0000 + word).unwrap();
    }

    assert_eq!(recording.borrow().image_words.len(), 4);

    // Port is back in command mode: a NOP is not consumed as image data
    gpu.gp0(0x0000_0000).unwrap();
    assert_eq!(recording.borrow().image_words.len(), 4);
}

#[test]
fn test_image_load_rounds_odd_pixel_count_up() {
    let (mut gpu, recording) = gpu_with_recorder();

    // 3x1 pixels = 3 pixels, rounded up to 2 words
    gpu.gp0(0xA000_0000).unwrap();
    gpu.gp0(0x0000_0000).unwrap();
    gpu.gp0(0x0001_0003).unwrap();

    gpu.gp0(0xAAAA_BBBB).unwrap();
    gpu.gp0(0xCCCC_DDDD).unwrap();

    assert_eq!(recording.borrow().image_words.len(), 2);
    assert_eq!(gpu.gp0_mode, Gp0Mode::Command);
}

// ========== GP1 ==========

#[test]
fn test_gp1_reset_restores_defaults() {
    let mut gpu = GPU::new();

    gpu.gp0(0xE100_01FF).unwrap();
    gpu.gp1(0x0400_0002).unwrap();
    gpu.gp1(0x0300_0000).unwrap();

    gpu.gp1(0x0000_0000).unwrap();

    assert_eq!(gpu.dma_direction, DmaDirection::Off);
    assert!(gpu.display_disabled);
    assert_eq!(gpu.draw_mode.page_base_x, 0);
    assert_eq!(gpu.display_region.horiz_start, 0x200);
    assert_eq!(gpu.display_region.line_end, 0x100);
}

#[test]
fn test_gp1_reset_flushes_gp0_command_in_flight() {
    let (mut gpu, recording) = gpu_with_recorder();

    // Two of five quad words, then reset
    gpu.gp0(0x2800_FFFF).unwrap();
    gpu.gp0(0x0001_0001).unwrap();
    gpu.gp1(0x0000_0000).unwrap();

    // A full NOP must be accepted immediately, not eaten as a parameter
    gpu.gp0(0x0000_0000).unwrap();
    assert!(recording.borrow().draw_commands.is_empty());
}

#[test]
fn test_gp1_acknowledge_irq() {
    let mut gpu = GPU::new();
    gpu.interrupt = true;

    gpu.gp1(0x0200_0000).unwrap();

    assert!(!gpu.interrupt);
    assert_eq!(gpu.status() & (1 << 24), 0);
}

#[test]
fn test_gp1_display_vram_start_drops_x_lsb() {
    let mut gpu = GPU::new();

    gpu.gp1(0x0500_0000 | 0x3FF | (5 << 10)).unwrap();

    assert_eq!(gpu.display_region.vram_x_start, 0x3FE);
    assert_eq!(gpu.display_region.vram_y_start, 5);
}

#[test]
fn test_gp1_display_mode_notifies_renderer() {
    let (mut gpu, recording) = gpu_with_recorder();

    gpu.gp1(0x0800_0001).unwrap();

    assert_eq!(recording.borrow().mode_changes, 1);
    // hres1 = 1 → status bits [18:16] = 0b010
    assert_eq!((gpu.status() >> 16) & 7, 2);
}

#[test]
fn test_gp1_display_mode_rejects_bit7() {
    let mut gpu = GPU::new();

    let result = gpu.gp1(0x0800_0080);
    assert!(matches!(
        result,
        Err(EmulatorError::UnsupportedDisplayMode(_))
    ));
}

#[test]
fn test_gp1_unknown_opcode_is_an_error() {
    let mut gpu = GPU::new();

    let result = gpu.gp1(0xFF00_0000);
    assert!(matches!(result, Err(EmulatorError::UnhandledGp1Command(_))));
}

#[test]
fn test_gpuread_is_stubbed() {
    let gpu = GPU::new();
    assert_eq!(gpu.read(), 0);
}
