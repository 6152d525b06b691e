// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Placeholder images sized and coloured for a region role.

use super::insert::ImageRole;
use crate::error::{CmsError, CmsResult};
use crate::util::ids::random_bytes;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

const DOT_COUNT: usize = 20;
const DOT_ALPHA: f32 = 0.1;
const SHADOW_ALPHA: f32 = 0.5;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

pub fn dimensions(role: ImageRole) -> (u32, u32) {
    match role {
        ImageRole::HeaderTop => (1200, 120),
        ImageRole::Hero => (800, 400),
        _ => (600, 300),
    }
}

pub fn gradient(role: ImageRole) -> ([u8; 3], [u8; 3]) {
    match role {
        ImageRole::HeaderTop => ([0x1e, 0x3c, 0x72], [0x2a, 0x52, 0x98]),
        ImageRole::Hero | ImageRole::PolicyDetail | ImageRole::Generic => {
            ([0x66, 0x7e, 0xea], [0x76, 0x4b, 0xa2])
        }
        ImageRole::Candidate => ([0xf0, 0x93, 0xfb], [0xf5, 0x57, 0x6c]),
        ImageRole::Policy | ImageRole::VisionDetail => ([0x20, 0xbf, 0x6b], [0x26, 0xd0, 0xce]),
        ImageRole::Vision => ([0xff, 0x9a, 0x9e], [0xfe, 0xcf, 0xef]),
    }
}

/// Renders the test image for `role` and returns it PNG-encoded.
pub fn render_test_image(role: ImageRole) -> CmsResult<Vec<u8>> {
    let (width, height) = dimensions(role);
    let (from, to) = gradient(role);
    let mut canvas = RgbImage::from_fn(width, height, |x, _| {
        let t = if width > 1 {
            x as f32 / (width - 1) as f32
        } else {
            0.0
        };
        Rgb([
            lerp(from[0], to[0], t),
            lerp(from[1], to[1], t),
            lerp(from[2], to[2], t),
        ])
    });

    scatter_dots(&mut canvas);

    let title = format!("TEST {} IMAGE", role.as_str().to_ascii_uppercase());
    let subtitle = format!("{}X{}", width, height);
    let title_scale = (height / 8 / GLYPH_HEIGHT).max(1);
    let subtitle_scale = (height / 12 / GLYPH_HEIGHT).max(1);
    let center = height as i64 / 2;
    draw_centered(
        &mut canvas,
        &title,
        center - 10 - (GLYPH_HEIGHT * title_scale) as i64,
        title_scale,
    );
    draw_centered(
        &mut canvas,
        &subtitle,
        center + 20 - (GLYPH_HEIGHT * subtitle_scale) as i64,
        subtitle_scale,
    );

    let mut bytes = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| CmsError::validation(format!("Test image could not be encoded: {}", err)))?;
    Ok(bytes)
}

fn lerp(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 + (to as f32 - from as f32) * t).round() as u8
}

fn blend(canvas: &mut RgbImage, x: i64, y: i64, color: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for channel in 0..3 {
        let under = pixel.0[channel] as f32;
        pixel.0[channel] = (under + (color[channel] as f32 - under) * alpha).round() as u8;
    }
}

fn scatter_dots(canvas: &mut RgbImage) {
    let noise = random_bytes::<{ DOT_COUNT * 5 }>();
    for dot in noise.chunks_exact(5) {
        let cx = u16::from_le_bytes([dot[0], dot[1]]) as i64 % canvas.width() as i64;
        let cy = u16::from_le_bytes([dot[2], dot[3]]) as i64 % canvas.height() as i64;
        let radius = (dot[4] % 4) as i64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    blend(canvas, cx + dx, cy + dy, [255, 255, 255], DOT_ALPHA);
                }
            }
        }
    }
}

fn text_width(text: &str, scale: u32) -> i64 {
    let count = text.chars().count() as i64;
    if count == 0 {
        return 0;
    }
    (count * (GLYPH_WIDTH as i64 + 1) - 1) * scale as i64
}

fn draw_centered(canvas: &mut RgbImage, text: &str, top: i64, scale: u32) {
    let left = (canvas.width() as i64 - text_width(text, scale)) / 2;
    let offset = scale.div_ceil(2) as i64;
    draw_text(canvas, text, left + offset, top + offset, scale, [0, 0, 0], SHADOW_ALPHA);
    draw_text(canvas, text, left, top, scale, [255, 255, 255], 1.0);
}

fn draw_text(
    canvas: &mut RgbImage,
    text: &str,
    left: i64,
    top: i64,
    scale: u32,
    color: [u8; 3],
    alpha: f32,
) {
    let scale = scale as i64;
    let advance = (GLYPH_WIDTH as i64 + 1) * scale;
    for (index, ch) in text.chars().enumerate() {
        let origin_x = left + index as i64 * advance;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for column in 0..GLYPH_WIDTH as i64 {
                if bits & (1 << (GLYPH_WIDTH as i64 - 1 - column)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        blend(
                            canvas,
                            origin_x + column * scale + sx,
                            top + row as i64 * scale + sy,
                            color,
                            alpha,
                        );
                    }
                }
            }
        }
    }
}

/// 5x7 bitmap glyphs; rows top to bottom, bit 4 is the leftmost column.
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        _ => [0; 7],
    }
}
