// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across different tests.

#![allow(dead_code, reason = "not every test file uses every helper")]

use std::path::Path;

use glyphbake::{
    GeneratorConfig, GlyphIndex, GlyphSample, RandomRange, Raster, Rgb8,
};
use image::{Rgba, RgbaImage};

/// A fully opaque, fully inked glyph raster.
pub fn solid_glyph(width: u16, height: u16) -> Raster {
    Raster::filled(width, height, Rgb8::new(255, 255, 255))
}

/// An in-memory index with one solid 8x8 sample per label.
pub fn index_with(labels: &[&str]) -> GlyphIndex {
    let mut index = GlyphIndex::new();
    for label in labels {
        index.add(
            *label,
            GlyphSample {
                label: (*label).to_owned(),
                source: None,
                raster: solid_glyph(8, 8),
            },
        );
    }
    index
}

/// A small, fully deterministic configuration: 16 px cells on a 32 px
/// canvas, every sampled range degenerate.
pub fn base_config() -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.layout.cell = 16;
    config.layout.canvas_height = 32;
    config.transform.scale = RandomRange::new(1.0, 1.0);
    config
}

/// Write an opaque white RGBA glyph image, the shape loaders treat as
/// fully inked.
pub fn write_glyph_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    img.save(path).expect("fixture png written");
}

/// Write an opaque single-color RGB image, for background and texture
/// pools.
pub fn write_rgb_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    img.save(path).expect("fixture png written");
}
