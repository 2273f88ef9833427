// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyphbake synthesizes labeled text images from per-character glyph
//! samples, for training OCR models on scripts where real labeled data
//! is scarce.
//!
//! The pipeline is a straight line: a [`GlyphIndex`] maps character
//! labels to sample rasters, a [`GlyphTransformer`] warps and colors one
//! glyph at a time, a [`LayoutEngine`] assembles the transformed glyphs
//! into a text canvas, and a [`Compositor`] puts that canvas on a
//! background. [`TextBaker`] drives the stages off one seeded
//! [`RandomState`], which is what makes output reproducible:
//!
//! ```no_run
//! use glyphbake::{GeneratorConfig, TextBaker};
//!
//! # fn run() -> glyphbake::Result<()> {
//! let config = GeneratorConfig::from_file("config.toml")?;
//! let mut baker = TextBaker::new(config)?;
//! let result = baker.generate("hello")?;
//! baker.save(&result, None, None)?;
//! # Ok(())
//! # }
//! ```

mod baker;
mod compose;
mod config;
mod error;
mod geom;
mod index;
mod layout;
mod raster;
mod result;
mod rng;
mod transform;

pub use baker::TextBaker;
pub use compose::{cover_resize, crop_to_text, Compositor};
pub use config::{
    config_from_json_str, BackgroundConfig, BackgroundFit, ColorConfig, ColorMode, DatasetConfig,
    GeneratorConfig, LabelFormat, LayoutConfig, OutputConfig, OutputFormat, Placement, RandomRange,
    Seed, TextLength, TextureConfig, TextureGranularity, TransformConfig,
};
pub use error::{Error, Result};
pub use geom::Homography;
pub use index::{GlyphIndex, GlyphSample};
pub use layout::{LayoutEngine, PreparedGlyph};
pub use raster::{luma, Raster, Rgb8};
pub use result::{BackgroundParams, GenerationResult, GlyphParams, PlacedGlyph, ResolvedParams};
pub use rng::{RandomState, DEFAULT_SEED};
pub use transform::{
    blend_texture, fit_to_cell, one_sided_perspective, remap_color, rescale, rotate, shear,
    GlyphTransformer, PerspectiveDirection,
};
