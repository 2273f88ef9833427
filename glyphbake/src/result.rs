// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Records of what a generation run actually did.
//!
//! Every randomly sampled value ends up in [`ResolvedParams`], so a
//! rendered image can be audited or reproduced from its label sidecar
//! alone.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::raster::Raster;
use crate::transform::PerspectiveDirection;

/// The transform parameters sampled for a single glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphParams {
    /// Rotation in degrees.
    pub rotation: f64,
    /// Perspective magnitude in degrees.
    pub perspective: f64,
    /// Edge the perspective warp pushed, if any was applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective_direction: Option<PerspectiveDirection>,
    /// Uniform scale factor.
    pub scale: f64,
    /// Horizontal shear in degrees.
    pub shear: f64,
    /// Remap color, when the color mode produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
    /// Texture image blended into this glyph, per-character mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<PathBuf>,
}

/// One glyph as placed on the assembled canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedGlyph {
    /// The character this glyph renders.
    pub label: String,
    /// Source image the sample was loaded from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Left edge of the glyph cell on the canvas.
    pub x: u16,
    /// Signed vertical offset from the centered baseline.
    pub v_offset: i32,
    /// Margin inserted after this glyph, zero for the last one.
    pub margin_after: i32,
    /// Transform parameters sampled for this glyph.
    pub params: GlyphParams,
}

/// How the background layer was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundParams {
    /// Background image, if one was drawn from the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Flat fill color, when no image was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
    /// Where the text canvas landed on the background.
    pub offset: (u16, u16),
}

/// Everything that was sampled while generating one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParams {
    /// Seed the generator was running under.
    pub seed: u64,
    /// The rendered text.
    pub text: String,
    /// Per-glyph placement and transform records, in text order.
    pub glyphs: Vec<PlacedGlyph>,
    /// Texture blended over the whole assembled text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<PathBuf>,
    /// Background composition record, if backgrounds were enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundParams>,
}

/// A finished image together with its provenance.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// The composited image.
    pub image: Raster,
    /// The text the image renders.
    pub text: String,
    /// Every parameter that was sampled along the way.
    pub params: ResolvedParams,
}

impl GenerationResult {
    /// The labels actually rendered, in canvas order.
    pub fn labels(&self) -> Vec<&str> {
        self.params.glyphs.iter().map(|g| g.label.as_str()).collect()
    }
}
