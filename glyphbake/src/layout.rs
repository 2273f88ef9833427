// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal assembly of transformed glyphs into one text canvas.

use std::path::PathBuf;

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::raster::Raster;
use crate::result::{GlyphParams, PlacedGlyph};
use crate::rng::RandomState;

/// A glyph that has been through the transform chain and is ready to
/// place: a `cell` x `cell` raster plus its provenance.
#[derive(Debug, Clone)]
pub struct PreparedGlyph {
    /// The character this glyph renders.
    pub label: String,
    /// Source image of the underlying sample, if any.
    pub source: Option<PathBuf>,
    /// Transformed pixels, already fitted to the layout cell.
    pub raster: Raster,
    /// Parameters the transform chain sampled for this glyph.
    pub params: GlyphParams,
}

/// Places glyph cells left to right with sampled jitter.
#[derive(Debug)]
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
}

impl<'a> LayoutEngine<'a> {
    /// A layout engine over the given configuration.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Assemble glyphs onto a fresh canvas.
    ///
    /// The canvas is exactly wide enough for the cells plus the sampled
    /// inter-glyph margins, and `canvas_height` tall. Per glyph this
    /// draws a vertical offset and, for every gap, a horizontal margin;
    /// the draws happen in text order so the sequence is reproducible.
    ///
    /// Fails with [`Error::LayoutOverflow`] if an offset would push a
    /// cell past the top or bottom edge.
    pub fn assemble(
        &self,
        glyphs: &[PreparedGlyph],
        rng: &mut RandomState,
    ) -> Result<(Raster, Vec<PlacedGlyph>)> {
        let cell = i64::from(self.config.cell);
        let height = self.config.canvas_height;
        let baseline = (i64::from(height) - cell) / 2;
        let max_v = i64::from(self.config.max_v_offset);

        let mut placed = Vec::with_capacity(glyphs.len());
        let mut cursor = 0_i64;
        let mut right_edge = cell.max(1);
        for (i, glyph) in glyphs.iter().enumerate() {
            let v_offset = if max_v > 0 {
                rng.randint(-max_v, max_v)
            } else {
                0
            };
            let y = baseline + v_offset;
            if y < 0 || y + cell > i64::from(height) {
                return Err(Error::LayoutOverflow {
                    y,
                    height: self.config.cell,
                    canvas_height: height,
                });
            }

            let margin_after = if i + 1 < glyphs.len() {
                i64::from(self.config.h_margin.sample(rng))
            } else {
                0
            };

            let x = u16::try_from(cursor).map_err(|_| {
                Error::ConfigValidation(format!(
                    "assembled text width {} exceeds the raster limit",
                    cursor + cell
                ))
            })?;
            #[expect(clippy::cast_possible_truncation, reason = "bounded by max_v_offset")]
            let v_offset = v_offset as i32;
            #[expect(clippy::cast_possible_truncation, reason = "sampled from an i32 range")]
            let margin_after_i32 = margin_after as i32;
            placed.push(PlacedGlyph {
                label: glyph.label.clone(),
                source: glyph.source.clone(),
                x,
                v_offset,
                margin_after: margin_after_i32,
                params: glyph.params.clone(),
            });

            right_edge = right_edge.max(cursor + cell);
            cursor += cell + margin_after;
            if cursor < 0 {
                // Validation bounds margins below one cell of overlap, so
                // the cursor can only go negative through a misuse of the
                // engine with an unvalidated config.
                return Err(Error::ConfigValidation(
                    "inter-glyph margins moved the layout cursor before the origin".into(),
                ));
            }
        }

        let width = u16::try_from(right_edge).map_err(|_| {
            Error::ConfigValidation(format!(
                "assembled text width {right_edge} exceeds the raster limit"
            ))
        })?;
        let mut canvas = Raster::new(width, height);
        for (glyph, record) in glyphs.iter().zip(&placed) {
            canvas.blend_over(
                &glyph.raster,
                i64::from(record.x),
                baseline + i64::from(record.v_offset),
            );
        }
        Ok((canvas, placed))
    }
}
