// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-glyph geometric and photometric transforms.
//!
//! Geometry runs first (rotate, perspective, scale, shear), photometry
//! last (color remap, texture blend): blending operates in the final
//! pixel geometry and must not be re-warped afterward. Every step moves
//! the glyph's mask in lock-step with its pixels.

use std::path::{Path, PathBuf};

use kurbo::{Affine, Point};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{ColorConfig, ColorMode, TextureConfig, TextureGranularity, TransformConfig};
use crate::error::{Error, Result};
use crate::geom::Homography;
use crate::raster::{luma, Raster, Rgb8};
use crate::result::GlyphParams;
use crate::rng::RandomState;

/// Which edge the one-sided perspective warp pushes inward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerspectiveDirection {
    /// Top-left corner moves right.
    Left,
    /// Top-right corner moves left.
    Right,
    /// Left edge squeezes vertically.
    Top,
    /// Right edge squeezes vertically.
    Bottom,
}

const DIRECTIONS: [PerspectiveDirection; 4] = [
    PerspectiveDirection::Left,
    PerspectiveDirection::Right,
    PerspectiveDirection::Top,
    PerspectiveDirection::Bottom,
];

/// Applies the configured transform chain to single glyphs.
#[derive(Debug)]
pub struct GlyphTransformer<'a> {
    transform: &'a TransformConfig,
    color: &'a ColorConfig,
    texture: &'a TextureConfig,
    cell: u16,
}

impl<'a> GlyphTransformer<'a> {
    /// Bundle the configuration a transform pass needs.
    pub fn new(
        transform: &'a TransformConfig,
        color: &'a ColorConfig,
        texture: &'a TextureConfig,
        cell: u16,
    ) -> Self {
        Self {
            transform,
            color,
            texture,
            cell,
        }
    }

    /// Transform one glyph sample, recording every sampled parameter.
    ///
    /// `textures` is the pool used for per-character texture draws; it is
    /// ignored unless per-character texturing is enabled.
    pub fn apply(
        &self,
        raster: &Raster,
        textures: &[PathBuf],
        rng: &mut RandomState,
    ) -> Result<(Raster, GlyphParams)> {
        let mut glyph = raster
            .crop_to_mask()
            .ok_or_else(|| Error::Transform("glyph sample has an empty mask".into()))?;

        let rotation = self.transform.rotation.sample(rng);
        if rotation != 0.0 {
            glyph = rotate(&glyph, rotation)?;
        }

        let perspective = self.transform.perspective.sample(rng);
        let direction = if perspective != 0.0 {
            let dir = *rng
                .choice(&DIRECTIONS)
                .expect("direction set is non-empty");
            glyph = one_sided_perspective(&glyph, perspective, dir)?;
            Some(dir)
        } else {
            None
        };

        // Warps pad the canvas; re-crop so scaling and cell fitting work
        // on the actual ink extent.
        if rotation != 0.0 || direction.is_some() {
            glyph = glyph
                .crop_to_mask()
                .ok_or_else(|| Error::Transform("glyph mask vanished during warp".into()))?;
        }

        let scale = self.transform.scale.sample(rng);
        if scale <= 0.0 {
            return Err(Error::Transform(format!(
                "sampled scale factor {scale} would produce a zero-area glyph"
            )));
        }
        if scale != 1.0 {
            glyph = rescale(&glyph, scale)?;
        }

        let shear_angle = self.transform.shear.sample(rng);
        if shear_angle != 0.0 {
            glyph = shear(&glyph, shear_angle)?;
        }

        glyph = fit_to_cell(&glyph, self.cell)?;

        let color = match self.color.mode {
            ColorMode::Original => None,
            ColorMode::Fixed => self.color.fixed,
            ColorMode::Random => Some([
                self.color.range_r.sample(rng),
                self.color.range_g.sample(rng),
                self.color.range_b.sample(rng),
            ]),
        };
        if let Some(rgb) = color {
            remap_color(&mut glyph, rgb);
        }

        let mut texture_source = None;
        if self.texture.enabled && self.texture.granularity == TextureGranularity::PerCharacter {
            if let Some(path) = rng.choice(textures) {
                let texture = Raster::load_opaque(path)?;
                blend_texture(&mut glyph, &texture, self.texture.opacity)?;
                texture_source = Some(path.clone());
            } else {
                warn!("per-character texturing enabled but no textures were found");
            }
        }

        Ok((
            glyph,
            GlyphParams {
                rotation,
                perspective,
                perspective_direction: direction,
                scale,
                shear: shear_angle,
                color,
                texture: texture_source,
            },
        ))
    }
}

/// Rotate about the center, expanding the canvas so nothing clips.
pub fn rotate(raster: &Raster, degrees: f64) -> Result<Raster> {
    let rad = degrees.to_radians();
    let (w, h) = (f64::from(raster.width()), f64::from(raster.height()));
    let (sin, cos) = rad.sin_cos();
    let out_w = ceil_dim(h * sin.abs() + w * cos.abs());
    let out_h = ceil_dim(h * cos.abs() + w * sin.abs());
    let transform = Affine::translate((f64::from(out_w) / 2.0, f64::from(out_h) / 2.0))
        * Affine::rotate(rad)
        * Affine::translate((-w / 2.0, -h / 2.0));
    raster.warp_affine(transform, out_w, out_h)
}

/// Push one edge of the glyph inward by `tan(degrees)` times the
/// dimension the push moves along: the width for left/right, the height
/// for top/bottom. Magnitudes below 45 degrees always stay inside the
/// glyph.
pub fn one_sided_perspective(
    raster: &Raster,
    degrees: f64,
    direction: PerspectiveDirection,
) -> Result<Raster> {
    let (w, h) = (f64::from(raster.width()), f64::from(raster.height()));
    let axis = match direction {
        PerspectiveDirection::Left | PerspectiveDirection::Right => w,
        PerspectiveDirection::Top | PerspectiveDirection::Bottom => h,
    };
    let shift = (axis * degrees.to_radians().tan()).round();
    if shift < 0.0 || shift >= axis {
        return Err(Error::Transform(format!(
            "perspective magnitude {degrees} deg shifts {shift} px, outside the glyph"
        )));
    }
    let src = [
        Point::new(0., 0.),
        Point::new(w, 0.),
        Point::new(w, h),
        Point::new(0., h),
    ];
    let dst = match direction {
        PerspectiveDirection::Left => [
            Point::new(shift, 0.),
            Point::new(w, 0.),
            Point::new(w, h),
            Point::new(0., h),
        ],
        PerspectiveDirection::Right => [
            Point::new(0., 0.),
            Point::new(w - shift, 0.),
            Point::new(w, h),
            Point::new(shift, h),
        ],
        PerspectiveDirection::Top => [
            Point::new(0., shift),
            Point::new(w, 0.),
            Point::new(w, h),
            Point::new(0., h - shift),
        ],
        PerspectiveDirection::Bottom => [
            Point::new(0., 0.),
            Point::new(w, shift),
            Point::new(w, h - shift),
            Point::new(0., h),
        ],
    };
    let transform = Homography::from_quad(src, dst)
        .ok_or_else(|| Error::Transform("degenerate perspective correspondence".into()))?;
    raster.warp_perspective(&transform, raster.width(), raster.height())
}

/// Resize uniformly by `factor` about the glyph's own frame.
pub fn rescale(raster: &Raster, factor: f64) -> Result<Raster> {
    if factor <= 0.0 || !factor.is_finite() {
        return Err(Error::Transform(format!("invalid scale factor {factor}")));
    }
    let out_w = ceil_dim(f64::from(raster.width()) * factor);
    let out_h = ceil_dim(f64::from(raster.height()) * factor);
    raster.resize(out_w, out_h)
}

/// Shear horizontally by `degrees`, widening the canvas to fit.
pub fn shear(raster: &Raster, degrees: f64) -> Result<Raster> {
    let t = degrees.to_radians().tan();
    let (w, h) = (f64::from(raster.width()), f64::from(raster.height()));
    let extra = (h * t.abs()).ceil();
    let out_w = ceil_dim(w + extra);
    let offset = if t < 0.0 { extra } else { 0.0 };
    let transform = Affine::new([1.0, 0.0, t, 1.0, offset, 0.0]);
    raster.warp_affine(transform, out_w, raster.height())
}

/// Fit into a `cell` x `cell` square: aspect-preserving resize, centered
/// on a transparent pad.
pub fn fit_to_cell(raster: &Raster, cell: u16) -> Result<Raster> {
    if cell == 0 {
        return Err(Error::Transform("cell dimension must be non-zero".into()));
    }
    let scale = (f64::from(cell) / f64::from(raster.width()))
        .min(f64::from(cell) / f64::from(raster.height()));
    let out_w = floor_dim(f64::from(raster.width()) * scale).min(cell);
    let out_h = floor_dim(f64::from(raster.height()) * scale).min(cell);
    let resized = raster.resize(out_w, out_h)?;
    let mut out = Raster::new(cell, cell);
    out.blend_over(
        &resized,
        i64::from((cell - out_w) / 2),
        i64::from((cell - out_h) / 2),
    );
    Ok(out)
}

/// Remap foreground pixels so the channel values scale each pixel's
/// intensity: `I -> round(I * c / 255)` per channel. Relative shading
/// within the glyph is preserved.
pub fn remap_color(raster: &mut Raster, [r, g, b]: [u8; 3]) {
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            let (pixel, mask) = raster.get(x, y);
            if mask == 0 {
                continue;
            }
            let intensity = u32::from(luma(pixel));
            let apply = |c: u8| -> u8 {
                #[expect(clippy::cast_possible_truncation, reason = "result is <= 255")]
                {
                    ((intensity * u32::from(c) + 127) / 255) as u8
                }
            };
            raster.set(x, y, Rgb8::new(apply(r), apply(g), apply(b)), mask);
        }
    }
}

/// Blend a texture onto the glyph's foreground pixels:
/// `out = opacity * texture + (1 - opacity) * original`.
///
/// The texture is resized to the glyph's bounding box first; the mask is
/// left untouched.
pub fn blend_texture(glyph: &mut Raster, texture: &Raster, opacity: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(Error::Transform(format!(
            "texture opacity {opacity} outside [0, 1]"
        )));
    }
    let fitted = texture.resize(glyph.width(), glyph.height())?;
    for y in 0..glyph.height() {
        for x in 0..glyph.width() {
            let (pixel, mask) = glyph.get(x, y);
            if mask == 0 {
                continue;
            }
            let (tex, _) = fitted.get(x, y);
            let mix = |t: u8, o: u8| -> u8 {
                let v = opacity * f64::from(t) + (1.0 - opacity) * f64::from(o);
                #[expect(clippy::cast_possible_truncation, reason = "clamped before cast")]
                #[expect(clippy::cast_sign_loss, reason = "clamped to non-negative")]
                {
                    (v + 0.5).clamp(0.0, 255.0) as u8
                }
            };
            glyph.set(
                x,
                y,
                Rgb8::new(mix(tex.r, pixel.r), mix(tex.g, pixel.g), mix(tex.b, pixel.b)),
                mask,
            );
        }
    }
    Ok(())
}

/// Load a texture by path and blend it over an assembled canvas through
/// its combined mask. Used for whole-text texture granularity.
pub(crate) fn blend_texture_from_path(
    canvas: &mut Raster,
    path: &Path,
    opacity: f64,
) -> Result<()> {
    let texture = Raster::load_opaque(path)?;
    blend_texture(canvas, &texture, opacity)
}

fn ceil_dim(v: f64) -> u16 {
    // Right-angle trigonometry leaves the exact dimension a float
    // epsilon high; snap before the ceil so 20.000000000000004 is 20,
    // not 21.
    let v = if (v - v.round()).abs() < 1e-9 { v.round() } else { v };
    #[expect(clippy::cast_possible_truncation, reason = "clamped to u16 range")]
    #[expect(clippy::cast_sign_loss, reason = "clamped to non-negative")]
    {
        v.ceil().clamp(1.0, f64::from(u16::MAX)) as u16
    }
}

fn floor_dim(v: f64) -> u16 {
    #[expect(clippy::cast_possible_truncation, reason = "clamped to u16 range")]
    #[expect(clippy::cast_sign_loss, reason = "clamped to non-negative")]
    {
        v.floor().clamp(1.0, f64::from(u16::MAX)) as u16
    }
}
