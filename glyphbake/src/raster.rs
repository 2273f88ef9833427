// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A raster bundling a pixel buffer with its foreground mask.
//!
//! Every stage of the pipeline consumes and produces whole [`Raster`]s so
//! that the image and its mask can never drift out of alignment. All
//! resampling operations (warps, resizes) interpolate the mask in
//! lock-step with the pixels.

use std::path::Path;

use image::DynamicImage;
use kurbo::{Affine, Point};

use crate::error::{Error, Result};
use crate::geom::Homography;

/// An 8-bit RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb8 {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Relative luminance of a pixel, Rec. 709 coefficients.
pub fn luma(p: Rgb8) -> u8 {
    let l = f64::from(p.r) * 0.2126 + f64::from(p.g) * 0.7152 + f64::from(p.b) * 0.0722;
    #[expect(clippy::cast_possible_truncation, reason = "luma is within [0, 255]")]
    {
        (l + 0.5) as u8
    }
}

/// A pixel buffer plus a same-dimension foreground mask, row-major.
///
/// Mask value 0 is background, 255 fully foreground; intermediate values
/// arise from interpolation at resampled edges and act as blend weights
/// during compositing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u16,
    height: u16,
    pixels: Vec<Rgb8>,
    mask: Vec<u8>,
}

impl Raster {
    /// Create a raster of the given size, all pixels transparent black.
    pub fn new(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            pixels: vec![Rgb8::default(); len],
            mask: vec![0; len],
        }
    }

    /// Create a raster from existing buffers.
    ///
    /// # Panics
    ///
    /// Panics if either buffer is not of length `width * height` exactly.
    pub fn from_parts(pixels: Vec<Rgb8>, mask: Vec<u8>, width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        assert_eq!(pixels.len(), len, "pixel buffer must be width * height");
        assert_eq!(mask.len(), len, "mask buffer must be width * height");
        Self {
            width,
            height,
            pixels,
            mask,
        }
    }

    /// Create an opaque raster filled with one color.
    pub fn filled(width: u16, height: u16, color: Rgb8) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            pixels: vec![color; len],
            mask: vec![255; len],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The pixel buffer, row-major.
    pub fn pixels(&self) -> &[Rgb8] {
        &self.pixels
    }

    /// The mask buffer, row-major.
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    /// Sample the pixel and mask value at integer coordinates.
    #[inline(always)]
    pub fn get(&self, x: u16, y: u16) -> (Rgb8, u8) {
        let idx = self.idx(x, y);
        (self.pixels[idx], self.mask[idx])
    }

    /// Set the pixel and mask value at integer coordinates.
    #[inline(always)]
    pub fn set(&mut self, x: u16, y: u16, pixel: Rgb8, mask: u8) {
        let idx = self.idx(x, y);
        self.pixels[idx] = pixel;
        self.mask[idx] = mask;
    }

    /// Bilinearly sample pixel channels and mask at a fractional position.
    ///
    /// Positions outside the raster read as transparent black, so warped
    /// content fades out cleanly at the border.
    fn sample_bilinear(&self, x: f64, y: f64) -> ([f64; 3], f64) {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let mut rgb = [0.0_f64; 3];
        let mut m = 0.0_f64;
        for (dy, wy) in [(0_i64, 1.0 - fy), (1, fy)] {
            for (dx, wx) in [(0_i64, 1.0 - fx), (1, fx)] {
                let w = wx * wy;
                if w == 0.0 {
                    continue;
                }
                #[expect(clippy::cast_possible_truncation, reason = "floor of a small float")]
                let (sx, sy) = (x0 as i64 + dx, y0 as i64 + dy);
                if sx < 0 || sy < 0 || sx >= i64::from(self.width) || sy >= i64::from(self.height)
                {
                    continue;
                }
                #[expect(clippy::cast_sign_loss, reason = "bounds checked above")]
                let (p, pm) = self.get(sx as u16, sy as u16);
                rgb[0] += w * f64::from(p.r);
                rgb[1] += w * f64::from(p.g);
                rgb[2] += w * f64::from(p.b);
                m += w * f64::from(pm);
            }
        }
        (rgb, m)
    }

    fn warp_with(
        &self,
        out_width: u16,
        out_height: u16,
        mut to_source: impl FnMut(Point) -> Point,
    ) -> Self {
        let mut out = Self::new(out_width, out_height);
        for y in 0..out_height {
            for x in 0..out_width {
                let src = to_source(Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5));
                let (rgb, m) = self.sample_bilinear(src.x - 0.5, src.y - 0.5);
                out.set(x, y, quantize(rgb), quantize_channel(m));
            }
        }
        out
    }

    /// Apply an affine transform, inverse-mapped with bilinear filtering.
    ///
    /// `transform` maps source coordinates to destination coordinates; the
    /// destination raster has the given size.
    pub fn warp_affine(&self, transform: Affine, out_width: u16, out_height: u16) -> Result<Self> {
        if out_width == 0 || out_height == 0 {
            return Err(Error::Transform("affine warp to zero-area raster".into()));
        }
        if transform.determinant().abs() < 1e-12 {
            return Err(Error::Transform("singular affine transform".into()));
        }
        let inverse = transform.inverse();
        Ok(self.warp_with(out_width, out_height, |p| inverse * p))
    }

    /// Apply a projective transform, inverse-mapped with bilinear filtering.
    pub fn warp_perspective(
        &self,
        transform: &Homography,
        out_width: u16,
        out_height: u16,
    ) -> Result<Self> {
        if out_width == 0 || out_height == 0 {
            return Err(Error::Transform(
                "perspective warp to zero-area raster".into(),
            ));
        }
        let inverse = transform
            .inverse()
            .ok_or_else(|| Error::Transform("singular perspective transform".into()))?;
        Ok(self.warp_with(out_width, out_height, |p| inverse.apply(p)))
    }

    /// Resize to the given dimensions with bilinear filtering.
    pub fn resize(&self, width: u16, height: u16) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Transform("resize to zero-area raster".into()));
        }
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let sx = f64::from(self.width) / f64::from(width);
        let sy = f64::from(self.height) / f64::from(height);
        Ok(self.warp_with(width, height, |p| Point::new(p.x * sx, p.y * sy)))
    }

    /// Copy out the given sub-rectangle.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle does not lie fully inside the raster.
    pub fn crop(&self, x: u16, y: u16, width: u16, height: u16) -> Self {
        assert!(
            usize::from(x) + usize::from(width) <= usize::from(self.width)
                && usize::from(y) + usize::from(height) <= usize::from(self.height),
            "crop rectangle out of bounds"
        );
        let mut out = Self::new(width, height);
        for row in 0..height {
            for col in 0..width {
                let (p, m) = self.get(x + col, y + row);
                out.set(col, row, p, m);
            }
        }
        out
    }

    /// The tight bounding box `(x, y, width, height)` of all foreground
    /// (mask > 0) pixels, or `None` for an all-background raster.
    pub fn mask_bbox(&self) -> Option<(u16, u16, u16, u16)> {
        let mut min_x = u16::MAX;
        let mut min_y = u16::MAX;
        let mut max_x = 0_u16;
        let mut max_y = 0_u16;
        let mut any = false;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.mask[self.idx(x, y)] > 0 {
                    any = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        any.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    /// Crop to the foreground bounding box, or `None` if there is none.
    pub fn crop_to_mask(&self) -> Option<Self> {
        let (x, y, w, h) = self.mask_bbox()?;
        Some(self.crop(x, y, w, h))
    }

    /// Total foreground mass: the mask summed and normalized to full
    /// coverage units. Useful for conservation checks across warps.
    pub fn mask_mass(&self) -> f64 {
        self.mask.iter().map(|&m| f64::from(m)).sum::<f64>() / 255.0
    }

    /// Alpha-blend `src` over `self` with `src`'s mask as the blend
    /// weight, top-left corner at `(x, y)`. The combined mask is the
    /// union (maximum) of both masks. Pixels falling outside `self` are
    /// discarded.
    pub fn blend_over(&mut self, src: &Self, x: i64, y: i64) {
        for sy in 0..src.height {
            let dy = y + i64::from(sy);
            if dy < 0 || dy >= i64::from(self.height) {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + i64::from(sx);
                if dx < 0 || dx >= i64::from(self.width) {
                    continue;
                }
                let (sp, sm) = src.get(sx, sy);
                #[expect(clippy::cast_sign_loss, reason = "bounds checked above")]
                let (dx, dy) = (dx as u16, dy as u16);
                let (dp, dm) = self.get(dx, dy);
                let blend = |s: u8, d: u8| -> u8 {
                    let v = (u32::from(sm) * u32::from(s) + (255 - u32::from(sm)) * u32::from(d)
                        + 127)
                        / 255;
                    #[expect(clippy::cast_possible_truncation, reason = "v <= 255")]
                    {
                        v as u8
                    }
                };
                self.set(
                    dx,
                    dy,
                    Rgb8::new(blend(sp.r, dp.r), blend(sp.g, dp.g), blend(sp.b, dp.b)),
                    sm.max(dm),
                );
            }
        }
    }

    /// Decode a glyph sample from disk.
    ///
    /// Images with an alpha channel keep their color with the alpha as
    /// the foreground mask. Images without one are treated as dark ink on
    /// a light ground: the inverted luminance becomes both the ink
    /// intensity and the mask, matching how scanned character datasets
    /// are usually stored.
    pub fn load_glyph(path: &Path) -> Result<Self> {
        let img = image::open(path)?;
        let (w, h) = checked_dims(&img)?;
        let raster = if img.color().has_alpha() {
            let rgba = img.into_rgba8();
            let mut pixels = Vec::with_capacity(rgba.pixels().len());
            let mut mask = Vec::with_capacity(rgba.pixels().len());
            for p in rgba.pixels() {
                pixels.push(Rgb8::new(p.0[0], p.0[1], p.0[2]));
                mask.push(p.0[3]);
            }
            Self::from_parts(pixels, mask, w, h)
        } else {
            let gray = img.into_luma8();
            let mut pixels = Vec::with_capacity(gray.pixels().len());
            let mut mask = Vec::with_capacity(gray.pixels().len());
            for p in gray.pixels() {
                let ink = 255 - p.0[0];
                pixels.push(Rgb8::new(ink, ink, ink));
                mask.push(ink);
            }
            Self::from_parts(pixels, mask, w, h)
        };
        Ok(raster)
    }

    /// Decode a fully opaque image (texture or background) from disk.
    pub fn load_opaque(path: &Path) -> Result<Self> {
        let img = image::open(path)?;
        let (w, h) = checked_dims(&img)?;
        let rgb = img.into_rgb8();
        let pixels = rgb
            .pixels()
            .map(|p| Rgb8::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        let len = usize::from(w) * usize::from(h);
        Ok(Self::from_parts(pixels, vec![255; len], w, h))
    }
}

fn checked_dims(img: &DynamicImage) -> Result<(u16, u16)> {
    let w = u16::try_from(img.width())
        .map_err(|_| Error::Transform(format!("image width {} exceeds u16", img.width())))?;
    let h = u16::try_from(img.height())
        .map_err(|_| Error::Transform(format!("image height {} exceeds u16", img.height())))?;
    Ok((w, h))
}

fn quantize(rgb: [f64; 3]) -> Rgb8 {
    Rgb8::new(
        quantize_channel(rgb[0]),
        quantize_channel(rgb[1]),
        quantize_channel(rgb[2]),
    )
}

fn quantize_channel(v: f64) -> u8 {
    #[expect(clippy::cast_possible_truncation, reason = "clamped before cast")]
    #[expect(clippy::cast_sign_loss, reason = "clamped to non-negative")]
    {
        (v + 0.5).clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u16, h: u16) -> Raster {
        let mut r = Raster::new(w, h);
        for y in 0..h {
            for x in 0..w {
                if (x + y) % 2 == 0 {
                    r.set(x, y, Rgb8::new(200, 100, 50), 255);
                }
            }
        }
        r
    }

    #[test]
    fn crop_round_trips_get() {
        let r = checker(8, 8);
        let c = r.crop(2, 2, 4, 4);
        assert_eq!(c.width(), 4);
        assert_eq!(c.get(0, 0), r.get(2, 2));
    }

    #[test]
    fn mask_bbox_is_tight() {
        let mut r = Raster::new(10, 10);
        r.set(3, 4, Rgb8::new(255, 255, 255), 255);
        r.set(7, 6, Rgb8::new(255, 255, 255), 128);
        assert_eq!(r.mask_bbox(), Some((3, 4, 5, 3)));
    }

    #[test]
    fn empty_mask_has_no_bbox() {
        assert_eq!(Raster::new(4, 4).mask_bbox(), None);
    }

    #[test]
    fn identity_warp_preserves_pixels() {
        let r = checker(6, 6);
        let warped = r.warp_affine(Affine::IDENTITY, 6, 6).unwrap();
        assert_eq!(warped, r);
    }

    #[test]
    fn singular_affine_is_rejected() {
        let r = checker(4, 4);
        assert!(r.warp_affine(Affine::scale(0.0), 4, 4).is_err());
    }

    #[test]
    fn zero_area_resize_is_rejected() {
        let r = checker(4, 4);
        assert!(r.resize(0, 4).is_err());
    }

    #[test]
    fn blend_over_unions_masks() {
        let mut dst = Raster::new(4, 4);
        let src = Raster::filled(2, 2, Rgb8::new(10, 20, 30));
        dst.blend_over(&src, 1, 1);
        assert_eq!(dst.get(1, 1), (Rgb8::new(10, 20, 30), 255));
        assert_eq!(dst.get(0, 0), (Rgb8::default(), 0));
    }

    #[test]
    fn blend_over_clips_outside() {
        let mut dst = Raster::new(2, 2);
        let src = Raster::filled(4, 4, Rgb8::new(9, 9, 9));
        dst.blend_over(&src, -2, -2);
        assert_eq!(dst.get(1, 1), (Rgb8::new(9, 9, 9), 255));
    }
}
