// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositing the assembled text onto its background layer.

use std::path::PathBuf;

use log::warn;

use crate::config::{BackgroundConfig, BackgroundFit, Placement};
use crate::error::{Error, Result};
use crate::raster::{Raster, Rgb8};
use crate::result::BackgroundParams;
use crate::rng::RandomState;

/// Produces the final opaque image for an assembled text canvas.
#[derive(Debug)]
pub struct Compositor<'a> {
    config: &'a BackgroundConfig,
}

impl<'a> Compositor<'a> {
    /// A compositor over the given background configuration.
    pub fn new(config: &'a BackgroundConfig) -> Self {
        Self { config }
    }

    /// Composite `text` over a background drawn from `backgrounds`.
    ///
    /// With backgrounds disabled, or an empty pool, the text is blended
    /// over a flat fill of the configured color instead. The text's mask
    /// weights the blend, so anti-aliased edges mix with the background
    /// rather than punching hard silhouettes.
    pub fn composite(
        &self,
        text: &Raster,
        backgrounds: &[PathBuf],
        rng: &mut RandomState,
    ) -> Result<(Raster, BackgroundParams)> {
        if self.config.enabled {
            if let Some(path) = rng.choice(backgrounds) {
                let path = path.clone();
                let background = Raster::load_opaque(&path)?;
                return self.composite_onto(text, background, Some(path), rng);
            }
            warn!("backgrounds enabled but the pool is empty; falling back to a flat fill");
        }
        let [r, g, b] = self.config.color;
        let mut canvas = Raster::filled(text.width(), text.height(), Rgb8::new(r, g, b));
        canvas.blend_over(text, 0, 0);
        Ok((
            canvas,
            BackgroundParams {
                source: None,
                color: Some(self.config.color),
                offset: (0, 0),
            },
        ))
    }

    /// Composite `text` onto a concrete background raster.
    ///
    /// Strict fit rejects backgrounds smaller than the text; resize fit
    /// upscales them uniformly until both dimensions cover it. Placement
    /// then picks where the text lands within the remaining slack.
    pub fn composite_onto(
        &self,
        text: &Raster,
        background: Raster,
        source: Option<PathBuf>,
        rng: &mut RandomState,
    ) -> Result<(Raster, BackgroundParams)> {
        let background = match self.config.fit {
            BackgroundFit::Strict => {
                if background.width() < text.width() || background.height() < text.height() {
                    return Err(Error::BackgroundTooSmall {
                        width: background.width(),
                        height: background.height(),
                        text_width: text.width(),
                        text_height: text.height(),
                    });
                }
                background
            }
            BackgroundFit::Resize => cover_resize(&background, text.width(), text.height())?,
        };

        let slack_x = background.width() - text.width();
        let slack_y = background.height() - text.height();
        let offset = match self.config.placement {
            Placement::Centered => (slack_x / 2, slack_y / 2),
            Placement::Random => {
                let x = rng.randint(0, i64::from(slack_x));
                let y = rng.randint(0, i64::from(slack_y));
                #[expect(clippy::cast_possible_truncation, reason = "bounded by the slack")]
                #[expect(clippy::cast_sign_loss, reason = "sampled from a non-negative range")]
                {
                    (x as u16, y as u16)
                }
            }
        };

        let mut canvas = background;
        canvas.blend_over(text, i64::from(offset.0), i64::from(offset.1));
        Ok((
            canvas,
            BackgroundParams {
                source,
                color: None,
                offset,
            },
        ))
    }
}

/// Uniformly upscale `background` until it covers `min_w` x `min_h`.
/// Backgrounds that already cover are returned as-is; nothing is ever
/// downscaled.
pub fn cover_resize(background: &Raster, min_w: u16, min_h: u16) -> Result<Raster> {
    if background.width() >= min_w && background.height() >= min_h {
        return Ok(background.clone());
    }
    let scale = (f64::from(min_w) / f64::from(background.width()))
        .max(f64::from(min_h) / f64::from(background.height()));
    let scale_dim = |d: u16| -> u16 {
        #[expect(clippy::cast_possible_truncation, reason = "clamped to u16 range")]
        #[expect(clippy::cast_sign_loss, reason = "clamped to non-negative")]
        {
            (f64::from(d) * scale).ceil().clamp(1.0, f64::from(u16::MAX)) as u16
        }
    };
    let w = scale_dim(background.width()).max(min_w);
    let h = scale_dim(background.height()).max(min_h);
    background.resize(w, h)
}

/// Crop a composited image to the text's ink extent.
///
/// `offset` is where the text canvas was placed on the image; the crop
/// window is the text mask's bounding box translated by it. Images whose
/// text carried no ink are returned uncropped.
pub fn crop_to_text(image: &Raster, text: &Raster, offset: (u16, u16)) -> Raster {
    match text.mask_bbox() {
        Some((x, y, w, h)) => image.crop(offset.0 + x, offset.1 + y, w, h),
        None => image.clone(),
    }
}
