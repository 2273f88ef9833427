// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validated, serializable generation configuration.
//!
//! Configs are plain data: construction and (de)serialization never touch
//! the filesystem beyond the config file itself. Out-of-range fields are
//! rejected by [`GeneratorConfig::validate`] before any generation work,
//! not at use time. Two interchangeable file formats are supported,
//! nested JSON and line-oriented TOML, chosen by file extension.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rng::{RandomState, DEFAULT_SEED};

/// A closed interval `[min, max]` a parameter is sampled from.
///
/// A degenerate range (`min == max`) is a valid constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomRange<T> {
    /// Inclusive lower bound.
    pub min: T,
    /// Inclusive upper bound (for floats, exclusive at sampling time).
    pub max: T,
}

impl<T: PartialOrd + Copy + std::fmt::Debug> RandomRange<T> {
    /// Construct a range; `min` must not exceed `max`.
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Whether the range is a constant.
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    fn check(&self, what: &str) -> Result<()> {
        if self.min > self.max {
            return Err(Error::ConfigValidation(format!(
                "{what} range has min {:?} > max {:?}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl RandomRange<f64> {
    /// Draw one sample from the range.
    pub fn sample(&self, rng: &mut RandomState) -> f64 {
        rng.uniform(self.min, self.max)
    }
}

impl RandomRange<i32> {
    /// Draw one sample from the range (inclusive).
    pub fn sample(&self, rng: &mut RandomState) -> i32 {
        #[expect(clippy::cast_possible_truncation, reason = "bounds are i32")]
        {
            rng.randint(i64::from(self.min), i64::from(self.max)) as i32
        }
    }
}

impl RandomRange<u8> {
    /// Draw one sample from the range (inclusive).
    pub fn sample(&self, rng: &mut RandomState) -> u8 {
        #[expect(clippy::cast_possible_truncation, reason = "bounds are u8")]
        #[expect(clippy::cast_sign_loss, reason = "bounds are non-negative")]
        {
            rng.randint(i64::from(self.min), i64::from(self.max)) as u8
        }
    }
}

impl RandomRange<u32> {
    /// Draw one sample from the range (inclusive).
    pub fn sample(&self, rng: &mut RandomState) -> u32 {
        #[expect(clippy::cast_possible_truncation, reason = "bounds are u32")]
        #[expect(clippy::cast_sign_loss, reason = "bounds are non-negative")]
        {
            rng.randint(i64::from(self.min), i64::from(self.max)) as u32
        }
    }
}

/// Where glyph samples come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Directory containing the character image dataset.
    pub dir: PathBuf,
    /// If true, each sub-directory name is a label and its images are the
    /// samples for that label. If false, the directory is scanned flat
    /// and each file stem is a label.
    pub recursive: bool,
    /// Accepted file extensions, lower-case with leading dot.
    pub extensions: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/dataset"),
            recursive: true,
            extensions: vec![".png".into(), ".jpg".into(), ".jpeg".into(), ".bmp".into()],
        }
    }
}

/// Geometric transform ranges applied per glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Rotation angle range in degrees.
    pub rotation: RandomRange<f64>,
    /// One-sided perspective magnitude range in degrees. The warp
    /// direction is drawn independently and uniformly from
    /// left/right/top/bottom.
    pub perspective: RandomRange<f64>,
    /// Uniform scale factor range. Must be strictly positive.
    pub scale: RandomRange<f64>,
    /// Shear angle range in degrees.
    pub shear: RandomRange<f64>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            rotation: RandomRange::new(0.0, 0.0),
            perspective: RandomRange::new(0.0, 0.0),
            scale: RandomRange::new(0.9, 1.1),
            shear: RandomRange::new(0.0, 0.0),
        }
    }
}

/// How glyph intensities are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Keep the sample's original intensities.
    Original,
    /// Remap every glyph with one fixed RGB triplet.
    Fixed,
    /// Remap every glyph with an RGB triplet sampled per character.
    Random,
}

/// Color remapping configuration. Exactly one mode is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Active mode.
    pub mode: ColorMode,
    /// The triplet used in [`ColorMode::Fixed`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<[u8; 3]>,
    /// Red channel range for [`ColorMode::Random`].
    pub range_r: RandomRange<u8>,
    /// Green channel range for [`ColorMode::Random`].
    pub range_g: RandomRange<u8>,
    /// Blue channel range for [`ColorMode::Random`].
    pub range_b: RandomRange<u8>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            mode: ColorMode::Original,
            fixed: None,
            range_r: RandomRange::new(0, 255),
            range_g: RandomRange::new(0, 255),
            range_b: RandomRange::new(0, 255),
        }
    }
}

/// Whether a texture sample is drawn per glyph or once for the whole
/// assembled text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureGranularity {
    /// One independent texture sample per glyph.
    PerCharacter,
    /// One texture sample for the assembled canvas.
    WholeText,
}

/// Texture blending configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Whether the texture step runs at all.
    pub enabled: bool,
    /// Directory of texture images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Blend weight in `[0, 1]`.
    pub opacity: f64,
    /// Application granularity.
    pub granularity: TextureGranularity,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: None,
            opacity: 1.0,
            granularity: TextureGranularity::PerCharacter,
        }
    }
}

/// Where the text canvas lands on the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Centered on the background.
    Centered,
    /// Uniformly random, keeping the text fully inside.
    Random,
}

/// Policy when a chosen background is smaller than the text canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFit {
    /// Fail with [`Error::BackgroundTooSmall`].
    Strict,
    /// Uniformly upscale the background until it covers the text canvas
    /// (no aspect distortion).
    Resize,
}

/// Background compositing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Whether background images are used. When false (or when no images
    /// are found), text is composited onto a flat [`Self::color`] fill.
    pub enabled: bool,
    /// Directory of background images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Flat fill color used without a background image.
    pub color: [u8; 3],
    /// Placement of the text canvas on the background.
    pub placement: Placement,
    /// Policy for too-small backgrounds.
    pub fit: BackgroundFit,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: None,
            color: [0, 0, 0],
            placement: Placement::Centered,
            fit: BackgroundFit::Strict,
        }
    }
}

/// Canvas layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Square cell dimension each transformed glyph is fitted into.
    pub cell: u16,
    /// Height of the assembled canvas.
    pub canvas_height: u16,
    /// Maximum per-glyph vertical jitter magnitude; the offset is drawn
    /// from `[-max_v_offset, +max_v_offset]`.
    pub max_v_offset: u16,
    /// Horizontal margin range between adjacent glyphs, in pixels.
    /// Negative values overlap neighbors.
    pub h_margin: RandomRange<i32>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell: 64,
            canvas_height: 128,
            max_v_offset: 0,
            h_margin: RandomRange::new(0, 0),
        }
    }
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Lossless PNG (the default).
    Png,
    /// JPEG, honoring [`OutputConfig::quality`].
    Jpeg,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Sidecar label file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFormat {
    /// Plain text file containing the text string.
    Txt,
    /// JSON object with text, labels and seed.
    Json,
}

/// Output configuration for [`save`](crate::TextBaker::save).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory saved images land in.
    pub dir: PathBuf,
    /// Image format.
    pub format: OutputFormat,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Whether to crop the final image to the text's tight bounding box.
    pub crop_to_text: bool,
    /// Whether to write a sidecar label file next to each image.
    pub create_labels: bool,
    /// Sidecar label format.
    pub label_format: LabelFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            format: OutputFormat::Png,
            quality: 95,
            crop_to_text: false,
            create_labels: true,
            label_format: LabelFormat::Txt,
        }
    }
}

/// The full generation configuration, grouped by concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Global random seed.
    pub seed: Seed,
    /// Length range for [`generate_random`](crate::TextBaker::generate_random).
    pub text_length: TextLength,
    /// Dataset location and scanning.
    pub dataset: DatasetConfig,
    /// Geometric transform ranges.
    pub transform: TransformConfig,
    /// Color remapping.
    pub color: ColorConfig,
    /// Texture blending.
    pub texture: TextureConfig,
    /// Background compositing.
    pub background: BackgroundConfig,
    /// Canvas layout.
    pub layout: LayoutConfig,
    /// Output format and location.
    pub output: OutputConfig,
}

/// Newtype wrapper so the default seed serializes like a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(pub u64);

impl Default for Seed {
    fn default() -> Self {
        Self(DEFAULT_SEED)
    }
}

/// Newtype for the random-text length range with its own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextLength(pub RandomRange<u32>);

impl Default for TextLength {
    fn default() -> Self {
        Self(RandomRange::new(1, 10))
    }
}

impl GeneratorConfig {
    /// Validate every field, rejecting out-of-range values before any
    /// generation work.
    pub fn validate(&self) -> Result<()> {
        self.transform.rotation.check("rotation")?;
        self.transform.perspective.check("perspective")?;
        self.transform.scale.check("scale")?;
        self.transform.shear.check("shear")?;
        self.color.range_r.check("color red channel")?;
        self.color.range_g.check("color green channel")?;
        self.color.range_b.check("color blue channel")?;
        self.layout.h_margin.check("horizontal margin")?;
        self.text_length.0.check("text length")?;

        if self.transform.scale.min <= 0.0 {
            return Err(Error::ConfigValidation(format!(
                "scale range must be strictly positive, got min {}",
                self.transform.scale.min
            )));
        }
        if self.transform.perspective.min < 0.0 || self.transform.perspective.max >= 45.0 {
            return Err(Error::ConfigValidation(format!(
                "perspective magnitude must lie in [0, 45) degrees, got [{}, {}]",
                self.transform.perspective.min, self.transform.perspective.max
            )));
        }
        if !(0.0..=1.0).contains(&self.texture.opacity) {
            return Err(Error::ConfigValidation(format!(
                "texture opacity must lie in [0, 1], got {}",
                self.texture.opacity
            )));
        }
        if self.texture.enabled && self.texture.dir.is_none() {
            return Err(Error::ConfigValidation(
                "texture is enabled but no texture directory is set".into(),
            ));
        }
        if self.color.mode == ColorMode::Fixed && self.color.fixed.is_none() {
            return Err(Error::ConfigValidation(
                "color mode is fixed but no fixed color is set".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(Error::ConfigValidation(format!(
                "jpeg quality must lie in [1, 100], got {}",
                self.output.quality
            )));
        }
        if self.layout.cell == 0 || self.layout.canvas_height == 0 {
            return Err(Error::ConfigValidation(
                "cell and canvas height must be non-zero".into(),
            ));
        }
        if self.text_length.0.min == 0 {
            return Err(Error::ConfigValidation(
                "text length range must start at 1 or more".into(),
            ));
        }
        // The canvas must accommodate the worst-case jitter around the
        // centered baseline, or placement would clip.
        let required = u32::from(self.layout.cell) + 2 * u32::from(self.layout.max_v_offset);
        if u32::from(self.layout.canvas_height) < required {
            return Err(Error::ConfigValidation(format!(
                "canvas height {} cannot accommodate cell {} with vertical offset up to {} \
                 (needs at least {})",
                self.layout.canvas_height, self.layout.cell, self.layout.max_v_offset, required
            )));
        }
        if self.layout.h_margin.min <= -i32::from(self.layout.cell) {
            return Err(Error::ConfigValidation(format!(
                "horizontal margin min {} must exceed -cell ({})",
                self.layout.h_margin.min,
                -i32::from(self.layout.cell)
            )));
        }
        Ok(())
    }

    /// Load a config from a `.json` or `.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = match format_of(path)? {
            FileFormat::Json => serde_json::from_str(&text).map_err(|e| {
                Error::ConfigValidation(format!("invalid config at {}: {e}", path.display()))
            })?,
            FileFormat::Toml => toml::from_str(&text).map_err(|e| {
                Error::ConfigValidation(format!("invalid config at {}: {e}", path.display()))
            })?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save the config to a `.json` or `.toml` file, creating parent
    /// directories as needed.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = match format_of(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| Error::ConfigValidation(format!("failed to serialize config: {e}")))?,
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::ConfigValidation(format!("failed to serialize config: {e}")))?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Build a config from an in-memory structured mapping.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| Error::ConfigValidation(format!("invalid config value: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

enum FileFormat {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<FileFormat, Error> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(FileFormat::Json),
        Some("toml") => Ok(FileFormat::Toml),
        other => Err(Error::ConfigValidation(format!(
            "unsupported config format {other:?} for {} (expected .json or .toml)",
            path.display()
        ))),
    }
}

/// Deserialize helper shared by both formats; used by external callers
/// that already hold raw text.
pub fn config_from_json_str(text: &str) -> Result<GeneratorConfig> {
    let config: GeneratorConfig = serde_json::from_str(text)
        .map_err(|e| Error::ConfigValidation(format!("invalid config: {e}")))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        GeneratorConfig::default().validate().unwrap();
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.transform.rotation = RandomRange::new(10.0, -10.0);
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigValidation(_))
        ));
    }

    #[test]
    fn opacity_outside_unit_interval_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.texture.enabled = true;
        config.texture.dir = Some(PathBuf::from("tex"));
        config.texture.opacity = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn fixed_mode_requires_triplet() {
        let mut config = GeneratorConfig::default();
        config.color.mode = ColorMode::Fixed;
        assert!(config.validate().is_err());
    }

    #[test]
    fn canvas_must_fit_jitter() {
        let mut config = GeneratorConfig::default();
        config.layout.cell = 64;
        config.layout.canvas_height = 70;
        config.layout.max_v_offset = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_value_round_trip() {
        let config = GeneratorConfig::default();
        let value = serde_json::to_value(&config).unwrap();
        let back = GeneratorConfig::from_value(value).unwrap();
        assert_eq!(back, config);
    }
}
