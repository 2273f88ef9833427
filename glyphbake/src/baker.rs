// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The top-level generator tying the pipeline stages together.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use log::{debug, info};

use crate::compose::{crop_to_text, Compositor};
use crate::config::{GeneratorConfig, LabelFormat, OutputFormat, TextureGranularity};
use crate::error::{Error, Result};
use crate::index::{scan_flat_images, GlyphIndex};
use crate::layout::{LayoutEngine, PreparedGlyph};
use crate::raster::Raster;
use crate::result::{GenerationResult, ResolvedParams};
use crate::rng::RandomState;
use crate::transform::{blend_texture_from_path, GlyphTransformer};

/// Generates labeled text images from glyph samples.
///
/// Construction only validates the configuration; the dataset and the
/// texture and background pools are scanned once, on the first call that
/// needs them. All sampling flows through one seeded [`RandomState`], so
/// a given seed and call sequence always reproduces the same images.
#[derive(Debug)]
pub struct TextBaker {
    config: GeneratorConfig,
    rng: RandomState,
    index: Option<GlyphIndex>,
    textures: Vec<PathBuf>,
    backgrounds: Vec<PathBuf>,
    initialized: bool,
    saved: u64,
}

impl TextBaker {
    /// Create a baker over a validated configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let rng = RandomState::new(config.seed.0);
        Ok(Self {
            config,
            rng,
            index: None,
            textures: Vec::new(),
            backgrounds: Vec::new(),
            initialized: false,
            saved: 0,
        })
    }

    /// Create a baker with a pre-built glyph index instead of a dataset
    /// scan. Texture and background pools are still scanned lazily.
    pub fn with_index(config: GeneratorConfig, index: GlyphIndex) -> Result<Self> {
        let mut baker = Self::new(config)?;
        baker.index = Some(index);
        Ok(baker)
    }

    /// The configuration this baker runs under.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Scan the dataset and the texture and background pools, if that
    /// has not happened yet. Called implicitly by generation.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        if self.index.is_none() {
            self.index = Some(GlyphIndex::scan(&self.config.dataset)?);
        }
        if let Some(dir) = &self.config.texture.dir {
            self.textures = scan_flat_images(dir)?;
        }
        if let Some(dir) = &self.config.background.dir {
            self.backgrounds = scan_flat_images(dir)?;
        }
        let index = self.index.as_ref().expect("index was just populated");
        info!(
            "initialized: {} labels, {} textures, {} backgrounds",
            index.len(),
            self.textures.len(),
            self.backgrounds.len()
        );
        self.initialized = true;
        Ok(())
    }

    /// Labels the baker can currently render, in lexicographic order.
    pub fn available_characters(&mut self) -> Result<Vec<String>> {
        self.initialize()?;
        Ok(self.index.as_ref().expect("initialized above").labels())
    }

    /// Restart the random stream. `Some(seed)` reproduces a known run;
    /// `None` draws a fresh seed from OS entropy. Returns the effective
    /// seed either way.
    pub fn reset_seed(&mut self, seed: Option<u64>) -> u64 {
        match seed {
            Some(seed) => {
                self.rng.seed(seed);
                seed
            }
            None => self.rng.seed_from_entropy(),
        }
    }

    /// Render `text`, one glyph per character.
    ///
    /// Empty text is rejected. Fails with [`Error::UnknownLabel`] on the
    /// first character the index has no sample for; nothing is partially
    /// rendered.
    pub fn generate(&mut self, text: &str) -> Result<GenerationResult> {
        let labels: Vec<String> = text.chars().map(String::from).collect();
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        self.generate_labels(&refs)
    }

    /// Render a random text, with each label chosen uniformly (with
    /// replacement) from the index. The length comes from `length`, or
    /// is drawn from the configured length range when `None`.
    pub fn generate_random(&mut self, length: Option<u32>) -> Result<GenerationResult> {
        self.initialize()?;
        let labels = self.index.as_ref().expect("initialized above").labels();
        if labels.is_empty() {
            return Err(Error::ConfigValidation(
                "the glyph index is empty; nothing to sample random text from".into(),
            ));
        }
        let len = match length {
            Some(len) => len,
            None => self.config.text_length.0.sample(&mut self.rng),
        };
        let picked: Vec<String> = self
            .rng
            .choices(&labels, len as usize)
            .into_iter()
            .cloned()
            .collect();
        let refs: Vec<&str> = picked.iter().map(String::as_str).collect();
        self.generate_labels(&refs)
    }

    /// Render each text in order on the one random stream. The whole
    /// batch fails on the first error; nothing is skipped.
    pub fn batch_generate(&mut self, texts: &[&str]) -> Result<Vec<GenerationResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            let result = self.generate(text)?;
            debug!("generated {}/{}: {:?}", i + 1, texts.len(), result.text);
            results.push(result);
        }
        Ok(results)
    }

    /// Generate `count` random images sequentially on one random stream.
    pub fn batch_generate_random(&mut self, count: usize) -> Result<Vec<GenerationResult>> {
        let mut results = Vec::with_capacity(count);
        for i in 0..count {
            let result = self.generate_random(None)?;
            debug!("generated {}/{count}: {:?}", i + 1, result.text);
            results.push(result);
        }
        Ok(results)
    }

    /// Render an explicit label sequence. This is the primitive behind
    /// [`generate`](Self::generate) and lets multi-character labels (e.g.
    /// from flat dataset scans) be used directly.
    pub fn generate_labels(&mut self, labels: &[&str]) -> Result<GenerationResult> {
        if labels.is_empty() {
            return Err(Error::ConfigValidation(
                "cannot render an empty text; at least one label is required".into(),
            ));
        }
        self.initialize()?;
        let index = self.index.as_ref().expect("initialized above");
        let transformer = GlyphTransformer::new(
            &self.config.transform,
            &self.config.color,
            &self.config.texture,
            self.config.layout.cell,
        );

        let mut prepared = Vec::with_capacity(labels.len());
        for label in labels {
            let sample = index.lookup(label, &mut self.rng)?;
            let (raster, params) =
                transformer.apply(&sample.raster, &self.textures, &mut self.rng)?;
            prepared.push(PreparedGlyph {
                label: (*label).to_owned(),
                source: sample.source.clone(),
                raster,
                params,
            });
        }

        let (mut canvas, placed) =
            LayoutEngine::new(&self.config.layout).assemble(&prepared, &mut self.rng)?;

        let mut whole_text_texture = None;
        if self.config.texture.enabled
            && self.config.texture.granularity == TextureGranularity::WholeText
        {
            if let Some(path) = self.rng.choice(&self.textures) {
                let path = path.clone();
                blend_texture_from_path(&mut canvas, &path, self.config.texture.opacity)?;
                whole_text_texture = Some(path);
            } else {
                log::warn!("whole-text texturing enabled but no textures were found");
            }
        }

        let (image, background) = Compositor::new(&self.config.background).composite(
            &canvas,
            &self.backgrounds,
            &mut self.rng,
        )?;
        let image = if self.config.output.crop_to_text {
            crop_to_text(&image, &canvas, background.offset)
        } else {
            image
        };

        let text: String = labels.concat();
        Ok(GenerationResult {
            image,
            text: text.clone(),
            params: ResolvedParams {
                seed: self.rng.current_seed(),
                text,
                glyphs: placed,
                texture: whole_text_texture,
                background: Some(background),
            },
        })
    }

    /// Encode a result to disk and return the image path.
    ///
    /// The image lands in `dir` when given, in the configured output
    /// directory otherwise. With `stem: None` a collision-free name is
    /// derived from the text and a running counter; an explicit stem is
    /// sanitized and used as-is, overwriting any previous file. A
    /// sidecar label file is written next to the image when configured.
    pub fn save(
        &mut self,
        result: &GenerationResult,
        stem: Option<&str>,
        dir: Option<&Path>,
    ) -> Result<PathBuf> {
        let output = &self.config.output;
        let dir = dir.unwrap_or(&output.dir);
        std::fs::create_dir_all(dir)?;

        let stem = match stem {
            Some(stem) => sanitize_stem(stem),
            None => {
                let stem = format!("{:06}_{}", self.saved, sanitize_stem(&result.text));
                self.saved += 1;
                stem
            }
        };
        let path = dir.join(format!("{stem}.{}", output.format.extension()));
        let rgb = to_rgb_image(&result.image);
        match output.format {
            OutputFormat::Png => rgb.save_with_format(&path, ImageFormat::Png)?,
            OutputFormat::Jpeg => {
                let writer = BufWriter::new(File::create(&path)?);
                JpegEncoder::new_with_quality(writer, output.quality).encode_image(&rgb)?;
            }
        }

        if output.create_labels {
            let label_path = match output.label_format {
                LabelFormat::Txt => path.with_extension("txt"),
                LabelFormat::Json => path.with_extension("json"),
            };
            let contents = match output.label_format {
                LabelFormat::Txt => result.text.clone(),
                LabelFormat::Json => serde_json::to_string_pretty(&result.params)
                    .map_err(|e| Error::ConfigValidation(format!("label encoding failed: {e}")))?,
            };
            std::fs::write(&label_path, contents)?;
        }

        debug!("saved {}", path.display());
        Ok(path)
    }
}

/// Reduce a text to a filesystem-safe stem: alphanumerics, `-` and `_`
/// pass through, everything else becomes `_`, capped at 32 characters.
/// An empty result falls back to `"text"`.
fn sanitize_stem(text: &str) -> String {
    let stem: String = text
        .chars()
        .take(32)
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "text".to_owned()
    } else {
        stem
    }
}

fn to_rgb_image(raster: &Raster) -> RgbImage {
    let mut buf = Vec::with_capacity(raster.pixels().len() * 3);
    for p in raster.pixels() {
        buf.extend_from_slice(&[p.r, p.g, p.b]);
    }
    RgbImage::from_raw(u32::from(raster.width()), u32::from(raster.height()), buf)
        .expect("buffer length matches dimensions")
}
