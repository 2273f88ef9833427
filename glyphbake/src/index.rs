// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The label-to-samples index glyphs are drawn from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::DatasetConfig;
use crate::error::{Error, Result};
use crate::raster::Raster;
use crate::rng::RandomState;

/// One character sample: a loaded raster plus where it came from.
///
/// Immutable once loaded; owned by [`GlyphIndex`].
#[derive(Debug, Clone)]
pub struct GlyphSample {
    /// The label this sample represents.
    pub label: String,
    /// Source path, if the sample was loaded from disk.
    pub source: Option<PathBuf>,
    /// The sample's pixels and foreground mask.
    pub raster: Raster,
}

/// Maps a character label to its available sample images.
///
/// Labels enumerate lexicographically and samples keep insertion order
/// within a label, so any sequence derived from the index is stable
/// across runs — a requirement for reproducible `choice` draws.
#[derive(Debug, Clone, Default)]
pub struct GlyphIndex {
    samples: BTreeMap<String, Vec<GlyphSample>>,
}

impl GlyphIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one sample under a label without rebuilding anything else.
    pub fn add(&mut self, label: impl Into<String>, sample: GlyphSample) {
        self.samples.entry(label.into()).or_default().push(sample);
    }

    /// All labels with at least one sample, in lexicographic order.
    pub fn labels(&self) -> Vec<String> {
        self.samples
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Whether a label has at least one sample.
    pub fn contains(&self, label: &str) -> bool {
        self.samples.get(label).is_some_and(|v| !v.is_empty())
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.samples.values().filter(|v| !v.is_empty()).count()
    }

    /// Whether the index holds no samples at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pick one sample for `label`, uniformly at random.
    pub fn lookup(&self, label: &str, rng: &mut RandomState) -> Result<&GlyphSample> {
        let samples = self
            .samples
            .get(label)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::UnknownLabel(label.to_owned()))?;
        rng.choice(samples)
            .ok_or_else(|| Error::UnknownLabel(label.to_owned()))
    }

    /// Scan a dataset directory into a fresh index.
    ///
    /// In recursive mode every sub-directory of `config.dir` is a label
    /// and all matching images below it are its samples. In flat mode
    /// the directory itself is scanned and each file stem is a label.
    /// Files that fail to decode are skipped with a warning rather than
    /// failing the whole scan.
    pub fn scan(config: &DatasetConfig) -> Result<Self> {
        let mut index = Self::new();
        if !config.dir.exists() {
            warn!("dataset directory not found: {}", config.dir.display());
            return Ok(index);
        }

        if config.recursive {
            for entry in sorted_entries(&config.dir)? {
                if !entry.is_dir() {
                    continue;
                }
                let Some(label) = entry.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let label = label.to_owned();
                let mut files = Vec::new();
                collect_images(&entry, &config.extensions, &mut files)?;
                for path in files {
                    index.load_into(&label, &path);
                }
            }
        } else {
            for path in sorted_entries(&config.dir)? {
                if !path.is_file() || !has_extension(&path, &config.extensions) {
                    continue;
                }
                let Some(label) = path.file_stem().and_then(|n| n.to_str()) else {
                    continue;
                };
                let label = label.to_owned();
                index.load_into(&label, &path);
            }
        }

        debug!("indexed {} labels from {}", index.len(), config.dir.display());
        Ok(index)
    }

    fn load_into(&mut self, label: &str, path: &Path) {
        match Raster::load_glyph(path) {
            Ok(raster) => self.add(
                label,
                GlyphSample {
                    label: label.to_owned(),
                    source: Some(path.to_owned()),
                    raster,
                },
            ),
            Err(e) => warn!("skipping unreadable glyph {}: {e}", path.display()),
        }
    }
}

/// Directory entries in lexicographic path order, for stable enumeration.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let dotted = format!(".{}", ext.to_ascii_lowercase());
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&dotted))
}

fn collect_images(dir: &Path, extensions: &[String], out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in sorted_entries(dir)? {
        if entry.is_dir() {
            collect_images(&entry, extensions, out)?;
        } else if has_extension(&entry, extensions) {
            out.push(entry);
        }
    }
    Ok(())
}

/// Image paths directly inside `dir` matching the usual raster
/// extensions, sorted. Used for texture and background pools.
pub(crate) fn scan_flat_images(dir: &Path) -> Result<Vec<PathBuf>> {
    const EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".bmp"];
    if !dir.exists() {
        warn!("image directory not found: {}", dir.display());
        return Ok(Vec::new());
    }
    let extensions: Vec<String> = EXTENSIONS.iter().map(|s| (*s).to_owned()).collect();
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && has_extension(p, &extensions))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgb8;

    fn sample(label: &str) -> GlyphSample {
        GlyphSample {
            label: label.to_owned(),
            source: None,
            raster: Raster::filled(4, 4, Rgb8::new(255, 255, 255)),
        }
    }

    #[test]
    fn labels_are_sorted() {
        let mut index = GlyphIndex::new();
        index.add("b", sample("b"));
        index.add("a", sample("a"));
        index.add("c", sample("c"));
        assert_eq!(index.labels(), vec!["a", "b", "c"]);
    }

    #[test]
    fn lookup_unknown_label_fails() {
        let index = GlyphIndex::new();
        let mut rng = RandomState::new(1);
        assert!(matches!(
            index.lookup("x", &mut rng),
            Err(Error::UnknownLabel(l)) if l == "x"
        ));
    }

    #[test]
    fn lookup_is_uniform_over_samples() {
        let mut index = GlyphIndex::new();
        index.add("a", sample("a"));
        index.add("a", sample("a"));
        let mut rng = RandomState::new(1);
        let picked = index.lookup("a", &mut rng).unwrap();
        assert_eq!(picked.label, "a");
    }

    #[test]
    fn add_is_incremental() {
        let mut index = GlyphIndex::new();
        index.add("a", sample("a"));
        assert_eq!(index.len(), 1);
        index.add("b", sample("b"));
        assert_eq!(index.len(), 2);
        assert!(index.contains("a") && index.contains("b"));
    }
}
