// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Config files, dataset scanning and output encoding.

mod util;

use glyphbake::{
    ColorMode, DatasetConfig, GeneratorConfig, GlyphIndex, LabelFormat, OutputFormat, RandomRange,
    TextBaker,
};
use util::{base_config, index_with, write_glyph_png};

#[test]
fn toml_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = base_config();
    config.transform.rotation = RandomRange::new(-7.5, 7.5);
    config.color.mode = ColorMode::Fixed;
    config.color.fixed = Some([1, 2, 3]);
    config.to_file(&path).unwrap();
    let back = GeneratorConfig::from_file(&path).unwrap();
    assert_eq!(back, config);
}

#[test]
fn json_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut config = base_config();
    config.layout.h_margin = RandomRange::new(-3, 6);
    config.to_file(&path).unwrap();
    let back = GeneratorConfig::from_file(&path).unwrap();
    assert_eq!(back, config);
}

#[test]
fn unsupported_extension_is_rejected() {
    assert!(GeneratorConfig::default().to_file("config.yaml").is_err());
}

#[test]
fn partial_config_files_fill_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "seed = 9\n\n[layout]\ncell = 32\ncanvas_height = 64\n").unwrap();
    let config = GeneratorConfig::from_file(&path).unwrap();
    assert_eq!(config.seed.0, 9);
    assert_eq!(config.layout.cell, 32);
    assert_eq!(config.output, GeneratorConfig::default().output);
}

#[test]
fn invalid_config_file_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[transform]\nscale = { min = -1.0, max = 1.0 }\n").unwrap();
    assert!(GeneratorConfig::from_file(&path).is_err());
}

#[test]
fn recursive_scan_maps_directories_to_labels() {
    let dir = tempfile::tempdir().unwrap();
    for label in ["a", "b"] {
        let sub = dir.path().join(label);
        std::fs::create_dir(&sub).unwrap();
        write_glyph_png(&sub.join("0.png"), 8, 8);
        write_glyph_png(&sub.join("1.png"), 8, 8);
    }
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let index = GlyphIndex::scan(&DatasetConfig {
        dir: dir.path().to_owned(),
        ..DatasetConfig::default()
    })
    .unwrap();
    assert_eq!(index.labels(), vec!["a", "b"]);
}

#[test]
fn flat_scan_maps_stems_to_labels() {
    let dir = tempfile::tempdir().unwrap();
    write_glyph_png(&dir.path().join("x.png"), 8, 8);
    write_glyph_png(&dir.path().join("y.PNG"), 8, 8);

    let index = GlyphIndex::scan(&DatasetConfig {
        dir: dir.path().to_owned(),
        recursive: false,
        ..DatasetConfig::default()
    })
    .unwrap();
    assert_eq!(index.labels(), vec!["x", "y"]);
}

#[test]
fn missing_dataset_yields_an_empty_index() {
    let mut config = base_config();
    config.dataset.dir = std::path::PathBuf::from("/nonexistent/glyphbake-dataset");
    let mut baker = TextBaker::new(config).unwrap();
    assert!(baker.available_characters().unwrap().is_empty());
    assert!(baker.generate_random(None).is_err());
}

#[test]
fn scanned_dataset_generates_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("k");
    std::fs::create_dir(&sub).unwrap();
    write_glyph_png(&sub.join("0.png"), 8, 8);

    let mut config = base_config();
    config.dataset.dir = dir.path().to_owned();
    let mut baker = TextBaker::new(config).unwrap();
    let result = baker.generate("kk").unwrap();
    assert_eq!(result.image.width(), 32);
    assert!(result.params.glyphs[0].source.as_ref().unwrap().ends_with("k/0.png"));
}

#[test]
fn save_writes_png_and_txt_sidecar() {
    let out = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.output.dir = out.path().to_owned();
    let mut baker = TextBaker::with_index(config, index_with(&["a"])).unwrap();
    let result = baker.generate("aa").unwrap();
    let path = baker.save(&result, None, None).unwrap();
    assert_eq!(path.extension().unwrap(), "png");
    assert!(path.exists());
    let label = std::fs::read_to_string(path.with_extension("txt")).unwrap();
    assert_eq!(label, "aa");

    let decoded = image::open(&path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 32));
}

#[test]
fn save_json_sidecar_carries_the_provenance() {
    let out = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.output.dir = out.path().to_owned();
    config.output.label_format = LabelFormat::Json;
    let mut baker = TextBaker::with_index(config, index_with(&["a"])).unwrap();
    let result = baker.generate("aa").unwrap();
    let path = baker.save(&result, None, None).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path.with_extension("json")).unwrap())
            .unwrap();
    assert_eq!(value["text"], "aa");
    assert_eq!(value["seed"], 42);
    assert_eq!(value["glyphs"].as_array().unwrap().len(), 2);
}

#[test]
fn auto_filenames_do_not_collide() {
    let out = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.output.dir = out.path().to_owned();
    let mut baker = TextBaker::with_index(config, index_with(&["a"])).unwrap();
    let result = baker.generate("a").unwrap();
    let first = baker.save(&result, None, None).unwrap();
    let second = baker.save(&result, None, None).unwrap();
    assert_ne!(first, second);
    assert!(first.exists() && second.exists());
}

#[test]
fn explicit_stem_is_sanitized_and_reused() {
    let out = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.output.dir = out.path().to_owned();
    let mut baker = TextBaker::with_index(config, index_with(&["a"])).unwrap();
    let result = baker.generate("a").unwrap();
    let path = baker.save(&result, Some("my sample/01"), None).unwrap();
    assert!(path.file_name().unwrap().to_str().unwrap().starts_with("my_sample_01"));
    let again = baker.save(&result, Some("my sample/01"), None).unwrap();
    assert_eq!(path, again);
}

#[test]
fn save_directory_override_wins_over_the_config() {
    let configured = tempfile::tempdir().unwrap();
    let explicit = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.output.dir = configured.path().to_owned();
    let mut baker = TextBaker::with_index(config, index_with(&["a"])).unwrap();
    let result = baker.generate("a").unwrap();
    let path = baker.save(&result, None, Some(explicit.path())).unwrap();
    assert!(path.starts_with(explicit.path()));
    assert_eq!(std::fs::read_dir(configured.path()).unwrap().count(), 0);
}

#[test]
fn jpeg_output_honors_the_extension() {
    let out = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.output.dir = out.path().to_owned();
    config.output.format = OutputFormat::Jpeg;
    config.output.quality = 90;
    config.output.create_labels = false;
    let mut baker = TextBaker::with_index(config, index_with(&["a"])).unwrap();
    let result = baker.generate("a").unwrap();
    let path = baker.save(&result, None, None).unwrap();
    assert_eq!(path.extension().unwrap(), "jpg");
    assert!(image::open(&path).is_ok());
    assert!(!path.with_extension("txt").exists());
}
