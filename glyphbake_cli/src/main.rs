// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command line front-end for the glyphbake generator.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glyphbake::{ColorMode, GeneratorConfig, RandomRange, Seed, TextBaker};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "glyphbake", about = "Bake labeled text images from glyph samples")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate images and write them to the output directory.
    Generate(GenerateArgs),
    /// Write a default configuration file to edit from.
    InitConfig {
        /// Destination path; the extension picks the format (.json or .toml).
        path: PathBuf,
    },
    /// List the character labels the dataset provides.
    Labels {
        /// Configuration file (.json or .toml).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Configuration file (.json or .toml). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Exact text to render; random text is drawn when omitted.
    #[arg(short, long)]
    text: Option<String>,
    /// Number of images to generate.
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,
    /// Override the configured seed.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Override the dataset directory.
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Override the output directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Override the rotation range, as "min,max" degrees.
    #[arg(long, value_parser = parse_range)]
    rotation: Option<RandomRange<f64>>,
    /// Override the perspective range, as "min,max" degrees.
    #[arg(long, value_parser = parse_range)]
    perspective: Option<RandomRange<f64>>,
    /// Override the scale range, as "min,max".
    #[arg(long, value_parser = parse_range)]
    scale: Option<RandomRange<f64>>,
    /// Override the shear range, as "min,max" degrees.
    #[arg(long, value_parser = parse_range)]
    shear: Option<RandomRange<f64>>,
    /// Render every glyph in one fixed color, as "r,g,b".
    #[arg(long, value_parser = parse_rgb)]
    color: Option<[u8; 3]>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    match args.command {
        Command::Generate(args) => generate(args),
        Command::InitConfig { path } => {
            GeneratorConfig::default()
                .to_file(&path)
                .with_context(|| format!("writing default config to {}", path.display()))?;
            println!("wrote {}", path.display());
            Ok(())
        }
        Command::Labels { config } => {
            let config = load_config(config.as_deref())?;
            let mut baker = TextBaker::new(config)?;
            for label in baker.available_characters()? {
                println!("{label}");
            }
            Ok(())
        }
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = Seed(seed);
    }
    if let Some(dataset) = args.dataset {
        config.dataset.dir = dataset;
    }
    if let Some(output) = args.output {
        config.output.dir = output;
    }
    if let Some(rotation) = args.rotation {
        config.transform.rotation = rotation;
    }
    if let Some(perspective) = args.perspective {
        config.transform.perspective = perspective;
    }
    if let Some(scale) = args.scale {
        config.transform.scale = scale;
    }
    if let Some(shear) = args.shear {
        config.transform.shear = shear;
    }
    if let Some(rgb) = args.color {
        config.color.mode = ColorMode::Fixed;
        config.color.fixed = Some(rgb);
    }

    // TextBaker::new re-validates, catching bad overrides.
    let mut baker = TextBaker::new(config)?;
    let mut saved = 0_usize;
    for _ in 0..args.count {
        let result = match &args.text {
            Some(text) => baker.generate(text)?,
            None => baker.generate_random(None)?,
        };
        let path = baker.save(&result, None, None)?;
        info!("{} -> {}", result.text, path.display());
        saved += 1;
    }
    println!("generated {saved} image(s)");
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn parse_range(s: &str) -> Result<RandomRange<f64>> {
    let Some((min, max)) = s.split_once(',') else {
        bail!("expected \"min,max\", got {s:?}");
    };
    let min: f64 = min.trim().parse().context("range min is not a number")?;
    let max: f64 = max.trim().parse().context("range max is not a number")?;
    if min > max {
        bail!("range min {min} exceeds max {max}");
    }
    Ok(RandomRange::new(min, max))
}

fn parse_rgb(s: &str) -> Result<[u8; 3]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        bail!("expected \"r,g,b\", got {s:?}");
    };
    Ok([
        r.parse().context("red channel is not in 0-255")?,
        g.parse().context("green channel is not in 0-255")?,
        b.parse().context("blue channel is not in 0-255")?,
    ])
}
