// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The error taxonomy of the generation pipeline.

use thiserror::Error;

/// Errors that can occur while generating text images.
///
/// All of these are raised synchronously out of the generate family of
/// methods. The engine never substitutes a default or returns a partially
/// generated image on error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A character in the requested text has no registered glyph samples.
    ///
    /// This is raised before any transform work begins.
    #[error("no glyph samples registered for label {0:?}")]
    UnknownLabel(String),
    /// A configured or sampled transform parameter is invalid or would
    /// produce a degenerate (zero-area) glyph.
    #[error("invalid transform parameter: {0}")]
    Transform(String),
    /// A glyph's placed vertical extent leaves the declared canvas.
    #[error("glyph placed at y={y} with height {height} exceeds canvas height {canvas_height}")]
    LayoutOverflow {
        /// Top edge of the placed glyph, relative to the canvas.
        y: i64,
        /// Height of the placed glyph.
        height: u16,
        /// Configured canvas height.
        canvas_height: u16,
    },
    /// The chosen background cannot hold the assembled text canvas under
    /// the strict placement policy.
    #[error(
        "background of {width}x{height} cannot hold text canvas of {text_width}x{text_height}"
    )]
    BackgroundTooSmall {
        /// Background width.
        width: u16,
        /// Background height.
        height: u16,
        /// Assembled text canvas width.
        text_width: u16,
        /// Assembled text canvas height.
        text_height: u16,
    },
    /// A configuration field failed validation at construction time.
    #[error("invalid configuration: {0}")]
    ConfigValidation(String),
    /// An underlying I/O operation failed.
    #[error("i/o error")]
    Io(#[from] std::io::Error),
    /// Decoding or encoding an image file failed.
    #[error("image codec error")]
    Image(#[from] image::ImageError),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
