#![warn(missing_docs)]

//! Scene description data model and text loader for patchfield.
//!
//! A scene file is a flat sequence of whitespace-separated numbers:
//!
//! ```text
//! <num_lights>
//! <pos.x pos.y pos.z intensity.r intensity.g intensity.b> x num_lights
//! <rows> <cols>
//! <rows * cols heights, row-major>
//! ```
//!
//! Parsing is strict: short files, non-numeric tokens, and grid
//! dimensions that do not partition into 4x4 blocks all fail the load.
//! Trailing tokens after the last height are ignored, matching the
//! stream-reader behavior of the usual producers of these files.

use patchfield_grid::{ControlGrid, GridError};
use serde::{Deserialize, Serialize};
use std::str::SplitWhitespace;
use thiserror::Error;

/// Errors raised while loading a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The file ended before the declared data was read.
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEnd(&'static str),

    /// A token could not be parsed as a number.
    #[error("invalid {expected} value: {token:?}")]
    InvalidNumber {
        /// What the token was being read as.
        expected: &'static str,
        /// The offending token.
        token: String,
    },

    /// The declared grid failed validation.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Result type for scene loading.
pub type Result<T> = std::result::Result<T, SceneError>;

/// A point light: world-space position and RGB intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// World-space position `[x, y, z]`.
    pub position: [f64; 3],
    /// RGB intensity.
    pub intensity: [f64; 3],
}

/// A parsed scene description: lights plus the control-point height grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Point lights, in file order.
    pub lights: Vec<PointLight>,
    /// The control-point height grid.
    pub grid: ControlGrid,
}

impl SceneDescription {
    /// Parse a scene description from its text form.
    pub fn parse(input: &str) -> Result<Self> {
        let mut tokens = Tokens::new(input);

        let num_lights = tokens.next_usize("light count")?;
        let mut lights = Vec::with_capacity(num_lights);
        for _ in 0..num_lights {
            lights.push(PointLight {
                position: tokens.next_triple("light position")?,
                intensity: tokens.next_triple("light intensity")?,
            });
        }

        let rows = tokens.next_usize("grid row count")?;
        let cols = tokens.next_usize("grid column count")?;
        let mut heights = Vec::with_capacity(rows.saturating_mul(cols));
        for _ in 0..rows * cols {
            heights.push(tokens.next_f64("height value")?);
        }

        let grid = ControlGrid::new(rows, cols, heights)?;
        Ok(Self { lights, grid })
    }
}

/// Whitespace tokenizer with typed, error-reporting readers.
struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace(),
        }
    }

    fn next_token(&mut self, expected: &'static str) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or(SceneError::UnexpectedEnd(expected))
    }

    fn next_usize(&mut self, expected: &'static str) -> Result<usize> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| SceneError::InvalidNumber {
            expected,
            token: token.to_owned(),
        })
    }

    fn next_f64(&mut self, expected: &'static str) -> Result<f64> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| SceneError::InvalidNumber {
            expected,
            token: token.to_owned(),
        })
    }

    fn next_triple(&mut self, expected: &'static str) -> Result<[f64; 3]> {
        Ok([
            self.next_f64(expected)?,
            self.next_f64(expected)?,
            self.next_f64(expected)?,
        ])
    }
}
