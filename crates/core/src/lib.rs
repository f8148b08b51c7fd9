#![deny(unsafe_code)]
//! Core types and traits for the island-zoom frame generators.
//!
//! Provides the `Field` height grid, the tile/pixel coordinate types with
//! `Viewport`, bilinear resampling and zero-crossing search, the `Engine` and
//! `NoiseSource` traits, height `Palette`s, the reproducible `Seed` run
//! description, and parameter helpers.

pub mod coords;
pub mod engine;
pub mod error;
pub mod field;
pub mod noise_source;
pub mod palette;
pub mod params;
pub mod sampling;
pub mod seed;

pub use coords::{LineSegment, PixelCoord, Resolution, TileCoord, Viewport, ViewportDelta};
pub use engine::Engine;
pub use error::EngineError;
pub use field::Field;
pub use noise_source::{GradientNoise, NoiseSource};
pub use palette::{Palette, Rgb8};
pub use seed::Seed;
