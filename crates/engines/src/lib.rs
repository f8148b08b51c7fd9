#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations, picks the noise
//! backend and provides CPU-side snapshot rendering.
//!
//! This crate sits between `island-zoom-core` (which defines the `Engine` and
//! `NoiseSource` traits) and the engine and backend crates, so the CLI does
//! not duplicate dispatch logic.

pub mod backend;
pub mod noise_field;
pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

pub use backend::NoiseBackend;
pub use noise_field::{NoiseField, NoiseFieldParams};

use island_zoom_core::{Engine, EngineError, Field, NoiseSource, PixelCoord, Seed};
use island_zoom_island::ZoomEngine;
use serde_json::Value;
use std::path::Path;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["island", "noise"];

/// Enumeration of all available frame generators.
///
/// Wraps each engine implementation and delegates `Engine` trait methods.
/// Use [`EngineKind::from_name`] for string-based construction.
pub enum EngineKind {
    /// Infinite zoom over island terrain.
    Island(ZoomEngine<Box<dyn NoiseSource>>),
    /// Drifting fractal noise.
    Noise(NoiseField<Box<dyn NoiseSource>>),
}

impl EngineKind {
    /// Constructs an engine by name on top of `backend`.
    ///
    /// Returns `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
        backend: &NoiseBackend,
    ) -> Result<Self, EngineError> {
        if !ENGINE_NAMES.contains(&name) {
            return Err(EngineError::UnknownEngine(name.to_string()));
        }
        let source = backend.build()?;
        log::debug!("building {name} engine on {} noise", source.name());
        match name {
            "island" => Ok(EngineKind::Island(ZoomEngine::from_json(
                width, height, seed, params, source,
            )?)),
            _ => Ok(EngineKind::Noise(NoiseField::from_json(
                width, height, seed, params, source,
            )?)),
        }
    }

    /// Constructs the engine a [`Seed`] describes.
    ///
    /// `clumpy_program` overrides the executable when the seed asks for the
    /// `clumpy` backend.
    pub fn from_seed(seed: &Seed, clumpy_program: Option<&Path>) -> Result<Self, EngineError> {
        seed.validate()?;
        let backend = NoiseBackend::from_name(&seed.noise, clumpy_program)?;
        Self::from_name(
            &seed.engine,
            seed.width,
            seed.height,
            seed.seed,
            &seed.params,
            &backend,
        )
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }
}

impl Engine for EngineKind {
    fn step(&mut self) -> Result<(), EngineError> {
        match self {
            EngineKind::Island(e) => e.step(),
            EngineKind::Noise(e) => e.step(),
        }
    }

    fn field(&self) -> &Field {
        match self {
            EngineKind::Island(e) => e.field(),
            EngineKind::Noise(e) => e.field(),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::Island(e) => e.params(),
            EngineKind::Noise(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::Island(e) => e.param_schema(),
            EngineKind::Noise(e) => e.param_schema(),
        }
    }

    fn marker(&self) -> Option<PixelCoord> {
        match self {
            EngineKind::Island(e) => e.marker(),
            EngineKind::Noise(e) => e.marker(),
        }
    }
}
