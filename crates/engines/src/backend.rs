//! Selection of the noise generator behind the engines.

use island_zoom_clumpy::{ClumpyCli, DEFAULT_PROGRAM};
use island_zoom_core::{EngineError, GradientNoise, NoiseSource};
use std::path::{Path, PathBuf};

const BACKEND_NAMES: &[&str] = &["builtin", "clumpy"];

/// Where noise layers come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoiseBackend {
    /// In-process Perlin noise.
    Builtin,
    /// The external `clumpy` executable at the given path.
    Clumpy(PathBuf),
}

impl NoiseBackend {
    /// Resolves a backend by name.
    ///
    /// `clumpy_program` overrides the executable for the `clumpy` backend;
    /// by default it is looked up on `PATH`.
    pub fn from_name(name: &str, clumpy_program: Option<&Path>) -> Result<Self, EngineError> {
        match name {
            "builtin" => Ok(NoiseBackend::Builtin),
            "clumpy" => Ok(NoiseBackend::Clumpy(
                clumpy_program
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM)),
            )),
            _ => Err(EngineError::UnknownNoiseBackend(name.to_string())),
        }
    }

    /// Returns a slice of all recognized backend names.
    pub fn list_names() -> &'static [&'static str] {
        BACKEND_NAMES
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoiseBackend::Builtin => "builtin",
            NoiseBackend::Clumpy(_) => "clumpy",
        }
    }

    /// Instantiates the backend.
    pub fn build(&self) -> Result<Box<dyn NoiseSource>, EngineError> {
        match self {
            NoiseBackend::Builtin => Ok(Box::new(GradientNoise)),
            NoiseBackend::Clumpy(program) => Ok(Box::new(ClumpyCli::new(program.clone())?)),
        }
    }
}
