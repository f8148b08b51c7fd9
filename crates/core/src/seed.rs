//! Reproducible description of a render run.
//!
//! A [`Seed`] captures everything needed to recreate a frame sequence:
//! engine name, resolution, parameters, PRNG seed, frame count and noise
//! backend. It is stored as JSON next to rendered frames.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_noise() -> String {
    "builtin".to_string()
}

/// Reproducible description of a render run.
///
/// Two identical `Seed` values rendered with the same noise backend produce
/// identical frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub engine: String,
    pub width: usize,
    pub height: usize,
    pub params: serde_json::Value,
    pub seed: u64,
    pub steps: usize,
    #[serde(default = "default_noise")]
    pub noise: String,
}

impl Seed {
    /// Creates a new Seed with default params (`{}`), steps (`0`) and the
    /// builtin noise backend.
    pub fn new(engine: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            engine: engine.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            steps: 0,
            noise: default_noise(),
        }
    }

    /// Validates that the seed has non-zero dimensions and that
    /// `width * height` does not overflow.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(())
    }

    /// Reads and validates a seed from a JSON file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path)
            .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
        let seed: Seed = serde_json::from_str(&text)
            .map_err(|e| EngineError::InvalidSeed(format!("{}: {e}", path.display())))?;
        seed.validate()?;
        log::debug!("loaded run seed from {}", path.display());
        Ok(seed)
    }

    /// Writes the seed as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
        fs::write(path, text).map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_seed_with_defaults() {
        let s = Seed::new("island", 256, 256, 42);
        assert_eq!(s.engine, "island");
        assert_eq!(s.width, 256);
        assert_eq!(s.height, 256);
        assert_eq!(s.seed, 42);
        assert_eq!(s.steps, 0);
        assert_eq!(s.noise, "builtin");
        assert_eq!(s.params, serde_json::json!({}));
    }

    #[test]
    fn json_round_trip_with_custom_params() {
        let mut s = Seed::new("island", 128, 96, 99);
        s.params = serde_json::json!({
            "octaves": 5,
            "zoom_speed": 2.0,
            "island_mask": false
        });
        s.steps = 240;
        s.noise = "clumpy".into();

        let json = serde_json::to_string_pretty(&s).unwrap();
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn missing_noise_key_defaults_to_builtin() {
        let json = r#"{"engine":"noise","width":8,"height":8,"params":{},"seed":1,"steps":3}"#;
        let s: Seed = serde_json::from_str(json).unwrap();
        assert_eq!(s.noise, "builtin");
    }

    #[test]
    fn validate_rejects_bad_dimensions() {
        assert!(Seed::new("island", 512, 512, 42).validate().is_ok());
        assert!(Seed::new("island", 0, 512, 42).validate().is_err());
        assert!(Seed::new("island", 512, 0, 42).validate().is_err());
        assert!(Seed::new("island", usize::MAX, 2, 42).validate().is_err());
    }

    #[test]
    fn save_then_load_restores_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let mut s = Seed::new("island", 64, 32, 7);
        s.steps = 12;
        s.save(&path).unwrap();
        assert_eq!(Seed::load(&path).unwrap(), s);
    }

    #[test]
    fn load_rejects_zero_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        Seed::new("island", 0, 32, 7).save(&path).unwrap();
        assert!(matches!(Seed::load(&path), Err(EngineError::InvalidDimensions)));
    }

    #[test]
    fn load_malformed_json_is_invalid_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        fs::write(&path, r#"{"engine": "island", "width": 8"#).unwrap();
        match Seed::load(&path) {
            Err(EngineError::InvalidSeed(msg)) => assert!(msg.contains("seed.json"), "{msg}"),
            other => panic!("expected InvalidSeed, got {other:?}"),
        }
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = Seed::load(Path::new("/nonexistent/island-zoom/seed.json"));
        assert!(matches!(result, Err(EngineError::Io(_))));
    }
}
