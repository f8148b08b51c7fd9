#![deny(unsafe_code)]
//! Noise source backed by the external `clumpy` command-line tool.
//!
//! Each layer runs `clumpy gradient_noise <W>x<H> <l,b,r,t> <freq> <seed>` in
//! a private scratch directory and loads the `gradient_noise.npy` it writes.
//! The call blocks until the tool exits; any failure aborts the run.

pub mod npy;

use island_zoom_core::{EngineError, Field, NoiseSource, Resolution, Viewport};
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// File the `gradient_noise` command writes into its working directory.
const OUTPUT_FILE: &str = "gradient_noise.npy";

/// Program name used when no explicit path is given.
pub const DEFAULT_PROGRAM: &str = "clumpy";

/// Arguments for one `gradient_noise` invocation.
///
/// clumpy parses the seed with `atoi`, so it is folded into the positive
/// `int` range.
pub fn gradient_noise_args(
    res: Resolution,
    viewport: &Viewport,
    frequency: f64,
    seed: u32,
) -> Vec<String> {
    let [left, bottom, right, top] = viewport.bounds();
    vec![
        "gradient_noise".to_string(),
        format!("{}x{}", res.width, res.height),
        format!("{left},{bottom},{right},{top}"),
        frequency.to_string(),
        (seed & i32::MAX as u32).to_string(),
    ]
}

/// A [`NoiseSource`] that shells out to `clumpy`.
#[derive(Debug)]
pub struct ClumpyCli {
    program: PathBuf,
    workdir: TempDir,
}

impl ClumpyCli {
    /// Prepares a backend running `program` inside a fresh scratch directory.
    ///
    /// A relative `program` containing a path separator is resolved against
    /// the current directory, since the tool runs elsewhere.
    pub fn new(program: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let program = program.into();
        let program = if program.is_relative() && program.components().count() > 1 {
            std::env::current_dir()
                .map_err(|e| EngineError::Io(e.to_string()))?
                .join(program)
        } else {
            program
        };
        let workdir = tempfile::Builder::new()
            .prefix("island-zoom-clumpy-")
            .tempdir()
            .map_err(|e| EngineError::Io(format!("cannot create scratch directory: {e}")))?;
        Ok(Self { program, workdir })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Directory the tool runs in.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    fn remove_stale_output(&self, path: &Path) -> Result<(), EngineError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::Io(format!("{}: {e}", path.display()))),
        }
    }
}

impl NoiseSource for ClumpyCli {
    fn name(&self) -> &str {
        "clumpy"
    }

    fn generate(
        &self,
        res: Resolution,
        viewport: &Viewport,
        frequency: f64,
        seed: u32,
    ) -> Result<Field, EngineError> {
        let args = gradient_noise_args(res, viewport, frequency, seed);
        let command = format!("{} {}", self.program.display(), args.join(" "));
        let output_path = self.workdir.path().join(OUTPUT_FILE);
        self.remove_stale_output(&output_path)?;

        debug!("running {command}");
        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(self.workdir.path())
            .output()
            .map_err(|e| EngineError::External {
                command: command.clone(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::External {
                command,
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        let bytes = fs::read(&output_path).map_err(|e| EngineError::External {
            command: command.clone(),
            reason: format!("no {OUTPUT_FILE} produced: {e}"),
        })?;
        let field = npy::decode(&bytes)?.into_field()?;
        if field.resolution() != res {
            return Err(EngineError::NpyFormat(format!(
                "`{command}` produced {}x{}, expected {}x{}",
                field.width(),
                field.height(),
                res.width,
                res.height
            )));
        }
        Ok(field)
    }
}
