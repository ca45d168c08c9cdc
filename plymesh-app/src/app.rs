//! Report building and logging setup.

use plymesh_data::{ExtractOptions, Mesh, MeshError, ReaderError, extract_mesh, inspect_elements};
use std::fmt::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("Failed to read PLY file: {0}")]
    Reader(#[from] ReaderError),

    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
}

/// What to do for one invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub file: PathBuf,
    pub options: ExtractOptions,
    pub inspect: bool,
    pub json: bool,
}

pub fn init_logging(config: &LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the configured action and return the text to print.
pub fn run(config: &RunConfig) -> Result<String, AppError> {
    info!("Loading {}", config.file.display());

    if config.inspect {
        let elements = inspect_elements(&config.file)?;
        if config.json {
            return Ok(serde_json::to_string_pretty(&elements)?);
        }
        let mut out = String::new();
        for element in &elements {
            let _ = writeln!(
                out,
                "{} ({:?}): {} rows [{}]",
                element.name,
                element.kind,
                element.rows,
                element.properties.join(", ")
            );
        }
        return Ok(out.trim_end().to_string());
    }

    let mesh = extract_mesh(&config.file, config.options)?;
    if config.json {
        return Ok(serde_json::to_string_pretty(&mesh.summary())?);
    }
    Ok(describe(&mesh))
}

fn describe(mesh: &Mesh) -> String {
    let summary = mesh.summary();
    let mut out = format!(
        "vertices:   {}\ntriangles:  {}\nattributes: {:?}",
        summary.vertices, summary.triangles, summary.attributes
    );
    if let Some([min, max]) = summary.bounds {
        let _ = write!(out, "\nbounds:     {:?} .. {:?}", min, max);
    }
    let _ = write!(out, "\narea:       {:.4}", summary.surface_area);
    out
}
