//! Plymesh
//!
//! Extracts a triangle mesh from a PLY file and reports what was found:
//! vertex and triangle counts, optional attributes and bounds.

mod app;

use app::{AppError, LoggingConfig, RunConfig};
use clap::Parser;
use plymesh_data::ExtractOptions;
use std::path::PathBuf;

/// Plymesh - PLY triangle mesh extraction
#[derive(Parser, Debug)]
#[command(name = "plymesh")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to PLY file to load
    file: PathBuf,

    /// Skip vertex normals
    #[arg(long)]
    no_normals: bool,

    /// Skip texture coordinates
    #[arg(long)]
    no_uv: bool,

    /// Skip vertex colors
    #[arg(long)]
    no_color: bool,

    /// List the file's elements instead of extracting a mesh
    #[arg(long)]
    inspect: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> (RunConfig, LoggingConfig) {
        let options = ExtractOptions::default()
            .with_normals(!self.no_normals)
            .with_uv(!self.no_uv)
            .with_color(!self.no_color);
        let run = RunConfig {
            file: self.file,
            options,
            inspect: self.inspect,
            json: self.json,
        };
        (run, LoggingConfig { level: self.log_level })
    }
}

fn main() {
    let (config, logging) = Args::parse().into_config();
    app::init_logging(&logging);

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: RunConfig) -> Result<(), AppError> {
    let report = app::run(&config)?;
    println!("{}", report);
    Ok(())
}
