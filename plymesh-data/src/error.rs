//! Error types for PLY reading and mesh extraction.

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors raised by an element reader while opening or decoding a source.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PLY parsing error: {0}")]
    Parse(String),

    #[error("Malformed element data: {0}")]
    Malformed(String),
}

impl From<serde_ply::DeserializeError> for ReaderError {
    fn from(err: serde_ply::DeserializeError) -> Self {
        ReaderError::Parse(err.to_string())
    }
}

/// Errors that end a mesh extraction.
///
/// Every variant is fatal; no partially extracted buffers are returned
/// alongside an error.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Invalid or unrecognized PLY source: {0}")]
    InvalidSource(#[from] ReaderError),

    #[error("No vertex element with x, y, z properties was found")]
    MissingVertexData,

    #[error("No face element with a vertex index list was found")]
    MissingFaceData,

    #[error("Need vertex positions to triangulate faces, but the face element precedes the vertex element")]
    MissingDependency,

    #[error("Failed to allocate {buffer} buffer for {rows} rows")]
    AllocationFailure { buffer: &'static str, rows: usize },
}

/// Allocate an empty buffer able to hold `rows` rows without reallocating.
///
/// Capacity overflow and allocator refusal both map to
/// [`MeshError::AllocationFailure`].
pub(crate) fn try_alloc<T>(buffer: &'static str, rows: usize) -> Result<Vec<T>, MeshError> {
    let mut data = Vec::new();
    data.try_reserve_exact(rows)
        .map_err(|_: TryReserveError| MeshError::AllocationFailure { buffer, rows })?;
    Ok(data)
}
