//! Mesh extraction over an element reader.
//!
//! Elements are visited in file order. The first `vertex` element that
//! declares x, y, z becomes the vertex block, and the first `face` element
//! that declares a vertex index list becomes the face block. Scanning stops
//! as soon as both are found. Buffers are owned by the call until the mesh
//! is returned, so every error path drops whatever was allocated so far.

use crate::error::{MeshError, ReaderError, try_alloc};
use crate::mesh::{ExtractOptions, Mesh, MeshAttribute, VertexBlock};
use crate::ply::{ElementKind, ElementReader, PlyElementReader, Scalar, Semantic};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, trace};

/// Extract a triangle mesh from a PLY file.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn extract_mesh(path: impl AsRef<Path>, options: ExtractOptions) -> Result<Mesh, MeshError> {
    let mut reader = PlyElementReader::open(path)?;
    extract(&mut reader, options)
}

/// Extract a triangle mesh from an in-memory or streamed PLY source.
pub fn extract_mesh_from_reader(source: impl BufRead, options: ExtractOptions) -> Result<Mesh, MeshError> {
    let mut reader = PlyElementReader::from_reader(source)?;
    extract(&mut reader, options)
}

/// Drive `reader` from its current element until a vertex block and a face
/// block have been read.
pub fn extract<R: ElementReader>(reader: &mut R, options: ExtractOptions) -> Result<Mesh, MeshError> {
    let mut vertices: Option<VertexBlock> = None;
    let mut indices: Option<Vec<[i32; 3]>> = None;

    while reader.has_element() {
        match reader.element_kind() {
            ElementKind::Vertex if vertices.is_none() => {
                reader.load_element()?;
                vertices = read_vertex_block(reader, options)?;
            }
            ElementKind::Face if indices.is_none() => {
                reader.load_element()?;
                indices = read_face_block(reader, vertices.as_ref())?;
            }
            kind => {
                trace!(
                    "Skipping element '{}' ({:?})",
                    reader.element_name().unwrap_or_default(),
                    kind
                );
            }
        }

        if vertices.is_some() && indices.is_some() {
            break;
        }
        reader.next_element();
    }

    let vertices = vertices.ok_or(MeshError::MissingVertexData)?;
    let indices = indices.ok_or(MeshError::MissingFaceData)?;

    let mesh = Mesh::new(vertices, indices);
    info!(
        "Extracted mesh: {} vertices, {} triangles, attributes {:?}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.attributes()
    );
    Ok(mesh)
}

/// Read the loaded vertex element, or `None` if it has no positions.
fn read_vertex_block<R: ElementReader>(
    reader: &R,
    options: ExtractOptions,
) -> Result<Option<VertexBlock>, MeshError> {
    let Some(props) = reader.find_semantic(Semantic::Position) else {
        debug!("Vertex element has no x, y, z properties, skipping");
        return Ok(None);
    };

    let rows = reader.row_count();
    let positions = read_attribute::<R, f32, 3>(reader, "position", props, rows)?;

    let normals = read_optional::<R, f32, 3>(reader, options, MeshAttribute::Normal, rows)?;
    let uv = read_optional::<R, f32, 2>(reader, options, MeshAttribute::TexCoord, rows)?;
    let colors = read_optional::<R, u8, 3>(reader, options, MeshAttribute::Color, rows)?;

    debug!("Read vertex block with {} rows", rows);
    Ok(Some(VertexBlock {
        positions,
        normals,
        uv,
        colors,
    }))
}

fn read_optional<R: ElementReader, T: Scalar, const N: usize>(
    reader: &R,
    options: ExtractOptions,
    attribute: MeshAttribute,
    rows: usize,
) -> Result<Option<Vec<[T; N]>>, MeshError> {
    if !options.requests(attribute) {
        return Ok(None);
    }

    let (semantic, buffer) = match attribute {
        MeshAttribute::Position => (Semantic::Position, "position"),
        MeshAttribute::Normal => (Semantic::Normal, "normal"),
        MeshAttribute::TexCoord => (Semantic::TexCoord, "uv"),
        MeshAttribute::Color => (Semantic::Color, "color"),
    };

    match reader.find_semantic(semantic) {
        Some(props) => read_attribute(reader, buffer, props, rows).map(Some),
        None => {
            debug!("Requested {:?} not present in vertex element", attribute);
            Ok(None)
        }
    }
}

fn read_attribute<R: ElementReader, T: Scalar, const N: usize>(
    reader: &R,
    buffer: &'static str,
    props: Vec<usize>,
    rows: usize,
) -> Result<Vec<[T; N]>, MeshError> {
    let props: [usize; N] = props.try_into().map_err(|p: Vec<usize>| {
        ReaderError::Malformed(format!(
            "Expected {} properties for {} buffer, found {}",
            N,
            buffer,
            p.len()
        ))
    })?;

    let mut data = try_alloc::<[T; N]>(buffer, rows)?;
    reader.extract_properties(props, &mut data)?;
    check_rows(buffer, data.len(), rows)?;
    Ok(data)
}

/// Read the loaded face element as triangles, or `None` if it has no index
/// list or yields no triangles.
fn read_face_block<R: ElementReader>(
    reader: &R,
    vertices: Option<&VertexBlock>,
) -> Result<Option<Vec<[i32; 3]>>, MeshError> {
    let Some(prop) = reader.find_semantic(Semantic::Indices).and_then(|p| p.first().copied()) else {
        debug!("Face element has no vertex index list, skipping");
        return Ok(None);
    };

    let triangles = reader.triangle_count(prop);
    if triangles == 0 {
        debug!("Face element yields no triangles, skipping");
        return Ok(None);
    }

    let polygons = reader.requires_triangulation(prop);
    if polygons && vertices.is_none() {
        return Err(MeshError::MissingDependency);
    }

    let mut data = try_alloc::<[i32; 3]>("index", triangles)?;

    match vertices {
        Some(block) if polygons => {
            debug!("Triangulating {} faces into {} triangles", reader.row_count(), triangles);
            reader.extract_triangles(prop, &block.positions, &mut data)?;
        }
        _ => reader.extract_list_property(prop, &mut data)?,
    }
    check_rows("index", data.len(), triangles)?;

    Ok(Some(data))
}

fn check_rows(buffer: &str, decoded: usize, expected: usize) -> Result<(), ReaderError> {
    if decoded == expected {
        Ok(())
    } else {
        Err(ReaderError::Malformed(format!(
            "Decoded {} rows into {} buffer, expected {}",
            decoded, buffer, expected
        )))
    }
}
