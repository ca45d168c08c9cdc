//! serde-ply backed element reader

use crate::error::ReaderError;
use crate::ply::reader::{ElementKind, ElementReader, Scalar};
use crate::triangulation::{polygon_triangle_count, triangulate_polygon};
use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_ply::PlyReader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

type Row = HashMap<String, JsonValue>;

// One element block: header declaration plus rows kept as property maps
#[derive(Debug)]
struct RawElement {
    name: String,
    // Declared property names, in header order
    properties: Vec<String>,
    rows: Vec<Row>,
}

/// Summary of one element, as reported by [`inspect_elements`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSummary {
    pub name: String,
    pub kind: ElementKind,
    pub rows: usize,
    pub properties: Vec<String>,
}

/// Element reader over a fully parsed PLY source.
///
/// The source is decoded once by `serde_ply` (ASCII or binary); the cursor
/// then walks the elements in file order and never rewinds. Property
/// indices refer to header declaration order.
///
/// Rows are held as `HashMap<String, serde_json::Value>`, which costs a few
/// hundred bytes per vertex; very large meshes need memory well beyond the
/// file size.
#[derive(Debug)]
pub struct PlyElementReader {
    elements: Vec<RawElement>,
    cursor: usize,
    // Property names of the loaded element
    properties: Vec<String>,
}

impl PlyElementReader {
    /// Open and parse a PLY file.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        debug!("Opening PLY file");
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a PLY stream.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, ReaderError> {
        let elements = read_elements(reader).map_err(|e| {
            warn!("Failed to parse PLY source: {}", e);
            e
        })?;

        debug!(
            "PLY source parsed: {} elements ({})",
            elements.len(),
            elements
                .iter()
                .map(|e| format!("{} x{}", e.name, e.rows.len()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            elements,
            cursor: 0,
            properties: Vec::new(),
        })
    }

    /// Summaries of every element, independent of the cursor.
    pub fn summaries(&self) -> Vec<ElementSummary> {
        self.elements
            .iter()
            .map(|element| ElementSummary {
                name: element.name.clone(),
                kind: ElementKind::from_name(&element.name),
                rows: element.rows.len(),
                properties: element.properties.clone(),
            })
            .collect()
    }

    fn current(&self) -> Option<&RawElement> {
        self.elements.get(self.cursor)
    }

    fn current_rows(&self) -> &[Row] {
        self.current().map(|e| e.rows.as_slice()).unwrap_or_default()
    }

    fn property_name(&self, prop: usize) -> Result<&str, ReaderError> {
        self.properties
            .get(prop)
            .map(String::as_str)
            .ok_or_else(|| ReaderError::Malformed(format!("Unknown property index {}", prop)))
    }

    fn list_values<'a>(&self, row: &'a Row, name: &str, i: usize) -> Result<&'a [JsonValue], ReaderError> {
        match row.get(name) {
            Some(JsonValue::Array(values)) => Ok(values),
            _ => Err(ReaderError::Malformed(format!(
                "Property '{}' at row {} is not a list",
                name, i
            ))),
        }
    }

    fn list_lengths(&self, prop: usize) -> Vec<usize> {
        let Ok(name) = self.property_name(prop) else {
            return Vec::new();
        };
        self.current_rows()
            .iter()
            .map(|row| match row.get(name) {
                Some(JsonValue::Array(values)) => values.len(),
                _ => 0,
            })
            .collect()
    }
}

/// List the elements of a PLY file without extracting anything.
pub fn inspect_elements(path: impl AsRef<Path>) -> Result<Vec<ElementSummary>, ReaderError> {
    Ok(PlyElementReader::open(path)?.summaries())
}

// Walk the header's element definitions, decoding each element's rows in turn
fn read_elements(reader: impl BufRead) -> Result<Vec<RawElement>, ReaderError> {
    let mut ply = PlyReader::from_reader(reader)?;
    let defs = ply.header().elem_defs.clone();

    let mut elements = Vec::with_capacity(defs.len());
    for def in defs {
        let rows: Vec<Row> = ply.next_element()?;
        elements.push(RawElement {
            name: def.name,
            properties: def.properties.into_iter().map(|p| p.name).collect(),
            rows,
        });
    }
    Ok(elements)
}

fn get_f64(prop: Option<&JsonValue>) -> Option<f64> {
    prop.and_then(|v| match v {
        JsonValue::Number(n) => n.as_f64(),
        _ => None,
    })
}

fn get_index(value: &JsonValue) -> Option<i32> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .or_else(|| n.as_u64().and_then(|u| i32::try_from(u).ok())),
        _ => None,
    }
}

fn decode_indices(values: &[JsonValue], i: usize) -> Result<Vec<i32>, ReaderError> {
    values
        .iter()
        .map(|v| {
            get_index(v).ok_or_else(|| {
                ReaderError::Malformed(format!("Invalid vertex index {} in face {}", v, i))
            })
        })
        .collect()
}

impl ElementReader for PlyElementReader {
    fn has_element(&self) -> bool {
        self.cursor < self.elements.len()
    }

    fn element_kind(&self) -> ElementKind {
        self.current()
            .map(|e| ElementKind::from_name(&e.name))
            .unwrap_or(ElementKind::Other)
    }

    fn element_name(&self) -> Option<&str> {
        self.current().map(|e| e.name.as_str())
    }

    fn load_element(&mut self) -> Result<(), ReaderError> {
        let element = self
            .current()
            .ok_or_else(|| ReaderError::Malformed("No element to load".to_string()))?;

        for (i, row) in element.rows.iter().enumerate() {
            if let Some(missing) = element.properties.iter().find(|name| !row.contains_key(*name)) {
                return Err(ReaderError::Malformed(format!(
                    "Missing '{}' at {} {}",
                    missing, element.name, i
                )));
            }
        }

        let properties = element.properties.clone();
        self.properties = properties;
        Ok(())
    }

    fn row_count(&self) -> usize {
        self.current_rows().len()
    }

    fn find_properties(&self, names: &[&str]) -> Option<Vec<usize>> {
        names
            .iter()
            .map(|name| self.properties.iter().position(|p| p == name))
            .collect()
    }

    fn extract_properties<T: Scalar, const N: usize>(
        &self,
        props: [usize; N],
        dst: &mut Vec<[T; N]>,
    ) -> Result<(), ReaderError> {
        let mut names = [""; N];
        for (slot, &prop) in names.iter_mut().zip(props.iter()) {
            *slot = self.property_name(prop)?;
        }

        for (i, row) in self.current_rows().iter().enumerate() {
            let mut out = [T::default(); N];
            for (value, name) in out.iter_mut().zip(names) {
                let number = get_f64(row.get(name)).ok_or_else(|| {
                    ReaderError::Malformed(format!("Property '{}' at row {} is not a number", name, i))
                })?;
                *value = T::from_f64(number);
            }
            dst.push(out);
        }
        Ok(())
    }

    fn requires_triangulation(&self, prop: usize) -> bool {
        self.list_lengths(prop).into_iter().any(|n| n != 3)
    }

    fn triangle_count(&self, prop: usize) -> usize {
        self.list_lengths(prop)
            .into_iter()
            .map(polygon_triangle_count)
            .sum()
    }

    fn extract_triangles(
        &self,
        prop: usize,
        positions: &[[f32; 3]],
        dst: &mut Vec<[i32; 3]>,
    ) -> Result<(), ReaderError> {
        let name = self.property_name(prop)?;
        for (i, row) in self.current_rows().iter().enumerate() {
            let indices = decode_indices(self.list_values(row, name, i)?, i)?;
            triangulate_polygon(&indices, positions, dst);
        }
        Ok(())
    }

    fn extract_list_property(&self, prop: usize, dst: &mut Vec<[i32; 3]>) -> Result<(), ReaderError> {
        let name = self.property_name(prop)?;
        for (i, row) in self.current_rows().iter().enumerate() {
            let indices = decode_indices(self.list_values(row, name, i)?, i)?;
            let triangle: [i32; 3] = indices.try_into().map_err(|v: Vec<i32>| {
                ReaderError::Malformed(format!("Face {} has {} indices, expected 3", i, v.len()))
            })?;
            dst.push(triangle);
        }
        Ok(())
    }

    fn next_element(&mut self) {
        if self.has_element() {
            self.cursor += 1;
        }
        self.properties.clear();
    }
}
