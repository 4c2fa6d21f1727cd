// SPDX-License-Identifier: MPL-2.0
//! Geographic cell table for classifier backends.
//!
//! A classifier over geographic cells emits one logit per cell; this table
//! maps each output index to the cell's center.
//!
//! ```toml
//! [[cell]]
//! label = "Île-de-France"
//! latitude = 48.85
//! longitude = 2.35
//! ```

use crate::domain::error::CoordinateRangeError;
use crate::domain::geo::Coordinate;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Errors loading a cell table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellTableError {
    /// The file could not be read.
    Io(String),
    /// The file is not a valid cell table.
    Parse(String),
    /// A row holds an out-of-range center.
    InvalidCell {
        /// Zero-based row index, which is also the classifier output index.
        index: usize,
        source: CoordinateRangeError,
    },
    /// The table has no rows.
    Empty,
}

impl fmt::Display for CellTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellTableError::Io(msg) => write!(f, "Cannot read cell table: {msg}"),
            CellTableError::Parse(msg) => write!(f, "Invalid cell table: {msg}"),
            CellTableError::InvalidCell { index, source } => {
                write!(f, "Invalid cell table: cell {index}: {source}")
            }
            CellTableError::Empty => write!(f, "Invalid cell table: no cells"),
        }
    }
}

impl std::error::Error for CellTableError {}

/// One classifier output class.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCell {
    pub label: String,
    pub center: Coordinate,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CellFile {
    #[serde(default)]
    cell: Vec<CellRow>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CellRow {
    label: String,
    latitude: f64,
    longitude: f64,
}

/// Cell centers indexed by classifier output position.
#[derive(Debug, Clone, PartialEq)]
pub struct CellTable {
    cells: Vec<GeoCell>,
}

impl CellTable {
    /// Builds a table from already validated cells.
    ///
    /// # Errors
    ///
    /// Returns [`CellTableError::Empty`] for an empty list.
    pub fn new(cells: Vec<GeoCell>) -> Result<Self, CellTableError> {
        if cells.is_empty() {
            return Err(CellTableError::Empty);
        }
        Ok(Self { cells })
    }

    /// Parses a TOML cell table.
    ///
    /// # Errors
    ///
    /// Returns a [`CellTableError`] if the document does not parse, a row's
    /// coordinate is out of range, or there are no rows.
    pub fn from_toml_str(content: &str) -> Result<Self, CellTableError> {
        let file: CellFile =
            toml::from_str(content).map_err(|e| CellTableError::Parse(e.to_string()))?;

        let cells = file
            .cell
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                Coordinate::new(row.latitude, row.longitude)
                    .map(|center| GeoCell {
                        label: row.label,
                        center,
                    })
                    .map_err(|source| CellTableError::InvalidCell { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(cells)
    }

    /// Loads a TOML cell table from disk.
    ///
    /// # Errors
    ///
    /// See [`CellTable::from_toml_str`]; unreadable files are
    /// [`CellTableError::Io`].
    pub fn load(path: &Path) -> Result<Self, CellTableError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CellTableError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a table has at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GeoCell> {
        self.cells.get(index)
    }
}
