//! On-disk velocity field format.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One raw grid cell: absent, or three components that may each be absent.
pub type RawCell = Option<[Option<f32>; 3]>;

/// Spatial extent of a field along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl Bounds {
    /// Unit cube [0, 1] on every axis.
    pub fn unit() -> Self {
        Self {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
            z_min: 0.0,
            z_max: 1.0,
        }
    }
}

/// Parsed velocity field file.
///
/// `grid[i][j][k]` holds the vector for field row `i` (Y axis),
/// column `j` (X axis) and layer `k` (Z axis).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldFile {
    pub grid: Vec<Vec<Vec<RawCell>>>,
    pub bounds: Bounds,
    /// Magnitude mapped to the first color stop, if the producer supplied one.
    #[serde(default)]
    pub min: Option<f32>,
    /// Magnitude mapped to the last color stop, if the producer supplied one.
    #[serde(default)]
    pub max: Option<f32>,
}

impl FieldFile {
    /// Parse a field from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON field file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Grid dimensions as (y_len, x_len, z_len), read from the first row and column.
    pub fn dims(&self) -> (usize, usize, usize) {
        let y_len = self.grid.len();
        let x_len = self.grid.first().map_or(0, |row| row.len());
        let z_len = self
            .grid
            .first()
            .and_then(|row| row.first())
            .map_or(0, |col| col.len());
        (y_len, x_len, z_len)
    }
}

/// Field file loading errors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read field file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse field file: {0}")]
    Json(#[from] serde_json::Error),
}
