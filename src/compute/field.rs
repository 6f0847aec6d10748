//! Discretized 3D velocity field with nearest-cell sampling.
//!
//! Grid cells are addressed as `(i, j, k)` where `i` runs along the field's
//! Y axis, `j` along X and `k` along Z. Positions are continuous `[x, y, z]`
//! coordinates inside the field's [`Bounds`].

use std::fmt;

use rand::Rng;

use crate::schema::{Bounds, FieldFile, RawCell};

/// A 3D vector or point, `[x, y, z]`.
pub type Vec3 = [f32; 3];

/// Grid cell index `(i, j, k)` = (Y row, X column, Z layer).
pub type CellIndex = (usize, usize, usize);

/// Field axis, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Immutable velocity grid.
#[derive(Debug, Clone)]
pub struct VectorField {
    /// Flat cell storage, indexed by `(i * x_len + j) * z_len + k`.
    cells: Vec<Option<Vec3>>,
    y_len: usize,
    x_len: usize,
    z_len: usize,
    bounds: Bounds,
    /// Cell extent per axis, `[x_size, y_size, z_size]`.
    cell_size: Vec3,
    /// Cells with all three components defined, in grid order.
    valid_cells: Vec<CellIndex>,
}

impl VectorField {
    /// Build a field from a nested `[i][j][k]` grid.
    ///
    /// A cell is valid only if all three components are present and finite.
    pub fn new(grid: &[Vec<Vec<RawCell>>], bounds: Bounds) -> Result<Self, FieldError> {
        let y_len = grid.len();
        let x_len = grid.first().map_or(0, |row| row.len());
        let z_len = grid.first().and_then(|row| row.first()).map_or(0, |c| c.len());

        let mut cells = Vec::with_capacity(y_len * x_len * z_len);
        for (i, row) in grid.iter().enumerate() {
            if row.len() != x_len {
                return Err(ShapeError::RaggedRow {
                    row: i,
                    expected: x_len,
                    found: row.len(),
                }
                .into());
            }
            for (j, column) in row.iter().enumerate() {
                if column.len() != z_len {
                    return Err(ShapeError::RaggedColumn {
                        row: i,
                        column: j,
                        expected: z_len,
                        found: column.len(),
                    }
                    .into());
                }
                cells.extend(column.iter().map(resolve_cell));
            }
        }

        Self::from_cells(cells, (y_len, x_len, z_len), bounds)
    }

    /// Build a field from a parsed field file.
    pub fn from_file(file: &FieldFile) -> Result<Self, FieldError> {
        Self::new(&file.grid, file.bounds)
    }

    /// Build a field by evaluating `f(i, j, k)` for every cell.
    pub fn from_fn<F>(dims: (usize, usize, usize), bounds: Bounds, f: F) -> Result<Self, FieldError>
    where
        F: Fn(usize, usize, usize) -> Option<Vec3>,
    {
        let (y_len, x_len, z_len) = dims;
        let mut cells = Vec::with_capacity(y_len * x_len * z_len);
        for i in 0..y_len {
            for j in 0..x_len {
                for k in 0..z_len {
                    cells.push(f(i, j, k).filter(|v| v.iter().all(|c| c.is_finite())));
                }
            }
        }
        Self::from_cells(cells, dims, bounds)
    }

    fn from_cells(
        cells: Vec<Option<Vec3>>,
        dims: (usize, usize, usize),
        bounds: Bounds,
    ) -> Result<Self, FieldError> {
        let (y_len, x_len, z_len) = dims;
        for (axis, len) in [(Axis::Y, y_len), (Axis::X, x_len), (Axis::Z, z_len)] {
            if len == 0 {
                return Err(ShapeError::ZeroLengthAxis(axis).into());
            }
        }
        for (axis, min, max) in [
            (Axis::X, bounds.x_min, bounds.x_max),
            (Axis::Y, bounds.y_min, bounds.y_max),
            (Axis::Z, bounds.z_min, bounds.z_max),
        ] {
            if !(min.is_finite() && max.is_finite() && max > min) {
                return Err(ShapeError::InvalidBounds { axis, min, max }.into());
            }
        }

        let cell_size = [
            (bounds.x_max - bounds.x_min) / x_len as f32,
            (bounds.y_max - bounds.y_min) / y_len as f32,
            (bounds.z_max - bounds.z_min) / z_len as f32,
        ];

        let mut valid_cells = Vec::new();
        for i in 0..y_len {
            for j in 0..x_len {
                for k in 0..z_len {
                    if cells[(i * x_len + j) * z_len + k].is_some() {
                        valid_cells.push((i, j, k));
                    }
                }
            }
        }
        if valid_cells.is_empty() {
            return Err(FieldError::Empty);
        }

        Ok(Self {
            cells,
            y_len,
            x_len,
            z_len,
            bounds,
            cell_size,
            valid_cells,
        })
    }

    /// Grid dimensions as (y_len, x_len, z_len).
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.y_len, self.x_len, self.z_len)
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Cell extent per axis, `[x_size, y_size, z_size]`.
    #[inline]
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Fully defined cells in grid order.
    #[inline]
    pub fn valid_cells(&self) -> &[CellIndex] {
        &self.valid_cells
    }

    /// Stored vector at a cell, `None` if absent or out of range.
    #[inline]
    pub fn get(&self, (i, j, k): CellIndex) -> Option<Vec3> {
        if i >= self.y_len || j >= self.x_len || k >= self.z_len {
            return None;
        }
        self.cells[(i * self.x_len + j) * self.z_len + k]
    }

    /// Nearest cell to a position, `None` if it rounds outside the grid.
    ///
    /// Halves round up, so a point half a cell below the minimum still maps to cell 0.
    pub fn cell_index(&self, position: Vec3) -> Option<CellIndex> {
        let b = &self.bounds;
        let j = axis_index(position[0], b.x_min, self.cell_size[0], self.x_len)?;
        let i = axis_index(position[1], b.y_min, self.cell_size[1], self.y_len)?;
        let k = axis_index(position[2], b.z_min, self.cell_size[2], self.z_len)?;
        Some((i, j, k))
    }

    /// Sample the field at a continuous position (nearest cell, no interpolation).
    ///
    /// Returns `None` outside the grid or on an absent cell.
    #[inline]
    pub fn sample(&self, position: Vec3) -> Option<Vec3> {
        self.cell_index(position).and_then(|cell| self.get(cell))
    }

    /// World position of a cell's origin corner, `min + size * index` per axis.
    #[inline]
    pub fn cell_position(&self, (i, j, k): CellIndex) -> Vec3 {
        let b = &self.bounds;
        [
            b.x_min + self.cell_size[0] * j as f32,
            b.y_min + self.cell_size[1] * i as f32,
            b.z_min + self.cell_size[2] * k as f32,
        ]
    }

    /// Uniform draw from the valid cells.
    pub fn pick_random_valid_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> CellIndex {
        self.valid_cells[rng.gen_range(0..self.valid_cells.len())]
    }
}

fn resolve_cell(cell: &RawCell) -> Option<Vec3> {
    match cell {
        Some([Some(u), Some(v), Some(w)]) if u.is_finite() && v.is_finite() && w.is_finite() => {
            Some([*u, *v, *w])
        }
        _ => None,
    }
}

#[inline]
fn axis_index(pos: f32, min: f32, size: f32, len: usize) -> Option<usize> {
    let idx = ((pos - min) / size + 0.5).floor();
    if idx >= 0.0 && idx < len as f32 {
        Some(idx as usize)
    } else {
        None
    }
}

/// Grid shape errors.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("Field axis {0} has zero length")]
    ZeroLengthAxis(Axis),
    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Column ({row}, {column}) has {found} layers, expected {expected}")]
    RaggedColumn {
        row: usize,
        column: usize,
        expected: usize,
        found: usize,
    },
    #[error("Bounds on axis {axis} are not a finite increasing range: [{min}, {max}]")]
    InvalidBounds { axis: Axis, min: f32, max: f32 },
}

/// Field construction errors.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("Malformed field: {0}")]
    Shape(#[from] ShapeError),
    #[error("Field has no fully defined cell to seed particles from")]
    Empty,
}
