//! Painting document: a grid of cells holding paths.

use crate::grid::{CellSpan, GridIndex, index_from_grid_id, placed_grid_id};
use crate::schema::{Path, PathId};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Name given to new paintings.
pub const DEFAULT_PAINTING_NAME: &str = "Untitled";

/// A grid cell holding paths in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub paths: Vec<Path>,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Cells keyed by grid id. Iteration order carries no meaning.
pub type Cells = HashMap<String, Cell>;

/// The root document of a collaborative drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Painting {
    /// Unique painting identifier.
    pub id: String,
    /// Painting name.
    #[serde(default = "default_name")]
    pub name: String,
    /// All cells, keyed by grid id.
    #[serde(default)]
    pub cells: Cells,
}

fn default_name() -> String {
    DEFAULT_PAINTING_NAME.to_string()
}

impl Default for Painting {
    fn default() -> Self {
        Self::new()
    }
}

impl Painting {
    /// Create a new empty painting.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: default_name(),
            cells: HashMap::new(),
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    pub fn cell(&self, grid_id: &str) -> Option<&Cell> {
        self.cells.get(grid_id)
    }

    pub fn contains_cell(&self, grid_id: &str) -> bool {
        self.cells.contains_key(grid_id)
    }

    /// Get the cell for `grid_id`, creating an empty one if absent.
    pub fn cell_or_insert(&mut self, grid_id: &str) -> &mut Cell {
        self.cells.entry(grid_id.to_string()).or_insert_with(|| {
            log::debug!("Creating cell {} in painting {}", grid_id, self.id);
            Cell::new()
        })
    }

    /// Add a path to the cell containing its first anchor.
    ///
    /// Returns the grid id the path was filed under, or `None` if the path is
    /// empty or its first anchor is not finite; such paths are dropped.
    pub fn add_path(&mut self, path: Path) -> Option<String> {
        let Some(anchor) = path.first_point() else {
            log::warn!("Dropping empty path {}", path.id);
            return None;
        };
        let Some(grid_id) = placed_grid_id(anchor) else {
            log::warn!("Dropping path {} with unplaceable anchor {:?}", path.id, anchor);
            return None;
        };

        self.add_path_to_cell(&grid_id, path);
        Some(grid_id)
    }

    /// Append a path to an explicit cell.
    pub fn add_path_to_cell(&mut self, grid_id: &str, path: Path) {
        self.cell_or_insert(grid_id).paths.push(path);
    }

    /// Remove a path from whichever cell holds it. The cell itself is kept.
    pub fn remove_path(&mut self, id: PathId) -> Option<Path> {
        self.cells.values_mut().find_map(|cell| {
            let pos = cell.paths.iter().position(|p| p.id == id)?;
            Some(cell.paths.remove(pos))
        })
    }

    pub fn remove_cell(&mut self, grid_id: &str) -> Option<Cell> {
        self.cells.remove(grid_id)
    }

    /// Find a path and the grid id of its cell.
    pub fn find_path(&self, id: PathId) -> Option<(&str, &Path)> {
        self.cells.iter().find_map(|(grid_id, cell)| {
            cell.paths.iter().find(|p| p.id == id).map(|p| (grid_id.as_str(), p))
        })
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of paths across all cells.
    pub fn path_count(&self) -> usize {
        self.cells.values().map(Cell::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.path_count() == 0
    }

    /// Grid ids of all cells, in no particular order.
    pub fn grid_ids(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Existing cells touched by a viewport rectangle in plane units, row by row.
    ///
    /// Small viewports look up each covered cell; viewports covering more
    /// cells than the painting holds scan the painting's cells instead.
    pub fn cells_in_view(&self, view: Rect) -> Vec<(GridIndex, &Cell)> {
        let Some(span) = CellSpan::of_rect(view) else {
            return Vec::new();
        };
        let lookup = span
            .cell_indices()
            .filter(|_| span.cell_count() <= self.cells.len() as f64);

        let mut found: Vec<(GridIndex, &Cell)> = match lookup {
            Some(indices) => indices
                .filter_map(|index| {
                    let cell = self.cells.get(&index.grid_id())?;
                    Some((GridIndex::from(index), cell))
                })
                .collect(),
            None => self
                .cells
                .iter()
                .filter_map(|(grid_id, cell)| {
                    let index = index_from_grid_id(grid_id.as_str())?;
                    span.contains(index).then_some((index, cell))
                })
                .collect(),
        };
        found.sort_by(|(a, _), (b, _)| a.row_major_cmp(b));
        found
    }

    /// Paths whose bounds overlap a viewport rectangle, edges included.
    ///
    /// Only cells touched by the viewport are searched, so a path that extends
    /// far outside the cell of its first anchor may be missed.
    pub fn paths_in_rect(&self, view: Rect) -> Vec<&Path> {
        let view = view.abs();
        self.cells_in_view(view)
            .into_iter()
            .flat_map(|(_, cell)| cell.paths.iter())
            .filter(|path| overlaps(view, path.bounds()))
            .collect()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Whether two normalized rectangles share any point, edges included.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
