//! Loro document schema and operations.

use super::convert::{KEY_ID, path_from_loro, path_to_loro};
use crate::grid::placed_grid_id;
use crate::painting::{Cell, Painting};
use crate::schema::{Path, PathId};
use loro::{
    Container, ExportMode, LoroDoc, LoroList, LoroMap, LoroResult, LoroValue, UndoManager,
    ValueOrContainer, VersionVector,
};
use uuid::Uuid;

/// Key for the cells map in the document.
pub const CELLS_KEY: &str = "cells";
/// Key for the paths list inside each cell.
pub const PATHS_KEY: &str = "paths";
/// Key for the painting name.
pub const NAME_KEY: &str = "name";
/// Key for the metadata map holding the painting id.
pub const META_KEY: &str = "meta";

const META_ID: &str = "id";

/// Maximum number of local undo steps kept.
pub const MAX_UNDO_STEPS: usize = 100;
/// Local edits closer together than this are merged into one undo step.
pub const UNDO_MERGE_INTERVAL_MS: i64 = 300;

/// A CRDT-backed painting for collaborative editing.
///
/// Wraps a `LoroDoc` holding a map from grid id to cell, each cell holding a
/// list of paths. Replicas converge by exchanging snapshots or updates.
pub struct CrdtPainting {
    doc: LoroDoc,
    undo_manager: UndoManager,
}

impl CrdtPainting {
    /// Create a new empty painting document with a fresh id.
    pub fn new() -> LoroResult<Self> {
        let doc = LoroDoc::new();
        doc.get_map(META_KEY).insert(META_ID, Uuid::new_v4().to_string())?;
        doc.commit();
        Ok(Self::with_doc(doc))
    }

    /// Create a painting document from a snapshot exported by another replica.
    pub fn from_snapshot(bytes: &[u8]) -> LoroResult<Self> {
        let doc = LoroDoc::new();
        doc.import(bytes)?;
        Ok(Self::with_doc(doc))
    }

    /// Build a document holding the cells and paths of a plain painting.
    pub fn from_painting(painting: &Painting) -> LoroResult<Self> {
        let doc = LoroDoc::new();
        doc.get_map(META_KEY).insert(META_ID, painting.id.clone())?;
        doc.get_text(NAME_KEY).insert(0, &painting.name)?;

        let cells = doc.get_map(CELLS_KEY);
        for (grid_id, cell) in &painting.cells {
            let cell_map = cells.insert_container(grid_id, LoroMap::new())?;
            let paths = cell_map.insert_container(PATHS_KEY, LoroList::new())?;
            for path in &cell.paths {
                let path_map = paths.insert_container(paths.len(), LoroMap::new())?;
                path_to_loro(path, &path_map)?;
            }
        }
        doc.commit();

        Ok(Self::with_doc(doc))
    }

    fn with_doc(doc: LoroDoc) -> Self {
        let mut undo_manager = UndoManager::new(&doc);
        undo_manager.set_max_undo_steps(MAX_UNDO_STEPS);
        undo_manager.set_merge_interval(UNDO_MERGE_INTERVAL_MS);
        Self { doc, undo_manager }
    }

    /// Get the underlying LoroDoc.
    pub fn loro_doc(&self) -> &LoroDoc {
        &self.doc
    }

    fn cells_map(&self) -> LoroMap {
        self.doc.get_map(CELLS_KEY)
    }

    fn cell_map(&self, grid_id: &str) -> Option<LoroMap> {
        match self.cells_map().get(grid_id)? {
            ValueOrContainer::Container(Container::Map(cell)) => Some(cell),
            _ => None,
        }
    }

    fn paths_list(&self, grid_id: &str) -> Option<LoroList> {
        match self.cell_map(grid_id)?.get(PATHS_KEY)? {
            ValueOrContainer::Container(Container::List(paths)) => Some(paths),
            _ => None,
        }
    }

    /// Painting id shared by all replicas.
    pub fn painting_id(&self) -> Option<String> {
        match self.doc.get_map(META_KEY).get(META_ID)? {
            ValueOrContainer::Value(LoroValue::String(id)) => Some(id.to_string()),
            _ => None,
        }
    }

    pub fn name(&self) -> String {
        self.doc.get_text(NAME_KEY).to_string()
    }

    pub fn set_name(&mut self, name: &str) -> LoroResult<()> {
        let text = self.doc.get_text(NAME_KEY);
        let len = text.len_unicode();
        if len > 0 {
            text.delete(0, len)?;
        }
        text.insert(0, name)?;
        self.doc.commit();
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.cells_map().len()
    }

    pub fn has_cell(&self, grid_id: &str) -> bool {
        self.cells_map().get(grid_id).is_some()
    }

    /// Grid ids of all cells, sorted.
    pub fn grid_ids(&self) -> Vec<String> {
        match self.cells_map().get_deep_value() {
            LoroValue::Map(cells) => {
                let mut ids: Vec<String> = cells.keys().cloned().collect();
                ids.sort();
                ids
            }
            _ => Vec::new(),
        }
    }

    fn ensure_paths_list(&self, grid_id: &str) -> LoroResult<LoroList> {
        if !self.has_cell(grid_id) {
            log::debug!("Creating cell {} in CRDT painting", grid_id);
        }
        let cell = self.cells_map().get_or_create_container(grid_id, LoroMap::new())?;
        cell.get_or_create_container(PATHS_KEY, LoroList::new())
    }

    /// Create the cell for `grid_id` if it does not exist yet.
    pub fn ensure_cell(&mut self, grid_id: &str) -> LoroResult<()> {
        self.ensure_paths_list(grid_id)?;
        self.doc.commit();
        Ok(())
    }

    /// Append a path to an explicit cell, creating the cell if needed.
    pub fn append_path(&mut self, grid_id: &str, path: &Path) -> LoroResult<()> {
        let paths = self.ensure_paths_list(grid_id)?;
        let path_map = paths.insert_container(paths.len(), LoroMap::new())?;
        path_to_loro(path, &path_map)?;
        self.doc.commit();
        Ok(())
    }

    /// Append a path to the cell containing its first anchor.
    ///
    /// Returns `Ok(None)` without touching the document when the path is
    /// empty or its first anchor is not finite.
    pub fn add_path(&mut self, path: &Path) -> LoroResult<Option<String>> {
        let Some(grid_id) = path.first_point().and_then(placed_grid_id) else {
            log::warn!("Not adding unplaceable path {}", path.id);
            return Ok(None);
        };
        self.append_path(&grid_id, path)?;
        Ok(Some(grid_id))
    }

    /// Paths of one cell in drawing order. Empty if the cell does not exist.
    ///
    /// Entries that do not decode as a path are skipped with a warning.
    pub fn paths(&self, grid_id: &str) -> Vec<Path> {
        let Some(paths) = self.paths_list(grid_id) else {
            return Vec::new();
        };
        let LoroValue::List(items) = paths.get_deep_value() else {
            return Vec::new();
        };
        let decoded: Vec<Path> = items
            .iter()
            .filter_map(|item| match item {
                LoroValue::Map(map) => path_from_loro(map),
                _ => None,
            })
            .collect();
        if decoded.len() < items.len() {
            log::warn!(
                "Skipped {} undecodable path entries in cell {}",
                items.len() - decoded.len(),
                grid_id
            );
        }
        decoded
    }

    /// Total number of readable paths across all cells.
    pub fn path_count(&self) -> usize {
        self.grid_ids().iter().map(|grid_id| self.paths(grid_id).len()).sum()
    }

    /// Remove a path from whichever cell holds it.
    ///
    /// Returns the grid id of that cell, or `None` if no cell holds the path.
    pub fn remove_path(&mut self, id: PathId) -> LoroResult<Option<String>> {
        let wanted = id.to_string();
        for grid_id in self.grid_ids() {
            let Some(paths) = self.paths_list(&grid_id) else {
                continue;
            };
            let LoroValue::List(items) = paths.get_deep_value() else {
                continue;
            };
            let position = items.iter().position(|item| match item {
                LoroValue::Map(map) => {
                    matches!(map.get(KEY_ID), Some(LoroValue::String(s)) if s.as_ref() == wanted.as_str())
                }
                _ => false,
            });
            if let Some(i) = position {
                paths.delete(i, 1)?;
                self.doc.commit();
                return Ok(Some(grid_id));
            }
        }
        Ok(None)
    }

    /// Remove a cell and all of its paths.
    pub fn remove_cell(&mut self, grid_id: &str) -> LoroResult<bool> {
        if !self.has_cell(grid_id) {
            return Ok(false);
        }
        self.cells_map().delete(grid_id)?;
        self.doc.commit();
        Ok(true)
    }

    /// Materialize the current state as a plain painting.
    pub fn to_painting(&self) -> Painting {
        let mut painting = Painting::new();
        if let Some(id) = self.painting_id() {
            painting.id = id;
        }
        let name = self.name();
        if !name.is_empty() {
            painting.name = name;
        }
        for grid_id in self.grid_ids() {
            let paths = self.paths(&grid_id);
            painting.cells.insert(grid_id, Cell { paths });
        }
        painting
    }

    /// Export the document as a snapshot (full state).
    pub fn export_snapshot(&self) -> Vec<u8> {
        self.doc.export(ExportMode::Snapshot).unwrap_or_default()
    }

    /// Export updates made since a version.
    pub fn export_updates(&self, since: &VersionVector) -> Vec<u8> {
        self.doc.export(ExportMode::updates(since)).unwrap_or_default()
    }

    /// Import a snapshot or updates from another replica.
    pub fn import(&mut self, bytes: &[u8]) -> LoroResult<()> {
        self.doc.import(bytes)?;
        log::debug!("Imported {} bytes, painting now has {} cells", bytes.len(), self.cell_count());
        Ok(())
    }

    /// Get the current version vector.
    pub fn version(&self) -> VersionVector {
        self.doc.oplog_vv()
    }

    // --- Undo/Redo API ---

    /// Undo the last local change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.undo_manager.undo().unwrap_or(false)
    }

    /// Redo the last undone change. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.undo_manager.redo().unwrap_or(false)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    pub fn clear_undo_history(&self) {
        self.undo_manager.clear();
    }
}

impl Clone for CrdtPainting {
    fn clone(&self) -> Self {
        // The fork gets its own peer id and an empty undo history.
        Self::with_doc(self.doc.fork())
    }
}
