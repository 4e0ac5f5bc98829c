//! GridPaint Core Library
//!
//! Grid-indexed painting model for a collaborative drawing application: the
//! grid id scheme that keys cells, the path schema, a CRDT-backed painting
//! document and painting storage.

pub mod crdt;
pub mod grid;
pub mod painting;
pub mod schema;
pub mod storage;

pub use crdt::CrdtPainting;
pub use grid::{
    CELL_SIZE, CellIndex, CellSpan, GridIdError, GridIndex, cells_in_rect, grid_id, grid_id_at,
    index_from_grid_id, placed_grid_id,
};
pub use painting::{Cell, Cells, DEFAULT_PAINTING_NAME, Painting};
pub use schema::{Path, PathId, Segment};
pub use storage::{FileStorage, Storage, StorageError, StorageResult};
