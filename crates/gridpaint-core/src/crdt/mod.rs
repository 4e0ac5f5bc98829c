//! CRDT integration using Loro for collaborative painting.
//!
//! # Schema
//!
//! ```text
//! LoroDoc
//! ├── "meta": LoroMap { "id": String }
//! ├── "name": LoroText (painting name)
//! └── "cells": LoroMap<grid id, LoroMap>
//!                        └── "paths": LoroList<LoroMap>
//! ```
//!
//! Each path map holds:
//! - "id": String (UUID)
//! - "stroke_color": String
//! - "stroke_width": f64
//! - "segments": list of `[x, y, in_x, in_y, out_x, out_y]`

mod convert;
mod schema;

pub use convert::{path_from_loro, path_to_loro};
pub use schema::{
    CELLS_KEY, CrdtPainting, MAX_UNDO_STEPS, META_KEY, NAME_KEY, PATHS_KEY, UNDO_MERGE_INTERVAL_MS,
};

// Re-export Loro types that may be useful for collaboration
pub use loro::{ExportMode, VersionVector};
