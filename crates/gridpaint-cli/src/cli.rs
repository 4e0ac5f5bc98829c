//! Command-line interface for locating cells and inspecting stored paintings.

use clap::{Parser, Subcommand};
use gridpaint_core::{
    FileStorage, GridIdError, GridIndex, Painting, Storage, StorageError, grid_id,
    index_from_grid_id, placed_grid_id,
};
use kurbo::Point;
use std::cmp::Ordering;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "gridpaint")]
#[command(author, version, about = "Locate grid cells and inspect stored paintings")]
pub struct Cli {
    /// Directory holding painting files (defaults to the platform data directory)
    #[arg(long, global = true, env = "GRIDPAINT_STORE", value_name = "DIR")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the grid id of the cell containing a point
    #[command(allow_negative_numbers = true)]
    Locate {
        x: f64,
        y: f64,
        /// Treat X and Y as cell-normalized coordinates instead of plane units
        #[arg(long)]
        raw: bool,
    },
    /// Decode a grid id into its cell index and plane bounds
    Parse { id: String },
    /// Create an empty painting and print its id
    New { name: String },
    /// List stored painting ids
    List,
    /// Show cells and path counts of a stored painting
    Info { id: String },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid grid id: {0}")]
    GridId(#[from] GridIdError),
    #[error("point ({x}, {y}) does not lie in any grid cell")]
    Unplaceable { x: f64, y: f64 },
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

fn open_storage(store: Option<PathBuf>) -> Result<FileStorage, StorageError> {
    match store {
        Some(dir) => FileStorage::new(dir),
        None => FileStorage::default_location(),
    }
}

/// Execute a parsed command, writing its report to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    match cli.command {
        Command::Locate { x, y, raw } => {
            let id = if raw {
                (x.is_finite() && y.is_finite()).then(|| grid_id(x, y))
            } else {
                placed_grid_id(Point::new(x, y))
            };
            let id = id.ok_or(CliError::Unplaceable { x, y })?;
            writeln!(out, "{}", id)?;
        }
        Command::Parse { id } => {
            let index: GridIndex = id.parse()?;
            let bounds = index.bounds();
            writeln!(
                out,
                "x={} y={} bounds=({}, {})..({}, {})",
                index.x, index.y, bounds.x0, bounds.y0, bounds.x1, bounds.y1
            )?;
        }
        Command::New { name } => {
            let storage = open_storage(cli.store)?;
            let painting = Painting::with_name(name);
            pollster::block_on(storage.save(&painting.id, &painting))?;
            log::info!("Created painting {} in {}", painting.id, storage.base_path().display());
            writeln!(out, "{}", painting.id)?;
        }
        Command::List => {
            let storage = open_storage(cli.store)?;
            let ids = pollster::block_on(storage.list())?;
            for id in ids {
                writeln!(out, "{}", id)?;
            }
        }
        Command::Info { id } => {
            let storage = open_storage(cli.store)?;
            let painting = pollster::block_on(storage.load(&id))?;
            write_info(&painting, out)?;
        }
    }
    Ok(())
}

fn write_info(painting: &Painting, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "name: {}", painting.name)?;
    writeln!(out, "cells: {}", painting.cell_count())?;
    writeln!(out, "paths: {}", painting.path_count())?;

    let mut cells: Vec<_> = painting.cells.iter().collect();
    cells.sort_by(|(a, _), (b, _)| grid_order(a, b));
    for (grid_id, cell) in cells {
        writeln!(out, "  {}\t{}", grid_id, cell.len())?;
    }
    Ok(())
}

/// Unparseable ids first, by text, then cells row by row.
fn grid_order(a: &str, b: &str) -> Ordering {
    match (index_from_grid_id(a), index_from_grid_id(b)) {
        (Some(a), Some(b)) => a.row_major_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
