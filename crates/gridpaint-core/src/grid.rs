//! Grid indexing for paintings.
//!
//! The drawing plane is partitioned into square cells of [`CELL_SIZE`] units.
//! Each cell is addressed by a grid id of the form `"<xi>/<yi>"`, which is the
//! key of the painting's cell map.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Edge length of one grid cell in plane units.
///
/// Every stored grid id was computed with this value, so it cannot change
/// for existing paintings without migrating their cell maps.
pub const CELL_SIZE: f64 = 1000.0;

/// Separator between the two components of a grid id.
pub const GRID_ID_SEPARATOR: char = '/';

/// Largest number of cells [`CellSpan::cell_indices`] will enumerate.
pub const MAX_RECT_CELLS: usize = 1 << 20;

/// Errors produced when parsing a grid id strictly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridIdError {
    #[error("grid id is empty")]
    Empty,
    #[error("grid id {0:?} has no '/' separator")]
    MissingSeparator(String),
    #[error("grid id {0:?} has more than two components")]
    TooManyComponents(String),
    #[error("invalid {axis} component {text:?} in grid id")]
    InvalidComponent { axis: &'static str, text: String },
    #[error("grid id {0:?} is out of range")]
    OutOfRange(String),
}

/// Floored coordinates recovered from any grid id.
///
/// Components are integral and finite but may exceed every integer type, so
/// they are kept as `f64`. This is the type [`index_from_grid_id`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridIndex {
    pub x: f64,
    pub y: f64,
}

impl GridIndex {
    /// Floor cell-normalized coordinates. `None` if either is not finite.
    pub fn from_coords(x: f64, y: f64) -> Option<Self> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        // Adding zero turns -0.0 into 0.0.
        Some(Self {
            x: x.floor() + 0.0,
            y: y.floor() + 0.0,
        })
    }

    /// The integer cell index, if both components fit in `i64`.
    pub fn cell_index(&self) -> Option<CellIndex> {
        CellIndex::from_coords(self.x, self.y)
    }

    pub fn grid_id(&self) -> String {
        grid_id(self.x, self.y)
    }

    /// The plane region covered by this cell.
    pub fn bounds(&self) -> Rect {
        let x0 = self.x * CELL_SIZE;
        let y0 = self.y * CELL_SIZE;
        Rect::new(x0, y0, x0 + CELL_SIZE, y0 + CELL_SIZE)
    }

    /// Row-major order: by `y`, then by `x`.
    pub fn row_major_cmp(&self, other: &Self) -> Ordering {
        self.y.total_cmp(&other.y).then(self.x.total_cmp(&other.x))
    }
}

impl From<CellIndex> for GridIndex {
    fn from(index: CellIndex) -> Self {
        Self {
            x: index.x as f64,
            y: index.y as f64,
        }
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.grid_id())
    }
}

impl FromStr for GridIndex {
    type Err = GridIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = split_grid_id(s)?;
        let x = parse_float_component(s, x, "x")?;
        let y = parse_float_component(s, y, "y")?;
        Ok(Self { x, y })
    }
}

/// Integer coordinates of a grid cell.
///
/// The hashable counterpart of [`GridIndex`] for the cells a viewport can
/// realistically reach. `Display` renders the grid id and `FromStr` parses it
/// back exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub x: i64,
    pub y: i64,
}

impl CellIndex {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Floor cell-normalized coordinates to a cell index.
    ///
    /// Returns `None` when either floored value is not finite or does not fit
    /// in an `i64`.
    pub fn from_coords(x: f64, y: f64) -> Option<Self> {
        Some(Self::new(floor_to_i64(x)?, floor_to_i64(y)?))
    }

    /// The cell containing a point given in plane units.
    pub fn containing(point: Point) -> Option<Self> {
        Self::from_coords(point.x / CELL_SIZE, point.y / CELL_SIZE)
    }

    /// The grid id of this cell.
    pub fn grid_id(&self) -> String {
        self.to_string()
    }

    /// The plane region covered by this cell.
    pub fn bounds(&self) -> Rect {
        GridIndex::from(*self).bounds()
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.x, GRID_ID_SEPARATOR, self.y)
    }
}

impl FromStr for CellIndex {
    type Err = GridIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = split_grid_id(s)?;
        let x = check_integer(x, "x")?;
        let y = check_integer(y, "y")?;
        let out_of_range = |_: std::num::ParseIntError| GridIdError::OutOfRange(s.to_string());
        Ok(Self::new(x.parse().map_err(out_of_range)?, y.parse().map_err(out_of_range)?))
    }
}

fn split_grid_id(s: &str) -> Result<(&str, &str), GridIdError> {
    if s.is_empty() {
        return Err(GridIdError::Empty);
    }
    let (x, y) = s
        .split_once(GRID_ID_SEPARATOR)
        .ok_or_else(|| GridIdError::MissingSeparator(s.to_string()))?;
    if y.contains(GRID_ID_SEPARATOR) {
        return Err(GridIdError::TooManyComponents(s.to_string()));
    }
    Ok((x, y))
}

/// Accept an optional `-` followed by ASCII digits, the only shape
/// [`grid_id`] emits for finite input.
fn check_integer<'a>(text: &'a str, axis: &'static str) -> Result<&'a str, GridIdError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GridIdError::InvalidComponent {
            axis,
            text: text.to_string(),
        });
    }
    Ok(text)
}

fn parse_float_component(id: &str, text: &str, axis: &'static str) -> Result<f64, GridIdError> {
    let value: f64 = check_integer(text, axis)?
        .parse()
        .map_err(|_| GridIdError::InvalidComponent {
            axis,
            text: text.to_string(),
        })?;
    if !value.is_finite() {
        return Err(GridIdError::OutOfRange(id.to_string()));
    }
    Ok(value + 0.0)
}

fn floor_to_i64(value: f64) -> Option<i64> {
    let floored = value.floor();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if floored.is_finite() && floored >= i64::MIN as f64 && floored < i64::MAX as f64 {
        Some(floored as i64)
    } else {
        None
    }
}

fn format_floored(value: f64) -> String {
    let floored = value.floor();
    if floored == f64::INFINITY {
        "Infinity".to_string()
    } else if floored == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if floored == 0.0 {
        // Covers -0.0.
        "0".to_string()
    } else {
        // Display never uses exponent notation, so huge values stay integral.
        floored.to_string()
    }
}

/// Compute the grid id for cell-normalized coordinates.
///
/// Both values are floored; no scaling by [`CELL_SIZE`] happens here (see
/// [`grid_id_at`] for plane coordinates). Non-finite input is not rejected and
/// yields ids containing `NaN` or `Infinity`, which no parser accepts.
pub fn grid_id(x: f64, y: f64) -> String {
    format!("{}{}{}", format_floored(x), GRID_ID_SEPARATOR, format_floored(y))
}

/// Grid id of the cell containing a point given in plane units.
pub fn grid_id_at(point: Point) -> String {
    grid_id(point.x / CELL_SIZE, point.y / CELL_SIZE)
}

/// Grid id of the cell containing `point`, or `None` if the point is not
/// finite and so lies in no cell.
pub fn placed_grid_id(point: Point) -> Option<String> {
    GridIndex::from_coords(point.x / CELL_SIZE, point.y / CELL_SIZE).map(|index| index.grid_id())
}

/// Recover the floored pair from a grid id.
///
/// Returns `None` for absent or empty input, input without a separator, and
/// input whose components are not integers. Every id [`grid_id`] produces for
/// finite input parses back to the floored coordinates.
pub fn index_from_grid_id<'a>(id: impl Into<Option<&'a str>>) -> Option<GridIndex> {
    id.into()?.parse().ok()
}

/// Inclusive block of cells touched by a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSpan {
    pub min: GridIndex,
    pub max: GridIndex,
}

impl CellSpan {
    /// Cells touched by a rectangle in plane units. `None` if it is not finite.
    ///
    /// Edges are inclusive, so a rectangle ending exactly on a cell boundary
    /// also touches the cell beyond it.
    pub fn of_rect(rect: Rect) -> Option<Self> {
        let rect = rect.abs();
        Some(Self {
            min: GridIndex::from_coords(rect.x0 / CELL_SIZE, rect.y0 / CELL_SIZE)?,
            max: GridIndex::from_coords(rect.x1 / CELL_SIZE, rect.y1 / CELL_SIZE)?,
        })
    }

    pub fn contains(&self, index: GridIndex) -> bool {
        (self.min.x..=self.max.x).contains(&index.x) && (self.min.y..=self.max.y).contains(&index.y)
    }

    /// Number of cells in the span. May be far beyond any integer type.
    pub fn cell_count(&self) -> f64 {
        (self.max.x - self.min.x + 1.0) * (self.max.y - self.min.y + 1.0)
    }

    /// Every cell of the span, row by row.
    ///
    /// `None` if the span holds more than [`MAX_RECT_CELLS`] cells or reaches
    /// past the `i64` range.
    pub fn cell_indices(self) -> Option<impl Iterator<Item = CellIndex>> {
        if self.cell_count() > MAX_RECT_CELLS as f64 {
            return None;
        }
        let min = self.min.cell_index()?;
        let max = self.max.cell_index()?;
        Some((min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellIndex::new(x, y))))
    }
}

/// All cells touched by a rectangle in plane units, row by row.
///
/// `None` for non-finite rectangles and for rectangles spanning more than
/// [`MAX_RECT_CELLS`] cells; use [`CellSpan`] to test membership instead.
pub fn cells_in_rect(rect: Rect) -> Option<impl Iterator<Item = CellIndex>> {
    CellSpan::of_rect(rect)?.cell_indices()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_id_floors() {
        assert_eq!(grid_id(0.999, -0.001), "0/-1");
        assert_eq!(grid_id(2.0, 3.5), "2/3");
        assert_eq!(grid_id(-0.5, 0.5), "-1/0");
    }

    #[test]
    fn test_grid_id_negative_boundary() {
        assert_eq!(grid_id(-1000.0, -1000.0), "-1000/-1000");
    }

    #[test]
    fn test_grid_id_negative_zero() {
        assert_eq!(grid_id(-0.0, -0.0), "0/0");
    }

    #[test]
    fn test_grid_id_non_finite() {
        assert_eq!(grid_id(f64::NAN, 1.0), "NaN/1");
        assert_eq!(grid_id(f64::INFINITY, f64::NEG_INFINITY), "Infinity/-Infinity");
        assert_eq!(index_from_grid_id(grid_id(f64::NAN, 1.0).as_str()), None);
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            (0.0, 0.0),
            (0.999, -0.001),
            (-1000.0, 1000.0),
            (12345.678, -98765.4321),
            (-0.25, 7.75),
            (1.0e12 + 0.5, -1.0e12 - 0.5),
            (1.0e19, 1.0e20),
            (-1.0e25, 0.0),
            (1.0e300, f64::MIN),
        ];
        for (x, y) in samples {
            let id = grid_id(x, y);
            let index = index_from_grid_id(id.as_str()).expect("round trip failed");
            assert_eq!(index.x, x.floor(), "x for {id}");
            assert_eq!(index.y, y.floor(), "y for {id}");
        }
    }

    #[test]
    fn test_large_ids_are_integral() {
        assert_eq!(grid_id(1.0e20, 0.0), "100000000000000000000/0");
        assert_eq!(
            index_from_grid_id("100000000000000000000/0"),
            Some(GridIndex { x: 1.0e20, y: 0.0 })
        );
        assert_eq!(
            "100000000000000000000/0".parse::<CellIndex>(),
            Err(GridIdError::OutOfRange("100000000000000000000/0".to_string()))
        );
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(index_from_grid_id("42"), None);
        assert_eq!(
            "42".parse::<CellIndex>(),
            Err(GridIdError::MissingSeparator("42".to_string()))
        );
    }

    #[test]
    fn test_empty_and_absent() {
        assert_eq!(index_from_grid_id(""), None);
        assert_eq!(index_from_grid_id(None), None);
        assert_eq!("".parse::<CellIndex>(), Err(GridIdError::Empty));
    }

    #[test]
    fn test_malformed_component_is_rejected() {
        assert_eq!(index_from_grid_id("abc/3"), None);
        assert_eq!(
            "abc/3".parse::<CellIndex>(),
            Err(GridIdError::InvalidComponent {
                axis: "x",
                text: "abc".to_string()
            })
        );
        assert_eq!(index_from_grid_id("1/2/3"), None);
        assert_eq!(index_from_grid_id("1.5/2"), None);
        assert_eq!(index_from_grid_id("1e3/2"), None);
        assert_eq!(index_from_grid_id("+1/2"), None);
        assert_eq!(index_from_grid_id("-/2"), None);
        assert_eq!(index_from_grid_id("NaN/1"), None);
    }

    #[test]
    fn test_negative_zero_component() {
        assert_eq!(index_from_grid_id("-0/0"), Some(GridIndex { x: 0.0, y: 0.0 }));
        assert!(index_from_grid_id("-0/0").is_some_and(|index| index.x.is_sign_positive()));
    }

    #[test]
    fn test_distinct_indices_have_distinct_ids() {
        let mut seen = std::collections::HashSet::new();
        for x in -5..=5 {
            for y in -5..=5 {
                assert!(seen.insert(grid_id(x as f64, y as f64)));
            }
        }
        assert_ne!(grid_id(1.0, 11.0), grid_id(11.0, 1.0));
    }

    #[test]
    fn test_display_matches_grid_id() {
        let index = CellIndex::new(-3, 14);
        assert_eq!(index.to_string(), "-3/14");
        assert_eq!(index.grid_id(), grid_id(-3.0, 14.0));
        assert_eq!(GridIndex::from(index).to_string(), "-3/14");
        assert_eq!("-3/14".parse::<CellIndex>(), Ok(index));
    }

    #[test]
    fn test_containing_scales_by_cell_size() {
        assert_eq!(CellIndex::containing(Point::new(999.0, 1000.0)), Some(CellIndex::new(0, 1)));
        assert_eq!(CellIndex::containing(Point::new(-1.0, -2500.0)), Some(CellIndex::new(-1, -3)));
        assert_eq!(CellIndex::containing(Point::new(f64::NAN, 0.0)), None);
        assert_eq!(CellIndex::containing(Point::new(1.0e300, 0.0)), None);
        assert_eq!(grid_id_at(Point::new(1500.0, -1.0)), "1/-1");
    }

    #[test]
    fn test_placed_grid_id() {
        assert_eq!(placed_grid_id(Point::new(1500.0, -1.0)).as_deref(), Some("1/-1"));
        assert_eq!(placed_grid_id(Point::new(-0.0, 0.0)).as_deref(), Some("0/0"));
        assert!(placed_grid_id(Point::new(1.0e300, 0.0)).is_some());
        assert_eq!(placed_grid_id(Point::new(f64::INFINITY, 0.0)), None);
    }

    #[test]
    fn test_bounds() {
        let bounds = CellIndex::new(-1, 2).bounds();
        assert_eq!(bounds, Rect::new(-1000.0, 2000.0, 0.0, 3000.0));
        assert_eq!(CellIndex::containing(bounds.center()), Some(CellIndex::new(-1, 2)));
    }

    #[test]
    fn test_cells_in_rect() {
        let cells: Vec<_> = cells_in_rect(Rect::new(-10.0, -10.0, 10.0, 10.0))
            .expect("Small rect should enumerate")
            .collect();
        assert_eq!(
            cells,
            vec![
                CellIndex::new(-1, -1),
                CellIndex::new(0, -1),
                CellIndex::new(-1, 0),
                CellIndex::new(0, 0),
            ]
        );

        // Flipped rectangles are normalized.
        let flipped: Vec<_> = cells_in_rect(Rect::new(10.0, 10.0, -10.0, -10.0))
            .expect("Small rect should enumerate")
            .collect();
        assert_eq!(flipped, cells);

        let single: Vec<_> = cells_in_rect(Rect::new(100.0, 100.0, 200.0, 200.0))
            .expect("Small rect should enumerate")
            .collect();
        assert_eq!(single, vec![CellIndex::new(0, 0)]);

        assert!(cells_in_rect(Rect::new(0.0, 0.0, f64::INFINITY, 1.0)).is_none());
    }

    #[test]
    fn test_cells_in_huge_rect_are_not_enumerated() {
        assert!(cells_in_rect(Rect::new(-1.0e9, -1.0e9, 1.0e9, 1.0e9)).is_none());
        assert!(cells_in_rect(Rect::new(-1.0e300, 0.0, 1.0e300, 1.0)).is_none());

        let span = CellSpan::of_rect(Rect::new(-1.0e9, -1.0e9, 1.0e9, 1.0e9)).expect("Finite rect");
        assert!(span.cell_count() > MAX_RECT_CELLS as f64);
        assert!(span.contains(GridIndex { x: 0.0, y: 0.0 }));
        assert!(span.contains(GridIndex { x: 1.0e6, y: -1.0e6 }));
        assert!(!span.contains(GridIndex { x: 1.0e6 + 1.0, y: 0.0 }));
    }

    #[test]
    fn test_row_major_cmp() {
        let a = GridIndex { x: 5.0, y: -1.0 };
        let b = GridIndex { x: -5.0, y: 0.0 };
        assert_eq!(a.row_major_cmp(&b), Ordering::Less);
        assert_eq!(b.row_major_cmp(&a), Ordering::Greater);
        assert_eq!(a.row_major_cmp(&a), Ordering::Equal);
    }
}
