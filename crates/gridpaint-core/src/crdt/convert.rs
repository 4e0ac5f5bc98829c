//! Conversion between paths and Loro values.

use crate::schema::{Path, Segment};
use kurbo::Point;
use loro::{LoroList, LoroMap, LoroMapValue, LoroResult, LoroValue};
use uuid::Uuid;

pub(super) const KEY_ID: &str = "id";
const KEY_STROKE_COLOR: &str = "stroke_color";
const KEY_STROKE_WIDTH: &str = "stroke_width";
const KEY_SEGMENTS: &str = "segments";

/// Number of doubles per stored segment: point, handle in, handle out.
const SEGMENT_ARITY: usize = 6;

fn get_double(map: &LoroMapValue, key: &str) -> Option<f64> {
    match map.get(key)? {
        LoroValue::Double(d) => Some(*d),
        LoroValue::I64(i) => Some(*i as f64),
        _ => None,
    }
}

fn get_string(map: &LoroMapValue, key: &str) -> Option<String> {
    match map.get(key)? {
        LoroValue::String(s) => Some(s.to_string()),
        _ => None,
    }
}

fn as_double(value: &LoroValue) -> Option<f64> {
    match value {
        LoroValue::Double(d) => Some(*d),
        LoroValue::I64(i) => Some(*i as f64),
        _ => None,
    }
}

/// Write a path into an empty Loro map.
pub fn path_to_loro(path: &Path, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_ID, path.id.to_string())?;
    map.insert(KEY_STROKE_COLOR, path.stroke_color.clone())?;
    map.insert(KEY_STROKE_WIDTH, path.stroke_width)?;

    // Each segment is stored as [x, y, in_x, in_y, out_x, out_y]
    let segments = map.insert_container(KEY_SEGMENTS, LoroList::new())?;
    for segment in &path.segments {
        let coords = segments.insert_container(segments.len(), LoroList::new())?;
        for value in [
            segment.point.x,
            segment.point.y,
            segment.handle_in.x,
            segment.handle_in.y,
            segment.handle_out.x,
            segment.handle_out.y,
        ] {
            coords.push(value)?;
        }
    }

    Ok(())
}

/// Read a path from a Loro map value. Returns `None` if required fields are missing.
pub fn path_from_loro(map: &LoroMapValue) -> Option<Path> {
    let id = Uuid::parse_str(&get_string(map, KEY_ID)?).ok()?;
    let stroke_color = get_string(map, KEY_STROKE_COLOR)?;
    let stroke_width = get_double(map, KEY_STROKE_WIDTH)?;

    let segments = match map.get(KEY_SEGMENTS) {
        Some(LoroValue::List(list)) => list.iter().filter_map(segment_from_loro).collect(),
        _ => Vec::new(),
    };

    Some(Path {
        id,
        segments,
        stroke_color,
        stroke_width,
    })
}

fn segment_from_loro(value: &LoroValue) -> Option<Segment> {
    let LoroValue::List(coords) = value else {
        return None;
    };
    if coords.len() < SEGMENT_ARITY {
        return None;
    }
    let c: Vec<f64> = coords.iter().map(as_double).collect::<Option<_>>()?;
    Some(Segment::with_handles(
        Point::new(c[0], c[1]),
        Point::new(c[2], c[3]),
        Point::new(c[4], c[5]),
    ))
}
