use serde::Serialize;

use crate::constants::MIN_CORRIDOR_LEN;
use crate::grid::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Maximal run of open cells in one row (horizontal) or column (vertical).
/// `fixed` is the row/column index; `start..=end` the run along the other axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Corridor {
    pub orientation: Orientation,
    pub fixed: usize,
    pub start: usize,
    pub end: usize,
    pub length: usize,
}

pub fn extract_corridors(grid: &Grid) -> Vec<Corridor> {
    let size = grid.size();
    let mut out = Vec::new();
    for z in 0..size {
        scan_line(size, Orientation::Horizontal, z, &mut out, |i| {
            grid.is_open(i as i32, z as i32)
        });
    }
    for x in 0..size {
        scan_line(size, Orientation::Vertical, x, &mut out, |i| {
            grid.is_open(x as i32, i as i32)
        });
    }
    out
}

fn scan_line(
    size: usize,
    orientation: Orientation,
    fixed: usize,
    out: &mut Vec<Corridor>,
    is_open: impl Fn(usize) -> bool,
) {
    let mut run_start: Option<usize> = None;
    for i in 0..=size {
        let open = i < size && is_open(i);
        match (open, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                let length = i - start;
                if length >= MIN_CORRIDOR_LEN {
                    out.push(Corridor {
                        orientation,
                        fixed,
                        start,
                        end: i - 1,
                        length,
                    });
                }
                run_start = None;
            }
            _ => {}
        }
    }
}
