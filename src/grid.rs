use std::collections::VecDeque;

use crate::constants::THIN_BODY_EPSILON;
use crate::lane::Lane;
use crate::types::{Axis, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Open,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyProfile {
    Thick { radius: f32 },
    /// Corners of a near-zero box, so single-cell corridors stay passable.
    Thin,
}

const THICK_SAMPLES: [(f32, f32); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
];

const THIN_SAMPLES: [(f32, f32); 4] = [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Tile>,
}

impl Grid {
    pub fn new_solid(size: usize) -> Self {
        Self {
            size,
            cells: vec![Tile::Wall; size * size],
        }
    }

    pub fn from_rows(rows: &[&str]) -> Self {
        let size = rows.len();
        let mut grid = Self::new_solid(size);
        for (z, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().take(size).enumerate() {
                if ch == '.' {
                    grid.set_open(x, z);
                }
            }
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn half(&self) -> f32 {
        self.size as f32 / 2.0
    }

    pub fn tile(&self, x: i32, z: i32) -> Tile {
        if x < 0 || z < 0 || x >= self.size as i32 || z >= self.size as i32 {
            return Tile::Wall;
        }
        self.cells[z as usize * self.size + x as usize]
    }

    pub fn is_open(&self, x: i32, z: i32) -> bool {
        self.tile(x, z) == Tile::Open
    }

    pub(crate) fn set_open(&mut self, x: usize, z: usize) {
        if x < self.size && z < self.size {
            self.cells[z * self.size + x] = Tile::Open;
        }
    }

    pub fn open_cell_count(&self) -> usize {
        self.cells.iter().filter(|tile| **tile == Tile::Open).count()
    }

    pub fn world_to_cell(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x + self.half()).floor() as i32,
            (p.z + self.half()).floor() as i32,
        )
    }

    pub fn cell_center(&self, x: usize, z: usize) -> Vec2 {
        Vec2::new(
            x as f32 - self.half() + 0.5,
            z as f32 - self.half() + 0.5,
        )
    }

    pub fn cell_edge(&self, index: usize) -> f32 {
        index as f32 - self.half()
    }

    fn is_wall_cell_at(&self, p: Vec2) -> bool {
        if !p.is_finite() {
            return true;
        }
        let (x, z) = self.world_to_cell(p);
        !self.is_open(x, z)
    }

    pub fn is_wall_at(&self, p: Vec2, profile: BodyProfile) -> bool {
        if self.is_wall_cell_at(p) {
            return true;
        }
        match profile {
            BodyProfile::Thick { radius } => THICK_SAMPLES
                .iter()
                .any(|(dx, dz)| self.is_wall_cell_at(p + Vec2::new(dx * radius, dz * radius))),
            BodyProfile::Thin => THIN_SAMPLES.iter().any(|(dx, dz)| {
                self.is_wall_cell_at(
                    p + Vec2::new(dx * THIN_BODY_EPSILON, dz * THIN_BODY_EPSILON),
                )
            }),
        }
    }

    pub fn reachable_from(&self, start: (usize, usize)) -> Vec<bool> {
        let mut seen = vec![false; self.size * self.size];
        if !self.is_open(start.0 as i32, start.1 as i32) {
            return seen;
        }
        let mut queue = VecDeque::new();
        seen[start.1 * self.size + start.0] = true;
        queue.push_back(start);

        while let Some((x, z)) = queue.pop_front() {
            for (nx, nz) in neighbors(x as i32, z as i32) {
                if !self.is_open(nx, nz) {
                    continue;
                }
                let idx = nz as usize * self.size + nx as usize;
                if !seen[idx] {
                    seen[idx] = true;
                    queue.push_back((nx as usize, nz as usize));
                }
            }
        }
        seen
    }

    pub fn is_fully_connected_from(&self, start: (usize, usize)) -> bool {
        let reachable = self.reachable_from(start);
        self.cells
            .iter()
            .zip(reachable.iter())
            .all(|(tile, seen)| *tile == Tile::Wall || *seen)
    }

    pub fn shortest_path(
        &self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Option<Vec<(usize, usize)>> {
        if !self.is_open(from.0 as i32, from.1 as i32) || !self.is_open(to.0 as i32, to.1 as i32) {
            return None;
        }
        let mut came_from: Vec<Option<(usize, usize)>> = vec![None; self.size * self.size];
        let mut seen = vec![false; self.size * self.size];
        let mut queue = VecDeque::new();
        seen[from.1 * self.size + from.0] = true;
        queue.push_back(from);

        while let Some((x, z)) = queue.pop_front() {
            if (x, z) == to {
                let mut path = vec![to];
                let mut cursor = to;
                while let Some(prev) = came_from[cursor.1 * self.size + cursor.0] {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            for (nx, nz) in neighbors(x as i32, z as i32) {
                if !self.is_open(nx, nz) {
                    continue;
                }
                let idx = nz as usize * self.size + nx as usize;
                if !seen[idx] {
                    seen[idx] = true;
                    came_from[idx] = Some((x, z));
                    queue.push_back((nx as usize, nz as usize));
                }
            }
        }
        None
    }

    /// The maximal open run through the cell under `p` along `axis`, as a lane.
    pub fn lane_through(&self, p: Vec2, axis: Axis) -> Option<Lane> {
        let (x, z) = self.world_to_cell(p);
        if !self.is_open(x, z) {
            return None;
        }
        let step = |offset: i32| match axis {
            Axis::X => (x + offset, z),
            Axis::Z => (x, z + offset),
        };
        let mut low = 0;
        while {
            let (cx, cz) = step(low - 1);
            self.is_open(cx, cz)
        } {
            low -= 1;
        }
        let mut high = 0;
        while {
            let (cx, cz) = step(high + 1);
            self.is_open(cx, cz)
        } {
            high += 1;
        }
        let (start, end, fixed) = match axis {
            Axis::X => (x + low, x + high, z),
            Axis::Z => (z + low, z + high, x),
        };
        Some(Lane {
            axis,
            fixed: self.cell_edge(fixed as usize) + 0.5,
            span_min: self.cell_edge(start as usize),
            span_max: self.cell_edge(end as usize + 1),
        })
    }
}

fn neighbors(x: i32, z: i32) -> [(i32, i32); 4] {
    [(x - 1, z), (x + 1, z), (x, z - 1), (x, z + 1)]
}

#[cfg(test)]
mod tests {
    use super::{BodyProfile, Grid, Tile};
    use crate::types::{Axis, Vec2};

    fn cross_grid() -> Grid {
        Grid::from_rows(&[
            "######", //
            "#....#", //
            "#.##.#", //
            "#.##.#", //
            "#....#", //
            "######",
        ])
    }

    #[test]
    fn out_of_bounds_is_always_wall() {
        let grid = cross_grid();
        for p in [
            Vec2::new(-3.5, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(0.0, -100.0),
            Vec2::new(f32::NAN, 0.0),
        ] {
            assert!(grid.is_wall_at(p, BodyProfile::Thin));
            assert!(grid.is_wall_at(p, BodyProfile::Thick { radius: 0.3 }));
        }
        assert_eq!(grid.tile(-1, 2), Tile::Wall);
        assert_eq!(grid.tile(2, 6), Tile::Wall);
    }

    #[test]
    fn world_cell_round_trip_hits_cell_centre() {
        let grid = cross_grid();
        let centre = grid.cell_center(1, 1);
        assert_eq!(centre, Vec2::new(-1.5, -1.5));
        assert_eq!(grid.world_to_cell(centre), (1, 1));
    }

    #[test]
    fn thin_body_fits_where_thick_body_does_not() {
        let grid = cross_grid();
        // 0.4 off the centre of a one-cell corridor, still inside the open cell.
        let p = grid.cell_center(1, 2) + Vec2::new(0.4, 0.0);
        assert!(!grid.is_wall_at(p, BodyProfile::Thin));
        assert!(grid.is_wall_at(p, BodyProfile::Thick { radius: 0.3 }));
    }

    #[test]
    fn thick_body_checks_diagonal_samples() {
        let grid = cross_grid();
        // Inner corner of the top-left turn: axis samples stay open, a diagonal does not.
        let p = grid.cell_center(1, 1) + Vec2::new(0.35, 0.35);
        assert!(grid.is_wall_at(p, BodyProfile::Thick { radius: 0.3 }));
        assert!(!grid.is_wall_at(grid.cell_center(1, 1), BodyProfile::Thick { radius: 0.3 }));
    }

    #[test]
    fn lane_through_spans_the_whole_run() {
        let grid = cross_grid();
        let lane = grid
            .lane_through(grid.cell_center(2, 1), Axis::X)
            .expect("open cell");
        assert_eq!(lane.axis, Axis::X);
        assert_eq!(lane.fixed, -1.5);
        assert_eq!(lane.span_min, -2.0);
        assert_eq!(lane.span_max, 2.0);
        assert!(grid.lane_through(grid.cell_center(2, 2), Axis::X).is_none());
    }

    #[test]
    fn shortest_path_walks_around_the_block() {
        let grid = cross_grid();
        let path = grid.shortest_path((1, 1), (4, 4)).expect("connected");
        assert_eq!(path.first(), Some(&(1, 1)));
        assert_eq!(path.last(), Some(&(4, 4)));
        assert_eq!(path.len(), 7);
        assert!(grid.is_fully_connected_from((1, 1)));
        assert_eq!(grid.open_cell_count(), 12);
    }
}
