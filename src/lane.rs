use crate::constants::{
    AGGRO_FIXED_TOLERANCE, AGGRO_SPAN_TOLERANCE, COMBAT_FIXED_TOLERANCE, COMBAT_SPAN_TOLERANCE,
};
use crate::corridors::{Corridor, Orientation};
use crate::grid::Grid;
use crate::types::{Axis, Vec2};

/// World-space rectangle of a corridor. `axis` is the free (patrol) axis; the
/// other coordinate is pinned to `fixed`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lane {
    pub axis: Axis,
    pub fixed: f32,
    pub span_min: f32,
    pub span_max: f32,
}

impl Lane {
    pub fn from_corridor(grid: &Grid, corridor: &Corridor) -> Self {
        let axis = match corridor.orientation {
            Orientation::Horizontal => Axis::X,
            Orientation::Vertical => Axis::Z,
        };
        Self {
            axis,
            fixed: grid.cell_edge(corridor.fixed) + 0.5,
            span_min: grid.cell_edge(corridor.start),
            span_max: grid.cell_edge(corridor.end + 1),
        }
    }

    pub fn length(&self) -> f32 {
        self.span_max - self.span_min
    }

    pub fn midpoint(&self) -> Vec2 {
        self.point_at((self.span_min + self.span_max) / 2.0)
    }

    pub fn point_at(&self, along: f32) -> Vec2 {
        match self.axis {
            Axis::X => Vec2::new(along, self.fixed),
            Axis::Z => Vec2::new(self.fixed, along),
        }
    }

    pub fn patrol_bounds(&self, inset: f32) -> (f32, f32) {
        let min = self.span_min + inset;
        let max = self.span_max - inset;
        if min > max {
            let mid = (self.span_min + self.span_max) / 2.0;
            return (mid, mid);
        }
        (min, max)
    }

    pub fn contains(&self, p: Vec2, fixed_tolerance: f32, span_tolerance: f32) -> bool {
        let along = p.along(self.axis);
        let perp = p.along(self.axis.other());
        (perp - self.fixed).abs() < fixed_tolerance
            && along >= self.span_min - span_tolerance
            && along <= self.span_max + span_tolerance
    }

    pub fn is_aggro_position(&self, p: Vec2) -> bool {
        self.contains(p, AGGRO_FIXED_TOLERANCE, AGGRO_SPAN_TOLERANCE)
    }

    pub fn is_combat_position(&self, p: Vec2) -> bool {
        self.contains(p, COMBAT_FIXED_TOLERANCE, COMBAT_SPAN_TOLERANCE)
    }
}
