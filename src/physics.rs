//! Bounding boxes plus a small headless stand-in for the host physics world.
//!
//! The host engine normally reports collision starts itself. Without an
//! engine (simulation, tests) `ContactTracker` derives the same events from
//! box overlaps between the actors a `GameState` knows about.

use std::collections::HashSet;

use crate::engine::GameState;
use crate::types::{Body, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Touching faces count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// Pairs whose boxes overlap right now, player pairs first.
///
/// Closed walls only: open walls are triggers and never stop an arrow.
pub fn overlapping_pairs(state: &GameState) -> Vec<(Body, Body)> {
    let mut out = Vec::new();
    let player_box = state.player_bounds();

    for (kind, bounds) in state.pickup_bounds() {
        if player_box.intersects(&bounds) {
            out.push((Body::Player, Body::Pickup { kind }));
        }
    }
    for (id, bounds, fired) in state.arrow_bounds() {
        if !fired && player_box.intersects(&bounds) {
            out.push((Body::Player, Body::Arrow { id }));
        }
    }
    let monsters = state.monster_bounds();
    for (id, bounds) in &monsters {
        if player_box.intersects(bounds) {
            out.push((Body::Player, Body::Monster { id: *id }));
        }
    }

    for (arrow_id, arrow_box, fired) in state.arrow_bounds() {
        if !fired {
            continue;
        }
        for (monster_id, monster_box) in &monsters {
            if arrow_box.intersects(monster_box) {
                out.push((Body::Arrow { id: arrow_id }, Body::Monster { id: *monster_id }));
            }
        }
        let grid = state.grid();
        for cell in grid.cells() {
            for side in crate::types::Direction::ALL {
                if cell.wall(side).is_open() {
                    continue;
                }
                if arrow_box.intersects(&grid.wall_bounds(cell.id, side)) {
                    out.push((Body::Arrow { id: arrow_id }, Body::Wall { cell: cell.id, side }));
                }
            }
        }
    }
    out
}

/// Turns continuous overlaps into collision-start events.
#[derive(Clone, Debug, Default)]
pub struct ContactTracker {
    touching: HashSet<(Body, Body)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns pairs that overlap now but did not on the previous call.
    pub fn begin_contacts(&mut self, state: &GameState) -> Vec<(Body, Body)> {
        let current = overlapping_pairs(state);
        let started = current
            .iter()
            .filter(|pair| !self.touching.contains(*pair))
            .copied()
            .collect();
        self.touching = current.into_iter().collect();
        started
    }
}
