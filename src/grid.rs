use crate::constants::WALL_HALF_HEIGHT;
use crate::physics::Aabb;
use crate::types::{CellId, CellView, Direction, Vec3, WallState};

#[derive(Clone, Debug)]
pub struct Cell {
    pub id: CellId,
    pub row: usize,
    pub col: usize,
    walls: [WallState; 4],
}

impl Cell {
    pub fn wall(&self, side: Direction) -> WallState {
        self.walls[side.index()]
    }

    pub fn view(&self) -> CellView {
        CellView {
            id: self.id,
            row: self.row,
            col: self.col,
            top: self.wall(Direction::Top),
            bottom: self.wall(Direction::Bottom),
            left: self.wall(Direction::Left),
            right: self.wall(Direction::Right),
        }
    }
}

/// Maze cells laid out row-major. Cell `(row, col)` is centred at
/// `origin + (col * cell_size, 0, row * cell_size)`.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cell_size: f32,
    wall_thickness: f32,
    origin: Vec3,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid with every wall Closed.
    pub fn new(rows: usize, cols: usize, cell_size: f32, wall_thickness: f32, origin: Vec3) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell {
                    id: CellId(row * cols + col),
                    row,
                    col,
                    walls: [WallState::Closed; 4],
                });
            }
        }
        Self {
            rows,
            cols,
            cell_size,
            wall_thickness,
            origin,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)
    }

    pub fn cell_id(&self, row: usize, col: usize) -> Option<CellId> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(CellId(row * self.cols + col))
    }

    pub fn center(&self, id: CellId) -> Option<Vec3> {
        let cell = self.cell(id)?;
        Some(
            self.origin
                + Vec3::new(
                    cell.col as f32 * self.cell_size,
                    0.0,
                    cell.row as f32 * self.cell_size,
                ),
        )
    }

    /// Cell whose floor square contains the point, ignoring height.
    pub fn cell_at(&self, point: Vec3) -> Option<CellId> {
        if self.cell_size <= 0.0 || !point.x.is_finite() || !point.z.is_finite() {
            return None;
        }
        let half = self.cell_size * 0.5;
        let col = ((point.x - self.origin.x + half) / self.cell_size).floor();
        let row = ((point.z - self.origin.z + half) / self.cell_size).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        self.cell_id(row as usize, col as usize)
    }

    /// Floor rectangle covered by all cells. Height is left at zero.
    pub fn floor_bounds(&self) -> Aabb {
        let half = self.cell_size * 0.5;
        Aabb {
            min: self.origin - Vec3::new(half, 0.0, half),
            max: self.origin
                + Vec3::new(
                    self.cols as f32 * self.cell_size - half,
                    0.0,
                    self.rows as f32 * self.cell_size - half,
                ),
        }
    }

    pub fn neighbor(&self, id: CellId, side: Direction) -> Option<CellId> {
        let cell = self.cell(id)?;
        let (dr, dc) = side.grid_offset();
        let row = cell.row as i64 + dr;
        let col = cell.col as i64 + dc;
        if row < 0 || col < 0 {
            return None;
        }
        self.cell_id(row as usize, col as usize)
    }

    /// The facing wall in the adjacent cell, if there is one.
    pub fn mirror(&self, id: CellId, side: Direction) -> Option<(CellId, Direction)> {
        self.neighbor(id, side).map(|other| (other, side.opposite()))
    }

    /// One key per physical edge: Bottom and Left walls resolve to the
    /// neighbour's Top and Right when that neighbour exists.
    pub fn edge_key(&self, id: CellId, side: Direction) -> (CellId, Direction) {
        match side {
            Direction::Bottom | Direction::Left => self.mirror(id, side).unwrap_or((id, side)),
            Direction::Top | Direction::Right => (id, side),
        }
    }

    pub fn wall(&self, id: CellId, side: Direction) -> Option<WallState> {
        self.cell(id).map(|cell| cell.wall(side))
    }

    /// Writes one wall only. Returns true when the state changed.
    pub fn set_wall(&mut self, id: CellId, side: Direction, state: WallState) -> bool {
        let Some(cell) = self.cells.get_mut(id.0) else {
            return false;
        };
        let slot = &mut cell.walls[side.index()];
        if *slot == state {
            return false;
        }
        *slot = state;
        true
    }

    /// Thin box along the shared edge on `side` of the cell.
    pub fn wall_bounds(&self, id: CellId, side: Direction) -> Aabb {
        let center = self.center(id).unwrap_or(self.origin);
        let half = self.cell_size * 0.5;
        let thick = self.wall_thickness * 0.5;
        let (offset, extents) = match side {
            Direction::Top => (Vec3::new(0.0, 0.0, half), Vec3::new(half, WALL_HALF_HEIGHT, thick)),
            Direction::Bottom => (Vec3::new(0.0, 0.0, -half), Vec3::new(half, WALL_HALF_HEIGHT, thick)),
            Direction::Left => (Vec3::new(-half, 0.0, 0.0), Vec3::new(thick, WALL_HALF_HEIGHT, half)),
            Direction::Right => (Vec3::new(half, 0.0, 0.0), Vec3::new(thick, WALL_HALF_HEIGHT, half)),
        };
        Aabb::from_center(center + offset, extents)
    }

    pub fn is_mirrored(&self, id: CellId, side: Direction) -> bool {
        match (self.wall(id, side), self.mirror(id, side)) {
            (Some(state), Some((other, other_side))) => self.wall(other, other_side) == Some(state),
            _ => true,
        }
    }

    /// Shared edges whose two walls disagree, each edge listed once from its
    /// Top/Right side.
    pub fn asymmetric_edges(&self) -> Vec<(CellId, Direction)> {
        let mut out = Vec::new();
        for cell in &self.cells {
            for side in [Direction::Top, Direction::Right] {
                if !self.is_mirrored(cell.id, side) {
                    out.push((cell.id, side));
                }
            }
        }
        out
    }

    pub fn views(&self) -> Vec<CellView> {
        self.cells.iter().map(Cell::view).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(3, 4, 10.0, 1.0, Vec3::ZERO)
    }

    #[test]
    fn neighbors_follow_index_arithmetic() {
        let grid = grid();
        let corner = grid.cell_id(0, 0).expect("corner");
        assert_eq!(grid.neighbor(corner, Direction::Bottom), None);
        assert_eq!(grid.neighbor(corner, Direction::Left), None);
        assert_eq!(grid.neighbor(corner, Direction::Top), grid.cell_id(1, 0));
        assert_eq!(grid.neighbor(corner, Direction::Right), grid.cell_id(0, 1));

        let far = grid.cell_id(2, 3).expect("far corner");
        assert_eq!(grid.neighbor(far, Direction::Top), None);
        assert_eq!(grid.neighbor(far, Direction::Right), None);
    }

    #[test]
    fn mirror_of_mirror_is_self() {
        let grid = grid();
        for cell in grid.cells() {
            for side in Direction::ALL {
                if let Some((other, other_side)) = grid.mirror(cell.id, side) {
                    assert_eq!(grid.mirror(other, other_side), Some((cell.id, side)));
                }
            }
        }
    }

    #[test]
    fn cell_at_maps_points_inside_each_square() {
        let grid = grid();
        let id = grid.cell_id(1, 2).expect("cell");
        let center = grid.center(id).expect("center");
        assert_eq!(grid.cell_at(center), Some(id));
        assert_eq!(grid.cell_at(center + Vec3::new(4.9, 3.0, -4.9)), Some(id));
        assert_eq!(grid.cell_at(Vec3::new(-6.0, 0.0, 0.0)), None);
        assert_eq!(grid.cell_at(Vec3::new(0.0, 0.0, 40.0)), None);
    }

    #[test]
    fn cell_at_rejects_non_finite_points() {
        let grid = grid();
        assert_eq!(grid.cell_at(Vec3::new(f32::NAN, 0.0, 0.0)), None);
        assert_eq!(grid.cell_at(Vec3::new(0.0, 0.0, f32::NAN)), None);
        assert_eq!(grid.cell_at(Vec3::new(f32::INFINITY, 0.0, 0.0)), None);
        assert_eq!(grid.cell_at(Vec3::new(0.0, f32::NAN, 0.0)), grid.cell_id(0, 0));
    }

    #[test]
    fn facing_walls_share_one_edge_key() {
        let grid = grid();
        for cell in grid.cells() {
            for side in Direction::ALL {
                let key = grid.edge_key(cell.id, side);
                match grid.mirror(cell.id, side) {
                    Some((other, other_side)) => assert_eq!(grid.edge_key(other, other_side), key),
                    None => assert_eq!(key, (cell.id, side)),
                }
            }
        }
    }

    #[test]
    fn floor_bounds_cover_every_cell_centre() {
        let grid = grid();
        let floor = grid.floor_bounds();
        for cell in grid.cells() {
            let center = grid.center(cell.id).expect("center");
            assert!(floor.contains_point(center));
        }
        assert_eq!(floor.min, Vec3::new(-5.0, 0.0, -5.0));
        assert_eq!(floor.max, Vec3::new(35.0, 0.0, 25.0));
    }

    #[test]
    fn set_wall_is_one_sided_and_reports_change() {
        let mut grid = grid();
        let id = grid.cell_id(0, 0).expect("cell");
        assert!(grid.set_wall(id, Direction::Right, WallState::Open));
        assert!(!grid.set_wall(id, Direction::Right, WallState::Open));
        let (other, side) = grid.mirror(id, Direction::Right).expect("mirror");
        assert_eq!(grid.wall(other, side), Some(WallState::Closed));
        assert_eq!(grid.asymmetric_edges(), vec![(id, Direction::Right)]);
    }

    #[test]
    fn facing_walls_share_the_same_bounds() {
        let grid = grid();
        let id = grid.cell_id(1, 1).expect("cell");
        for side in Direction::ALL {
            let (other, other_side) = grid.mirror(id, side).expect("inner cell has all neighbours");
            assert_eq!(grid.wall_bounds(id, side), grid.wall_bounds(other, other_side));
        }
    }
}
