use super::*;

use crate::types::{SoundCue, WallState};

type WallRef = (CellId, Direction);

impl GameState {
    /// True when the wall's boundary box overlaps the player.
    pub(super) fn wall_touches_player(&self, cell: CellId, side: Direction) -> bool {
        self.grid
            .wall_bounds(cell, side)
            .intersects(&self.player_bounds())
    }

    /// Writes a single wall without touching its mirror.
    pub(super) fn write_wall(&mut self, cell: CellId, side: Direction, state: WallState) -> bool {
        if !self.grid.set_wall(cell, side, state) {
            return false;
        }
        self.events.push(RuntimeEvent::WallChanged { cell, side, state });
        true
    }

    /// Writes a wall and the facing wall of its neighbour. A close that would
    /// shut either side while it overlaps the player is turned into an open;
    /// returns false in that case.
    pub(super) fn set_gate(&mut self, cell: CellId, side: Direction, state: WallState) -> bool {
        let mirror = self.grid.mirror(cell, side);
        let mut applied = state;
        if state == WallState::Closed && self.wall_touches_player(cell, side) {
            let mirror_open = mirror
                .and_then(|(other, other_side)| self.grid.wall(other, other_side))
                .is_some_and(WallState::is_open);
            if self.grid.wall(cell, side).is_some_and(WallState::is_open) || mirror_open {
                applied = WallState::Open;
            }
        }
        self.write_wall(cell, side, applied);
        if let Some((other, other_side)) = mirror {
            self.write_wall(other, other_side, applied);
        }
        applied == state
    }

    /// Reshuffles the maze. Returns the cells that were given guaranteed exits.
    ///
    /// Only each cell's own walls are written, so facing walls may end up
    /// disagreeing until a toggle touches them.
    pub(crate) fn randomize_gates(&mut self) -> Vec<CellId> {
        let ids: Vec<CellId> = self.grid.cells().iter().map(|cell| cell.id).collect();
        for id in &ids {
            for side in Direction::ALL {
                if !self.wall_touches_player(*id, side) {
                    self.write_wall(*id, side, WallState::Closed);
                }
            }
        }

        let mut closed_cells = ids;
        let open_count = closed_cells.len().div_ceil(2);
        let mut open_cells = Vec::with_capacity(open_count);
        for _ in 0..open_count {
            let index = self.rng.pick_index(closed_cells.len());
            open_cells.push(closed_cells.swap_remove(index));
        }

        for id in &closed_cells {
            for side in Direction::ALL {
                if self.rng.bool(0.5) {
                    self.write_wall(*id, side, WallState::Open);
                } else if !self.wall_touches_player(*id, side) {
                    self.write_wall(*id, side, WallState::Closed);
                }
            }
        }

        for id in &open_cells {
            let vertical = if self.rng.bool(0.5) {
                Direction::Top
            } else {
                Direction::Bottom
            };
            let horizontal = if self.rng.bool(0.5) {
                Direction::Left
            } else {
                Direction::Right
            };
            self.write_wall(*id, vertical, WallState::Open);
            self.write_wall(*id, horizontal, WallState::Open);
        }

        self.events.push(RuntimeEvent::Sound {
            cue: SoundCue::GateOpen,
        });
        open_cells
    }

    /// XOR-propagates the origin cell's walls into the target cell, one
    /// direction at a time.
    pub fn toggle_inner(&mut self, target: Option<CellId>, origin: Option<CellId>) -> bool {
        let (Some(target), Some(origin)) = (target, origin) else {
            log::debug!("toggle_inner ignored: no cell under cursor or player");
            return false;
        };
        if target == origin || self.grid.cell(target).is_none() || self.grid.cell(origin).is_none() {
            return false;
        }
        let pairs: Vec<(WallRef, WallRef)> = Direction::ALL
            .iter()
            .map(|side| ((origin, *side), (target, *side)))
            .collect();
        self.apply_xor_pairs(&pairs);
        self.events.push(RuntimeEvent::Sound {
            cue: SoundCue::GateOpen,
        });
        true
    }

    /// Same rule as `toggle_inner`, applied to the neighbours of both cells
    /// on each side and to the neighbour wall facing back toward the cell.
    /// Sides without a neighbour on either end are skipped.
    pub fn toggle_outer(&mut self, target: Option<CellId>, origin: Option<CellId>) -> bool {
        let (Some(target), Some(origin)) = (target, origin) else {
            log::debug!("toggle_outer ignored: no cell under cursor or player");
            return false;
        };
        if target == origin {
            return false;
        }
        let mut pairs: Vec<(WallRef, WallRef)> = Vec::with_capacity(4);
        for side in Direction::ALL {
            let (Some(near), Some(far)) = (self.grid.neighbor(origin, side), self.grid.neighbor(target, side)) else {
                continue;
            };
            if near == far {
                continue;
            }
            let facing = side.opposite();
            pairs.push(((near, facing), (far, facing)));
        }
        if pairs.is_empty() {
            return false;
        }
        self.apply_xor_pairs(&pairs);
        self.events.push(RuntimeEvent::Sound {
            cue: SoundCue::GateOpen,
        });
        true
    }

    /// Per pair: `target = origin ^ target`, `origin = target' ^ target`.
    ///
    /// Every new state is computed before anything is written. An edge
    /// claimed by more than one write (the edge between adjacent cells) is
    /// left alone so that a second identical toggle undoes the first.
    fn apply_xor_pairs(&mut self, pairs: &[(WallRef, WallRef)]) {
        let mut writes: Vec<(WallRef, WallState)> = Vec::with_capacity(pairs.len() * 2);
        for (origin, target) in pairs {
            let (Some(o), Some(t)) = (self.grid.wall(origin.0, origin.1), self.grid.wall(target.0, target.1)) else {
                continue;
            };
            let new_target = o ^ t;
            writes.push((*origin, new_target ^ t));
            writes.push((*target, new_target));
        }
        let edges: Vec<WallRef> = writes
            .iter()
            .map(|((cell, side), _)| self.grid.edge_key(*cell, *side))
            .collect();
        for (((cell, side), state), edge) in writes.into_iter().zip(&edges) {
            if edges.iter().filter(|other| *other == edge).count() > 1 {
                continue;
            }
            self.set_gate(cell, side, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    /// Parks the player far away so no wall is vetoed.
    fn clear_player(state: &mut GameState) {
        state.set_player_position(Vec3::new(-1_000.0, 0.0, -1_000.0));
    }

    fn walls_of(state: &GameState, id: CellId) -> [WallState; 4] {
        Direction::ALL.map(|side| state.grid.wall(id, side).expect("cell exists"))
    }

    fn scramble(state: &mut GameState, seed: u32) {
        let mut rng = Rng::new(seed);
        let ids: Vec<CellId> = state.grid.cells().iter().map(|c| c.id).collect();
        for id in ids {
            for side in Direction::ALL {
                state.grid.set_wall(id, side, WallState::from_open(rng.bool(0.5)));
            }
        }
    }

    /// Scrambles, then copies every Top/Right wall onto its mirror.
    fn scramble_symmetric(state: &mut GameState, seed: u32) {
        scramble(state, seed);
        let ids: Vec<CellId> = state.grid.cells().iter().map(|c| c.id).collect();
        for id in ids {
            for side in [Direction::Top, Direction::Right] {
                let current = state.grid.wall(id, side).expect("wall");
                state.set_gate(id, side, current);
            }
        }
    }

    fn all_walls(state: &GameState) -> Vec<[WallState; 4]> {
        state.grid.cells().iter().map(|cell| walls_of(state, cell.id)).collect()
    }

    #[test]
    fn toggles_leave_touched_walls_mirrored() {
        for seed in 1..=40u32 {
            let mut state = seeded(seed);
            clear_player(&mut state);
            scramble(&mut state, seed * 7);
            let target = CellId(state.rng.pick_index(state.grid.len()));
            let origin = CellId(state.rng.pick_index(state.grid.len()));
            state.drain_events();
            if seed % 2 == 0 {
                state.toggle_inner(Some(target), Some(origin));
            } else {
                state.toggle_outer(Some(target), Some(origin));
            }
            for event in state.drain_events() {
                if let RuntimeEvent::WallChanged { cell, side, .. } = event {
                    assert!(state.grid.is_mirrored(cell, side), "seed {seed}: {cell:?} {side:?}");
                }
            }
        }
    }

    #[test]
    fn toggle_inner_twice_restores_walls() {
        let mut state = seeded(31);
        clear_player(&mut state);
        scramble_symmetric(&mut state, 99);
        let ids: Vec<CellId> = state.grid.cells().iter().map(|c| c.id).collect();
        let (target, _) = cell_center(&state, 0, 0);
        let (origin, _) = cell_center(&state, 3, 4);
        let before: Vec<[WallState; 4]> = ids.iter().map(|id| walls_of(&state, *id)).collect();

        assert!(state.toggle_inner(Some(target), Some(origin)));
        assert_eq!(
            walls_of(&state, target),
            Direction::ALL.map(|side| {
                state.grid.wall(origin, side).expect("wall") ^ before[target.0][side.index()]
            })
        );
        assert_eq!(walls_of(&state, origin), before[origin.0]);

        assert!(state.toggle_inner(Some(target), Some(origin)));
        let after: Vec<[WallState; 4]> = ids.iter().map(|id| walls_of(&state, *id)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn toggle_outer_twice_restores_walls() {
        let mut state = seeded(32);
        clear_player(&mut state);
        scramble_symmetric(&mut state, 5);
        let ids: Vec<CellId> = state.grid.cells().iter().map(|c| c.id).collect();
        let (target, _) = cell_center(&state, 1, 1);
        let (origin, _) = cell_center(&state, 4, 4);
        let before: Vec<[WallState; 4]> = ids.iter().map(|id| walls_of(&state, *id)).collect();
        assert!(state.toggle_outer(Some(target), Some(origin)));
        assert!(state.toggle_outer(Some(target), Some(origin)));
        let after: Vec<[WallState; 4]> = ids.iter().map(|id| walls_of(&state, *id)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn adjacent_toggles_twice_restore_walls_in_every_direction() {
        for seed in 1..=20u32 {
            for side in Direction::ALL {
                for outer in [false, true] {
                    let mut state = seeded(seed);
                    clear_player(&mut state);
                    scramble_symmetric(&mut state, seed * 13);
                    let (origin, _) = cell_center(&state, 2, 2);
                    let target = state.grid.neighbor(origin, side).expect("inner cell");
                    let before = all_walls(&state);
                    for _ in 0..2 {
                        if outer {
                            assert!(state.toggle_outer(Some(target), Some(origin)));
                        } else {
                            assert!(state.toggle_inner(Some(target), Some(origin)));
                        }
                        assert!(state.grid.asymmetric_edges().is_empty(), "seed {seed} {side:?}");
                    }
                    assert_eq!(before, all_walls(&state), "seed {seed} {side:?} outer={outer}");
                }
            }
        }
    }

    #[test]
    fn adjacent_toggle_inner_leaves_the_shared_edge_alone() {
        let mut state = seeded(36);
        clear_player(&mut state);
        scramble_symmetric(&mut state, 11);
        let (origin, _) = cell_center(&state, 2, 2);
        let target = state.grid.neighbor(origin, Direction::Top).expect("neighbour");
        let origin_before = walls_of(&state, origin);
        let target_before = walls_of(&state, target);

        assert!(state.toggle_inner(Some(target), Some(origin)));
        let target_after = walls_of(&state, target);
        for side in Direction::ALL {
            let i = side.index();
            if side == Direction::Bottom {
                assert_eq!(target_after[i], target_before[i]);
            } else {
                assert_eq!(target_after[i], origin_before[i] ^ target_before[i], "{side:?}");
            }
        }
        assert_eq!(walls_of(&state, origin), origin_before);
    }

    #[test]
    fn vetoed_close_opens_a_mismatched_edge_on_both_sides() {
        let mut state = seeded(37);
        clear_player(&mut state);
        let (target, target_center) = cell_center(&state, 2, 2);
        let (origin, _) = cell_center(&state, 0, 5);
        let (above, facing) = state.grid.mirror(target, Direction::Top).expect("mirror");
        state.grid.set_wall(target, Direction::Top, WallState::Closed);
        state.grid.set_wall(above, facing, WallState::Open);
        state.grid.set_wall(origin, Direction::Top, WallState::Closed);
        state.set_player_position(target_center + Vec3::new(0.0, 0.0, 4.6));

        // Closed ^ Closed computes Closed, which would shut the open side.
        assert!(state.toggle_inner(Some(target), Some(origin)));
        assert_eq!(state.grid.wall(target, Direction::Top), Some(WallState::Open));
        assert_eq!(state.grid.wall(above, facing), Some(WallState::Open));

        // An edge already closed on both sides stays closed.
        state.grid.set_wall(target, Direction::Top, WallState::Closed);
        state.grid.set_wall(above, facing, WallState::Closed);
        assert!(state.set_gate(target, Direction::Top, WallState::Closed));
        assert_eq!(state.grid.wall(target, Direction::Top), Some(WallState::Closed));
        assert_eq!(state.grid.wall(above, facing), Some(WallState::Closed));
    }

    #[test]
    fn toggle_requires_both_cells() {
        let mut state = seeded(33);
        state.drain_events();
        assert!(!state.toggle_inner(None, Some(CellId(0))));
        assert!(!state.toggle_inner(Some(CellId(0)), None));
        assert!(!state.toggle_outer(Some(CellId(3)), None));
        assert!(!state.toggle_inner(Some(CellId(10_000)), Some(CellId(0))));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn closing_is_vetoed_while_player_overlaps_the_wall() {
        let mut state = seeded(34);
        clear_player(&mut state);
        let (target, target_center) = cell_center(&state, 2, 2);
        let (origin, _) = cell_center(&state, 0, 5);
        state.set_gate(target, Direction::Top, WallState::Open);
        state.set_gate(origin, Direction::Top, WallState::Open);
        // Open ^ Open closes the target's Top wall unless the player is on it.
        state.set_player_position(target_center + Vec3::new(0.0, 0.0, 4.6));
        assert!(state.toggle_inner(Some(target), Some(origin)));
        assert_eq!(state.grid.wall(target, Direction::Top), Some(WallState::Open));

        clear_player(&mut state);
        assert!(state.toggle_inner(Some(target), Some(origin)));
        assert_eq!(state.grid.wall(target, Direction::Top), Some(WallState::Closed));
        let (above, side) = state.grid.mirror(target, Direction::Top).expect("mirror");
        assert_eq!(state.grid.wall(above, side), Some(WallState::Closed));
    }

    #[test]
    fn toggle_outer_skips_sides_without_neighbours() {
        let mut state = seeded(35);
        clear_player(&mut state);
        let (corner, _) = cell_center(&state, 0, 0);
        let (inner, _) = cell_center(&state, 2, 3);
        // Only the Top and Right neighbours of the corner exist.
        let up_inner = state.grid.neighbor(inner, Direction::Top).expect("neighbour");
        state.set_gate(up_inner, Direction::Bottom, WallState::Open);
        state.drain_events();

        assert!(state.toggle_outer(Some(inner), Some(corner)));
        let up_corner = state.grid.neighbor(corner, Direction::Top).expect("neighbour");
        // Closed ^ Open opens the far side, near side keeps its state.
        assert_eq!(state.grid.wall(up_inner, Direction::Bottom), Some(WallState::Open));
        assert_eq!(state.grid.wall(up_corner, Direction::Bottom), Some(WallState::Closed));
        let touched: Vec<(CellId, Direction)> = state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                RuntimeEvent::WallChanged { cell, side, .. } => Some((cell, side)),
                _ => None,
            })
            .collect();
        let down_inner = state.grid.neighbor(inner, Direction::Bottom).expect("neighbour");
        assert!(!touched.iter().any(|(cell, _)| *cell == down_inner));
    }

    #[test]
    fn toggle_outer_on_a_single_row_applies_nothing() {
        let config = GameConfig {
            grid_rows: 1,
            grid_cols: 2,
            ..GameConfig::default()
        };
        let mut state = GameState::with_random(config, Box::new(ConstantSource(0.3)), GameOptions::default());
        state.drain_events();
        assert!(!state.toggle_outer(Some(CellId(0)), Some(CellId(1))));
        assert!(state.drain_events().is_empty());
        assert!(state.toggle_inner(Some(CellId(0)), Some(CellId(1))));
    }

    #[test]
    fn randomize_keeps_wall_under_player_even_when_coin_says_closed() {
        let mut state = with_source(ConstantSource(0.9));
        clear_player(&mut state);
        let (cell_a, center) = cell_center(&state, 2, 2);
        state.set_gate(cell_a, Direction::Top, WallState::Open);
        state.set_player_position(center + Vec3::new(0.0, 0.0, 4.6));
        state.drain_events();

        let open_cells = state.randomize_gates();
        assert_eq!(state.grid.wall(cell_a, Direction::Top), Some(WallState::Open));
        assert_eq!(open_cells.len(), state.grid.len().div_ceil(2));
        assert!(state
            .drain_events()
            .contains(&RuntimeEvent::Sound { cue: SoundCue::GateOpen }));
    }

    #[test]
    fn randomize_gives_open_cells_both_exits() {
        for seed in [1u32, 2, 3, 17, 400] {
            let mut state = seeded(seed);
            clear_player(&mut state);
            let open_cells = state.randomize_gates();
            let mut unique = open_cells.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), open_cells.len());
            for id in open_cells {
                let vertical = state.grid.wall(id, Direction::Top).expect("wall").is_open()
                    || state.grid.wall(id, Direction::Bottom).expect("wall").is_open();
                let horizontal = state.grid.wall(id, Direction::Left).expect("wall").is_open()
                    || state.grid.wall(id, Direction::Right).expect("wall").is_open();
                assert!(vertical && horizontal, "seed {seed} cell {id:?}");
            }
        }
    }

    #[test]
    fn randomize_with_closed_coins_closes_everything_off_the_player() {
        let mut state = with_source(ConstantSource(0.9));
        clear_player(&mut state);
        let open_cells = state.randomize_gates();
        let open_walls: usize = state
            .grid
            .cells()
            .iter()
            .map(|cell| Direction::ALL.iter().filter(|side| cell.wall(**side).is_open()).count())
            .sum();
        // 0.9 is never below 0.5, so open cells get Bottom and Right only.
        assert_eq!(open_walls, open_cells.len() * 2);
        for id in open_cells {
            assert_eq!(state.grid.wall(id, Direction::Bottom), Some(WallState::Open));
            assert_eq!(state.grid.wall(id, Direction::Right), Some(WallState::Open));
        }
    }
}
