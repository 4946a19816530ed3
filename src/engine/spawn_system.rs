use super::*;

use crate::constants::{ARROW_HEIGHT, MONSTER_BREEDS, MONSTER_HEIGHT, PICKUP_HEIGHT};
use crate::types::WallState;

/// Elapsed/interval pair that fires and resets once the interval is reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    pub elapsed: f32,
    pub interval: f32,
}

impl Timer {
    pub fn new(interval: f32) -> Self {
        Self {
            elapsed: 0.0,
            interval,
        }
    }

    /// Starts already due, so the first tick fires it.
    pub fn primed(interval: f32) -> Self {
        Self {
            elapsed: interval,
            interval,
        }
    }

    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

#[derive(Clone, Debug)]
pub struct SpawnScheduler {
    pub gates: Timer,
    pub monster_spawn: Timer,
    pub monster_move: Timer,
    pub arrow_spawn: Timer,
    pub invincibility: Timer,
    /// Index of the monster that moves on the next turn.
    pub monster_turn: usize,
}

impl SpawnScheduler {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            gates: Timer::primed(config.randomize_gates_interval),
            monster_spawn: Timer::primed(config.monster_spawn_interval),
            monster_move: Timer::new(config.monster_move_interval),
            arrow_spawn: Timer::primed(config.arrow_spawn_interval),
            invincibility: Timer::new(config.invincibility_duration),
            monster_turn: 0,
        }
    }
}

impl GameState {
    fn random_cell(&mut self) -> Option<CellId> {
        if self.grid.is_empty() {
            return None;
        }
        Some(CellId(self.rng.pick_index(self.grid.len())))
    }

    pub(crate) fn spawn_monster(&mut self) -> Option<MonsterId> {
        if self.monsters.len() >= self.config.monster_max {
            return None;
        }
        let player_cell = self.player_cell();
        let mut picked = None;
        for _ in 0..self.config.spawn_retry_limit {
            let Some(cell) = self.random_cell() else {
                break;
            };
            if Some(cell) != player_cell {
                picked = Some(cell);
                break;
            }
        }
        let Some(cell) = picked else {
            log::debug!(
                "monster spawn skipped: no free cell after {} attempts",
                self.config.spawn_retry_limit
            );
            return None;
        };
        let center = self.grid.center(cell)?;
        let breed = self.rng.int(0, MONSTER_BREEDS as i32 - 1) as u8;
        let id = MonsterId(self.make_id());
        self.monsters.push(MonsterInternal {
            id,
            breed,
            body: Kinematics::at(center + Vec3::new(0.0, MONSTER_HEIGHT, 0.0)),
            mover: MoveInterpolator::new(),
        });
        self.events.push(RuntimeEvent::MonsterSpawned { id, breed, cell });
        Some(id)
    }

    pub(crate) fn spawn_arrow(&mut self) -> Option<ArrowId> {
        if self.arrows.len() >= self.config.arrow_max {
            return None;
        }
        let cell = self.random_cell()?;
        let center = self.grid.center(cell)?;
        let id = ArrowId(self.make_id());
        self.arrows.push(ArrowInternal {
            id,
            body: Kinematics::at(center + Vec3::new(0.0, ARROW_HEIGHT, 0.0)),
            mover: MoveInterpolator::new(),
            fired: false,
            active: true,
        });
        self.events.push(RuntimeEvent::ArrowSpawned { id, cell });
        Some(id)
    }

    /// Moves the pickup to a random cell, possibly the one it is already in.
    pub(crate) fn relocate_pickup(&mut self, kind: PickupKind) {
        let Some(cell) = self.random_cell() else {
            return;
        };
        let Some(center) = self.grid.center(cell) else {
            return;
        };
        let Some(pickup) = self.pickups.iter_mut().find(|pickup| pickup.kind == kind) else {
            return;
        };
        pickup.position = center + Vec3::new(0.0, PICKUP_HEIGHT, 0.0);
        self.events.push(RuntimeEvent::PickupRelocated { kind, cell });
    }

    /// Gives the next monster in round-robin order one step toward the
    /// player, borrowing open walls from elsewhere in the maze when needed.
    pub(crate) fn move_next_monster(&mut self) -> bool {
        if self.monsters.is_empty() {
            return false;
        }
        let index = self.scheduler.monster_turn % self.monsters.len();
        self.scheduler.monster_turn = (index + 1) % self.monsters.len();

        let monster_position = self.monsters[index].body.position;
        let Some(cell) = self.grid.cell_at(monster_position) else {
            log::debug!("monster {} is outside the grid", self.monsters[index].id.0);
            return false;
        };
        let player = self.player.body.position;
        let dx = player.x - monster_position.x;
        let dz = player.z - monster_position.z;
        let side = if dx.abs() > dz.abs() {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dz > 0.0 {
            Direction::Top
        } else if dz < 0.0 {
            Direction::Bottom
        } else {
            return false;
        };
        let Some(next) = self.grid.neighbor(cell, side) else {
            log::debug!("monster {} has no neighbour on {:?}", self.monsters[index].id.0, side);
            return false;
        };

        let mut locks = 0;
        for (wall_cell, wall_side) in [(cell, side), (next, side.opposite())] {
            if self.grid.wall(wall_cell, wall_side) == Some(WallState::Open) {
                continue;
            }
            if !self.borrow_open_wall(wall_cell, wall_side) {
                locks += 1;
            }
        }
        if locks > 0 {
            return false;
        }

        let Some(center) = self.grid.center(next) else {
            return false;
        };
        let speed = self.config.monster_speed;
        let monster = &mut self.monsters[index];
        monster
            .mover
            .move_to(&mut monster.body, center + Vec3::new(0.0, MONSTER_HEIGHT, 0.0), speed, true);
        true
    }

    /// Opens `(cell, side)` by closing the first open wall on the same side
    /// found in grid order. The donor stays open while it touches the player.
    fn borrow_open_wall(&mut self, cell: CellId, side: Direction) -> bool {
        let donor = self
            .grid
            .cells()
            .iter()
            .find(|candidate| candidate.id != cell && candidate.wall(side).is_open())
            .map(|candidate| candidate.id);
        let Some(donor) = donor else {
            return false;
        };
        self.write_wall(cell, side, WallState::Open);
        if !self.wall_touches_player(donor, side) {
            self.write_wall(donor, side, WallState::Closed);
        }
        true
    }
}
