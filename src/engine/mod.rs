use std::collections::VecDeque;
use std::path::PathBuf;

use crate::config::GameConfig;
use crate::constants::{ACTOR_HALF_EXTENT, PLAYER_HALF_HEIGHT};
use crate::grid::Grid;
use crate::mover::{Kinematics, MoveInterpolator, MoveOutcome};
use crate::physics::Aabb;
use crate::rng::{RandomSource, Rng};
use crate::scene::{archer_rig, SceneNode};
use crate::top_score_store::TopScoreStore;
use crate::types::{
    ArrowId, ArrowView, Body, CellId, Direction, Key, MonsterId, MonsterView, MouseButton,
    PickupKind, PickupView, PlayerView, RuntimeEvent, Snapshot, Vec3,
};

mod collision_system;
mod gate_system;
mod player_system;
mod spawn_system;

pub use self::spawn_system::{SpawnScheduler, Timer};

const SPARKLE_NODE: &str = "invincibilitysparkle";

#[derive(Clone, Copy, Debug, Default)]
struct MoveIntent {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

#[derive(Clone, Debug)]
struct PlayerInternal {
    body: Kinematics,
    facing: Direction,
    intent: MoveIntent,
    rig: SceneNode,
    invincible: bool,
}

#[derive(Clone, Debug)]
struct PickupInternal {
    kind: PickupKind,
    position: Vec3,
}

#[derive(Clone, Debug)]
struct MonsterInternal {
    id: MonsterId,
    breed: u8,
    body: Kinematics,
    mover: MoveInterpolator,
}

#[derive(Clone, Debug)]
struct ArrowInternal {
    id: ArrowId,
    body: Kinematics,
    mover: MoveInterpolator,
    fired: bool,
    active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct GameOptions {
    /// Where the top score lives. `None` keeps it in memory only.
    pub top_score_path: Option<PathBuf>,
}

/// Whole-session gameplay context. The host drives it through `step`,
/// input callbacks and `on_collision`, and reads back `RuntimeEvent`s.
#[derive(Debug)]
pub struct GameState {
    pub config: GameConfig,

    grid: Grid,
    rng: Box<dyn RandomSource>,
    player: PlayerInternal,
    pickups: Vec<PickupInternal>,
    monsters: Vec<MonsterInternal>,
    arrows: Vec<ArrowInternal>,
    quiver: VecDeque<ArrowId>,
    score: i32,
    store: TopScoreStore,
    scheduler: SpawnScheduler,
    events: Vec<RuntimeEvent>,

    tick_counter: u64,
    elapsed_seconds: f32,
    quit_requested: bool,
    next_id_counter: u64,
}

impl GameState {
    pub fn new(config: GameConfig, seed: u32, options: GameOptions) -> Self {
        Self::with_random(config, Box::new(Rng::new(seed)), options)
    }

    pub fn with_random(config: GameConfig, rng: Box<dyn RandomSource>, options: GameOptions) -> Self {
        let grid = Grid::new(
            config.grid_rows,
            config.grid_cols,
            config.cell_size,
            config.wall_thickness,
            Vec3::ZERO,
        );
        let start = grid
            .cell_id(config.grid_rows / 2, config.grid_cols / 2)
            .and_then(|id| grid.center(id))
            .unwrap_or(Vec3::ZERO);
        let mut rig = archer_rig();
        if let Some(sparkle) = rig.child_mut(SPARKLE_NODE) {
            sparkle.set_enabled_recursive(false);
        }
        let store = match options.top_score_path {
            Some(path) => TopScoreStore::open(path),
            None => TopScoreStore::in_memory(0),
        };
        let scheduler = SpawnScheduler::from_config(&config);

        let mut state = Self {
            config,
            grid,
            rng,
            player: PlayerInternal {
                body: Kinematics::at(start),
                facing: Direction::Top,
                intent: MoveIntent::default(),
                rig,
                invincible: false,
            },
            pickups: PickupKind::ALL
                .iter()
                .map(|kind| PickupInternal {
                    kind: *kind,
                    position: start,
                })
                .collect(),
            monsters: Vec::new(),
            arrows: Vec::new(),
            quiver: VecDeque::new(),
            score: 0,
            store,
            scheduler,
            events: Vec::new(),
            tick_counter: 0,
            elapsed_seconds: 0.0,
            quit_requested: false,
            next_id_counter: 1,
        };
        for kind in PickupKind::ALL {
            state.relocate_pickup(kind);
        }
        state
    }

    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_seconds += dt;

        self.move_player();
        self.integrate_bodies(dt);
        self.update_movers(dt);
        self.contain_arrows();
        self.player.rig.advance_subtree(dt);
        self.update_timers(dt);
    }

    fn integrate_bodies(&mut self, dt: f32) {
        self.player.body.integrate(dt);
        for monster in &mut self.monsters {
            monster.body.integrate(dt);
        }
        for arrow in &mut self.arrows {
            arrow.body.integrate(dt);
        }
    }

    fn update_movers(&mut self, dt: f32) {
        for monster in &mut self.monsters {
            if monster.mover.fixed_update(&mut monster.body, dt) == MoveOutcome::Arrived {
                self.events.push(RuntimeEvent::MoveCompleted {
                    body: Body::Monster { id: monster.id },
                });
            }
        }
        for arrow in &mut self.arrows {
            if arrow.mover.fixed_update(&mut arrow.body, dt) == MoveOutcome::Arrived {
                arrow.fired = false;
                self.events.push(RuntimeEvent::MoveCompleted {
                    body: Body::Arrow { id: arrow.id },
                });
            }
        }
    }

    fn update_timers(&mut self, dt: f32) {
        if self.scheduler.gates.advance(dt) {
            self.randomize_gates();
        }
        if self.scheduler.monster_spawn.advance(dt) {
            self.spawn_monster();
        }
        if self.scheduler.monster_move.advance(dt) {
            self.move_next_monster();
        }
        if self.scheduler.arrow_spawn.advance(dt) {
            self.spawn_arrow();
        }
        if self.player.invincible && self.scheduler.invincibility.advance(dt) {
            self.set_invincible(false);
        }
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Up => self.player.intent.up = true,
            Key::Down => self.player.intent.down = true,
            Key::Left => self.player.intent.left = true,
            Key::Right => self.player.intent.right = true,
            Key::Fire => self.shoot_arrow(),
            Key::Quit => {
                if !self.quit_requested {
                    self.quit_requested = true;
                    self.events.push(RuntimeEvent::QuitRequested);
                }
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Up => self.player.intent.up = false,
            Key::Down => self.player.intent.down = false,
            Key::Left => self.player.intent.left = false,
            Key::Right => self.player.intent.right = false,
            Key::Fire | Key::Quit => {}
        }
    }

    /// `cursor_cell` is the cell the host's cursor ray hit, if any.
    pub fn mouse_down(&mut self, button: MouseButton, cursor_cell: Option<CellId>) {
        let origin = self.player_cell();
        match button {
            MouseButton::Left => {
                self.toggle_inner(cursor_cell, origin);
            }
            MouseButton::Right => {
                self.toggle_outer(cursor_cell, origin);
            }
        }
    }

    /// Overwrites an actor position after the host's own physics step.
    pub fn sync_body_position(&mut self, body: Body, position: Vec3) -> bool {
        match body {
            Body::Player => {
                self.player.body.position = position;
                true
            }
            Body::Pickup { kind } => match self.pickups.iter_mut().find(|p| p.kind == kind) {
                Some(pickup) => {
                    pickup.position = position;
                    true
                }
                None => false,
            },
            Body::Monster { id } => match self.monsters.iter_mut().find(|m| m.id == id) {
                Some(monster) => {
                    monster.body.position = position;
                    true
                }
                None => false,
            },
            Body::Arrow { id } => match self.arrows.iter_mut().find(|a| a.id == id) {
                Some(arrow) => {
                    arrow.body.position = position;
                    true
                }
                None => false,
            },
            Body::Wall { .. } => false,
        }
    }

    pub fn set_player_position(&mut self, position: Vec3) {
        self.player.body.position = position;
    }

    pub fn player_position(&self) -> Vec3 {
        self.player.body.position
    }

    pub fn player_cell(&self) -> Option<CellId> {
        self.grid.cell_at(self.player.body.position)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn top_score(&self) -> i32 {
        self.store.value()
    }

    pub fn is_invincible(&self) -> bool {
        self.player.invincible
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }

    pub fn quiver_len(&self) -> usize {
        self.quiver.len()
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn pickup_position(&self, kind: PickupKind) -> Option<Vec3> {
        self.pickups.iter().find(|p| p.kind == kind).map(|p| p.position)
    }

    pub fn player_bounds(&self) -> Aabb {
        let half = self.config.player_half_extent;
        Aabb::from_center(
            self.player.body.position,
            Vec3::new(half, PLAYER_HALF_HEIGHT, half),
        )
    }

    pub fn pickup_bounds(&self) -> Vec<(PickupKind, Aabb)> {
        self.pickups
            .iter()
            .map(|p| (p.kind, Aabb::from_center(p.position, Vec3::splat(ACTOR_HALF_EXTENT))))
            .collect()
    }

    /// Active arrows only, with their fired flag.
    pub fn arrow_bounds(&self) -> Vec<(ArrowId, Aabb, bool)> {
        self.arrows
            .iter()
            .filter(|a| a.active)
            .map(|a| {
                (
                    a.id,
                    Aabb::from_center(a.body.position, Vec3::splat(ACTOR_HALF_EXTENT)),
                    a.fired,
                )
            })
            .collect()
    }

    pub fn monster_bounds(&self) -> Vec<(MonsterId, Aabb)> {
        self.monsters
            .iter()
            .map(|m| (m.id, Aabb::from_center(m.body.position, Vec3::splat(ACTOR_HALF_EXTENT))))
            .collect()
    }

    pub fn drain_events(&mut self) -> Vec<RuntimeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            elapsed_seconds: self.elapsed_seconds,
            score: self.score,
            top_score: self.store.value(),
            player: PlayerView {
                position: self.player.body.position,
                facing: self.player.facing,
                invincible: self.player.invincible,
                animation: self.player.rig.current_clip().map(str::to_string),
            },
            cells: self.grid.views(),
            monsters: self
                .monsters
                .iter()
                .map(|m| MonsterView {
                    id: m.id,
                    breed: m.breed,
                    position: m.body.position,
                    moving: m.mover.is_moving(),
                })
                .collect(),
            arrows: self
                .arrows
                .iter()
                .map(|a| ArrowView {
                    id: a.id,
                    position: a.body.position,
                    fired: a.fired,
                    active: a.active,
                })
                .collect(),
            quiver: self.quiver.iter().copied().collect(),
            pickups: self
                .pickups
                .iter()
                .map(|p| PickupView {
                    kind: p.kind,
                    position: p.position,
                })
                .collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn set_invincible(&mut self, active: bool) {
        self.player.invincible = active;
        self.scheduler.invincibility.reset();
        if let Some(sparkle) = self.player.rig.child_mut(SPARKLE_NODE) {
            sparkle.set_enabled_recursive(active);
        }
        self.events.push(RuntimeEvent::InvincibilityChanged { active });
    }

    fn make_id(&mut self) -> u64 {
        let id = self.next_id_counter;
        self.next_id_counter += 1;
        id
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Returns the same value forever.
    #[derive(Debug)]
    pub(crate) struct ConstantSource(pub f32);

    impl RandomSource for ConstantSource {
        fn next_f32(&mut self) -> f32 {
            self.0
        }
    }

    /// Plays back a fixed sequence, then repeats its last value.
    #[derive(Debug)]
    pub(crate) struct ScriptedSource {
        values: Vec<f32>,
        cursor: usize,
    }

    impl ScriptedSource {
        pub(crate) fn new(values: &[f32]) -> Self {
            Self {
                values: values.to_vec(),
                cursor: 0,
            }
        }
    }

    impl RandomSource for ScriptedSource {
        fn next_f32(&mut self) -> f32 {
            let value = self
                .values
                .get(self.cursor)
                .or_else(|| self.values.last())
                .copied()
                .unwrap_or(0.0);
            self.cursor += 1;
            value
        }
    }

    pub(crate) fn seeded(seed: u32) -> GameState {
        GameState::new(GameConfig::default(), seed, GameOptions::default())
    }

    pub(crate) fn with_source(source: impl RandomSource + 'static) -> GameState {
        GameState::with_random(GameConfig::default(), Box::new(source), GameOptions::default())
    }

    pub(crate) fn cell_center(state: &GameState, row: usize, col: usize) -> (CellId, Vec3) {
        let id = state.grid.cell_id(row, col).expect("cell in grid");
        let center = state.grid.center(id).expect("center of cell");
        (id, center)
    }
}
