pub const TICK_RATE: u32 = 60;
pub const TICK_SECONDS: f32 = 1.0 / TICK_RATE as f32;

pub const GRID_ROWS: usize = 6;
pub const GRID_COLS: usize = 6;
pub const CELL_SIZE: f32 = 10.0;
pub const WALL_THICKNESS: f32 = 1.0;
pub const WALL_HALF_HEIGHT: f32 = 10.0;
pub const PLAYER_HALF_EXTENT: f32 = 1.0;
pub const PLAYER_HALF_HEIGHT: f32 = 8.0;
pub const ACTOR_HALF_EXTENT: f32 = 1.0;

pub const PLAYER_SPEED: f32 = 20.0;
pub const MONSTER_SPEED: f32 = 40.0;
pub const ARROW_SPEED: f32 = MONSTER_SPEED;
pub const ARROW_FLIGHT_DISTANCE: f32 = 1_000.0;
pub const ARRIVAL_THRESHOLD: f32 = 0.5;

pub const RANDOMIZE_GATES_INTERVAL: f32 = 10.0;
pub const MONSTER_SPAWN_INTERVAL: f32 = 5.0;
pub const MONSTER_MOVE_INTERVAL: f32 = 1.0;
pub const ARROW_SPAWN_INTERVAL: f32 = 5.0;
pub const INVINCIBILITY_DURATION: f32 = 10.0;

pub const MONSTER_MAX: usize = 6;
pub const ARROW_MAX: usize = 5;
pub const MONSTER_BREEDS: u8 = 4;
pub const SPAWN_RETRY_LIMIT: u32 = 32;

pub const PICKUP_HEIGHT: f32 = 4.0;
pub const ARROW_HEIGHT: f32 = 4.0;
pub const MONSTER_HEIGHT: f32 = 6.0;

pub const ELF_POINTS: i32 = 2;
pub const CHEST_POINTS: i32 = 1;
pub const POTION_POINTS: i32 = 1;
pub const ARROW_POINTS: i32 = 1;
pub const MONSTER_KILL_POINTS: i32 = 1;
pub const MONSTER_HIT_PENALTY: i32 = 1;

pub const ATTACK_CLIP_SECONDS: f32 = 0.75;
