use std::ops::{Add, AddAssign, BitXor, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Unit vector, or zero when the length is zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Self::ZERO;
        }
        self * (1.0 / len)
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Physical side of a cell. Top is +z, Right is +x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Direction::Top => 0,
            Direction::Bottom => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// `(drow, dcol)` step toward the neighbour on this side.
    pub fn grid_offset(self) -> (i64, i64) {
        match self {
            Direction::Top => (1, 0),
            Direction::Bottom => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Direction::Top => Vec3::new(0.0, 0.0, 1.0),
            Direction::Bottom => Vec3::new(0.0, 0.0, -1.0),
            Direction::Left => Vec3::new(-1.0, 0.0, 0.0),
            Direction::Right => Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallState {
    /// Solid collider, blocks movement.
    Closed,
    /// Trigger collider, passable.
    Open,
}

impl WallState {
    pub fn from_open(open: bool) -> Self {
        if open {
            WallState::Open
        } else {
            WallState::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == WallState::Open
    }
}

impl BitXor for WallState {
    type Output = WallState;

    fn bitxor(self, rhs: WallState) -> WallState {
        WallState::from_open(self.is_open() ^ rhs.is_open())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MonsterId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArrowId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    Potion,
    Chest,
    Elf,
}

impl PickupKind {
    pub const ALL: [PickupKind; 3] = [PickupKind::Potion, PickupKind::Chest, PickupKind::Elf];
}

/// Collision role of a physics body, assigned when the body is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Body {
    Player,
    Pickup { kind: PickupKind },
    Arrow { id: ArrowId },
    Monster { id: MonsterId },
    Wall { cell: CellId, side: Direction },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    PlayerHitElf,
    PlayerHitChest,
    PlayerHitPotion,
    PlayerHitArrow,
    MonsterHitPlayer,
    ArrowHitMonster,
    ArrowHitWall,
    GateOpen,
    ShootArrow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    Sound {
        cue: SoundCue,
    },
    WallChanged {
        cell: CellId,
        side: Direction,
        state: WallState,
    },
    ScoreChanged {
        score: i32,
    },
    TopScoreChanged {
        #[serde(rename = "topScore")]
        top_score: i32,
    },
    TopScoreSaved {
        #[serde(rename = "topScore")]
        top_score: i32,
    },
    PickupRelocated {
        kind: PickupKind,
        cell: CellId,
    },
    MonsterSpawned {
        id: MonsterId,
        breed: u8,
        cell: CellId,
    },
    MonsterRemoved {
        id: MonsterId,
    },
    ArrowSpawned {
        id: ArrowId,
        cell: CellId,
    },
    ArrowPooled {
        id: ArrowId,
    },
    ArrowFired {
        id: ArrowId,
        facing: Direction,
    },
    ArrowStopped {
        id: ArrowId,
    },
    InvincibilityChanged {
        active: bool,
    },
    MoveCompleted {
        body: Body,
    },
    QuitRequested,
}

#[derive(Clone, Debug, Serialize)]
pub struct CellView {
    pub id: CellId,
    pub row: usize,
    pub col: usize,
    pub top: WallState,
    pub bottom: WallState,
    pub left: WallState,
    pub right: WallState,
}

#[derive(Clone, Debug, Serialize)]
pub struct MonsterView {
    pub id: MonsterId,
    pub breed: u8,
    pub position: Vec3,
    pub moving: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArrowView {
    pub id: ArrowId,
    pub position: Vec3,
    pub fired: bool,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PickupView {
    pub kind: PickupKind,
    pub position: Vec3,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub facing: Direction,
    pub invincible: bool,
    pub animation: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedSeconds")]
    pub elapsed_seconds: f32,
    pub score: i32,
    #[serde(rename = "topScore")]
    pub top_score: i32,
    pub player: PlayerView,
    pub cells: Vec<CellView>,
    pub monsters: Vec<MonsterView>,
    pub arrows: Vec<ArrowView>,
    pub quiver: Vec<ArrowId>,
    pub pickups: Vec<PickupView>,
    pub events: Vec<RuntimeEvent>,
}
