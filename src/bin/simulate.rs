use clap::Parser;
use gate_maze::config::GameConfig;
use gate_maze::constants::{TICK_RATE, TICK_SECONDS};
use gate_maze::engine::{GameOptions, GameState};
use gate_maze::physics::ContactTracker;
use gate_maze::rng::clock_seed;
use gate_maze::types::{CellId, Key, MouseButton, PickupKind, RuntimeEvent, Snapshot, SoundCue};
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

const FIRE_EVERY_TICKS: u64 = 90;
const CLICK_EVERY_TICKS: u64 = 150;
const STEER_DEADZONE: f32 = 1.0;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON file with `GameConfig` overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 120)]
    seconds: u32,
    #[arg(long, default_value_t = 3)]
    runs: u32,
    #[arg(long)]
    top_score_file: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Serialize)]
struct RunCounters {
    #[serde(rename = "elvesCollected")]
    elves_collected: u32,
    #[serde(rename = "chestsCollected")]
    chests_collected: u32,
    #[serde(rename = "potionsCollected")]
    potions_collected: u32,
    #[serde(rename = "arrowsRetrieved")]
    arrows_retrieved: u32,
    #[serde(rename = "arrowsFired")]
    arrows_fired: u32,
    #[serde(rename = "arrowsStopped")]
    arrows_stopped: u32,
    #[serde(rename = "monstersSpawned")]
    monsters_spawned: u32,
    #[serde(rename = "monstersKilled")]
    monsters_killed: u32,
    #[serde(rename = "monsterHits")]
    monster_hits: u32,
    #[serde(rename = "monsterMoves")]
    monster_moves: u32,
    #[serde(rename = "wallChanges")]
    wall_changes: u32,
    #[serde(rename = "topScoreSaves")]
    top_score_saves: u32,
}

impl RunCounters {
    fn record(&mut self, event: &RuntimeEvent) {
        match event {
            RuntimeEvent::Sound { cue } => match cue {
                SoundCue::PlayerHitElf => self.elves_collected += 1,
                SoundCue::PlayerHitChest => self.chests_collected += 1,
                SoundCue::PlayerHitPotion => self.potions_collected += 1,
                SoundCue::MonsterHitPlayer => self.monster_hits += 1,
                _ => {}
            },
            RuntimeEvent::ArrowPooled { .. } => self.arrows_retrieved += 1,
            RuntimeEvent::ArrowFired { .. } => self.arrows_fired += 1,
            RuntimeEvent::ArrowStopped { .. } => self.arrows_stopped += 1,
            RuntimeEvent::MonsterSpawned { .. } => self.monsters_spawned += 1,
            RuntimeEvent::MonsterRemoved { .. } => self.monsters_killed += 1,
            RuntimeEvent::MoveCompleted { body } => {
                if matches!(body, gate_maze::types::Body::Monster { .. }) {
                    self.monster_moves += 1;
                }
            }
            RuntimeEvent::WallChanged { .. } => self.wall_changes += 1,
            RuntimeEvent::TopScoreSaved { .. } => self.top_score_saves += 1,
            _ => {}
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: u32,
    seed: u32,
    seconds: u32,
    ticks: u64,
    score: i32,
    #[serde(rename = "topScore")]
    top_score: i32,
    #[serde(rename = "peakScore")]
    peak_score: i32,
    #[serde(rename = "asymmetricEdges")]
    asymmetric_edges: usize,
    #[serde(flatten)]
    counters: RunCounters,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: f32,
    #[serde(rename = "bestTopScore")]
    best_top_score: i32,
    runs: Vec<RunResultLine>,
}

/// Scripted player: walks to the nearest pickup, shoots now and then and
/// clicks random cells to toggle gates.
struct Bot {
    rng: StdRng,
    held: HashSet<Key>,
}

impl Bot {
    fn new(seed: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed as u64),
            held: HashSet::new(),
        }
    }

    fn act(&mut self, state: &mut GameState) {
        let wanted = self.steering(state);
        for key in [Key::Up, Key::Down, Key::Left, Key::Right] {
            let want = wanted.contains(&key);
            let held = self.held.contains(&key);
            if want && !held {
                state.key_down(key);
                self.held.insert(key);
            } else if !want && held {
                state.key_up(key);
                self.held.remove(&key);
            }
        }

        let tick = state.tick();
        if tick > 0 && tick.is_multiple_of(FIRE_EVERY_TICKS) {
            state.key_down(Key::Fire);
        }
        if tick > 0 && tick.is_multiple_of(CLICK_EVERY_TICKS) {
            let len = state.grid().len();
            if len > 0 {
                let cell = CellId(self.rng.random_range(0..len));
                let button = if self.rng.random_bool(0.5) {
                    MouseButton::Left
                } else {
                    MouseButton::Right
                };
                state.mouse_down(button, Some(cell));
            }
        }
    }

    fn steering(&self, state: &GameState) -> Vec<Key> {
        let player = state.player_position();
        let target = PickupKind::ALL
            .iter()
            .filter_map(|kind| state.pickup_position(*kind))
            .min_by(|a, b| {
                let da = (*a - player).length_squared();
                let db = (*b - player).length_squared();
                da.total_cmp(&db)
            });
        let Some(target) = target else {
            return Vec::new();
        };
        let mut keys = Vec::new();
        let dx = target.x - player.x;
        let dz = target.z - player.z;
        if dz > STEER_DEADZONE {
            keys.push(Key::Up);
        } else if dz < -STEER_DEADZONE {
            keys.push(Key::Down);
        }
        if dx > STEER_DEADZONE {
            keys.push(Key::Right);
        } else if dx < -STEER_DEADZONE {
            keys.push(Key::Left);
        }
        keys
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(error) => {
                log::error!("{error}");
                std::process::exit(2);
            }
        },
        None => GameConfig::default(),
    };

    let base_seed = cli.seed.map(|seed| seed as u32).unwrap_or_else(clock_seed);
    let started_at = chrono::Utc::now().to_rfc3339();
    let mut has_anomaly = false;
    let mut total_anomalies = 0usize;
    let mut results = Vec::new();

    for run in 0..cli.runs {
        let seed = base_seed.wrapping_add(run);
        log::info!("run {run} started (seed {seed}, {}s)", cli.seconds);
        let (result, records) = run_session(run, seed, cli.seconds, &config, cli.top_score_file.clone());
        for record in &records {
            log::warn!("run {run} tick {}: {}", record.tick, record.message);
        }
        if !result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += records.len();
        log::info!(
            "run {run} finished: score {} top {} asymmetric edges {}",
            result.score,
            result.top_score,
            result.asymmetric_edges
        );
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(error) => log::error!("failed to serialize run result: {error}"),
        }
        results.push(result);
    }

    let summary = build_run_summary(started_at, chrono::Utc::now().to_rfc3339(), results, total_anomalies);
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            log::error!("failed to write summary {}: {error}", path.display());
            std::process::exit(2);
        }
        log::info!("summary written to {}", path.display());
    }

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_session(
    run: u32,
    seed: u32,
    seconds: u32,
    config: &GameConfig,
    top_score_path: Option<PathBuf>,
) -> (RunResultLine, Vec<AnomalyRecord>) {
    let mut state = GameState::new(config.clone(), seed, GameOptions { top_score_path });
    let mut tracker = ContactTracker::new();
    let mut bot = Bot::new(seed);
    let mut counters = RunCounters::default();
    let mut anomalies = Vec::new();
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut previous_top = state.top_score();
    let mut peak_score = 0;
    let total_ticks = seconds as u64 * TICK_RATE as u64;

    for _ in 0..total_ticks {
        bot.act(&mut state);
        state.step(TICK_SECONDS);
        for (a, b) in tracker.begin_contacts(&state) {
            state.on_collision(a, b);
        }
        let snapshot = state.build_snapshot(true);
        for event in &snapshot.events {
            counters.record(event);
        }
        for message in collect_snapshot_anomalies(&snapshot, config, previous_top) {
            push_anomaly(&mut anomalies, &mut records, &mut seen, snapshot.tick, message);
        }
        previous_top = previous_top.max(snapshot.top_score);
        peak_score = peak_score.max(snapshot.score);
        if state.is_quit_requested() {
            break;
        }
    }

    let result = RunResultLine {
        run,
        seed,
        seconds,
        ticks: state.tick(),
        score: state.score(),
        top_score: state.top_score(),
        peak_score,
        asymmetric_edges: state.grid().asymmetric_edges().len(),
        counters,
        anomalies,
    };
    (result, records)
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, config: &GameConfig, previous_top: i32) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.score < 0 {
        anomalies.push(format!("negative score: {}", snapshot.score));
    }
    if snapshot.top_score < previous_top {
        anomalies.push(format!(
            "top score regressed: {} -> {}",
            previous_top, snapshot.top_score
        ));
    }
    if snapshot.top_score < snapshot.score {
        anomalies.push(format!(
            "top score behind score: {} < {}",
            snapshot.top_score, snapshot.score
        ));
    }
    if snapshot.monsters.len() > config.monster_max {
        anomalies.push(format!(
            "monster cap exceeded: {}/{}",
            snapshot.monsters.len(),
            config.monster_max
        ));
    }
    if snapshot.arrows.len() > config.arrow_max {
        anomalies.push(format!(
            "arrow cap exceeded: {}/{}",
            snapshot.arrows.len(),
            config.arrow_max
        ));
    }
    let pooled: HashSet<_> = snapshot.quiver.iter().collect();
    if pooled.len() != snapshot.quiver.len() {
        anomalies.push("arrow quivered twice".to_string());
    }
    for arrow in &snapshot.arrows {
        if pooled.contains(&arrow.id) && arrow.active {
            anomalies.push(format!("active arrow in quiver: {}", arrow.id.0));
        }
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    records: &mut Vec<AnomalyRecord>,
    seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn build_run_summary(
    started_at: String,
    finished_at: String,
    runs: Vec<RunResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let run_count = runs.len();
    let average_score = if run_count == 0 {
        0.0
    } else {
        runs.iter().map(|run| run.score as f32).sum::<f32>() / run_count as f32
    };
    let best_top_score = runs.iter().map(|run| run.top_score).max().unwrap_or(0);
    RunSummary {
        started_at,
        finished_at,
        run_count,
        anomaly_count,
        average_score,
        best_top_score,
        runs,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
