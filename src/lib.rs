pub mod config;
pub mod constants;
pub mod engine;
pub mod grid;
pub mod mover;
pub mod physics;
pub mod rng;
pub mod scene;
pub mod top_score_store;
pub mod types;
