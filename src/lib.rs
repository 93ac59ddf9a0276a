pub mod autopilot;
pub mod config;
pub mod constants;
pub mod corridors;
pub mod engine;
pub mod grid;
pub mod lane;
pub mod rng;
pub mod types;
pub mod world;
