//! Savanna Sim - needs-driven animal agents on a procedural savanna
//!
//! Each animal runs a per-tick state machine: needs drift, herd steering,
//! reproduction, movement, timed decisions (an optional LLM provider with a
//! local heuristic fallback), hunting and consumption.

pub mod actions;
pub mod combat;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod herd;
pub mod llm;
pub mod simulation;
pub mod spatial;
pub mod ui;
pub mod world;
