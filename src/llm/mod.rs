//! Optional external decision provider
//!
//! Agents can ask an LLM which action to take next. Every failure path
//! falls back to the local heuristic, so the simulation never depends on
//! the network.

pub mod client;
pub mod context;
pub mod parser;
pub mod provider;

pub use client::LlmClient;
pub use context::SituationContext;
pub use parser::{parse_decision, ProviderDecision};
pub use provider::{DecisionBridge, DecisionProvider, DecisionReply, LlmDecisionProvider};
