//! Combat system
//!
//! Flat damage, cooldown-gated attacks and the death transition.
//! Damage is deterministic; the only randomness near combat is target choice.

pub mod death;
pub mod resolution;

pub use death::kill;
pub use resolution::{attack, damage};
