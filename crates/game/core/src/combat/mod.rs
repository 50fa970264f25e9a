//! Combat resolution system.
//!
//! This module provides pure functions for resolving combat interactions.
//! All combat logic is deterministic and side-effect free; applying a
//! resolution to a state is a separate, explicit step.
//!
//! # Core Functions
//!
//! - `resolve`: Complete action resolution (damage/restoration + status rolls)
//! - `calculate_damage`: Offense vs defense calculation
//! - `calculate_restoration`: Heal and recharge amounts

pub mod damage;
pub mod result;

pub use damage::{calculate_damage, calculate_restoration};
pub use result::{CombatAction, CombatResolution, ResolveContext, TargetOutcome, resolve};
