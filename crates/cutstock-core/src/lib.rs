//! One-dimensional cutting stock by column generation.
//!
//! [`Optimizer`] seeds a pattern pool with homogeneous patterns, runs column
//! generation against an [`OptimizationEngine`], and turns the fractional
//! optimum into whole bars by truncation, re-solving the residual demand and
//! falling back to first-fit-decreasing when truncation keeps nothing.

pub mod engine;
pub mod enumerate;
pub mod model;
pub mod optimizer;
pub mod pattern;
pub mod types;

pub use engine::{EngineError, GoodLpEngine, MasterSolution, OptimizationEngine, PricingSolution};
pub use model::{MasterModel, PricingModel};
pub use optimizer::ffd::first_fit_decreasing;
pub use optimizer::truncation::{truncate, Truncation};
pub use optimizer::Optimizer;
pub use pattern::{Pattern, PatternPool};
pub use types::*;
