//! Whole-cell layout: scalar resolution, box model, and the strategy solver.

pub mod engine;
pub mod resolve;
