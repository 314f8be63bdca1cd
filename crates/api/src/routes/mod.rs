//! Route handlers

pub mod clusters;
pub mod model;
pub mod predictions;
