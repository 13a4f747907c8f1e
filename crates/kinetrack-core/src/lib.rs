//! # Kinetrack-Core
//!
//! Core types and utilities for the Kinetrack exercise-tracking engine:
//! pose landmarks as delivered by an external 33-point pose estimator,
//! frame timestamps, joint-angle geometry and the shared error type.

pub mod error;
pub mod geometry;
pub mod synthetic;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
