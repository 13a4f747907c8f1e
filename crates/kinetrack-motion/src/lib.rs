//! # Kinetrack-Motion
//!
//! Real-time analysis of a lateral arm raise from per-frame pose landmarks.
//!
//! ## Pipeline
//!
//! Each accepted frame flows through:
//!
//! 1. **Geometry** - elevation and elbow angles for both arms
//! 2. **Smoothing** - moving average of the mean elevation
//! 3. **Phase** - `RESTING → RAISING → HOLDING → LOWERING` with hysteresis
//!    and rep counting on return to rest
//! 4. **Form** - rule-based defects (height, symmetry, bent elbows, speed,
//!    shrugging)
//! 5. **Scoring** - penalty-based score and a single corrective cue
//!
//! [`MovementAnalyzer`] owns the state for one session and returns an
//! [`AnalysisResult`] per frame.

pub mod analyzer;
pub mod calibration;
pub mod config;
pub mod form;
pub mod phase;
pub mod scoring;
pub mod session;
pub mod smoothing;

pub use analyzer::*;
pub use calibration::*;
pub use config::*;
pub use form::*;
pub use phase::*;
pub use scoring::*;
pub use session::*;
pub use smoothing::*;
