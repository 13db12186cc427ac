//! # Spuverb: PlayStation SPU Reverb Emulation
//!
//! `spuverb` is a Rust library emulating the reverb unit of the PlayStation's
//! sound processor, reproducing its exact feedback topology (quirks included)
//! while running natively at any sample rate.
//!
//! ## Architecture
//!
//! The library is organized in three layers:
//!
//! - **Preset Catalog** - the ten standard register tables the unit shipped
//!   with, as raw 16-bit records ([`preset`])
//! - **Parameter Deriver** - converts one record plus a target sample rate
//!   into stretched tap offsets, decoded gains, and a power-of-two buffer
//!   size ([`params`])
//! - **Reverb Engine** - the per-sample network of wall reflections, comb
//!   filters, and cascaded all-pass stages over a single circular buffer
//!   ([`engine`])
//!
//! The engine runs every sample directly against rate-stretched parameters
//! rather than decimating to the unit's native 22050 Hz, so there is no
//! resampling stage and no half-rate pairing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spuverb::prelude::*;
//!
//! // Create an engine at 48kHz; the delay buffer is sized once for the
//! // largest catalog preset and never reallocated.
//! let mut reverb = ReverbEngine::new(48000.0).expect("valid sample rate");
//!
//! // Per-block control values from the host
//! let controls = Controls {
//!     wet_db: -3.0,
//!     dry_db: 0.0,
//!     master_db: 0.0,
//!     preset: 4, // Hall
//! };
//!
//! // Process a block of stereo audio
//! let left_in = [0.0f32; 256];
//! let right_in = [0.0f32; 256];
//! let mut left_out = [0.0f32; 256];
//! let mut right_out = [0.0f32; 256];
//! reverb.process_block(&controls, &left_in, &right_in, &mut left_out, &mut right_out);
//! ```

pub mod engine;
pub mod params;
pub mod preset;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{db_to_linear, Controls, EngineError, ReverbEngine};
    pub use crate::params::{ReverbParams, NATIVE_RATE};
    pub use crate::preset::{Preset, PresetRecord, CATALOG};
}

// Re-export key types at crate root for convenience
pub use prelude::*;
