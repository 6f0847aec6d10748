//! Streamlines - Particle trails advected through 3D velocity fields.
//!
//! This crate animates many independent particle trails through a discretized
//! velocity field. Each trail is colored by local velocity magnitude and faded
//! in and out over a randomized lifetime. The engine only produces vertex
//! positions, colors and draw ranges; rendering is left to the caller.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, color stops and the field file format
//! - `compute`: Field sampling, color ramps, trails and the engine
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use streamlines::{
//!     compute::{StreamlineEngine, VectorField, to_render_space},
//!     schema::{Bounds, StreamlineConfig},
//! };
//!
//! // Uniform flow along +x
//! let field = VectorField::from_fn((16, 16, 16), Bounds::unit(), |_, _, _| {
//!     Some([0.02, 0.0, 0.0])
//! })
//! .unwrap();
//!
//! let config = StreamlineConfig::default();
//! let axes = config.render_axes;
//! let mut engine = StreamlineEngine::new(Arc::new(field), config).unwrap();
//!
//! // Once per displayed frame
//! engine.tick();
//! for trail in engine.trails() {
//!     let points: Vec<_> = trail
//!         .live_positions()
//!         .iter()
//!         .map(|&p| to_render_space(p, axes))
//!         .collect();
//!     let _colors = trail.live_colors();
//!     println!("{} vertices", points.len());
//! }
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{ColorRamp, EngineStats, StreamlineEngine, Trail, VectorField};
pub use schema::{ColorStop, FieldFile, StreamlineConfig};
