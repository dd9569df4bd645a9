//! Nofit-polygon based nesting engine for 2D irregular bin packing.
//!
//! Parts (arbitrary polygons, possibly with holes) are placed into one or more bins by a
//! bottom-left-fill style [`placement`] strategy on top of the [`nfp`] engine.
//! Passes are driven by the [`orchestrator`], which can refine part ordering and rotations
//! with a pluggable numerical [`opt`]imizer.

/// Typed errors
pub mod error;

/// Configuration of a nesting run
pub mod config;

/// Geometric primitives and base algorithms
pub mod geometry;

/// Pluggable geometry kernel (polygon booleans, predicates, offsetting)
pub mod kernel;

/// Nofit and inner-fit polygon construction
pub mod nfp;

/// Entities to model the nesting problem
pub mod entities;

/// Selection of feasible positions and rotations for a single item
pub mod placement;

/// Lifecycle of the bins used during a placement pass
pub mod bin_manager;

/// Pluggable bounded black-box optimizers
pub mod opt;

/// End-to-end driver of a nesting run
pub mod orchestrator;

/// Importing problem instances into and exporting solutions out of this library
pub mod io;

/// Helper functions which do not belong to any specific module
pub mod util;
