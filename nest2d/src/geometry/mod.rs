pub use d_transformation::DTransformation;
pub use transformation::Transformation;

mod d_transformation;
mod transformation;

/// Convex hull of point sets
pub mod convex_hull;

/// Decomposition of simple polygons into convex pieces
pub mod decomposition;

/// Enums for geometric relations and rotation ranges
pub mod geo_enums;

/// Set of traits shared by the geometric primitives
pub mod geo_traits;

/// Geometric primitives: points, edges, rectangles and polygons
pub mod primitives;
