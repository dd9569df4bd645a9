use serde::{Deserialize, Serialize};

use crate::entities::PlacementFailure;
use crate::geometry::DTransformation;

/// External representation of a nesting problem: the items to place and the bins to place them in
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ExtNestInput {
    #[serde(default)]
    pub items: Vec<ExtItem>,
    pub bins: Vec<ExtBin>,
}

/// External representation of an [`Item`](crate::entities::Item).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtItem {
    /// Unique identifier of the item
    pub id: u64,
    /// Shape of the item
    pub shape: ExtShape,
    /// Number of copies to place
    #[serde(default = "default_quantity")]
    pub quantity: usize,
    /// Items with a higher priority are placed first
    #[serde(default)]
    pub priority: i32,
    /// List of allowed rotation angles (in degrees).
    /// The rotations of the configuration are used if not specified
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub allowed_rotations: Option<Vec<f64>>,
}

fn default_quantity() -> usize {
    1
}

/// External representation of a [`Bin`](crate::entities::Bin) type.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtBin {
    /// Unique identifier of the bin type
    pub id: u64,
    /// Shape of the bin, holes are areas where no item can be placed
    pub shape: ExtShape,
    /// Number of bins of this type available, unlimited if not specified
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stock: Option<usize>,
}

/// Various ways to represent a shape
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ExtShape {
    /// Axis-aligned rectangle. With its left bottom corner at (x_min, y_min), a width and height
    Rectangle {
        x_min: f64,
        y_min: f64,
        width: f64,
        height: f64,
    },
    /// Polygon with a single outer boundary
    SimplePolygon(ExtSPolygon),
    /// Polygon with a single outer boundary and a set of holes
    Polygon(ExtPolygon),
}

/// A polygon represented as an outer boundary and a list of holes
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtPolygon {
    /// The outer boundary of the polygon
    pub outer: ExtSPolygon,
    /// A list of holes in the polygon
    #[serde(default)]
    pub inner: Vec<ExtSPolygon>,
}

/// A polygon with no holes and no self-intersections, in any orientation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSPolygon(pub Vec<(f64, f64)>);

/// External representation of a [`NestingOutcome`](crate::orchestrator::NestingOutcome)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtNestSolution {
    pub status: ExtRunStatus,
    /// Why the run failed, if it did
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// One entry per item copy: placed ones in placement order, then the unplaced ones
    pub placements: Vec<ExtPlacement>,
    /// Statistics of every opened bin, in opening order
    pub bins: Vec<ExtBinStats>,
    pub fitness: f64,
    /// Total placed area divided by total area of the opened bins
    pub density: f64,
    pub run_time_ms: u64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtRunStatus {
    Complete,
    Cancelled,
    Failed,
}

/// Where (and if) a copy of an item was placed
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtPlacement {
    /// The id of the item in the input
    pub item_id: u64,
    pub copy: usize,
    /// Index of the bin (in [`ExtNestSolution::bins`]) the copy was placed in
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bin_idx: Option<usize>,
    /// The transformation applied to the item, as defined in the input, to place it
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transformation: Option<ExtTransformation>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure: Option<PlacementFailure>,
}

/// Represents a proper rigid transformation defined as a rotation followed by translation
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ExtTransformation {
    /// The rotation angle in degrees
    pub rotation: f64,
    /// The translation vector (x, y)
    pub translation: (f64, f64),
}

impl From<DTransformation> for ExtTransformation {
    fn from(dt: DTransformation) -> Self {
        ExtTransformation {
            rotation: dt.rotation().to_degrees(),
            translation: dt.translation(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct ExtBinStats {
    pub bin_idx: usize,
    /// The id of the bin type in the input
    pub bin_id: u64,
    pub n_items: usize,
    pub placed_area: f64,
    pub bin_area: f64,
    pub utilization: f64,
}
