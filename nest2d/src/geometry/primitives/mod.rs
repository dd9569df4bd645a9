mod edge;
mod point;
mod polygon;
mod rect;
mod simple_polygon;

pub use polygon::{total_area, total_bbox};

#[doc(inline)]
pub use edge::Edge;
#[doc(inline)]
pub use point::Point;
#[doc(inline)]
pub use polygon::Polygon;
#[doc(inline)]
pub use rect::Rect;
#[doc(inline)]
pub use simple_polygon::SPolygon;
