mod bin;
mod instance;
mod item;
mod layout;
mod original_shape;
mod placed_item;
mod solution;

#[doc(inline)]
pub use bin::Bin;
#[doc(inline)]
pub use instance::{ItemCopy, NestInstance};
#[doc(inline)]
pub use item::Item;
#[doc(inline)]
pub use layout::Layout;
#[doc(inline)]
pub use original_shape::OriginalShape;
#[doc(inline)]
pub use placed_item::{PItemKey, PlacedItem};
#[doc(inline)]
pub use solution::{BinStats, NestingSolution, PlacementFailure, PlacementOutcome, PlacementResult};
