mod heuristic;
mod ordering;
mod strategy;

#[doc(inline)]
pub use heuristic::{ScoreKey, Scorer};
#[doc(inline)]
pub use ordering::{initial_order, order_from_keys};
#[doc(inline)]
pub use strategy::PlacementStrategy;
