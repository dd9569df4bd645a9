use crate::config::PlacementHeuristic;
use crate::geometry::primitives::Rect;

/// Lexicographic score of a candidate position, lower is better
pub type ScoreKey = [i64; 3];

/// Scores candidate positions according to a [`PlacementHeuristic`].
///
/// Metrics are normalized by the characteristic length `l` and quantized in steps of the
/// relative epsilon. Differences below the tolerance therefore compare as equal and fall
/// through to the next component of the key (and finally to the scan index).
#[derive(Clone, Copy, Debug)]
pub struct Scorer {
    pub heuristic: PlacementHeuristic,
    l: f64,
    relative_eps: f64,
}

impl Scorer {
    pub fn new(heuristic: PlacementHeuristic, characteristic_length: f64, relative_eps: f64) -> Self {
        Scorer {
            heuristic,
            l: characteristic_length,
            relative_eps,
        }
    }

    /// * `placed` - bounding box of the item at the candidate position
    /// * `pile` - bounding box of the items already in the bin
    /// * `bin` - bounding box of the bin
    pub fn score(&self, placed: Rect, pile: Option<Rect>, bin: Rect) -> ScoreKey {
        let bl = [self.length(placed.x_max), self.length(placed.y_max)];
        match self.heuristic {
            PlacementHeuristic::BottomLeft => [bl[0], bl[1], 0],
            PlacementHeuristic::MinBoundingBox => {
                let pile = grown_pile(pile, placed);
                [self.area(pile.area()), bl[0], bl[1]]
            }
            PlacementHeuristic::Centered => {
                let pile = grown_pile(pile, placed);
                let offset = pile.centroid().distance(&bin.centroid()) / self.l;
                let compactness = pile.area() / (self.l * self.l);
                let metric = 0.5 * offset + 0.5 * compactness;
                [self.quantize(metric), bl[0], bl[1]]
            }
        }
    }

    fn length(&self, v: f64) -> i64 {
        self.quantize(v / self.l)
    }

    fn area(&self, a: f64) -> i64 {
        self.quantize(a / (self.l * self.l))
    }

    fn quantize(&self, normalized: f64) -> i64 {
        (normalized / self.relative_eps).round() as i64
    }
}

fn grown_pile(pile: Option<Rect>, placed: Rect) -> Rect {
    match pile {
        Some(pile) => Rect::bounding_rect(pile, placed),
        None => placed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect::try_new(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn bottom_left_prefers_left_over_low() {
        let s = Scorer::new(PlacementHeuristic::BottomLeft, 10.0, 1e-6);
        let bin = r(0.0, 0.0, 10.0, 10.0);
        let left_high = s.score(r(0.0, 5.0, 2.0, 7.0), None, bin);
        let right_low = s.score(r(5.0, 0.0, 7.0, 2.0), None, bin);
        assert!(left_high < right_low);
    }

    #[test]
    fn sub_tolerance_differences_compare_equal() {
        let s = Scorer::new(PlacementHeuristic::BottomLeft, 10.0, 1e-6);
        let bin = r(0.0, 0.0, 10.0, 10.0);
        let a = s.score(r(0.0, 0.0, 2.0, 2.0), None, bin);
        let b = s.score(r(1e-9, 0.0, 2.0 + 1e-9, 2.0), None, bin);
        assert_eq!(a, b);
    }

    #[test]
    fn min_bounding_box_prefers_stacking_in_the_pile() {
        let s = Scorer::new(PlacementHeuristic::MinBoundingBox, 10.0, 1e-6);
        let bin = r(0.0, 0.0, 10.0, 10.0);
        let pile = Some(r(0.0, 0.0, 4.0, 4.0));
        let inside_pile_bbox = s.score(r(2.0, 2.0, 4.0, 4.0), pile, bin);
        let next_to_pile = s.score(r(4.0, 0.0, 6.0, 2.0), pile, bin);
        assert!(inside_pile_bbox < next_to_pile);
    }

    #[test]
    fn centered_prefers_the_middle() {
        let s = Scorer::new(PlacementHeuristic::Centered, 10.0, 1e-6);
        let bin = r(0.0, 0.0, 10.0, 10.0);
        let center = s.score(r(4.0, 4.0, 6.0, 6.0), None, bin);
        let corner = s.score(r(0.0, 0.0, 2.0, 2.0), None, bin);
        assert!(center < corner);
    }
}
