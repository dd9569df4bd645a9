use crate::geometry::primitives::{Point, SPolygon};

/// Edges whose directions differ less than this (radians) are merged into one step
const PARALLEL_ANGLE_EPS: f64 = 1e-12;

/// Minkowski sum of two convex polygons.
///
/// Both edge sequences are walked counterclockwise from their bottom-left vertices and merged
/// by edge slope, which traces the boundary of the sum in `O(n + m)`.
/// Returns `None` if the result has no area.
pub fn minkowski_sum_convex(a: &SPolygon, b: &SPolygon) -> Option<SPolygon> {
    debug_assert!(a.is_convex() && b.is_convex());
    let (na, nb) = (a.n_vertices(), b.n_vertices());
    let (sa, sb) = (a.bottom_left_vertex_idx(), b.bottom_left_vertex_idx());

    let mut boundary = Vec::with_capacity(na + nb);
    let mut current = a.vertex(sa) + b.vertex(sb);
    let (mut i, mut j) = (0, 0);

    while i < na || j < nb {
        boundary.push(current);
        let ea = (i < na).then(|| a.edge((sa + i) % na));
        let eb = (j < nb).then(|| b.edge((sb + j) % nb));
        let step = match (ea, eb) {
            (Some(ea), Some(eb)) => {
                let (alpha, beta) = (ea.angle(), eb.angle());
                if alpha < beta - PARALLEL_ANGLE_EPS {
                    i += 1;
                    ea.end - ea.start
                } else if beta < alpha - PARALLEL_ANGLE_EPS {
                    j += 1;
                    eb.end - eb.start
                } else {
                    i += 1;
                    j += 1;
                    (ea.end - ea.start) + (eb.end - eb.start)
                }
            }
            (Some(ea), None) => {
                i += 1;
                ea.end - ea.start
            }
            (None, Some(eb)) => {
                j += 1;
                eb.end - eb.start
            }
            (None, None) => Point(0.0, 0.0),
        };
        current = current + step;
    }

    SPolygon::new(boundary).ok()
}

/// Nofit polygon of two convex polygons: `stationary ⊕ (−orbiting)`.
///
/// This is the locus traced by the reference point of `orbiting` (its origin)
/// while it slides around `stationary` keeping contact.
pub fn convex_nfp(stationary: &SPolygon, orbiting: &SPolygon) -> Option<SPolygon> {
    minkowski_sum_convex(stationary, &orbiting.reflected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::geo_traits::Shape;
    use crate::geometry::primitives::Rect;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> SPolygon {
        Rect::try_new(x0, y0, x1, y1).unwrap().into()
    }

    #[test]
    fn sum_of_squares_is_square() {
        let sum = minkowski_sum_convex(&rect(0.0, 0.0, 2.0, 2.0), &rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(sum.bbox(), Rect::try_new(0.0, 0.0, 3.0, 3.0).unwrap());
        assert!((sum.area() - 9.0).abs() < 1e-12);
        assert_eq!(sum.n_vertices(), 4);
    }

    #[test]
    fn nfp_of_centered_squares() {
        //orbiting square centered on its reference point
        let nfp = convex_nfp(&rect(0.0, 0.0, 4.0, 4.0), &rect(-1.0, -1.0, 1.0, 1.0)).unwrap();
        assert_eq!(nfp.bbox(), Rect::try_new(-1.0, -1.0, 5.0, 5.0).unwrap());
    }

    #[test]
    fn triangle_and_square_sum_has_all_edges() {
        let tri = SPolygon::new(vec![Point(0.0, 0.0), Point(2.0, 0.0), Point(0.0, 2.0)]).unwrap();
        let sum = minkowski_sum_convex(&tri, &rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        //triangle (2) + square (1) + mixed terms (2 * 2)
        assert!((sum.area() - 7.0).abs() < 1e-12);
        assert_eq!(sum.n_vertices(), 5);
    }
}
