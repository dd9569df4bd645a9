use itertools::Itertools;
use log::debug;

use crate::geometry::primitives::{Point, SPolygon};

/// Splits a simple polygon into convex pieces whose union is the polygon.
///
/// Convex polygons are returned as is. Others are triangulated by ear clipping, after which
/// adjacent pieces are merged as long as the result stays convex (Hertel-Mehlhorn).
/// If ear clipping gets stuck on numerically ambiguous input, the remaining pieces may
/// overlap the exterior slightly, which only ever enlarges the covered area.
pub fn convex_decomposition(shape: &SPolygon) -> Vec<SPolygon> {
    if shape.is_convex() {
        return vec![shape.clone()];
    }
    let contour = remove_collinear(&shape.vertices);
    let triangles = ear_clip(&contour);
    let pieces = merge_convex(triangles);

    debug!(
        "[DECOMP] {} vertices decomposed into {} convex pieces",
        shape.n_vertices(),
        pieces.len()
    );

    pieces
        .into_iter()
        .filter_map(|p| SPolygon::new(p).ok())
        .collect_vec()
}

/// Drops vertices that lie on the segment between their neighbours
pub fn remove_collinear(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    let mut changed = true;
    while changed && pts.len() > 3 {
        changed = false;
        let n = pts.len();
        if let Some(i) = (0..n).find(|&i| {
            let (a, b, c) = (pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n]);
            a.cross(&b, &c) == 0.0 || a == b
        }) {
            pts.remove(i);
            changed = true;
        }
    }
    pts
}

/// Whether `p` lies inside the counterclockwise triangle or on its boundary
fn in_triangle(a: &Point, b: &Point, c: &Point, p: &Point) -> bool {
    a.cross(b, p) >= 0.0 && b.cross(c, p) >= 0.0 && c.cross(a, p) >= 0.0
}

/// Ear clipping triangulation of a counterclockwise simple polygon
fn ear_clip(contour: &[Point]) -> Vec<Vec<Point>> {
    let mut remaining = contour.to_vec();
    let mut triangles = vec![];

    while remaining.len() > 3 {
        //clipping can leave straight vertices behind, they never form an ear
        let n = remaining.len();
        if let Some(i) = (0..n).find(|&i| {
            let (a, b, c) = (
                remaining[(i + n - 1) % n],
                remaining[i],
                remaining[(i + 1) % n],
            );
            a.cross(&b, &c) == 0.0
        }) {
            remaining.remove(i);
            continue;
        }
        let n = remaining.len();
        let corner = |i: usize| {
            (
                remaining[(i + n - 1) % n],
                remaining[i],
                remaining[(i + 1) % n],
            )
        };
        let is_ear = |i: usize| {
            let (a, b, c) = corner(i);
            a.cross(&b, &c) > 0.0
                && !remaining
                    .iter()
                    .filter(|p| **p != a && **p != b && **p != c)
                    .any(|p| in_triangle(&a, &b, &c, p))
        };

        let ear = (0..n).find(|&i| is_ear(i)).or_else(|| {
            //numerically stuck: clip the sharpest convex corner
            (0..n)
                .filter(|&i| {
                    let (a, b, c) = corner(i);
                    a.cross(&b, &c) > 0.0
                })
                .max_by(|&i, &j| {
                    let (a, b, c) = corner(i);
                    let (d, e, f) = corner(j);
                    a.cross(&b, &c).total_cmp(&d.cross(&e, &f))
                })
        });

        match ear {
            Some(i) => {
                let (a, b, c) = corner(i);
                triangles.push(vec![a, b, c]);
                remaining.remove(i);
            }
            None => break,
        }
    }
    if remaining.len() == 3 && remaining[0].cross(&remaining[1], &remaining[2]) > 0.0 {
        triangles.push(remaining);
    }
    triangles
}

fn is_convex_ring(points: &[Point]) -> bool {
    let n = points.len();
    (0..n).all(|i| points[i].cross(&points[(i + 1) % n], &points[(i + 2) % n]) >= 0.0)
}

/// Merges `a` and `b` along a shared edge, if they have one
fn merge_along_shared_edge(a: &[Point], b: &[Point]) -> Option<Vec<Point>> {
    let (na, nb) = (a.len(), b.len());
    for i in 0..na {
        let (p, q) = (a[i], a[(i + 1) % na]);
        if let Some(j) = (0..nb).find(|&j| b[j] == q && b[(j + 1) % nb] == p) {
            //walk a from q around to p, then b from p around to q (exclusive)
            let mut merged = (0..na).map(|k| a[(i + 1 + k) % na]).collect_vec();
            merged.extend((1..nb - 1).map(|k| b[(j + 1 + k) % nb]));
            return Some(merged);
        }
    }
    None
}

/// Greedy Hertel-Mehlhorn: join pieces over shared diagonals while they stay convex
fn merge_convex(mut pieces: Vec<Vec<Point>>) -> Vec<Vec<Point>> {
    let mut merged_any = true;
    while merged_any {
        merged_any = false;
        'search: for i in 0..pieces.len() {
            for j in (i + 1)..pieces.len() {
                if let Some(m) = merge_along_shared_edge(&pieces[i], &pieces[j]) {
                    let m = remove_collinear(&m);
                    if is_convex_ring(&m) {
                        pieces[i] = m;
                        pieces.swap_remove(j);
                        merged_any = true;
                        break 'search;
                    }
                }
            }
        }
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::geo_traits::{CollidesWith, Shape};
    use crate::geometry::primitives::Polygon;
    use crate::kernel::{GeoKernel, GeometryKernel};
    use test_case::test_case;

    fn l_shape() -> SPolygon {
        SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(4.0, 0.0),
            Point(4.0, 1.0),
            Point(1.0, 1.0),
            Point(1.0, 4.0),
            Point(0.0, 4.0),
        ])
        .unwrap()
    }

    fn comb() -> SPolygon {
        SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(5.0, 0.0),
            Point(5.0, 3.0),
            Point(4.0, 3.0),
            Point(4.0, 1.0),
            Point(3.0, 1.0),
            Point(3.0, 3.0),
            Point(2.0, 3.0),
            Point(2.0, 1.0),
            Point(1.0, 1.0),
            Point(1.0, 3.0),
            Point(0.0, 3.0),
        ])
        .unwrap()
    }

    /// Reflex vertex (2, 2) lies on the diagonals of both lower corners
    fn chevron() -> SPolygon {
        SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(4.0, 0.0),
            Point(4.0, 4.0),
            Point(2.0, 2.0),
            Point(0.0, 4.0),
        ])
        .unwrap()
    }

    fn l_shape_with_midpoints() -> SPolygon {
        SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(2.0, 0.0),
            Point(4.0, 0.0),
            Point(4.0, 2.0),
            Point(2.0, 2.0),
            Point(2.0, 3.0),
            Point(2.0, 4.0),
            Point(0.0, 4.0),
        ])
        .unwrap()
    }

    #[test_case(l_shape(); "l shape")]
    #[test_case(comb(); "comb")]
    #[test_case(chevron(); "chevron")]
    #[test_case(l_shape_with_midpoints(); "l shape with collinear vertices")]
    fn pieces_are_convex_and_cover_the_area(shape: SPolygon) {
        let pieces = convex_decomposition(&shape);
        assert!(pieces.len() > 1);
        assert!(pieces.iter().all(|p| p.is_convex()));
        let total: f64 = pieces.iter().map(|p| p.area()).sum();
        assert!((total - shape.area()).abs() < 1e-9);

        let kernel = GeoKernel::new();
        let union = kernel
            .union(&pieces.into_iter().map(Polygon::from).collect_vec())
            .unwrap();
        let union_area: f64 = union.iter().map(|p| p.area()).sum();
        assert!((union_area - shape.area()).abs() < 1e-9);
        let outside = kernel
            .difference(&union, &[Polygon::from(shape.clone())])
            .unwrap();
        assert!(outside.iter().map(|p| p.area()).sum::<f64>() < 1e-9);
    }

    #[test]
    fn chevron_keeps_its_notch() {
        let pieces = convex_decomposition(&chevron());
        let notch = Point(2.0, 3.0);
        assert!(!pieces.iter().any(|p| p.collides_with(&notch)));
    }

    #[test]
    fn l_shape_merges_into_two_pieces() {
        assert_eq!(convex_decomposition(&l_shape()).len(), 2);
    }

    #[test]
    fn convex_input_is_untouched() {
        let square = SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(1.0, 0.0),
            Point(1.0, 1.0),
            Point(0.0, 1.0),
        ])
        .unwrap();
        assert_eq!(convex_decomposition(&square), vec![square]);
    }
}
