use ordered_float::OrderedFloat;

use crate::geometry::primitives::Point;

/// Filters a set of points to only include those that are part of the convex hull.
/// The hull is returned in counterclockwise order without collinear points.
pub fn convex_hull_from_points(mut points: Vec<Point>) -> Vec<Point> {
    //https://en.wikibooks.org/wiki/Algorithm_Implementation/Geometry/Convex_hull/Monotone_chain
    points.sort_by_key(|p| (OrderedFloat(p.0), OrderedFloat(p.1)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut lower_hull = points
        .iter()
        .fold(vec![], |hull, p| grow_convex_hull(hull, *p));
    let mut upper_hull = points
        .iter()
        .rev()
        .fold(vec![], |hull, p| grow_convex_hull(hull, *p));

    //First and last element of both hull parts are the same point
    upper_hull.pop();
    lower_hull.pop();

    lower_hull.append(&mut upper_hull);
    lower_hull
}

fn grow_convex_hull(mut h: Vec<Point>, next: Point) -> Vec<Point> {
    //pop all points from the hull which will be made irrelevant due to the new point
    while h.len() >= 2 && h[h.len() - 2].cross(&h[h.len() - 1], &next) <= 0.0 {
        h.pop();
    }
    h.push(next);
    h
}
