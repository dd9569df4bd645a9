#![allow(dead_code)]

use std::sync::Once;

use nest2d::geometry::geo_traits::{Shape, Transformable};
use nest2d::geometry::primitives::{Polygon, Rect, total_area};
use nest2d::io::ext_repr::{
    ExtBin, ExtItem, ExtNestInput, ExtNestSolution, ExtPolygon, ExtSPolygon, ExtShape,
};
use nest2d::io::import::import_shape;
use nest2d::kernel::{GeoKernel, GeometryKernel};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn rect(width: f64, height: f64) -> ExtShape {
    ExtShape::Rectangle {
        x_min: 0.0,
        y_min: 0.0,
        width,
        height,
    }
}

pub fn l_shape(size: f64) -> ExtShape {
    let h = size / 2.0;
    ExtShape::SimplePolygon(ExtSPolygon(vec![
        (0.0, 0.0),
        (size, 0.0),
        (size, h),
        (h, h),
        (h, size),
        (0.0, size),
    ]))
}

/// Square of `size` with a V-shaped notch cut from the top edge down to its center
pub fn chevron(size: f64) -> ExtShape {
    let h = size / 2.0;
    ExtShape::SimplePolygon(ExtSPolygon(vec![
        (0.0, 0.0),
        (size, 0.0),
        (size, size),
        (h, h),
        (0.0, size),
    ]))
}

/// Square frame of `size` with a square hole of `hole`
pub fn frame(size: f64, hole: f64) -> ExtShape {
    let lo = (size - hole) / 2.0;
    let hi = lo + hole;
    ExtShape::Polygon(ExtPolygon {
        outer: ExtSPolygon(vec![(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)]),
        inner: vec![ExtSPolygon(vec![(lo, lo), (hi, lo), (hi, hi), (lo, hi)])],
    })
}

pub fn item(id: u64, shape: ExtShape, quantity: usize) -> ExtItem {
    ExtItem {
        id,
        shape,
        quantity,
        priority: 0,
        allowed_rotations: None,
    }
}

pub fn fixed_item(id: u64, shape: ExtShape, quantity: usize) -> ExtItem {
    ExtItem {
        allowed_rotations: Some(vec![0.0]),
        ..item(id, shape, quantity)
    }
}

pub fn bin(id: u64, shape: ExtShape) -> ExtBin {
    ExtBin {
        id,
        shape,
        stock: None,
    }
}

pub fn input(items: Vec<ExtItem>, bins: Vec<ExtBin>) -> ExtNestInput {
    ExtNestInput { items, bins }
}

/// Item shapes of a solution, as placed in input coordinates, grouped per bin
pub fn placed_shapes(input: &ExtNestInput, solution: &ExtNestSolution) -> Vec<Vec<Polygon>> {
    let mut per_bin = vec![vec![]; solution.bins.len()];
    for p in &solution.placements {
        let (Some(bin_idx), Some(t)) = (p.bin_idx, p.transformation) else {
            continue;
        };
        let ext_item = input.items.iter().find(|i| i.id == p.item_id).unwrap();
        let shape = import_shape(&ext_item.shape).unwrap();
        let dt = nest2d::geometry::DTransformation::new(t.rotation.to_radians(), t.translation);
        per_bin[bin_idx].push(shape.transform_clone(&dt.compose()));
    }
    per_bin
}

/// Shape of the bin each entry of [`ExtNestSolution::bins`] was opened from
pub fn bin_shapes(input: &ExtNestInput, solution: &ExtNestSolution) -> Vec<Polygon> {
    solution
        .bins
        .iter()
        .map(|b| {
            let ext_bin = input.bins.iter().find(|eb| eb.id == b.bin_id).unwrap();
            import_shape(&ext_bin.shape).unwrap()
        })
        .collect()
}

/// Overlap area tolerated between two shapes that touch
pub fn slack(a: &Polygon, b: &Polygon) -> f64 {
    1e-6 * (a.diameter() + b.diameter())
}

pub fn max_pairwise_overlap(shapes: &[Polygon]) -> f64 {
    let kernel = GeoKernel::new();
    let mut max = 0.0_f64;
    for (i, a) in shapes.iter().enumerate() {
        for b in &shapes[i + 1..] {
            let overlap = total_area(&kernel.intersection(&[a.clone()], &[b.clone()]).unwrap());
            max = max.max(overlap - slack(a, b));
        }
    }
    max
}

/// Area of `shape` outside `container`
pub fn area_outside(shape: &Polygon, container: &Polygon) -> f64 {
    let kernel = GeoKernel::new();
    total_area(&kernel.difference(&[shape.clone()], &[container.clone()]).unwrap())
}

pub fn pile_area(shapes: &[Polygon]) -> f64 {
    shapes
        .iter()
        .map(|s| s.bbox())
        .reduce(Rect::bounding_rect)
        .map_or(0.0, |r| r.area())
}
