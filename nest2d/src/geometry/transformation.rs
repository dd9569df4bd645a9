use std::borrow::Borrow;

use crate::geometry::d_transformation::DTransformation;

/// Proper rigid transformation as the top two rows of a homogeneous 3x3 matrix.
///
/// `[[cos, -sin, tx], [sin, cos, ty]]`: a rotation around the origin followed by a translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transformation {
    rows: [[f64; 3]; 2],
}

const IDENTITY: [[f64; 3]; 2] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

impl Transformation {
    pub const fn empty() -> Self {
        Self { rows: IDENTITY }
    }

    fn rigid(angle: f64, (tx, ty): (f64, f64)) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            rows: [[cos, -sin, tx], [sin, cos, ty]],
        }
    }

    pub fn from_translation(t: (f64, f64)) -> Self {
        Self::rigid(0.0, t)
    }

    pub fn from_rotation(angle: f64) -> Self {
        Self::rigid(angle, (0.0, 0.0))
    }

    pub fn from_dt(dt: &DTransformation) -> Self {
        Self::rigid(dt.rotation(), dt.translation())
    }

    /// Rotation around `pivot`
    pub fn from_rotation_around(angle: f64, (px, py): (f64, f64)) -> Self {
        Self::from_translation((-px, -py))
            .rotate(angle)
            .translate((px, py))
    }

    pub fn rotate(self, angle: f64) -> Self {
        self.transform(&Self::from_rotation(angle))
    }

    pub fn translate(self, (tx, ty): (f64, f64)) -> Self {
        let [[a, b, c], [d, e, f]] = self.rows;
        Self {
            rows: [[a, b, c + tx], [d, e, f + ty]],
        }
    }

    /// Applies `other` after `self`
    pub fn transform(self, other: &Self) -> Self {
        let [l0, l1] = other.rows;
        let [r0, r1] = self.rows;
        let row = |l: [f64; 3]| {
            [
                l[0] * r0[0] + l[1] * r1[0],
                l[0] * r0[1] + l[1] * r1[1],
                l[0] * r0[2] + l[1] * r1[2] + l[2],
            ]
        };
        Self {
            rows: [row(l0), row(l1)],
        }
    }

    pub fn transform_from_decomposed(self, other: &DTransformation) -> Self {
        self.transform(&Self::from_dt(other))
    }

    /// Inverse of a rigid transformation: transposed rotation, counter-rotated translation
    pub fn inverse(self) -> Self {
        let [[cos, _, tx], [sin, _, ty]] = self.rows;
        Self {
            rows: [
                [cos, sin, -(cos * tx + sin * ty)],
                [-sin, cos, sin * tx - cos * ty],
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == IDENTITY
    }

    /// Maps `(x, y)` to its transformed coordinates
    #[inline(always)]
    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let [[a, b, c], [d, e, f]] = self.rows;
        (a * x + b * y + c, d * x + e * y + f)
    }

    pub fn decompose(&self) -> DTransformation {
        let [[cos, _, tx], [sin, _, ty]] = self.rows;
        DTransformation::new(sin.atan2(cos), (tx, ty))
    }
}

impl<T> From<T> for Transformation
where
    T: Borrow<DTransformation>,
{
    fn from(dt: T) -> Self {
        Self::from_dt(dt.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::geo_traits::Transformable;
    use crate::geometry::primitives::Point;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn inverse_undoes_transformation() {
        let t = Transformation::from_rotation(0.7).translate((3.0, -2.0));
        let p = Point(1.5, 2.5);
        let back = p.transform_clone(&t).transform_clone(&t.inverse());
        assert!(p.distance(&back) < 1e-9);
        assert!(t.transform(&t.inverse()).decompose().translation().0.abs() < 1e-12);
    }

    #[test]
    fn rotation_around_pivot_keeps_pivot_fixed() {
        let t = Transformation::from_rotation_around(FRAC_PI_2, (1.0, 1.0));
        let p = Point(1.0, 1.0).transform_clone(&t);
        assert!(p.distance(&Point(1.0, 1.0)) < 1e-12);
        let q = Point(2.0, 1.0).transform_clone(&t);
        assert!(q.distance(&Point(1.0, 2.0)) < 1e-12);
    }

    #[test]
    fn composition_order() {
        //rotate, then translate: (1, 0) -> (0, 1) -> (5, 1)
        let t = Transformation::empty().rotate(FRAC_PI_2).translate((5.0, 0.0));
        let (x, y) = t.apply((1.0, 0.0));
        assert!((x - 5.0).abs() < 1e-12 && (y - 1.0).abs() < 1e-12);
        let dt = t.decompose();
        assert!((dt.rotation() - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(dt.translation(), (5.0, 0.0));
    }
}
