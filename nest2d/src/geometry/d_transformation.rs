use std::borrow::Borrow;
use std::fmt::Display;

use crate::geometry::Transformation;

/// [Proper rigid transformation](https://en.wikipedia.org/wiki/Rigid_transformation),
/// decomposed into a rotation (radians, around the origin) followed by a translation.
///
/// This is the form in which placements are stored and reported.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DTransformation {
    rotation: f64,
    translation: (f64, f64),
}

impl DTransformation {
    pub fn new(rotation: f64, translation: (f64, f64)) -> Self {
        debug_assert!(rotation.is_finite() && translation.0.is_finite() && translation.1.is_finite());
        Self {
            rotation,
            translation,
        }
    }

    pub const fn empty() -> Self {
        Self {
            rotation: 0.0,
            translation: (0.0, 0.0),
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn translation(&self) -> (f64, f64) {
        self.translation
    }

    pub fn compose(&self) -> Transformation {
        Transformation::from_dt(self)
    }
}

impl<T> From<T> for DTransformation
where
    T: Borrow<Transformation>,
{
    fn from(t: T) -> Self {
        t.borrow().decompose()
    }
}

impl Display for DTransformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (tx, ty) = self.translation;
        write!(f, "{:.3}° @ ({:.3}, {:.3})", self.rotation.to_degrees(), tx, ty)
    }
}
