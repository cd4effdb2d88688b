//! Transformation types and traits.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// An affine transformation built from rotations, reflections, and translations.
///
/// Drawn shapes may be rotated by arbitrary angles, so the matrix is real-valued.
/// Manhattan angles produce exact `0`/`±1` entries so that transformed grid
/// coordinates stay on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    /// The transformation matrix.
    pub(crate) mat: [[f64; 2]; 2],
    /// The x-y translation applied after the transformation.
    pub(crate) b: Point,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

/// A Manhattan rotation: 0, 90, 180, or 270 degrees counterclockwise.
#[derive(Debug, Clone, Copy, Default, Eq, Ord, PartialOrd, PartialEq, Serialize, Deserialize)]
pub enum Rotation {
    /// 0 degrees; no rotation.
    #[default]
    R0,
    /// 90 degrees counterclockwise.
    R90,
    /// 180 degrees counterclockwise.
    R180,
    /// 270 degrees counterclockwise.
    R270,
}

impl Rotation {
    /// The exact rotation matrix for this rotation.
    fn matrix(&self) -> [[f64; 2]; 2] {
        match self {
            Rotation::R0 => [[1., 0.], [0., 1.]],
            Rotation::R90 => [[0., -1.], [1., 0.]],
            Rotation::R180 => [[-1., 0.], [0., -1.]],
            Rotation::R270 => [[0., 1.], [-1., 0.]],
        }
    }
}

/// Indicates that an angle was not a valid Manhattan angle.
///
/// Manhattan angles (in degrees) are 0, 90, 180, 270,
/// or any equivalent angle modulo 360 degrees.
#[derive(Debug, Clone, Copy)]
pub struct NonManhattanAngleError;

impl TryFrom<f64> for Rotation {
    type Error = NonManhattanAngleError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let wrapped = crate::wrap_angle(value);
        if wrapped.fract() != 0. {
            return Err(NonManhattanAngleError);
        }
        match wrapped as i64 {
            0 => Ok(Rotation::R0),
            90 => Ok(Rotation::R90),
            180 => Ok(Rotation::R180),
            270 => Ok(Rotation::R270),
            _ => Err(NonManhattanAngleError),
        }
    }
}

fn matmul(a: &[[f64; 2]; 2], b: &[[f64; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

fn matvec(a: &[[f64; 2]; 2], p: Point) -> Point {
    Point::new(
        a[0][0] * p.x + a[0][1] * p.y,
        a[1][0] * p.x + a[1][1] * p.y,
    )
}

impl Transformation {
    /// Returns the identity transform, leaving any transformed object unmodified.
    pub fn identity() -> Self {
        Self {
            mat: Rotation::R0.matrix(),
            b: Point::zero(),
        }
    }

    /// Returns a translation by `(x,y)`.
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            mat: Rotation::R0.matrix(),
            b: Point::new(x, y),
        }
    }

    /// Returns a counterclockwise rotation about the origin by `degrees`.
    pub fn rotate(degrees: f64) -> Self {
        let mat = match Rotation::try_from(degrees) {
            Ok(rot) => rot.matrix(),
            Err(_) => {
                let (s, c) = degrees.to_radians().sin_cos();
                [[c, -s], [s, c]]
            }
        };
        Self {
            mat,
            b: Point::zero(),
        }
    }

    /// Returns a reflection about the x-axis.
    pub fn reflect_vert() -> Self {
        Self {
            mat: [[1., 0.], [0., -1.]],
            b: Point::zero(),
        }
    }

    /// Returns a counterclockwise rotation by `degrees` about `center`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let trans = Transformation::rotate_about(Point::new(1., 1.), 90.);
    /// assert_eq!(Point::new(2., 1.).transform(trans), Point::new(1., 2.));
    /// ```
    pub fn rotate_about(center: Point, degrees: f64) -> Self {
        Self::cascade(
            Self::translate(center.x, center.y),
            Self::cascade(Self::rotate(degrees), Self::translate(-center.x, -center.y)),
        )
    }

    /// Returns the transformation that places a drawn shape about its own center:
    /// an optional vertical reflection followed by a rotation of `degrees`.
    pub fn orient_about(center: Point, degrees: f64, reflect_vert: bool) -> Self {
        let local = if reflect_vert {
            Self::cascade(Self::rotate(degrees), Self::reflect_vert())
        } else {
            Self::rotate(degrees)
        };
        Self::cascade(
            Self::translate(center.x, center.y),
            Self::cascade(local, Self::translate(-center.x, -center.y)),
        )
    }

    /// Create a new [`Transformation`] that is the cascade of `parent` and `child`.
    ///
    /// The child is applied first. This operation is not commutative.
    pub fn cascade(parent: Transformation, child: Transformation) -> Transformation {
        let b = matvec(&parent.mat, child.b) + parent.b;
        let mat = matmul(&parent.mat, &child.mat);
        Self { mat, b }
    }

    /// Returns `true` if this transformation maps axis-aligned rectangles
    /// to axis-aligned rectangles.
    pub fn is_manhattan(&self) -> bool {
        self.mat.iter().flatten().all(|v| *v == 0. || v.abs() == 1.)
    }
}

/// A trait for specifying how an object is changed by a [`Transformation`].
pub trait TransformMut {
    /// Applies matrix-vector [`Transformation`] `trans`.
    fn transform_mut(&mut self, trans: Transformation);
}

impl<T: TransformMut> TransformMut for Vec<T> {
    fn transform_mut(&mut self, trans: Transformation) {
        for item in self.iter_mut() {
            item.transform_mut(trans);
        }
    }
}

/// A trait for specifying how an object is changed by a [`Transformation`].
///
/// Takes in an owned copy of the shape and returns the transformed version.
pub trait Transform: TransformMut + Sized + Clone {
    /// Applies matrix-vector [`Transformation`] `trans`.
    ///
    /// Creates a new shape at a location equal to the transformation of the original.
    fn transform(&self, trans: Transformation) -> Self {
        let mut value = self.clone();
        value.transform_mut(trans);
        value
    }
}

impl<T: TransformMut + Sized + Clone> Transform for T {}

/// A trait for specifying how a shape is translated by a [`Point`].
pub trait TranslateMut {
    /// Translates the shape by a [`Point`] through mutation.
    fn translate_mut(&mut self, p: Point);
}

/// A trait for specifying how a shape is translated by a [`Point`].
///
/// Takes in an owned copy of the shape and returns the translated version.
pub trait Translate: TranslateMut + Sized + Clone {
    /// Translates the shape by a [`Point`].
    fn translate(&self, p: Point) -> Self {
        let mut value = self.clone();
        value.translate_mut(p);
        value
    }
}

impl<T: TranslateMut + Sized + Clone> Translate for T {}
