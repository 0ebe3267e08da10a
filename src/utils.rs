use crate::shape::Point;

/// Determinant of the 2x2 matrix `[[a, b], [c, d]]`
#[inline]
pub fn det2(a: f64, b: f64, c: f64, d: f64) -> f64 {
    a * d - b * c
}

/// Determinant of the 3x3 matrix `[[a, b, c], [d, e, f], [g, h, i]]`
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn det3(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64, g: f64, h: f64, i: f64) -> f64 {
    a * det2(e, f, h, i) - b * det2(d, f, g, i) + c * det2(d, e, g, h)
}

/// Determinant of a 3x3 matrix whose third column is all ones,
/// `det3(a, b, 1, d, e, 1, f, g, 1)`.
#[inline]
pub fn det3_ones(a: f64, b: f64, d: f64, e: f64, f: f64, g: f64) -> f64 {
    (d - a) * (g - b) - (f - a) * (e - b)
}

/// z component of the curl of the path p1 -> p2 -> p3, taken relative to p3.
#[inline]
pub fn curl_z(p1: Point, p2: Point, p3: Point) -> f64 {
    (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
}

#[derive(Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Clock Wise
    ///
    ///  a     b
    ///             c
    ///
    CW,
    /// Counter Clock Wise
    ///             c
    ///  a     b
    CCW,
    /// Collinear
    ///  a     b    c
    Collinear,
}

impl Orientation {
    pub fn is_cw(&self) -> bool {
        matches!(self, Self::CW)
    }

    pub fn is_collinear(&self) -> bool {
        matches!(self, Self::Collinear)
    }
}

pub fn orient_2d(a: Point, b: Point, c: Point) -> Orientation {
    let val = det3_ones(a.x, a.y, b.x, b.y, c.x, c.y);

    if val > 0. {
        Orientation::CCW
    } else if val < 0. {
        Orientation::CW
    } else {
        Orientation::Collinear
    }
}

pub fn is_clockwise(a: Point, b: Point, c: Point) -> bool {
    orient_2d(a, b, c).is_cw()
}

pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    0.5 * det3_ones(a.x, a.y, b.x, b.y, c.x, c.y).abs()
}

/// Shewchuk's `iccerrboundA`, relative error bound of the float in-circle determinant
const IN_CIRCLE_ERR_BOUND: f64 = (10. + 96. * HALF_EPSILON) * HALF_EPSILON;
const HALF_EPSILON: f64 = f64::EPSILON / 2.;

/// Signed in-circle determinant for `d` against the circle through `a`, `b`, `c`.
///
/// For a clockwise `a, b, c` the result is negative iff `d` lies strictly
/// inside the circle, zero when the four points are cocircular.
/// The float determinant is returned when it clears its error bound,
/// otherwise the sign comes from the exact predicate.
pub fn in_circle(a: Point, b: Point, c: Point, d: Point) -> f64 {
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);

    let (bdxcdy, cdxbdy) = (bdx * cdy, cdx * bdy);
    let (cdxady, adxcdy) = (cdx * ady, adx * cdy);
    let (adxbdy, bdxady) = (adx * bdy, bdx * ady);

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);

    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;

    if det.abs() > IN_CIRCLE_ERR_BOUND * permanent {
        det
    } else {
        robust::incircle(a.into(), b.into(), c.into(), d.into())
    }
}
