use crate::galois_field::{GaloisField, GaloisFieldError};
use log::{debug, trace};
use num_bigint::BigUint;
use num_traits::{One, Zero};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

///
/// A point of the curve group: the affine pair `(x, y)` or the point at
/// infinity, the identity of the group.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Point {
    Coor(BigUint, BigUint),
    Identity,
}

///
/// Unvalidated curve description `y^2 = x^3 + a * x + b mod p`, the form a
/// curve is configured or stored in. Turn it into an [`EllipticCurve`] with
/// `EllipticCurve::try_from`.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveParameters {
    pub a: BigUint,
    pub b: BigUint,
    pub p: BigUint,
}

///
/// Short Weierstrass curve over the prime field `F_p`:
///
/// `y^2 = x^3 + a * x + b mod p`
///
/// Construction guarantees `p` is an odd prime, `0 < a, b < p` and a non-zero
/// discriminant `4 * a^3 + 27 * b^2`, so the chord-tangent law forms a group.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "CurveParameters", into = "CurveParameters")
)]
pub struct EllipticCurve {
    a: BigUint,
    b: BigUint,
    p: BigUint,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EllipticCurveError {
    #[error("invalid curve parameters: {0}")]
    InvalidCurveParameters(String),
    #[error("point {0:?} is not on the curve")]
    PointNotOnCurve(Point),
    #[error("{0} is not a quadratic residue, no point on the curve")]
    NoSquareRoot(BigUint),
    #[error("{0} has no inverse in the field")]
    NotInvertible(BigUint),
    #[error("scalar {0} is out of range for the field")]
    InvalidScalar(BigUint),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("malformed encoding: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, EllipticCurveError>;

impl From<GaloisFieldError> for EllipticCurveError {
    fn from(e: GaloisFieldError) -> Self {
        match e {
            GaloisFieldError::InvalidArgument(msg) => EllipticCurveError::InvalidArgument(msg),
            GaloisFieldError::NotInvertible(n, _) => EllipticCurveError::NotInvertible(n),
            GaloisFieldError::NoSquareRoot(n, _) => EllipticCurveError::NoSquareRoot(n),
        }
    }
}

impl TryFrom<CurveParameters> for EllipticCurve {
    type Error = EllipticCurveError;

    fn try_from(params: CurveParameters) -> Result<Self> {
        EllipticCurve::new(params.a, params.b, params.p)
    }
}

impl From<EllipticCurve> for CurveParameters {
    fn from(curve: EllipticCurve) -> Self {
        CurveParameters {
            a: curve.a,
            b: curve.b,
            p: curve.p,
        }
    }
}

impl EllipticCurve {
    pub fn new(a: BigUint, b: BigUint, p: BigUint) -> Result<Self> {
        if p <= BigUint::from(2u32) || !GaloisField::is_probable_prime(&p) {
            debug!("rejecting curve: modulus {} is not an odd prime", p);
            return Err(EllipticCurveError::InvalidCurveParameters(format!(
                "modulus {} is not an odd prime",
                p
            )));
        }
        if a.is_zero() || a >= p || b.is_zero() || b >= p {
            debug!("rejecting curve: a = {}, b = {} outside (0, {})", a, b, p);
            return Err(EllipticCurveError::InvalidCurveParameters(format!(
                "a = {} and b = {} must lie in (0, {})",
                a, b, p
            )));
        }

        // 4 * a^3 + 27 * b^2 mod p
        let discriminant =
            (BigUint::from(4u32) * a.pow(3) + BigUint::from(27u32) * b.pow(2)) % &p;
        if discriminant.is_zero() {
            debug!("rejecting singular curve a = {}, b = {} mod {}", a, b, p);
            return Err(EllipticCurveError::InvalidCurveParameters(format!(
                "curve a = {}, b = {} is singular modulo {}",
                a, b, p
            )));
        }

        debug!("curve y^2 = x^3 + {}x + {} mod {}", a, b, p);
        Ok(EllipticCurve { a, b, p })
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    ///
    /// `x^3 + a * x + b mod p`
    ///
    fn compute_rhs(&self, x: &BigUint) -> BigUint {
        (x.pow(3) + &self.a * x + &self.b) % &self.p
    }

    ///
    /// The identity, or an affine point with reduced coordinates satisfying
    /// `y^2 = x^3 + a * x + b mod p`.
    ///
    pub fn is_valid(&self, c: &Point) -> bool {
        match c {
            Point::Identity => true,
            Point::Coor(x, y) => {
                if x >= &self.p || y >= &self.p {
                    return false;
                }
                y.pow(2) % &self.p == self.compute_rhs(x)
            }
        }
    }

    pub fn check_point(&self, c: &Point) -> Result<()> {
        if !self.is_valid(c) {
            debug!("point {:?} is not on the curve", c);
            return Err(EllipticCurveError::PointNotOnCurve(c.clone()));
        }
        Ok(())
    }

    ///
    /// Private scalars live in `[1, p)`.
    ///
    pub fn check_scalar(&self, k: &BigUint) -> Result<()> {
        if k.is_zero() || k >= &self.p {
            debug!("scalar {} outside [1, {})", k, self.p);
            return Err(EllipticCurveError::InvalidScalar(k.clone()));
        }
        Ok(())
    }

    ///
    /// Ephemeral and key-agreement scalars live in `[0, p)`. Zero is allowed
    /// and maps every point to the identity.
    ///
    pub fn check_range(&self, k: &BigUint) -> Result<()> {
        if k >= &self.p {
            debug!("scalar {} outside [0, {})", k, self.p);
            return Err(EllipticCurveError::InvalidScalar(k.clone()));
        }
        Ok(())
    }

    ///
    /// Both points with the given `x`, `(x, y)` and `(x, p - y)` with the
    /// smaller `y` first. Fails with `NoSquareRoot` when `x^3 + a * x + b` is
    /// not a square.
    ///
    pub fn points_at(&self, x: &BigUint) -> Result<(Point, Point)> {
        GaloisField::check_less_than(x, &self.p)?;

        let y2 = self.compute_rhs(x);
        let (y, neg_y) = GaloisField::modular_sqrt(&y2, &self.p)?;

        Ok((Point::Coor(x.clone(), y), Point::Coor(x.clone(), neg_y)))
    }

    ///
    /// `-(x, y) = (x, -y)`
    ///
    pub fn negate(&self, c: &Point) -> Result<Point> {
        self.check_point(c)?;
        self.negate_unchecked(c)
    }

    fn negate_unchecked(&self, c: &Point) -> Result<Point> {
        match c {
            Point::Identity => Ok(Point::Identity),
            Point::Coor(x, y) => {
                let neg_y = GaloisField::inv_add(y, &self.p)?;
                Ok(Point::Coor(x.clone(), neg_y))
            }
        }
    }

    ///
    /// Group law. For `C = (x1, y1)` and `D = (x2, y2)`, with `s` the slope of
    /// the chord through them (or of the tangent when `C = D`):
    ///
    /// `x3 = s^2 - x1 - x2 mod p`
    /// `y3 = s(x1 - x3) - y1 mod p`
    ///
    pub fn add(&self, c: &Point, d: &Point) -> Result<Point> {
        self.check_point(c)?;
        self.check_point(d)?;
        self.add_unchecked(c, d)
    }

    pub fn double(&self, c: &Point) -> Result<Point> {
        self.add(c, c)
    }

    fn add_unchecked(&self, c: &Point, d: &Point) -> Result<Point> {
        match (c, d) {
            (Point::Identity, _) => Ok(d.clone()),
            (_, Point::Identity) => Ok(c.clone()),
            (Point::Coor(x1, y1), Point::Coor(x2, y2)) => {
                // D = -C, which includes doubling a point with y = 0
                if x1 == x2 && (y1 != y2 || y1.is_zero()) {
                    return Ok(Point::Identity);
                }

                let s = if x1 == x2 {
                    // s = (3 * x1^2 + a) / (2 * y1)
                    let three = BigUint::from(3u32) % &self.p;
                    let two = BigUint::from(2u32);
                    let x1s = GaloisField::mult(x1, x1, &self.p)?;
                    let three_x1s = GaloisField::mult(&three, &x1s, &self.p)?;
                    let numerator = GaloisField::add(&three_x1s, &self.a, &self.p)?;
                    let denominator = GaloisField::mult(&two, y1, &self.p)?;
                    GaloisField::divide(&numerator, &denominator, &self.p)?
                } else {
                    // s = (y2 - y1) / (x2 - x1)
                    let numerator = GaloisField::subtract(y2, y1, &self.p)?;
                    let denominator = GaloisField::subtract(x2, x1, &self.p)?;
                    GaloisField::divide(&numerator, &denominator, &self.p)?
                };

                let s2 = GaloisField::mult(&s, &s, &self.p)?;
                let s2_x1 = GaloisField::subtract(&s2, x1, &self.p)?;
                let x3 = GaloisField::subtract(&s2_x1, x2, &self.p)?;
                let y3 = GaloisField::subtract(
                    &GaloisField::mult(&s, &GaloisField::subtract(x1, &x3, &self.p)?, &self.p)?,
                    y1,
                    &self.p,
                )?;

                Ok(Point::Coor(x3, y3))
            }
        }
    }

    ///
    /// `d * C = C + C + ... + C`, computed with double-and-add over the bits of
    /// `d` from the most significant one down:
    ///
    /// `T = 2T` for every bit, then `T = T + C` when the bit is set.
    ///
    pub fn scalar_mul(&self, c: &Point, d: &BigUint) -> Result<Point> {
        self.check_point(c)?;
        trace!("scalar_mul: {} * {:?}", d, c);

        let mut t = Point::Identity;
        for i in (0..d.bits()).rev() {
            t = self.add_unchecked(&t, &t)?;
            if d.bit(i) {
                t = self.add_unchecked(&t, c)?;
            }
        }

        Ok(t)
    }

    ///
    /// Every point of the curve, identity first, then by `x` with the smaller
    /// `y` first. Walks the whole field, so only sensible for small `p`.
    ///
    pub fn points(&self) -> Vec<Point> {
        let mut points = vec![Point::Identity];

        let mut x = BigUint::zero();
        while x < self.p {
            if let Ok((c, neg_c)) = self.points_at(&x) {
                let self_negated = c == neg_c;
                points.push(c);
                if !self_negated {
                    points.push(neg_c);
                }
            }
            x += 1u32;
        }

        points
    }

    ///
    /// Smallest `n > 0` with `n * C = O`, by repeated addition. Linear in the
    /// order, which is at most `p + 1 + 2 * sqrt(p)`.
    ///
    pub fn order(&self, c: &Point) -> Result<BigUint> {
        self.check_point(c)?;

        let mut n = BigUint::one();
        let mut t = c.clone();
        while t != Point::Identity {
            t = self.add_unchecked(&t, c)?;
            n += 1u32;
        }

        Ok(n)
    }
}
