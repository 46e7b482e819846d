use crate::elliptic_curve::{EllipticCurve, Point, Result};
use crate::encoding;
use log::debug;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhKeyPair {
    pub private: BigUint,
    pub public: Point,
}

///
/// Diffie-Hellman key agreement on an agreed base point `G`. Each party
/// publishes `k * G` for its private `k`; both arrive at `a * b * G`.
///
pub struct KeyAgreement<'a> {
    curve: &'a EllipticCurve,
    g: Point,
}

impl<'a> KeyAgreement<'a> {
    pub fn new(curve: &'a EllipticCurve, g: Point) -> Result<Self> {
        curve.check_point(&g)?;
        Ok(KeyAgreement { curve, g })
    }

    pub fn curve(&self) -> &EllipticCurve {
        self.curve
    }

    pub fn base(&self) -> &Point {
        &self.g
    }

    ///
    /// `private * G`
    ///
    pub fn generate(&self, private: &BigUint) -> Result<Point> {
        self.curve.check_range(private)?;
        self.curve.scalar_mul(&self.g, private)
    }

    pub fn generate_keypair<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DhKeyPair> {
        let private = rng.gen_biguint_range(&BigUint::one(), self.curve.p());
        let public = self.generate(&private)?;
        debug!("generated key agreement pair, public {:?}", public);

        Ok(DhKeyPair { private, public })
    }

    ///
    /// `private * other`, the same point the other party gets from its own
    /// private scalar and our public point.
    ///
    pub fn shared_secret(&self, private: &BigUint, other: &Point) -> Result<Point> {
        self.curve.check_point(other)?;
        self.curve.check_range(private)?;
        self.curve.scalar_mul(other, private)
    }

    ///
    /// SHA-256 over the canonical encoding of the shared point, as lowercase
    /// hex. Both parties derive the same string.
    ///
    pub fn derive_key(&self, private: &BigUint, other: &Point) -> Result<String> {
        let secret = self.shared_secret(private, other)?;
        let bytes = encoding::encode_point(self.curve, &secret)?;
        Ok(sha256::digest(bytes))
    }
}
