//! ElGamal encryption over the curve group.
//!
//! The multiplicative-group scheme with modular multiplication replaced by
//! point addition and exponentiation replaced by scalar multiplication. Messages
//! are curve points; mapping data onto points is left to the caller.

use crate::elliptic_curve::{EllipticCurve, EllipticCurveError, Point, Result};
use crate::encoding;
use log::debug;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;

/// `(base, base * private)`. The base point is shared, not secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub base: Point,
    pub key: Point,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private: BigUint,
    pub public: PublicKey,
}

/// `(r * base, plain + r * key)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    pub c1: Point,
    pub c2: Point,
}

pub struct ElGamal<'a> {
    curve: &'a EllipticCurve,
}

impl<'a> ElGamal<'a> {
    pub fn new(curve: &'a EllipticCurve) -> Self {
        ElGamal { curve }
    }

    pub fn curve(&self) -> &EllipticCurve {
        self.curve
    }

    ///
    /// Public key for `private` on the given base point:
    ///
    /// `(base, private * base)`
    ///
    pub fn generate(&self, private: &BigUint, base: &Point) -> Result<PublicKey> {
        self.curve.check_point(base)?;
        self.curve.check_scalar(private)?;

        let key = self.curve.scalar_mul(base, private)?;
        Ok(PublicKey {
            base: base.clone(),
            key,
        })
    }

    /// Draws the private scalar uniformly from `[1, p)`.
    pub fn generate_keypair<R: Rng + ?Sized>(&self, rng: &mut R, base: &Point) -> Result<KeyPair> {
        let private = rng.gen_biguint_range(&BigUint::one(), self.curve.p());
        let public = self.generate(&private, base)?;
        debug!("generated ElGamal key pair on base {:?}", base);

        Ok(KeyPair { private, public })
    }

    ///
    /// `(r * base, plain + r * key)`
    ///
    /// `r` must be fresh for every message: two ciphertexts sharing `r` reveal
    /// the difference of their plaintexts. Any `r` in `[0, p)` decrypts
    /// correctly, though `r = 0` leaves `plain` in the clear.
    ///
    pub fn encrypt(&self, plain: &Point, public: &PublicKey, r: &BigUint) -> Result<Ciphertext> {
        self.curve.check_point(plain)?;
        self.curve.check_point(&public.base)?;
        self.curve.check_point(&public.key)?;
        self.curve.check_range(r)?;

        let c1 = self.curve.scalar_mul(&public.base, r)?;
        let mask = self.curve.scalar_mul(&public.key, r)?;
        let c2 = self.curve.add(plain, &mask)?;

        Ok(Ciphertext { c1, c2 })
    }

    pub fn encrypt_with_rng<R: Rng + ?Sized>(
        &self,
        plain: &Point,
        public: &PublicKey,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let r = rng.gen_biguint_range(&BigUint::one(), self.curve.p());
        self.encrypt(plain, public, &r)
    }

    ///
    /// `c2 - private * c1`
    ///
    /// Since `private * c1 = private * r * base = r * key`, this strips the mask
    /// added by `encrypt`.
    ///
    pub fn decrypt(&self, cipher: &Ciphertext, private: &BigUint) -> Result<Point> {
        self.curve.check_point(&cipher.c1)?;
        self.curve.check_point(&cipher.c2)?;
        self.curve.check_scalar(private)?;

        let mask = self.curve.scalar_mul(&cipher.c1, private)?;
        self.curve.add(&cipher.c2, &self.curve.negate(&mask)?)
    }
}

impl PublicKey {
    /// `base || key`
    pub fn to_bytes(&self, curve: &EllipticCurve) -> Result<Vec<u8>> {
        encoding::encode_points(curve, &[&self.base, &self.key])
    }

    pub fn from_bytes(curve: &EllipticCurve, bytes: &[u8]) -> Result<Self> {
        match encoding::decode_points(curve, bytes, 2)?.as_slice() {
            [base, key] => Ok(PublicKey {
                base: base.clone(),
                key: key.clone(),
            }),
            points => Err(EllipticCurveError::Encoding(format!(
                "public key holds 2 points, got {}",
                points.len()
            ))),
        }
    }
}

impl Ciphertext {
    /// `c1 || c2`
    pub fn to_bytes(&self, curve: &EllipticCurve) -> Result<Vec<u8>> {
        encoding::encode_points(curve, &[&self.c1, &self.c2])
    }

    pub fn from_bytes(curve: &EllipticCurve, bytes: &[u8]) -> Result<Self> {
        match encoding::decode_points(curve, bytes, 2)?.as_slice() {
            [c1, c2] => Ok(Ciphertext {
                c1: c1.clone(),
                c2: c2.clone(),
            }),
            points => Err(EllipticCurveError::Encoding(format!(
                "ciphertext holds 2 points, got {}",
                points.len()
            ))),
        }
    }
}
