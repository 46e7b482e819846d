use log::trace;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use thiserror::Error;

///
/// Arithmetic over the prime field `F_q = {0, 1, ..., q - 1}`.
///
/// Every element operation expects its operands already reduced modulo `q`
/// and returns a reduced result. The modulus is passed to each call; nothing is
/// stored here.
///
pub struct GaloisField {}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GaloisFieldError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0} has no inverse modulo {1}")]
    NotInvertible(BigUint, BigUint),
    #[error("{0} is not a quadratic residue modulo {1}")]
    NoSquareRoot(BigUint, BigUint),
}

pub type Result<T> = std::result::Result<T, GaloisFieldError>;

/// Bases for the Miller-Rabin test. Deterministic below 3.3 * 10^24.
const WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

impl GaloisField {
    ///
    /// Adds to elements in the set
    ///
    /// `(a + b) mod p`
    ///
    pub fn add(a: &BigUint, b: &BigUint, p: &BigUint) -> Result<BigUint> {
        GaloisField::check_less_than(a, p)?;
        GaloisField::check_less_than(b, p)?;

        Ok((a + b) % p)
    }

    ///
    /// Multiplies to elements in the set
    ///
    /// `(a * b) mod p`
    ///
    pub fn mult(a: &BigUint, b: &BigUint, p: &BigUint) -> Result<BigUint> {
        GaloisField::check_less_than(a, p)?;
        GaloisField::check_less_than(b, p)?;

        Ok((a * b) % p)
    }

    ///
    /// Finds the additive inverse of an element in the set:
    ///
    /// `a + (-a) = 0 mod p`
    ///
    pub fn inv_add(a: &BigUint, p: &BigUint) -> Result<BigUint> {
        GaloisField::check_less_than(a, p)?;

        if a.is_zero() {
            return Ok(a.clone());
        }

        Ok(p - a)
    }

    ///
    /// Subtract two elements in the set:
    ///
    /// `a - b = a + (-b) mod p`
    ///
    pub fn subtract(a: &BigUint, b: &BigUint, p: &BigUint) -> Result<BigUint> {
        GaloisField::check_less_than(a, p)?;
        GaloisField::check_less_than(b, p)?;

        let b_inv = GaloisField::inv_add(b, p)?;

        GaloisField::add(a, &b_inv, p)
    }

    ///
    /// Finds the multiplicative inverse of `n` with the extended Euclidean
    /// algorithm. From `n * x + q * y = gcd(n, q) = 1` follows
    ///
    /// `n * x = 1 mod q`
    ///
    /// `n` does not have to be reduced. Fails with `NotInvertible` when
    /// `gcd(n, q) != 1`, which for a prime `q` only happens for `n = 0 mod q`.
    ///
    pub fn modular_inverse(n: &BigUint, q: &BigUint) -> Result<BigUint> {
        GaloisField::check_modulus(q)?;

        let modulus = BigInt::from(q.clone());
        let egcd = BigInt::from(n % q).extended_gcd(&modulus);

        if !egcd.gcd.is_one() {
            return Err(GaloisFieldError::NotInvertible(n.clone(), q.clone()));
        }

        // mod_floor leaves x in [0, q), so the sign can be dropped
        let (_, x) = egcd.x.mod_floor(&modulus).into_parts();
        Ok(x)
    }

    ///
    /// Divides two elements in the set:
    ///
    /// `a / b = a * b^(-1) mod p`
    ///
    pub fn divide(a: &BigUint, b: &BigUint, p: &BigUint) -> Result<BigUint> {
        GaloisField::check_less_than(a, p)?;
        GaloisField::check_less_than(b, p)?;

        let d_inv = GaloisField::modular_inverse(b, p)?;

        GaloisField::mult(a, &d_inv, p)
    }

    ///
    /// `a^e mod p`
    ///
    pub fn pow(a: &BigUint, e: &BigUint, p: &BigUint) -> Result<BigUint> {
        GaloisField::check_modulus(p)?;
        GaloisField::check_less_than(a, p)?;

        Ok(a.modpow(e, p))
    }

    ///
    /// Legendre symbol of `a` modulo an odd prime `p` by Euler's criterion:
    ///
    /// `a^((p - 1) / 2) mod p`
    ///
    /// Returns `0` for `a = 0`, `1` for a quadratic residue and `-1` otherwise.
    ///
    pub fn legendre(a: &BigUint, p: &BigUint) -> Result<i8> {
        GaloisField::check_modulus(p)?;
        GaloisField::check_less_than(a, p)?;

        if a.is_zero() {
            return Ok(0);
        }

        let euler = GaloisField::pow(a, &((p - 1u32) >> 1u32), p)?;
        if euler.is_one() {
            Ok(1)
        } else {
            Ok(-1)
        }
    }

    ///
    /// Both square roots of `n` modulo the prime `q`, smaller one first:
    ///
    /// `r^2 = (q - r)^2 = n mod q`
    ///
    /// Uses Tonelli-Shanks. Writing `q - 1 = s * 2^e` with `s` odd, the
    /// candidate `r = n^((s + 1) / 2)` is corrected step by step until
    /// `t = n^s` collapses to `1`. The loops are bounded by `q` and `e`, so a
    /// non-residue (or a composite `q`) ends in `NoSquareRoot`.
    ///
    pub fn modular_sqrt(n: &BigUint, q: &BigUint) -> Result<(BigUint, BigUint)> {
        GaloisField::check_modulus(q)?;
        GaloisField::check_less_than(n, q)?;

        if n.is_zero() {
            return Ok((BigUint::zero(), BigUint::zero()));
        }
        if *q == BigUint::from(2u32) {
            return Ok((n.clone(), n.clone()));
        }
        if GaloisField::legendre(n, q)? != 1 {
            trace!("{} is a non-residue modulo {}", n, q);
            return Err(GaloisFieldError::NoSquareRoot(n.clone(), q.clone()));
        }

        let q_minus_one = q - 1u32;
        let e = q_minus_one.trailing_zeros().unwrap_or(0);
        let s = &q_minus_one >> e;

        let mut z = BigUint::from(2u32);
        while GaloisField::legendre(&z, q)? != -1 {
            z += 1u32;
            if &z >= q {
                return Err(GaloisFieldError::NoSquareRoot(n.clone(), q.clone()));
            }
        }

        let mut m = e;
        let mut c = GaloisField::pow(&z, &s, q)?;
        let mut t = GaloisField::pow(n, &s, q)?;
        let mut r = GaloisField::pow(n, &((&s + 1u32) >> 1u32), q)?;

        while !t.is_one() {
            // least i with t^(2^i) = 1
            let mut i = 0u64;
            let mut t_pow = t.clone();
            while !t_pow.is_one() {
                t_pow = &t_pow * &t_pow % q;
                i += 1;
                if i >= m {
                    return Err(GaloisFieldError::NoSquareRoot(n.clone(), q.clone()));
                }
            }

            let b = GaloisField::pow(&c, &(BigUint::one() << (m - i - 1)), q)?;
            m = i;
            c = &b * &b % q;
            t = t * &c % q;
            r = r * &b % q;
        }

        if &r * &r % q != *n {
            return Err(GaloisFieldError::NoSquareRoot(n.clone(), q.clone()));
        }

        let other = q - &r;
        if r <= other {
            Ok((r, other))
        } else {
            Ok((other, r))
        }
    }

    ///
    /// Miller-Rabin over the fixed `WITNESSES`. Exact for every modulus a toy
    /// curve uses, probabilistic beyond `3.3 * 10^24`.
    ///
    pub fn is_probable_prime(n: &BigUint) -> bool {
        if *n < BigUint::from(2u32) {
            return false;
        }

        for w in WITNESSES {
            let w = BigUint::from(w);
            if *n == w {
                return true;
            }
            if (n % &w).is_zero() {
                return false;
            }
        }

        let n_minus_one = n - 1u32;
        let r = n_minus_one.trailing_zeros().unwrap_or(0);
        let d = &n_minus_one >> r;

        'witness: for w in WITNESSES {
            let mut x = BigUint::from(w).modpow(&d, n);
            if x.is_one() || x == n_minus_one {
                continue;
            }
            for _ in 1..r {
                x = &x * &x % n;
                if x == n_minus_one {
                    continue 'witness;
                }
            }
            return false;
        }

        true
    }

    pub fn check_less_than(a: &BigUint, b: &BigUint) -> Result<()> {
        if a >= b {
            return Err(GaloisFieldError::InvalidArgument(format!("{} >= {}", a, b)));
        }
        Ok(())
    }

    fn check_modulus(p: &BigUint) -> Result<()> {
        if *p < BigUint::from(2u32) {
            return Err(GaloisFieldError::InvalidArgument(format!(
                "modulus {} < 2",
                p
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Linear scan over the field, the reference for small moduli.
    fn sqrt_by_scan(n: u32, q: u32) -> Option<(u32, u32)> {
        (0..q)
            .find(|i| i * i % q == n)
            .map(|i| (i, (q - i) % q))
    }

    #[test]
    fn test_add() {
        let a = BigUint::from(4u32);
        let b = BigUint::from(10u32);
        let p = BigUint::from(11u32);

        let res = GaloisField::add(&a, &b, &p).unwrap();
        assert_eq!(res, BigUint::from(3u32));

        let a = BigUint::from(10u32);
        let b = BigUint::from(1u32);

        let res = GaloisField::add(&a, &b, &p).unwrap();
        assert_eq!(res, BigUint::from(0u32));

        let a = BigUint::from(4u32);
        let b = BigUint::from(10u32);
        let p = BigUint::from(31u32);

        let res = GaloisField::add(&a, &b, &p).unwrap();
        assert_eq!(res, BigUint::from(14u32));
    }

    #[test]
    fn test_multiply() {
        let a = BigUint::from(4u32);
        let b = BigUint::from(10u32);
        let p = BigUint::from(11u32);

        let res = GaloisField::mult(&a, &b, &p).unwrap();
        assert_eq!(res, BigUint::from(7u32));

        let p = BigUint::from(51u32);

        let res = GaloisField::mult(&a, &b, &p).unwrap();
        assert_eq!(res, BigUint::from(40u32));
    }

    #[test]
    fn test_inv_add() {
        let a = BigUint::from(4u32);
        let p = BigUint::from(51u32);

        let res = GaloisField::inv_add(&a, &p).unwrap();
        assert_eq!(res, BigUint::from(47u32));

        let a = BigUint::from(0u32);

        let res = GaloisField::inv_add(&a, &p).unwrap();
        assert_eq!(res, BigUint::from(0u32));

        let a = BigUint::from(52u32);

        assert_eq!(
            GaloisField::inv_add(&a, &p),
            Err(GaloisFieldError::InvalidArgument(format!("{} >= {}", a, p)))
        );

        let a = BigUint::from(4u32);
        let a_inv = GaloisField::inv_add(&a, &p).unwrap();

        assert_eq!(GaloisField::add(&a, &a_inv, &p), Ok(BigUint::from(0u32)));
    }

    #[test]
    fn test_subtract() {
        // a - a = 0 mod p
        let a = BigUint::from(4u32);
        let p = BigUint::from(51u32);

        assert_eq!(GaloisField::subtract(&a, &a, &p), Ok(BigUint::from(0u32)));

        // 3 - 7 = -4 = 15 mod 19
        let p = BigUint::from(19u32);
        assert_eq!(
            GaloisField::subtract(&BigUint::from(3u32), &BigUint::from(7u32), &p),
            Ok(BigUint::from(15u32))
        );
    }

    #[test]
    fn test_modular_inverse() {
        // 4 * 3 mod 11 = 12 mod 11 = 1
        let a = BigUint::from(4u32);
        let p = BigUint::from(11u32);

        let a_inv = GaloisField::modular_inverse(&a, &p);

        assert_eq!(a_inv, Ok(BigUint::from(3u32)));
        assert_eq!(
            GaloisField::mult(&a, &a_inv.unwrap(), &p),
            Ok(BigUint::from(1u32))
        );

        // unreduced input: 15 = 4 mod 11
        assert_eq!(
            GaloisField::modular_inverse(&BigUint::from(15u32), &p),
            Ok(BigUint::from(3u32))
        );

        let p = BigUint::from(19u32);
        for n in 1..19u32 {
            let n = BigUint::from(n);
            let n_inv = GaloisField::modular_inverse(&n, &p).unwrap();
            assert!(n_inv < p);
            assert_eq!(n * n_inv % &p, BigUint::from(1u32));
        }
    }

    #[test]
    fn test_modular_inverse_not_invertible() {
        let p = BigUint::from(19u32);
        let zero = BigUint::from(0u32);
        assert_eq!(
            GaloisField::modular_inverse(&zero, &p),
            Err(GaloisFieldError::NotInvertible(zero, p))
        );

        // gcd(6, 51) = 3
        let a = BigUint::from(6u32);
        let p = BigUint::from(51u32);
        assert_eq!(
            GaloisField::modular_inverse(&a, &p),
            Err(GaloisFieldError::NotInvertible(a, p))
        );
    }

    #[test]
    fn test_modular_inverse_large_prime() {
        // 2^127 - 1
        let p = (BigUint::from(1u32) << 127u32) - 1u32;
        let a = BigUint::parse_bytes(b"1234567890123456789012345678901234567", 10).unwrap();

        let a_inv = GaloisField::modular_inverse(&a, &p).unwrap();
        assert_eq!(&a * &a_inv % &p, BigUint::from(1u32));
    }

    #[test]
    fn test_divide() {
        // a / a = 1 mod p
        let a = BigUint::from(4u32);
        let p = BigUint::from(11u32);

        assert_eq!(GaloisField::divide(&a, &a, &p), Ok(BigUint::from(1u32)));

        let zero = BigUint::from(0u32);
        assert_eq!(
            GaloisField::divide(&a, &zero, &p),
            Err(GaloisFieldError::NotInvertible(zero, p))
        );
    }

    #[test]
    fn test_pow() {
        // 3^4 = 81 = 4 mod 11, and Fermat: a^(p - 1) = 1
        let p = BigUint::from(11u32);
        assert_eq!(
            GaloisField::pow(&BigUint::from(3u32), &BigUint::from(4u32), &p),
            Ok(BigUint::from(4u32))
        );
        assert_eq!(
            GaloisField::pow(&BigUint::from(7u32), &BigUint::from(10u32), &p),
            Ok(BigUint::from(1u32))
        );
        assert!(matches!(
            GaloisField::pow(&BigUint::from(3u32), &BigUint::from(4u32), &BigUint::from(1u32)),
            Err(GaloisFieldError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_legendre() {
        let p = BigUint::from(19u32);
        let residues = [1u32, 4, 5, 6, 7, 9, 11, 16, 17];

        assert_eq!(GaloisField::legendre(&BigUint::from(0u32), &p), Ok(0));
        for n in 1..19u32 {
            let expected = if residues.contains(&n) { 1 } else { -1 };
            assert_eq!(GaloisField::legendre(&BigUint::from(n), &p), Ok(expected));
        }
    }

    #[test]
    fn test_modular_sqrt_matches_scan() {
        // 19 = 3 mod 4, 17 = 1 mod 16, 97 = 1 mod 32 and 73 = 1 mod 8
        for q in [3u32, 5, 7, 13, 17, 19, 41, 73, 97] {
            let p = BigUint::from(q);
            for n in 0..q {
                let res = GaloisField::modular_sqrt(&BigUint::from(n), &p);
                match sqrt_by_scan(n, q) {
                    Some((r, mr)) => {
                        let roots = (BigUint::from(r), BigUint::from(mr));
                        assert_eq!(res, Ok(roots), "{} mod {}", n, q)
                    }
                    None => assert_eq!(
                        res,
                        Err(GaloisFieldError::NoSquareRoot(BigUint::from(n), p.clone())),
                        "{} mod {}",
                        n,
                        q
                    ),
                }
            }
        }
    }

    #[test]
    fn test_modular_sqrt_out_of_range() {
        let n = BigUint::from(19u32);
        let p = BigUint::from(19u32);

        assert_eq!(
            GaloisField::modular_sqrt(&n, &p),
            Err(GaloisFieldError::InvalidArgument(format!("{} >= {}", n, p)))
        );
    }

    #[test]
    fn test_modular_sqrt_large_prime() {
        // 2^224 - 2^96 + 1, so q - 1 carries 2^96 and Tonelli-Shanks runs its full loop
        let p = (BigUint::from(1u32) << 224u32) - (BigUint::from(1u32) << 96u32) + 1u32;
        let x = BigUint::parse_bytes(b"deadbeefcafebabe0123456789abcdef", 16).unwrap();
        let n = &x * &x % &p;

        let (r, mr) = GaloisField::modular_sqrt(&n, &p).unwrap();
        assert!(r <= mr);
        assert_eq!(&r + &mr, p);
        assert_eq!(&r * &r % &p, n);
        assert!(r == x || mr == x);

        let non_residue = (2u32..)
            .map(BigUint::from)
            .find(|a| GaloisField::legendre(a, &p) == Ok(-1))
            .unwrap();
        assert_eq!(
            GaloisField::modular_sqrt(&non_residue, &p),
            Err(GaloisFieldError::NoSquareRoot(non_residue.clone(), p))
        );
    }

    #[test]
    fn test_modular_sqrt_composite_terminates() {
        // 15 is not prime, every answer must still come back
        let p = BigUint::from(15u32);
        for n in 0..15u32 {
            let n = BigUint::from(n);
            if let Ok((r, _)) = GaloisField::modular_sqrt(&n, &p) {
                assert_eq!(&r * &r % &p, n);
            }
        }
    }

    #[test]
    fn test_is_probable_prime() {
        let primes = [2u32, 3, 5, 19, 37, 41, 97, 7919, 104729];
        let composites = [0u32, 1, 4, 15, 51, 561, 1105, 7917];

        for p in primes {
            assert!(GaloisField::is_probable_prime(&BigUint::from(p)), "{}", p);
        }
        for c in composites {
            assert!(!GaloisField::is_probable_prime(&BigUint::from(c)), "{}", c);
        }

        let mersenne = (BigUint::from(1u32) << 127u32) - 1u32;
        assert!(GaloisField::is_probable_prime(&mersenne));
        assert!(!GaloisField::is_probable_prime(&(mersenne + 2u32)));
    }
}
