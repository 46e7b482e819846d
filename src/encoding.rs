//! Canonical byte encoding of field elements and points.
//!
//! A field element is a big-endian unsigned integer padded to the byte width of
//! `p`. A point is a tag byte followed by two field elements: `0x01` for an
//! affine point, `0x00` for the identity, whose coordinates are all zero. Every
//! encoded point of a curve therefore has the same length, and sequences of
//! points (ciphertexts, public keys) are plain concatenations.

use crate::elliptic_curve::{EllipticCurve, EllipticCurveError, Point, Result};
use num_bigint::BigUint;

pub const TAG_IDENTITY: u8 = 0x00;
pub const TAG_AFFINE: u8 = 0x01;

/// Bytes needed for one field element of `curve`.
pub fn field_width(curve: &EllipticCurve) -> usize {
    ((curve.p().bits() + 7) / 8) as usize
}

/// Bytes of one encoded point of `curve`.
pub fn point_width(curve: &EllipticCurve) -> usize {
    1 + 2 * field_width(curve)
}

pub fn encode_field_element(curve: &EllipticCurve, n: &BigUint) -> Result<Vec<u8>> {
    if n >= curve.p() {
        return Err(EllipticCurveError::Encoding(format!(
            "{} is not a field element modulo {}",
            n,
            curve.p()
        )));
    }

    let width = field_width(curve);
    let digits = n.to_bytes_be();
    let mut bytes = vec![0u8; width - digits.len()];
    bytes.extend_from_slice(&digits);
    Ok(bytes)
}

pub fn decode_field_element(curve: &EllipticCurve, bytes: &[u8]) -> Result<BigUint> {
    let width = field_width(curve);
    if bytes.len() != width {
        return Err(EllipticCurveError::Encoding(format!(
            "field element takes {} bytes, got {}",
            width,
            bytes.len()
        )));
    }

    let n = BigUint::from_bytes_be(bytes);
    if &n >= curve.p() {
        return Err(EllipticCurveError::Encoding(format!(
            "{} is not a field element modulo {}",
            n,
            curve.p()
        )));
    }
    Ok(n)
}

/// Encodes a point after checking it lies on `curve`.
pub fn encode_point(curve: &EllipticCurve, c: &Point) -> Result<Vec<u8>> {
    curve.check_point(c)?;

    match c {
        Point::Identity => Ok(vec![TAG_IDENTITY; point_width(curve)]),
        Point::Coor(x, y) => {
            let mut bytes = Vec::with_capacity(point_width(curve));
            bytes.push(TAG_AFFINE);
            bytes.extend(encode_field_element(curve, x)?);
            bytes.extend(encode_field_element(curve, y)?);
            Ok(bytes)
        }
    }
}

/// Decodes one point, rejecting anything that is not on `curve`.
pub fn decode_point(curve: &EllipticCurve, bytes: &[u8]) -> Result<Point> {
    let width = field_width(curve);
    if bytes.len() != point_width(curve) {
        return Err(EllipticCurveError::Encoding(format!(
            "point takes {} bytes, got {}",
            point_width(curve),
            bytes.len()
        )));
    }

    let (tag, coordinates) = (bytes[0], &bytes[1..]);
    match tag {
        TAG_IDENTITY => {
            if coordinates.iter().any(|b| *b != 0) {
                return Err(EllipticCurveError::Encoding(
                    "identity carries non-zero coordinates".to_string(),
                ));
            }
            Ok(Point::Identity)
        }
        TAG_AFFINE => {
            let x = decode_field_element(curve, &coordinates[..width])?;
            let y = decode_field_element(curve, &coordinates[width..])?;
            let c = Point::Coor(x, y);
            curve.check_point(&c)?;
            Ok(c)
        }
        _ => Err(EllipticCurveError::Encoding(format!("unknown point tag {:#04x}", tag))),
    }
}

/// Concatenated encoding of several points, in order.
pub fn encode_points(curve: &EllipticCurve, points: &[&Point]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(points.len() * point_width(curve));
    for c in points {
        bytes.extend(encode_point(curve, c)?);
    }
    Ok(bytes)
}

/// Splits `bytes` into exactly `count` encoded points.
pub fn decode_points(curve: &EllipticCurve, bytes: &[u8], count: usize) -> Result<Vec<Point>> {
    let width = point_width(curve);
    if bytes.len() != count * width {
        return Err(EllipticCurveError::Encoding(format!(
            "{} points take {} bytes, got {}",
            count,
            count * width,
            bytes.len()
        )));
    }

    bytes.chunks(width).map(|chunk| decode_point(curve, chunk)).collect()
}

pub fn point_to_hex(curve: &EllipticCurve, c: &Point) -> Result<String> {
    Ok(hex::encode(encode_point(curve, c)?))
}

pub fn point_from_hex(curve: &EllipticCurve, s: &str) -> Result<Point> {
    let bytes = hex::decode(s).map_err(|e| EllipticCurveError::Encoding(e.to_string()))?;
    decode_point(curve, &bytes)
}
