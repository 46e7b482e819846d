pub mod elgamal;
pub mod elliptic_curve;
pub mod encoding;
pub mod galois_field;
pub mod key_agreement;

pub use elgamal::{Ciphertext, ElGamal, KeyPair, PublicKey};
pub use elliptic_curve::{CurveParameters, EllipticCurve, EllipticCurveError, Point};
pub use galois_field::{GaloisField, GaloisFieldError};
pub use key_agreement::{DhKeyPair, KeyAgreement};
