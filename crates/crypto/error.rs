use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CryptoError {
    #[error("Value {num} not in field range 0..{prime}")]
    OutOfFieldRange { num: BigUint, prime: BigUint },
    #[error("Cannot operate on elements of different fields")]
    FieldMismatch,
    #[error("Cannot operate on points of different curves")]
    CurveMismatch,
    #[error("Point ({x}, {y}) is not on the curve")]
    PointNotOnCurve { x: BigUint, y: BigUint },
    #[error("Point must have both coordinates or neither")]
    HalfCoordinatePoint,
    #[error("Division by zero in field arithmetic")]
    DivisionByZero,
    #[error("Square roots require a field prime p ≡ 3 (mod 4)")]
    NoSqrtMethod,
    #[error("Secret must satisfy 1 <= e < n")]
    InvalidSecret,
    #[error("Malformed SEC public key: {0}")]
    MalformedSec(&'static str),
    #[error("Malformed DER signature: {0}")]
    MalformedDer(&'static str),
    #[error("Invalid base58 character {0:?}")]
    BadBase58(char),
    #[error("Base58Check checksum mismatch")]
    BadChecksum,
}
