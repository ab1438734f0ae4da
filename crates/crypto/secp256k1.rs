//! The secp256k1 curve: y² = x³ + 7 over F_p with
//! p = 2²⁵⁶ − 2³² − 977, and its generator of order n.
//!
//! [`S256Point`] is a thin specialization of [`Point`] that fixes the curve
//! parameters, reduces scalars modulo the group order, and carries the SEC
//! serialization and address derivation.

use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::{Num, Zero};

use super::{
    base58,
    ecdsa::Signature,
    error::CryptoError,
    field::FieldElement,
    hash::hash160,
    point::Point,
};

lazy_static! {
    /// The field prime p = 2²⁵⁶ − 2³² − 977.
    pub static ref P: BigUint = BigUint::from_str_radix(
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
        16
    )
    .expect("valid hex constant");

    /// The order n of the group generated by G.
    pub static ref N: BigUint = BigUint::from_str_radix(
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
        16
    )
    .expect("valid hex constant");

    static ref GX: BigUint = BigUint::from_str_radix(
        "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        16
    )
    .expect("valid hex constant");

    static ref GY: BigUint = BigUint::from_str_radix(
        "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
        16
    )
    .expect("valid hex constant");

    /// The generator point G.
    pub static ref G: S256Point =
        S256Point::new(GX.clone(), GY.clone()).expect("generator is on the curve");
}

/// Constructs an element of the secp256k1 field.
pub fn field(num: BigUint) -> Result<FieldElement, CryptoError> {
    FieldElement::new(num, P.clone())
}

fn curve_a() -> FieldElement {
    FieldElement::zero(P.clone())
}

fn curve_b() -> FieldElement {
    FieldElement::new(BigUint::from(7u8), P.clone()).expect("7 < p")
}

/// Serializes a scalar as 32 big-endian bytes.
pub fn to_bytes_32(num: &BigUint) -> [u8; 32] {
    let bytes = num.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// A point on secp256k1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S256Point(Point);

impl S256Point {
    pub fn new(x: BigUint, y: BigUint) -> Result<Self, CryptoError> {
        let point = Point::new(field(x)?, field(y)?, curve_a(), curve_b())?;
        Ok(Self(point))
    }

    pub fn infinity() -> Self {
        Self(Point::infinity(curve_a(), curve_b()))
    }

    pub fn is_infinity(&self) -> bool {
        self.0.is_infinity()
    }

    pub fn inner(&self) -> &Point {
        &self.0
    }

    pub fn add(&self, other: &Self) -> Self {
        // Both operands are secp256k1 points, so the curve check can't fail.
        Self(self.0.add(&other.0).expect("operands share the curve"))
    }

    /// Scalar multiplication; the coefficient is reduced modulo the group
    /// order n before the double-and-add walk.
    pub fn mul(&self, coefficient: &BigUint) -> Self {
        let coef = coefficient % &*N;
        Self(self.0.scalar_mul(&coef).expect("operands share the curve"))
    }

    /// ECDSA verification: with u = z/s and v = r/s, the signature is valid
    /// iff uG + vP has x-coordinate r (and is not the identity).
    pub fn verify(&self, z: &BigUint, sig: &Signature) -> bool {
        let n = &*N;
        if sig.r.is_zero() || sig.r >= *n || sig.s.is_zero() || sig.s >= *n {
            return false;
        }
        let s_inv = sig.s.modpow(&(n - 2u8), n);
        let u = z * &s_inv % n;
        let v = &sig.r * &s_inv % n;
        let total = G.mul(&u).add(&self.mul(&v));
        match total.0.x() {
            Some(x) => x.num() % n == sig.r,
            None => false,
        }
    }

    /// SEC serialization: `0x04 || x || y` uncompressed, or `0x02/0x03 || x`
    /// compressed with the prefix encoding y's parity.
    ///
    /// Serializing the identity is a programmer error; it has no SEC form.
    pub fn sec(&self, compressed: bool) -> Vec<u8> {
        let x = self.0.x().expect("the identity has no SEC form");
        let y = self.0.y().expect("the identity has no SEC form");
        if compressed {
            let mut out = Vec::with_capacity(33);
            out.push(if y.is_even() { 0x02 } else { 0x03 });
            out.extend_from_slice(&to_bytes_32(x.num()));
            out
        } else {
            let mut out = Vec::with_capacity(65);
            out.push(0x04);
            out.extend_from_slice(&to_bytes_32(x.num()));
            out.extend_from_slice(&to_bytes_32(y.num()));
            out
        }
    }

    /// Parses a SEC-encoded public key, solving the curve equation for y in
    /// the compressed forms.
    pub fn parse(sec: &[u8]) -> Result<Self, CryptoError> {
        match sec.first() {
            Some(0x04) => {
                if sec.len() != 65 {
                    return Err(CryptoError::MalformedSec(
                        "uncompressed form must be 65 bytes",
                    ));
                }
                let x = BigUint::from_bytes_be(&sec[1..33]);
                let y = BigUint::from_bytes_be(&sec[33..65]);
                Self::new(x, y)
            }
            Some(prefix @ (0x02 | 0x03)) => {
                if sec.len() != 33 {
                    return Err(CryptoError::MalformedSec(
                        "compressed form must be 33 bytes",
                    ));
                }
                let x = field(BigUint::from_bytes_be(&sec[1..33]))?;
                // y² = x³ + 7
                let alpha = x.mul(&x)?.mul(&x)?.add(&curve_b())?;
                let roots = alpha.sqrt()?;
                let y = if *prefix == 0x02 { roots.even } else { roots.odd };
                // Point::new re-checks the curve equation, rejecting x
                // values with no square root.
                let point = Point::new(x, y, curve_a(), curve_b())?;
                Ok(Self(point))
            }
            _ => Err(CryptoError::MalformedSec("unknown prefix byte")),
        }
    }

    pub fn hash160(&self, compressed: bool) -> [u8; 20] {
        hash160(&self.sec(compressed))
    }

    /// The Base58Check P2PKH address: version byte (0x00 mainnet, 0x6f
    /// testnet) followed by hash160 of the SEC form.
    pub fn address(&self, compressed: bool, testnet: bool) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(if testnet { 0x6f } else { 0x00 });
        payload.extend_from_slice(&self.hash160(compressed));
        base58::encode_check(&payload)
    }
}
