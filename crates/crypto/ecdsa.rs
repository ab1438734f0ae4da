//! ECDSA signatures and private keys.
//!
//! Signing is deterministic per RFC 6979: the nonce k is derived from the
//! secret and the message hash with HMAC-SHA-256, so no system randomness is
//! ever consumed. Signatures serialize to DER, private keys to WIF.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::{
    base58,
    error::CryptoError,
    hash::hmac_sha256,
    secp256k1::{G, N, S256Point, to_bytes_32},
};

/// An ECDSA signature (r, s). s is kept exactly as produced; high-s values
/// are neither generated away nor rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub r: BigUint,
    pub s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    /// DER serialization: `0x30 len 0x02 rlen r 0x02 slen s`, each integer
    /// big-endian with leading zeros stripped and a 0x00 prefix when the top
    /// bit is set.
    pub fn der(&self) -> Vec<u8> {
        let r = der_integer(&self.r);
        let s = der_integer(&self.s);
        let mut out = Vec::with_capacity(2 + r.len() + s.len());
        out.push(0x30);
        out.push((r.len() + s.len()) as u8);
        out.extend(r);
        out.extend(s);
        out
    }

    /// Parses a DER signature, enforcing the framing strictly.
    pub fn parse_der(der: &[u8]) -> Result<Self, CryptoError> {
        let rest = der
            .strip_prefix(&[0x30])
            .ok_or(CryptoError::MalformedDer("missing compound marker"))?;
        let (&declared, rest) = rest
            .split_first()
            .ok_or(CryptoError::MalformedDer("missing length"))?;
        if declared as usize != rest.len() {
            return Err(CryptoError::MalformedDer("declared length mismatch"));
        }
        let (r, rest) = der_read_integer(rest)?;
        let (s, rest) = der_read_integer(rest)?;
        if !rest.is_empty() {
            return Err(CryptoError::MalformedDer("trailing bytes"));
        }
        Ok(Self { r, s })
    }
}

fn der_integer(value: &BigUint) -> Vec<u8> {
    let mut bytes = value.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        // Keep the integer positive under DER's signed interpretation.
        bytes.insert(0, 0x00);
    }
    let mut out = Vec::with_capacity(2 + bytes.len());
    out.push(0x02);
    out.push(bytes.len() as u8);
    out.extend(bytes);
    out
}

fn der_read_integer(buf: &[u8]) -> Result<(BigUint, &[u8]), CryptoError> {
    let rest = buf
        .strip_prefix(&[0x02])
        .ok_or(CryptoError::MalformedDer("missing integer marker"))?;
    let (&len, rest) = rest
        .split_first()
        .ok_or(CryptoError::MalformedDer("missing integer length"))?;
    if rest.len() < len as usize {
        return Err(CryptoError::MalformedDer("integer length exceeds input"));
    }
    let (bytes, rest) = rest.split_at(len as usize);
    Ok((BigUint::from_bytes_be(bytes), rest))
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({:x},{:x})", self.r, self.s)
    }
}

/// A secret scalar together with its cached public point.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    secret: BigUint,
    point: S256Point,
}

impl PrivateKey {
    pub fn new(secret: BigUint) -> Result<Self, CryptoError> {
        if secret.is_zero() || secret >= *N {
            return Err(CryptoError::InvalidSecret);
        }
        let point = G.mul(&secret);
        Ok(Self { secret, point })
    }

    pub fn point(&self) -> &S256Point {
        &self.point
    }

    /// Signs the message hash z. The nonce comes from the RFC 6979 chain;
    /// candidates that would produce r = 0 or s = 0 are skipped.
    pub fn sign(&self, z: &BigUint) -> Signature {
        let n = &*N;
        let mut nonces = NonceChain::new(&self.secret, z);
        loop {
            let k = nonces.next_candidate();
            let r = match G.mul(&k).inner().x() {
                Some(x) => x.num() % n,
                None => continue,
            };
            if r.is_zero() {
                continue;
            }
            let k_inv = k.modpow(&(n - 2u8), n);
            let s = (z + &r * &self.secret) * k_inv % n;
            if s.is_zero() {
                continue;
            }
            return Signature::new(r, s);
        }
    }

    /// Wallet Import Format: Base58Check of
    /// `prefix || secret(32) || [0x01 if compressed]`,
    /// prefix 0x80 mainnet / 0xef testnet.
    pub fn wif(&self, compressed: bool, testnet: bool) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(if testnet { 0xef } else { 0x80 });
        payload.extend_from_slice(&to_bytes_32(&self.secret));
        if compressed {
            payload.push(0x01);
        }
        base58::encode_check(&payload)
    }
}

/// The RFC 6979 HMAC-DRBG chain producing deterministic nonce candidates.
///
/// Seeded from the secret and the (reduced) message hash; each call to
/// [`next_candidate`](NonceChain::next_candidate) walks the chain until a
/// value in [1, n) appears.
struct NonceChain {
    k: [u8; 32],
    v: [u8; 32],
    primed: bool,
}

impl NonceChain {
    fn new(secret: &BigUint, z: &BigUint) -> Self {
        let n = &*N;
        let z = if z > n { z - n } else { z.clone() };
        let secret_bytes = to_bytes_32(secret);
        let z_bytes = to_bytes_32(&z);

        let mut k = [0u8; 32];
        let v = [1u8; 32];
        k = hmac_sha256(
            &k,
            &[&v[..], &[0x00][..], &secret_bytes[..], &z_bytes[..]].concat(),
        );
        let v = hmac_sha256(&k, &v);
        k = hmac_sha256(
            &k,
            &[&v[..], &[0x01][..], &secret_bytes[..], &z_bytes[..]].concat(),
        );
        let v = hmac_sha256(&k, &v);
        Self {
            k,
            v,
            primed: false,
        }
    }

    fn next_candidate(&mut self) -> BigUint {
        let n = &*N;
        loop {
            if self.primed {
                // The previous candidate was unusable.
                self.k = hmac_sha256(&self.k, &[&self.v[..], &[0x00][..]].concat());
                self.v = hmac_sha256(&self.k, &self.v);
            }
            self.primed = true;
            self.v = hmac_sha256(&self.k, &self.v);
            let candidate = BigUint::from_bytes_be(&self.v);
            if candidate >= BigUint::one() && candidate < *n {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash256;
    use num_traits::Num;

    fn scalar(hex: &str) -> BigUint {
        BigUint::from_str_radix(hex, 16).unwrap()
    }

    #[test]
    fn deterministic_k_vector() {
        let secret = BigUint::from_bytes_be(&hash256(b"my secret"));
        let z = BigUint::from_bytes_be(&hash256(b"Hi Mom!"));
        let mut chain = NonceChain::new(&secret, &z);
        assert_eq!(
            chain.next_candidate(),
            scalar("5a36ac7d11fc415802c6049fda6ced159feb2044ba9bc61ecb18c8366b64ac65")
        );
    }

    #[test]
    fn sign_verify_roundtrip() {
        let key = PrivateKey::new(BigUint::from(12345u64)).unwrap();
        let z = BigUint::from_bytes_be(&hash256(b"message to be signed"));
        let sig = key.sign(&z);
        assert!(key.point().verify(&z, &sig));
        // Signing is deterministic.
        assert_eq!(key.sign(&z), sig);
    }

    #[test]
    fn tampered_signature_fails() {
        let key = PrivateKey::new(BigUint::from(12345u64)).unwrap();
        let z = BigUint::from_bytes_be(&hash256(b"message to be signed"));
        let sig = key.sign(&z);
        assert!(!key.point().verify(&(&z + 1u8), &sig));
        let other = G.mul(&BigUint::from(54321u64));
        assert!(!other.verify(&z, &sig));
    }

    #[test]
    fn secret_range_check() {
        assert!(PrivateKey::new(BigUint::zero()).is_err());
        assert!(PrivateKey::new(N.clone()).is_err());
        assert!(PrivateKey::new(&*N - 1u8).is_ok());
    }

    #[test]
    fn der_vector() {
        let sig = Signature::new(
            scalar("37206a0610995c58074999cb9767b87af4c4978db68c06e8e6e81d282047a7c6"),
            scalar("8ca63759c1157ebeaec0d03cecca119fc9a75bf8e6d0fa65c841c8e2738cdaec"),
        );
        let expected = "3045022037206a0610995c58074999cb9767b87af4c4978db68c06e8e6e81d282047a7c60221008ca63759c1157ebeaec0d03cecca119fc9a75bf8e6d0fa65c841c8e2738cdaec";
        assert_eq!(hex::encode(sig.der()), expected);
        assert_eq!(Signature::parse_der(&sig.der()).unwrap(), sig);
    }

    #[test]
    fn der_rejects_bad_framing() {
        let good = Signature::new(
            scalar("37206a0610995c58074999cb9767b87af4c4978db68c06e8e6e81d282047a7c6"),
            scalar("8ca63759c1157ebeaec0d03cecca119fc9a75bf8e6d0fa65c841c8e2738cdaec"),
        )
        .der();

        let mut bad = good.clone();
        bad[0] = 0x31;
        assert!(Signature::parse_der(&bad).is_err());

        let mut bad = good.clone();
        bad[1] += 1;
        assert!(Signature::parse_der(&bad).is_err());

        let mut truncated = good.clone();
        truncated.pop();
        assert!(Signature::parse_der(&truncated).is_err());

        let mut trailing = good;
        trailing.push(0x00);
        assert!(Signature::parse_der(&trailing).is_err());
    }

    #[test]
    fn wif_vectors() {
        let cases = [
            (
                BigUint::from(5003u64),
                true,
                true,
                "cMahea7zqjxrtgAbB7LSGbcQUr1uX1ojuat9jZodMN8rFTv2sfUK",
            ),
            (
                BigUint::from(2021u64).pow(5),
                false,
                true,
                "91avARGdfge8E4tZfYLoxeJ5sGBdNJQH4kvjpWAxgzczjbCwxic",
            ),
            (
                scalar("54321deadbeef"),
                true,
                false,
                "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgiuQJv1h8Ytr2S53a",
            ),
        ];
        for (secret, compressed, testnet, expected) in cases {
            let key = PrivateKey::new(secret).unwrap();
            assert_eq!(key.wif(compressed, testnet), expected);
        }
    }
}
