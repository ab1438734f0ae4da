//! # bitx-crypto
//!
//! Cryptographic primitives for the bitx Bitcoin library.
//!
//! This crate provides the numeric substrate for signing and verification:
//! finite-field arithmetic, affine elliptic-curve points, the secp256k1
//! specialization, and ECDSA with the wire encodings Bitcoin uses for keys
//! and signatures (SEC, DER, WIF, Base58Check addresses).
//!
//! ## Modules
//!
//! - [`hash`]: SHA-256, double SHA-256, RIPEMD-160(SHA-256), SHA-1, HMAC-SHA-256
//! - [`base58`]: Base58 and Base58Check encodings
//! - [`field`]: Modular arithmetic over a prime field
//! - [`point`]: Affine points on short Weierstrass curves
//! - [`secp256k1`]: Curve parameters, [`secp256k1::S256Point`], SEC serialization, addresses
//! - [`ecdsa`]: [`ecdsa::Signature`] with DER codec, [`ecdsa::PrivateKey`] with
//!   RFC 6979 deterministic nonces and WIF serialization
//!
//! ## Quick Start
//!
//! ```rust
//! use num_bigint::BigUint;
//! use bitx_crypto::{ecdsa::PrivateKey, hash::hash256};
//!
//! let secret = BigUint::from_bytes_be(&hash256(b"my secret"));
//! let key = PrivateKey::new(secret).unwrap();
//! let z = BigUint::from_bytes_be(&hash256(b"my message"));
//!
//! let signature = key.sign(&z);
//! assert!(key.point().verify(&z, &signature));
//! ```
//!
//! All arithmetic is on [`num_bigint::BigUint`]; modular exponentiation and
//! inversion go through `BigUint::modpow`. Constant-time execution is out of
//! scope.

pub mod base58;
pub mod ecdsa;
pub mod error;
pub mod field;
pub mod hash;
pub mod point;
pub mod secp256k1;

pub use error::CryptoError;
