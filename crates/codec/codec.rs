//! # bitx-codec
//!
//! Wire serialization for the bitx Bitcoin library.
//!
//! Bitcoin's legacy wire format is positional: fixed-width little-endian
//! integers, raw fixed-size byte arrays, and variable-length payloads
//! prefixed with a compact-size varint. This crate provides the encoding and
//! decoding traits the rest of the workspace builds on, together with
//! builder helpers for struct codecs.
//!
//! ## Quick Start
//!
//! ```rust
//! use bitx_codec::encode::WireEncode;
//! use bitx_codec::decode::WireDecode;
//!
//! // Encoding
//! let value: u32 = 42;
//! let encoded = value.encode_to_vec();
//! assert_eq!(encoded, vec![42, 0, 0, 0]);
//!
//! // Decoding
//! let decoded = u32::decode(&encoded).unwrap();
//! assert_eq!(value, decoded);
//! ```
//!
//! ## Core Traits
//!
//! - [`encode::WireEncode`]: Trait for types that serialize to the wire
//! - [`decode::WireDecode`]: Trait for types that parse from the wire
//!
//! ## Builder Structs
//!
//! For multi-field types, use the builder pattern:
//!
//! - [`structs::Encoder`]: Fluent API for encoding structs field by field
//! - [`structs::Decoder`]: Fluent API for decoding structs with error context
//!
//! ## Modules
//!
//! - [`encode`]: Encoding trait, implementations, and helper functions
//! - [`decode`]: Decoding trait, implementations, and helper functions
//! - [`varint`]: Bitcoin's compact-size integer codec
//! - [`structs`]: `Encoder` and `Decoder` builder types
//! - [`error`]: Error types for decoding failures
//!
//! ## Supported Types
//!
//! - **Integers**: `u8`, `u16`, `u32`, `u64`, little-endian fixed width
//! - **Bytes**: `[u8; N]` raw, `Vec<u8>`/`Bytes` varint-length-prefixed
//! - **Collections**: `Vec<T>` as varint count followed by the elements

pub mod decode;
pub mod encode;
pub mod error;
pub mod structs;
pub mod varint;
