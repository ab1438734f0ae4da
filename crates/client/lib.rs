//! # bitx-client
//!
//! The transaction fetcher: resolves txids to full transactions via the
//! Blockstream HTTP API, with an in-memory map and an optional JSON file
//! cache. Implements [`bitx_common::TxSource`], the seam the verification
//! code fetches previous outputs through.
//!
//! Transactions come back from the API in whatever serialization the chain
//! carries; SegWit marker/flag bytes are stripped before parsing, so
//! downstream code only ever sees legacy-format bytes.

pub mod error;
pub mod fetcher;

pub use error::ClientError;
pub use fetcher::TxFetcher;
