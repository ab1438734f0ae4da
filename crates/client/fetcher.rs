//! The Blockstream-backed transaction fetcher.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use bitx_common::{ChainError, Tx, TxSource};

use super::error::ClientError;

const MAINNET_API: &str = "https://blockstream.info/api";
const TESTNET_API: &str = "https://blockstream.info/testnet/api";

/// Fetches transactions by txid, keeping everything it has seen in memory.
///
/// The cache can be persisted to a JSON file mapping txid to hex-encoded
/// serialized transaction. Not safe for concurrent mutation; callers that
/// want sharing wrap it in their own synchronization.
pub struct TxFetcher {
    cache: HashMap<String, Tx>,
    client: reqwest::blocking::Client,
}

impl TxFetcher {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            client: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(testnet: bool) -> &'static str {
        if testnet { TESTNET_API } else { MAINNET_API }
    }

    /// Returns the transaction for `txid`, fetching it over HTTP unless it
    /// is cached (or `fresh` forces a refetch).
    pub fn fetch(&mut self, txid: &str, testnet: bool, fresh: bool) -> Result<Tx, ClientError> {
        if fresh || !self.cache.contains_key(txid) {
            let tx = self.fetch_remote(txid, testnet)?;
            self.cache.insert(txid.to_string(), tx);
        } else {
            debug!(txid, "transaction served from cache");
        }
        // The cache holds the canonical parse; the network flag tracks the
        // caller's request.
        let mut tx = self.cache[txid].clone();
        tx.testnet = testnet;
        Ok(tx)
    }

    fn fetch_remote(&self, txid: &str, testnet: bool) -> Result<Tx, ClientError> {
        let url = format!("{}/tx/{}/hex", Self::base_url(testnet), txid);
        debug!(%url, "fetching transaction");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ClientError::Http(err.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(txid.to_string()));
        }
        let response = response
            .error_for_status()
            .map_err(|err| ClientError::Http(err.to_string()))?;
        let body = response
            .text()
            .map_err(|err| ClientError::Http(err.to_string()))?;

        let raw = hex::decode(body.trim()).map_err(|err| ClientError::BadHex(err.to_string()))?;
        let tx = parse_stripped(raw, testnet)?;
        if tx.id() != txid {
            return Err(ClientError::IdMismatch {
                expected: txid.to_string(),
                got: tx.id(),
            });
        }
        Ok(tx)
    }

    /// Loads a JSON cache file, a map of txid to hex transaction.
    pub fn load_cache(&mut self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|err| ClientError::CacheIo(err.to_string()))?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&contents)
            .map_err(|err| ClientError::CacheFormat(err.to_string()))?;

        for (txid, tx_hex) in entries {
            let raw =
                hex::decode(&tx_hex).map_err(|err| ClientError::CacheFormat(err.to_string()))?;
            let tx = parse_stripped(raw, false)?;
            self.cache.insert(txid, tx);
        }
        info!(
            path = %path.as_ref().display(),
            entries = self.cache.len(),
            "transaction cache loaded"
        );
        Ok(())
    }

    /// Writes the in-memory map back out as sorted JSON.
    pub fn dump_cache(&self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        let entries: BTreeMap<&String, String> = self
            .cache
            .iter()
            .map(|(txid, tx)| (txid, hex::encode(tx.serialize())))
            .collect();
        let contents = serde_json::to_string_pretty(&entries)
            .map_err(|err| ClientError::CacheFormat(err.to_string()))?;
        std::fs::write(path.as_ref(), contents)
            .map_err(|err| ClientError::CacheIo(err.to_string()))?;
        Ok(())
    }
}

impl Default for TxFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TxSource for TxFetcher {
    fn fetch(&mut self, txid: &str, testnet: bool, fresh: bool) -> Result<Tx, ChainError> {
        TxFetcher::fetch(self, txid, testnet, fresh).map_err(ChainError::from)
    }
}

/// Parses raw transaction bytes, removing the SegWit marker and flag at
/// offsets 4-5 first when present so the legacy codec applies.
fn parse_stripped(mut raw: Vec<u8>, testnet: bool) -> Result<Tx, ClientError> {
    if raw.len() > 5 && raw[4] == 0x00 {
        debug!("stripping segwit marker and flag");
        raw.drain(4..6);
    }
    let (tx, rest) = Tx::parse(&raw, testnet)?;
    if !rest.is_empty() {
        return Err(ClientError::Codec(
            bitx_codec::error::CodecError::trailing_bytes(),
        ));
    }
    Ok(tx)
}
