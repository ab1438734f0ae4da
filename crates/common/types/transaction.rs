//! Legacy Bitcoin transactions: codec, signature hash, signing, and
//! verification.

use bytes::BufMut;
use num_bigint::BigUint;
use tracing::debug;

use bitx_codec::{
    decode::{WireDecode, decode_list},
    encode::{WireEncode, encode_list},
    error::CodecError,
    structs::{Decoder, Encoder},
    varint::VarInt,
};
use bitx_crypto::{ecdsa::PrivateKey, hash::hash256};
use bitx_script::{eval::TxContext, script::Cmd, Script};

use crate::{errors::ChainError, utils::reverse32};

/// SIGHASH_ALL, the only signature-hash mode this library produces or
/// verifies.
pub const SIGHASH_ALL: u32 = 1;

/// The seam to the transaction fetcher: resolves a txid to the transaction
/// that created the outputs being spent.
pub trait TxSource {
    fn fetch(&mut self, txid: &str, testnet: bool, fresh: bool) -> Result<Tx, ChainError>;
}

/// A transaction input: an outpoint, the unlocking script, and the sequence
/// field the timelock opcodes inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    /// Hash of the transaction being spent, in display order. The wire
    /// carries it byte-reversed.
    pub prev_tx: [u8; 32],
    pub prev_index: u32,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prev_tx: [u8; 32], prev_index: u32) -> Self {
        Self {
            prev_tx,
            prev_index,
            script_sig: Script::default(),
            sequence: 0xffff_ffff,
        }
    }

    /// Serializes the input with `script` in place of its scriptSig, the
    /// substitution the signature hash is built on.
    fn encode_with_script(&self, script: &Script, buf: &mut dyn BufMut) {
        Encoder::new(buf)
            .encode_field(&reverse32(&self.prev_tx))
            .encode_field(&self.prev_index)
            .encode_field(script)
            .encode_field(&self.sequence)
            .finish();
    }

    fn fetch_tx(&self, source: &mut dyn TxSource, testnet: bool) -> Result<Tx, ChainError> {
        source.fetch(&hex::encode(self.prev_tx), testnet, false)
    }

    /// The amount of the output this input spends.
    pub fn value(&self, source: &mut dyn TxSource, testnet: bool) -> Result<u64, ChainError> {
        let prev = self.fetch_tx(source, testnet)?;
        let out = prev
            .tx_outs
            .get(self.prev_index as usize)
            .ok_or(ChainError::InputOutOfRange {
                index: self.prev_index as usize,
                len: prev.tx_outs.len(),
            })?;
        Ok(out.amount)
    }

    /// The locking script of the output this input spends.
    pub fn script_pubkey(
        &self,
        source: &mut dyn TxSource,
        testnet: bool,
    ) -> Result<Script, ChainError> {
        let prev = self.fetch_tx(source, testnet)?;
        let out = prev
            .tx_outs
            .get(self.prev_index as usize)
            .ok_or(ChainError::InputOutOfRange {
                index: self.prev_index as usize,
                len: prev.tx_outs.len(),
            })?;
        Ok(out.script_pubkey.clone())
    }
}

impl WireEncode for TxIn {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.encode_with_script(&self.script_sig, buf);
    }
}

impl WireDecode for TxIn {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let decoder = Decoder::new(buf);
        let (wire_prev, decoder) = decoder.decode_field::<[u8; 32]>("prev_tx")?;
        let (prev_index, decoder) = decoder.decode_field("prev_index")?;
        let (script_sig, decoder) = decoder.decode_field("script_sig")?;
        let (sequence, decoder) = decoder.decode_field("sequence")?;
        Ok((
            Self {
                prev_tx: reverse32(&wire_prev),
                prev_index,
                script_sig,
                sequence,
            },
            decoder.finish(),
        ))
    }
}

/// A transaction output: an amount in satoshi and the locking script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub amount: u64,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(amount: u64, script_pubkey: Script) -> Self {
        Self {
            amount,
            script_pubkey,
        }
    }
}

impl WireEncode for TxOut {
    fn encode(&self, buf: &mut dyn BufMut) {
        Encoder::new(buf)
            .encode_field(&self.amount)
            .encode_field(&self.script_pubkey)
            .finish();
    }
}

impl WireDecode for TxOut {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let decoder = Decoder::new(buf);
        let (amount, decoder) = decoder.decode_field("amount")?;
        let (script_pubkey, decoder) = decoder.decode_field("script_pubkey")?;
        Ok((
            Self {
                amount,
                script_pubkey,
            },
            decoder.finish(),
        ))
    }
}

/// A legacy (pre-SegWit) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub version: u32,
    pub tx_ins: Vec<TxIn>,
    pub tx_outs: Vec<TxOut>,
    pub locktime: u32,
    /// Which network the previous outputs live on. Not serialized.
    pub testnet: bool,
}

impl Tx {
    pub fn new(
        version: u32,
        tx_ins: Vec<TxIn>,
        tx_outs: Vec<TxOut>,
        locktime: u32,
        testnet: bool,
    ) -> Self {
        Self {
            version,
            tx_ins,
            tx_outs,
            locktime,
            testnet,
        }
    }

    /// Parses a transaction off the front of `buf`.
    pub fn parse(buf: &[u8], testnet: bool) -> Result<(Self, &[u8]), CodecError> {
        let decoder = Decoder::new(buf);
        let (version, decoder) = decoder.decode_field("version")?;
        let (tx_ins, decoder) = decoder.decode_field_with("tx_ins", decode_list::<TxIn>)?;
        let (tx_outs, decoder) = decoder.decode_field_with("tx_outs", decode_list::<TxOut>)?;
        let (locktime, decoder) = decoder.decode_field("locktime")?;
        Ok((
            Self {
                version,
                tx_ins,
                tx_outs,
                locktime,
                testnet,
            },
            decoder.finish(),
        ))
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Double SHA-256 of the serialization, in wire order.
    fn hash_raw(&self) -> [u8; 32] {
        hash256(&self.serialize())
    }

    /// The transaction hash in display order.
    pub fn hash(&self) -> [u8; 32] {
        reverse32(&self.hash_raw())
    }

    /// The txid: the display-order hash as hex.
    pub fn id(&self) -> String {
        hex::encode(self.hash())
    }

    pub fn is_coinbase(&self) -> bool {
        self.tx_ins.len() == 1
            && self.tx_ins[0].prev_tx == [0u8; 32]
            && self.tx_ins[0].prev_index == 0xffff_ffff
    }

    /// BIP 34: the block height is the first data element of a coinbase
    /// scriptSig, as a little-endian integer.
    pub fn coinbase_height(&self) -> Option<u64> {
        if !self.is_coinbase() {
            return None;
        }
        match self.tx_ins[0].script_sig.cmds().first() {
            Some(Cmd::Data(height)) => Some(crate::utils::le_bytes_to_u64(height)),
            _ => None,
        }
    }

    /// Input total minus output total. Negative means the transaction tries
    /// to create money.
    pub fn fee(&self, source: &mut dyn TxSource) -> Result<i64, ChainError> {
        let mut input_sum: u64 = 0;
        for tx_in in &self.tx_ins {
            input_sum = input_sum
                .checked_add(tx_in.value(source, self.testnet)?)
                .ok_or(ChainError::ValueOverflow)?;
        }
        let mut output_sum: u64 = 0;
        for tx_out in &self.tx_outs {
            output_sum = output_sum
                .checked_add(tx_out.amount)
                .ok_or(ChainError::ValueOverflow)?;
        }
        i64::try_from(i128::from(input_sum) - i128::from(output_sum))
            .map_err(|_| ChainError::ValueOverflow)
    }

    /// The SIGHASH_ALL commitment for one input: the transaction
    /// re-serialized with every scriptSig blanked except the signed input's,
    /// which carries the previous output's scriptPubKey (P2PKH) or the
    /// redeem script (P2SH), followed by the sighash type.
    pub fn sig_hash(
        &self,
        source: &mut dyn TxSource,
        input_index: usize,
        redeem_script: Option<&Script>,
    ) -> Result<BigUint, ChainError> {
        if input_index >= self.tx_ins.len() {
            return Err(ChainError::InputOutOfRange {
                index: input_index,
                len: self.tx_ins.len(),
            });
        }

        let mut buf = Vec::new();
        self.version.encode(&mut buf);
        VarInt(self.tx_ins.len() as u64).encode(&mut buf);
        for (i, tx_in) in self.tx_ins.iter().enumerate() {
            let script = if i == input_index {
                match redeem_script {
                    Some(redeem) => redeem.clone(),
                    None => tx_in.script_pubkey(source, self.testnet)?,
                }
            } else {
                Script::default()
            };
            tx_in.encode_with_script(&script, &mut buf);
        }
        encode_list(&self.tx_outs, &mut buf);
        self.locktime.encode(&mut buf);
        SIGHASH_ALL.encode(&mut buf);

        Ok(BigUint::from_bytes_be(&hash256(&buf)))
    }

    /// Signs input `input_index` with `key`, installing a
    /// `<DER sig || 0x01> <compressed SEC>` scriptSig, and verifies the
    /// result.
    pub fn sign_input(
        &mut self,
        source: &mut dyn TxSource,
        input_index: usize,
        key: &PrivateKey,
    ) -> Result<bool, ChainError> {
        let z = self.sig_hash(source, input_index, None)?;
        let mut sig = key.sign(&z).der();
        sig.push(SIGHASH_ALL as u8);
        let sec = key.point().sec(true);
        self.tx_ins[input_index].script_sig =
            Script::new(vec![Cmd::Data(sig), Cmd::Data(sec)]);
        self.verify_input(source, input_index)
    }

    /// Checks one input's unlocking script against the output it spends.
    /// P2SH outputs have the redeem script (the last scriptSig element)
    /// substituted into the signature hash.
    pub fn verify_input(
        &self,
        source: &mut dyn TxSource,
        input_index: usize,
    ) -> Result<bool, ChainError> {
        let tx_in = self
            .tx_ins
            .get(input_index)
            .ok_or(ChainError::InputOutOfRange {
                index: input_index,
                len: self.tx_ins.len(),
            })?;
        let script_pubkey = tx_in.script_pubkey(source, self.testnet)?;

        let redeem_script = if script_pubkey.is_p2sh() {
            match tx_in.script_sig.cmds().last() {
                Some(Cmd::Data(raw)) => {
                    let mut prefixed = Vec::with_capacity(raw.len() + 9);
                    VarInt(raw.len() as u64).encode(&mut prefixed);
                    prefixed.extend_from_slice(raw);
                    let (redeem, _) = Script::parse(&prefixed).map_err(ChainError::Script)?;
                    Some(redeem)
                }
                _ => None,
            }
        } else {
            None
        };

        let z = self.sig_hash(source, input_index, redeem_script.as_ref())?;
        let combined = tx_in.script_sig.clone() + script_pubkey;
        let ctx = TxContext {
            locktime: self.locktime,
            sequence: tx_in.sequence,
            version: self.version,
        };
        Ok(combined.evaluate(&z, &ctx)?)
    }

    /// Full transaction check: the fee must be non-negative and every input
    /// must verify. Coinbase transactions have nothing to check against.
    pub fn verify(&self, source: &mut dyn TxSource) -> Result<bool, ChainError> {
        if self.is_coinbase() {
            return Ok(true);
        }
        if self.fee(source)? < 0 {
            debug!(txid = %self.id(), "negative fee");
            return Ok(false);
        }
        for input_index in 0..self.tx_ins.len() {
            if !self.verify_input(source, input_index)? {
                debug!(txid = %self.id(), input_index, "input failed verification");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl WireEncode for Tx {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.version.encode(buf);
        encode_list(&self.tx_ins, buf);
        encode_list(&self.tx_outs, buf);
        self.locktime.encode(buf);
    }
}

impl std::fmt::Display for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "tx: {}", self.id())?;
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "tx_ins:")?;
        for tx_in in &self.tx_ins {
            writeln!(f, "  {}:{}", hex::encode(tx_in.prev_tx), tx_in.prev_index)?;
        }
        writeln!(f, "tx_outs:")?;
        for tx_out in &self.tx_outs {
            writeln!(f, "  {} {}", tx_out.amount, tx_out.script_pubkey)?;
        }
        write!(f, "locktime: {}", self.locktime)
    }
}
