//! The script command model: parsing, serialization, and the standard
//! P2PKH / P2SH templates.

use bytes::BufMut;

use bitx_codec::{
    decode::{WireDecode, take},
    encode::WireEncode,
    error::CodecError,
    varint::VarInt,
};

use super::{error::ScriptError, opcode};

/// Consensus cap on a script body.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// A single script command: an opcode byte or a data element to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    Op(u8),
    Data(Vec<u8>),
}

impl From<u8> for Cmd {
    fn from(op: u8) -> Self {
        Cmd::Op(op)
    }
}

impl From<Vec<u8>> for Cmd {
    fn from(data: Vec<u8>) -> Self {
        Cmd::Data(data)
    }
}

/// An ordered sequence of commands.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Script {
    cmds: Vec<Cmd>,
}

impl Script {
    pub fn new(cmds: Vec<Cmd>) -> Self {
        Self { cmds }
    }

    pub fn cmds(&self) -> &[Cmd] {
        &self.cmds
    }

    /// Parses a length-prefixed script off the front of `buf`.
    ///
    /// The body is a token stream: bytes 1..=75 push that many raw bytes,
    /// OP_PUSHDATA1/2/4 carry an explicit 1/2/4-byte little-endian length,
    /// and any other byte is an opcode.
    pub fn parse(buf: &[u8]) -> Result<(Self, &[u8]), ScriptError> {
        let (VarInt(length), rest) = VarInt::decode_unfinished(buf).map_err(ScriptError::Codec)?;
        let length = usize::try_from(length).map_err(|_| ScriptError::ScriptTooLong {
            len: usize::MAX,
        })?;
        if length > MAX_SCRIPT_SIZE {
            return Err(ScriptError::ScriptTooLong { len: length });
        }
        let (body, remaining) = take(rest, length)?;
        Ok((Self::parse_body(body)?, remaining))
    }

    fn parse_body(mut body: &[u8]) -> Result<Self, ScriptError> {
        let mut cmds = Vec::new();
        while let Some((&byte, rest)) = body.split_first() {
            body = rest;
            match byte {
                1..=75 => {
                    let (data, rest) = take(body, byte as usize)?;
                    cmds.push(Cmd::Data(data.to_vec()));
                    body = rest;
                }
                opcode::OP_PUSHDATA1 => {
                    let (len, rest) = u8::decode_unfinished(body)?;
                    let (data, rest) = take(rest, len as usize)?;
                    cmds.push(Cmd::Data(data.to_vec()));
                    body = rest;
                }
                opcode::OP_PUSHDATA2 => {
                    let (len, rest) = u16::decode_unfinished(body)?;
                    let (data, rest) = take(rest, len as usize)?;
                    cmds.push(Cmd::Data(data.to_vec()));
                    body = rest;
                }
                opcode::OP_PUSHDATA4 => {
                    let (len, rest) = u32::decode_unfinished(body)?;
                    let (data, rest) = take(rest, len as usize)?;
                    cmds.push(Cmd::Data(data.to_vec()));
                    body = rest;
                }
                op => cmds.push(Cmd::Op(op)),
            }
        }
        Ok(Self { cmds })
    }

    /// Serializes the command sequence without the length prefix, choosing
    /// the shortest push form for each data element.
    pub fn raw_serialize(&self, buf: &mut dyn BufMut) {
        for cmd in &self.cmds {
            match cmd {
                Cmd::Op(op) => buf.put_u8(*op),
                Cmd::Data(data) => match data.len() {
                    0..=75 => {
                        buf.put_u8(data.len() as u8);
                        buf.put_slice(data);
                    }
                    76..=255 => {
                        buf.put_u8(opcode::OP_PUSHDATA1);
                        buf.put_u8(data.len() as u8);
                        buf.put_slice(data);
                    }
                    256..=65535 => {
                        buf.put_u8(opcode::OP_PUSHDATA2);
                        buf.put_u16_le(data.len() as u16);
                        buf.put_slice(data);
                    }
                    _ => {
                        buf.put_u8(opcode::OP_PUSHDATA4);
                        buf.put_u32_le(data.len() as u32);
                        buf.put_slice(data);
                    }
                },
            }
        }
    }

    /// The standard pay-to-pubkey-hash locking script:
    /// `OP_DUP OP_HASH160 <h160> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn p2pkh(h160: &[u8; 20]) -> Self {
        Self::new(vec![
            Cmd::Op(opcode::OP_DUP),
            Cmd::Op(opcode::OP_HASH160),
            Cmd::Data(h160.to_vec()),
            Cmd::Op(opcode::OP_EQUALVERIFY),
            Cmd::Op(opcode::OP_CHECKSIG),
        ])
    }

    /// The standard pay-to-script-hash locking script:
    /// `OP_HASH160 <h160> OP_EQUAL`.
    pub fn p2sh(h160: &[u8; 20]) -> Self {
        Self::new(vec![
            Cmd::Op(opcode::OP_HASH160),
            Cmd::Data(h160.to_vec()),
            Cmd::Op(opcode::OP_EQUAL),
        ])
    }

    pub fn is_p2pkh(&self) -> bool {
        matches!(
            self.cmds.as_slice(),
            [
                Cmd::Op(opcode::OP_DUP),
                Cmd::Op(opcode::OP_HASH160),
                Cmd::Data(h160),
                Cmd::Op(opcode::OP_EQUALVERIFY),
                Cmd::Op(opcode::OP_CHECKSIG),
            ] if h160.len() == 20
        )
    }

    pub fn is_p2sh(&self) -> bool {
        matches!(
            self.cmds.as_slice(),
            [
                Cmd::Op(opcode::OP_HASH160),
                Cmd::Data(h160),
                Cmd::Op(opcode::OP_EQUAL),
            ] if h160.len() == 20
        )
    }
}

impl WireEncode for Script {
    fn encode(&self, buf: &mut dyn BufMut) {
        let mut body = Vec::new();
        self.raw_serialize(&mut body);
        VarInt(body.len() as u64).encode(buf);
        buf.put_slice(&body);
    }
}

impl WireDecode for Script {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        Script::parse(buf).map_err(|err| match err {
            ScriptError::Codec(codec) => codec,
            other => CodecError::Custom(other.to_string()),
        })
    }
}

/// Concatenation, used to run an unlocking script in front of the locking
/// script it spends.
impl std::ops::Add for Script {
    type Output = Script;

    fn add(self, rhs: Script) -> Script {
        let mut cmds = self.cmds;
        cmds.extend(rhs.cmds);
        Script { cmds }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for cmd in &self.cmds {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            match cmd {
                Cmd::Op(op) => match opcode::name(*op) {
                    Some(name) => write!(f, "{name}")?,
                    None => write!(f, "OP_[{op}]")?,
                },
                Cmd::Data(data) => write!(f, "{}", hex::encode(data))?,
            }
        }
        Ok(())
    }
}
