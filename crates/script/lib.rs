//! # bitx-script
//!
//! Bitcoin Script: the byte-coded predicate language that locks and unlocks
//! transaction outputs.
//!
//! A [`script::Script`] is a sequence of commands, each either a data
//! element or an opcode. Evaluation runs the commands against a pair of
//! stacks; the predicate holds iff the main stack ends with a truthy
//! element. Roughly sixty opcodes are implemented: stack manipulation,
//! arithmetic, hashing, signature checks (single and multisig), flow
//! control, and the BIP 65 / BIP 112 locktime checks.
//!
//! ## Modules
//!
//! - [`script`]: the command model, parse/serialize, standard templates
//! - [`eval`]: the evaluation loop and opcode dispatch
//! - [`opcode`]: opcode byte constants and names
//! - [`stack`]: the evaluation stacks
//! - [`num`]: the script-number codec (distinct from the wire varint)
//! - [`ops`]: the opcode handlers
//! - [`error`]: [`error::ScriptError`]
//!
//! ## Quick Start
//!
//! ```rust
//! use num_bigint::BigUint;
//! use bitx_script::{eval::TxContext, opcode, script::Script};
//!
//! // OP_4 | OP_5 OP_ADD OP_9 OP_EQUAL
//! let script_sig = Script::new(vec![opcode::OP_4.into()]);
//! let script_pubkey = Script::new(vec![
//!     opcode::OP_5.into(),
//!     opcode::OP_ADD.into(),
//!     opcode::OP_9.into(),
//!     opcode::OP_EQUAL.into(),
//! ]);
//! let combined = script_sig + script_pubkey;
//! let z = BigUint::from(0u8);
//! assert!(combined.evaluate(&z, &TxContext::default()).unwrap());
//! ```

pub mod error;
pub mod eval;
pub mod num;
pub mod opcode;
pub mod ops;
pub mod script;
pub mod stack;

pub use error::ScriptError;
pub use script::{Cmd, Script};
